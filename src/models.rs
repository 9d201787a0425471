//! Data models for fetched pages and the year matches exported from them.
//!
//! - [`FieldSource`]: Which part of a page a piece of text was extracted from
//! - [`YearMatch`]: One exported row; a single year hit on a single page

use serde::{Deserialize, Serialize};
use std::fmt;

/// The page fields scanned for years, in the order they are reported.
///
/// Every variant except [`FieldSource::MainText`] is a short metadata value
/// (title, meta tags, first image attributes). `MainText` is the joined
/// paragraph text of the page's `<article>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldSource {
    Title,
    MetaDescription,
    OgTitle,
    OgDescription,
    OgUrl,
    OgImage,
    OgType,
    TwitterCard,
    TwitterTitle,
    TwitterDescription,
    TwitterImage,
    ImageSrc,
    ImageAlt,
    MainText,
}

impl FieldSource {
    /// All sources in report order.
    pub const ALL: [FieldSource; 14] = [
        FieldSource::Title,
        FieldSource::MetaDescription,
        FieldSource::OgTitle,
        FieldSource::OgDescription,
        FieldSource::OgUrl,
        FieldSource::OgImage,
        FieldSource::OgType,
        FieldSource::TwitterCard,
        FieldSource::TwitterTitle,
        FieldSource::TwitterDescription,
        FieldSource::TwitterImage,
        FieldSource::ImageSrc,
        FieldSource::ImageAlt,
        FieldSource::MainText,
    ];

    /// The tag written in front of every snippet, e.g. `og_title: ...`.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldSource::Title => "title",
            FieldSource::MetaDescription => "meta_description",
            FieldSource::OgTitle => "og_title",
            FieldSource::OgDescription => "og_description",
            FieldSource::OgUrl => "og_url",
            FieldSource::OgImage => "og_image",
            FieldSource::OgType => "og_type",
            FieldSource::TwitterCard => "twitter_card",
            FieldSource::TwitterTitle => "twitter_title",
            FieldSource::TwitterDescription => "twitter_description",
            FieldSource::TwitterImage => "twitter_image",
            FieldSource::ImageSrc => "image_src",
            FieldSource::ImageAlt => "image_alt",
            FieldSource::MainText => "main_text",
        }
    }
}

impl fmt::Display for FieldSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single year found on a page.
///
/// Field order matters: it is the column order of the CSV feed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct YearMatch {
    /// The matched year, always a member of the configured year set.
    pub year: String,
    /// The page URL after redirects.
    pub url: String,
    /// `"<tag>: <snippet>"`.
    pub text: String,
}

impl YearMatch {
    pub fn new(year: &str, url: &str, source: FieldSource, snippet: &str) -> Self {
        Self {
            year: year.to_string(),
            url: url.to_string(),
            text: format!("{}: {}", source.tag(), snippet),
        }
    }
}
