//! HTML field extraction.
//!
//! Pulls the title, the social/meta description tags, the first image's
//! attributes and the article body text out of a page. Only non-empty values
//! are returned, ordered as [`FieldSource::ALL`].

use crate::models::FieldSource;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid built-in selector {css:?}: {e}"))
}

static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static IMG: Lazy<Selector> = Lazy::new(|| selector("img"));
static ARTICLE_P: Lazy<Selector> = Lazy::new(|| selector("article p"));

static META_DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="description"]"#));
static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static OG_DESCRIPTION: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:description"]"#));
static OG_URL: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:url"]"#));
static OG_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:image"]"#));
static OG_TYPE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:type"]"#));
static TWITTER_CARD: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="twitter:card"]"#));
static TWITTER_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="twitter:title"]"#));
static TWITTER_DESCRIPTION: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[name="twitter:description"]"#));
static TWITTER_IMAGE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[name="twitter:image"]"#));

/// Extract every non-empty field from an HTML document.
pub fn extract_fields(html: &str) -> Vec<(FieldSource, String)> {
    let document = Html::parse_document(html);
    FieldSource::ALL
        .iter()
        .filter_map(|source| {
            extract_field(&document, *source)
                .filter(|value| !value.is_empty())
                .map(|value| (*source, value))
        })
        .collect()
}

fn extract_field(document: &Html, source: FieldSource) -> Option<String> {
    match source {
        FieldSource::Title => first_text(document, &TITLE),
        FieldSource::MetaDescription => first_attr(document, &META_DESCRIPTION, "content"),
        FieldSource::OgTitle => first_attr(document, &OG_TITLE, "content"),
        FieldSource::OgDescription => first_attr(document, &OG_DESCRIPTION, "content"),
        FieldSource::OgUrl => first_attr(document, &OG_URL, "content"),
        FieldSource::OgImage => first_attr(document, &OG_IMAGE, "content"),
        FieldSource::OgType => first_attr(document, &OG_TYPE, "content"),
        FieldSource::TwitterCard => first_attr(document, &TWITTER_CARD, "content"),
        FieldSource::TwitterTitle => first_attr(document, &TWITTER_TITLE, "content"),
        FieldSource::TwitterDescription => first_attr(document, &TWITTER_DESCRIPTION, "content"),
        FieldSource::TwitterImage => first_attr(document, &TWITTER_IMAGE, "content"),
        FieldSource::ImageSrc => first_attr(document, &IMG, "src"),
        FieldSource::ImageAlt => first_attr(document, &IMG, "alt"),
        FieldSource::MainText => Some(article_text(document)),
    }
}

/// Text nodes directly under `element`, skipping nested markup.
fn own_text<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element
        .children()
        .filter_map(|child| child.value().as_text().map(|text| &**text))
}

fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .flat_map(own_text)
        .next()
        .map(str::to_string)
}

fn first_attr(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
    document
        .select(selector)
        .find_map(|element| element.value().attr(attr))
        .map(str::to_string)
}

/// Direct text of every `<p>` inside an `<article>`, joined by single spaces.
///
/// `select` yields each element once, so paragraphs inside nested articles
/// are not repeated.
fn article_text(document: &Html) -> String {
    document
        .select(&ARTICLE_P)
        .flat_map(own_text)
        .collect::<Vec<_>>()
        .join(" ")
}
