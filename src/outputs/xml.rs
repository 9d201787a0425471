//! XML feed.
//!
//! ```text
//! <?xml version="1.0" encoding="utf-8"?>
//! <items>
//!   <item>
//!     <year>2021</year>
//!     <url>https://...</url>
//!     <text>title: ...</text>
//!   </item>
//! </items>
//! ```

use crate::models::YearMatch;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use std::error::Error;

pub fn render(records: &[YearMatch]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    writer.write_event(Event::Start(BytesStart::new("items")))?;
    for record in records {
        writer.write_event(Event::Start(BytesStart::new("item")))?;
        write_leaf(&mut writer, "year", &record.year)?;
        write_leaf(&mut writer, "url", &record.url)?;
        write_leaf(&mut writer, "text", &record.text)?;
        writer.write_event(Event::End(BytesEnd::new("item")))?;
    }
    writer.write_event(Event::End(BytesEnd::new("items")))?;

    let mut bytes = writer.into_inner();
    bytes.push(b'\n');
    Ok(bytes)
}

fn write_leaf(writer: &mut Writer<Vec<u8>>, name: &str, value: &str) -> Result<(), Box<dyn Error>> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}
