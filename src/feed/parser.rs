use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::{decode_html_entities, Channel, FetchError, RssFeed, RssItem};

/// Parse an RSS document from raw XML bytes.
///
/// Expects a root element wrapping a `channel`; fields are matched by exact
/// element name, so namespaced siblings such as `atom:link` are ignored.
/// Text is kept as-is apart from XML unescaping.
pub fn parse_feed(xml: &[u8]) -> Result<RssFeed, FetchError> {
    let mut reader = Reader::from_reader(xml);

    let mut feed = RssFeed::default();
    let mut path: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if opens_item(&path, &name) {
                    feed.channel.items.push(RssItem::default());
                }
                saw_root = true;
                path.push(name);
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if opens_item(&path, &name) {
                    feed.channel.items.push(RssItem::default());
                }
                saw_root = true;
            }
            Ok(Event::End(_)) => {
                path.pop();
            }
            Ok(Event::Text(e)) => {
                // A run with an entity XML does not know (e.g. `&rsquo;`)
                // fails to unescape as a whole; HTML references cover XML's
                // five, so decode the raw run with those instead.
                let text = match e.unescape() {
                    Ok(text) => text.into_owned(),
                    Err(_) => decode_html_entities(&String::from_utf8_lossy(&e)),
                };
                append_text(&mut feed, &path, &text);
            }
            Ok(Event::CData(e)) => {
                let text = String::from_utf8_lossy(&e).into_owned();
                append_text(&mut feed, &path, &text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(FetchError::Parse(format!(
                    "XML error at position {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if !saw_root {
        return Err(FetchError::Parse("document has no root element".to_string()));
    }
    if let Some(open) = path.last() {
        return Err(FetchError::Parse(format!("unclosed element <{}>", open)));
    }

    Ok(feed)
}

fn opens_item(path: &[String], name: &str) -> bool {
    name == "item" && matches!(path, [_, channel] if channel == "channel")
}

fn append_text(feed: &mut RssFeed, path: &[String], text: &str) {
    let target = match path {
        [_, channel, field] if channel == "channel" => channel_field(&mut feed.channel, field),
        [_, channel, item, field] if channel == "channel" && item == "item" => feed
            .channel
            .items
            .last_mut()
            .and_then(|item| item_field(item, field)),
        _ => None,
    };

    if let Some(target) = target {
        target.push_str(text);
    }
}

fn channel_field<'a>(channel: &'a mut Channel, name: &str) -> Option<&'a mut String> {
    match name {
        "title" => Some(&mut channel.title),
        "link" => Some(&mut channel.link),
        "description" => Some(&mut channel.description),
        _ => None,
    }
}

fn item_field<'a>(item: &'a mut RssItem, name: &str) -> Option<&'a mut String> {
    match name {
        "title" => Some(&mut item.title),
        "link" => Some(&mut item.link),
        "description" => Some(&mut item.description),
        "pubDate" => Some(&mut item.pub_date),
        _ => None,
    }
}
