use serde::{Deserialize, Serialize};

/// A parsed RSS document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssFeed {
    pub channel: Channel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub title: String,
    pub link: String,
    pub description: String,
    pub items: Vec<RssItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RssItem {
    pub title: String,
    pub link: String,
    pub description: String,
    pub pub_date: String,
}

impl RssFeed {
    /// Decode HTML character references in every title and description.
    ///
    /// Providers often escape these fields twice, so one pass of XML
    /// unescaping still leaves `&amp;` and friends behind. Links and dates
    /// are left as parsed.
    pub fn normalize(&mut self) {
        decode_in_place(&mut self.channel.title);
        decode_in_place(&mut self.channel.description);
        for item in &mut self.channel.items {
            decode_in_place(&mut item.title);
            decode_in_place(&mut item.description);
        }
    }
}

/// Reverse HTML character references. No other change is made to the text.
pub fn decode_html_entities(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

fn decode_in_place(field: &mut String) {
    *field = decode_html_entities(field);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_plain_text_is_a_no_op() {
        assert_eq!(decode_html_entities("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(decode_html_entities("  Mixed CASE  "), "  Mixed CASE  ");
    }

    #[test]
    fn decodes_named_and_numeric_references() {
        assert_eq!(decode_html_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(decode_html_entities("&lt;b&gt; &#39;x&#39; &#x27;y&#x27;"), "<b> 'x' 'y'");
    }

    #[test]
    fn normalize_touches_titles_and_descriptions_only() {
        let mut feed = RssFeed {
            channel: Channel {
                title: "A &amp; B".to_string(),
                link: "https://example.com/?a=1&amp;b=2".to_string(),
                description: "&quot;quoted&quot;".to_string(),
                items: vec![RssItem {
                    title: "Item &amp; more".to_string(),
                    link: "https://example.com/1?x=1&amp;y=2".to_string(),
                    description: "&lt;p&gt;Body&lt;/p&gt;".to_string(),
                    pub_date: "Mon, 01 Jan 2024 00:00:00 &amp;".to_string(),
                }],
            },
        };

        feed.normalize();

        assert_eq!(feed.channel.title, "A & B");
        assert_eq!(feed.channel.link, "https://example.com/?a=1&amp;b=2");
        assert_eq!(feed.channel.description, "\"quoted\"");
        let item = &feed.channel.items[0];
        assert_eq!(item.title, "Item & more");
        assert_eq!(item.link, "https://example.com/1?x=1&amp;y=2");
        assert_eq!(item.description, "<p>Body</p>");
        assert_eq!(item.pub_date, "Mon, 01 Jan 2024 00:00:00 &amp;");
    }
}
