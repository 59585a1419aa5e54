//! Feed fetching: one HTTP GET, a strict status check, RSS parsing and
//! HTML-entity normalization of titles and descriptions.

mod client;
mod error;
mod models;
mod parser;

pub use client::{FeedFetcher, USER_AGENT};
pub use error::FetchError;
pub use models::{decode_html_entities, Channel, RssFeed, RssItem};
pub use parser::parse_feed;
