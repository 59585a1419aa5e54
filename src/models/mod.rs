//! Domain models for the aggregator.
//!
//! - [`User`]: a registered reader. At most one is "current" per config file.
//! - [`Feed`]: a uniquely-URLed source, owned by the user who added it.
//! - [`FeedFollow`]: a user following a feed. Adding a feed follows it too.

mod feed;
mod follow;
mod user;

pub use feed::*;
pub use follow::*;
pub use user::*;
