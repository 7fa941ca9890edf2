//! Realtime change feed for the `pages` and `nav_items` tables.
//!
//! Mutations publish a [`ChangeEvent`] on an in-process broadcast channel;
//! WebSocket clients subscribe to a `public:<table>` channel and re-fetch
//! on every event they receive.

pub mod feed;
pub mod websocket;

pub use feed::{feed, init_feed, notify, ChangeFeed};
