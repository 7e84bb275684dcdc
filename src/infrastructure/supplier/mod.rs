//! VidaXL CSV feed adapter for the supplier side.

mod feed;

pub use feed::{parse_feed, FeedFormat, HttpSupplierFeed};
