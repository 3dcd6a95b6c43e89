//! Static auction pages, embedded at compile time.

/// Landing page linking the two consoles.
pub const INDEX_PAGE: &str = include_str!("../pages/index.html");

/// Auctioneer console: start, end, and reset auctions.
pub const AUCTIONEER_PAGE: &str = include_str!("../pages/auctioneer.html");

/// Bidder console: join and place bids.
pub const BIDDER_PAGE: &str = include_str!("../pages/bidder.html");
