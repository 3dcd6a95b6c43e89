//! Auction record, per-bidder stats, and bid history types.
//!
//! These are the payloads carried by broadcast events, so every type
//! serializes with camelCase field names matching the client-facing JSON.
//! Timestamps are milliseconds since the Unix epoch.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Sentinel identity holding the starting price before any bid is accepted.
pub const AUCTIONEER: &str = "auctioneer";

/// The single authoritative record of a running (or just-ended) auction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionRecord {
    /// Display name of the item under the hammer. Immutable for the
    /// auction's lifetime.
    pub item_name: String,
    /// Current highest bid. Starts at the starting price and never
    /// decreases while the auction is active.
    pub highest_bid: f64,
    /// Identity holding the highest bid; [`AUCTIONEER`] until the first
    /// accepted bid.
    pub highest_bidder: String,
    /// Epoch milliseconds at which the auction auto-closes.
    pub end_timestamp: i64,
}

/// Aggregate stats for one bidder within the current auction.
///
/// Created on a bidder's first accepted bid, cleared when the auction
/// resets.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BidderStats {
    /// That bidder's own best accepted bid.
    pub highest_bid: f64,
    /// Number of accepted bids from that bidder.
    pub bid_count: u32,
}

/// One accepted bid in the history log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BidEntry {
    /// Bidder identity.
    pub name: String,
    /// Accepted price.
    pub price: f64,
    /// Epoch milliseconds at which the bid was accepted.
    pub timestamp: i64,
}

/// Snapshot of live auction state, broadcast after every accepted bid.
///
/// `bidders` is a [`BTreeMap`] so the serialized JSON is deterministic.
/// `history` is newest-first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSnapshot {
    /// Current highest bid.
    pub highest_bid: f64,
    /// Identity holding the highest bid.
    pub highest_bidder: String,
    /// Per-bidder aggregate stats.
    pub bidders: BTreeMap<String, BidderStats>,
    /// Accepted bids, newest first.
    pub history: Vec<BidEntry>,
}

/// Lifecycle phase of the coordinator.
///
/// `Idle → Active` (start), `Active → Ended` (manual end or auto-close,
/// record retained), `Ended → Idle` (new-auction). Starting is blocked
/// only while `Active`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuctionPhase {
    /// No auction exists.
    Idle,
    /// An auction is running and accepting bids.
    Active,
    /// An auction finished but its record is retained until reset.
    Ended,
}
