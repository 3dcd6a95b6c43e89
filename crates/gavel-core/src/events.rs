//! Domain events published by the [`Coordinator`](crate::Coordinator).
//!
//! Events flow out on a `tokio::sync::broadcast` channel; the server's
//! event bridge converts them to wire messages and fans them out to every
//! connected client. Unicast acknowledgements (join, bid result) are not
//! events; they travel back through the originating connection.

use crate::auction::{AuctionRecord, AuctionSnapshot};

/// A state change every connected client must hear about.
#[derive(Clone, Debug, PartialEq)]
pub enum AuctionEvent {
    /// An auction began; carries the full starting record.
    Started(AuctionRecord),
    /// A bid was accepted; carries the full updated state.
    Updated(AuctionSnapshot),
    /// The auction ended, manually or by timer.
    Ended {
        /// Identity holding the highest bid at close.
        winner: String,
        /// Final price.
        price: f64,
    },
    /// Everything was cleared for a fresh auction.
    Reset,
}

/// Outcome of a bid submission.
///
/// Only [`Accepted`](BidOutcome::Accepted) and [`TooLow`](BidOutcome::TooLow)
/// produce a reply to the submitter; the rest are dropped silently to
/// tolerate duplicate or late client actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BidOutcome {
    /// Strictly higher than the previous highest; state updated.
    Accepted,
    /// Not strictly higher than the current highest (ties lose).
    TooLow,
    /// No active auction to bid on.
    Inactive,
    /// The submitting connection never joined with an identity.
    NotJoined,
    /// The price was not a finite number.
    InvalidPrice,
}

impl BidOutcome {
    /// Whether this outcome is dropped without any reply to the submitter.
    pub fn is_silent(self) -> bool {
        matches!(self, Self::Inactive | Self::NotJoined | Self::InvalidPrice)
    }
}
