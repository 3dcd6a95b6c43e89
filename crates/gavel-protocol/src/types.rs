//! Wire-format types for the auction event protocol.
//!
//! Every frame in either direction is a single JSON object carrying a
//! `type` discriminator, with the payload fields inlined beside it in
//! camelCase.

use gavel_core::{AuctionEvent, AuctionRecord, AuctionSnapshot, BidOutcome};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::CommandError;

/// Unicast ack text for an accepted bid.
pub const BID_ACCEPTED_MESSAGE: &str = "You are the highest bidder!";
/// Unicast ack text for a bid that was not strictly above the highest.
pub const BID_TOO_LOW_MESSAGE: &str = "Bid too low!";

/// Incoming command frame from a client.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CommandEnvelope {
    /// Command name (e.g. `submit-bid`).
    #[serde(rename = "type")]
    pub command: String,
    /// Remaining fields of the frame, decoded per command.
    #[serde(flatten)]
    pub payload: Value,
}

impl CommandEnvelope {
    /// Parse a raw text frame into an envelope.
    pub fn parse(raw: &str) -> Result<Self, CommandError> {
        Ok(serde_json::from_str(raw)?)
    }
}

/// Payload of `start-auction`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartAuctionParams {
    /// Item put up for sale.
    pub item_name: String,
    /// Opening price; the first bid must exceed it.
    pub starting_price: f64,
    /// Auction duration in seconds, clamped into configured bounds.
    pub time_limit_seconds: f64,
}

/// Payload of `join-as-bidder`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JoinAsBidderParams {
    /// Display name to bind to this connection.
    pub name: String,
}

/// Payload of `submit-bid`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubmitBidParams {
    /// Offered price.
    pub price: f64,
}

/// Outgoing event frame to one client or all of them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerEvent {
    /// Confirms a join and echoes the registered name. Unicast.
    #[serde(rename = "joined-ack")]
    JoinedAck {
        /// The name that was bound.
        name: String,
    },
    /// A new auction is open for bidding. Broadcast, and replayed as a
    /// unicast to bidders who join mid-auction.
    #[serde(rename = "auction-started")]
    AuctionStarted {
        /// The freshly created record.
        #[serde(flatten)]
        auction: AuctionRecord,
    },
    /// The highest bid changed. Broadcast.
    #[serde(rename = "auction-update")]
    AuctionUpdate {
        /// Full bid state after the accepted bid.
        #[serde(flatten)]
        state: AuctionSnapshot,
    },
    /// Result of this connection's own bid. Unicast.
    #[serde(rename = "bid-ack")]
    BidAck {
        /// Whether the bid was accepted.
        success: bool,
        /// Human-readable reason.
        message: String,
    },
    /// The auction closed. Broadcast.
    #[serde(rename = "auction-ended")]
    AuctionEnded {
        /// Highest bidder at close time (the auctioneer if nobody bid).
        winner: String,
        /// Final price.
        price: f64,
    },
    /// All auction state was cleared. Broadcast.
    #[serde(rename = "auction-reset")]
    AuctionReset,
}

impl ServerEvent {
    /// Build the unicast join confirmation.
    pub fn joined_ack(name: impl Into<String>) -> Self {
        Self::JoinedAck { name: name.into() }
    }

    /// Unicast ack for a bid outcome, or `None` for outcomes that are
    /// dropped silently.
    pub fn bid_ack(outcome: BidOutcome) -> Option<Self> {
        match outcome {
            BidOutcome::Accepted => Some(Self::BidAck {
                success: true,
                message: BID_ACCEPTED_MESSAGE.to_owned(),
            }),
            BidOutcome::TooLow => Some(Self::BidAck {
                success: false,
                message: BID_TOO_LOW_MESSAGE.to_owned(),
            }),
            BidOutcome::Inactive | BidOutcome::NotJoined | BidOutcome::InvalidPrice => None,
        }
    }

    /// Wire name of this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinedAck { .. } => "joined-ack",
            Self::AuctionStarted { .. } => "auction-started",
            Self::AuctionUpdate { .. } => "auction-update",
            Self::BidAck { .. } => "bid-ack",
            Self::AuctionEnded { .. } => "auction-ended",
            Self::AuctionReset => "auction-reset",
        }
    }
}

impl From<AuctionEvent> for ServerEvent {
    fn from(event: AuctionEvent) -> Self {
        match event {
            AuctionEvent::Started(auction) => Self::AuctionStarted { auction },
            AuctionEvent::Updated(state) => Self::AuctionUpdate { state },
            AuctionEvent::Ended { winner, price } => Self::AuctionEnded { winner, price },
            AuctionEvent::Reset => Self::AuctionReset,
        }
    }
}
