//! # gavel-protocol
//!
//! Wire protocol, command registry, and handlers for the auction server.
//!
//! Clients speak a small fixed vocabulary of JSON frames over a
//! persistent connection:
//! - Inbound: `start-auction`, `join-as-bidder`, `submit-bid`,
//!   `end-auction`, `new-auction`
//! - Outbound: `joined-ack`, `auction-started`, `auction-update`,
//!   `bid-ack`, `auction-ended`, `auction-reset`
//!
//! Dispatch is tolerant end to end: unknown commands, malformed payloads,
//! and out-of-state requests are dropped with a log line, never answered
//! with an error frame. The only failure a client ever sees is a
//! `bid-ack` with `success: false`.

#![deny(unsafe_code)]

pub mod context;
pub mod errors;
pub mod handlers;
pub mod registry;
pub mod types;

pub use context::{CommandContext, ReplySender};
pub use errors::CommandError;
pub use handlers::register_all;
pub use registry::{CommandHandler, CommandRegistry};
pub use types::{
    BID_ACCEPTED_MESSAGE, BID_TOO_LOW_MESSAGE, CommandEnvelope, JoinAsBidderParams, ServerEvent,
    StartAuctionParams, SubmitBidParams,
};
