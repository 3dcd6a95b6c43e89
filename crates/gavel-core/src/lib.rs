//! Core auction domain: state machine, bid records, and domain events.
//!
//! This crate knows nothing about WebSockets or JSON framing. It owns the
//! single-auction lifecycle (idle, active, ended), enforces the strictly-
//! greater bid rule, tracks per-bidder statistics and newest-first bid
//! history, and publishes [`AuctionEvent`]s on a broadcast channel for the
//! transport layer to fan out.

#![deny(unsafe_code)]

pub mod auction;
pub mod coordinator;
pub mod events;

pub use auction::{
    AUCTIONEER, AuctionPhase, AuctionRecord, AuctionSnapshot, BidEntry, BidderStats,
};
pub use coordinator::{AuctionLimits, Coordinator};
pub use events::{AuctionEvent, BidOutcome};
