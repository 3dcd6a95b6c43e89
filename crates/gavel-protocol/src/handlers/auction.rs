//! Auction command handlers: start, join, bid, end, reset.

use async_trait::async_trait;
use gavel_core::BidOutcome;
use metrics::counter;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::context::CommandContext;
use crate::errors::CommandError;
use crate::handlers::parse_payload;
use crate::registry::CommandHandler;
use crate::types::{JoinAsBidderParams, ServerEvent, StartAuctionParams, SubmitBidParams};

/// Opens a new auction, if none is running.
pub struct StartAuctionHandler;

#[async_trait]
impl CommandHandler for StartAuctionHandler {
    #[instrument(skip(self, payload, ctx), fields(command = "start-auction"))]
    async fn handle(&self, payload: Value, ctx: &CommandContext) -> Result<(), CommandError> {
        let params: StartAuctionParams = parse_payload("start-auction", payload)?;
        // Durations arrive as JSON numbers; negative or NaN collapses to 0
        // and the coordinator clamps it into bounds.
        let seconds = params.time_limit_seconds.max(0.0) as u64;
        let _ = ctx
            .coordinator
            .start_auction(&params.item_name, params.starting_price, seconds);
        Ok(())
    }
}

/// Binds a bidder name to the sending connection.
pub struct JoinAsBidderHandler;

#[async_trait]
impl CommandHandler for JoinAsBidderHandler {
    #[instrument(skip(self, payload, ctx), fields(command = "join-as-bidder"))]
    async fn handle(&self, payload: Value, ctx: &CommandContext) -> Result<(), CommandError> {
        let params: JoinAsBidderParams = parse_payload("join-as-bidder", payload)?;
        ctx.bind_identity(&params.name);
        info!(name = %params.name, "bidder joined");
        ctx.send_reply(ServerEvent::joined_ack(params.name)).await?;

        // Late joiners get the running auction replayed so their view
        // catches up with everyone else's.
        if let Some(auction) = ctx.coordinator.current_auction() {
            ctx.send_reply(ServerEvent::AuctionStarted { auction }).await?;
        }
        Ok(())
    }
}

/// Submits a bid for the connection's bound identity.
pub struct SubmitBidHandler;

#[async_trait]
impl CommandHandler for SubmitBidHandler {
    #[instrument(skip(self, payload, ctx), fields(command = "submit-bid"))]
    async fn handle(&self, payload: Value, ctx: &CommandContext) -> Result<(), CommandError> {
        let params: SubmitBidParams = parse_payload("submit-bid", payload)?;
        let outcome = match ctx.identity() {
            Some(name) => ctx.coordinator.submit_bid(&name, params.price),
            None => {
                debug!("dropping bid from connection with no joined identity");
                BidOutcome::NotJoined
            }
        };
        counter!("bids_total", "outcome" => outcome_label(outcome)).increment(1);

        if let Some(ack) = ServerEvent::bid_ack(outcome) {
            ctx.send_reply(ack).await?;
        }
        Ok(())
    }
}

/// Closes the active auction immediately.
pub struct EndAuctionHandler;

#[async_trait]
impl CommandHandler for EndAuctionHandler {
    #[instrument(skip(self, _payload, ctx), fields(command = "end-auction"))]
    async fn handle(&self, _payload: Value, ctx: &CommandContext) -> Result<(), CommandError> {
        let _ = ctx.coordinator.end_auction();
        Ok(())
    }
}

/// Clears all auction state back to idle.
pub struct NewAuctionHandler;

#[async_trait]
impl CommandHandler for NewAuctionHandler {
    #[instrument(skip(self, _payload, ctx), fields(command = "new-auction"))]
    async fn handle(&self, _payload: Value, ctx: &CommandContext) -> Result<(), CommandError> {
        ctx.coordinator.reset();
        Ok(())
    }
}

fn outcome_label(outcome: BidOutcome) -> &'static str {
    match outcome {
        BidOutcome::Accepted => "accepted",
        BidOutcome::TooLow => "too_low",
        BidOutcome::Inactive => "inactive",
        BidOutcome::NotJoined => "not_joined",
        BidOutcome::InvalidPrice => "invalid_price",
    }
}
