//! The auction coordinator: single owner of all shared auction state.
//!
//! Every operation takes the state lock, applies its transition atomically,
//! and publishes any resulting [`AuctionEvent`] while still holding the
//! lock, so subscribers observe events in exactly the order transitions
//! were applied. Commands racing from many connection tasks serialize on
//! the lock; no transition ever observes another mid-flight.
//!
//! The auto-close timer is a spawned sleep carrying the generation number
//! of the auction it was scheduled for. At fire time it re-checks both the
//! generation and the phase, so a timer from a superseded or already-ended
//! auction is a no-op. Manual end does not cancel the timer; it does not
//! need to.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::auction::{
    AUCTIONEER, AuctionPhase, AuctionRecord, AuctionSnapshot, BidEntry, BidderStats,
};
use crate::events::{AuctionEvent, BidOutcome};

/// Capacity of the domain event channel. Slow subscribers past this lag
/// see `RecvError::Lagged` rather than blocking the coordinator.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Bounds applied to auction parameters at start time.
///
/// These clamp rather than reject: a requested duration outside the bounds
/// is pulled into range and the auction proceeds.
#[derive(Clone, Debug)]
pub struct AuctionLimits {
    /// Shortest allowed auction duration in seconds.
    pub min_time_limit_seconds: u64,
    /// Longest allowed auction duration in seconds.
    pub max_time_limit_seconds: u64,
    /// Maximum retained bid-history entries (0 = unbounded).
    pub history_limit: usize,
}

impl Default for AuctionLimits {
    fn default() -> Self {
        Self {
            min_time_limit_seconds: 1,
            max_time_limit_seconds: 3600,
            history_limit: 0,
        }
    }
}

impl AuctionLimits {
    fn clamp_time_limit(&self, requested: u64) -> u64 {
        requested.clamp(self.min_time_limit_seconds, self.max_time_limit_seconds)
    }
}

/// State guarded by the coordinator's mutex.
struct AuctionState {
    phase: AuctionPhase,
    auction: Option<AuctionRecord>,
    bidders: BTreeMap<String, BidderStats>,
    history: VecDeque<BidEntry>,
    /// Bumped on every start; auto-close timers only act on their own
    /// generation.
    generation: u64,
}

struct CoordinatorInner {
    state: Mutex<AuctionState>,
    events: broadcast::Sender<AuctionEvent>,
    limits: AuctionLimits,
}

/// Cheap-to-clone handle to the shared auction state machine.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

impl Coordinator {
    /// Create an idle coordinator.
    pub fn new(limits: AuctionLimits) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(CoordinatorInner {
                state: Mutex::new(AuctionState {
                    phase: AuctionPhase::Idle,
                    auction: None,
                    bidders: BTreeMap::new(),
                    history: VecDeque::new(),
                    generation: 0,
                }),
                events,
                limits,
            }),
        }
    }

    /// Subscribe to the domain event stream.
    pub fn subscribe(&self) -> broadcast::Receiver<AuctionEvent> {
        self.inner.events.subscribe()
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> AuctionPhase {
        self.inner.state.lock().phase
    }

    /// The record of the currently active auction, if one is running.
    ///
    /// `None` while idle or ended, so late-join replay only happens for a
    /// live auction.
    pub fn current_auction(&self) -> Option<AuctionRecord> {
        let state = self.inner.state.lock();
        if state.phase == AuctionPhase::Active {
            state.auction.clone()
        } else {
            None
        }
    }

    /// Snapshot of the full bid state (highest bid/bidder, stats, history).
    pub fn snapshot(&self) -> AuctionSnapshot {
        snapshot_of(&self.inner.state.lock())
    }

    /// Start a new auction.
    ///
    /// A silent no-op (returns `false`) while another auction is active or
    /// when the starting price is not a positive finite number. On success
    /// the previous bidders and history are cleared, a `Started` event is
    /// published, and the auto-close timer is scheduled.
    pub fn start_auction(
        &self,
        item_name: &str,
        starting_price: f64,
        time_limit_seconds: u64,
    ) -> bool {
        if !starting_price.is_finite() || starting_price <= 0.0 {
            debug!(item_name, starting_price, "ignoring start with invalid price");
            return false;
        }
        let seconds = self.inner.limits.clamp_time_limit(time_limit_seconds);

        let generation = {
            let mut state = self.inner.state.lock();
            if state.phase == AuctionPhase::Active {
                debug!(item_name, "ignoring start while an auction is active");
                return false;
            }
            state.generation += 1;
            let record = AuctionRecord {
                item_name: item_name.to_string(),
                highest_bid: starting_price,
                highest_bidder: AUCTIONEER.to_string(),
                end_timestamp: now_ms() + (seconds as i64) * 1000,
            };
            state.phase = AuctionPhase::Active;
            state.auction = Some(record.clone());
            state.bidders.clear();
            state.history.clear();
            self.publish(AuctionEvent::Started(record));
            state.generation
        };

        info!(
            item = item_name,
            starting_price,
            time_limit_seconds = seconds,
            "auction started"
        );

        let coordinator = self.clone();
        drop(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(seconds)).await;
            coordinator.close_expired(generation);
        }));
        true
    }

    /// Submit a bid on behalf of a joined identity.
    ///
    /// Accepted iff the auction is active and `price` is strictly greater
    /// than the current highest bid; ties lose. Accepted bids update the
    /// record, the bidder's stats, and the history, and publish an
    /// `Updated` event. Rejections and precondition failures change
    /// nothing and publish nothing.
    pub fn submit_bid(&self, name: &str, price: f64) -> BidOutcome {
        if !price.is_finite() {
            debug!(bidder = name, price, "ignoring bid with non-finite price");
            return BidOutcome::InvalidPrice;
        }

        let mut state = self.inner.state.lock();
        if state.phase != AuctionPhase::Active {
            debug!(bidder = name, price, "ignoring bid with no active auction");
            return BidOutcome::Inactive;
        }
        let highest = match state.auction.as_ref() {
            Some(auction) => auction.highest_bid,
            None => return BidOutcome::Inactive,
        };
        if price <= highest {
            debug!(bidder = name, price, highest, "bid rejected, not above highest");
            return BidOutcome::TooLow;
        }

        if let Some(auction) = state.auction.as_mut() {
            auction.highest_bid = price;
            auction.highest_bidder = name.to_string();
        }
        state
            .bidders
            .entry(name.to_string())
            .and_modify(|stats| {
                stats.highest_bid = price;
                stats.bid_count += 1;
            })
            .or_insert(BidderStats {
                highest_bid: price,
                bid_count: 1,
            });
        state.history.push_front(BidEntry {
            name: name.to_string(),
            price,
            timestamp: now_ms(),
        });
        let limit = self.inner.limits.history_limit;
        if limit > 0 {
            state.history.truncate(limit);
        }

        self.publish(AuctionEvent::Updated(snapshot_of(&state)));
        debug!(bidder = name, price, "bid accepted");
        BidOutcome::Accepted
    }

    /// End the active auction now.
    ///
    /// Returns `false` (silently) when no auction is active. The record is
    /// retained until the next start or reset.
    pub fn end_auction(&self) -> bool {
        let mut state = self.inner.state.lock();
        self.finish(&mut state, "manual")
    }

    /// Clear everything back to idle and publish a `Reset` event.
    ///
    /// Unconditional: valid in any phase, matching the tolerant command
    /// semantics of the rest of the protocol.
    pub fn reset(&self) {
        let mut state = self.inner.state.lock();
        state.phase = AuctionPhase::Idle;
        state.auction = None;
        state.bidders.clear();
        state.history.clear();
        self.publish(AuctionEvent::Reset);
        info!("auction state reset");
    }

    /// Timer-driven close. Only acts if the auction it was scheduled for
    /// is still the current one and still active.
    fn close_expired(&self, generation: u64) {
        let mut state = self.inner.state.lock();
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                "stale auto-close timer, ignoring"
            );
            return;
        }
        let _ = self.finish(&mut state, "timer");
    }

    /// Shared close path for manual end and auto-close. Caller holds the
    /// lock.
    fn finish(&self, state: &mut AuctionState, cause: &str) -> bool {
        if state.phase != AuctionPhase::Active {
            return false;
        }
        let Some(auction) = state.auction.as_ref() else {
            return false;
        };
        let winner = auction.highest_bidder.clone();
        let price = auction.highest_bid;
        state.phase = AuctionPhase::Ended;
        self.publish(AuctionEvent::Ended {
            winner: winner.clone(),
            price,
        });
        info!(winner, price, cause, "auction ended");
        true
    }

    /// Publish a domain event. No subscribers is not an error.
    fn publish(&self, event: AuctionEvent) {
        let _ = self.inner.events.send(event);
    }
}

fn snapshot_of(state: &AuctionState) -> AuctionSnapshot {
    let (highest_bid, highest_bidder) = match state.auction.as_ref() {
        Some(auction) => (auction.highest_bid, auction.highest_bidder.clone()),
        None => (0.0, String::new()),
    };
    AuctionSnapshot {
        highest_bid,
        highest_bidder,
        bidders: state.bidders.clone(),
        history: state.history.iter().cloned().collect(),
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use tokio::sync::broadcast::error::TryRecvError;

    fn make_coordinator() -> Coordinator {
        Coordinator::new(AuctionLimits::default())
    }

    // ── StartAuction ────────────────────────────────────────────────

    #[tokio::test]
    async fn start_creates_record_with_starting_price() {
        let coordinator = make_coordinator();
        let before = now_ms();
        assert!(coordinator.start_auction("Vase", 10.0, 5));

        let record = coordinator.current_auction().unwrap();
        assert_eq!(record.item_name, "Vase");
        assert_eq!(record.highest_bid, 10.0);
        assert_eq!(record.highest_bidder, AUCTIONEER);
        assert!(record.end_timestamp >= before + 5000);
        assert_eq!(coordinator.phase(), AuctionPhase::Active);
    }

    #[tokio::test]
    async fn start_publishes_started_event() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 5));

        let event = rx.try_recv().unwrap();
        assert_matches!(event, AuctionEvent::Started(record) => {
            assert_eq!(record.item_name, "Vase");
            assert_eq!(record.highest_bid, 10.0);
        });
    }

    #[tokio::test]
    async fn start_while_active_is_ignored() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        let _ = rx.try_recv().unwrap();

        assert!(!coordinator.start_auction("Lamp", 99.0, 60));

        let record = coordinator.current_auction().unwrap();
        assert_eq!(record.item_name, "Vase");
        assert_eq!(record.highest_bid, 10.0);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn start_with_non_positive_price_is_ignored() {
        let coordinator = make_coordinator();
        assert!(!coordinator.start_auction("Vase", 0.0, 5));
        assert!(!coordinator.start_auction("Vase", -10.0, 5));
        assert!(!coordinator.start_auction("Vase", f64::NAN, 5));
        assert!(!coordinator.start_auction("Vase", f64::INFINITY, 5));
        assert_eq!(coordinator.phase(), AuctionPhase::Idle);
    }

    #[tokio::test]
    async fn start_clears_previous_bidders_and_history() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("First", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        assert!(coordinator.end_auction());

        assert!(coordinator.start_auction("Second", 5.0, 60));
        let snapshot = coordinator.snapshot();
        assert!(snapshot.bidders.is_empty());
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.highest_bid, 5.0);
    }

    #[tokio::test]
    async fn start_from_ended_without_reset_works() {
        // Only an active auction blocks starting; an ended-but-not-reset
        // one is superseded.
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("First", 10.0, 60));
        assert!(coordinator.end_auction());
        assert!(coordinator.start_auction("Second", 20.0, 60));
        assert_eq!(coordinator.current_auction().unwrap().item_name, "Second");
    }

    #[tokio::test]
    async fn start_clamps_time_limit() {
        let coordinator = Coordinator::new(AuctionLimits {
            min_time_limit_seconds: 10,
            max_time_limit_seconds: 60,
            history_limit: 0,
        });
        let before = now_ms();
        assert!(coordinator.start_auction("Vase", 10.0, 0));
        let record = coordinator.current_auction().unwrap();
        // 0 clamps up to the 10s minimum.
        assert!(record.end_timestamp >= before + 10_000);
    }

    // ── SubmitBid ───────────────────────────────────────────────────

    #[tokio::test]
    async fn accepted_bid_raises_highest() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));

        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);

        let record = coordinator.current_auction().unwrap();
        assert_eq!(record.highest_bid, 15.0);
        assert_eq!(record.highest_bidder, "Alice");

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.bidders["Alice"].highest_bid, 15.0);
        assert_eq!(snapshot.bidders["Alice"].bid_count, 1);
        assert_eq!(snapshot.history.len(), 1);
        assert_eq!(snapshot.history[0].price, 15.0);
    }

    #[tokio::test]
    async fn accepted_bid_publishes_update() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        let _ = rx.try_recv().unwrap();

        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);

        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Updated(snapshot) => {
            assert_eq!(snapshot.highest_bid, 15.0);
            assert_eq!(snapshot.highest_bidder, "Alice");
        });
    }

    #[tokio::test]
    async fn equal_bid_is_rejected() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 20.0), BidOutcome::Accepted);

        // Ties lose: 20 is not strictly greater than 20.
        assert_eq!(coordinator.submit_bid("Bob", 20.0), BidOutcome::TooLow);
        assert_eq!(coordinator.current_auction().unwrap().highest_bidder, "Alice");
    }

    #[tokio::test]
    async fn lower_bid_is_rejected() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Bob", 9.99), BidOutcome::TooLow);
    }

    #[tokio::test]
    async fn rejected_bid_leaves_state_untouched() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        let before = coordinator.snapshot();
        while rx.try_recv().is_ok() {}

        assert_eq!(coordinator.submit_bid("Bob", 12.0), BidOutcome::TooLow);

        assert_eq!(coordinator.snapshot(), before);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn bid_with_no_auction_is_inactive() {
        let coordinator = make_coordinator();
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Inactive);
    }

    #[tokio::test]
    async fn bid_after_end_is_inactive() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert!(coordinator.end_auction());
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Inactive);
    }

    #[tokio::test]
    async fn non_finite_bid_is_invalid() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(
            coordinator.submit_bid("Alice", f64::NAN),
            BidOutcome::InvalidPrice
        );
        assert_eq!(
            coordinator.submit_bid("Alice", f64::INFINITY),
            BidOutcome::InvalidPrice
        );
        assert_eq!(coordinator.current_auction().unwrap().highest_bid, 10.0);
    }

    #[tokio::test]
    async fn multiple_bidders_tracked_independently() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        assert_eq!(coordinator.submit_bid("Bob", 20.0), BidOutcome::Accepted);
        assert_eq!(coordinator.submit_bid("Alice", 25.0), BidOutcome::Accepted);

        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.bidders["Alice"].highest_bid, 25.0);
        assert_eq!(snapshot.bidders["Alice"].bid_count, 2);
        assert_eq!(snapshot.bidders["Bob"].highest_bid, 20.0);
        assert_eq!(snapshot.bidders["Bob"].bid_count, 1);
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        assert_eq!(coordinator.submit_bid("Bob", 20.0), BidOutcome::Accepted);
        assert_eq!(coordinator.submit_bid("Alice", 25.0), BidOutcome::Accepted);

        let history = coordinator.snapshot().history;
        let prices: Vec<f64> = history.iter().map(|entry| entry.price).collect();
        assert_eq!(prices, vec![25.0, 20.0, 15.0]);
        assert_eq!(history[0].name, "Alice");
        assert_eq!(history[1].name, "Bob");
    }

    #[tokio::test]
    async fn history_limit_truncates_oldest() {
        let coordinator = Coordinator::new(AuctionLimits {
            history_limit: 2,
            ..AuctionLimits::default()
        });
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        assert_eq!(coordinator.submit_bid("Bob", 20.0), BidOutcome::Accepted);
        assert_eq!(coordinator.submit_bid("Alice", 25.0), BidOutcome::Accepted);

        let prices: Vec<f64> = coordinator
            .snapshot()
            .history
            .iter()
            .map(|entry| entry.price)
            .collect();
        assert_eq!(prices, vec![25.0, 20.0]);
    }

    // ── EndAuction / Reset ──────────────────────────────────────────

    #[tokio::test]
    async fn manual_end_publishes_winner() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        while rx.try_recv().is_ok() {}

        assert!(coordinator.end_auction());

        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Ended { winner, price } => {
            assert_eq!(winner, "Alice");
            assert_eq!(price, 15.0);
        });
        assert_eq!(coordinator.phase(), AuctionPhase::Ended);
    }

    #[tokio::test]
    async fn end_with_no_bids_names_auctioneer() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        let _ = rx.try_recv().unwrap();

        assert!(coordinator.end_auction());
        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Ended { winner, price } => {
            assert_eq!(winner, AUCTIONEER);
            assert_eq!(price, 10.0);
        });
    }

    #[tokio::test]
    async fn end_while_idle_is_noop() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(!coordinator.end_auction());
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn double_end_is_noop() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert!(coordinator.end_auction());
        while rx.try_recv().is_ok() {}

        assert!(!coordinator.end_auction());
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test]
    async fn end_retains_record_until_reset() {
        let coordinator = make_coordinator();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        assert!(coordinator.end_auction());

        // current_auction is gated on Active, but the snapshot still shows
        // the final state.
        assert_eq!(coordinator.current_auction(), None);
        let snapshot = coordinator.snapshot();
        assert_eq!(snapshot.highest_bid, 15.0);
        assert_eq!(snapshot.highest_bidder, "Alice");
    }

    #[tokio::test]
    async fn new_auction_resets_everything() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 60));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        while rx.try_recv().is_ok() {}

        coordinator.reset();

        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Reset);
        assert_eq!(coordinator.phase(), AuctionPhase::Idle);
        assert_eq!(coordinator.current_auction(), None);
        let snapshot = coordinator.snapshot();
        assert!(snapshot.bidders.is_empty());
        assert!(snapshot.history.is_empty());
        assert_eq!(snapshot.highest_bid, 0.0);
    }

    #[tokio::test]
    async fn reset_while_idle_still_broadcasts() {
        // Clients resynchronize on the event even when the server had
        // nothing to clear.
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        coordinator.reset();
        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Reset);
    }

    // ── Auto-close timer ────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn auto_close_fires_after_time_limit() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 5));
        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Ended { winner, price } => {
            assert_eq!(winner, "Alice");
            assert_eq!(price, 15.0);
        });
        assert_eq!(coordinator.phase(), AuctionPhase::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_close_after_manual_end_is_noop() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 5));
        assert!(coordinator.end_auction());
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(coordinator.phase(), AuctionPhase::Ended);
    }

    #[tokio::test(start_paused = true)]
    async fn auto_close_after_reset_is_noop() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("Vase", 10.0, 5));
        coordinator.reset();
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_secs(6)).await;

        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
        assert_eq!(coordinator.phase(), AuctionPhase::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_timer_cannot_end_next_auction() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();
        assert!(coordinator.start_auction("First", 10.0, 5));
        assert!(coordinator.end_auction());
        assert!(coordinator.start_auction("Second", 20.0, 100));
        while rx.try_recv().is_ok() {}

        // The first auction's timer fires at t=5s; the second must survive.
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(coordinator.phase(), AuctionPhase::Active);
        assert_eq!(coordinator.current_auction().unwrap().item_name, "Second");
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
    }

    #[tokio::test(start_paused = true)]
    async fn vase_scenario_end_to_end() {
        let coordinator = make_coordinator();
        let mut rx = coordinator.subscribe();

        assert!(coordinator.start_auction("Vase", 10.0, 5));
        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Started(record) => {
            assert_eq!(record.highest_bid, 10.0);
            assert_eq!(record.highest_bidder, AUCTIONEER);
        });

        assert_eq!(coordinator.submit_bid("Alice", 15.0), BidOutcome::Accepted);
        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Updated(snapshot) => {
            assert_eq!(snapshot.highest_bid, 15.0);
            assert_eq!(snapshot.highest_bidder, "Alice");
            assert_eq!(snapshot.bidders["Alice"].highest_bid, 15.0);
            assert_eq!(snapshot.bidders["Alice"].bid_count, 1);
        });

        assert_eq!(coordinator.submit_bid("Bob", 12.0), BidOutcome::TooLow);
        assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));

        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_matches!(rx.try_recv().unwrap(), AuctionEvent::Ended { winner, price } => {
            assert_eq!(winner, "Alice");
            assert_eq!(price, 15.0);
        });
    }

    // ── Properties ──────────────────────────────────────────────────

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn accepted_bids_strictly_increase(
                prices in proptest::collection::vec(0.0f64..10_000.0, 1..40)
            ) {
                let rt = tokio::runtime::Builder::new_current_thread()
                    .enable_time()
                    .build()
                    .unwrap();
                rt.block_on(async {
                    let coordinator = make_coordinator();
                    prop_assert!(coordinator.start_auction("Lot", 50.0, 3600));
                    let mut highest = 50.0;

                    for (i, price) in prices.iter().enumerate() {
                        let name = format!("bidder-{}", i % 5);
                        match coordinator.submit_bid(&name, *price) {
                            BidOutcome::Accepted => {
                                prop_assert!(*price > highest);
                                highest = *price;
                            }
                            BidOutcome::TooLow => prop_assert!(*price <= highest),
                            other => prop_assert!(false, "unexpected outcome {other:?}"),
                        }
                        let snapshot = coordinator.snapshot();
                        prop_assert_eq!(snapshot.highest_bid, highest);
                        // Every history entry stays within the running maximum,
                        // and newest-first order means strictly decreasing prices.
                        for pair in snapshot.history.windows(2) {
                            prop_assert!(pair[0].price > pair[1].price);
                        }
                        for entry in &snapshot.history {
                            prop_assert!(entry.price <= snapshot.highest_bid);
                        }
                    }
                    Ok(())
                })?;
            }
        }
    }
}
