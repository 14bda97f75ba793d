//! Pending requests and the active trip as shown on the home screen
//!
//! Fetches are numbered. A fetch result is applied only when it is newer
//! than anything applied so far. A local transition counts as applied at
//! the last number issued before its command was dispatched: the worker
//! runs commands in order, so fetches queued ahead of the action are stale
//! and fetches queued behind it already see its outcome.

use crate::models::{Trip, TripAction, TripStatus};

/// Home screen trip state
#[derive(Debug, Default)]
pub struct TripBoard {
    pending: Vec<Trip>,
    active: Option<Trip>,
    selected: usize,
    issued: u64,
    last_applied: u64,
    dispatched_at: Option<u64>,
    loaded: bool,
}

impl TripBoard {
    /// Empty board
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests waiting for a captain
    pub fn pending(&self) -> &[Trip] {
        &self.pending
    }

    /// The trip in hand, if any
    pub const fn active(&self) -> Option<&Trip> {
        self.active.as_ref()
    }

    /// Whether at least one fetch has been applied
    pub const fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Number for a new fetch
    pub fn next_fetch(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// A trip action was just sent to the worker
    pub const fn mark_dispatch(&mut self) {
        self.dispatched_at = Some(self.issued);
    }

    /// Apply a fetch result; returns false when it was stale
    pub fn reconcile(&mut self, seq: u64, pending: Vec<Trip>, active: Option<Trip>) -> bool {
        if seq <= self.last_applied {
            tracing::debug!("Dropping stale trip fetch {} (applied {})", seq, self.last_applied);
            return false;
        }
        self.last_applied = seq;
        self.loaded = true;

        let active = active.filter(|t| !t.status.is_terminal());
        let mut pending = pending;
        pending.retain(|t| t.status == TripStatus::Pending);
        if let Some(active) = &active {
            pending.retain(|t| t.id != active.id);
        }
        let mut seen = std::collections::HashSet::new();
        pending.retain(|t| seen.insert(t.id.clone()));

        self.pending = pending;
        self.active = active;
        self.clamp_selection();
        true
    }

    /// Selected pending request
    pub fn selected(&self) -> Option<&Trip> {
        self.pending.get(self.selected)
    }

    /// Index of the selected pending request
    pub const fn selected_index(&self) -> usize {
        self.selected
    }

    /// Move selection down
    pub fn select_next(&mut self) {
        if !self.pending.is_empty() {
            self.selected = (self.selected + 1).min(self.pending.len() - 1);
        }
    }

    /// Move selection up
    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Trip an action applies to: pending actions target the selection,
    /// the rest target the active trip. `None` when the action is not
    /// offered right now.
    pub fn target(&self, action: TripAction) -> Option<&Trip> {
        let trip = match action {
            TripAction::Accept | TripAction::Reject => self.selected()?,
            TripAction::Start | TripAction::End | TripAction::Cancel => self.active.as_ref()?,
        };
        trip.status.allows(action).then_some(trip)
    }

    /// A request was accepted; `trip` becomes the active trip
    pub fn accepted(&mut self, trip: Trip) {
        self.pending.retain(|t| t.id != trip.id);
        self.active = Some(trip);
        self.local_change();
    }

    /// A request was rejected
    pub fn rejected(&mut self, trip_id: &str) {
        self.pending.retain(|t| t.id != trip_id);
        self.local_change();
    }

    /// The active trip started
    pub fn started(&mut self, trip: Trip) {
        self.active = Some(trip);
        self.local_change();
    }

    /// The active trip ended or was cancelled
    pub fn finished(&mut self, trip_id: &str) {
        if self.active.as_ref().is_some_and(|t| t.id == trip_id) {
            self.active = None;
        }
        self.local_change();
    }

    /// Forget everything, e.g. on logout
    pub fn clear(&mut self) {
        *self = Self {
            issued: self.issued,
            last_applied: self.issued,
            ..Self::default()
        };
    }

    fn local_change(&mut self) {
        let barrier = self.dispatched_at.take().unwrap_or(self.issued);
        self.last_applied = self.last_applied.max(barrier);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.pending.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sample_trip;

    fn pending(ids: &[&str]) -> Vec<Trip> {
        ids.iter()
            .map(|id| sample_trip(id, TripStatus::Pending))
            .collect()
    }

    #[test]
    fn test_accept_single_pending_trip() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        assert!(board.reconcile(seq, pending(&["trip_001"]), None));

        board.accepted(sample_trip("trip_001", TripStatus::Accepted));
        assert!(board.pending().is_empty());
        assert_eq!(board.active().unwrap().id, "trip_001");
        assert_eq!(board.active().unwrap().status, TripStatus::Accepted);
    }

    #[test]
    fn test_accept_from_larger_set() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        board.reconcile(seq, pending(&["t1", "t2", "t3"]), None);
        board.select_next();

        let target = board.target(TripAction::Accept).unwrap().id.clone();
        assert_eq!(target, "t2");
        board.accepted(sample_trip(&target, TripStatus::Accepted));

        let ids: Vec<_> = board.pending().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t1", "t3"]);
        assert_eq!(board.active().unwrap().id, "t2");
    }

    #[test]
    fn test_stale_fetch_is_discarded() {
        let mut board = TripBoard::new();
        let older = board.next_fetch();
        let newer = board.next_fetch();

        assert!(board.reconcile(newer, pending(&["t2"]), None));
        assert!(!board.reconcile(older, pending(&["t1"]), None));
        assert_eq!(board.pending()[0].id, "t2");
    }

    #[test]
    fn test_local_transition_beats_in_flight_fetch() {
        let mut board = TripBoard::new();
        let first = board.next_fetch();
        board.reconcile(first, pending(&["trip_001"]), None);

        // Poll issued, then the captain accepts before it lands
        let in_flight = board.next_fetch();
        board.accepted(sample_trip("trip_001", TripStatus::Accepted));

        assert!(!board.reconcile(in_flight, pending(&["trip_001"]), None));
        assert!(board.pending().is_empty());
        assert!(board.active().is_some());

        let fresh = board.next_fetch();
        assert!(board.reconcile(
            fresh,
            Vec::new(),
            Some(sample_trip("trip_001", TripStatus::Accepted))
        ));
        assert_eq!(board.active().unwrap().id, "trip_001");
    }

    #[test]
    fn test_fetch_queued_behind_action_is_kept() {
        let mut board = TripBoard::new();
        let first = board.next_fetch();
        board.reconcile(first, pending(&["trip_001", "trip_002"]), None);

        let ahead = board.next_fetch();
        board.mark_dispatch();
        let behind = board.next_fetch();
        board.accepted(sample_trip("trip_001", TripStatus::Accepted));

        assert!(!board.reconcile(ahead, pending(&["trip_001", "trip_002"]), None));
        assert!(board.reconcile(
            behind,
            pending(&["trip_002", "trip_003"]),
            Some(sample_trip("trip_001", TripStatus::Accepted))
        ));
        let ids: Vec<_> = board.pending().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["trip_002", "trip_003"]);
        assert_eq!(board.active().unwrap().id, "trip_001");
    }

    #[test]
    fn test_active_never_listed_as_pending() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        board.reconcile(
            seq,
            pending(&["t1", "t2", "t1"]),
            Some(sample_trip("t1", TripStatus::InProgress)),
        );
        let ids: Vec<_> = board.pending().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, ["t2"]);
    }

    #[test]
    fn test_targets_follow_status() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        board.reconcile(seq, Vec::new(), Some(sample_trip("t1", TripStatus::Accepted)));

        assert!(board.target(TripAction::Start).is_some());
        assert!(board.target(TripAction::End).is_none());
        assert!(board.target(TripAction::Cancel).is_none());
        assert!(board.target(TripAction::Accept).is_none());

        board.started(sample_trip("t1", TripStatus::InProgress));
        assert!(board.target(TripAction::End).is_some());
        assert!(board.target(TripAction::Cancel).is_some());
        assert!(board.target(TripAction::Start).is_none());
    }

    #[test]
    fn test_reject_and_finish() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        board.reconcile(
            seq,
            pending(&["t1", "t2"]),
            Some(sample_trip("t9", TripStatus::InProgress)),
        );

        board.rejected("t1");
        assert_eq!(board.pending().len(), 1);
        assert_eq!(board.active().unwrap().id, "t9");

        board.finished("t9");
        assert!(board.active().is_none());
        assert_eq!(board.pending().len(), 1);
    }

    #[test]
    fn test_terminal_active_is_dropped() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        board.reconcile(seq, Vec::new(), Some(sample_trip("t1", TripStatus::Completed)));
        assert!(board.active().is_none());
    }

    #[test]
    fn test_clear_discards_in_flight() {
        let mut board = TripBoard::new();
        let seq = board.next_fetch();
        board.clear();
        assert!(!board.reconcile(seq, pending(&["t1"]), None));
        assert!(!board.is_loaded());
    }
}
