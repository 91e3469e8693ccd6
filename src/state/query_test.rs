use super::*;

// =============================================================
// Fresh entries
// =============================================================

#[test]
fn new_entry_is_unknown_and_needs_fetch() {
    let entry = QueryEntry::<bool>::default();
    assert_eq!(entry.snapshot().phase(), QueryPhase::Unknown);
    assert!(entry.needs_fetch());
    assert!(!entry.snapshot().resolved_once);
}

#[test]
fn begin_moves_to_loading_and_blocks_duplicate_fetch() {
    let mut entry = QueryEntry::<bool>::default();
    let _ticket = entry.begin();
    assert_eq!(entry.snapshot().phase(), QueryPhase::Loading);
    assert!(!entry.needs_fetch());
}

#[test]
fn resolve_success_stores_value_and_timestamp() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    assert!(entry.resolve(ticket.generation, Ok(true), 42.0));

    let snapshot = entry.snapshot();
    assert_eq!(snapshot.value, Some(true));
    assert_eq!(snapshot.phase(), QueryPhase::Ready);
    assert_eq!(snapshot.last_fetched_at, Some(42.0));
    assert!(snapshot.resolved_once);
    assert!(!snapshot.is_fetching);
    assert!(!entry.needs_fetch());
}

#[test]
fn resolve_error_moves_to_errored_without_retry() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    assert!(entry.resolve(ticket.generation, Err(GatewayError::Server { status: 500 }), 1.0));

    assert_eq!(entry.snapshot().phase(), QueryPhase::Errored);
    assert!(entry.snapshot().resolved_once);
    assert!(!entry.needs_fetch());
}

// =============================================================
// Ordering
// =============================================================

#[test]
fn superseded_fetch_result_is_discarded() {
    let mut entry = QueryEntry::<bool>::default();
    let first = entry.begin();
    let second = entry.begin();

    assert!(!entry.resolve(first.generation, Ok(true), 1.0));
    assert!(entry.snapshot().is_fetching);
    assert!(entry.resolve(second.generation, Ok(false), 2.0));
    assert_eq!(entry.snapshot().value, Some(false));
}

#[test]
fn begin_aborts_previous_request() {
    let mut entry = QueryEntry::<bool>::default();
    let first = entry.begin();
    let _second = entry.begin();

    let aborted = futures::executor::block_on(futures::future::Abortable::new(
        futures::future::pending::<()>(),
        first.registration,
    ));
    assert!(aborted.is_err());
}

#[test]
fn result_in_flight_before_reset_is_discarded() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    entry.reset();

    assert!(!entry.resolve(ticket.generation, Ok(true), 1.0));
    assert_eq!(entry.snapshot().phase(), QueryPhase::Unknown);
}

#[test]
fn cancelled_result_is_dropped() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    assert!(!entry.resolve(ticket.generation, Err(GatewayError::Cancelled), 1.0));
    assert!(entry.snapshot().error.is_none());
}

// =============================================================
// Invalidate / reset / seed
// =============================================================

#[test]
fn invalidate_keeps_displayed_value() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    entry.resolve(ticket.generation, Ok(true), 1.0);

    assert!(entry.invalidate());
    let snapshot = entry.snapshot();
    assert_eq!(snapshot.value, Some(true));
    assert!(snapshot.is_stale);
    assert!(entry.needs_fetch());
}

#[test]
fn invalidate_collapses_into_unissued_fetch() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    entry.resolve(ticket.generation, Ok(true), 1.0);

    assert!(entry.invalidate());
    let refetch = entry.begin();
    assert!(!entry.invalidate(), "second invalidate should reuse the scheduled refetch");
    assert!(entry.resolve(refetch.generation, Ok(false), 2.0));
    assert!(!entry.snapshot().is_stale);
}

#[test]
fn invalidate_supersedes_issued_fetch() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    ticket.issued.set(true);

    assert!(entry.invalidate());
    assert!(!entry.resolve(ticket.generation, Ok(true), 1.0));
}

#[test]
fn reset_clears_value_but_not_resolved_once() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    entry.resolve(ticket.generation, Ok(true), 1.0);

    entry.reset();
    let snapshot = entry.snapshot();
    assert_eq!(snapshot.value, None);
    assert_eq!(snapshot.last_fetched_at, None);
    assert!(snapshot.resolved_once);
    assert!(entry.needs_fetch());
}

#[test]
fn reset_clears_error() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    entry.resolve(ticket.generation, Err(GatewayError::Server { status: 503 }), 1.0);

    entry.reset();
    assert!(entry.snapshot().error.is_none());
    assert_eq!(entry.snapshot().phase(), QueryPhase::Unknown);
}

#[test]
fn seed_sets_value_and_marks_stale() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    entry.seed(true);

    assert!(!entry.resolve(ticket.generation, Ok(false), 1.0));
    let snapshot = entry.snapshot();
    assert_eq!(snapshot.value, Some(true));
    assert!(snapshot.is_stale);
    assert!(snapshot.resolved_once);
}

#[test]
fn cancel_marks_stale_so_next_read_refetches() {
    let mut entry = QueryEntry::<bool>::default();
    let ticket = entry.begin();
    assert!(entry.cancel());

    assert!(!entry.resolve(ticket.generation, Ok(true), 1.0));
    assert!(entry.needs_fetch());
    assert!(!entry.cancel());
}

// =============================================================
// Subscribers
// =============================================================

#[test]
fn subscriber_count_saturates_at_zero() {
    let mut entry = QueryEntry::<bool>::default();
    entry.add_subscriber();
    assert_eq!(entry.remove_subscriber(), 0);
    assert_eq!(entry.remove_subscriber(), 0);
}
