//! Debounce behaviour of the change scheduler, on paused tokio time.

mod common;

use common::{request, CountingResolver, RecordingSink};
use reqtrail_core::{FieldValue, TrailConfig};
use reqtrail_engine::{AuditContext, AuditGroup, AuditLogMapper, ChangeScheduler, SchedulerPhase};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;

const WINDOW: Duration = Duration::from_millis(500);

fn audited(sink: Arc<RecordingSink>) -> ChangeScheduler {
    let mapper = AuditLogMapper::new(sink, Arc::new(CountingResolver::default()));
    ChangeScheduler::with_audit(
        request("Hack Night"),
        TrailConfig::event_request(),
        mapper,
        AuditContext::new("req-1", "u-7"),
    )
    .unwrap()
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_runs_one_pass_with_last_snapshot() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    for name in ["Hack Night 2", "Hack Night 20", "Hack Night 202", "Hack Night 2026"] {
        scheduler.schedule(request(name));
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(scheduler.passes_run(), 0, "window keeps restarting");
    assert_eq!(scheduler.phase(), SchedulerPhase::PendingDiff);

    sleep(WINDOW).await;

    assert_eq!(scheduler.passes_run(), 1);
    assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    assert_eq!(scheduler.last_processed(), Some(request("Hack Night 2026")));

    let changes = scheduler.last_change_set().unwrap();
    assert_eq!(changes.field_changes.len(), 1);
    assert_eq!(
        changes.field_changes[0].new_value,
        FieldValue::Text("Hack Night 2026".to_string())
    );

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].group, AuditGroup::Field);
    assert_eq!(calls[0].entries[0]["new_display"], "Hack Night 2026");
}

#[tokio::test(start_paused = true)]
async fn test_edits_in_separate_windows_run_separate_passes() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("A"));
    sleep(WINDOW + Duration::from_millis(10)).await;
    scheduler.schedule(request("B"));
    sleep(WINDOW + Duration::from_millis(10)).await;

    assert_eq!(scheduler.passes_run(), 2);
    assert_eq!(sink.calls().len(), 2);
    // Both passes compare against the original baseline.
    let second = &sink.calls()[1];
    assert_eq!(second.entries[0]["old_display"], "Hack Night");
    assert_eq!(second.entries[0]["new_display"], "B");
}

#[tokio::test(start_paused = true)]
async fn test_pass_without_changes_does_not_call_sink() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("Hack Night"));
    sleep(WINDOW * 2).await;

    assert_eq!(scheduler.passes_run(), 1);
    assert!(!scheduler.has_changes());
    assert!(scheduler.last_change_set().is_some());
    assert!(sink.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_cancel_drops_pending_pass() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("Renamed"));
    sleep(Duration::from_millis(200)).await;
    scheduler.cancel();
    assert_eq!(scheduler.phase(), SchedulerPhase::Idle);

    sleep(WINDOW * 2).await;
    assert_eq!(scheduler.passes_run(), 0);
    assert!(scheduler.last_change_set().is_none());
    assert!(sink.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_state_without_sink_call() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("Renamed"));
    sleep(WINDOW * 2).await;
    assert!(scheduler.has_changes());
    assert_eq!(sink.calls().len(), 1);

    scheduler.schedule(request("Renamed again"));
    scheduler.reset();
    sleep(WINDOW * 2).await;

    assert!(!scheduler.has_changes());
    assert!(scheduler.last_change_set().is_none());
    assert!(scheduler.last_processed().is_none());
    assert_eq!(scheduler.passes_run(), 1);
    assert_eq!(sink.calls().len(), 1, "reset never reaches the sink");
}

#[tokio::test(start_paused = true)]
async fn test_reset_baseline_compares_against_saved_state() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    scheduler.reset_baseline(request("Saved"));
    scheduler.schedule(request("Saved"));
    sleep(WINDOW * 2).await;

    assert_eq!(scheduler.passes_run(), 1);
    assert!(!scheduler.has_changes());
    assert_eq!(scheduler.baseline(), request("Saved"));
}

#[tokio::test(start_paused = true)]
async fn test_flush_now_runs_pending_pass_immediately() {
    let sink = Arc::new(RecordingSink::new());
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("Flushed"));
    let changes = scheduler.flush_now().await.unwrap();

    assert!(changes.has_changes);
    assert_eq!(scheduler.phase(), SchedulerPhase::Idle);
    assert_eq!(sink.calls().len(), 1, "flush waits for delivery");

    sleep(WINDOW * 2).await;
    assert_eq!(scheduler.passes_run(), 1, "the armed timer must not run again");
    assert_eq!(sink.calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reschedule_does_not_cancel_delivery_in_flight() {
    let sink = Arc::new(RecordingSink::slow(Duration::from_secs(2)));
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("First"));
    sleep(WINDOW + Duration::from_millis(10)).await;
    assert_eq!(scheduler.passes_run(), 1);
    assert!(sink.calls().is_empty(), "delivery still in progress");

    scheduler.schedule(request("Second"));
    scheduler.cancel();
    sleep(Duration::from_secs(3)).await;

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].entries[0]["new_display"], "First");
}

#[tokio::test(start_paused = true)]
async fn test_failing_sink_does_not_disturb_scheduling() {
    let sink = Arc::new(RecordingSink::failing_on(&[AuditGroup::Field]));
    let scheduler = audited(sink.clone());

    scheduler.schedule(request("One"));
    sleep(WINDOW * 2).await;
    scheduler.schedule(request("Two"));
    sleep(WINDOW * 2).await;

    assert_eq!(scheduler.passes_run(), 2);
    assert_eq!(sink.calls().len(), 2);
    assert!(scheduler.has_changes());
}

#[tokio::test(start_paused = true)]
async fn test_custom_window_from_config() {
    let config = TrailConfig {
        quiescence_ms: 2_000,
        ..TrailConfig::event_request()
    };
    let scheduler = ChangeScheduler::new(request("Hack Night"), config).unwrap();

    scheduler.schedule(request("Slow"));
    sleep(Duration::from_millis(1_500)).await;
    assert_eq!(scheduler.passes_run(), 0);
    sleep(Duration::from_millis(600)).await;
    assert_eq!(scheduler.passes_run(), 1);
    assert_eq!(scheduler.config().quiescence_ms, 2_000);
}
