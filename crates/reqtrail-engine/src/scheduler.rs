//! Debounced diff scheduling.
//!
//! Every edit notification replaces the live snapshot and restarts a
//! quiescence timer. Only a timer that fires uninterrupted runs a diff pass,
//! so a burst of edits costs one pass against the freshest snapshot.
//!
//! Two mechanisms keep stale timers from running: the previous timer task is
//! aborted, and each timer carries the generation it was armed for. Abort is
//! best effort (a timer past its sleep can still be waiting on the state
//! lock), the generation check is not.

use crate::audit::{AuditContext, AuditLogMapper, DeliveryReport};
use chrono::Utc;
use reqtrail_core::diff::detect_changes;
use reqtrail_core::{ChangeSet, ReqTrailError, Result, Snapshot, TrailConfig};
use reqtrail_core_types::PassContext;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Where the scheduler is in its debounce cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerPhase {
    /// No timer armed
    Idle,
    /// A notification arrived and its quiescence window is running
    PendingDiff,
}

struct SchedulerState {
    baseline: Snapshot,
    live: Option<Snapshot>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
    phase: SchedulerPhase,
    last_change_set: Option<ChangeSet>,
    last_processed: Option<Snapshot>,
    passes_run: u64,
}

struct Delivery {
    mapper: AuditLogMapper,
    context: AuditContext,
}

struct Shared {
    config: TrailConfig,
    delivery: Option<Delivery>,
    runtime: Handle,
    state: Mutex<SchedulerState>,
}

/// Work left to do once the state lock is released
type PassOutcome = (ChangeSet, Option<PassContext>);

/// Snapshots claimed for one pass, diffed without holding the state lock
struct PassInput {
    baseline: Snapshot,
    live: Snapshot,
    generation: u64,
}

impl Shared {
    /// Poisoning is ignored: every update leaves the state consistent.
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Take the pending live snapshot for a pass
    fn claim(state: &mut SchedulerState) -> Option<PassInput> {
        let live = state.live.take()?;
        Some(PassInput {
            baseline: state.baseline.clone(),
            live,
            generation: state.generation,
        })
    }

    /// Run one diff pass over a claimed snapshot
    ///
    /// The state lock is only taken to store the result, and the result is
    /// dropped if a notification, cancel or reset arrived while diffing.
    /// Returns the change set and, when it has changes, the pass context to
    /// deliver it under.
    fn run_pass(&self, input: PassInput) -> Option<PassOutcome> {
        let pass = PassContext::new();
        let start = Instant::now();
        reqtrail_core::log_op_start!(
            "diff_pass",
            pass_id = pass.pass_id.as_str(),
            generation = input.generation
        );

        let changes = detect_changes(&input.baseline, &input.live, &self.config, Utc::now());

        reqtrail_core::log_op_end!(
            "diff_pass",
            duration_ms = start.elapsed().as_millis() as u64,
            pass_id = pass.pass_id.as_str(),
            field_changes = changes.field_changes.len(),
            file_changes = changes.file_changes.len(),
            invoice_changes = changes.invoice_changes.len(),
            warnings = changes.warnings.len()
        );

        let mut state = self.lock();
        if state.generation != input.generation {
            tracing::debug!(
                component = module_path!(),
                pass_id = pass.pass_id.as_str(),
                generation = input.generation,
                current = state.generation,
                "superseded pass discarded"
            );
            return None;
        }
        state.phase = SchedulerPhase::Idle;
        state.timer = None;
        state.passes_run += 1;
        state.last_processed = Some(input.live);
        state.last_change_set = Some(changes.clone());
        drop(state);

        let deliver = changes.has_changes.then_some(pass);
        Some((changes, deliver))
    }

    /// Timer callback: run the pass unless a newer notification superseded it
    fn fire(self: &Arc<Self>, generation: u64) -> Option<JoinHandle<DeliveryReport>> {
        let input = {
            let mut state = self.lock();
            if state.generation != generation || state.phase != SchedulerPhase::PendingDiff {
                tracing::debug!(
                    component = module_path!(),
                    generation,
                    current = state.generation,
                    "stale timer ignored"
                );
                return None;
            }
            Self::claim(&mut state)?
        };
        let (changes, pass) = self.run_pass(input)?;
        self.dispatch(changes, pass?)
    }

    /// Hand a change set to the mapper on a detached task
    ///
    /// The task is not tracked, so cancelling or rescheduling later never
    /// interrupts a delivery already under way.
    fn dispatch(
        self: &Arc<Self>,
        changes: ChangeSet,
        pass: PassContext,
    ) -> Option<JoinHandle<DeliveryReport>> {
        self.delivery.as_ref()?;
        let shared = Arc::clone(self);
        Some(self.runtime.spawn(async move {
            match &shared.delivery {
                Some(delivery) => {
                    delivery
                        .mapper
                        .map_for_pass(&delivery.context, &changes, pass)
                        .await
                }
                None => DeliveryReport::default(),
            }
        }))
    }
}

/// Debounced trigger that runs diff passes for one record
///
/// Must be created inside a tokio runtime; timers and deliveries are spawned
/// onto the runtime that was current at construction.
pub struct ChangeScheduler {
    shared: Arc<Shared>,
}

impl ChangeScheduler {
    /// Scheduler that only computes change sets
    ///
    /// # Errors
    ///
    /// - any error from [`TrailConfig::validate`]
    /// - `RuntimeUnavailable` when called outside a tokio runtime
    pub fn new(baseline: Snapshot, config: TrailConfig) -> Result<Self> {
        Self::build(baseline, config, None)
    }

    /// Scheduler that also delivers every non-empty change set to `mapper`
    ///
    /// # Errors
    ///
    /// Same as [`ChangeScheduler::new`].
    pub fn with_audit(
        baseline: Snapshot,
        config: TrailConfig,
        mapper: AuditLogMapper,
        context: AuditContext,
    ) -> Result<Self> {
        Self::build(baseline, config, Some(Delivery { mapper, context }))
    }

    fn build(baseline: Snapshot, config: TrailConfig, delivery: Option<Delivery>) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|e| ReqTrailError::RuntimeUnavailable {
            reason: e.to_string(),
        })?;

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                delivery,
                runtime,
                state: Mutex::new(SchedulerState {
                    baseline,
                    live: None,
                    generation: 0,
                    timer: None,
                    phase: SchedulerPhase::Idle,
                    last_change_set: None,
                    last_processed: None,
                    passes_run: 0,
                }),
            }),
        })
    }

    /// Record an edit and restart the quiescence window
    ///
    /// Returns immediately. The snapshot replaces any earlier pending one and
    /// is read only when the window closes.
    pub fn schedule(&self, live: Snapshot) {
        let mut state = self.shared.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.live = Some(live);
        state.phase = SchedulerPhase::PendingDiff;

        let generation = state.generation;
        let window = self.shared.config.quiescence();
        let shared = Arc::clone(&self.shared);
        state.timer = Some(self.shared.runtime.spawn(async move {
            tokio::time::sleep(window).await;
            // Deliveries run detached; the timer does not wait for them.
            let _ = shared.fire(generation);
        }));
    }

    /// Drop the pending notification, if any, without running a pass
    ///
    /// The last change set is kept.
    pub fn cancel(&self) {
        let mut state = self.shared.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.live = None;
        state.phase = SchedulerPhase::Idle;
    }

    /// Run the pending pass now instead of waiting for the window to close
    ///
    /// Returns `None` when nothing is pending, or when the pending snapshot is
    /// already being diffed by the timer. When the pass finds changes
    /// and an audit mapper is configured, this waits for the delivery, which
    /// still runs on its own task and completes even if this future is
    /// dropped.
    pub async fn flush_now(&self) -> Option<ChangeSet> {
        let input = {
            let mut state = self.shared.lock();
            if state.phase != SchedulerPhase::PendingDiff || state.live.is_none() {
                return None;
            }
            if let Some(timer) = state.timer.take() {
                timer.abort();
            }
            state.generation += 1;
            Shared::claim(&mut state)?
        };
        let (changes, pass) = self.shared.run_pass(input)?;

        if let Some(pass) = pass {
            if let Some(handle) = self.shared.dispatch(changes.clone(), pass) {
                if let Err(e) = handle.await {
                    tracing::warn!(
                        component = module_path!(),
                        error = %e,
                        "audit delivery task did not complete"
                    );
                }
            }
        }
        Some(changes)
    }

    /// Forget the pending notification and the last change set
    ///
    /// Used after the record is saved or reloaded. The sink is not called.
    pub fn reset(&self) {
        let mut state = self.shared.lock();
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        state.generation += 1;
        state.live = None;
        state.phase = SchedulerPhase::Idle;
        state.last_change_set = None;
        state.last_processed = None;
    }

    /// [`reset`](Self::reset) and compare future passes against `baseline`
    pub fn reset_baseline(&self, baseline: Snapshot) {
        self.reset();
        self.shared.lock().baseline = baseline;
    }

    /// Change set of the latest pass, if one ran since the last reset
    pub fn last_change_set(&self) -> Option<ChangeSet> {
        self.shared.lock().last_change_set.clone()
    }

    /// Whether the latest pass found changes
    pub fn has_changes(&self) -> bool {
        self.shared
            .lock()
            .last_change_set
            .as_ref()
            .is_some_and(|c| c.has_changes)
    }

    pub fn phase(&self) -> SchedulerPhase {
        self.shared.lock().phase
    }

    /// Number of passes run since construction
    pub fn passes_run(&self) -> u64 {
        self.shared.lock().passes_run
    }

    /// Live snapshot consumed by the latest pass
    pub fn last_processed(&self) -> Option<Snapshot> {
        self.shared.lock().last_processed.clone()
    }

    pub fn baseline(&self) -> Snapshot {
        self.shared.lock().baseline.clone()
    }

    pub fn config(&self) -> &TrailConfig {
        &self.shared.config
    }
}

impl Drop for ChangeScheduler {
    fn drop(&mut self) {
        if let Some(timer) = self.shared.lock().timer.take() {
            timer.abort();
        }
    }
}
