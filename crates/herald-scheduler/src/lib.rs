// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Periodic scheduler driving the notification orchestrator.
//!
//! A single coordinator ticks on a fixed interval and feeds due jobs to
//! [`Orchestrator::process_due`]. The on-demand trigger runs the identical
//! selection-and-dispatch path, so the atomic `queued` claim is enforced in
//! exactly one routine.

use std::sync::Arc;
use std::time::Duration;

use herald_core::HeraldError;
use herald_engine::Orchestrator;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Periodic coordinator with an on-demand trigger.
pub struct Scheduler {
    orchestrator: Arc<Orchestrator>,
    tick_interval: Duration,
    batch_size: usize,
    loop_state: Mutex<Option<(CancellationToken, JoinHandle<()>)>>,
}

impl Scheduler {
    pub fn new(orchestrator: Arc<Orchestrator>, tick_interval: Duration, batch_size: usize) -> Self {
        Self {
            orchestrator,
            tick_interval,
            batch_size,
            loop_state: Mutex::new(None),
        }
    }

    /// Start the periodic loop. Idempotent; the first tick fires
    /// immediately, then every `tick_interval`.
    pub async fn start(&self) {
        let mut state = self.loop_state.lock().await;
        if state.is_some() {
            debug!("scheduler already running");
            return;
        }

        let token = CancellationToken::new();
        let child = token.clone();
        let orchestrator = self.orchestrator.clone();
        let tick_interval = self.tick_interval;
        let batch_size = self.batch_size;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick_interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = interval.tick() => {
                        // A failed tick must not kill the loop.
                        if let Err(err) = orchestrator.process_due(batch_size).await {
                            error!(error = %err, "scheduler tick failed");
                        }
                    }
                }
            }
            debug!("scheduler loop exited");
        });

        *state = Some((token, handle));
        info!(
            tick_interval_secs = tick_interval.as_secs(),
            batch_size, "scheduler started"
        );
    }

    /// Stop the periodic loop and wait for it to wind down. Idempotent.
    pub async fn stop(&self) {
        let state = self.loop_state.lock().await.take();
        if let Some((token, handle)) = state {
            token.cancel();
            if let Err(err) = handle.await {
                error!(error = %err, "scheduler loop join failed");
            }
            info!("scheduler stopped");
        }
    }

    /// Process due jobs right now, outside the periodic cadence. Runs the
    /// same claim-and-dispatch routine as the tick. Returns the number of
    /// jobs processed.
    pub async fn process_now(&self) -> Result<usize, HeraldError> {
        debug!("on-demand processing triggered");
        self.orchestrator.process_due(self.batch_size).await
    }

    pub async fn is_running(&self) -> bool {
        self.loop_state.lock().await.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::traits::JobStore;
    use herald_core::types::{Channel, JobStatus, Priority, SendRequest};
    use herald_engine::{
        ChannelRegistry, OptInGate, OptInPolicy, OrchestratorConfig, RetryPolicy,
    };
    use herald_template::TemplateRegistry;
    use herald_test_utils::{fixtures, MemoryStore, MockChannel};
    use std::collections::HashMap;

    fn build() -> (Arc<MemoryStore>, Arc<Orchestrator>) {
        let store = Arc::new(MemoryStore::new());

        let templates = Arc::new(TemplateRegistry::new());
        templates.add(fixtures::template("greeting", Channel::Email));

        let mut registry = ChannelRegistry::new();
        registry.register(Arc::new(MockChannel::new(Channel::Email)));

        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            templates,
            Arc::new(registry),
            OptInGate::new(OptInPolicy::RequireExplicit),
            OrchestratorConfig {
                retry: RetryPolicy::none(),
                inter_job_pause: Duration::ZERO,
                ..Default::default()
            },
        ));
        (store, orchestrator)
    }

    async fn create_job(orchestrator: &Orchestrator) -> String {
        let receipt = orchestrator
            .send(SendRequest {
                template_id: "greeting".into(),
                channels: vec![Channel::Email],
                recipient: fixtures::recipient("r1"),
                variables: HashMap::from([("name".to_string(), "Ana".to_string())]),
                scheduled_for: None,
                priority: Priority::Normal,
            })
            .await
            .unwrap();
        receipt.job_ids[0].clone()
    }

    #[tokio::test]
    async fn process_now_dispatches_due_jobs() {
        let (store, orchestrator) = build();
        let scheduler = Scheduler::new(orchestrator.clone(), Duration::from_secs(3600), 50);

        let job_id = create_job(&orchestrator).await;
        let processed = scheduler.process_now().await.unwrap();
        assert_eq!(processed, 1);

        let job = store.get_job(&job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Sent);
    }

    #[tokio::test]
    async fn periodic_tick_picks_up_due_work() {
        let (store, orchestrator) = build();
        let scheduler = Scheduler::new(orchestrator.clone(), Duration::from_millis(10), 50);

        let job_id = create_job(&orchestrator).await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        // The first tick fires immediately; give the loop a moment.
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.stop().await;
        assert!(!scheduler.is_running().await);

        let job = store.get_job(&job_id).await.unwrap().unwrap();
        assert_eq!(job.status, JobStatus::Sent);
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let (_store, orchestrator) = build();
        let scheduler = Scheduler::new(orchestrator, Duration::from_millis(50), 50);

        scheduler.start().await;
        scheduler.start().await;
        assert!(scheduler.is_running().await);

        scheduler.stop().await;
        scheduler.stop().await;
        assert!(!scheduler.is_running().await);
    }
}
