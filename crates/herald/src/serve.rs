// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Component wiring and the serve/process-now/stats entry points.
//!
//! Everything is constructed explicitly here and passed by handle: store,
//! template registry, channel registry, orchestrator, scheduler. No
//! process-wide singletons.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use herald_analytics::Analytics;
use herald_channels::{EmailAdapter, SmsAdapter, WhatsAppAdapter};
use herald_config::HeraldConfig;
use herald_core::traits::JobStore;
use herald_core::types::JobFilter;
use herald_core::HeraldError;
use herald_engine::{
    ChannelRegistry, OptInGate, OptInPolicy, Orchestrator, OrchestratorConfig, RetryPolicy,
};
use herald_scheduler::Scheduler;
use herald_storage::Database;
use herald_template::TemplateRegistry;

/// Open the store and assemble the orchestrator with all three channel
/// adapters registered.
pub async fn build_orchestrator(
    config: &HeraldConfig,
) -> Result<(Arc<Database>, Arc<Orchestrator>), HeraldError> {
    let store = Arc::new(Database::open(&config.storage.database_path).await?);

    let templates = Arc::new(TemplateRegistry::with_builtins());

    let mut channels = ChannelRegistry::new();
    channels.register(Arc::new(EmailAdapter::new(config.email.clone())?));
    channels.register(Arc::new(SmsAdapter::new(config.sms.clone())));
    channels.register(Arc::new(WhatsAppAdapter::new(config.whatsapp.clone())));

    let orchestrator = Orchestrator::new(
        store.clone(),
        templates,
        Arc::new(channels),
        OptInGate::new(OptInPolicy::from_assume_flag(
            config.optin.assume_opted_in_when_absent,
        )),
        OrchestratorConfig {
            max_retries: config.retry.max_retries,
            retry: RetryPolicy {
                transient_attempts: config.retry.transient_attempts,
                base_delay: Duration::from_millis(config.retry.transient_base_ms),
            },
            inter_job_pause: Duration::from_millis(config.scheduler.inter_job_pause_ms),
            optimistic_delivery: config.delivery.optimistic,
            delivery_grace: Duration::from_secs(config.delivery.grace_secs),
        },
    );

    Ok((store, Arc::new(orchestrator)))
}

/// Run the scheduler until Ctrl-C.
pub async fn run(config: HeraldConfig) -> Result<(), HeraldError> {
    let (_store, orchestrator) = build_orchestrator(&config).await?;
    let scheduler = Scheduler::new(
        orchestrator,
        Duration::from_secs(config.scheduler.tick_interval_secs),
        config.scheduler.batch_size,
    );

    scheduler.start().await;
    info!("herald serving; press Ctrl-C to stop");

    tokio::signal::ctrl_c()
        .await
        .map_err(|e| HeraldError::Internal(format!("signal handler failed: {e}")))?;

    scheduler.stop().await;
    Ok(())
}

/// Drain due jobs once and exit.
pub async fn process_now(config: HeraldConfig) -> Result<(), HeraldError> {
    let batch_size = config.scheduler.batch_size;
    let (_store, orchestrator) = build_orchestrator(&config).await?;
    let processed = orchestrator.process_due(batch_size).await?;
    info!(processed, "one-shot processing complete");
    Ok(())
}

/// Print summary counts and per-channel performance.
pub async fn stats(config: HeraldConfig) -> Result<(), HeraldError> {
    let store: Arc<dyn JobStore> = Arc::new(Database::open(&config.storage.database_path).await?);
    let analytics = Analytics::new(store);

    let summary = analytics.summarize(&JobFilter::default()).await?;
    println!(
        "totals: sent={} delivered={} failed={}",
        summary.total_sent, summary.total_delivered, summary.total_failed
    );
    println!(
        "opt-in ratios: email={:.0}% sms={:.0}% whatsapp={:.0}%",
        summary.opt_in_ratios.email * 100.0,
        summary.opt_in_ratios.sms * 100.0,
        summary.opt_in_ratios.whatsapp * 100.0
    );
    for entry in analytics.channel_performance().await? {
        println!(
            "{:<9} sent={:<5} delivered={:<5} failed={:<5} delivery_rate={:.1}%",
            entry.channel.to_string(),
            entry.sent,
            entry.delivered,
            entry.failed,
            entry.delivery_rate
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_config::load_config_from_str;
    use tempfile::tempdir;

    #[tokio::test]
    async fn default_wiring_builds_and_processes() {
        let dir = tempdir().unwrap();
        let toml = format!(
            "[storage]\ndatabase_path = \"{}\"\n",
            dir.path().join("herald.db").display()
        );
        let config = load_config_from_str(&toml).unwrap();

        let (_store, orchestrator) = build_orchestrator(&config).await.unwrap();
        // Empty store: nothing due, nothing to do.
        let processed = orchestrator.process_due(config.scheduler.batch_size).await.unwrap();
        assert_eq!(processed, 0);
    }
}
