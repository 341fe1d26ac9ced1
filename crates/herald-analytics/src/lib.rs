// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Delivery analytics derived on demand from job history.
//!
//! Nothing here is persisted; every view is computed from the job store's
//! aggregate queries. `sent` consistently counts jobs that reached `sent`
//! or `delivered`.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde::Serialize;

use herald_core::traits::JobStore;
use herald_core::types::{
    AnalyticsSummary, Channel, JobFilter, JobStatus, NotificationJob, OptInRatios,
};
use herald_core::HeraldError;

/// History scan ceiling for time-bucketed views.
const ACTIVITY_SCAN_LIMIT: usize = 10_000;

/// Per-channel delivery performance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelPerformance {
    pub channel: Channel,
    pub sent: u64,
    pub delivered: u64,
    pub failed: u64,
    /// `delivered / sent * 100`; exactly 0 when nothing was sent.
    pub delivery_rate: f64,
}

/// One day's dispatch activity, keyed by the job creation date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyActivity {
    /// ISO date, `YYYY-MM-DD`.
    pub date: String,
    pub sent: u64,
    pub delivered: u64,
    pub failed: u64,
}

/// Computes summary counts, per-channel performance, and time-bucketed
/// activity from job history.
pub struct Analytics {
    store: Arc<dyn JobStore>,
}

impl Analytics {
    pub fn new(store: Arc<dyn JobStore>) -> Self {
        Self { store }
    }

    /// Aggregate view over the filtered job set, plus opt-in ratios over
    /// the recipient set (explicit `true` flags only).
    pub async fn summarize(&self, filter: &JobFilter) -> Result<AnalyticsSummary, HeraldError> {
        let by_status = self.store.count_by_status(filter).await?;
        let by_channel = self.store.count_by_channel(filter).await?;
        let opt_ins = self.store.opt_in_counts().await?;

        let count = |status: JobStatus| by_status.get(&status).copied().unwrap_or(0);
        let ratio = |opted_in: u64| {
            if opt_ins.total_recipients == 0 {
                0.0
            } else {
                opted_in as f64 / opt_ins.total_recipients as f64
            }
        };

        Ok(AnalyticsSummary {
            total_sent: count(JobStatus::Sent) + count(JobStatus::Delivered),
            total_delivered: count(JobStatus::Delivered),
            total_failed: count(JobStatus::Failed),
            by_channel,
            by_status,
            opt_in_ratios: OptInRatios {
                email: ratio(opt_ins.email),
                sms: ratio(opt_ins.sms),
                whatsapp: ratio(opt_ins.whatsapp),
            },
        })
    }

    /// Filtered job history, newest first.
    pub async fn history(
        &self,
        filter: &JobFilter,
        limit: usize,
    ) -> Result<Vec<NotificationJob>, HeraldError> {
        self.store.query_jobs(filter, limit).await
    }

    /// A single job by id.
    pub async fn job(&self, id: &str) -> Result<Option<NotificationJob>, HeraldError> {
        self.store.get_job(id).await
    }

    /// Sent/delivered/failed counters and delivery rate for every channel,
    /// including channels with no traffic.
    pub async fn channel_performance(&self) -> Result<Vec<ChannelPerformance>, HeraldError> {
        let by_channel = self.store.count_by_channel(&JobFilter::default()).await?;

        Ok(Channel::ALL
            .into_iter()
            .map(|channel| {
                let counts = by_channel.get(&channel).copied().unwrap_or_default();
                let delivery_rate = if counts.sent == 0 {
                    0.0
                } else {
                    counts.delivered as f64 / counts.sent as f64 * 100.0
                };
                ChannelPerformance {
                    channel,
                    sent: counts.sent,
                    delivered: counts.delivered,
                    failed: counts.failed,
                    delivery_rate,
                }
            })
            .collect())
    }

    /// Daily dispatch buckets over the trailing `days`, oldest first.
    pub async fn recent_activity(&self, days: u32) -> Result<Vec<DailyActivity>, HeraldError> {
        let filter = JobFilter {
            start: Some(Utc::now() - Duration::days(i64::from(days))),
            ..Default::default()
        };
        let jobs = self.store.query_jobs(&filter, ACTIVITY_SCAN_LIMIT).await?;

        let mut buckets: std::collections::BTreeMap<String, DailyActivity> =
            std::collections::BTreeMap::new();
        for job in jobs {
            let date = job.created_at.format("%Y-%m-%d").to_string();
            let bucket = buckets.entry(date.clone()).or_insert(DailyActivity {
                date,
                sent: 0,
                delivered: 0,
                failed: 0,
            });
            match job.status {
                JobStatus::Sent => bucket.sent += 1,
                JobStatus::Delivered => {
                    bucket.sent += 1;
                    bucket.delivered += 1;
                }
                JobStatus::Failed => bucket.failed += 1,
                _ => {}
            }
        }

        Ok(buckets.into_values().collect())
    }
}
