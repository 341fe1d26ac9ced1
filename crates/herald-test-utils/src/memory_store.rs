// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`JobStore`] for tests.
//!
//! Mirrors the SQLite store's observable behavior (due ordering, filter
//! semantics, NotFound on unknown ids) without touching disk.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use herald_core::traits::JobStore;
use herald_core::types::{
    Channel, ChannelCounts, JobFilter, JobStatus, JobStatusUpdate, NotificationJob, OptInCounts,
    OptInUpdate, Recipient,
};
use herald_core::HeraldError;

/// HashMap-backed job store.
#[derive(Default)]
pub struct MemoryStore {
    recipients: Mutex<HashMap<String, Recipient>>,
    jobs: Mutex<HashMap<String, NotificationJob>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every stored job, unordered. Test-only convenience.
    pub async fn all_jobs(&self) -> Vec<NotificationJob> {
        self.jobs.lock().await.values().cloned().collect()
    }
}

fn matches(job: &NotificationJob, filter: &JobFilter) -> bool {
    if filter.channel.is_some_and(|c| c != job.channel) {
        return false;
    }
    if filter.status.is_some_and(|s| s != job.status) {
        return false;
    }
    if filter
        .template_id
        .as_ref()
        .is_some_and(|t| *t != job.template_id)
    {
        return false;
    }
    if filter
        .recipient_id
        .as_ref()
        .is_some_and(|r| *r != job.recipient_id)
    {
        return false;
    }
    if filter.start.is_some_and(|start| job.created_at < start) {
        return false;
    }
    if filter.end.is_some_and(|end| job.created_at > end) {
        return false;
    }
    true
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn save_recipient(&self, recipient: &Recipient) -> Result<(), HeraldError> {
        self.recipients
            .lock()
            .await
            .insert(recipient.id.clone(), recipient.clone());
        Ok(())
    }

    async fn get_recipient(&self, id: &str) -> Result<Option<Recipient>, HeraldError> {
        Ok(self.recipients.lock().await.get(id).cloned())
    }

    async fn all_recipients(&self) -> Result<Vec<Recipient>, HeraldError> {
        let mut recipients: Vec<Recipient> =
            self.recipients.lock().await.values().cloned().collect();
        recipients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(recipients)
    }

    async fn update_opt_ins(&self, id: &str, update: OptInUpdate) -> Result<(), HeraldError> {
        let mut recipients = self.recipients.lock().await;
        let recipient = recipients.get_mut(id).ok_or_else(|| HeraldError::NotFound {
            kind: "recipient",
            id: id.to_string(),
        })?;
        if let Some(email) = update.email {
            recipient.opt_ins.email = Some(email);
        }
        if let Some(sms) = update.sms {
            recipient.opt_ins.sms = Some(sms);
        }
        if let Some(whatsapp) = update.whatsapp {
            recipient.opt_ins.whatsapp = Some(whatsapp);
        }
        recipient.updated_at = Utc::now();
        Ok(())
    }

    async fn save_job(&self, job: &NotificationJob) -> Result<(), HeraldError> {
        self.jobs.lock().await.insert(job.id.clone(), job.clone());
        Ok(())
    }

    async fn get_job(&self, id: &str) -> Result<Option<NotificationJob>, HeraldError> {
        Ok(self.jobs.lock().await.get(id).cloned())
    }

    async fn due_jobs(&self, limit: usize) -> Result<Vec<NotificationJob>, HeraldError> {
        let now = Utc::now();
        let mut due: Vec<NotificationJob> = self
            .jobs
            .lock()
            .await
            .values()
            .filter(|j| {
                matches!(j.status, JobStatus::Pending | JobStatus::Queued)
                    && j.scheduled_for <= now
            })
            .cloned()
            .collect();
        due.sort_by(|a, b| {
            a.priority
                .rank()
                .cmp(&b.priority.rank())
                .then(a.scheduled_for.cmp(&b.scheduled_for))
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        due.truncate(limit);
        Ok(due)
    }

    async fn update_job_status(
        &self,
        id: &str,
        status: JobStatus,
        update: JobStatusUpdate,
    ) -> Result<(), HeraldError> {
        let mut jobs = self.jobs.lock().await;
        let job = jobs.get_mut(id).ok_or_else(|| HeraldError::NotFound {
            kind: "job",
            id: id.to_string(),
        })?;
        job.status = status;
        if let Some(sent_at) = update.sent_at {
            job.sent_at = Some(sent_at);
        }
        if let Some(delivered_at) = update.delivered_at {
            job.delivered_at = Some(delivered_at);
        }
        if let Some(failed_at) = update.failed_at {
            job.failed_at = Some(failed_at);
        }
        if let Some(error_message) = update.error_message {
            job.error_message = Some(error_message);
        }
        if let Some(retry_count) = update.retry_count {
            job.retry_count = retry_count;
        }
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn query_jobs(
        &self,
        filter: &JobFilter,
        limit: usize,
    ) -> Result<Vec<NotificationJob>, HeraldError> {
        let mut jobs: Vec<NotificationJob> = self
            .jobs
            .lock()
            .await
            .values()
            .filter(|j| matches(j, filter))
            .cloned()
            .collect();
        jobs.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        jobs.truncate(limit);
        Ok(jobs)
    }

    async fn count_by_status(
        &self,
        filter: &JobFilter,
    ) -> Result<HashMap<JobStatus, u64>, HeraldError> {
        let mut counts = HashMap::new();
        for job in self.jobs.lock().await.values() {
            if matches(job, filter) {
                *counts.entry(job.status).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }

    async fn count_by_channel(
        &self,
        filter: &JobFilter,
    ) -> Result<HashMap<Channel, ChannelCounts>, HeraldError> {
        let mut counts: HashMap<Channel, ChannelCounts> = HashMap::new();
        for job in self.jobs.lock().await.values() {
            if !matches(job, filter) {
                continue;
            }
            let entry = counts.entry(job.channel).or_default();
            match job.status {
                JobStatus::Sent => entry.sent += 1,
                JobStatus::Delivered => {
                    entry.sent += 1;
                    entry.delivered += 1;
                }
                JobStatus::Failed => entry.failed += 1,
                _ => {}
            }
        }
        Ok(counts)
    }

    async fn opt_in_counts(&self) -> Result<OptInCounts, HeraldError> {
        let recipients = self.recipients.lock().await;
        let mut counts = OptInCounts {
            total_recipients: recipients.len() as u64,
            ..Default::default()
        };
        for recipient in recipients.values() {
            if recipient.opt_ins.email == Some(true) {
                counts.email += 1;
            }
            if recipient.opt_ins.sms == Some(true) {
                counts.sms += 1;
            }
            if recipient.opt_ins.whatsapp == Some(true) {
                counts.whatsapp += 1;
            }
        }
        Ok(counts)
    }
}
