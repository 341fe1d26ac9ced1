// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Job store trait for persistence backends.

use async_trait::async_trait;

use crate::error::HeraldError;
use crate::types::{
    Channel, ChannelCounts, JobFilter, JobStatus, JobStatusUpdate, NotificationJob, OptInCounts,
    OptInUpdate, Recipient,
};
use std::collections::HashMap;

/// The narrow persistence surface the notification core depends on.
///
/// Jobs are never deleted; history is retained for analytics. Recipient and
/// template CRUD beyond what is listed here belongs to out-of-scope
/// collaborators.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or replace a recipient record.
    async fn save_recipient(&self, recipient: &Recipient) -> Result<(), HeraldError>;

    async fn get_recipient(&self, id: &str) -> Result<Option<Recipient>, HeraldError>;

    async fn all_recipients(&self) -> Result<Vec<Recipient>, HeraldError>;

    /// Apply a partial opt-in update; absent fields are left untouched.
    async fn update_opt_ins(&self, id: &str, update: OptInUpdate) -> Result<(), HeraldError>;

    /// Insert or replace a job record.
    async fn save_job(&self, job: &NotificationJob) -> Result<(), HeraldError>;

    async fn get_job(&self, id: &str) -> Result<Option<NotificationJob>, HeraldError>;

    /// Jobs with status `pending` or `queued` whose `scheduled_for` has
    /// passed, ordered by priority rank, then `scheduled_for`, then id.
    async fn due_jobs(&self, limit: usize) -> Result<Vec<NotificationJob>, HeraldError>;

    /// Persist a status change plus any accompanying timestamp/error fields.
    ///
    /// `updated_at` is stamped by the store. The store does not police the
    /// state machine; the orchestrator is the only writer of job state.
    async fn update_job_status(
        &self,
        id: &str,
        status: JobStatus,
        update: JobStatusUpdate,
    ) -> Result<(), HeraldError>;

    /// Filtered history, newest first.
    async fn query_jobs(
        &self,
        filter: &JobFilter,
        limit: usize,
    ) -> Result<Vec<NotificationJob>, HeraldError>;

    /// Job counts grouped by status over the filtered set.
    async fn count_by_status(
        &self,
        filter: &JobFilter,
    ) -> Result<HashMap<JobStatus, u64>, HeraldError>;

    /// Sent/delivered/failed counters grouped by channel over the filtered set.
    async fn count_by_channel(
        &self,
        filter: &JobFilter,
    ) -> Result<HashMap<Channel, ChannelCounts>, HeraldError>;

    /// Explicit opt-in tallies over the whole recipient set.
    async fn opt_in_counts(&self) -> Result<OptInCounts, HeraldError>;
}
