// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! [`JobStore`] implementation over the SQLite database.

use std::collections::HashMap;

use async_trait::async_trait;
use herald_core::traits::JobStore;
use herald_core::types::{
    Channel, ChannelCounts, JobFilter, JobStatus, JobStatusUpdate, NotificationJob, OptInCounts,
    OptInUpdate, Recipient,
};
use herald_core::HeraldError;

use crate::database::Database;
use crate::queries;

#[async_trait]
impl JobStore for Database {
    async fn save_recipient(&self, recipient: &Recipient) -> Result<(), HeraldError> {
        queries::recipients::save(self, recipient).await
    }

    async fn get_recipient(&self, id: &str) -> Result<Option<Recipient>, HeraldError> {
        queries::recipients::get(self, id).await
    }

    async fn all_recipients(&self) -> Result<Vec<Recipient>, HeraldError> {
        queries::recipients::all(self).await
    }

    async fn update_opt_ins(&self, id: &str, update: OptInUpdate) -> Result<(), HeraldError> {
        queries::recipients::update_opt_ins(self, id, update).await
    }

    async fn save_job(&self, job: &NotificationJob) -> Result<(), HeraldError> {
        queries::jobs::save(self, job).await
    }

    async fn get_job(&self, id: &str) -> Result<Option<NotificationJob>, HeraldError> {
        queries::jobs::get(self, id).await
    }

    async fn due_jobs(&self, limit: usize) -> Result<Vec<NotificationJob>, HeraldError> {
        queries::jobs::due(self, limit).await
    }

    async fn update_job_status(
        &self,
        id: &str,
        status: JobStatus,
        update: JobStatusUpdate,
    ) -> Result<(), HeraldError> {
        queries::jobs::update_status(self, id, status, update).await
    }

    async fn query_jobs(
        &self,
        filter: &JobFilter,
        limit: usize,
    ) -> Result<Vec<NotificationJob>, HeraldError> {
        queries::jobs::query(self, filter, limit).await
    }

    async fn count_by_status(
        &self,
        filter: &JobFilter,
    ) -> Result<HashMap<JobStatus, u64>, HeraldError> {
        queries::jobs::count_by_status(self, filter).await
    }

    async fn count_by_channel(
        &self,
        filter: &JobFilter,
    ) -> Result<HashMap<Channel, ChannelCounts>, HeraldError> {
        queries::jobs::count_by_channel(self, filter).await
    }

    async fn opt_in_counts(&self) -> Result<OptInCounts, HeraldError> {
        queries::recipients::opt_in_counts(self).await
    }
}
