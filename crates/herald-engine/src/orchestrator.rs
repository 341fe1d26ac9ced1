// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification orchestrator: job creation, claim-and-dispatch, layered
//! retry, cancellation, and optimistic delivery confirmation.
//!
//! The orchestrator is the only writer of job state. Both the periodic
//! scheduler and the on-demand trigger funnel through
//! [`Orchestrator::process_due`], so the atomic `queued` claim is enforced
//! in one place.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use herald_core::traits::{JobStore, TemplateSource};
use herald_core::types::{
    BulkSendRequest, ChannelRejection, JobFilter, JobStatus, JobStatusUpdate, NotificationJob,
    RejectionReason, SendReceipt, SendRequest, DEFAULT_MAX_RETRIES,
};
use herald_core::HeraldError;
use herald_template::render;

use crate::gate::OptInGate;
use crate::registry::ChannelRegistry;
use crate::retry::{send_with_retry, RetryPolicy};

/// Tuning knobs for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Durable retry slots assigned to each new job.
    pub max_retries: u32,
    /// Immediate (in-call) retry bounds for transient provider errors.
    pub retry: RetryPolicy,
    /// Pause between jobs within one processing pass.
    pub inter_job_pause: Duration,
    /// Promote `sent` jobs to `delivered` after the grace period.
    pub optimistic_delivery: bool,
    /// How long a job must have been `sent` before promotion.
    pub delivery_grace: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            retry: RetryPolicy::default(),
            inter_job_pause: Duration::from_millis(100),
            optimistic_delivery: false,
            delivery_grace: Duration::from_secs(60),
        }
    }
}

/// Creates jobs, enforces opt-in, invokes channel adapters, applies retry
/// policy, and updates job state.
pub struct Orchestrator {
    store: Arc<dyn JobStore>,
    templates: Arc<dyn TemplateSource>,
    channels: Arc<ChannelRegistry>,
    gate: OptInGate,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        store: Arc<dyn JobStore>,
        templates: Arc<dyn TemplateSource>,
        channels: Arc<ChannelRegistry>,
        gate: OptInGate,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            store,
            templates,
            channels,
            gate,
            config,
        }
    }

    /// Create one `pending` job per permitted channel.
    ///
    /// Per-channel denials (opt-in, contact, template support) are reported
    /// in the receipt without aborting sibling channels. A channel with no
    /// registered adapter is a wiring error and fails the whole request.
    pub async fn send(&self, request: SendRequest) -> Result<SendReceipt, HeraldError> {
        let template = self
            .templates
            .get_template(&request.template_id)
            .ok_or_else(|| HeraldError::NotFound {
                kind: "template",
                id: request.template_id.clone(),
            })?;

        for &channel in &request.channels {
            if !self.channels.contains(channel) {
                return Err(HeraldError::ChannelNotConfigured { channel });
            }
        }

        let mut recipient = request.recipient.clone();
        if recipient.id.is_empty() {
            recipient.id = Uuid::new_v4().to_string();
        }
        self.store.save_recipient(&recipient).await?;

        let now = Utc::now();
        let scheduled_for = request.scheduled_for.unwrap_or(now);
        let mut receipt = SendReceipt::default();

        for &channel in &request.channels {
            if template.channel != channel {
                receipt.rejections.push(ChannelRejection {
                    recipient_id: recipient.id.clone(),
                    channel,
                    reason: RejectionReason::UnsupportedChannel {
                        template_id: template.id.clone(),
                    },
                });
                continue;
            }

            let Some(contact) = self.gate.resolve_contact(&recipient, channel) else {
                let reason = self
                    .gate
                    .rejection(&recipient, channel)
                    .unwrap_or(RejectionReason::MissingContact);
                receipt.rejections.push(ChannelRejection {
                    recipient_id: recipient.id.clone(),
                    channel,
                    reason,
                });
                continue;
            };

            let job = NotificationJob {
                id: Uuid::new_v4().to_string(),
                template_id: template.id.clone(),
                channel,
                recipient_id: recipient.id.clone(),
                recipient_contact: contact.to_string(),
                status: JobStatus::Pending,
                variables: request.variables.clone(),
                scheduled_for,
                sent_at: None,
                delivered_at: None,
                failed_at: None,
                error_message: None,
                retry_count: 0,
                max_retries: self.config.max_retries,
                priority: request.priority,
                created_at: now,
                updated_at: now,
            };
            self.store.save_job(&job).await?;
            info!(
                job_id = %job.id,
                channel = %channel,
                recipient_id = %recipient.id,
                template_id = %job.template_id,
                "notification job created"
            );
            receipt.job_ids.push(job.id);
        }

        Ok(receipt)
    }

    /// Fan a request out across many recipients, layering per-recipient
    /// variable overrides over the common set.
    pub async fn send_bulk(&self, request: BulkSendRequest) -> Result<SendReceipt, HeraldError> {
        let mut receipt = SendReceipt::default();
        for recipient in &request.recipients {
            let mut variables = request.variables.clone();
            if let Some(overrides) = request.recipient_variables.get(&recipient.id) {
                variables.extend(overrides.clone());
            }
            let result = self
                .send(SendRequest {
                    template_id: request.template_id.clone(),
                    channels: request.channels.clone(),
                    recipient: recipient.clone(),
                    variables,
                    scheduled_for: request.scheduled_for,
                    priority: request.priority,
                })
                .await?;
            receipt.merge(result);
        }
        Ok(receipt)
    }

    /// Claim and dispatch one due job.
    ///
    /// Render and contact failures are permanent (no retry slot consumed);
    /// provider failures either return the job to `pending` for a durable
    /// retry or exhaust it into terminal `failed`.
    pub async fn dispatch(&self, job: &NotificationJob) -> Result<(), HeraldError> {
        match job.status {
            JobStatus::Pending => {
                // Claim first: the persisted `queued` transition is the only
                // mutual-exclusion mechanism between overlapping ticks.
                self.store
                    .update_job_status(&job.id, JobStatus::Queued, JobStatusUpdate::default())
                    .await?;
            }
            // Already claimed, e.g. a prior run stopped mid-dispatch.
            JobStatus::Queued => {}
            other => {
                return Err(HeraldError::InvalidTransition {
                    from: other,
                    to: JobStatus::Queued,
                });
            }
        }

        let Some(template) = self.templates.get_template(&job.template_id) else {
            let message = format!("template not found: {}", job.template_id);
            return self.fail_permanently(job, &message).await;
        };

        let rendered = render(&template, &job.variables);
        if !rendered.is_complete() {
            let message = HeraldError::Render {
                missing: rendered.missing_variables,
            }
            .to_string();
            return self.fail_permanently(job, &message).await;
        }

        let adapter = self
            .channels
            .get(job.channel)
            .ok_or(HeraldError::ChannelNotConfigured {
                channel: job.channel,
            })?;

        if !adapter.validate_contact(&job.recipient_contact) {
            let message = HeraldError::InvalidContact {
                contact: job.recipient_contact.clone(),
            }
            .to_string();
            return self.fail_permanently(job, &message).await;
        }

        // The store is not held across this call; other consumers observe
        // the intermediate `queued` state while the provider round-trips.
        match send_with_retry(
            adapter.as_ref(),
            &job.recipient_contact,
            &rendered.body,
            rendered.subject.as_deref(),
            &self.config.retry,
        )
        .await
        {
            Ok(response) => {
                self.store
                    .update_job_status(
                        &job.id,
                        JobStatus::Sent,
                        JobStatusUpdate {
                            sent_at: Some(Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?;
                info!(
                    job_id = %job.id,
                    channel = %job.channel,
                    provider_message_id = response.message_id.as_deref().unwrap_or("-"),
                    "notification sent"
                );
                Ok(())
            }
            Err(err) => self.schedule_durable_retry(job, &err.to_string()).await,
        }
    }

    /// The shared claim-and-dispatch routine behind both the periodic tick
    /// and the on-demand trigger. Returns the number of jobs processed.
    pub async fn process_due(&self, limit: usize) -> Result<usize, HeraldError> {
        let jobs = self.store.due_jobs(limit).await?;
        let count = jobs.len();
        if count > 0 {
            debug!(count, "processing due jobs");
        }

        for (index, job) in jobs.iter().enumerate() {
            if let Err(err) = self.dispatch(job).await {
                // A dispatch error is job-local; keep draining the batch.
                error!(job_id = %job.id, error = %err, "dispatch error");
            }
            if index + 1 < count && !self.config.inter_job_pause.is_zero() {
                tokio::time::sleep(self.config.inter_job_pause).await;
            }
        }

        if self.config.optimistic_delivery {
            self.confirm_deliveries().await?;
        }

        Ok(count)
    }

    /// Promote `sent` jobs older than the grace period to `delivered`.
    ///
    /// A stand-in for provider delivery receipts where none exist.
    pub async fn confirm_deliveries(&self) -> Result<usize, HeraldError> {
        let cutoff = Utc::now() - chrono::Duration::seconds(self.config.delivery_grace.as_secs() as i64);
        let filter = JobFilter {
            status: Some(JobStatus::Sent),
            ..Default::default()
        };
        let sent_jobs = self.store.query_jobs(&filter, 500).await?;

        let mut promoted = 0;
        for job in sent_jobs {
            if job.sent_at.is_some_and(|sent_at| sent_at <= cutoff) {
                self.store
                    .update_job_status(
                        &job.id,
                        JobStatus::Delivered,
                        JobStatusUpdate {
                            delivered_at: Some(Utc::now()),
                            ..Default::default()
                        },
                    )
                    .await?;
                debug!(job_id = %job.id, "optimistically confirmed delivery");
                promoted += 1;
            }
        }
        Ok(promoted)
    }

    /// Pull a job out of the queue before dispatch. Management action; a
    /// job whose dispatch has begun cannot be cancelled.
    pub async fn cancel(&self, job_id: &str) -> Result<(), HeraldError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| HeraldError::NotFound {
                kind: "job",
                id: job_id.to_string(),
            })?;

        if !job.status.can_transition_to(JobStatus::Cancelled) {
            return Err(HeraldError::InvalidTransition {
                from: job.status,
                to: JobStatus::Cancelled,
            });
        }

        self.store
            .update_job_status(job_id, JobStatus::Cancelled, JobStatusUpdate::default())
            .await?;
        info!(job_id, "notification job cancelled");
        Ok(())
    }

    async fn fail_permanently(
        &self,
        job: &NotificationJob,
        message: &str,
    ) -> Result<(), HeraldError> {
        self.store
            .update_job_status(
                &job.id,
                JobStatus::Failed,
                JobStatusUpdate {
                    failed_at: Some(Utc::now()),
                    error_message: Some(message.to_string()),
                    ..Default::default()
                },
            )
            .await?;
        warn!(job_id = %job.id, error = message, "permanent dispatch failure");
        Ok(())
    }

    async fn schedule_durable_retry(
        &self,
        job: &NotificationJob,
        message: &str,
    ) -> Result<(), HeraldError> {
        if job.retry_count < job.max_retries {
            let retry_count = job.retry_count + 1;
            self.store
                .update_job_status(
                    &job.id,
                    JobStatus::Pending,
                    JobStatusUpdate {
                        retry_count: Some(retry_count),
                        error_message: Some(message.to_string()),
                        ..Default::default()
                    },
                )
                .await?;
            warn!(
                job_id = %job.id,
                retry_count,
                max_retries = job.max_retries,
                error = message,
                "send failed, job returned to pending for durable retry"
            );
        } else {
            self.store
                .update_job_status(
                    &job.id,
                    JobStatus::Failed,
                    JobStatusUpdate {
                        failed_at: Some(Utc::now()),
                        error_message: Some(message.to_string()),
                        ..Default::default()
                    },
                )
                .await?;
            warn!(
                job_id = %job.id,
                max_retries = job.max_retries,
                error = message,
                "durable retries exhausted, job failed"
            );
        }
        Ok(())
    }
}
