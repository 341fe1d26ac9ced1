// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestrator tests: creation gating, claim-and-dispatch,
//! layered retry, cancellation, and delivery confirmation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use herald_core::error::SendError;
use herald_core::traits::JobStore;
use herald_core::types::{
    BulkSendRequest, Channel, JobFilter, JobStatus, OptIns, Priority, RejectionReason,
    SendRequest,
};
use herald_core::HeraldError;
use herald_engine::{
    ChannelRegistry, OptInGate, OptInPolicy, Orchestrator, OrchestratorConfig, RetryPolicy,
};
use herald_template::TemplateRegistry;
use herald_test_utils::{fixtures, MemoryStore, MockChannel};

struct Harness {
    store: Arc<MemoryStore>,
    email: Arc<MockChannel>,
    orchestrator: Orchestrator,
}

/// Orchestrator over a memory store, a `greeting` template per channel, and
/// mock email/SMS adapters. No immediate retries, no inter-job pause.
fn harness(policy: OptInPolicy, config: OrchestratorConfig) -> Harness {
    let store = Arc::new(MemoryStore::new());

    let templates = Arc::new(TemplateRegistry::new());
    templates.add(fixtures::template("greeting", Channel::Email));
    templates.add(fixtures::template("greeting-sms", Channel::Sms));

    let email = Arc::new(MockChannel::new(Channel::Email));
    let mut registry = ChannelRegistry::new();
    registry.register(email.clone());
    registry.register(Arc::new(MockChannel::new(Channel::Sms)));

    let orchestrator = Orchestrator::new(
        store.clone(),
        templates,
        Arc::new(registry),
        OptInGate::new(policy),
        config,
    );

    Harness {
        store,
        email,
        orchestrator,
    }
}

fn quiet_config() -> OrchestratorConfig {
    OrchestratorConfig {
        retry: RetryPolicy::none(),
        inter_job_pause: Duration::ZERO,
        ..Default::default()
    }
}

fn email_request() -> SendRequest {
    SendRequest {
        template_id: "greeting".into(),
        channels: vec![Channel::Email],
        recipient: fixtures::recipient("r1"),
        variables: HashMap::from([("name".to_string(), "Ana".to_string())]),
        scheduled_for: None,
        priority: Priority::Normal,
    }
}

#[tokio::test]
async fn send_creates_pending_job_with_captured_contact() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let receipt = h.orchestrator.send(email_request()).await.unwrap();
    assert!(receipt.success());
    assert_eq!(receipt.job_ids.len(), 1);
    assert!(receipt.rejections.is_empty());

    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.recipient_contact, "ana@example.com");
    assert_eq!(job.channel, Channel::Email);
    assert_eq!(job.retry_count, 0);
    assert_eq!(job.max_retries, 3);
}

#[tokio::test]
async fn unsupported_channel_is_rejected_without_aborting_siblings() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let mut request = email_request();
    request.channels = vec![Channel::Email, Channel::Sms];

    let receipt = h.orchestrator.send(request).await.unwrap();
    // The greeting template targets email only: the email job is created
    // and the sms leg is reported, not fatal.
    assert_eq!(receipt.job_ids.len(), 1);
    assert_eq!(receipt.rejections.len(), 1);
    assert_eq!(receipt.rejections[0].channel, Channel::Sms);
    assert_eq!(
        receipt.rejections[0].reason,
        RejectionReason::UnsupportedChannel {
            template_id: "greeting".into()
        }
    );
}

#[tokio::test]
async fn opted_out_channel_is_rejected() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let request = SendRequest {
        template_id: "greeting-sms".into(),
        channels: vec![Channel::Sms],
        recipient: {
            let mut r = fixtures::recipient("r1");
            r.opt_ins.sms = Some(false);
            r
        },
        variables: HashMap::from([("name".to_string(), "Ana".to_string())]),
        scheduled_for: None,
        priority: Priority::Normal,
    };

    let receipt = h.orchestrator.send(request).await.unwrap();
    assert!(!receipt.success());
    assert_eq!(receipt.rejections[0].reason, RejectionReason::OptInDenied);
}

#[tokio::test]
async fn opt_in_rejection_reasons_are_specific() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    // Opted in to email but no contact on file.
    let mut request = email_request();
    request.recipient.email = None;
    let receipt = h.orchestrator.send(request).await.unwrap();
    assert!(!receipt.success());
    assert_eq!(
        receipt.rejections[0].reason,
        RejectionReason::MissingContact
    );

    // Contact on file but opted out.
    let mut request = email_request();
    request.recipient.opt_ins.email = Some(false);
    let receipt = h.orchestrator.send(request).await.unwrap();
    assert_eq!(receipt.rejections[0].reason, RejectionReason::OptInDenied);
}

#[tokio::test]
async fn absent_preference_is_policy_dependent() {
    let mut request = email_request();
    request.recipient.opt_ins = OptIns::default();

    let explicit = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = explicit.orchestrator.send(request.clone()).await.unwrap();
    assert!(!receipt.success(), "explicit policy must deny absent flags");

    let legacy = harness(OptInPolicy::AssumeOptedIn, quiet_config());
    let receipt = legacy.orchestrator.send(request).await.unwrap();
    assert!(receipt.success(), "legacy policy treats absent as opted in");
}

#[tokio::test]
async fn unregistered_channel_fails_the_request() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let mut request = email_request();
    request.channels = vec![Channel::Email, Channel::Whatsapp];

    let err = h.orchestrator.send(request).await.unwrap_err();
    assert!(matches!(
        err,
        HeraldError::ChannelNotConfigured {
            channel: Channel::Whatsapp
        }
    ));
    // Fatal-to-the-request: no sibling jobs were created either.
    assert!(h.store.all_jobs().await.is_empty());
}

#[tokio::test]
async fn unknown_template_is_not_found() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let mut request = email_request();
    request.template_id = "no-such-template".into();

    let err = h.orchestrator.send(request).await.unwrap_err();
    assert!(matches!(err, HeraldError::NotFound { kind: "template", .. }));
}

#[tokio::test]
async fn successful_dispatch_reaches_sent() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = h.orchestrator.send(email_request()).await.unwrap();

    let processed = h.orchestrator.process_due(50).await.unwrap();
    assert_eq!(processed, 1);

    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Sent);
    assert!(job.sent_at.is_some());
    assert_eq!(job.retry_count, 0);

    let sent = h.email.sent_messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].contact, "ana@example.com");
    assert_eq!(sent[0].body, "Hi Ana");
    assert_eq!(sent[0].subject.as_deref(), Some("Hello Ana"));
}

/// Two transient failures, then success on the third durable attempt:
/// final status `sent` with `retry_count == 2`.
#[tokio::test]
async fn durable_retry_recovers_after_transient_failures() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = h.orchestrator.send(email_request()).await.unwrap();
    let job_id = &receipt.job_ids[0];

    h.email.fail_times(2, SendError::transient("timeout")).await;

    h.orchestrator.process_due(50).await.unwrap();
    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.retry_count, 1);
    assert_eq!(job.error_message.as_deref(), Some("timeout"));

    h.orchestrator.process_due(50).await.unwrap();
    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.retry_count, 2);

    h.orchestrator.process_due(50).await.unwrap();
    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Sent);
    assert_eq!(job.retry_count, 2);
}

/// Failing every durable attempt exhausts the retry budget: terminal
/// `failed`, `retry_count == max_retries`, last error retained.
#[tokio::test]
async fn exhausted_durable_retries_end_in_failed() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = h.orchestrator.send(email_request()).await.unwrap();
    let job_id = &receipt.job_ids[0];

    h.email
        .fail_times(10, SendError::transient("provider down"))
        .await;

    // Initial attempt plus max_retries durable retries.
    for _ in 0..4 {
        h.orchestrator.process_due(50).await.unwrap();
    }

    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.retry_count, 3);
    assert_eq!(job.retry_count, job.max_retries);
    assert!(job.failed_at.is_some());
    assert_eq!(job.error_message.as_deref(), Some("provider down"));

    // Terminal: another pass must not touch it.
    h.orchestrator.process_due(50).await.unwrap();
    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.retry_count, 3);
}

/// The immediate layer absorbs transient blips inside one dispatch without
/// consuming a durable retry slot.
#[tokio::test]
async fn immediate_retry_absorbs_transient_blips() {
    let config = OrchestratorConfig {
        retry: RetryPolicy {
            transient_attempts: 3,
            base_delay: Duration::from_millis(1),
        },
        inter_job_pause: Duration::ZERO,
        ..Default::default()
    };
    let h = harness(OptInPolicy::RequireExplicit, config);
    let receipt = h.orchestrator.send(email_request()).await.unwrap();

    h.email.fail_times(2, SendError::transient("blip")).await;
    h.orchestrator.process_due(50).await.unwrap();

    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Sent);
    assert_eq!(job.retry_count, 0, "immediate retries are free");
    assert_eq!(h.email.sent_count().await, 3);
}

/// Permanent provider errors skip the immediate layer entirely but still
/// consume a durable slot, same as transient ones.
#[tokio::test]
async fn permanent_provider_error_skips_immediate_retry() {
    let config = OrchestratorConfig {
        retry: RetryPolicy {
            transient_attempts: 3,
            base_delay: Duration::from_millis(1),
        },
        inter_job_pause: Duration::ZERO,
        ..Default::default()
    };
    let h = harness(OptInPolicy::RequireExplicit, config);
    let receipt = h.orchestrator.send(email_request()).await.unwrap();

    h.email
        .push_outcome(Err(SendError::permanent("mailbox unavailable")))
        .await;
    h.orchestrator.process_due(50).await.unwrap();

    assert_eq!(h.email.sent_count().await, 1, "no in-call retry");
    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.retry_count, 1);
}

#[tokio::test]
async fn missing_required_variable_fails_permanently() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let mut request = email_request();
    request.variables.clear();
    let receipt = h.orchestrator.send(request).await.unwrap();
    let job_id = &receipt.job_ids[0];

    h.orchestrator.process_due(50).await.unwrap();

    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.retry_count, 0, "render failures never retry");
    assert!(job.error_message.as_deref().unwrap().contains("name"));
    assert_eq!(h.email.sent_count().await, 0, "nothing reached the provider");
}

#[tokio::test]
async fn invalid_contact_fails_permanently() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = h.orchestrator.send(email_request()).await.unwrap();

    h.email.set_contacts_valid(false);
    h.orchestrator.process_due(50).await.unwrap();

    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Failed);
    assert_eq!(job.retry_count, 0);
    assert!(job
        .error_message
        .as_deref()
        .unwrap()
        .contains("invalid recipient contact"));
}

#[tokio::test]
async fn scheduled_jobs_wait_for_their_time() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let mut request = email_request();
    request.scheduled_for = Some(chrono::Utc::now() + chrono::Duration::hours(1));
    let receipt = h.orchestrator.send(request).await.unwrap();

    let processed = h.orchestrator.process_due(50).await.unwrap();
    assert_eq!(processed, 0);

    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Pending);
}

#[tokio::test]
async fn cancel_pulls_pending_job_out_of_queue() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = h.orchestrator.send(email_request()).await.unwrap();
    let job_id = &receipt.job_ids[0];

    h.orchestrator.cancel(job_id).await.unwrap();
    let job = h.store.get_job(job_id).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Cancelled);

    // A cancelled job is never picked up again.
    let processed = h.orchestrator.process_due(50).await.unwrap();
    assert_eq!(processed, 0);
    assert_eq!(h.email.sent_count().await, 0);
}

#[tokio::test]
async fn cancel_after_dispatch_is_rejected() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());
    let receipt = h.orchestrator.send(email_request()).await.unwrap();
    h.orchestrator.process_due(50).await.unwrap();

    let err = h.orchestrator.cancel(&receipt.job_ids[0]).await.unwrap_err();
    assert!(matches!(
        err,
        HeraldError::InvalidTransition {
            from: JobStatus::Sent,
            to: JobStatus::Cancelled
        }
    ));
}

#[tokio::test]
async fn optimistic_confirmation_promotes_sent_to_delivered() {
    let config = OrchestratorConfig {
        retry: RetryPolicy::none(),
        inter_job_pause: Duration::ZERO,
        optimistic_delivery: true,
        delivery_grace: Duration::ZERO,
        ..Default::default()
    };
    let h = harness(OptInPolicy::RequireExplicit, config);
    let receipt = h.orchestrator.send(email_request()).await.unwrap();

    // First pass sends; the grace period is zero, so the follow-up
    // confirmation pass promotes immediately.
    h.orchestrator.process_due(50).await.unwrap();
    h.orchestrator.process_due(50).await.unwrap();

    let job = h.store.get_job(&receipt.job_ids[0]).await.unwrap().unwrap();
    assert_eq!(job.status, JobStatus::Delivered);
    assert!(job.delivered_at.is_some());
}

#[tokio::test]
async fn bulk_send_merges_per_recipient_variables() {
    let h = harness(OptInPolicy::RequireExplicit, quiet_config());

    let mut second = fixtures::recipient("r2");
    second.email = Some("bruno@example.com".into());

    let request = BulkSendRequest {
        template_id: "greeting".into(),
        channels: vec![Channel::Email],
        recipients: vec![fixtures::recipient("r1"), second],
        variables: HashMap::from([("name".to_string(), "friend".to_string())]),
        recipient_variables: HashMap::from([(
            "r2".to_string(),
            HashMap::from([("name".to_string(), "Bruno".to_string())]),
        )]),
        scheduled_for: None,
        priority: Priority::High,
    };

    let receipt = h.orchestrator.send_bulk(request).await.unwrap();
    assert_eq!(receipt.job_ids.len(), 2);

    let r2_jobs = h
        .store
        .query_jobs(
            &JobFilter {
                recipient_id: Some("r2".into()),
                ..Default::default()
            },
            10,
        )
        .await
        .unwrap();
    assert_eq!(r2_jobs.len(), 1);
    assert_eq!(r2_jobs[0].variables.get("name").map(String::as_str), Some("Bruno"));
    assert_eq!(r2_jobs[0].priority, Priority::High);
}
