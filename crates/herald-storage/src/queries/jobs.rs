// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification job persistence: save, due selection, status updates, and
//! filtered history/aggregate queries.

use std::collections::HashMap;

use herald_core::types::{
    Channel, ChannelCounts, JobFilter, JobStatus, JobStatusUpdate, NotificationJob,
};
use herald_core::HeraldError;
use rusqlite::params;

use crate::codec::{
    decode_vars, encode_vars, format_ts, now_ts, parse_opt_ts, parse_tag, parse_ts,
};
use crate::database::{map_tr_err, Database};

const COLUMNS: &str = "id, template_id, channel, recipient_id, recipient_contact, status, \
     variables, scheduled_for, sent_at, delivered_at, failed_at, error_message, \
     retry_count, max_retries, priority, created_at, updated_at";

/// Due selection order: priority rank, then earliest due, then insertion
/// order (created_at with id as the final total-order tiebreak).
const DUE_ORDER: &str = "CASE priority WHEN 'high' THEN 0 WHEN 'normal' THEN 1 ELSE 2 END, \
     scheduled_for ASC, created_at ASC, id ASC";

fn map_row(row: &rusqlite::Row<'_>) -> Result<NotificationJob, rusqlite::Error> {
    let channel: String = row.get(2)?;
    let status: String = row.get(5)?;
    let variables: String = row.get(6)?;
    let scheduled_for: String = row.get(7)?;
    let priority: String = row.get(14)?;
    let created_at: String = row.get(15)?;
    let updated_at: String = row.get(16)?;

    Ok(NotificationJob {
        id: row.get(0)?,
        template_id: row.get(1)?,
        channel: parse_tag(2, &channel)?,
        recipient_id: row.get(3)?,
        recipient_contact: row.get(4)?,
        status: parse_tag(5, &status)?,
        variables: decode_vars(6, &variables)?,
        scheduled_for: parse_ts(7, &scheduled_for)?,
        sent_at: parse_opt_ts(8, row.get(8)?)?,
        delivered_at: parse_opt_ts(9, row.get(9)?)?,
        failed_at: parse_opt_ts(10, row.get(10)?)?,
        error_message: row.get(11)?,
        retry_count: row.get::<_, i64>(12)? as u32,
        max_retries: row.get::<_, i64>(13)? as u32,
        priority: parse_tag(14, &priority)?,
        created_at: parse_ts(15, &created_at)?,
        updated_at: parse_ts(16, &updated_at)?,
    })
}

/// Translate a [`JobFilter`] into a WHERE clause and its positional args.
/// All filter columns are TEXT, so args are plain strings.
fn filter_sql(filter: &JobFilter) -> (String, Vec<String>) {
    let mut conditions: Vec<String> = Vec::new();
    let mut args: Vec<String> = Vec::new();

    if let Some(channel) = filter.channel {
        args.push(channel.to_string());
        conditions.push(format!("channel = ?{}", args.len()));
    }
    if let Some(status) = filter.status {
        args.push(status.to_string());
        conditions.push(format!("status = ?{}", args.len()));
    }
    if let Some(template_id) = &filter.template_id {
        args.push(template_id.clone());
        conditions.push(format!("template_id = ?{}", args.len()));
    }
    if let Some(recipient_id) = &filter.recipient_id {
        args.push(recipient_id.clone());
        conditions.push(format!("recipient_id = ?{}", args.len()));
    }
    if let Some(start) = &filter.start {
        args.push(format_ts(start));
        conditions.push(format!("created_at >= ?{}", args.len()));
    }
    if let Some(end) = &filter.end {
        args.push(format_ts(end));
        conditions.push(format!("created_at <= ?{}", args.len()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };
    (clause, args)
}

/// Insert or replace a job record.
pub async fn save(db: &Database, job: &NotificationJob) -> Result<(), HeraldError> {
    let job = job.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO notification_jobs \
                 (id, template_id, channel, recipient_id, recipient_contact, status, \
                  variables, scheduled_for, sent_at, delivered_at, failed_at, error_message, \
                  retry_count, max_retries, priority, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
                params![
                    job.id,
                    job.template_id,
                    job.channel.to_string(),
                    job.recipient_id,
                    job.recipient_contact,
                    job.status.to_string(),
                    encode_vars(&job.variables)?,
                    format_ts(&job.scheduled_for),
                    job.sent_at.as_ref().map(format_ts),
                    job.delivered_at.as_ref().map(format_ts),
                    job.failed_at.as_ref().map(format_ts),
                    job.error_message,
                    job.retry_count,
                    job.max_retries,
                    job.priority.to_string(),
                    format_ts(&job.created_at),
                    format_ts(&job.updated_at),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a job by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<NotificationJob>, HeraldError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM notification_jobs WHERE id = ?1"))?;
            match stmt.query_row(params![id], map_row) {
                Ok(job) => Ok(Some(job)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Jobs with status `pending` or `queued` whose `scheduled_for` has passed,
/// in dispatch order.
pub async fn due(db: &Database, limit: usize) -> Result<Vec<NotificationJob>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM notification_jobs \
                 WHERE status IN ('pending', 'queued') \
                 AND scheduled_for <= strftime('%Y-%m-%dT%H:%M:%fZ', 'now') \
                 ORDER BY {DUE_ORDER} \
                 LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], map_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Persist a status change plus any accompanying fields. `updated_at` is
/// stamped here.
pub async fn update_status(
    db: &Database,
    id: &str,
    status: JobStatus,
    update: JobStatusUpdate,
) -> Result<(), HeraldError> {
    let id = id.to_string();
    let id_for_err = id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            let mut assignments = vec!["status = ?1".to_string(), "updated_at = ?2".to_string()];
            let mut values: Vec<Box<dyn rusqlite::types::ToSql>> =
                vec![Box::new(status.to_string()), Box::new(now_ts())];

            if let Some(sent_at) = &update.sent_at {
                assignments.push(format!("sent_at = ?{}", values.len() + 1));
                values.push(Box::new(format_ts(sent_at)));
            }
            if let Some(delivered_at) = &update.delivered_at {
                assignments.push(format!("delivered_at = ?{}", values.len() + 1));
                values.push(Box::new(format_ts(delivered_at)));
            }
            if let Some(failed_at) = &update.failed_at {
                assignments.push(format!("failed_at = ?{}", values.len() + 1));
                values.push(Box::new(format_ts(failed_at)));
            }
            if let Some(error_message) = &update.error_message {
                assignments.push(format!("error_message = ?{}", values.len() + 1));
                values.push(Box::new(error_message.clone()));
            }
            if let Some(retry_count) = update.retry_count {
                assignments.push(format!("retry_count = ?{}", values.len() + 1));
                values.push(Box::new(i64::from(retry_count)));
            }

            values.push(Box::new(id));
            let sql = format!(
                "UPDATE notification_jobs SET {} WHERE id = ?{}",
                assignments.join(", "),
                values.len()
            );
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                values.iter().map(|v| v.as_ref()).collect();
            conn.execute(&sql, refs.as_slice())
        })
        .await
        .map_err(map_tr_err)?;

    if changed == 0 {
        return Err(HeraldError::NotFound {
            kind: "job",
            id: id_for_err,
        });
    }
    Ok(())
}

/// Filtered history, newest first.
pub async fn query(
    db: &Database,
    filter: &JobFilter,
    limit: usize,
) -> Result<Vec<NotificationJob>, HeraldError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let (clause, args) = filter_sql(&filter);
            let sql = format!(
                "SELECT {COLUMNS} FROM notification_jobs {clause} \
                 ORDER BY created_at DESC, id DESC LIMIT ?{}",
                args.len() + 1
            );
            let mut stmt = conn.prepare(&sql)?;

            let mut values: Vec<Box<dyn rusqlite::types::ToSql>> =
                args.into_iter().map(|a| Box::new(a) as _).collect();
            values.push(Box::new(limit as i64));
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                values.iter().map(|v| v.as_ref()).collect();

            let rows = stmt.query_map(refs.as_slice(), map_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Job counts grouped by status over the filtered set.
pub async fn count_by_status(
    db: &Database,
    filter: &JobFilter,
) -> Result<HashMap<JobStatus, u64>, HeraldError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let (clause, args) = filter_sql(&filter);
            let sql = format!(
                "SELECT status, COUNT(*) FROM notification_jobs {clause} GROUP BY status"
            );
            let mut stmt = conn.prepare(&sql)?;

            let values: Vec<Box<dyn rusqlite::types::ToSql>> =
                args.into_iter().map(|a| Box::new(a) as _).collect();
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                values.iter().map(|v| v.as_ref()).collect();

            let rows = stmt.query_map(refs.as_slice(), |row| {
                let status: String = row.get(0)?;
                Ok((parse_tag::<JobStatus>(0, &status)?, row.get::<_, i64>(1)? as u64))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Sent/delivered/failed counters grouped by channel over the filtered set.
/// `sent` counts jobs that reached `sent` or `delivered`.
pub async fn count_by_channel(
    db: &Database,
    filter: &JobFilter,
) -> Result<HashMap<Channel, ChannelCounts>, HeraldError> {
    let filter = filter.clone();
    db.connection()
        .call(move |conn| {
            let (clause, args) = filter_sql(&filter);
            let sql = format!(
                "SELECT channel, \
                        SUM(CASE WHEN status IN ('sent', 'delivered') THEN 1 ELSE 0 END), \
                        SUM(CASE WHEN status = 'delivered' THEN 1 ELSE 0 END), \
                        SUM(CASE WHEN status = 'failed' THEN 1 ELSE 0 END) \
                 FROM notification_jobs {clause} GROUP BY channel"
            );
            let mut stmt = conn.prepare(&sql)?;

            let values: Vec<Box<dyn rusqlite::types::ToSql>> =
                args.into_iter().map(|a| Box::new(a) as _).collect();
            let refs: Vec<&dyn rusqlite::types::ToSql> =
                values.iter().map(|v| v.as_ref()).collect();

            let rows = stmt.query_map(refs.as_slice(), |row| {
                let channel: String = row.get(0)?;
                Ok((
                    parse_tag::<Channel>(0, &channel)?,
                    ChannelCounts {
                        sent: row.get::<_, i64>(1)? as u64,
                        delivered: row.get::<_, i64>(2)? as u64,
                        failed: row.get::<_, i64>(3)? as u64,
                    },
                ))
            })?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use herald_core::types::Priority;

    async fn test_db() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    fn sample_job(id: &str) -> NotificationJob {
        let now = Utc::now();
        let mut variables = HashMap::new();
        variables.insert("customerName".to_string(), "Ana".to_string());

        NotificationJob {
            id: id.to_string(),
            template_id: "order-confirm-email".into(),
            channel: Channel::Email,
            recipient_id: "r1".into(),
            recipient_contact: "ana@example.com".into(),
            status: JobStatus::Pending,
            variables,
            scheduled_for: now - Duration::minutes(1),
            sent_at: None,
            delivered_at: None,
            failed_at: None,
            error_message: None,
            retry_count: 0,
            max_retries: 3,
            priority: Priority::Normal,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn save_and_get_round_trips_all_fields() {
        let db = test_db().await;
        let mut job = sample_job("j1");
        job.sent_at = Some(Utc::now());
        job.error_message = Some("smtp timeout".into());
        job.retry_count = 2;
        save(&db, &job).await.unwrap();

        let fetched = get(&db, "j1").await.unwrap().unwrap();
        assert_eq!(fetched.template_id, job.template_id);
        assert_eq!(fetched.channel, Channel::Email);
        assert_eq!(fetched.recipient_contact, "ana@example.com");
        assert_eq!(fetched.status, JobStatus::Pending);
        assert_eq!(fetched.variables, job.variables);
        assert_eq!(fetched.error_message.as_deref(), Some("smtp timeout"));
        assert_eq!(fetched.retry_count, 2);
        assert_eq!(fetched.max_retries, 3);
        assert_eq!(fetched.priority, Priority::Normal);
        assert!(fetched.sent_at.is_some());
        assert!(fetched.delivered_at.is_none());
        // Millisecond precision survives the text round-trip.
        assert_eq!(
            fetched.scheduled_for.timestamp_millis(),
            job.scheduled_for.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn due_orders_by_priority_rank_then_schedule() {
        let db = test_db().await;
        let now = Utc::now();

        let mut low_early = sample_job("low-early");
        low_early.priority = Priority::Low;
        low_early.scheduled_for = now - Duration::minutes(30);
        save(&db, &low_early).await.unwrap();

        let mut high_late = sample_job("high-late");
        high_late.priority = Priority::High;
        high_late.scheduled_for = now - Duration::minutes(1);
        save(&db, &high_late).await.unwrap();

        let mut normal_mid = sample_job("normal-mid");
        normal_mid.scheduled_for = now - Duration::minutes(10);
        save(&db, &normal_mid).await.unwrap();

        let jobs = due(&db, 10).await.unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        // High priority first even though it became due last.
        assert_eq!(ids, vec!["high-late", "normal-mid", "low-early"]);
    }

    #[tokio::test]
    async fn due_skips_future_and_terminal_jobs() {
        let db = test_db().await;
        let now = Utc::now();

        let mut future = sample_job("future");
        future.scheduled_for = now + Duration::hours(1);
        save(&db, &future).await.unwrap();

        let mut failed = sample_job("failed");
        failed.status = JobStatus::Failed;
        save(&db, &failed).await.unwrap();

        let mut queued = sample_job("queued");
        queued.status = JobStatus::Queued;
        save(&db, &queued).await.unwrap();

        let jobs = due(&db, 10).await.unwrap();
        let ids: Vec<&str> = jobs.iter().map(|j| j.id.as_str()).collect();
        // Queued jobs remain selectable; future and terminal ones do not.
        assert_eq!(ids, vec!["queued"]);
    }

    #[tokio::test]
    async fn due_respects_limit() {
        let db = test_db().await;
        for i in 0..5 {
            save(&db, &sample_job(&format!("j{i}"))).await.unwrap();
        }
        let jobs = due(&db, 3).await.unwrap();
        assert_eq!(jobs.len(), 3);
    }

    #[tokio::test]
    async fn update_status_persists_fields() {
        let db = test_db().await;
        save(&db, &sample_job("j1")).await.unwrap();

        let sent_at = Utc::now();
        update_status(
            &db,
            "j1",
            JobStatus::Sent,
            JobStatusUpdate {
                sent_at: Some(sent_at),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let fetched = get(&db, "j1").await.unwrap().unwrap();
        assert_eq!(fetched.status, JobStatus::Sent);
        assert_eq!(
            fetched.sent_at.unwrap().timestamp_millis(),
            sent_at.timestamp_millis()
        );
    }

    #[tokio::test]
    async fn update_status_unknown_job_is_not_found() {
        let db = test_db().await;
        let err = update_status(&db, "missing", JobStatus::Queued, JobStatusUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, HeraldError::NotFound { kind: "job", .. }));
    }

    #[tokio::test]
    async fn query_filters_by_channel_and_status() {
        let db = test_db().await;

        let mut email_sent = sample_job("email-sent");
        email_sent.status = JobStatus::Sent;
        save(&db, &email_sent).await.unwrap();

        let mut sms_sent = sample_job("sms-sent");
        sms_sent.channel = Channel::Sms;
        sms_sent.status = JobStatus::Sent;
        save(&db, &sms_sent).await.unwrap();

        save(&db, &sample_job("email-pending")).await.unwrap();

        let filter = JobFilter {
            channel: Some(Channel::Email),
            status: Some(JobStatus::Sent),
            ..Default::default()
        };
        let jobs = query(&db, &filter, 100).await.unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].id, "email-sent");
    }

    #[tokio::test]
    async fn count_by_channel_matches_status_buckets() {
        let db = test_db().await;

        for (id, status) in [
            ("a", JobStatus::Sent),
            ("b", JobStatus::Delivered),
            ("c", JobStatus::Failed),
            ("d", JobStatus::Pending),
        ] {
            let mut job = sample_job(id);
            job.status = status;
            save(&db, &job).await.unwrap();
        }

        let counts = count_by_channel(&db, &JobFilter::default()).await.unwrap();
        let email = counts.get(&Channel::Email).unwrap();
        assert_eq!(email.sent, 2); // sent + delivered
        assert_eq!(email.delivered, 1);
        assert_eq!(email.failed, 1);

        let by_status = count_by_status(&db, &JobFilter::default()).await.unwrap();
        assert_eq!(by_status.get(&JobStatus::Pending), Some(&1));
        assert_eq!(by_status.get(&JobStatus::Sent), Some(&1));
    }
}
