// SPDX-FileCopyrightText: 2026 Herald Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recipient persistence and opt-in bookkeeping.

use herald_core::types::{OptInCounts, OptIns, OptInUpdate, Recipient};
use herald_core::HeraldError;
use rusqlite::params;

use crate::codec::{format_ts, now_ts, parse_ts};
use crate::database::{map_tr_err, Database};

const COLUMNS: &str = "id, name, email, phone, whatsapp_number, \
     opt_in_email, opt_in_sms, opt_in_whatsapp, created_at, updated_at";

fn opt_flag(raw: Option<i64>) -> Option<bool> {
    raw.map(|v| v != 0)
}

fn flag_to_sql(flag: Option<bool>) -> Option<i64> {
    flag.map(i64::from)
}

fn map_row(row: &rusqlite::Row<'_>) -> Result<Recipient, rusqlite::Error> {
    let created_at: String = row.get(8)?;
    let updated_at: String = row.get(9)?;
    Ok(Recipient {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        whatsapp_number: row.get(4)?,
        opt_ins: OptIns {
            email: opt_flag(row.get(5)?),
            sms: opt_flag(row.get(6)?),
            whatsapp: opt_flag(row.get(7)?),
        },
        created_at: parse_ts(8, &created_at)?,
        updated_at: parse_ts(9, &updated_at)?,
    })
}

/// Insert or replace a recipient record.
pub async fn save(db: &Database, recipient: &Recipient) -> Result<(), HeraldError> {
    let recipient = recipient.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO recipients \
                 (id, name, email, phone, whatsapp_number, \
                  opt_in_email, opt_in_sms, opt_in_whatsapp, created_at, updated_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    recipient.id,
                    recipient.name,
                    recipient.email,
                    recipient.phone,
                    recipient.whatsapp_number,
                    flag_to_sql(recipient.opt_ins.email),
                    flag_to_sql(recipient.opt_ins.sms),
                    flag_to_sql(recipient.opt_ins.whatsapp),
                    format_ts(&recipient.created_at),
                    now_ts(),
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch a recipient by id.
pub async fn get(db: &Database, id: &str) -> Result<Option<Recipient>, HeraldError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {COLUMNS} FROM recipients WHERE id = ?1"))?;
            match stmt.query_row(params![id], map_row) {
                Ok(recipient) => Ok(Some(recipient)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// All recipients, newest first.
pub async fn all(db: &Database) -> Result<Vec<Recipient>, HeraldError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {COLUMNS} FROM recipients ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt.query_map([], map_row)?;
            rows.collect()
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a partial opt-in update; absent fields are left untouched.
pub async fn update_opt_ins(
    db: &Database,
    id: &str,
    update: OptInUpdate,
) -> Result<(), HeraldError> {
    let id = id.to_string();
    let id_for_err = id.clone();
    let changed = db
        .connection()
        .call(move |conn| {
            let mut assignments: Vec<String> = Vec::new();
            let mut values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(email) = update.email {
                assignments.push(format!("opt_in_email = ?{}", values.len() + 1));
                values.push(Box::new(i64::from(email)));
            }
            if let Some(sms) = update.sms {
                assignments.push(format!("opt_in_sms = ?{}", values.len() + 1));
                values.push(Box::new(i64::from(sms)));
            }
            if let Some(whatsapp) = update.whatsapp {
                assignments.push(format!("opt_in_whatsapp = ?{}", values.len() + 1));
                values.push(Box::new(i64::from(whatsapp)));
            }
            if assignments.is_empty() {
                return Ok(1);
            }

            assignments.push(format!("updated_at = ?{}", values.len() + 1));
            values.push(Box::new(now_ts()));
            values.push(Box::new(id));

            let sql = format!(
                "UPDATE recipients SET {} WHERE id = ?{}",
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
            kind: "recipient",
            id: id_for_err,
        });
    }
    Ok(())
}

/// Explicit opt-in tallies over the whole recipient set.
pub async fn opt_in_counts(db: &Database) -> Result<OptInCounts, HeraldError> {
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*), \
                        COALESCE(SUM(CASE WHEN opt_in_email = 1 THEN 1 ELSE 0 END), 0), \
                        COALESCE(SUM(CASE WHEN opt_in_sms = 1 THEN 1 ELSE 0 END), 0), \
                        COALESCE(SUM(CASE WHEN opt_in_whatsapp = 1 THEN 1 ELSE 0 END), 0) \
                 FROM recipients",
                [],
                |row| {
                    Ok(OptInCounts {
                        total_recipients: row.get::<_, i64>(0)? as u64,
                        email: row.get::<_, i64>(1)? as u64,
                        sms: row.get::<_, i64>(2)? as u64,
                        whatsapp: row.get::<_, i64>(3)? as u64,
                    })
                },
            )
        })
        .await
        .map_err(map_tr_err)
}
