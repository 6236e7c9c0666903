// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::validate_due_date;
use crate::utils::{
    load_installments, load_plan_config, maybe_print_json, parse_date, parse_decimal,
    pretty_table, today_from,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_from(sub)?;
    let issues = diagnose(conn, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &issues)? {
        return Ok(());
    }
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn diagnose(conn: &Connection, today: NaiveDate) -> Result<Vec<Issue>> {
    let cfg = load_plan_config(conn)?;
    let mut stmt = conn.prepare(
        "SELECT b.id, b.total, t.name, t.trip_date, c.name
         FROM bookings b
         JOIN trips t ON b.trip_id=t.id
         JOIN clients c ON b.client_id=c.id
         ORDER BY t.trip_date, t.name, c.name",
    )?;
    let bookings = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;

    let mut issues = Vec::new();
    for b in bookings {
        let (bid, total_s, trip, trip_date_s, client) = b?;
        let total = parse_decimal(&total_s)?;
        let trip_date = parse_date(&trip_date_s)?;
        let insts = load_installments(conn, bid)?;
        let who = format!("{} / {}", trip, client);

        let sum: Decimal = insts.iter().map(|i| i.amount).sum();
        if sum != total {
            issues.push(Issue {
                kind: "amount_mismatch",
                detail: format!("{}: installments sum to {}, booking total {}", who, sum, total),
            });
        }
        for i in insts.iter().filter(|i| !i.is_paid()) {
            if !validate_due_date(i.due_date, trip_date, cfg.cutoff_days_before_trip) {
                issues.push(Issue {
                    kind: "past_cutoff",
                    detail: format!(
                        "{}: installment {}/{} due {} after cutoff",
                        who, i.number, i.total_installments, i.due_date
                    ),
                });
            }
            if i.due_date < today {
                issues.push(Issue {
                    kind: "overdue",
                    detail: format!(
                        "{}: installment {}/{} of {} was due {}",
                        who, i.number, i.total_installments, i.amount, i.due_date
                    ),
                });
            }
        }
    }
    Ok(issues)
}
