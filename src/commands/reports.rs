// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::InstallmentStatus;
use crate::utils::{maybe_print_json, parse_date, pretty_table, today_from};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("receivables", sub)) => receivables_cmd(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReceivableRow {
    pub trip: String,
    pub trip_date: NaiveDate,
    pub bookings: u32,
    pub booked: Decimal,
    pub paid: Decimal,
    pub pending: Decimal,
    pub overdue: Decimal,
}

/// Money owed per trip as of `today`; overdue is the part of pending already past due.
pub fn receivables(conn: &Connection, today: NaiveDate) -> Result<Vec<ReceivableRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.id, t.name, t.trip_date, i.booking_id, i.amount, i.status, i.due_date
         FROM installments i
         JOIN bookings b ON i.booking_id=b.id
         JOIN trips t ON b.trip_id=t.id
         ORDER BY t.trip_date, t.name, i.booking_id, i.number",
    )?;
    let mut cur = stmt.query([])?;

    let mut out: Vec<ReceivableRow> = Vec::new();
    let mut last_trip: Option<i64> = None;
    let mut last_booking: Option<i64> = None;
    while let Some(r) = cur.next()? {
        let trip_id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let trip_date: String = r.get(2)?;
        let booking_id: i64 = r.get(3)?;
        let amount_s: String = r.get(4)?;
        let status: String = r.get(5)?;
        let due: String = r.get(6)?;

        if last_trip != Some(trip_id) {
            out.push(ReceivableRow {
                trip: name,
                trip_date: parse_date(&trip_date)?,
                bookings: 0,
                booked: Decimal::ZERO,
                paid: Decimal::ZERO,
                pending: Decimal::ZERO,
                overdue: Decimal::ZERO,
            });
            last_trip = Some(trip_id);
            last_booking = None;
        }
        let Some(row) = out.last_mut() else { continue };
        if last_booking != Some(booking_id) {
            row.bookings += 1;
            last_booking = Some(booking_id);
        }

        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid amount '{}' in installments", amount_s))?;
        row.booked += amount;
        match status.parse::<InstallmentStatus>()? {
            InstallmentStatus::Paid => row.paid += amount,
            InstallmentStatus::Pending => {
                row.pending += amount;
                if parse_date(&due)? < today {
                    row.overdue += amount;
                }
            }
        }
    }
    Ok(out)
}

fn receivables_cmd(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_from(sub)?;
    let data = receivables(conn, today)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .into_iter()
        .map(|r| {
            vec![
                r.trip,
                r.trip_date.to_string(),
                r.bookings.to_string(),
                format!("{:.2}", r.booked),
                format!("{:.2}", r.paid),
                format!("{:.2}", r.pending),
                format!("{:.2}", r.overdue),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Trip", "Date", "Bookings", "Booked", "Paid", "Pending", "Overdue"],
            rows
        )
    );
    Ok(())
}
