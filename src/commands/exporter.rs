// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde_json::json;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("installments", sub)) => export_installments(conn, sub),
        _ => Ok(()),
    }
}

fn export_installments(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let mut stmt = conn.prepare(
        "SELECT t.name, t.trip_date, c.name, c.phone, i.number, i.total_installments, i.amount, i.due_date, i.status, i.schedule_kind, i.paid_on
         FROM installments i
         JOIN bookings b ON i.booking_id=b.id
         JOIN trips t ON b.trip_id=t.id
         JOIN clients c ON b.client_id=c.id
         ORDER BY t.trip_date, t.name, c.name, i.number",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, u32>(4)?,
            r.get::<_, u32>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, String>(8)?,
            r.get::<_, String>(9)?,
            r.get::<_, Option<String>>(10)?,
        ))
    })?;

    let mut count = 0usize;
    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "trip", "trip_date", "client", "phone", "number", "of", "amount", "due_date",
                "status", "kind", "paid_on",
            ])?;
            for row in rows {
                let (trip, td, client, phone, n, of, amt, due, status, kind, paid_on) = row?;
                wtr.write_record([
                    trip,
                    td,
                    client,
                    phone.unwrap_or_default(),
                    n.to_string(),
                    of.to_string(),
                    amt,
                    due,
                    status,
                    kind,
                    paid_on.unwrap_or_default(),
                ])?;
                count += 1;
            }
            wtr.flush()?;
        }
        _ => {
            let mut items = Vec::new();
            for row in rows {
                let (trip, td, client, phone, n, of, amt, due, status, kind, paid_on) = row?;
                items.push(json!({
                    "trip": trip, "trip_date": td, "client": client, "phone": phone,
                    "number": n, "of": of, "amount": amt, "due_date": due,
                    "status": status, "kind": kind, "paid_on": paid_on
                }));
            }
            count = items.len();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    info!(count, path = %out, format = %fmt, "installments exported");
    println!("Exported {} installment(s) to {}", count, out);
    Ok(())
}
