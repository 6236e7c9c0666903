// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Trip;
use crate::utils::{
    fmt_money, get_currency, maybe_print_json, parse_date, parse_decimal, pretty_table,
};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let paid: i64 = conn.query_row(
                "SELECT COUNT(*) FROM installments i
                 JOIN bookings b ON i.booking_id=b.id
                 JOIN trips t ON b.trip_id=t.id
                 WHERE t.name=?1 AND i.status='paid'",
                params![name],
                |r| r.get(0),
            )?;
            if paid > 0 {
                bail!(
                    "Trip '{}' has {} paid installment(s) on record and cannot be removed",
                    name,
                    paid
                );
            }
            let n = conn.execute("DELETE FROM trips WHERE name=?1", params![name])?;
            if n == 0 {
                bail!("Trip '{}' not found", name);
            }
            info!(trip = name, "trip removed");
            println!("Removed trip '{}'", name);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let name = sub.get_one::<String>("name").unwrap().trim().to_string();
    let date = parse_date(sub.get_one::<String>("date").unwrap())?;
    let price = parse_decimal(sub.get_one::<String>("price").unwrap())?;
    let destination = sub
        .get_one::<String>("destination")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    if name.is_empty() {
        bail!("Trip name cannot be empty");
    }
    if price <= Decimal::ZERO {
        bail!("Trip price must be greater than zero, got {}", price);
    }
    conn.execute(
        "INSERT INTO trips(name, destination, trip_date, price) VALUES (?1, ?2, ?3, ?4)",
        params![name, destination, date.to_string(), price.to_string()],
    )
    .with_context(|| format!("Could not add trip '{}'", name))?;
    info!(trip = %name, %date, %price, "trip added");
    println!(
        "Added trip '{}' on {} ({})",
        name,
        date,
        fmt_money(&price, &get_currency(conn)?)
    );
    Ok(())
}

pub fn query_trips(conn: &Connection) -> Result<Vec<Trip>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, destination, trip_date, price FROM trips ORDER BY trip_date, name",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, Option<String>>(2)?,
            r.get::<_, String>(3)?,
            r.get::<_, String>(4)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, name, destination, d, p) = row?;
        out.push(Trip {
            id,
            trip_date: parse_date(&d)?,
            price: parse_decimal(&p)
                .with_context(|| format!("Invalid price '{}' for trip {}", p, name))?,
            name,
            destination,
        });
    }
    Ok(out)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trips = query_trips(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &trips)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = trips
        .into_iter()
        .map(|t| {
            vec![
                t.name,
                t.destination.unwrap_or_default(),
                t.trip_date.to_string(),
                fmt_money(&t.price, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Trip", "Destination", "Date", "Price"], rows)
    );
    Ok(())
}
