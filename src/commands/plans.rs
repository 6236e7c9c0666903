// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::{build_installments, compute_options, cutoff_date};
use crate::models::{Installment, InstallmentOption, PlanConfig, ScheduleKind, Trip};
use crate::utils::{
    fmt_money, get_currency, id_for_client, load_trip, maybe_print_json, parse_decimal,
    plan_config_with_overrides, pretty_table, today_from,
};
use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, Transaction, params};
use rust_decimal::Decimal;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("options", sub)) => options(conn, sub)?,
        Some(("book", sub)) => book(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn total_for(trip: &Trip, sub: &clap::ArgMatches) -> Result<Decimal> {
    match sub.get_one::<String>("amount") {
        Some(raw) => parse_decimal(raw),
        None => Ok(trip.price),
    }
}

fn options(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip = load_trip(conn, sub.get_one::<String>("trip").unwrap())?;
    let total = total_for(&trip, sub)?;
    let cfg = plan_config_with_overrides(conn, sub)?;
    let today = today_from(sub)?;
    let opts = compute_options(trip.trip_date, total, &cfg, today)
        .with_context(|| format!("Cannot plan payments for trip '{}'", trip.name))?;

    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &opts)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = opts
        .iter()
        .map(|o| {
            vec![
                o.installment_count.to_string(),
                o.description.clone(),
                fmt_money(&o.amount_per_installment, &ccy),
                fmt_money(&o.total_amount, &ccy),
                fmt_money(&o.discount_amount, &ccy),
                o.due_dates
                    .iter()
                    .map(NaiveDate::to_string)
                    .collect::<Vec<_>>()
                    .join(", "),
                if o.is_valid { "yes" } else { "no" }.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Count", "Plan", "Per installment", "Total", "Discount", "Due", "Valid"],
            rows
        )
    );
    Ok(())
}

fn book(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip = load_trip(conn, sub.get_one::<String>("trip").unwrap())?;
    let client_name = sub.get_one::<String>("client").unwrap().trim().to_string();
    let client_id = id_for_client(conn, &client_name)?;
    let count = *sub.get_one::<u32>("installments").unwrap();
    let total = total_for(&trip, sub)?;
    let cfg = plan_config_with_overrides(conn, sub)?;
    let today = today_from(sub)?;

    let insts = create_booking(conn, &trip, client_id, total, count, &cfg, today)?;
    let ccy = get_currency(conn)?;
    println!(
        "Booked '{}' on '{}': {} installment(s)",
        client_name,
        trip.name,
        insts.len()
    );
    for i in &insts {
        println!(
            "  {}/{}  {}  due {}",
            i.number,
            i.total_installments,
            fmt_money(&i.amount, &ccy),
            i.due_date
        );
    }
    Ok(())
}

/// Picks the `count`-installment option and stores it as a booking with its schedule.
pub fn create_booking(
    conn: &mut Connection,
    trip: &Trip,
    client_id: i64,
    total: Decimal,
    count: u32,
    cfg: &PlanConfig,
    today: NaiveDate,
) -> Result<Vec<Installment>> {
    let opts = compute_options(trip.trip_date, total, cfg, today)
        .with_context(|| format!("Cannot plan payments for trip '{}'", trip.name))?;
    let option = choose_option(&opts, count, trip, cfg)?;

    let tx = conn.transaction()?;
    let inserted = tx.execute(
        "INSERT INTO bookings(trip_id, client_id, total, schedule_kind) VALUES (?1, ?2, ?3, ?4)",
        params![
            trip.id,
            client_id,
            option.total_amount.to_string(),
            ScheduleKind::from(option.kind).as_str()
        ],
    );
    match inserted {
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            bail!("Client is already booked on '{}'", trip.name)
        }
        other => {
            other.with_context(|| format!("Could not book client on '{}'", trip.name))?;
        }
    }
    let booking_id = tx.last_insert_rowid();
    let insts = build_installments(option, booking_id);
    insert_installments(&tx, &insts)?;
    tx.commit()?;

    info!(
        booking_id,
        trip = %trip.name,
        count = insts.len(),
        total = %option.total_amount,
        "booking created"
    );
    Ok(insts)
}

fn choose_option<'a>(
    opts: &'a [InstallmentOption],
    count: u32,
    trip: &Trip,
    cfg: &PlanConfig,
) -> Result<&'a InstallmentOption> {
    let Some(option) = opts.iter().find(|o| o.installment_count == count) else {
        let offered: Vec<String> = opts
            .iter()
            .map(|o| o.installment_count.to_string())
            .collect();
        bail!(
            "No {}-installment plan fits before the cutoff for '{}'; available: {}",
            count,
            trip.name,
            offered.join(", ")
        );
    };
    if !option.is_valid {
        let cutoff = cutoff_date(trip.trip_date, cfg.cutoff_days_before_trip);
        bail!(
            "Payment cutoff for '{}' has passed ({})",
            trip.name,
            cutoff.map(|d| d.to_string()).unwrap_or_default()
        );
    }
    Ok(option)
}

pub(crate) fn insert_installments(tx: &Transaction<'_>, insts: &[Installment]) -> Result<()> {
    let mut stmt = tx.prepare(
        "INSERT INTO installments(booking_id, number, total_installments, amount, due_date, status, schedule_kind)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for i in insts {
        stmt.execute(params![
            i.owner_id,
            i.number,
            i.total_installments,
            i.amount.to_string(),
            i.due_date.to_string(),
            i.status.as_str(),
            i.schedule_kind.as_str()
        ])?;
    }
    Ok(())
}
