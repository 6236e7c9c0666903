// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::reschedule_installments;
use crate::commands::plans::insert_installments;
use crate::models::{InstallmentStatus, ScheduleKind};
use crate::utils::{
    booking_id, fmt_money, get_currency, id_for_client, id_for_trip, load_installments,
    load_plan_config, load_trip, maybe_print_json, parse_date, parse_date_list,
    parse_decimal, parse_decimal_list, pretty_table, today_from,
};
use anyhow::{Result, anyhow};
use chrono::{Duration, NaiveDate};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::info;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("pay", sub)) => pay(conn, sub)?,
        Some(("reschedule", sub)) => reschedule(conn, sub)?,
        Some(("remind", sub)) => remind(conn, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct InstallmentRow {
    pub trip: String,
    pub client: String,
    pub number: u32,
    pub total_installments: u32,
    pub amount: String,
    pub due_date: String,
    pub status: String,
    pub schedule_kind: String,
    pub paid_on: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<InstallmentRow>> {
    let mut sql = String::from(
        "SELECT t.name, c.name, i.number, i.total_installments, i.amount, i.due_date, i.status, i.schedule_kind, i.paid_on
         FROM installments i
         JOIN bookings b ON i.booking_id=b.id
         JOIN trips t ON b.trip_id=t.id
         JOIN clients c ON b.client_id=c.id
         WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();
    if let Some(trip) = sub.get_one::<String>("trip") {
        sql.push_str(" AND t.name=?");
        params_vec.push(trip.trim().into());
    }
    if let Some(client) = sub.get_one::<String>("client") {
        sql.push_str(" AND c.name=?");
        params_vec.push(client.trim().into());
    }
    if let Some(status) = sub.get_one::<String>("status") {
        let status = status.parse::<InstallmentStatus>()?;
        sql.push_str(" AND i.status=?");
        params_vec.push(status.as_str().into());
    }
    sql.push_str(" ORDER BY i.due_date, t.name, c.name, i.number");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(rusqlite::params_from_iter(params_vec.iter()))?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        data.push(InstallmentRow {
            trip: r.get(0)?,
            client: r.get(1)?,
            number: r.get(2)?,
            total_installments: r.get(3)?,
            amount: r.get(4)?,
            due_date: r.get(5)?,
            status: r.get(6)?,
            schedule_kind: r.get(7)?,
            paid_on: r.get::<_, Option<String>>(8)?.unwrap_or_default(),
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .into_iter()
        .map(|r| {
            vec![
                r.trip,
                r.client,
                format!("{}/{}", r.number, r.total_installments),
                r.amount,
                r.due_date,
                r.status,
                r.schedule_kind,
                r.paid_on,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Trip", "Client", "#", "Amount", "Due", "Status", "Kind", "Paid on"],
            rows
        )
    );
    Ok(())
}

fn pay(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip = sub.get_one::<String>("trip").unwrap();
    let client = sub.get_one::<String>("client").unwrap();
    let number = *sub.get_one::<u32>("number").unwrap();
    let paid_on = match sub.get_one::<String>("date") {
        Some(raw) => parse_date(raw)?,
        None => today_from(sub)?,
    };
    let bid = booking_id(conn, id_for_trip(conn, trip)?, id_for_client(conn, client)?)?;

    let mut inst = load_installments(conn, bid)?
        .into_iter()
        .find(|i| i.number == number)
        .ok_or_else(|| anyhow!("Installment {} not found for this booking", number))?;
    inst.mark_paid()?;

    conn.execute(
        "UPDATE installments SET status=?1, paid_on=?2 WHERE booking_id=?3 AND number=?4",
        params![inst.status.as_str(), paid_on.to_string(), bid, number],
    )?;
    info!(booking_id = bid, number, %paid_on, "installment paid");
    println!(
        "Installment {}/{} of {} paid on {}",
        inst.number,
        inst.total_installments,
        fmt_money(&inst.amount, &get_currency(conn)?),
        paid_on
    );
    Ok(())
}

fn reschedule(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let trip = load_trip(conn, sub.get_one::<String>("trip").unwrap())?;
    let client_id = id_for_client(conn, sub.get_one::<String>("client").unwrap())?;
    let bid = booking_id(conn, trip.id, client_id)?;
    let dates = parse_date_list(sub.get_one::<String>("dates").unwrap())?;
    let amounts: Option<Vec<Decimal>> = sub
        .get_one::<String>("amounts")
        .map(|s| parse_decimal_list(s))
        .transpose()?;
    let cfg = load_plan_config(conn)?;

    let current = load_installments(conn, bid)?;
    let updated =
        reschedule_installments(&current, &dates, amounts.as_deref(), trip.trip_date, &cfg)?;

    let tx = conn.transaction()?;
    tx.execute("DELETE FROM installments WHERE booking_id=?1", params![bid])?;
    insert_installments(&tx, &updated)?;
    tx.execute(
        "UPDATE bookings SET schedule_kind=?1 WHERE id=?2",
        params![ScheduleKind::Custom.as_str(), bid],
    )?;
    tx.commit()?;

    info!(booking_id = bid, count = updated.len(), "schedule rescheduled");
    let ccy = get_currency(conn)?;
    println!("Rescheduled {} installment(s) for '{}'", updated.len(), trip.name);
    for i in &updated {
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

#[derive(Debug, Clone, Serialize)]
pub struct Reminder {
    pub client: String,
    pub phone: Option<String>,
    pub trip: String,
    pub trip_date: NaiveDate,
    pub number: u32,
    pub total_installments: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
}

/// Pending installments due on or before `horizon`, overdue ones included.
pub fn due_reminders(conn: &Connection, horizon: NaiveDate) -> Result<Vec<Reminder>> {
    let mut stmt = conn.prepare(
        "SELECT c.name, c.phone, t.name, t.trip_date, i.number, i.total_installments, i.amount, i.due_date
         FROM installments i
         JOIN bookings b ON i.booking_id=b.id
         JOIN trips t ON b.trip_id=t.id
         JOIN clients c ON b.client_id=c.id
         WHERE i.status='pending' AND i.due_date<=?1
         ORDER BY i.due_date, c.name, t.name, i.number",
    )?;
    let mut rows = stmt.query(params![horizon.to_string()])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let trip_date: String = r.get(3)?;
        let amount: String = r.get(6)?;
        let due: String = r.get(7)?;
        out.push(Reminder {
            client: r.get(0)?,
            phone: r.get(1)?,
            trip: r.get(2)?,
            trip_date: parse_date(&trip_date)?,
            number: r.get(4)?,
            total_installments: r.get(5)?,
            amount: parse_decimal(&amount)?,
            due_date: parse_date(&due)?,
        });
    }
    Ok(out)
}

/// Chat message for one reminder.
pub fn render_reminder(r: &Reminder, ccy: &str, today: NaiveDate) -> String {
    let when = if r.due_date < today {
        format!("was due on {} and is overdue", r.due_date)
    } else if r.due_date == today {
        "is due today".to_string()
    } else {
        format!("is due on {}", r.due_date)
    };
    format!(
        "Hi {}! A reminder about your trip \"{}\" on {}.\nInstallment {}/{} of {} {}.\nReply here once it is paid. See you on board!",
        r.client,
        r.trip,
        r.trip_date,
        r.number,
        r.total_installments,
        fmt_money(&r.amount, ccy),
        when
    )
}

fn remind(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let today = today_from(sub)?;
    let days = *sub.get_one::<i64>("days").unwrap();
    let horizon = today + Duration::days(days);
    let reminders = due_reminders(conn, horizon)?;
    if reminders.is_empty() {
        println!("No installments due by {}", horizon);
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    for r in &reminders {
        println!("To: {} ({})", r.client, r.phone.as_deref().unwrap_or("no phone"));
        println!("{}", render_reminder(r, &ccy, today));
        println!();
    }
    Ok(())
}
