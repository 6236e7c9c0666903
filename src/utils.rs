// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::{NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::calculator::validate_config;
use crate::models::{Installment, InstallmentStatus, PlanConfig, ScheduleKind, Trip};

pub const KEY_CUTOFF_DAYS: &str = "cutoff_days";
pub const KEY_MIN_DAYS: &str = "min_days_between";
pub const KEY_MAX_INSTALLMENTS: &str = "max_installments";
pub const KEY_DISCOUNT: &str = "full_payment_discount";
pub const KEY_CURRENCY: &str = "currency";

pub const SETTING_KEYS: [&str; 5] = [
    KEY_CUTOFF_DAYS,
    KEY_MIN_DAYS,
    KEY_MAX_INSTALLMENTS,
    KEY_DISCOUNT,
    KEY_CURRENCY,
];

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Comma separated list, blanks ignored.
pub fn parse_date_list(s: &str) -> Result<Vec<NaiveDate>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_date)
        .collect()
}

pub fn parse_decimal_list(s: &str) -> Result<Vec<Decimal>> {
    s.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_decimal)
        .collect()
}

/// `--today` when given, the UTC calendar date otherwise.
pub fn today_from(m: &clap::ArgMatches) -> Result<NaiveDate> {
    match m.try_get_one::<String>("today").ok().flatten() {
        Some(raw) => parse_date(raw),
        None => Ok(Utc::now().date_naive()),
    }
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{} {:.2}", ccy, d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_trip(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM trips WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name.trim()], |r| r.get(0))
        .with_context(|| format!("Trip '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn id_for_client(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM clients WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name.trim()], |r| r.get(0))
        .with_context(|| format!("Client '{}' not found", name.trim()))?;
    Ok(id)
}

pub fn load_trip(conn: &Connection, name: &str) -> Result<Trip> {
    let row = conn
        .query_row(
            "SELECT id, name, destination, trip_date, price FROM trips WHERE name=?1",
            params![name.trim()],
            |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<String>>(2)?,
                    r.get::<_, String>(3)?,
                    r.get::<_, String>(4)?,
                ))
            },
        )
        .with_context(|| format!("Trip '{}' not found", name.trim()))?;
    let (id, name, destination, date_s, price_s) = row;
    Ok(Trip {
        id,
        trip_date: parse_date(&date_s)
            .with_context(|| format!("Invalid trip date stored for '{}'", name))?,
        price: parse_decimal(&price_s)
            .with_context(|| format!("Invalid price stored for '{}'", name))?,
        name,
        destination,
    })
}

pub fn booking_id(conn: &Connection, trip_id: i64, client_id: i64) -> Result<i64> {
    conn.query_row(
        "SELECT id FROM bookings WHERE trip_id=?1 AND client_id=?2",
        params![trip_id, client_id],
        |r| r.get(0),
    )
    .optional()?
    .ok_or_else(|| anyhow!("No booking for this client on this trip"))
}

pub fn load_installments(conn: &Connection, booking_id: i64) -> Result<Vec<Installment>> {
    let mut stmt = conn.prepare(
        "SELECT number, total_installments, amount, due_date, status, schedule_kind
         FROM installments WHERE booking_id=?1 ORDER BY number",
    )?;
    let mut rows = stmt.query(params![booking_id])?;
    let mut out = Vec::new();
    while let Some(r) = rows.next()? {
        let amount: String = r.get(2)?;
        let due: String = r.get(3)?;
        let status: String = r.get(4)?;
        let kind: String = r.get(5)?;
        out.push(Installment {
            owner_id: booking_id,
            number: r.get(0)?,
            total_installments: r.get(1)?,
            amount: amount
                .parse::<Decimal>()
                .with_context(|| format!("Invalid amount '{}' in installments", amount))?,
            due_date: parse_date(&due)?,
            status: status.parse::<InstallmentStatus>()?,
            schedule_kind: kind.parse::<ScheduleKind>()?,
        });
    }
    Ok(out)
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn reset_setting(conn: &Connection, key: &str) -> Result<()> {
    conn.execute("DELETE FROM settings WHERE key=?1", params![key])?;
    Ok(())
}

pub fn get_currency(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, KEY_CURRENCY)?.unwrap_or_else(|| "BRL".to_string()))
}

fn setting_parsed<T: std::str::FromStr>(conn: &Connection, key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match get_setting(conn, key)? {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("Invalid setting {}='{}': {}", key, raw, e)),
        None => Ok(default),
    }
}

/// Plan defaults from the settings table.
pub fn load_plan_config(conn: &Connection) -> Result<PlanConfig> {
    let d = PlanConfig::default();
    let cfg = PlanConfig {
        cutoff_days_before_trip: setting_parsed(conn, KEY_CUTOFF_DAYS, d.cutoff_days_before_trip)?,
        min_days_between_installments: setting_parsed(
            conn,
            KEY_MIN_DAYS,
            d.min_days_between_installments,
        )?,
        max_installments: setting_parsed(conn, KEY_MAX_INSTALLMENTS, d.max_installments)?,
        full_payment_discount_percent: setting_parsed(
            conn,
            KEY_DISCOUNT,
            d.full_payment_discount_percent,
        )?,
    };
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Settings merged with per-command overrides.
pub fn plan_config_with_overrides(conn: &Connection, sub: &clap::ArgMatches) -> Result<PlanConfig> {
    let mut cfg = load_plan_config(conn)?;
    if let Some(v) = sub.get_one::<i64>("cutoff_days") {
        cfg.cutoff_days_before_trip = *v;
    }
    if let Some(v) = sub.get_one::<i64>("min_days") {
        cfg.min_days_between_installments = *v;
    }
    if let Some(v) = sub.get_one::<u32>("max_installments") {
        cfg.max_installments = *v;
    }
    if let Some(raw) = sub.get_one::<String>("discount") {
        cfg.full_payment_discount_percent = parse_decimal(raw)?;
    }
    validate_config(&cfg)?;
    Ok(cfg)
}
