// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calculator::validate_config;
use crate::utils::{
    KEY_CURRENCY, KEY_CUTOFF_DAYS, KEY_DISCOUNT, KEY_MAX_INSTALLMENTS, KEY_MIN_DAYS,
    SETTING_KEYS, get_currency, load_plan_config, maybe_print_json, parse_decimal, pretty_table,
    reset_setting, set_setting,
};
use anyhow::{Context, Result, bail};
use rusqlite::Connection;
use std::collections::BTreeMap;
use tracing::info;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            let stored = set(conn, key, value)?;
            println!("{} = {}", key, stored);
        }
        Some(("reset", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            check_key(key)?;
            reset_setting(conn, key)?;
            println!("{} reset to default", key);
        }
        _ => {}
    }
    Ok(())
}

fn check_key(key: &str) -> Result<()> {
    if !SETTING_KEYS.contains(&key) {
        bail!(
            "Unknown setting '{}', expected one of: {}",
            key,
            SETTING_KEYS.join(", ")
        );
    }
    Ok(())
}

/// Validates and stores one setting, returning the normalized value.
pub fn set(conn: &Connection, key: &str, value: &str) -> Result<String> {
    check_key(key)?;
    if key == KEY_CURRENCY {
        let ccy = value.to_uppercase();
        if ccy.is_empty() || !ccy.chars().all(|c| c.is_ascii_alphabetic()) {
            bail!("Invalid currency code '{}'", value);
        }
        set_setting(conn, key, &ccy)?;
        return Ok(ccy);
    }

    let mut cfg = load_plan_config(conn)?;
    let invalid = || format!("Invalid value '{}' for {}", value, key);
    match key {
        KEY_CUTOFF_DAYS => {
            cfg.cutoff_days_before_trip = value.parse::<i64>().with_context(invalid)?
        }
        KEY_MIN_DAYS => {
            cfg.min_days_between_installments = value.parse::<i64>().with_context(invalid)?
        }
        KEY_MAX_INSTALLMENTS => cfg.max_installments = value.parse::<u32>().with_context(invalid)?,
        KEY_DISCOUNT => cfg.full_payment_discount_percent = parse_decimal(value)?,
        other => bail!("Unknown setting '{}'", other),
    }
    validate_config(&cfg)?;
    set_setting(conn, key, value)?;
    info!(key, value, "setting updated");
    Ok(value.to_string())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let cfg = load_plan_config(conn)?;
    let mut values = BTreeMap::new();
    values.insert(KEY_CUTOFF_DAYS, cfg.cutoff_days_before_trip.to_string());
    values.insert(KEY_MIN_DAYS, cfg.min_days_between_installments.to_string());
    values.insert(KEY_MAX_INSTALLMENTS, cfg.max_installments.to_string());
    values.insert(KEY_DISCOUNT, cfg.full_payment_discount_percent.to_string());
    values.insert(KEY_CURRENCY, get_currency(conn)?);

    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &values)? {
        let rows = values
            .into_iter()
            .map(|(k, v)| vec![k.to_string(), v])
            .collect();
        println!("{}", pretty_table(&["Setting", "Value"], rows));
    }
    Ok(())
}
