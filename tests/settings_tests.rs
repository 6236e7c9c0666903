// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use caravan::{cli, commands::settings, db, utils};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["caravan", "settings"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("settings", sub)) = matches.subcommand() {
        settings::handle(conn, sub)
    } else {
        panic!("settings command not parsed");
    }
}

#[test]
fn defaults_without_stored_settings() {
    let conn = setup();
    let cfg = utils::load_plan_config(&conn).unwrap();
    assert_eq!(cfg, caravan::models::PlanConfig::default());
    assert_eq!(utils::get_currency(&conn).unwrap(), "BRL");
}

#[test]
fn set_updates_plan_config() {
    let conn = setup();
    run(&conn, &["set", "--key", "full_payment_discount", "--value", " 5 "]).unwrap();
    run(&conn, &["set", "--key", "max_installments", "--value", "6"]).unwrap();
    run(&conn, &["set", "--key", " cutoff_days ", "--value", "10"]).unwrap();

    let cfg = utils::load_plan_config(&conn).unwrap();
    assert_eq!(cfg.full_payment_discount_percent, Decimal::new(5, 0));
    assert_eq!(cfg.max_installments, 6);
    assert_eq!(cfg.cutoff_days_before_trip, 10);
    assert_eq!(cfg.min_days_between_installments, 15);
}

#[test]
fn set_rejects_invalid_values_without_storing() {
    let conn = setup();
    let err = run(&conn, &["set", "--key", "full_payment_discount", "--value", "150"]).unwrap_err();
    assert!(err.to_string().contains("invalid config"));
    assert!(utils::get_setting(&conn, "full_payment_discount").unwrap().is_none());

    let err = run(&conn, &["set", "--key", "min_days_between", "--value", "soon"]).unwrap_err();
    assert!(err.to_string().contains("Invalid value 'soon'"));

    let err = run(&conn, &["set", "--key", "colour", "--value", "blue"]).unwrap_err();
    assert!(err.to_string().contains("Unknown setting 'colour'"));
}

#[test]
fn currency_is_uppercased_and_reset_restores_default() {
    let conn = setup();
    run(&conn, &["set", "--key", "currency", "--value", "usd"]).unwrap();
    assert_eq!(utils::get_currency(&conn).unwrap(), "USD");

    run(&conn, &["reset", "--key", "currency"]).unwrap();
    assert_eq!(utils::get_currency(&conn).unwrap(), "BRL");
}

#[test]
fn overrides_win_over_stored_settings() {
    let conn = setup();
    utils::set_setting(&conn, "max_installments", "6").unwrap();
    let matches = cli::build_cli().get_matches_from([
        "caravan",
        "plan",
        "options",
        "--trip",
        "Rio",
        "--max-installments",
        "2",
        "--discount",
        "2.5",
    ]);
    let (_, plan) = matches.subcommand().unwrap();
    let (_, opts) = plan.subcommand().unwrap();
    let cfg = utils::plan_config_with_overrides(&conn, opts).unwrap();
    assert_eq!(cfg.max_installments, 2);
    assert_eq!(cfg.full_payment_discount_percent, Decimal::new(25, 1));
}

#[test]
fn corrupt_stored_setting_is_reported() {
    let conn = setup();
    utils::set_setting(&conn, "cutoff_days", "five").unwrap();
    let err = utils::load_plan_config(&conn).unwrap_err();
    assert!(err.to_string().contains("Invalid setting cutoff_days='five'"));
}
