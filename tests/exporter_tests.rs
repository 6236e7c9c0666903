// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use caravan::{cli, commands::exporter, db};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = Connection::open_in_memory().unwrap();
    db::init_schema(&conn).unwrap();
    conn.execute_batch(
        r#"
        INSERT INTO trips(id, name, trip_date, price) VALUES (1, 'Rio Caravan', '2025-08-01', '800.00');
        INSERT INTO clients(id, name, phone) VALUES (1, 'Ana', '+55 11 99999-0000');
        INSERT INTO bookings(id, trip_id, client_id, total, schedule_kind) VALUES (1, 1, 1, '800.00', 'installments');
        INSERT INTO installments(booking_id, number, total_installments, amount, due_date, status, schedule_kind, paid_on)
            VALUES (1, 1, 2, '400.00', '2025-06-01', 'paid', 'installments', '2025-06-01');
        INSERT INTO installments(booking_id, number, total_installments, amount, due_date, status, schedule_kind)
            VALUES (1, 2, 2, '400.00', '2025-06-16', 'pending', 'installments');
        "#,
    )
    .unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "caravan",
        "export",
        "installments",
        "--format",
        format,
        "--out",
        out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_installments_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, "json", &out_str).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "trip": "Rio Caravan", "trip_date": "2025-08-01", "client": "Ana",
                "phone": "+55 11 99999-0000", "number": 1, "of": 2, "amount": "400.00",
                "due_date": "2025-06-01", "status": "paid", "kind": "installments",
                "paid_on": "2025-06-01"
            },
            {
                "trip": "Rio Caravan", "trip_date": "2025-08-01", "client": "Ana",
                "phone": "+55 11 99999-0000", "number": 2, "of": 2, "amount": "400.00",
                "due_date": "2025-06-16", "status": "pending", "kind": "installments",
                "paid_on": null
            }
        ])
    );
}

#[test]
fn export_installments_csv_has_header_and_rows() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let out_str = out_path.to_string_lossy().to_string();

    export(&conn, " CSV ", &out_str).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "trip");
    assert_eq!(&headers[10], "paid_on");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[1][4], "2");
    assert_eq!(&records[1][8], "pending");
    assert_eq!(&records[1][10], "");
}

#[test]
fn export_installments_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(export(&conn, "xml", &out_str).is_err());
    assert!(!out_path.exists());
}
