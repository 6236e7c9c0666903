// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::Client;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, params};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            if name.is_empty() {
                bail!("Client name cannot be empty");
            }
            let phone = sub
                .get_one::<String>("phone")
                .map(|s| s.trim())
                .filter(|s| !s.is_empty());
            conn.execute(
                "INSERT INTO clients(name, phone) VALUES (?1, ?2)",
                params![name, phone],
            )
            .with_context(|| format!("Could not add client '{}'", name))?;
            println!("Added client '{}'", name);
        }
        Some(("list", sub)) => {
            let mut stmt = conn.prepare("SELECT id, name, phone FROM clients ORDER BY name")?;
            let rows = stmt.query_map([], |r| {
                Ok(Client {
                    id: r.get(0)?,
                    name: r.get(1)?,
                    phone: r.get(2)?,
                })
            })?;
            let mut clients = Vec::new();
            for row in rows {
                clients.push(row?);
            }
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &clients)? {
                let data = clients
                    .into_iter()
                    .map(|c| vec![c.name, c.phone.unwrap_or_default()])
                    .collect();
                println!("{}", pretty_table(&["Client", "Phone"], data));
            }
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            let paid: i64 = conn.query_row(
                "SELECT COUNT(*) FROM installments i
                 JOIN bookings b ON i.booking_id=b.id
                 JOIN clients c ON b.client_id=c.id
                 WHERE c.name=?1 AND i.status='paid'",
                params![name],
                |r| r.get(0),
            )?;
            if paid > 0 {
                bail!(
                    "Client '{}' has {} paid installment(s) on record and cannot be removed",
                    name,
                    paid
                );
            }
            let n = conn.execute("DELETE FROM clients WHERE name=?1", params![name])?;
            if n == 0 {
                bail!("Client '{}' not found", name);
            }
            println!("Removed client '{}'", name);
        }
        _ => {}
    }
    Ok(())
}
