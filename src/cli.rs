// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    ]
}

fn required(id: &'static str, help: &'static str) -> Arg {
    Arg::new(id).long(id).required(true).help(help)
}

fn booking_args() -> [Arg; 2] {
    [
        required("trip", "Trip name"),
        required("client", "Client name"),
    ]
}

fn plan_overrides() -> [Arg; 4] {
    [
        Arg::new("cutoff_days")
            .long("cutoff-days")
            .value_parser(value_parser!(i64))
            .help("Days before the trip by which everything must be paid"),
        Arg::new("min_days")
            .long("min-days")
            .value_parser(value_parser!(i64))
            .help("Minimum days between installments"),
        Arg::new("max_installments")
            .long("max-installments")
            .value_parser(value_parser!(u32))
            .help("Largest installment count to offer"),
        Arg::new("discount")
            .long("discount")
            .help("Full payment discount, in percent"),
    ]
}

pub fn build_cli() -> Command {
    Command::new("caravan")
        .version(crate_version!())
        .about("Trip bookings, installment plans, and receivables")
        .arg(
            Arg::new("today")
                .long("today")
                .global(true)
                .help("Treat this date (YYYY-MM-DD) as today"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Debug logging on stderr"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("trip")
                .about("Manage trips")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Trip name"))
                        .arg(required("date", "Departure date, YYYY-MM-DD"))
                        .arg(required("price", "Price per passenger"))
                        .arg(Arg::new("destination").long("destination")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("rm").arg(required("name", "Trip name"))),
        )
        .subcommand(
            Command::new("client")
                .about("Manage clients")
                .subcommand(
                    Command::new("add")
                        .arg(required("name", "Client name"))
                        .arg(Arg::new("phone").long("phone")),
                )
                .subcommand(Command::new("list").args(json_args()))
                .subcommand(Command::new("rm").arg(required("name", "Client name"))),
        )
        .subcommand(
            Command::new("plan")
                .about("Payment plans for a trip")
                .subcommand(
                    Command::new("options")
                        .arg(required("trip", "Trip name"))
                        .arg(Arg::new("amount").long("amount").help("Total instead of trip price"))
                        .args(plan_overrides())
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("book")
                        .args(booking_args())
                        .arg(
                            Arg::new("installments")
                                .long("installments")
                                .value_parser(value_parser!(u32))
                                .default_value("1")
                                .help("1 for full payment"),
                        )
                        .arg(Arg::new("amount").long("amount").help("Total instead of trip price"))
                        .args(plan_overrides()),
                ),
        )
        .subcommand(
            Command::new("installment")
                .about("Booked installments")
                .subcommand(
                    Command::new("list")
                        .arg(Arg::new("trip").long("trip"))
                        .arg(Arg::new("client").long("client"))
                        .arg(Arg::new("status").long("status").help("pending|paid"))
                        .args(json_args()),
                )
                .subcommand(
                    Command::new("pay")
                        .args(booking_args())
                        .arg(
                            Arg::new("number")
                                .long("number")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(Arg::new("date").long("date").help("Payment date, defaults to today")),
                )
                .subcommand(
                    Command::new("reschedule")
                        .args(booking_args())
                        .arg(required("dates", "Comma separated due dates, one per installment"))
                        .arg(Arg::new("amounts").long("amounts").help("Comma separated amounts")),
                )
                .subcommand(
                    Command::new("remind").arg(
                        Arg::new("days")
                            .long("days")
                            .value_parser(value_parser!(i64).range(0..=3650))
                            .default_value("7")
                            .help("Look-ahead window in days"),
                    ),
                ),
        )
        .subcommand(
            Command::new("settings")
                .about("Plan defaults")
                .subcommand(Command::new("show").args(json_args()))
                .subcommand(
                    Command::new("set")
                        .arg(required("key", "Setting name"))
                        .arg(required("value", "New value")),
                )
                .subcommand(Command::new("reset").arg(required("key", "Setting name"))),
        )
        .subcommand(
            Command::new("report")
                .about("Reports")
                .subcommand(Command::new("receivables").args(json_args())),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("installments")
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .default_value("csv")
                                .help("csv|json"),
                        )
                        .arg(required("out", "Output path")),
                ),
        )
        .subcommand(
            Command::new("doctor")
                .about("Check bookings for problems")
                .args(json_args()),
        )
}
