// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use caravan::models::{Installment, InstallmentStatus, PlanConfig, ScheduleKind};
use caravan::{
    ScheduleError, build_installments, compute_options, reschedule_installments,
    validate_due_date,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn dec(s: &str) -> Decimal {
    Decimal::from_str_exact(s).unwrap()
}

fn trip() -> NaiveDate {
    d(2025, 8, 1)
}

fn three_installments() -> Vec<Installment> {
    let opts = compute_options(trip(), dec("800.00"), &PlanConfig::default(), d(2025, 6, 1))
        .unwrap();
    let three = opts.iter().find(|o| o.installment_count == 3).unwrap();
    build_installments(three, 1)
}

fn new_dates() -> Vec<NaiveDate> {
    vec![d(2025, 6, 10), d(2025, 7, 1), d(2025, 7, 27)]
}

#[test]
fn validate_due_date_is_inclusive_of_cutoff() {
    assert!(validate_due_date(d(2025, 7, 27), trip(), 5));
    assert!(!validate_due_date(d(2025, 7, 28), trip(), 5));
    assert!(validate_due_date(d(2025, 7, 31), trip(), 0));
    assert!(validate_due_date(trip(), trip(), 0));
}

#[test]
fn reschedule_moves_dates_and_marks_custom() {
    let insts = three_installments();
    let out =
        reschedule_installments(&insts, &new_dates(), None, trip(), &PlanConfig::default())
            .unwrap();

    assert_eq!(
        out.iter().map(|i| i.due_date).collect::<Vec<_>>(),
        new_dates()
    );
    assert!(out.iter().all(|i| i.schedule_kind == ScheduleKind::Custom));
    assert_eq!(
        out.iter().map(|i| i.amount).collect::<Vec<_>>(),
        insts.iter().map(|i| i.amount).collect::<Vec<_>>()
    );
    assert!(out.iter().all(|i| i.status == InstallmentStatus::Pending));
    // input untouched
    assert!(insts.iter().all(|i| i.schedule_kind == ScheduleKind::Installments));
}

#[test]
fn reschedule_accepts_new_amounts_that_reconcile() {
    let insts = three_installments();
    let amounts = [dec("400.00"), dec("200.00"), dec("200.00")];
    let out = reschedule_installments(
        &insts,
        &new_dates(),
        Some(&amounts[..]),
        trip(),
        &PlanConfig::default(),
    )
    .unwrap();
    assert_eq!(out[0].amount, dec("400.00"));
    assert_eq!(out.iter().map(|i| i.amount).sum::<Decimal>(), dec("800.00"));
}

#[test]
fn reschedule_rejects_amounts_that_do_not_reconcile() {
    let insts = three_installments();
    let amounts = [dec("400.00"), dec("200.00"), dec("199.99")];
    let err = reschedule_installments(
        &insts,
        &new_dates(),
        Some(&amounts[..]),
        trip(),
        &PlanConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::AmountMismatch {
            expected: dec("800.00"),
            actual: dec("799.99"),
        }
    );
    assert_eq!(err.kind(), "amount mismatch");
}

#[test]
fn reschedule_with_a_paid_installment_fails_and_changes_nothing() {
    let mut insts = three_installments();
    insts[1].mark_paid().unwrap();
    let before = insts.clone();

    let err =
        reschedule_installments(&insts, &new_dates(), None, trip(), &PlanConfig::default())
            .unwrap_err();
    assert_eq!(err, ScheduleError::AlreadyPaid { number: 2 });
    assert_eq!(err.kind(), "already paid");
    assert_eq!(insts, before);
}

#[test]
fn reschedule_past_cutoff_fails() {
    let insts = three_installments();
    let dates = vec![d(2025, 6, 10), d(2025, 7, 1), d(2025, 7, 28)];
    let err = reschedule_installments(&insts, &dates, None, trip(), &PlanConfig::default())
        .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::PastCutoff {
            number: 3,
            due_date: d(2025, 7, 28),
            cutoff: d(2025, 7, 27),
        }
    );
}

#[test]
fn reschedule_honours_configured_cutoff() {
    let insts = three_installments();
    let cfg = PlanConfig {
        cutoff_days_before_trip: 10,
        ..PlanConfig::default()
    };
    let err = reschedule_installments(&insts, &new_dates(), None, trip(), &cfg).unwrap_err();
    assert_eq!(err.kind(), "past cutoff");
}

#[test]
fn reschedule_requires_one_date_per_installment() {
    let insts = three_installments();
    let err = reschedule_installments(
        &insts,
        &new_dates()[..2],
        None,
        trip(),
        &PlanConfig::default(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        ScheduleError::LengthMismatch {
            expected: 3,
            actual: 2
        }
    );

    let amounts = [dec("800.00")];
    let err = reschedule_installments(
        &insts,
        &new_dates(),
        Some(&amounts[..]),
        trip(),
        &PlanConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), "length mismatch");
}

fn reschedule_with_amounts(amounts: &[&str]) -> Result<Vec<Installment>, ScheduleError> {
    let amounts: Vec<Decimal> = amounts.iter().map(|a| dec(a)).collect();
    reschedule_installments(
        &three_installments(),
        &new_dates(),
        Some(&amounts[..]),
        trip(),
        &PlanConfig::default(),
    )
}

#[test]
fn reschedule_rejects_negative_amounts_even_when_they_reconcile() {
    let err = reschedule_with_amounts(&["900.00", "-50.00", "-50.00"]).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::InvalidAmount {
            number: 2,
            amount: dec("-50.00"),
        }
    );
    assert_eq!(err.kind(), "invalid amount");
}

#[test]
fn reschedule_rejects_zero_amounts() {
    let err = reschedule_with_amounts(&["800.000", "0.00", "0.00"]).unwrap_err();
    assert_eq!(
        err,
        ScheduleError::InvalidAmount {
            number: 2,
            amount: dec("0.00"),
        }
    );
}

#[test]
fn reschedule_rejects_sub_cent_amounts() {
    let err = reschedule_with_amounts(&["266.665", "266.665", "266.67"]).unwrap_err();
    assert_eq!(err.kind(), "invalid amount");
}

#[test]
fn reschedule_stores_whole_cent_amounts_at_two_places() {
    let out = reschedule_with_amounts(&["400.000", "200", "200.0"]).unwrap();
    assert_eq!(
        out.iter().map(|i| i.amount.to_string()).collect::<Vec<_>>(),
        vec!["400.00", "200.00", "200.00"]
    );
}

#[test]
fn paid_installment_wins_over_length_mismatch() {
    let mut insts = three_installments();
    insts[0].mark_paid().unwrap();
    let err = reschedule_installments(
        &insts,
        &new_dates()[..1],
        None,
        trip(),
        &PlanConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, ScheduleError::AlreadyPaid { number: 1 });
}
