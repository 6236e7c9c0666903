// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Installment plans for a trip total.
//!
//! Everything here is a pure function of its arguments. The current date is
//! always passed in as `today`, so callers decide which clock to trust.

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::error::{InvalidInputError, ScheduleError};
use crate::models::{
    Installment, InstallmentOption, InstallmentStatus, OptionKind, PlanConfig, ScheduleKind,
    round_cents,
};

const MAX_DAY_SPAN: i64 = 3650;
const MAX_INSTALLMENTS: u32 = 120;

/// Last day on which an installment may fall due for a trip on `trip_date`.
pub fn cutoff_date(trip_date: NaiveDate, cutoff_days_before_trip: i64) -> Option<NaiveDate> {
    trip_date.checked_sub_signed(Duration::days(cutoff_days_before_trip))
}

pub fn validate_due_date(
    date: NaiveDate,
    trip_date: NaiveDate,
    cutoff_days_before_trip: i64,
) -> bool {
    match cutoff_date(trip_date, cutoff_days_before_trip) {
        Some(cutoff) => date <= cutoff,
        None => false,
    }
}

pub fn validate_config(config: &PlanConfig) -> Result<(), InvalidInputError> {
    if !(0..=MAX_DAY_SPAN).contains(&config.cutoff_days_before_trip) {
        return Err(InvalidInputError::InvalidConfig(format!(
            "cutoff days must be between 0 and {}, got {}",
            MAX_DAY_SPAN, config.cutoff_days_before_trip
        )));
    }
    if !(1..=MAX_DAY_SPAN).contains(&config.min_days_between_installments) {
        return Err(InvalidInputError::InvalidConfig(format!(
            "days between installments must be between 1 and {}, got {}",
            MAX_DAY_SPAN, config.min_days_between_installments
        )));
    }
    if !(1..=MAX_INSTALLMENTS).contains(&config.max_installments) {
        return Err(InvalidInputError::InvalidConfig(format!(
            "max installments must be between 1 and {}, got {}",
            MAX_INSTALLMENTS, config.max_installments
        )));
    }
    let pct = config.full_payment_discount_percent;
    if pct.is_sign_negative() || pct >= Decimal::ONE_HUNDRED {
        return Err(InvalidInputError::InvalidConfig(format!(
            "full payment discount must be in [0, 100), got {}",
            pct
        )));
    }
    Ok(())
}

/// Payment options for `total_amount` on a trip leaving on `trip_date`.
///
/// The full payment option always comes first, followed by every installment
/// count from 2 up to `config.max_installments` whose schedule, starting
/// `today` and spaced `min_days_between_installments` apart, finishes on or
/// before the cutoff.
pub fn compute_options(
    trip_date: NaiveDate,
    total_amount: Decimal,
    config: &PlanConfig,
    today: NaiveDate,
) -> Result<Vec<InstallmentOption>, InvalidInputError> {
    if trip_date <= today {
        return Err(InvalidInputError::InvalidDate { trip_date, today });
    }
    if total_amount <= Decimal::ZERO {
        return Err(InvalidInputError::InvalidAmount(total_amount));
    }
    validate_config(config)?;

    let cutoff = cutoff_date(trip_date, config.cutoff_days_before_trip)
        .ok_or(InvalidInputError::InvalidDate { trip_date, today })?;

    let mut options = vec![full_payment_option(total_amount, config, today, cutoff)];

    let step = Duration::days(config.min_days_between_installments);
    for count in 2..=config.max_installments {
        let due_dates: Vec<NaiveDate> = (0..count)
            .map_while(|i| today.checked_add_signed(step * i as i32))
            .collect();
        match due_dates.last() {
            Some(last) if due_dates.len() == count as usize && *last <= cutoff => {}
            _ => break,
        }

        let per = round_cents(total_amount / Decimal::from(count));
        let charged = per * Decimal::from(count);
        if charged != total_amount {
            warn!(
                count,
                %per,
                %charged,
                total = %total_amount,
                "installment rounding drift; remainder goes to the last installment"
            );
        }
        options.push(InstallmentOption {
            kind: OptionKind::Installments,
            installment_count: count,
            amount_per_installment: per,
            total_amount,
            original_amount: total_amount,
            discount_amount: Decimal::ZERO,
            due_dates,
            description: format!("{}x of {}", count, per),
            is_valid: true,
        });
    }

    debug!(
        %trip_date,
        %cutoff,
        total = %total_amount,
        options = options.len(),
        "computed installment options"
    );
    Ok(options)
}

fn full_payment_option(
    total_amount: Decimal,
    config: &PlanConfig,
    today: NaiveDate,
    cutoff: NaiveDate,
) -> InstallmentOption {
    let pct = config.full_payment_discount_percent;
    let discount = round_cents(total_amount * pct / Decimal::ONE_HUNDRED);
    let amount = total_amount - discount;
    let description = if discount > Decimal::ZERO {
        format!(
            "Full payment with {}% discount ({} off)",
            pct.normalize(),
            discount
        )
    } else {
        "Full payment".to_string()
    };
    InstallmentOption {
        kind: OptionKind::Full,
        installment_count: 1,
        amount_per_installment: amount,
        total_amount: amount,
        original_amount: total_amount,
        discount_amount: discount,
        due_dates: vec![today.min(cutoff)],
        description,
        is_valid: today <= cutoff,
    }
}

/// Concrete pending installments for a chosen option.
pub fn build_installments(option: &InstallmentOption, owner_id: i64) -> Vec<Installment> {
    let total = option.installment_count;
    option
        .amounts()
        .into_iter()
        .zip(option.due_dates.iter().copied())
        .enumerate()
        .map(|(i, (amount, due_date))| Installment {
            owner_id,
            number: i as u32 + 1,
            total_installments: total,
            amount,
            due_date,
            status: InstallmentStatus::Pending,
            schedule_kind: option.kind.into(),
        })
        .collect()
}

/// Moves an unpaid schedule to new due dates, optionally with new amounts.
///
/// Returns a fresh `custom` schedule; `installments` is left untouched on
/// both success and failure. A paid installment anywhere in the batch fails
/// the whole edit before any other check.
pub fn reschedule_installments(
    installments: &[Installment],
    new_due_dates: &[NaiveDate],
    new_amounts: Option<&[Decimal]>,
    trip_date: NaiveDate,
    config: &PlanConfig,
) -> Result<Vec<Installment>, ScheduleError> {
    if let Some(paid) = installments.iter().find(|i| i.is_paid()) {
        return Err(ScheduleError::AlreadyPaid {
            number: paid.number,
        });
    }
    if new_due_dates.len() != installments.len() {
        return Err(ScheduleError::LengthMismatch {
            expected: installments.len(),
            actual: new_due_dates.len(),
        });
    }
    if let Some(amounts) = new_amounts {
        if amounts.len() != installments.len() {
            return Err(ScheduleError::LengthMismatch {
                expected: installments.len(),
                actual: amounts.len(),
            });
        }
    }

    let cutoff = cutoff_date(trip_date, config.cutoff_days_before_trip);
    for (inst, due) in installments.iter().zip(new_due_dates) {
        if !validate_due_date(*due, trip_date, config.cutoff_days_before_trip) {
            return Err(ScheduleError::PastCutoff {
                number: inst.number,
                due_date: *due,
                cutoff: cutoff.unwrap_or(NaiveDate::MIN),
            });
        }
    }

    if let Some(amounts) = new_amounts {
        // each installment is a positive whole-cent payment
        for (inst, amount) in installments.iter().zip(amounts) {
            if *amount <= Decimal::ZERO || amount.normalize().scale() > 2 {
                return Err(ScheduleError::InvalidAmount {
                    number: inst.number,
                    amount: *amount,
                });
            }
        }
        let expected: Decimal = installments.iter().map(|i| i.amount).sum();
        let actual: Decimal = amounts.iter().sum();
        if expected != actual {
            return Err(ScheduleError::AmountMismatch { expected, actual });
        }
    }

    let out: Vec<Installment> = installments
        .iter()
        .enumerate()
        .map(|(idx, inst)| Installment {
            due_date: new_due_dates[idx],
            amount: new_amounts.map_or(inst.amount, |a| {
                let mut amount = a[idx];
                amount.rescale(2);
                amount
            }),
            schedule_kind: ScheduleKind::Custom,
            ..inst.clone()
        })
        .collect();
    debug!(count = out.len(), %trip_date, "rescheduled installments");
    Ok(out)
}
