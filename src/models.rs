// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ScheduleError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trip {
    pub id: i64,
    pub name: String,
    pub destination: Option<String>,
    pub trip_date: NaiveDate,
    pub price: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    Full,
    Installments,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Full,
    Installments,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstallmentStatus {
    Pending,
    Paid,
}

impl From<OptionKind> for ScheduleKind {
    fn from(kind: OptionKind) -> Self {
        match kind {
            OptionKind::Full => ScheduleKind::Full,
            OptionKind::Installments => ScheduleKind::Installments,
        }
    }
}

impl ScheduleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleKind::Full => "full",
            ScheduleKind::Installments => "installments",
            ScheduleKind::Custom => "custom",
        }
    }
}

impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScheduleKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "full" => Ok(ScheduleKind::Full),
            "installments" => Ok(ScheduleKind::Installments),
            "custom" => Ok(ScheduleKind::Custom),
            other => Err(anyhow::anyhow!("Unknown schedule kind '{}'", other)),
        }
    }
}

impl InstallmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InstallmentStatus::Pending => "pending",
            InstallmentStatus::Paid => "paid",
        }
    }
}

impl fmt::Display for InstallmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstallmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(InstallmentStatus::Pending),
            "paid" => Ok(InstallmentStatus::Paid),
            other => Err(anyhow::anyhow!(
                "Unknown status '{}', expected pending|paid",
                other
            )),
        }
    }
}

/// Tunables for option generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanConfig {
    pub cutoff_days_before_trip: i64,
    pub min_days_between_installments: i64,
    pub max_installments: u32,
    pub full_payment_discount_percent: Decimal,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            cutoff_days_before_trip: 5,
            min_days_between_installments: 15,
            max_installments: 4,
            full_payment_discount_percent: Decimal::ZERO,
        }
    }
}

/// One way of paying a trip total, as offered to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallmentOption {
    pub kind: OptionKind,
    pub installment_count: u32,
    pub amount_per_installment: Decimal,
    pub total_amount: Decimal,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
    pub due_dates: Vec<NaiveDate>,
    pub description: String,
    pub is_valid: bool,
}

impl InstallmentOption {
    /// Amounts actually charged per installment. The rounding remainder lands on the last one.
    pub fn amounts(&self) -> Vec<Decimal> {
        split_amount(self.total_amount, self.installment_count)
    }
}

/// Rounds to cents, half away from zero.
pub fn round_cents(d: Decimal) -> Decimal {
    d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Splits `total` into `count` cent-rounded parts that sum exactly to `total`.
pub fn split_amount(total: Decimal, count: u32) -> Vec<Decimal> {
    if count == 0 {
        return Vec::new();
    }
    let per = round_cents(total / Decimal::from(count));
    let mut out = vec![per; count as usize];
    let head = per * Decimal::from(count - 1);
    if let Some(last) = out.last_mut() {
        *last = total - head;
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Installment {
    pub owner_id: i64,
    pub number: u32,
    pub total_installments: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub status: InstallmentStatus,
    pub schedule_kind: ScheduleKind,
}

impl Installment {
    pub fn is_paid(&self) -> bool {
        self.status == InstallmentStatus::Paid
    }

    pub fn mark_paid(&mut self) -> Result<(), ScheduleError> {
        if self.is_paid() {
            return Err(ScheduleError::AlreadyPaid {
                number: self.number,
            });
        }
        self.status = InstallmentStatus::Paid;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_puts_remainder_on_last() {
        let parts = split_amount(Decimal::new(80000, 2), 3);
        assert_eq!(
            parts,
            vec![
                Decimal::new(26667, 2),
                Decimal::new(26667, 2),
                Decimal::new(26666, 2)
            ]
        );
        assert_eq!(parts.iter().sum::<Decimal>(), Decimal::new(80000, 2));
    }

    #[test]
    fn split_even_total_is_uniform() {
        let parts = split_amount(Decimal::new(1000, 0), 4);
        assert!(parts.iter().all(|p| *p == Decimal::new(250, 0)));
    }

    #[test]
    fn mark_paid_twice_fails() {
        let mut inst = Installment {
            owner_id: 1,
            number: 1,
            total_installments: 1,
            amount: Decimal::ONE,
            due_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            status: InstallmentStatus::Pending,
            schedule_kind: ScheduleKind::Full,
        };
        inst.mark_paid().unwrap();
        assert_eq!(
            inst.mark_paid(),
            Err(ScheduleError::AlreadyPaid { number: 1 })
        );
    }

    #[test]
    fn status_parses_trimmed() {
        assert_eq!(
            " paid ".parse::<InstallmentStatus>().unwrap(),
            InstallmentStatus::Paid
        );
        assert!("late".parse::<InstallmentStatus>().is_err());
    }
}
