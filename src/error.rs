// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

/// Rejected inputs to option generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidInputError {
    #[error("invalid date: trip date {trip_date} must be after {today}")]
    InvalidDate { trip_date: NaiveDate, today: NaiveDate },

    #[error("invalid amount: {0} must be greater than zero")]
    InvalidAmount(Decimal),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Rejected edits to an existing schedule. Nothing is changed when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("already paid: installment {number} cannot be changed")]
    AlreadyPaid { number: u32 },

    #[error("past cutoff: installment {number} due {due_date} is after cutoff {cutoff}")]
    PastCutoff {
        number: u32,
        due_date: NaiveDate,
        cutoff: NaiveDate,
    },

    #[error("amount mismatch: new amounts sum to {actual}, expected {expected}")]
    AmountMismatch { expected: Decimal, actual: Decimal },

    #[error("invalid amount: installment {number} cannot be {amount}")]
    InvalidAmount { number: u32, amount: Decimal },

    #[error("length mismatch: got {actual} values for {expected} installments")]
    LengthMismatch { expected: usize, actual: usize },
}

impl ScheduleError {
    pub fn kind(&self) -> &'static str {
        match self {
            ScheduleError::AlreadyPaid { .. } => "already paid",
            ScheduleError::PastCutoff { .. } => "past cutoff",
            ScheduleError::AmountMismatch { .. } => "amount mismatch",
            ScheduleError::InvalidAmount { .. } => "invalid amount",
            ScheduleError::LengthMismatch { .. } => "length mismatch",
        }
    }
}

impl InvalidInputError {
    pub fn kind(&self) -> &'static str {
        match self {
            InvalidInputError::InvalidDate { .. } => "invalid date",
            InvalidInputError::InvalidAmount(_) => "invalid amount",
            InvalidInputError::InvalidConfig(_) => "invalid config",
        }
    }
}
