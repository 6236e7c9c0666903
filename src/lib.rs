// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod calculator;
pub mod cli;
pub mod commands;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod utils;

pub use calculator::{
    build_installments, compute_options, reschedule_installments, validate_due_date,
};
pub use error::{InvalidInputError, ScheduleError};
