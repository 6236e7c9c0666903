// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod trips;
pub mod clients;
pub mod plans;
pub mod installments;
pub mod settings;
pub mod reports;
pub mod exporter;
pub mod doctor;
