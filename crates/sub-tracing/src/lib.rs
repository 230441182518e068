// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

mod builder;
mod error;

pub use builder::{Format, TracingBuilder};
pub use error::TracingError;
