// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod gateway;
pub mod sink;
pub mod util;

pub use gateway::FlakyGateway;
pub use sink::{RecordingSink, SinkCall};
pub use util::wait::{wait_for, wait_for_condition};
