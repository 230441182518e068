// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Seams to the collaborators outside the coordination protocol: the
//! transport between operators and their coordinator, and the external sink.

mod gateway;
mod sink;

pub use gateway::{CoordinatorGateway, SubtaskGateway};
pub use sink::SinkWriter;
