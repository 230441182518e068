// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

pub mod internal;
pub mod serialization;
pub mod value;

pub use super::Diagnostic;
