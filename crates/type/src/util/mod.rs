// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

mod cowvec;

pub use cowvec::CowVec;
