// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Schema evolution for a parallel change data capture pipeline.
//!
//! Every parallel sink writer runs a [`SchemaOperator`]. When a schema
//! change marker arrives for a table, the operator flushes what it wrote
//! under the old schema, tells the [`SchemaOperatorCoordinator`] and holds
//! back further records of that table. The coordinator waits until every
//! subtask that was registered when the change arrived has flushed, then
//! releases the new schema to all subtasks at once.

#![cfg_attr(not(debug_assertions), deny(warnings))]

pub mod client;
pub mod codec;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod gateway;
pub mod job;
pub mod operator;

pub use client::SchemaEvolutionClient;
pub use config::{RetryPolicy, SchemaEvolutionConfig};
pub use coordinator::{CoordinatorMsg, CoordinatorSnapshot, RoundSnapshot, SchemaOperatorCoordinator};
pub use error::{CodecError, EvolutionError, TransportError};
pub use gateway::{LocalCoordinatorGateway, LocalSubtaskGateway};
pub use job::{SchemaEvolutionJob, SchemaEvolutionJobBuilder, SinkFactory};
pub use operator::{OperatorMsg, OperatorState, OperatorStatus, SchemaOperator, TablePhase, TableStatus};
