// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

mod data;
mod evolution;

pub use data::{DataChangeEvent, OperationType, SchemaChangeEvent, StreamElement};
pub use evolution::{
	CoordinatorEvent, FlushSuccessEvent, OperatorEvent, PendingFlush, SchemaChangeRequest, SchemaReleaseEvent,
	SchemaStateRequest, SchemaStateResponse, SerializedEvent, SinkWriterRegisterEvent, TableSchema,
};
