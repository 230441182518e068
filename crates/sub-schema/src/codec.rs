// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

//! Wire form of the events operators send to the coordinator.

use tributary_core::event::{OperatorEvent, SerializedEvent};

use crate::error::CodecError;

pub fn encode_event(event: &OperatorEvent) -> Result<SerializedEvent, CodecError> {
	postcard::to_allocvec(event).map(SerializedEvent::new).map_err(|e| CodecError::Encode(e.to_string()))
}

pub fn decode_event(event: &SerializedEvent) -> Result<OperatorEvent, CodecError> {
	postcard::from_bytes(event.as_bytes()).map_err(|e| CodecError::Decode(e.to_string()))
}

#[cfg(test)]
pub mod tests {
	use tributary_core::{
		event::{
			FlushSuccessEvent, OperatorEvent, SchemaChangeEvent, SchemaChangeRequest, SerializedEvent,
			SinkWriterRegisterEvent,
		},
		schema::{Column, ColumnPosition, SchemaChange},
	};
	use tributary_type::{DataType, SchemaVersion, SubtaskId, TableId};

	use crate::{
		codec::{decode_event, encode_event},
		error::CodecError,
	};

	#[test]
	fn test_schema_change_request_survives_the_wire() {
		let event = OperatorEvent::SchemaChangeRequest(SchemaChangeRequest {
			subtask: SubtaskId(2),
			event: SchemaChangeEvent::new(
				TableId::new("shop", "orders"),
				3,
				SchemaChange::AddColumn {
					column: Column::new("tags", DataType::map(DataType::Varchar, DataType::decimal(30, 2))),
					position: ColumnPosition::After("amount".into()),
				},
			),
		});

		let decoded = decode_event(&encode_event(&event).unwrap()).unwrap();
		assert_eq!(decoded, event);
		assert_eq!(decoded.subtask(), 2);
	}

	#[test]
	fn test_register_is_compact() {
		let event = OperatorEvent::Register(SinkWriterRegisterEvent {
			subtask: SubtaskId(1),
		});
		assert_eq!(encode_event(&event).unwrap().as_bytes(), &[0, 1]);
	}

	#[test]
	fn test_truncated_bytes() {
		let event = OperatorEvent::FlushSuccess(FlushSuccessEvent {
			subtask: SubtaskId(0),
			table: TableId::new("shop", "orders"),
			version: SchemaVersion(1),
		});
		let mut bytes = encode_event(&event).unwrap().into_bytes();
		bytes.truncate(bytes.len() - 2);

		let err = decode_event(&SerializedEvent::new(bytes)).unwrap_err();
		assert!(matches!(err, CodecError::Decode(_)));

		let err: tributary_type::Error = err.into();
		assert_eq!(err.code(), "SERIALIZATION_003");
	}
}
