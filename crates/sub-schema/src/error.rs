// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use thiserror::Error;
use tributary_type::{
	OperatorId, SubtaskId,
	error::{
		Diagnostic, IntoDiagnostic,
		diagnostic::{internal, serialization},
	},
};

/// An event could not be handed to its receiver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	#[error("coordinator '{0}' is not reachable")]
	CoordinatorUnreachable(OperatorId),

	#[error("subtask {0} is not reachable")]
	SubtaskUnreachable(SubtaskId),
}

impl IntoDiagnostic for TransportError {
	fn into_diagnostic(self) -> Diagnostic {
		let code = match &self {
			TransportError::CoordinatorUnreachable(_) => "EVOLUTION_001",
			TransportError::SubtaskUnreachable(_) => "EVOLUTION_002",
		};
		Diagnostic {
			code: code.to_string(),
			message: self.to_string(),
			help: Some("The receiver may be restarting, the send can be retried".to_string()),
			notes: vec![],
			cause: None,
		}
	}
}

impl From<TransportError> for tributary_type::Error {
	fn from(err: TransportError) -> Self {
		tributary_type::error!(err)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
	#[error("failed to encode operator event: {0}")]
	Encode(String),

	#[error("failed to decode operator event: {0}")]
	Decode(String),
}

impl IntoDiagnostic for CodecError {
	fn into_diagnostic(self) -> Diagnostic {
		match self {
			CodecError::Encode(reason) => serialization::encode_error(reason),
			CodecError::Decode(reason) => serialization::decode_error(reason),
		}
	}
}

impl From<CodecError> for tributary_type::Error {
	fn from(err: CodecError) -> Self {
		tributary_type::error!(err)
	}
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvolutionError {
	#[error("subtask {subtask} gave up after {attempts} attempts")]
	RetriesExhausted {
		subtask: SubtaskId,
		attempts: u32,
		cause: Box<Diagnostic>,
	},

	#[error("subtask {0} is not part of this job")]
	UnknownSubtask(SubtaskId),

	#[error("failed to spawn {component}: {reason}")]
	Spawn {
		component: String,
		reason: String,
	},

	#[error("{0} has shut down")]
	ShutDown(String),
}

impl IntoDiagnostic for EvolutionError {
	fn into_diagnostic(self) -> Diagnostic {
		let message = self.to_string();
		match self {
			EvolutionError::RetriesExhausted {
				cause,
				..
			} => Diagnostic {
				code: "EVOLUTION_003".to_string(),
				message,
				help: Some("Raise retry.max_attempts or check the coordinator".to_string()),
				notes: vec![],
				cause: Some(cause),
			},
			EvolutionError::UnknownSubtask(_) => Diagnostic {
				code: "EVOLUTION_004".to_string(),
				message,
				help: Some("Subtask ids range from 0 to the job parallelism".to_string()),
				notes: vec![],
				cause: None,
			},
			EvolutionError::Spawn {
				..
			} => internal::internal(message),
			EvolutionError::ShutDown(component) => internal::shutdown(component),
		}
	}
}

impl From<EvolutionError> for tributary_type::Error {
	fn from(err: EvolutionError) -> Self {
		tributary_type::error!(err)
	}
}
