// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (c) 2025 ReifyDB

use tracing::{Level, Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
	EnvFilter, Layer, fmt, layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt,
};
use tributary_type::Result;

use crate::error::TracingError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
	#[default]
	Compact,
	/// One JSON object per event.
	Json,
}

/// Installs the global `tracing` subscriber.
///
/// Without an explicit filter the `RUST_LOG` environment variable is used,
/// falling back to `level`.
#[derive(Debug, Clone)]
pub struct TracingBuilder {
	level: Level,
	filter: Option<String>,
	format: Format,
	with_target: bool,
	with_thread_names: bool,
	test_writer: bool,
}

impl Default for TracingBuilder {
	fn default() -> Self {
		Self {
			level: Level::INFO,
			filter: None,
			format: Format::Compact,
			with_target: true,
			with_thread_names: true,
			test_writer: false,
		}
	}
}

impl TracingBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn level(mut self, level: Level) -> Self {
		self.level = level;
		self
	}

	/// A filter directive in `RUST_LOG` syntax, overriding the environment.
	pub fn filter(mut self, directive: impl Into<String>) -> Self {
		self.filter = Some(directive.into());
		self
	}

	pub fn format(mut self, format: Format) -> Self {
		self.format = format;
		self
	}

	pub fn with_target(mut self, with_target: bool) -> Self {
		self.with_target = with_target;
		self
	}

	/// Actors run on named threads, so the name identifies the actor.
	pub fn with_thread_names(mut self, with_thread_names: bool) -> Self {
		self.with_thread_names = with_thread_names;
		self
	}

	/// Write through the test harness so output is captured per test.
	pub fn test_writer(mut self) -> Self {
		self.test_writer = true;
		self
	}

	pub fn env_filter(&self) -> Result<EnvFilter> {
		match &self.filter {
			Some(directive) => EnvFilter::try_new(directive).map_err(|err| {
				TracingError::InvalidFilter {
					directive: directive.clone(),
					reason: err.to_string(),
				}
				.into()
			}),
			None => Ok(EnvFilter::builder()
				.with_default_directive(LevelFilter::from_level(self.level).into())
				.from_env_lossy()),
		}
	}

	pub fn try_init(self) -> Result<()> {
		let filter = self.env_filter()?;
		tracing_subscriber::registry()
			.with(self.layer())
			.with(filter)
			.try_init()
			.map_err(|err| TracingError::AlreadyInitialized(err.to_string()).into())
	}

	fn layer<S>(&self) -> Box<dyn Layer<S> + Send + Sync>
	where
		S: Subscriber + for<'a> LookupSpan<'a>,
	{
		let layer = fmt::layer().with_target(self.with_target).with_thread_names(self.with_thread_names);
		match (self.format, self.test_writer) {
			(Format::Compact, false) => layer.compact().boxed(),
			(Format::Compact, true) => layer.compact().with_test_writer().boxed(),
			(Format::Json, false) => layer.json().boxed(),
			(Format::Json, true) => layer.json().with_test_writer().boxed(),
		}
	}
}
