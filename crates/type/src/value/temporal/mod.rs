// SPDX-License-Identifier: MIT
// Copyright (c) 2025 ReifyDB

//! Timestamp values with millisecond plus sub-millisecond nanosecond parts.
//!
//! Precision up to 3 (milliseconds) is stored compactly as a single epoch
//! millisecond; higher precision also carries `nano_of_millisecond`.

use std::fmt::{Display, Formatter};

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use serde::{Deserialize, Serialize};

mod parse;

pub use parse::parse_timestamp;

pub const MAX_COMPACT_TIMESTAMP_PRECISION: u8 = 3;

const NANOS_PER_MILLI: i64 = 1_000_000;
const MILLIS_PER_DAY: i64 = 86_400_000;

/// A timestamp without time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimestampData {
	millisecond: i64,
	nano_of_millisecond: i32,
}

impl TimestampData {
	pub fn is_compact(precision: u8) -> bool {
		precision <= MAX_COMPACT_TIMESTAMP_PRECISION
	}

	pub fn from_epoch_millis(millisecond: i64) -> Self {
		Self {
			millisecond,
			nano_of_millisecond: 0,
		}
	}

	pub fn from_epoch_millis_and_nanos(millisecond: i64, nano_of_millisecond: i32) -> Self {
		debug_assert!((0..1_000_000).contains(&nano_of_millisecond));
		Self {
			millisecond,
			nano_of_millisecond,
		}
	}

	pub fn from_naive(value: NaiveDateTime) -> Self {
		let utc = value.and_utc();
		let (millisecond, nano_of_millisecond) = split_nanos(utc.timestamp(), utc.timestamp_subsec_nanos());
		Self {
			millisecond,
			nano_of_millisecond,
		}
	}

	pub fn millisecond(&self) -> i64 {
		self.millisecond
	}

	pub fn nano_of_millisecond(&self) -> i32 {
		self.nano_of_millisecond
	}

	pub fn to_naive(&self) -> Option<NaiveDateTime> {
		to_utc(self.millisecond, self.nano_of_millisecond).map(|utc| utc.naive_utc())
	}
}

impl Display for TimestampData {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		match self.to_naive() {
			Some(naive) => write!(f, "{}", naive.format("%Y-%m-%d %H:%M:%S%.f")),
			None => write!(f, "{}ms+{}ns", self.millisecond, self.nano_of_millisecond),
		}
	}
}

/// An instant on the time line, rendered in the session time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocalZonedTimestampData {
	epoch_millisecond: i64,
	nano_of_millisecond: i32,
}

impl LocalZonedTimestampData {
	pub fn is_compact(precision: u8) -> bool {
		precision <= MAX_COMPACT_TIMESTAMP_PRECISION
	}

	pub fn from_epoch_millis(epoch_millisecond: i64) -> Self {
		Self {
			epoch_millisecond,
			nano_of_millisecond: 0,
		}
	}

	pub fn from_epoch_millis_and_nanos(epoch_millisecond: i64, nano_of_millisecond: i32) -> Self {
		debug_assert!((0..1_000_000).contains(&nano_of_millisecond));
		Self {
			epoch_millisecond,
			nano_of_millisecond,
		}
	}

	pub fn from_utc(value: DateTime<Utc>) -> Self {
		let (epoch_millisecond, nano_of_millisecond) =
			split_nanos(value.timestamp(), value.timestamp_subsec_nanos());
		Self {
			epoch_millisecond,
			nano_of_millisecond,
		}
	}

	pub fn epoch_millisecond(&self) -> i64 {
		self.epoch_millisecond
	}

	pub fn nano_of_millisecond(&self) -> i32 {
		self.nano_of_millisecond
	}

	pub fn to_utc(&self) -> Option<DateTime<Utc>> {
		to_utc(self.epoch_millisecond, self.nano_of_millisecond)
	}
}

/// A local date-time together with the zone it was observed in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZonedTimestampData {
	millisecond: i64,
	nano_of_millisecond: i32,
	zone_id: String,
}

impl ZonedTimestampData {
	pub fn new(millisecond: i64, nano_of_millisecond: i32, zone_id: impl Into<String>) -> Self {
		debug_assert!((0..1_000_000).contains(&nano_of_millisecond));
		Self {
			millisecond,
			nano_of_millisecond,
			zone_id: zone_id.into(),
		}
	}

	pub fn from_date_time(value: DateTime<FixedOffset>) -> Self {
		let local = value.naive_local().and_utc();
		let (millisecond, nano_of_millisecond) = split_nanos(local.timestamp(), local.timestamp_subsec_nanos());
		Self {
			millisecond,
			nano_of_millisecond,
			zone_id: value.offset().to_string(),
		}
	}

	pub fn millisecond(&self) -> i64 {
		self.millisecond
	}

	pub fn nano_of_millisecond(&self) -> i32 {
		self.nano_of_millisecond
	}

	pub fn zone_id(&self) -> &str {
		&self.zone_id
	}

	/// Resolve the zone id as a fixed offset. `Z` and `UTC` are accepted.
	pub fn to_date_time(&self) -> Option<DateTime<FixedOffset>> {
		let offset = match self.zone_id.as_str() {
			"Z" | "UTC" => FixedOffset::east_opt(0)?,
			other => other.parse::<FixedOffset>().ok()?,
		};
		let local = to_utc(self.millisecond, self.nano_of_millisecond)?.naive_utc();
		offset.from_local_datetime(&local).single()
	}
}

/// Days since the epoch for a `DATE` field.
pub fn date_to_days(date: NaiveDate) -> i32 {
	let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
	(date - epoch).num_days() as i32
}

pub fn days_to_date(days: i32) -> Option<NaiveDate> {
	let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
	epoch.checked_add_signed(chrono::Duration::days(days as i64))
}

/// Milliseconds of the day for a `TIME` field.
pub fn time_to_millis(time: NaiveTime) -> i32 {
	(time.num_seconds_from_midnight() as i64 * 1000 + (time.nanosecond() as i64 / NANOS_PER_MILLI)) as i32
}

pub fn millis_to_time(millis: i32) -> Option<NaiveTime> {
	if !(0..MILLIS_PER_DAY as i32).contains(&millis) {
		return None;
	}
	let seconds = (millis / 1000) as u32;
	let nanos = ((millis % 1000) as u32) * NANOS_PER_MILLI as u32;
	NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos)
}

fn split_nanos(seconds: i64, subsec_nanos: u32) -> (i64, i32) {
	let millis = seconds * 1000 + (subsec_nanos as i64 / NANOS_PER_MILLI);
	let nanos = (subsec_nanos as i64 % NANOS_PER_MILLI) as i32;
	(millis, nanos)
}

fn to_utc(millisecond: i64, nano_of_millisecond: i32) -> Option<DateTime<Utc>> {
	let seconds = millisecond.div_euclid(1000);
	let millis_of_second = millisecond.rem_euclid(1000);
	let nanos = millis_of_second * NANOS_PER_MILLI + nano_of_millisecond as i64;
	Utc.timestamp_opt(seconds, nanos as u32).single()
}
