//! # Hearth Types - Measurement Replay Data Model
//!
//! Shared domain types for the replay pipeline: the per-sensor value series
//! loaded at startup, the ordered store the scheduler iterates, the
//! `Measurement` record emitted per tick, and the schema envelope used on the
//! Kafka wire.
//!
//! The store is populated once and read-only afterwards; everything downstream
//! borrows from it. A `Measurement` is created fresh per emission and has no
//! identity beyond its four fields.

pub mod envelope;
pub mod measurement;
pub mod series;
pub mod store;

pub use envelope::{Envelope, MEASUREMENT_SCHEMA};
pub use measurement::{format_utc_millis, round_to_4dp, utc_now_millis, Measurement};
pub use series::SensorSeries;
pub use store::{EmptySeriesError, MeasurementStore};
