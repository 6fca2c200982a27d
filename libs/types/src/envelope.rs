//! Schema-carrying envelope for schema-aware consumers.
//!
//! Downstream Kafka Connect sinks expect each message to carry its own struct
//! schema next to the payload. The schema never varies at runtime, so it is
//! built once as a static descriptor and every envelope borrows it.

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::measurement::Measurement;

/// Type of a single payload field in the struct schema.
#[derive(Debug, Serialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub optional: bool,
    pub field: &'static str,
}

/// Struct schema descriptor naming the four measurement fields.
#[derive(Debug, Serialize)]
pub struct StructSchema {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub fields: Vec<FieldSchema>,
    pub optional: bool,
    pub name: &'static str,
}

/// The fixed schema every measurement message carries.
pub static MEASUREMENT_SCHEMA: Lazy<StructSchema> = Lazy::new(|| StructSchema {
    kind: "struct",
    fields: vec![
        FieldSchema {
            kind: "string",
            optional: false,
            field: "time",
        },
        FieldSchema {
            kind: "string",
            optional: false,
            field: "location",
        },
        FieldSchema {
            kind: "string",
            optional: false,
            field: "metric",
        },
        FieldSchema {
            kind: "double",
            optional: false,
            field: "value",
        },
    ],
    optional: false,
    name: "smart_home_measurement",
});

/// A measurement wrapped with its schema descriptor for the wire.
#[derive(Debug, Serialize)]
pub struct Envelope<'a> {
    pub schema: &'static StructSchema,
    pub payload: &'a Measurement,
}

impl<'a> Envelope<'a> {
    pub fn wrap(measurement: &'a Measurement) -> Self {
        Self {
            schema: &MEASUREMENT_SCHEMA,
            payload: measurement,
        }
    }
}
