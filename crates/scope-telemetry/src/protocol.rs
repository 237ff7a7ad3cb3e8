use crate::types::OrientationSample;
use thiserror::Error;

/// Field separator of the telemetry text line.
const SEPARATOR: char = ',';

/// Number of fields in a telemetry line: yaw, pitch, roll.
const FIELD_COUNT: usize = 3;

#[derive(Debug, Error, PartialEq)]
pub enum MalformedTelemetry {
    #[error("Telemetry payload is not valid UTF-8")]
    NotUtf8,
    #[error("Expected 3 comma-separated fields, found {found}")]
    FieldCount { found: usize },
    #[error("Field {index} is not a number: {field:?}")]
    InvalidNumber { index: usize, field: String },
}

/// Parse a `"<yaw>,<pitch>,<roll>"` payload into an orientation sample.
///
/// The pitch channel is reported with inverted polarity by the mount, so the stored
/// pitch is the negated field. Values are not range-checked.
pub fn decode(payload: &[u8]) -> Result<OrientationSample, MalformedTelemetry> {
    let text = std::str::from_utf8(payload).map_err(|_| MalformedTelemetry::NotUtf8)?;
    let fields: Vec<&str> = text.trim().split(SEPARATOR).collect();

    if fields.len() != FIELD_COUNT {
        return Err(MalformedTelemetry::FieldCount {
            found: fields.len(),
        });
    }

    let number = |index: usize| -> Result<f64, MalformedTelemetry> {
        let field = fields[index].trim();
        field
            .parse::<f64>()
            .map_err(|_| MalformedTelemetry::InvalidNumber {
                index,
                field: field.to_string(),
            })
    };

    let yaw = number(0)?;
    let pitch = -number(1)?;
    let roll = number(2)?;

    Ok(OrientationSample { yaw, pitch, roll })
}
