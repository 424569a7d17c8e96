use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::Value;
use thiserror::Error;

use crate::calendar::CalendarEvent;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to access event file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse event file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Event file is missing required field `{0}`")]
    MissingField(&'static str),
}

const REQUIRED_FIELDS: [(&str, &str); 7] = [
    ("id", "/id"),
    ("summary", "/summary"),
    ("location", "/location"),
    ("organizer.email", "/organizer/email"),
    ("start.dateTime", "/start/dateTime"),
    ("end.dateTime", "/end/dateTime"),
    ("reminders", "/reminders"),
];

pub fn write_event(path: &Path, event: &CalendarEvent) -> Result<(), SchemaError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, event)?;
    writer.flush()?;

    tracing::info!("Exported event {} to {}", event.id, path.display());
    Ok(())
}

pub fn read_event(path: &Path) -> Result<CalendarEvent, SchemaError> {
    let value: Value = {
        let file = File::open(path)?;
        serde_json::from_reader(BufReader::new(file))?
    };

    check_schema(&value)?;
    let event: CalendarEvent = serde_json::from_value(value)?;

    tracing::info!("Read event {} from {}", event.id, path.display());
    Ok(event)
}

fn check_schema(value: &Value) -> Result<(), SchemaError> {
    for (name, pointer) in REQUIRED_FIELDS {
        if value.pointer(pointer).is_none_or(Value::is_null) {
            return Err(SchemaError::MissingField(name));
        }
    }

    let attendees = value
        .get("attendees")
        .and_then(Value::as_array)
        .ok_or(SchemaError::MissingField("attendees"))?;
    if attendees.iter().any(|a| a.get("email").is_none()) {
        return Err(SchemaError::MissingField("attendees[].email"));
    }

    Ok(())
}
