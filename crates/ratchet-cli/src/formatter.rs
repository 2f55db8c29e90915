//! Rendering records for the terminal.

use ratchet_store::{Record, RecordId, Value};
use serde_json::{Map, Value as Json};

use crate::theme::Theme;

/// Output format mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Pretty,
    Json,
}

impl OutputFormat {
    /// Parse the `--format` flag. Anything but `json` is pretty.
    pub(crate) fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => Self::Json,
            _ => Self::Pretty,
        }
    }
}

/// JSON view of a value. Binary fields become lowercase hex strings.
pub(crate) fn value_to_json(value: &Value) -> Json {
    match value {
        Value::Undefined | Value::Null => Json::Null,
        Value::Bool(b) => Json::Bool(*b),
        Value::Number(n) => Json::Number(n.clone()),
        Value::Text(s) => Json::String(s.clone()),
        Value::Bytes(b) => Json::String(hex::encode(b)),
        Value::List(items) => Json::Array(items.iter().map(value_to_json).collect()),
        Value::Map(fields) => Json::Object(
            fields
                .iter()
                .map(|(k, v)| (k.clone(), value_to_json(v)))
                .collect::<Map<_, _>>(),
        ),
    }
}

/// JSON view of a record.
pub(crate) fn record_to_json(record: &Record) -> Json {
    Json::Object(
        record
            .iter()
            .map(|(k, v)| (k.clone(), value_to_json(v)))
            .collect(),
    )
}

/// Print one record under its id.
pub(crate) fn print_record(format: OutputFormat, id: &RecordId, record: &Record) {
    match format {
        OutputFormat::Json => println!("{}", record_to_json(record)),
        OutputFormat::Pretty => {
            println!("{}", Theme::record_id(id.as_str()));
            for (name, value) in record.iter() {
                println!("  {} {}", Theme::field(name), value_to_json(value));
            }
        },
    }
}

/// Print every `(id, record)` pair.
pub(crate) fn print_records(format: OutputFormat, entries: &[(RecordId, Record)]) {
    match format {
        OutputFormat::Json => {
            let all: Vec<Json> = entries.iter().map(|(_, r)| record_to_json(r)).collect();
            println!("{}", Json::Array(all));
        },
        OutputFormat::Pretty => {
            for (id, record) in entries {
                print_record(format, id, record);
            }
        },
    }
}
