//! Structured output envelope and payload models.

mod format;
mod model;

use std::io::{self, Write};

use serde::Serialize;

pub use format::OutputFormat;
pub use model::*;

pub fn print_result<T: Serialize>(result: &CommandResult<T>, format: OutputFormat) {
	match format {
		OutputFormat::Json => {
			if let Ok(json) = serde_json::to_string_pretty(result) {
				println!("{json}");
			}
		}
		OutputFormat::Text => print_result_text(result),
	}
}

fn print_result_text<T: Serialize>(result: &CommandResult<T>) {
	let mut stdout = io::stdout().lock();

	if result.ok {
		let Some(data) = &result.data else {
			return;
		};
		match serde_json::to_value(data) {
			Ok(serde_json::Value::Object(fields)) => {
				for (key, value) in fields {
					let value = match value {
						serde_json::Value::String(s) => s,
						other => other.to_string(),
					};
					let _ = writeln!(stdout, "{key}: {value}");
				}
			}
			Ok(other) => {
				let _ = writeln!(stdout, "{other}");
			}
			Err(_) => {}
		}
	} else if let Some(error) = &result.error {
		let _ = writeln!(stdout, "Error [{}]: {}", error.code, error.message);
		if let Some(details) = &error.details {
			if let Ok(json) = serde_json::to_string_pretty(details) {
				let _ = writeln!(stdout, "Details: {json}");
			}
		}
	}
}
