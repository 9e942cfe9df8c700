use serde::Serialize;
use serde_json::{json, Value};

use crate::cli::OutputFormat;
use crate::client::{ToastEvent, Variant};

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });
            if let Some(data_value) = data {
                response["data"] = data_value;
            }
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// JSON mode prints `value` as-is; text mode calls `render`
pub fn output_value<T, F>(output_format: &OutputFormat, value: &T, render: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T),
{
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => render(value),
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("[]"),
        OutputFormat::Text => println!("{}", message),
    }
    Ok(())
}

/// Notifications go to stderr so stdout stays parseable
pub fn print_toast(event: &ToastEvent) {
    let marker = match event.variant {
        Variant::Success => "✓",
        Variant::Error => "✗",
        Variant::Info => "•",
        Variant::Warning => "!",
    };
    eprintln!("{} {}", marker, event.message);
}

/// Shorten `text` to `max` characters for table output
pub fn truncate(text: &str, max: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max).collect();
    if chars.next().is_some() {
        format!("{}…", head.trim_end())
    } else {
        head
    }
}

/// Read one line from stdin (password prompt)
pub fn prompt(label: &str) -> anyhow::Result<String> {
    use std::io::Write;

    eprint!("{}: ", label);
    std::io::stderr().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
