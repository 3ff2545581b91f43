use anyhow::Result;
use colored::Colorize;
use serde_json::Value;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
        }
        OutputFormat::Table => {
            print_as_table(value)?;
        }
    }
    Ok(())
}

pub fn print_pairs(pairs: &[(String, String)], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let map: serde_json::Map<String, Value> = pairs
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            println!("{}", serde_json::to_string_pretty(&map)?);
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Key", "Value"]);
            for (k, v) in pairs {
                builder.push_record([k.as_str(), v.as_str()]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
    Ok(())
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

pub fn print_section(title: &str) {
    println!("{}", title.cyan().bold());
}

fn print_as_table(value: &Value) -> Result<()> {
    match value {
        Value::Object(map) if map.values().all(is_scalar) => {
            let mut builder = Builder::default();
            builder.push_record(["Key", "Value"]);
            for (k, v) in map {
                builder.push_record([k.clone(), render_scalar(v)]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
        Value::Array(items) if items.iter().all(Value::is_object) => {
            let Some(Value::Object(first)) = items.first() else {
                println!("No entries.");
                return Ok(());
            };
            let headers: Vec<String> = first.keys().cloned().collect();
            let mut builder = Builder::default();
            builder.push_record(headers.clone());
            for item in items {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| item.get(h).map(render_scalar).unwrap_or_else(|| "-".to_string()))
                    .collect();
                builder.push_record(row);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
        Value::Object(map) => {
            // Nested documents: one section per top-level key
            for (k, v) in map {
                print_section(k);
                print_as_table(v)?;
            }
        }
        other => {
            println!("{}", serde_json::to_string_pretty(other)?);
        }
    }
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    !matches!(value, Value::Object(_)) && !value.as_array().is_some_and(|a| a.iter().any(|i| !is_scalar(i)))
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "-".to_string(),
        Value::Array(items) => items.iter().map(render_scalar).collect::<Vec<_>>().join(","),
        other => other.to_string(),
    }
}
