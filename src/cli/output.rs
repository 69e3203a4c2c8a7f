//! Output formatting for CLI commands

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Serialize;

use crate::models::query::QueryResult;

/// How command results are rendered on stdout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Text,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" => Ok(Self::Text),
            other => Err(format!("Unknown output format '{}' (expected json or text)", other)),
        }
    }
}

/// Output context for consistent formatting across commands
///
/// This is the single source of truth for output formatting.
/// All commands should use this context for output.
#[derive(Debug, Clone)]
pub struct OutputContext {
    /// Project root for relative path calculation
    root: PathBuf,
    format: OutputFormat,
}

impl OutputContext {
    pub fn new(root: PathBuf, format: OutputFormat) -> Self {
        Self { root, format }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Convert an absolute path to relative (if within project root)
    pub fn relative_path(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|_| path.display().to_string())
    }

    /// Print a successful response
    pub fn print_success<T: Serialize>(&self, data: T) {
        let response = serde_json::json!({
            "success": true,
            "data": data
        });
        match self.format {
            OutputFormat::Json => print_json(&response),
            OutputFormat::Text => print_text(&response["data"]),
        }
    }

    /// Print a successful response with flat structure (data fields at top level)
    pub fn print_success_flat<T: Serialize>(&self, data: T) {
        let mut response = serde_json::to_value(data).unwrap_or(serde_json::json!({}));
        match self.format {
            OutputFormat::Json => {
                if let Some(obj) = response.as_object_mut() {
                    obj.insert("success".to_string(), serde_json::json!(true));
                }
                print_json(&response);
            }
            OutputFormat::Text => print_text(&response),
        }
    }

    /// Print a query result: names one per line or raw text in text mode
    pub fn print_query(&self, result: &QueryResult) {
        match self.format {
            OutputFormat::Json => self.print_success(result),
            OutputFormat::Text => println!("{result}"),
        }
    }

    /// Print an error response
    pub fn print_error(&self, message: &str) {
        match self.format {
            OutputFormat::Json => {
                let response = serde_json::json!({
                    "success": false,
                    "error": message
                });
                print_json(&response);
            }
            OutputFormat::Text => eprintln!("error: {message}"),
        }
    }
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("Failed to serialize output: {e}"),
    }
}

fn print_text(value: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            for (key, value) in map {
                println!("{key}: {}", text_scalar(value));
            }
        }
        other => println!("{}", text_scalar(other)),
    }
}

fn text_scalar(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
