//! JSON reporter
//!
//! Tables are written as pretty-printed arrays of row objects.

use anyhow::Result;
use serde::Serialize;

/// Render any serializable table or report as pretty JSON
pub fn render<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Render as compact JSON (single line)
pub fn render_compact<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}
