// src/output.rs
//! Printing of search, query, and schema results.

use crate::error::AppError;
use crate::formatting::toon;
use serde::Serialize;

/// TOON by default, pretty JSON when `as_json` is set.
pub fn render<T: Serialize + ?Sized>(value: &T, as_json: bool) -> Result<String, AppError> {
    if as_json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(toon::encode(&serde_json::to_value(value)?))
    }
}

/// Writes the rendered value to stdout.
pub fn print<T: Serialize + ?Sized>(value: &T, as_json: bool) -> Result<(), AppError> {
    println!("{}", render(value, as_json)?);
    Ok(())
}
