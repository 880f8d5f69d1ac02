//! Named value validators for declaratively defined commands

use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::grammar::Validator;

static INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").unwrap());
static POSITIVE_INTEGER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\+?0*[1-9][0-9]*$").unwrap());
static KEY_VALUE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^=\s]+=.*$").unwrap());
static URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^https?://[A-Za-z0-9._~%-]+(:[0-9]+)?(/\S*)?$").unwrap());

/// Names accepted in a command file's `validate` field.
pub const NAMES: &[&str] = &["integer", "positive-integer", "key-value", "url"];

/// Look up a validator by name.
pub fn by_name(name: &str) -> Option<Validator> {
    let validator: Validator = match name {
        "integer" => Arc::new(integer),
        "positive-integer" => Arc::new(positive_integer),
        "key-value" => Arc::new(key_value),
        "url" => Arc::new(url),
        _ => return None,
    };
    Some(validator)
}

pub fn integer(value: &str) -> Result<(), String> {
    if INTEGER.is_match(value) {
        Ok(())
    } else {
        Err(format!("Invalid integer \"{value}\"."))
    }
}

/// Also rejects values too large for a `usize`.
pub fn positive_integer(value: &str) -> Result<(), String> {
    if POSITIVE_INTEGER.is_match(value) && value.parse::<usize>().is_ok() {
        Ok(())
    } else {
        Err(format!("Invalid positive integer \"{value}\"."))
    }
}

/// `<name>=<value>` with a non-empty name; the value may be empty.
pub fn key_value(value: &str) -> Result<(), String> {
    if KEY_VALUE.is_match(value) {
        Ok(())
    } else {
        Err(format!(
            "Invalid key-value pair \"{value}\"; expected <name>=<value>."
        ))
    }
}

pub fn url(value: &str) -> Result<(), String> {
    if URL.is_match(value) {
        Ok(())
    } else {
        Err(format!("Invalid URL \"{value}\"."))
    }
}
