//! # Form Validation
//!
//! Per-field validators for the intake form. Inputs are expected to be trimmed already.

use regex::Regex;
use std::sync::OnceLock;

/// Russian mobile number: optional +7/7/8 prefix, operator code starting with 4, 8 or 9
/// (optionally parenthesised), then 3-2-2 digits with optional spaces or hyphens.
const PHONE_PATTERN: &str =
    r"^(\+7|7|8)?[\s\-]?\(?[489][0-9]{2}\)?[\s\-]?[0-9]{3}[\s\-]?[0-9]{2}[\s\-]?[0-9]{2}$";

fn phone_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(PHONE_PATTERN).expect("phone pattern is valid"))
}

/// At least a first and a last name.
pub fn is_valid_name(name: &str) -> bool {
    name.split_whitespace().count() >= 2
}

pub fn is_valid_city(city: &str) -> bool {
    city.chars().count() >= 2
}

pub fn is_valid_phone(phone: &str) -> bool {
    phone_regex().is_match(phone)
}
