//! Pin name normalization.
//!
//! The same logical pin shows up under several names depending on node kind
//! and engine version. Every lookup goes through [`canonical_pin_name`].

pub const THEN: &str = "then";
pub const ELSE: &str = "else";
pub const EXECUTE: &str = "execute";

const ALIASES: &[(&str, &str)] = &[
    ("then", THEN),
    ("true", THEN),
    ("exec_out", THEN),
    ("out", THEN),
    ("else", ELSE),
    ("false", ELSE),
    ("execute", EXECUTE),
    ("exec", EXECUTE),
    ("in", EXECUTE),
];

/// Map a pin name to its canonical alias, or return it unchanged
pub fn canonical_pin_name(name: &str) -> &str {
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        .map(|(_, canonical)| *canonical)
        .unwrap_or(name)
}

/// Numeric suffix of an output like `then_2` or `Then 2`, used to order sequence pins
pub fn sequence_index(name: &str) -> Option<u32> {
    let digits = name.rsplit(|c: char| c == '_' || c == ' ').next()?;
    digits.parse().ok()
}
