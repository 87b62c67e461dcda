//! Measurement line protocol.
//!
//! Instruments stream one reading per line: an optionally signed decimal
//! number with a fractional part, whitespace, then a unit token, e.g.
//! `12.34 mm` or `-0.001 in`. [`parse_line`] extracts the reading or reports
//! failure; it never panics, whatever the input.
//!
//! Unit policy: the token `mm` means millimeters; any other non-empty token
//! is treated as inches rather than rejected, matching the instruments this
//! was written against.

/// Measurement unit as displayed next to the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millimeters,
    Inches,
    /// Placeholder unit shown when a line failed to parse.
    Unknown,
}

impl Unit {
    /// Display label: `mm`, `in`, or `xx` for unparsable input.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Millimeters => "mm",
            Unit::Inches => "in",
            Unit::Unknown => "xx",
        }
    }

    /// Decimal places used when formatting a value of this unit.
    pub fn precision(self) -> usize {
        match self {
            Unit::Millimeters => 2,
            Unit::Inches | Unit::Unknown => 4,
        }
    }
}

/// One parsed reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub value: f64,
    pub unit: Unit,
}

/// Parse a raw line into a measurement.
///
/// The line must start with `[-]digits.digits` followed by at least one
/// whitespace character and a unit token; anything after the token is
/// ignored. Returns `None` when the line does not match.
pub fn parse_line(line: &str) -> Option<Measurement> {
    let bytes = line.as_bytes();
    let mut pos = 0;

    if bytes.first() == Some(&b'-') {
        pos += 1;
    }
    let int_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    if pos == int_start {
        return None;
    }
    if bytes.get(pos) != Some(&b'.') {
        return None;
    }
    pos += 1;
    let frac_start = pos;
    while bytes.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    if pos == frac_start {
        return None;
    }

    let number = &line[..pos];
    let tail = &line[pos..];
    let trimmed = tail.trim_start();
    if trimmed.len() == tail.len() {
        // No whitespace between number and unit token.
        return None;
    }
    let token = trimmed.split_whitespace().next()?;

    let value = number.parse::<f64>().ok()?;
    let unit = if token == "mm" {
        Unit::Millimeters
    } else {
        Unit::Inches
    };
    Some(Measurement { value, unit })
}
