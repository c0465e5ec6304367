//! Amount normalization for OFX `<TRNAMT>`, `<BALAMT>` and friends.
//!
//! Banks disagree on separators: `1,000.00`, `1.000,00`, `1000,00` all show up
//! in the wild. Two styles are tried in order, each assuming the last two
//! digits are the fraction:
//!
//!   point-decimal   `[+-]digits-and-commas[.]NN`   commas are grouping
//!   comma-decimal   `[+-]digits-and-dots[,]NN`     dots are grouping
//!
//! Anything else falls back to its leading numeric prefix.
//!
//! Known quirk kept for compatibility: a bare run of three or more digits
//! matches the point-decimal style with an implied separator, so `"100"` is
//! `1.0` while `"10"` is `10.0`.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

static POINT_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-]?)(?P<whole>[0-9,]+)\.?(?P<frac>[0-9]{2})$")
        .expect("point-decimal pattern")
});

static COMMA_DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<sign>[+-]?)(?P<whole>[0-9.]+),?(?P<frac>[0-9]{2})$")
        .expect("comma-decimal pattern")
});

static NUMERIC_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?")
        .expect("numeric prefix pattern")
});

/// Convert a raw OFX amount string into a signed float.
///
/// Never fails: input with no usable digits yields `0.0`.
pub fn create_amount_from_str(raw: &str) -> f64 {
    let raw = raw.trim();

    if let Some(caps) = POINT_DECIMAL.captures(raw) {
        trace!(raw, style = "point-decimal", "normalizing amount");
        return assemble(&caps["sign"], &caps["whole"].replace(',', ""), &caps["frac"]);
    }

    if let Some(caps) = COMMA_DECIMAL.captures(raw) {
        trace!(raw, style = "comma-decimal", "normalizing amount");
        return assemble(&caps["sign"], &caps["whole"].replace('.', ""), &caps["frac"]);
    }

    trace!(raw, style = "numeric-prefix", "normalizing amount");
    NUMERIC_PREFIX
        .find(raw)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

fn assemble(sign: &str, whole: &str, frac: &str) -> f64 {
    let whole = if whole.is_empty() { "0" } else { whole };
    format!("{sign}{whole}.{frac}").parse().unwrap_or(0.0)
}
