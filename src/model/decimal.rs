//! Exact decimal conversion for monetary values

use crate::error::{Error, Result};
use rust_decimal::Decimal;
use std::str::FromStr;

/// Convert a float to an exact decimal through its base-10 string form
///
/// The float is formatted with its shortest round-trip representation and
/// that string is parsed as a decimal, so `24.98_f64` becomes exactly
/// `24.98` rather than the nearest binary fraction.
pub fn float_to_decimal(value: f64) -> Result<Decimal> {
    if !value.is_finite() {
        return Err(Error::decimal(value, "not a finite number"));
    }

    let repr = value.to_string();
    Decimal::from_str(&repr).map_err(|e| Error::decimal(&repr, e.to_string()))
}
