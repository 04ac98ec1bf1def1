//! Exact conversion of JSON numbers into fixed-width fields.
//!
//! Numbers are kept as their source text (`serde_json`'s
//! `arbitrary_precision`), so integers at the edges of every 64 and 128 bit
//! type arrive without passing through `f64`.

use core::str::FromStr;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Number;

use crate::{ErrorKind, JsonApiError};

/// Convert `number` into the integer type `T`, named `target` in errors.
pub(crate) fn to_integer<T>(number: &Number, target: &'static str) -> Result<T, JsonApiError>
where
    T: TryFrom<i128> + TryFrom<u128>,
{
    let text = number.as_str();
    let out_of_range = || ErrorKind::NumberOutOfRange {
        value: text.to_string(),
        target_type: target,
    };

    if let Ok(n) = text.parse::<i128>() {
        return <T as TryFrom<i128>>::try_from(n).map_err(|_| out_of_range().into());
    }
    if let Ok(n) = text.parse::<u128>() {
        return <T as TryFrom<u128>>::try_from(n).map_err(|_| out_of_range().into());
    }

    // fractional or exponent form, e.g. `1.0` or `2e3`
    let decimal = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str(text)
    }
    .map_err(|_| out_of_range())?;

    if !decimal.fract().is_zero() {
        return Err(ErrorKind::NotAnInteger {
            value: text.to_string(),
            target_type: target,
        }
        .into());
    }
    let n = decimal.trunc().to_i128().ok_or_else(out_of_range)?;
    <T as TryFrom<i128>>::try_from(n).map_err(|_| out_of_range().into())
}

pub(crate) fn to_f64(number: &Number) -> Result<f64, JsonApiError> {
    let text = number.as_str();
    match text.parse::<f64>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ErrorKind::NumberOutOfRange {
            value: text.to_string(),
            target_type: "f64",
        }
        .into()),
    }
}

pub(crate) fn to_f32(number: &Number) -> Result<f32, JsonApiError> {
    let text = number.as_str();
    match text.parse::<f32>() {
        Ok(n) if n.is_finite() => Ok(n),
        _ => Err(ErrorKind::NumberOutOfRange {
            value: text.to_string(),
            target_type: "f32",
        }
        .into()),
    }
}
