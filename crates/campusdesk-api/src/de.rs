//! Lenient serde helpers.
//!
//! The backend serializes decimal and integer columns inconsistently: the
//! same field can arrive as `12`, `12.5`, `"12.50"` or `null` depending on
//! the endpoint. These helpers accept all of them.

use serde::de::{self, Deserializer};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Int(i64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    fn into_f64<E: de::Error>(self) -> Result<Option<f64>, E> {
        match self {
            #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
            Self::Int(n) => Ok(Some(n as f64)),
            Self::Float(f) => Ok(Some(f)),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected a number, got {s:?}"))),
        }
    }

    fn into_u64<E: de::Error>(self) -> Result<Option<u64>, E> {
        match self {
            Self::Int(n) => u64::try_from(n)
                .map(Some)
                .map_err(|_| E::custom(format!("expected a non-negative integer, got {n}"))),
            Self::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= 9.007_199_254_740_992e15 => {
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::as_conversions
                )]
                let n = f as u64;
                Ok(Some(n))
            }
            Self::Float(f) => Err(E::custom(format!("expected an integer, got {f}"))),
            Self::Text(s) if s.trim().is_empty() => Ok(None),
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .map(Some)
                .map_err(|_| E::custom(format!("expected an integer, got {s:?}"))),
        }
    }
}

/// `u64` from a number or numeric string; `null` or `""` become `0`.
pub fn u64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.map(NumberOrString::into_u64::<D::Error>).transpose()?.flatten().unwrap_or(0))
}

/// `Option<u64>` from a number, numeric string, `""` or `null`.
pub fn opt_u64_lenient<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<u64>, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.map(NumberOrString::into_u64::<D::Error>).transpose()?.flatten())
}

/// `f64` from a number or numeric string; `null` or `""` become `0.0`.
pub fn f64_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let raw = Option::<NumberOrString>::deserialize(deserializer)?;
    Ok(raw.map(NumberOrString::into_f64::<D::Error>).transpose()?.flatten().unwrap_or(0.0))
}

/// `u64` that falls back to `1` for `null`, `""` or `0`.
pub fn u64_or_one<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    opt_u64_lenient(deserializer).map(|n| n.filter(|&n| n > 0).unwrap_or(1))
}

/// `u64` that falls back to `10` for `null`, `""` or `0`.
pub fn u64_or_ten<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    opt_u64_lenient(deserializer).map(|n| n.filter(|&n| n > 0).unwrap_or(10))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Text(String),
}

fn flag<E: de::Error>(raw: Option<Flag>, missing: bool) -> Result<bool, E> {
    match raw {
        None => Ok(missing),
        Some(Flag::Bool(b)) => Ok(b),
        Some(Flag::Int(n)) => Ok(n != 0),
        Some(Flag::Text(s)) => match s.trim() {
            "1" | "true" => Ok(true),
            "0" | "false" => Ok(false),
            "" => Ok(missing),
            other => Err(E::custom(format!("expected a boolean, got {other:?}"))),
        },
    }
}

/// `bool` from `true`/`false`, `0`/`1` or `"0"`/`"1"`; `null` is `false`.
pub fn bool_lenient<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    flag(Option::<Flag>::deserialize(deserializer)?, false)
}

/// Like [`bool_lenient`] but `null` is `true`.
pub fn bool_or_true<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    flag(Option::<Flag>::deserialize(deserializer)?, true)
}
