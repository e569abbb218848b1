//! Constrained random sampling: `rand(min,max,count)` and
//! `randf(min,max,count[,precision])`
//!
//! Both reject infeasible requests before sampling, so the loops always
//! terminate.

use super::{invalid, EvalError};
use crate::ast::{format_float, Value};
use ordered_float::OrderedFloat;
use rand::Rng;
use std::collections::BTreeSet;

/// `count` distinct integers from `[min, max]`, sorted ascending
pub fn rand_unique<R: Rng + ?Sized>(
    rng: &mut R,
    min: i64,
    max: i64,
    count: i64,
) -> Result<Vec<i64>, EvalError> {
    let population = max as i128 - min as i128 + 1;
    if count as i128 > population {
        return Err(invalid("Count too large for unique integers in range"));
    }
    if count < 0 {
        return Err(invalid("Sample larger than population or is negative"));
    }
    if count == 0 {
        return Ok(Vec::new());
    }

    let length = usize::try_from(population)
        .map_err(|_| invalid("Range too large to sample"))?;
    let mut seq: Vec<i64> = rand::seq::index::sample(rng, length, count as usize)
        .into_iter()
        .map(|i| (min as i128 + i as i128) as i64)
        .collect();
    seq.sort_unstable();
    Ok(seq)
}

/// `count` distinct values from `[min, max]` rounded to `precision` decimals,
/// sorted ascending
pub fn randf_unique<R: Rng + ?Sized>(
    rng: &mut R,
    min: f64,
    max: f64,
    count: i64,
    precision: i32,
    max_attempts: u64,
) -> Result<Vec<f64>, EvalError> {
    let bound = ((max - min) * 10f64.powi(precision)).trunc();
    if bound.is_nan() {
        return Err(invalid("cannot convert float NaN to integer"));
    }
    if bound.is_infinite() {
        return Err(invalid("cannot convert float infinity to integer"));
    }
    let max_unique = bound + 1.0;
    if count as f64 > max_unique {
        return Err(invalid(format!(
            "Unable to generate {} unique values with precision {} over the range {}-{}",
            count,
            precision,
            format_float(min),
            format_float(max)
        )));
    }

    let mut seen: BTreeSet<OrderedFloat<f64>> = BTreeSet::new();
    let target = usize::try_from(count).unwrap_or(0);
    let mut attempts: u64 = 0;
    while seen.len() < target {
        if attempts >= max_attempts {
            return Err(invalid(format!(
                "Unable to collect {} unique values after {} draws",
                count, attempts
            )));
        }
        attempts += 1;
        let x = min + (max - min) * rng.gen::<f64>();
        seen.insert(OrderedFloat(round_to(x, precision)));
    }

    log::trace!("randf collected {} values in {} draws", target, attempts);
    Ok(seen.into_iter().map(|v| v.0).collect())
}

/// Round half away from zero at `precision` decimals (negative: tens, hundreds...)
fn round_to(x: f64, precision: i32) -> f64 {
    if precision >= 0 {
        let scale = 10f64.powi(precision);
        (x * scale).round() / scale
    } else {
        let scale = 10f64.powi(-precision);
        (x / scale).round() * scale
    }
}

/// Arguments between the call parentheses, trimmed
fn call_args<'a>(text: &'a str, prefix: &str) -> &'a str {
    let inner = text.get(prefix.len()..).unwrap_or("");
    inner.strip_suffix(')').unwrap_or(inner)
}

fn split_args(inner: &str) -> Vec<&str> {
    inner.split(',').map(str::trim).collect()
}

fn parse_int(s: &str) -> Result<i64, EvalError> {
    s.parse::<i64>()
        .map_err(|_| invalid(format!("invalid literal for int(): '{}'", s)))
}

fn parse_float(s: &str) -> Result<f64, EvalError> {
    s.parse::<f64>()
        .map_err(|_| invalid(format!("could not convert string to float: '{}'", s)))
}

/// Evaluate `rand(min,max,count)`
pub(crate) fn rand_command<R: Rng + ?Sized>(rng: &mut R, text: &str) -> Result<Vec<Value>, EvalError> {
    let args = split_args(call_args(text, "rand("));
    let [min, max, count] = args.as_slice() else {
        return Err(invalid("rand(min,max,count)"));
    };
    let seq = rand_unique(rng, parse_int(min)?, parse_int(max)?, parse_int(count)?)?;
    Ok(seq.into_iter().map(Value::Integer).collect())
}

/// Evaluate `randf(min,max,count[,precision])`
pub(crate) fn randf_command<R: Rng + ?Sized>(
    rng: &mut R,
    text: &str,
    default_precision: i32,
    max_attempts: u64,
) -> Result<Vec<Value>, EvalError> {
    let args = split_args(call_args(text, "randf("));
    let (min, max, count, precision) = match args.as_slice() {
        [min, max, count] => (min, max, count, None),
        [min, max, count, precision] => (min, max, count, Some(precision)),
        _ => return Err(invalid("randf(min,max,count[,precision])")),
    };

    let precision = match precision {
        Some(p) => i32::try_from(parse_int(p)?).map_err(|_| invalid("precision out of range"))?,
        None => default_precision,
    };
    let seq = randf_unique(
        rng,
        parse_float(min)?,
        parse_float(max)?,
        parse_int(count)?,
        precision,
        max_attempts,
    )?;
    Ok(seq.into_iter().map(Value::Double).collect())
}
