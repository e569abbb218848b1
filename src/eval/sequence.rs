//! Sequence generation: `a..b`, `a..b..step`, `a..b..@count`, `a..@count..b`
//!
//! Endpoints are either both alphabetic or both numeric. Letters are mapped
//! to indices with bijective base-26 numbering before any arithmetic:
//!
//! ```text
//! A=0  B=1 ... Z=25  AA=26  AB=27 ... AZ=51  BA=52 ... ZZ=701  AAA=702
//! ```
//!
//! There is no zero digit, which is why `Z` is followed by `AA` rather than
//! `BA`. Generated letters are always upper case.

use super::{invalid, EvalError};
use crate::ast::Value;

/// Absorbs floating accumulation at the far end of a numeric run
const EPSILON: f64 = 1e-9;

/// Letters to index: A=0, Z=25, AA=26. `None` for non-letters or overflow.
pub fn alpha_to_num(s: &str) -> Option<i64> {
    if !is_alpha(s) {
        return None;
    }
    let mut num: i64 = 0;
    for c in s.chars() {
        let digit = (c.to_ascii_uppercase() as u8 - b'A' + 1) as i64;
        num = num.checked_mul(26)?.checked_add(digit)?;
    }
    Some(num - 1)
}

/// Index to letters: 0=A, 25=Z, 26=AA. Negative indices give an empty string.
pub fn num_to_alpha(n: i64) -> String {
    let mut letters = Vec::new();
    let mut n = n as i128 + 1;
    while n > 0 {
        let r = (n - 1) % 26;
        n = (n - 1) / 26;
        letters.push((b'A' + r as u8) as char);
    }
    letters.iter().rev().collect()
}

fn is_alpha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphabetic())
}

fn is_number(s: &str) -> bool {
    s.parse::<f64>().is_ok()
}

/// Strip surrounding whitespace, then runs of leading/trailing quotes
fn clean_segment(segment: &str) -> &str {
    segment
        .trim()
        .trim_start_matches(['"', '\''])
        .trim_end_matches(['"', '\''])
        .trim()
}

fn letter_index(s: &str) -> Result<i64, EvalError> {
    alpha_to_num(s).ok_or_else(|| invalid(format!("Syntax error: '{}' is too long", s)))
}

fn number(s: &str) -> Result<f64, EvalError> {
    s.parse::<f64>()
        .map_err(|_| invalid(format!("Syntax error: '{}' is not a number", s)))
}

/// Generate a sequence from `text`, capped at `max_len` elements
pub fn generate(text: &str, max_len: usize) -> Result<Vec<Value>, EvalError> {
    let parts: Vec<&str> = text.split("..").map(clean_segment).collect();

    match parts.as_slice() {
        [start, end] => two_part(start, end, max_len),
        [start, mid, end] => three_part(start, mid, end, max_len),
        _ => Err(invalid(
            "Syntax error: must contain 2 or 3 parts separated by '..'",
        )),
    }
}

/// start..end with an implicit step of 1
fn two_part(start: &str, end: &str, max_len: usize) -> Result<Vec<Value>, EvalError> {
    if start.contains('@') || end.contains('@') {
        return Err(invalid("Syntax error: '@' forbidden in start or end"));
    }

    if is_alpha(start) && is_alpha(end) {
        letter_run(letter_index(start)?, letter_index(end)?, 1, max_len)
    } else if is_number(start) && is_number(end) {
        number_run(number(start)?, number(end)?, 1.0, max_len)
    } else {
        Err(invalid(
            "Syntax error: start and end must both be alphabetic or numeric",
        ))
    }
}

fn three_part(start: &str, mid: &str, end: &str, max_len: usize) -> Result<Vec<Value>, EvalError> {
    // start..@count..end
    if let Some(count) = mid.strip_prefix('@') {
        return count_form(start, end, count, max_len);
    }
    // start..end..@count
    if let Some(count) = end.strip_prefix('@') {
        return count_form(start, mid, count, max_len);
    }

    // start..end..step
    if is_alpha(start) && is_alpha(mid) && is_number(end) {
        let step = end
            .parse::<i64>()
            .map_err(|_| invalid(format!("Syntax error: step '{}' must be an integer", end)))?;
        letter_run(letter_index(start)?, letter_index(mid)?, step, max_len)
    } else if is_number(start) && is_number(mid) && is_number(end) {
        number_run(number(start)?, number(mid)?, number(end)?, max_len)
    } else {
        Err(invalid(
            "Syntax error: start..end..step must be either all alphabetic or all numeric",
        ))
    }
}

fn count_form(start: &str, end: &str, count: &str, max_len: usize) -> Result<Vec<Value>, EvalError> {
    if count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid(format!("Syntax error: '{}' is not a valid number", count)));
    }
    let count: usize = count
        .parse()
        .map_err(|_| invalid(format!("Syntax error: '{}' is too large", count)))?;
    if count < 1 {
        return Err(invalid("Syntax error: count must be at least 1"));
    }
    if count > max_len {
        return Err(too_long(max_len));
    }

    if is_alpha(start) && is_alpha(end) {
        Ok(letter_count_run(letter_index(start)?, letter_index(end)?, count))
    } else if is_number(start) && is_number(end) {
        number_count_run(number(start)?, number(end)?, count)
    } else {
        // Mixed endpoints in the count form produce nothing rather than failing
        Ok(Vec::new())
    }
}

fn too_long(max_len: usize) -> EvalError {
    invalid(format!("sequence longer than {} elements", max_len))
}

/// Direction follows the endpoints; the step only contributes its magnitude
fn letter_run(start: i64, end: i64, step: i64, max_len: usize) -> Result<Vec<Value>, EvalError> {
    if step == 0 {
        return Err(invalid("Step cannot be zero"));
    }
    let direction: i128 = if start < end { 1 } else { -1 };
    let step = (step as i128).abs() * direction;

    let span = (end as i128 - start as i128).abs();
    let len = span / step.abs() + 1;
    if len > max_len as i128 {
        return Err(too_long(max_len));
    }

    Ok((0..len)
        .map(|i| {
            let index = start as i128 + i * step;
            Value::String(num_to_alpha(index as i64))
        })
        .collect())
}

fn number_run(start: f64, end: f64, step: f64, max_len: usize) -> Result<Vec<Value>, EvalError> {
    if step == 0.0 {
        return Err(invalid("Step cannot be zero"));
    }
    if !start.is_finite() || !end.is_finite() {
        return Err(invalid("Syntax error: start and end must be finite"));
    }
    if !step.is_finite() {
        return Err(invalid("Syntax error: step must be finite"));
    }

    let direction = if start < end { 1.0 } else { -1.0 };
    let step = step.abs() * direction;

    let mut seq = Vec::new();
    let mut current = start;
    while (direction > 0.0 && current <= end + EPSILON) || (direction < 0.0 && current >= end - EPSILON) {
        if seq.len() >= max_len {
            return Err(too_long(max_len));
        }
        seq.push(Value::from_f64(current));
        current += step;
    }
    Ok(seq)
}

fn letter_count_run(start: i64, end: i64, count: usize) -> Vec<Value> {
    if count == 1 {
        return vec![Value::String(num_to_alpha(start))];
    }
    let step = (end - start) as f64 / (count - 1) as f64;
    (0..count)
        .map(|i| {
            let index = (start as f64 + i as f64 * step).round_ties_even();
            Value::String(num_to_alpha(index as i64))
        })
        .collect()
}

fn number_count_run(start: f64, end: f64, count: usize) -> Result<Vec<Value>, EvalError> {
    if !start.is_finite() || !end.is_finite() {
        return Err(invalid("Syntax error: start and end must be finite"));
    }
    if count == 1 {
        return Ok(vec![Value::from_f64(start)]);
    }
    let step = (end - start) / (count - 1) as f64;
    if !step.is_finite() {
        return Err(invalid("Syntax error: step must be finite"));
    }
    Ok((0..count)
        .map(|i| Value::from_f64(start + i as f64 * step))
        .collect())
}
