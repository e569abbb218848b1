use crate::ast::Value;

/// Coerce items to one homogeneous type.
///
/// Tries integers, then doubles (both sorted ascending), and falls back to
/// the trimmed strings in their original order.
///
/// Usage: `3|1|2` -> `[1, 2, 3]`, `b|a` -> `["b", "a"]`
pub fn normalize<S: AsRef<str>>(items: &[S]) -> Vec<Value> {
    let trimmed: Vec<&str> = items.iter().map(|s| s.as_ref().trim()).collect();

    if let Ok(mut ints) = trimmed.iter().map(|s| s.parse::<i64>()).collect::<Result<Vec<_>, _>>() {
        ints.sort_unstable();
        return ints.into_iter().map(Value::Integer).collect();
    }

    if let Ok(mut floats) = trimmed.iter().map(|s| s.parse::<f64>()).collect::<Result<Vec<_>, _>>() {
        floats.sort_by(f64::total_cmp);
        return floats.into_iter().map(Value::Double).collect();
    }

    trimmed.into_iter().map(|s| Value::String(s.to_string())).collect()
}
