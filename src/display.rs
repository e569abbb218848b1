//! Display formatting for command outputs
//!
//! Plain text for scripts and `-c`, colored and truncated text for the REPL,
//! and JSON for `--json`.

use crate::ast::{format_float, Value};
use crate::eval::{CommandOutput, Diagnostic, Severity};
use serde_json::Value as JsonValue;

/// How an output is rendered as text
#[derive(Debug, Clone, Copy)]
pub struct DisplayOptions {
    pub color: bool,
    /// Lists longer than this show their first half and a count
    pub max_items: usize,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        DisplayOptions { color: false, max_items: usize::MAX }
    }
}

impl DisplayOptions {
    pub fn interactive() -> Self {
        DisplayOptions { color: true, max_items: 20 }
    }
}

fn paint(s: &str, code: &str, opts: DisplayOptions) -> String {
    if opts.color {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    } else {
        s.to_string()
    }
}

/// Render the populated outputs of `out`.
///
/// Scalars win over strings, strings over lists. An output with nothing
/// populated renders as `(no result)`.
pub fn format_output(out: &CommandOutput, opts: DisplayOptions) -> String {
    if let Some(n) = out.integer {
        return paint(&n.to_string(), "35", opts);
    }
    if let Some(f) = out.double {
        return paint(&format_float(f), "35", opts);
    }
    if let Some(s) = &out.string {
        if out.is_error() {
            return paint(s, "31", opts);
        }
        return s.clone();
    }
    if let Some(items) = &out.list {
        return format_list(items, opts);
    }
    paint("(no result)", "90", opts)
}

fn format_list(items: &[Value], opts: DisplayOptions) -> String {
    if items.is_empty() {
        return "[]".to_string();
    }

    if items.len() <= opts.max_items {
        let parts: Vec<String> = items.iter().map(|v| format_value_inline(v, opts)).collect();
        format!("[{}]", parts.join(", "))
    } else {
        let shown = opts.max_items / 2;
        let first: Vec<String> = items
            .iter()
            .take(shown)
            .map(|v| format_value_inline(v, opts))
            .collect();
        let more = format!("... ({} more)", items.len() - shown);
        format!("[{}, {}]", first.join(", "), paint(&more, "90", opts))
    }
}

/// Format a list element for inline display
pub fn format_value_inline(val: &Value, opts: DisplayOptions) -> String {
    match val {
        Value::String(s) => paint(&format!("\"{}\"", s), "33", opts),
        Value::Integer(_) | Value::Double(_) => paint(&val.to_string(), "35", opts),
    }
}

/// `warning: ...` / `error: ...`
pub fn format_diagnostic(d: &Diagnostic, opts: DisplayOptions) -> String {
    match d.severity {
        Severity::Warning => format!("{} {}", paint("warning:", "33", opts), d.message),
        Severity::Error => format!("{} {}", paint("error:", "31", opts), d.message),
    }
}

/// JSON object with every output slot; absent slots and non-finite
/// doubles are `null`
pub fn to_json(out: &CommandOutput) -> Result<JsonValue, serde_json::Error> {
    serde_json::to_value(out)
}
