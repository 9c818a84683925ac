//! Output formatting for the shell.

use std::fmt::Display;
use std::io::{self, Write};

use console::Style;
use serde_json::Value;

/// Print a response payload.
///
/// Strings print verbatim, arrays one element per line, everything else as
/// pretty JSON.
pub fn payload<W: Write>(out: &mut W, payload: &Value) -> io::Result<()> {
    match payload {
        Value::String(text) => writeln!(out, "{}", text),
        Value::Array(items) if items.is_empty() => dim(out, "(empty)"),
        Value::Array(items) => {
            for item in items {
                match item {
                    Value::String(text) => writeln!(out, "{}", text)?,
                    other => writeln!(out, "{}", other)?,
                }
            }
            Ok(())
        }
        Value::Null => dim(out, "(no content)"),
        other => {
            let pretty = serde_json::to_string_pretty(other).map_err(io::Error::other)?;
            writeln!(out, "{}", pretty)
        }
    }
}

pub fn error<W: Write>(out: &mut W, msg: impl Display) -> io::Result<()> {
    let red = Style::new().red();
    writeln!(out, "{} {}", red.apply_to("Error:"), msg)
}

pub fn warning<W: Write>(out: &mut W, msg: impl Display) -> io::Result<()> {
    let yellow = Style::new().yellow();
    writeln!(out, "{} {}", yellow.apply_to("Warning:"), msg)
}

pub fn dim<W: Write>(out: &mut W, msg: impl Display) -> io::Result<()> {
    let dim = Style::new().dim();
    writeln!(out, "{}", dim.apply_to(msg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendered(value: Value) -> String {
        let mut out = Vec::new();
        payload(&mut out, &value).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_string_verbatim() {
        assert_eq!(rendered(json!("/work/notes")), "/work/notes\n");
    }

    #[test]
    fn test_array_one_per_line() {
        assert_eq!(rendered(json!(["a", 2, {"k": "v"}])), "a\n2\n{\"k\":\"v\"}\n");
    }

    #[test]
    fn test_object_pretty() {
        let text = rendered(json!({"id": 7}));
        assert_eq!(text, "{\n  \"id\": 7\n}\n");
    }

    #[test]
    fn test_empty_array_and_null() {
        assert!(rendered(json!([])).contains("(empty)"));
        assert!(rendered(Value::Null).contains("(no content)"));
    }

    #[test]
    fn test_error_line() {
        let mut out = Vec::new();
        error(&mut out, "boom").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Error:"));
        assert!(text.ends_with(" boom\n"));
    }
}
