//! Python literal reader and writer
//!
//! Agent frameworks written in Python frequently leak `repr()` output into
//! message text, e.g. `Updated todo list to [{'content': 'a'}]`. This module
//! reads that literal syntax into `serde_json::Value` and renders values back
//! in the same syntax so the stripping patterns in `stream::message` line up
//! with what the framework would have printed.
//!
//! Supported: dicts, lists, tuples (read as arrays), single/double quoted
//! strings with the common escapes, integers, floats, `True`, `False`, `None`.

use serde_json::{Map, Number, Value};
use std::fmt::Write;

/// Parse a Python literal expression
///
/// Returns `None` if the text is not a single well-formed literal.
pub fn parse_python_literal(text: &str) -> Option<Value> {
    let mut parser = LiteralParser::new(text);
    let value = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.is_at_end() {
        Some(value)
    } else {
        None
    }
}

/// Render a value the way Python's `repr()` would
pub fn python_repr(value: &Value) -> String {
    let mut out = String::new();
    write_repr(value, &mut out);
    out
}

fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => write_repr_str(s, out),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr_str(key, out);
                out.push_str(": ");
                write_repr(item, out);
            }
            out.push('}');
        }
    }
}

fn write_repr_str(s: &str, out: &mut String) {
    // Python switches to double quotes only when that avoids escaping.
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                let _ = write!(out, "\\x{:02x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
}

/// Deepest container nesting accepted, same as serde_json's recursion limit
const MAX_DEPTH: usize = 128;

struct LiteralParser {
    chars: Vec<char>,
    pos: usize,
    depth: usize,
}

impl LiteralParser {
    fn new(text: &str) -> Self {
        Self {
            chars: text.chars().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_whitespace();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn parse_value(&mut self) -> Option<Value> {
        self.skip_whitespace();
        match self.peek()? {
            open @ ('{' | '[' | '(') => self.parse_container(open),
            '\'' | '"' => self.parse_string().map(Value::String),
            c if c == '-' || c == '+' || c == '.' || c.is_ascii_digit() => self.parse_number(),
            c if c.is_ascii_alphabetic() => self.parse_keyword(),
            _ => None,
        }
    }

    fn parse_container(&mut self, open: char) -> Option<Value> {
        if self.depth >= MAX_DEPTH {
            return None;
        }
        self.depth += 1;
        let value = match open {
            '{' => self.parse_dict(),
            '[' => self.parse_sequence('[', ']'),
            _ => self.parse_sequence('(', ')'),
        };
        self.depth -= 1;
        value
    }

    fn parse_sequence(&mut self, open: char, close: char) -> Option<Value> {
        if !self.eat(open) {
            return None;
        }
        let mut items = Vec::new();
        loop {
            if self.eat(close) {
                return Some(Value::Array(items));
            }
            items.push(self.parse_value()?);
            if self.eat(',') {
                continue;
            }
            return if self.eat(close) {
                Some(Value::Array(items))
            } else {
                None
            };
        }
    }

    fn parse_dict(&mut self) -> Option<Value> {
        if !self.eat('{') {
            return None;
        }
        let mut map = Map::new();
        loop {
            if self.eat('}') {
                return Some(Value::Object(map));
            }
            let key = match self.parse_value()? {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(true) => "True".to_string(),
                Value::Bool(false) => "False".to_string(),
                Value::Null => "None".to_string(),
                _ => return None,
            };
            if !self.eat(':') {
                return None;
            }
            let value = self.parse_value()?;
            map.insert(key, value);
            if self.eat(',') {
                continue;
            }
            return if self.eat('}') {
                Some(Value::Object(map))
            } else {
                None
            };
        }
    }

    fn parse_string(&mut self) -> Option<String> {
        let quote = self.bump()?;
        let mut out = String::new();
        loop {
            match self.bump()? {
                c if c == quote => return Some(out),
                '\\' => {
                    let escaped = self.bump()?;
                    match escaped {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        'r' => out.push('\r'),
                        '0' => out.push('\0'),
                        '\\' => out.push('\\'),
                        '\'' => out.push('\''),
                        '"' => out.push('"'),
                        '\n' => {}
                        'x' => out.push(self.parse_hex_escape(2)?),
                        'u' => out.push(self.parse_hex_escape(4)?),
                        'U' => out.push(self.parse_hex_escape(8)?),
                        other => {
                            out.push('\\');
                            out.push(other);
                        }
                    }
                }
                '\n' => return None,
                c => out.push(c),
            }
        }
    }

    fn parse_hex_escape(&mut self, digits: usize) -> Option<char> {
        let mut code = 0u32;
        for _ in 0..digits {
            code = code * 16 + self.bump()?.to_digit(16)?;
        }
        char::from_u32(code)
    }

    fn parse_number(&mut self) -> Option<Value> {
        let start = self.pos;
        if matches!(self.peek(), Some('-') | Some('+')) {
            self.pos += 1;
        }
        while matches!(
            self.peek(),
            Some(c) if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '_' | '-' | '+')
        ) {
            // Only allow a sign directly after an exponent marker.
            if matches!(self.peek(), Some('-') | Some('+'))
                && !matches!(self.chars.get(self.pos - 1), Some('e') | Some('E'))
            {
                break;
            }
            self.pos += 1;
        }
        let raw: String = self.chars[start..self.pos]
            .iter()
            .filter(|c| **c != '_')
            .collect();

        if let Ok(int) = raw.parse::<i64>() {
            return Some(Value::Number(int.into()));
        }
        let float = raw.parse::<f64>().ok()?;
        Number::from_f64(float).map(Value::Number)
    }

    fn parse_keyword(&mut self) -> Option<Value> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            self.pos += 1;
        }
        let word: String = self.chars[start..self.pos].iter().collect();
        match word.as_str() {
            "True" => Some(Value::Bool(true)),
            "False" => Some(Value::Bool(false)),
            "None" => Some(Value::Null),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_parse_todo_literal() {
        let value =
            parse_python_literal("[{'content': 'a', 'status': 'pending'}]").unwrap();
        assert_eq!(value, json!([{"content": "a", "status": "pending"}]));
    }

    #[test]
    fn test_nesting_limit() {
        let nested = |depth: usize| format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        assert!(parse_python_literal(&nested(MAX_DEPTH)).is_some());
        assert_eq!(parse_python_literal(&nested(MAX_DEPTH + 1)), None);
        assert_eq!(parse_python_literal(&nested(200_000)), None);
    }

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_python_literal("True"), Some(json!(true)));
        assert_eq!(parse_python_literal("None"), Some(json!(null)));
        assert_eq!(parse_python_literal("-12"), Some(json!(-12)));
        assert_eq!(parse_python_literal("2.5"), Some(json!(2.5)));
        assert_eq!(parse_python_literal("1e3"), Some(json!(1000.0)));
        assert_eq!(parse_python_literal("\"it's\""), Some(json!("it's")));
    }

    #[test]
    fn test_parse_nested_and_trailing_commas() {
        let value = parse_python_literal("{'a': (1, 2,), 'b': [None, False,],}").unwrap();
        assert_eq!(value, json!({"a": [1, 2], "b": [null, false]}));
    }

    #[test]
    fn test_parse_escapes() {
        let value = parse_python_literal(r"'line\nnext \'q\' \x41é'").unwrap();
        assert_eq!(value, json!("line\nnext 'q' A\u{e9}"));
    }

    #[test]
    fn test_rejects_non_literals() {
        assert_eq!(parse_python_literal("[1, 2"), None);
        assert_eq!(parse_python_literal("[true]"), None);
        assert_eq!(parse_python_literal("[1] extra"), None);
        assert_eq!(parse_python_literal("{'a' 1}"), None);
        assert_eq!(parse_python_literal(""), None);
    }

    #[test]
    fn test_repr_matches_python() {
        let block = json!({"id": "x", "input": {}, "name": "foo", "type": "tool_use"});
        assert_eq!(
            python_repr(&block),
            "{'id': 'x', 'input': {}, 'name': 'foo', 'type': 'tool_use'}"
        );
        assert_eq!(python_repr(&json!([true, null, 1])), "[True, None, 1]");
        assert_eq!(python_repr(&json!("it's")), "\"it's\"");
        assert_eq!(python_repr(&json!("a\nb")), "'a\\nb'");
    }

    #[test]
    fn test_repr_parses_back() {
        let value = json!({"todos": [{"content": "it's", "done": false}], "n": 3});
        assert_eq!(parse_python_literal(&python_repr(&value)), Some(value));
    }
}
