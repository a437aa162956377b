//! Trailing command-line arguments handed to step bodies.
//!
//! The trailing arguments (everything after `--` on the command line) are
//! free-form, so they are tokenized here rather than declared with clap:
//!
//! - `--key=value` and `--key value` set `key`
//! - `--flag` sets `flag` to `true`, `--no-flag` sets it to `false`
//! - `-abc` sets `a`, `b` and `c` to `true`; `-k value` sets `k`
//! - values that look like numbers or booleans are converted
//! - repeating a key collects its values into an array
//! - everything after a bare `--` is positional

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Number, Value};

/// Tokenized trailing arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedArgs {
    positional: Vec<String>,
    flags: BTreeMap<String, Value>,
}

impl ParsedArgs {
    /// Parse an already split argument list.
    pub fn parse<S: AsRef<str>>(argv: &[S]) -> Self {
        let mut args = Self::default();
        let mut i = 0;

        while i < argv.len() {
            let arg = argv[i].as_ref();
            let next = argv.get(i + 1).map(|s| s.as_ref());

            if arg == "--" {
                args.positional
                    .extend(argv[i + 1..].iter().map(|s| s.as_ref().to_string()));
                break;
            }

            if let Some(body) = arg.strip_prefix("--") {
                if let Some((key, value)) = body.split_once('=') {
                    args.insert(key, coerce(value));
                } else if let Some(key) = body.strip_prefix("no-") {
                    args.insert(key, Value::Bool(false));
                } else if let Some(value) = next.filter(|n| takes_value(n)) {
                    args.insert(body, coerce(value));
                    i += 1;
                } else {
                    args.insert(body, Value::Bool(true));
                }
            } else if arg.len() > 1 && arg.starts_with('-') && !is_number(arg) {
                let letters: Vec<char> = arg[1..].chars().collect();
                let (last, rest) = letters.split_last().unwrap_or((&'-', &[]));
                for letter in rest {
                    args.insert(&letter.to_string(), Value::Bool(true));
                }
                if let Some(value) = next.filter(|n| takes_value(n)) {
                    args.insert(&last.to_string(), coerce(value));
                    i += 1;
                } else {
                    args.insert(&last.to_string(), Value::Bool(true));
                }
            } else {
                args.positional.push(arg.to_string());
            }

            i += 1;
        }

        args
    }

    /// Parse the part of a full process argument vector that follows the
    /// first `--`. Without a separator the result is empty.
    pub fn from_env_args<S: AsRef<str>>(argv: &[S]) -> Self {
        match argv.iter().position(|a| a.as_ref() == "--") {
            Some(index) => Self::parse(&argv[index + 1..]),
            None => Self::default(),
        }
    }

    /// Positional values, in order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// All flags.
    pub fn flags(&self) -> &BTreeMap<String, Value> {
        &self.flags
    }

    /// A single flag value.
    pub fn flag(&self, name: &str) -> Option<&Value> {
        self.flags.get(name)
    }

    /// A flag rendered as a string (strings unquoted).
    pub fn flag_str(&self, name: &str) -> Option<String> {
        self.flag(name).map(|value| match value {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    /// Whether no arguments were given.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.flags.is_empty()
    }

    fn insert(&mut self, key: &str, value: Value) {
        match self.flags.get_mut(key) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                self.flags.insert(key.to_string(), value);
            }
        }
    }
}

fn takes_value(next: &str) -> bool {
    !next.starts_with('-') || is_number(next)
}

fn is_number(s: &str) -> bool {
    s.parse::<f64>().is_ok()
}

fn coerce(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Some(n) = raw.parse::<f64>().ok().and_then(Number::from_f64) {
        return Value::Number(n);
    }
    Value::String(raw.to_string())
}
