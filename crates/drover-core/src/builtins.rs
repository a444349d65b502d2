//! Built-in functions available to every script, host or no host.
//!
//! Built-ins are pure over their arguments except for `print`, `assert` and
//! `debug`. Name resolution order against host commands lives in the
//! interpreter, not here.

use crate::error::ScriptError;
use crate::value::Value;

/// One built-in: metadata plus the implementation.
pub struct Builtin {
    pub name: &'static str,
    pub description: &'static str,
    run: fn(&[Value]) -> Result<Value, ScriptError>,
}

impl Builtin {
    pub fn call(&self, args: &[Value]) -> Result<Value, ScriptError> {
        (self.run)(args)
    }
}

pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        description: "Get the length of a string, list, or dictionary",
        run: length,
    },
    Builtin {
        name: "upper",
        description: "Convert a string to uppercase",
        run: upper,
    },
    Builtin {
        name: "lower",
        description: "Convert a string to lowercase",
        run: lower,
    },
    Builtin {
        name: "trim",
        description: "Strip leading and trailing whitespace",
        run: trim,
    },
    Builtin {
        name: "substring",
        description: "Extract part of a string by position",
        run: substring,
    },
    Builtin {
        name: "contains",
        description: "Check whether a value contains a substring",
        run: contains,
    },
    Builtin {
        name: "startsWith",
        description: "Check whether a string starts with a prefix",
        run: starts_with,
    },
    Builtin {
        name: "endsWith",
        description: "Check whether a string ends with a suffix",
        run: ends_with,
    },
    Builtin {
        name: "split",
        description: "Split a string into a list of parts",
        run: split,
    },
    Builtin {
        name: "join",
        description: "Join list elements into a single string",
        run: join,
    },
    Builtin {
        name: "toNumber",
        description: "Convert a value to a number",
        run: to_number,
    },
    Builtin {
        name: "toString",
        description: "Convert a value to a string",
        run: to_string,
    },
    Builtin {
        name: "isNumber",
        description: "Check whether a value is numeric",
        run: is_number,
    },
    Builtin {
        name: "isString",
        description: "Check whether a value is a string",
        run: is_string,
    },
    Builtin {
        name: "isList",
        description: "Check whether a value is a list",
        run: is_list,
    },
    Builtin {
        name: "isEmpty",
        description: "Check whether a value is empty",
        run: is_empty,
    },
    Builtin {
        name: "print",
        description: "Print values to the output",
        run: print_values,
    },
    Builtin {
        name: "assert",
        description: "Fail the script when a condition is false",
        run: assert_condition,
    },
    Builtin {
        name: "debug",
        description: "Print a value with a debug marker",
        run: debug_value,
    },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

/// Alphabetical listing used by help output.
pub fn help_text() -> String {
    let mut entries: Vec<&Builtin> = BUILTINS.iter().collect();
    entries.sort_by_key(|builtin| builtin.name);
    let mut text = String::from("Built-in functions:\n");
    for builtin in entries {
        text.push_str(&format!("  {:<12} {}\n", builtin.name, builtin.description));
    }
    text
}

// ---------------------------------------------------------------------------
// Argument helpers
// ---------------------------------------------------------------------------

fn require<'a>(args: &'a [Value], index: usize, name: &str) -> Result<&'a Value, ScriptError> {
    args.get(index).ok_or_else(|| ScriptError::Value {
        message: format!("{} expects at least {} argument(s)", name, index + 1),
    })
}

fn number_arg(args: &[Value], index: usize, name: &str) -> Result<f64, ScriptError> {
    let value = require(args, index, name)?;
    value.as_number().ok_or_else(|| ScriptError::Type {
        message: format!(
            "{} expects a numeric argument, got {}",
            name,
            value.type_name()
        ),
    })
}

// ---------------------------------------------------------------------------
// Implementations
// ---------------------------------------------------------------------------

fn length(args: &[Value]) -> Result<Value, ScriptError> {
    let count = match require(args, 0, "len")? {
        Value::Str(s) => s.chars().count(),
        Value::List(items) => items.len(),
        Value::Dict(pairs) => pairs.len(),
        other => other.as_string().chars().count(),
    };
    Ok(Value::Int(count as i64))
}

fn upper(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Str(require(args, 0, "upper")?.as_string().to_uppercase()))
}

fn lower(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Str(require(args, 0, "lower")?.as_string().to_lowercase()))
}

fn trim(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Str(
        require(args, 0, "trim")?.as_string().trim().to_string(),
    ))
}

/// `substring(value, start)` or `substring(value, start, length)`, by
/// characters. Negative starts count from the end; out-of-range positions
/// clamp instead of failing.
fn substring(args: &[Value]) -> Result<Value, ScriptError> {
    let text = require(args, 0, "substring")?.as_string();
    let start = number_arg(args, 1, "substring")? as i64;
    let chars: Vec<char> = text.chars().collect();
    let len = chars.len() as i64;
    let clamp = |index: i64| -> usize {
        if index < 0 {
            (len + index).max(0) as usize
        } else {
            index.min(len) as usize
        }
    };
    let begin = clamp(start);
    let end = match args.get(2) {
        Some(_) => {
            let length = number_arg(args, 2, "substring")? as i64;
            clamp(start.saturating_add(length))
        }
        None => chars.len(),
    };
    let end = end.max(begin);
    Ok(Value::Str(chars[begin..end].iter().collect()))
}

fn contains(args: &[Value]) -> Result<Value, ScriptError> {
    let haystack = require(args, 0, "contains")?.as_string();
    let needle = require(args, 1, "contains")?.as_string();
    Ok(Value::Bool(haystack.contains(&needle)))
}

fn starts_with(args: &[Value]) -> Result<Value, ScriptError> {
    let text = require(args, 0, "startsWith")?.as_string();
    let prefix = require(args, 1, "startsWith")?.as_string();
    Ok(Value::Bool(text.starts_with(&prefix)))
}

fn ends_with(args: &[Value]) -> Result<Value, ScriptError> {
    let text = require(args, 0, "endsWith")?.as_string();
    let suffix = require(args, 1, "endsWith")?.as_string();
    Ok(Value::Bool(text.ends_with(&suffix)))
}

/// `split(value)` splits on single spaces, `split(value, sep)` on `sep`.
/// Empty fields are kept.
fn split(args: &[Value]) -> Result<Value, ScriptError> {
    let text = require(args, 0, "split")?.as_string();
    let separator = match args.get(1) {
        Some(sep) => sep.as_string(),
        None => " ".to_string(),
    };
    if separator.is_empty() {
        return Err(ScriptError::Value {
            message: "split requires a non-empty separator".to_string(),
        });
    }
    Ok(Value::List(
        text.split(separator.as_str())
            .map(|part| Value::Str(part.to_string()))
            .collect(),
    ))
}

fn join(args: &[Value]) -> Result<Value, ScriptError> {
    let parts: Vec<String> = match require(args, 0, "join")? {
        Value::List(items) => items.iter().map(|item| item.as_string()).collect(),
        Value::Str(s) => s.chars().map(|c| c.to_string()).collect(),
        other => {
            return Err(ScriptError::Type {
                message: format!("join expects a list, got {}", other.type_name()),
            })
        }
    };
    let separator = match args.get(1) {
        Some(sep) => sep.as_string(),
        None => " ".to_string(),
    };
    Ok(Value::Str(parts.join(&separator)))
}

/// Conversion always produces a float; integer-ness is not preserved.
fn to_number(args: &[Value]) -> Result<Value, ScriptError> {
    let value = require(args, 0, "toNumber")?;
    value
        .as_number()
        .map(Value::Float)
        .ok_or_else(|| ScriptError::Value {
            message: format!("cannot convert '{}' to a number", value),
        })
}

fn to_string(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Str(require(args, 0, "toString")?.as_string()))
}

fn is_number(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Bool(require(args, 0, "isNumber")?.as_number().is_some()))
}

fn is_string(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Bool(matches!(
        require(args, 0, "isString")?,
        Value::Str(_)
    )))
}

fn is_list(args: &[Value]) -> Result<Value, ScriptError> {
    Ok(Value::Bool(matches!(
        require(args, 0, "isList")?,
        Value::List(_)
    )))
}

fn is_empty(args: &[Value]) -> Result<Value, ScriptError> {
    let empty = match require(args, 0, "isEmpty")? {
        Value::Str(s) => s.is_empty(),
        Value::List(items) => items.is_empty(),
        Value::Dict(pairs) => pairs.is_empty(),
        other => !other.is_truthy(),
    };
    Ok(Value::Bool(empty))
}

fn print_values(args: &[Value]) -> Result<Value, ScriptError> {
    let line = args
        .iter()
        .map(|value| value.as_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("{}", line);
    Ok(Value::Null)
}

fn assert_condition(args: &[Value]) -> Result<Value, ScriptError> {
    let condition = require(args, 0, "assert")?;
    if !condition.is_truthy() {
        let message = match args.get(1) {
            Some(message) => message.as_string(),
            None => "condition was false".to_string(),
        };
        return Err(ScriptError::Assertion { message });
    }
    Ok(Value::Null)
}

fn debug_value(args: &[Value]) -> Result<Value, ScriptError> {
    let value = require(args, 0, "debug")?;
    println!("[DEBUG] {}", value);
    Ok(Value::Null)
}
