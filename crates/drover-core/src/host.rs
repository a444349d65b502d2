//! Command boundary between scripts and the embedding application.
//!
//! Scripts drive their host through named commands. The host side
//! implements [`CommandHost`]; [`CommandRegistry`] is a closure-backed
//! implementation for applications that register commands one at a time,
//! and [`NullHost`] is the dry-run host the CLI uses when no application is
//! attached.

use tracing::info;

use crate::builtins;
use crate::error::ScriptError;
use crate::value::Value;

/// Descriptive metadata for one host command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInfo {
    pub name: String,
    pub description: String,
    pub category: String,
}

/// Interface the interpreter uses to reach application commands.
pub trait CommandHost {
    /// True when the host exposes a command with this name.
    fn contains(&self, name: &str) -> bool;

    /// Invoke a host command with already-evaluated arguments.
    fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError>;

    /// Metadata for every exposed command, for help output.
    fn describe(&self) -> Vec<CommandInfo>;
}

type CommandFn = Box<dyn FnMut(&[Value]) -> Result<Value, ScriptError>>;

struct RegisteredCommand {
    info: CommandInfo,
    handler: CommandFn,
}

/// Closure-backed [`CommandHost`].
///
/// Registration order is preserved for help output. Registering a name a
/// second time replaces the earlier handler.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<RegisteredCommand>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, category: &str, description: &str, handler: F)
    where
        F: FnMut(&[Value]) -> Result<Value, ScriptError> + 'static,
    {
        let info = CommandInfo {
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
        };
        let handler: CommandFn = Box::new(handler);
        match self
            .commands
            .iter_mut()
            .find(|command| command.info.name == name)
        {
            Some(existing) => {
                existing.info = info;
                existing.handler = handler;
            }
            None => self.commands.push(RegisteredCommand { info, handler }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }
}

impl CommandHost for CommandRegistry {
    fn contains(&self, name: &str) -> bool {
        self.commands.iter().any(|command| command.info.name == name)
    }

    fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        match self
            .commands
            .iter_mut()
            .find(|command| command.info.name == name)
        {
            Some(command) => (command.handler)(args),
            None => Err(ScriptError::UnknownCommand {
                name: name.to_string(),
            }),
        }
    }

    fn describe(&self) -> Vec<CommandInfo> {
        self.commands
            .iter()
            .map(|command| command.info.clone())
            .collect()
    }
}

/// Dry-run host: accepts any command name, logs the invocation, returns
/// null.
///
/// Names in the built-in table are deliberately not claimed, so `print` and
/// friends keep their real behavior when scripts run without an
/// application.
#[derive(Debug, Default)]
pub struct NullHost {
    calls: Vec<String>,
}

impl NullHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the commands invoked so far, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }
}

impl CommandHost for NullHost {
    fn contains(&self, name: &str) -> bool {
        builtins::lookup(name).is_none()
    }

    fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        let rendered = args
            .iter()
            .map(|arg| arg.as_string())
            .collect::<Vec<_>>()
            .join(", ");
        info!(command = %name, args = %rendered, "dry-run command");
        self.calls.push(name.to_string());
        Ok(Value::Null)
    }

    fn describe(&self) -> Vec<CommandInfo> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_invokes_handlers() {
        let mut registry = CommandRegistry::new();
        registry.register("double", "math", "Double a number", |args| {
            let n = args[0].as_number().unwrap_or(0.0);
            Ok(Value::Float(n * 2.0))
        });
        assert!(registry.contains("double"));
        assert_eq!(
            registry.invoke("double", &[Value::Int(4)]).unwrap(),
            Value::Float(8.0)
        );
    }

    #[test]
    fn test_registry_rejects_unknown_names() {
        let mut registry = CommandRegistry::new();
        let err = registry.invoke("missing", &[]).unwrap_err();
        assert_eq!(
            err,
            ScriptError::UnknownCommand {
                name: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_reregistering_replaces_the_handler() {
        let mut registry = CommandRegistry::new();
        registry.register("go", "nav", "first", |_| Ok(Value::Int(1)));
        registry.register("go", "nav", "second", |_| Ok(Value::Int(2)));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.invoke("go", &[]).unwrap(), Value::Int(2));
        assert_eq!(registry.describe()[0].description, "second");
    }

    #[test]
    fn test_registry_handlers_may_capture_state() {
        let mut registry = CommandRegistry::new();
        let mut hits = 0u32;
        registry.register("count", "meta", "Count calls", move |_| {
            hits += 1;
            Ok(Value::Int(hits as i64))
        });
        assert_eq!(registry.invoke("count", &[]).unwrap(), Value::Int(1));
        assert_eq!(registry.invoke("count", &[]).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_null_host_claims_everything_but_builtins() {
        let host = NullHost::new();
        assert!(host.contains("launch_rover"));
        assert!(!host.contains("print"));
        assert!(!host.contains("len"));
    }

    #[test]
    fn test_null_host_records_calls_and_returns_null() {
        let mut host = NullHost::new();
        let result = host.invoke("deploy", &[Value::Int(1)]).unwrap();
        assert_eq!(result, Value::Null);
        host.invoke("retract", &[]).unwrap();
        assert_eq!(host.calls(), &["deploy".to_string(), "retract".to_string()]);
    }
}
