//! Mutable state for one script run: named variables and the operand stack.

use std::collections::HashMap;

use crate::value::Value;

#[derive(Debug, Default)]
pub struct ScriptState {
    variables: HashMap<String, Value>,
    stack: Vec<Value>,
}

impl ScriptState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: String, value: Value) {
        self.variables.insert(name, value);
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &HashMap<String, Value> {
        &self.variables
    }

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Option<Value> {
        self.stack.pop()
    }

    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Drop all variables and stack entries.
    pub fn clear(&mut self) {
        self.variables.clear();
        self.stack.clear();
    }
}
