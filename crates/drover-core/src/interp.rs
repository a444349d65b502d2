//! Tree-walking evaluator for parsed scripts.
//!
//! One [`Interpreter`] owns the variable state, the host connection and the
//! budget. [`Interpreter::run_source`] threads a single budget through both
//! parsing and execution, so a script cannot buy extra evaluation time by
//! being cheap to parse.

use tracing::debug;

use crate::ast::{BinaryOp, Expr, Statement, UnaryOp};
use crate::budget::{BudgetChecker, ExecutionBudget};
use crate::builtins;
use crate::error::ScriptError;
use crate::host::CommandHost;
use crate::ops;
use crate::parser::{Parser, SkippedToken};
use crate::state::ScriptState;
use crate::value::Value;

pub struct Interpreter<H: CommandHost> {
    state: ScriptState,
    host: H,
    budget: ExecutionBudget,
    skipped: Vec<SkippedToken>,
}

impl<H: CommandHost> Interpreter<H> {
    pub fn new(host: H) -> Self {
        Self::with_budget(host, ExecutionBudget::default())
    }

    pub fn with_budget(host: H, budget: ExecutionBudget) -> Self {
        Self {
            state: ScriptState::new(),
            host,
            budget,
            skipped: Vec::new(),
        }
    }

    pub fn state(&self) -> &ScriptState {
        &self.state
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn budget(&self) -> &ExecutionBudget {
        &self.budget
    }

    /// Tokens the parser skipped during the most recent
    /// [`Interpreter::run_source`] call.
    pub fn skipped(&self) -> &[SkippedToken] {
        &self.skipped
    }

    /// Parse and execute a script.
    ///
    /// The budget is reset first, then charged by the parser and the
    /// evaluator alike. Variables and the stack persist across calls.
    /// Returns the value of the last statement, null for an empty script.
    pub fn run_source(&mut self, source: &str) -> Result<Value, ScriptError> {
        self.budget.reset();
        let mut parser = Parser::with_budget(&mut self.budget);
        let result = parser.parse_script(source);
        self.skipped = parser.skipped().to_vec();
        let statements = result?;
        self.execute(&statements)
    }

    /// Execute already-parsed statements.
    pub fn execute(&mut self, statements: &[Statement]) -> Result<Value, ScriptError> {
        let mut result = Value::Null;
        for statement in statements {
            result = self.execute_statement(statement)?;
        }
        Ok(result)
    }

    fn execute_statement(&mut self, statement: &Statement) -> Result<Value, ScriptError> {
        match statement {
            Statement::Assignment { variable, value } => {
                self.budget.charge("assignment")?;
                let value = self.eval_expr(value)?;
                self.state.set(variable.clone(), value.clone());
                Ok(value)
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.budget.charge("if_statement")?;
                let condition = self.eval_expr(condition)?;
                if condition.is_truthy() {
                    self.execute_branch(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute_branch(else_branch)
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Statement::Foreach {
                variable,
                iterable,
                body,
            } => {
                // Charged once on entry and once more per iteration.
                self.budget.charge("foreach_loop")?;
                let items = match self.eval_expr(iterable)? {
                    Value::List(items) => items,
                    other => {
                        return Err(ScriptError::Type {
                            message: format!("foreach expects a list, got {}", other.type_name()),
                        })
                    }
                };
                let mut results = Vec::new();
                for item in items {
                    self.budget.charge("foreach_loop")?;
                    self.state.set(variable.clone(), item);
                    for statement in body {
                        results.push(self.execute_statement(statement)?);
                    }
                }
                Ok(Value::List(results))
            }
            Statement::Push { value } => {
                let value = self.eval_expr(value)?;
                self.state.push(value.clone());
                Ok(value)
            }
            Statement::Pop { variable } => {
                let value = self.state.pop().ok_or(ScriptError::EmptyStack)?;
                if let Some(variable) = variable {
                    self.state.set(variable.clone(), value.clone());
                }
                Ok(value)
            }
            Statement::Block { statements } => {
                self.budget.charge("block")?;
                let mut results = Vec::new();
                for statement in statements {
                    results.push(self.execute_statement(statement)?);
                }
                Ok(Value::List(results))
            }
            Statement::Command { name, args } => {
                self.budget.charge("command_call")?;
                let args = self.eval_args(args)?;
                self.dispatch_command(name, &args)
            }
            Statement::Expression { value } => self.eval_expr(value),
        }
    }

    fn execute_branch(&mut self, branch: &[Statement]) -> Result<Value, ScriptError> {
        let mut result = Value::Null;
        for statement in branch {
            result = self.execute_statement(statement)?;
        }
        Ok(result)
    }

    /// Command statements give the host first claim on a name; expression
    /// calls go the other way around (see [`Interpreter::call_function`]).
    fn dispatch_command(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        debug!(command = %name, "dispatching command");
        if self.host.contains(name) {
            return self.host.invoke(name, args);
        }
        match builtins::lookup(name) {
            Some(builtin) => builtin.call(args),
            None => Err(ScriptError::UnknownCommand {
                name: name.to_string(),
            }),
        }
    }

    fn call_function(&mut self, name: &str, args: &[Value]) -> Result<Value, ScriptError> {
        if let Some(builtin) = builtins::lookup(name) {
            self.budget.charge("function_call")?;
            return builtin.call(args);
        }
        if self.host.contains(name) {
            self.budget.charge("command_call")?;
            return self.host.invoke(name, args);
        }
        Err(ScriptError::UnknownCommand {
            name: name.to_string(),
        })
    }

    fn eval_expr(&mut self, expr: &Expr) -> Result<Value, ScriptError> {
        match expr {
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Float(x) => Ok(Value::Float(*x)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval_expr(item)?);
                }
                Ok(Value::List(values))
            }
            Expr::Dict(pairs) => {
                let mut entries = Vec::with_capacity(pairs.len());
                for (key, value) in pairs {
                    entries.push((key.clone(), self.eval_expr(value)?));
                }
                Ok(Value::Dict(entries))
            }
            Expr::Variable { name } => {
                self.budget.charge("variable_access")?;
                self.state
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ScriptError::UndefinedVariable { name: name.clone() })
            }
            Expr::FunctionCall { name, args } => {
                let args = self.eval_args(args)?;
                self.call_function(name, &args)
            }
            Expr::DictAccess { object, key } => {
                let object = self.eval_expr(object)?;
                let key = self.eval_expr(key)?.as_string();
                match object {
                    // A missing key reads as null rather than failing.
                    Value::Dict(pairs) => Ok(pairs
                        .into_iter()
                        .find(|(existing, _)| *existing == key)
                        .map(|(_, value)| value)
                        .unwrap_or(Value::Null)),
                    other => Err(ScriptError::Type {
                        message: format!("cannot index {} with a key", other.type_name()),
                    }),
                }
            }
            Expr::Binary { op, left, right } => {
                self.budget.charge(binary_charge_tag(*op))?;
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                ops::apply_binary(*op, &left, &right)
            }
            Expr::Unary { op, operand } => {
                let tag = match op {
                    UnaryOp::Not => "logical",
                    UnaryOp::Neg => "arithmetic",
                };
                self.budget.charge(tag)?;
                let operand = self.eval_expr(operand)?;
                ops::apply_unary(*op, &operand)
            }
        }
    }

    fn eval_args(&mut self, args: &[Expr]) -> Result<Vec<Value>, ScriptError> {
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_expr(arg)?);
        }
        Ok(values)
    }

    /// Human-readable summary of everything a script can call.
    pub fn help(&self) -> String {
        let mut text = String::from("Drover scripting help\n\n");
        let commands = self.host.describe();
        if !commands.is_empty() {
            let mut categories: Vec<&str> =
                commands.iter().map(|info| info.category.as_str()).collect();
            categories.sort_unstable();
            categories.dedup();
            text.push_str("Host commands:\n");
            for category in categories {
                text.push_str(&format!("{}:\n", category));
                for info in commands.iter().filter(|info| info.category == category) {
                    text.push_str(&format!("  {:<14} {}\n", info.name, info.description));
                }
            }
            text.push('\n');
        }
        text.push_str(&builtins::help_text());
        text.push_str("\nSyntax:\n");
        text.push_str("  assignment   name = value, name := value\n");
        text.push_str("  command      command_name(arg1, arg2)\n");
        text.push_str("  conditional  if (condition) statement [else statement]\n");
        text.push_str("  iteration    foreach (item in list) statement\n");
        text.push_str("  stack        push value, pop [name]\n");
        text.push_str("  block        { statement statement }\n");
        text
    }
}

fn binary_charge_tag(op: BinaryOp) -> &'static str {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            "arithmetic"
        }
        BinaryOp::Eq
        | BinaryOp::NotEq
        | BinaryOp::Lt
        | BinaryOp::Gt
        | BinaryOp::LtEq
        | BinaryOp::GtEq => "comparison",
        BinaryOp::And | BinaryOp::Or => "logical",
    }
}
