//! Statement and expression trees produced by the parser.
//!
//! The `Serialize` impls are written by hand because the JSON shape is a
//! stable contract: statements and compound expressions serialize as tagged
//! maps, literals serialize as raw JSON scalars, and operator applications
//! use the uppercase `BINARY_OPERATION` / `UNARY_OPERATION` tags with the
//! operator symbol spelled out.

use serde::ser::{Serialize, SerializeMap, Serializer};

/// A top-level statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment {
        variable: String,
        value: Expr,
    },
    If {
        condition: Expr,
        then_branch: Vec<Statement>,
        else_branch: Option<Vec<Statement>>,
    },
    Foreach {
        variable: String,
        iterable: Expr,
        body: Vec<Statement>,
    },
    Push {
        value: Expr,
    },
    Pop {
        variable: Option<String>,
    },
    Block {
        statements: Vec<Statement>,
    },
    Command {
        name: String,
        args: Vec<Expr>,
    },
    Expression {
        value: Expr,
    },
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<Expr>),
    Dict(Vec<(String, Expr)>),
    Variable {
        name: String,
    },
    FunctionCall {
        name: String,
        args: Vec<Expr>,
    },
    /// Single-level keyed access, `object[key]`.
    DictAccess {
        object: Box<Expr>,
        key: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOp {
    /// Symbol as written in source, used in serialized trees and messages.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Gt => ">",
            BinaryOp::LtEq => "<=",
            BinaryOp::GtEq => ">=",
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Neg,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Not => "!",
            UnaryOp::Neg => "-",
        }
    }
}

impl Serialize for Statement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Statement::Assignment { variable, value } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "assignment")?;
                map.serialize_entry("variable", variable)?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Statement::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let entries = if else_branch.is_some() { 4 } else { 3 };
                let mut map = serializer.serialize_map(Some(entries))?;
                map.serialize_entry("type", "if")?;
                map.serialize_entry("condition", condition)?;
                map.serialize_entry("then", then_branch)?;
                // "else" is omitted entirely when the branch is absent.
                if let Some(else_branch) = else_branch {
                    map.serialize_entry("else", else_branch)?;
                }
                map.end()
            }
            Statement::Foreach {
                variable,
                iterable,
                body,
            } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "foreach")?;
                map.serialize_entry("variable", variable)?;
                map.serialize_entry("iterable", iterable)?;
                map.serialize_entry("body", body)?;
                map.end()
            }
            Statement::Push { value } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "push")?;
                map.serialize_entry("value", value)?;
                map.end()
            }
            Statement::Pop { variable } => {
                // "variable" is always present, null when no target was named.
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "pop")?;
                map.serialize_entry("variable", variable)?;
                map.end()
            }
            Statement::Block { statements } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "block")?;
                map.serialize_entry("statements", statements)?;
                map.end()
            }
            Statement::Command { name, args } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "command")?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("args", args)?;
                map.end()
            }
            Statement::Expression { value } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "expression")?;
                map.serialize_entry("value", value)?;
                map.end()
            }
        }
    }
}

impl Serialize for Expr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Expr::Str(s) => serializer.serialize_str(s),
            Expr::Int(n) => serializer.serialize_i64(*n),
            Expr::Float(x) => serializer.serialize_f64(*x),
            Expr::Bool(b) => serializer.serialize_bool(*b),
            Expr::List(items) => serializer.collect_seq(items),
            Expr::Dict(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (key, value) in pairs {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
            Expr::Variable { name } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("type", "variable")?;
                map.serialize_entry("name", name)?;
                map.end()
            }
            Expr::FunctionCall { name, args } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "function_call")?;
                map.serialize_entry("name", name)?;
                map.serialize_entry("args", args)?;
                map.end()
            }
            Expr::DictAccess { object, key } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "dictionary_access")?;
                map.serialize_entry("object", object)?;
                map.serialize_entry("key", key)?;
                map.end()
            }
            Expr::Binary { op, left, right } => {
                let mut map = serializer.serialize_map(Some(4))?;
                map.serialize_entry("type", "BINARY_OPERATION")?;
                map.serialize_entry("operator", op.symbol())?;
                map.serialize_entry("left", left)?;
                map.serialize_entry("right", right)?;
                map.end()
            }
            Expr::Unary { op, operand } => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("type", "UNARY_OPERATION")?;
                map.serialize_entry("operator", op.symbol())?;
                map.serialize_entry("operand", operand)?;
                map.end()
            }
        }
    }
}
