//! Recursive descent parser for drover scripts.
//!
//! Parsing is total at the script level: a statement that cannot be parsed
//! causes exactly one token to be skipped and recorded, then parsing
//! resumes. Inside a parse function there is no backtracking, so a failed
//! production keeps whatever tokens it already consumed. Nesting deeper
//! than `MAX_PARSE_DEPTH` fails the production like any other no-match,
//! keeping the native stack bounded. The only fatal condition is budget
//! exhaustion, which aborts the whole parse.

use serde::Serialize;
use tracing::debug;

use crate::ast::{BinaryOp, Expr, Statement, UnaryOp};
use crate::budget::BudgetChecker;
use crate::error::BudgetExceeded;
use crate::lexer::{tokenize, Token, TokenKind};

/// Position and lexeme of a token dropped during recovery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedToken {
    pub line: u32,
    pub column: u32,
    pub lexeme: String,
}

/// Inner parse outcome: `Ok(None)` is a recoverable no-match, `Err` is a
/// budget abort.
type Parsed<T> = Result<Option<T>, BudgetExceeded>;

/// Nesting bound for the recursive descent. A production past this depth
/// fails as an ordinary no-match, so pathological nesting degrades into
/// skipped tokens instead of overflowing the native stack.
const MAX_PARSE_DEPTH: usize = 128;

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
    budget: Option<&'a mut dyn BudgetChecker>,
    skipped: Vec<SkippedToken>,
}

impl<'a> Parser<'a> {
    /// Parser with no budget attached; nothing is ever charged.
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            pos: 0,
            depth: 0,
            budget: None,
            skipped: Vec::new(),
        }
    }

    /// Parser that charges the given budget at every recursive entry point.
    pub fn with_budget(budget: &'a mut dyn BudgetChecker) -> Self {
        Self {
            tokens: Vec::new(),
            pos: 0,
            depth: 0,
            budget: Some(budget),
            skipped: Vec::new(),
        }
    }

    /// Tokens skipped during the most recent [`Parser::parse_script`] call.
    pub fn skipped(&self) -> &[SkippedToken] {
        &self.skipped
    }

    /// Parse a whole script into statements.
    ///
    /// Newline tokens are discarded up front; statement boundaries fall out
    /// of the grammar itself. Unparseable tokens are skipped one at a time
    /// and reported through [`Parser::skipped`].
    pub fn parse_script(&mut self, source: &str) -> Result<Vec<Statement>, BudgetExceeded> {
        self.tokens = tokenize(source)
            .into_iter()
            .filter(|t| t.kind != TokenKind::Newline)
            .collect();
        self.pos = 0;
        self.depth = 0;
        self.skipped.clear();

        let mut statements = Vec::new();
        while !self.check(TokenKind::Eof) {
            match self.parse_statement()? {
                Some(statement) => statements.push(statement),
                None => self.skip_token(),
            }
        }
        Ok(statements)
    }

    // -----------------------------------------------------------------------
    // Statements
    // -----------------------------------------------------------------------

    fn parse_statement(&mut self) -> Parsed<Statement> {
        self.charge("parse_statement")?;
        if self.depth >= MAX_PARSE_DEPTH {
            return Ok(None);
        }
        self.depth += 1;
        let statement = match self.kind() {
            TokenKind::Identifier
                if matches!(
                    self.next_kind(),
                    TokenKind::Assign | TokenKind::ColonAssign
                ) =>
            {
                self.parse_assignment()
            }
            TokenKind::If => self.parse_if(),
            TokenKind::Foreach => self.parse_foreach(),
            TokenKind::Push => self.parse_push(),
            TokenKind::Pop => self.parse_pop(),
            TokenKind::LBrace => self.parse_block(),
            TokenKind::Identifier => self.parse_command(),
            _ => self
                .parse_expression()
                .map(|expr| expr.map(|value| Statement::Expression { value })),
        };
        self.depth -= 1;
        statement
    }

    fn parse_assignment(&mut self) -> Parsed<Statement> {
        let variable = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            _ => return Ok(None),
        };
        if !self.eat(TokenKind::Assign) && !self.eat(TokenKind::ColonAssign) {
            return Ok(None);
        }
        let value = match self.parse_expression()? {
            Some(value) => value,
            None => return Ok(None),
        };
        Ok(Some(Statement::Assignment { variable, value }))
    }

    fn parse_if(&mut self) -> Parsed<Statement> {
        self.advance();
        let condition = if self.eat(TokenKind::LParen) {
            let condition = match self.parse_expression()? {
                Some(condition) => condition,
                None => return Ok(None),
            };
            if !self.eat(TokenKind::RParen) {
                return Ok(None);
            }
            condition
        } else {
            match self.parse_expression()? {
                Some(condition) => condition,
                None => return Ok(None),
            }
        };
        self.eat(TokenKind::Colon);
        let then_stmt = match self.parse_statement()? {
            Some(statement) => statement,
            None => return Ok(None),
        };
        // A broken else branch drops the else; the if itself stands.
        let else_branch = if self.eat(TokenKind::Else) {
            self.parse_statement()?.map(|statement| vec![statement])
        } else {
            None
        };
        Ok(Some(Statement::If {
            condition,
            then_branch: vec![then_stmt],
            else_branch,
        }))
    }

    fn parse_foreach(&mut self) -> Parsed<Statement> {
        self.advance();
        let parenthesized = self.eat(TokenKind::LParen);
        if !self.check(TokenKind::Identifier) {
            return Ok(None);
        }
        let variable = match self.advance() {
            Some(t) => t.text.clone(),
            None => return Ok(None),
        };
        if !self.eat(TokenKind::In) {
            return Ok(None);
        }
        let iterable = match self.parse_expression()? {
            Some(iterable) => iterable,
            None => return Ok(None),
        };
        if parenthesized && !self.eat(TokenKind::RParen) {
            return Ok(None);
        }
        self.eat(TokenKind::Colon);
        let body = match self.parse_statement()? {
            Some(statement) => statement,
            None => return Ok(None),
        };
        Ok(Some(Statement::Foreach {
            variable,
            iterable,
            body: vec![body],
        }))
    }

    fn parse_push(&mut self) -> Parsed<Statement> {
        self.advance();
        let value = match self.parse_expression()? {
            Some(value) => value,
            None => return Ok(None),
        };
        Ok(Some(Statement::Push { value }))
    }

    fn parse_pop(&mut self) -> Parsed<Statement> {
        self.advance();
        let variable = if self.check(TokenKind::Identifier) {
            self.advance().map(|t| t.text.clone())
        } else {
            None
        };
        Ok(Some(Statement::Pop { variable }))
    }

    fn parse_block(&mut self) -> Parsed<Statement> {
        self.advance();
        let mut statements = Vec::new();
        while !self.check(TokenKind::RBrace) {
            // Running out of input means the brace never closes; the whole
            // block fails.
            if self.check(TokenKind::Eof) {
                return Ok(None);
            }
            match self.parse_statement()? {
                Some(statement) => statements.push(statement),
                None => self.skip_token(),
            }
        }
        self.advance();
        Ok(Some(Statement::Block { statements }))
    }

    fn parse_command(&mut self) -> Parsed<Statement> {
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            _ => return Ok(None),
        };
        if !self.eat(TokenKind::LParen) {
            return Ok(None);
        }
        let args = self.parse_arguments()?;
        if !self.eat(TokenKind::RParen) {
            return Ok(None);
        }
        Ok(Some(Statement::Command { name, args }))
    }

    /// Comma-separated arguments up to a closing paren. Each argument is
    /// charged before it is parsed.
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, BudgetExceeded> {
        let mut args = Vec::new();
        loop {
            if self.check(TokenKind::RParen) {
                break;
            }
            self.charge("parse_function_call")?;
            match self.parse_expression()? {
                Some(arg) => args.push(arg),
                None => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        Ok(args)
    }

    // -----------------------------------------------------------------------
    // Expressions, lowest precedence first
    // -----------------------------------------------------------------------

    fn parse_expression(&mut self) -> Parsed<Expr> {
        self.charge("parse_expression")?;
        if self.depth >= MAX_PARSE_DEPTH {
            return Ok(None);
        }
        self.depth += 1;
        let expr = self.parse_logical_or();
        self.depth -= 1;
        expr
    }

    fn parse_logical_or(&mut self) -> Parsed<Expr> {
        let mut left = match self.parse_logical_and()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        while self.check(TokenKind::Or) {
            self.charge("parse_expression")?;
            self.advance();
            let right = match self.parse_logical_and()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            left = Expr::Binary {
                op: BinaryOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(Some(left))
    }

    fn parse_logical_and(&mut self) -> Parsed<Expr> {
        let mut left = match self.parse_equality()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        while self.check(TokenKind::And) {
            self.charge("parse_expression")?;
            self.advance();
            let right = match self.parse_equality()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            left = Expr::Binary {
                op: BinaryOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(Some(left))
    }

    fn parse_equality(&mut self) -> Parsed<Expr> {
        let mut left = match self.parse_comparison()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        loop {
            let op = match self.kind() {
                TokenKind::Eq => BinaryOp::Eq,
                TokenKind::NotEq => BinaryOp::NotEq,
                _ => break,
            };
            self.charge("parse_expression")?;
            self.advance();
            let right = match self.parse_comparison()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(Some(left))
    }

    fn parse_comparison(&mut self) -> Parsed<Expr> {
        let mut left = match self.parse_addition()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        loop {
            let op = match self.kind() {
                TokenKind::Lt => BinaryOp::Lt,
                TokenKind::Gt => BinaryOp::Gt,
                TokenKind::LtEq => BinaryOp::LtEq,
                TokenKind::GtEq => BinaryOp::GtEq,
                _ => break,
            };
            self.charge("parse_expression")?;
            self.advance();
            let right = match self.parse_addition()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(Some(left))
    }

    fn parse_addition(&mut self) -> Parsed<Expr> {
        let mut left = match self.parse_multiplication()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        loop {
            let op = match self.kind() {
                TokenKind::Plus => BinaryOp::Add,
                TokenKind::Minus => BinaryOp::Sub,
                _ => break,
            };
            self.charge("parse_expression")?;
            self.advance();
            let right = match self.parse_multiplication()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(Some(left))
    }

    fn parse_multiplication(&mut self) -> Parsed<Expr> {
        let mut left = match self.parse_unary()? {
            Some(expr) => expr,
            None => return Ok(None),
        };
        loop {
            let op = match self.kind() {
                TokenKind::Star => BinaryOp::Mul,
                TokenKind::Slash => BinaryOp::Div,
                TokenKind::Percent => BinaryOp::Mod,
                _ => break,
            };
            self.charge("parse_expression")?;
            self.advance();
            let right = match self.parse_unary()? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(Some(left))
    }

    fn parse_unary(&mut self) -> Parsed<Expr> {
        let op = match self.kind() {
            TokenKind::Not => Some(UnaryOp::Not),
            TokenKind::Minus => Some(UnaryOp::Neg),
            _ => None,
        };
        if let Some(op) = op {
            self.charge("parse_expression")?;
            if self.depth >= MAX_PARSE_DEPTH {
                return Ok(None);
            }
            self.advance();
            self.depth += 1;
            let operand = self.parse_unary();
            self.depth -= 1;
            let operand = match operand? {
                Some(expr) => expr,
                None => return Ok(None),
            };
            return Ok(Some(Expr::Unary {
                op,
                operand: Box::new(operand),
            }));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Parsed<Expr> {
        match self.kind() {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                if !self.eat(TokenKind::RParen) {
                    return Ok(None);
                }
                Ok(inner)
            }
            TokenKind::Identifier => match self.next_kind() {
                TokenKind::LParen => self.parse_function_call(),
                TokenKind::LBracket => self.parse_dictionary_access(),
                _ => {
                    let name = match self.advance() {
                        Some(t) => t.text.clone(),
                        None => return Ok(None),
                    };
                    Ok(Some(Expr::Variable { name }))
                }
            },
            TokenKind::LBracket => self.parse_list_literal(),
            TokenKind::LBrace => self.parse_dictionary_literal(),
            TokenKind::Str => {
                let text = match self.advance() {
                    Some(t) => t.text.clone(),
                    None => return Ok(None),
                };
                Ok(Some(Expr::Str(text)))
            }
            TokenKind::Number => {
                let text = match self.advance() {
                    Some(t) => t.text.clone(),
                    None => return Ok(None),
                };
                Ok(Some(number_literal(&text)))
            }
            TokenKind::Bool => {
                let text = match self.advance() {
                    Some(t) => t.text.clone(),
                    None => return Ok(None),
                };
                Ok(Some(Expr::Bool(text.eq_ignore_ascii_case("true"))))
            }
            _ => Ok(None),
        }
    }

    fn parse_function_call(&mut self) -> Parsed<Expr> {
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            _ => return Ok(None),
        };
        if !self.eat(TokenKind::LParen) {
            return Ok(None);
        }
        let args = self.parse_arguments()?;
        if !self.eat(TokenKind::RParen) {
            return Ok(None);
        }
        Ok(Some(Expr::FunctionCall { name, args }))
    }

    /// `name[key]`, one level deep. A further `[` after the closing bracket
    /// is not part of this production and stays in the stream.
    fn parse_dictionary_access(&mut self) -> Parsed<Expr> {
        let name = match self.advance() {
            Some(t) if t.kind == TokenKind::Identifier => t.text.clone(),
            _ => return Ok(None),
        };
        if !self.eat(TokenKind::LBracket) {
            return Ok(None);
        }
        let key = match self.parse_expression()? {
            Some(key) => key,
            None => return Ok(None),
        };
        if !self.eat(TokenKind::RBracket) {
            return Ok(None);
        }
        Ok(Some(Expr::DictAccess {
            object: Box::new(Expr::Variable { name }),
            key: Box::new(key),
        }))
    }

    // Collection literals share the dictionary cost tag: once on entry and
    // once per element.

    fn parse_list_literal(&mut self) -> Parsed<Expr> {
        self.charge("parse_dictionary")?;
        self.advance();
        let mut items = Vec::new();
        loop {
            if self.check(TokenKind::RBracket) {
                break;
            }
            self.charge("parse_dictionary")?;
            match self.parse_expression()? {
                Some(item) => items.push(item),
                None => break,
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if !self.eat(TokenKind::RBracket) {
            return Ok(None);
        }
        Ok(Some(Expr::List(items)))
    }

    fn parse_dictionary_literal(&mut self) -> Parsed<Expr> {
        self.charge("parse_dictionary")?;
        self.advance();
        let mut pairs: Vec<(String, Expr)> = Vec::new();
        loop {
            if self.check(TokenKind::RBrace) {
                break;
            }
            self.charge("parse_dictionary")?;
            // Keys must be string literals.
            if !self.check(TokenKind::Str) {
                return Ok(None);
            }
            let key = match self.advance() {
                Some(t) => t.text.clone(),
                None => return Ok(None),
            };
            if !self.eat(TokenKind::Colon) {
                return Ok(None);
            }
            let value = match self.parse_expression()? {
                Some(value) => value,
                None => return Ok(None),
            };
            // A repeated key overwrites the value but keeps the original
            // position.
            match pairs.iter_mut().find(|(existing, _)| *existing == key) {
                Some(pair) => pair.1 = value,
                None => pairs.push((key, value)),
            }
            if !self.eat(TokenKind::Comma) {
                break;
            }
        }
        if !self.eat(TokenKind::RBrace) {
            return Ok(None);
        }
        Ok(Some(Expr::Dict(pairs)))
    }

    // -----------------------------------------------------------------------
    // Cursor helpers
    // -----------------------------------------------------------------------

    fn kind(&self) -> TokenKind {
        self.tokens.get(self.pos).map_or(TokenKind::Eof, |t| t.kind)
    }

    fn next_kind(&self) -> TokenKind {
        self.tokens
            .get(self.pos + 1)
            .map_or(TokenKind::Eof, |t| t.kind)
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn advance(&mut self) -> Option<&Token> {
        let token = self.tokens.get(self.pos);
        self.pos += 1;
        token
    }

    /// Consume the current token if it has the given kind.
    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Drop the current token and record it for diagnostics.
    fn skip_token(&mut self) {
        if let Some(token) = self.tokens.get(self.pos) {
            if token.kind != TokenKind::Eof {
                debug!(
                    line = token.line,
                    column = token.column,
                    lexeme = %token.text,
                    "skipping unparseable token"
                );
                self.skipped.push(SkippedToken {
                    line: token.line,
                    column: token.column,
                    lexeme: token.text.clone(),
                });
            }
        }
        self.pos += 1;
    }

    fn charge(&mut self, operation: &str) -> Result<(), BudgetExceeded> {
        match &mut self.budget {
            Some(budget) => budget.charge(operation),
            None => Ok(()),
        }
    }
}

impl Default for Parser<'_> {
    fn default() -> Self {
        Self::new()
    }
}

/// Numbers without a dot are integers, the rest are floats. A run the
/// scanner accepted but the parser cannot read (`1.2.3`, an over-long
/// integer) falls back to a string literal carrying the raw text.
fn number_literal(text: &str) -> Expr {
    if text.contains('.') {
        match text.parse::<f64>() {
            Ok(x) => Expr::Float(x),
            Err(_) => Expr::Str(text.to_string()),
        }
    } else {
        match text.parse::<i64>() {
            Ok(n) => Expr::Int(n),
            Err(_) => Expr::Str(text.to_string()),
        }
    }
}
