//! Total tokenizer for drover scripts.
//!
//! `tokenize` never fails: characters that do not start a token are dropped
//! and scanning continues, so malformed input degrades to fewer tokens
//! rather than an error. Downstream parsing decides what to do with the
//! stream that remains.

/// Kind of a scanned token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Str,
    Number,
    Bool,
    Assign,
    ColonAssign,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    And,
    Or,
    Not,
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Semicolon,
    Colon,
    If,
    Else,
    Foreach,
    In,
    Push,
    Pop,
    Newline,
    Eof,
}

/// One scanned token with its source position.
///
/// `text` is the lexeme as written: keywords keep their original casing and
/// string literals hold the raw characters between the quotes, escapes
/// included. `line` and `column` are 1-based and point at the first
/// character of the lexeme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: u32,
    pub column: u32,
}

/// Scan `source` into tokens.
///
/// Newlines produce [`TokenKind::Newline`] tokens and `#` comments run to
/// the end of the line. The returned vector always ends with a
/// [`TokenKind::Eof`] token carrying the position one past the last input
/// character.
pub fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();
    let mut line: u32 = 1;
    let mut column: u32 = 1;

    while let Some(&ch) = chars.peek() {
        match ch {
            '\n' => {
                chars.next();
                tokens.push(Token {
                    kind: TokenKind::Newline,
                    text: "\n".to_string(),
                    line,
                    column,
                });
                line += 1;
                column = 1;
            }
            c if c.is_whitespace() => {
                chars.next();
                column += 1;
            }
            '#' => {
                // Comment runs to the end of the line; the newline itself
                // still becomes a token.
                while let Some(&c) = chars.peek() {
                    if c == '\n' {
                        break;
                    }
                    chars.next();
                    column += 1;
                }
            }
            c if c.is_alphabetic() || c == '_' => {
                let start_column = column;
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        text.push(c);
                        chars.next();
                        column += 1;
                    } else {
                        break;
                    }
                }
                let kind = keyword_kind(&text);
                tokens.push(Token {
                    kind,
                    text,
                    line,
                    column: start_column,
                });
            }
            c if c.is_ascii_digit() => {
                let start_column = column;
                let mut text = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_ascii_digit() || c == '.' {
                        text.push(c);
                        chars.next();
                        column += 1;
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    kind: TokenKind::Number,
                    text,
                    line,
                    column: start_column,
                });
            }
            quote @ ('"' | '\'') => {
                let start_column = column;
                chars.next();
                column += 1;
                let mut text = String::new();
                let mut terminated = false;
                while let Some(c) = chars.next() {
                    column += 1;
                    if c == quote {
                        terminated = true;
                        break;
                    }
                    if c == '\\' {
                        // Escapes are kept raw: the backslash and the
                        // following character both land in the lexeme.
                        match chars.next() {
                            Some(escaped) => {
                                column += 1;
                                text.push('\\');
                                text.push(escaped);
                            }
                            None => break,
                        }
                    } else {
                        text.push(c);
                    }
                }
                // An unterminated literal produces no token at all.
                if terminated {
                    tokens.push(Token {
                        kind: TokenKind::Str,
                        text,
                        line,
                        column: start_column,
                    });
                }
            }
            op @ ('+' | '-' | '*' | '/' | '%' | '=' | '!' | '<' | '>' | '&' | '|') => {
                chars.next();
                let pair = match (op, chars.peek().copied()) {
                    ('=', Some('=')) => Some((TokenKind::Eq, "==")),
                    ('!', Some('=')) => Some((TokenKind::NotEq, "!=")),
                    ('<', Some('=')) => Some((TokenKind::LtEq, "<=")),
                    ('>', Some('=')) => Some((TokenKind::GtEq, ">=")),
                    ('&', Some('&')) => Some((TokenKind::And, "&&")),
                    ('|', Some('|')) => Some((TokenKind::Or, "||")),
                    _ => None,
                };
                if let Some((kind, text)) = pair {
                    chars.next();
                    tokens.push(Token {
                        kind,
                        text: text.to_string(),
                        line,
                        column,
                    });
                    column += 2;
                } else if let Some(kind) = single_operator(op) {
                    tokens.push(Token {
                        kind,
                        text: op.to_string(),
                        line,
                        column,
                    });
                    column += 1;
                } else {
                    // A lone '&' or '|' is not an operator; drop it.
                    column += 1;
                }
            }
            ':' => {
                chars.next();
                if chars.peek() == Some(&'=') {
                    chars.next();
                    tokens.push(Token {
                        kind: TokenKind::ColonAssign,
                        text: ":=".to_string(),
                        line,
                        column,
                    });
                    column += 2;
                } else {
                    tokens.push(Token {
                        kind: TokenKind::Colon,
                        text: ":".to_string(),
                        line,
                        column,
                    });
                    column += 1;
                }
            }
            c @ ('(' | ')' | '{' | '}' | '[' | ']' | ',' | ';') => {
                chars.next();
                let kind = match c {
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '{' => TokenKind::LBrace,
                    '}' => TokenKind::RBrace,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    ',' => TokenKind::Comma,
                    _ => TokenKind::Semicolon,
                };
                tokens.push(Token {
                    kind,
                    text: c.to_string(),
                    line,
                    column,
                });
                column += 1;
            }
            _ => {
                chars.next();
                column += 1;
            }
        }
    }

    tokens.push(Token {
        kind: TokenKind::Eof,
        text: String::new(),
        line,
        column,
    });
    tokens
}

/// Keywords are matched case-insensitively; anything else is an identifier.
fn keyword_kind(text: &str) -> TokenKind {
    match text.to_lowercase().as_str() {
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "foreach" => TokenKind::Foreach,
        "in" => TokenKind::In,
        "push" => TokenKind::Push,
        "pop" => TokenKind::Pop,
        "true" | "false" => TokenKind::Bool,
        "not" => TokenKind::Not,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        _ => TokenKind::Identifier,
    }
}

fn single_operator(op: char) -> Option<TokenKind> {
    match op {
        '+' => Some(TokenKind::Plus),
        '-' => Some(TokenKind::Minus),
        '*' => Some(TokenKind::Star),
        '/' => Some(TokenKind::Slash),
        '%' => Some(TokenKind::Percent),
        '=' => Some(TokenKind::Assign),
        '!' => Some(TokenKind::Not),
        '<' => Some(TokenKind::Lt),
        '>' => Some(TokenKind::Gt),
        _ => None,
    }
}
