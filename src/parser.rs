//! A recursive-descent parser for the Swift-like host language.
//!
//! Tokenization and parsing happen in two passes: a lexer produces tokens
//! with byte spans and line numbers, then the parser folds them by operator
//! precedence so that `&&`, `||`, `!`, and the ternary come out structural.
//! Only the shapes the analyzer consumes are modeled; parameter lists, type
//! annotations, and generic clauses are skipped without interpretation.
//!
//! Precedence, lowest to highest: ternary, `||`, `&&`, comparison, additive,
//! multiplicative, prefix, postfix (call, member), primary.

use crate::error::ParseError;
use crate::syntax::{Block, Expr, ExprKind, Function, SourceFile, Stmt};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Number,
    Str,
    /// An operator spelling: `&&`, `||`, `!`, `==`, `<`, `+`, `=`, ...
    Op(String),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Semi,
    Question,
    Arrow,
    Dot,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    start: usize,
    end: usize,
}

fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut it = source.char_indices().peekable();
    let mut line = 1usize;

    while let Some((start, c)) = it.next() {
        let start_line = line;
        let kind = match c {
            '\n' => {
                line += 1;
                continue;
            }
            c if c.is_whitespace() => continue,
            '/' => match it.peek().map(|&(_, c2)| c2) {
                Some('/') => {
                    while let Some(&(_, c2)) = it.peek() {
                        if c2 == '\n' {
                            break;
                        }
                        it.next();
                    }
                    continue;
                }
                Some('*') => {
                    it.next();
                    let mut prev = '\0';
                    let mut closed = false;
                    for (_, c2) in it.by_ref() {
                        if c2 == '\n' {
                            line += 1;
                        }
                        if prev == '*' && c2 == '/' {
                            closed = true;
                            break;
                        }
                        prev = c2;
                    }
                    if !closed {
                        return Err(ParseError::new(start_line, "unterminated block comment"));
                    }
                    continue;
                }
                Some('=') => {
                    it.next();
                    TokenKind::Op("/=".to_string())
                }
                _ => TokenKind::Op("/".to_string()),
            },
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            ',' => TokenKind::Comma,
            ':' => TokenKind::Colon,
            ';' => TokenKind::Semi,
            '?' => TokenKind::Question,
            '.' => TokenKind::Dot,
            '"' => {
                let mut closed = false;
                while let Some((_, c2)) = it.next() {
                    match c2 {
                        '\\' => {
                            it.next();
                        }
                        '"' => {
                            closed = true;
                            break;
                        }
                        '\n' => line += 1,
                        _ => {}
                    }
                }
                if !closed {
                    return Err(ParseError::new(start_line, "unterminated string literal"));
                }
                TokenKind::Str
            }
            '&' | '|' | '=' | '!' | '<' | '>' | '+' | '-' | '*' | '%' => {
                let two = match (c, it.peek().map(|&(_, c2)| c2)) {
                    ('&', Some('&')) => Some("&&"),
                    ('|', Some('|')) => Some("||"),
                    ('=', Some('=')) => Some("=="),
                    ('!', Some('=')) => Some("!="),
                    ('<', Some('=')) => Some("<="),
                    ('>', Some('=')) => Some(">="),
                    ('-', Some('>')) => Some("->"),
                    ('-', Some('=')) => Some("-="),
                    ('+', Some('=')) => Some("+="),
                    ('*', Some('=')) => Some("*="),
                    ('%', Some('=')) => Some("%="),
                    _ => None,
                };
                match two {
                    Some("->") => {
                        it.next();
                        TokenKind::Arrow
                    }
                    Some(op) => {
                        it.next();
                        TokenKind::Op(op.to_string())
                    }
                    None => TokenKind::Op(c.to_string()),
                }
            }
            c if c.is_ascii_digit() => {
                while let Some(&(_, c2)) = it.peek() {
                    if c2.is_ascii_digit() || c2 == '_' {
                        it.next();
                    } else if c2 == '.' {
                        // A dot only continues the number when a digit
                        // follows; `1.description` stays a member access.
                        let mut ahead = it.clone();
                        ahead.next();
                        match ahead.peek() {
                            Some(&(_, c3)) if c3.is_ascii_digit() => {
                                it.next();
                                it.next();
                            }
                            _ => break,
                        }
                    } else {
                        break;
                    }
                }
                TokenKind::Number
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut name = String::new();
                name.push(c);
                while let Some(&(_, c2)) = it.peek() {
                    if c2.is_alphanumeric() || c2 == '_' {
                        name.push(c2);
                        it.next();
                    } else {
                        break;
                    }
                }
                TokenKind::Ident(name)
            }
            other => {
                return Err(ParseError::new(start_line, format!("unexpected character {:?}", other)));
            }
        };
        let end = it.peek().map(|&(i, _)| i).unwrap_or(source.len());
        tokens.push(Token { kind, line: start_line, start, end });
    }

    Ok(tokens)
}

/// Parse a whole source file into the flat declaration list.
pub fn parse_source(source: &str) -> Result<SourceFile, ParseError> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { source, tokens, pos: 0 };
    parser.parse_file()
}

const DECL_KEYWORDS: &[&str] = &[
    "func", "init", "class", "struct", "enum", "extension", "protocol", "import", "let", "var",
    "case",
];

const MODIFIER_KEYWORDS: &[&str] = &[
    "public", "private", "internal", "fileprivate", "open", "static", "final", "override",
    "mutating", "required", "convenience",
];

const STMT_KEYWORDS: &[&str] = &["if", "else", "while", "guard", "return", "let", "var"];

struct Parser<'a> {
    source: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.pos).map(|t| &t.kind)
    }

    fn peek_at(&self, offset: usize) -> Option<&TokenKind> {
        self.tokens.get(self.pos + offset).map(|t| &t.kind)
    }

    fn current_line(&self) -> usize {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1)
    }

    fn bump(&mut self) {
        debug_assert!(!self.at_end());
        self.pos += 1;
    }

    fn check(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: &TokenKind, what: &str) -> Result<(), ParseError> {
        if self.eat(kind) {
            Ok(())
        } else {
            Err(ParseError::new(self.current_line(), format!("expected {}", what)))
        }
    }

    fn check_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Ident(name)) if name == keyword)
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if self.check_keyword(keyword) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn expect_ident(&mut self, what: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(TokenKind::Ident(name)) => {
                let name = name.clone();
                self.bump();
                Ok(name)
            }
            _ => Err(ParseError::new(self.current_line(), format!("expected {}", what))),
        }
    }

    fn check_op(&self, op: &str) -> bool {
        matches!(self.peek(), Some(TokenKind::Op(spelling)) if spelling == op)
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if self.check_op(op) {
            self.bump();
            true
        } else {
            false
        }
    }

    fn eat_one_of(&mut self, ops: &[&str]) -> Option<String> {
        if let Some(TokenKind::Op(spelling)) = self.peek() {
            if ops.contains(&spelling.as_str()) {
                let spelling = spelling.clone();
                self.bump();
                return Some(spelling);
            }
        }
        None
    }

    /// Trimmed source text from the first token parsed since `start_tok` up
    /// to the last consumed token.
    fn text_from(&self, start_tok: usize) -> String {
        debug_assert!(start_tok < self.pos);
        let start = self.tokens[start_tok].start;
        let end = self.tokens[self.pos - 1].end;
        self.source[start..end].trim().to_string()
    }
}

// Declarations.
impl<'a> Parser<'a> {
    fn parse_file(&mut self) -> Result<SourceFile, ParseError> {
        let mut functions = Vec::new();
        while !self.at_end() {
            self.parse_item(&mut functions)?;
        }
        Ok(SourceFile { functions })
    }

    fn parse_item(&mut self, out: &mut Vec<Function>) -> Result<(), ParseError> {
        while let Some(TokenKind::Ident(name)) = self.peek() {
            if MODIFIER_KEYWORDS.contains(&name.as_str()) {
                self.bump();
            } else {
                break;
            }
        }

        match self.peek() {
            Some(TokenKind::Ident(name)) => match name.as_str() {
                "import" => {
                    self.bump();
                    self.expect_ident("module name after `import`")?;
                    while self.eat(&TokenKind::Dot) {
                        self.expect_ident("module path segment")?;
                    }
                    Ok(())
                }
                "func" => {
                    let function = self.parse_func()?;
                    out.push(function);
                    Ok(())
                }
                "init" => {
                    let function = self.parse_init()?;
                    out.push(function);
                    Ok(())
                }
                "class" | "struct" | "enum" | "extension" | "protocol" => {
                    self.parse_container(out)
                }
                "let" | "var" => {
                    // Property declaration; a decision in a property
                    // initializer is outside any function and not analyzed.
                    self.bump();
                    self.expect_ident("binding name")?;
                    self.skip_type_annotation();
                    if self.eat_op("=") {
                        self.parse_expr()?;
                    }
                    Ok(())
                }
                "case" => {
                    self.bump();
                    loop {
                        self.expect_ident("case name")?;
                        if self.check(&TokenKind::LParen) {
                            self.skip_balanced_parens()?;
                        }
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                    Ok(())
                }
                other => Err(ParseError::new(
                    self.current_line(),
                    format!("expected a declaration, found `{}`", other),
                )),
            },
            Some(_) => Err(ParseError::new(self.current_line(), "expected a declaration")),
            None => Ok(()),
        }
    }

    fn parse_func(&mut self) -> Result<Function, ParseError> {
        let line = self.current_line();
        self.bump(); // func
        let name = self.expect_ident("function name")?;
        self.skip_generic_params();
        self.expect(&TokenKind::LParen, "`(` after function name")?;
        self.skip_balanced_parens_from_open()?;
        self.skip_signature_tail();

        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            // Protocol requirement: declaration without a body.
            None
        };
        Ok(Function { name, line, body })
    }

    fn parse_init(&mut self) -> Result<Function, ParseError> {
        let line = self.current_line();
        self.bump(); // init
        self.eat(&TokenKind::Question);
        self.expect(&TokenKind::LParen, "`(` after `init`")?;
        self.skip_balanced_parens_from_open()?;
        self.skip_signature_tail();

        let body = if self.check(&TokenKind::LBrace) {
            Some(self.parse_block()?)
        } else {
            None
        };
        Ok(Function { name: "init".to_string(), line, body })
    }

    fn parse_container(&mut self, out: &mut Vec<Function>) -> Result<(), ParseError> {
        self.bump(); // class / struct / enum / extension / protocol
        self.expect_ident("type name")?;
        // Generic parameters and inheritance clause are opaque.
        while !self.at_end() && !self.check(&TokenKind::LBrace) {
            self.bump();
        }
        self.expect(&TokenKind::LBrace, "`{` to open the type body")?;
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(ParseError::new(self.current_line(), "unterminated type body"));
            }
            self.parse_item(out)?;
        }
        self.expect(&TokenKind::RBrace, "`}` to close the type body")?;
        Ok(())
    }

    fn skip_generic_params(&mut self) {
        if !self.check_op("<") {
            return;
        }
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Op(op) if op == "<" => depth += 1,
                TokenKind::Op(op) if op == ">" => {
                    self.bump();
                    depth -= 1;
                    if depth == 0 {
                        return;
                    }
                    continue;
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Consume a balanced `( ... )` group whose opener is the current token.
    fn skip_balanced_parens(&mut self) -> Result<(), ParseError> {
        self.expect(&TokenKind::LParen, "`(`")?;
        self.skip_balanced_parens_from_open()
    }

    /// Consume up to the `)` matching an already-consumed `(`.
    fn skip_balanced_parens_from_open(&mut self) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                Some(TokenKind::LParen) => depth += 1,
                Some(TokenKind::RParen) => depth -= 1,
                Some(_) => {}
                None => {
                    return Err(ParseError::new(self.current_line(), "unbalanced parentheses"));
                }
            }
            self.bump();
        }
        Ok(())
    }

    /// Skip a return type, `throws`, and `where` clause: everything between
    /// the parameter list and the body (or the next declaration).
    fn skip_signature_tail(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::LBrace | TokenKind::RBrace => return,
                TokenKind::Ident(name) if DECL_KEYWORDS.contains(&name.as_str()) => return,
                TokenKind::Ident(name) if MODIFIER_KEYWORDS.contains(&name.as_str()) => return,
                _ => self.bump(),
            }
        }
    }

    /// Skip a `: Type` annotation in a binding, if present.
    fn skip_type_annotation(&mut self) {
        if !self.eat(&TokenKind::Colon) {
            return;
        }
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Op(op) if op == "=" => return,
                TokenKind::LBrace | TokenKind::RBrace => return,
                TokenKind::Ident(name)
                    if DECL_KEYWORDS.contains(&name.as_str())
                        || STMT_KEYWORDS.contains(&name.as_str())
                        || MODIFIER_KEYWORDS.contains(&name.as_str()) =>
                {
                    return;
                }
                TokenKind::LBracket => {
                    // Array/dictionary type: consume the balanced group.
                    let mut depth = 0usize;
                    while let Some(kind) = self.peek() {
                        match kind {
                            TokenKind::LBracket => depth += 1,
                            TokenKind::RBracket => {
                                self.bump();
                                depth -= 1;
                                if depth == 0 {
                                    break;
                                }
                                continue;
                            }
                            _ => {}
                        }
                        self.bump();
                    }
                }
                _ => self.bump(),
            }
        }
    }
}

// Statements.
impl<'a> Parser<'a> {
    fn parse_block(&mut self) -> Result<Block, ParseError> {
        self.expect(&TokenKind::LBrace, "`{`")?;
        let mut stmts = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.at_end() {
                return Err(ParseError::new(self.current_line(), "unterminated block"));
            }
            if self.eat(&TokenKind::Semi) {
                continue;
            }
            stmts.push(self.parse_stmt()?);
        }
        self.expect(&TokenKind::RBrace, "`}`")?;
        Ok(Block { stmts })
    }

    fn parse_stmt(&mut self) -> Result<Stmt, ParseError> {
        if self.check_keyword("if") {
            return self.parse_if();
        }
        if self.eat_keyword("while") {
            let condition = self.parse_expr()?;
            let body = self.parse_block()?;
            return Ok(Stmt::While { condition, body });
        }
        if self.eat_keyword("guard") {
            let condition = self.parse_expr()?;
            if !self.eat_keyword("else") {
                return Err(ParseError::new(self.current_line(), "expected `else` after guard condition"));
            }
            let else_block = self.parse_block()?;
            return Ok(Stmt::Guard { condition, else_block });
        }
        if self.eat_keyword("return") {
            let value = if self.return_has_value() {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(Stmt::Return(value));
        }
        if self.check_keyword("let") || self.check_keyword("var") {
            self.bump();
            let name = self.expect_ident("binding name")?;
            self.skip_type_annotation();
            let value = if self.eat_op("=") {
                Some(self.parse_expr()?)
            } else {
                None
            };
            return Ok(Stmt::Binding { name, value });
        }

        // Expression statement, possibly an assignment.
        let start = self.pos;
        let lhs = self.parse_expr()?;
        if let Some(op) = self.eat_one_of(&["=", "+=", "-=", "*=", "/=", "%="]) {
            let rhs = self.parse_expr()?;
            let text = self.text_from(start);
            return Ok(Stmt::Expr(Expr::new(
                ExprKind::Infix { op, lhs: Box::new(lhs), rhs: Box::new(rhs) },
                text,
            )));
        }
        Ok(Stmt::Expr(lhs))
    }

    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        self.bump(); // if
        let condition = self.parse_expr()?;
        let then_block = self.parse_block()?;
        let else_block = if self.eat_keyword("else") {
            if self.check_keyword("if") {
                let nested = self.parse_if()?;
                Some(Block { stmts: vec![nested] })
            } else {
                Some(self.parse_block()?)
            }
        } else {
            None
        };
        Ok(Stmt::If { condition, then_block, else_block })
    }

    fn return_has_value(&self) -> bool {
        match self.peek() {
            None | Some(TokenKind::RBrace) => false,
            Some(TokenKind::Ident(name)) => !STMT_KEYWORDS.contains(&name.as_str()),
            Some(_) => true,
        }
    }
}

// Expressions, by precedence.
impl<'a> Parser<'a> {
    fn parse_expr(&mut self) -> Result<Expr, ParseError> {
        self.parse_ternary()
    }

    fn parse_ternary(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let condition = self.parse_or()?;
        if !self.eat(&TokenKind::Question) {
            return Ok(condition);
        }
        let then_branch = self.parse_ternary()?;
        self.expect(&TokenKind::Colon, "`:` in ternary expression")?;
        let else_branch = self.parse_ternary()?;
        let text = self.text_from(start);
        Ok(Expr::new(
            ExprKind::Ternary {
                condition: Box::new(condition),
                then_branch: Box::new(then_branch),
                else_branch: Box::new(else_branch),
            },
            text,
        ))
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut lhs = self.parse_and()?;
        while self.eat_op("||") {
            let rhs = self.parse_and()?;
            let text = self.text_from(start);
            lhs = Expr::new(
                ExprKind::Infix { op: "||".to_string(), lhs: Box::new(lhs), rhs: Box::new(rhs) },
                text,
            );
        }
        Ok(lhs)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut lhs = self.parse_comparison()?;
        while self.eat_op("&&") {
            let rhs = self.parse_comparison()?;
            let text = self.text_from(start);
            lhs = Expr::new(
                ExprKind::Infix { op: "&&".to_string(), lhs: Box::new(lhs), rhs: Box::new(rhs) },
                text,
            );
        }
        Ok(lhs)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut lhs = self.parse_additive()?;
        while let Some(op) = self.eat_one_of(&["==", "!=", "<", "<=", ">", ">="]) {
            let rhs = self.parse_additive()?;
            let text = self.text_from(start);
            lhs = Expr::new(ExprKind::Infix { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, text);
        }
        Ok(lhs)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut lhs = self.parse_multiplicative()?;
        while let Some(op) = self.eat_one_of(&["+", "-"]) {
            let rhs = self.parse_multiplicative()?;
            let text = self.text_from(start);
            lhs = Expr::new(ExprKind::Infix { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, text);
        }
        Ok(lhs)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut lhs = self.parse_prefix()?;
        while let Some(op) = self.eat_one_of(&["*", "/", "%"]) {
            let rhs = self.parse_prefix()?;
            let text = self.text_from(start);
            lhs = Expr::new(ExprKind::Infix { op, lhs: Box::new(lhs), rhs: Box::new(rhs) }, text);
        }
        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        if let Some(op) = self.eat_one_of(&["!", "-"]) {
            let operand = self.parse_prefix()?;
            let text = self.text_from(start);
            return Ok(Expr::new(ExprKind::Prefix { op, operand: Box::new(operand) }, text));
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        let mut expr = self.parse_primary()?;
        loop {
            if self.check_op("!") {
                // Force-unwrap. Unambiguous here: no infix `!` exists, so a
                // bang directly after an operand can only be postfix.
                self.bump();
                let text = self.text_from(start);
                expr = Expr::new(
                    ExprKind::Postfix { op: "!".to_string(), operand: Box::new(expr) },
                    text,
                );
            } else if self.check(&TokenKind::Question)
                && self.peek_at(1) == Some(&TokenKind::Dot)
            {
                // Optional chaining `x?.y`; the dot is handled next round.
                self.bump();
            } else if self.eat(&TokenKind::Dot) {
                let name = self.expect_ident("member name after `.`")?;
                let text = self.text_from(start);
                expr = Expr::new(ExprKind::Member { base: Box::new(expr), name }, text);
            } else if self.check(&TokenKind::LParen) {
                self.bump();
                let mut args = Vec::new();
                if !self.check(&TokenKind::RParen) {
                    loop {
                        // A Swift argument label: `ident:` before the value.
                        if let (Some(TokenKind::Ident(_)), Some(TokenKind::Colon)) =
                            (self.peek(), self.peek_at(1))
                        {
                            self.bump();
                            self.bump();
                        }
                        args.push(self.parse_expr()?);
                        if !self.eat(&TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&TokenKind::RParen, "`)` to close the argument list")?;
                let text = self.text_from(start);
                expr = Expr::new(ExprKind::Call { callee: Box::new(expr), args }, text);
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let start = self.pos;
        match self.peek() {
            Some(TokenKind::LParen) => {
                self.bump();
                let inner = self.parse_expr()?;
                self.expect(&TokenKind::RParen, "`)`")?;
                let text = self.text_from(start);
                Ok(Expr::new(ExprKind::Paren(Box::new(inner)), text))
            }
            Some(TokenKind::Ident(_)) | Some(TokenKind::Number) | Some(TokenKind::Str) => {
                self.bump();
                let text = self.text_from(start);
                Ok(Expr::new(ExprKind::Atom(text.clone()), text))
            }
            _ => Err(ParseError::new(self.current_line(), "expected an expression")),
        }
    }
}
