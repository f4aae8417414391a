//! Safe filter predicate grammar.
//!
//! A predicate is a boolean expression over the single variable `x`, which is
//! bound to the value of the filtered column: comparisons, arithmetic,
//! membership (`x in (...)`), `&`/`|` conjunction, and parentheses. The input
//! is parsed into a polars [`Expr`]; anything outside the grammar is rejected,
//! so there is no way to evaluate arbitrary code through the filter box.

use polars::prelude::*;
use std::ops::{Add, Div, Mul, Sub};

use crate::error::DataError;

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Var,
    Number(f64),
    String(String),
    Op(String),
    In,
    LParen,
    RParen,
    Comma,
    Amp,
    Pipe,
}

fn tokenize(input: &str) -> Result<Vec<Token>, String> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            ' ' | '\t' | '\n' | '\r' => {
                chars.next();
            }
            ',' => {
                tokens.push(Token::Comma);
                chars.next();
            }
            '&' => {
                tokens.push(Token::Amp);
                chars.next();
            }
            '|' => {
                tokens.push(Token::Pipe);
                chars.next();
            }
            '(' => {
                tokens.push(Token::LParen);
                chars.next();
            }
            ')' => {
                tokens.push(Token::RParen);
                chars.next();
            }
            '"' => {
                chars.next(); // consume opening quote
                let mut string_val = String::new();
                let mut found_closing_quote = false;
                while let Some(&c) = chars.peek() {
                    if c == '\\' {
                        chars.next(); // consume backslash
                        match chars.peek() {
                            Some(&'n') => {
                                string_val.push('\n');
                                chars.next();
                            }
                            Some(&'t') => {
                                string_val.push('\t');
                                chars.next();
                            }
                            Some(&'\\') => {
                                string_val.push('\\');
                                chars.next();
                            }
                            Some(&'"') => {
                                string_val.push('"');
                                chars.next();
                            }
                            Some(&other) => {
                                string_val.push('\\');
                                string_val.push(other);
                                chars.next();
                            }
                            None => {
                                return Err("Unterminated escape sequence in string".to_string())
                            }
                        }
                    } else if c == '"' {
                        chars.next(); // consume closing quote
                        found_closing_quote = true;
                        break;
                    } else {
                        string_val.push(c);
                        chars.next();
                    }
                }
                if !found_closing_quote {
                    return Err("Unterminated string literal".to_string());
                }
                tokens.push(Token::String(string_val));
            }
            '+' | '-' | '*' | '/' | '=' | '<' | '>' | '!' => {
                let mut op = c.to_string();
                chars.next();
                if let Some(&next_c) = chars.peek() {
                    if (c == '<' && (next_c == '=' || next_c == '>'))
                        || (c == '>' && next_c == '=')
                        || (c == '!' && next_c == '=')
                        || (c == '=' && next_c == '=')
                    {
                        op.push(next_c);
                        chars.next();
                    }
                }
                if op == "!" {
                    return Err("Unexpected character: !".to_string());
                }
                tokens.push(Token::Op(op));
            }
            '0'..='9' | '.' => {
                let mut num_str = String::new();
                while let Some(&nc) = chars.peek() {
                    if nc.is_ascii_digit() || nc == '.' {
                        num_str.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match num_str.parse::<f64>() {
                    Ok(n) => tokens.push(Token::Number(n)),
                    Err(_) => return Err(format!("Invalid number: {}", num_str)),
                }
            }
            _ if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(&nc) = chars.peek() {
                    if nc.is_alphanumeric() || nc == '_' {
                        ident.push(nc);
                        chars.next();
                    } else {
                        break;
                    }
                }
                match ident.as_str() {
                    "x" => tokens.push(Token::Var),
                    "in" => tokens.push(Token::In),
                    _ => {
                        return Err(format!(
                            "Unknown identifier '{}' (the cell value is named x)",
                            ident
                        ))
                    }
                }
            }
            _ => return Err(format!("Unexpected character: {}", c)),
        }
    }
    Ok(tokens)
}

fn apply_cmp(left: Expr, op: &str, right: Expr) -> Result<Expr, String> {
    match op {
        "=" | "==" => Ok(left.eq(right)),
        "<" => Ok(left.lt(right)),
        ">" => Ok(left.gt(right)),
        "<=" => Ok(left.lt_eq(right)),
        ">=" => Ok(left.gt_eq(right)),
        "<>" | "!=" => Ok(left.neq(right)),
        _ => Err(format!("Unknown comparison operator: {}", op)),
    }
}

/// Slice-cursor parser; each level returns the expression and whether it is
/// boolean-valued. The top level must be boolean or the predicate is rejected.
struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    column: &'a str,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn bump(&mut self) -> Option<&Token> {
        let tok = self.tokens.get(self.pos);
        if tok.is_some() {
            self.pos += 1;
        }
        tok
    }

    fn parse_or(&mut self) -> Result<(Expr, bool), String> {
        let (mut expr, mut boolean) = self.parse_and()?;
        while matches!(self.peek(), Some(Token::Pipe)) {
            self.bump();
            let (rhs, rhs_boolean) = self.parse_and()?;
            if !boolean || !rhs_boolean {
                return Err("Both sides of | must be comparisons".to_string());
            }
            expr = expr.or(rhs);
            boolean = true;
        }
        Ok((expr, boolean))
    }

    fn parse_and(&mut self) -> Result<(Expr, bool), String> {
        let (mut expr, mut boolean) = self.parse_cmp()?;
        while matches!(self.peek(), Some(Token::Amp)) {
            self.bump();
            let (rhs, rhs_boolean) = self.parse_cmp()?;
            if !boolean || !rhs_boolean {
                return Err("Both sides of & must be comparisons".to_string());
            }
            expr = expr.and(rhs);
            boolean = true;
        }
        Ok((expr, boolean))
    }

    fn parse_cmp(&mut self) -> Result<(Expr, bool), String> {
        let (left, left_boolean) = self.parse_sum()?;
        match self.peek() {
            Some(Token::Op(op)) if !matches!(op.as_str(), "+" | "-" | "*" | "/") => {
                let op = op.clone();
                self.bump();
                let (right, _) = self.parse_sum()?;
                Ok((apply_cmp(left, &op, right)?, true))
            }
            Some(Token::In) => {
                self.bump();
                let expr = self.parse_membership(left)?;
                Ok((expr, true))
            }
            _ => Ok((left, left_boolean)),
        }
    }

    /// `in (lit, lit, ...)` expands to chained equality ORs.
    fn parse_membership(&mut self, left: Expr) -> Result<Expr, String> {
        if !matches!(self.bump(), Some(Token::LParen)) {
            return Err("Expected ( after in".to_string());
        }
        let mut expr: Option<Expr> = None;
        loop {
            let member = match self.bump() {
                Some(Token::Number(n)) => lit(*n),
                Some(Token::String(s)) => lit(s.as_str()),
                other => {
                    return Err(format!(
                        "Membership list may contain only numbers and strings, got {:?}",
                        other
                    ))
                }
            };
            let eq = left.clone().eq(member);
            expr = Some(match expr {
                Some(curr) => curr.or(eq),
                None => eq,
            });
            match self.bump() {
                Some(Token::Comma) => continue,
                Some(Token::RParen) => break,
                other => return Err(format!("Expected , or ) in membership list, got {:?}", other)),
            }
        }
        expr.ok_or_else(|| "Empty membership list".to_string())
    }

    fn parse_sum(&mut self) -> Result<(Expr, bool), String> {
        let (mut expr, mut boolean) = self.parse_term()?;
        loop {
            match self.peek() {
                Some(Token::Op(op)) if op == "+" => {
                    self.bump();
                    let (rhs, _) = self.parse_term()?;
                    expr = expr.add(rhs);
                    boolean = false;
                }
                Some(Token::Op(op)) if op == "-" => {
                    self.bump();
                    let (rhs, _) = self.parse_term()?;
                    expr = expr.sub(rhs);
                    boolean = false;
                }
                _ => return Ok((expr, boolean)),
            }
        }
    }

    fn parse_term(&mut self) -> Result<(Expr, bool), String> {
        let (mut expr, mut boolean) = self.parse_factor()?;
        loop {
            match self.peek() {
                Some(Token::Op(op)) if op == "*" => {
                    self.bump();
                    let (rhs, _) = self.parse_factor()?;
                    expr = expr.mul(rhs);
                    boolean = false;
                }
                Some(Token::Op(op)) if op == "/" => {
                    self.bump();
                    let (rhs, _) = self.parse_factor()?;
                    expr = expr.div(rhs);
                    boolean = false;
                }
                _ => return Ok((expr, boolean)),
            }
        }
    }

    fn parse_factor(&mut self) -> Result<(Expr, bool), String> {
        match self.bump() {
            Some(Token::Var) => Ok((col(self.column), false)),
            Some(Token::Number(n)) => Ok((lit(*n), false)),
            Some(Token::String(s)) => Ok((lit(s.as_str()), false)),
            Some(Token::Op(op)) if op == "-" => {
                let (inner, _) = self.parse_factor()?;
                Ok((lit(0.0).sub(inner), false))
            }
            Some(Token::LParen) => {
                let (inner, boolean) = self.parse_or()?;
                match self.bump() {
                    Some(Token::RParen) => Ok((inner, boolean)),
                    _ => Err("Unmatched parenthesis".to_string()),
                }
            }
            other => Err(format!("Unexpected token: {:?}", other)),
        }
    }
}

/// Parses a predicate string into a polars filter expression over `column`.
/// Fails closed: anything the grammar does not cover is an error, as is a
/// predicate that never compares (e.g. `x + 1`).
pub fn parse_predicate(input: &str, column: &str) -> Result<Expr, DataError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(DataError::InvalidPredicate("empty predicate".to_string()));
    }
    let tokens = tokenize(trimmed).map_err(DataError::InvalidPredicate)?;
    let mut parser = Parser {
        tokens: &tokens,
        pos: 0,
        column,
    };
    let (expr, boolean) = parser.parse_or().map_err(DataError::InvalidPredicate)?;
    if parser.pos != tokens.len() {
        return Err(DataError::InvalidPredicate(format!(
            "Trailing input after position {}",
            parser.pos
        )));
    }
    if !boolean {
        return Err(DataError::InvalidPredicate(
            "Predicate must be a comparison (e.g. x > 10)".to_string(),
        ));
    }
    Ok(expr)
}
