// Copyright (c) 2024 Mudit Bhargava
//
// Permission is hereby granted, free of charge, to any person obtaining a copy
// of this software and associated documentation files (the "Software"), to deal
// in the Software without restriction, including without limitation the rights
// to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
// copies of the Software, and to permit persons to whom the Software is
// furnished to do so, subject to the following conditions:
//
// The above copyright notice and this permission notice shall be included in all
// copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
// IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
// FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
// AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
// LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
// OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
// SOFTWARE.
//

// regexp.rs
//
// This file contains the reservation expression tree and its parser.
// Expressions use the grammar `E ::= '(' E ')' | name | name '*' N
// | E ',' E | E '+' E | E '|' E | 'nothing'` with binding precedence
// `| < , < + < *`.

use std::fmt;

/// One reservation expression node. `Unit` and `Reserv` carry the resolved
/// declaration index once the checker has linked names; a fresh parse leaves
/// every reference as a `Unit` with `decl` unset, and the checker rewrites
/// references to named reservations into `Reserv` nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regexp {
    Unit { name: String, decl: Option<usize> },
    Reserv { name: String, decl: Option<usize> },
    Nothing,
    Sequence(Vec<Regexp>),
    Repeat(Box<Regexp>, usize),
    Allof(Vec<Regexp>),
    Oneof(Vec<Regexp>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexpParseError {
    pub position: usize,
    pub message: String,
}

impl fmt::Display for RegexpParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at position {}: {}", self.position, self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    LParen,
    RParen,
    Comma,
    Plus,
    Bar,
    Star,
    Number(usize),
    Name(String),
}

fn tokenize(input: &str) -> Result<Vec<(usize, Token)>, RegexpParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();
    while let Some(&(pos, ch)) = chars.peek() {
        match ch {
            c if c.is_whitespace() => {
                chars.next();
            },
            '(' => {
                chars.next();
                tokens.push((pos, Token::LParen));
            },
            ')' => {
                chars.next();
                tokens.push((pos, Token::RParen));
            },
            ',' => {
                chars.next();
                tokens.push((pos, Token::Comma));
            },
            '+' => {
                chars.next();
                tokens.push((pos, Token::Plus));
            },
            '|' => {
                chars.next();
                tokens.push((pos, Token::Bar));
            },
            '*' => {
                chars.next();
                tokens.push((pos, Token::Star));
            },
            c if c.is_ascii_digit() => {
                let mut value = 0usize;
                while let Some(&(_, d)) = chars.peek() {
                    if let Some(digit) = d.to_digit(10) {
                        value = value * 10 + digit as usize;
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push((pos, Token::Number(value)));
            },
            _ => {
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || "(),+|*".contains(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                tokens.push((pos, Token::Name(name)));
            },
        }
    }
    Ok(tokens)
}

struct Parser {
    tokens: Vec<(usize, Token)>,
    index: usize,
    len: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.index).map(|(_, t)| t)
    }

    fn position(&self) -> usize {
        self.tokens
            .get(self.index)
            .map(|(p, _)| *p)
            .unwrap_or(self.len)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.index).map(|(_, t)| t.clone());
        if token.is_some() {
            self.index += 1;
        }
        token
    }

    fn error(&self, message: impl Into<String>) -> RegexpParseError {
        RegexpParseError {
            position: self.position(),
            message: message.into(),
        }
    }

    // oneof := sequence ('|' sequence)*
    fn parse_oneof(&mut self) -> Result<Regexp, RegexpParseError> {
        let first = self.parse_sequence()?;
        let mut operands = vec![first];
        while self.peek() == Some(&Token::Bar) {
            self.advance();
            operands.push(self.parse_sequence()?);
        }
        if operands.len() == 1 {
            Ok(operands.pop().unwrap())
        } else {
            Ok(Regexp::Oneof(operands))
        }
    }

    // sequence := allof (',' allof)*
    fn parse_sequence(&mut self) -> Result<Regexp, RegexpParseError> {
        let first = self.parse_allof()?;
        let mut operands = vec![first];
        while self.peek() == Some(&Token::Comma) {
            self.advance();
            operands.push(self.parse_allof()?);
        }
        if operands.len() == 1 {
            Ok(operands.pop().unwrap())
        } else {
            Ok(Regexp::Sequence(operands))
        }
    }

    // allof := repeat ('+' repeat)*
    fn parse_allof(&mut self) -> Result<Regexp, RegexpParseError> {
        let first = self.parse_repeat()?;
        let mut operands = vec![first];
        while self.peek() == Some(&Token::Plus) {
            self.advance();
            operands.push(self.parse_repeat()?);
        }
        if operands.len() == 1 {
            Ok(operands.pop().unwrap())
        } else {
            Ok(Regexp::Allof(operands))
        }
    }

    // repeat := atom ('*' number)?
    fn parse_repeat(&mut self) -> Result<Regexp, RegexpParseError> {
        let atom = self.parse_atom()?;
        if self.peek() == Some(&Token::Star) {
            self.advance();
            match self.advance() {
                Some(Token::Number(n)) => {
                    if n < 2 {
                        return Err(self.error("repetition count must be at least 2"));
                    }
                    Ok(Regexp::Repeat(Box::new(atom), n))
                },
                _ => Err(self.error("expected repetition count after `*`")),
            }
        } else {
            Ok(atom)
        }
    }

    // atom := '(' oneof ')' | 'nothing' | name
    fn parse_atom(&mut self) -> Result<Regexp, RegexpParseError> {
        match self.advance() {
            Some(Token::LParen) => {
                let inner = self.parse_oneof()?;
                match self.advance() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(self.error("expected `)`")),
                }
            },
            Some(Token::Name(name)) => {
                if name == "nothing" {
                    Ok(Regexp::Nothing)
                } else {
                    Ok(Regexp::Unit { name, decl: None })
                }
            },
            Some(token) => Err(self.error(format!("unexpected token {:?}", token))),
            None => Err(self.error("unexpected end of reservation expression")),
        }
    }
}

impl Regexp {
    /// Parse a reservation expression string. An empty or blank string is an
    /// error, as is any trailing garbage after a complete expression.
    pub fn parse(input: &str) -> Result<Regexp, RegexpParseError> {
        if input.trim().is_empty() {
            return Err(RegexpParseError {
                position: 0,
                message: "empty reservation expression".to_string(),
            });
        }
        let tokens = tokenize(input)?;
        let mut parser = Parser {
            tokens,
            index: 0,
            len: input.len(),
        };
        let regexp = parser.parse_oneof()?;
        if parser.peek().is_some() {
            return Err(parser.error("trailing input after reservation expression"));
        }
        Ok(regexp)
    }

    fn precedence(&self) -> u8 {
        match self {
            Regexp::Oneof(_) => 0,
            Regexp::Sequence(_) => 1,
            Regexp::Allof(_) => 2,
            Regexp::Repeat(..) => 3,
            Regexp::Unit { .. } | Regexp::Reserv { .. } | Regexp::Nothing => 4,
        }
    }

    fn fmt_child(child: &Regexp, parent_prec: u8, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if child.precedence() <= parent_prec {
            write!(f, "(")?;
            fmt::Display::fmt(child, f)?;
            write!(f, ")")
        } else {
            fmt::Display::fmt(child, f)
        }
    }

    fn fmt_list(
        operands: &[Regexp],
        separator: &str,
        prec: u8,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (i, operand) in operands.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", separator)?;
            }
            Regexp::fmt_child(operand, prec, f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Regexp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Regexp::Unit { name, .. } | Regexp::Reserv { name, .. } => write!(f, "{}", name),
            Regexp::Nothing => write!(f, "nothing"),
            Regexp::Sequence(operands) => Regexp::fmt_list(operands, ", ", 1, f),
            Regexp::Allof(operands) => Regexp::fmt_list(operands, "+", 2, f),
            Regexp::Oneof(operands) => Regexp::fmt_list(operands, " | ", 0, f),
            Regexp::Repeat(operand, count) => {
                Regexp::fmt_child(operand, 3, f)?;
                write!(f, "*{}", count)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_precedence() {
        let regexp = Regexp::parse("a, b+c | d").unwrap();
        match regexp {
            Regexp::Oneof(alts) => {
                assert_eq!(alts.len(), 2);
                assert!(matches!(alts[0], Regexp::Sequence(_)));
            },
            other => panic!("expected oneof, got {:?}", other),
        }
    }

    #[test]
    fn parses_repeat_and_parens() {
        let regexp = Regexp::parse("(a, b)*3").unwrap();
        assert!(matches!(regexp, Regexp::Repeat(_, 3)));
        assert!(Regexp::parse("a*1").is_err());
        assert!(Regexp::parse("").is_err());
        assert!(Regexp::parse("a,").is_err());
    }

    #[test]
    fn display_round_trips() {
        for text in ["alu", "a, b", "a+b | c", "nothing, (a | b)+c"] {
            let parsed = Regexp::parse(text).unwrap();
            let reparsed = Regexp::parse(&parsed.to_string()).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }
}
