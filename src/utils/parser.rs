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

// parser.rs
//
// This file contains the line-based machine description parser. It turns
// the text form into declaration records; all semantic validation happens
// in the checker. Reservation expression strings are carried through
// verbatim.

use crate::description::decls::Decl;
use crate::errors::GeneratorError;

/// Parse a whole machine description file. One declaration per line;
/// `#` and `;` start comments.
pub fn parse_description(text: &str) -> Result<Vec<Decl>, GeneratorError> {
    let mut decls = Vec::new();
    for (index, raw_line) in text.lines().enumerate() {
        let line_num = index + 1;
        let line = strip_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        decls.push(parse_line(line, line_num)?);
    }
    Ok(decls)
}

fn strip_comment(line: &str) -> &str {
    let end = line
        .find(|c| c == '#' || c == ';')
        .unwrap_or(line.len());
    &line[..end]
}

fn error(line: usize, message: impl Into<String>) -> GeneratorError {
    GeneratorError::ParseError {
        line,
        message: message.into(),
    }
}

fn name_list(text: &str) -> Vec<String> {
    text.split(',')
        .flat_map(str::split_whitespace)
        .map(str::to_string)
        .collect()
}

fn parse_line(line: &str, line_num: usize) -> Result<Decl, GeneratorError> {
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };
    match keyword {
        "automaton" => {
            let names = name_list(rest);
            if names.is_empty() {
                return Err(error(line_num, "expected automaton names"));
            }
            Ok(Decl::Automaton { names })
        },
        "unit" | "query_unit" => parse_unit(rest, keyword == "query_unit", line_num),
        "exclusion" => {
            let (first, second) = split_colon(rest, line_num)?;
            Ok(Decl::Exclusion {
                first: name_list(first),
                second: name_list(second),
            })
        },
        "presence" | "final_presence" => {
            let (targets, patterns) = parse_patterns(rest, line_num)?;
            Ok(Decl::Presence {
                targets,
                patterns,
                final_p: keyword == "final_presence",
            })
        },
        "absence" | "final_absence" => {
            let (targets, patterns) = parse_patterns(rest, line_num)?;
            Ok(Decl::Absence {
                targets,
                patterns,
                final_p: keyword == "final_absence",
            })
        },
        "reservation" => {
            let (name, expr) = split_equals(rest, line_num)?;
            Ok(Decl::Reservation {
                name: single_name(name, line_num)?,
                expr: expr.to_string(),
            })
        },
        "insn" => parse_insn(rest, line_num),
        "bypass" => parse_bypass(rest, line_num),
        _ => Err(error(line_num, format!("unknown declaration `{}`", keyword))),
    }
}

fn split_colon(text: &str, line_num: usize) -> Result<(&str, &str), GeneratorError> {
    match text.split_once(':') {
        Some((left, right)) if !left.trim().is_empty() && !right.trim().is_empty() => {
            Ok((left.trim(), right.trim()))
        },
        _ => Err(error(line_num, "expected `<names> : <names>`")),
    }
}

fn split_equals(text: &str, line_num: usize) -> Result<(&str, &str), GeneratorError> {
    match text.split_once('=') {
        Some((left, right)) if !right.trim().is_empty() => Ok((left.trim(), right.trim())),
        _ => Err(error(line_num, "expected `= <reservation expression>`")),
    }
}

fn single_name(text: &str, line_num: usize) -> Result<String, GeneratorError> {
    let mut names = name_list(text);
    if names.len() != 1 {
        return Err(error(line_num, format!("expected one name, got `{}`", text)));
    }
    Ok(names.pop().unwrap())
}

fn parse_unit(rest: &str, query: bool, line_num: usize) -> Result<Decl, GeneratorError> {
    let (names_text, automaton) = match rest.split_once(':') {
        Some((left, right)) => (left, Some(single_name(right, line_num)?)),
        None => (rest, None),
    };
    let names = name_list(names_text);
    if names.is_empty() {
        return Err(error(line_num, "expected unit names"));
    }
    Ok(Decl::Unit {
        names,
        automaton,
        query,
    })
}

fn parse_patterns(
    rest: &str,
    line_num: usize,
) -> Result<(Vec<String>, Vec<Vec<String>>), GeneratorError> {
    let (targets_text, patterns_text) = split_colon(rest, line_num)?;
    let targets = name_list(targets_text);
    let patterns: Vec<Vec<String>> = patterns_text
        .split(',')
        .map(|pattern| {
            pattern
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|pattern: &Vec<String>| !pattern.is_empty())
        .collect();
    if targets.is_empty() || patterns.is_empty() {
        return Err(error(line_num, "expected `<targets> : <patterns>`"));
    }
    Ok((targets, patterns))
}

// insn <name> <latency> [if <condition>] = <expr>
fn parse_insn(rest: &str, line_num: usize) -> Result<Decl, GeneratorError> {
    let (head, expr) = split_equals(rest, line_num)?;
    let tokens: Vec<&str> = head.split_whitespace().collect();
    if tokens.len() < 2 {
        return Err(error(line_num, "expected `insn <name> <latency> = <expr>`"));
    }
    let name = tokens[0].to_string();
    let latency: i64 = tokens[1]
        .parse()
        .map_err(|_| error(line_num, format!("invalid latency `{}`", tokens[1])))?;
    let condition = match tokens.get(2) {
        None => None,
        Some(&"if") if tokens.len() == 4 => Some(tokens[3].to_string()),
        Some(_) => {
            return Err(error(
                line_num,
                "expected `if <condition>` after the latency",
            ));
        },
    };
    Ok(Decl::InsnReservation {
        name,
        latency,
        condition,
        expr: expr.to_string(),
    })
}

// bypass <latency> <out-insn> <in-insn> [<guard>]
fn parse_bypass(rest: &str, line_num: usize) -> Result<Decl, GeneratorError> {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() < 3 || tokens.len() > 4 {
        return Err(error(
            line_num,
            "expected `bypass <latency> <out-insn> <in-insn> [<guard>]`",
        ));
    }
    let latency: i64 = tokens[0]
        .parse()
        .map_err(|_| error(line_num, format!("invalid latency `{}`", tokens[0])))?;
    Ok(Decl::Bypass {
        latency,
        out_insn: tokens[1].to_string(),
        in_insn: tokens[2].to_string(),
        guard: tokens.get(3).map(|s| s.to_string()),
    })
}
