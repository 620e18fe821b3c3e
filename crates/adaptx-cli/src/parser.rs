//! # Restricted SQL Parser
//!
//! Maps the supported query dialect onto a logical plan tree:
//!
//! ```text
//! SELECT * FROM t1 [, t2] [WHERE <condition> [AND <condition>]...]
//! ```
//!
//! A condition is either an equi-join between two column references
//! (`r.x = s.y`, requires two tables) or a single-column filter against a
//! numeric literal (`col < 5`). At most one of each is accepted; a conjunct
//! that would otherwise be dropped is rejected with an error. Matching is
//! case-insensitive; table qualifiers on columns are stripped and names are
//! stored lowercase.
//!
//! The parser is a hand-rolled token scanner producing structured
//! [`Predicate`] and [`JoinCondition`] values up front, so the optimizer core
//! never re-parses strings: malformed input is caught here, once, as a typed
//! [`ParseError`].

use adaptx_core::plan::{CompareOp, JoinCondition, PlanNode, Predicate};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unexpected character '{0}' in query")]
    UnexpectedChar(char),
    #[error("query has no FROM clause")]
    MissingFrom,
    #[error("expected a table name after {0}")]
    MissingTable(&'static str),
    #[error("malformed condition: expected `column <op> value`")]
    MalformedCondition,
    #[error("join conditions must use '=' between two columns")]
    NonEquiJoin,
    #[error("at most one join condition and one filter are supported")]
    TooManyConditions,
    #[error("a join condition requires two tables in FROM")]
    JoinConditionWithoutJoin,
    #[error("unexpected trailing input after query")]
    TrailingInput,
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Ident(String),
    Number(f64),
    Comma,
    Star,
    Lt,
    Gt,
    Eq,
}

fn tokenize(input: &str) -> Result<Vec<Token>, ParseError> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '*' => {
                chars.next();
                tokens.push(Token::Star);
            }
            '<' => {
                chars.next();
                tokens.push(Token::Lt);
            }
            '>' => {
                chars.next();
                tokens.push(Token::Gt);
            }
            '=' => {
                chars.next();
                tokens.push(Token::Eq);
            }
            c if c.is_ascii_digit() => {
                let mut literal = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_ascii_digit() || d == '.' {
                        literal.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                let value = literal
                    .parse::<f64>()
                    .map_err(|_| ParseError::MalformedCondition)?;
                tokens.push(Token::Number(value));
            }
            c if c.is_alphanumeric() || c == '_' => {
                let mut ident = String::new();
                while let Some(&d) = chars.peek() {
                    if d.is_alphanumeric() || d == '_' || d == '.' {
                        ident.push(d);
                        chars.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token::Ident(ident.to_lowercase()));
            }
            other => return Err(ParseError::UnexpectedChar(other)),
        }
    }

    Ok(tokens)
}

/// Strip an optional `table.` qualifier from a column reference.
fn unqualified(column: &str) -> String {
    match column.rsplit_once('.') {
        Some((_, col)) => col.to_string(),
        None => column.to_string(),
    }
}

/// One WHERE-clause conjunct in structured form.
enum Condition {
    Filter(Predicate),
    Join(JoinCondition),
}

/// Parse one query string into a logical plan.
pub fn parse_query(sql: &str) -> Result<PlanNode, ParseError> {
    let tokens = tokenize(sql)?;
    let mut pos = tokens
        .iter()
        .position(|t| matches!(t, Token::Ident(k) if k == "from"))
        .ok_or(ParseError::MissingFrom)?
        + 1;

    let first_table = match tokens.get(pos) {
        Some(Token::Ident(name)) => name.clone(),
        _ => return Err(ParseError::MissingTable("FROM")),
    };
    pos += 1;

    let second_table = if matches!(tokens.get(pos), Some(Token::Comma)) {
        pos += 1;
        match tokens.get(pos) {
            Some(Token::Ident(name)) => {
                pos += 1;
                Some(name.clone())
            }
            _ => return Err(ParseError::MissingTable("','")),
        }
    } else {
        None
    };

    let mut conditions = Vec::new();
    match tokens.get(pos) {
        None => {}
        Some(Token::Ident(k)) if k == "where" => {
            pos += 1;
            loop {
                let (condition, next) = parse_condition(&tokens, pos)?;
                conditions.push(condition);
                pos = next;
                match tokens.get(pos) {
                    None => break,
                    Some(Token::Ident(k)) if k == "and" => pos += 1,
                    Some(_) => return Err(ParseError::TrailingInput),
                }
            }
        }
        Some(_) => return Err(ParseError::TrailingInput),
    }

    // The dialect allows at most one join condition and one filter; a
    // conjunct that would be dropped is an error, not a silent no-op.
    let mut join_condition = None;
    let mut filter = None;
    for condition in conditions {
        match condition {
            Condition::Join(j) => {
                if join_condition.replace(j).is_some() {
                    return Err(ParseError::TooManyConditions);
                }
            }
            Condition::Filter(p) => {
                if filter.replace(p).is_some() {
                    return Err(ParseError::TooManyConditions);
                }
            }
        }
    }
    if second_table.is_none() && join_condition.is_some() {
        return Err(ParseError::JoinConditionWithoutJoin);
    }

    let base = match second_table {
        None => PlanNode::scan(first_table),
        Some(second) => PlanNode::join(
            PlanNode::scan(first_table),
            PlanNode::scan(second),
            join_condition,
        ),
    };

    Ok(match filter {
        Some(predicate) => PlanNode::select(base, predicate),
        None => base,
    })
}

fn parse_condition(tokens: &[Token], pos: usize) -> Result<(Condition, usize), ParseError> {
    let Some(Token::Ident(lhs)) = tokens.get(pos) else {
        return Err(ParseError::MalformedCondition);
    };
    let op = match tokens.get(pos + 1) {
        Some(Token::Lt) => CompareOp::Lt,
        Some(Token::Gt) => CompareOp::Gt,
        Some(Token::Eq) => CompareOp::Eq,
        _ => return Err(ParseError::MalformedCondition),
    };

    match tokens.get(pos + 2) {
        Some(Token::Number(value)) => Ok((
            Condition::Filter(Predicate::new(unqualified(lhs), op, *value)),
            pos + 3,
        )),
        Some(Token::Ident(rhs)) => {
            if op != CompareOp::Eq {
                return Err(ParseError::NonEquiJoin);
            }
            Ok((
                Condition::Join(JoinCondition::new(unqualified(lhs), unqualified(rhs))),
                pos + 3,
            ))
        }
        _ => Err(ParseError::MalformedCondition),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_table_scan() {
        let plan = parse_query("SELECT * FROM R").unwrap();
        assert_eq!(plan, PlanNode::scan("r"));
    }

    #[test]
    fn single_table_filter() {
        let plan = parse_query("SELECT * FROM R WHERE col1 < 50").unwrap();
        assert_eq!(
            plan,
            PlanNode::select(
                PlanNode::scan("r"),
                Predicate::new("col1", CompareOp::Lt, 50.0)
            )
        );
    }

    #[test]
    fn two_table_join_with_filter() {
        let plan = parse_query("SELECT * FROM R, S WHERE R.col1 = S.colA AND R.col2 > 7").unwrap();
        assert_eq!(
            plan,
            PlanNode::select(
                PlanNode::join(
                    PlanNode::scan("r"),
                    PlanNode::scan("s"),
                    Some(JoinCondition::new("col1", "cola")),
                ),
                Predicate::new("col2", CompareOp::Gt, 7.0)
            )
        );
    }

    #[test]
    fn cross_join_without_condition() {
        let plan = parse_query("SELECT * FROM R, S").unwrap();
        assert_eq!(
            plan,
            PlanNode::join(PlanNode::scan("r"), PlanNode::scan("s"), None)
        );
    }

    #[test]
    fn rejects_malformed_queries() {
        assert_eq!(parse_query("SELECT *").unwrap_err(), ParseError::MissingFrom);
        assert_eq!(
            parse_query("SELECT * FROM R,").unwrap_err(),
            ParseError::MissingTable("','")
        );
        assert_eq!(
            parse_query("SELECT * FROM R WHERE a <").unwrap_err(),
            ParseError::MalformedCondition
        );
        assert_eq!(
            parse_query("SELECT * FROM R, S WHERE a < b").unwrap_err(),
            ParseError::NonEquiJoin
        );
        assert_eq!(
            parse_query("SELECT * FROM R WHERE a = 1 ;").unwrap_err(),
            ParseError::UnexpectedChar(';')
        );
    }

    #[test]
    fn rejects_conjuncts_that_would_be_dropped() {
        assert_eq!(
            parse_query("SELECT * FROM R, S WHERE R.a = S.b AND R.c = S.d").unwrap_err(),
            ParseError::TooManyConditions
        );
        assert_eq!(
            parse_query("SELECT * FROM R WHERE a < 5 AND b > 2").unwrap_err(),
            ParseError::TooManyConditions
        );
        assert_eq!(
            parse_query("SELECT * FROM R WHERE a = b").unwrap_err(),
            ParseError::JoinConditionWithoutJoin
        );
    }
}
