//! A minimal arithmetic-expression evaluator shared by the XASM and Quil
//! front-ends: `+`/`-`/`*`/`/`, unary minus, parentheses, float literals
//! and the `pi` constant. Neither dialect's angle arguments need more
//! than this (`0.125*pi`, `pi/4`, `1.5707963267948966`).

use arvak_ir::ParameterExpression;

use crate::error::{ParseError, ParseResult};

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Num(f64),
    Pi,
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
}

fn tokenize(src: &str) -> ParseResult<Vec<Tok>> {
    let chars: Vec<char> = src.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            c if c.is_whitespace() => i += 1,
            '+' => {
                tokens.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Tok::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Tok::Slash);
                i += 1;
            }
            '(' => {
                tokens.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Tok::RParen);
                i += 1;
            }
            c if c.is_ascii_digit() || c == '.' => {
                let start = i;
                while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let value = text
                    .parse::<f64>()
                    .map_err(|_| ParseError::Generic(format!("invalid numeric literal: {text}")))?;
                tokens.push(Tok::Num(value));
            }
            c if c.is_alphabetic() => {
                let start = i;
                while i < chars.len() && chars[i].is_alphanumeric() {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                if text.eq_ignore_ascii_case("pi") {
                    tokens.push(Tok::Pi);
                } else {
                    return Err(ParseError::Generic(format!(
                        "unknown identifier in expression: {text}"
                    )));
                }
            }
            other => {
                return Err(ParseError::Generic(format!(
                    "unexpected character '{other}' in expression"
                )));
            }
        }
    }
    Ok(tokens)
}

/// Parse a single angle expression (no surrounding commas) into a
/// `ParameterExpression`.
pub(crate) fn parse_expression(src: &str) -> ParseResult<ParameterExpression> {
    let tokens = tokenize(src)?;
    let mut pos = 0;
    let expr = parse_additive(&tokens, &mut pos)?;
    if pos != tokens.len() {
        return Err(ParseError::Generic(format!(
            "trailing input in expression: {src}"
        )));
    }
    Ok(expr)
}

fn parse_additive(tokens: &[Tok], pos: &mut usize) -> ParseResult<ParameterExpression> {
    let mut left = parse_multiplicative(tokens, pos)?;
    loop {
        match tokens.get(*pos) {
            Some(Tok::Plus) => {
                *pos += 1;
                let right = parse_multiplicative(tokens, pos)?;
                left = ParameterExpression::Add(Box::new(left), Box::new(right));
            }
            Some(Tok::Minus) => {
                *pos += 1;
                let right = parse_multiplicative(tokens, pos)?;
                left = ParameterExpression::Sub(Box::new(left), Box::new(right));
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_multiplicative(tokens: &[Tok], pos: &mut usize) -> ParseResult<ParameterExpression> {
    let mut left = parse_unary(tokens, pos)?;
    loop {
        match tokens.get(*pos) {
            Some(Tok::Star) => {
                *pos += 1;
                let right = parse_unary(tokens, pos)?;
                left = ParameterExpression::Mul(Box::new(left), Box::new(right));
            }
            Some(Tok::Slash) => {
                *pos += 1;
                let right = parse_unary(tokens, pos)?;
                left = ParameterExpression::Div(Box::new(left), Box::new(right));
            }
            _ => break,
        }
    }
    Ok(left)
}

fn parse_unary(tokens: &[Tok], pos: &mut usize) -> ParseResult<ParameterExpression> {
    if matches!(tokens.get(*pos), Some(Tok::Minus)) {
        *pos += 1;
        let inner = parse_unary(tokens, pos)?;
        return Ok(-inner);
    }
    if matches!(tokens.get(*pos), Some(Tok::Plus)) {
        *pos += 1;
        return parse_unary(tokens, pos);
    }
    parse_primary(tokens, pos)
}

fn parse_primary(tokens: &[Tok], pos: &mut usize) -> ParseResult<ParameterExpression> {
    match tokens.get(*pos) {
        Some(Tok::Num(v)) => {
            *pos += 1;
            Ok(ParameterExpression::Constant(*v))
        }
        Some(Tok::Pi) => {
            *pos += 1;
            Ok(ParameterExpression::Pi)
        }
        Some(Tok::LParen) => {
            *pos += 1;
            let expr = parse_additive(tokens, pos)?;
            match tokens.get(*pos) {
                Some(Tok::RParen) => {
                    *pos += 1;
                    Ok(expr)
                }
                other => Err(ParseError::Generic(format!("expected ')', found {other:?}"))),
            }
        }
        other => Err(ParseError::Generic(format!(
            "unexpected token in expression: {other:?}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pi_over_four() {
        let expr = parse_expression("pi/4").unwrap();
        assert_eq!(
            expr.as_f64(),
            Some(std::f64::consts::PI / 4.0)
        );
    }

    #[test]
    fn test_parse_negative_constant_times_pi() {
        let expr = parse_expression("-0.125*pi").unwrap();
        assert!((expr.as_f64().unwrap() - (-0.125 * std::f64::consts::PI)).abs() < 1e-12);
    }

    #[test]
    fn test_parse_plain_float() {
        let expr = parse_expression("1.5707963267948966").unwrap();
        assert!((expr.as_f64().unwrap() - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
