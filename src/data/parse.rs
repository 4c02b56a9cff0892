//! Parsing of pasted Ct text into numeric series
//!
//! Values arrive as free text copied from instrument exports or
//! spreadsheets: one value per line, space separated, `;` separated, or
//! comma separated. Comma is also the decimal mark in many locales, so a
//! token such as `22,5` is read as 22.5 while `22.5,23.1` is two values.

use crate::error::{DdctError, Result};

/// Handling of tokens that are not finite numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ParsePolicy {
    /// Fail the whole series on the first invalid token
    Strict,
    /// Drop invalid tokens and keep the rest
    #[default]
    Lenient,
}

/// Result of a lenient parse
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedSeries {
    pub values: Vec<f64>,
    /// Tokens that could not be read as a finite number
    pub rejected: Vec<String>,
}

/// Split raw text into candidate numeric tokens with decimal commas normalised.
fn tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| c.is_whitespace() || c == ';')
        .filter(|chunk| !chunk.is_empty())
        .flat_map(|chunk| {
            let commas = chunk.matches(',').count();
            if commas == 1 && !chunk.contains('.') {
                vec![chunk.replace(',', ".")]
            } else {
                chunk.split(',').map(str::to_string).collect()
            }
        })
        .filter(|token| !token.is_empty())
}

fn parse_token(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a block of Ct values, failing on the first invalid token.
///
/// Empty or whitespace-only input yields an empty vector, which callers
/// treat as "no data supplied".
pub fn parse_ct_values(text: &str) -> Result<Vec<f64>> {
    tokens(text)
        .map(|token| parse_token(&token).ok_or(DdctError::Parse { token }))
        .collect()
}

/// Parse a block of Ct values, dropping tokens that are not finite numbers.
pub fn parse_ct_values_lenient(text: &str) -> ParsedSeries {
    let mut parsed = ParsedSeries::default();
    for token in tokens(text) {
        match parse_token(&token) {
            Some(v) => parsed.values.push(v),
            None => {
                log::warn!("Ignoring non-numeric Ct value '{}'", token);
                parsed.rejected.push(token);
            }
        }
    }
    parsed
}

/// Parse according to `policy`.
pub fn parse_with_policy(text: &str, policy: ParsePolicy) -> Result<Vec<f64>> {
    match policy {
        ParsePolicy::Strict => parse_ct_values(text),
        ParsePolicy::Lenient => Ok(parse_ct_values_lenient(text).values),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_whitespace_and_newlines() {
        let values = parse_ct_values("22.5 23.0\n23.4\t\n  24.1  ").unwrap();
        assert_eq!(values, vec![22.5, 23.0, 23.4, 24.1]);
    }

    #[test]
    fn test_parse_decimal_comma() {
        let values = parse_ct_values("22,5\n23,0").unwrap();
        assert_eq!(values, vec![22.5, 23.0]);
    }

    #[test]
    fn test_parse_comma_and_semicolon_separated() {
        let values = parse_ct_values("22.5,23.0;24.5").unwrap();
        assert_eq!(values, vec![22.5, 23.0, 24.5]);

        let values = parse_ct_values("22,5;23,1").unwrap();
        assert_eq!(values, vec![22.5, 23.1]);
    }

    #[test]
    fn test_parse_empty_input() {
        assert!(parse_ct_values("").unwrap().is_empty());
        assert!(parse_ct_values("  \n\t ").unwrap().is_empty());
    }

    #[test]
    fn test_parse_invalid_token_strict() {
        match parse_ct_values("22.5 undetermined 23.0") {
            Err(DdctError::Parse { token }) => assert_eq!(token, "undetermined"),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_rejects_non_finite() {
        assert!(parse_ct_values("NaN").is_err());
        assert!(parse_ct_values("inf").is_err());
    }

    #[test]
    fn test_parse_lenient_drops_invalid() {
        let parsed = parse_ct_values_lenient("22.5 N/A 23,0 nan");
        assert_eq!(parsed.values, vec![22.5, 23.0]);
        assert_eq!(parsed.rejected, vec!["N/A".to_string(), "nan".to_string()]);
    }

    #[test]
    fn test_parse_with_policy() {
        assert!(parse_with_policy("1 x 2", ParsePolicy::Strict).is_err());
        assert_eq!(
            parse_with_policy("1 x 2", ParsePolicy::Lenient).unwrap(),
            vec![1.0, 2.0]
        );
    }
}
