//! Bytes-to-tokens stage (component D). Operates line by line: a bare
//! `^[A-Z]{2}$` line is a block header, a `**`-prefixed line is a comment,
//! everything else is split into whitespace-delimited fields and each
//! field is classified independently.

use serde::{Deserialize, Serialize};

use crate::error::DstvError;

const SUFFIX_LETTERS: [char; 5] = ['u', 'o', 'v', 'h', 's'];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    BlockHeader,
    Identifier,
    Integer,
    Float,
    String,
    Delimiter,
    Coordinate,
    Comment,
    Newline,
    Eof,
    Empty,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
    pub length: usize,
    pub raw: String,
    /// Present only on `Coordinate` tokens: the face/axis/separator suffix
    /// letter split off the trailing end of the field.
    pub suffix: Option<char>,
}

impl Token {
    fn new(kind: TokenKind, value: impl Into<String>, line: usize, column: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let length = raw.len();
        Self { kind, value: value.into(), line, column, length, raw, suffix: None }
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.value.parse().ok()
    }
}

pub struct LexOutcome {
    pub tokens: Vec<Token>,
    pub errors: Vec<DstvError>,
}

/// Tokenizes a full DSTV source buffer. Never fails outright: malformed
/// fields are recorded in `errors` and the lexer resumes at the next line.
pub fn tokenize(source: &str) -> LexOutcome {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for (line_idx, raw_line) in source.lines().enumerate() {
        let line_no = line_idx + 1;
        let trimmed = raw_line.trim_end();
        let content = trimmed.trim();

        if content.is_empty() {
            tokens.push(Token::new(TokenKind::Newline, "", line_no, 1, ""));
            continue;
        }

        if is_block_header(content) {
            let col = raw_line.find(content).map(|c| c + 1).unwrap_or(1);
            tokens.push(Token::new(TokenKind::BlockHeader, content, line_no, col, content));
            tokens.push(Token::new(TokenKind::Newline, "", line_no, col + content.len(), ""));
            continue;
        }

        if content.starts_with("**") {
            let col = raw_line.find(content).map(|c| c + 1).unwrap_or(1);
            tokens.push(Token::new(TokenKind::Comment, content, line_no, col, content));
            tokens.push(Token::new(TokenKind::Newline, "", line_no, col + content.len(), ""));
            continue;
        }

        if let Some(bad_col) = find_invalid_byte(trimmed) {
            errors.push(DstvError::Lex {
                line: line_no,
                column: bad_col,
                message: "non-printable byte in field".to_string(),
            });
            tokens.push(Token::new(TokenKind::Newline, "", line_no, trimmed.len() + 1, ""));
            continue;
        }

        for (field, col) in split_fields(trimmed) {
            tokens.extend(tokenize_field_compound(field, line_no, col));
        }
        tokens.push(Token::new(TokenKind::Newline, "", line_no, trimmed.len() + 1, ""));
    }

    tokens.push(Token::new(TokenKind::Eof, "", source.lines().count() + 1, 1, ""));
    LexOutcome { tokens, errors }
}

fn is_block_header(content: &str) -> bool {
    content.len() == 2 && content.chars().all(|c| c.is_ascii_uppercase())
}

fn find_invalid_byte(line: &str) -> Option<usize> {
    line.char_indices()
        .find(|(_, c)| c.is_control() && *c != '\t')
        .map(|(i, _)| i + 1)
}

/// Splits a line into whitespace-delimited fields, tracking each field's
/// 1-based column.
fn split_fields(line: &str) -> Vec<(&str, usize)> {
    let mut fields = Vec::new();
    let mut start: Option<usize> = None;
    for (i, c) in line.char_indices() {
        if c.is_whitespace() {
            if let Some(s) = start.take() {
                fields.push((&line[s..i], s + 1));
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }
    if let Some(s) = start {
        fields.push((&line[s..], s + 1));
    }
    fields
}

fn tokenize_field(field: &str, line: usize, column: usize) -> Token {
    if field == "-" {
        return Token::new(TokenKind::Empty, "", line, column, field);
    }

    if let Some(kind) = classify_number(field) {
        return Token::new(kind, field, line, column, field);
    }

    if field.len() > 1 {
        let last = field.chars().last().unwrap();
        if SUFFIX_LETTERS.contains(&last) {
            let number_part = &field[..field.len() - last.len_utf8()];
            if classify_number(number_part).is_some() {
                let mut tok = Token::new(TokenKind::Coordinate, number_part, line, column, field);
                tok.suffix = Some(last);
                return tok;
            }
        }
    }

    if field.chars().all(|c| c.is_ascii_alphabetic()) {
        return Token::new(TokenKind::Identifier, field, line, column, field);
    }

    Token::new(TokenKind::String, field, line, column, field)
}

fn classify_number(field: &str) -> Option<TokenKind> {
    let f = field.strip_prefix('+').or_else(|| field.strip_prefix('-')).unwrap_or(field);
    if f.is_empty() {
        return None;
    }
    if f.chars().all(|c| c.is_ascii_digit()) {
        return Some(TokenKind::Integer);
    }
    if let Some(dot) = f.find('.') {
        let (int_part, frac_part) = (&f[..dot], &f[dot + 1..]);
        let int_ok = int_part.is_empty() || int_part.chars().all(|c| c.is_ascii_digit());
        let frac_ok = !frac_part.is_empty() && frac_part.chars().all(|c| c.is_ascii_digit());
        if int_ok && frac_ok {
            return Some(TokenKind::Float);
        }
    }
    None
}

/// Tokenizes a single field that may be a DSTV compound: `10rF1001` becomes
/// FLOAT(10) + DELIMITER('r') + STRING("F1001") (seen in TO's tool-number
/// field). Falls back to a single `tokenize_field` token when the field
/// doesn't match the compound shape, so this is what `tokenize()` calls for
/// every field rather than just the ones known to carry a compound.
pub fn tokenize_field_compound(field: &str, line: usize, column: usize) -> Vec<Token> {
    if let Some(r_pos) = field.find('r') {
        if r_pos > 0 {
            let prefix = &field[..r_pos];
            let remainder = &field[r_pos + 1..];
            if classify_number(prefix).is_some() && !remainder.is_empty() {
                let num_kind = classify_number(prefix).unwrap();
                return vec![
                    Token::new(num_kind, prefix, line, column, prefix),
                    Token::new(TokenKind::Delimiter, "r", line, column + r_pos, "r"),
                    Token::new(TokenKind::String, remainder, line, column + r_pos + 1, remainder),
                ];
            }
        }
    }
    vec![tokenize_field(field, line, column)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_header_recognised() {
        let out = tokenize("ST\n");
        assert_eq!(out.tokens[0].kind, TokenKind::BlockHeader);
        assert_eq!(out.tokens[0].value, "ST");
    }

    #[test]
    fn test_comment_line() {
        let out = tokenize("** this is a comment\n");
        assert_eq!(out.tokens[0].kind, TokenKind::Comment);
    }

    #[test]
    fn test_plain_float_field() {
        let out = tokenize("2259.98\n");
        assert_eq!(out.tokens[0].kind, TokenKind::Float);
        assert_eq!(out.tokens[0].as_f64(), Some(2259.98));
    }

    #[test]
    fn test_coordinate_suffix_split() {
        let out = tokenize("89.01s\n");
        assert_eq!(out.tokens[0].kind, TokenKind::Coordinate);
        assert_eq!(out.tokens[0].as_f64(), Some(89.01));
        assert_eq!(out.tokens[0].suffix, Some('s'));
    }

    #[test]
    fn test_compound_r_separator() {
        let tokens = tokenize_field_compound("10rF1001", 1, 1);
        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::Integer);
        assert_eq!(tokens[1].kind, TokenKind::Delimiter);
        assert_eq!(tokens[1].value, "r");
        assert_eq!(tokens[2].kind, TokenKind::String);
        assert_eq!(tokens[2].value, "F1001");
    }

    #[test]
    fn test_empty_field_marker() {
        let out = tokenize("- 10.0\n");
        assert_eq!(out.tokens[0].kind, TokenKind::Empty);
    }

    #[test]
    fn test_identifier_field() {
        let out = tokenize("S355\n");
        assert_eq!(out.tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn test_column_tracking_across_fields() {
        let out = tokenize("10.0 20.0\n");
        assert_eq!(out.tokens[0].column, 1);
        assert_eq!(out.tokens[1].column, 6);
    }

    #[test]
    fn test_lex_error_recovers_to_next_line() {
        let out = tokenize("10.0 \u{1}bad\nST\n");
        assert_eq!(out.errors.len(), 1);
        let header = out.tokens.iter().find(|t| t.kind == TokenKind::BlockHeader);
        assert!(header.is_some());
    }

    #[test]
    fn test_eof_token_terminates_stream() {
        let out = tokenize("ST\nEN\n");
        assert_eq!(out.tokens.last().unwrap().kind, TokenKind::Eof);
    }
}
