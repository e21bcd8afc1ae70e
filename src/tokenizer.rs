//! An eager tokenizer for assignment statements.
//!
//! By "eager", we mean that the tokenizer consumes the entire input line
//! before handing the data to the next stage (i.e. the parser). Statements
//! are short, so there is nothing to gain from scanning on demand.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TokenList {
    pub tokens: Vec<TokenData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenData {
    Number(i64),
    Identifier(String),
    Plus,
    Minus,
    Multiply,
    Divide,
    Assign,
    Semicolon,
    LeftParen,
    RightParen,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub absolute_i: u32,
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn advance(&mut self, c: char) {
        self.absolute_i += 1;
        self.column += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self {
            absolute_i: 1,
            line: 1,
            column: 1,
        }
    }
}

/// A character that matches none of the token rules. Lexical errors are not
/// fatal: the offending character is skipped and scanning continues, so one
/// scan can report several of them.
#[derive(Clone, Debug, thiserror::Error, Serialize, Deserialize)]
#[error("invalid character '{character}'")]
pub struct LexicalError {
    pub character: char,
    pub position: Position,
}

/// Everything one call to [`tokenize`] found: the recognized tokens and the
/// characters that had to be skipped.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenScan {
    pub tokens: TokenList,
    pub errors: Vec<LexicalError>,
}

#[tracing::instrument(level = "trace", skip_all)]
pub fn tokenize(s: &str) -> TokenScan {
    let mut chars = s.chars().peekable();
    let mut tokens = TokenList { tokens: vec![] };
    let mut errors = vec![];
    let mut position = Position::default();
    while let Some(c) = chars.next() {
        let start = position.clone();
        position.advance(c);
        if c == ' ' || c == '\t' {
            // Blanks separate tokens and are otherwise ignored. Newlines are
            // not blanks here: a statement is exactly one line.
        } else if c.is_ascii_digit() {
            let mut number = (c as u8 - b'0') as i64;
            while chars.peek().is_some_and(|c| c.is_ascii_digit()) {
                let c = chars.next().unwrap();
                position.advance(c);
                let digit = (c as u8 - b'0') as i64;
                number = number * 10 + digit;
            }
            tokens.tokens.push(TokenData::Number(number));
        } else if c.is_ascii_alphabetic() || c == '_' {
            let mut name = String::new();
            name.push(c);
            while chars
                .peek()
                .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
            {
                let c = chars.next().unwrap();
                position.advance(c);
                name.push(c);
            }
            tokens.tokens.push(TokenData::Identifier(name));
        } else if let Some(token) = single_char_token(c) {
            tokens.tokens.push(token);
        } else {
            errors.push(LexicalError {
                character: c,
                position: start,
            });
        }
    }
    TokenScan { tokens, errors }
}

fn single_char_token(c: char) -> Option<TokenData> {
    let token = match c {
        '+' => TokenData::Plus,
        '-' => TokenData::Minus,
        '*' => TokenData::Multiply,
        '/' => TokenData::Divide,
        '=' => TokenData::Assign,
        ';' => TokenData::Semicolon,
        '(' => TokenData::LeftParen,
        ')' => TokenData::RightParen,
        _ => return None,
    };
    Some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_every_token_kind() {
        let scan = tokenize("value_1 = (2 + 30) * 4 / 5 - 6;");
        assert!(scan.errors.is_empty());
        assert_eq!(
            scan.tokens.tokens,
            vec![
                TokenData::Identifier("value_1".to_string()),
                TokenData::Assign,
                TokenData::LeftParen,
                TokenData::Number(2),
                TokenData::Plus,
                TokenData::Number(30),
                TokenData::RightParen,
                TokenData::Multiply,
                TokenData::Number(4),
                TokenData::Divide,
                TokenData::Number(5),
                TokenData::Minus,
                TokenData::Number(6),
                TokenData::Semicolon,
            ]
        );
    }

    #[test]
    fn skips_spaces_and_tabs() {
        let scan = tokenize("x\t=  1;");
        assert!(scan.errors.is_empty());
        assert_eq!(
            scan.tokens.tokens,
            vec![
                TokenData::Identifier("x".to_string()),
                TokenData::Assign,
                TokenData::Number(1),
                TokenData::Semicolon,
            ]
        );
    }

    #[test]
    fn invalid_character_is_reported_and_skipped() {
        let scan = tokenize("x = 2 @ 3;");
        assert_eq!(scan.errors.len(), 1);
        assert_eq!(scan.errors[0].character, '@');
        assert_eq!(scan.errors[0].position.column, 7);
        // The scan keeps going past the bad character.
        assert_eq!(
            scan.tokens.tokens,
            vec![
                TokenData::Identifier("x".to_string()),
                TokenData::Assign,
                TokenData::Number(2),
                TokenData::Number(3),
                TokenData::Semicolon,
            ]
        );
    }

    #[test]
    fn position_advances_inside_multi_character_tokens() {
        let scan = tokenize("abc $ 123 $");
        assert_eq!(scan.errors.len(), 2);
        assert_eq!(scan.errors[0].position.column, 5);
        assert_eq!(scan.errors[1].position.column, 11);
    }

    #[test]
    fn identifiers_may_start_with_an_underscore() {
        let scan = tokenize("_tmp9 = 0;");
        assert!(scan.errors.is_empty());
        assert_eq!(
            scan.tokens.tokens[0],
            TokenData::Identifier("_tmp9".to_string())
        );
    }

    #[test]
    fn multi_digit_numbers_accumulate() {
        let scan = tokenize("1234");
        assert_eq!(scan.tokens.tokens, vec![TokenData::Number(1234)]);
    }

    #[test]
    fn empty_input_produces_no_tokens() {
        let scan = tokenize("");
        assert!(scan.tokens.tokens.is_empty());
        assert!(scan.errors.is_empty());
    }
}
