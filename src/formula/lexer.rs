//! Lexer for dimension formulas using logos

use logos::Logos;

/// Byte range in formula source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Accessor keywords
    #[token("cab")]
    Cab,
    #[token("dim")]
    Dim,

    // Functions
    #[token("min")]
    Min,
    #[token("max")]
    Max,

    // Operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_\-]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    String(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Lex a formula into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessor_keywords() {
        let tokens: Vec<_> = lex("cab dim min max").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Cab, Token::Dim, Token::Min, Token::Max]);
    }

    #[test]
    fn test_operators_and_delimiters() {
        let tokens: Vec<_> = lex("+ - * / ( ) ,").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Plus,
                Token::Minus,
                Token::Star,
                Token::Slash,
                Token::ParenOpen,
                Token::ParenClose,
                Token::Comma,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let tokens: Vec<_> = lex("42 3.14 -10").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Number(42.0),
                Token::Number(3.14),
                Token::Minus,
                Token::Number(10.0),
            ]
        );
    }

    #[test]
    fn test_identifiers_and_strings() {
        let tokens: Vec<_> = lex(r#"base_1 "shelf height""#).map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![
                Token::Ident("base_1".to_string()),
                Token::String("shelf height".to_string()),
            ]
        );
    }

    #[test]
    fn test_complete_formula() {
        let tokens: Vec<_> = lex(r#"cab(base1, width) + dim(base2, "someDim") * 2"#)
            .map(|(t, _)| t)
            .collect();
        assert_eq!(
            tokens,
            vec![
                Token::Cab,
                Token::ParenOpen,
                Token::Ident("base1".to_string()),
                Token::Comma,
                Token::Ident("width".to_string()),
                Token::ParenClose,
                Token::Plus,
                Token::Dim,
                Token::ParenOpen,
                Token::Ident("base2".to_string()),
                Token::Comma,
                Token::String("someDim".to_string()),
                Token::ParenClose,
                Token::Star,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_hyphenated_unit_ids() {
        let tokens: Vec<_> = lex("base-600").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Ident("base-600".to_string())]);
    }
}
