//! Parser for dimension formulas using chumsky
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! expr    := product (('+' | '-') product)*
//! product := unary (('*' | '/') unary)*
//! unary   := '-'? atom
//! atom    := number | cab | dim | min | max | '(' expr ')'
//! cab     := 'cab' '(' unit ',' field ')'
//! dim     := 'dim' '(' unit ',' (ident | string) ')'
//! ```

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use super::ast::{BinaryOp, Expr, GeomField};
use super::error::FormulaError;
use super::lexer::Token;

/// Parse a formula expression into an AST
pub fn parse_formula(input: &str) -> Result<Expr, Vec<FormulaError>> {
    let len = input.len();

    let token_iter = super::lexer::lex(input).map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter).map((len..len).into(), |(t, s): (_, _)| (t, s));

    expr_parser()
        .then_ignore(end())
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Left-fold a chain of same-precedence operations into a nested expression
fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn expr_parser<'a, I>() -> impl Parser<'a, I, Expr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    recursive(|expr| {
        let number = select! {
            Token::Number(n) => Expr::Number(n),
        };

        // unit references accept bare identifiers or quoted strings
        let unit_ref = select! {
            Token::Ident(s) => s,
            Token::String(s) => s,
        };

        let field = select! {
            Token::Ident(s) => s,
        }
        .try_map(|name: String, span| {
            GeomField::from_name(&name)
                .ok_or_else(|| Rich::custom(span, format!("unknown geometry field '{}'", name)))
        });

        let cab_call = just(Token::Cab)
            .ignore_then(
                unit_ref
                    .clone()
                    .then_ignore(just(Token::Comma))
                    .then(field)
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(unit, field)| Expr::Cab { unit, field });

        let dim_call = just(Token::Dim)
            .ignore_then(
                unit_ref
                    .clone()
                    .then_ignore(just(Token::Comma))
                    .then(unit_ref.clone())
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(unit, dimension)| Expr::Dim { unit, dimension });

        let min_call = just(Token::Min)
            .ignore_then(
                expr.clone()
                    .then_ignore(just(Token::Comma))
                    .then(expr.clone())
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(a, b)| Expr::Min(Box::new(a), Box::new(b)));

        let max_call = just(Token::Max)
            .ignore_then(
                expr.clone()
                    .then_ignore(just(Token::Comma))
                    .then(expr.clone())
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(a, b)| Expr::Max(Box::new(a), Box::new(b)));

        let parenthesized = expr
            .clone()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let atom = choice((number, cab_call, dim_call, min_call, max_call, parenthesized));

        let unary = just(Token::Minus).or_not().then(atom).map(|(neg, inner)| {
            if neg.is_some() {
                Expr::Neg(Box::new(inner))
            } else {
                inner
            }
        });

        let product = unary
            .clone()
            .then(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                ))
                .then(unary)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest));

        product
            .clone()
            .then(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_formula("42").unwrap(), Expr::Number(42.0));
    }

    #[test]
    fn test_parse_cab_call() {
        let expr = parse_formula("cab(base1, width)").unwrap();
        assert_eq!(
            expr,
            Expr::Cab {
                unit: "base1".to_string(),
                field: GeomField::Width,
            }
        );
    }

    #[test]
    fn test_parse_dim_call_with_string() {
        let expr = parse_formula(r#"dim(base2, "someDim")"#).unwrap();
        assert_eq!(
            expr,
            Expr::Dim {
                unit: "base2".to_string(),
                dimension: "someDim".to_string(),
            }
        );
    }

    #[test]
    fn test_precedence_mul_over_add() {
        let expr = parse_formula("1 + 2 * 3").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
            } => {
                assert_eq!(*lhs, Expr::Number(1.0));
                assert!(matches!(
                    *rhs,
                    Expr::Binary {
                        op: BinaryOp::Mul,
                        ..
                    }
                ));
            }
            other => panic!("expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let expr = parse_formula("(1 + 2) * 3").unwrap();
        assert!(matches!(
            expr,
            Expr::Binary {
                op: BinaryOp::Mul,
                ..
            }
        ));
    }

    #[test]
    fn test_unary_minus() {
        let expr = parse_formula("-cab(a, width)").unwrap();
        assert!(matches!(expr, Expr::Neg(_)));
    }

    #[test]
    fn test_min_max_calls() {
        let expr = parse_formula("min(cab(a, width), 600) + max(10, 20)").unwrap();
        match expr {
            Expr::Binary {
                op: BinaryOp::Add,
                lhs,
                rhs,
            } => {
                assert!(matches!(*lhs, Expr::Min(_, _)));
                assert!(matches!(*rhs, Expr::Max(_, _)));
            }
            other => panic!("expected addition at the root, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_field_is_an_error() {
        let result = parse_formula("cab(a, diagonal)");
        assert!(result.is_err());
        let errors = result.unwrap_err();
        assert!(errors[0].to_string().contains("diagonal"));
    }

    #[test]
    fn test_dangling_operator_is_an_error() {
        assert!(parse_formula("cab(a, width) +").is_err());
        assert!(parse_formula("* 5").is_err());
    }
}
