//! Hand-written recursive descent grammar for the JS subset.
//!
//! Parses one (already transformed, brace-wrapped) expression fragment
//! into the generic [`SyntaxNode`] tree. Binary and logical operators
//! use precedence climbing; everything else is plain recursive descent.
//!
//! The grammar is deliberately small: literals, dotted member access,
//! calls, conditional/ternary, logical and arithmetic operators,
//! object/array literals, and the synthetic `$format` assignment
//! statement introduced by the format-specifier transformer. No
//! declarations, no loops, no general statements.

use crate::error::ParseError;
use crate::stream::TokenStream;
use crate::syntax::{LiteralValue, LogicalOp, SyntaxKind, SyntaxNode};
use tokenfmt_lexer::Token;

/// Parses a complete brace-delimited fragment.
///
/// A brace-leading fragment is first attempted as an object literal
/// (`{a: 1}`); if that fails it is parsed as a statement block
/// (`{ value; $format = "0n" }`). Either way the root node is a block,
/// so downstream dispatch always starts from the same shape.
pub fn parse_fragment(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();

    let saved = stream.pos();
    if let Ok(object) = parse_object_literal_complete(stream) {
        let span = stream.span_from(start);
        return Ok(SyntaxNode::new(
            SyntaxKind::Block {
                statements: vec![object],
            },
            span,
        ));
    }
    stream.rewind(saved);

    parse_block(stream)
}

/// Attempts to parse the *entire* stream as one object literal.
fn parse_object_literal_complete(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let object = parse_object_literal(stream)?;
    if !stream.at_end() {
        return Err(ParseError::unexpected_token(
            stream.peek().map(|t| format!("{t:?}")),
            "after object literal",
            stream.current_offset(),
        ));
    }
    Ok(object)
}

/// Parses `{ statement (; statement)* ;? }` consuming the whole stream.
fn parse_block(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    stream.expect(Token::LBrace, "'{'")?;

    let mut statements = Vec::new();
    loop {
        if stream.check(&Token::RBrace) {
            break;
        }
        statements.push(parse_statement(stream)?);
        if stream.check(&Token::Semi) {
            stream.advance();
        } else {
            break;
        }
    }
    stream.expect(Token::RBrace, "'}'")?;

    if !stream.at_end() {
        return Err(ParseError::unexpected_token(
            stream.peek().map(|t| format!("{t:?}")),
            "after block",
            stream.current_offset(),
        ));
    }

    Ok(SyntaxNode::new(
        SyntaxKind::Block { statements },
        stream.span_from(start),
    ))
}

/// Parses one statement: the synthetic `$format = "spec"` assignment or
/// an expression.
fn parse_statement(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    if let (Some(Token::Ident(name)), Some(Token::Eq)) = (stream.peek(), stream.peek_nth(1)) {
        if name == "$format" {
            return parse_format_assignment(stream);
        }
    }
    parse_expr(stream)
}

/// Parses `$format = "spec"`.
fn parse_format_assignment(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    stream.advance(); // $format
    stream.advance(); // =
    let offset = stream.current_offset();
    match stream.advance() {
        Some(Token::Str(spec)) => {
            let specifier = spec.clone();
            Ok(SyntaxNode::new(
                SyntaxKind::FormatAssignment { specifier },
                stream.span_from(start),
            ))
        }
        other => Err(ParseError::unexpected_token(
            other.map(|t| format!("{t:?}")),
            "in format assignment (string literal required)",
            offset,
        )),
    }
}

/// Parses one expression (entry point for sub-expressions).
pub fn parse_expr(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    parse_conditional(stream)
}

/// Parses a conditional (`test ? consequent : alternate`), right
/// associative.
fn parse_conditional(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    let test = parse_pratt(stream, 0)?;

    if !stream.check(&Token::Question) {
        return Ok(test);
    }
    stream.advance();
    let consequent = parse_expr(stream)?;
    stream.expect(Token::Colon, "':' in conditional")?;
    let alternate = parse_expr(stream)?;

    Ok(SyntaxNode::new(
        SyntaxKind::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
        },
        stream.span_from(start),
    ))
}

/// Operator metadata for precedence climbing.
///
/// Returns (precedence, spelling, is_logical); all binary operators in
/// this grammar are left associative.
fn binary_op_info(token: &Token) -> Option<(u8, &'static str, bool)> {
    match token {
        Token::OrOr => Some((10, "||", true)),
        Token::AndAnd => Some((20, "&&", true)),
        Token::EqEq => Some((30, "==", false)),
        Token::BangEq => Some((30, "!=", false)),
        Token::Lt => Some((35, "<", false)),
        Token::LtEq => Some((35, "<=", false)),
        Token::Gt => Some((35, ">", false)),
        Token::GtEq => Some((35, ">=", false)),
        Token::Plus => Some((40, "+", false)),
        Token::Minus => Some((40, "-", false)),
        Token::Star => Some((50, "*", false)),
        Token::Slash => Some((50, "/", false)),
        Token::Percent => Some((50, "%", false)),
        _ => None,
    }
}

/// Precedence climbing over binary and logical operators.
fn parse_pratt(stream: &mut TokenStream, min_prec: u8) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    let mut left = parse_prefix(stream)?;

    while let Some(token) = stream.peek() {
        let Some((prec, spelling, is_logical)) = binary_op_info(token) else {
            break;
        };
        if prec < min_prec {
            break;
        }
        stream.advance();
        let right = parse_pratt(stream, prec + 1)?;
        let span = stream.span_from(start);

        let kind = if is_logical {
            let operator = if spelling == "&&" {
                LogicalOp::And
            } else {
                LogicalOp::Or
            };
            SyntaxKind::Logical {
                operator,
                left: Box::new(left),
                right: Box::new(right),
            }
        } else {
            SyntaxKind::Binary {
                operator: spelling,
                left: Box::new(left),
                right: Box::new(right),
            }
        };
        left = SyntaxNode::new(kind, span);
    }

    Ok(left)
}

/// Parses prefix (unary) expressions.
fn parse_prefix(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    let operator = match stream.peek() {
        Some(Token::Bang) => "!",
        Some(Token::Minus) => "-",
        _ => return parse_postfix(stream),
    };
    stream.advance();
    let argument = parse_prefix(stream)?;
    Ok(SyntaxNode::new(
        SyntaxKind::Unary {
            operator,
            argument: Box::new(argument),
        },
        stream.span_from(start),
    ))
}

/// Parses postfix chains: member access and calls.
fn parse_postfix(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    let mut node = parse_primary(stream)?;

    loop {
        if stream.check(&Token::Dot) {
            stream.advance();
            let offset = stream.current_offset();
            match stream.advance() {
                Some(Token::Ident(property)) => {
                    let property = property.clone();
                    node = SyntaxNode::new(
                        SyntaxKind::Member {
                            object: Box::new(node),
                            property,
                        },
                        stream.span_from(start),
                    );
                }
                other => {
                    return Err(ParseError::unexpected_token(
                        other.map(|t| format!("{t:?}")),
                        "after '.'",
                        offset,
                    ));
                }
            }
        } else if stream.check(&Token::LParen) {
            stream.advance();
            let mut arguments = Vec::new();
            while !stream.check(&Token::RParen) {
                arguments.push(parse_expr(stream)?);
                if stream.check(&Token::Comma) {
                    stream.advance();
                } else {
                    break;
                }
            }
            stream.expect(Token::RParen, "')'")?;
            node = SyntaxNode::new(
                SyntaxKind::Call {
                    callee: Box::new(node),
                    arguments,
                },
                stream.span_from(start),
            );
        } else {
            break;
        }
    }

    Ok(node)
}

/// Parses atomic expressions.
fn parse_primary(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    let offset = stream.current_offset();
    match stream.peek() {
        Some(Token::Number(_)) => {
            let Some(Token::Number(n)) = stream.advance() else {
                unreachable!("peeked number");
            };
            let value = LiteralValue::Number(*n);
            Ok(SyntaxNode::new(
                SyntaxKind::Literal { value },
                stream.span_from(start),
            ))
        }
        Some(Token::Str(_)) => {
            let Some(Token::Str(s)) = stream.advance() else {
                unreachable!("peeked string");
            };
            let value = LiteralValue::Str(s.clone());
            Ok(SyntaxNode::new(
                SyntaxKind::Literal { value },
                stream.span_from(start),
            ))
        }
        Some(Token::True) => {
            stream.advance();
            Ok(SyntaxNode::new(
                SyntaxKind::Literal {
                    value: LiteralValue::Bool(true),
                },
                stream.span_from(start),
            ))
        }
        Some(Token::False) => {
            stream.advance();
            Ok(SyntaxNode::new(
                SyntaxKind::Literal {
                    value: LiteralValue::Bool(false),
                },
                stream.span_from(start),
            ))
        }
        Some(Token::Null) => {
            stream.advance();
            Ok(SyntaxNode::new(
                SyntaxKind::Literal {
                    value: LiteralValue::Null,
                },
                stream.span_from(start),
            ))
        }
        Some(Token::Ident(_)) => {
            let Some(Token::Ident(name)) = stream.advance() else {
                unreachable!("peeked identifier");
            };
            let name = name.clone();
            Ok(SyntaxNode::new(
                SyntaxKind::Identifier { name },
                stream.span_from(start),
            ))
        }
        Some(Token::LParen) => {
            stream.advance();
            let inner = parse_expr(stream)?;
            stream.expect(Token::RParen, "')'")?;
            // Keep the inner node; the parenthesized span only matters
            // for fallback source slicing, which uses the outer span.
            Ok(SyntaxNode::new(inner.kind, stream.span_from(start)))
        }
        Some(Token::LBracket) => parse_array_literal(stream),
        Some(Token::LBrace) => parse_object_literal(stream),
        other => Err(ParseError::unexpected_token(
            other.map(|t| format!("{t:?}")),
            "in expression",
            offset,
        )),
    }
}

/// Parses `[expr, expr, ...]`.
fn parse_array_literal(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    stream.expect(Token::LBracket, "'['")?;
    let mut elements = Vec::new();
    while !stream.check(&Token::RBracket) {
        elements.push(parse_expr(stream)?);
        if stream.check(&Token::Comma) {
            stream.advance();
        } else {
            break;
        }
    }
    stream.expect(Token::RBracket, "']'")?;
    Ok(SyntaxNode::new(
        SyntaxKind::ArrayExpr { elements },
        stream.span_from(start),
    ))
}

/// Parses `{key: expr, "key": expr, ...}`.
fn parse_object_literal(stream: &mut TokenStream) -> Result<SyntaxNode, ParseError> {
    let start = stream.pos();
    stream.expect(Token::LBrace, "'{'")?;
    let mut properties = Vec::new();
    while !stream.check(&Token::RBrace) {
        let offset = stream.current_offset();
        let key = match stream.advance() {
            Some(Token::Ident(name)) => name.clone(),
            Some(Token::Str(s)) => s.clone(),
            other => {
                return Err(ParseError::unexpected_token(
                    other.map(|t| format!("{t:?}")),
                    "as object key",
                    offset,
                ));
            }
        };
        stream.expect(Token::Colon, "':' after object key")?;
        let value = parse_expr(stream)?;
        properties.push((key, value));
        if stream.check(&Token::Comma) {
            stream.advance();
        } else {
            break;
        }
    }
    stream.expect(Token::RBrace, "'}'")?;
    Ok(SyntaxNode::new(
        SyntaxKind::ObjectExpr { properties },
        stream.span_from(start),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> SyntaxNode {
        let tokens = tokenfmt_lexer::tokenize(source).expect("lex failed");
        let mut stream = TokenStream::new(&tokens, source);
        parse_fragment(&mut stream).expect("parse failed")
    }

    fn block_statements(node: SyntaxNode) -> Vec<SyntaxNode> {
        match node.kind {
            SyntaxKind::Block { statements } => statements,
            other => panic!("expected block, got {other:?}"),
        }
    }

    #[test]
    fn test_wrapped_identifier() {
        let statements = block_statements(parse("{ room.building.name }"));
        assert_eq!(statements.len(), 1);
        assert!(matches!(statements[0].kind, SyntaxKind::Member { .. }));
    }

    #[test]
    fn test_format_assignment_statement() {
        let statements = block_statements(parse("{ price; $format = \"0n\" }"));
        assert_eq!(statements.len(), 2);
        assert!(matches!(
            &statements[1].kind,
            SyntaxKind::FormatAssignment { specifier } if specifier == "0n"
        ));
    }

    #[test]
    fn test_object_literal_fragment() {
        let statements = block_statements(parse("{a: 1, b: 'x'}"));
        assert_eq!(statements.len(), 1);
        let SyntaxKind::ObjectExpr { properties } = &statements[0].kind else {
            panic!("expected object literal");
        };
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].0, "a");
    }

    #[test]
    fn test_call_with_nested_object() {
        let statements = block_statements(parse("{ fn({a: '}'}) }"));
        let SyntaxKind::Call { callee, arguments } = &statements[0].kind else {
            panic!("expected call");
        };
        assert!(matches!(callee.kind, SyntaxKind::Identifier { .. }));
        assert_eq!(arguments.len(), 1);
        assert!(matches!(arguments[0].kind, SyntaxKind::ObjectExpr { .. }));
    }

    #[test]
    fn test_conditional_right_associative() {
        let statements = block_statements(parse("{ a ? b : c ? d : e }"));
        let SyntaxKind::Conditional { alternate, .. } = &statements[0].kind else {
            panic!("expected conditional");
        };
        assert!(matches!(alternate.kind, SyntaxKind::Conditional { .. }));
    }

    #[test]
    fn test_logical_precedence() {
        // a || b && c parses as a || (b && c)
        let statements = block_statements(parse("{ a || b && c }"));
        let SyntaxKind::Logical {
            operator, right, ..
        } = &statements[0].kind
        else {
            panic!("expected logical");
        };
        assert_eq!(*operator, LogicalOp::Or);
        assert!(matches!(
            right.kind,
            SyntaxKind::Logical {
                operator: LogicalOp::And,
                ..
            }
        ));
    }

    #[test]
    fn test_unexpected_token_is_fatal() {
        let tokens = tokenfmt_lexer::tokenize("{ a ++ }").expect("lex failed");
        let mut stream = TokenStream::new(&tokens, "{ a ++ }");
        assert!(parse_fragment(&mut stream).is_err());
    }

    #[test]
    fn test_trailing_garbage_after_block() {
        let source = "{ a } b";
        let tokens = tokenfmt_lexer::tokenize(source).expect("lex failed");
        let mut stream = TokenStream::new(&tokens, source);
        assert!(parse_fragment(&mut stream).is_err());
    }
}
