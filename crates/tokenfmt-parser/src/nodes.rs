//! Per-node-kind conversion from the generic syntax tree into
//! `TokenExpression` variants.
//!
//! Conversion is driven by a static registry populated at parser
//! construction: one parser function per node kind, each converting its
//! node (and recursively its children, via the shared
//! [`ParseSession::parse_node`] callback). A node kind without a
//! registered parser is a fatal error for that parse.

use crate::context::ParseContext;
use crate::error::ParseError;
use crate::syntax::{LiteralValue, NodeTag, SyntaxKind, SyntaxNode};
use indexmap::IndexMap;
use std::collections::HashMap;
use tokenfmt_ast::{
    ArrayToken, ConstantToken, FormatShorthandToken, FunctionToken, ObjectToken,
    PrimitiveConstantToken, PrimitiveValue, ShorthandToken, TokenExpression, TERNARY_FUNCTION,
};

/// Conversion function for one node kind.
pub type NodeParser = fn(&SyntaxNode, &ParseSession) -> Result<TokenExpression, ParseError>;

/// Static registry from node kind to conversion function.
pub struct NodeRegistry {
    parsers: HashMap<NodeTag, NodeParser>,
}

impl NodeRegistry {
    /// Builds the standard registry.
    ///
    /// `FormatAssignment` is deliberately unregistered: it is a
    /// statement handled inside the block parser, and dispatching it
    /// as an expression is exactly the "no parser for node type" case.
    pub fn standard() -> Self {
        let mut parsers: HashMap<NodeTag, NodeParser> = HashMap::new();
        parsers.insert(NodeTag::Block, parse_block);
        parsers.insert(NodeTag::Call, parse_call);
        parsers.insert(NodeTag::Conditional, parse_conditional);
        parsers.insert(NodeTag::Logical, parse_logical);
        parsers.insert(NodeTag::Identifier, parse_identifier);
        parsers.insert(NodeTag::Literal, parse_literal);
        parsers.insert(NodeTag::Member, parse_member);
        parsers.insert(NodeTag::ObjectExpr, parse_object);
        parsers.insert(NodeTag::ArrayExpr, parse_array);
        // Fallback: constructs with no shorthand representation become
        // function tokens carrying their own source.
        parsers.insert(NodeTag::Binary, parse_fallback);
        parsers.insert(NodeTag::Unary, parse_fallback);
        Self { parsers }
    }

    /// Looks up the parser for a tag.
    pub fn get(&self, tag: NodeTag) -> Option<NodeParser> {
        self.parsers.get(&tag).copied()
    }
}

/// One conversion pass over a parsed fragment.
pub struct ParseSession<'a> {
    /// Transformed source the syntax tree was parsed from
    pub source: &'a str,
    /// Inferred context of the original fragment
    pub context: ParseContext,
    /// Bytes prepended by the block wrapper, subtracted from reported
    /// token offsets
    pub offset_adjust: usize,
    registry: &'a NodeRegistry,
}

impl<'a> ParseSession<'a> {
    /// Creates a session.
    pub fn new(
        source: &'a str,
        context: ParseContext,
        offset_adjust: usize,
        registry: &'a NodeRegistry,
    ) -> Self {
        Self {
            source,
            context,
            offset_adjust,
            registry,
        }
    }

    /// Shared conversion callback: dispatches a node through the
    /// registry.
    pub fn parse_node(&self, node: &SyntaxNode) -> Result<TokenExpression, ParseError> {
        match self.registry.get(node.tag()) {
            Some(parser) => parser(node, self),
            None => Err(ParseError::unsupported_node(
                node.tag().name(),
                node.span.start,
            )),
        }
    }

    /// Source fragment a node was parsed from.
    fn slice(&self, node: &SyntaxNode) -> &'a str {
        &self.source[node.span.clone()]
    }

    /// Reported source offset for a node.
    fn start(&self, node: &SyntaxNode) -> Option<usize> {
        Some(node.span.start.saturating_sub(self.offset_adjust))
    }
}

/// Converts the root block: one expression statement, optionally
/// followed by a `$format` assignment.
fn parse_block(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::Block { statements } = &node.kind else {
        unreachable!("dispatched as block");
    };

    match statements.as_slice() {
        [] => Err(ParseError::invalid_syntax(
            "empty expression",
            node.span.start,
        )),
        [expr] => {
            // In a `$:` fragment a bare root path names a zero-argument
            // function; paths in argument position stay field paths.
            match session.parse_node(expr)? {
                TokenExpression::Shorthand(shorthand)
                    if session.context.identifiers_are_functions() =>
                {
                    Ok(TokenExpression::Function(FunctionToken {
                        expression: shorthand.expression.clone(),
                        name: shorthand.expression,
                        arguments: Vec::new(),
                        start: shorthand.start,
                    }))
                }
                token => Ok(token),
            }
        }
        [expr, spec] => {
            let SyntaxKind::FormatAssignment { specifier } = &spec.kind else {
                return Err(ParseError::invalid_syntax(
                    "an expression fragment may contain only one statement",
                    spec.span.start,
                ));
            };
            match session.parse_node(expr)? {
                TokenExpression::Shorthand(shorthand) => Ok(TokenExpression::FormatShorthand(
                    FormatShorthandToken::new(shorthand.expression, specifier, shorthand.start),
                )),
                _ => Err(ParseError::invalid_syntax(
                    "a format specifier applies only to path expressions",
                    spec.span.start,
                )),
            }
        }
        [_, _, extra, ..] => Err(ParseError::invalid_syntax(
            "an expression fragment may contain only one statement",
            extra.span.start,
        )),
    }
}

/// Converts a call expression into a function token.
fn parse_call(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::Call { callee, arguments } = &node.kind else {
        unreachable!("dispatched as call");
    };

    let name = match dotted_path(callee) {
        Some(name) => name,
        None => session.slice(callee).to_string(),
    };
    let arguments = arguments
        .iter()
        .map(|argument| session.parse_node(argument))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TokenExpression::Function(FunctionToken {
        expression: session.slice(node).to_string(),
        name,
        arguments,
        start: session.start(node),
    }))
}

/// Lowers a conditional into a synthetic ternary function call.
///
/// There is no dedicated ternary token: the evaluator's
/// function-calling path stays the single executable primitive.
fn parse_conditional(
    node: &SyntaxNode,
    session: &ParseSession,
) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::Conditional {
        test,
        consequent,
        alternate,
    } = &node.kind
    else {
        unreachable!("dispatched as conditional");
    };

    let arguments = vec![
        session.parse_node(test)?,
        session.parse_node(consequent)?,
        session.parse_node(alternate)?,
    ];

    Ok(TokenExpression::Function(FunctionToken {
        expression: session.slice(node).to_string(),
        name: TERNARY_FUNCTION.to_string(),
        arguments,
        start: session.start(node),
    }))
}

/// Converts a logical expression into a function token named after its
/// operator.
fn parse_logical(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::Logical {
        operator,
        left,
        right,
    } = &node.kind
    else {
        unreachable!("dispatched as logical");
    };

    let arguments = vec![session.parse_node(left)?, session.parse_node(right)?];

    Ok(TokenExpression::Function(FunctionToken {
        expression: session.slice(node).to_string(),
        name: operator.as_str().to_string(),
        arguments,
        start: session.start(node),
    }))
}

/// Converts a bare identifier into a field path.
fn parse_identifier(
    node: &SyntaxNode,
    session: &ParseSession,
) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::Identifier { name } = &node.kind else {
        unreachable!("dispatched as identifier");
    };

    Ok(TokenExpression::Shorthand(ShorthandToken::new(
        name.clone(),
        session.start(node),
    )))
}

/// Converts a literal: strings become constants, everything else a
/// primitive constant.
fn parse_literal(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::Literal { value } = &node.kind else {
        unreachable!("dispatched as literal");
    };

    Ok(match value {
        LiteralValue::Str(s) => {
            TokenExpression::Constant(ConstantToken::new(s.clone(), session.start(node)))
        }
        LiteralValue::Number(n) => TokenExpression::PrimitiveConstant(PrimitiveConstantToken {
            expression: session.slice(node).to_string(),
            value: PrimitiveValue::Number(*n),
            start: session.start(node),
        }),
        LiteralValue::Bool(b) => TokenExpression::PrimitiveConstant(PrimitiveConstantToken {
            expression: session.slice(node).to_string(),
            value: PrimitiveValue::Bool(*b),
            start: session.start(node),
        }),
        LiteralValue::Null => TokenExpression::PrimitiveConstant(PrimitiveConstantToken {
            expression: session.slice(node).to_string(),
            value: PrimitiveValue::Null,
            start: session.start(node),
        }),
    })
}

/// Converts a member chain: pure identifier chains become shorthand
/// paths; anything else degrades to a function token over its source.
fn parse_member(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    match dotted_path(node) {
        Some(path) => Ok(TokenExpression::Shorthand(ShorthandToken::new(
            path,
            session.start(node),
        ))),
        None => parse_fallback(node, session),
    }
}

/// Converts an object literal.
fn parse_object(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::ObjectExpr { properties } = &node.kind else {
        unreachable!("dispatched as object expression");
    };

    let mut members = IndexMap::new();
    for (key, value) in properties {
        members.insert(key.clone(), session.parse_node(value)?);
    }

    Ok(TokenExpression::Object(ObjectToken {
        expression: session.slice(node).to_string(),
        members,
        start: session.start(node),
    }))
}

/// Converts an array literal.
fn parse_array(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let SyntaxKind::ArrayExpr { elements } = &node.kind else {
        unreachable!("dispatched as array expression");
    };

    let items = elements
        .iter()
        .map(|element| session.parse_node(element))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(TokenExpression::Array(ArrayToken {
        expression: session.slice(node).to_string(),
        items,
        start: session.start(node),
    }))
}

/// Fallback: the construct has no shorthand representation, so it
/// becomes a function token carrying its own source for the host to
/// evaluate.
fn parse_fallback(node: &SyntaxNode, session: &ParseSession) -> Result<TokenExpression, ParseError> {
    let expression = session.slice(node).to_string();
    Ok(TokenExpression::Function(FunctionToken {
        expression: expression.clone(),
        name: expression,
        arguments: Vec::new(),
        start: session.start(node),
    }))
}

/// Flattens a pure identifier/member chain into a dotted path.
fn dotted_path(node: &SyntaxNode) -> Option<String> {
    match &node.kind {
        SyntaxKind::Identifier { name } => Some(name.clone()),
        SyntaxKind::Member { object, property } => {
            let mut path = dotted_path(object)?;
            path.push('.');
            path.push_str(property);
            Some(path)
        }
        _ => None,
    }
}
