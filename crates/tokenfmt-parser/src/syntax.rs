//! Generic syntax tree produced by the JS-subset grammar.
//!
//! The grammar parses into this untyped tree first; a per-node-kind
//! dispatch registry then converts nodes into `TokenExpression`
//! variants. Keeping the two stages separate mirrors how the contextual
//! transforms work: context only affects the conversion, never the
//! grammar.

use std::ops::Range;

/// Syntax node with its byte span in the transformed source.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntaxNode {
    /// Node payload
    pub kind: SyntaxKind,
    /// Byte span in the transformed expression source
    pub span: Range<usize>,
}

impl SyntaxNode {
    /// Creates a node.
    pub fn new(kind: SyntaxKind, span: Range<usize>) -> Self {
        Self { kind, span }
    }

    /// The dispatch tag of this node.
    pub fn tag(&self) -> NodeTag {
        match &self.kind {
            SyntaxKind::Block { .. } => NodeTag::Block,
            SyntaxKind::FormatAssignment { .. } => NodeTag::FormatAssignment,
            SyntaxKind::Call { .. } => NodeTag::Call,
            SyntaxKind::Conditional { .. } => NodeTag::Conditional,
            SyntaxKind::Logical { .. } => NodeTag::Logical,
            SyntaxKind::Binary { .. } => NodeTag::Binary,
            SyntaxKind::Unary { .. } => NodeTag::Unary,
            SyntaxKind::Identifier { .. } => NodeTag::Identifier,
            SyntaxKind::Literal { .. } => NodeTag::Literal,
            SyntaxKind::Member { .. } => NodeTag::Member,
            SyntaxKind::ObjectExpr { .. } => NodeTag::ObjectExpr,
            SyntaxKind::ArrayExpr { .. } => NodeTag::ArrayExpr,
        }
    }
}

/// Node payload variants.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxKind {
    /// Statement block: the wrapped form every fragment parses into
    Block { statements: Vec<SyntaxNode> },
    /// Synthetic `$format = "spec"` statement introduced by the
    /// format-specifier transformer
    FormatAssignment { specifier: String },
    /// Call expression
    Call {
        callee: Box<SyntaxNode>,
        arguments: Vec<SyntaxNode>,
    },
    /// Conditional (ternary) expression
    Conditional {
        test: Box<SyntaxNode>,
        consequent: Box<SyntaxNode>,
        alternate: Box<SyntaxNode>,
    },
    /// Logical expression (`&&`, `||`)
    Logical {
        operator: LogicalOp,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// Arithmetic or comparison expression
    Binary {
        operator: &'static str,
        left: Box<SyntaxNode>,
        right: Box<SyntaxNode>,
    },
    /// Unary expression (`!`, `-`)
    Unary {
        operator: &'static str,
        argument: Box<SyntaxNode>,
    },
    /// Bare identifier
    Identifier { name: String },
    /// Literal value
    Literal { value: LiteralValue },
    /// Member access (`object.property`)
    Member {
        object: Box<SyntaxNode>,
        property: String,
    },
    /// Object literal
    ObjectExpr {
        properties: Vec<(String, SyntaxNode)>,
    },
    /// Array literal
    ArrayExpr { elements: Vec<SyntaxNode> },
}

/// Logical operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    /// `&&`
    And,
    /// `||`
    Or,
}

impl LogicalOp {
    /// Source spelling of the operator.
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "&&",
            LogicalOp::Or => "||",
        }
    }
}

/// Literal payload.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// `null`
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(f64),
    /// String literal (unescaped content)
    Str(String),
}

/// Dispatch tag: one per syntax-node kind.
///
/// The conversion registry maps tags to node parsers; an unregistered
/// tag is a fatal "no parser for node type" error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeTag {
    Block,
    FormatAssignment,
    Call,
    Conditional,
    Logical,
    Binary,
    Unary,
    Identifier,
    Literal,
    Member,
    ObjectExpr,
    ArrayExpr,
}

impl NodeTag {
    /// Human-readable name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            NodeTag::Block => "BlockStatement",
            NodeTag::FormatAssignment => "FormatAssignment",
            NodeTag::Call => "CallExpression",
            NodeTag::Conditional => "ConditionalExpression",
            NodeTag::Logical => "LogicalExpression",
            NodeTag::Binary => "BinaryExpression",
            NodeTag::Unary => "UnaryExpression",
            NodeTag::Identifier => "Identifier",
            NodeTag::Literal => "Literal",
            NodeTag::Member => "MemberExpression",
            NodeTag::ObjectExpr => "ObjectExpression",
            NodeTag::ArrayExpr => "ArrayExpression",
        }
    }
}
