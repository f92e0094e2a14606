//! Structural validation of compiled format strings.
//!
//! Checks every shorthand token's path against the type graph without
//! fetching any data. Issues are collected and returned, never thrown:
//! a format string with errors still evaluates (the offending token
//! degrades at runtime), so validation is advisory for schema tooling.

use crate::schema::{Member, TypeRegistry};
use tokenfmt_ast::{FormatString, TokenExpression, ValidationIssue};

/// Reserved path roots with fixed meanings; always structurally valid.
const RESERVED_ROOTS: [&str; 3] = ["null", "true", "false"];

/// Validates every token of a format string against a root type.
///
/// Produces one positioned issue per problem: an error for a path
/// segment the type graph does not know, and a warning for the
/// deprecated leading `?` marker or a legacy function reference.
pub fn validate(
    format: &FormatString,
    registry: &TypeRegistry,
    root_type: &str,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    for token in format.tokens() {
        validate_token(token, registry, root_type, &mut issues);
    }
    issues
}

fn validate_token(
    token: &TokenExpression,
    registry: &TypeRegistry,
    root_type: &str,
    issues: &mut Vec<ValidationIssue>,
) {
    match token {
        TokenExpression::Shorthand(_) | TokenExpression::FormatShorthand(_) => {
            if token.expression().starts_with('?') {
                issues.push(ValidationIssue::warning(
                    format!(
                        "deprecated optional marker `?` in `{}`",
                        token.expression()
                    ),
                    token.start(),
                ));
            }
            if let Some(path) = token.shorthand_path() {
                validate_path(path, registry, root_type, token.start(), issues);
            }
        }
        TokenExpression::LegacyFunction(legacy) => {
            issues.push(ValidationIssue::warning(
                format!(
                    "legacy function reference `{}` cannot be evaluated; use the `$:` prefix",
                    legacy.expression
                ),
                legacy.start,
            ));
        }
        TokenExpression::Function(function) => {
            // Shorthand arguments are paths into the same scope and are
            // checked like top-level shorthands.
            for argument in &function.arguments {
                validate_token(argument, registry, root_type, issues);
            }
        }
        TokenExpression::Object(object) => {
            for member in object.members.values() {
                validate_token(member, registry, root_type, issues);
            }
        }
        TokenExpression::Array(array) => {
            for item in &array.items {
                validate_token(item, registry, root_type, issues);
            }
        }
        TokenExpression::Constant(_) | TokenExpression::PrimitiveConstant(_) => {}
    }
}

/// Walks one dotted path through the type graph.
fn validate_path(
    path: &str,
    registry: &TypeRegistry,
    root_type: &str,
    start: Option<usize>,
    issues: &mut Vec<ValidationIssue>,
) {
    let mut segments = path.split('.').peekable();
    let first = match segments.peek() {
        Some(first) => *first,
        None => return,
    };
    if RESERVED_ROOTS.contains(&first) {
        return;
    }

    let Some(mut current) = registry.get(root_type) else {
        issues.push(ValidationIssue::error(
            format!("unknown root type `{root_type}`"),
            start,
        ));
        return;
    };

    while let Some(segment) = segments.next() {
        match current.member(segment) {
            None => {
                issues.push(ValidationIssue::error(
                    format!(
                        "`{segment}` is not a member of type `{}` (in `{path}`)",
                        current.name
                    ),
                    start,
                ));
                return;
            }
            Some(Member::Attribute(_)) => {
                if segments.peek().is_some() {
                    issues.push(ValidationIssue::error(
                        format!(
                            "`{segment}` on type `{}` is an attribute and has no members (in `{path}`)",
                            current.name
                        ),
                        start,
                    ));
                    return;
                }
            }
            Some(Member::Relationship(target)) => {
                if segments.peek().is_none() {
                    return;
                }
                match registry.get(target) {
                    Some(descriptor) => current = descriptor,
                    None => {
                        issues.push(ValidationIssue::error(
                            format!("relationship `{segment}` points at unregistered type `{target}`"),
                            start,
                        ));
                        return;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::TypeDescriptor;
    use tokenfmt_ast::{AttributeType, Severity};
    use tokenfmt_parser::format_string::compile;
    use tokenfmt_parser::TokenExpressionParser;

    fn registry() -> TypeRegistry {
        TypeRegistry::new()
            .with_type(
                TypeDescriptor::new("room")
                    .with_attribute("name", AttributeType::Text)
                    .with_relationship("building", "building"),
            )
            .with_type(
                TypeDescriptor::new("building").with_attribute("name", AttributeType::Text),
            )
    }

    fn check(source: &str) -> Vec<ValidationIssue> {
        let parser = TokenExpressionParser::new();
        let format = compile(source, &parser).expect("compile failed");
        validate(&format, &registry(), "room")
    }

    #[test]
    fn test_valid_paths_produce_no_issues() {
        assert!(check("{name} ({building.name})").is_empty());
    }

    #[test]
    fn test_unknown_member_is_positioned_error() {
        let issues = check("x {color}");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        assert_eq!(issues[0].start, Some(3));
    }

    #[test]
    fn test_member_access_on_attribute_is_error() {
        let issues = check("{name.length}");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
    }

    #[test]
    fn test_optional_marker_is_warning_only() {
        let issues = check("{?building.name}");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_reserved_roots_are_valid() {
        assert!(check("{null}{true}{false}").is_empty());
    }

    #[test]
    fn test_legacy_function_is_warning() {
        let issues = check("{substring(name, 0, 3)}");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Warning);
    }

    #[test]
    fn test_function_arguments_are_checked() {
        let issues = check("{$:concat(name, color)}");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, Severity::Error);
        // The bad argument is positioned where `color` sits in the
        // format string, not inside the `$:` fragment.
        assert_eq!(issues[0].start, Some(16));
    }
}
