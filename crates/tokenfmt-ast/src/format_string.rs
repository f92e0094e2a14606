//! Compiled format string and its two evaluation strategies.

use crate::error::{EvalError, EvalResult};
use crate::scope::Scope;
use crate::token::TokenExpression;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A compiled display-format string: the raw source plus its ordered
/// token sequence.
///
/// Construction happens in the tokenizer (`tokenfmt-parser`); this type
/// owns evaluation. Concatenating `stringify()` of all tokens in order
/// reproduces the semantics of the source (round-trip of meaning, not
/// byte-identical escaping).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatString {
    expression: String,
    tokens: Vec<TokenExpression>,
}

impl FormatString {
    /// Assembles a compiled format string.
    pub fn new(expression: impl Into<String>, tokens: Vec<TokenExpression>) -> Self {
        Self {
            expression: expression.into(),
            tokens,
        }
    }

    /// The raw source this format string was compiled from.
    pub fn source(&self) -> &str {
        &self.expression
    }

    /// The ordered token sequence.
    pub fn tokens(&self) -> &[TokenExpression] {
        &self.tokens
    }

    /// True iff compilation reduced this string to exactly one constant
    /// token.
    ///
    /// Used to short-circuit evaluation for purely static strings.
    pub fn is_constant(&self) -> bool {
        matches!(
            self.tokens.as_slice(),
            [token] if token.is_constant()
        )
    }

    /// The constant value of a purely static format string.
    ///
    /// # Errors
    ///
    /// `EvalError::NotConstant` when the string has non-constant
    /// tokens.
    pub fn constant_value(&self) -> EvalResult<String> {
        match self.tokens.as_slice() {
            [TokenExpression::Constant(t)] => Ok(t.value.clone()),
            [token] if token.is_constant() => Ok(token.expression().to_string()),
            _ => Err(EvalError::NotConstant(self.expression.clone())),
        }
    }

    /// Best-effort synchronous evaluation against already-loaded data.
    ///
    /// Returns `None` for the *whole* string as soon as any shorthand
    /// token's dependency is not loaded — an all-or-nothing policy so
    /// UIs can distinguish "still loading" from "loaded and empty".
    /// Never fetches and never suspends.
    pub fn evaluate(&self, scope: &dyn Scope) -> Option<String> {
        let mut result = String::new();
        for token in &self.tokens {
            result.push_str(&token.display_cached(scope)?);
        }
        Some(result)
    }

    /// Fully asynchronous evaluation, fetching missing data through
    /// the scope.
    ///
    /// Sibling tokens are evaluated concurrently; the result string is
    /// always assembled in source token order.
    pub fn evaluate_future<'a>(&'a self, scope: &'a dyn Scope) -> BoxFuture<'a, EvalResult<String>> {
        async move {
            let segments = futures::future::try_join_all(
                self.tokens.iter().map(|token| token.display_future(scope)),
            )
            .await?;
            Ok(segments.concat())
        }
        .boxed()
    }

    /// Renders the token sequence back to format-string syntax.
    pub fn stringify(&self) -> String {
        self.tokens
            .iter()
            .map(TokenExpression::stringify)
            .collect::<Vec<_>>()
            .concat()
    }
}

impl fmt::Display for FormatString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expression)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::{StaticObject, StaticScope};
    use crate::token::{ConstantToken, ShorthandToken};

    fn constant(value: &str) -> TokenExpression {
        TokenExpression::Constant(ConstantToken::new(value, None))
    }

    fn shorthand(path: &str) -> TokenExpression {
        TokenExpression::Shorthand(ShorthandToken::new(path, None))
    }

    fn loaded_scope() -> StaticScope {
        StaticScope::new(
            StaticObject::new("scope").with_object(
                "room",
                StaticObject::new("room")
                    .with_display("Room 1")
                    .with_value("name", "Room 1")
                    .with_object(
                        "building",
                        StaticObject::new("building")
                            .with_display("HQ")
                            .with_value("name", "HQ"),
                    ),
            ),
        )
    }

    #[test]
    fn test_constant_short_circuit() {
        let fs = FormatString::new("just text", vec![constant("just text")]);
        assert!(fs.is_constant());
        assert_eq!(fs.constant_value().unwrap(), "just text");
    }

    #[test]
    fn test_constant_value_on_non_constant_is_error() {
        let fs = FormatString::new("{room}", vec![shorthand("room")]);
        assert!(!fs.is_constant());
        assert!(matches!(
            fs.constant_value(),
            Err(EvalError::NotConstant(_))
        ));
    }

    #[test]
    fn test_sync_evaluation() {
        let fs = FormatString::new(
            "{room.name} in {room.building.name}",
            vec![
                shorthand("room.name"),
                constant(" in "),
                shorthand("room.building.name"),
            ],
        );
        assert_eq!(fs.evaluate(&loaded_scope()), Some("Room 1 in HQ".into()));
    }

    #[test]
    fn test_not_loaded_sentinel_propagates_to_whole_string() {
        let scope = StaticScope::new(
            StaticObject::new("scope")
                .with_value("title", "T")
                .with_unloaded_object(
                    "room",
                    StaticObject::new("room").with_value("name", "Room 1"),
                ),
        );
        let fs = FormatString::new(
            "{title} {room.name}",
            vec![shorthand("title"), constant(" "), shorthand("room.name")],
        );
        // `title` alone is resolvable, but the whole string reports
        // "still loading".
        assert_eq!(fs.evaluate(&scope), None);
    }

    #[tokio::test]
    async fn test_sync_async_agreement_when_loaded() {
        let scope = loaded_scope();
        let fs = FormatString::new(
            "{room.name} in {room.building.name}",
            vec![
                shorthand("room.name"),
                constant(" in "),
                shorthand("room.building.name"),
            ],
        );
        let sync = fs.evaluate(&scope).unwrap();
        let async_ = fs.evaluate_future(&scope).await.unwrap();
        assert_eq!(sync, async_);
    }

    #[tokio::test]
    async fn test_async_assembles_in_source_order() {
        let fs = FormatString::new(
            "{room} {room.name} {room.building.name}",
            vec![
                shorthand("room"),
                constant(" "),
                shorthand("room.name"),
                constant(" "),
                shorthand("room.building.name"),
            ],
        );
        let result = fs.evaluate_future(&loaded_scope()).await.unwrap();
        assert_eq!(result, "Room 1 Room 1 HQ");
    }

    #[test]
    fn test_stringify_round_trip() {
        let fs = FormatString::new(
            "R{price:.2f}!",
            vec![
                constant("R"),
                TokenExpression::FormatShorthand(crate::token::FormatShorthandToken::new(
                    "price", ".2f", None,
                )),
                constant("!"),
            ],
        );
        assert_eq!(fs.stringify(), "R{price:.2f}!");
    }
}
