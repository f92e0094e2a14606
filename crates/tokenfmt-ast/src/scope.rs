//! Scope resolution contract and the static reference adapter.
//!
//! A scope is the runtime binding that supplies named values (and their
//! types) to an expression during evaluation. It is a capability the
//! *caller* provides per evaluation; the compiler and AST never hold a
//! scope beyond the call.
//!
//! # Design
//!
//! - `Scope` — the four operations the evaluators require
//! - `StaticScope` / `StaticObject` — an adapter over fully static
//!   nested data with explicit loaded/unloaded marks, used in tests and
//!   as the exemplar for wrapping host data objects
//!
//! Host object layers (an ORM, a record cache) satisfy the contract by
//! wrapping their data objects in an adapter rather than by exposing
//! ad-hoc duck-typed accessors.

use crate::error::{EvalError, EvalResult};
use crate::foundation::ExpressionType;
use crate::value::{Lookup, ScopeObject, Value};
use futures::future::BoxFuture;
use futures::FutureExt;
use indexmap::IndexMap;
use std::sync::Arc;

/// Evaluation target of a format string or token expression.
///
/// Paths are dotted member chains (`room.building.name`). The reserved
/// root literals `null`, `true` and `false` are handled by the
/// evaluator before a scope is consulted; implementations only see data
/// paths.
pub trait Scope: Send + Sync {
    /// Resolves a dotted path from already-cached data.
    ///
    /// Never triggers a fetch. Returns `Lookup::NotLoaded` as soon as
    /// any segment of the path depends on unfetched data, and
    /// `Lookup::Loaded(Value::Null)` for paths that resolve to nothing.
    fn get_value(&self, path: &str) -> Lookup;

    /// Resolves a dotted path, fetching missing relationships.
    ///
    /// An M-hop path may suspend up to M times, once per unfetched
    /// segment.
    fn get_value_future<'a>(&'a self, path: &'a str) -> BoxFuture<'a, EvalResult<Value>>;

    /// Reports the declared type of a dotted path, if known.
    ///
    /// Purely metadata; never fetches. Used to format resolved values.
    fn expression_type(&self, path: &str) -> Option<ExpressionType>;

    /// Evaluates a function expression (`$:`-token interior) in this
    /// scope.
    fn evaluate_function_expression<'a>(&'a self, expr: &'a str)
        -> BoxFuture<'a, EvalResult<Value>>;
}

/// Host function evaluator callback for [`StaticScope`].
pub type FunctionEvaluator = dyn Fn(&str) -> EvalResult<Value> + Send + Sync;

/// Entry in a [`StaticObject`]: a value plus its loaded mark.
#[derive(Clone)]
struct Entry {
    value: Value,
    loaded: bool,
}

/// Static nested data object with per-member loaded marks.
///
/// The async accessors always succeed (simulating a fetch); the cached
/// accessors yield `Lookup::NotLoaded` for members marked unloaded.
#[derive(Clone, Default)]
pub struct StaticObject {
    type_name: String,
    display: Option<String>,
    entries: IndexMap<String, Entry>,
}

impl StaticObject {
    /// Creates an empty object of the given type.
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            display: None,
            entries: IndexMap::new(),
        }
    }

    /// Sets the object's own display string.
    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Adds a loaded member value.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(
            name.into(),
            Entry {
                value: value.into(),
                loaded: true,
            },
        );
        self
    }

    /// Adds a loaded relationship member.
    pub fn with_object(mut self, name: impl Into<String>, object: StaticObject) -> Self {
        self.with_value(name, Value::Object(Arc::new(object)))
    }

    /// Adds a member that is only reachable through the async accessor.
    ///
    /// The cached accessor reports `NotLoaded` for it; the future
    /// accessor yields the value as if it had been fetched.
    pub fn with_unloaded(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.entries.insert(
            name.into(),
            Entry {
                value: value.into(),
                loaded: false,
            },
        );
        self
    }

    /// Adds a relationship member that requires a fetch.
    pub fn with_unloaded_object(mut self, name: impl Into<String>, object: StaticObject) -> Self {
        self.with_unloaded(name, Value::Object(Arc::new(object)))
    }
}

impl ScopeObject for StaticObject {
    fn type_name(&self) -> &str {
        &self.type_name
    }

    fn display_cached(&self) -> Lookup {
        match &self.display {
            Some(display) => Lookup::Loaded(Value::String(display.clone())),
            None => Lookup::NotLoaded,
        }
    }

    fn display_future(&self) -> BoxFuture<'_, EvalResult<String>> {
        async move {
            match &self.display {
                Some(display) => Ok(display.clone()),
                None => Ok(String::new()),
            }
        }
        .boxed()
    }

    fn get_cached(&self, name: &str) -> Lookup {
        match self.entries.get(name) {
            Some(entry) if entry.loaded => Lookup::Loaded(entry.value.clone()),
            Some(_) => Lookup::NotLoaded,
            None => Lookup::Loaded(Value::Null),
        }
    }

    fn get_future<'a>(&'a self, name: &'a str) -> BoxFuture<'a, EvalResult<Value>> {
        async move {
            match self.entries.get(name) {
                Some(entry) => Ok(entry.value.clone()),
                None => Ok(Value::Null),
            }
        }
        .boxed()
    }
}

/// Scope over a single root [`StaticObject`].
#[derive(Clone, Default)]
pub struct StaticScope {
    root: StaticObject,
    types: IndexMap<String, ExpressionType>,
    functions: Option<Arc<FunctionEvaluator>>,
}

impl StaticScope {
    /// Creates a scope around a root object.
    pub fn new(root: StaticObject) -> Self {
        Self {
            root,
            types: IndexMap::new(),
            functions: None,
        }
    }

    /// Declares the type of a dotted path for formatting and
    /// validation.
    pub fn with_type(mut self, path: impl Into<String>, ty: ExpressionType) -> Self {
        self.types.insert(path.into(), ty);
        self
    }

    /// Installs a host callback for function-expression evaluation.
    pub fn with_function_evaluator(
        mut self,
        evaluator: impl Fn(&str) -> EvalResult<Value> + Send + Sync + 'static,
    ) -> Self {
        self.functions = Some(Arc::new(evaluator));
        self
    }

    /// Walks one segment synchronously from a resolved value.
    fn step_cached(current: &Value, segment: &str) -> Lookup {
        match current {
            Value::Object(object) => object.get_cached(segment),
            Value::Map(members) => {
                Lookup::Loaded(members.get(segment).cloned().unwrap_or(Value::Null))
            }
            // Member access on a primitive resolves to nothing.
            _ => Lookup::Loaded(Value::Null),
        }
    }
}

impl Scope for StaticScope {
    fn get_value(&self, path: &str) -> Lookup {
        let mut current = Value::Object(Arc::new(self.root.clone()));
        for segment in path.split('.') {
            match Self::step_cached(&current, segment) {
                Lookup::Loaded(next) => current = next,
                Lookup::NotLoaded => return Lookup::NotLoaded,
            }
        }
        Lookup::Loaded(current)
    }

    fn get_value_future<'a>(&'a self, path: &'a str) -> BoxFuture<'a, EvalResult<Value>> {
        async move {
            let mut current = Value::Object(Arc::new(self.root.clone()));
            for segment in path.split('.') {
                current = match &current {
                    Value::Object(object) => object.get_future(segment).await?,
                    Value::Map(members) => {
                        members.get(segment).cloned().unwrap_or(Value::Null)
                    }
                    _ => Value::Null,
                };
            }
            Ok(current)
        }
        .boxed()
    }

    fn expression_type(&self, path: &str) -> Option<ExpressionType> {
        self.types.get(path).cloned()
    }

    fn evaluate_function_expression<'a>(
        &'a self,
        expr: &'a str,
    ) -> BoxFuture<'a, EvalResult<Value>> {
        async move {
            match &self.functions {
                Some(evaluator) => evaluator(expr),
                None => Err(EvalError::scope(
                    expr,
                    "scope does not support function expressions",
                )),
            }
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn building() -> StaticObject {
        StaticObject::new("building")
            .with_display("HQ")
            .with_value("name", "HQ")
    }

    fn room() -> StaticObject {
        StaticObject::new("room")
            .with_display("Room 1")
            .with_value("name", "Room 1")
            .with_object("building", building())
    }

    #[test]
    fn test_cached_path_walk() {
        let scope = StaticScope::new(StaticObject::new("scope").with_object("room", room()));
        let Lookup::Loaded(Value::String(name)) = scope.get_value("room.building.name") else {
            panic!("expected loaded string");
        };
        assert_eq!(name, "HQ");
    }

    #[test]
    fn test_unloaded_member_is_sentinel() {
        let scope = StaticScope::new(
            StaticObject::new("scope").with_unloaded_object("room", room()),
        );
        assert!(matches!(scope.get_value("room.name"), Lookup::NotLoaded));
    }

    #[test]
    fn test_missing_member_is_null_not_sentinel() {
        let scope = StaticScope::new(StaticObject::new("scope").with_object("room", room()));
        assert!(matches!(
            scope.get_value("room.missing"),
            Lookup::Loaded(Value::Null)
        ));
    }

    #[tokio::test]
    async fn test_future_path_fetches_unloaded() {
        let scope = StaticScope::new(
            StaticObject::new("scope").with_unloaded_object("room", room()),
        );
        let value = scope.get_value_future("room.building.name").await.unwrap();
        assert_eq!(value, Value::String("HQ".into()));
    }

    #[tokio::test]
    async fn test_function_evaluator_hook() {
        let scope = StaticScope::new(StaticObject::new("scope"))
            .with_function_evaluator(|expr| Ok(Value::String(format!("fn:{expr}"))));
        let value = scope
            .evaluate_function_expression("upper(name)")
            .await
            .unwrap();
        assert_eq!(value, Value::String("fn:upper(name)".into()));
    }
}
