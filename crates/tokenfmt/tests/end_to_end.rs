//! End-to-end tests over the public facade.
//!
//! Exercises the whole pipeline as a host application would use it:
//! compile a display-format string, validate it against the type graph,
//! extract its preload plan, then evaluate it both synchronously and
//! asynchronously against a scope.

use tokenfmt::{
    compile, extract, validate, AttributeType, ExpressionType, Severity, StaticObject,
    StaticScope, TokenExpressionParser, TypeDescriptor, TypeRegistry, Value,
};

fn registry() -> TypeRegistry {
    TypeRegistry::new()
        .with_type(
            TypeDescriptor::new("room")
                .with_display_format("{name}")
                .with_attribute("name", AttributeType::Text)
                .with_attribute("area", AttributeType::Number)
                .with_relationship("building", "building"),
        )
        .with_type(
            TypeDescriptor::new("building")
                .with_display_format("{name}")
                .with_attribute("name", AttributeType::Text),
        )
}

fn scope() -> StaticScope {
    StaticScope::new(
        StaticObject::new("scope").with_object(
            "room",
            StaticObject::new("room")
                .with_display("Room 1")
                .with_value("name", "Room 1")
                .with_value("area", 12.5)
                .with_object(
                    "building",
                    StaticObject::new("building")
                        .with_display("HQ")
                        .with_value("name", "HQ"),
                ),
        ),
    )
}

#[tokio::test]
async fn test_relationship_rendering_prefers_display_strings() {
    let parser = TokenExpressionParser::new();
    let format = compile("{room} {room.name} {room.building.name}", &parser).expect("compile");

    let rendered = format.evaluate_future(&scope()).await.expect("evaluate");
    assert_eq!(rendered, "Room 1 Room 1 HQ");

    // Synchronous evaluation agrees once everything is loaded.
    assert_eq!(format.evaluate(&scope()), Some(rendered));
}

#[test]
fn test_sync_evaluation_is_all_or_nothing() {
    let parser = TokenExpressionParser::new();
    let format = compile("{room.name} ({room.building.name})", &parser).expect("compile");

    let partial = StaticScope::new(
        StaticObject::new("scope").with_object(
            "room",
            StaticObject::new("room")
                .with_value("name", "Room 1")
                .with_unloaded_object("building", StaticObject::new("building")),
        ),
    );
    assert_eq!(format.evaluate(&partial), None);
}

#[tokio::test]
async fn test_async_evaluation_fetches_what_sync_cannot_see() {
    let parser = TokenExpressionParser::new();
    let format = compile("{room.building.name}", &parser).expect("compile");

    let partial = StaticScope::new(
        StaticObject::new("scope").with_object(
            "room",
            StaticObject::new("room").with_unloaded_object(
                "building",
                StaticObject::new("building").with_value("name", "HQ"),
            ),
        ),
    );
    assert_eq!(format.evaluate(&partial), None);
    assert_eq!(
        format.evaluate_future(&partial).await.expect("evaluate"),
        "HQ"
    );
}

#[test]
fn test_preload_plan_names_what_sync_needs() {
    let parser = TokenExpressionParser::new();
    let format = compile("{name} ({building.name})", &parser).expect("compile");

    let plan = extract(&format, &registry(), "room", &parser);
    assert!(plan.get("building").is_some());
}

#[test]
fn test_validation_reports_unknown_members() {
    let parser = TokenExpressionParser::new();
    let format = compile("{name} {color}", &parser).expect("compile");

    let issues = validate(&format, &registry(), "room");
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].severity, Severity::Error);
}

#[test]
fn test_format_specifier_with_declared_number_type() {
    let parser = TokenExpressionParser::new();
    let format = compile("{room.area:.1f} m2", &parser).expect("compile");

    let scope = scope().with_type(
        "room.area",
        ExpressionType::Attribute(AttributeType::Number),
    );
    assert_eq!(format.evaluate(&scope), Some("12.5 m2".into()));
}

#[tokio::test]
async fn test_function_expression_delegates_to_scope() {
    let parser = TokenExpressionParser::new();
    let format = compile("{$:upper(room.name)}", &parser).expect("compile");

    let scope = scope().with_function_evaluator(|expr| {
        assert_eq!(expr, "upper(room.name)");
        Ok(Value::String("ROOM 1".into()))
    });
    assert_eq!(
        format.evaluate_future(&scope).await.expect("evaluate"),
        "ROOM 1"
    );
}

#[test]
fn test_function_token_degrades_synchronously() {
    let parser = TokenExpressionParser::new();
    let format = compile("{$:upper(room.name)}", &parser).expect("compile");

    // Without an async hop, the function token renders as its source.
    assert_eq!(format.evaluate(&scope()), Some("{$:upper(room.name)}".into()));
}

#[test]
fn test_escaped_braces_survive_the_pipeline() {
    let parser = TokenExpressionParser::new();
    let format = compile("{{room.name}} is literal", &parser).expect("compile");

    assert!(format.is_constant());
    assert_eq!(
        format.evaluate(&scope()),
        Some("{room.name} is literal".into())
    );
}

#[test]
fn test_reserved_literals_evaluate_without_scope_data() {
    let parser = TokenExpressionParser::new();
    let format = compile("{true}|{null}|{false}", &parser).expect("compile");

    let empty = StaticScope::new(StaticObject::new("scope"));
    assert_eq!(format.evaluate(&empty), Some("true||false".into()));
}
