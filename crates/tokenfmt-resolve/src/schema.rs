//! Type-graph metadata the structural passes resolve against.
//!
//! A [`TypeRegistry`] is the static description of the host's object
//! model: named types, their attribute members, and their
//! relationships to other types. It carries no data — validation and
//! preload extraction are purely structural and never fetch.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tokenfmt_ast::{AttributeType, ExpressionType};

/// A single member of a type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Member {
    /// Scalar attribute with a declared value type.
    Attribute(AttributeType),
    /// Relationship to another registered type, by name.
    Relationship(String),
}

/// Static description of one type in the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Type name, unique within a registry
    pub name: String,
    /// Display-format source used when an instance renders as a label
    pub display_format: Option<String>,
    /// Members in declaration order
    pub members: IndexMap<String, Member>,
}

impl TypeDescriptor {
    /// Creates an empty descriptor.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_format: None,
            members: IndexMap::new(),
        }
    }

    /// Sets the display format.
    pub fn with_display_format(mut self, format: impl Into<String>) -> Self {
        self.display_format = Some(format.into());
        self
    }

    /// Adds a scalar attribute member.
    pub fn with_attribute(mut self, name: impl Into<String>, ty: AttributeType) -> Self {
        self.members.insert(name.into(), Member::Attribute(ty));
        self
    }

    /// Adds a relationship member.
    pub fn with_relationship(
        mut self,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        self.members
            .insert(name.into(), Member::Relationship(target.into()));
        self
    }

    /// Looks up a member by name.
    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.get(name)
    }
}

/// All registered types of a host object model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a type, replacing any previous descriptor of the same
    /// name.
    pub fn register(&mut self, descriptor: TypeDescriptor) {
        self.types.insert(descriptor.name.clone(), descriptor);
    }

    /// Registers a type, builder style.
    pub fn with_type(mut self, descriptor: TypeDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    /// Looks up a type by name.
    pub fn get(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Resolves a dotted path from a root type to the declared type of
    /// its final segment.
    ///
    /// Returns `None` when any segment is unknown or when a scalar
    /// attribute appears before the final segment.
    pub fn expression_type(&self, root_type: &str, path: &str) -> Option<ExpressionType> {
        let mut current = self.get(root_type)?;
        let mut segments = path.split('.').peekable();

        while let Some(segment) = segments.next() {
            match current.member(segment)? {
                Member::Attribute(ty) => {
                    if segments.peek().is_some() {
                        return None;
                    }
                    return Some(ExpressionType::Attribute(*ty));
                }
                Member::Relationship(target) => {
                    if segments.peek().is_none() {
                        return Some(ExpressionType::Relationship(target.clone()));
                    }
                    current = self.get(target)?;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    #[test]
    fn test_resolve_attribute() {
        let registry = registry();
        assert_eq!(
            registry.expression_type("room", "area"),
            Some(ExpressionType::Attribute(AttributeType::Number))
        );
    }

    #[test]
    fn test_resolve_through_relationship() {
        let registry = registry();
        assert_eq!(
            registry.expression_type("room", "building.name"),
            Some(ExpressionType::Attribute(AttributeType::Text))
        );
        assert_eq!(
            registry.expression_type("room", "building"),
            Some(ExpressionType::Relationship("building".into()))
        );
    }

    #[test]
    fn test_unknown_member_is_none() {
        let registry = registry();
        assert_eq!(registry.expression_type("room", "color"), None);
        assert_eq!(registry.expression_type("room", "building.floors"), None);
    }

    #[test]
    fn test_attribute_before_final_segment_is_none() {
        let registry = registry();
        assert_eq!(registry.expression_type("room", "name.length"), None);
    }
}
