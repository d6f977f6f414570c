//! The type model shared by the compiler, inference and the schema algebra.
//!
//! A [`Schema`] is a closed tagged union ([`SchemaKind`]) plus a bag of
//! non-structural [`Annotations`] (title, description, examples, bounds, ...).
//! Every node also carries a process-unique [`NodeId`]. The id is identity
//! only: it is never serialized and never takes part in structural equality,
//! so document bookkeeping can key off it without leaking into the schema.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use serde_json::Value;

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a schema node.
///
/// Cloning a [`Schema`] keeps its id; every constructor allocates a new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocate a new, never before seen id.
    pub fn fresh() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw numeric value.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Non-structural keywords attached to a schema node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotations(IndexMap<String, Value>);

impl Annotations {
    /// Key under which inferred schemas record the observed value.
    pub const EXAMPLE: &'static str = "example";

    /// Key for a list of example values.
    pub const EXAMPLES: &'static str = "examples";

    /// Create an empty annotation set.
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    /// Look up an annotation.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Set an annotation, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(key.into(), value)
    }

    /// Remove an annotation.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    /// Whether the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of annotations.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no annotations are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// The single `example` value, if any.
    pub fn example(&self) -> Option<&Value> {
        self.get(Self::EXAMPLE)
    }

    /// The `examples` value, if any.
    pub fn examples(&self) -> Option<&Value> {
        self.get(Self::EXAMPLES)
    }
}

impl FromIterator<(String, Value)> for Annotations {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for Annotations {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Scalar JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    /// Any string.
    String,
    /// Any number.
    Number,
    /// An integral number.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// `null`.
    Null,
}

impl PrimitiveKind {
    /// JSON Schema type name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }

    /// Parse a JSON Schema type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "null" => Some(Self::Null),
            _ => None,
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An object property.
#[derive(Debug, Clone)]
pub struct Property {
    /// Schema of the property value.
    pub schema: Schema,
    /// Whether the property must be present.
    pub required: bool,
}

/// Object shape.
#[derive(Debug, Clone, Default)]
pub struct ObjectType {
    /// Declared properties, in declaration order.
    pub properties: IndexMap<String, Property>,
    /// Whether keys outside `properties` are allowed.
    pub additional_properties: bool,
}

impl ObjectType {
    /// An object that accepts undeclared keys.
    pub fn open() -> Self {
        Self {
            properties: IndexMap::new(),
            additional_properties: true,
        }
    }

    /// An object that rejects undeclared keys.
    pub fn closed() -> Self {
        Self {
            properties: IndexMap::new(),
            additional_properties: false,
        }
    }

    /// Add a required property.
    #[must_use]
    pub fn property(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(
            name.into(),
            Property {
                schema,
                required: true,
            },
        );
        self
    }

    /// Add an optional property.
    #[must_use]
    pub fn optional(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.properties.insert(
            name.into(),
            Property {
                schema,
                required: false,
            },
        );
        self
    }

    /// Names of the required properties, in declaration order.
    pub fn required_names(&self) -> impl Iterator<Item = &str> {
        self.properties
            .iter()
            .filter(|(_, p)| p.required)
            .map(|(name, _)| name.as_str())
    }
}

/// Item schema(s) of an array.
#[derive(Debug, Clone)]
pub enum ArrayItems {
    /// Every element matches one schema.
    Single(Box<Schema>),
    /// Element `i` matches schema `i`; trailing elements are unconstrained.
    Tuple(Vec<Schema>),
}

/// Array shape.
#[derive(Debug, Clone)]
pub struct ArrayType {
    /// Item schema(s).
    pub items: ArrayItems,
    /// Lower length bound.
    pub min_items: Option<u64>,
    /// Upper length bound.
    pub max_items: Option<u64>,
}

/// `anyOf` / `oneOf`.
#[derive(Debug, Clone)]
pub struct UnionType {
    /// Members, in order.
    pub members: Vec<Schema>,
    /// `oneOf` semantics: exactly one member may match.
    pub exclusive: bool,
}

/// The closed set of schema shapes.
#[derive(Debug, Clone)]
pub enum SchemaKind {
    /// A scalar type.
    Primitive(PrimitiveKind),
    /// Exactly one scalar value.
    Literal(Value),
    /// One of a fixed list of scalar values.
    Enum(Vec<Value>),
    /// An object.
    Object(ObjectType),
    /// An array.
    Array(ArrayType),
    /// At least one (or exactly one) member matches.
    Union(UnionType),
    /// Every member matches.
    Intersect(Vec<Schema>),
    /// The inner schema must not match.
    Not(Box<Schema>),
    /// Anything.
    Unknown,
}

impl SchemaKind {
    /// Short name used in diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Primitive(_) => "primitive",
            Self::Literal(_) => "literal",
            Self::Enum(_) => "enum",
            Self::Object(_) => "object",
            Self::Array(_) => "array",
            Self::Union(_) => "union",
            Self::Intersect(_) => "intersect",
            Self::Not(_) => "not",
            Self::Unknown => "unknown",
        }
    }
}

/// A schema node.
#[derive(Debug, Clone)]
pub struct Schema {
    id: NodeId,
    /// The structural shape.
    pub kind: SchemaKind,
    /// Non-structural keywords.
    pub annotations: Annotations,
}

impl Schema {
    /// Create a node with a fresh id and no annotations.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            id: NodeId::fresh(),
            kind,
            annotations: Annotations::new(),
        }
    }

    /// Identity of this node.
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Give this node a new identity. Used when a rewrite produces content
    /// that must not inherit the references recorded for the original.
    #[must_use]
    pub fn renewed(mut self) -> Self {
        self.id = NodeId::fresh();
        self
    }

    /// Replace the annotations.
    #[must_use]
    pub fn with_annotations(mut self, annotations: Annotations) -> Self {
        self.annotations = annotations;
        self
    }

    /// Set a single annotation.
    #[must_use]
    pub fn with_annotation(mut self, key: impl Into<String>, value: Value) -> Self {
        self.annotations.insert(key, value);
        self
    }

    /// Attach an `example` annotation.
    #[must_use]
    pub fn with_example(self, example: Value) -> Self {
        self.with_annotation(Annotations::EXAMPLE, example)
    }

    /// A primitive node.
    pub fn primitive(kind: PrimitiveKind) -> Self {
        Self::new(SchemaKind::Primitive(kind))
    }

    /// `{"type": "string"}`.
    pub fn string() -> Self {
        Self::primitive(PrimitiveKind::String)
    }

    /// `{"type": "number"}`.
    pub fn number() -> Self {
        Self::primitive(PrimitiveKind::Number)
    }

    /// `{"type": "integer"}`.
    pub fn integer() -> Self {
        Self::primitive(PrimitiveKind::Integer)
    }

    /// `{"type": "boolean"}`.
    pub fn boolean() -> Self {
        Self::primitive(PrimitiveKind::Boolean)
    }

    /// `{"type": "null"}`.
    pub fn null() -> Self {
        Self::primitive(PrimitiveKind::Null)
    }

    /// A single-value schema.
    pub fn literal(value: Value) -> Self {
        Self::new(SchemaKind::Literal(value))
    }

    /// A fixed value list.
    pub fn enumeration(values: Vec<Value>) -> Self {
        Self::new(SchemaKind::Enum(values))
    }

    /// An object node.
    pub fn object(object: ObjectType) -> Self {
        Self::new(SchemaKind::Object(object))
    }

    /// An unbounded list of `items`.
    pub fn array(items: Schema) -> Self {
        Self::new(SchemaKind::Array(ArrayType {
            items: ArrayItems::Single(Box::new(items)),
            min_items: None,
            max_items: None,
        }))
    }

    /// A positional array.
    pub fn tuple(items: Vec<Schema>, min_items: Option<u64>, max_items: Option<u64>) -> Self {
        Self::new(SchemaKind::Array(ArrayType {
            items: ArrayItems::Tuple(items),
            min_items,
            max_items,
        }))
    }

    /// `anyOf`.
    pub fn union(members: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Union(UnionType {
            members,
            exclusive: false,
        }))
    }

    /// `oneOf`.
    pub fn one_of(members: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Union(UnionType {
            members,
            exclusive: true,
        }))
    }

    /// `allOf`.
    pub fn intersect(members: Vec<Schema>) -> Self {
        Self::new(SchemaKind::Intersect(members))
    }

    /// `not`.
    pub fn not(inner: Schema) -> Self {
        Self::new(SchemaKind::Not(Box::new(inner)))
    }

    /// Accepts anything.
    pub fn unknown() -> Self {
        Self::new(SchemaKind::Unknown)
    }

    /// An `Unknown` that re-emits `fragment` verbatim. Used for document
    /// fragments the compiler cannot model.
    pub fn opaque(fragment: &Value) -> Self {
        let annotations = match fragment {
            Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            _ => Annotations::new(),
        };
        Self::unknown().with_annotations(annotations)
    }

    /// The object shape, if this is an object.
    pub const fn as_object(&self) -> Option<&ObjectType> {
        match &self.kind {
            SchemaKind::Object(object) => Some(object),
            _ => None,
        }
    }

    /// Union members, if this is a union.
    pub fn union_members(&self) -> Option<&[Schema]> {
        match &self.kind {
            SchemaKind::Union(union) => Some(&union.members),
            _ => None,
        }
    }

    /// Intersection members, if this is an intersection.
    pub fn intersect_members(&self) -> Option<&[Schema]> {
        match &self.kind {
            SchemaKind::Intersect(members) => Some(members),
            _ => None,
        }
    }

    /// Whether this is [`SchemaKind::Unknown`].
    pub const fn is_unknown(&self) -> bool {
        matches!(self.kind, SchemaKind::Unknown)
    }
}
