//! Field rules and schemas.
//!
//! A [`Schema`] is an ordered list of field names, each bound to a
//! [`FieldRule`]. Rules are built fluently from [`Toolkit`], which is what
//! entity schema builders receive:
//!
//! ```ignore
//! let schema = Schema::new()
//!     .field("name", toolkit.string().required().min(1))
//!     .field("tags", toolkit.array_of(toolkit.string()))
//!     .field("age", toolkit.integer().min(0.0));
//! ```

use serde_json::Value;

/// The value shape a rule accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleKind {
    Any,
    String,
    Integer,
    Number,
    Boolean,
    /// Array, optionally with a rule every item must satisfy.
    Array(Option<Box<FieldRule>>),
    /// Object, optionally with a nested schema.
    Object(Option<Schema>),
}

impl RuleKind {
    pub fn describe(&self) -> &'static str {
        match self {
            RuleKind::Any => "any",
            RuleKind::String => "a string",
            RuleKind::Integer => "an integer",
            RuleKind::Number => "a number",
            RuleKind::Boolean => "a boolean",
            RuleKind::Array(_) => "an array",
            RuleKind::Object(_) => "an object",
        }
    }
}

/// Validation rule for a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub kind: RuleKind,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<Value>,
    /// Lower bound: string length, numeric value or array length.
    pub min: Option<f64>,
    /// Upper bound: string length, numeric value or array length.
    pub max: Option<f64>,
    /// Closed set of accepted values.
    pub allowed: Option<Vec<Value>>,
}

impl FieldRule {
    pub fn new(kind: RuleKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: false,
            default: None,
            min: None,
            max: None,
            allowed: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Accept an explicit `null`.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value filled in when the field is absent.
    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn min(mut self, min: impl Into<f64>) -> Self {
        self.min = Some(min.into());
        self
    }

    pub fn max(mut self, max: impl Into<f64>) -> Self {
        self.max = Some(max.into());
        self
    }

    pub fn valid<I, V>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.allowed = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Ordered field name to rule mapping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<(String, FieldRule)>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a field. Replacing keeps the original position.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = rule,
            None => self.fields.push((name, rule)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rule)| rule)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn keys(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldRule)> {
        self.fields.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Rule constructors handed to schema builders.
#[derive(Debug, Clone, Copy, Default)]
pub struct Toolkit;

impl Toolkit {
    pub fn any(&self) -> FieldRule {
        FieldRule::new(RuleKind::Any)
    }

    pub fn string(&self) -> FieldRule {
        FieldRule::new(RuleKind::String)
    }

    pub fn integer(&self) -> FieldRule {
        FieldRule::new(RuleKind::Integer)
    }

    pub fn number(&self) -> FieldRule {
        FieldRule::new(RuleKind::Number)
    }

    pub fn boolean(&self) -> FieldRule {
        FieldRule::new(RuleKind::Boolean)
    }

    pub fn array(&self) -> FieldRule {
        FieldRule::new(RuleKind::Array(None))
    }

    pub fn array_of(&self, item: FieldRule) -> FieldRule {
        FieldRule::new(RuleKind::Array(Some(Box::new(item))))
    }

    pub fn object(&self) -> FieldRule {
        FieldRule::new(RuleKind::Object(None))
    }

    pub fn object_with(&self, schema: Schema) -> FieldRule {
        FieldRule::new(RuleKind::Object(Some(schema)))
    }
}
