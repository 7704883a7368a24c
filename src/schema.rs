//! Declarative payload validation.
//!
//! A [`Schema`] is a static list of [`FieldRule`]s. Validation is a pure
//! function: it returns the accepted fields (unknown ones stripped) or the
//! first rule that failed, in declaration order.

use serde_json::{Map, Value};

/// Type a field must have.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    /// A JSON string. `non_empty` rejects `""`.
    String { non_empty: bool },
    /// A JSON number with no fractional part.
    Integer,
    Boolean,
}

impl FieldKind {
    fn name(self) -> &'static str {
        match self {
            Self::String { .. } => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String { .. } => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// A named set of field rules for one resource.
#[derive(Clone, Copy, Debug)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [FieldRule],
}

/// Users need a non-empty `name`; `email` is optional.
pub const USER: Schema = Schema {
    name: "user",
    fields: &[
        FieldRule::required("name", FieldKind::String { non_empty: true }),
        FieldRule::optional("email", FieldKind::String { non_empty: false }),
    ],
};

/// Todos carry a single non-empty `message`.
pub const TODO: Schema = Schema {
    name: "todo",
    fields: &[FieldRule::required("message", FieldKind::String { non_empty: true })],
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("malformed JSON: {0}")]
    Malformed(String),

    #[error("expected a JSON object for {schema}")]
    NotAnObject { schema: &'static str },

    #[error("`{field}` is required")]
    Missing { field: &'static str },

    #[error("`{field}` must be a {expected}")]
    WrongType { field: &'static str, expected: &'static str },

    #[error("`{field}` must not be empty")]
    Empty { field: &'static str },
}

impl ValidationError {
    /// The offending field, when the failure is tied to one.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing { field } | Self::WrongType { field, .. } | Self::Empty { field } => {
                Some(field)
            }
            Self::Malformed(_) | Self::NotAnObject { .. } => None,
        }
    }
}

impl Schema {
    /// Decodes `body` as JSON and validates it.
    pub fn parse(&self, body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| ValidationError::Malformed(e.to_string()))?;
        self.validate(value)
    }

    /// Validates an already-decoded value, returning only the declared fields.
    pub fn validate(&self, value: Value) -> Result<Map<String, Value>, ValidationError> {
        let Value::Object(mut input) = value else {
            return Err(ValidationError::NotAnObject { schema: self.name });
        };

        let mut accepted = Map::new();
        for rule in self.fields {
            let value = match input.remove(rule.name) {
                None | Some(Value::Null) if rule.required => {
                    return Err(ValidationError::Missing { field: rule.name });
                }
                None | Some(Value::Null) => continue,
                Some(v) => v,
            };

            if !rule.kind.accepts(&value) {
                return Err(ValidationError::WrongType {
                    field: rule.name,
                    expected: rule.kind.name(),
                });
            }
            if let (FieldKind::String { non_empty: true }, Value::String(s)) = (rule.kind, &value) {
                if s.is_empty() {
                    return Err(ValidationError::Empty { field: rule.name });
                }
            }
            accepted.insert(rule.name.to_owned(), value);
        }
        Ok(accepted)
    }
}
