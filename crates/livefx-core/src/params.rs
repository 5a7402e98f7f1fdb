//! Parameter schemas and resolved parameter sets.
//!
//! A [`ParamSchema`] is a static, ordered list of named [`ParamSpec`]s. Hosts
//! hand in loosely typed JSON state; [`ParamSchema::resolve`] fills missing
//! keys from the declared defaults, coerces numbers to the declared kind and
//! rejects anything else with [`Error::SchemaViolation`].
//!
//! ```rust
//! use livefx_core::params::{ParamSchema, ParamSpec};
//! use serde_json::json;
//!
//! static SCHEMA: ParamSchema = ParamSchema::new(&[
//!     ("radius", ParamSpec::Real { default: 1.0 }),
//!     ("mode", ParamSpec::Enum { options: &["a", "b"], default: "a" }),
//! ]);
//!
//! let set = SCHEMA.resolve(&json!({ "radius": 3 })).unwrap();
//! assert_eq!(set.real("radius").unwrap(), 3.0);
//! assert_eq!(set.string("mode").unwrap(), "a");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{Error, Result};

/// Declared kind and default of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ParamSpec {
    Real { default: f64 },
    Int { default: i64 },
    Enum {
        options: &'static [&'static str],
        default: &'static str,
    },
    Bool { default: bool },
}

impl ParamSpec {
    /// Default value as a [`ParamValue`].
    pub fn default_value(&self) -> ParamValue {
        match *self {
            Self::Real { default } => ParamValue::Real(default),
            Self::Int { default } => ParamValue::Int(default),
            Self::Enum { default, .. } => ParamValue::String(default.to_string()),
            Self::Bool { default } => ParamValue::Bool(default),
        }
    }

    /// True for kinds that interpolate linearly.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Real { .. } | Self::Int { .. })
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Real { .. } => "real",
            Self::Int { .. } => "int",
            Self::Enum { .. } => "enum",
            Self::Bool { .. } => "bool",
        }
    }

    /// Coerces a JSON value to this kind.
    fn coerce(&self, field: &str, value: &Value) -> Result<ParamValue> {
        match self {
            Self::Real { .. } => value
                .as_f64()
                .map(ParamValue::Real)
                .ok_or_else(|| Error::schema(field, format!("expected number, got {value}"))),
            Self::Int { .. } => {
                if let Some(i) = value.as_i64() {
                    Ok(ParamValue::Int(i))
                } else if let Some(f) = value.as_f64().filter(|f| f.is_finite()) {
                    Ok(ParamValue::Int(f.round() as i64))
                } else {
                    Err(Error::schema(field, format!("expected integer, got {value}")))
                }
            }
            Self::Enum { options, .. } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| Error::schema(field, format!("expected string, got {value}")))?;
                if options.contains(&s) {
                    Ok(ParamValue::String(s.to_string()))
                } else {
                    Err(Error::schema(
                        field,
                        format!("unknown option '{s}', expected one of {options:?}"),
                    ))
                }
            }
            Self::Bool { .. } => value
                .as_bool()
                .map(ParamValue::Bool)
                .ok_or_else(|| Error::schema(field, format!("expected bool, got {value}"))),
        }
    }

    /// Checks that an already typed value fits this kind.
    fn check(&self, field: &str, value: &ParamValue) -> Result<()> {
        let ok = match (self, value) {
            (Self::Real { .. }, ParamValue::Real(_)) => true,
            (Self::Int { .. }, ParamValue::Int(_)) => true,
            (Self::Enum { options, .. }, ParamValue::String(s)) => options.contains(&s.as_str()),
            (Self::Bool { .. }, ParamValue::Bool(_)) => true,
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(Error::schema(field, format!("value {value:?} is not a valid {}", self.kind_name())))
        }
    }
}

/// Ordered list of named parameter specs.
#[derive(Debug, Clone, Copy)]
pub struct ParamSchema {
    fields: &'static [(&'static str, ParamSpec)],
}

impl ParamSchema {
    pub const fn new(fields: &'static [(&'static str, ParamSpec)]) -> Self {
        Self { fields }
    }

    /// Schema with no parameters.
    pub const fn empty() -> Self {
        Self { fields: &[] }
    }

    pub fn fields(&self) -> &'static [(&'static str, ParamSpec)] {
        self.fields
    }

    pub fn get(&self, name: &str) -> Option<&ParamSpec> {
        self.fields.iter().find(|(n, _)| *n == name).map(|(_, s)| s)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parameter set holding every default.
    pub fn defaults(&self) -> ParameterSet {
        let values = self
            .fields
            .iter()
            .map(|(name, spec)| (name.to_string(), spec.default_value()))
            .collect();
        ParameterSet { values }
    }

    /// Merges host state over the defaults and validates the result.
    ///
    /// `null` is treated as an empty object. Keys the schema does not declare
    /// are dropped.
    pub fn resolve(&self, state: &Value) -> Result<ParameterSet> {
        let obj = match state {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(Error::schema(
                    "<state>",
                    format!("expected object, got {}", json_kind(other)),
                ));
            }
        };

        let mut set = ParameterSet::default();
        for (name, spec) in self.fields {
            let value = match obj.and_then(|m| m.get(*name)) {
                Some(Value::Null) | None => spec.default_value(),
                Some(v) => spec.coerce(name, v)?,
            };
            set.values.insert(name.to_string(), value);
        }

        if let Some(map) = obj {
            for key in map.keys().filter(|k| self.get(k).is_none()) {
                debug!(key = %key, "dropping undeclared parameter");
            }
        }
        Ok(set)
    }

    /// Checks that `set` has every declared key with a value of the right kind.
    pub fn validate(&self, set: &ParameterSet) -> Result<()> {
        for (name, spec) in self.fields {
            let value = set
                .get(name)
                .ok_or_else(|| Error::schema(*name, "missing"))?;
            spec.check(name, value)?;
        }
        Ok(())
    }

    /// Per-field interpolation between two resolved sets.
    ///
    /// Numeric fields are lerped (ints rounded); other fields take `b`'s value.
    pub fn interpolate(&self, a: &ParameterSet, b: &ParameterSet, t: f64) -> Result<ParameterSet> {
        self.validate(a)?;
        self.validate(b)?;
        let mut out = ParameterSet::default();
        for (name, spec) in self.fields {
            let (x, y) = (&a.values[*name], &b.values[*name]);
            let v = match (spec, x, y) {
                (ParamSpec::Real { .. }, ParamValue::Real(x), ParamValue::Real(y)) => {
                    ParamValue::Real(lerp(*x, *y, t))
                }
                (ParamSpec::Int { .. }, ParamValue::Int(x), ParamValue::Int(y)) => {
                    ParamValue::Int(lerp(*x as f64, *y as f64, t).round() as i64)
                }
                _ => y.clone(),
            };
            out.values.insert(name.to_string(), v);
        }
        Ok(out)
    }
}

/// Linear interpolation, exact at both endpoints.
#[inline]
pub fn lerp(x: f64, y: f64, t: f64) -> f64 {
    if t == 1.0 { y } else { x + (y - x) * t }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A single parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    Bool(bool),
    Int(i64),
    Real(f64),
    String(String),
}

impl ParamValue {
    /// Numeric view; ints widen to f64.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::Real(v) => Some(v),
            Self::Int(v) => Some(v as f64),
            _ => None,
        }
    }
}

/// Resolved parameters of one effect invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterSet {
    values: BTreeMap<String, ParamValue>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&ParamValue> {
        self.values.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.values.insert(name.into(), value)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric field as f64.
    pub fn real(&self, name: &str) -> Result<f64> {
        self.get(name)
            .ok_or_else(|| Error::schema(name, "missing"))?
            .as_f64()
            .ok_or_else(|| Error::schema(name, "expected number"))
    }

    pub fn int(&self, name: &str) -> Result<i64> {
        match self.get(name) {
            Some(ParamValue::Int(v)) => Ok(*v),
            Some(ParamValue::Real(v)) if v.is_finite() => Ok(v.round() as i64),
            Some(_) => Err(Error::schema(name, "expected integer")),
            None => Err(Error::schema(name, "missing")),
        }
    }

    pub fn string(&self, name: &str) -> Result<&str> {
        match self.get(name) {
            Some(ParamValue::String(s)) => Ok(s),
            Some(_) => Err(Error::schema(name, "expected string")),
            None => Err(Error::schema(name, "missing")),
        }
    }

    pub fn boolean(&self, name: &str) -> Result<bool> {
        match self.get(name) {
            Some(ParamValue::Bool(b)) => Ok(*b),
            Some(_) => Err(Error::schema(name, "expected bool")),
            None => Err(Error::schema(name, "missing")),
        }
    }

    /// JSON object view, for handing back to a host.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl FromIterator<(String, ParamValue)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, ParamValue)>>(iter: I) -> Self {
        Self { values: iter.into_iter().collect() }
    }
}
