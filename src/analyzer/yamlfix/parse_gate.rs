//! Phase 2: parse validation.
//!
//! Parses text as a stream of documents. Duplicate mapping keys are accepted
//! (last one wins) so that they reach the semantic pass as reportable
//! defects instead of failing the whole document.

use std::fmt;

use serde::Deserialize;
use serde::de::{self, Deserializer, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde_yaml::value::{Tag, TaggedValue};
use serde_yaml::{Mapping, Value};

use crate::analyzer::yamlfix::types::{ErrorCode, Severity, ValidationError};

/// Result of gating a text.
#[derive(Debug, Clone, Default)]
pub struct GateOutcome {
    /// Parsed documents, empty on failure.
    pub documents: Vec<Value>,
    /// Empty on success, exactly one `PARSE_ERROR` on failure.
    pub errors: Vec<ValidationError>,
}

impl GateOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Parse `text` as one or more `---`-separated documents.
pub fn check(text: &str) -> GateOutcome {
    match parse_documents(text) {
        Ok(documents) => GateOutcome {
            documents,
            errors: Vec::new(),
        },
        Err(error) => GateOutcome {
            documents: Vec::new(),
            errors: vec![error],
        },
    }
}

/// Whether `text` parses.
pub fn is_parseable(text: &str) -> bool {
    parse_documents(text).is_ok()
}

/// Parse every document in `text`.
pub fn parse_documents(text: &str) -> Result<Vec<Value>, ValidationError> {
    let mut documents = Vec::new();
    for document in serde_yaml::Deserializer::from_str(text) {
        let LenientValue(value) = LenientValue::deserialize(document).map_err(|e| to_error(&e))?;
        documents.push(value);
    }
    Ok(documents)
}

fn to_error(err: &serde_yaml::Error) -> ValidationError {
    let (line, column) = err
        .location()
        .map(|loc| (loc.line(), loc.column()))
        .unwrap_or((0, 0));
    let mut error = ValidationError::new(line, err.to_string(), ErrorCode::ParseError)
        .with_severity(Severity::Critical);
    if column > 0 {
        error = error.with_column(column);
    }
    error
}

/// A YAML value whose mappings tolerate repeated keys.
struct LenientValue(Value);

impl<'de> Deserialize<'de> for LenientValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(LenientVisitor).map(LenientValue)
    }
}

struct LenientVisitor;

impl<'de> Visitor<'de> for LenientVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any YAML value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_owned()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: Deserializer<'de>,
    {
        LenientValue::deserialize(deserializer).map(|v| v.0)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(LenientValue(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Sequence(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut mapping = Mapping::new();
        while let Some((LenientValue(key), LenientValue(value))) = map.next_entry()? {
            mapping.insert(key, value);
        }
        Ok(Value::Mapping(mapping))
    }

    fn visit_enum<A>(self, data: A) -> Result<Value, A::Error>
    where
        A: EnumAccess<'de>,
    {
        let (tag, variant): (String, _) = data.variant()?;
        let LenientValue(value) = variant.newtype_variant()?;
        Ok(Value::Tagged(Box::new(TaggedValue {
            tag: Tag::new(tag),
            value,
        })))
    }
}
