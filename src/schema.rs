//! Declarative input constraints for tools.
//!
//! A tool's input is an [`ObjectSchema`]: a flat list of [`Field`]s, each with
//! a [`Kind`] that may nest (arrays). The same tree validates raw arguments and
//! renders the JSON Schema advertised by `tools/list`.

use crate::format::{parse_date, parse_date_range};
use serde_json::{json, Map, Value};

pub const ORDER_VALUES: &[&str] = &["asc", "desc"];
pub const CURRENCY_VALUES: &[&str] = &["CZK", "EUR", "USD"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringFormat {
    Date,
    DateRange,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Kind {
    String {
        min_len: Option<usize>,
        one_of: Option<&'static [&'static str]>,
        format: Option<StringFormat>,
    },
    Integer {
        min: Option<i64>,
        exclusive_min: Option<i64>,
    },
    Number,
    Boolean,
    Array(Box<Kind>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub kind: Kind,
    pub description: &'static str,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<Value>,
}

impl Field {
    fn new(name: &'static str, kind: Kind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            nullable: false,
            default: None,
        }
    }

    pub fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::String {
                min_len: None,
                one_of: None,
                format: None,
            },
            description,
        )
    }

    /// String with at least one character.
    pub fn non_empty(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::String {
                min_len: Some(1),
                one_of: None,
                format: None,
            },
            description,
        )
    }

    pub fn one_of(
        name: &'static str,
        values: &'static [&'static str],
        description: &'static str,
    ) -> Self {
        Self::new(
            name,
            Kind::String {
                min_len: None,
                one_of: Some(values),
                format: None,
            },
            description,
        )
    }

    pub fn order() -> Self {
        Self::one_of("order", ORDER_VALUES, "Order direction (asc or desc)")
    }

    pub fn order_by() -> Self {
        Self::string("order_by", "Field to order by")
    }

    pub fn currency(name: &'static str, description: &'static str) -> Self {
        Self::one_of(name, CURRENCY_VALUES, description)
    }

    pub fn date(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::String {
                min_len: None,
                one_of: None,
                format: Some(StringFormat::Date),
            },
            description,
        )
    }

    pub fn date_range(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::String {
                min_len: None,
                one_of: None,
                format: Some(StringFormat::DateRange),
            },
            description,
        )
    }

    pub fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::Integer {
                min: None,
                exclusive_min: None,
            },
            description,
        )
    }

    /// Integer > 0; used for every entity id.
    pub fn positive_int(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::Integer {
                min: None,
                exclusive_min: Some(0),
            },
            description,
        )
    }

    /// 0-based page index, defaulting to 0.
    pub fn page() -> Self {
        Self::new(
            "page",
            Kind::Integer {
                min: Some(0),
                exclusive_min: None,
            },
            "Page number (0-based)",
        )
        .default_value(json!(0))
    }

    pub fn number(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Kind::Number, description)
    }

    pub fn boolean(name: &'static str, description: &'static str) -> Self {
        Self::new(name, Kind::Boolean, description)
    }

    pub fn int_list(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::Array(Box::new(Kind::Integer {
                min: None,
                exclusive_min: None,
            })),
            description,
        )
    }

    pub fn string_list(name: &'static str, description: &'static str) -> Self {
        Self::new(
            name,
            Kind::Array(Box::new(Kind::String {
                min_len: None,
                one_of: None,
                format: None,
            })),
            description,
        )
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn default_value(mut self, v: Value) -> Self {
        self.default = Some(v);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectSchema {
    pub fields: Vec<Field>,
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Whole numbers that fit in `i64`; `2.0` counts, `2.5` and `1e20` do not.
fn integer_value(n: &serde_json::Number) -> Result<i64, &'static str> {
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    if n.is_u64() {
        return Err("Number must be less than or equal to 9223372036854775807");
    }
    let f = n.as_f64().ok_or("Expected integer, received float")?;
    if f.fract() != 0.0 {
        return Err("Expected integer, received float");
    }
    // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err("Number must be a safe integer");
    }
    Ok(f as i64)
}

fn quoted(values: &[&str]) -> String {
    values
        .iter()
        .map(|v| format!("'{}'", v))
        .collect::<Vec<_>>()
        .join(" | ")
}

impl Kind {
    /// Check (and coerce) one value, pushing `path: problem` messages.
    fn check(&self, path: &str, value: &Value, errors: &mut Vec<String>) -> Option<Value> {
        match self {
            Kind::String {
                min_len,
                one_of,
                format,
            } => {
                let Some(s) = value.as_str() else {
                    errors.push(format!("{}: Expected string, received {}", path, type_name(value)));
                    return None;
                };
                if let Some(allowed) = one_of {
                    if !allowed.contains(&s) {
                        errors.push(format!(
                            "{}: Invalid enum value. Expected {}, received '{}'",
                            path,
                            quoted(allowed),
                            s
                        ));
                        return None;
                    }
                }
                if let Some(min) = min_len {
                    if s.chars().count() < *min {
                        errors.push(format!(
                            "{}: String must contain at least {} character(s)",
                            path, min
                        ));
                        return None;
                    }
                }
                match format {
                    Some(StringFormat::Date) if parse_date(s).is_none() => {
                        errors.push(format!("{}: Invalid date format", path));
                        None
                    }
                    Some(StringFormat::DateRange) if parse_date_range(s).is_none() => {
                        errors.push(format!(
                            "{}: Invalid date range, expected YYYY-MM-DD..YYYY-MM-DD",
                            path
                        ));
                        None
                    }
                    _ => Some(value.clone()),
                }
            }
            Kind::Integer { min, exclusive_min } => {
                let Value::Number(num) = value else {
                    errors.push(format!(
                        "{}: Expected integer, received {}",
                        path,
                        type_name(value)
                    ));
                    return None;
                };
                let n = match integer_value(num) {
                    Ok(n) => n,
                    Err(msg) => {
                        errors.push(format!("{}: {}", path, msg));
                        return None;
                    }
                };
                if let Some(m) = exclusive_min {
                    if n <= *m {
                        errors.push(format!("{}: Number must be greater than {}", path, m));
                        return None;
                    }
                }
                if let Some(m) = min {
                    if n < *m {
                        errors.push(format!(
                            "{}: Number must be greater than or equal to {}",
                            path, m
                        ));
                        return None;
                    }
                }
                Some(Value::from(n))
            }
            Kind::Number => {
                if value.is_number() {
                    Some(value.clone())
                } else {
                    errors.push(format!("{}: Expected number, received {}", path, type_name(value)));
                    None
                }
            }
            Kind::Boolean => {
                if value.is_boolean() {
                    Some(value.clone())
                } else {
                    errors.push(format!(
                        "{}: Expected boolean, received {}",
                        path,
                        type_name(value)
                    ));
                    None
                }
            }
            Kind::Array(item) => {
                let Some(items) = value.as_array() else {
                    errors.push(format!("{}: Expected array, received {}", path, type_name(value)));
                    return None;
                };
                let before = errors.len();
                let out: Vec<Value> = items
                    .iter()
                    .enumerate()
                    .filter_map(|(i, v)| item.check(&format!("{}.{}", path, i), v, errors))
                    .collect();
                (errors.len() == before).then_some(Value::Array(out))
            }
        }
    }

    fn json_schema(&self) -> Map<String, Value> {
        let mut m = Map::new();
        match self {
            Kind::String {
                min_len,
                one_of,
                format,
            } => {
                m.insert("type".into(), json!("string"));
                if let Some(values) = one_of {
                    m.insert("enum".into(), json!(values));
                }
                if let Some(min) = min_len {
                    m.insert("minLength".into(), json!(min));
                }
                match format {
                    Some(StringFormat::Date) => {
                        m.insert("format".into(), json!("date-time"));
                    }
                    Some(StringFormat::DateRange) => {
                        m.insert("pattern".into(), json!("^.+\\.\\..+$"));
                    }
                    None => {}
                }
            }
            Kind::Integer { min, exclusive_min } => {
                m.insert("type".into(), json!("integer"));
                if let Some(v) = min {
                    m.insert("minimum".into(), json!(v));
                }
                if let Some(v) = exclusive_min {
                    m.insert("exclusiveMinimum".into(), json!(v));
                }
            }
            Kind::Number => {
                m.insert("type".into(), json!("number"));
            }
            Kind::Boolean => {
                m.insert("type".into(), json!("boolean"));
            }
            Kind::Array(item) => {
                m.insert("type".into(), json!("array"));
                m.insert("items".into(), Value::Object(item.json_schema()));
            }
        }
        m
    }
}

impl ObjectSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, f: Field) -> Self {
        self.fields.push(f);
        self
    }

    /// Validate raw tool arguments.
    ///
    /// Missing or null arguments count as `{}`. Unknown keys are dropped,
    /// defaults filled in. On failure every violation is reported.
    pub fn validate(&self, args: &Value) -> Result<Value, Vec<String>> {
        let empty = Map::new();
        let input = match args {
            Value::Null => &empty,
            Value::Object(map) => map,
            other => {
                return Err(vec![format!(
                    "arguments: Expected object, received {}",
                    type_name(other)
                )])
            }
        };

        let mut errors = Vec::new();
        let mut out = Map::new();
        for f in &self.fields {
            match input.get(f.name) {
                None => {
                    if let Some(d) = &f.default {
                        out.insert(f.name.to_string(), d.clone());
                    } else if f.required {
                        errors.push(format!("{}: Required", f.name));
                    }
                }
                Some(Value::Null) if f.nullable => {
                    out.insert(f.name.to_string(), Value::Null);
                }
                Some(Value::Null) if !f.required && f.default.is_none() => {
                    // treated as omitted
                }
                Some(v) => {
                    if let Some(checked) = f.kind.check(f.name, v, &mut errors) {
                        out.insert(f.name.to_string(), checked);
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(Value::Object(out))
        } else {
            Err(errors)
        }
    }

    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for f in &self.fields {
            let mut prop = f.kind.json_schema();
            if f.nullable {
                if let Some(t) = prop.get("type").cloned() {
                    prop.insert("type".into(), json!([t, "null"]));
                }
            }
            if !f.description.is_empty() {
                prop.insert("description".into(), json!(f.description));
            }
            if let Some(d) = &f.default {
                prop.insert("default".into(), d.clone());
            }
            if f.required {
                required.push(json!(f.name));
            }
            properties.insert(f.name.to_string(), Value::Object(prop));
        }
        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = Value::Array(required);
        }
        schema
    }
}
