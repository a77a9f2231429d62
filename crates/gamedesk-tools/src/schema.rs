//! Parameter schemas and argument validation.
//!
//! Raw arguments arrive as a JSON object emitted by the oracle. Validation
//! runs before any handler: unknown parameters are rejected, missing required
//! parameters are rejected, values are coerced to their declared type (the
//! oracle frequently quotes numbers), and declared constraints are checked.
//! Every failure names the offending parameter.

use gamedesk_protocol::{ParamDescriptor, ToolError};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Text,
    Number,
    Boolean,
}

impl ParamType {
    pub fn label(self) -> &'static str {
        match self {
            ParamType::Text => "text",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// Text must be non-empty after trimming.
    NonEmpty,
    /// Number must be finite and >= 0.
    NonNegative,
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub constraint: Option<Constraint>,
}

impl ParamSpec {
    pub fn text(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Text,
            required: true,
            constraint: Some(Constraint::NonEmpty),
        }
    }

    pub fn number(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Number,
            required: true,
            constraint: None,
        }
    }

    pub fn non_negative_number(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Number,
            required: true,
            constraint: Some(Constraint::NonNegative),
        }
    }

    pub fn optional_boolean(name: &'static str) -> Self {
        Self {
            name,
            ty: ParamType::Boolean,
            required: false,
            constraint: None,
        }
    }

    pub fn descriptor(&self) -> ParamDescriptor {
        ParamDescriptor {
            name: self.name.to_owned(),
            r#type: self.ty.label().to_owned(),
            required: self.required,
        }
    }
}

/// A validated, typed argument value.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    Text(String),
    Number(f64),
    Bool(bool),
}

/// Validated arguments ready for a handler.
#[derive(Debug, Default)]
pub struct Args {
    values: HashMap<&'static str, ArgValue>,
}

impl Args {
    pub fn text(&self, name: &str) -> Result<&str, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) => Ok(s),
            _ => Err(ToolError::validation(name, "missing text argument")),
        }
    }

    pub fn number(&self, name: &str) -> Result<f64, ToolError> {
        match self.values.get(name) {
            Some(ArgValue::Number(n)) => Ok(*n),
            _ => Err(ToolError::validation(name, "missing numeric argument")),
        }
    }

    pub fn bool_or(&self, name: &str, default: bool) -> bool {
        match self.values.get(name) {
            Some(ArgValue::Bool(b)) => *b,
            _ => default,
        }
    }
}

/// Validate raw arguments against the declared parameters.
pub fn validate(params: &[ParamSpec], raw: &Map<String, Value>) -> Result<Args, ToolError> {
    for key in raw.keys() {
        if !params.iter().any(|p| p.name == key) {
            return Err(ToolError::validation(key, "unknown parameter"));
        }
    }

    let mut args = Args::default();
    for param in params {
        let Some(value) = raw.get(param.name) else {
            if param.required {
                return Err(ToolError::validation(
                    param.name,
                    "missing required parameter",
                ));
            }
            continue;
        };

        let coerced = coerce(param, value)?;
        check_constraint(param, &coerced)?;
        args.values.insert(param.name, coerced);
    }

    Ok(args)
}

fn coerce(param: &ParamSpec, value: &Value) -> Result<ArgValue, ToolError> {
    match param.ty {
        ParamType::Text => match value {
            Value::String(s) => Ok(ArgValue::Text(s.clone())),
            _ => Err(ToolError::validation(param.name, "expected text")),
        },
        ParamType::Number => match value {
            Value::Number(n) => n
                .as_f64()
                .map(ArgValue::Number)
                .ok_or_else(|| ToolError::validation(param.name, "expected a finite number")),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(ArgValue::Number)
                .map_err(|_| ToolError::validation(param.name, "expected a number")),
            _ => Err(ToolError::validation(param.name, "expected a number")),
        },
        ParamType::Boolean => match value {
            Value::Bool(b) => Ok(ArgValue::Bool(*b)),
            Value::Number(n) => match n.as_i64() {
                Some(0) => Ok(ArgValue::Bool(false)),
                Some(1) => Ok(ArgValue::Bool(true)),
                _ => Err(ToolError::validation(param.name, "expected a boolean")),
            },
            Value::String(s) => match s.to_lowercase().as_str() {
                "true" => Ok(ArgValue::Bool(true)),
                "false" => Ok(ArgValue::Bool(false)),
                _ => Err(ToolError::validation(param.name, "expected a boolean")),
            },
            _ => Err(ToolError::validation(param.name, "expected a boolean")),
        },
    }
}

fn check_constraint(param: &ParamSpec, value: &ArgValue) -> Result<(), ToolError> {
    match (param.constraint, value) {
        (Some(Constraint::NonEmpty), ArgValue::Text(s)) if s.trim().is_empty() => {
            Err(ToolError::validation(param.name, "must not be empty"))
        }
        (Some(Constraint::NonNegative), ArgValue::Number(n)) if !n.is_finite() || *n < 0.0 => {
            Err(ToolError::validation(param.name, "must be non-negative"))
        }
        _ => Ok(()),
    }
}
