//! Typed, validated configuration cells
//!
//! A variable has a name, a doc string, a current [`Value`] and a [`VarType`]
//! that every assignment is checked against. Callbacks run only when an
//! assignment actually changes the value.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A variable value, as read from configuration files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Value>),
    Dict(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

/// Literal form used in error messages: strings quoted, floats always with a
/// decimal point
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(true) => f.write_str("True"),
            Value::Bool(false) => f.write_str("False"),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::Str(s) => write!(f, "'{}'", s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Dict(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "'{}': {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Type and constraints a variable's value must satisfy
#[derive(Debug, Clone, PartialEq)]
pub enum VarType {
    String { choices: Option<Vec<String>> },
    Int { min: Option<i64>, max: Option<i64> },
    Float { min: Option<f64>, max: Option<f64> },
    Bool,
    List(Box<VarType>),
    /// Fixed-size list with one type per position
    Tuple(Vec<VarType>),
    Dict { key: Box<VarType>, value: Box<VarType> },
}

impl VarType {
    pub fn string() -> Self {
        VarType::String { choices: None }
    }

    pub fn choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        VarType::String {
            choices: Some(choices.into_iter().map(Into::into).collect()),
        }
    }

    pub fn int() -> Self {
        VarType::Int {
            min: None,
            max: None,
        }
    }

    pub fn int_range(min: Option<i64>, max: Option<i64>) -> Self {
        VarType::Int { min, max }
    }

    pub fn float() -> Self {
        VarType::Float {
            min: None,
            max: None,
        }
    }

    pub fn float_range(min: Option<f64>, max: Option<f64>) -> Self {
        VarType::Float { min, max }
    }

    pub fn list(of: VarType) -> Self {
        VarType::List(Box::new(of))
    }

    pub fn dict(key: VarType, value: VarType) -> Self {
        VarType::Dict {
            key: Box::new(key),
            value: Box::new(value),
        }
    }

    /// Check `value`, returning the message of the first failed condition
    pub fn validate(&self, value: &Value) -> Result<(), String> {
        match self {
            VarType::String { choices } => {
                let Value::Str(s) = value else {
                    return Err("Must be a string".to_string());
                };
                if let Some(choices) = choices {
                    if !choices.iter().any(|c| c == s) {
                        let quoted: Vec<String> =
                            choices.iter().map(|c| format!("'{}'", c)).collect();
                        return Err(format!("Must be one of ({})", quoted.join(", ")));
                    }
                }
                Ok(())
            }
            VarType::Int { min, max } => {
                let Value::Int(i) = value else {
                    return Err("Must be an integer".to_string());
                };
                check_bounds(*i, *min, *max, |b| b.to_string())
            }
            VarType::Float { min, max } => {
                let Some(x) = value.as_float() else {
                    return Err("Must be a float".to_string());
                };
                check_bounds(x, *min, *max, |b| format!("{:?}", b))
            }
            VarType::Bool => match value {
                Value::Bool(_) => Ok(()),
                _ => Err("Must be a boolean".to_string()),
            },
            VarType::List(of) => {
                let Value::List(items) = value else {
                    return Err("Must be a list".to_string());
                };
                for (i, item) in items.iter().enumerate() {
                    of.validate(item)
                        .map_err(|e| format!("List at position {}: {}", i, e))?;
                }
                Ok(())
            }
            VarType::Tuple(types) => {
                let size_error = || format!("Must be a tuple of size {}", types.len());
                let Value::List(items) = value else {
                    return Err(size_error());
                };
                if items.len() != types.len() {
                    return Err(size_error());
                }
                for (i, (ty, item)) in types.iter().zip(items).enumerate() {
                    ty.validate(item)
                        .map_err(|e| format!("Tuple at position {}: {}", i, e))?;
                }
                Ok(())
            }
            VarType::Dict { key, value: of } => {
                let Value::Dict(map) = value else {
                    return Err("Must be a dict".to_string());
                };
                for (k, v) in map {
                    key.validate(&Value::Str(k.clone()))
                        .map_err(|e| format!("Key '{}': {}", k, e))?;
                    of.validate(v)
                        .map_err(|e| format!("Value for key '{}': {}", k, e))?;
                }
                Ok(())
            }
        }
    }

    /// Short type name for listings
    pub fn name(&self) -> &'static str {
        match self {
            VarType::String { .. } => "string",
            VarType::Int { .. } => "int",
            VarType::Float { .. } => "float",
            VarType::Bool => "bool",
            VarType::List(_) => "list",
            VarType::Tuple(_) => "tuple",
            VarType::Dict { .. } => "dict",
        }
    }
}

fn check_bounds<T: PartialOrd + Copy>(
    v: T,
    min: Option<T>,
    max: Option<T>,
    show: impl Fn(T) -> String,
) -> Result<(), String> {
    if let Some(max) = max {
        if v > max {
            return Err(format!("Must be lesser or equal to {}", show(max)));
        }
    }
    if let Some(min) = min {
        if v < min {
            return Err(format!("Must be greater or equal to {}", show(min)));
        }
    }
    Ok(())
}

/// Errors raised by variable lookups and assignments
#[derive(Debug, Clone, PartialEq)]
pub enum VariableError {
    NoSuchVariable(String),
    Condition {
        name: String,
        value: Value,
        message: String,
    },
}

impl fmt::Display for VariableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableError::NoSuchVariable(name) => write!(f, "No such variable {}", name),
            VariableError::Condition {
                name,
                value,
                message,
            } => write!(
                f,
                "Condition failed for variable {} with value {}: {}",
                name, value, message
            ),
        }
    }
}

impl std::error::Error for VariableError {}

pub type VariableCallback = Rc<dyn Fn(&Variable)>;

/// A named, typed cell
#[derive(Clone)]
pub struct Variable {
    name: String,
    doc: String,
    value: Value,
    ty: VarType,
    callbacks: Vec<VariableCallback>,
}

impl Variable {
    /// Create a variable, validating its initial value
    pub fn new(
        name: impl Into<String>,
        doc: impl Into<String>,
        value: Value,
        ty: VarType,
    ) -> Result<Self, VariableError> {
        let var = Self {
            name: name.into(),
            doc: doc.into(),
            value,
            ty,
            callbacks: Vec::new(),
        };
        var.validate(&var.value)?;
        Ok(var)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn var_type(&self) -> &VarType {
        &self.ty
    }

    pub fn validate(&self, value: &Value) -> Result<(), VariableError> {
        self.ty
            .validate(value)
            .map_err(|message| VariableError::Condition {
                name: self.name.clone(),
                value: value.clone(),
                message,
            })
    }

    /// Assign a new value. Returns whether the value changed.
    ///
    /// Equal values are accepted without validation or callbacks; a rejected
    /// value leaves the old one in place.
    pub fn set_value(&mut self, value: Value) -> Result<bool, VariableError> {
        if value == self.value {
            return Ok(false);
        }
        self.validate(&value)?;
        self.value = value;
        for callback in self.callbacks.clone() {
            callback(self);
        }
        Ok(true)
    }

    pub fn add_callback(&mut self, callback: impl Fn(&Variable) + 'static) {
        self.callbacks.push(Rc::new(callback));
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Variable")
            .field("name", &self.name)
            .field("value", &self.value)
            .field("ty", &self.ty)
            .finish_non_exhaustive()
    }
}

pub const HOME_PAGE: &str = "home-page";
pub const HOME_PAGE_IN_NEW_WINDOW: &str = "home-page-in-new-window";
pub const MINIBUFFER_HEIGHT: &str = "minibuffer-height";
pub const MINIBUFFER_RIGHT_LABEL: &str = "minibuffer-right-label";
pub const WEBJUMP_DEFAULT: &str = "webjump-default";
pub const PROMPT_HISTORY_SIZE: &str = "prompt-history-size";

/// The table of every defined variable
#[derive(Debug, Clone, Default)]
pub struct Variables {
    vars: BTreeMap<String, Variable>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding the built-in variables
    pub fn with_builtins() -> Self {
        let mut vars = Self::new();
        let builtins = [
            (
                HOME_PAGE,
                "Url loaded in the first buffer. An empty string opens about:blank.",
                Value::from(""),
                VarType::string(),
            ),
            (
                HOME_PAGE_IN_NEW_WINDOW,
                "Use the home page when creating a new window.",
                Value::Bool(false),
                VarType::Bool,
            ),
            (
                MINIBUFFER_HEIGHT,
                "The height in pixel of the minibuffer.",
                Value::Int(25),
                VarType::int_range(Some(1), None),
            ),
            (
                MINIBUFFER_RIGHT_LABEL,
                "Format for displaying some information in right label of minibuffer.",
                Value::from("{mode}: {local_keymap} [{buffer_count}]"),
                VarType::string(),
            ),
            (
                WEBJUMP_DEFAULT,
                "The default webjump, inserted by search-default.",
                Value::from(""),
                VarType::string(),
            ),
            (
                PROMPT_HISTORY_SIZE,
                "Number of entries kept by each prompt history.",
                Value::Int(50),
                VarType::int_range(Some(1), None),
            ),
        ];
        for (name, doc, value, ty) in builtins {
            if let Ok(var) = Variable::new(name, doc, value, ty) {
                vars.insert(var);
            }
        }
        vars
    }

    /// Define a variable; a redefinition replaces the previous one
    pub fn define(
        &mut self,
        name: &str,
        doc: &str,
        value: Value,
        ty: VarType,
    ) -> Result<&mut Variable, VariableError> {
        let var = Variable::new(name, doc, value, ty)?;
        self.insert(var);
        self.get_variable_mut(name)
    }

    fn insert(&mut self, var: Variable) {
        self.vars.insert(var.name.clone(), var);
    }

    pub fn get_variable(&self, name: &str) -> Result<&Variable, VariableError> {
        self.vars
            .get(name)
            .ok_or_else(|| VariableError::NoSuchVariable(name.to_string()))
    }

    pub fn get_variable_mut(&mut self, name: &str) -> Result<&mut Variable, VariableError> {
        self.vars
            .get_mut(name)
            .ok_or_else(|| VariableError::NoSuchVariable(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Result<&Value, VariableError> {
        self.get_variable(name).map(Variable::value)
    }

    /// Set a value; returns whether it changed
    pub fn set(&mut self, name: &str, value: Value) -> Result<bool, VariableError> {
        let changed = self.get_variable_mut(name)?.set_value(value)?;
        if changed {
            tracing::debug!("variable {} set to {}", name, self.vars[name].value);
        }
        Ok(changed)
    }

    /// String value of `name`, or "" when missing or not a string
    pub fn get_str(&self, name: &str) -> &str {
        self.get(name).ok().and_then(Value::as_str).unwrap_or("")
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).ok().and_then(Value::as_int)
    }

    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).ok().and_then(Value::as_bool).unwrap_or(false)
    }

    /// Variable names, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Variable> {
        self.vars.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn check_type_error(ty: &VarType, value: Value, message: &str) {
        assert_eq!(ty.validate(&value).unwrap_err(), message);
    }

    #[test]
    fn test_type_string() {
        let s = VarType::string();
        assert!(s.validate(&"".into()).is_ok());
        assert!(s.validate(&"hello".into()).is_ok());
        check_type_error(&s, Value::Int(1), "Must be a string");

        let s = VarType::choices(["aha", "hoho"]);
        assert!(s.validate(&"aha".into()).is_ok());
        assert!(s.validate(&"hoho".into()).is_ok());
        check_type_error(&s, Value::Int(1), "Must be a string");
        check_type_error(&s, "invalid".into(), "Must be one of ('aha', 'hoho')");
    }

    #[test]
    fn test_type_int() {
        let i = VarType::int();
        for v in [-5, 0, 5] {
            assert!(i.validate(&Value::Int(v)).is_ok());
        }
        check_type_error(&i, "1".into(), "Must be an integer");

        let i = VarType::int_range(Some(0), Some(5));
        for v in [0, 1, 5] {
            assert!(i.validate(&Value::Int(v)).is_ok());
        }
        check_type_error(&i, "1".into(), "Must be an integer");
        check_type_error(&i, Value::Int(6), "Must be lesser or equal to 5");
        check_type_error(&i, Value::Int(-1), "Must be greater or equal to 0");
    }

    #[test]
    fn test_type_bool() {
        assert!(VarType::Bool.validate(&Value::Bool(true)).is_ok());
        assert!(VarType::Bool.validate(&Value::Bool(false)).is_ok());
        check_type_error(&VarType::Bool, Value::Int(1), "Must be a boolean");
    }

    #[test]
    fn test_type_list() {
        let l = VarType::list(VarType::float_range(Some(0.0), None));
        assert!(l.validate(&Value::List(vec![])).is_ok());
        assert!(l
            .validate(&Value::List(vec![Value::Float(1.1), Value::Float(6.1)]))
            .is_ok());
        check_type_error(&l, Value::Int(123), "Must be a list");
        check_type_error(
            &l,
            Value::List(vec![Value::Float(2.3), "1".into()]),
            "List at position 1: Must be a float",
        );
        check_type_error(
            &l,
            Value::List(vec![Value::Float(-2.3), Value::Float(3.2)]),
            "List at position 0: Must be greater or equal to 0.0",
        );
    }

    #[test]
    fn test_type_dict() {
        let d = VarType::dict(
            VarType::string(),
            VarType::Tuple(vec![
                VarType::int(),
                VarType::float_range(Some(0.0), Some(1.1)),
            ]),
        );
        assert!(d.validate(&Value::Dict(BTreeMap::new())).is_ok());

        let mut ok = BTreeMap::new();
        ok.insert(
            "1".to_string(),
            Value::List(vec![Value::Int(1), Value::Float(0.5)]),
        );
        assert!(d.validate(&Value::Dict(ok)).is_ok());

        check_type_error(&d, Value::Int(123), "Must be a dict");

        let mut short = BTreeMap::new();
        short.insert("1".to_string(), Value::List(vec![Value::Int(1)]));
        check_type_error(
            &d,
            Value::Dict(short),
            "Value for key '1': Must be a tuple of size 2",
        );
    }

    #[test]
    fn test_condition_error_message() {
        let mut vars = Variables::with_builtins();
        let err = vars.set(MINIBUFFER_HEIGHT, "big".into()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Condition failed for variable minibuffer-height with value 'big': Must be an integer"
        );
        assert_eq!(vars.get_int(MINIBUFFER_HEIGHT), Some(25));
    }

    #[test]
    fn test_unknown_variable() {
        let mut vars = Variables::new();
        assert_eq!(
            vars.set("nope", Value::Int(1)),
            Err(VariableError::NoSuchVariable("nope".to_string()))
        );
    }

    #[test]
    fn test_invalid_initial_value_is_rejected() {
        let mut vars = Variables::new();
        assert!(vars
            .define("size", "", Value::Int(-1), VarType::int_range(Some(0), None))
            .is_err());
        assert!(vars.get("size").is_err());
    }

    #[test]
    fn test_callbacks_fire_only_on_change() {
        let mut vars = Variables::new();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        vars.define("zoom", "", Value::Int(100), VarType::int())
            .unwrap()
            .add_callback(move |_| counter.set(counter.get() + 1));

        assert!(!vars.set("zoom", Value::Int(100)).unwrap());
        assert_eq!(calls.get(), 0);
        assert!(vars.set("zoom", Value::Int(120)).unwrap());
        assert_eq!(calls.get(), 1);
        assert!(vars.set("zoom", "x".into()).is_err());
        assert_eq!(calls.get(), 1);
        assert_eq!(vars.get_int("zoom"), Some(120));
    }

    #[test]
    fn test_values_deserialize_from_yaml() {
        let v: Value = serde_yaml::from_str("[1, 2.5, true, \"x\"]").unwrap();
        assert_eq!(
            v,
            Value::List(vec![
                Value::Int(1),
                Value::Float(2.5),
                Value::Bool(true),
                Value::Str("x".to_string()),
            ])
        );
    }
}
