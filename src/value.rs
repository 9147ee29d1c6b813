use indexmap::IndexMap;
use serde::Serialize;
use std::fmt::Display;

/// An ordered mapping from key to typed value, in the order keys first
/// appeared in the source file.
pub type ConfigMap = IndexMap<String, Value>;

/// A decoded configuration value. Which variant a key holds is decided by
/// its grammar rule, see [`crate::grammar::lookup`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    String(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    StringList(Vec<String>),
    FloatList(Vec<f64>),
    FloatListList(Vec<Vec<f64>>),
    DesignVariables(DesignVariableDefinition),
    Objective(ObjectiveDefinition),
    Constraints(ConstraintDefinition),
}

impl Value {
    /// A short name for the variant, used in diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Float(_) => "float",
            Value::Int(_) => "integer",
            Value::Bool(_) => "boolean",
            Value::StringList(_) => "string list",
            Value::FloatList(_) => "float list",
            Value::FloatListList(_) => "list of float lists",
            Value::DesignVariables(_) => "design variable definition",
            Value::Objective(_) => "objective definition",
            Value::Constraints(_) => "constraint definition",
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

/// Design variables stored as four parallel sequences, one index per variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct DesignVariableDefinition {
    pub kind: Vec<String>,
    pub scale: Vec<f64>,
    pub marker: Vec<Vec<String>>,
    /// Empty for kinds that take no parameters (`AOA`, `MACH_NUMBER`).
    pub param: Vec<Vec<f64>>,
}

impl DesignVariableDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: String, scale: f64, markers: Vec<String>, params: Vec<f64>) {
        self.kind.push(kind);
        self.scale.push(scale);
        self.marker.push(markers);
        self.param.push(params);
    }

    /// Number of design variables, or `None` if the parallel sequences
    /// disagree in length.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        let n = self.kind.len();
        (self.scale.len() == n && self.marker.len() == n && self.param.len() == n).then_some(n)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Objective {
    pub scale: f64,
}

/// Objective definitions keyed by objective name. Writing requires exactly
/// one entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ObjectiveDefinition {
    pub entries: IndexMap<String, Objective>,
}

impl ObjectiveDefinition {
    pub fn single(name: impl Into<String>, scale: f64) -> Self {
        let mut entries = IndexMap::new();
        entries.insert(name.into(), Objective { scale });
        Self { entries }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sign {
    #[serde(rename = "<")]
    Less,
    #[serde(rename = ">")]
    Greater,
    #[serde(rename = "=")]
    Equal,
}

impl Sign {
    /// Detection order used when scanning a constraint for its sign.
    pub const SEARCH_ORDER: [Sign; 3] = [Sign::Less, Sign::Greater, Sign::Equal];

    #[must_use]
    pub fn as_char(self) -> char {
        match self {
            Sign::Less => '<',
            Sign::Greater => '>',
            Sign::Equal => '=',
        }
    }
}

impl Display for Sign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct Constraint {
    pub sign: Sign,
    pub value: f64,
    pub scale: f64,
}

/// Constraints partitioned by sign: `=` constraints are equalities,
/// everything else is an inequality.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub struct ConstraintDefinition {
    pub equality: IndexMap<String, Constraint>,
    pub inequality: IndexMap<String, Constraint>,
}

impl ConstraintDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits constraints into equality and inequality maps, keeping the
    /// order in which each name was first encountered.
    pub fn partition(constraints: IndexMap<String, Constraint>) -> Self {
        let mut definition = Self::new();
        for (name, constraint) in constraints {
            if constraint.sign == Sign::Equal {
                definition.equality.insert(name, constraint);
            } else {
                definition.inequality.insert(name, constraint);
            }
        }
        definition
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.equality.is_empty() && self.inequality.is_empty()
    }
}
