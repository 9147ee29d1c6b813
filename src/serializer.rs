use crate::error::FormatError;
use crate::grammar::{dv_kind_code, lookup, takes_params, TypeTag, JOB_NUMBER, NONE};
use crate::lexer::{Lexer, LineKind};
use crate::parser::decode_value;
use crate::utils::{format_float, join_comma};
use crate::value::{
    ConfigMap, ConstraintDefinition, DesignVariableDefinition, ObjectiveDefinition, Value,
};
use indexmap::IndexSet;
use log::debug;

/// The output of [`serialize`].
#[derive(Debug, Clone, PartialEq)]
pub struct Serialized {
    /// The rewritten file content.
    pub text: String,
    /// Keys present in the value map that no template line matched, in map
    /// order. `JOB_NUMBER` is never reported.
    pub unwritten: IndexSet<String>,
}

/// Rewrites the lines of `template` whose key appears in `values` and passes
/// every other line through untouched.
///
/// A line whose current value already formats the same as the new value is
/// kept byte-for-byte, so serializing a freshly parsed map reproduces its source.
/// Only the first line for a given key is rewritten.
///
/// # Errors
/// Returns a `FormatError` if a value cannot be written under its key's
/// grammar rule.
pub fn serialize(template: &str, values: &ConfigMap) -> Result<Serialized, FormatError> {
    let mut pending: IndexSet<&str> = values.keys().map(String::as_str).collect();
    let mut text = String::with_capacity(template.len());

    for line in Lexer::new(template) {
        let LineKind::Entry {
            key,
            value: old_value,
            ..
        } = line.kind
        else {
            text.push_str(line.raw);
            continue;
        };
        if !pending.shift_remove(key) {
            text.push_str(line.raw);
            continue;
        }

        let formatted = format_value(key, &values[key])?;
        // Compared in canonical form, where `nan` matches itself.
        let unchanged = decode_value(lookup(key), old_value)
            .ok()
            .and_then(|old| format_value(key, &old).ok())
            .is_some_and(|old| old == formatted);
        if unchanged {
            debug!("line {}: `{key}` unchanged", line.number);
            text.push_str(line.raw);
            continue;
        }

        debug!("line {}: rewriting `{key}`", line.number);
        let content_len = line.raw.trim_end_matches(['\r', '\n']).len();
        let terminator = match &line.raw[content_len..] {
            "" => "\n",
            terminator => terminator,
        };
        text.push_str(key);
        text.push_str("= ");
        text.push_str(&formatted);
        text.push_str(terminator);
    }

    let unwritten = pending
        .into_iter()
        .filter(|key| *key != JOB_NUMBER)
        .map(str::to_string)
        .collect();
    Ok(Serialized { text, unwritten })
}

/// Writes every key of `values` in map order, by serializing against a
/// synthetic template of `KEY= 0` lines.
///
/// # Errors
/// See [`serialize`].
pub fn dump(values: &ConfigMap) -> Result<Serialized, FormatError> {
    let template: String = values.keys().map(|key| format!("{key}= 0\n")).collect();
    serialize(&template, values)
}

/// Formats `value` the way `key`'s grammar rule writes it, without the `KEY= ` prefix.
///
/// # Errors
/// Returns `FormatError::ValueShape` when the value's variant does not fit
/// the rule, and the objective/design variable invariant errors.
pub fn format_value(key: &str, value: &Value) -> Result<String, FormatError> {
    let tag = lookup(key);
    let shape_error = || FormatError::ValueShape {
        key: key.to_string(),
        expected: tag,
        found: value.kind_name(),
    };

    match (tag, value) {
        (TypeTag::StringScalar, _) => format_plain(value).ok_or_else(shape_error),
        (TypeTag::FloatScalar, Value::Float(v)) => Ok(format_float(*v)),
        (TypeTag::FloatScalar | TypeTag::IntScalar, Value::Int(v)) => Ok(v.to_string()),
        (TypeTag::BoolScalar, Value::Bool(v)) => Ok(format_bool(*v)),
        (TypeTag::CommaStringList, Value::StringList(items)) => Ok(join_comma(items)),
        (TypeTag::CommaStringList, Value::String(item)) => Ok(item.clone()),
        (TypeTag::CommaFloatList, Value::FloatList(items)) => Ok(join_floats(items)),
        (TypeTag::SemicolonFloatListList, Value::FloatListList(groups)) => {
            Ok(format_float_groups(groups))
        }
        (TypeTag::SemicolonFloatListList, Value::FloatList(group)) => {
            Ok(format_float_groups(std::slice::from_ref(group)))
        }
        (TypeTag::DesignVariableDefinition, Value::DesignVariables(def)) => {
            format_design_variables(key, def)
        }
        (TypeTag::ObjectiveDefinition, Value::Objective(def)) => format_objective(key, def),
        (TypeTag::ConstraintDefinition, Value::Constraints(def)) => Ok(format_constraints(def)),
        _ => Err(shape_error()),
    }
}

/// Keys without a dedicated rule are written by the value's own shape.
/// String lists take the parenthesized marker form, as in `DV_MARKER`.
fn format_plain(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Float(v) => Some(format_float(*v)),
        Value::Int(v) => Some(v.to_string()),
        Value::Bool(v) => Some(format_bool(*v)),
        Value::StringList(items) => Some(format!("( {} )", join_comma(items))),
        Value::FloatList(_)
        | Value::FloatListList(_)
        | Value::DesignVariables(_)
        | Value::Objective(_)
        | Value::Constraints(_) => None,
    }
}

fn format_bool(value: bool) -> String {
    let text = if value { "TRUE" } else { "FALSE" };
    text.to_string()
}

fn join_floats(values: &[f64]) -> String {
    join_comma(values.iter().map(|v| format_float(*v)))
}

fn format_float_groups(groups: &[Vec<f64>]) -> String {
    groups
        .iter()
        .map(|group| {
            if group.is_empty() {
                "( )".to_string()
            } else {
                format!("( {} )", join_floats(group))
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

fn format_design_variables(key: &str, def: &DesignVariableDefinition) -> Result<String, FormatError> {
    let n = def.len().ok_or_else(|| FormatError::DesignVariableShape {
        key: key.to_string(),
    })?;
    if n == 0 {
        return Ok(NONE.to_string());
    }

    let mut entries = Vec::with_capacity(n);
    for i in 0..n {
        let kind = &def.kind[i];
        let code = dv_kind_code(kind).ok_or_else(|| FormatError::UnknownDesignVariableKind {
            key: key.to_string(),
            kind: kind.clone(),
        })?;

        let mut entry = format!(
            "( {code}, {} | {}",
            format_float(def.scale[i]),
            join_comma(&def.marker[i])
        );
        if takes_params(kind) {
            entry.push_str(" | ");
            entry.push_str(&join_floats(&def.param[i]));
        }
        entry.push_str(" )");
        entries.push(entry);
    }
    Ok(entries.join("; "))
}

fn format_objective(key: &str, def: &ObjectiveDefinition) -> Result<String, FormatError> {
    let count = def.entries.len();
    match def.entries.first() {
        Some((name, objective)) if count == 1 => {
            Ok(format!("{name} * {}", format_float(objective.scale)))
        }
        _ => Err(FormatError::ObjectiveCount {
            key: key.to_string(),
            count,
        }),
    }
}

fn format_constraints(def: &ConstraintDefinition) -> String {
    if def.is_empty() {
        return NONE.to_string();
    }
    def.equality
        .iter()
        .chain(def.inequality.iter())
        .map(|(name, c)| {
            format!(
                "( {name} {} {} ) * {}",
                c.sign,
                format_float(c.value),
                format_float(c.scale)
            )
        })
        .collect::<Vec<_>>()
        .join("; ")
}
