use crate::error::FormatError;
use crate::grammar::{dv_kind_name, lookup, takes_params, TypeTag, NONE};
use crate::lexer::{Lexer, Line, LineKind};
use crate::utils::{remove_whitespace, strip_parens};
use crate::value::{
    ConfigMap, Constraint, ConstraintDefinition, DesignVariableDefinition, ObjectiveDefinition,
    Sign, Value,
};
use indexmap::IndexMap;
use log::trace;
use miette::{NamedSource, SourceSpan};

/// Name used in diagnostics when the caller does not supply one.
pub const DEFAULT_SOURCE_NAME: &str = "config.cfg";

/// Parses `KEY = VALUE` lines into an ordered map of typed values, decoding
/// each value by its key's grammar rule.
#[derive(Debug)]
pub struct Parser<'a> {
    name: String,
    source_text: &'a str,
    lines: Vec<Line<'a>>,
}

impl<'a> Parser<'a> {
    pub fn new(source_text: &'a str) -> Self {
        Self::new_with_name(source_text, DEFAULT_SOURCE_NAME.to_string())
    }

    pub fn new_with_name(source_text: &'a str, name: String) -> Self {
        let lines = Lexer::new(source_text).lex();
        Self {
            name,
            source_text,
            lines,
        }
    }

    /// Decodes every entry line. Comment, blank and text lines are skipped.
    ///
    /// # Errors
    /// Returns a `FormatError` on a duplicate key or a value that does not
    /// match its key's grammar.
    pub fn parse_document(&self) -> Result<ConfigMap, FormatError> {
        let mut config = ConfigMap::new();

        for line in &self.lines {
            let LineKind::Entry {
                key,
                key_start,
                value,
                value_start,
            } = line.kind
            else {
                continue;
            };

            if config.contains_key(key) {
                return Err(FormatError::DuplicateKey {
                    src: self.named_source(),
                    span: (key_start, key.len()).into(),
                    key: key.to_string(),
                    line: line.number,
                });
            }

            let tag = lookup(key);
            let decoded = decode_value(tag, value).map_err(|err| {
                self.value_error(err, key, tag, line.number, (value_start, value.len()).into())
            })?;
            trace!("{}:{}: {key} ({tag}) = {decoded:?}", self.name, line.number);
            config.insert(key.to_string(), decoded);
        }

        Ok(config)
    }

    fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(self.name.clone(), self.source_text.to_string())
    }

    fn value_error(
        &self,
        err: ValueError,
        key: &str,
        tag: TypeTag,
        line: usize,
        span: SourceSpan,
    ) -> FormatError {
        let src = self.named_source();
        let key = key.to_string();
        match err {
            ValueError::InvalidNumber { token, expected } => FormatError::InvalidNumber {
                src,
                span,
                key,
                token,
                expected,
                line,
            },
            ValueError::UnknownCode { code } => FormatError::UnknownDesignVariableCode {
                src,
                span,
                code,
                line,
            },
            ValueError::Malformed(reason) => FormatError::MalformedValue {
                src,
                span,
                key,
                tag,
                reason,
                line,
            },
        }
    }
}

/// Parses config text using the default source name.
///
/// # Errors
/// See [`Parser::parse_document`].
pub fn parse(text: &str) -> Result<ConfigMap, FormatError> {
    Parser::new(text).parse_document()
}

/// Why a raw value failed to decode. The parser attaches source context.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ValueError {
    InvalidNumber {
        token: String,
        expected: &'static str,
    },
    UnknownCode {
        code: String,
    },
    Malformed(String),
}

/// Decodes a trimmed raw value under `tag`.
pub(crate) fn decode_value(tag: TypeTag, raw: &str) -> Result<Value, ValueError> {
    match tag {
        TypeTag::StringScalar => Ok(Value::String(raw.to_string())),
        TypeTag::FloatScalar => parse_float(raw).map(Value::Float),
        TypeTag::IntScalar => parse_int(raw).map(Value::Int),
        TypeTag::BoolScalar => {
            let upper = raw.to_uppercase();
            Ok(Value::Bool(upper == "TRUE" || upper == "1"))
        }
        TypeTag::CommaStringList => Ok(Value::StringList(
            remove_whitespace(raw)
                .split(',')
                .map(str::to_string)
                .collect(),
        )),
        TypeTag::CommaFloatList => remove_whitespace(raw)
            .split(',')
            .map(parse_float)
            .collect::<Result<_, _>>()
            .map(Value::FloatList),
        TypeTag::SemicolonFloatListList => decode_float_groups(raw).map(Value::FloatListList),
        TypeTag::DesignVariableDefinition => {
            decode_design_variables(raw).map(Value::DesignVariables)
        }
        TypeTag::ObjectiveDefinition => decode_objective(raw).map(Value::Objective),
        TypeTag::ConstraintDefinition => decode_constraints(raw).map(Value::Constraints),
    }
}

fn parse_float(token: &str) -> Result<f64, ValueError> {
    token.parse().map_err(|_| ValueError::InvalidNumber {
        token: token.to_string(),
        expected: "float",
    })
}

fn parse_int(token: &str) -> Result<i64, ValueError> {
    token.parse().map_err(|_| ValueError::InvalidNumber {
        token: token.to_string(),
        expected: "integer",
    })
}

fn parse_float_list(text: &str) -> Result<Vec<f64>, ValueError> {
    text.split(',').map(parse_float).collect()
}

/// `( 0, 0.05 ); ( ); ...` where `( )` is the empty group of a flow-condition variable.
fn decode_float_groups(raw: &str) -> Result<Vec<Vec<f64>>, ValueError> {
    remove_whitespace(raw)
        .split(';')
        .filter(|segment| !segment.is_empty())
        .map(|segment| match strip_parens(segment) {
            "" => Ok(Vec::new()),
            group => parse_float_list(group),
        })
        .collect()
}

/// `( code, scale | marker, ... | param, ... ); ...`
fn decode_design_variables(raw: &str) -> Result<DesignVariableDefinition, ValueError> {
    let compact = remove_whitespace(raw);
    let mut definition = DesignVariableDefinition::new();
    if compact == NONE {
        return Ok(definition);
    }

    for segment in compact.split(';').filter(|segment| !segment.is_empty()) {
        let parts: Vec<&str> = strip_parens(segment).split('|').collect();
        if !(2..=3).contains(&parts.len()) {
            return Err(ValueError::Malformed(format!(
                "design variable `{segment}` must read `code, scale | markers | params`"
            )));
        }

        let (code, scale) = parts[0].split_once(',').ok_or_else(|| {
            ValueError::Malformed(format!("expected `code, scale`, found `{}`", parts[0]))
        })?;
        let kind = u32::try_from(parse_int(code)?)
            .ok()
            .and_then(dv_kind_name)
            .ok_or_else(|| ValueError::UnknownCode {
                code: code.to_string(),
            })?;
        let scale = parse_float(scale)?;
        let markers = parts[1].split(',').map(str::to_string).collect();

        let params = if takes_params(kind) {
            let params = parts.get(2).ok_or_else(|| {
                ValueError::Malformed(format!("`{kind}` design variable is missing its parameters"))
            })?;
            parse_float_list(params)?
        } else {
            Vec::new()
        };

        definition.push(kind.to_string(), scale, markers, params);
    }

    Ok(definition)
}

/// `name * scale`, scale defaulting to 1.
fn decode_objective(raw: &str) -> Result<ObjectiveDefinition, ValueError> {
    let compact = remove_whitespace(raw);
    let (name, scale) = match compact.split_once('*') {
        Some((name, scale)) => (name, parse_float(scale)?),
        None => (compact.as_str(), 1.0),
    };
    Ok(ObjectiveDefinition::single(name, scale))
}

/// `( name sign value ) * scale; ...` or `NONE`.
fn decode_constraints(raw: &str) -> Result<ConstraintDefinition, ValueError> {
    let compact = remove_whitespace(raw);
    if compact == NONE {
        return Ok(ConstraintDefinition::new());
    }

    let mut constraints = IndexMap::new();
    for segment in compact.split(';').filter(|segment| !segment.is_empty()) {
        let (body, scale) = match segment.split_once('*') {
            Some((body, scale)) => (body, parse_float(scale)?),
            None => (segment, 1.0),
        };

        // First sign in search order wins, even if a later one appears earlier in the text.
        let sign = Sign::SEARCH_ORDER
            .into_iter()
            .find(|sign| body.contains(sign.as_char()))
            .ok_or_else(|| {
                ValueError::Malformed(format!("constraint `{body}` has no `<`, `>` or `=` sign"))
            })?;

        let parts: Vec<&str> = strip_parens(body).split(sign.as_char()).collect();
        let &[name, value] = &parts[..] else {
            return Err(ValueError::Malformed(format!(
                "constraint `{body}` must read `name {sign} value`"
            )));
        };

        constraints.insert(
            name.to_string(),
            Constraint {
                sign,
                value: parse_float(value)?,
                scale,
            },
        );
    }

    Ok(ConstraintDefinition::partition(constraints))
}
