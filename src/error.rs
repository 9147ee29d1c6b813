use crate::grammar::TypeTag;
use miette::{Diagnostic, NamedSource, SourceSpan};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ConfigError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to access config file `{}`", path.display())]
    #[diagnostic(code(config::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config has no filename to write back to")]
    #[diagnostic(code(config::no_filename))]
    NoFilename,

    #[error("Config parameter `{key}` not found")]
    #[diagnostic(code(config::missing_key))]
    MissingKey { key: String },

    #[error("Design vector has {found} entries, but DEFINITION_DV defines {expected} variables")]
    #[diagnostic(
        code(config::design_vector_length),
        help("Pass one value per design variable, in DEFINITION_DV order.")
    )]
    DesignVectorLength { expected: usize, found: usize },
}

/// A config file, or a value about to be written to one, does not match
/// the grammar of its key.
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum FormatError {
    #[error("Duplicate key `{key}` on line {line}")]
    #[diagnostic(
        code(format::duplicate_key),
        help("Each parameter may be specified only once per file.")
    )]
    DuplicateKey {
        #[source_code]
        src: NamedSource<String>,
        #[label("`{key}` was already set")]
        span: SourceSpan,
        key: String,
        line: usize,
    },

    #[error("Invalid {expected} `{token}` for `{key}` on line {line}")]
    #[diagnostic(code(format::invalid_number))]
    InvalidNumber {
        #[source_code]
        src: NamedSource<String>,
        #[label("expected {expected}")]
        span: SourceSpan,
        key: String,
        token: String,
        expected: &'static str,
        line: usize,
    },

    #[error("Unknown design variable code `{code}` on line {line}")]
    #[diagnostic(code(format::unknown_dv_code))]
    UnknownDesignVariableCode {
        #[source_code]
        src: NamedSource<String>,
        #[label("no design variable kind has this code")]
        span: SourceSpan,
        code: String,
        line: usize,
    },

    #[error("Malformed {tag} for `{key}` on line {line}: {reason}")]
    #[diagnostic(code(format::malformed_value))]
    MalformedValue {
        #[source_code]
        src: NamedSource<String>,
        #[label("{reason}")]
        span: SourceSpan,
        key: String,
        tag: TypeTag,
        reason: String,
        line: usize,
    },

    #[error("`{key}` must hold exactly one objective, found {count}")]
    #[diagnostic(code(format::objective_count))]
    ObjectiveCount { key: String, count: usize },

    #[error("Design variable sequences of `{key}` differ in length")]
    #[diagnostic(
        code(format::design_variable_shape),
        help("KIND, SCALE, MARKER and PARAM need one entry per design variable.")
    )]
    DesignVariableShape { key: String },

    #[error("Design variable kind `{kind}` in `{key}` has no code")]
    #[diagnostic(code(format::unknown_dv_kind))]
    UnknownDesignVariableKind { key: String, kind: String },

    #[error("Cannot write a {found} to `{key}`, which expects a {expected}")]
    #[diagnostic(code(format::value_shape))]
    ValueShape {
        key: String,
        expected: TypeTag,
        found: &'static str,
    },
}
