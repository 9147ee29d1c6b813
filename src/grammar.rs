use std::fmt::Display;

/// The syntactic shape of a key's value. Parser and serializer both dispatch
/// on this tag, so one table drives both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    StringScalar,
    FloatScalar,
    IntScalar,
    BoolScalar,
    /// `a, b, c`
    CommaStringList,
    /// `1.0, 2.0, 3.0`
    CommaFloatList,
    /// `( 1.0, 2.0 ); ( 3.0, 4.0 )`
    SemicolonFloatListList,
    /// `( code, scale | markers | params ); ...`
    DesignVariableDefinition,
    /// `name * scale`
    ObjectiveDefinition,
    /// `( name sign value ) * scale; ...` or `NONE`
    ConstraintDefinition,
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TypeTag::StringScalar => "string",
            TypeTag::FloatScalar => "float",
            TypeTag::IntScalar => "integer",
            TypeTag::BoolScalar => "boolean",
            TypeTag::CommaStringList => "comma-separated string list",
            TypeTag::CommaFloatList => "comma-separated float list",
            TypeTag::SemicolonFloatListList => "semicolon-separated float lists",
            TypeTag::DesignVariableDefinition => "design variable definition",
            TypeTag::ObjectiveDefinition => "objective definition",
            TypeTag::ConstraintDefinition => "constraint definition",
        };
        write!(f, "{name}")
    }
}

/// Returns the grammar rule for `key`. Keys not listed here are plain strings,
/// so parameters added to the solver later still round-trip.
#[must_use]
pub fn lookup(key: &str) -> TypeTag {
    match key {
        "TASKS" | "GRADIENTS" | "DV_KIND" => TypeTag::CommaStringList,
        "DV_PARAM" => TypeTag::SemicolonFloatListList,
        "DV_VALUE_OLD" | "DV_VALUE_NEW" => TypeTag::CommaFloatList,
        "MACH_NUMBER" | "AoA" | "FIN_DIFF_STEP" | "WRT_SOL_FREQ" => TypeTag::FloatScalar,
        "DECOMPOSED" => TypeTag::BoolScalar,
        "NUMBER_PART" | "AVAILABLE_PROC" | "EXT_ITER" | "TIME_INSTANCES" | "ADAPT_CYCLES" => {
            TypeTag::IntScalar
        }
        "DEFINITION_DV" => TypeTag::DesignVariableDefinition,
        "OPT_OBJECTIVE" => TypeTag::ObjectiveDefinition,
        "OPT_CONSTRAINT" => TypeTag::ConstraintDefinition,
        _ => TypeTag::StringScalar,
    }
}

/// Key assigned by the solver driver at run time. It never has a template
/// line, so it is not reported as unwritten.
pub const JOB_NUMBER: &str = "JOB_NUMBER";

/// Written for an empty design variable or constraint definition.
pub const NONE: &str = "NONE";

/// Design variable kind codes as they appear in `DEFINITION_DV`.
const DV_KINDS: &[(u32, &str)] = &[
    (1, "HICKS_HENNE"),
    (2, "COSINE_BUMP"),
    (3, "SPHERICAL"),
    (4, "NACA_4DIGITS"),
    (5, "DISPLACEMENT"),
    (6, "ROTATION"),
    (7, "FFD_CONTROL_POINT"),
    (8, "FFD_DIHEDRAL_ANGLE"),
    (9, "FFD_TWIST_ANGLE"),
    (10, "FFD_ROTATION"),
    (11, "FFD_CAMBER"),
    (12, "FFD_THICKNESS"),
    (13, "FFD_VOLUME"),
    (101, "MACH_NUMBER"),
    (102, "AOA"),
];

#[must_use]
pub fn dv_kind_name(code: u32) -> Option<&'static str> {
    DV_KINDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
}

#[must_use]
pub fn dv_kind_code(name: &str) -> Option<u32> {
    DV_KINDS
        .iter()
        .find(|(_, n)| *n == name)
        .map(|(code, _)| *code)
}

/// Flow-condition kinds carry no parameter list.
#[must_use]
pub fn takes_params(kind: &str) -> bool {
    !matches!(kind, "AOA" | "MACH_NUMBER")
}
