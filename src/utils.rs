/// Removes every whitespace character, including interior ones.
/// List and structured values are decoded from this compacted form.
pub fn remove_whitespace(text: &str) -> String {
    text.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Strips any run of `(` and `)` characters from both ends.
pub fn strip_parens(text: &str) -> &str {
    text.trim_matches(|c| c == '(' || c == ')')
}

/// Renders a float in its shortest form that parses back to the same value,
/// always keeping a decimal point or exponent (`1.0`, `0.8`, `1e20`).
pub fn format_float(value: f64) -> String {
    format!("{value:?}")
}

/// Joins already formatted items with `", "`.
pub fn join_comma<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = String::new();
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(item.as_ref());
    }
    out
}
