/// The classification of a single line of a config file.
#[derive(Debug, PartialEq, Clone)]
pub enum LineKind<'a> {
    /// Empty or whitespace-only.
    Blank,
    /// First non-whitespace character is `%`. Never parsed, even if it holds an `=`.
    Comment,
    /// Non-blank line without an `=`. Ignored by the parser, passed through by the serializer.
    Text,
    /// A `KEY = VALUE` line, split on the first `=`. Both sides are trimmed.
    Entry {
        key: &'a str,
        key_start: usize,
        value: &'a str,
        value_start: usize,
    },
}

/// A line with its position in the source.
#[derive(Debug, Clone)]
pub struct Line<'a> {
    pub kind: LineKind<'a>,
    /// The line exactly as it appears in the source, terminator included.
    pub raw: &'a str,
    /// 1-based line number.
    pub number: usize,
    pub pos_start: usize,
    pub pos_end: usize,
}

pub struct Lexer<'a> {
    input: &'a str,
    position: usize,
    line: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            position: 0,
            line: 0,
        }
    }

    pub fn lex(&mut self) -> Vec<Line<'a>> {
        self.by_ref().collect()
    }

    fn next_line(&mut self) -> Option<Line<'a>> {
        if self.position >= self.input.len() {
            return None;
        }
        let rest = &self.input[self.position..];
        let len = rest.find('\n').map_or(rest.len(), |i| i + 1);
        let raw = &rest[..len];
        let pos_start = self.position;

        self.position += len;
        self.line += 1;

        let content = raw.trim_end_matches(['\r', '\n']);
        Some(Line {
            kind: classify(content, pos_start),
            raw,
            number: self.line,
            pos_start,
            pos_end: self.position,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}

fn classify(content: &str, pos_start: usize) -> LineKind<'_> {
    let trimmed = content.trim_start();
    if trimmed.is_empty() {
        return LineKind::Blank;
    }
    if trimmed.starts_with('%') {
        return LineKind::Comment;
    }
    let Some(eq) = content.find('=') else {
        return LineKind::Text;
    };

    let key_part = &content[..eq];
    let value_part = &content[eq + 1..];
    LineKind::Entry {
        key: key_part.trim(),
        key_start: pos_start + leading_whitespace(key_part),
        value: value_part.trim(),
        value_start: pos_start + eq + 1 + leading_whitespace(value_part),
    }
}

fn leading_whitespace(text: &str) -> usize {
    text.len() - text.trim_start().len()
}
