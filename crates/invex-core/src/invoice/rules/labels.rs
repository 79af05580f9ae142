//! Single-line label matching for header fields.
//!
//! Header values (invoice number, dates, order references) sit on their own line
//! behind a fixed label. Matching is independent of the item table scan.

/// A value found behind a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabeledValue<'a> {
    /// Index of the matching line.
    pub line_index: usize,
    /// Text after the label with separators trimmed.
    pub value: &'a str,
}

impl<'a> LabeledValue<'a> {
    /// First whitespace-separated token of the value.
    pub fn first_token(&self) -> Option<&'a str> {
        self.value.split_whitespace().next()
    }
}

/// Strip `label` from the start of `line`, ignoring ASCII case.
///
/// A label ending in a letter or digit only matches a whole word, so `Rechnung` does not
/// match `Rechnungsdatum`.
pub fn strip_label<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let line = line.trim_start();
    let head = line.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }

    let rest = &line[label.len()..];
    let label_ends_in_word = label.chars().last().is_some_and(char::is_alphanumeric);
    let rest_continues_word = rest.chars().next().is_some_and(char::is_alphanumeric);
    if label_ends_in_word && rest_continues_word {
        return None;
    }

    Some(rest.trim_start_matches(|c: char| c == ':' || c == '#' || c.is_whitespace()).trim_end())
}

/// Find the first line that starts with `label` and carries a value behind it.
pub fn find_labeled<'a>(lines: &[&'a str], label: &str) -> Option<LabeledValue<'a>> {
    lines.iter().enumerate().find_map(|(line_index, line)| {
        strip_label(line, label)
            .filter(|value| !value.is_empty())
            .map(|value| LabeledValue { line_index, value })
    })
}

/// First token behind `label`, the common case for numbers and references.
pub fn first_token_after<'a>(lines: &[&'a str], label: &str) -> Option<&'a str> {
    find_labeled(lines, label).and_then(|v| v.first_token())
}
