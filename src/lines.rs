/// Split content on `\r?\n`.
///
/// A trailing newline yields a trailing empty line. That line must be kept:
/// the numbered view handed to the model and the line counts used for
/// clamping both derive from this split.
pub fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Render content with 1-based line numbers, one `"<n>: <line>"` entry per
/// line, joined by `\n`.
pub fn number_lines(content: &str) -> String {
    split_lines(content)
        .iter()
        .enumerate()
        .map(|(index, line)| format!("{}: {}", index + 1, line))
        .collect::<Vec<_>>()
        .join("\n")
}
