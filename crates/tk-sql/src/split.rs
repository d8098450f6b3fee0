//! Splitting migration scripts into statements.

/// Scanner position relative to quoting and comments.
#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    Code,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

/// Split `script` into statements on `delimiter`.
///
/// Delimiters inside single-quoted strings, double-quoted identifiers, and
/// `--` / `/* */` comments do not split. Each statement is trimmed, and
/// segments holding only whitespace or comments are dropped. An empty
/// delimiter yields the whole script as a single statement.
pub fn split_statements<'a>(script: &'a str, delimiter: &str) -> Vec<&'a str> {
    let bytes = script.as_bytes();
    let delim = delimiter.as_bytes();
    let mut statements = Vec::new();
    let mut state = State::Code;
    let mut start = 0;
    let mut has_code = false;
    let mut i = 0;

    while i < bytes.len() {
        let rest = &bytes[i..];
        match state {
            State::Code => {
                if !delim.is_empty() && rest.starts_with(delim) {
                    push_segment(&mut statements, &script[start..i], has_code);
                    i += delim.len();
                    start = i;
                    has_code = false;
                    continue;
                }
                if rest.starts_with(b"--") {
                    state = State::LineComment;
                    i += 2;
                    continue;
                }
                if rest.starts_with(b"/*") {
                    state = State::BlockComment;
                    i += 2;
                    continue;
                }
                match bytes[i] {
                    b'\'' => state = State::SingleQuoted,
                    b'"' => state = State::DoubleQuoted,
                    _ => {}
                }
                if !bytes[i].is_ascii_whitespace() {
                    has_code = true;
                }
            }
            State::SingleQuoted => {
                if bytes[i] == b'\'' {
                    state = State::Code;
                }
            }
            State::DoubleQuoted => {
                if bytes[i] == b'"' {
                    state = State::Code;
                }
            }
            State::LineComment => {
                if bytes[i] == b'\n' {
                    state = State::Code;
                }
            }
            State::BlockComment => {
                if rest.starts_with(b"*/") {
                    state = State::Code;
                    i += 2;
                    continue;
                }
            }
        }
        i += 1;
    }
    push_segment(&mut statements, &script[start..], has_code);
    statements
}

fn push_segment<'a>(statements: &mut Vec<&'a str>, segment: &'a str, has_code: bool) {
    if has_code {
        statements.push(segment.trim());
    }
}

#[cfg(test)]
#[path = "split_test.rs"]
mod tests;
