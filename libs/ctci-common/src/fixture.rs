//! Line-counted fixture format (`tests.txt`).
//!
//! ```text
//! <T>
//! <N_1>
//! <input line 1> ... <input line N_1>
//! <expected_1>
//! <N_2>
//! ...
//! ```
//!
//! Every line is content. Blank lines are legitimate inputs or expected
//! values and are never skipped. Lines past the last declared case are ignored.

use crate::error::FixtureError;
use crate::types::TestCase;

/// Forward-only cursor that remembers how many lines it has handed out.
///
/// `\r\n`, `\n` and a lone `\r` each end a line. A terminator at the very
/// end of the text does not start another line.
struct LineCursor<'a> {
    rest: &'a str,
    consumed: usize,
}

impl<'a> LineCursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { rest: text, consumed: 0 }
    }

    fn next_line_number(&self) -> usize {
        self.consumed + 1
    }

    fn take(&mut self) -> Option<&'a str> {
        if self.rest.is_empty() {
            return None;
        }

        let (line, rest) = match self.rest.find(|c| c == '\r' || c == '\n') {
            Some(end) => {
                let terminator = if self.rest[end..].starts_with("\r\n") { 2 } else { 1 };
                (&self.rest[..end], &self.rest[end + terminator..])
            }
            None => (self.rest, ""),
        };
        self.rest = rest;
        self.consumed += 1;
        Some(line)
    }
}

/// Count lines tolerate surrounding whitespace and a leading `+`.
fn parse_count(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()
}

/// Parse fixture text into its ordered test cases.
pub fn parse(text: &str) -> Result<Vec<TestCase>, FixtureError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut cursor = LineCursor::new(text);

    let header = cursor.take().ok_or(FixtureError::Empty)?;
    let total = parse_count(header).ok_or_else(|| FixtureError::InvalidTestCount {
        value: header.to_string(),
    })?;

    // The header is untrusted; cap the preallocation.
    let mut cases = Vec::with_capacity(total.min(1024));

    for case in 1..=total {
        let line = cursor.next_line_number();
        let raw_count = cursor
            .take()
            .ok_or(FixtureError::MissingInputCount { case, line })?;
        let declared = parse_count(raw_count).ok_or_else(|| FixtureError::InvalidInputCount {
            case,
            line,
            value: raw_count.to_string(),
        })?;

        let mut inputs = Vec::with_capacity(declared.min(1024));
        for found in 0..declared {
            match cursor.take() {
                Some(input) => inputs.push(input.to_string()),
                None => {
                    return Err(FixtureError::TruncatedInputs {
                        case,
                        declared,
                        found,
                    })
                }
            }
        }

        let line = cursor.next_line_number();
        let expected = cursor
            .take()
            .ok_or(FixtureError::MissingExpected { case, line })?;

        cases.push(TestCase::new(inputs, expected));
    }

    Ok(cases)
}

/// Render cases back into fixture text.
///
/// Inputs and expected values must not contain `\r` or `\n`.
pub fn render(cases: &[TestCase]) -> String {
    let mut out = format!("{}\n", cases.len());
    for case in cases {
        out.push_str(&format!("{}\n", case.inputs().len()));
        for input in case.inputs() {
            out.push_str(input);
            out.push('\n');
        }
        out.push_str(case.expected());
        out.push('\n');
    }
    out
}
