//! Best-effort recovery of JSON embedded in model output.
//!
//! Models wrap JSON in code fences, surround it with prose, and cut it off
//! when they hit the output limit. These functions locate the JSON span and,
//! for objects, close a truncated one so its complete members survive.
//! Every function is pure: text in, value or `None` out.

use serde_json::{Map, Value};

/// Remove Markdown code-fence markers (```` ```json ```` or bare ```` ``` ````)
/// and the whitespace that follows them, then trim.
pub fn strip_code_fences(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(pos) = rest.find("```") {
        out.push_str(&rest[..pos]);
        let mut after = &rest[pos + 3..];
        if after
            .get(..4)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("json"))
        {
            after = &after[4..];
        }
        rest = after.trim_start();
    }
    out.push_str(rest);

    out.trim().to_string()
}

/// Locate and parse the first JSON object in `text`.
///
/// Tries, in order: the greedy span from the first `{` to the last `}`, the
/// first balanced object, and finally [`repair_truncated_object`] when the
/// object never closes.
pub fn extract_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;

    if let Some(end) = text.rfind('}')
        && end > start
        && let Some(map) = parse_object(&text[start..=end])
    {
        return Some(map);
    }

    let candidate = &text[start..];
    match scan(candidate) {
        Scan::Balanced { end } => parse_object(&candidate[..=end]),
        Scan::Truncated { .. } => repair_truncated_object(candidate),
    }
}

/// Locate and parse the first JSON array in `text`.
///
/// Arrays are not repaired: a truncated array yields `None`.
pub fn extract_array(text: &str) -> Option<Vec<Value>> {
    let start = text.find('[')?;

    if let Some(end) = text.rfind(']')
        && end > start
        && let Ok(Value::Array(items)) = serde_json::from_str(&text[start..=end])
    {
        return Some(items);
    }

    let candidate = &text[start..];
    match scan(candidate) {
        Scan::Balanced { end } => match serde_json::from_str(&candidate[..=end]) {
            Ok(Value::Array(items)) => Some(items),
            _ => None,
        },
        Scan::Truncated { .. } => None,
    }
}

/// Close a JSON object whose text was cut off before its final `}`.
///
/// The text is taken from its first `{`. A member left incomplete by the cut
/// (an unterminated string, a key with no value) is dropped so it cannot
/// leak a half-written value. A dangling comma is removed, any open string is
/// closed with `"`, and a closing bracket is appended for every container
/// still open. The result must parse as an object; otherwise `None`. An
/// empty object recovered from more than one unclosed `{` is also `None`.
///
/// Text that is already balanced is parsed as-is.
pub fn repair_truncated_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let candidate = &text[start..];

    let (in_string, open, last_comma) = match scan(candidate) {
        Scan::Balanced { end } => return parse_object(&candidate[..=end]),
        Scan::Truncated {
            in_string,
            open,
            last_comma,
        } => (in_string, open, last_comma),
    };

    // Cutting back to the last member boundary (or to just after the opening
    // brace when no member completed) drops the unfinished tail.
    let (cut, cut_open) = last_comma.unwrap_or((1, vec!['{']));
    let dropped_tail = close_and_parse(&candidate[..cut], false, &cut_open);

    let repaired = if in_string {
        dropped_tail.or_else(|| close_and_parse(candidate, true, &open))
    } else {
        close_and_parse(candidate, false, &open).or(dropped_tail)
    };

    // An empty result from several unclosed objects is noise, not a record.
    let unclosed_objects = open.iter().filter(|b| **b == '{').count();
    repaired.filter(|map| !map.is_empty() || unclosed_objects <= 1)
}

fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn close_and_parse(fragment: &str, in_string: bool, open: &[char]) -> Option<Map<String, Value>> {
    let mut repaired = fragment.to_string();
    if in_string {
        repaired.push('"');
    }

    let kept = repaired.trim_end().trim_end_matches(',').trim_end().len();
    repaired.truncate(kept);

    for bracket in open.iter().rev() {
        repaired.push(if *bracket == '{' { '}' } else { ']' });
    }

    parse_object(&repaired)
}

/// Outcome of walking a JSON fragment that starts with `{` or `[`.
enum Scan {
    /// The opening bracket is closed at byte offset `end`.
    Balanced { end: usize },
    /// The text ended with containers still open.
    Truncated {
        in_string: bool,
        /// Open brackets, outermost first.
        open: Vec<char>,
        /// Byte offset of the last comma outside a string, with the brackets
        /// open at that point.
        last_comma: Option<(usize, Vec<char>)>,
    },
}

fn scan(text: &str) -> Scan {
    let mut open: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut last_comma = None;

    for (i, c) in text.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' | '[' => open.push(c),
            '}' | ']' => {
                open.pop();
                if open.is_empty() {
                    return Scan::Balanced { end: i };
                }
            }
            ',' => last_comma = Some((i, open.clone())),
            _ => {}
        }
    }

    Scan::Truncated {
        in_string,
        open,
        last_comma,
    }
}
