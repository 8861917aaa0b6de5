//! Repair passes for the describer's almost-JSON output, applied in order:
//! fence strip, object extraction, trailing-comma strip, control-character
//! escape, and as a last resort control-character strip.

use serde_json::Value;
use tracing::debug;

use super::DamageReportError;

const FENCES: [(&str, char); 2] = [("```", '`'), ("~~~", '~')];

/// Parses the describer's raw answer into a JSON value, repairing it on the way.
pub fn repair_and_parse(raw: &str) -> Result<Value, DamageReportError> {
    if raw.trim().is_empty() {
        return Err(DamageReportError::EmptyResponse);
    }

    let unfenced = strip_code_fences(raw);
    let span = extract_object_span(unfenced).ok_or(DamageReportError::NoJsonFound)?;
    let repaired = escape_control_chars(&strip_trailing_commas(span));

    match serde_json::from_str::<Value>(&repaired) {
        Ok(value) => Ok(value),
        Err(first_error) => {
            debug!(error = %first_error, "describer json still invalid, stripping control characters");
            let stripped = strip_control_chars(&repaired);
            serde_json::from_str::<Value>(&stripped)
                .map_err(|source| DamageReportError::UnparsableJson { source })
        }
    }
}

/// Drops a leading fence (with optional language tag) and a trailing fence.
pub(crate) fn strip_code_fences(raw: &str) -> &str {
    let mut text = raw.trim();

    for (fence, marker) in FENCES {
        if text.starts_with(fence) {
            let after = text
                .trim_start_matches(marker)
                .trim_start_matches([' ', '\t']);
            let tag_len = after
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '-' || c == '_'))
                .unwrap_or(after.len());
            text = after[tag_len..].trim_start();
        }
        if text.ends_with(fence) {
            text = text.trim_end_matches(marker).trim_end();
        }
    }

    text
}

/// Span from the first `{` to the last `}`.
pub(crate) fn extract_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

/// Walks `json` and hands every char to `visit` with whether it sits inside a string literal.
fn scan_strings(json: &str, mut visit: impl FnMut(usize, char, bool)) {
    let mut in_string = false;
    let mut escaped = false;

    for (index, c) in json.char_indices() {
        if in_string {
            let closes = !escaped && c == '"';
            escaped = !escaped && c == '\\';
            if closes {
                in_string = false;
            }
            // closing quote is reported as part of the literal
            visit(index, c, true);
        } else {
            if c == '"' {
                in_string = true;
            }
            visit(index, c, c == '"');
        }
    }
}

/// Removes `,` that directly precede `}` or `]`, leaving string contents alone.
pub(crate) fn strip_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    scan_strings(json, |index, c, in_string| {
        if !in_string && c == ',' {
            let next = json[index + 1..].chars().find(|n| !n.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                return;
            }
        }
        out.push(c);
    });
    out
}

/// Escapes raw newlines, carriage returns and tabs inside string literals.
pub(crate) fn escape_control_chars(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    scan_strings(json, |_, c, in_string| match (in_string, c) {
        (true, '\n') => out.push_str("\\n"),
        (true, '\r') => out.push_str("\\r"),
        (true, '\t') => out.push_str("\\t"),
        _ => out.push(c),
    });
    out
}

/// Drops control characters inside strings; outside keeps only JSON whitespace.
pub(crate) fn strip_control_chars(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    scan_strings(json, |_, c, in_string| {
        let keep = !c.is_control() || (!in_string && matches!(c, ' ' | '\n' | '\r' | '\t'));
        if keep {
            out.push(c);
        }
    });
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fences_are_stripped_in_any_casing() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```JSON {\"a\":1}```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("  ```\n{\"a\":1}\n```  "), "{\"a\":1}");
        assert_eq!(strip_code_fences("~~~json\n{}\n~~~"), "{}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn object_span_uses_first_and_last_brace() {
        assert_eq!(
            extract_object_span("Hier ist die Analyse: {\"a\":{\"b\":1}} Viel Erfolg!"),
            Some("{\"a\":{\"b\":1}}")
        );
        assert_eq!(extract_object_span("no json here"), None);
        assert_eq!(extract_object_span("} backwards {"), None);
    }

    #[test]
    fn trailing_commas_are_removed_outside_strings() {
        let input = "{\"a\": [1, 2, ], \"b\": \"x, }\", }";
        assert_eq!(strip_trailing_commas(input), "{\"a\": [1, 2 ], \"b\": \"x, }\" }");
    }

    #[test]
    fn newlines_inside_strings_are_escaped() {
        let input = "{\n  \"text\": \"line one\nline\ttwo\"\n}";
        let escaped = escape_control_chars(input);
        assert_eq!(escaped, "{\n  \"text\": \"line one\\nline\\ttwo\"\n}");
        let value: Value = serde_json::from_str(&escaped).expect("escaped json parses");
        assert_eq!(value["text"], "line one\nline\ttwo");
    }

    #[test]
    fn escaped_quotes_do_not_end_strings() {
        let input = "{\"a\": \"say \\\"hi\\\",\", }";
        assert_eq!(strip_trailing_commas(input), "{\"a\": \"say \\\"hi\\\",\" }");
    }

    #[test]
    fn control_characters_are_stripped_on_second_pass() {
        let raw = "{\"bauteil\": \"Sto\u{0007}ßstange\", \"x\": 1\u{000c}}";
        let value = repair_and_parse(raw).expect("second pass recovers");
        assert_eq!(value, json!({ "bauteil": "Stoßstange", "x": 1 }));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert!(matches!(
            repair_and_parse("   \n"),
            Err(DamageReportError::EmptyResponse)
        ));
    }

    #[test]
    fn missing_object_is_rejected() {
        assert!(matches!(
            repair_and_parse("Leider konnte ich die Bilder nicht auswerten."),
            Err(DamageReportError::NoJsonFound)
        ));
    }

    #[test]
    fn broken_structure_is_unparsable() {
        assert!(matches!(
            repair_and_parse("{\"bauteil\": \"Tür\" \"schweregrad\": 4}"),
            Err(DamageReportError::UnparsableJson { .. })
        ));
    }
}
