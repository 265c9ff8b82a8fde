//! JSON decoding that reports where in the document a mismatch happened.

use anyhow::Result;

/// Decode `body` into `T`. On failure the error names the serde path
/// (e.g. `[3].members[0]`), the line/column, and a short excerpt of the input.
pub fn decode_with_context<T: serde::de::DeserializeOwned>(body: &str) -> Result<T> {
    let de = &mut serde_json::Deserializer::from_str(body);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let path = err.path().to_string();
        let inner = err.inner();
        let (line, column) = (inner.line(), inner.column());

        let msg = inner.to_string();
        let msg = msg
            .strip_suffix(&format!(" at line {line} column {column}"))
            .unwrap_or(&msg)
            .to_owned();

        let location = if path.is_empty() || path == "." {
            String::new()
        } else {
            format!("at path '{path}': ")
        };
        anyhow::anyhow!(
            "{location}{} (line {line} col {column})\n{}",
            describe_mismatch(&msg),
            excerpt(body, line, column, 24)
        )
    })
}

/// Rewrite "invalid type: X, expected Y" into "expected Y, got X".
fn describe_mismatch(msg: &str) -> String {
    if let Some(rest) = msg.strip_prefix("invalid type: ")
        && let Some((actual, expected)) = rest.split_once(", expected ")
    {
        return format!("expected {expected}, got {actual}");
    }
    msg.to_owned()
}

fn excerpt(body: &str, line: usize, column: usize, width: usize) -> String {
    let text = body.lines().nth(line.saturating_sub(1)).unwrap_or("");
    if text.is_empty() {
        return "(empty line)".to_owned();
    }
    let chars: Vec<char> = text.chars().collect();
    let at = column.saturating_sub(1).min(chars.len());
    let start = at.saturating_sub(width / 2);
    let end = (at + width / 2).min(chars.len());
    let slice: String = chars[start..end].iter().collect();
    format!("...{slice}...\n   {}^", " ".repeat(at - start))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[allow(dead_code)]
    struct Band {
        id: i32,
        members: Vec<String>,
    }

    #[test]
    fn mismatch_is_reworded() {
        assert_eq!(
            describe_mismatch("invalid type: null, expected a string"),
            "expected a string, got null"
        );
        assert_eq!(describe_mismatch("trailing characters"), "trailing characters");
    }

    #[test]
    fn error_names_the_path() {
        let body = r#"[{"id": 1, "members": ["Freddie", null]}]"#;
        let err = decode_with_context::<Vec<Band>>(body).unwrap_err().to_string();
        assert!(err.contains("[0].members[1]"), "{err}");
        assert!(err.contains("expected a string, got null"), "{err}");
    }

    #[test]
    fn valid_document_decodes() {
        let bands: Vec<Band> = decode_with_context(r#"[{"id": 2, "members": []}]"#).unwrap();
        assert_eq!(bands[0].id, 2);
    }

    #[test]
    fn excerpt_handles_multibyte_input() {
        let out = excerpt("{\"name\": \"Beyoncé\", \"id\": x}", 1, 27, 10);
        assert!(out.contains('^'));
    }
}
