//! Best-effort extraction of a JSON object embedded in an HTML page.
//!
//! This is not an HTML parser. It finds a marker, takes the first `{` after
//! it and balances braces (ignoring braces inside string literals) to cut out
//! one syntactically complete object.

use serde_json::Value;

/// Assignment that precedes the app state blob on quote pages.
pub const APP_STATE_MARKER: &str = "root.App.main = ";

/// Path from the app state blob down to the quote summary store.
pub const QUOTE_SUMMARY_STORE_PATH: [&str; 4] =
    ["context", "dispatcher", "stores", "QuoteSummaryStore"];

/// Cut out and parse the JSON object that follows `marker`.
///
/// On a first parse failure, trailing commas before `}`/`]` are stripped and
/// the parse is retried once. Returns `None` when the marker is absent, the
/// braces never balance, or both parses fail.
pub fn extract_embedded_json(html: &str, marker: &str) -> Option<Value> {
    let after_marker = html.find(marker)? + marker.len();
    let open = after_marker + html[after_marker..].find('{')?;
    let candidate = balanced_object(&html[open..])?;

    match serde_json::from_str::<Value>(candidate) {
        Ok(value) if value.is_object() => Some(value),
        Ok(_) => None,
        Err(_) => serde_json::from_str::<Value>(&strip_trailing_commas(candidate))
            .ok()
            .filter(Value::is_object),
    }
}

/// Walk `path` through nested objects.
pub fn select<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(key))
}

/// Slice of `text` (which starts at `{`) up to its matching `}`.
fn balanced_object(text: &str) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (index, ch) in text.char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(&text[..=index]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Remove commas that are followed only by whitespace and a closing bracket.
fn strip_trailing_commas(text: &str) -> String {
    let chars = text.chars().collect::<Vec<_>>();
    let mut output = String::with_capacity(text.len());
    let mut in_string = false;
    let mut escaped = false;

    for (index, &ch) in chars.iter().enumerate() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            output.push(ch);
            continue;
        }

        if ch == ',' {
            let next = chars[index + 1..].iter().find(|c| !c.is_whitespace());
            if matches!(next, Some('}') | Some(']')) {
                continue;
            }
        }
        if ch == '"' {
            in_string = true;
        }
        output.push(ch);
    }

    output
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn extracts_object_after_marker() {
        let html = r#"<script>root.App.main = {"a":{"b":1}};
(function(root) {}(this));</script>"#;
        assert_eq!(
            extract_embedded_json(html, APP_STATE_MARKER),
            Some(json!({"a": {"b": 1}}))
        );
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        let html = r#"x = {"text":"a } b { \" }","n":2} trailing }"#;
        assert_eq!(
            extract_embedded_json(html, "x = "),
            Some(json!({"text": "a } b { \" }", "n": 2}))
        );
    }

    #[test]
    fn trailing_commas_are_tolerated() {
        let html = r#"x = {"list":[1,2,],"obj":{"k":"v",},}"#;
        assert_eq!(
            extract_embedded_json(html, "x = "),
            Some(json!({"list": [1, 2], "obj": {"k": "v"}}))
        );
    }

    #[test]
    fn commas_inside_strings_survive_the_lenient_pass() {
        let html = r#"x = {"s":",}","t":[1,],}"#;
        assert_eq!(
            extract_embedded_json(html, "x = "),
            Some(json!({"s": ",}", "t": [1]}))
        );
    }

    #[test]
    fn missing_marker_or_unbalanced_object_is_none() {
        assert_eq!(extract_embedded_json("<html></html>", APP_STATE_MARKER), None);
        assert_eq!(extract_embedded_json(r#"x = {"a":{"b":1}"#, "x = "), None);
        assert_eq!(extract_embedded_json(r#"x = {"a":nope}"#, "x = "), None);
    }

    #[test]
    fn select_walks_nested_keys() {
        let value = json!({"context": {"dispatcher": {"stores": {"QuoteSummaryStore": {"x": 1}}}}});
        assert_eq!(
            select(&value, &QUOTE_SUMMARY_STORE_PATH),
            Some(&json!({"x": 1}))
        );
        assert_eq!(select(&value, &["context", "missing"]), None);
    }
}
