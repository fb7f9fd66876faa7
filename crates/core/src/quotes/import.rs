//! Import and export of quote files.
//!
//! Import is permissive: any array element that is an object with string
//! `text` and `category` fields becomes a quote, everything else is dropped.

use log::debug;
use serde_json::Value;

use super::{ImportError, Quote};

/// Quotes accepted from an import payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedImport {
    pub quotes: Vec<Quote>,
    pub skipped: usize,
}

/// Parse an import payload.
///
/// Elements without a usable `id` (missing, zero or not an integer) get
/// fresh ids past both `current_max_id` and every id carried by the payload.
pub fn parse_import(raw: &str, current_max_id: i64) -> Result<ParsedImport, ImportError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| ImportError::InvalidJson(e.to_string()))?;

    let Value::Array(items) = value else {
        return Err(ImportError::NotAnArray);
    };

    let total = items.len();
    let candidates: Vec<(Option<i64>, String, String)> = items
        .iter()
        .filter_map(|item| {
            let obj = item.as_object()?;
            let text = obj.get("text")?.as_str()?;
            let category = obj.get("category")?.as_str()?;
            let id = obj
                .get("id")
                .and_then(Value::as_i64)
                .filter(|id| *id != 0);
            Some((id, text.to_string(), category.to_string()))
        })
        .collect();

    if candidates.is_empty() {
        return Err(ImportError::NoValidQuotes);
    }

    let mut next_id = candidates
        .iter()
        .filter_map(|(id, _, _)| *id)
        .fold(current_max_id.max(0), i64::max);

    let mut quotes = Vec::with_capacity(candidates.len());
    for (id, text, category) in candidates {
        let id = match id {
            Some(id) => id,
            None => {
                next_id = next_id
                    .checked_add(1)
                    .ok_or(ImportError::IdsExhausted(next_id))?;
                next_id
            }
        };
        quotes.push(Quote::new(id, text, category));
    }

    let skipped = total - quotes.len();
    debug!(
        "Parsed import payload: {} accepted, {} skipped",
        quotes.len(),
        skipped
    );

    Ok(ParsedImport { quotes, skipped })
}

/// Serialize quotes as the indented JSON document offered for download.
pub fn export_json(quotes: &[Quote]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(quotes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drops_invalid_elements() {
        let parsed = parse_import(r#"[{"text":"X","category":"Y"},{"bad":1}]"#, 5).unwrap();

        assert_eq!(parsed.quotes, vec![Quote::new(6, "X", "Y")]);
        assert_eq!(parsed.skipped, 1);
    }

    #[test]
    fn test_keeps_supplied_ids_and_assigns_past_them() {
        let raw = r#"[
            {"id": 40, "text": "a", "category": "c"},
            {"text": "b", "category": "c"},
            {"id": "nope", "text": "d", "category": "c"}
        ]"#;
        let parsed = parse_import(raw, 3).unwrap();

        let ids: Vec<i64> = parsed.quotes.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![40, 41, 42]);
    }

    #[test]
    fn test_largest_id_is_kept() {
        let raw = r#"[{"id": 9223372036854775807, "text": "a", "category": "c"}]"#;
        let parsed = parse_import(raw, 3).unwrap();
        assert_eq!(parsed.quotes[0].id, i64::MAX);
    }

    #[test]
    fn test_no_id_left_after_largest_id() {
        let raw = r#"[
            {"id": 9223372036854775807, "text": "a", "category": "c"},
            {"text": "b", "category": "c"}
        ]"#;
        assert_eq!(
            parse_import(raw, 3),
            Err(ImportError::IdsExhausted(i64::MAX))
        );
    }

    #[test]
    fn test_zero_id_is_replaced() {
        let parsed = parse_import(r#"[{"id":0,"text":"a","category":"c"}]"#, 2).unwrap();
        assert_eq!(parsed.quotes[0].id, 3);
    }

    #[test]
    fn test_non_string_fields_are_dropped() {
        let raw = r#"[{"text": 1, "category": "c"}, {"text": "t", "category": null}, "str", null]"#;
        assert_eq!(parse_import(raw, 0), Err(ImportError::NoValidQuotes));
    }

    #[test]
    fn test_empty_strings_are_accepted() {
        let parsed = parse_import(r#"[{"text":"","category":""}]"#, 0).unwrap();
        assert_eq!(parsed.quotes, vec![Quote::new(1, "", "")]);
    }

    #[test]
    fn test_rejects_non_array() {
        assert_eq!(
            parse_import(r#"{"text":"X","category":"Y"}"#, 0),
            Err(ImportError::NotAnArray)
        );
    }

    #[test]
    fn test_rejects_invalid_json() {
        assert!(matches!(
            parse_import("not json", 0),
            Err(ImportError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_rejects_empty_array() {
        assert_eq!(parse_import("[]", 0), Err(ImportError::NoValidQuotes));
    }

    #[test]
    fn test_export_is_indented() {
        let json = export_json(&[Quote::new(1, "a", "b")]).unwrap();
        assert!(json.starts_with("[\n  {\n    \"id\": 1,"));
    }

    #[test]
    fn test_export_then_import_preserves_ids() {
        let original = vec![Quote::new(7, "a", "b"), Quote::new(2, "c", "d")];
        let json = export_json(&original).unwrap();

        let parsed = parse_import(&json, 0).unwrap();
        assert_eq!(parsed.quotes, original);
        assert_eq!(parsed.skipped, 0);
    }
}
