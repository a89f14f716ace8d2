//! Input normalization for incoming style parameters.
//!
//! Every field is clamped or defaulted here before anything downstream sees
//! it; the rest of the pipeline never touches raw request values. Individual
//! malformed fields degrade to their defaults — only an unparsable body is
//! rejected, and that happens at the HTTP layer.

use serde_json::Value;

/// Keyword lists are capped so the composer never has to bound them itself.
pub const MAX_KEYWORDS: usize = 8;
pub const MAX_COUNT: u32 = 5;
pub const DEFAULT_RECENCY_DAYS: u32 = 3;
pub const DEFAULT_MAX_ARTICLES: usize = 6;

/// Free-theme marker used when no theme was supplied.
pub const FREE_THEME: &str = "自由";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Current,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Normal => "normal",
            Mode::Current => "current",
        }
    }
}

/// A fully validated style request. Invariant: all numeric fields are within
/// their documented ranges by the time this struct exists.
#[derive(Clone, Debug)]
pub struct StyleRequest {
    pub mode: Mode,
    pub theme: String,
    pub keywords: Vec<String>,
    pub satire_level: u8,
    pub elegance_level: u8,
    pub count: u32,
    pub recency_days: u32,
    pub max_articles: usize,
    pub include_citations: bool,
}

impl StyleRequest {
    /// Normalize an arbitrary JSON body into a valid request. Never fails:
    /// missing or wrongly typed fields fall back to their defaults.
    pub fn from_value(value: &Value) -> Self {
        let mode = match value.get("mode").and_then(Value::as_str) {
            Some("current") => Mode::Current,
            _ => Mode::Normal,
        };

        let theme = normalize_theme(value.get("theme"));
        let keywords = normalize_keywords(value.get("keywords"));

        let satire_level = clamp_level(value.get("satireLevel").and_then(Value::as_f64));
        let elegance_level = clamp_level(value.get("eleganceLevel").and_then(Value::as_f64));

        let count = value
            .get("count")
            .and_then(Value::as_f64)
            .filter(|n| n.is_finite())
            .map(|n| (n.round() as i64).clamp(1, MAX_COUNT as i64) as u32)
            .unwrap_or(1);

        let recency_days = value
            .get("recencyDays")
            .and_then(Value::as_i64)
            .filter(|n| *n >= 1)
            .map(|n| n as u32)
            .unwrap_or(DEFAULT_RECENCY_DAYS);

        let max_articles = value
            .get("maxArticles")
            .and_then(Value::as_i64)
            .filter(|n| *n >= 1)
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_ARTICLES);

        let include_citations = value
            .get("includeCitations")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        StyleRequest {
            mode,
            theme,
            keywords,
            satire_level,
            elegance_level,
            count,
            recency_days,
            max_articles,
            include_citations,
        }
    }
}

fn normalize_theme(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => FREE_THEME.to_string(),
    }
}

/// Accepts either an array of strings (non-strings dropped) or a single
/// delimiter-separated string. Anything else normalizes to an empty list.
fn normalize_keywords(value: Option<&Value>) -> Vec<String> {
    let mut keywords: Vec<String> = match value {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        Some(Value::String(s)) => split_keyword_string(s),
        _ => Vec::new(),
    };
    keywords.truncate(MAX_KEYWORDS);
    keywords
}

/// Split on ASCII comma, full-width comma (both forms), and full-width
/// space, trimming each term and dropping empties.
pub fn split_keyword_string(input: &str) -> Vec<String> {
    input
        .split(|c| matches!(c, ',' | '、' | '，' | '　'))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn clamp_level(value: Option<f64>) -> u8 {
    match value {
        Some(n) if n.is_finite() => n.round().clamp(0.0, 3.0) as u8,
        _ => 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults_from_empty_body() {
        let request = StyleRequest::from_value(&json!({}));
        assert_eq!(request.mode, Mode::Normal);
        assert_eq!(request.theme, FREE_THEME);
        assert!(request.keywords.is_empty());
        assert_eq!(request.satire_level, 1);
        assert_eq!(request.elegance_level, 1);
        assert_eq!(request.count, 1);
        assert_eq!(request.recency_days, DEFAULT_RECENCY_DAYS);
        assert_eq!(request.max_articles, DEFAULT_MAX_ARTICLES);
        assert!(!request.include_citations);
    }

    #[test]
    fn test_mode_normalization() {
        let current = StyleRequest::from_value(&json!({"mode": "current"}));
        assert_eq!(current.mode, Mode::Current);

        // Anything other than the literal "current" is normal mode.
        for other in [json!({"mode": "CURRENT"}), json!({"mode": 7}), json!({})] {
            assert_eq!(StyleRequest::from_value(&other).mode, Mode::Normal);
        }
    }

    #[test]
    fn test_levels_clamped_to_range() {
        let request = StyleRequest::from_value(&json!({
            "satireLevel": 99,
            "eleganceLevel": -4,
        }));
        assert_eq!(request.satire_level, 3);
        assert_eq!(request.elegance_level, 0);

        // Wrong types fall back to the default of 1.
        let request = StyleRequest::from_value(&json!({
            "satireLevel": "spicy",
            "eleganceLevel": null,
        }));
        assert_eq!(request.satire_level, 1);
        assert_eq!(request.elegance_level, 1);
    }

    #[test]
    fn test_count_clamped() {
        assert_eq!(StyleRequest::from_value(&json!({"count": 12})).count, 5);
        assert_eq!(StyleRequest::from_value(&json!({"count": 0})).count, 1);
        assert_eq!(StyleRequest::from_value(&json!({"count": 3})).count, 3);
    }

    #[test]
    fn test_keyword_string_splitting() {
        assert_eq!(
            split_keyword_string("coffee, monday、残業，朝　電車"),
            vec!["coffee", "monday", "残業", "朝", "電車"]
        );
        assert_eq!(split_keyword_string("、、  、"), Vec::<String>::new());
    }

    #[test]
    fn test_keyword_array_drops_non_strings() {
        let request = StyleRequest::from_value(&json!({
            "keywords": ["coffee", 42, null, " monday ", ""]
        }));
        assert_eq!(request.keywords, vec!["coffee", "monday"]);
    }

    #[test]
    fn test_keywords_capped_at_eight() {
        let many: Vec<String> = (0..12).map(|i| format!("kw{}", i)).collect();
        let request = StyleRequest::from_value(&json!({ "keywords": many }));
        assert_eq!(request.keywords.len(), MAX_KEYWORDS);
        assert_eq!(request.keywords[0], "kw0");
    }

    #[test]
    fn test_keywords_wrong_type_is_empty() {
        let request = StyleRequest::from_value(&json!({"keywords": {"a": 1}}));
        assert!(request.keywords.is_empty());
    }

    #[test]
    fn test_theme_coercion() {
        assert_eq!(
            StyleRequest::from_value(&json!({"theme": "  office "})).theme,
            "office"
        );
        assert_eq!(StyleRequest::from_value(&json!({"theme": ""})).theme, FREE_THEME);
        assert_eq!(StyleRequest::from_value(&json!({"theme": 42})).theme, "42");
    }

    #[test]
    fn test_non_positive_retrieval_bounds_default() {
        let request = StyleRequest::from_value(&json!({
            "recencyDays": 0,
            "maxArticles": -2,
        }));
        assert_eq!(request.recency_days, DEFAULT_RECENCY_DAYS);
        assert_eq!(request.max_articles, DEFAULT_MAX_ARTICLES);
    }
}
