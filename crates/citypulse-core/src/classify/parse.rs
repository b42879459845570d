//! Parsing of model completions

use serde_json::Value;

use super::fallback::GENERAL;
use super::normalize::normalize_subcategory_name;
use super::seed::keyword_rules;
use crate::taxonomy::Topic;

/// Confidence assumed when the completion omits it
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// Confidence assigned to heuristic scans of unstructured output
pub const HEURISTIC_CONFIDENCE: f64 = 0.3;

/// Classification extracted from a completion, names already normalized
#[derive(Debug, Clone, PartialEq)]
pub struct AiClassification {
    pub subcategory_name: String,
    /// Clamped to [0, 1]
    pub confidence: f64,
    pub is_new_subcategory: bool,
    pub reasoning: String,
    pub alternative_suggestions: Vec<String>,
}

/// Outcome of parsing a completion
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedCompletion {
    Parsed(AiClassification),
    /// Raw completion text that held no usable JSON object
    Unparseable(String),
}

impl ParsedCompletion {
    /// Structured result, or a heuristic scan of the raw text.
    pub fn into_classification(self, topic: Topic, existing: &[String]) -> AiClassification {
        match self {
            Self::Parsed(classification) => classification,
            Self::Unparseable(raw) => heuristic_classification(&raw, topic, existing),
        }
    }
}

/// Parse a completion that should contain a JSON object, possibly wrapped in
/// a code fence or surrounded by prose.
pub fn parse_completion(raw: &str) -> ParsedCompletion {
    let object = extract_json_object(raw)
        .and_then(|json| serde_json::from_str::<Value>(json).ok())
        .filter(Value::is_object);

    match object {
        Some(value) => ParsedCompletion::Parsed(from_value(&value)),
        None => ParsedCompletion::Unparseable(raw.to_string()),
    }
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let mut text = raw.trim();
    if let Some(rest) = text.strip_prefix("```") {
        // Drop the optional language tag on the fence line
        text = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
        text = text.strip_suffix("```").unwrap_or(text).trim();
    }
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

fn from_value(value: &Value) -> AiClassification {
    let subcategory_name = normalize_subcategory_name(
        value
            .get("subcategory_name")
            .and_then(Value::as_str)
            .unwrap_or(GENERAL),
    );

    let confidence = match value.get("confidence_score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|c| c.is_finite())
    .unwrap_or(DEFAULT_CONFIDENCE)
    .clamp(0.0, 1.0);

    let is_new_subcategory = value
        .get("is_new_subcategory")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let reasoning = value
        .get("reasoning")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut alternative_suggestions: Vec<String> = Vec::new();
    if let Some(items) = value.get("alternative_suggestions").and_then(Value::as_array) {
        for name in items.iter().filter_map(Value::as_str) {
            let name = normalize_subcategory_name(name);
            if name != subcategory_name && !alternative_suggestions.contains(&name) {
                alternative_suggestions.push(name);
            }
        }
    }

    AiClassification {
        subcategory_name,
        confidence,
        is_new_subcategory,
        reasoning,
        alternative_suggestions,
    }
}

/// Best-effort classification of unstructured model output.
///
/// Looks for a known subcategory name in the text, then for topic keywords,
/// then settles on `"general"`. Always reports [`HEURISTIC_CONFIDENCE`].
pub fn heuristic_classification(raw: &str, topic: Topic, existing: &[String]) -> AiClassification {
    let text = raw.to_lowercase();

    let from_existing = existing
        .iter()
        .map(|name| name.to_lowercase())
        .find(|name| !name.is_empty() && text.contains(name.as_str()));

    let from_keywords = || {
        keyword_rules(topic)
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
            .map(|(name, _)| name.to_string())
    };

    let (name, reasoning) = match from_existing {
        Some(name) => (name, "Known subcategory named in unstructured model output"),
        None => match from_keywords() {
            Some(name) => (name, "Topic keyword found in unstructured model output"),
            None => (
                GENERAL.to_string(),
                "Unstructured model output matched nothing",
            ),
        },
    };

    AiClassification {
        subcategory_name: normalize_subcategory_name(&name),
        confidence: HEURISTIC_CONFIDENCE,
        is_new_subcategory: false,
        reasoning: reasoning.to_string(),
        alternative_suggestions: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parsed(raw: &str) -> AiClassification {
        match parse_completion(raw) {
            ParsedCompletion::Parsed(c) => c,
            ParsedCompletion::Unparseable(raw) => panic!("unparseable: {}", raw),
        }
    }

    #[test]
    fn parses_plain_json() {
        let c = parsed(
            r#"{"subcategory_name": "Signal Issue", "confidence_score": 0.92,
                "is_new_subcategory": false, "reasoning": "Lights out",
                "alternative_suggestions": ["Power Outage", "signal_issue", "power_outage"]}"#,
        );
        assert_eq!(
            c,
            AiClassification {
                subcategory_name: "signal_issue".into(),
                confidence: 0.92,
                is_new_subcategory: false,
                reasoning: "Lights out".into(),
                alternative_suggestions: vec!["power_outage".into()],
            }
        );
    }

    #[test]
    fn tolerates_code_fence_and_prose() {
        let c = parsed("```json\n{\"subcategory_name\": \"flood\", \"confidence_score\": 0.8}\n```");
        assert_eq!(c.subcategory_name, "flood");

        let c = parsed("Sure! Here you go: {\"subcategory_name\": \"fog\"} Hope that helps.");
        assert_eq!(c.subcategory_name, "fog");
    }

    #[test]
    fn confidence_defaults_and_clamps() {
        assert_eq!(parsed(r#"{"subcategory_name": "x"}"#).confidence, DEFAULT_CONFIDENCE);
        assert_eq!(parsed(r#"{"subcategory_name": "x", "confidence_score": 1.7}"#).confidence, 1.0);
        assert_eq!(parsed(r#"{"subcategory_name": "x", "confidence_score": -3}"#).confidence, 0.0);
        assert_eq!(parsed(r#"{"subcategory_name": "x", "confidence_score": "0.75"}"#).confidence, 0.75);
    }

    #[test]
    fn missing_name_is_general() {
        assert_eq!(parsed(r#"{"confidence_score": 0.9}"#).subcategory_name, "general");
    }

    #[test]
    fn garbage_is_unparseable() {
        assert!(matches!(
            parse_completion("I think this is about traffic"),
            ParsedCompletion::Unparseable(_)
        ));
        assert!(matches!(parse_completion("[1, 2, 3]"), ParsedCompletion::Unparseable(_)));
        assert!(matches!(parse_completion("{not json}"), ParsedCompletion::Unparseable(_)));
    }

    #[test]
    fn heuristic_prefers_existing_names() {
        let existing = vec!["signal_issue".to_string()];
        let c = heuristic_classification("Probably a signal_issue, maybe a crash", Topic::Traffic, &existing);
        assert_eq!(c.subcategory_name, "signal_issue");
        assert_eq!(c.confidence, HEURISTIC_CONFIDENCE);
        assert!(!c.is_new_subcategory);
    }

    #[test]
    fn heuristic_falls_back_to_keywords_then_general() {
        let c = heuristic_classification("Looks like a crash on the bridge", Topic::Traffic, &[]);
        assert_eq!(c.subcategory_name, "accident");

        let c = heuristic_classification("No idea", Topic::Events, &[]);
        assert_eq!(c.subcategory_name, "general");
    }

    #[test]
    fn unparseable_routes_to_heuristic() {
        let c = parse_completion("power is out everywhere")
            .into_classification(Topic::Infrastructure, &[]);
        assert_eq!(c.subcategory_name, "power_outage");
        assert_eq!(c.confidence, HEURISTIC_CONFIDENCE);
    }
}
