//! Rule-based SEO validation and scoring.
//!
//! `validate` starts from 100 and runs a fixed sequence of independent checks.
//! Each failing check records a [`SeoIssue`] and subtracts its fixed cost.
//! Malformed input is reported as an issue and never returned as an error.

use std::collections::HashMap;

use db::models::seo_metadata::{IssueSeverity, SeoIssue, SeoMetadata, TwitterCardType};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum_macros::Display;
use ts_rs::TS;
use url::Url;

pub const TITLE_MIN: usize = 30;
pub const TITLE_OPTIMAL_MIN: usize = 50;
pub const TITLE_MAX: usize = 60;
pub const DESCRIPTION_MIN: usize = 120;
pub const DESCRIPTION_OPTIMAL_MIN: usize = 150;
pub const DESCRIPTION_MAX: usize = 160;
pub const MAX_KEYWORDS: usize = 10;

static CALL_TO_ACTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(try|learn|discover|get|start|explore|create|download|find|join|sign up|use|free|now)\b",
    )
    .expect("call-to-action pattern is valid")
});

/// Letter grade derived from the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Display)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 90 => Grade::A,
            s if s >= 80 => Grade::B,
            s if s >= 70 => Grade::C,
            s if s >= 60 => Grade::D,
            _ => Grade::F,
        }
    }
}

/// Everything the validator looks at. Every field is optional so a partially
/// filled admin form can be scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
pub struct SeoValidationInput {
    pub meta_title: Option<String>,
    pub meta_description: Option<String>,
    pub keywords: Option<Vec<String>>,
    pub canonical_url: Option<String>,
    pub robots_index: Option<bool>,
    pub robots_follow: Option<bool>,
    pub robots_max_snippet: Option<i32>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub og_image_alt: Option<String>,
    pub twitter_card: Option<TwitterCardType>,
    pub twitter_image: Option<String>,
    pub schema_enabled: Option<bool>,
    /// Structured data as a JSON value, or raw JSON text straight from a form
    pub schema_data: Option<Value>,
}

impl From<&SeoMetadata> for SeoValidationInput {
    fn from(record: &SeoMetadata) -> Self {
        Self {
            meta_title: record.meta_title.clone(),
            meta_description: record.meta_description.clone(),
            keywords: Some(record.keywords.clone()),
            canonical_url: record.canonical_url.clone(),
            robots_index: Some(record.robots_index),
            robots_follow: Some(record.robots_follow),
            robots_max_snippet: record.robots_max_snippet,
            og_title: record.og_title.clone(),
            og_description: record.og_description.clone(),
            og_image: record.og_image.clone(),
            og_image_alt: record.og_image_alt.clone(),
            twitter_card: record.twitter_card,
            twitter_image: record.twitter_image.clone(),
            schema_enabled: Some(record.schema_enabled),
            schema_data: record.schema_data.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
pub struct ValidationResult {
    pub score: i32,
    pub grade: Grade,
    pub issues: Vec<SeoIssue>,
    /// Messages of the warning-severity issues
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub summary: String,
}

impl ValidationResult {
    pub fn count(&self, severity: IssueSeverity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

struct Checker {
    score: i32,
    issues: Vec<SeoIssue>,
    suggestions: Vec<String>,
}

impl Checker {
    fn new() -> Self {
        Self {
            score: 100,
            issues: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    fn issue(&mut self, severity: IssueSeverity, field: &str, message: impl Into<String>, cost: i32) {
        self.score = (self.score - cost).max(0);
        self.issues.push(SeoIssue {
            severity,
            field: field.to_string(),
            message: message.into(),
            score_impact: cost,
        });
    }

    fn error(&mut self, field: &str, message: impl Into<String>, cost: i32) {
        self.issue(IssueSeverity::Error, field, message, cost);
    }

    fn warning(&mut self, field: &str, message: impl Into<String>, cost: i32) {
        self.issue(IssueSeverity::Warning, field, message, cost);
    }

    fn info(&mut self, field: &str, message: impl Into<String>) {
        self.issue(IssueSeverity::Info, field, message, 0);
    }

    fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    fn finish(self) -> ValidationResult {
        let grade = Grade::from_score(self.score);
        let warnings: Vec<String> = self
            .issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .map(|i| i.message.clone())
            .collect();
        let errors = self
            .issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error)
            .count();
        let notices = self.issues.len() - errors - warnings.len();
        let summary = format!(
            "Score {}/100 ({}): {} error(s), {} warning(s), {} notice(s)",
            self.score,
            grade,
            errors,
            warnings.len(),
            notices
        );
        ValidationResult {
            score: self.score,
            grade,
            issues: self.issues,
            warnings,
            suggestions: self.suggestions,
            summary,
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Score a metadata record. Pure and deterministic.
pub fn validate(input: &SeoValidationInput) -> ValidationResult {
    let mut checker = Checker::new();

    check_title(&mut checker, input);
    check_description(&mut checker, input);
    check_keywords(&mut checker, input);
    check_canonical(&mut checker, input);
    check_open_graph(&mut checker, input);
    check_twitter(&mut checker, input);
    check_schema(&mut checker, input);
    check_robots(&mut checker, input);
    check_images(&mut checker, input);

    checker.finish()
}

fn check_title(checker: &mut Checker, input: &SeoValidationInput) {
    let Some(title) = present(&input.meta_title) else {
        checker.error("meta_title", "Meta title is missing", 20);
        return;
    };

    let len = title.chars().count();
    if len < TITLE_MIN {
        checker.warning(
            "meta_title",
            format!("Title is too short ({len} characters, minimum {TITLE_MIN})"),
            10,
        );
    } else if len > TITLE_MAX {
        checker.warning(
            "meta_title",
            format!("Title is too long ({len} characters, maximum {TITLE_MAX})"),
            5,
        );
    } else if len < TITLE_OPTIMAL_MIN {
        checker.suggest(format!(
            "Lengthen the title to {TITLE_OPTIMAL_MIN}-{TITLE_MAX} characters for best display"
        ));
    }

    if let Some(word) = repeated_word(title) {
        checker.warning(
            "meta_title",
            format!("Title repeats \"{word}\" more than twice (keyword stuffing)"),
            10,
        );
    }

    let primary = input
        .keywords
        .as_ref()
        .and_then(|k| k.iter().map(|k| k.trim()).find(|k| !k.is_empty()));
    if let Some(primary) = primary
        && !title.to_lowercase().contains(&primary.to_lowercase())
    {
        checker.suggest(format!("Include the primary keyword \"{primary}\" in the title"));
    }
}

/// First word longer than three characters that occurs more than twice
fn repeated_word(text: &str) -> Option<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order = Vec::new();
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
    {
        let word = word.to_lowercase();
        let count = counts.entry(word.clone()).or_insert(0);
        *count += 1;
        if *count == 3 {
            order.push(word);
        }
    }
    order.into_iter().next()
}

fn check_description(checker: &mut Checker, input: &SeoValidationInput) {
    let Some(description) = present(&input.meta_description) else {
        checker.error("meta_description", "Meta description is missing", 20);
        return;
    };

    let len = description.chars().count();
    if len < DESCRIPTION_MIN {
        checker.warning(
            "meta_description",
            format!("Description is too short ({len} characters, minimum {DESCRIPTION_MIN})"),
            10,
        );
    } else if len > DESCRIPTION_MAX {
        checker.warning(
            "meta_description",
            format!("Description is too long ({len} characters, maximum {DESCRIPTION_MAX})"),
            5,
        );
    } else if len < DESCRIPTION_OPTIMAL_MIN {
        checker.suggest(format!(
            "Lengthen the description to {DESCRIPTION_OPTIMAL_MIN}-{DESCRIPTION_MAX} characters"
        ));
    }

    if !CALL_TO_ACTION.is_match(description) {
        checker.info("meta_description", "Description has no call to action");
        checker.suggest("Add a call to action such as \"Try it free\" to the description");
    }
}

fn check_keywords(checker: &mut Checker, input: &SeoValidationInput) {
    let count = input
        .keywords
        .as_ref()
        .map(|k| k.iter().filter(|k| !k.trim().is_empty()).count())
        .unwrap_or(0);
    if count == 0 {
        checker.info("keywords", "No focus keywords defined");
    } else if count > MAX_KEYWORDS {
        checker.warning(
            "keywords",
            format!("Too many keywords ({count}, maximum {MAX_KEYWORDS})"),
            5,
        );
    }
}

fn check_canonical(checker: &mut Checker, input: &SeoValidationInput) {
    let Some(canonical) = present(&input.canonical_url) else {
        checker.info("canonical_url", "No canonical URL set; the page URL will be used");
        return;
    };
    let well_formed = Url::parse(canonical)
        .map(|url| matches!(url.scheme(), "http" | "https") && url.host_str().is_some())
        .unwrap_or(false);
    if !well_formed {
        checker.error(
            "canonical_url",
            format!("Canonical URL \"{canonical}\" is not an absolute http(s) URL"),
            10,
        );
    }
}

fn check_open_graph(checker: &mut Checker, input: &SeoValidationInput) {
    if present(&input.og_title).is_none() && present(&input.og_description).is_none() {
        checker.warning("og_title", "Open Graph title and description are missing", 10);
    }
    if present(&input.og_image).is_none() {
        checker.warning("og_image", "Open Graph image is missing", 5);
    }
}

fn check_twitter(checker: &mut Checker, input: &SeoValidationInput) {
    if input.twitter_card.is_none() {
        checker.warning("twitter_card", "Twitter Card type is not set", 5);
        return;
    }
    if present(&input.twitter_image).is_none() && present(&input.og_image).is_none() {
        checker.info("twitter_image", "Twitter Card has no image");
    }
}

fn check_schema(checker: &mut Checker, input: &SeoValidationInput) {
    let data = match &input.schema_data {
        _ if input.schema_enabled == Some(false) => None,
        Some(Value::String(raw)) if raw.trim().is_empty() => None,
        Some(Value::String(raw)) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                checker.error("schema_data", "Invalid JSON", 15);
                return;
            }
        },
        Some(Value::Null) | None => None,
        Some(value) => Some(value.clone()),
    };

    match data {
        None => checker.warning("schema_data", "No structured data (schema markup)", 10),
        Some(Value::Array(items)) if items.is_empty() => {
            checker.warning("schema_data", "No structured data (schema markup)", 10)
        }
        Some(Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_schema_object(checker, item, &format!("Schema {}", i + 1));
            }
        }
        Some(Value::Object(ref object)) if object.contains_key("@graph") => {
            if !has_key(object, "@context") {
                checker.error("schema_data", "Schema missing @context", 5);
            }
            match object.get("@graph") {
                Some(Value::Array(graph)) => {
                    for (i, item) in graph.iter().enumerate() {
                        let label = format!("Schema graph item {}", i + 1);
                        match item {
                            Value::Object(o) if has_key(o, "@type") => {}
                            Value::Object(_) => {
                                checker.error("schema_data", format!("{label} missing @type"), 5)
                            }
                            _ => checker.error(
                                "schema_data",
                                format!("{label} must be a JSON object"),
                                5,
                            ),
                        }
                    }
                }
                _ => checker.error("schema_data", "Schema @graph must be an array", 5),
            }
        }
        Some(ref object @ Value::Object(_)) => check_schema_object(checker, object, "Schema"),
        Some(_) => checker.error(
            "schema_data",
            "Structured data must be a JSON object or array",
            15,
        ),
    }
}

fn has_key(object: &serde_json::Map<String, Value>, key: &str) -> bool {
    match object.get(key) {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

fn check_schema_object(checker: &mut Checker, item: &Value, label: &str) {
    let Value::Object(object) = item else {
        checker.error("schema_data", format!("{label} must be a JSON object"), 5);
        return;
    };
    if !has_key(object, "@context") {
        checker.error("schema_data", format!("{label} missing @context"), 5);
    }
    if !has_key(object, "@type") {
        checker.error("schema_data", format!("{label} missing @type"), 5);
    }
}

fn check_robots(checker: &mut Checker, input: &SeoValidationInput) {
    let index = input.robots_index.unwrap_or(true);
    let follow = input.robots_follow.unwrap_or(true);

    // noindex is an authoring choice, never penalized
    if !index {
        checker.info("robots_index", "Page is set to noindex and will not appear in search results");
        if !follow {
            checker.info(
                "robots_follow",
                "Page is set to noindex, nofollow; crawlers will ignore its links too",
            );
        }
    }

    if let Some(max_snippet) = input.robots_max_snippet
        && max_snippet < -1
    {
        checker.warning(
            "robots_max_snippet",
            format!("max-snippet must be -1 or greater, got {max_snippet}"),
            5,
        );
    }
}

fn check_images(checker: &mut Checker, input: &SeoValidationInput) {
    for (field, image) in [("og_image", &input.og_image), ("twitter_image", &input.twitter_image)] {
        if let Some(image) = present(image)
            && image.to_ascii_lowercase().starts_with("http://")
        {
            checker.warning(field, format!("Image should use HTTPS: {image}"), 5);
        }
    }

    if present(&input.og_image).is_some() && present(&input.og_image_alt).is_none() {
        checker.info("og_image_alt", "Open Graph image has no alt text");
        checker.suggest("Describe the Open Graph image with alt text for accessibility");
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    const OPTIMAL_TITLE: &str = "Free AI Paraphrasing Tool to Rewrite Any Text Instantly";
    const OPTIMAL_DESCRIPTION: &str = "Rewrite essays, emails and articles in seconds with our AI paraphraser. Keep your meaning, improve clarity and tone. Try the paraphrasing tool free today!";

    fn complete_input() -> SeoValidationInput {
        SeoValidationInput {
            meta_title: Some(OPTIMAL_TITLE.to_string()),
            meta_description: Some(OPTIMAL_DESCRIPTION.to_string()),
            keywords: Some(vec!["paraphrasing tool".to_string()]),
            canonical_url: Some("https://example.com/tools/paraphraser".to_string()),
            robots_index: Some(true),
            robots_follow: Some(true),
            robots_max_snippet: None,
            og_title: Some("AI Paraphrasing Tool".to_string()),
            og_description: Some("Rewrite any text instantly.".to_string()),
            og_image: Some("https://example.com/og/paraphraser.png".to_string()),
            og_image_alt: Some("Paraphraser screenshot".to_string()),
            twitter_card: Some(TwitterCardType::SummaryLargeImage),
            twitter_image: Some("https://example.com/og/paraphraser.png".to_string()),
            schema_enabled: Some(true),
            schema_data: Some(json!([
                {"@context": "https://schema.org", "@type": "SoftwareApplication", "name": "Paraphraser"}
            ])),
        }
    }

    fn messages(result: &ValidationResult) -> Vec<&str> {
        result.issues.iter().map(|i| i.message.as_str()).collect()
    }

    #[test]
    fn test_fixture_lengths_are_in_optimal_band() {
        assert!((50..=60).contains(&OPTIMAL_TITLE.chars().count()));
        assert!((150..=160).contains(&OPTIMAL_DESCRIPTION.chars().count()));
    }

    #[test]
    fn test_complete_record_scores_100() {
        let result = validate(&complete_input());
        assert_eq!(result.score, 100, "issues: {:?}", result.issues);
        assert_eq!(result.grade, Grade::A);
        assert!(result.issues.is_empty());
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_title_costs_exactly_20() {
        let baseline = validate(&complete_input());
        let mut input = complete_input();
        input.meta_title = None;
        let result = validate(&input);

        assert_eq!(result.score, baseline.score - 20);
        let issue = result
            .issues
            .iter()
            .find(|i| i.field == "meta_title")
            .unwrap();
        assert_eq!(issue.severity, IssueSeverity::Error);
        assert_eq!(issue.score_impact, 20);
    }

    #[test]
    fn test_tiny_title_and_description() {
        let input = SeoValidationInput {
            meta_title: Some("A".to_string()),
            meta_description: Some("B".to_string()),
            ..Default::default()
        };
        let result = validate(&input);
        let msgs = messages(&result);
        assert!(msgs.iter().any(|m| m.starts_with("Title is too short")));
        assert!(msgs.iter().any(|m| m.starts_with("Description is too short")));
        assert!(result.score < 100);
        assert!(matches!(result.grade, Grade::D | Grade::F));
        assert_eq!(result.warnings.len(), result.count(IssueSeverity::Warning));
    }

    #[test]
    fn test_long_title_is_a_five_point_warning() {
        let mut input = complete_input();
        input.meta_title = Some("x".repeat(70));
        let result = validate(&input);

        let title_issues: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.field == "meta_title")
            .collect();
        assert_eq!(title_issues.len(), 1);
        assert_eq!(title_issues[0].severity, IssueSeverity::Warning);
        assert!(title_issues[0].message.starts_with("Title is too long"));
        assert_eq!(title_issues[0].score_impact, 5);
        assert_eq!(result.score, 95);
    }

    /// Title of exactly `len` characters containing the primary keyword
    fn title_of(len: usize) -> String {
        format!("Paraphrasing Tool {}", "x".repeat(len - 18))
    }

    /// Description of exactly `len` characters with a call to action
    fn description_of(len: usize) -> String {
        format!("Try it free. {}", "x".repeat(len - 13))
    }

    fn issues_for<'a>(result: &'a ValidationResult, field: &str) -> Vec<&'a SeoIssue> {
        result.issues.iter().filter(|i| i.field == field).collect()
    }

    #[test]
    fn test_title_length_boundaries() {
        for (len, expected) in [(29, Some(10)), (30, None), (60, None), (61, Some(5))] {
            let mut input = complete_input();
            input.meta_title = Some(title_of(len));
            assert_eq!(input.meta_title.as_ref().unwrap().chars().count(), len);
            let result = validate(&input);

            let costs: Vec<_> = issues_for(&result, "meta_title")
                .iter()
                .map(|i| (i.severity, i.score_impact))
                .collect();
            match expected {
                Some(cost) => {
                    assert_eq!(costs, vec![(IssueSeverity::Warning, cost)], "length {len}");
                    assert_eq!(result.score, 100 - cost, "length {len}");
                }
                None => {
                    assert!(costs.is_empty(), "length {len}: {costs:?}");
                    assert_eq!(result.score, 100, "length {len}");
                }
            }
        }
    }

    #[test]
    fn test_description_length_boundaries() {
        for (len, expected) in [(119, Some(10)), (120, None), (160, None), (161, Some(5))] {
            let mut input = complete_input();
            input.meta_description = Some(description_of(len));
            assert_eq!(input.meta_description.as_ref().unwrap().chars().count(), len);
            let result = validate(&input);

            let issues = issues_for(&result, "meta_description");
            match expected {
                Some(cost) => {
                    assert_eq!(issues.len(), 1, "length {len}");
                    assert_eq!(issues[0].severity, IssueSeverity::Warning);
                    assert_eq!(issues[0].score_impact, cost);
                    assert_eq!(result.score, 100 - cost, "length {len}");
                }
                None => {
                    assert!(issues.is_empty(), "length {len}: {issues:?}");
                    assert_eq!(result.score, 100, "length {len}");
                }
            }
        }
    }

    #[test]
    fn test_long_description_is_a_five_point_warning() {
        let mut input = complete_input();
        input.meta_description = Some(description_of(200));
        let result = validate(&input);
        let issues = issues_for(&result, "meta_description");
        assert_eq!(issues.len(), 1);
        assert!(issues[0].message.starts_with("Description is too long"));
        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.score, 95);
    }

    #[test]
    fn test_plain_http_twitter_image_alone_costs_5() {
        let mut input = complete_input();
        input.twitter_image = Some("http://example.com/og/paraphraser.png".to_string());
        let result = validate(&input);
        let issues = issues_for(&result, "twitter_image");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Warning);
        assert_eq!(issues[0].score_impact, 5);
        assert!(issues_for(&result, "og_image").is_empty());
        assert_eq!(result.score, 95);
    }

    #[test]
    fn test_missing_call_to_action_is_free_info() {
        let mut input = complete_input();
        input.meta_description = Some("x".repeat(155));
        let result = validate(&input);
        let issues = issues_for(&result, "meta_description");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, IssueSeverity::Info);
        assert_eq!(issues[0].score_impact, 0);
        assert_eq!(issues[0].message, "Description has no call to action");
        assert!(result.suggestions.iter().any(|s| s.contains("call to action")));
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_noindex_with_follow_is_a_single_info() {
        let mut input = complete_input();
        input.robots_index = Some(false);
        input.robots_follow = Some(true);
        let result = validate(&input);
        let index = issues_for(&result, "robots_index");
        assert_eq!(index.len(), 1);
        assert_eq!(index[0].severity, IssueSeverity::Info);
        assert!(issues_for(&result, "robots_follow").is_empty());
        assert_eq!(result.score, 100);
    }

    #[test]
    fn test_mid_band_title_has_no_issue_only_suggestion() {
        let mut input = complete_input();
        input.meta_title = Some("Paraphrasing tool for essays and emails".to_string());
        let result = validate(&input);
        assert!(result.issues.iter().all(|i| i.field != "meta_title"));
        assert!(result.suggestions.iter().any(|s| s.contains("Lengthen the title")));
    }

    #[test]
    fn test_keyword_stuffing_detected() {
        let mut input = complete_input();
        input.meta_title = Some("Paraphrase Tool: Paraphrase Online, Paraphrase Free Now".to_string());
        let result = validate(&input);
        let stuffing = result
            .issues
            .iter()
            .find(|i| i.message.contains("keyword stuffing"))
            .unwrap();
        assert!(stuffing.message.contains("\"paraphrase\""));
        assert_eq!(stuffing.score_impact, 10);
    }

    #[test]
    fn test_short_words_are_not_stuffing() {
        assert_eq!(repeated_word("the AI and the app and the way and"), None);
        assert_eq!(repeated_word("Best best BEST"), Some("best".to_string()));
    }

    #[test]
    fn test_schema_array_missing_context_reports_one_error() {
        let mut input = complete_input();
        input.schema_data = Some(json!([{"@type": "Article"}]));
        let result = validate(&input);
        let schema_errors: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.field == "schema_data")
            .collect();
        assert_eq!(schema_errors.len(), 1);
        assert_eq!(schema_errors[0].severity, IssueSeverity::Error);
        assert_eq!(schema_errors[0].message, "Schema 1 missing @context");
    }

    #[test]
    fn test_malformed_schema_text_is_single_issue() {
        let mut input = complete_input();
        input.schema_data = Some(Value::String("{\"@type\": ".to_string()));
        let result = validate(&input);
        let schema_issues: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.field == "schema_data")
            .collect();
        assert_eq!(schema_issues.len(), 1);
        assert_eq!(schema_issues[0].message, "Invalid JSON");
        assert_eq!(result.score, 85);
    }

    #[test]
    fn test_schema_text_is_parsed_and_checked() {
        let mut input = complete_input();
        input.schema_data = Some(Value::String(
            r#"{"@context": "https://schema.org", "@type": "WebPage"}"#.to_string(),
        ));
        assert_eq!(validate(&input).score, 100);
    }

    #[test]
    fn test_graph_envelope_is_accepted() {
        let mut input = complete_input();
        input.schema_data = Some(json!({
            "@context": "https://schema.org",
            "@graph": [{"@type": "Organization"}, {"name": "untyped"}],
        }));
        let result = validate(&input);
        assert_eq!(messages(&result), vec!["Schema graph item 2 missing @type"]);
    }

    #[test]
    fn test_disabled_schema_is_a_warning() {
        let mut input = complete_input();
        input.schema_enabled = Some(false);
        let result = validate(&input);
        assert_eq!(result.score, 90);
        assert_eq!(result.warnings, vec!["No structured data (schema markup)".to_string()]);
    }

    #[test]
    fn test_noindex_is_informational_only() {
        let mut input = complete_input();
        input.robots_index = Some(false);
        input.robots_follow = Some(false);
        let result = validate(&input);
        assert_eq!(result.score, 100);
        let robots: Vec<_> = result
            .issues
            .iter()
            .filter(|i| i.field.starts_with("robots_"))
            .collect();
        assert_eq!(robots.len(), 2);
        assert!(robots
            .iter()
            .all(|i| i.severity == IssueSeverity::Info && i.score_impact == 0));
    }

    #[test]
    fn test_canonical_and_image_checks() {
        let mut input = complete_input();
        input.canonical_url = Some("/tools/paraphraser".to_string());
        input.og_image = Some("http://example.com/og.png".to_string());
        input.og_image_alt = None;
        let result = validate(&input);

        let by_field = |field: &str| {
            result
                .issues
                .iter()
                .filter(|i| i.field == field)
                .map(|i| (i.severity, i.score_impact))
                .collect::<Vec<_>>()
        };
        assert_eq!(by_field("canonical_url"), vec![(IssueSeverity::Error, 10)]);
        assert_eq!(by_field("og_image"), vec![(IssueSeverity::Warning, 5)]);
        assert_eq!(by_field("og_image_alt"), vec![(IssueSeverity::Info, 0)]);
        assert_eq!(result.score, 85);
    }

    #[test]
    fn test_too_many_keywords() {
        let mut input = complete_input();
        input.keywords = Some((0..11).map(|i| format!("keyword {i}")).collect());
        let result = validate(&input);
        assert!(result.issues.iter().any(|i| i.field == "keywords" && i.score_impact == 5));
    }

    #[test]
    fn test_score_is_floored_at_zero() {
        let input = SeoValidationInput {
            meta_title: Some("Spam spam spam".to_string()),
            canonical_url: Some("not a url".to_string()),
            robots_max_snippet: Some(-5),
            og_image: Some("http://a/b.png".to_string()),
            twitter_image: Some("http://a/b.png".to_string()),
            schema_data: Some(json!([1, {"x": 1}, {"y": 2}])),
            keywords: Some((0..20).map(|i| i.to_string()).collect()),
            ..Default::default()
        };
        let result = validate(&input);
        let total_cost: i32 = result.issues.iter().map(|i| i.score_impact).sum();
        assert!(total_cost > 100);
        assert_eq!(result.score, 0);
        assert_eq!(result.grade, Grade::F);
    }

    #[test]
    fn test_validation_is_deterministic() {
        let input = SeoValidationInput {
            meta_title: Some("Grammar Checker".to_string()),
            schema_data: Some(json!([{"@type": "Article"}, {"@context": "https://schema.org"}])),
            ..Default::default()
        };
        assert_eq!(validate(&input), validate(&input));
    }

    #[test]
    fn test_grade_boundaries() {
        assert_eq!(Grade::from_score(100), Grade::A);
        assert_eq!(Grade::from_score(90), Grade::A);
        assert_eq!(Grade::from_score(89), Grade::B);
        assert_eq!(Grade::from_score(80), Grade::B);
        assert_eq!(Grade::from_score(70), Grade::C);
        assert_eq!(Grade::from_score(60), Grade::D);
        assert_eq!(Grade::from_score(59), Grade::F);
        assert_eq!(Grade::from_score(0), Grade::F);
    }
}
