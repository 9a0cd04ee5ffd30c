//! Response extraction and the validity predicates the dispatcher uses to
//! gate retries.
//!
//! The split matters: predicates run *before* persistence and decide whether
//! a response is worth keeping; extraction runs *after* persistence and must
//! never fail — malformed output becomes a sentinel, so the raw text is
//! always preserved for offline re-extraction.
//!
//! The rating predicate is deliberately stricter than the extractor (it also
//! demands an "explanation" key). A response kept after retry exhaustion can
//! therefore still be rescued by the extractor's regex fallback. That
//! looseness is inherited behavior, kept as-is.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::model::{Choice, Rating};

lazy_static! {
    static ref RATING_FALLBACK_RE: Regex = Regex::new(r#"rating["\s:\[]*(\d+)"#).unwrap();
    static ref CHOICE_RE: Regex = Regex::new(r"<choice>\s*(AnswerA|AnswerB)\s*</choice>").unwrap();
}

/// Coerce a JSON value to an integer the way a lenient reader would:
/// integers as-is, integral floats truncated, numeric strings parsed.
fn coerce_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Extract a 0-4 rating from raw evaluator output.
///
/// Strategy one: strict JSON with a "rating" key. A parseable rating outside
/// 0..=4 is a hard `Unparseable` — no fallback, the evaluator answered and
/// answered wrong. Strategy two (JSON failed or carried no usable rating):
/// regex scan for a digit following "rating", to rescue near-JSON wrapped in
/// prose or fences.
pub fn rate_extract(text: &str) -> Rating {
    if let Ok(value) = serde_json::from_str::<Value>(text) {
        if let Some(n) = value.get("rating").and_then(coerce_int) {
            return Rating::from_candidate(n);
        }
    }
    if let Some(caps) = RATING_FALLBACK_RE.captures(text) {
        if let Ok(n) = caps[1].parse::<i64>() {
            if (0..=4).contains(&n) {
                return Rating::Score(n as u8);
            }
        }
    }
    Rating::Unparseable
}

/// Extract the forced-choice tag from raw evaluator output.
pub fn choice_extract(text: &str) -> Choice {
    match CHOICE_RE.captures(text) {
        Some(caps) => Choice::from_tag(&caps[1]),
        None => Choice::Unparseable,
    }
}

/// Strip one layer of markdown code-fence markers. The opening fence line
/// (with any language tag) and everything after the closing fence are
/// discarded; a fence with no body is a rejection.
fn strip_code_fence(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return Some(trimmed);
    }
    let body = trimmed.split_once('\n')?.1;
    let body = body.rsplit_once("```").map(|(b, _)| b).unwrap_or(body);
    Some(body.trim())
}

/// Validity predicate for rubric responses: after optional fence stripping,
/// the remainder must be a JSON object with "rating" in 0..=4 and an
/// "explanation" key. Returns the cleaned text on acceptance.
pub fn rate_post_check(response: &str) -> Option<String> {
    let cleaned = strip_code_fence(response)?;
    let value: Value = serde_json::from_str(cleaned).ok()?;
    let rating = value.get("rating")?.as_i64()?;
    if !(0..=4).contains(&rating) || value.get("explanation").is_none() {
        return None;
    }
    Some(cleaned.to_string())
}

/// Validity predicate for pairwise responses: the choice tag must be present.
/// Returns the original text unmodified.
pub fn mc_post_check(response: &str) -> Option<String> {
    if CHOICE_RE.is_match(response) {
        Some(response.to_string())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_extract_exact_for_valid_json() {
        for r in 0..=4 {
            let text = format!(r#"{{"rating": {r}, "explanation": "ok"}}"#);
            assert_eq!(rate_extract(&text), Rating::Score(r));
        }
    }

    #[test]
    fn rate_extract_out_of_range_is_sentinel() {
        assert_eq!(
            rate_extract(r#"{"rating": 7, "explanation": "ok"}"#),
            Rating::Unparseable
        );
        assert_eq!(
            rate_extract(r#"{"rating": -1, "explanation": "ok"}"#),
            Rating::Unparseable
        );
    }

    #[test]
    fn rate_extract_coerces_string_and_float_ratings() {
        assert_eq!(rate_extract(r#"{"rating": "3"}"#), Rating::Score(3));
        assert_eq!(rate_extract(r#"{"rating": 2.0}"#), Rating::Score(2));
    }

    #[test]
    fn rate_extract_falls_back_to_regex() {
        assert_eq!(
            rate_extract("Sure! Here you go: \"rating\": 2, because..."),
            Rating::Score(2)
        );
        // JSON parses but the rating is an array: fallback rescues the digit.
        assert_eq!(
            rate_extract(r#"{"rating": [3], "explanation": "ok"}"#),
            Rating::Score(3)
        );
    }

    #[test]
    fn rate_extract_no_match_is_sentinel() {
        assert_eq!(rate_extract("I cannot rate this."), Rating::Unparseable);
        assert_eq!(rate_extract(""), Rating::Unparseable);
        assert_eq!(rate_extract("rating: 9"), Rating::Unparseable);
    }

    #[test]
    fn rate_extract_is_idempotent_over_stored_text() {
        let raw = r#"{"rating": 4, "explanation": "solid"}"#;
        let first = rate_extract(raw);
        assert_eq!(rate_extract(raw), first);
    }

    #[test]
    fn rate_post_check_strips_code_fence() {
        let fenced = "```json\n{\"rating\": 3, \"explanation\": \"fine\"}\n```\ntrailing prose";
        let cleaned = rate_post_check(fenced).unwrap();
        assert_eq!(cleaned, r#"{"rating": 3, "explanation": "fine"}"#);
        // Accepted text must extract successfully.
        assert_eq!(rate_extract(&cleaned), Rating::Score(3));
    }

    #[test]
    fn rate_post_check_requires_explanation() {
        assert!(rate_post_check(r#"{"rating": 3}"#).is_none());
        assert!(rate_post_check(r#"{"rating": 3, "explanation": "ok"}"#).is_some());
    }

    #[test]
    fn rate_post_check_rejects_junk() {
        assert!(rate_post_check("not json at all").is_none());
        assert!(rate_post_check("```json").is_none());
        assert!(rate_post_check(r#"{"rating": 6, "explanation": "ok"}"#).is_none());
    }

    #[test]
    fn choice_extract_tolerates_whitespace() {
        assert_eq!(
            choice_extract("analysis...\n<choice> AnswerA </choice>"),
            Choice::AnswerA
        );
        assert_eq!(
            choice_extract("<choice>\nAnswerB\n</choice>"),
            Choice::AnswerB
        );
        assert_eq!(choice_extract("no tag here"), Choice::Unparseable);
    }

    #[test]
    fn mc_post_check_passes_text_through() {
        let text = "thinking...\n<choice>AnswerB</choice>";
        assert_eq!(mc_post_check(text).as_deref(), Some(text));
        assert!(mc_post_check("AnswerA without tags").is_none());
    }
}
