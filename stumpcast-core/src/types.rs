use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ValidationError;

/// Running match score. A single instance lives in the store and is mutated
/// by accumulating deltas; it is never replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub runs: u64,
    pub wickets: u64,
}

/// Increment applied to [`ScoreState`] by one accepted submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreDelta {
    pub runs: u64,
    pub wickets: u64,
}

impl ScoreDelta {
    pub const ZERO: ScoreDelta = ScoreDelta { runs: 0, wickets: 0 };

    pub fn new(runs: u64, wickets: u64) -> Self {
        Self { runs, wickets }
    }
}

/// One commentary entry in the durable log. Ids are assigned by the store
/// and strictly increase; the embedded score is the snapshot taken when the
/// item was accepted, not when it is delivered, so backfilled history reads
/// as a consistent audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentaryItem {
    pub id: u64,
    pub text: String,
    pub score: ScoreState,
}

impl CommentaryItem {
    /// Wire-format delivery line, one per item.
    pub fn display_line(&self) -> String {
        format!(
            "Score: {}/{}<br>{}",
            self.score.runs, self.score.wickets, self.text
        )
    }
}

/// Client submission payload.
///
/// The browser client posts form values verbatim, so `runs`/`wickets` may
/// arrive as numbers, numeric strings, empty strings, or be missing
/// entirely. Anything non-numeric counts as 0.
#[derive(Debug, Clone, Deserialize)]
pub struct Submission {
    pub commentary: String,
    #[serde(default, deserialize_with = "flexible_count")]
    pub runs: u64,
    #[serde(default, deserialize_with = "flexible_count")]
    pub wickets: u64,
}

impl Submission {
    /// Reject empty or whitespace-only commentary before any state mutation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.commentary.trim().is_empty() {
            return Err(ValidationError::EmptyCommentary);
        }
        Ok(())
    }

    pub fn delta(&self) -> ScoreDelta {
        ScoreDelta::new(self.runs, self.wickets)
    }
}

fn flexible_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.map(coerce_count).unwrap_or(0))
}

fn coerce_count(value: serde_json::Value) -> u64 {
    match value {
        serde_json::Value::Number(n) => n.as_u64().unwrap_or(0),
        serde_json::Value::String(s) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_line_formats_score_and_text() {
        let item = CommentaryItem {
            id: 7,
            text: "Edged and taken!".to_string(),
            score: ScoreState { runs: 113, wickets: 4 },
        };
        assert_eq!(item.display_line(), "Score: 113/4<br>Edged and taken!");
    }

    #[test]
    fn submission_accepts_numeric_strings() {
        let submission: Submission =
            serde_json::from_str(r#"{"commentary":"tidy over","runs":"4","wickets":""}"#).unwrap();
        assert_eq!(submission.runs, 4);
        assert_eq!(submission.wickets, 0);
    }

    #[test]
    fn submission_defaults_missing_counts_to_zero() {
        let submission: Submission =
            serde_json::from_str(r#"{"commentary":"dot ball"}"#).unwrap();
        assert_eq!(submission.runs, 0);
        assert_eq!(submission.wickets, 0);
    }

    #[test]
    fn submission_treats_non_numeric_counts_as_zero() {
        let submission: Submission = serde_json::from_str(
            r#"{"commentary":"confused scorer","runs":-3,"wickets":2.5}"#,
        )
        .unwrap();
        assert_eq!(submission.runs, 0);
        assert_eq!(submission.wickets, 0);
    }

    #[test]
    fn validate_rejects_whitespace_commentary() {
        let submission: Submission =
            serde_json::from_str(r#"{"commentary":"   ","runs":1,"wickets":0}"#).unwrap();
        assert_eq!(
            submission.validate(),
            Err(ValidationError::EmptyCommentary)
        );
    }

    #[test]
    fn validate_accepts_real_commentary() {
        let submission: Submission =
            serde_json::from_str(r#"{"commentary":"short ball, pulled away","runs":6}"#).unwrap();
        assert!(submission.validate().is_ok());
        assert_eq!(submission.delta(), ScoreDelta::new(6, 0));
    }
}
