//! The reaction-generation capability.
//!
//! The engine only needs one narrow call: given a persona's role
//! description, the post content, and a short context string, return a
//! structured reaction or an error. Providers implement
//! [`ReactionGenerator`]; the reaction producer decides what to do when
//! one is unavailable or fails.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GenerationError;

// ---------------------------------------------------------------------------
// Output shape
// ---------------------------------------------------------------------------

/// Raw structured output of a generation call.
///
/// Individual fields may be missing or null on the wire, and missing scores
/// are filled with neutral values by
/// [`GeneratedReaction::sentiment_or_neutral`] and
/// [`GeneratedReaction::engagement_or_neutral`]. An object carrying none of
/// the reaction kind and the two scores is rejected by
/// [`GeneratedReaction::validate`]. Both `snake_case` and `camelCase` keys
/// are accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneratedReaction {
    #[serde(default, alias = "reaction_type", alias = "reactionType", alias = "reactionKind")]
    pub reaction_kind: Option<String>,
    #[serde(default, alias = "commentText")]
    pub comment_text: Option<String>,
    #[serde(default)]
    pub sentiment: Option<f64>,
    #[serde(default, alias = "engagementLikelihood")]
    pub engagement_likelihood: Option<f64>,
}

impl GeneratedReaction {
    /// Reject output that does not look like a reaction at all.
    pub fn validate(self) -> Result<Self, GenerationError> {
        if self.reaction_kind.is_none()
            && self.sentiment.is_none()
            && self.engagement_likelihood.is_none()
        {
            return Err(GenerationError::MalformedOutput(
                "output has none of reaction_type, sentiment, engagement_likelihood".to_string(),
            ));
        }
        Ok(self)
    }

    pub fn sentiment_or_neutral(&self) -> f64 {
        self.sentiment.unwrap_or(0.0)
    }

    pub fn engagement_or_neutral(&self) -> f64 {
        self.engagement_likelihood.unwrap_or(0.5)
    }

    /// Comment text, trimmed, if it has any content.
    pub fn comment(&self) -> Option<&str> {
        self.comment_text
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

// ---------------------------------------------------------------------------
// Capability trait
// ---------------------------------------------------------------------------

/// A source of persona reactions backed by some external model.
#[async_trait]
pub trait ReactionGenerator: Send + Sync + fmt::Debug {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Whether the capability can be called at all, e.g. a credential is
    /// configured. Checked before every call.
    fn is_available(&self) -> bool {
        true
    }

    /// Produce a reaction for `content` as the persona described by
    /// `system_description`.
    async fn generate(
        &self,
        system_description: &str,
        content: &str,
        context: &str,
    ) -> Result<GeneratedReaction, GenerationError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_snake_case() {
        let raw = r#"{"reaction_type":"comment","comment_text":"Nice","sentiment":0.4,"engagement_likelihood":0.9}"#;
        let parsed: GeneratedReaction = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.reaction_kind.as_deref(), Some("comment"));
        assert_eq!(parsed.comment(), Some("Nice"));
        assert_eq!(parsed.engagement_or_neutral(), 0.9);
    }

    #[test]
    fn test_accepts_camel_case() {
        let raw = r#"{"reactionType":"like","commentText":"  ","engagementLikelihood":0.1}"#;
        let parsed: GeneratedReaction = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.reaction_kind.as_deref(), Some("like"));
        assert_eq!(parsed.comment(), None);
        assert_eq!(parsed.sentiment_or_neutral(), 0.0);
        assert_eq!(parsed.engagement_likelihood, Some(0.1));
    }

    #[test]
    fn test_missing_scores_are_neutral() {
        let parsed: GeneratedReaction =
            serde_json::from_str(r#"{"reaction_type":"like","sentiment":null}"#).unwrap();
        let parsed = parsed.validate().unwrap();
        assert_eq!(parsed.sentiment_or_neutral(), 0.0);
        assert_eq!(parsed.engagement_or_neutral(), 0.5);
    }

    #[test]
    fn test_wrong_shape_is_rejected() {
        for raw in ["{}", r#"{"reaction":"love it","score":9}"#, r#"{"comment_text":"hi"}"#] {
            let parsed: GeneratedReaction = serde_json::from_str(raw).unwrap();
            assert!(
                matches!(parsed.validate(), Err(GenerationError::MalformedOutput(_))),
                "accepted {raw}"
            );
        }
    }
}
