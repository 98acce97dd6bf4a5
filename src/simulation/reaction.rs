//! Reaction records and the reaction-kind decision rule.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::persona::{EngagementStyle, Persona};

/// Engagement above this, from an influencer, becomes a retweet.
pub const RETWEET_ENGAGEMENT_THRESHOLD: f64 = 0.7;

/// Comments must be strictly longer than this many characters.
pub const MIN_COMMENT_CHARS: usize = 10;

/// The visible reaction a persona leaves on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Comment,
    Retweet,
    /// Declared for wire compatibility. Nothing in the engine emits it.
    Ignore,
}

impl ReactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Like => "like",
            Self::Comment => "comment",
            Self::Retweet => "retweet",
            Self::Ignore => "ignore",
        }
    }
}

/// A reaction kind together with the comment text a comment must carry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionChoice {
    Like,
    Retweet,
    Ignore,
    Comment(String),
}

impl ReactionChoice {
    pub fn kind(&self) -> ReactionKind {
        match self {
            Self::Like => ReactionKind::Like,
            Self::Retweet => ReactionKind::Retweet,
            Self::Ignore => ReactionKind::Ignore,
            Self::Comment(_) => ReactionKind::Comment,
        }
    }
}

/// Decide the reaction kind for a live generation result.
///
/// Influencers past the engagement threshold retweet; otherwise a
/// substantial comment makes a comment; everything else is a like.
pub fn classify(
    persona: &Persona,
    engagement_likelihood: f64,
    comment_text: Option<&str>,
) -> ReactionChoice {
    if engagement_likelihood > RETWEET_ENGAGEMENT_THRESHOLD
        && persona.behavior.engagement_style == EngagementStyle::Influencer
    {
        return ReactionChoice::Retweet;
    }

    match comment_text {
        Some(text) if text.chars().count() > MIN_COMMENT_CHARS => {
            ReactionChoice::Comment(text.to_string())
        }
        _ => ReactionChoice::Like,
    }
}

/// One participant's response to the simulated post.
///
/// Field names on the wire follow the feed client's record format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reaction {
    pub id: String,
    #[serde(rename = "postId")]
    pub post_id: String,
    #[serde(rename = "agentId")]
    pub persona_id: String,
    #[serde(rename = "reactionType")]
    pub reaction_kind: ReactionKind,
    #[serde(rename = "commentText", default, skip_serializing_if = "Option::is_none")]
    pub comment_text: Option<String>,
    pub sentiment: f64,
    #[serde(rename = "engagementLikelihood")]
    pub engagement_likelihood: f64,
    #[serde(rename = "timestamp")]
    pub produced_at: DateTime<Utc>,
}

impl Reaction {
    /// Build a reaction, clamping scores into their ranges.
    ///
    /// Non-finite scores collapse to neutral values (0 sentiment, 0.5
    /// engagement).
    pub fn new(
        post_id: impl Into<String>,
        persona_id: impl Into<String>,
        choice: ReactionChoice,
        sentiment: f64,
        engagement_likelihood: f64,
    ) -> Self {
        let reaction_kind = choice.kind();
        let comment_text = match choice {
            ReactionChoice::Comment(text) => Some(text),
            _ => None,
        };
        Self {
            id: format!("reaction_{}", Uuid::new_v4().simple()),
            post_id: post_id.into(),
            persona_id: persona_id.into(),
            reaction_kind,
            comment_text,
            sentiment: clamp_or(sentiment, -1.0, 1.0, 0.0),
            engagement_likelihood: clamp_or(engagement_likelihood, 0.0, 1.0, 0.5),
            produced_at: Utc::now(),
        }
    }

    /// Whether the comment text is present exactly for comments.
    pub fn is_well_formed(&self) -> bool {
        let comment_matches =
            (self.reaction_kind == ReactionKind::Comment) == self.comment_text.is_some();
        comment_matches
            && (-1.0..=1.0).contains(&self.sentiment)
            && (0.0..=1.0).contains(&self.engagement_likelihood)
    }
}

fn clamp_or(value: f64, low: f64, high: f64, fallback: f64) -> f64 {
    if value.is_finite() {
        value.clamp(low, high)
    } else {
        fallback
    }
}
