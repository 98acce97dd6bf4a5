//! Persona profile: who a simulated audience member is and how they behave.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize, Serializer};

use crate::simulation::reaction::Reaction;

/// Number of past reactions fed back as generation context.
pub const CONTEXT_HISTORY_LEN: usize = 3;

/// Personas are shared between the registry, the run, and the lookup table.
pub type SharedPersona = Arc<Persona>;

/// Broad cognitive flavour of a persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Creative,
    Analytical,
    Technical,
    Philosophical,
    Casual,
}

impl ModelType {
    pub const ALL: [ModelType; 5] = [
        Self::Creative,
        Self::Analytical,
        Self::Technical,
        Self::Philosophical,
        Self::Casual,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Creative => "creative",
            Self::Analytical => "analytical",
            Self::Technical => "technical",
            Self::Philosophical => "philosophical",
            Self::Casual => "casual",
        }
    }
}

/// How visibly a persona takes part in a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngagementStyle {
    Lurker,
    Active,
    Influencer,
    Troll,
}

impl EngagementStyle {
    pub const ALL: [EngagementStyle; 4] =
        [Self::Lurker, Self::Active, Self::Influencer, Self::Troll];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lurker => "lurker",
            Self::Active => "active",
            Self::Influencer => "influencer",
            Self::Troll => "troll",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WritingStyle {
    Casual,
    Formal,
    Academic,
    Sarcastic,
    Enthusiastic,
    Technical,
}

impl WritingStyle {
    pub const ALL: [WritingStyle; 6] = [
        Self::Casual,
        Self::Formal,
        Self::Academic,
        Self::Sarcastic,
        Self::Enthusiastic,
        Self::Technical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Casual => "casual",
            Self::Formal => "formal",
            Self::Academic => "academic",
            Self::Sarcastic => "sarcastic",
            Self::Enthusiastic => "enthusiastic",
            Self::Technical => "technical",
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(ModelType, EngagementStyle, WritingStyle);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demographics {
    pub age: u8,
    pub location: String,
    pub income: String,
    pub education: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Psychographics {
    #[serde(default)]
    pub personality: Vec<String>,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub values: Vec<String>,
    #[serde(default)]
    pub political_lean: String,
}

/// Behavioural parameters. Probabilities are in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BehaviorPatterns {
    pub engagement_style: EngagementStyle,
    pub response_rate: f64,
    pub controversy_tolerance: f64,
    pub influenceability: f64,
    pub writing_style: WritingStyle,
}

/// A synthetic audience member.
///
/// Everything except the reaction history is fixed once the persona exists.
/// The history only grows; readers look at the most recent few entries.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub handle: String,
    #[serde(rename = "avatarEmoji")]
    pub avatar: String,
    pub model_type: ModelType,
    pub demographics: Demographics,
    #[serde(default)]
    pub psychographics: Psychographics,
    #[serde(rename = "behaviorPatterns")]
    pub behavior: BehaviorPatterns,
    #[serde(default)]
    pub expertise: Vec<String>,
    /// Opaque label handed to the generation capability.
    #[serde(default)]
    pub behavior_signature: String,
    #[serde(
        rename = "textResponseHistory",
        serialize_with = "serialize_history",
        skip_deserializing
    )]
    history: RwLock<Vec<Reaction>>,
}

fn serialize_history<S: Serializer>(
    history: &RwLock<Vec<Reaction>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    history.read().serialize(serializer)
}

impl Persona {
    /// A persona with neutral attributes. Mostly useful for tests and
    /// hand-built catalogs; adjust the public fields afterwards.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let handle = name.to_lowercase().replace(' ', "_");
        Self {
            id: id.into(),
            name,
            handle,
            avatar: "🙂".to_string(),
            model_type: ModelType::Casual,
            demographics: Demographics {
                age: 30,
                location: "Internet".to_string(),
                income: "n/a".to_string(),
                education: "n/a".to_string(),
            },
            psychographics: Psychographics {
                political_lean: "n/a".to_string(),
                ..Psychographics::default()
            },
            behavior: BehaviorPatterns {
                engagement_style: EngagementStyle::Active,
                response_rate: 0.5,
                controversy_tolerance: 0.5,
                influenceability: 0.5,
                writing_style: WritingStyle::Casual,
            },
            expertise: Vec::new(),
            behavior_signature: "casual_casual_active".to_string(),
            history: RwLock::new(Vec::new()),
        }
    }

    pub fn into_shared(self) -> SharedPersona {
        Arc::new(self)
    }

    /// Append a reaction to the history.
    pub fn record_reaction(&self, reaction: Reaction) {
        self.history.write().push(reaction);
    }

    /// Up to `n` most recent reactions, oldest first.
    pub fn recent_reactions(&self, n: usize) -> Vec<Reaction> {
        let history = self.history.read();
        let start = history.len().saturating_sub(n);
        history[start..].to_vec()
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    /// Short context for the generation capability.
    ///
    /// Joins the comment texts among the last few reactions. When there are
    /// none, describes the persona in one line instead.
    pub fn reaction_context(&self) -> String {
        let from_history = self
            .recent_reactions(CONTEXT_HISTORY_LEN)
            .into_iter()
            .filter_map(|r| r.comment_text)
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        if from_history.is_empty() {
            format!(
                "Agent {} is a {}-year-old from {} with {} engagement style.",
                self.name,
                self.demographics.age,
                self.demographics.location,
                self.behavior.engagement_style,
            )
        } else {
            from_history
        }
    }

    /// Role instructions for the generation capability.
    pub fn system_description(&self) -> String {
        format!(
            "You are {name}, a {age}-year-old {style} person from {location}.\n\
             \n\
             Given a social media post, respond as this persona would:\n\
             - reaction_type: \"like\", \"comment\", \"retweet\", or \"ignore\"\n\
             - comment_text: if commenting, write a brief response (max 100 chars)\n\
             - sentiment: -1 (very negative) to 1 (very positive)\n\
             - engagement_likelihood: 0 to 1 probability of engaging\n\
             \n\
             Behavior signature: {signature}",
            name = self.name,
            age = self.demographics.age,
            style = self.behavior.writing_style,
            location = self.demographics.location,
            signature = self.behavior_signature,
        )
    }
}

impl Clone for Persona {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            name: self.name.clone(),
            handle: self.handle.clone(),
            avatar: self.avatar.clone(),
            model_type: self.model_type,
            demographics: self.demographics.clone(),
            psychographics: self.psychographics.clone(),
            behavior: self.behavior.clone(),
            expertise: self.expertise.clone(),
            behavior_signature: self.behavior_signature.clone(),
            history: RwLock::new(self.history.read().clone()),
        }
    }
}

impl fmt::Debug for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persona")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("model_type", &self.model_type)
            .field("engagement_style", &self.behavior.engagement_style)
            .field("history_len", &self.history_len())
            .finish()
    }
}
