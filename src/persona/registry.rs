//! The fixed catalog of base personas available at process start.
//!
//! The registry is read-only once built, so concurrent runs read it without
//! locking. Only the per-persona reaction history (behind its own lock)
//! changes afterwards.

use std::collections::HashMap;
use std::path::Path;

use crate::error::RegistryError;
use crate::persona::profile::{
    BehaviorPatterns, Demographics, EngagementStyle, ModelType, Persona, Psychographics,
    SharedPersona, WritingStyle,
};
use crate::persona::synthetic::is_synthetic_id;

#[derive(Debug, Default)]
pub struct PersonaRegistry {
    personas: Vec<SharedPersona>,
    index: HashMap<String, usize>,
}

impl PersonaRegistry {
    /// Build a registry, rejecting duplicate ids, ids in the synthetic
    /// namespace and behavior attributes outside `[0, 1]`.
    pub fn new(personas: Vec<Persona>) -> Result<Self, RegistryError> {
        let mut index = HashMap::with_capacity(personas.len());
        for (pos, persona) in personas.iter().enumerate() {
            if is_synthetic_id(&persona.id) {
                return Err(RegistryError::ReservedId(persona.id.clone()));
            }
            check_attributes(persona)?;
            if index.insert(persona.id.clone(), pos).is_some() {
                return Err(RegistryError::DuplicateId(persona.id.clone()));
            }
        }
        Ok(Self {
            personas: personas.into_iter().map(Persona::into_shared).collect(),
            index,
        })
    }

    /// A registry with no base personas. Every participant will be synthetic.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in five-persona catalog.
    pub fn builtin() -> Self {
        let personas = builtin_personas();
        let index = personas
            .iter()
            .enumerate()
            .map(|(pos, p)| (p.id.clone(), pos))
            .collect();
        Self {
            personas: personas.into_iter().map(Persona::into_shared).collect(),
            index,
        }
    }

    /// Load a JSON array of personas.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, RegistryError> {
        let personas: Vec<Persona> = serde_json::from_str(raw)?;
        Self::new(personas)
    }

    /// Catalog in registration order.
    pub fn all(&self) -> &[SharedPersona] {
        &self.personas
    }

    pub fn by_id(&self, id: &str) -> Option<SharedPersona> {
        self.index.get(id).map(|&pos| self.personas[pos].clone())
    }

    pub fn len(&self) -> usize {
        self.personas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.personas.is_empty()
    }
}

fn check_attributes(persona: &Persona) -> Result<(), RegistryError> {
    let behavior = &persona.behavior;
    for (attribute, value) in [
        ("response_rate", behavior.response_rate),
        ("controversy_tolerance", behavior.controversy_tolerance),
        ("influenceability", behavior.influenceability),
    ] {
        if !(0.0..=1.0).contains(&value) {
            return Err(RegistryError::InvalidAttribute {
                id: persona.id.clone(),
                attribute,
                value,
            });
        }
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn base_persona(
    id: &str,
    name: &str,
    handle: &str,
    avatar: &str,
    model_type: ModelType,
    demographics: (u8, &str, &str, &str),
    psychographics: (&[&str], &[&str], &[&str], &str),
    behavior: (EngagementStyle, f64, f64, f64, WritingStyle),
    expertise: &[&str],
    signature: &str,
) -> Persona {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let (age, location, income, education) = demographics;
    let (personality, interests, values, political_lean) = psychographics;
    let (engagement_style, response_rate, controversy_tolerance, influenceability, writing_style) =
        behavior;

    let mut persona = Persona::new(id, name);
    persona.handle = handle.to_string();
    persona.avatar = avatar.to_string();
    persona.model_type = model_type;
    persona.demographics = Demographics {
        age,
        location: location.to_string(),
        income: income.to_string(),
        education: education.to_string(),
    };
    persona.psychographics = Psychographics {
        personality: strings(personality),
        interests: strings(interests),
        values: strings(values),
        political_lean: political_lean.to_string(),
    };
    persona.behavior = BehaviorPatterns {
        engagement_style,
        response_rate,
        controversy_tolerance,
        influenceability,
        writing_style,
    };
    persona.expertise = strings(expertise);
    persona.behavior_signature = signature.to_string();
    persona
}

fn builtin_personas() -> Vec<Persona> {
    vec![
        base_persona(
            "1",
            "Sarah Chen",
            "sarahc_dev",
            "👩‍💻",
            ModelType::Technical,
            (28, "SF", "100k+", "Masters"),
            (
                &["analytical", "detail-oriented"],
                &["programming", "AI", "technology"],
                &["innovation", "efficiency"],
                "moderate",
            ),
            (EngagementStyle::Active, 0.8, 0.6, 0.4, WritingStyle::Technical),
            &["software development", "machine learning"],
            "technical_analytical_developer",
        ),
        base_persona(
            "2",
            "Marcus Johnson",
            "mjohnson_art",
            "🎨",
            ModelType::Creative,
            (34, "NYC", "80k", "Bachelors"),
            (
                &["creative", "expressive"],
                &["art", "design", "culture"],
                &["creativity", "authenticity"],
                "liberal",
            ),
            (EngagementStyle::Influencer, 0.9, 0.8, 0.7, WritingStyle::Enthusiastic),
            &["graphic design", "digital art"],
            "creative_artistic_influencer",
        ),
        base_persona(
            "3",
            "Dr. Elena Rodriguez",
            "dr_elena_r",
            "🔬",
            ModelType::Analytical,
            (42, "Boston", "120k+", "PhD"),
            (
                &["intellectual", "curious"],
                &["research", "science", "data"],
                &["knowledge", "evidence"],
                "progressive",
            ),
            (EngagementStyle::Active, 0.7, 0.5, 0.3, WritingStyle::Academic),
            &["data science", "research methodology"],
            "analytical_researcher_phd",
        ),
        base_persona(
            "4",
            "Jake Thompson",
            "jakethoughts",
            "🤔",
            ModelType::Philosophical,
            (29, "Austin", "70k", "Masters"),
            (
                &["thoughtful", "contemplative"],
                &["philosophy", "ethics", "politics"],
                &["wisdom", "justice"],
                "independent",
            ),
            (EngagementStyle::Active, 0.6, 0.9, 0.5, WritingStyle::Formal),
            &["ethics", "political theory"],
            "philosophical_thinker_ethicist",
        ),
        base_persona(
            "5",
            "Lisa Park",
            "lisap_casual",
            "😊",
            ModelType::Casual,
            (25, "LA", "60k", "Bachelors"),
            (
                &["friendly", "social"],
                &["lifestyle", "fashion", "travel"],
                &["connection", "fun"],
                "moderate",
            ),
            (EngagementStyle::Lurker, 0.4, 0.3, 0.8, WritingStyle::Casual),
            &["social media", "content creation"],
            "casual_social_lifestyle",
        ),
    ]
}
