//! On-demand persona synthesis for runs larger than the registry.
//!
//! Synthetic ids are `syn_<run id>_<index>`. The run id namespaces them per
//! run and the index makes them unique within it.

use crate::persona::profile::{
    BehaviorPatterns, Demographics, EngagementStyle, ModelType, Persona, Psychographics,
    WritingStyle,
};
use crate::simulation::run::RunId;
use crate::utilities::RandomSource;

/// Prefix reserved for generated persona ids.
pub const SYNTHETIC_ID_PREFIX: &str = "syn_";

const FIRST_NAMES: [&str; 10] = [
    "Alex", "Jordan", "Taylor", "Casey", "Riley", "Sam", "Morgan", "Avery", "Drew", "Quinn",
];

const AVATARS: [&str; 10] = [
    "👩‍💻", "🧠", "🎨", "🔬", "🤔", "😊", "🧑‍🚀", "🧑‍🔧", "🧑‍🏫", "🧑‍🍳",
];

const MIN_AGE: usize = 18;
const MAX_AGE: usize = 67;

/// Whether `id` belongs to a generated persona.
pub fn is_synthetic_id(id: &str) -> bool {
    id.starts_with(SYNTHETIC_ID_PREFIX)
}

/// Fabricates personas with independently drawn attributes.
#[derive(Debug, Clone)]
pub struct SyntheticPersonaGenerator {
    rng: RandomSource,
}

impl SyntheticPersonaGenerator {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }

    /// Build the `index`-th synthetic persona of run `run_id`.
    pub fn generate(&self, run_id: &RunId, index: usize) -> Persona {
        let ordinal = index + 1;
        let first_name = self.pick(&FIRST_NAMES);
        let model_type = *self.pick(&ModelType::ALL);
        let writing_style = *self.pick(&WritingStyle::ALL);
        let engagement_style = *self.pick(&EngagementStyle::ALL);
        let age = self.rng.range_inclusive(MIN_AGE, MAX_AGE);

        let mut persona = Persona::new(
            format!("{SYNTHETIC_ID_PREFIX}{run_id}_{index}"),
            format!("{first_name} #{ordinal}"),
        );
        persona.handle = format!("agent_{}_{}", run_id.short(), ordinal);
        persona.avatar = self.pick(&AVATARS).to_string();
        persona.model_type = model_type;
        persona.demographics = Demographics {
            age: u8::try_from(age).unwrap_or(u8::MAX),
            location: "Internet".to_string(),
            income: "n/a".to_string(),
            education: "n/a".to_string(),
        };
        persona.psychographics = Psychographics {
            political_lean: "n/a".to_string(),
            ..Psychographics::default()
        };
        persona.behavior = BehaviorPatterns {
            engagement_style,
            response_rate: self.rng.uniform(0.35, 0.85),
            controversy_tolerance: self.rng.unit(),
            influenceability: self.rng.unit(),
            writing_style,
        };
        persona.behavior_signature = format!("{model_type}_{writing_style}_{engagement_style}");
        persona
    }

    fn pick<'a, T>(&self, items: &'a [T]) -> &'a T {
        // Every table above is non-empty.
        self.rng.choose(items).unwrap_or(&items[0])
    }
}
