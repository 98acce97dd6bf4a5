//! Head-count of a persona set by model type.

use serde::{Deserialize, Serialize};

use crate::persona::profile::{ModelType, Persona};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelDistribution {
    pub total: usize,
    pub creative: usize,
    pub analytical: usize,
    pub technical: usize,
    pub philosophical: usize,
    pub casual: usize,
}

impl ModelDistribution {
    pub fn of<'a, I, P>(personas: I) -> Self
    where
        I: IntoIterator<Item = &'a P>,
        P: AsRef<Persona> + 'a,
    {
        let mut dist = Self::default();
        for persona in personas {
            dist.total += 1;
            match persona.as_ref().model_type {
                ModelType::Creative => dist.creative += 1,
                ModelType::Analytical => dist.analytical += 1,
                ModelType::Technical => dist.technical += 1,
                ModelType::Philosophical => dist.philosophical += 1,
                ModelType::Casual => dist.casual += 1,
            }
        }
        dist
    }
}
