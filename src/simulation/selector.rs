//! Builds the working set of participants for a run.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::persona::{PersonaRegistry, SharedPersona, SyntheticPersonaGenerator};
use crate::simulation::run::RunId;
use crate::utilities::RandomSource;

/// Synthetic personas of one run, by id.
pub type SyntheticLookup = HashMap<String, SharedPersona>;

/// Result of [`ParticipantSelector::select`].
#[derive(Debug, Clone)]
pub struct Selection {
    pub run_id: RunId,
    /// Exactly the requested number of personas, ids unique. Base personas
    /// first (shuffled), then synthetic ones in index order.
    pub participants: Vec<SharedPersona>,
    pub lookup: Arc<SyntheticLookup>,
}

impl Selection {
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn synthetic_count(&self) -> usize {
        self.lookup.len()
    }

    pub fn participant_ids(&self) -> Vec<String> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }
}

#[derive(Debug)]
pub struct ParticipantSelector {
    registry: Arc<PersonaRegistry>,
    generator: SyntheticPersonaGenerator,
    rng: RandomSource,
    /// Lookup table of the most recent selection. Each `select` replaces it.
    latest: RwLock<Arc<SyntheticLookup>>,
}

impl ParticipantSelector {
    pub fn new(registry: Arc<PersonaRegistry>, rng: RandomSource) -> Self {
        Self {
            registry,
            generator: SyntheticPersonaGenerator::new(rng.clone()),
            rng,
            latest: RwLock::new(Arc::new(SyntheticLookup::new())),
        }
    }

    pub fn registry(&self) -> &Arc<PersonaRegistry> {
        &self.registry
    }

    /// Pick `target` participants: a random subset of the registry, topped
    /// up with synthetic personas when the registry is too small.
    pub fn select(&self, target: usize) -> Selection {
        let run_id = RunId::new();

        let mut base: Vec<SharedPersona> = self.registry.all().to_vec();
        self.rng.shuffle(&mut base);
        base.truncate(target);

        let missing = target - base.len();
        let mut lookup = SyntheticLookup::with_capacity(missing);
        let mut participants = base;
        participants.reserve(missing);
        for index in 0..missing {
            let persona = self.generator.generate(&run_id, index).into_shared();
            lookup.insert(persona.id.clone(), persona.clone());
            participants.push(persona);
        }

        let lookup = Arc::new(lookup);
        *self.latest.write() = lookup.clone();

        tracing::debug!(
            run_id = %run_id,
            target,
            synthetic = missing,
            "participants selected"
        );

        Selection {
            run_id,
            participants,
            lookup,
        }
    }

    /// Resolve a persona id against the registry, then against the most
    /// recent run's synthetic personas.
    pub fn lookup(&self, id: &str) -> Option<SharedPersona> {
        self.registry
            .by_id(id)
            .or_else(|| self.latest.read().get(id).cloned())
    }
}
