//! Personas: the simulated audience.
//!
//! ```text
//! PersonaRegistry (fixed base catalog, built at start-up)
//!   + SyntheticPersonaGenerator (fills runs beyond the catalog size)
//!   -> SharedPersona (Arc, history appended during runs)
//! ```

pub mod distribution;
pub mod profile;
pub mod registry;
pub mod synthetic;

pub use distribution::ModelDistribution;
pub use profile::{
    BehaviorPatterns, Demographics, EngagementStyle, ModelType, Persona, Psychographics,
    SharedPersona, WritingStyle, CONTEXT_HISTORY_LEN,
};
pub use registry::PersonaRegistry;
pub use synthetic::{is_synthetic_id, SyntheticPersonaGenerator, SYNTHETIC_ID_PREFIX};
