//! # agentsphere
//!
//! Audience reaction simulation engine.
//!
//! A post is shown to a population of synthetic personas sized by a scale
//! tier (5 to 15,000 participants). Each persona reacts with a like,
//! comment, or retweet plus sentiment and engagement scores. Participants
//! are processed in rate-limited concurrent batches and every reaction is
//! streamed as soon as it exists.
//!
//! Base personas ask an external text-generation capability for their
//! reaction and fall back to a local random generator when it is missing
//! or fails. Synthetic personas, fabricated to fill large runs, always use
//! the fallback.
//!
//! ```no_run
//! use agentsphere::{CollectingSink, PersonaRegistry, SimulationConfig, SimulationRequest, SimulationService};
//!
//! # async fn demo() -> Result<(), agentsphere::SimulationError> {
//! let service = SimulationService::new(SimulationConfig::default(), PersonaRegistry::builtin(), None)?;
//! let sink = CollectingSink::new();
//! let run = service.simulate(&SimulationRequest::new("Hello, world", "nano"), &sink).await?;
//! assert_eq!(run.reactions.len(), 5);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod llms;
pub mod persona;
pub mod server;
pub mod simulation;
pub mod utilities;

pub use config::{GeneratorConfig, SimulationConfig};
pub use error::{ConfigError, GenerationError, RegistryError, SimulationError, SinkError};
pub use llms::{GeneratedReaction, OpenRouterGenerator, ReactionGenerator};
pub use persona::{Persona, PersonaRegistry, SharedPersona};
pub use simulation::{
    BatchScheduler, CollectingSink, EventSink, Reaction, ReactionKind, SimulationEvent,
    SimulationRequest, SimulationRun, SimulationService,
};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
