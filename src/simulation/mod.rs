//! The simulation engine.
//!
//! ```text
//! ScaleResolver -> ParticipantSelector -> BatchScheduler -> EventSink
//!                  (registry + synthetic)  (ReactionProducer per participant)
//! ```

pub mod events;
pub mod producer;
pub mod reaction;
pub mod run;
pub mod scale;
pub mod scheduler;
pub mod selector;
pub mod service;

pub use events::{
    frame, ChannelSink, CollectingSink, EventSink, FnSink, LifecycleEvent, SimulationEvent,
};
pub use producer::{FallbackGenerator, ReactionProducer};
pub use reaction::{classify, Reaction, ReactionChoice, ReactionKind};
pub use run::{RunId, RunStatus, SimulationRun};
pub use scale::{ScaleResolver, Tier, DEFAULT_PARTICIPANTS};
pub use scheduler::{BatchScheduler, SimulationRequest};
pub use selector::{ParticipantSelector, Selection, SyntheticLookup};
pub use service::SimulationService;
