//! Error types for the simulation engine.
//!
//! Only [`SimulationError`] can end a run early. Generation failures are
//! absorbed by the reaction producer and sink failures by the scheduler.

use thiserror::Error;

/// Invalid or unreadable configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value for {name}: {value:?} ({reason})")]
    InvalidEnv {
        name: &'static str,
        value: String,
        reason: String,
    },

    /// Batches must hold at least one participant.
    #[error("batch size must be at least 1")]
    ZeroBatchSize,
}

/// Errors raised while building the persona registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Two catalog entries share an id.
    #[error("duplicate persona id: {0}")]
    DuplicateId(String),

    /// Catalog ids must not collide with generated synthetic ids.
    #[error("persona id {0:?} uses the reserved synthetic prefix")]
    ReservedId(String),

    /// A behavior attribute lies outside `[0, 1]`.
    #[error("persona {id:?} has {attribute} = {value} outside [0, 1]")]
    InvalidAttribute {
        id: String,
        attribute: &'static str,
        value: f64,
    },

    /// Reading the catalog file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The catalog file is not a JSON array of personas.
    #[error("catalog parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Failures of the external generation capability.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// No credential configured.
    #[error("generation capability unavailable: {0}")]
    Unavailable(String),

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The provider answered, but not with the expected reaction shape.
    #[error("malformed generation output: {0}")]
    MalformedOutput(String),
}

/// The event consumer can no longer accept events.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The receiving half of the stream was dropped.
    #[error("event stream closed")]
    Closed,

    /// Any other delivery failure reported by a custom sink.
    #[error("event delivery failed: {0}")]
    Delivery(String),
}

/// Scheduler-fatal errors. A run that hits one of these emits a single
/// `error` event and ends in the `failed` state.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The working set cannot be partitioned.
    #[error("cannot partition participants into batches of {0}")]
    InvalidBatchSize(usize),

    /// A production task died without producing a reaction.
    #[error("reaction task for persona {persona_id} aborted: {reason}")]
    TaskAborted { persona_id: String, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// The HTTP client for the generation capability could not be built.
    #[error("generator setup failed: {0}")]
    Generator(#[from] GenerationError),
}
