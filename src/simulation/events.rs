//! Simulation events and the sinks that receive them.
//!
//! A run emits, in order: one `start` event, one bare reaction record per
//! produced reaction, then exactly one of `complete` or `error`.

use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::SinkError;
use crate::simulation::reaction::Reaction;

/// Run lifecycle framing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LifecycleEvent {
    Start {
        #[serde(rename = "plannedAgents")]
        planned_agents: usize,
    },
    Complete {
        #[serde(rename = "totalResults")]
        total_results: usize,
    },
    Error {
        message: String,
    },
}

/// Anything a run emits. Reactions go on the wire as bare records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SimulationEvent {
    Lifecycle(LifecycleEvent),
    Reaction(Reaction),
}

impl SimulationEvent {
    pub fn start(planned_agents: usize) -> Self {
        Self::Lifecycle(LifecycleEvent::Start { planned_agents })
    }

    pub fn complete(total_results: usize) -> Self {
        Self::Lifecycle(LifecycleEvent::Complete { total_results })
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Lifecycle(LifecycleEvent::Error {
            message: message.into(),
        })
    }

    pub fn as_reaction(&self) -> Option<&Reaction> {
        match self {
            Self::Reaction(r) => Some(r),
            Self::Lifecycle(_) => None,
        }
    }

    /// `complete` or `error`.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Lifecycle(LifecycleEvent::Complete { .. } | LifecycleEvent::Error { .. })
        )
    }
}

impl From<Reaction> for SimulationEvent {
    fn from(reaction: Reaction) -> Self {
        Self::Reaction(reaction)
    }
}

/// Stream framing: `data: <json>\n\n`.
pub fn frame(event: &SimulationEvent) -> String {
    // Serializing these types cannot fail: no maps with non-string keys.
    let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    format!("data: {json}\n\n")
}

// ---------------------------------------------------------------------------
// Sinks
// ---------------------------------------------------------------------------

/// Receives events synchronously as the scheduler emits them.
///
/// Errors are reported back but never stop the run.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &SimulationEvent) -> Result<(), SinkError>;
}

/// Forwards events into an unbounded channel. Dropping the sink closes
/// the stream.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<SimulationEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<SimulationEvent>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiving half.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<SimulationEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl EventSink for ChannelSink {
    fn emit(&self, event: &SimulationEvent) -> Result<(), SinkError> {
        self.tx.send(event.clone()).map_err(|_| SinkError::Closed)
    }
}

/// Adapts a closure into a sink.
pub struct FnSink<F>(pub F);

impl<F> EventSink for FnSink<F>
where
    F: Fn(&SimulationEvent) -> Result<(), SinkError> + Send + Sync,
{
    fn emit(&self, event: &SimulationEvent) -> Result<(), SinkError> {
        (self.0)(event)
    }
}

/// Keeps every event in memory.
#[derive(Debug, Clone, Default)]
pub struct CollectingSink {
    events: Arc<Mutex<Vec<SimulationEvent>>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SimulationEvent> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: &SimulationEvent) -> Result<(), SinkError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::reaction::ReactionChoice;

    #[test]
    fn test_lifecycle_wire_shape() {
        let start = serde_json::to_value(SimulationEvent::start(12)).unwrap();
        assert_eq!(start, serde_json::json!({"type": "start", "plannedAgents": 12}));

        let done = serde_json::to_value(SimulationEvent::complete(12)).unwrap();
        assert_eq!(done, serde_json::json!({"type": "complete", "totalResults": 12}));

        let err = serde_json::to_value(SimulationEvent::error("boom")).unwrap();
        assert_eq!(err, serde_json::json!({"type": "error", "message": "boom"}));
    }

    #[test]
    fn test_reaction_is_bare_record() {
        let reaction = Reaction::new("post_1", "3", ReactionChoice::Like, 0.2, 0.4);
        let json = serde_json::to_value(SimulationEvent::from(reaction.clone())).unwrap();
        assert!(json.get("type").is_none());
        assert_eq!(json["agentId"], "3");
        assert_eq!(json["reactionType"], "like");

        let back: SimulationEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back.as_reaction(), Some(&reaction));
    }

    #[test]
    fn test_frame() {
        let framed = frame(&SimulationEvent::start(5));
        assert_eq!(framed, "data: {\"type\":\"start\",\"plannedAgents\":5}\n\n");
    }

    #[test]
    fn test_channel_sink_reports_closed() {
        let (sink, rx) = ChannelSink::channel();
        assert!(sink.emit(&SimulationEvent::start(1)).is_ok());
        drop(rx);
        assert!(matches!(
            sink.emit(&SimulationEvent::complete(1)),
            Err(SinkError::Closed)
        ));
    }

    #[test]
    fn test_fn_sink() {
        let sink = FnSink(|_: &SimulationEvent| -> Result<(), SinkError> {
            Err(SinkError::Delivery("nope".into()))
        });
        assert!(sink.emit(&SimulationEvent::start(1)).is_err());
    }

    #[test]
    fn test_terminal() {
        assert!(SimulationEvent::complete(0).is_terminal());
        assert!(SimulationEvent::error("x").is_terminal());
        assert!(!SimulationEvent::start(0).is_terminal());
    }
}
