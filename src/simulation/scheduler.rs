//! Batch scheduler: drives one run from tier name to `complete`.
//!
//! ```text
//! resolve tier -> select participants -> emit start
//!   -> for each batch of `batch_size`:
//!        spawn one production task per participant
//!        emit each reaction as its task finishes
//!        pause (not after the last batch)
//!   -> emit complete
//! ```
//!
//! Batches never overlap. Within a batch, emission order is completion
//! order. Per-participant failures are absorbed by the producer; only
//! partitioning errors and aborted tasks fail the run.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tokio::task::JoinSet;

use crate::config::{DEFAULT_BATCH_DELAY_MS, DEFAULT_BATCH_SIZE};
use crate::error::SimulationError;
use crate::simulation::events::{EventSink, SimulationEvent};
use crate::simulation::producer::ReactionProducer;
use crate::simulation::reaction::Reaction;
use crate::simulation::run::SimulationRun;
use crate::simulation::scale::ScaleResolver;
use crate::simulation::selector::{ParticipantSelector, Selection};
use crate::utilities::BatchPacer;

/// What to simulate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationRequest {
    pub content: String,
    pub tier: String,
    /// Post id stamped on every reaction. Minted per run when absent.
    #[serde(default)]
    pub post_id: Option<String>,
}

impl SimulationRequest {
    pub fn new(content: impl Into<String>, tier: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tier: tier.into(),
            post_id: None,
        }
    }

    pub fn with_post_id(mut self, post_id: impl Into<String>) -> Self {
        self.post_id = Some(post_id.into());
        self
    }
}

#[derive(Debug)]
pub struct BatchScheduler {
    resolver: ScaleResolver,
    selector: Arc<ParticipantSelector>,
    producer: Arc<ReactionProducer>,
    batch_size: usize,
    batch_delay: Duration,
}

impl BatchScheduler {
    pub fn new(
        resolver: ScaleResolver,
        selector: Arc<ParticipantSelector>,
        producer: Arc<ReactionProducer>,
    ) -> Self {
        Self {
            resolver,
            selector,
            producer,
            batch_size: DEFAULT_BATCH_SIZE,
            batch_delay: Duration::from_millis(DEFAULT_BATCH_DELAY_MS),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_batch_delay(mut self, batch_delay: Duration) -> Self {
        self.batch_delay = batch_delay;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn batch_delay(&self) -> Duration {
        self.batch_delay
    }

    /// Run a simulation and return its reactions in emission order.
    pub async fn run(
        &self,
        content: &str,
        tier: &str,
        sink: &dyn EventSink,
    ) -> Result<Vec<Reaction>, SimulationError> {
        self.execute(&SimulationRequest::new(content, tier), sink)
            .await
            .map(|run| run.reactions)
    }

    /// Run a simulation and return the full run record.
    ///
    /// On a fatal error the `error` event has already been emitted when
    /// this returns `Err`.
    pub async fn execute(
        &self,
        request: &SimulationRequest,
        sink: &dyn EventSink,
    ) -> Result<SimulationRun, SimulationError> {
        let planned = self.resolver.resolve(&request.tier);
        self.execute_planned(request, planned, sink).await
    }

    /// Like [`execute`](Self::execute) with an already resolved
    /// participant count.
    pub async fn execute_planned(
        &self,
        request: &SimulationRequest,
        planned: usize,
        sink: &dyn EventSink,
    ) -> Result<SimulationRun, SimulationError> {
        let selection = self.selector.select(planned);
        let post_id = request
            .post_id
            .clone()
            .unwrap_or_else(|| format!("post_{}", selection.run_id));
        let mut run = SimulationRun::new(
            selection.run_id.clone(),
            post_id,
            request.tier.clone(),
            selection.participant_ids(),
        );

        run.start();
        tracing::info!(
            run_id = %run.run_id,
            tier = %run.tier,
            planned,
            synthetic = selection.synthetic_count(),
            "simulation started"
        );
        emit(&mut run, sink, &SimulationEvent::start(planned));

        match self.drive(&mut run, &selection, &request.content, sink).await {
            Ok(()) => {
                run.complete();
                let total = run.reactions.len();
                emit(&mut run, sink, &SimulationEvent::complete(total));
                tracing::info!(
                    run_id = %run.run_id,
                    total,
                    batches = run.batch_sizes.len(),
                    undelivered = run.undelivered_events,
                    "simulation completed"
                );
                Ok(run)
            }
            Err(e) => {
                let message = e.to_string();
                run.fail(message.clone());
                emit(&mut run, sink, &SimulationEvent::error(message));
                tracing::error!(
                    run_id = %run.run_id,
                    produced = run.reactions.len(),
                    error = %e,
                    "simulation failed"
                );
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        run: &mut SimulationRun,
        selection: &Selection,
        content: &str,
        sink: &dyn EventSink,
    ) -> Result<(), SimulationError> {
        if self.batch_size == 0 {
            return Err(SimulationError::InvalidBatchSize(self.batch_size));
        }

        let pacer = BatchPacer::new(self.batch_delay);
        let content: Arc<str> = Arc::from(content);
        let post_id: Arc<str> = Arc::from(run.post_id.as_str());
        let batches = selection.participants.chunks(self.batch_size);
        let batch_count = batches.len();

        for (batch_index, batch) in batches.enumerate() {
            tracing::debug!(
                run_id = %run.run_id,
                batch = batch_index + 1,
                of = batch_count,
                size = batch.len(),
                "starting batch"
            );
            run.record_batch(batch.len());

            let mut tasks = JoinSet::new();
            for persona in batch {
                let producer = self.producer.clone();
                let persona = persona.clone();
                let content = content.clone();
                let post_id = post_id.clone();
                tasks.spawn(async move {
                    let outcome =
                        AssertUnwindSafe(producer.produce(&persona, &content, &post_id))
                            .catch_unwind()
                            .await;
                    (persona.id.clone(), outcome)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                match joined {
                    Ok((_, Ok(reaction))) => {
                        run.push_reaction(reaction.clone());
                        emit(run, sink, &SimulationEvent::Reaction(reaction));
                    }
                    Ok((persona_id, Err(panic))) => {
                        return Err(SimulationError::TaskAborted {
                            persona_id,
                            reason: panic_message(panic.as_ref()),
                        });
                    }
                    Err(e) => {
                        return Err(SimulationError::TaskAborted {
                            persona_id: "unknown".to_string(),
                            reason: e.to_string(),
                        });
                    }
                }
            }

            if batch_index + 1 < batch_count {
                pacer.pause().await;
            }
        }

        run.pauses = pacer.pauses();
        Ok(())
    }
}

/// Deliver one event. Failures are counted on the run and otherwise ignored.
fn emit(run: &mut SimulationRun, sink: &dyn EventSink, event: &SimulationEvent) {
    if let Err(e) = sink.emit(event) {
        run.undelivered_events += 1;
        tracing::debug!(run_id = %run.run_id, error = %e, "event not delivered");
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "task panicked".to_string()
    }
}
