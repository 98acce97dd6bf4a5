//! The simulation service: one explicit object owning the registry, the
//! selector, and the scheduler. Built once at start-up and shared by handle.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::llms::{OpenRouterGenerator, ReactionGenerator};
use crate::persona::{ModelDistribution, PersonaRegistry, SharedPersona};
use crate::simulation::events::{ChannelSink, EventSink, SimulationEvent};
use crate::simulation::producer::ReactionProducer;
use crate::simulation::run::SimulationRun;
use crate::simulation::scale::ScaleResolver;
use crate::simulation::scheduler::{BatchScheduler, SimulationRequest};
use crate::simulation::selector::ParticipantSelector;
use crate::utilities::RandomSource;

#[derive(Debug)]
pub struct SimulationService {
    config: SimulationConfig,
    selector: Arc<ParticipantSelector>,
    scheduler: BatchScheduler,
}

impl SimulationService {
    /// Assemble a service from parts. `generator` is optional; without one
    /// every reaction comes from the fallback.
    pub fn new(
        config: SimulationConfig,
        registry: PersonaRegistry,
        generator: Option<Arc<dyn ReactionGenerator>>,
    ) -> Result<Self, SimulationError> {
        config.validate()?;

        let rng = RandomSource::from_optional_seed(config.seed);
        let selector = Arc::new(ParticipantSelector::new(Arc::new(registry), rng.clone()));
        let producer = Arc::new(ReactionProducer::new(generator, rng.clone()));
        tracing::info!(
            live_generation = producer.has_live_generator(),
            batch_size = config.batch_size,
            "simulation service ready"
        );
        let scheduler = BatchScheduler::new(ScaleResolver::new(rng), selector.clone(), producer)
            .with_batch_size(config.batch_size)
            .with_batch_delay(config.batch_delay());

        Ok(Self {
            config,
            selector,
            scheduler,
        })
    }

    /// Load the persona catalog and build the OpenRouter generator from
    /// `config`.
    pub fn from_config(config: SimulationConfig) -> Result<Self, SimulationError> {
        let registry = match &config.personas_path {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading persona catalog");
                PersonaRegistry::from_json_file(path)?
            }
            None => PersonaRegistry::builtin(),
        };

        let generator = OpenRouterGenerator::new(config.generator.clone())?;
        if generator.is_available() {
            tracing::info!(model = generator.model(), "live generation enabled");
        } else {
            tracing::warn!("no generation credential configured, all reactions use the fallback");
        }

        Self::new(config, registry, Some(Arc::new(generator)))
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// The base persona catalog.
    pub fn agents(&self) -> &[SharedPersona] {
        self.selector.registry().all()
    }

    /// A base persona, or a synthetic persona of the most recent run.
    pub fn agent_by_id(&self, id: &str) -> Option<SharedPersona> {
        self.selector.lookup(id)
    }

    pub fn distribution(&self) -> ModelDistribution {
        ModelDistribution::of(self.agents())
    }

    /// Run to completion, delivering events to `sink`.
    pub async fn simulate(
        &self,
        request: &SimulationRequest,
        sink: &dyn EventSink,
    ) -> Result<SimulationRun, SimulationError> {
        self.scheduler.execute(request, sink).await
    }

    /// Start a run in the background and return its event stream.
    ///
    /// The channel closes after the `complete` or `error` event. Dropping
    /// the receiver does not stop the run.
    pub fn stream(
        self: Arc<Self>,
        request: SimulationRequest,
    ) -> mpsc::UnboundedReceiver<SimulationEvent> {
        let (sink, rx) = ChannelSink::channel();
        tokio::spawn(async move {
            // The outcome has already been emitted as an event.
            let _ = self.scheduler.execute(&request, &sink).await;
        });
        rx
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::simulation::events::{CollectingSink, LifecycleEvent};

    fn fast_config() -> SimulationConfig {
        SimulationConfig::default()
            .with_batch_delay(Duration::ZERO)
            .with_seed(99)
    }

    fn service() -> SimulationService {
        SimulationService::new(fast_config(), PersonaRegistry::builtin(), None).unwrap()
    }

    #[test]
    fn test_catalog_queries() {
        let svc = service();
        assert_eq!(svc.agents().len(), 5);
        assert_eq!(svc.distribution().total, 5);
        assert_eq!(svc.agent_by_id("3").unwrap().name, "Dr. Elena Rodriguez");
        assert!(svc.agent_by_id("nobody").is_none());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = SimulationService::new(
            fast_config().with_batch_size(0),
            PersonaRegistry::builtin(),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, SimulationError::Config(_)));
    }

    #[tokio::test]
    async fn test_synthetic_agents_resolvable_after_run() {
        let svc = service();
        let sink = CollectingSink::new();
        let run = svc
            .simulate(&SimulationRequest::new("hello", "unknown-tier"), &sink)
            .await
            .unwrap();

        assert_eq!(run.planned, 10);
        let synthetic: Vec<&String> = run
            .participant_ids
            .iter()
            .filter(|id| id.starts_with("syn_"))
            .collect();
        assert_eq!(synthetic.len(), 5);
        for id in synthetic {
            assert_eq!(&svc.agent_by_id(id).unwrap().id, id);
        }
    }

    #[tokio::test]
    async fn test_stream_closes_after_complete() {
        let svc = Arc::new(service());
        let mut rx = svc.clone().stream(SimulationRequest::new("hello", "nano"));

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }

        assert_eq!(events.len(), 7);
        assert_eq!(events[0], SimulationEvent::start(5));
        assert!(matches!(
            events.last(),
            Some(SimulationEvent::Lifecycle(LifecycleEvent::Complete { total_results: 5 }))
        ));
    }

    #[tokio::test]
    async fn test_from_config_without_key_uses_builtin() {
        let svc = SimulationService::from_config(fast_config()).unwrap();
        assert_eq!(svc.agents().len(), 5);
        let sink = CollectingSink::new();
        let run = svc
            .simulate(&SimulationRequest::new("hello", "nano"), &sink)
            .await
            .unwrap();
        assert_eq!(run.reactions.len(), 5);
    }

    #[test]
    fn test_from_config_missing_catalog() {
        let mut config = fast_config();
        config.personas_path = Some("/nonexistent/catalog.json".into());
        let err = SimulationService::from_config(config).unwrap_err();
        assert!(matches!(err, SimulationError::Registry(_)));
    }
}
