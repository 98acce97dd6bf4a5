//! Per-participant reaction production.
//!
//! [`ReactionProducer::produce`] never fails. Synthetic personas always go
//! to the local [`FallbackGenerator`]. Base personas go to the external
//! generator when it is available, and fall back on any error.

use std::sync::Arc;

use crate::llms::{GeneratedReaction, ReactionGenerator};
use crate::persona::{is_synthetic_id, Persona};
use crate::simulation::reaction::{classify, Reaction, ReactionChoice};
use crate::utilities::RandomSource;

/// Canned comments used by the fallback path.
pub const FALLBACK_COMMENTS: [&str; 8] = [
    "Interesting perspective! 🤔",
    "I disagree with this take tbh",
    "This is exactly what I was thinking",
    "Can you elaborate on this?",
    "Love this insight! 💯",
    "Not sure about this one...",
    "This hits different 🔥",
    "Facts! 💯",
];

/// Probability mass of a plain like in the fallback draw. The remainder is
/// split evenly between comment and retweet.
const FALLBACK_LIKE_WEIGHT: f64 = 0.7;

/// Local stand-in for the external generator.
#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    rng: RandomSource,
}

impl FallbackGenerator {
    pub fn new(rng: RandomSource) -> Self {
        Self { rng }
    }

    /// Draw a random reaction for `persona`.
    pub fn draw(&self, persona: &Persona, post_id: &str) -> Reaction {
        let choice = if self.rng.unit() < FALLBACK_LIKE_WEIGHT {
            ReactionChoice::Like
        } else if self.rng.unit() < 0.5 {
            let text = self.rng.choose(&FALLBACK_COMMENTS).unwrap_or(&FALLBACK_COMMENTS[0]);
            ReactionChoice::Comment(text.to_string())
        } else {
            ReactionChoice::Retweet
        };
        let sentiment = self.rng.uniform(-1.0, 1.0);
        let engagement = self.rng.unit();
        Reaction::new(post_id, &persona.id, choice, sentiment, engagement)
    }
}

/// Chooses between the external generator and the fallback for each
/// participant.
#[derive(Debug, Clone)]
pub struct ReactionProducer {
    generator: Option<Arc<dyn ReactionGenerator>>,
    fallback: FallbackGenerator,
}

impl ReactionProducer {
    pub fn new(generator: Option<Arc<dyn ReactionGenerator>>, rng: RandomSource) -> Self {
        Self {
            generator,
            fallback: FallbackGenerator::new(rng),
        }
    }

    /// Whether base personas will be sent to an available generator.
    pub fn has_live_generator(&self) -> bool {
        self.generator.as_ref().is_some_and(|g| g.is_available())
    }

    /// Produce one reaction to `content` as `persona`.
    pub async fn produce(&self, persona: &Persona, content: &str, post_id: &str) -> Reaction {
        if is_synthetic_id(&persona.id) {
            return self.fallback.draw(persona, post_id);
        }

        let generator = match &self.generator {
            Some(g) if g.is_available() => g,
            _ => {
                tracing::debug!(persona_id = %persona.id, "generator unavailable, using fallback");
                return self.fallback.draw(persona, post_id);
            }
        };

        let context = persona.reaction_context();
        match generator
            .generate(&persona.system_description(), content, &context)
            .await
            .and_then(GeneratedReaction::validate)
        {
            Ok(generated) => {
                let reaction = Self::interpret(persona, post_id, &generated);
                tracing::debug!(
                    persona_id = %persona.id,
                    kind = reaction.reaction_kind.as_str(),
                    "live reaction"
                );
                persona.record_reaction(reaction.clone());
                reaction
            }
            Err(e) => {
                tracing::warn!(
                    persona_id = %persona.id,
                    generator = generator.name(),
                    error = %e,
                    "generation failed, using fallback"
                );
                self.fallback.draw(persona, post_id)
            }
        }
    }

    fn interpret(persona: &Persona, post_id: &str, generated: &GeneratedReaction) -> Reaction {
        let engagement = generated.engagement_or_neutral();
        let choice = classify(persona, engagement, generated.comment());
        Reaction::new(
            post_id,
            &persona.id,
            choice,
            generated.sentiment_or_neutral(),
            engagement,
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::GenerationError;
    use crate::persona::{EngagementStyle, SyntheticPersonaGenerator};
    use crate::simulation::reaction::ReactionKind;
    use crate::simulation::run::RunId;

    /// Returns a fixed reaction and counts calls.
    #[derive(Debug, Default)]
    pub(crate) struct RecordingGenerator {
        pub calls: AtomicUsize,
        pub output: GeneratedReaction,
    }

    impl RecordingGenerator {
        pub fn returning(output: GeneratedReaction) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                output,
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReactionGenerator for RecordingGenerator {
        fn name(&self) -> &str {
            "recording"
        }

        async fn generate(
            &self,
            _system: &str,
            _content: &str,
            _context: &str,
        ) -> Result<GeneratedReaction, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.clone())
        }
    }

    #[derive(Debug, Default)]
    pub(crate) struct FailingGenerator {
        pub calls: AtomicUsize,
    }

    #[async_trait]
    impl ReactionGenerator for FailingGenerator {
        fn name(&self) -> &str {
            "failing"
        }

        async fn generate(
            &self,
            _system: &str,
            _content: &str,
            _context: &str,
        ) -> Result<GeneratedReaction, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(GenerationError::Status {
                status: 503,
                body: "overloaded".into(),
            })
        }
    }

    #[derive(Debug)]
    struct UnavailableGenerator;

    #[async_trait]
    impl ReactionGenerator for UnavailableGenerator {
        fn name(&self) -> &str {
            "unavailable"
        }

        fn is_available(&self) -> bool {
            false
        }

        async fn generate(
            &self,
            _system: &str,
            _content: &str,
            _context: &str,
        ) -> Result<GeneratedReaction, GenerationError> {
            panic!("must not be called when unavailable");
        }
    }

    fn comment_output(text: &str, engagement: f64) -> GeneratedReaction {
        GeneratedReaction {
            reaction_kind: Some("comment".into()),
            comment_text: Some(text.into()),
            sentiment: Some(0.6),
            engagement_likelihood: Some(engagement),
        }
    }

    #[tokio::test]
    async fn test_live_comment_is_recorded() {
        let gen = Arc::new(RecordingGenerator::returning(comment_output(
            "Really sharp observation here",
            0.4,
        )));
        let producer = ReactionProducer::new(Some(gen.clone()), RandomSource::seeded(1));
        let persona = Persona::new("1", "Sarah Chen");

        let reaction = producer.produce(&persona, "Rust is great", "post_1").await;
        assert_eq!(gen.calls(), 1);
        assert_eq!(reaction.reaction_kind, ReactionKind::Comment);
        assert_eq!(
            reaction.comment_text.as_deref(),
            Some("Really sharp observation here")
        );
        assert_eq!(reaction.sentiment, 0.6);
        assert_eq!(reaction.post_id, "post_1");
        assert_eq!(persona.history_len(), 1);
        assert_eq!(persona.reaction_context(), "Really sharp observation here");
    }

    #[tokio::test]
    async fn test_live_influencer_retweets() {
        let gen = Arc::new(RecordingGenerator::returning(comment_output(
            "Sharing this with everyone",
            0.95,
        )));
        let producer = ReactionProducer::new(Some(gen), RandomSource::seeded(1));
        let mut persona = Persona::new("2", "Marcus Johnson");
        persona.behavior.engagement_style = EngagementStyle::Influencer;

        let reaction = producer.produce(&persona, "post", "post_1").await;
        assert_eq!(reaction.reaction_kind, ReactionKind::Retweet);
        assert!(reaction.comment_text.is_none());
    }

    #[tokio::test]
    async fn test_live_missing_scores_are_neutral() {
        let gen = Arc::new(RecordingGenerator::returning(GeneratedReaction {
            reaction_kind: Some("like".into()),
            ..GeneratedReaction::default()
        }));
        let producer = ReactionProducer::new(Some(gen), RandomSource::seeded(1));
        let persona = Persona::new("1", "Sarah Chen");

        let reaction = producer.produce(&persona, "post", "post_1").await;
        assert_eq!(reaction.reaction_kind, ReactionKind::Like);
        assert_eq!(reaction.sentiment, 0.0);
        assert_eq!(reaction.engagement_likelihood, 0.5);
        assert_eq!(persona.history_len(), 1);
    }

    #[tokio::test]
    async fn test_wrong_shaped_output_falls_back() {
        let output: GeneratedReaction =
            serde_json::from_str(r#"{"reaction":"love it","score":9}"#).unwrap();
        let gen = Arc::new(RecordingGenerator::returning(output));
        let producer = ReactionProducer::new(Some(gen.clone()), RandomSource::seeded(6));
        let persona = Persona::new("1", "Sarah Chen");

        let mut neutral_likes = 0;
        for _ in 0..5 {
            let reaction = producer.produce(&persona, "post", "post_1").await;
            assert!(reaction.is_well_formed());
            if reaction.reaction_kind == ReactionKind::Like
                && reaction.sentiment == 0.0
                && reaction.engagement_likelihood == 0.5
            {
                neutral_likes += 1;
            }
        }
        assert_eq!(gen.calls(), 5);
        assert_eq!(persona.history_len(), 0);
        assert!(neutral_likes < 5);
    }

    #[tokio::test]
    async fn test_synthetic_never_calls_generator() {
        let gen = Arc::new(RecordingGenerator::default());
        let producer = ReactionProducer::new(Some(gen.clone()), RandomSource::seeded(2));
        let synth = SyntheticPersonaGenerator::new(RandomSource::seeded(3));
        let run = RunId::new();

        for i in 0..20 {
            let persona = synth.generate(&run, i);
            let reaction = producer.produce(&persona, "post", "post_1").await;
            assert!(reaction.is_well_formed());
            assert_eq!(persona.history_len(), 0);
        }
        assert_eq!(gen.calls(), 0);
    }

    #[tokio::test]
    async fn test_failure_falls_back() {
        let gen = Arc::new(FailingGenerator::default());
        let producer = ReactionProducer::new(Some(gen.clone()), RandomSource::seeded(4));
        let persona = Persona::new("1", "Sarah Chen");

        let reaction = producer.produce(&persona, "post", "post_1").await;
        assert_eq!(gen.calls.load(Ordering::SeqCst), 1);
        assert!(reaction.is_well_formed());
        assert_eq!(reaction.persona_id, "1");
        assert_eq!(persona.history_len(), 0);
    }

    #[tokio::test]
    async fn test_unavailable_is_not_called() {
        assert!(!ReactionProducer::new(None, RandomSource::seeded(5)).has_live_generator());
        let producer =
            ReactionProducer::new(Some(Arc::new(UnavailableGenerator)), RandomSource::seeded(5));
        assert!(!producer.has_live_generator());
        let persona = Persona::new("1", "Sarah Chen");
        let reaction = producer.produce(&persona, "post", "post_1").await;
        assert!(reaction.is_well_formed());
    }

    #[test]
    fn test_fallback_distribution() {
        let fallback = FallbackGenerator::new(RandomSource::seeded(42));
        let persona = Persona::new("1", "Sarah Chen");
        let (mut likes, mut comments, mut retweets) = (0usize, 0usize, 0usize);
        let trials = 20_000;

        for _ in 0..trials {
            let r = fallback.draw(&persona, "post_1");
            assert!(r.is_well_formed());
            match r.reaction_kind {
                ReactionKind::Like => likes += 1,
                ReactionKind::Comment => {
                    comments += 1;
                    let text = r.comment_text.as_deref().unwrap();
                    assert!(FALLBACK_COMMENTS.contains(&text));
                }
                ReactionKind::Retweet => retweets += 1,
                ReactionKind::Ignore => panic!("fallback never ignores"),
            }
        }

        let share = |n: usize| n as f64 / trials as f64;
        assert!((share(likes) - 0.70).abs() < 0.02, "likes {}", share(likes));
        assert!((share(comments) - 0.15).abs() < 0.02, "comments {}", share(comments));
        assert!((share(retweets) - 0.15).abs() < 0.02, "retweets {}", share(retweets));
    }

    #[test]
    fn test_fallback_is_reproducible() {
        let persona = Persona::new("1", "Sarah Chen");
        let a = FallbackGenerator::new(RandomSource::seeded(7));
        let b = FallbackGenerator::new(RandomSource::seeded(7));
        for _ in 0..50 {
            let (ra, rb) = (a.draw(&persona, "p"), b.draw(&persona, "p"));
            assert_eq!(ra.reaction_kind, rb.reaction_kind);
            assert_eq!(ra.sentiment, rb.sentiment);
            assert_eq!(ra.comment_text, rb.comment_text);
        }
    }
}
