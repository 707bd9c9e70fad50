use std::sync::Arc;

use crate::{
    config::GenerationSettings,
    constants::quiz_prompt::{
        build_user_prompt, FORMAT_HINT, QUALITY_HINT, QUIZ_SYSTEM_PROMPT, SINGLE_QUESTION_HINT,
    },
    errors::{AppError, AppResult},
    models::domain::{QuizQuestion, RawCandidate},
    repositories::SeenQuestionRepository,
    services::{
        completion_service::CompletionService,
        quiz_pipeline::{
            full_signature, parse_quiz_blocks, starter, text::normalize_topic, CandidateValidator,
            FingerprintSet, RuleSet,
        },
    },
};

pub const DEFAULT_TOPIC: &str = "general cybersecurity";

const FILL_MAX_TOKENS: u32 = 900;
const BATCH_EXCERPT_CHARS: usize = 1200;
const FILL_EXCERPT_CHARS: usize = 900;

fn excerpt(raw: &str, max_chars: usize) -> String {
    raw.chars().take(max_chars).collect()
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct AbsorbCounts {
    built: usize,
    accepted: usize,
}

/// Mutable state of one generation call. Never shared between calls.
struct GenerationRun {
    requested: usize,
    accepted: Vec<QuizQuestion>,
    fingerprints: FingerprintSet,
    /// Oldest first.
    avoid: Vec<String>,
    avoid_cap: usize,
}

impl GenerationRun {
    fn new(requested: usize, settings: &GenerationSettings, mut stored_avoid: Vec<String>) -> Self {
        stored_avoid.truncate(settings.avoid_list_cap);
        // The store answers newest first; the run keeps the list oldest first.
        stored_avoid.reverse();

        Self {
            requested,
            accepted: Vec::with_capacity(requested),
            fingerprints: FingerprintSet::new(settings.question_similarity_threshold),
            avoid: stored_avoid,
            avoid_cap: settings.avoid_list_cap,
        }
    }

    fn remaining(&self) -> usize {
        self.requested.saturating_sub(self.accepted.len())
    }

    fn is_complete(&self) -> bool {
        self.remaining() == 0
    }

    fn remember(&mut self, question: &QuizQuestion) {
        self.avoid.push(question.question().to_string());
        if self.avoid.len() > self.avoid_cap {
            let excess = self.avoid.len() - self.avoid_cap;
            self.avoid.drain(..excess);
        }
    }

    /// Validates and de-duplicates candidates in order, accepting at most `limit`.
    fn absorb(
        &mut self,
        candidates: &[RawCandidate],
        validator: &CandidateValidator,
        limit: usize,
    ) -> AbsorbCounts {
        let mut counts = AbsorbCounts::default();

        for candidate in candidates {
            if self.is_complete() || counts.accepted >= limit {
                break;
            }

            let question = match validator.validate(candidate) {
                Ok(question) => question,
                Err(rejection) => {
                    log::debug!("Rejected candidate {:?}: {}", candidate.question, rejection);
                    continue;
                }
            };
            counts.built += 1;

            if let Err(duplicate) = self.fingerprints.try_accept(&question) {
                log::debug!("Skipped duplicate {:?}: {}", question.question(), duplicate);
                continue;
            }

            self.remember(&question);
            self.accepted.push(question);
            counts.accepted += 1;
        }

        counts
    }
}

/// Produces exactly N validated quiz questions from an unreliable completion backend.
pub struct QuizGenerationService {
    completion: Arc<dyn CompletionService>,
    seen_repository: Option<Arc<dyn SeenQuestionRepository>>,
    settings: GenerationSettings,
    validator: CandidateValidator,
}

impl QuizGenerationService {
    pub fn new(
        completion: Arc<dyn CompletionService>,
        seen_repository: Option<Arc<dyn SeenQuestionRepository>>,
        settings: GenerationSettings,
    ) -> Self {
        Self::with_rules(completion, seen_repository, settings, RuleSet::default())
    }

    pub fn with_rules(
        completion: Arc<dyn CompletionService>,
        seen_repository: Option<Arc<dyn SeenQuestionRepository>>,
        settings: GenerationSettings,
        rules: RuleSet,
    ) -> Self {
        let validator = CandidateValidator::new(settings.clone(), rules);
        Self {
            completion,
            seen_repository,
            settings,
            validator,
        }
    }

    /// Generates exactly `n` (clamped to `1..=max_questions`) questions on `topic`.
    ///
    /// When both ids are present the seen-question store steers the prompt away
    /// from recent questions and, on success, records what was served. Store
    /// failures are logged and never fail the call.
    pub async fn generate_quiz_questions(
        &self,
        topic: &str,
        n: usize,
        guild_id: Option<i64>,
        user_id: Option<i64>,
    ) -> AppResult<Vec<QuizQuestion>> {
        let topic = match topic.trim() {
            "" => DEFAULT_TOPIC,
            trimmed => trimmed,
        };
        let topic_key = normalize_topic(topic);
        let requested = n.clamp(1, self.settings.max_questions.max(1));
        let owner = guild_id.zip(user_id);

        log::info!(
            "Generating {} quiz question(s) on {:?} (owner={:?})",
            requested,
            topic,
            owner
        );

        let stored_avoid = match owner {
            Some((guild_id, user_id)) => self.load_avoid(guild_id, user_id, &topic_key).await,
            None => Vec::new(),
        };
        let mut run = GenerationRun::new(requested, &self.settings, stored_avoid);

        self.run_batch_phase(topic, &mut run).await?;
        if !run.is_complete() {
            self.run_fill_phase(topic, &mut run).await?;
        }

        if !run.is_complete() {
            log::warn!(
                "Quiz generation for {:?} fell short: {}/{}",
                topic,
                run.accepted.len(),
                requested
            );
            return Err(AppError::GenerationFailed {
                produced: run.accepted.len(),
                requested,
            });
        }

        if let Some((guild_id, user_id)) = owner {
            self.record_seen(guild_id, user_id, &topic_key, &run.accepted)
                .await;
        }

        let mut questions = run.accepted;
        questions.truncate(requested);
        Ok(questions)
    }

    async fn run_batch_phase(&self, topic: &str, run: &mut GenerationRun) -> AppResult<()> {
        let settings = &self.settings;
        let mut hint: Option<&str> = None;

        for round in 1..=settings.batch_rounds {
            if run.is_complete() {
                break;
            }

            let request_n = settings.batch_request_size(run.remaining());
            let prompt = build_user_prompt(topic, request_n, settings, &run.avoid, hint);
            let raw = self
                .completion
                .complete(
                    QUIZ_SYSTEM_PROMPT,
                    &prompt,
                    settings.batch_max_tokens(request_n),
                    settings.temperature,
                )
                .await?;

            let parsed = parse_quiz_blocks(&raw, settings.expected_choices);
            if parsed.is_empty() {
                log::warn!("Quiz parse failed (round {}): 0 blocks", round);
                log::warn!(
                    "Raw completion (first {}): {:?}",
                    BATCH_EXCERPT_CHARS,
                    excerpt(&raw, BATCH_EXCERPT_CHARS)
                );
                hint = Some(FORMAT_HINT);
                continue;
            }

            let counts = run.absorb(&parsed, &self.validator, usize::MAX);
            log::info!(
                "Quiz round {} | parsed={} | built={} | accepted={} | total={}/{}",
                round,
                parsed.len(),
                counts.built,
                counts.accepted,
                run.accepted.len(),
                run.requested
            );

            if counts.accepted == 0 {
                hint = Some(QUALITY_HINT);
            }
        }

        Ok(())
    }

    async fn run_fill_phase(&self, topic: &str, run: &mut GenerationRun) -> AppResult<()> {
        let settings = &self.settings;

        for attempt in 1..=settings.fill_tries {
            if run.is_complete() {
                break;
            }

            let prompt =
                build_user_prompt(topic, 1, settings, &run.avoid, Some(SINGLE_QUESTION_HINT));
            let raw = self
                .completion
                .complete(
                    QUIZ_SYSTEM_PROMPT,
                    &prompt,
                    FILL_MAX_TOKENS,
                    settings.temperature,
                )
                .await?;

            let parsed = parse_quiz_blocks(&raw, settings.expected_choices);
            let counts = run.absorb(&parsed, &self.validator, 1);
            if counts.accepted == 0 {
                log::warn!(
                    "One-by-one fill failed (try {}). Raw completion (first {}): {:?}",
                    attempt,
                    FILL_EXCERPT_CHARS,
                    excerpt(&raw, FILL_EXCERPT_CHARS)
                );
            }
        }

        Ok(())
    }

    async fn load_avoid(&self, guild_id: i64, user_id: i64, topic_key: &str) -> Vec<String> {
        let Some(repository) = &self.seen_repository else {
            return Vec::new();
        };

        match repository
            .load_recent_avoid(
                guild_id,
                user_id,
                topic_key,
                self.settings.avoid_history_limit,
                self.settings.avoid_ttl_days,
            )
            .await
        {
            Ok(history) => history,
            Err(e) => {
                log::warn!("Loading seen questions failed: {}", e);
                Vec::new()
            }
        }
    }

    async fn record_seen(
        &self,
        guild_id: i64,
        user_id: i64,
        topic_key: &str,
        questions: &[QuizQuestion],
    ) {
        let Some(repository) = &self.seen_repository else {
            return;
        };

        for question in questions {
            let signature = full_signature(question.question(), question.choices());
            let opening = starter(question.question());
            if let Err(e) = repository
                .record_seen(
                    guild_id,
                    user_id,
                    topic_key,
                    &signature,
                    &opening,
                    question.question(),
                )
                .await
            {
                log::warn!("Recording seen question failed: {}", e);
            }
        }
    }
}
