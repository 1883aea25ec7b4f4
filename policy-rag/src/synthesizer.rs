//! Answer synthesis from ranked policies.
//!
//! The [`AnswerSynthesizer`] has three outcomes:
//!
//! - no matches: a fixed topic-list answer, never calling the service;
//! - matches and a working completion service: the service's reply;
//! - matches but no service, or the call failed or timed out: the best
//!   keyword-overlap policy quoted verbatim.
//!
//! Confidence depends only on how many sources back the answer.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::completion::CompletionService;
use crate::document::{PolicyDocument, QueryResponse, RankedMatch};
use crate::error::ServiceError;

/// Instruction sent as the system message on every completion call.
pub const SYSTEM_INSTRUCTION: &str = "You are an HR assistant answering employee questions. \
Answer only from the company policies supplied in the context. If the answer is not contained \
in those policies, state explicitly that the policies do not cover it.";

/// Answer returned when retrieval finds nothing.
pub const NO_MATCH_ANSWER: &str = "I couldn't find a company policy that answers your question. \
I can help with questions about these topics: leave and vacation, remote work, code of conduct, \
employee benefits, performance reviews, expenses and travel, and training and development. \
Please rephrase your question or contact HR directly.";

/// Confidence reported for the no-match answer.
pub const NO_MATCH_CONFIDENCE: f32 = 0.1;

/// Stepwise confidence for an answer backed by `source_count` policies.
pub fn confidence_for(source_count: usize) -> f32 {
    match source_count {
        0 => 0.0,
        1 => 0.5,
        2 => 0.7,
        _ => 0.9,
    }
}

/// Builds a [`QueryResponse`] from ranked policies.
#[derive(Clone)]
pub struct AnswerSynthesizer {
    completion: Option<Arc<dyn CompletionService>>,
    timeout: Duration,
}

impl AnswerSynthesizer {
    /// Create a synthesizer. With `completion` set to `None` every answer
    /// comes from the fallback path.
    pub fn new(completion: Option<Arc<dyn CompletionService>>, timeout: Duration) -> Self {
        Self { completion, timeout }
    }

    /// Whether a completion service is available.
    pub fn has_completion_service(&self) -> bool {
        self.completion.is_some()
    }

    /// Produce the response for `question` from `matches`.
    ///
    /// Never fails: service errors and timeouts are logged and answered
    /// through the fallback.
    pub async fn synthesize(&self, question: &str, matches: Vec<RankedMatch>) -> QueryResponse {
        if matches.is_empty() {
            debug!("no relevant policies, returning topic list");
            return QueryResponse {
                answer: NO_MATCH_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: NO_MATCH_CONFIDENCE,
            };
        }

        let sources: Vec<PolicyDocument> = matches.into_iter().map(|m| m.document).collect();
        let confidence = confidence_for(sources.len());

        let answer = match &self.completion {
            Some(service) => match self.complete(service.as_ref(), question, &sources).await {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(provider = service.name(), error = %e, "completion failed, using fallback answer");
                    fallback_answer(question, &sources)
                }
            },
            None => {
                debug!("no completion service configured, using fallback answer");
                fallback_answer(question, &sources)
            }
        };

        debug!(source_count = sources.len(), confidence, "answer synthesized");
        QueryResponse { answer, sources, confidence }
    }

    async fn complete(
        &self,
        service: &dyn CompletionService,
        question: &str,
        sources: &[PolicyDocument],
    ) -> Result<String, ServiceError> {
        let prompt = user_prompt(question, sources);
        match tokio::time::timeout(self.timeout, service.complete(SYSTEM_INSTRUCTION, &prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ServiceError::new(
                service.name(),
                format!("no reply within {} ms", self.timeout.as_millis()),
            )),
        }
    }
}

/// Labeled title, content, and category of each policy, in ranked order.
pub fn grounding_context(sources: &[PolicyDocument]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, doc)| {
            format!(
                "Policy {}:\nTitle: {}\nContent: {}\nCategory: {}\n",
                i + 1,
                doc.title,
                doc.content,
                doc.category
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn user_prompt(question: &str, sources: &[PolicyDocument]) -> String {
    format!("Company policies:\n\n{}\nEmployee question: {question}", grounding_context(sources))
}

/// Number of question tokens that literally appear in the policy text.
pub fn keyword_overlap(question: &str, document: &PolicyDocument) -> usize {
    let haystack = document.searchable_text().to_lowercase();
    question
        .to_lowercase()
        .split_whitespace()
        .filter(|token| haystack.contains(token))
        .count()
}

/// Quote the policy with the highest keyword overlap.
///
/// Ties go to the higher-ranked policy. `sources` must not be empty.
fn fallback_answer(question: &str, sources: &[PolicyDocument]) -> String {
    let mut best = &sources[0];
    let mut best_overlap = keyword_overlap(question, best);
    for doc in &sources[1..] {
        let overlap = keyword_overlap(question, doc);
        if overlap > best_overlap {
            best = doc;
            best_overlap = overlap;
        }
    }

    let note = match sources.len() - 1 {
        0 => "Quoted from the most relevant policy. See the listed source for full details."
            .to_string(),
        1 => "Quoted from the most relevant policy. 1 more related policy is available in the \
              listed sources."
            .to_string(),
        more => format!(
            "Quoted from the most relevant policy. {more} more related policies are available \
             in the listed sources."
        ),
    };

    format!("{}\n\n{}\n\n{note}", best.title, best.content)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;

    struct Echo;

    #[async_trait]
    impl CompletionService for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(&self, system: &str, prompt: &str) -> Result<String, ServiceError> {
            assert_eq!(system, SYSTEM_INSTRUCTION);
            Ok(prompt.to_string())
        }
    }

    fn matches(docs: &[PolicyDocument]) -> Vec<RankedMatch> {
        docs.iter().map(|d| RankedMatch { document: d.clone(), score: 0.5 }).collect()
    }

    fn corpus() -> Vec<PolicyDocument> {
        vec![
            PolicyDocument::new("p1", "Leave Policy", "Annual leave is 20 days.", "Leave"),
            PolicyDocument::new("p2", "Remote Work", "Work from home twice a week.", "Work"),
        ]
    }

    #[test]
    fn confidence_steps() {
        assert_eq!(confidence_for(0), 0.0);
        assert_eq!(confidence_for(1), 0.5);
        assert_eq!(confidence_for(2), 0.7);
        assert_eq!(confidence_for(3), 0.9);
        assert_eq!(confidence_for(10), 0.9);
    }

    #[test]
    fn context_labels_fields_in_ranked_order() {
        let ctx = grounding_context(&corpus());
        let leave = ctx.find("Title: Leave Policy").unwrap();
        let remote = ctx.find("Title: Remote Work").unwrap();
        assert!(leave < remote);
        assert!(ctx.contains("Category: Work"));
        assert!(ctx.contains("Content: Annual leave is 20 days."));
    }

    #[test]
    fn overlap_counts_literal_tokens() {
        let doc = &corpus()[1];
        assert_eq!(keyword_overlap("can I work from home", doc), 4);
    }

    #[test]
    fn fallback_prefers_overlap_over_rank() {
        let answer = fallback_answer("work from home?", &corpus());
        assert!(answer.starts_with("Remote Work\n\nWork from home twice a week."));
        assert!(answer.contains("1 more related policy is available"));
    }

    #[test]
    fn fallback_ties_go_to_first_source() {
        let answer = fallback_answer("zzz", &corpus());
        assert!(answer.starts_with("Leave Policy"));
    }

    #[tokio::test]
    async fn empty_matches_never_call_service() {
        struct Panics;
        #[async_trait]
        impl CompletionService for Panics {
            fn name(&self) -> &str {
                "panics"
            }
            async fn complete(&self, _: &str, _: &str) -> Result<String, ServiceError> {
                panic!("must not be called");
            }
        }

        let synth = AnswerSynthesizer::new(Some(Arc::new(Panics)), Duration::from_secs(1));
        let response = synth.synthesize("anything", Vec::new()).await;
        assert_eq!(response.answer, NO_MATCH_ANSWER);
        assert!(response.sources.is_empty());
        assert_eq!(response.confidence, NO_MATCH_CONFIDENCE);
    }

    #[tokio::test]
    async fn service_reply_becomes_answer() {
        let synth = AnswerSynthesizer::new(Some(Arc::new(Echo)), Duration::from_secs(1));
        let response = synth.synthesize("How much leave?", matches(&corpus())).await;
        assert!(response.answer.contains("Employee question: How much leave?"));
        assert!(response.answer.contains("Title: Leave Policy"));
        assert_eq!(response.sources.len(), 2);
        assert_eq!(response.confidence, 0.7);
    }

    #[tokio::test]
    async fn missing_service_uses_fallback() {
        let synth = AnswerSynthesizer::new(None, Duration::from_secs(1));
        let response = synth.synthesize("annual leave", matches(&corpus()[..1])).await;
        assert!(response.answer.starts_with("Leave Policy"));
        assert_eq!(response.confidence, 0.5);
        assert!(!synth.has_completion_service());
    }
}
