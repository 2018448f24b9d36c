use crate::completion::{ChatMessage, Completer};
use crate::error::SearchError;
use ragdesk_vector_store::Chunk;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

/// Context used when retrieval found nothing
pub const NO_CONTEXT_SENTINEL: &str = "No relevant information found in the provided documents.";

/// Prefix the model is asked to use before answering from outside knowledge
pub const FALLBACK_MARKER: &str =
    "I could not find the answer in the provided documents, but I can answer from common knowledge:";

/// Returned whenever the completion call fails
pub const COMPLETION_APOLOGY: &str =
    "Sorry, I encountered an error while trying to generate an answer.";

pub const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant answering questions based on provided context.";

pub const DEFAULT_COMPLETION_TIMEOUT: Duration = Duration::from_secs(60);

const CONTEXT_LOG_CHARS: usize = 1000;

/// System instruction, user prompt and the sources behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
    pub context: String,
    pub sources: BTreeSet<String>,
}

impl ComposedPrompt {
    #[must_use]
    pub fn messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system.clone()),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

/// Grounded prompt assembly and the completion call behind `answer`
pub struct AnswerComposer {
    completer: Arc<dyn Completer>,
    timeout: Duration,
}

impl AnswerComposer {
    pub fn new(completer: Arc<dyn Completer>) -> Self {
        Self {
            completer,
            timeout: DEFAULT_COMPLETION_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the prompt for `query` from `chunks`, kept in retrieval order.
    #[must_use]
    pub fn compose(query: &str, chunks: &[Chunk]) -> ComposedPrompt {
        let (context, sources) = if chunks.is_empty() {
            log::warn!("No relevant chunks found for the query.");
            (NO_CONTEXT_SENTINEL.to_string(), BTreeSet::new())
        } else {
            let context = chunks
                .iter()
                .map(|chunk| chunk.text.as_str())
                .collect::<Vec<_>>()
                .join("\n\n");
            let sources: BTreeSet<String> =
                chunks.iter().map(|chunk| chunk.source.clone()).collect();
            log::info!("Context built from sources: {sources:?}");
            (context, sources)
        };

        let preview: String = context.chars().take(CONTEXT_LOG_CHARS).collect();
        log::debug!("Context for query: {preview}...");

        ComposedPrompt {
            system: SYSTEM_INSTRUCTION.to_string(),
            user: user_prompt(query, &context),
            context,
            sources,
        }
    }

    /// Compose and complete; any completion failure becomes [`COMPLETION_APOLOGY`].
    pub async fn answer(&self, query: &str, chunks: &[Chunk]) -> String {
        let prompt = Self::compose(query, chunks);
        let messages = prompt.messages();

        let result = match tokio::time::timeout(self.timeout, self.completer.complete(&messages))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(SearchError::CompletionTimeout(self.timeout.as_secs())),
        };

        match result {
            Ok(answer) => answer,
            Err(err) => {
                log::error!(
                    "Completion via {} failed: {err}",
                    self.completer.model_id()
                );
                COMPLETION_APOLOGY.to_string()
            }
        }
    }
}

fn user_prompt(query: &str, context: &str) -> String {
    format!(
        "You are answering questions using the provided context, plus common knowledge only \
         when the context is not enough.\n\
         Answer from the context and from reasonable inference upon it whenever possible.\n\
         If the context and inference upon it do not contain the answer and you have to rely \
         on knowledge outside of it, begin your answer with \"{FALLBACK_MARKER}\" and then \
         answer.\n\
         \n\
         Context:\n\
         ---\n\
         {context}\n\
         ---\n\
         \n\
         Question: {query}\n\
         \n\
         Answer:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_chunks_use_the_sentinel() {
        let prompt = AnswerComposer::compose("What is RAG?", &[]);
        assert_eq!(prompt.context, NO_CONTEXT_SENTINEL);
        assert!(prompt.user.contains(NO_CONTEXT_SENTINEL));
        assert!(prompt.user.contains("Question: What is RAG?"));
        assert!(prompt.sources.is_empty());
    }

    #[test]
    fn context_keeps_retrieval_order_and_dedups_sources() {
        let chunks = vec![
            Chunk::new("nearest", "b.pdf"),
            Chunk::new("middle", "a.txt"),
            Chunk::new("farthest", "b.pdf"),
        ];
        let prompt = AnswerComposer::compose("q", &chunks);

        assert_eq!(prompt.context, "nearest\n\nmiddle\n\nfarthest");
        let sources: Vec<&str> = prompt.sources.iter().map(String::as_str).collect();
        assert_eq!(sources, vec!["a.txt", "b.pdf"]);
    }

    #[test]
    fn prompt_carries_the_fallback_instruction() {
        let prompt = AnswerComposer::compose("q", &[Chunk::new("ctx", "a.txt")]);
        assert!(prompt.user.contains(FALLBACK_MARKER));
        assert!(prompt.user.contains("---\nctx\n---"));

        let messages = prompt.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, SYSTEM_INSTRUCTION);
    }
}
