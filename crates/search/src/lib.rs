//! Retrieval and grounded answering over a ragdesk vector store.
//!
//! [`Retriever`] embeds a query and returns the nearest chunks. [`AnswerComposer`] turns those
//! chunks into a prompt and calls a [`Completer`]. [`Assistant`] wires both to a
//! [`ragdesk_indexer::DocumentIndexer`] sharing the same store.

mod assistant;
mod completion;
mod composer;
mod error;
mod retriever;

pub use assistant::{Assistant, AssistantOptions};
pub use completion::{
    ChatMessage, Completer, CompletionConfig, OpenAiCompleter, Role, DEFAULT_COMPLETION_BASE_URL,
    DEFAULT_COMPLETION_MODEL,
};
pub use composer::{
    AnswerComposer, ComposedPrompt, COMPLETION_APOLOGY, DEFAULT_COMPLETION_TIMEOUT,
    FALLBACK_MARKER, NO_CONTEXT_SENTINEL, SYSTEM_INSTRUCTION,
};
pub use error::{Result, SearchError};
pub use retriever::{Retriever, DEFAULT_QUERY_EMBED_TIMEOUT, DEFAULT_TOP_K};
