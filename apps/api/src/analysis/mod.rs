// Contract analysis: PDF ingestion, prompt templating, and the run pipeline.
// All LLM calls go through llm_client; nothing here talks to a provider directly.

pub mod handlers;
pub mod ingest;
pub mod pipeline;
pub mod prompts;
pub mod templates;
