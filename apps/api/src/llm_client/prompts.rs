// Shared prompt constants for provider calls.
// Analysis templates live in analysis::prompts.

/// System-role instruction sent with every OpenAI chat completion.
pub const CONTRACT_ANALYST_SYSTEM: &str = "You are a helpful assistant that analyzes contracts.";
