// Resume analysis: prompt construction, single LLM round trip, and
// normalization of free-form model output into a Scorecard.
// All LLM calls go through llm_client.

pub mod handlers;
pub mod normalizer;
pub mod prompts;
pub mod service;
