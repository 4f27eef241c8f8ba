// Interview chat orchestration: role/difficulty templates, prompt assembly,
// the stateless phase orchestrator, and grading-feedback extraction.
// All gateway calls go through llm_client.

pub mod feedback;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod templates;
