// Mentor agent: advice generation with lesson enforcement, reflection on
// negative feedback, and career trajectory simulation.
// All LLM calls go through llm_client::ChatModel and all memory access goes
// through memory::MemoryStore; both are passed in explicitly.

pub mod handlers;
pub mod lessons;
pub mod prompts;
pub mod reflect;
pub mod respond;
pub mod trajectory;
