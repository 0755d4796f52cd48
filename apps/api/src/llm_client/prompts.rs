// Shared prompt fragments. Each service that needs LLM calls defines its own
// prompts.rs alongside it; this file only holds cross-cutting pieces.

/// Reminder appended to user prompts whose reply must be machine-readable.
pub const JSON_ONLY_REMINDER: &str = "Return ONLY valid JSON, no markdown or extra text.";

/// Short persona used by the stateless chat endpoint.
pub const CHAT_SYSTEM: &str = "You are a supportive, honest, and data-driven career mentor. \
    Your goal is to help the user achieve their career goals by providing actionable advice, \
    planning, and feedback. Always be concise, professional, and encouraging. \
    Use the context provided (resume, goals, history) to tailor your answers.";
