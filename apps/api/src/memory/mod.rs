// Conversation memory: persistence behind `MemoryStore` and prompt formatting.
// Records are append-only and always scoped to one user.

pub mod format;
pub mod store;

pub use format::{format_memories_for_prompt, latest_reflection};
pub use store::{MemoryStore, PgMemoryStore};
