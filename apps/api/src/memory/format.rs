//! Turns a user's recent memories into the context block injected into prompts.
//!
//! Input is newest-first, exactly as `MemoryStore::fetch_recent` returns it.
//! Lessons keep that order; conversation history is flipped to oldest-first.

use crate::models::memory::MemoryRecord;

pub const EMPTY_MEMORY_PLACEHOLDER: &str =
    "No past memories available. This appears to be an early conversation.";
pub const LESSONS_HEADER: &str = "## PAST MISTAKES & LESSONS (CRITICAL)";
pub const HISTORY_HEADER: &str = "## RECENT CONVERSATION HISTORY";

/// Splits records into (reflections, everything else), preserving input order.
fn partition_memories(memories: &[MemoryRecord]) -> (Vec<&MemoryRecord>, Vec<&MemoryRecord>) {
    memories.iter().partition(|m| m.is_reflection())
}

/// The newest reflection in a newest-first list. Only this one gates enforcement.
pub fn latest_reflection(memories: &[MemoryRecord]) -> Option<&MemoryRecord> {
    memories.iter().find(|m| m.is_reflection())
}

pub fn format_memories_for_prompt(memories: &[MemoryRecord]) -> String {
    if memories.is_empty() {
        return EMPTY_MEMORY_PLACEHOLDER.to_string();
    }

    let (reflections, history) = partition_memories(memories);
    let mut context = String::new();

    if !reflections.is_empty() {
        let lessons = reflections
            .iter()
            .map(|m| format!("- [LESSON LEARNED]: {}", m.content))
            .collect::<Vec<_>>()
            .join("\n");
        context.push_str(&format!("{LESSONS_HEADER}\n{lessons}\n\n"));
    }

    let history_text = history
        .iter()
        .rev()
        .map(|m| {
            // Only advice is attributed to the mentor; every other type reads as the user.
            let label = if m.is_mentor_advice() { "Mentor" } else { "User" };
            format!(
                "[{}] {}: {}",
                m.created_at.format("%-m/%-d/%Y"),
                label,
                m.content
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    context.push_str(&format!("{HISTORY_HEADER}\n{history_text}"));
    context
}
