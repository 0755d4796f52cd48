// Profile intake: resume parsing (text or PDF upload) and onboarding
// extraction into a structured belief state stored as a user_profile memory.

pub mod handlers;
pub mod onboarding;
pub mod prompts;
pub mod resume;
