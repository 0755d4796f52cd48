// Career pattern analysis over a user's interview and application history.
// Stateless; when the model's reply is unreadable the analysis is computed
// from the submitted history instead.

pub mod handlers;
pub mod patterns;
pub mod prompts;
