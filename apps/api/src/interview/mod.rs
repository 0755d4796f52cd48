// Interview practice: question generation for a target role and STAR-method
// evaluation of a candidate's answer. Stateless; nothing is written to memory.

pub mod handlers;
pub mod practice;
pub mod prompts;
