// Document intake: type/size validation and raw text extraction.
// Runs before any network call; nothing here touches the LLM.

pub mod extract;
pub mod validation;
