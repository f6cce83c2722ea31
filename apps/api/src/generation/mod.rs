// Resume and cover-letter drafting.
// All provider calls go through llm_client; the fallback path never touches the network.

pub mod fallback;
pub mod generator;
pub mod handlers;
pub mod prompts;
