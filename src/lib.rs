pub mod analysis;
pub mod epw;
pub mod error;
pub mod fetch;
pub mod orchestrator;
pub mod output;
pub mod pipeline;
pub mod scenario;
pub mod weather;
