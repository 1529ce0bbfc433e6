pub mod battery;
pub mod config;
pub mod error;
pub mod input;
pub mod led;
pub mod mixer;
pub mod orchestrator;
pub mod supervisor;
pub mod text;
