pub mod cli;
pub mod client;
pub mod export;
pub mod server;
pub mod session;

pub use client::{Generated, GenerationClient};
pub use session::{FALLBACK_NOTICE, GenerationEvent, Provenance, Report, Session};
