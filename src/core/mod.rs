// src/core/mod.rs
mod engine;
mod symbols;
mod snapshot;
mod diagnostics;
mod configuration;

// Per-type resolvers and the run driver
mod analysis;

// Export the main engine
pub use engine::Engine;
