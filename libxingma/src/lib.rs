//! # libxingma
//!
//! Shape-code (xingma) input method engine built on libcodetable-core.

pub mod config;
pub mod engine;

// Re-export table and decoder components from core
pub use libcodetable_core::*;

pub use config::XingmaConfig;
pub use engine::Engine;
