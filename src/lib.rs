//! Fabrica - weekly short-form vertical video factory
//!
//! Generates short scripts with a language model, translates them, narrates
//! and renders vertical videos with ffmpeg, and organizes each week's output
//! into a dated batch with a manifest.

pub mod batch;
pub mod check;
pub mod cli;
pub mod config;
pub mod error;
pub mod media;
pub mod model;
pub mod record;
pub mod retry;
pub mod script;
pub mod speech;
pub mod stage;
pub mod subtitle;
pub mod translate;
pub mod workflow;
