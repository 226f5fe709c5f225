//! Briefsmith: an HTTP API service that turns design-brief form input into a
//! structured brief via an LLM chat completion, and brief prompts into PNG
//! images via an image-generation API.
//!
//! Every expensive upstream call sits behind a per-client gate: a cooldown
//! throttle and a daily quota counter keyed by the caller's forwarded
//! address. See the [`gate`] module for the gating model and its limits.

pub mod api;
pub mod brief;
pub mod config;
pub mod error;
pub mod gate;
pub mod providers;

pub use config::Config;
pub use error::{BriefsmithError, Result};
