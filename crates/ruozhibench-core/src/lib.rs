//! Core library for the ruozhibench evaluation harness.
//!
//! The pipeline shape is the same for every run: load a JSONL record set,
//! render prompts, dispatch them through a pluggable LLM client with
//! per-response validation, extract structured ratings/choices from the raw
//! text, and persist the enriched records as JSONL plus a CSV projection.

pub mod client;
pub mod config;
pub mod dataset;
pub mod dispatch;
pub mod errors;
pub mod extract;
pub mod model;
pub mod pipeline;
pub mod prompts;

pub use errors::Error;
