//! Core library for the `pyxis-gateway` binary.
//!
//! This crate provides the internal building blocks the binary wires
//! together: CLI argument types, configuration loading, the wire types
//! shared with the compute/storage tiers, the task-mix boundary model, the
//! throughput meter, the arbiter trait and its two implementations (Pyxis,
//! Kayak), and the gateway dispatcher itself.
pub mod arbiter;
pub mod args;
pub mod config;
pub mod error;
pub mod gateway;
pub mod logger;
pub mod meter;
pub mod shutdown;
pub mod taskmix;
pub mod types;
