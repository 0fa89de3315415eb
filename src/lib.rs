//! Core library for the `linestress` CLI.
//!
//! This crate provides the building blocks used by the binary: a probe that
//! drives timed `/ping` round trips over one TCP connection, a tier runner
//! that launches many probes at once and aggregates their samples, and the
//! configuration, error and reporting layers around them. The primary
//! user-facing interface is the `linestress` command-line application.
pub mod app;
pub mod args;
pub mod config;
pub mod error;
pub mod logger;
pub mod metrics;
pub mod probe;
pub mod runner;
