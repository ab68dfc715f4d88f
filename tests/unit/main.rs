//! Unit tests for the member instance controller
//!
//! Covers tag reconciliation, transient-error retry, status polling,
//! desired-state extraction and state projection in isolation. Full
//! lifecycle passes live in the convergence test suite.

#[path = "../common/mod.rs"]
mod common;

mod poll;
mod spec;
mod tags;
