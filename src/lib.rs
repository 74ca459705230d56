#![doc(test(attr(deny(warnings))))]

//! FormView Core orchestrates declarative forms: it tracks the live controller
//! behind each field, aggregates required-field validity, sequences input focus
//! in declaration order and resolves a single output object on submission.
//!
//! Rendering is left to the host. Hosts implement [`form::FieldController`]
//! for their widgets, register them with a [`form::Form`], and forward focus,
//! return, submit and clear events to it.

pub mod cli;
pub mod config;
pub mod errors;
pub mod form;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("FormView Core tracing initialized.");
    });
}
