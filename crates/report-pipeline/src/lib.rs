#![deny(warnings)]
#![deny(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

//! # report-pipeline
//!
//! Composite operations built on the validation engine.
//!
//! - [`transform_and_validate`] / [`TransformPipeline`] convert one
//!   validated shape into another without ever accepting unvalidated input
//!   or emitting unvalidated output.
//! - [`validate_batch`] / [`BatchValidator`] evaluate many independent
//!   validations and report on all of them.
//!
//! Neither bypasses the engine: every schema call goes through
//! [`report_validation::engine::validate`], so messages and failure shapes
//! are the same as for a single validation.

pub mod batch;
pub mod transform;

pub use batch::{BatchConfig, BatchRequest, BatchResult, BatchValidator, validate_batch};
pub use transform::{INPUT_SUFFIX, OUTPUT_SUFFIX, TransformPipeline, transform_and_validate};
