//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - loaded rows (`SeriesDescriptor`, `Observation`, `ReferenceObservation`)
//! - pipeline outputs (`AnnualPrice`, `ConvertedAnnualPrice`)
//! - session configuration (`PipelineConfig`)

pub mod types;

pub use types::*;
