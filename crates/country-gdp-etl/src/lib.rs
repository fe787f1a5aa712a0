//! Country GDP ETL: fetch a web page, take its first table, clean the GDP
//! column and store the result in SQLite.
//!
//! The stages are plain functions run in sequence by [`run_pipeline`]:
//! [`extraction::extract`], [`transform::transform`], [`storage::load`].
//! Each takes a [`ProgressSink`] for its phase messages.

pub mod acquisition;
pub mod config;
pub mod dataset;
pub mod error;
pub mod extraction;
pub mod pipeline;
pub mod progress;
pub mod storage;
pub mod transform;

pub use config::EtlConfig;
pub use dataset::{Column, ColumnKind, Dataset, Value};
pub use error::{EtlError, Result};
pub use pipeline::{run_pipeline, RunSummary};
pub use progress::{ProgressSink, RecordingProgress, TracingProgress};
