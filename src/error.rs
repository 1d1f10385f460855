//! Error taxonomy for the pipeline.
//!
//! Only [`PipelineError::InputMissing`] and [`PipelineError::ParseFatal`] ever
//! abort a run. [`PipelineError::ParseElement`], [`PipelineError::RewriterParse`]
//! and [`PipelineError::BadIdentifier`] are constructed, logged via
//! `tracing::warn!`, and handled locally — never propagated as a returned
//! `Err`. `LookupMiss` names the RN/GTIN/ATC-not-found case in this taxonomy,
//! but the merger represents it directly as [`crate::merge::MergeStats`]
//! counters rather than constructing one of these per miss.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input file missing: {path}")]
    InputMissing { path: PathBuf, source: std::io::Error },

    #[error("failed to parse {source_name} as a whole: {message}")]
    ParseFatal {
        source_name: &'static str,
        message: String,
    },

    #[error("failed to parse element in {source_name}: {message}")]
    ParseElement {
        source_name: &'static str,
        message: String,
    },

    #[error("monograph XML did not parse: {message}")]
    RewriterParse { message: String },

    #[error("lookup miss: {kind} {key}")]
    LookupMiss { kind: &'static str, key: String },

    #[error("bad identifier: {value}")]
    BadIdentifier { value: String },
}

impl PipelineError {
    pub fn input_missing(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::InputMissing {
            path: path.into(),
            source,
        }
    }

    pub fn parse_fatal(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::ParseFatal {
            source_name,
            message: message.into(),
        }
    }

    pub fn parse_element(source_name: &'static str, message: impl Into<String>) -> Self {
        Self::ParseElement {
            source_name,
            message: message.into(),
        }
    }
}
