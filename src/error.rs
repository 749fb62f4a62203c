//! Error types

use crate::{Point2, Point3, Variant};
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// A vectorized variant disagreeing with the scalar reference
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Mismatch {
    pub variant: Variant,
    pub point: Point2,
    pub expected: Point3,
    pub actual: Point3,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} not equal at [{}, {}]: [{}, {}, {}] vs. [{}, {}, {}]",
            self.variant.name(),
            self.point[0],
            self.point[1],
            self.expected[0],
            self.expected[1],
            self.expected[2],
            self.actual[0],
            self.actual[1],
            self.actual[2],
        )
    }
}

impl std::error::Error for Mismatch {}

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("cross-validation failed: {0}")]
    Mismatch(#[from] Mismatch),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
