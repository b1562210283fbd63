//! Path file format
//!
//! Paths are persisted as a JSON document:
//!
//! ```text
//! {
//!   "segments": [ { "type": "spline", "basis": [[...]], "weights": [[...]] }, ... ],
//!   "rotations": { "<distance>": <degrees>, ... }
//! }
//! ```
//!
//! Only spline segments are serialised, in their basis-matrix/weight-matrix
//! representation. A document missing `segments` or `rotations`, or
//! containing an unrecognised segment type, is a format error. Writing a
//! path and reading it back reproduces the same position, heading, rotation
//! and curvature at every arc length within floating point tolerance.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DMatrix;
use ordered_float::NotNan;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};

// Internal
use super::{Path, PathSegment, SplineSegment};
use crate::maths::{spline::Spline, spline::SplineError, Rotation2};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// On-disk form of one path segment.
#[derive(Serialize, Deserialize)]
struct SegmentRecord {
    #[serde(rename = "type")]
    kind: String,
    basis: Vec<Vec<f64>>,
    weights: Vec<Vec<f64>>,
}

/// On-disk form of a whole path.
#[derive(Serialize, Deserialize)]
struct PathDocument {
    segments: Vec<SegmentRecord>,

    /// Robot facing in degrees keyed by distance along the path.
    rotations: BTreeMap<String, f64>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while reading or writing path files.
///
/// These are recoverable: the caller decides whether to retry, fall back to
/// a default path or abort the routine.
#[derive(Debug, thiserror::Error)]
pub enum PathIoError {
    #[error("Malformed path document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Unknown segment type \"{0}\"")]
    UnknownSegmentType(String),

    #[error("Only spline segments can be serialised, found a {0} segment")]
    UnsupportedSegment(&'static str),

    #[error("Rotation schedule key \"{0}\" is not a finite distance")]
    InvalidRotationKey(String),

    #[error("Invalid spline in path document: {0}")]
    InvalidSpline(#[from] SplineError),
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Write a path to a JSON document.
///
/// Only paths made of spline segments can be written.
pub fn write_path<W: Write>(writer: W, path: &Path) -> Result<(), PathIoError> {
    let mut segments = Vec::with_capacity(path.segments().len());
    for segment in path.segments() {
        let spline = match segment {
            PathSegment::Spline(spline_segment) => spline_segment.spline(),
            PathSegment::Line(_) => return Err(PathIoError::UnsupportedSegment("line")),
            PathSegment::Arc(_) => return Err(PathIoError::UnsupportedSegment("arc")),
        };

        segments.push(SegmentRecord {
            kind: "spline".to_string(),
            basis: matrix_to_rows(spline.basis_matrix()),
            weights: matrix_to_rows(spline.weight_matrix()),
        });
    }

    let rotations = path
        .rotation_map()
        .iter()
        .map(|(distance, rotation)| (distance.into_inner().to_string(), rotation.to_degrees()))
        .collect();

    let document = PathDocument {
        segments,
        rotations,
    };

    serde_json::to_writer(writer, &document)?;

    Ok(())
}

/// Read a path from a JSON document.
pub fn read_path<R: Read>(reader: R) -> Result<Path, PathIoError> {
    let document: PathDocument = serde_json::from_reader(reader)?;

    let mut segments = Vec::with_capacity(document.segments.len());
    for record in &document.segments {
        if record.kind != "spline" {
            return Err(PathIoError::UnknownSegmentType(record.kind.clone()));
        }

        let spline = Spline::new(
            rows_to_matrix(&record.basis),
            rows_to_matrix(&record.weights),
        )?;

        segments.push(PathSegment::Spline(SplineSegment::new(spline)));
    }

    let mut rotation_map = BTreeMap::new();
    for (key, degrees) in &document.rotations {
        let distance = key
            .parse::<f64>()
            .ok()
            .and_then(|d| NotNan::new(d).ok())
            .ok_or_else(|| PathIoError::InvalidRotationKey(key.clone()))?;

        rotation_map.insert(distance, Rotation2::from_degrees(*degrees));
    }

    Ok(Path::new(segments, rotation_map))
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn matrix_to_rows(matrix: &DMatrix<f64>) -> Vec<Vec<f64>> {
    (0..matrix.nrows())
        .map(|i| (0..matrix.ncols()).map(|j| matrix[(i, j)]).collect())
        .collect()
}

fn rows_to_matrix(rows: &[Vec<f64>]) -> DMatrix<f64> {
    let ncols = rows.first().map(|row| row.len()).unwrap_or(0);
    DMatrix::from_fn(rows.len(), ncols, |i, j| {
        rows[i].get(j).copied().unwrap_or(0.0)
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
