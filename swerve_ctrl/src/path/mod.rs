//! # Path module
//!
//! A path is an ordered sequence of segments (lines, arcs and splines)
//! indexed by cumulative arc length, together with an independently scheduled
//! rotation profile. The heading of a path state is the direction of travel
//! tangent to the path; the rotation is the robot body's facing, which for a
//! holonomic robot is decoupled from the direction of travel and interpolated
//! from its own distance-keyed schedule.
//!
//! Paths are built once by one of the builders and are immutable afterwards.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod builder;
mod generator;
pub mod io;
mod segment;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use ordered_float::NotNan;
use std::collections::BTreeMap;

// Internal
pub use builder::*;
pub use generator::*;
pub use segment::*;

use crate::maths::{Rotation2, Vector2};
use util::maths::clamp;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A waypoint a path should pass through.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Waypoint {
    /// The position of the waypoint.
    pub position: Vector2,

    /// The direction of travel of the robot as it passes through the
    /// waypoint.
    pub heading: Rotation2,

    /// The facing of the robot body as it passes through the waypoint,
    /// scheduled independently of the heading.
    pub rotation: Rotation2,
}

/// An immutable path through 2D space.
#[derive(Debug, Clone)]
pub struct Path {
    segments: Vec<PathSegment>,

    /// Cumulative distance from the path start to the start of each segment.
    distances_from_start: Vec<f64>,

    length: f64,

    /// The rotation schedule: robot facing keyed by distance along the path.
    rotation_map: BTreeMap<NotNan<f64>, Rotation2>,
}

/// The full state of a path at a distance along it.
#[derive(Debug, Copy, Clone)]
pub struct PathState {
    /// Distance along the path this state was sampled at.
    pub distance: f64,

    /// Position on the path.
    pub position: Vector2,

    /// Direction of travel tangent to the path.
    pub heading: Rotation2,

    /// Scheduled robot facing, interpolated from the rotation schedule.
    pub rotation: Rotation2,

    /// Curvature of the path at the sample point.
    pub curvature: f64,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised when building paths.
#[derive(Debug, thiserror::Error)]
pub enum PathError {
    #[error("A path requires at least 2 waypoints, got {0}")]
    TooFewWaypoints(usize),

    #[error("Cannot build an empty path, add at least one segment first")]
    EmptyPath,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Waypoint {
    pub fn new(position: Vector2, heading: Rotation2) -> Self {
        Self {
            position,
            heading,
            rotation: Rotation2::ZERO,
        }
    }

    pub fn with_rotation(position: Vector2, heading: Rotation2, rotation: Rotation2) -> Self {
        Self {
            position,
            heading,
            rotation,
        }
    }
}

impl Path {
    /// Create a new path from a sequence of segments and a rotation schedule.
    ///
    /// Segment endpoints are expected to be contiguous (the end of segment i
    /// is the start of segment i+1); the builders guarantee this.
    pub fn new(
        segments: Vec<PathSegment>,
        rotation_map: BTreeMap<NotNan<f64>, Rotation2>,
    ) -> Self {
        let mut distances_from_start = Vec::with_capacity(segments.len());
        let mut length = 0.0;
        for segment in &segments {
            distances_from_start.push(length);
            length += segment.length();
        }

        Self {
            segments,
            distances_from_start,
            length,
            rotation_map,
        }
    }

    /// The total arc length of the path.
    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn rotation_map(&self) -> &BTreeMap<NotNan<f64>, Rotation2> {
        &self.rotation_map
    }

    /// Find the index of the segment which owns the given distance.
    fn segment_at_distance(&self, distance: f64) -> usize {
        // The owning segment is the last one starting at or before the
        // distance
        let index = self
            .distances_from_start
            .partition_point(|&start| start <= distance);

        if index == 0 {
            0
        } else {
            (index - 1).min(self.segments.len() - 1)
        }
    }

    /// Evaluate the path at a distance along it.
    ///
    /// The distance is clamped into `[0, length]`.
    pub fn calculate(&self, distance: f64) -> PathState {
        let distance = clamp(&distance, &0.0, &self.length);

        let index = self.segment_at_distance(distance);
        let segment = &self.segments[index];
        let segment_distance = distance - self.distances_from_start[index];

        let state = segment.calculate(segment_distance);

        PathState {
            distance,
            position: state.position,
            heading: state.heading,
            rotation: self.rotation_at(distance),
            curvature: state.curvature,
        }
    }

    /// Evaluate the rotation schedule at a distance along the path.
    ///
    /// The rotation is interpolated between the two schedule entries
    /// surrounding the distance, taking the shorter way around. Distances
    /// outside the schedule take the nearest entry.
    pub fn rotation_at(&self, distance: f64) -> Rotation2 {
        // NaN cannot reach here, the distance was clamped against the finite
        // path length by the caller
        let key = NotNan::new(clamp(&distance, &0.0, &self.length)).unwrap();

        let below = self.rotation_map.range(..=key).next_back();
        let above = self.rotation_map.range(key..).next();

        match (below, above) {
            (Some((d0, r0)), Some((d1, r1))) => {
                let span = d1.into_inner() - d0.into_inner();
                if span <= 0.0 {
                    *r0
                } else {
                    r0.interpolate(*r1, (distance - d0.into_inner()) / span)
                }
            }
            (Some((_, r0)), None) => *r0,
            (None, Some((_, r1))) => *r1,
            (None, None) => Rotation2::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn two_line_path() -> Path {
        let mut rotation_map = BTreeMap::new();
        rotation_map.insert(NotNan::new(0.0).unwrap(), Rotation2::ZERO);
        rotation_map.insert(NotNan::new(10.0).unwrap(), Rotation2::from_degrees(90.0));

        Path::new(
            vec![
                PathSegment::Line(LineSegment::new(Vector2::ZERO, Vector2::new(5.0, 0.0))),
                PathSegment::Line(LineSegment::new(
                    Vector2::new(5.0, 0.0),
                    Vector2::new(5.0, 5.0),
                )),
            ],
            rotation_map,
        )
    }

    #[test]
    fn test_length_is_cumulative() {
        assert_abs_diff_eq!(two_line_path().length(), 10.0);
    }

    #[test]
    fn test_calculate_selects_owning_segment() {
        let path = two_line_path();

        let state = path.calculate(2.5);
        assert_eq!(state.position, Vector2::new(2.5, 0.0));
        assert!(state.heading.equals_eps(&Rotation2::ZERO, 1e-9));

        let state = path.calculate(7.5);
        assert_eq!(state.position, Vector2::new(5.0, 2.5));
        assert!(state
            .heading
            .equals_eps(&Rotation2::from_degrees(90.0), 1e-9));
    }

    #[test]
    fn test_calculate_clamps_distance() {
        let path = two_line_path();

        assert_eq!(path.calculate(-1.0).position, Vector2::ZERO);
        assert_eq!(path.calculate(100.0).position, Vector2::new(5.0, 5.0));
    }

    #[test]
    fn test_rotation_schedule_is_global() {
        let path = two_line_path();

        // Halfway along the whole path the rotation is halfway through the
        // schedule, regardless of which segment owns the point
        assert_abs_diff_eq!(path.rotation_at(5.0).to_degrees(), 45.0, epsilon = 1e-9);
        assert_abs_diff_eq!(path.rotation_at(0.0).to_degrees(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(path.rotation_at(10.0).to_degrees(), 90.0, epsilon = 1e-9);
    }
}
