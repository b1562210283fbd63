//! Path builders
//!
//! Builders accumulate segments between successive positions and record the
//! rotation schedule as entries are appended. `SimplePathBuilder` appends
//! explicit line and arc segments; `SplinePathBuilder` appends Hermite and
//! Bezier splines, starting each new spline from the end state of the last.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use ordered_float::NotNan;
use std::collections::BTreeMap;

// Internal
use super::{ArcSegment, LineSegment, Path, PathError, PathSegment, SplineSegment};
use crate::maths::{
    spline::{bezier, hermite},
    RigidTransform2, Rotation2, Vector2,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Builds a path from explicit line and arc segments.
pub struct SimplePathBuilder {
    segments: Vec<PathSegment>,
    rotation_map: BTreeMap<NotNan<f64>, Rotation2>,

    last_position: Vector2,
    length: f64,
}

/// Builds a path from Hermite and Bezier spline segments.
pub struct SplinePathBuilder {
    segments: Vec<PathSegment>,
    rotation_map: BTreeMap<NotNan<f64>, Rotation2>,

    last_position: Vector2,
    last_heading: Rotation2,
    length: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SimplePathBuilder {
    /// Start a path at the given position with the given initial robot
    /// facing.
    pub fn new(initial_position: Vector2, initial_rotation: Rotation2) -> Self {
        let mut rotation_map = BTreeMap::new();
        // Zero is always finite
        rotation_map.insert(NotNan::new(0.0).unwrap(), initial_rotation);

        Self {
            segments: Vec::new(),
            rotation_map,
            last_position: initial_position,
            length: 0.0,
        }
    }

    fn add_segment(&mut self, segment: PathSegment) {
        self.length += segment.length();
        self.last_position = segment.end().position;
        self.segments.push(segment);
    }

    fn record_rotation(&mut self, rotation: Rotation2) {
        // Segment lengths are finite sums of norms so the key cannot be NaN
        self.rotation_map
            .insert(NotNan::new(self.length).unwrap(), rotation);
    }

    /// Append a straight line from the last position to `position`.
    pub fn line_to(mut self, position: Vector2) -> Self {
        let segment = LineSegment::new(self.last_position, position);
        self.add_segment(PathSegment::Line(segment));
        self
    }

    /// Append a straight line, scheduling the robot to face `rotation` by
    /// its end.
    pub fn line_to_facing(self, position: Vector2, rotation: Rotation2) -> Self {
        let mut builder = self.line_to(position);
        builder.record_rotation(rotation);
        builder
    }

    /// Append an arc from the last position to `position` about `center`.
    pub fn arc_to(mut self, position: Vector2, center: Vector2) -> Self {
        let segment = ArcSegment::new(self.last_position, position, center);
        self.add_segment(PathSegment::Arc(segment));
        self
    }

    /// Append an arc, scheduling the robot to face `rotation` by its end.
    pub fn arc_to_facing(self, position: Vector2, center: Vector2, rotation: Rotation2) -> Self {
        let mut builder = self.arc_to(position, center);
        builder.record_rotation(rotation);
        builder
    }

    /// Build the path.
    pub fn build(self) -> Result<Path, PathError> {
        if self.segments.is_empty() {
            return Err(PathError::EmptyPath);
        }

        Ok(Path::new(self.segments, self.rotation_map))
    }
}

impl SplinePathBuilder {
    /// Start a path at the given position, travelling in `initial_heading`,
    /// with the given initial robot facing.
    pub fn new(
        initial_position: Vector2,
        initial_heading: Rotation2,
        initial_rotation: Rotation2,
    ) -> Self {
        let mut rotation_map = BTreeMap::new();
        rotation_map.insert(NotNan::new(0.0).unwrap(), initial_rotation);

        Self {
            segments: Vec::new(),
            rotation_map,
            last_position: initial_position,
            last_heading: initial_heading,
            length: 0.0,
        }
    }

    fn add_spline(&mut self, segment: SplineSegment) {
        let end = segment.calculate(segment.length());
        self.length += segment.length();
        self.last_position = end.position;
        self.last_heading = end.heading;
        self.segments.push(PathSegment::Spline(segment));
    }

    fn record_rotation(&mut self, rotation: Rotation2) {
        self.rotation_map
            .insert(NotNan::new(self.length).unwrap(), rotation);
    }

    /// Append a cubic Hermite spline ending at `position` travelling in
    /// `heading`.
    pub fn hermite_to(mut self, position: Vector2, heading: Rotation2) -> Self {
        let spline = hermite::cubic(
            RigidTransform2::new(self.last_position, self.last_heading),
            RigidTransform2::new(position, heading),
        );
        self.add_spline(SplineSegment::new(spline));
        self
    }

    /// Append a cubic Hermite spline, scheduling the robot to face
    /// `rotation` by its end.
    pub fn hermite_to_facing(
        self,
        position: Vector2,
        heading: Rotation2,
        rotation: Rotation2,
    ) -> Self {
        let mut builder = self.hermite_to(position, heading);
        builder.record_rotation(rotation);
        builder
    }

    /// Append a cubic Bezier spline through the two control points to `end`.
    pub fn bezier_to(mut self, control1: Vector2, control2: Vector2, end: Vector2) -> Self {
        let spline = bezier::cubic(self.last_position, control1, control2, end);
        self.add_spline(SplineSegment::new(spline));
        self
    }

    /// Append a cubic Bezier spline, scheduling the robot to face `rotation`
    /// by its end.
    pub fn bezier_to_facing(
        self,
        control1: Vector2,
        control2: Vector2,
        end: Vector2,
        rotation: Rotation2,
    ) -> Self {
        let mut builder = self.bezier_to(control1, control2, end);
        builder.record_rotation(rotation);
        builder
    }

    /// Build the path.
    pub fn build(self) -> Result<Path, PathError> {
        if self.segments.is_empty() {
            return Err(PathError::EmptyPath);
        }

        Ok(Path::new(self.segments, self.rotation_map))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_simple_builder_lines_and_arcs() {
        let path = SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO)
            .line_to(Vector2::new(5.0, 0.0))
            .arc_to(Vector2::new(10.0, 5.0), Vector2::new(5.0, 5.0))
            .line_to_facing(Vector2::new(10.0, 10.0), Rotation2::from_degrees(90.0))
            .build()
            .unwrap();

        assert_eq!(path.segments().len(), 3);

        // Ends of consecutive segments are contiguous
        assert_eq!(path.calculate(0.0).position, Vector2::ZERO);
        assert_eq!(path.calculate(path.length()).position, Vector2::new(10.0, 10.0));

        // The scheduled rotation is reached at the end of the path
        assert_abs_diff_eq!(
            path.calculate(path.length()).rotation.to_degrees(),
            90.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_empty_build_is_rejected() {
        assert!(matches!(
            SimplePathBuilder::new(Vector2::ZERO, Rotation2::ZERO).build(),
            Err(PathError::EmptyPath)
        ));
        assert!(matches!(
            SplinePathBuilder::new(Vector2::ZERO, Rotation2::ZERO, Rotation2::ZERO).build(),
            Err(PathError::EmptyPath)
        ));
    }

    #[test]
    fn test_spline_builder_endpoints() {
        let path = SplinePathBuilder::new(Vector2::ZERO, Rotation2::ZERO, Rotation2::ZERO)
            .bezier_to_facing(
                Vector2::new(5.0, 0.0),
                Vector2::new(45.0, 50.0),
                Vector2::new(50.0, 50.0),
                Rotation2::from_degrees(90.0),
            )
            .hermite_to(Vector2::new(0.0, 0.0), Rotation2::from_degrees(180.0))
            .build()
            .unwrap();

        assert_eq!(path.segments().len(), 2);

        let start = path.calculate(0.0);
        assert!(start.position.equals_eps(&Vector2::ZERO, 1e-6));

        let end = path.calculate(path.length());
        assert!(end.position.equals_eps(&Vector2::ZERO, 1e-3));
        assert!(end
            .heading
            .equals_eps(&Rotation2::from_degrees(180.0), 1e-3));
    }
}
