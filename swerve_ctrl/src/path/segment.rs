//! Path segment variants

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::maths::{spline::Spline, RigidTransform2, Rotation2, Vector2};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Parameter step used when estimating the arc length of a spline segment by
/// summing chord lengths.
const SPLINE_LENGTH_DT: f64 = 1.0e-4;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The state of a path at a point along a segment.
#[derive(Debug, Copy, Clone)]
pub struct SegmentState {
    /// Position of the point on the segment.
    pub position: Vector2,

    /// Direction of travel (tangent to the segment) at the point.
    pub heading: Rotation2,

    /// Curvature of the segment at the point (1/radius, 0 for lines).
    pub curvature: f64,
}

/// A straight line between two points.
#[derive(Debug, Clone, PartialEq)]
pub struct LineSegment {
    start: Vector2,
    end: Vector2,
}

/// A circular arc between two points about a centre.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcSegment {
    center: Vector2,
    delta_start: Vector2,
    delta_end: Vector2,
    clockwise: bool,
}

/// A smooth curve defined by a parametric spline.
///
/// The arc length is estimated once at construction by sampling the spline at
/// a fixed parameter step and summing chord lengths. The estimate is frozen
/// and used for all arc-length lookups afterwards.
#[derive(Debug, Clone)]
pub struct SplineSegment {
    spline: Spline,
    derivative: Spline,
    second_derivative: Spline,
    length: f64,
}

/// A segment of a path.
///
/// `calculate` is defined over distances in `[0, length()]` only.
#[derive(Debug, Clone)]
pub enum PathSegment {
    Line(LineSegment),
    Arc(ArcSegment),
    Spline(SplineSegment),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl LineSegment {
    pub fn new(start: Vector2, end: Vector2) -> Self {
        Self { start, end }
    }

    pub fn start(&self) -> Vector2 {
        self.start
    }

    pub fn end(&self) -> Vector2 {
        self.end
    }

    fn delta(&self) -> Vector2 {
        self.end - self.start
    }

    pub fn length(&self) -> f64 {
        self.delta().length()
    }

    pub fn position_at_percentage(&self, percentage: f64) -> Vector2 {
        self.start + self.delta().scale(percentage)
    }

    pub fn heading(&self) -> Rotation2 {
        self.delta().angle()
    }

    /// Split the line at its midpoint.
    pub fn subdivide(&self) -> (LineSegment, LineSegment) {
        let mid = self.position_at_percentage(0.5);
        (Self::new(self.start, mid), Self::new(mid, self.end))
    }

    /// Reflect the line across the x axis.
    pub fn mirror(&self) -> LineSegment {
        Self::new(
            self.start.multiply(&Vector2::new(1.0, -1.0)),
            self.end.multiply(&Vector2::new(1.0, -1.0)),
        )
    }
}

impl ArcSegment {
    pub fn new(start: Vector2, end: Vector2, center: Vector2) -> Self {
        let delta_start = start - center;
        let delta_end = end - center;

        Self {
            center,
            delta_start,
            delta_end,
            clockwise: delta_start.cross(&delta_end) <= 0.0,
        }
    }

    /// Construct an arc passing through three points.
    ///
    /// The centre is found by intersecting the perpendicular bisectors of the
    /// chords a->b and b->c. Collinear points have no finite centre and yield
    /// `None`.
    pub fn from_points(a: Vector2, b: Vector2, c: Vector2) -> Option<Self> {
        let chord_ab = LineSegment::new(a, b);
        let chord_bc = LineSegment::new(b, c);

        let perp_ab = RigidTransform2::new(
            chord_ab.position_at_percentage(0.5),
            chord_ab.heading().normal(),
        );
        let perp_bc = RigidTransform2::new(
            chord_bc.position_at_percentage(0.5),
            chord_bc.heading().normal(),
        );

        let center = perp_ab.intersection(&perp_bc);

        if !center.x.is_finite() || !center.y.is_finite() {
            return None;
        }

        Some(Self::new(a, c, center))
    }

    pub fn start(&self) -> Vector2 {
        self.center + self.delta_start
    }

    pub fn end(&self) -> Vector2 {
        self.center + self.delta_end
    }

    pub fn center(&self) -> Vector2 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.delta_start.length()
    }

    pub fn curvature(&self) -> f64 {
        1.0 / self.delta_start.length()
    }

    fn arc_angle(&self) -> f64 {
        Vector2::angle_between(&self.delta_start, &self.delta_end).to_radians()
    }

    pub fn length(&self) -> f64 {
        self.delta_start.length() * self.arc_angle()
    }

    pub fn position_at_percentage(&self, percentage: f64) -> Vector2 {
        let delta_angle =
            self.arc_angle() * (if self.clockwise { -1.0 } else { 1.0 }) * percentage;
        self.center + self.delta_start.rotate_by(Rotation2::from_radians(delta_angle))
    }

    pub fn heading_at_percentage(&self, percentage: f64) -> Rotation2 {
        // The tangent is the radius vector rotated a quarter turn in the
        // direction of travel
        let angle = self.arc_angle() * (if self.clockwise { -1.0 } else { 1.0 }) * percentage
            + (if self.clockwise {
                -0.5 * std::f64::consts::PI
            } else {
                0.5 * std::f64::consts::PI
            });
        self.delta_start
            .rotate_by(Rotation2::from_radians(angle))
            .angle()
    }

    /// Split the arc at its angular midpoint.
    pub fn subdivide(&self) -> (ArcSegment, ArcSegment) {
        let mid = self.position_at_percentage(0.5);
        (
            Self::new(self.start(), mid, self.center),
            Self::new(mid, self.end(), self.center),
        )
    }

    /// Reflect the arc across the x axis.
    pub fn mirror(&self) -> ArcSegment {
        let flip = Vector2::new(1.0, -1.0);
        Self::new(
            self.start().multiply(&flip),
            self.end().multiply(&flip),
            self.center.multiply(&flip),
        )
    }
}

impl SplineSegment {
    pub fn new(spline: Spline) -> Self {
        // Estimate the arc length by summing chords at a fixed parameter step
        let mut length = 0.0;
        let mut p0 = spline.point(0.0);
        let steps = (1.0 / SPLINE_LENGTH_DT) as usize;
        for i in 1..=steps {
            let p1 = spline.point(i as f64 * SPLINE_LENGTH_DT);
            length += (p1 - p0).length();
            p0 = p1;
        }

        let derivative = spline.derivative();
        let second_derivative = derivative.derivative();

        Self {
            spline,
            derivative,
            second_derivative,
            length,
        }
    }

    pub fn spline(&self) -> &Spline {
        &self.spline
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn calculate(&self, distance: f64) -> SegmentState {
        let t = distance / self.length;

        let d = self.derivative.point(t);
        let dd = self.second_derivative.point(t);

        SegmentState {
            position: self.spline.point(t),
            heading: Rotation2::from_direction(d.x, d.y),
            curvature: d.cross(&dd) / (d.dot(&d) * d.length()),
        }
    }
}

impl PathSegment {
    /// The arc length of the segment.
    pub fn length(&self) -> f64 {
        match self {
            PathSegment::Line(line) => line.length(),
            PathSegment::Arc(arc) => arc.length(),
            PathSegment::Spline(spline) => spline.length(),
        }
    }

    /// Evaluate the segment at a distance along it.
    pub fn calculate(&self, distance: f64) -> SegmentState {
        match self {
            PathSegment::Line(line) => SegmentState {
                position: line.position_at_percentage(distance / line.length()),
                heading: line.heading(),
                curvature: 0.0,
            },
            PathSegment::Arc(arc) => {
                let percentage = distance / arc.length();
                SegmentState {
                    position: arc.position_at_percentage(percentage),
                    heading: arc.heading_at_percentage(percentage),
                    curvature: arc.curvature(),
                }
            }
            PathSegment::Spline(spline) => spline.calculate(distance),
        }
    }

    /// The state at the start of the segment.
    pub fn start(&self) -> SegmentState {
        self.calculate(0.0)
    }

    /// The state at the end of the segment.
    pub fn end(&self) -> SegmentState {
        self.calculate(self.length())
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
