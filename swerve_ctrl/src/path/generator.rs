//! Adaptive spline-to-arc path generation
//!
//! The generator respects the position, heading and rotation of each
//! waypoint. A Hermite spline is constructed per waypoint pair, then
//! approximated by a minimal sequence of line and arc segments within an
//! error tolerance using binary subdivision: the candidate span starts as the
//! whole spline, the fit is checked at the 25% and 75% points, good spans are
//! greedily extended and bad spans halved until the try budget runs out.
//!
//! All downstream trajectory and following logic operates on the fitted
//! line/arc representation rather than the raw spline, so the fit tolerance
//! bounds the approximation error of everything built on top of the path.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use ordered_float::NotNan;
use std::collections::BTreeMap;

// Internal
use super::{ArcSegment, LineSegment, Path, PathError, PathSegment, Waypoint};
use crate::maths::{spline::hermite, spline::Spline, RigidTransform2, Rotation2, Vector2};
use util::maths::{clamp, epsilon_equals};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// The default maximum allowable positional error for a fitted segment to be
/// deemed good.
pub const DEFAULT_FIT_CHECK_EPSILON: f64 = 1e-3;

/// The default number of times the generator tries to fit a segment to a
/// span of a spline before accepting the best fit found.
pub const DEFAULT_FIT_TRIES: usize = 25;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Generates line/arc paths from waypoints by fitting segments to splines.
pub struct SplinePathGenerator {
    /// The allowable positional error for a fitted segment to be considered
    /// good.
    fit_check_epsilon: f64,

    /// The maximum number of fit attempts per segment before the best fit so
    /// far is accepted.
    fit_tries: usize,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for SplinePathGenerator {
    fn default() -> Self {
        Self {
            fit_check_epsilon: DEFAULT_FIT_CHECK_EPSILON,
            fit_tries: DEFAULT_FIT_TRIES,
        }
    }
}

impl SplinePathGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the allowable positional error when checking if a segment fits the
    /// spline.
    ///
    /// Increasing this value speeds up generation at the cost of path
    /// accuracy relative to the underlying spline. The end position of the
    /// path is unaffected.
    pub fn set_fit_check_epsilon(&mut self, fit_check_epsilon: f64) {
        self.fit_check_epsilon = fit_check_epsilon;
    }

    /// Set the maximum number of fit attempts per segment.
    ///
    /// When the budget is exhausted the best fit found so far is accepted
    /// even if it is outside the tolerance.
    pub fn set_fit_tries(&mut self, fit_tries: usize) {
        self.fit_tries = fit_tries;
    }

    /// Generate a path using cubic Hermite splines between the waypoints.
    pub fn generate(&self, waypoints: &[Waypoint]) -> Result<Path, PathError> {
        self.generate_with(hermite::cubic, waypoints)
    }

    /// Generate a path using the given spline constructor between the
    /// waypoints.
    pub fn generate_with<F>(&self, spline_fn: F, waypoints: &[Waypoint]) -> Result<Path, PathError>
    where
        F: Fn(RigidTransform2, RigidTransform2) -> Spline,
    {
        if waypoints.len() < 2 {
            return Err(PathError::TooFewWaypoints(waypoints.len()));
        }

        let mut segments: Vec<PathSegment> = Vec::new();
        let mut rotation_map = BTreeMap::new();
        let mut length = 0.0;

        rotation_map.insert(NotNan::new(0.0).unwrap(), waypoints[0].rotation);

        for pair in waypoints.windows(2) {
            let (start, end) = (&pair[0], &pair[1]);

            let spline = spline_fn(
                RigidTransform2::new(start.position, start.heading),
                RigidTransform2::new(end.position, end.heading),
            );

            let mut seg_start = 0.0;
            while !epsilon_equals(seg_start, 1.0) {
                let (seg, seg_end) = self.fit_segment(&spline, seg_start);

                // Keys are finite since segment lengths are sums of norms
                length += seg.length();
                segments.push(seg);

                if epsilon_equals(seg_end, 1.0) {
                    rotation_map.insert(NotNan::new(length).unwrap(), end.rotation);
                }

                seg_start = seg_end;
            }
        }

        Ok(Path::new(segments, rotation_map))
    }

    /// Fit a single line or arc segment to the spline starting at the given
    /// parameter, returning the segment and the parameter it reaches.
    fn fit_segment(&self, spline: &Spline, seg_start: f64) -> (PathSegment, f64) {
        let mut seg_end = 1.0;

        let mut last_good: Option<(PathSegment, f64)> = None;
        let mut seg: Option<PathSegment>;

        let mut fit_try = 0;
        loop {
            fit_try += 1;

            let seg_delta = seg_end - seg_start;
            let seg_mid = seg_start + seg_delta / 2.0;

            let start_pos = spline.point(seg_start);
            let end_pos = spline.point(seg_end);
            let mid_pos = spline.point(seg_mid);

            let delta_end = end_pos - start_pos;
            let delta_mid = mid_pos - start_pos;

            // Three colinear sample points mean the span is a line, otherwise
            // fit a circular arc through them
            seg = if Vector2::angle_between(&delta_mid, &delta_end) == Rotation2::ZERO {
                Some(PathSegment::Line(LineSegment::new(start_pos, end_pos)))
            } else {
                ArcSegment::from_points(start_pos, mid_pos, end_pos).map(PathSegment::Arc)
            };

            // Out of tries, accept whatever we have
            if fit_try >= self.fit_tries {
                break;
            }

            let candidate = match seg {
                Some(ref s) => s,
                None => {
                    // Degenerate arc, shrink the span and retry
                    seg_end -= seg_delta / 2.0;
                    continue;
                }
            };

            // Check the fit at the quarter points of the span
            let (first_qtr_error, last_qtr_error) =
                quarter_point_errors(candidate, spline, seg_start, seg_end);

            if first_qtr_error > self.fit_check_epsilon || last_qtr_error > self.fit_check_epsilon {
                // Halve the span and try again
                seg_end -= seg_delta / 2.0;

                if let Some((good_seg, good_end)) = last_good.take() {
                    // Boundary found, use the last good segment
                    seg = Some(good_seg);
                    seg_end = good_end;
                    break;
                }
            } else {
                // The segment is good, greedily try to extend it. The end of
                // the span must not pass 1, the spline is undefined beyond it.
                last_good = Some((candidate.clone(), seg_end));
                seg_end = clamp(&(seg_end + seg_delta / 2.0), &0.0, &1.0);
            }
        }

        let seg = match seg {
            Some(s) => s,
            // No arc could be fitted at all, connect the span directly
            None => PathSegment::Line(LineSegment::new(
                spline.point(seg_start),
                spline.point(seg_end),
            )),
        };

        // The try budget can run out before the tolerance is met. The best
        // fit is still accepted, but the residual is worth a warning.
        let (first_qtr_error, last_qtr_error) =
            quarter_point_errors(&seg, spline, seg_start, seg_end);
        let residual = first_qtr_error.max(last_qtr_error);
        if residual > self.fit_check_epsilon {
            warn!(
                "Segment fit tolerance not met after {} tries, accepting residual error {:.2e} (tolerance {:.2e})",
                self.fit_tries, residual, self.fit_check_epsilon
            );
        }

        (seg, seg_end)
    }
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Positional error between a candidate segment and the spline span it
/// approximates, sampled at the 25% and 75% points of the span.
fn quarter_point_errors(
    candidate: &PathSegment,
    spline: &Spline,
    seg_start: f64,
    seg_end: f64,
) -> (f64, f64) {
    let seg_delta = seg_end - seg_start;

    let first_qtr = seg_start + seg_delta / 4.0;
    let last_qtr = seg_start + 3.0 * seg_delta / 4.0;

    let approx_first = candidate.calculate(0.25 * candidate.length()).position;
    let approx_last = candidate.calculate(0.75 * candidate.length()).position;

    (
        (approx_first - spline.point(first_qtr)).length(),
        (approx_last - spline.point(last_qtr)).length(),
    )
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
