//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Default tolerance used when comparing floating point values.
pub const EPSILON: f64 = 1e-9;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Check if two numbers are equal to each other using the default epsilon.
pub fn epsilon_equals(a: f64, b: f64) -> bool {
    epsilon_equals_eps(a, b, EPSILON)
}

/// Check if two numbers are equal to within the given epsilon.
pub fn epsilon_equals_eps(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

/// Clamp a value between a minimum and a maximum value.
pub fn clamp<T>(value: &T, min: &T, max: &T) -> T
where
    T: Float,
{
    let mut ret = *value;

    if ret > *max {
        ret = *max
    }
    if ret < *min {
        ret = *min
    }

    ret
}

/// Map a value from one range into another.
pub fn lin_map<T>(source_range: (T, T), target_range: (T, T), value: T) -> T
where
    T: Float,
{
    target_range.0
        + ((value - source_range.0) * (target_range.1 - target_range.0)
            / (source_range.1 - source_range.0))
}

/// Bound an angle into the range [0, 2pi).
pub fn bound_radians<T>(angle: T) -> T
where
    T: Float,
{
    let tau_t: T = T::from(std::f64::consts::TAU).unwrap();

    rem_euclid(angle, tau_t)
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::from(0.0).unwrap() {
        r + rhs.abs()
    } else {
        r
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TAU: f64 = std::f64::consts::TAU;
    const PI: f64 = std::f64::consts::PI;

    #[test]
    fn test_epsilon_equals() {
        assert!(epsilon_equals(1.0, 1.0 + 1e-12));
        assert!(!epsilon_equals(1.0, 1.0 + 1e-6));
        assert!(epsilon_equals_eps(1.0, 1.5, 1.0));
    }

    #[test]
    fn test_bound_radians() {
        assert_eq!(bound_radians(0f64), 0f64);
        assert_eq!(bound_radians(-PI), PI);
        assert_eq!(bound_radians(TAU + 1f64), 1f64);
        assert_eq!(bound_radians(-1f64), TAU - 1f64);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(&2f64, &0f64, &1f64), 1f64);
        assert_eq!(clamp(&-2f64, &0f64, &1f64), 0f64);
        assert_eq!(clamp(&0.5f64, &0f64, &1f64), 0.5f64);
    }
}
