//! # Maths module
//!
//! This module defines the 2D algebra primitives used throughout the library:
//! vectors, rotations, rigid transforms and parametric splines. All of the
//! primitive types are immutable value types, equality between them is
//! epsilon based.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod rigid_transform;
mod rotation2;
pub mod spline;
mod vector2;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use rigid_transform::*;
pub use rotation2::*;
pub use vector2::*;
