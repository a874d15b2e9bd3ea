//! Utility functions.
//!
//! Numerical helpers shared by the simplex engine and the integer layer.

pub mod numerics;
