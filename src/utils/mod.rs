//! Utility functions for image processing
//!
//! This module provides the numeric building blocks of the detector:
//! - Gaussian smoothing
//! - Gradient field (Sobel/Prewitt, magnitude, orientation class)
//! - Angle helpers for alignment tests
//! - NFA arithmetic (log-gamma, binomial tails, magnitude distribution)

pub mod filters;
pub mod geometry;
pub mod gradient;
pub mod nfa;
