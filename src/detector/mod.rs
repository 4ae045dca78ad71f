//! Edge drawing stages
//!
//! This module contains every stage between the gradient field and the
//! reported primitives:
//! - Anchor extraction and edge linking (chain construction)
//! - Helmholtz validation of chains
//! - Line fitting and arc grouping
//! - Circle/ellipse fitting, merging and final validation

/// Seed pixel selection
pub mod anchors;
/// Grouping of consecutive lines into arc candidates
pub mod arcs;
/// Algebraic circle and ellipse fits
pub mod conic;
/// Chain construction along gradient ridges
pub mod linking;
/// Sliding-window line extraction
pub mod lines;
/// Greedy arc merging and promotion
pub mod merge;
/// NFA test of edge segments
pub mod validation;
/// Gradient alignment test of circles and ellipses
pub mod verify;
