//! Helmholtz validation of edge segments
//!
//! A chain of length `L` whose weakest pixel has magnitude `m` is meaningful
//! when `N_p · H(m)^L < 1`. `H` is the empirical tail of the magnitude
//! distribution and `N_p` counts the pixel pairs over all chains. Chains that
//! fail are cut at their weakest pixel and the pieces are tested again.

use log::debug;

use crate::models::EdgeSegment;
use crate::utils::gradient::GradientField;
use crate::utils::nfa::MagnitudeDistribution;

/// Per-image NFA test for edge segments
#[derive(Debug, Clone)]
pub struct SegmentValidator {
    distribution: MagnitudeDistribution,
    ln_tests: f64,
}

impl SegmentValidator {
    /// Prepare the test from the gradient field and the raw segments
    pub fn new(field: &GradientField, segments: &[EdgeSegment]) -> Self {
        let pairs: f64 = segments
            .iter()
            .map(|s| {
                let n = s.len() as f64;
                n * (n - 1.0) / 2.0
            })
            .sum();
        Self {
            distribution: MagnitudeDistribution::from_magnitudes(field.magnitudes()),
            ln_tests: pairs.ln(),
        }
    }

    /// `ln NFA` of a chain of `length` pixels with weakest magnitude `min_magnitude`
    pub fn ln_nfa(&self, min_magnitude: f32, length: usize) -> f64 {
        let tail = self.distribution.tail(min_magnitude);
        self.ln_tests + length as f64 * tail.ln()
    }

    /// `N_p · H(m)^L`
    pub fn nfa(&self, min_magnitude: f32, length: usize) -> f64 {
        self.ln_nfa(min_magnitude, length).exp()
    }

    /// Whether such a chain is meaningful (`NFA < 1`)
    pub fn is_meaningful(&self, min_magnitude: f32, length: usize) -> bool {
        self.ln_nfa(min_magnitude, length) < 0.0
    }

    /// Meaningful sub-chains of `segment`, in chain order
    pub fn validate(&self, segment: &EdgeSegment) -> Vec<EdgeSegment> {
        let mut pending = vec![(0, segment.len())];
        let mut kept = Vec::new();

        while let Some((start, end)) = pending.pop() {
            if end - start <= 1 {
                continue;
            }
            let Some(weakest) = segment.weakest_in(start..end) else {
                continue;
            };
            let min_magnitude = segment.get(weakest).map(|e| e.magnitude).unwrap_or(0.0);
            if self.is_meaningful(min_magnitude, end - start) {
                kept.push((start, end));
            } else {
                pending.push((weakest + 1, end));
                pending.push((start, weakest));
            }
        }

        kept.sort_unstable_by_key(|&(start, _)| start);
        kept.into_iter()
            .map(|(start, end)| segment.slice(start..end))
            .collect()
    }

    /// Validate every segment, flattening the results
    pub fn validate_all(&self, segments: &[EdgeSegment]) -> Vec<EdgeSegment> {
        let valid: Vec<EdgeSegment> = segments.iter().flat_map(|s| self.validate(s)).collect();
        debug!(
            "validation: {} raw segments -> {} meaningful, ln N_p = {:.2}",
            segments.len(),
            valid.len(),
            self.ln_tests
        );
        valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Edgel, Position};

    /// Field whose magnitudes take values 1..=100 spread over the interior
    fn ramp_field() -> GradientField {
        let (w, h) = (22, 12);
        let mut gx = vec![0f32; w * h];
        let mut k = 0;
        for y in 1..h - 1 {
            for x in 1..w - 1 {
                gx[y * w + x] = (k % 100 + 1) as f32;
                k += 1;
            }
        }
        GradientField::from_gradients(w, h, gx, vec![0.0; w * h], 0.5).unwrap()
    }

    fn chain(magnitudes: &[f32]) -> EdgeSegment {
        magnitudes
            .iter()
            .enumerate()
            .map(|(i, &m)| Edgel::new(Position::new(i as i32, 0), m))
            .collect()
    }

    #[test]
    fn test_nfa_monotone_in_magnitude() {
        let field = ramp_field();
        let validator = SegmentValidator::new(&field, &[chain(&[1.0; 40])]);
        let mut last = f64::INFINITY;
        for m in [1.0, 10.0, 30.0, 60.0, 90.0, 100.0] {
            let nfa = validator.nfa(m, 20);
            assert!(nfa <= last, "NFA increased at m = {m}");
            last = nfa;
        }
    }

    #[test]
    fn test_nfa_decreases_with_length() {
        let field = ramp_field();
        let validator = SegmentValidator::new(&field, &[chain(&[1.0; 40])]);
        assert!(validator.nfa(50.0, 30) < validator.nfa(50.0, 10));
    }

    #[test]
    fn test_strong_chain_is_kept_whole() {
        let field = ramp_field();
        let strong = chain(&[100.0; 12]);
        let validator = SegmentValidator::new(&field, std::slice::from_ref(&strong));
        let out = validator.validate(&strong);
        assert_eq!(out, vec![strong.clone()]);

        // Validating the survivor again changes nothing
        let again = validator.validate(&out[0]);
        assert_eq!(again, out);
    }

    #[test]
    fn test_weak_link_splits_chain() {
        let field = ramp_field();
        let mut mags = vec![100.0; 12];
        mags.push(1.0);
        mags.extend(vec![100.0; 12]);
        let seg = chain(&mags);
        let validator = SegmentValidator::new(&field, std::slice::from_ref(&seg));
        let out = validator.validate(&seg);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 12);
        assert_eq!(out[1].len(), 12);
        assert_eq!(out[1].front().map(|e| e.position.x), Some(13));
    }

    #[test]
    fn test_weak_chain_is_dropped() {
        let field = ramp_field();
        let seg = chain(&[1.0; 10]);
        let validator = SegmentValidator::new(&field, std::slice::from_ref(&seg));
        assert!(validator.validate(&seg).is_empty());
    }
}
