//! Relative-frequency partitioning of a sample size
//!
//! A weight list partitions a requested size into per-bin counts whose sum
//! is exactly the requested size. Weights are unnormalized and need not sum
//! to one.

use std::cmp::Ordering;

use crate::error::{invalid, Result};

/// Split `size` into one count per weight, proportionally.
///
/// Integer rounding is reconciled against the heaviest bin; when that bin
/// cannot absorb a deficit the remainder cascades down the next-heaviest
/// bins. The invariant `sum(counts) == size` holds for every non-negative
/// weight list with a positive sum.
pub fn partition(size: usize, weights: &[f64]) -> Result<Vec<usize>> {
    if weights.is_empty() {
        return Err(invalid("relative_freq must contain at least one weight"));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(invalid("relative_freq weights must be finite and non-negative"));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(invalid("relative_freq weights must not all be zero"));
    }

    let mut counts: Vec<usize> = weights
        .iter()
        .map(|w| ((w / total) * size as f64).round() as usize)
        .collect();

    let assigned: usize = counts.iter().sum();
    if assigned != size {
        let mut order: Vec<usize> = (0..weights.len()).collect();
        order.sort_by(|&a, &b| {
            weights[b]
                .partial_cmp(&weights[a])
                .unwrap_or(Ordering::Equal)
        });

        if assigned < size {
            counts[order[0]] += size - assigned;
        } else {
            let mut excess = assigned - size;
            for &bin in &order {
                let take = excess.min(counts[bin]);
                counts[bin] -= take;
                excess -= take;
                if excess == 0 {
                    break;
                }
            }
        }
    }

    Ok(counts)
}

/// Slice `[start, stop)` into contiguous sub-intervals proportional to the
/// weights, in weight order.
pub fn slice_range(start: f64, stop: f64, weights: &[f64]) -> Vec<(f64, f64)> {
    let total: f64 = weights.iter().sum();
    let span = stop - start;
    let mut slices = Vec::with_capacity(weights.len());
    let mut edge = start;
    for (i, w) in weights.iter().enumerate() {
        let next = if i == weights.len() - 1 {
            // Last edge is exact regardless of accumulated float error
            stop
        } else {
            edge + span * (w / total)
        };
        slices.push((edge, next));
        edge = next;
    }
    slices
}
