//! The (ρ, θ) vote accumulator (spec.md §3, §4.2).
//!
//! A dense grid, one [`Candidate`] cell per quantized `(ρ, θ)` pair. The
//! grid is allocated once up front — spec.md calls out that `cell_at`
//! must never panic, so all indexing here clamps rather than bounds-checks.

use crate::types::{DetectorError, Dimensions, Point};

/// One accumulator cell: the votes cast for a given `(ρ, θ)` and the
/// running bounding endpoints of the pixels that cast them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Candidate {
    /// Number of pixels that voted for this cell.
    pub votes: u32,
    /// Lexicographically smallest voting pixel seen so far.
    pub endpoint_a: Option<Point>,
    /// Lexicographically largest voting pixel seen so far.
    pub endpoint_b: Option<Point>,
    /// Set by the [`crate::harvester::Harvester`] once this cell has been
    /// turned into a segment, so a cell is never emitted twice (spec.md
    /// §4.4's "cell aliasing" guard).
    pub recorded: bool,
}

impl Candidate {
    /// Record a vote from `point`, widening the endpoint span if needed.
    fn vote(&mut self, point: Point) {
        self.votes += 1;
        self.endpoint_a = Some(match self.endpoint_a {
            Some(existing) => existing.lex_min(point),
            None => point,
        });
        self.endpoint_b = Some(match self.endpoint_b {
            Some(existing) => existing.lex_max(point),
            None => point,
        });
    }
}

/// Dense `(ρ, θ)` grid.
///
/// `θ` ranges over `[-π/2, π/2)` in steps of `delta_theta`; `ρ` ranges
/// over `[-ρ_max, ρ_max]` in steps of 1.0 pixel, where `ρ_max` is the
/// image diagonal (spec.md §3).
#[derive(Debug, Clone)]
pub struct Accumulator {
    delta_theta: f64,
    rho_max: f64,
    num_theta: usize,
    num_rho: usize,
    cells: Vec<Candidate>,
}

impl Accumulator {
    /// Allocate a fresh accumulator sized for `dims` at angular
    /// resolution `delta_theta`.
    ///
    /// # Errors
    ///
    /// Returns [`DetectorError::OutOfMemory`] if the grid's cell count
    /// would overflow `usize` or is implausibly large (guards against a
    /// pathological `delta_theta` close to zero).
    pub fn new(dims: Dimensions, delta_theta: f64) -> Result<Self, DetectorError> {
        let rho_max = dims.rho_max();
        let num_theta = (std::f64::consts::PI / delta_theta).ceil().max(1.0);
        let num_rho = (2.0 * rho_max).ceil().max(1.0) + 1.0;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let num_theta = num_theta as usize;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let num_rho = num_rho as usize;

        let cell_count = num_theta
            .checked_mul(num_rho)
            .ok_or(DetectorError::OutOfMemory)?;
        // Guard rail: an accumulator bigger than 256M cells (~a few GiB of
        // `Candidate`s) signals a misconfigured delta_theta rather than a
        // legitimate image size.
        if cell_count > 256 * 1024 * 1024 {
            return Err(DetectorError::OutOfMemory);
        }

        Ok(Self {
            delta_theta,
            rho_max,
            num_theta,
            num_rho,
            cells: vec![Candidate::default(); cell_count],
        })
    }

    /// Number of distinct `θ` buckets.
    #[must_use]
    pub const fn num_theta(&self) -> usize {
        self.num_theta
    }

    /// Number of distinct `ρ` buckets.
    #[must_use]
    pub const fn num_rho(&self) -> usize {
        self.num_rho
    }

    /// The angular resolution this accumulator was built with.
    #[must_use]
    pub const fn delta_theta(&self) -> f64 {
        self.delta_theta
    }

    /// Quantize a continuous `θ` (already normalized to `[-π/2, π/2)`)
    /// into a bucket index, clamped to the valid range.
    #[must_use]
    pub fn theta_index(&self, theta: f64) -> usize {
        let shifted = (theta + std::f64::consts::FRAC_PI_2) / self.delta_theta;
        clamp_index(shifted, self.num_theta)
    }

    /// The `θ` value a bucket index represents (bucket center).
    #[must_use]
    pub fn theta_value(&self, theta_idx: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let idx = theta_idx as f64;
        -std::f64::consts::FRAC_PI_2 + (idx + 0.5) * self.delta_theta
    }

    /// Quantize a continuous `ρ` into a bucket index, clamped to the
    /// valid range.
    #[must_use]
    pub fn rho_index(&self, rho: f64) -> usize {
        clamp_index(rho + self.rho_max, self.num_rho)
    }

    /// The `ρ` value a bucket index represents.
    #[must_use]
    pub fn rho_value(&self, rho_idx: usize) -> f64 {
        #[allow(clippy::cast_precision_loss)]
        let idx = rho_idx as f64;
        idx - self.rho_max
    }

    /// Cast a vote at the cell nearest to continuous `(rho, theta)`.
    pub fn vote(&mut self, theta: f64, rho: f64, point: Point) {
        let theta_idx = self.theta_index(theta);
        let rho_idx = self.rho_index(rho);
        self.cell_at_mut(theta_idx, rho_idx).vote(point);
    }

    /// Read the cell at `(theta_idx, rho_idx)`, clamping both indices
    /// into range. Never panics (spec.md §4.2).
    #[must_use]
    pub fn cell_at(&self, theta_idx: usize, rho_idx: usize) -> &Candidate {
        let theta_idx = theta_idx.min(self.num_theta - 1);
        let rho_idx = rho_idx.min(self.num_rho - 1);
        &self.cells[theta_idx * self.num_rho + rho_idx]
    }

    /// Mutable variant of [`Accumulator::cell_at`].
    pub fn cell_at_mut(&mut self, theta_idx: usize, rho_idx: usize) -> &mut Candidate {
        let theta_idx = theta_idx.min(self.num_theta - 1);
        let rho_idx = rho_idx.min(self.num_rho - 1);
        &mut self.cells[theta_idx * self.num_rho + rho_idx]
    }

    /// Number of cells that received at least one vote.
    #[must_use]
    pub fn cells_with_votes(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation)]
        let count = self.cells.iter().filter(|c| c.votes > 0).count() as u32;
        count
    }

    /// Sum of every cell's vote count, including repeats from the
    /// angular sweep (i.e. not deduplicated by pixel).
    #[must_use]
    pub fn total_votes(&self) -> u64 {
        self.cells.iter().map(|c| u64::from(c.votes)).sum()
    }
}

/// Shared clamping logic for quantizing a continuous coordinate into a
/// bucket index that is guaranteed to land inside `0..len`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_index(value: f64, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    if value.is_nan() {
        return 0;
    }
    let floored = value.floor();
    if floored < 0.0 {
        0
    } else if floored >= len as f64 {
        len - 1
    } else {
        floored as usize
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn cell_at_never_panics_on_out_of_range_indices() {
        let acc = Accumulator::new(
            Dimensions {
                width: 20,
                height: 20,
            },
            0.1,
        )
        .unwrap();
        let _ = acc.cell_at(usize::MAX, usize::MAX);
        let _ = acc.cell_at(0, 0);
    }

    #[test]
    fn vote_accumulates_and_tracks_endpoint_span() {
        let mut acc = Accumulator::new(
            Dimensions {
                width: 50,
                height: 50,
            },
            0.1,
        )
        .unwrap();
        acc.vote(0.0, 10.0, Point::new(5, 5));
        acc.vote(0.0, 10.0, Point::new(1, 1));
        acc.vote(0.0, 10.0, Point::new(9, 9));

        let theta_idx = acc.theta_index(0.0);
        let rho_idx = acc.rho_index(10.0);
        let cell = acc.cell_at(theta_idx, rho_idx);
        assert_eq!(cell.votes, 3);
        assert_eq!(cell.endpoint_a, Some(Point::new(1, 1)));
        assert_eq!(cell.endpoint_b, Some(Point::new(9, 9)));
    }

    #[test]
    fn theta_index_clamps_out_of_range_values() {
        let acc = Accumulator::new(
            Dimensions {
                width: 10,
                height: 10,
            },
            0.1,
        )
        .unwrap();
        assert_eq!(acc.theta_index(-100.0), 0);
        assert_eq!(acc.theta_index(100.0), acc.num_theta() - 1);
    }

    #[test]
    fn rejects_implausibly_fine_delta_theta() {
        let dims = Dimensions {
            width: 10_000,
            height: 10_000,
        };
        let err = Accumulator::new(dims, 1e-9).unwrap_err();
        assert!(matches!(err, DetectorError::OutOfMemory));
    }
}
