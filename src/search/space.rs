//! Integer search space over SARIMA orders.

use rand::Rng;
use std::fmt;

/// Number of searched orders: `[p, d, q, P, D, Q]`.
pub const DIMENSIONS: usize = 6;

/// Gene names in vector order.
pub const GENE_NAMES: [&str; DIMENSIONS] = ["p", "d", "q", "P", "D", "Q"];

/// Inclusive integer range for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub lower: usize,
    pub upper: usize,
}

impl Bounds {
    /// Create bounds `[lower, upper]`. Validity is checked by the search config.
    pub fn new(lower: usize, upper: usize) -> Self {
        Self { lower, upper }
    }

    /// Check `lower <= upper`.
    pub fn is_valid(&self) -> bool {
        self.lower <= self.upper
    }

    pub fn contains(&self, value: usize) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    pub fn clamp(&self, value: usize) -> usize {
        value.clamp(self.lower, self.upper)
    }

    /// Number of admissible values.
    pub fn width(&self) -> usize {
        self.upper - self.lower + 1
    }

    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        rng.gen_range(self.lower..=self.upper)
    }
}

/// SARIMA orders `[p, d, q, P, D, Q]`; the seasonal period is fixed by the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HyperparameterVector(pub [usize; DIMENSIONS]);

impl HyperparameterVector {
    pub fn new(p: usize, d: usize, q: usize, cap_p: usize, cap_d: usize, cap_q: usize) -> Self {
        Self([p, d, q, cap_p, cap_d, cap_q])
    }

    pub fn genes(&self) -> &[usize; DIMENSIONS] {
        &self.0
    }

    /// Non-seasonal order `(p, d, q)`.
    pub fn order(&self) -> (usize, usize, usize) {
        (self.0[0], self.0[1], self.0[2])
    }

    /// Seasonal order `(P, D, Q, s)` for the given period.
    pub fn seasonal_order(&self, period: usize) -> (usize, usize, usize, usize) {
        (self.0[3], self.0[4], self.0[5], period)
    }

    /// `p + q + P + Q`; differencing orders do not count.
    pub fn arma_order_sum(&self) -> usize {
        self.0[0] + self.0[2] + self.0[3] + self.0[5]
    }
}

impl From<[usize; DIMENSIONS]> for HyperparameterVector {
    fn from(genes: [usize; DIMENSIONS]) -> Self {
        Self(genes)
    }
}

impl fmt::Display for HyperparameterVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [p, d, q, cap_p, cap_d, cap_q] = self.0;
        write!(f, "({p},{d},{q})({cap_p},{cap_d},{cap_q})")
    }
}

/// A vector together with its evaluated cost. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub vector: HyperparameterVector,
    pub cost: f64,
}

impl Candidate {
    pub fn new(vector: HyperparameterVector, cost: f64) -> Self {
        Self { vector, cost }
    }
}

/// Per-order bounds for the six genes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSpace {
    bounds: [Bounds; DIMENSIONS],
}

impl SearchSpace {
    pub fn new(bounds: [Bounds; DIMENSIONS]) -> Self {
        Self { bounds }
    }

    /// Same range for the ARMA orders and for the differencing orders.
    pub fn symmetric(max_arma: usize, max_diff: usize) -> Self {
        let arma = Bounds::new(0, max_arma);
        let diff = Bounds::new(0, max_diff);
        Self::new([arma, diff, arma, arma, diff, arma])
    }

    pub fn bounds(&self) -> &[Bounds; DIMENSIONS] {
        &self.bounds
    }

    pub fn contains(&self, vector: &HyperparameterVector) -> bool {
        self.bounds
            .iter()
            .zip(vector.genes())
            .all(|(b, &g)| b.contains(g))
    }

    /// Clamp every gene into its bounds.
    pub fn clamp(&self, vector: HyperparameterVector) -> HyperparameterVector {
        let mut genes = vector.0;
        for (g, b) in genes.iter_mut().zip(&self.bounds) {
            *g = b.clamp(*g);
        }
        HyperparameterVector(genes)
    }

    /// Draw each gene uniformly from its bounds.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> HyperparameterVector {
        let mut genes = [0; DIMENSIONS];
        for (g, b) in genes.iter_mut().zip(&self.bounds) {
            *g = b.sample(rng);
        }
        HyperparameterVector(genes)
    }

    /// Total number of distinct vectors.
    pub fn cardinality(&self) -> usize {
        self.bounds.iter().map(Bounds::width).product()
    }
}

impl Default for SearchSpace {
    /// p, q, P, Q in [0, 3]; d, D in [0, 2].
    fn default() -> Self {
        Self::symmetric(3, 2)
    }
}
