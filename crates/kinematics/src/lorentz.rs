use uom::si::{energy::gigaelectronvolt, f64::Energy};

/// A four-momentum `(px, py, pz, E)`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LorentzVector {
    pub px: Energy,
    pub py: Energy,
    pub pz: Energy,
    pub e: Energy,
}

impl LorentzVector {
    /// Creates a four-vector from its components.
    #[must_use]
    pub fn new(px: Energy, py: Energy, pz: Energy, e: Energy) -> Self {
        Self { px, py, pz, e }
    }

    /// The zero four-vector.
    #[must_use]
    pub fn zero() -> Self {
        Self::from_gev(0.0, 0.0, 0.0, 0.0)
    }

    /// Creates a four-vector from components in GeV.
    #[must_use]
    pub fn from_gev(px: f64, py: f64, pz: f64, e: f64) -> Self {
        Self::new(
            Energy::new::<gigaelectronvolt>(px),
            Energy::new::<gigaelectronvolt>(py),
            Energy::new::<gigaelectronvolt>(pz),
            Energy::new::<gigaelectronvolt>(e),
        )
    }

    /// Transverse momentum, `sqrt(px² + py²)`.
    #[must_use]
    pub fn pt(&self) -> Energy {
        let [px, py, _, _] = self.gev();
        Energy::new::<gigaelectronvolt>(px.hypot(py))
    }

    /// Momentum magnitude, `sqrt(px² + py² + pz²)`.
    #[must_use]
    pub fn p(&self) -> Energy {
        let [px, py, pz, _] = self.gev();
        Energy::new::<gigaelectronvolt>(px.hypot(py).hypot(pz))
    }

    /// Invariant mass, `sqrt(E² - p²)`.
    ///
    /// A spacelike vector (`E² < p²`) reports a negative mass of magnitude
    /// `sqrt(p² - E²)`.
    #[must_use]
    pub fn mass(&self) -> Energy {
        let [px, py, pz, e] = self.gev();
        let m2 = e * e - (px * px + py * py + pz * pz);
        let m = if m2 < 0.0 { -(-m2).sqrt() } else { m2.sqrt() };
        Energy::new::<gigaelectronvolt>(m)
    }

    fn gev(&self) -> [f64; 4] {
        [
            self.px.get::<gigaelectronvolt>(),
            self.py.get::<gigaelectronvolt>(),
            self.pz.get::<gigaelectronvolt>(),
            self.e.get::<gigaelectronvolt>(),
        ]
    }
}

impl Default for LorentzVector {
    fn default() -> Self {
        Self::zero()
    }
}
