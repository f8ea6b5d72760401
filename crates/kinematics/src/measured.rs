use uom::si::{
    energy::gigaelectronvolt,
    f64::{Energy, Ratio},
    ratio::ratio,
};

use crate::LorentzVector;

/// A four-vector with measurement uncertainties and the quality of the fit
/// that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MeasuredVector {
    pub vector: LorentzVector,

    /// Energy resolution.
    pub sigma_energy: Energy,

    /// Direction resolution, per component of `β = p / E`.
    pub sigma_beta: [Ratio; 3],

    /// Fit χ² per degree of freedom; `1e20` until a fit sets it.
    pub chi2_per_ndf: f64,

    /// Status code of the fit, `None` if no fit ran.
    pub inform: Option<i64>,
}

impl MeasuredVector {
    /// Sentinel χ²/ndf of an unfitted vector.
    pub const UNFITTED_CHI2: f64 = 1.0e20;

    /// Wraps a vector with the given resolutions and no fit result.
    #[must_use]
    pub fn new(vector: LorentzVector, sigma_energy: Energy, sigma_beta: [Ratio; 3]) -> Self {
        Self {
            vector,
            sigma_energy,
            sigma_beta,
            chi2_per_ndf: Self::UNFITTED_CHI2,
            inform: None,
        }
    }

    /// Like [`new`](Self::new), with the energy resolution in GeV and plain
    /// direction resolutions.
    #[must_use]
    pub fn from_gev(vector: LorentzVector, sigma_energy: f64, sigma_beta: [f64; 3]) -> Self {
        Self::new(
            vector,
            Energy::new::<gigaelectronvolt>(sigma_energy),
            sigma_beta.map(Ratio::new::<ratio>),
        )
    }

    /// Records the result of a fit.
    #[must_use]
    pub fn with_fit(mut self, chi2_per_ndf: f64, inform: i64) -> Self {
        self.chi2_per_ndf = chi2_per_ndf;
        self.inform = Some(inform);
        self
    }

    /// Whether a fit has been recorded.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.inform.is_some()
    }
}

impl Default for MeasuredVector {
    fn default() -> Self {
        Self::from_gev(LorentzVector::zero(), 0.0, [0.0; 3])
    }
}
