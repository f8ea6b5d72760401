//! Four-vectors with measurement uncertainties.
//!
//! Momentum components and energy are all [`Energy`](uom::si::f64::Energy)
//! quantities in natural units (`c = 1`), so a momentum of 40 GeV/c is stored
//! as 40 GeV.

mod lorentz;
mod measured;

pub use lorentz::LorentzVector;
pub use measured::MeasuredVector;
