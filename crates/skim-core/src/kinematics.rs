//! Four-momentum helpers in the (pt, eta, phi, mass) parametrisation.

use std::f64::consts::PI;
use std::ops::Mul;

use serde::{Deserialize, Serialize};

/// Immutable four-momentum stored as (pt, eta, phi, mass).
///
/// Scaling by a positive factor multiplies pt and mass and keeps the
/// direction, which is how energy corrections and smearing act on a jet.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LorentzVector {
    pt: f64,
    eta: f64,
    phi: f64,
    mass: f64,
}

impl LorentzVector {
    /// Builds a vector from transverse momentum, pseudorapidity, azimuth and mass.
    pub fn from_pt_eta_phi_m(pt: f64, eta: f64, phi: f64, mass: f64) -> Self {
        Self {
            pt,
            eta,
            phi,
            mass,
        }
    }

    /// Builds a vector from cartesian components.
    pub fn from_cartesian(energy: f64, px: f64, py: f64, pz: f64) -> Self {
        let pt = px.hypot(py);
        let eta = if pt > 0.0 {
            (pz / pt).asinh()
        } else if pz == 0.0 {
            0.0
        } else {
            pz.signum() * f64::INFINITY
        };
        let phi = if pt > 0.0 { py.atan2(px) } else { 0.0 };
        let p2 = pt * pt + pz * pz;
        let mass = (energy * energy - p2).max(0.0).sqrt();
        Self {
            pt,
            eta,
            phi,
            mass,
        }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.pt
    }

    /// Pseudorapidity.
    pub fn eta(&self) -> f64 {
        self.eta
    }

    /// Azimuthal angle.
    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Invariant mass.
    pub fn mass(&self) -> f64 {
        self.mass
    }

    /// x component of the momentum.
    pub fn px(&self) -> f64 {
        self.pt * self.phi.cos()
    }

    /// y component of the momentum.
    pub fn py(&self) -> f64 {
        self.pt * self.phi.sin()
    }

    /// z component of the momentum.
    pub fn pz(&self) -> f64 {
        self.pt * self.eta.sinh()
    }

    /// Energy.
    pub fn energy(&self) -> f64 {
        let p = self.pt * self.eta.cosh();
        (p * p + self.mass * self.mass).sqrt()
    }

    /// Returns the vector with magnitude scaled by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            pt: self.pt * factor,
            eta: self.eta,
            phi: self.phi,
            mass: self.mass * factor,
        }
    }

    /// Angular distance to another vector.
    pub fn delta_r(&self, other: &LorentzVector) -> f64 {
        delta_r(self.eta, self.phi, other.eta, other.phi)
    }
}

impl Mul<f64> for LorentzVector {
    type Output = LorentzVector;

    fn mul(self, factor: f64) -> LorentzVector {
        self.scaled(factor)
    }
}

/// Azimuthal difference wrapped into `[-pi, pi)`.
pub fn delta_phi(phi_a: f64, phi_b: f64) -> f64 {
    (phi_a - phi_b + PI).rem_euclid(2.0 * PI) - PI
}

/// Angular distance `sqrt(deta^2 + dphi^2)` with wrapped azimuth.
pub fn delta_r(eta_a: f64, phi_a: f64, eta_b: f64, phi_b: f64) -> f64 {
    let deta = eta_a - eta_b;
    let dphi = delta_phi(phi_a, phi_b);
    (deta * deta + dphi * dphi).sqrt()
}
