//! Two-state linear vibronic coupling model in the crude adiabatic picture.

use fms_core::{ErrorInfo, FmsError, Trajectory};
use serde::{Deserialize, Serialize};

use crate::ModelSurface;

/// Diabatic potential matrix
///
/// ```text
/// W00 = sum_k omega_k x_k^2 / 2 + kappa0_k x_k + e0
/// W11 = sum_k omega_k x_k^2 / 2 + kappa1_k x_k + e1
/// W01 = sum_k lambda_k x_k + delta
/// ```
///
/// diagonalised pointwise by a rotation of angle `theta`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VibronicModel {
    /// Mode frequencies.
    pub omega: Vec<f64>,
    /// Linear tuning on the first diabat.
    pub kappa0: Vec<f64>,
    /// Linear tuning on the second diabat.
    pub kappa1: Vec<f64>,
    /// Linear inter-diabat coupling.
    pub lambda: Vec<f64>,
    /// Vertical diabatic energies.
    #[serde(default)]
    pub energies: [f64; 2],
    /// Constant inter-diabat coupling.
    #[serde(default)]
    pub delta: f64,
}

/// Diabatic matrix elements and their position derivatives at one geometry.
struct Diabats {
    w00: f64,
    w11: f64,
    w01: f64,
    d00: Vec<f64>,
    d11: Vec<f64>,
    d01: Vec<f64>,
}

const DEGENERACY: f64 = 1e-14;

impl VibronicModel {
    fn diabats(&self, x: &[f64]) -> Diabats {
        let mut w00 = self.energies[0];
        let mut w11 = self.energies[1];
        let mut w01 = self.delta;
        let mut d00 = Vec::with_capacity(x.len());
        let mut d11 = Vec::with_capacity(x.len());
        for (q, &xq) in x.iter().enumerate() {
            let harmonic = 0.5 * self.omega[q] * xq * xq;
            w00 += harmonic + self.kappa0[q] * xq;
            w11 += harmonic + self.kappa1[q] * xq;
            w01 += self.lambda[q] * xq;
            d00.push(self.omega[q] * xq + self.kappa0[q]);
            d11.push(self.omega[q] * xq + self.kappa1[q]);
        }
        Diabats {
            w00,
            w11,
            w01,
            d00,
            d11,
            d01: self.lambda.clone(),
        }
    }

    /// Rotation angle whose columns `(cos, sin)` and `(-sin, cos)` are the
    /// lower and upper adiabatic states.
    pub fn mixing_angle(&self, x: &[f64]) -> f64 {
        let w = self.diabats(x);
        0.5 * (-2.0 * w.w01).atan2(w.w11 - w.w00)
    }

    /// Adiabatic state `state` expressed in the diabatic basis.
    pub fn adiabatic_vector(&self, x: &[f64], state: usize) -> [f64; 2] {
        let theta = self.mixing_angle(x);
        let (sin, cos) = theta.sin_cos();
        if state == 0 {
            [cos, sin]
        } else {
            [-sin, cos]
        }
    }

    /// Gradient of the mixing angle with respect to each coordinate.
    fn angle_gradient(&self, x: &[f64]) -> Vec<f64> {
        let w = self.diabats(x);
        let gap = w.w11 - w.w00;
        let denom = gap * gap + 4.0 * w.w01 * w.w01;
        if denom < DEGENERACY {
            return vec![0.0; x.len()];
        }
        (0..x.len())
            .map(|q| (w.w01 * (w.d11[q] - w.d00[q]) - gap * w.d01[q]) / denom)
            .collect()
    }
}

impl ModelSurface for VibronicModel {
    fn validate(&self, nstates: usize, dim: usize) -> Result<(), FmsError> {
        if nstates != 2 {
            return Err(FmsError::Config(
                ErrorInfo::new("vibronic-nstates", "the vibronic model has exactly two states")
                    .with_context("nstates", nstates),
            ));
        }
        let lengths = [
            self.omega.len(),
            self.kappa0.len(),
            self.kappa1.len(),
            self.lambda.len(),
        ];
        if lengths.iter().any(|&len| len != dim) {
            return Err(FmsError::Config(
                ErrorInfo::new("vibronic-modes", "mode parameters must match the dimension")
                    .with_context("dim", dim)
                    .with_context("lengths", format!("{lengths:?}")),
            ));
        }
        Ok(())
    }

    fn potential(&self, position: &[f64], state: usize) -> f64 {
        let w = self.diabats(position);
        let phi = self.adiabatic_vector(position, state);
        w.w00 * phi[0] * phi[0] + w.w11 * phi[1] * phi[1] + 2.0 * w.w01 * phi[0] * phi[1]
    }

    fn gradient(&self, position: &[f64], state: usize) -> Vec<f64> {
        let w = self.diabats(position);
        let phi = self.adiabatic_vector(position, state);
        (0..position.len())
            .map(|q| {
                w.d00[q] * phi[0] * phi[0]
                    + w.d11[q] * phi[1] * phi[1]
                    + 2.0 * w.d01[q] * phi[0] * phi[1]
            })
            .collect()
    }

    fn electronic_overlap(&self, a: &Trajectory, b: &Trajectory) -> f64 {
        let phi_a = self.adiabatic_vector(&a.position, a.state);
        let phi_b = self.adiabatic_vector(&b.position, b.state);
        phi_a[0] * phi_b[0] + phi_a[1] * phi_b[1]
    }

    fn coupling(&self, traj: &Trajectory, state: usize) -> f64 {
        if traj.state == state {
            return 0.0;
        }
        let nac = self.derivative(&traj.position, traj.state, state);
        traj.velocity()
            .iter()
            .zip(&nac)
            .map(|(v, d)| v * d)
            .sum::<f64>()
            .abs()
    }

    fn derivative(&self, position: &[f64], state_a: usize, state_b: usize) -> Vec<f64> {
        if state_a == state_b {
            return vec![0.0; position.len()];
        }
        let sign = if state_a == 0 { -1.0 } else { 1.0 };
        self.angle_gradient(position)
            .into_iter()
            .map(|g| sign * g)
            .collect()
    }
}
