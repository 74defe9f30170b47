//! fitting::models — the fixed decay-model library.
//!
//! Purpose
//! -------
//! Define the ten parametric time→intensity functions the engine sweeps, in
//! their load-bearing order, together with parameter metadata and the
//! per-model initial-guess vectors.
//!
//! Key behaviors
//! -------------
//! - [`MODEL_LIBRARY`] fixes the sweep order; it doubles as the tie-break
//!   priority when two models reach identical R² (earlier wins).
//! - [`DecayModel::initial_guess`] seeds every parameter at one, except
//!   the single-exponential amplitude (half the truncated data's maximum, a
//!   conditioning heuristic) and the peak-position parameters of the
//!   Gaussian/Lorentzian family (zero).
//! - [`DecayModel::exponential_components`] classifies which models carry
//!   the multi-exponential `Aᵢ/τᵢ/B` structure that supports the percentage
//!   decomposition; the Gaussian family and the power law report raw
//!   parameters only.
//!
//! Conventions
//! -----------
//! - `t` is absolute time in ns along the acquisition's decay axis; models
//!   are evaluated on the truncated tail `t ≥ t_peak`.
//! - Parameter vectors are plain `&[f64]` slices ordered exactly like
//!   [`DecayModel::param_names`].
use crate::fitting::special::faddeeva;
use ndarray::Array1;
use num_complex::Complex64;
use std::f64::consts::SQRT_2;

/// The fixed model sweep order. First entry wins R² ties.
pub const MODEL_LIBRARY: [DecayModel; 10] = [
    DecayModel::SingleExp,
    DecayModel::DoubleExp,
    DecayModel::TripleExp,
    DecayModel::QuadExp,
    DecayModel::Gaussian,
    DecayModel::ExpGaussian,
    DecayModel::Lorentzian,
    DecayModel::LorentzianGaussian,
    DecayModel::Voigt,
    DecayModel::PowerLaw,
];

/// `DecayModel` — one member of the decay-model library.
///
/// A closed enum rather than a trait object: the library is fixed, its
/// order is semantically meaningful, and models are freely copied across
/// worker threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecayModel {
    /// `A1·e^(−t/τ1) + B`
    SingleExp,
    /// `A1·e^(−t/τ1) + A2·e^(−t/τ2) + B`
    DoubleExp,
    /// Three exponential components plus offset.
    TripleExp,
    /// Four exponential components plus offset.
    QuadExp,
    /// `A·e^(−(t−μ)²/2σ²)`
    Gaussian,
    /// `A·e^(−t/τ)·e^(−(t−μ)²/2σ²)` — exponentially modulated Gaussian.
    ExpGaussian,
    /// `A·γ²/((t−μ)² + γ²)`
    Lorentzian,
    /// `A·(γ²/((t−μ)²+γ²))·e^(−(t−μ)²/2σ²)` — Lorentzian–Gaussian hybrid.
    LorentzianGaussian,
    /// `A·Re[w(((t−μ) + iγ)/(σ√2))]` — Voigt profile via the Faddeeva
    /// function.
    Voigt,
    /// `A·t^(−α)`
    PowerLaw,
}

impl DecayModel {
    /// Short machine-readable identifier.
    pub fn name(&self) -> &'static str {
        match self {
            DecayModel::SingleExp => "single_exponential",
            DecayModel::DoubleExp => "double_exponential",
            DecayModel::TripleExp => "triple_exponential",
            DecayModel::QuadExp => "quadruple_exponential",
            DecayModel::Gaussian => "gaussian",
            DecayModel::ExpGaussian => "exponential_gaussian",
            DecayModel::Lorentzian => "lorentzian",
            DecayModel::LorentzianGaussian => "lorentzian_gaussian",
            DecayModel::Voigt => "voigt",
            DecayModel::PowerLaw => "power_law",
        }
    }

    /// Human-readable formula string for display and export headers.
    pub fn formula(&self) -> &'static str {
        match self {
            DecayModel::SingleExp => "A1 * exp(-t / tau1) + B",
            DecayModel::DoubleExp => "A1 * exp(-t / tau1) + A2 * exp(-t / tau2) + B",
            DecayModel::TripleExp => {
                "A1 * exp(-t / tau1) + A2 * exp(-t / tau2) + A3 * exp(-t / tau3) + B"
            }
            DecayModel::QuadExp => {
                "A1 * exp(-t / tau1) + A2 * exp(-t / tau2) + A3 * exp(-t / tau3) \
                 + A4 * exp(-t / tau4) + B"
            }
            DecayModel::Gaussian => "A * exp(-(t - mu)**2 / (2 * sigma**2))",
            DecayModel::ExpGaussian => "A * exp(-t / tau) * exp(-(t - mu)**2 / (2 * sigma**2))",
            DecayModel::Lorentzian => "A * gamma**2 / ((t - mu)**2 + gamma**2)",
            DecayModel::LorentzianGaussian => {
                "A * (gamma**2 / ((t - mu)**2 + gamma**2)) * exp(-(t - mu)**2 / (2 * sigma**2))"
            }
            DecayModel::Voigt => "A * real(wofz(((t - mu) + 1j * gamma) / (sigma * sqrt(2))))",
            DecayModel::PowerLaw => "A * t**(-alpha)",
        }
    }

    /// Number of free parameters.
    pub fn param_count(&self) -> usize {
        self.param_names().len()
    }

    /// Parameter names, in vector order.
    pub fn param_names(&self) -> &'static [&'static str] {
        match self {
            DecayModel::SingleExp => &["A1", "tau1", "B"],
            DecayModel::DoubleExp => &["A1", "tau1", "A2", "tau2", "B"],
            DecayModel::TripleExp => &["A1", "tau1", "A2", "tau2", "A3", "tau3", "B"],
            DecayModel::QuadExp => {
                &["A1", "tau1", "A2", "tau2", "A3", "tau3", "A4", "tau4", "B"]
            }
            DecayModel::Gaussian => &["A", "mu", "sigma"],
            DecayModel::ExpGaussian => &["A", "tau", "mu", "sigma"],
            DecayModel::Lorentzian => &["A", "mu", "gamma"],
            DecayModel::LorentzianGaussian => &["A", "mu", "gamma", "sigma"],
            DecayModel::Voigt => &["A", "mu", "sigma", "gamma"],
            DecayModel::PowerLaw => &["A", "alpha"],
        }
    }

    /// Number of exponential components for the multi-exponential models;
    /// `None` for models without the `Aᵢ/τᵢ/B` structure.
    pub fn exponential_components(&self) -> Option<usize> {
        match self {
            DecayModel::SingleExp => Some(1),
            DecayModel::DoubleExp => Some(2),
            DecayModel::TripleExp => Some(3),
            DecayModel::QuadExp => Some(4),
            _ => None,
        }
    }

    /// Initial-guess vector for the optimizer.
    ///
    /// `y_peak` is the maximum of the truncated (already rescaled) data; it
    /// seeds the single-exponential amplitude at `y_peak / 2` for optimizer
    /// stability. Peak-position parameters start at zero, everything else
    /// at one.
    pub fn initial_guess(&self, y_peak: f64) -> Vec<f64> {
        match self {
            DecayModel::SingleExp => vec![y_peak / 2.0, 1.0, 1.0],
            DecayModel::DoubleExp => vec![1.0; 5],
            DecayModel::TripleExp => vec![1.0; 7],
            DecayModel::QuadExp => vec![1.0; 9],
            DecayModel::Gaussian => vec![1.0, 0.0, 1.0],
            DecayModel::ExpGaussian => vec![1.0, 1.0, 0.0, 1.0],
            DecayModel::Lorentzian => vec![1.0, 0.0, 1.0],
            DecayModel::LorentzianGaussian => vec![1.0, 0.0, 1.0, 1.0],
            DecayModel::Voigt => vec![1.0, 0.0, 1.0, 1.0],
            DecayModel::PowerLaw => vec![1.0, 1.0],
        }
    }

    /// Evaluate the model at a single time point.
    ///
    /// `params` must hold exactly [`DecayModel::param_count`] entries in
    /// [`DecayModel::param_names`] order. Out-of-domain parameter values
    /// (σ = 0, t = 0 for the power law, …) yield non-finite results, which
    /// the solver boundary treats as a failed step rather than a panic.
    pub fn eval(&self, t: f64, params: &[f64]) -> f64 {
        debug_assert_eq!(params.len(), self.param_count());
        match self {
            DecayModel::SingleExp => params[0] * (-t / params[1]).exp() + params[2],
            DecayModel::DoubleExp => {
                params[0] * (-t / params[1]).exp() + params[2] * (-t / params[3]).exp() + params[4]
            }
            DecayModel::TripleExp => {
                params[0] * (-t / params[1]).exp()
                    + params[2] * (-t / params[3]).exp()
                    + params[4] * (-t / params[5]).exp()
                    + params[6]
            }
            DecayModel::QuadExp => {
                params[0] * (-t / params[1]).exp()
                    + params[2] * (-t / params[3]).exp()
                    + params[4] * (-t / params[5]).exp()
                    + params[6] * (-t / params[7]).exp()
                    + params[8]
            }
            DecayModel::Gaussian => {
                let dt = t - params[1];
                params[0] * (-dt * dt / (2.0 * params[2] * params[2])).exp()
            }
            DecayModel::ExpGaussian => {
                let dt = t - params[2];
                params[0]
                    * (-t / params[1]).exp()
                    * (-dt * dt / (2.0 * params[3] * params[3])).exp()
            }
            DecayModel::Lorentzian => {
                let dt = t - params[1];
                let gamma_sq = params[2] * params[2];
                params[0] * gamma_sq / (dt * dt + gamma_sq)
            }
            DecayModel::LorentzianGaussian => {
                let dt = t - params[1];
                let gamma_sq = params[2] * params[2];
                params[0] * (gamma_sq / (dt * dt + gamma_sq))
                    * (-dt * dt / (2.0 * params[3] * params[3])).exp()
            }
            DecayModel::Voigt => {
                let z = Complex64::new(t - params[1], params[3]) / (params[2] * SQRT_2);
                params[0] * faddeeva(z).re
            }
            DecayModel::PowerLaw => params[0] * t.powf(-params[1]),
        }
    }

    /// Evaluate the model over a whole time axis.
    pub fn eval_curve(&self, t: &Array1<f64>, params: &[f64]) -> Array1<f64> {
        t.mapv(|ti| self.eval(ti, params))
    }
}

impl std::fmt::Display for DecayModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
