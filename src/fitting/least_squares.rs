//! fitting::least_squares — Levenberg–Marquardt boundary for model fits.
//!
//! Purpose
//! -------
//! Adapt a `(model, t_data, y_data)` triple to the `levenberg_marquardt`
//! solver and run one bounded fit attempt. This module is the crate's only
//! contact with `nalgebra` types: the engine hands in `ndarray` views and
//! gets back a plain parameter vector.
//!
//! Key behaviors
//! -------------
//! - [`CurveFitProblem`] implements the solver's `LeastSquaresProblem`
//!   trait with residuals `model(tᵢ) − yᵢ` and a forward-difference
//!   Jacobian (√ε-scaled steps). Any non-finite model value invalidates the
//!   step instead of panicking or poisoning the solve.
//! - [`solve_model`] maps the caller's function-evaluation budget onto the
//!   solver's MINPACK-style patience, runs the minimization, and converts
//!   the outcome into `Some(converged parameters)` or `None` — a skipped
//!   model, never an error.
//!
//! Conventions
//! -----------
//! - `nalgebra` storage (`DVector`, `DMatrix`) stays inside this module,
//!   mirroring how the crate otherwise standardizes on `ndarray`.
use crate::fitting::models::DecayModel;
use levenberg_marquardt::{LeastSquaresProblem, LevenbergMarquardt};
use log::debug;
use nalgebra::{DMatrix, DVector, Dyn, Owned};
use ndarray::Array1;

/// `CurveFitProblem` — one model attempt against a truncated decay curve.
///
/// Holds borrowed data and the solver-owned parameter vector. Residuals and
/// Jacobian return `None` whenever a model evaluation is non-finite, which
/// the solver treats as an invalid step.
pub(crate) struct CurveFitProblem<'a> {
    model: DecayModel,
    t: &'a Array1<f64>,
    y: &'a Array1<f64>,
    params: DVector<f64>,
}

impl<'a> CurveFitProblem<'a> {
    pub(crate) fn new(
        model: DecayModel, t: &'a Array1<f64>, y: &'a Array1<f64>, guess: &[f64],
    ) -> Self {
        CurveFitProblem { model, t, y, params: DVector::from_column_slice(guess) }
    }

    /// Residual vector `model(tᵢ) − yᵢ` at an arbitrary parameter point.
    fn residuals_at(&self, params: &DVector<f64>) -> Option<DVector<f64>> {
        let mut residuals = DVector::zeros(self.t.len());
        for (index, (&t, &y)) in self.t.iter().zip(self.y.iter()).enumerate() {
            let value = self.model.eval(t, params.as_slice());
            if !value.is_finite() {
                return None;
            }
            residuals[index] = value - y;
        }
        Some(residuals)
    }
}

impl LeastSquaresProblem<f64, Dyn, Dyn> for CurveFitProblem<'_> {
    type ResidualStorage = Owned<f64, Dyn>;
    type ParameterStorage = Owned<f64, Dyn>;
    type JacobianStorage = Owned<f64, Dyn, Dyn>;

    fn set_params(&mut self, params: &DVector<f64>) {
        self.params.copy_from(params);
    }

    fn params(&self) -> DVector<f64> {
        self.params.clone()
    }

    fn residuals(&self) -> Option<DVector<f64>> {
        self.residuals_at(&self.params)
    }

    fn jacobian(&self) -> Option<DMatrix<f64>> {
        let base = self.residuals_at(&self.params)?;
        let step_scale = f64::EPSILON.sqrt();

        let mut jacobian = DMatrix::zeros(self.t.len(), self.params.len());
        for column in 0..self.params.len() {
            let step = step_scale * self.params[column].abs().max(1.0);
            let mut shifted = self.params.clone();
            shifted[column] += step;
            let forward = self.residuals_at(&shifted)?;
            jacobian.set_column(column, &((forward - &base) / step));
        }
        Some(jacobian)
    }
}

/// Run one bounded Levenberg–Marquardt attempt for `model`.
///
/// Parameters
/// ----------
/// - `model`: the library member to fit.
/// - `t`, `y`: truncated decay data (`t.len() == y.len()`).
/// - `guess`: the model's initial parameter vector.
/// - `patience`: approximate function-evaluation budget; translated to the
///   solver's MINPACK-style patience factor (evaluations per parameter).
///
/// Returns
/// -------
/// `Option<Vec<f64>>`
///   `Some(params)` when the solver terminates successfully with finite
///   parameters; `None` when it diverges, exhausts the budget, or steps
///   into a non-finite region. `None` is a skip, not an error: the engine
///   simply advances to the next model in library order.
pub(crate) fn solve_model(
    model: DecayModel, t: &Array1<f64>, y: &Array1<f64>, guess: &[f64], patience: usize,
) -> Option<Vec<f64>> {
    let budget = (patience / (guess.len() + 1)).max(1);
    let problem = CurveFitProblem::new(model, t, y, guess);
    let (solved, report) = LevenbergMarquardt::new().with_patience(budget).minimize(problem);

    if !report.termination.was_successful() {
        debug!("model {model}: solver stopped without convergence ({:?})", report.termination);
        return None;
    }

    let params = solved.params.as_slice().to_vec();
    if params.iter().any(|value| !value.is_finite()) {
        debug!("model {model}: converged to non-finite parameters");
        return None;
    }
    Some(params)
}
