//! fitting::outcome — immutable per-channel fit results.
//!
//! Purpose
//! -------
//! Package the winning model of a channel sweep together with everything a
//! rendering or export layer needs: parameters, goodness of fit, the
//! truncation and rescaling bookkeeping, data/fitted/residual vectors, and
//! the exponential percentage decomposition.
//!
//! Key behaviors
//! -------------
//! - [`FitOutcome`] is created once per channel per acquisition and never
//!   mutated afterwards; consumers read it and drop it.
//! - `y_data`, `fitted_values`, and `residuals` stay in the optimizer's
//!   rescaled units; [`FitOutcome::counts`] and [`FitOutcome::fitted_counts`]
//!   multiply the scale factor back for display.
//! - [`Decomposition`] derives `Serialize`, so the percentage map can be
//!   handed to JSON export directly.
//!
//! Invariants & assumptions
//! ------------------------
//! - `residuals.len() == x_values.len()` (zero-padded over the excluded
//!   rise), while `t_data`, `y_data`, and `fitted_values` share the
//!   truncated length.
//! - For any decomposition, the component percentages and the baseline
//!   percentage sum to 1 within floating-point tolerance.
use crate::fitting::models::DecayModel;
use ndarray::Array1;
use serde::Serialize;

/// One exponential component of a multi-exponential fit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpComponent {
    /// Fitted amplitude `Aᵢ`.
    pub amplitude: f64,
    /// Fitted decay constant `τᵢ` in ns.
    pub tau_ns: f64,
    /// Share of the total intensity, `Aᵢ / (ΣAⱼ + B)`, in `[0, 1]`.
    pub percentage: f64,
}

/// `Decomposition` — percentage breakdown of a multi-exponential fit.
///
/// Produced only for the exponential-family models; the Gaussian family and
/// the power law report raw parameters instead. Suitable for direct JSON
/// serialization in export flows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decomposition {
    /// One entry per exponential component, in parameter order.
    pub components: Vec<ExpComponent>,
    /// Fitted baseline offset `B` (in rescaled units).
    pub baseline: f64,
    /// Baseline share of the total intensity, `B / (ΣAⱼ + B)`.
    pub baseline_percentage: f64,
}

impl Decomposition {
    /// Build the decomposition for `model`'s fitted `params`.
    ///
    /// Returns `None` for models without the multi-exponential `Aᵢ/τᵢ/B`
    /// structure. The number of components is `(param_count − 1) / 2`;
    /// amplitudes sit at even indices, decay constants at odd ones, and the
    /// offset is the final parameter.
    pub fn from_params(model: DecayModel, params: &[f64]) -> Option<Self> {
        let component_count = model.exponential_components()?;
        let amplitude_sum: f64 = (0..component_count).map(|i| params[2 * i]).sum();
        let baseline = params[2 * component_count];
        let total = amplitude_sum + baseline;

        let components = (0..component_count)
            .map(|i| ExpComponent {
                amplitude: params[2 * i],
                tau_ns: params[2 * i + 1],
                percentage: params[2 * i] / total,
            })
            .collect();

        Some(Decomposition { components, baseline, baseline_percentage: baseline / total })
    }
}

/// `FitOutcome` — the best fit found for one channel.
///
/// Fields
/// ------
/// - `channel`: channel index the curve came from.
/// - `model`: the winning library member.
/// - `params`: fitted parameter vector, in
///   [`DecayModel::param_names`] order (rescaled units).
/// - `r2`: coefficient of determination of the winning fit.
/// - `decay_start`: index of the histogram peak; bins before it were
///   excluded from fitting and zero-padded in `residuals`.
/// - `scale_factor`: divisor applied to the counts before fitting
///   (`max(y)/1000` when `max(y) > 1000`, else 1). Multiply back for
///   display.
/// - `x_values`: full, untruncated time axis (ns).
/// - `t_data` / `y_data`: truncated axis and rescaled counts the optimizer
///   saw.
/// - `fitted_values`: winning model evaluated over `t_data` (rescaled).
/// - `residuals`: `y_data − fitted_values`, zero-padded to `x_values.len()`.
/// - `decomposition`: percentage breakdown for exponential-family winners.
/// - `summary`: formatted parameter text (see [`crate::report`]).
#[derive(Debug, Clone, PartialEq)]
pub struct FitOutcome {
    pub channel: usize,
    pub model: DecayModel,
    pub params: Vec<f64>,
    pub r2: f64,
    pub decay_start: usize,
    pub scale_factor: f64,
    pub x_values: Array1<f64>,
    pub t_data: Array1<f64>,
    pub y_data: Array1<f64>,
    pub fitted_values: Array1<f64>,
    pub residuals: Array1<f64>,
    pub decomposition: Option<Decomposition>,
    pub summary: String,
}

impl FitOutcome {
    /// Truncated counts in display units (scale factor multiplied back).
    pub fn counts(&self) -> Array1<f64> {
        &self.y_data * self.scale_factor
    }

    /// Fitted curve in display units (scale factor multiplied back).
    pub fn fitted_counts(&self) -> Array1<f64> {
        &self.fitted_values * self.scale_factor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Verify the percentage arithmetic for a two-component fit and its
    // closure property.
    //
    // Given
    // -----
    // - Double-exponential parameters A1 = 300, τ1 = 1, A2 = 100, τ2 = 5,
    //   B = 100.
    //
    // Expect
    // ------
    // - Percentages 0.6, 0.2, and baseline 0.2; components + baseline sum
    //   to exactly 1 within 1e-6.
    fn from_params_computes_percentages() {
        let params = [300.0, 1.0, 100.0, 5.0, 100.0];
        let decomposition = Decomposition::from_params(DecayModel::DoubleExp, &params)
            .expect("double exponential decomposes");

        assert_eq!(decomposition.components.len(), 2);
        assert!((decomposition.components[0].percentage - 0.6).abs() < 1e-12);
        assert!((decomposition.components[1].percentage - 0.2).abs() < 1e-12);
        assert_eq!(decomposition.components[0].tau_ns, 1.0);
        assert_eq!(decomposition.components[1].tau_ns, 5.0);
        assert!((decomposition.baseline_percentage - 0.2).abs() < 1e-12);

        let closure: f64 = decomposition.components.iter().map(|c| c.percentage).sum::<f64>()
            + decomposition.baseline_percentage;
        assert!((closure - 1.0).abs() < 1e-6);
    }

    #[test]
    // Purpose
    // -------
    // Ensure non-exponential models skip the decomposition.
    //
    // Given
    // -----
    // - Gaussian and power-law parameter vectors.
    //
    // Expect
    // ------
    // - `from_params` returns `None` for both.
    fn from_params_skips_non_exponential_models() {
        assert!(Decomposition::from_params(DecayModel::Gaussian, &[1.0, 0.0, 1.0]).is_none());
        assert!(Decomposition::from_params(DecayModel::PowerLaw, &[1.0, 1.0]).is_none());
    }

    #[test]
    // Purpose
    // -------
    // Check that the decomposition serializes to the JSON shape export
    // flows expect.
    //
    // Given
    // -----
    // - A single-component decomposition.
    //
    // Expect
    // ------
    // - JSON with `components`, `baseline`, and `baseline_percentage` keys.
    fn decomposition_serializes_to_json() {
        let decomposition =
            Decomposition::from_params(DecayModel::SingleExp, &[450.0, 3.0, 50.0])
                .expect("single exponential decomposes");
        let json = serde_json::to_value(&decomposition).expect("serializable");

        assert!(json["components"].is_array());
        assert_eq!(json["components"][0]["tau_ns"], 3.0);
        assert_eq!(json["baseline"], 50.0);
        assert!((json["baseline_percentage"].as_f64().unwrap() - 0.1).abs() < 1e-12);
    }
}
