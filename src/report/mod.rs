//! report — textual summaries of fit results.
//!
//! Purpose
//! -------
//! Render the human-readable parameter summary attached to every
//! [`FitOutcome`](crate::fitting::FitOutcome). Purely presentational: this
//! module formats numbers and never alters them.
//!
//! Conventions
//! -----------
//! - Exponential-family winners get one `τᵢ = … ns, …% of total` line per
//!   component, a baseline share line, then the R² line.
//! - Winners without a decomposition list their raw parameters as
//!   `name = value` lines instead.
//! - Percentages print with two decimals, τ and R² with four — matching the
//!   instrument's on-screen display.
use crate::fitting::models::DecayModel;
use crate::fitting::outcome::Decomposition;

/// Build the summary text for a winning fit.
///
/// Parameters
/// ----------
/// - `model`: the winning library member.
/// - `params`: fitted parameters in [`DecayModel::param_names`] order; used
///   verbatim when no decomposition applies.
/// - `decomposition`: percentage breakdown for exponential-family winners.
/// - `r2`: coefficient of determination of the winning fit.
///
/// Returns
/// -------
/// The multi-line summary, every line newline-terminated.
pub fn fitted_params_text(
    model: DecayModel, params: &[f64], decomposition: Option<&Decomposition>, r2: f64,
) -> String {
    let mut text = String::from("Fitted parameters:\n");

    match decomposition {
        Some(decomposition) => {
            for (index, component) in decomposition.components.iter().enumerate() {
                text.push_str(&format!(
                    "τ{} = {:.4} ns, {:.2}% of total\n",
                    index + 1,
                    component.tau_ns,
                    component.percentage * 100.0
                ));
            }
            text.push_str(&format!(
                "B = {:.2}% of total\n",
                decomposition.baseline_percentage * 100.0
            ));
        }
        None => {
            for (name, value) in model.param_names().iter().zip(params) {
                text.push_str(&format!("{name} = {value:.4}\n"));
            }
        }
    }

    text.push_str(&format!("R² = {r2:.4}\n"));
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Purpose
    // -------
    // Pin the exact summary layout for an exponential winner.
    //
    // Given
    // -----
    // - A single-component decomposition with τ = 3, component share 90 %,
    //   baseline share 10 %, and R² = 0.9987.
    //
    // Expect
    // ------
    // - The four documented lines, byte for byte.
    fn exponential_summary_matches_expected_layout() {
        let decomposition = Decomposition::from_params(DecayModel::SingleExp, &[450.0, 3.0, 50.0])
            .expect("single exponential decomposes");
        let text = fitted_params_text(
            DecayModel::SingleExp,
            &[450.0, 3.0, 50.0],
            Some(&decomposition),
            0.9987,
        );

        assert_eq!(
            text,
            "Fitted parameters:\n\
             τ1 = 3.0000 ns, 90.00% of total\n\
             B = 10.00% of total\n\
             R² = 0.9987\n"
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify raw-parameter rendering for a non-exponential winner.
    //
    // Given
    // -----
    // - A power-law fit with A = 2, α = 1.5 and R² = 0.5.
    //
    // Expect
    // ------
    // - `name = value` lines followed by the R² line.
    fn raw_parameter_summary_for_non_exponential_models() {
        let text = fitted_params_text(DecayModel::PowerLaw, &[2.0, 1.5], None, 0.5);
        assert_eq!(
            text,
            "Fitted parameters:\n\
             A = 2.0000\n\
             alpha = 1.5000\n\
             R² = 0.5000\n"
        );
    }
}
