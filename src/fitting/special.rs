//! fitting::special — the Faddeeva function backing the Voigt profile.
//!
//! Purpose
//! -------
//! Evaluate the scaled complex error function
//! `w(z) = e^(−z²)·erfc(−iz)` — commonly exposed as `wofz` in numerical
//! libraries — that the Voigt model needs.
//!
//! Key behaviors
//! -------------
//! - On the upper half-plane, [`faddeeva`] uses Humlíček's w4 rational
//!   approximation (J. Quant. Spectrosc. Radiat. Transfer 27, 437–444,
//!   1982): four regions selected by `s = |x| + y`, each a small rational
//!   function of `t = −iz`. Relative accuracy is on the order of 1e-4,
//!   ample for optimizer-driven profile evaluation.
//! - Below the real axis, the reflection `w(z) = 2·e^(−z²) − w(−z)` extends
//!   the domain; the `e^(−z²)` factor may overflow for large `|Im z|`, which
//!   surfaces as a non-finite model value and a skipped optimizer step.
//!
//! Invariants & assumptions
//! ------------------------
//! - `w(0) = 1`; on the real axis `Re w(x) = e^(−x²)`.
use num_complex::Complex64;

/// Faddeeva function `w(z)` on the full complex plane.
pub fn faddeeva(z: Complex64) -> Complex64 {
    if z.im >= 0.0 {
        humlicek_w4(z)
    } else {
        // Reflection into the upper half-plane: w(z) = 2·e^(−z²) − w(−z).
        2.0 * (-z * z).exp() - humlicek_w4(-z)
    }
}

/// Humlíček w4 rational approximation, valid for `Im z ≥ 0`.
fn humlicek_w4(z: Complex64) -> Complex64 {
    let t = Complex64::new(z.im, -z.re);
    let s = z.re.abs() + z.im;

    if s >= 15.0 {
        // Region I.
        t * 0.5641896 / (0.5 + t * t)
    } else if s >= 5.5 {
        // Region II.
        let u = t * t;
        t * (1.410474 + u * 0.5641896) / (0.75 + u * (3.0 + u))
    } else if z.im >= 0.195 * z.re.abs() - 0.176 {
        // Region III.
        (16.4955 + t * (20.20933 + t * (11.96482 + t * (3.778987 + t * 0.5642236))))
            / (16.4955
                + t * (38.82363 + t * (39.27121 + t * (21.69274 + t * (6.699398 + t)))))
    } else {
        // Region IV.
        let u = t * t;
        let numerator = t
            * (36183.31
                - u * (3321.9905
                    - u * (1540.787
                        - u * (219.0313 - u * (35.76683 - u * (1.320522 - u * 0.56419))))));
        let denominator = 32066.6
            - u * (24322.84
                - u * (9022.228
                    - u * (2186.181 - u * (364.2191 - u * (61.57037 - u * (1.841439 - u))))));
        u.exp() - numerator / denominator
    }
}
