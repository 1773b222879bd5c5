//! Identities of the Chebyshev discretization operators.

use ms_solver::Discretization;
use nalgebra::DVector;
use proptest::prelude::*;

fn max_abs_diff(a: &nalgebra::DMatrix<f64>, b: &nalgebra::DMatrix<f64>) -> f64 {
    (a - b).amax()
}

#[test]
fn rescale_by_one_is_identity() {
    for n in [2, 4, 9, 16] {
        let ops = Discretization::chebyshev(n).unwrap();
        let same = ops.rescale(1.0).unwrap();
        assert_eq!(ops, same);
    }
}

#[test]
fn rescale_by_t_then_inverse_restores_operators() {
    let ops = Discretization::chebyshev(16).unwrap();
    let t = 742.5;
    let back = ops.rescale(t).unwrap().rescale(1.0 / t).unwrap();

    assert!(max_abs_diff(&ops.differentiate, &back.differentiate) < 1e-9);
    assert!(max_abs_diff(&ops.integrate, &back.integrate) < 1e-12);
    assert!((&ops.control_points - &back.control_points).amax() < 1e-12);
}

#[test]
fn rescaled_operators_scale_by_duration() {
    let ops = Discretization::chebyshev(8).unwrap();
    let t = 120.0;
    let timed = ops.rescale(t).unwrap();

    assert_eq!(timed.control_points[7], ops.control_points[7] * t);
    assert_eq!(timed.differentiate[(3, 2)], ops.differentiate[(3, 2)] / t);
    assert_eq!(timed.integrate[(5, 1)], ops.integrate[(5, 1)] * t);
}

#[test]
fn integral_of_derivative_recovers_linear_function() {
    for n in 4..=20 {
        let ops = Discretization::chebyshev(n).unwrap();
        let f = ops.control_points.map(|x| 3.0 * x - 7.0);
        let recovered = ops.integral(&ops.derivative(&f));
        let expected = f.add_scalar(-f[0]);
        assert!(
            (&recovered - &expected).amax() < 1e-9,
            "I·D failed for n = {n}"
        );
    }
}

#[test]
fn constant_rate_integrates_to_rate_times_duration() {
    let rate = 0.35;
    let duration = 1800.0;
    for n in [4, 8, 16] {
        let ops = Discretization::chebyshev(n).unwrap().rescale(duration).unwrap();
        let loss = ops.integral(&DVector::from_element(n, rate));
        assert!((loss[n - 1] - rate * duration).abs() < 1e-8 * rate * duration);
        assert_eq!(loss[0], 0.0);
    }
}

proptest! {
    #[test]
    fn derivative_of_cubic_matches_analytic(
        a in -5.0_f64..5.0,
        b in -5.0_f64..5.0,
        c in -5.0_f64..5.0,
        n in 4_usize..16,
    ) {
        let ops = Discretization::chebyshev(n).unwrap();
        let f = ops.control_points.map(|x| a * x.powi(3) + b * x * x + c * x);
        let df = ops.derivative(&f);
        for i in 0..n {
            let x = ops.control_points[i];
            let exact = 3.0 * a * x * x + 2.0 * b * x + c;
            prop_assert!((df[i] - exact).abs() < 1e-7);
        }
    }
}
