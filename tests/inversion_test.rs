// tests/inversion_test.rs
use lazy_sde::math_utils::{normal_pdf, student_t_pdf};
use lazy_sde::numerics::inversion::{
    invert, inverse_standard_normal_cdf, inverse_student_t_cdf, standard_normal_cdf, Cdf,
    DensityCdf, InversionConfig,
};

#[test]
fn test_normal_round_trip() {
    let cfg = InversionConfig::default();
    let cdf = standard_normal_cdf();
    for &p in &[0.1, 0.3, 0.5, 0.7, 0.9] {
        let result = invert(&cdf, p, &cfg).unwrap();
        assert!(result.converged(), "p = {}: {:?}", p, result);
        let back = cdf.cdf(result.value, cfg.step).unwrap();
        assert!((back - p).abs() <= 2.0 * cfg.prob_tolerance, "p = {}, F(x) = {}", p, back);
    }
}

#[test]
fn test_normal_quantiles() {
    let cfg = InversionConfig::default();
    let cases = [(0.5, 0.0), (0.975, 1.959964), (0.995, 2.575829), (0.025, -1.959964)];
    for &(p, expected) in &cases {
        let z = inverse_standard_normal_cdf(p, &cfg).unwrap();
        assert!((z - expected).abs() < 1e-3, "Φ⁻¹({}) = {}", p, z);
    }
}

#[test]
fn test_student_t_table() {
    let cfg = InversionConfig::default();
    let cases = [(1, 0.975, 12.7062), (5, 0.975, 2.5706), (10, 0.975, 2.2281), (30, 0.95, 1.6973)];
    for &(dof, p, expected) in &cases {
        let t = inverse_student_t_cdf(dof, p, &cfg).unwrap();
        assert!(
            (t - expected).abs() < 1e-3 * expected.max(1.0),
            "t_{}⁻¹({}) = {}",
            dof,
            p,
            t
        );
    }
}

#[test]
fn test_shifted_normal_from_density() {
    let cfg = InversionConfig::default();
    let cdf = DensityCdf::symmetric(normal_pdf(3.0, 2.0), 3.0).unwrap();
    let x = invert(&cdf, 0.975, &cfg).unwrap().require_converged().unwrap();
    assert!((x - (3.0 + 2.0 * 1.959964)).abs() < 2e-3, "x = {}", x);
}

#[test]
fn test_cauchy_median_is_center() {
    let cfg = InversionConfig::default();
    let cdf = DensityCdf::symmetric(student_t_pdf(1), 0.0).unwrap();
    let x = invert(&cdf, 0.5, &cfg).unwrap().value;
    assert!(x.abs() < 1e-6);
}

#[test]
fn test_out_of_range_probability_rejected() {
    let cfg = InversionConfig::default();
    for &p in &[-0.1, 1.1, f64::NAN] {
        assert!(invert(&standard_normal_cdf(), p, &cfg).is_err());
    }
}
