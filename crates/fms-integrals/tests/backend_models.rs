use fms_core::{Complex64, IntegralProvider, Trajectory};
use fms_integrals::{BosonModel, IntegralBackend, ModelSurface, VibronicModel};

fn boson() -> IntegralBackend {
    IntegralBackend::Boson(BosonModel {
        omega: vec![1.0, 2.0],
        coupling: vec![0.5, -0.25],
        delta: -0.04,
    })
}

fn vibronic() -> VibronicModel {
    VibronicModel {
        omega: vec![1.0],
        kappa0: vec![-0.5],
        kappa1: vec![0.5],
        lambda: vec![0.1],
        energies: [0.0, 0.2],
        delta: 0.05,
    }
}

fn traj(state: usize, x: Vec<f64>, p: Vec<f64>) -> Trajectory {
    let widths = vec![1.0; x.len()];
    Trajectory::new(0, state, 2, x, widths)
        .unwrap()
        .with_momentum(p)
}

#[test]
fn boson_overlap_is_state_orthogonal() {
    let backend = boson();
    let a = traj(0, vec![0.0, 0.0], vec![0.0, 0.0]);
    let b = traj(1, vec![0.1, 0.0], vec![0.0, 0.0]);
    assert_eq!(backend.overlap(&a, &b, false), Complex64::new(0.0, 0.0));
    assert_eq!(backend.traj_overlap(&a, &b, false), Complex64::new(0.0, 0.0));
    assert!(backend.overlap(&a, &b, true).norm() > 0.99);
    assert!((backend.eff_coup(&a, 1) - 0.04).abs() < 1e-15);
    assert_eq!(backend.eff_coup(&a, 0), 0.0);
}

#[test]
fn boson_surfaces_are_shifted_harmonic_wells() {
    let backend = boson();
    let t = traj(1, vec![1.0, 2.0], vec![0.0, 0.0]);
    // 0.5*1*1 + 0.5 + 0.5*2*4 - 0.5 = 4.5
    assert!((backend.potential(&t, 1) - 4.5).abs() < 1e-12);
    assert_eq!(backend.gradient(&t, 0), vec![0.5, 4.25]);
}

#[test]
fn vibronic_adiabats_are_ordered_and_orthonormal() {
    let model = vibronic();
    for &x in &[-2.0, -0.3, 0.0, 0.7, 3.0] {
        let lower = model.potential(&[x], 0);
        let upper = model.potential(&[x], 1);
        assert!(lower <= upper + 1e-12, "x={x}");
        let phi0 = model.adiabatic_vector(&[x], 0);
        let phi1 = model.adiabatic_vector(&[x], 1);
        assert!((phi0[0] * phi1[0] + phi0[1] * phi1[1]).abs() < 1e-12);
        assert!((phi0[0].powi(2) + phi0[1].powi(2) - 1.0).abs() < 1e-12);
    }
}

#[test]
fn vibronic_gradient_matches_finite_difference() {
    let model = vibronic();
    let h = 1e-6;
    for state in 0..2 {
        for &x in &[-1.0, 0.4, 1.3] {
            let numeric =
                (model.potential(&[x + h], state) - model.potential(&[x - h], state)) / (2.0 * h);
            let analytic = model.gradient(&[x], state)[0];
            assert!((numeric - analytic).abs() < 1e-6, "state={state} x={x}");
        }
    }
}

#[test]
fn vibronic_derivative_coupling_matches_finite_difference() {
    let model = vibronic();
    let h = 1e-6;
    let x = 0.4;
    let phi0 = model.adiabatic_vector(&[x], 0);
    let plus = model.adiabatic_vector(&[x + h], 1);
    let minus = model.adiabatic_vector(&[x - h], 1);
    let dphi1 = [(plus[0] - minus[0]) / (2.0 * h), (plus[1] - minus[1]) / (2.0 * h)];
    let numeric = phi0[0] * dphi1[0] + phi0[1] * dphi1[1];
    let analytic = model.derivative(&[x], 0, 1)[0];
    assert!((numeric - analytic).abs() < 1e-6);
    assert!((model.derivative(&[x], 1, 0)[0] + analytic).abs() < 1e-15);
}

#[test]
fn vibronic_coupling_scales_with_velocity() {
    let backend = IntegralBackend::Vibronic(vibronic());
    let slow = traj(0, vec![0.2], vec![0.5]);
    let fast = traj(0, vec![0.2], vec![1.0]);
    let c_slow = backend.eff_coup(&slow, 1);
    let c_fast = backend.eff_coup(&fast, 1);
    assert!(c_slow > 0.0);
    assert!((c_fast - 2.0 * c_slow).abs() < 1e-12);
}

#[test]
fn vibronic_electronic_overlap_enters_traj_overlap() {
    let backend = IntegralBackend::Vibronic(vibronic());
    let a = traj(0, vec![-1.0], vec![0.0]);
    let b = traj(1, vec![1.0], vec![0.0]);
    let full = backend.traj_overlap(&a, &b, false);
    let nuc = backend.traj_overlap(&a, &b, true);
    assert!(full.norm() < nuc.norm());
    assert_eq!(backend.overlap(&a, &b, false), Complex64::new(0.0, 0.0));
}

#[test]
fn backend_is_selected_by_yaml_tag() {
    let yaml = "type: vibronic\nomega: [1.0]\nkappa0: [-0.5]\nkappa1: [0.5]\nlambda: [0.1]\n";
    let backend: IntegralBackend = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(backend.name(), "vibronic");
    backend.validate(2, 1).unwrap();
    assert!(backend.validate(3, 1).is_err());
    assert!(backend.validate(2, 2).is_err());
}
