use mdint_core::{
    thermal_energy, DynamicsEngine, HarmonicPotential, IntegratorError, ReferenceEngine, RngHandle,
};

fn engine(dofs: usize) -> ReferenceEngine {
    ReferenceEngine::new(
        vec![2.0; dofs],
        HarmonicPotential::new(100.0),
        RngHandle::from_seed(5),
    )
    .unwrap()
}

#[test]
fn forces_follow_position_writes() {
    let mut engine = engine(2);
    assert_eq!(engine.forces(), &[0.0, 0.0]);

    engine.positions_mut()[0] = 0.1;
    let forces = engine.forces().to_vec();
    assert!((forces[0] + 10.0).abs() < 1e-12);
    assert_eq!(forces[1], 0.0);
    assert!((engine.potential_energy() - 0.5).abs() < 1e-12);
}

#[test]
fn kinetic_energy_uses_masses() {
    let mut engine = engine(2);
    engine.set_velocities(&[1.0, -2.0]).unwrap();
    assert!((engine.kinetic_energy() - 5.0).abs() < 1e-12);
}

#[test]
fn projections_are_idempotent() {
    let mut engine = engine(3);
    engine.set_positions(&[0.5, 0.25, -0.5]).unwrap();
    engine.freeze(1).unwrap();
    engine.positions_mut()[1] = 3.0;
    engine.set_velocities(&[1.0, 1.0, 1.0]).unwrap();

    engine.project_positions();
    engine.project_velocities();
    let once = (engine.positions().to_vec(), engine.velocities().to_vec());
    engine.project_positions();
    engine.project_velocities();
    let twice = (engine.positions().to_vec(), engine.velocities().to_vec());

    assert_eq!(once, twice);
    assert_eq!(once.0, vec![0.5, 0.25, -0.5]);
    assert_eq!(once.1, vec![1.0, 0.0, 1.0]);
}

#[test]
fn freezing_unknown_dof_is_rejected() {
    let mut engine = engine(1);
    let err = engine.freeze(4).unwrap_err();
    assert!(matches!(err, IntegratorError::Configuration(_)));
    assert_eq!(err.info().code, "dof-out-of-range");
}

#[test]
fn negative_masses_are_rejected() {
    let err = ReferenceEngine::new(
        vec![1.0, -1.0],
        HarmonicPotential::new(1.0),
        RngHandle::from_seed(0),
    )
    .unwrap_err();
    assert_eq!(err.info().code, "invalid-mass");
    assert_eq!(err.info().context.get("dof").map(String::as_str), Some("1"));
}

#[test]
fn length_mismatch_is_reported() {
    let mut engine = engine(2);
    let err = engine.set_positions(&[1.0]).unwrap_err();
    assert_eq!(err.info().code, "length-mismatch");
}

#[test]
fn maxwell_boltzmann_velocities_match_temperature() {
    let dofs = 20_000;
    let mut engine = engine(dofs);
    engine.set_velocities_to_temperature(300.0).unwrap();
    let kt = thermal_energy(300.0);
    let per_dof = engine.kinetic_energy() / dofs as f64;
    // <KE> per DOF is kT/2 with relative spread sqrt(2/N).
    assert!((per_dof / (0.5 * kt) - 1.0).abs() < 5.0 * (2.0 / dofs as f64).sqrt());
}

#[test]
fn thermal_velocities_reject_unphysical_temperatures() {
    let mut engine = engine(3);
    engine.set_velocities(&[0.1, 0.2, 0.3]).unwrap();
    for temperature in [-10.0, 0.0, f64::NAN, f64::INFINITY] {
        let err = engine.set_velocities_to_temperature(temperature).unwrap_err();
        assert_eq!(err.info().code, "non-positive-temperature");
        assert_eq!(
            err.info().context.get("parameter").map(String::as_str),
            Some("temperature")
        );
    }
    assert_eq!(engine.velocities(), &[0.1, 0.2, 0.3]);
}

#[test]
fn hooks_and_clock_are_tracked() {
    let mut engine = engine(1);
    engine.update_context_state();
    engine.update_context_state();
    engine.advance_time(0.002);
    assert_eq!(engine.context_updates(), 2);
    assert!((engine.time() - 0.002).abs() < 1e-15);
}
