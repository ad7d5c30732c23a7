use mdint_core::{thermal_energy, DynamicsEngine, HarmonicPotential, ReferenceEngine, RngHandle};
use mdint_integrators::{
    mean_with_standard_error, velocity_mixing, ConstraintToggles, Integrator,
    LangevinSplittingConfig, LangevinSplittingIntegrator, Monitoring, SplittingScheme,
};

const ARGON_MASS: f64 = 39.948;

fn argon(dofs: usize, seed: u64) -> ReferenceEngine {
    ReferenceEngine::new(
        vec![ARGON_MASS; dofs],
        HarmonicPotential::new(100.0),
        RngHandle::from_seed(seed),
    )
    .unwrap()
}

#[test]
fn baoab_harmonic_oscillator_samples_kinetic_energy() {
    let temperature = 298.0;
    let config = LangevinSplittingConfig {
        temperature,
        collision_rate: 91.0,
        timestep: 0.002,
        splitting: SplittingScheme::baoab(),
        constraints: ConstraintToggles::NONE,
        monitoring: Monitoring::OFF,
    };
    let mut integrator = LangevinSplittingIntegrator::new(&config).unwrap();
    let mut engine = argon(1, 298);
    engine.set_velocities_to_temperature(temperature).unwrap();

    let mut kinetic = Vec::with_capacity(1000);
    for _ in 0..1000 {
        integrator.step(&mut engine, 1);
        assert!(engine.potential_energy().is_finite());
        kinetic.push(engine.kinetic_energy());
    }

    let estimate = mean_with_standard_error(&kinetic).unwrap();
    let expected = 0.5 * thermal_energy(temperature);
    assert!(
        (estimate.mean - expected).abs() < 3.0 * estimate.standard_error,
        "mean KE {} vs {} (se {})",
        estimate.mean,
        expected,
        estimate.standard_error
    );
    assert!((engine.time() - 2.0).abs() < 1e-9);
}

#[test]
fn defaults_follow_md_units() {
    let config = LangevinSplittingConfig::default();
    assert_eq!(config.temperature, 298.0);
    assert_eq!(config.collision_rate, 91.0);
    assert!((config.timestep - 0.001).abs() < 1e-15);
    assert_eq!(config.splitting.to_string(), "BAOAB");
    assert_eq!(config.constraints, ConstraintToggles::ALL);
    assert_eq!(config.monitoring, Monitoring::OFF);

    let integrator = LangevinSplittingIntegrator::new(&config).unwrap();
    assert_eq!(integrator.velocity_mixing(), velocity_mixing(91.0, 0.001));
    assert!((integrator.thermal_energy() - thermal_energy(298.0)).abs() < 1e-15);
    assert_eq!(integrator.substeps().len(), 5);
    assert_eq!(integrator.name(), "langevin-splitting");
}

#[test]
fn unmonitored_integrator_exposes_no_bookkeeping() {
    let integrator = LangevinSplittingIntegrator::new(&LangevinSplittingConfig::default()).unwrap();
    assert!(integrator.ledger().is_none());
    assert_eq!(integrator.shadow_work(), None);
    assert_eq!(integrator.heat(), None);
    assert!(integrator.statistics().is_none());
}

#[test]
fn monitored_work_and_heat_persist_until_reset() {
    let config = LangevinSplittingConfig {
        monitoring: Monitoring {
            work: true,
            heat: true,
        },
        constraints: ConstraintToggles::NONE,
        ..LangevinSplittingConfig::default()
    };
    let mut integrator = LangevinSplittingIntegrator::new(&config).unwrap();
    let mut engine = argon(3, 7);
    engine.set_velocities_to_temperature(298.0).unwrap();

    integrator.step(&mut engine, 10);
    let work = integrator.shadow_work().unwrap();
    let heat = integrator.heat().unwrap();
    assert!(work.is_finite());
    assert!(heat.is_finite());
    assert_ne!(heat, 0.0);

    integrator.step(&mut engine, 1);
    assert_ne!(integrator.heat().unwrap(), heat);
    assert!(integrator.ledger().is_some());

    integrator.reset_bookkeeping();
    assert_eq!(integrator.shadow_work(), Some(0.0));
    assert_eq!(integrator.heat(), Some(0.0));
}

#[test]
fn frozen_dofs_stay_put() {
    let mut integrator =
        LangevinSplittingIntegrator::new(&LangevinSplittingConfig::default()).unwrap();
    let mut engine = argon(3, 11);
    engine.set_positions(&[0.1, -0.2, 0.3]).unwrap();
    engine.freeze(1).unwrap();
    engine.set_velocities_to_temperature(298.0).unwrap();

    integrator.step(&mut engine, 50);
    assert_eq!(engine.positions()[1], -0.2);
    assert_eq!(engine.velocities()[1], 0.0);
    assert_ne!(engine.positions()[0], 0.1);
    assert_eq!(engine.context_updates(), 50);
}

#[test]
fn zero_friction_conserves_energy_closely() {
    let config = LangevinSplittingConfig {
        collision_rate: 0.0,
        timestep: 0.001,
        ..LangevinSplittingConfig::default()
    };
    let mut integrator = LangevinSplittingIntegrator::new(&config).unwrap();
    assert_eq!(integrator.velocity_mixing(), 1.0);

    let mut engine = argon(2, 13);
    engine.set_positions(&[0.1, -0.1]).unwrap();
    engine.set_velocities_to_temperature(298.0).unwrap();
    let initial = engine.kinetic_energy() + engine.potential_energy();
    integrator.step(&mut engine, 500);
    let last = engine.kinetic_energy() + engine.potential_energy();
    assert!((last - initial).abs() < 1e-3 * initial.abs().max(1.0));
}

#[test]
fn invalid_parameters_are_rejected() {
    for config in [
        LangevinSplittingConfig {
            temperature: -1.0,
            ..LangevinSplittingConfig::default()
        },
        LangevinSplittingConfig {
            collision_rate: -0.5,
            ..LangevinSplittingConfig::default()
        },
        LangevinSplittingConfig {
            timestep: 0.0,
            ..LangevinSplittingConfig::default()
        },
    ] {
        let err = LangevinSplittingIntegrator::new(&config).unwrap_err();
        assert!(err.to_string().starts_with("configuration error:"));
    }
}
