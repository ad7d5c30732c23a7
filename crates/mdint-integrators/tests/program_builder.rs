use mdint_core::{DynamicsEngine, HarmonicPotential, ReferenceEngine, RngHandle};
use mdint_integrators::builder::{
    accumulation, constraint_projection, post_step_bookkeeping, pre_step_bookkeeping,
    velocity_verlet,
};
use mdint_integrators::program::{EnergySource, PositionUpdate, VelocityUpdate};
use mdint_integrators::schedule::total_duration;
use mdint_integrators::{
    build_splitting_program, schedule, ConstraintToggles, ExecutionState, Instruction, Monitoring,
    Register, SplittingScheme, StepKind,
};
use proptest::prelude::*;

const DT: f64 = 0.002;

fn store(register: Register, source: EnergySource) -> Instruction {
    Instruction::StoreEnergy { register, source }
}

fn accumulate(target: Register, increment: Register, decrement: Register) -> Instruction {
    Instruction::Accumulate {
        target,
        increment,
        decrement,
    }
}

#[test]
fn baoab_without_flags_is_five_updates() {
    let scheme = SplittingScheme::baoab();
    let substeps = schedule(&scheme, DT);
    let program = build_splitting_program(&substeps, 0.5, Monitoring::OFF, ConstraintToggles::NONE);
    assert_eq!(
        program.instructions(),
        &[
            Instruction::velocity(VelocityUpdate::Kick { dt: DT / 2.0 }),
            Instruction::position(PositionUpdate::Drift { dt: DT / 2.0 }),
            Instruction::velocity(VelocityUpdate::OrnsteinUhlenbeck { b: 0.5 }),
            Instruction::position(PositionUpdate::Drift { dt: DT / 2.0 }),
            Instruction::velocity(VelocityUpdate::Kick { dt: DT / 2.0 }),
        ]
    );
}

#[test]
fn fully_monitored_baoab_emits_stages_in_order() {
    let scheme = SplittingScheme::baoab();
    let substeps = schedule(&scheme, DT);
    let monitoring = Monitoring {
        work: true,
        heat: true,
    };
    let program = build_splitting_program(&substeps, 0.5, monitoring, ConstraintToggles::ALL);

    let kick = [
        store(Register::OldKe, EnergySource::Kinetic),
        Instruction::velocity(VelocityUpdate::Kick { dt: DT / 2.0 }),
        Instruction::ProjectVelocities,
        accumulate(Register::ShadowWork, Register::NewKe, Register::OldKe),
    ];
    let drift = [
        store(Register::OldPe, EnergySource::Potential),
        Instruction::position(PositionUpdate::Drift { dt: DT / 2.0 }),
        Instruction::ProjectPositions,
        store(Register::NewPe, EnergySource::Potential),
        accumulate(Register::ShadowWork, Register::NewPe, Register::OldPe),
    ];
    let stochastic = [
        store(Register::OldKe, EnergySource::Kinetic),
        Instruction::velocity(VelocityUpdate::OrnsteinUhlenbeck { b: 0.5 }),
        Instruction::ProjectVelocities,
        store(Register::NewKe, EnergySource::Kinetic),
        accumulate(Register::Heat, Register::NewKe, Register::OldKe),
    ];
    let expected: Vec<Instruction> = kick
        .iter()
        .chain(&drift)
        .chain(&stochastic)
        .chain(&drift)
        .chain(&kick)
        .copied()
        .collect();
    assert_eq!(program.instructions(), expected.as_slice());
}

#[test]
fn emission_stages_follow_flags() {
    let work_only = Monitoring {
        work: true,
        heat: false,
    };
    let heat_only = Monitoring {
        work: false,
        heat: true,
    };

    assert!(pre_step_bookkeeping(StepKind::Drift, heat_only).is_empty());
    assert_eq!(pre_step_bookkeeping(StepKind::Kick, heat_only).len(), 1);
    assert_eq!(pre_step_bookkeeping(StepKind::Drift, work_only).len(), 1);
    assert!(pre_step_bookkeeping(StepKind::Stochastic, Monitoring::OFF).is_empty());

    assert_eq!(accumulation(StepKind::Kick, heat_only), None);
    assert_eq!(accumulation(StepKind::Stochastic, work_only), None);
    assert!(post_step_bookkeeping(StepKind::Stochastic, work_only).is_some());
    assert_eq!(post_step_bookkeeping(StepKind::Kick, work_only), None);

    let positions_only = ConstraintToggles {
        positions: true,
        velocities: false,
    };
    assert_eq!(
        constraint_projection(StepKind::Drift, positions_only),
        Some(Instruction::ProjectPositions)
    );
    assert_eq!(constraint_projection(StepKind::Kick, positions_only), None);
    assert_eq!(constraint_projection(StepKind::Stochastic, ConstraintToggles::NONE), None);
}

#[test]
fn velocity_only_constraints_project_after_kicks_and_noise() {
    let scheme = SplittingScheme::baoab();
    let substeps = schedule(&scheme, DT);
    let velocities_only = ConstraintToggles {
        positions: false,
        velocities: true,
    };
    let program = build_splitting_program(&substeps, 0.5, Monitoring::OFF, velocities_only);
    assert_eq!(
        program.instructions(),
        &[
            Instruction::velocity(VelocityUpdate::Kick { dt: DT / 2.0 }),
            Instruction::ProjectVelocities,
            Instruction::position(PositionUpdate::Drift { dt: DT / 2.0 }),
            Instruction::velocity(VelocityUpdate::OrnsteinUhlenbeck { b: 0.5 }),
            Instruction::ProjectVelocities,
            Instruction::position(PositionUpdate::Drift { dt: DT / 2.0 }),
            Instruction::velocity(VelocityUpdate::Kick { dt: DT / 2.0 }),
            Instruction::ProjectVelocities,
        ]
    );
    assert!(!program.instructions().contains(&Instruction::ProjectPositions));
}

#[test]
fn register_names_match_serialized_form() {
    for register in [
        Register::OldKe,
        Register::NewKe,
        Register::OldPe,
        Register::NewPe,
        Register::ShadowWork,
        Register::Heat,
    ] {
        assert_eq!(
            serde_json::to_string(&register).unwrap(),
            format!("\"{}\"", register.name())
        );
    }
}

#[test]
fn velocity_verlet_template_shape() {
    let template = velocity_verlet(DT);
    assert_eq!(
        template[0],
        Instruction::velocity(VelocityUpdate::Kick { dt: DT / 2.0 })
    );
    assert_eq!(template[1], Instruction::position(PositionUpdate::Drift { dt: DT }));
    assert_eq!(template[3], Instruction::ProjectPositions);
    assert_eq!(template[6], Instruction::ProjectVelocities);
}

#[test]
fn drift_work_matches_potential_change() {
    let mut engine = ReferenceEngine::new(
        vec![1.0],
        HarmonicPotential::new(100.0),
        RngHandle::from_seed(3),
    )
    .unwrap();
    engine.set_positions(&[0.1]).unwrap();
    engine.set_velocities(&[2.0]).unwrap();

    let scheme = SplittingScheme::parse("ABO").unwrap();
    let substeps = schedule(&scheme, DT);
    let monitoring = Monitoring {
        work: true,
        heat: true,
    };
    let program = build_splitting_program(&substeps, 1.0, monitoring, ConstraintToggles::NONE);
    let mut state = ExecutionState::new(2.5, monitoring);

    let pe_before = engine.potential_energy();
    let ke_before = engine.kinetic_energy();
    program.execute(&mut engine, &mut state);

    let ledger = state.ledger();
    let drifted = 0.1 + DT * 2.0;
    let pe_after = 0.5 * 100.0 * drifted * drifted;
    assert!((ledger.get(Register::NewPe) - pe_after).abs() < 1e-12);
    assert!((ledger.get(Register::OldPe) - pe_before).abs() < 1e-12);
    // The kick reads new_ke before any stochastic step has written it.
    let expected_work = (pe_after - pe_before) + (0.0 - ke_before);
    assert!((ledger.shadow_work().unwrap() - expected_work).abs() < 1e-9);
    // b = 1 leaves velocities untouched in the O step.
    assert_eq!(ledger.heat(), Some(0.0));
}

fn scheme_with_counts() -> impl Strategy<Value = (String, usize, usize)> {
    (1usize..6, 1usize..6).prop_flat_map(|(n_drift, n_kick)| {
        let mut symbols = vec!['A'; n_drift];
        symbols.extend(std::iter::repeat('B').take(n_kick));
        symbols.push('O');
        Just(symbols)
            .prop_shuffle()
            .prop_map(move |symbols| (symbols.into_iter().collect(), n_drift, n_kick))
    })
}

proptest! {
    #[test]
    fn substep_durations_telescope(
        (text, n_drift, n_kick) in scheme_with_counts(),
        timestep in 1.0e-4f64..1.0e-2,
    ) {
        let scheme = SplittingScheme::parse(&text).unwrap();
        let substeps = schedule(&scheme, timestep);
        prop_assert_eq!(substeps.len(), n_drift + n_kick + 1);

        let tolerance = 1.0e-12 * timestep;
        prop_assert!((total_duration(&substeps, StepKind::Drift) - timestep).abs() <= tolerance);
        prop_assert!((total_duration(&substeps, StepKind::Kick) - timestep).abs() <= tolerance);
        prop_assert_eq!(total_duration(&substeps, StepKind::Stochastic), timestep);

        for (substep, kind) in substeps.iter().zip(scheme.steps()) {
            prop_assert_eq!(substep.kind, *kind);
            prop_assert!((substep.duration - substep.fraction * timestep).abs() <= tolerance);
        }
    }
}
