mod common;

use common::*;
use ms_core::units::{kg, m, mps, s};
use ms_mission::{
    Conditions, Contributor, MissionError, MissionResult, Profile, Segment, motion, paths,
};
use ms_solver::Registry;

/// Writes a residual under the segment's force-balance name.
struct Impostor;

impl Contributor for Impostor {
    fn tag(&self) -> &str {
        "impostor"
    }

    fn append_unknowns(&self, _n_points: usize, unknowns: &mut Registry) -> MissionResult<()> {
        unknowns.declare("impostor_u", vec![0.0])?;
        Ok(())
    }

    fn compute(&self, _conditions: &mut Conditions) -> MissionResult<()> {
        Ok(())
    }

    fn append_residuals(&self, _conditions: &Conditions, residuals: &mut Registry) -> MissionResult<()> {
        residuals.upsert(motion::FORCES, &[0.0])?;
        Ok(())
    }
}

fn accelerating(time_guess: f64) -> Segment {
    let profile = Profile::accelerating(mps(40.0), mps(60.0), s(time_guess))
        .with_altitude(m(500.0))
        .with_initial_mass(kg(3_000.0));
    Segment::new("accelerate", profile).with_numerics(numerics(5))
}

#[test]
fn accelerating_segment_solves_for_elapsed_time() {
    // 600 N on 3000 kg: a = 0.2 m/s², 40 -> 60 m/s in 100 s over 5 km.
    let mut seg = accelerating(50.0).with_contributor(Thruster { force: 600.0 });

    let outcome = seg.evaluate(None).unwrap();
    assert!(outcome.is_converged(), "{outcome:?}");

    let state = seg.state().unwrap();
    let elapsed = state.unknowns.require(motion::ELAPSED_TIME).unwrap()[0];
    assert!((elapsed - 100.0).abs() < 1e-5, "elapsed = {elapsed}");
    let a = state.unknowns.require(motion::ACCELERATION).unwrap();
    assert!(a.iter().all(|a| (a - 0.2).abs() < 1e-6));

    let terminal = seg.terminal_state().unwrap();
    assert!((terminal.scalar(paths::TIME).unwrap() - elapsed).abs() < 1e-9);
    assert!((terminal.scalar(paths::VELOCITY).unwrap() - 60.0).abs() < 1e-6);
    assert!((terminal.scalar(paths::RANGE).unwrap() - 5_000.0).abs() < 1e-3);
    assert!((terminal.scalar(paths::ALTITUDE).unwrap() - 500.0).abs() < 1e-9);
}

#[test]
fn accelerating_segment_declares_its_own_unknowns_first() {
    let mut seg = accelerating(50.0).with_contributor(Thruster { force: 600.0 });
    seg.initialize(None).unwrap();

    let state = seg.state().unwrap();
    let names: Vec<&str> = state.unknowns.names().collect();
    assert_eq!(names, [motion::ACCELERATION, motion::ELAPSED_TIME]);
    let residuals: Vec<&str> = state.residuals.names().collect();
    assert_eq!(residuals, [motion::FORCES, motion::FINAL_VELOCITY_ERROR]);
    assert_eq!(state.unknowns.total_len(), 6);
}

#[test]
fn accelerating_segment_clock_follows_the_guess() {
    let mut seg = accelerating(80.0).with_contributor(Thruster { force: 600.0 });
    seg.initialize(None).unwrap();

    let time = seg.conditions().unwrap().scalar(paths::TIME).unwrap();
    assert_eq!(time[0], 0.0);
    assert!((time[4] - 80.0).abs() < 1e-12);
}

#[test]
fn constant_mach_speed_follows_speed_of_sound() {
    let profile = Profile::constant_mach(m(30_000.0), 0.5)
        .with_altitude(m(2_000.0))
        .with_initial_mass(kg(2_000.0));
    let mut seg = Segment::new("cruise", profile)
        .with_numerics(numerics(6))
        .with_contributor(SoundSpeed(300.0))
        .with_contributor(Target::new("offset", 5.0));

    let outcome = seg.evaluate(None).unwrap();
    assert!(outcome.is_converged());

    let c = seg.conditions().unwrap();
    let vx = c.column(paths::VELOCITY, 0).unwrap();
    assert!(vx.iter().all(|v| *v == 150.0));
    let terminal = seg.terminal_state().unwrap();
    assert!((terminal.scalar(paths::TIME).unwrap() - 200.0).abs() < 1e-9);
    assert!((terminal.scalar(paths::RANGE).unwrap() - 30_000.0).abs() < 1e-6);
    assert!(c.entry(paths::ACCELERATION).unwrap().amax() < 1e-8);
}

#[test]
fn constant_mach_without_speed_of_sound_is_configuration_error() {
    let profile = Profile::constant_mach(m(30_000.0), 0.5)
        .with_altitude(m(2_000.0))
        .with_initial_mass(kg(2_000.0));
    let mut seg = Segment::new("cruise", profile)
        .with_numerics(numerics(6))
        .with_contributor(Target::new("offset", 5.0));

    let err = seg.initialize(None).unwrap_err();
    assert!(matches!(err, MissionError::Configuration { .. }));
    assert!(err.to_string().contains("speed of sound"));
    assert!(seg.state().is_none());
}

#[test]
fn residual_named_like_the_force_balance_is_rejected() {
    let mut seg = accelerating(50.0)
        .with_contributor(Thruster { force: 600.0 })
        .with_contributor(Impostor);

    let err = seg.initialize(None).unwrap_err();
    assert!(err.to_string().contains("declared twice"));
}
