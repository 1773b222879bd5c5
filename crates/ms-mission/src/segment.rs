//! A single trajectory segment.

use crate::conditions::{Conditions, paths};
use crate::continuity::{TerminalState, resolve_seam};
use crate::contributor::Contributor;
use crate::converge::{SegmentOutcome, SegmentStatus, converge};
use crate::error::{MissionError, MissionResult};
use crate::iterate::{SegmentState, iterate};
use crate::kinematics::{update_acceleration, update_kinematics};
use crate::motion;
use crate::numerics::Numerics;
use crate::profile::{Motion, Profile};
use ms_core::units::constants::G0_MPS2;
use ms_solver::{Discretization, QuasiNewton, Registry, RootFinder};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

/// One phase of a mission, solved exactly once.
///
/// `initialize` builds the conditions from the profile and the previous
/// segment's terminal state and collects every contributor's unknowns and
/// residuals; `solve` then runs the root finder. After solving the segment
/// is frozen and only its [`TerminalState`] is used further.
pub struct Segment {
    tag: String,
    profile: Profile,
    numerics: Numerics,
    contributors: Vec<Box<dyn Contributor>>,
    root_finder: Box<dyn RootFinder>,
    state: Option<SegmentState>,
    outcome: Option<SegmentOutcome>,
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let contributors: Vec<&str> = self.contributors.iter().map(|c| c.tag()).collect();
        f.debug_struct("Segment")
            .field("tag", &self.tag)
            .field("profile", &self.profile)
            .field("numerics", &self.numerics)
            .field("contributors", &contributors)
            .field("root_finder", &self.root_finder.name())
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl Segment {
    pub fn new(tag: impl Into<String>, profile: Profile) -> Self {
        Self {
            tag: tag.into(),
            profile,
            numerics: Numerics::default(),
            contributors: Vec::new(),
            root_finder: Box::new(QuasiNewton::default()),
            state: None,
            outcome: None,
        }
    }

    pub fn with_numerics(mut self, numerics: Numerics) -> Self {
        self.numerics = numerics;
        self
    }

    pub fn with_root_finder(mut self, root_finder: Box<dyn RootFinder>) -> Self {
        self.root_finder = root_finder;
        self
    }

    pub fn with_contributor(mut self, contributor: impl Contributor + 'static) -> Self {
        self.contributors.push(Box::new(contributor));
        self
    }

    /// Append a contributor; contributors run in the order they are added.
    pub fn push_contributor(&mut self, contributor: Box<dyn Contributor>) {
        self.contributors.push(contributor);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn numerics(&self) -> &Numerics {
        &self.numerics
    }

    pub fn contributors(&self) -> &[Box<dyn Contributor>] {
        &self.contributors
    }

    pub fn status(&self) -> SegmentStatus {
        self.outcome
            .as_ref()
            .map_or(SegmentStatus::Unsolved, SegmentOutcome::status)
    }

    pub fn outcome(&self) -> Option<&SegmentOutcome> {
        self.outcome.as_ref()
    }

    pub fn state(&self) -> Option<&SegmentState> {
        self.state.as_ref()
    }

    pub fn conditions(&self) -> Option<&Conditions> {
        self.state.as_ref().map(|s| &s.conditions)
    }

    /// Build conditions, seam values and registries.
    ///
    /// # Errors
    /// Configuration errors (missing boundary parameter, duplicate
    /// declarations, a non-square unknowns/residuals system) and
    /// non-finite residuals at the initial guess.
    pub fn initialize(&mut self, previous: Option<&TerminalState>) -> MissionResult<()> {
        if self.status() != SegmentStatus::Unsolved {
            return Err(MissionError::configuration(format!(
                "segment '{}' has already been solved",
                self.tag
            )));
        }

        let n = self.numerics.number_of_control_points;
        self.profile.check_motion()?;
        // Constant-Mach speed needs the atmosphere; start on the unit clock.
        let mach = matches!(self.profile.motion, Motion::ConstantMach { .. });
        let duration = if mach { 1.0 } else { self.profile.duration()? };
        let dimensionless = Discretization::chebyshev(n)?;
        let time = dimensionless.rescale(duration)?;
        let seam = resolve_seam(&self.profile, previous)?;

        let mut conditions = Conditions::new(n);
        for path in [
            paths::POSITION,
            paths::VELOCITY,
            paths::ACCELERATION,
            paths::GRAVITY_FORCE,
            paths::TOTAL_FORCE,
        ] {
            conditions.declare(path, 3)?;
        }
        for path in [
            paths::TIME,
            paths::RANGE,
            paths::TOTAL_MASS,
            paths::MASS_RATE,
            paths::ALTITUDE,
            paths::GRAVITY,
            paths::AIRSPEED,
        ] {
            conditions.declare(path, 1)?;
        }

        conditions.set_initial(paths::TIME, &[seam.time])?;
        conditions.set_initial(paths::POSITION, &seam.position)?;
        conditions.set_initial(paths::RANGE, &[seam.range])?;
        conditions.fill_column(paths::TOTAL_MASS, 0, seam.mass)?;
        conditions.fill_column(paths::GRAVITY, 0, G0_MPS2)?;
        set_speed(&mut conditions, &time, &self.profile, self.profile.speed.value)?;

        let mut tags = HashSet::new();
        for contributor in &self.contributors {
            if !tags.insert(contributor.tag()) {
                return Err(MissionError::configuration(format!(
                    "contributor '{}' appears twice in segment '{}'",
                    contributor.tag(),
                    self.tag
                )));
            }
            contributor.append_conditions(&mut conditions)?;
        }

        let mut unknowns = Registry::unknowns();
        motion::append_unknowns(
            &self.profile.motion,
            n,
            duration,
            self.profile.speed.value,
            &mut unknowns,
        )?;
        let mut mass_flow_paths = Vec::new();
        let mut force_paths = Vec::new();
        for contributor in &self.contributors {
            contributor.append_unknowns(n, &mut unknowns)?;
            if let Some(path) = contributor.mass_flow_path() {
                conditions.entry(&path)?;
                mass_flow_paths.push(path);
            }
            if let Some(path) = contributor.force_path() {
                conditions.entry(&path)?;
                force_paths.push(path);
            }
        }

        let mut state = SegmentState {
            conditions,
            unknowns,
            residuals: Registry::residuals(),
            dimensionless,
            time,
            mass_flow_paths,
            force_paths,
            motion: self.profile.motion,
        };

        // First pass declares the residuals.
        let x0 = state.unknowns.pack();
        iterate(&self.contributors, &mut state, &x0)?;
        check_square(&self.tag, &state.unknowns, &state.residuals)?;
        state.unknowns.seal();
        state.residuals.seal();

        if mach {
            self.resolve_mach(&mut state)?;
            iterate(&self.contributors, &mut state, &x0)?;
        }

        debug!(
            segment = %self.tag,
            duration = state.time.control_points[n - 1],
            control_points = n,
            unknowns = state.unknowns.total_len(),
            "segment initialized"
        );
        self.state = Some(state);
        Ok(())
    }

    /// Fix the speed of a constant-Mach segment from the speed of sound at
    /// its first control point and rescale the clock to match.
    fn resolve_mach(&self, state: &mut SegmentState) -> MissionResult<()> {
        if !state.conditions.contains(paths::SPEED_OF_SOUND) {
            return Err(MissionError::configuration(format!(
                "constant-Mach segment '{}' needs the speed of sound; add an atmosphere contributor",
                self.tag
            )));
        }
        let speed_of_sound = state.conditions.entry(paths::SPEED_OF_SOUND)?[(0, 0)];
        let speed = self.profile.mach_speed(speed_of_sound)?;
        let duration = self.profile.duration_at(speed)?;
        state.time = state.dimensionless.rescale(duration)?;
        set_speed(&mut state.conditions, &state.time, &self.profile, speed)?;
        debug!(segment = %self.tag, speed, duration, "constant-Mach speed resolved");
        Ok(())
    }

    /// Run the root finder on an initialized segment.
    pub fn solve(&mut self) -> MissionResult<SegmentOutcome> {
        if self.status() != SegmentStatus::Unsolved {
            return Err(MissionError::configuration(format!(
                "segment '{}' has already been solved",
                self.tag
            )));
        }
        let state = self.state.as_mut().ok_or_else(|| {
            MissionError::configuration(format!("segment '{}' has not been initialized", self.tag))
        })?;

        info!(segment = %self.tag, solver = self.root_finder.name(), "solving segment");
        let outcome = converge(
            &self.tag,
            &self.contributors,
            state,
            &self.numerics,
            self.root_finder.as_ref(),
        )?;
        self.outcome = Some(outcome.clone());
        Ok(outcome)
    }

    /// Initialize from `previous` and solve.
    pub fn evaluate(&mut self, previous: Option<&TerminalState>) -> MissionResult<SegmentOutcome> {
        self.initialize(previous)?;
        self.solve()
    }

    /// Final-control-point slice of a solved segment.
    pub fn terminal_state(&self) -> MissionResult<TerminalState> {
        let status = self.status();
        let state = match (&self.state, status) {
            (Some(state), SegmentStatus::Converged | SegmentStatus::Failed) => state,
            _ => {
                return Err(MissionError::configuration(format!(
                    "segment '{}' has not been solved",
                    self.tag
                )));
            }
        };
        Ok(TerminalState {
            segment: self.tag.clone(),
            status,
            values: state.conditions.terminal(),
        })
    }
}

/// Write the clock and a constant velocity at horizontal `speed`, then
/// integrate position and range.
fn set_speed(
    conditions: &mut Conditions,
    time: &Discretization,
    profile: &Profile,
    speed: f64,
) -> MissionResult<()> {
    let t0 = conditions.entry(paths::TIME)?[(0, 0)];
    conditions.set_scalar(paths::TIME, &time.control_points.add_scalar(t0))?;
    let velocity = profile.velocity_at(speed);
    for (axis, v) in velocity.into_iter().enumerate() {
        conditions.fill_column(paths::VELOCITY, axis, v)?;
    }
    let airspeed = velocity.iter().map(|v| v * v).sum::<f64>().sqrt();
    conditions.fill_column(paths::AIRSPEED, 0, airspeed)?;
    update_kinematics(time, conditions)?;
    update_acceleration(time, conditions)
}

fn check_square(tag: &str, unknowns: &Registry, residuals: &Registry) -> MissionResult<()> {
    if unknowns.len() != residuals.len() || unknowns.total_len() != residuals.total_len() {
        return Err(MissionError::configuration(format!(
            "segment '{tag}' declares {} unknowns ({} values) but {} residuals ({} values)",
            unknowns.len(),
            unknowns.total_len(),
            residuals.len(),
            residuals.total_len()
        )));
    }
    Ok(())
}
