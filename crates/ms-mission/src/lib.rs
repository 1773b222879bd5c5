//! Segment solve engine.
//!
//! A [`Mission`] is a sequence of [`Segment`]s. Each segment samples its
//! trajectory at Chebyshev control points, collects unknowns and residuals
//! from its [`Contributor`]s and drives the residuals to zero with a
//! pluggable root finder. The terminal state of one segment seeds the next.

pub mod conditions;
pub mod continuity;
pub mod contributor;
pub mod converge;
pub mod error;
pub mod iterate;
pub mod kinematics;
pub mod mission;
pub mod motion;
pub mod numerics;
pub mod profile;
pub mod segment;

pub use conditions::{Conditions, paths};
pub use continuity::{Seam, TerminalState, resolve_seam};
pub use contributor::Contributor;
pub use converge::{SegmentOutcome, SegmentStatus, converge};
pub use error::{MissionError, MissionResult};
pub use iterate::{SegmentState, iterate};
pub use kinematics::{update_acceleration, update_forces, update_kinematics, update_weights};
pub use mission::{ContinuityPolicy, Mission, MissionReport, SegmentReport};
pub use numerics::Numerics;
pub use profile::{Extent, Motion, Profile};
pub use segment::Segment;
