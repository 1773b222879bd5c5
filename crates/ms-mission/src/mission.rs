//! Sequencing of segments.

use crate::continuity::TerminalState;
use crate::converge::{SegmentOutcome, SegmentStatus};
use crate::error::{MissionError, MissionResult};
use crate::segment::Segment;
use tracing::{info, warn};

/// What to do when a segment follows one that failed to converge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ContinuityPolicy {
    /// Continue from the failed segment's terminal state, with a warning.
    #[default]
    Permissive,
    /// Refuse to initialize from a failed segment.
    Strict,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SegmentReport {
    pub tag: String,
    pub outcome: SegmentOutcome,
    pub terminal: TerminalState,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MissionReport {
    pub tag: String,
    pub segments: Vec<SegmentReport>,
}

impl MissionReport {
    pub fn all_converged(&self) -> bool {
        self.segments.iter().all(|s| s.outcome.is_converged())
    }

    /// Tags of segments that did not converge.
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.segments
            .iter()
            .filter(|s| !s.outcome.is_converged())
            .map(|s| s.tag.as_str())
    }

    pub fn segment(&self, tag: &str) -> Option<&SegmentReport> {
        self.segments.iter().find(|s| s.tag == tag)
    }
}

/// An ordered list of segments flown one after the other.
#[derive(Debug)]
pub struct Mission {
    tag: String,
    segments: Vec<Segment>,
    continuity: ContinuityPolicy,
}

impl Mission {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            segments: Vec::new(),
            continuity: ContinuityPolicy::default(),
        }
    }

    pub fn with_continuity(mut self, policy: ContinuityPolicy) -> Self {
        self.continuity = policy;
        self
    }

    pub fn with_segment(mut self, segment: Segment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn push(&mut self, segment: Segment) {
        self.segments.push(segment);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn continuity(&self) -> ContinuityPolicy {
        self.continuity
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment(&self, tag: &str) -> Option<&Segment> {
        self.segments.iter().find(|s| s.tag() == tag)
    }

    /// Solve every segment in order, seeding each from its predecessor.
    ///
    /// A segment that fails to converge does not stop the mission under
    /// [`ContinuityPolicy::Permissive`]. Errors abort immediately.
    pub fn evaluate(&mut self) -> MissionResult<MissionReport> {
        info!(mission = %self.tag, segments = self.segments.len(), "evaluating mission");
        let mut reports: Vec<SegmentReport> = Vec::with_capacity(self.segments.len());

        for segment in &mut self.segments {
            let previous = reports.last().map(|r| &r.terminal);
            if let Some(prev) = previous.filter(|p| p.status == SegmentStatus::Failed) {
                match self.continuity {
                    ContinuityPolicy::Strict => {
                        return Err(MissionError::configuration(format!(
                            "segment '{}' cannot continue from failed segment '{}'",
                            segment.tag(),
                            prev.segment
                        )));
                    }
                    ContinuityPolicy::Permissive => warn!(
                        segment = segment.tag(),
                        previous = %prev.segment,
                        "continuing from a segment that did not converge"
                    ),
                }
            }

            let outcome = segment.evaluate(previous)?;
            let terminal = segment.terminal_state()?;
            reports.push(SegmentReport {
                tag: segment.tag().to_string(),
                outcome,
                terminal,
            });
        }

        Ok(MissionReport {
            tag: self.tag.clone(),
            segments: reports,
        })
    }
}
