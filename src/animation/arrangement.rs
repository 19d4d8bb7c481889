//! Tree/scattered arrangement state machine.
//!
//! The machine is driven with plain timestamps (seconds since scene start)
//! instead of ambient timer callbacks. Each pending "timer" is a single
//! `Option<f32>` deadline, so rescheduling always replaces and never stacks.

/// The two spatial arrangements every decoration blends between.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arrangement {
    Scattered,
    Tree,
}

impl Arrangement {
    pub fn toggled(self) -> Self {
        match self {
            Arrangement::Scattered => Arrangement::Tree,
            Arrangement::Tree => Arrangement::Scattered,
        }
    }

    /// Blend factor instances are pulled toward: `1.0` is fully tree-shaped.
    pub fn target_factor(self) -> f32 {
        match self {
            Arrangement::Scattered => 0.0,
            Arrangement::Tree => 1.0,
        }
    }
}

/// Dwell and idle durations in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArrangementTimings {
    pub tree_dwell: f32,
    /// Covers the ~2s morph plus ~2s of settled rotation.
    pub scattered_dwell: f32,
    pub idle_resume: f32,
}

impl ArrangementTimings {
    pub fn dwell(&self, arrangement: Arrangement) -> f32 {
        match arrangement {
            Arrangement::Tree => self.tree_dwell,
            Arrangement::Scattered => self.scattered_dwell,
        }
    }
}

impl Default for ArrangementTimings {
    fn default() -> Self {
        Self {
            tree_dwell: 8.0,
            scattered_dwell: 4.0,
            idle_resume: 10.0,
        }
    }
}

/// Snapshot of the deadlines currently scheduled.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PendingTimers {
    pub transition: Option<f32>,
    pub resume: Option<f32>,
}

/// Auto-play controller for the scene arrangement.
///
/// In automatic mode exactly one transition deadline is pending. A user
/// action flips the arrangement, cancels that deadline and (re)arms a single
/// resume deadline; automatic mode only comes back once that resume deadline
/// passes without further actions.
#[derive(Clone, Debug)]
pub struct ArrangementMachine {
    current: Arrangement,
    auto: bool,
    timings: ArrangementTimings,
    transition_at: Option<f32>,
    resume_at: Option<f32>,
}

impl ArrangementMachine {
    pub fn new(now: f32, initial: Arrangement, timings: ArrangementTimings) -> Self {
        Self {
            current: initial,
            auto: true,
            timings,
            transition_at: Some(now + timings.dwell(initial)),
            resume_at: None,
        }
    }

    pub fn current(&self) -> Arrangement {
        self.current
    }

    pub fn is_auto(&self) -> bool {
        self.auto
    }

    pub fn timings(&self) -> &ArrangementTimings {
        &self.timings
    }

    pub fn pending(&self) -> PendingTimers {
        PendingTimers {
            transition: self.transition_at,
            resume: self.resume_at,
        }
    }

    /// Fire every deadline that has passed at `now`.
    ///
    /// Returns the new arrangement if an automatic transition happened.
    pub fn tick(&mut self, now: f32) -> Option<Arrangement> {
        if let Some(resume_at) = self.resume_at {
            if now >= resume_at {
                log::debug!("auto-play resumed at {now:.2}s");
                self.auto = true;
                self.resume_at = None;
                self.transition_at = Some(now + self.timings.dwell(self.current));
            }
        }

        match self.transition_at {
            Some(transition_at) if self.auto && now >= transition_at => {
                self.current = self.current.toggled();
                self.transition_at = Some(now + self.timings.dwell(self.current));
                log::debug!("auto transition to {:?} at {now:.2}s", self.current);
                Some(self.current)
            }
            _ => None,
        }
    }

    /// Flip immediately and suspend auto-play for the idle period.
    pub fn on_user_action(&mut self, now: f32) -> Arrangement {
        self.current = self.current.toggled();
        self.auto = false;
        self.transition_at = None;
        self.resume_at = Some(now + self.timings.idle_resume);
        log::debug!(
            "manual toggle to {:?}, auto-play resumes at {:.2}s",
            self.current,
            now + self.timings.idle_resume
        );
        self.current
    }
}
