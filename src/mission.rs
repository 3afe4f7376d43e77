use std::collections::HashMap;

use log::debug;

use crate::error::MissionError;

// ---------------------------------------------------------------------------
// Mission steps
// ---------------------------------------------------------------------------

/// What a mission step reports after one increment of work.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSignal {
    /// Keep running; call again next tick.
    Continue,
    /// Switch to the named state. The empty name is the terminal state.
    TransitionTo(String),
}

/// One resumable increment of mission logic. The engine holds the step across
/// ticks and advances it exactly once per [`MissionStateMachine::update`].
pub trait MissionStep {
    /// Runs one increment. `None` means the step fell off its end without
    /// choosing a successor, which the engine reports as a defect: a step
    /// must always say what happens next.
    fn advance(&mut self) -> Option<StepSignal>;
}

/// Closures can serve directly as steps, which keeps simple states terse.
impl<F> MissionStep for F
where
    F: FnMut() -> Option<StepSignal>,
{
    fn advance(&mut self) -> Option<StepSignal> {
        self()
    }
}

pub type StepFactory = Box<dyn Fn() -> Box<dyn MissionStep>>;

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Cooperative mission sequencer: named states map to step factories, and one
/// step increment runs per update. The empty state name is terminal and is
/// the only state without a factory.
pub struct MissionStateMachine {
    states: HashMap<String, StepFactory>,
    current: String,
    step: Option<Box<dyn MissionStep>>,
}

impl MissionStateMachine {
    /// Creates the machine parked in `initial`. The first step is not built
    /// until the first [`update`](Self::update).
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            states: HashMap::new(),
            current: initial.into(),
            step: None,
        }
    }

    /// Registers a state, builder style.
    pub fn state<F, S>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> S + 'static,
        S: MissionStep + 'static,
    {
        self.states
            .insert(name.into(), Box::new(move || Box::new(factory())));
        self
    }

    pub fn current_state(&self) -> &str {
        &self.current
    }

    /// Forces a state switch, discarding any in-progress step. A step resumed
    /// after this starts from its beginning.
    pub fn set_state(&mut self, name: impl Into<String>) {
        self.current = name.into();
        self.step = None;
    }

    pub fn is_finished(&self) -> bool {
        self.current.is_empty()
    }

    /// Advances the active step by exactly one increment. Returns true once
    /// the terminal state is reached. On a transition the successor's step is
    /// not instantiated until the next call.
    pub fn update(&mut self) -> Result<bool, MissionError> {
        if self.current.is_empty() {
            return Ok(true);
        }
        if self.step.is_none() {
            let factory = self
                .states
                .get(&self.current)
                .ok_or_else(|| MissionError::UnknownState(self.current.clone()))?;
            self.step = Some(factory());
        }
        let signal = self.step.as_mut().and_then(|step| step.advance());
        match signal {
            Some(StepSignal::Continue) => Ok(false),
            Some(StepSignal::TransitionTo(next)) => {
                debug!("mission: '{}' -> '{}'", self.current, next);
                self.set_state(next);
                Ok(self.is_finished())
            }
            None => Err(MissionError::MissingSignal(self.current.clone())),
        }
    }
}
