//! Step engine shared by interactive wizards.
//!
//! A wizard is a fixed program of step identifiers. The engine keeps two
//! ordered sequences, the steps already visited and the steps still to run,
//! and moves a cursor between them according to each step's raw input:
//! `back` retreats, `repeat` re-runs, `cancel`/`quit` halt, and anything else
//! is validated then committed before advancing. Steps may append work to the
//! remaining sequence while committing, which is how open-ended sub-flows
//! grow the program at runtime.

use std::collections::VecDeque;
use std::fmt;

use tracing::debug;

use super::keywords::ControlWord;

/// High-level lifecycle states emitted by the step engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WizardResult<T> {
    Completed(T),
    Cancelled,
}

/// How the cursor arrived at the step being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Forward,
    Retreat,
    /// Re-run after `repeat` or a failed validation.
    Repeat,
}

/// Field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Visited and remaining steps of one wizard run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationState<S> {
    previous: Vec<S>,
    next: VecDeque<S>,
}

impl<S: Copy> NavigationState<S> {
    pub fn new(remaining: impl IntoIterator<Item = S>) -> Self {
        Self {
            previous: Vec::new(),
            next: remaining.into_iter().collect(),
        }
    }

    pub fn previous(&self) -> &[S] {
        &self.previous
    }

    pub fn next(&self) -> impl Iterator<Item = &S> {
        self.next.iter()
    }

    /// Marks `current` visited and yields the following step, or `None` once
    /// the program is exhausted.
    pub fn advance(&mut self, current: S) -> Option<S> {
        let following = self.next.pop_front()?;
        self.previous.push(current);
        Some(following)
    }

    /// Returns to the most recently visited step, putting `current` back in
    /// front of the remaining work. Stays put at the first step.
    pub fn retreat(&mut self, current: S) -> S {
        match self.previous.pop() {
            Some(prior) => {
                self.next.push_front(current);
                prior
            }
            None => current,
        }
    }

    /// Runs `step` immediately after the current one.
    pub fn schedule_next(&mut self, step: S) {
        self.next.push_front(step);
    }

    /// Drops queued steps from the front while `predicate` holds.
    pub fn discard_next_while(&mut self, predicate: impl Fn(&S) -> bool) {
        while self.next.front().is_some_and(&predicate) {
            self.next.pop_front();
        }
    }
}

/// Step handlers for one wizard. The engine owns navigation; the flow owns
/// prompting, validation and the collected values.
pub trait StepFlow {
    type Step: Copy + Eq + fmt::Debug;
    type Output;
    type Error;

    /// Gathers the raw input for `step`. Control words are returned verbatim.
    fn collect(&mut self, step: Self::Step, entry: Entry) -> Result<String, Self::Error>;

    fn validate(&self, step: Self::Step, info: &str) -> Result<(), ValidationError>;

    /// Records validated input; may extend the remaining program.
    fn commit(
        &mut self,
        step: Self::Step,
        info: &str,
        navigation: &mut NavigationState<Self::Step>,
    ) -> Result<(), Self::Error>;

    /// Called before the engine re-runs a step whose input failed validation.
    fn rejected(&mut self, _step: Self::Step, _error: &ValidationError) {}

    /// Builds the output once every step has been committed.
    fn finish(&mut self) -> Result<Self::Output, Self::Error>;
}

/// Drives a [`StepFlow`] over a linear program.
pub struct StepEngine<S> {
    program: Vec<S>,
}

impl<S: Copy + Eq + fmt::Debug> StepEngine<S> {
    pub fn new(program: impl IntoIterator<Item = S>) -> Self {
        Self {
            program: program.into_iter().collect(),
        }
    }

    pub fn run<F>(&self, flow: &mut F) -> Result<WizardResult<F::Output>, F::Error>
    where
        F: StepFlow<Step = S>,
    {
        let Some((&first, rest)) = self.program.split_first() else {
            return flow.finish().map(WizardResult::Completed);
        };
        let mut navigation = NavigationState::new(rest.iter().copied());
        let mut current = first;
        let mut entry = Entry::Forward;

        loop {
            let info = flow.collect(current, entry)?;

            match ControlWord::parse(&info) {
                Some(word) if word.halts() => {
                    debug!(step = ?current, "wizard cancelled");
                    return Ok(WizardResult::Cancelled);
                }
                Some(ControlWord::Back) => {
                    let target = navigation.retreat(current);
                    debug!(from = ?current, to = ?target, "retreat");
                    current = target;
                    entry = Entry::Retreat;
                }
                Some(_) => {
                    entry = Entry::Repeat;
                }
                None => match flow.validate(current, &info) {
                    Ok(()) => {
                        flow.commit(current, &info, &mut navigation)?;
                        match navigation.advance(current) {
                            Some(following) => {
                                debug!(from = ?current, to = ?following, "advance");
                                current = following;
                                entry = Entry::Forward;
                            }
                            None => return flow.finish().map(WizardResult::Completed),
                        }
                    }
                    Err(err) => {
                        debug!(step = ?current, reason = %err, "validation failed");
                        flow.rejected(current, &err);
                        entry = Entry::Repeat;
                    }
                },
            }
        }
    }
}
