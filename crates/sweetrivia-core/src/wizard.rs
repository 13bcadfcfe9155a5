//! Drives a [`WizardFlow`] against a [`DraftStore`].

use tracing::{debug, info};

use crate::error::{FlowError, ValidationError};
use crate::flow::{Command, Notice, Step, WizardEvent, WizardFlow};
use crate::question::TriviaQuestion;
use crate::store::DraftStore;

/// What the author should see after an event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dispatched {
    pub notices: Vec<Notice>,
    pub rejection: Option<ValidationError>,
}

/// A wizard bound to one session's storage
pub struct Wizard<S: DraftStore> {
    store: S,
    flow: WizardFlow,
}

impl<S: DraftStore> Wizard<S> {
    /// Resume whatever `store` holds.
    pub fn open(store: S) -> Result<Self, FlowError> {
        let session = store.load_session()?;
        let flow = WizardFlow::resume(session);
        debug!(step = %flow.step(), "Wizard resumed");
        Ok(Self { store, flow })
    }

    /// A wizard at the start step that ignores what `store` holds. Used to
    /// restart a session whose stored values no longer decode.
    pub fn fresh(store: S) -> Self {
        Self {
            store,
            flow: WizardFlow::new(),
        }
    }

    pub fn flow(&self) -> &WizardFlow {
        &self.flow
    }

    pub fn step(&self) -> Step {
        self.flow.step()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Handle an event and persist its effects.
    ///
    /// The new flow only takes effect once every write succeeded, so a
    /// storage failure leaves the wizard where it was.
    pub fn dispatch(&mut self, event: WizardEvent) -> Result<Dispatched, FlowError> {
        let transition = self.flow.handle(event)?;

        let mut notices = Vec::new();
        for command in transition.commands {
            match command {
                Command::SaveCount(count) => self.store.save_count(count)?,
                Command::SaveQuestions(questions) => self.store.save_questions(&questions)?,
                Command::ClearStorage => self.store.clear()?,
                Command::Notify(notice) => notices.push(notice),
            }
        }

        if transition.flow.step() != self.flow.step() {
            info!(from = %self.flow.step(), to = %transition.flow.step(), "Wizard step changed");
        }
        self.flow = transition.flow;

        Ok(Dispatched {
            notices,
            rejection: transition.rejection,
        })
    }

    /// Every question of a finished session, in order
    pub fn completed_questions(&self) -> Result<Vec<TriviaQuestion>, FlowError> {
        self.flow
            .session()
            .ok_or(FlowError::NotConfigured)?
            .completed_questions()
    }

    pub fn into_store(self) -> S {
        self.store
    }
}
