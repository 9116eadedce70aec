//! Validated, navigable multi-step data entry.

pub mod engine;
pub mod keywords;
pub mod prompt;
pub mod resolver;
pub mod transaction;

pub use engine::{Entry, NavigationState, StepEngine, StepFlow, ValidationError, WizardResult};
pub use keywords::{ControlWord, DONE};
pub use prompt::{ask_yes_no, Prompter, ScriptedPrompter, YesNo};
pub use resolver::AccountResolver;
pub use transaction::{TransactionWizard, WizardStep};
