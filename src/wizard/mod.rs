//! Question wizard for the multi-step intake forms.
//!
//! A wizard walks an ordered list of questions, skipping the ones whose
//! visibility condition fails against the answers collected so far. Once the
//! last visible question is answered it becomes `Complete` and the answers
//! are handed to the submission gateway.

pub mod attachments;
pub mod forms;
pub mod question;
pub mod state;

pub use attachments::{AttachmentOutcome, Rejection};
pub use forms::{client_questions, designer_questions};
pub use question::{AnswerValue, Answers, Condition, InputKind, QuestionDefinition};
pub use state::{Wizard, WizardPhase};
