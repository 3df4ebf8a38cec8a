//! Submission gateway: hands a completed wizard's record to the CRUD service.
//!
//! The gateway itself is a trait so the wizard flow can be driven against the
//! real HTTP service or an in-process fake. `SubmissionSession` owns the wizard
//! while a submission is pending, refuses duplicate submits and discards
//! responses that arrive after the wizard was abandoned.

pub mod http;

use async_trait::async_trait;
use reqwest::Url;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{IntakeError, SubmissionError};
use crate::intake::{ClientIntake, DesignerIntake};
use crate::wizard::{Wizard, client_questions, designer_questions};

pub use http::HttpGateway;

/// Create-side of the CRUD service.
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Create a client and return its identifier.
    async fn submit_client(&self, intake: &ClientIntake) -> Result<Uuid, SubmissionError>;

    /// Create a designer user and return its identifier.
    async fn submit_designer(&self, intake: &DesignerIntake) -> Result<Uuid, SubmissionError>;
}

/// Which intake a session runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Client,
    Designer,
}

/// A typed record ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeRecord {
    Client(ClientIntake),
    Designer(DesignerIntake),
}

impl IntakeRecord {
    pub async fn send(&self, gateway: &dyn SubmissionGateway) -> Result<Uuid, SubmissionError> {
        match self {
            Self::Client(intake) => gateway.submit_client(intake).await,
            Self::Designer(intake) => gateway.submit_designer(intake).await,
        }
    }
}

/// Where to go after a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUp {
    /// Client flow continues to the designer search.
    FindDesigners { client_id: Uuid },
    /// Designer flow continues to their portfolio. The id is handed back so
    /// the caller can keep it for the profile editor.
    Portfolio { designer_id: Uuid, name: String },
}

impl FollowUp {
    /// Path plus query string of the follow-up screen.
    pub fn location(&self) -> String {
        let (path, key, value) = match self {
            Self::FindDesigners { client_id } => {
                ("/find-designers", "clientId", client_id.to_string())
            }
            Self::Portfolio { name, .. } => ("/portfolio", "name", name.clone()),
        };
        // Any absolute base works; only the path and query are kept.
        match Url::parse("http://localhost") {
            Ok(mut url) => {
                url.set_path(path);
                url.query_pairs_mut().append_pair(key, &value);
                format!("{}?{}", url.path(), url.query().unwrap_or_default())
            }
            Err(_) => format!("{path}?{key}={value}"),
        }
    }
}

/// A submission that has been started and not yet resolved.
#[derive(Debug, Clone)]
pub struct PendingSubmission {
    generation: u64,
    pub record: IntakeRecord,
}

/// One visit to an intake form.
pub struct SubmissionSession {
    form: FormKind,
    wizard: Wizard,
    generation: u64,
    in_flight: Option<u64>,
    /// Set once the server has created the record, with or without an id.
    delivered: bool,
    last_error: Option<SubmissionError>,
}

impl SubmissionSession {
    pub fn new(form: FormKind) -> Self {
        let questions = match form {
            FormKind::Client => client_questions(),
            FormKind::Designer => designer_questions(),
        };
        Self {
            form,
            wizard: Wizard::new(questions),
            generation: 0,
            in_flight: None,
            delivered: false,
            last_error: None,
        }
    }

    pub fn form(&self) -> FormKind {
        self.form
    }

    pub fn wizard(&self) -> &Wizard {
        &self.wizard
    }

    /// Mutable wizard access. Refused while a submission is pending so the
    /// record being sent cannot drift from what is on screen.
    pub fn wizard_mut(&mut self) -> Result<&mut Wizard, SubmissionError> {
        if self.in_flight.is_some() {
            return Err(SubmissionError::InFlight);
        }
        Ok(&mut self.wizard)
    }

    pub fn is_submitting(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.wizard.is_complete() && self.in_flight.is_none() && !self.delivered
    }

    /// Whether the server already holds this session's record.
    pub fn is_delivered(&self) -> bool {
        self.delivered
    }

    pub fn last_error(&self) -> Option<&SubmissionError> {
        self.last_error.as_ref()
    }

    /// Build the typed record and mark the session in flight.
    ///
    /// A record that fails its own checks is never sent; the wizard is
    /// reopened on the offending question so the answer can be corrected.
    pub fn begin(&mut self) -> Result<PendingSubmission, SubmissionError> {
        if self.in_flight.is_some() {
            return Err(SubmissionError::InFlight);
        }
        if self.delivered {
            return Err(SubmissionError::AlreadySubmitted);
        }
        if let Some(question) = self.wizard.current_question() {
            return Err(SubmissionError::Invalid(IntakeError::MissingField {
                field: question.id.clone(),
            }));
        }

        let answers = self.wizard.visible_answers();
        let built = match self.form {
            FormKind::Client => ClientIntake::from_answers(&answers).map(IntakeRecord::Client),
            FormKind::Designer => DesignerIntake::from_answers(&answers).map(IntakeRecord::Designer),
        };
        let record = match built {
            Ok(record) => record,
            Err(e) => {
                if !self.wizard.revisit(e.field()) {
                    self.wizard.retreat();
                }
                debug!(field = e.field(), error = %e, "Submission refused before sending");
                let err = SubmissionError::Invalid(e);
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.last_error = None;
        debug!(generation = self.generation, form = ?self.form, "Submission started");
        Ok(PendingSubmission {
            generation: self.generation,
            record,
        })
    }

    /// Resolve a pending submission.
    ///
    /// A response for an abandoned or superseded submission is dropped with
    /// `Abandoned`. On failure the wizard and its answers are left as they
    /// were so the user can retry.
    pub fn finish(
        &mut self,
        pending: &PendingSubmission,
        result: Result<Uuid, SubmissionError>,
    ) -> Result<FollowUp, SubmissionError> {
        if self.in_flight != Some(pending.generation) {
            debug!(generation = pending.generation, "Dropping stale submission response");
            return Err(SubmissionError::Abandoned);
        }
        self.in_flight = None;

        match result {
            Ok(id) => {
                self.delivered = true;
                info!(id = %id, form = ?self.form, "Submission accepted");
                Ok(match &pending.record {
                    IntakeRecord::Client(_) => FollowUp::FindDesigners { client_id: id },
                    IntakeRecord::Designer(intake) => FollowUp::Portfolio {
                        designer_id: id,
                        name: intake.full_name.clone(),
                    },
                })
            }
            Err(e) => {
                if matches!(e, SubmissionError::Unconfirmed { .. }) {
                    self.delivered = true;
                }
                warn!(error = %e, form = ?self.form, "Submission failed");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    /// Navigate away. Any pending response is ignored when it arrives.
    pub fn abandon(&mut self) {
        if self.in_flight.take().is_some() {
            debug!(generation = self.generation, "Pending submission abandoned");
        }
        self.generation += 1;
    }

    /// Begin, send and finish in one call.
    pub async fn submit(
        &mut self,
        gateway: &dyn SubmissionGateway,
    ) -> Result<FollowUp, SubmissionError> {
        let pending = self.begin()?;
        let result = pending.record.send(gateway).await;
        self.finish(&pending, result)
    }
}
