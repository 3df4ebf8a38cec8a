//! Wizard state machine: the current question and the collected answers.

use serde::{Deserialize, Serialize};

use crate::error::WizardError;

use super::attachments::{self, AttachmentOutcome};
use super::question::{AnswerValue, Answers, QuestionDefinition};

/// Where the wizard stands.
///
/// `Active(i)` always points at a question that is visible given the current
/// answers. `Complete` is only reachable by advancing past the last visible
/// question, and is left again by `retreat` or `revisit`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "index", rename_all = "snake_case")]
pub enum WizardPhase {
    Active(usize),
    Complete,
}

impl WizardPhase {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for WizardPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active(i) => write!(f, "active({i})"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// A linear, possibly-branching sequence of questions collected into one record.
#[derive(Debug, Clone)]
pub struct Wizard {
    questions: Vec<QuestionDefinition>,
    phase: WizardPhase,
    answers: Answers,
}

impl Wizard {
    /// Start a wizard on the first visible question.
    pub fn new(questions: Vec<QuestionDefinition>) -> Self {
        let answers = Answers::new();
        let phase = match first_visible_from(&questions, &answers, 0) {
            Some(i) => WizardPhase::Active(i),
            None => WizardPhase::Complete,
        };
        Self {
            questions,
            phase,
            answers,
        }
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase.is_terminal()
    }

    pub fn questions(&self) -> &[QuestionDefinition] {
        &self.questions
    }

    /// Every answer recorded so far, including answers to questions that a
    /// later change has hidden.
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// The question on screen, or `None` once there is nothing left to ask.
    pub fn current_question(&self) -> Option<&QuestionDefinition> {
        match self.phase {
            WizardPhase::Active(i) => self.questions.get(i),
            WizardPhase::Complete => None,
        }
    }

    /// The draft answer for the current question.
    pub fn current_answer(&self) -> Option<&AnswerValue> {
        self.current_question()
            .and_then(|q| self.answers.get(&q.id))
    }

    /// Record a draft answer for the current question without moving.
    ///
    /// Empty values are accepted so a field can be cleared; malformed ones
    /// (an unknown choice, a non-numeric number) are refused.
    pub fn set_answer(&mut self, value: impl Into<AnswerValue>) -> Result<(), WizardError> {
        let value = value.into();
        let question = self.current_question().ok_or(WizardError::AlreadyComplete)?;
        question
            .check_shape(&value)
            .map_err(|reason| WizardError::InvalidAnswer {
                question_id: question.id.clone(),
                reason,
            })?;
        let id = question.id.clone();
        self.answers.insert(id, value);
        Ok(())
    }

    /// Whether the current answer allows moving forward.
    pub fn can_advance(&self) -> bool {
        match self.current_question() {
            Some(q) => q.is_satisfied_by(self.answers.get(&q.id)),
            None => false,
        }
    }

    /// Record `answer` for the current question and move to the next visible one.
    ///
    /// Hidden questions are stepped over silently. Advancing from the last
    /// visible question completes the wizard.
    pub fn advance(&mut self, answer: impl Into<AnswerValue>) -> Result<WizardPhase, WizardError> {
        self.set_answer(answer)?;
        self.proceed()
    }

    /// Move forward using the answer already recorded for the current question.
    pub fn proceed(&mut self) -> Result<WizardPhase, WizardError> {
        let WizardPhase::Active(index) = self.phase else {
            return Err(WizardError::AlreadyComplete);
        };
        let question = &self.questions[index];
        if !question.is_satisfied_by(self.answers.get(&question.id)) {
            return Err(WizardError::InvalidAnswer {
                question_id: question.id.clone(),
                reason: "an answer is required".to_string(),
            });
        }
        if question.kind.is_list() && !self.answers.contains_key(&question.id) {
            self.answers
                .insert(question.id.clone(), AnswerValue::List(Vec::new()));
        }

        self.phase = match first_visible_from(&self.questions, &self.answers, index + 1) {
            Some(next) => WizardPhase::Active(next),
            None => WizardPhase::Complete,
        };
        tracing::debug!(from = index, to = %self.phase, "Wizard advanced");
        Ok(self.phase)
    }

    /// Move back to the nearest earlier visible question. From `Complete`
    /// that is the last visible question. No-op on the first one.
    pub fn retreat(&mut self) -> WizardPhase {
        let end = match self.phase {
            WizardPhase::Active(index) => index,
            WizardPhase::Complete => self.questions.len(),
        };
        if let Some(prev) = (0..end)
            .rev()
            .find(|&i| self.questions[i].is_visible(&self.answers))
        {
            self.phase = WizardPhase::Active(prev);
        }
        self.phase
    }

    /// Jump back to an already-reached question so its answer can be fixed.
    ///
    /// Refused for unknown or hidden questions and for questions ahead of
    /// the current one.
    pub fn revisit(&mut self, question_id: &str) -> bool {
        let end = match self.phase {
            WizardPhase::Active(index) => index,
            WizardPhase::Complete => self.questions.len(),
        };
        let Some(index) = self.questions[..end]
            .iter()
            .position(|q| q.id == question_id && q.is_visible(&self.answers))
        else {
            return false;
        };
        tracing::debug!(from = %self.phase, to = index, "Wizard revisit");
        self.phase = WizardPhase::Active(index);
        true
    }

    /// Merge uploaded files into the current file question.
    pub fn add_attachments(&mut self, incoming: Vec<String>) -> Result<AttachmentOutcome, WizardError> {
        let question = self.current_question().ok_or(WizardError::AlreadyComplete)?;
        if !question.kind.is_list() {
            return Err(WizardError::InvalidAnswer {
                question_id: question.id.clone(),
                reason: "question does not accept files".to_string(),
            });
        }
        let id = question.id.clone();
        let existing = self
            .answers
            .get(&id)
            .and_then(AnswerValue::as_list)
            .unwrap_or_default();
        let outcome = attachments::merge(existing, incoming);
        self.answers
            .insert(id, AnswerValue::List(outcome.files.clone()));
        Ok(outcome)
    }

    /// Drop one file from the current file question.
    pub fn remove_attachment(&mut self, index: usize) -> bool {
        let Some(id) = self.current_question().map(|q| q.id.clone()) else {
            return false;
        };
        match self.answers.get_mut(&id) {
            Some(AnswerValue::List(files)) if index < files.len() => {
                files.remove(index);
                true
            }
            _ => false,
        }
    }

    /// 1-based position of the current question among the visible ones, and
    /// the number of visible questions.
    pub fn progress(&self) -> (usize, usize) {
        let visible: Vec<usize> = (0..self.questions.len())
            .filter(|&i| self.questions[i].is_visible(&self.answers))
            .collect();
        let total = visible.len();
        let position = match self.phase {
            WizardPhase::Active(index) => visible.iter().position(|&i| i == index).map_or(0, |p| p + 1),
            WizardPhase::Complete => total,
        };
        (position, total)
    }

    /// Answers restricted to questions that are visible right now.
    ///
    /// Answers to hidden questions are retained in the wizard so they
    /// reappear if the user flips the governing answer back, but they are
    /// never part of what gets submitted.
    pub fn visible_answers(&self) -> Answers {
        self.questions
            .iter()
            .filter(|q| q.is_visible(&self.answers))
            .filter_map(|q| self.answers.get(&q.id).map(|a| (q.id.clone(), a.clone())))
            .collect()
    }
}

fn first_visible_from(questions: &[QuestionDefinition], answers: &Answers, start: usize) -> Option<usize> {
    (start..questions.len()).find(|&i| questions[i].is_visible(answers))
}
