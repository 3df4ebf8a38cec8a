//! Question definitions and answer values.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::attachments::{self, MAX_ATTACHMENTS};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap_or_else(|e| panic!("invalid email pattern: {e}"))
});

/// Loose `local@domain.tld` check shared by the wizard and the intake records.
pub fn is_email_address(text: &str) -> bool {
    EMAIL.is_match(text)
}

/// How a question collects its answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    Text,
    LongText,
    Email,
    Phone,
    Number,
    Choice,
    /// Optional: a question of this kind can always be advanced past.
    File,
}

impl InputKind {
    /// Whether an empty answer blocks advancing.
    pub fn is_required(&self) -> bool {
        !matches!(self, Self::File)
    }

    /// Whether answers of this kind are lists rather than single strings.
    pub fn is_list(&self) -> bool {
        matches!(self, Self::File)
    }
}

impl std::fmt::Display for InputKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::LongText => "long_text",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Number => "number",
            Self::Choice => "choice",
            Self::File => "file",
        };
        write!(f, "{s}")
    }
}

/// A single answer: free text or a list (file attachments).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    List(Vec<String>),
}

impl AnswerValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::Text(_) => None,
            Self::List(items) => Some(items),
        }
    }

    /// Blank text or an empty list.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::List(items) => items.is_empty(),
        }
    }
}

impl From<&str> for AnswerValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for AnswerValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<String>> for AnswerValue {
    fn from(value: Vec<String>) -> Self {
        Self::List(value)
    }
}

/// Collected answers keyed by question id.
pub type Answers = HashMap<String, AnswerValue>;

/// Visibility predicate: the question is shown only when an earlier answer
/// equals a given value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// Id of the question whose answer is inspected.
    pub question_id: String,
    /// Value that makes the dependent question visible.
    pub equals: String,
}

impl Condition {
    pub fn holds(&self, answers: &Answers) -> bool {
        answers
            .get(&self.question_id)
            .and_then(AnswerValue::as_text)
            .is_some_and(|v| v == self.equals)
    }
}

/// One step of a wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionDefinition {
    pub id: String,
    pub prompt: String,
    #[serde(default)]
    pub placeholder: String,
    pub kind: InputKind,
    /// Allowed values for `Choice` questions.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
    /// When set, the question is visible only while the condition holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional: Option<Condition>,
}

impl QuestionDefinition {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>, kind: InputKind) -> Self {
        Self {
            id: id.into(),
            prompt: prompt.into(),
            placeholder: String::new(),
            kind,
            choices: Vec::new(),
            conditional: None,
        }
    }

    /// Builder: set placeholder text.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Builder: set the enumerated choices.
    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: show only when `question_id` was answered with `equals`.
    pub fn visible_when(mut self, question_id: impl Into<String>, equals: impl Into<String>) -> Self {
        self.conditional = Some(Condition {
            question_id: question_id.into(),
            equals: equals.into(),
        });
        self
    }

    pub fn is_visible(&self, answers: &Answers) -> bool {
        self.conditional.as_ref().is_none_or(|c| c.holds(answers))
    }

    /// Whether `answer` lets the wizard move past this question.
    ///
    /// Required kinds need a non-empty answer; `File` is always satisfied.
    pub fn is_satisfied_by(&self, answer: Option<&AnswerValue>) -> bool {
        if !self.kind.is_required() {
            return true;
        }
        answer.is_some_and(|a| !a.is_empty())
    }

    /// Check that `answer` has the right shape for this question.
    ///
    /// Empty values pass (a draft may be cleared); malformed ones do not.
    /// Anything accepted here also passes the intake record checks.
    pub fn check_shape(&self, answer: &AnswerValue) -> Result<(), String> {
        let text = match (self.kind.is_list(), answer) {
            (true, AnswerValue::Text(_)) => return Err("expected a list of files".to_string()),
            (false, AnswerValue::List(_)) => return Err("expected a single value".to_string()),
            (true, AnswerValue::List(files)) => return check_files(files),
            (false, AnswerValue::Text(text)) => text,
        };
        let text = text.trim();
        if text.is_empty() {
            return Ok(());
        }
        match self.kind {
            InputKind::Choice if !self.choices.iter().any(|c| c == text) => {
                Err(format!("'{text}' is not one of the offered choices"))
            }
            InputKind::Number if text.parse::<u32>().is_err() => {
                Err(format!("'{text}' is not a whole number"))
            }
            InputKind::Email if !is_email_address(text) => {
                Err(format!("'{text}' is not an email address"))
            }
            _ => Ok(()),
        }
    }
}

fn check_files(files: &[String]) -> Result<(), String> {
    if files.len() > MAX_ATTACHMENTS {
        return Err(format!("at most {MAX_ATTACHMENTS} images are allowed"));
    }
    files
        .iter()
        .enumerate()
        .try_for_each(|(index, file)| attachments::check(index, file).map_err(|r| r.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn choice() -> QuestionDefinition {
        QuestionDefinition::new("clientType", "Business or individual?", InputKind::Choice)
            .with_choices(["business", "individual"])
    }

    #[test]
    fn condition_matches_exact_text() {
        let cond = Condition {
            question_id: "clientType".into(),
            equals: "business".into(),
        };
        let mut answers = Answers::new();
        assert!(!cond.holds(&answers));
        answers.insert("clientType".into(), "individual".into());
        assert!(!cond.holds(&answers));
        answers.insert("clientType".into(), "business".into());
        assert!(cond.holds(&answers));
    }

    #[test]
    fn unconditional_question_always_visible() {
        let q = QuestionDefinition::new("fullName", "Name?", InputKind::Text);
        assert!(q.is_visible(&Answers::new()));
    }

    #[test]
    fn required_kinds_need_non_empty_answer() {
        let q = QuestionDefinition::new("email", "Email?", InputKind::Email);
        assert!(!q.is_satisfied_by(None));
        assert!(!q.is_satisfied_by(Some(&"   ".into())));
        assert!(q.is_satisfied_by(Some(&"a@b.co".into())));
    }

    #[test]
    fn file_kind_is_always_satisfied() {
        let q = QuestionDefinition::new("inspirationImages", "Inspiration?", InputKind::File);
        assert!(q.is_satisfied_by(None));
        assert!(q.is_satisfied_by(Some(&AnswerValue::List(vec![]))));
    }

    #[test]
    fn choice_shape_rejects_unknown_option() {
        let q = choice();
        assert!(q.check_shape(&"business".into()).is_ok());
        assert!(q.check_shape(&"".into()).is_ok());
        assert!(q.check_shape(&"government".into()).is_err());
    }

    #[test]
    fn number_shape_requires_whole_number() {
        let q = QuestionDefinition::new("yearsOfExperience", "Years?", InputKind::Number);
        assert!(q.check_shape(&"7".into()).is_ok());
        assert!(q.check_shape(&"seven".into()).is_err());
        assert!(q.check_shape(&"-1".into()).is_err());
    }

    #[test]
    fn list_and_text_shapes_do_not_mix() {
        let file = QuestionDefinition::new("inspirationImages", "Inspiration?", InputKind::File);
        assert!(file.check_shape(&"x".into()).is_err());
        let text = QuestionDefinition::new("fullName", "Name?", InputKind::Text);
        assert!(text.check_shape(&AnswerValue::List(vec![])).is_err());
    }

    #[test]
    fn email_shape_matches_intake_rule() {
        let q = QuestionDefinition::new("email", "Email?", InputKind::Email);
        assert!(q.check_shape(&"ada@example.com".into()).is_ok());
        assert!(q.check_shape(&"".into()).is_ok());
        assert!(q.check_shape(&"ada-at-example".into()).is_err());
        assert!(q.check_shape(&"ada@example".into()).is_err());
    }

    #[test]
    fn file_shape_checks_every_attachment() {
        let q = QuestionDefinition::new("inspirationImages", "Inspiration?", InputKind::File);
        let png = "data:image/png;base64,iVBORw0KGgo=".to_string();
        assert!(q.check_shape(&AnswerValue::List(vec![png.clone()])).is_ok());
        let err = q
            .check_shape(&AnswerValue::List(vec![png.clone(), "not-a-data-url".into()]))
            .unwrap_err();
        assert!(err.contains("file 2"), "{err}");
        assert!(q.check_shape(&AnswerValue::List(vec![png; MAX_ATTACHMENTS + 1])).is_err());
    }

    #[test]
    fn answer_value_untagged_serde() {
        let text: AnswerValue = serde_json::from_str("\"hello\"").unwrap();
        assert_eq!(text, AnswerValue::text("hello"));
        let list: AnswerValue = serde_json::from_str("[\"a\",\"b\"]").unwrap();
        assert_eq!(list.as_list().unwrap().len(), 2);
    }
}
