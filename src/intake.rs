//! Typed intake records: the closed shape of what each wizard submits.
//!
//! Wizards collect loosely-typed answers keyed by question id. These records
//! are the boundary: building one validates the answers, and everything past
//! this point (gateway, REST layer, store) sees only typed fields.

use serde::{Deserialize, Serialize};

use crate::error::IntakeError;
use crate::store::models::ClientType;
use crate::wizard::forms::{client, designer};
use crate::wizard::question::{AnswerValue, Answers, is_email_address};

/// What a client submits. Wire format is camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientIntake {
    pub full_name: String,
    pub email: String,
    pub client_type: ClientType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_name: Option<String>,
    pub looking_for: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_range: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    #[serde(default)]
    pub inspiration_images: Vec<String>,
}

impl ClientIntake {
    /// Build from wizard answers.
    ///
    /// `businessName` is dropped unless the client type is business, even if
    /// an answer for it is still sitting in the record from an earlier branch.
    pub fn from_answers(answers: &Answers) -> Result<Self, IntakeError> {
        let client_type = required(answers, client::CLIENT_TYPE)?
            .parse::<ClientType>()
            .map_err(|reason| IntakeError::InvalidField {
                field: client::CLIENT_TYPE.to_string(),
                reason,
            })?;
        let intake = Self {
            full_name: required(answers, client::FULL_NAME)?,
            email: required(answers, client::EMAIL)?,
            client_type,
            business_name: optional(answers, client::BUSINESS_NAME),
            looking_for: required(answers, client::LOOKING_FOR)?,
            project_description: optional(answers, client::PROJECT_DESCRIPTION),
            budget_range: optional(answers, client::BUDGET_RANGE),
            timeline: optional(answers, client::TIMELINE),
            inspiration_images: answers
                .get(client::INSPIRATION_IMAGES)
                .and_then(AnswerValue::as_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default(),
        };
        intake.validated()
    }

    /// Normalize and check the record. Used for wizard output and for
    /// request bodies arriving at the REST layer alike.
    pub fn validated(mut self) -> Result<Self, IntakeError> {
        self.full_name = non_empty(client::FULL_NAME, &self.full_name)?;
        self.email = check_email(client::EMAIL, &self.email)?;
        self.looking_for = non_empty(client::LOOKING_FOR, &self.looking_for)?;
        self.business_name = match self.client_type {
            ClientType::Business => Some(non_empty(
                client::BUSINESS_NAME,
                self.business_name.as_deref().unwrap_or_default(),
            )?),
            ClientType::Individual => None,
        };
        self.project_description = blank_to_none(self.project_description);
        self.budget_range = blank_to_none(self.budget_range);
        self.timeline = blank_to_none(self.timeline);
        for (index, image) in self.inspiration_images.iter().enumerate() {
            crate::wizard::attachments::check(index, image).map_err(|r| IntakeError::InvalidField {
                field: client::INSPIRATION_IMAGES.to_string(),
                reason: r.to_string(),
            })?;
        }
        if self.inspiration_images.len() > crate::wizard::attachments::MAX_ATTACHMENTS {
            return Err(IntakeError::InvalidField {
                field: client::INSPIRATION_IMAGES.to_string(),
                reason: format!(
                    "at most {} images are allowed",
                    crate::wizard::attachments::MAX_ATTACHMENTS
                ),
            });
        }
        Ok(self)
    }
}

/// What a designer submits. Wire format is camelCase JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignerIntake {
    pub full_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_of_experience: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub design_areas: Option<String>,
}

impl DesignerIntake {
    pub fn from_answers(answers: &Answers) -> Result<Self, IntakeError> {
        let years_of_experience = match optional(answers, designer::YEARS_OF_EXPERIENCE) {
            Some(raw) => Some(raw.parse::<u32>().map_err(|e| IntakeError::InvalidField {
                field: designer::YEARS_OF_EXPERIENCE.to_string(),
                reason: e.to_string(),
            })?),
            None => None,
        };
        let intake = Self {
            full_name: required(answers, designer::FULL_NAME)?,
            email: required(answers, designer::EMAIL)?,
            phone: optional(answers, designer::PHONE),
            country: optional(answers, designer::COUNTRY),
            years_of_experience,
            design_areas: optional(answers, designer::DESIGN_AREAS),
        };
        intake.validated()
    }

    pub fn validated(mut self) -> Result<Self, IntakeError> {
        self.full_name = non_empty(designer::FULL_NAME, &self.full_name)?;
        self.email = check_email(designer::EMAIL, &self.email)?;
        self.phone = blank_to_none(self.phone);
        self.country = blank_to_none(self.country);
        self.design_areas = blank_to_none(self.design_areas);
        Ok(self)
    }
}

fn text<'a>(answers: &'a Answers, id: &str) -> Option<&'a str> {
    answers
        .get(id)
        .and_then(AnswerValue::as_text)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn required(answers: &Answers, id: &str) -> Result<String, IntakeError> {
    text(answers, id)
        .map(str::to_string)
        .ok_or_else(|| IntakeError::MissingField {
            field: id.to_string(),
        })
}

fn optional(answers: &Answers, id: &str) -> Option<String> {
    text(answers, id).map(str::to_string)
}

fn non_empty(field: &str, value: &str) -> Result<String, IntakeError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(IntakeError::MissingField {
            field: field.to_string(),
        });
    }
    Ok(value.to_string())
}

fn check_email(field: &str, value: &str) -> Result<String, IntakeError> {
    let value = non_empty(field, value)?;
    if !is_email_address(&value) {
        return Err(IntakeError::InvalidField {
            field: field.to_string(),
            reason: format!("'{value}' is not an email address"),
        });
    }
    Ok(value)
}

/// Trim, and map blank strings to `None`.
pub fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_answers(client_type: &str) -> Answers {
        let mut answers = Answers::new();
        answers.insert(client::FULL_NAME.into(), " Ada Lovelace ".into());
        answers.insert(client::EMAIL.into(), "ada@example.com".into());
        answers.insert(client::CLIENT_TYPE.into(), client_type.into());
        answers.insert(client::BUSINESS_NAME.into(), "Engines Ltd".into());
        answers.insert(client::LOOKING_FOR.into(), "Logo design".into());
        answers.insert(client::PROJECT_DESCRIPTION.into(), "".into());
        answers.insert(client::BUDGET_RANGE.into(), "Flexible".into());
        answers.insert(client::TIMELINE.into(), "1 month".into());
        answers.insert(client::INSPIRATION_IMAGES.into(), AnswerValue::List(vec![]));
        answers
    }

    #[test]
    fn business_keeps_business_name() {
        let intake = ClientIntake::from_answers(&client_answers("business")).unwrap();
        assert_eq!(intake.client_type, ClientType::Business);
        assert_eq!(intake.business_name.as_deref(), Some("Engines Ltd"));
        assert_eq!(intake.full_name, "Ada Lovelace");
        assert!(intake.project_description.is_none());
    }

    #[test]
    fn individual_nulls_stale_business_name() {
        let intake = ClientIntake::from_answers(&client_answers("individual")).unwrap();
        assert_eq!(intake.client_type, ClientType::Individual);
        assert!(intake.business_name.is_none());
    }

    #[test]
    fn business_without_name_is_rejected() {
        let mut answers = client_answers("business");
        answers.remove(client::BUSINESS_NAME);
        let err = ClientIntake::from_answers(&answers).unwrap_err();
        assert_eq!(
            err,
            IntakeError::MissingField {
                field: client::BUSINESS_NAME.into()
            }
        );
    }

    #[test]
    fn bad_email_is_rejected() {
        let mut answers = client_answers("individual");
        answers.insert(client::EMAIL.into(), "not-an-email".into());
        assert!(matches!(
            ClientIntake::from_answers(&answers),
            Err(IntakeError::InvalidField { .. })
        ));
    }

    #[test]
    fn missing_required_field_is_named() {
        let mut answers = client_answers("individual");
        answers.remove(client::LOOKING_FOR);
        let err = ClientIntake::from_answers(&answers).unwrap_err();
        assert_eq!(err.to_string(), "lookingFor is required");
    }

    #[test]
    fn client_wire_format_is_camel_case() {
        let intake = ClientIntake::from_answers(&client_answers("business")).unwrap();
        let json = serde_json::to_value(&intake).unwrap();
        assert_eq!(json["fullName"], "Ada Lovelace");
        assert_eq!(json["clientType"], "business");
        assert_eq!(json["businessName"], "Engines Ltd");
        assert!(json.get("projectDescription").is_none());
    }

    #[test]
    fn designer_from_answers_parses_years() {
        let mut answers = Answers::new();
        answers.insert(designer::FULL_NAME.into(), "Grace".into());
        answers.insert(designer::EMAIL.into(), "grace@example.com".into());
        answers.insert(designer::PHONE.into(), "+1 555 0100".into());
        answers.insert(designer::COUNTRY.into(), "USA".into());
        answers.insert(designer::YEARS_OF_EXPERIENCE.into(), "12".into());
        answers.insert(designer::DESIGN_AREAS.into(), "Branding".into());
        let intake = DesignerIntake::from_answers(&answers).unwrap();
        assert_eq!(intake.years_of_experience, Some(12));
        assert_eq!(intake.design_areas.as_deref(), Some("Branding"));
    }

    #[test]
    fn designer_validated_trims_blanks() {
        let intake = DesignerIntake {
            full_name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: Some("  ".into()),
            country: None,
            years_of_experience: None,
            design_areas: Some(" UI ".into()),
        }
        .validated()
        .unwrap();
        assert!(intake.phone.is_none());
        assert_eq!(intake.design_areas.as_deref(), Some("UI"));
    }
}
