//! Flat, string-typed form view of a profile.
//!
//! This is what the editor binds to and what `POST /api/portfolio` accepts.
//! Converting back to typed change sets maps blank strings to `None`, so a
//! record that was never edited converts back to itself.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::ProfileRecord;
use crate::error::SaveError;
use crate::intake::blank_to_none;
use crate::store::models::{
    AccountChanges, DEFAULT_THEME_COLOR, PortfolioChanges, SocialLinkChanges, Visibility,
};

static THEME_COLOR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9a-fA-F]{6}$").unwrap_or_else(|e| panic!("invalid colour pattern: {e}"))
});

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileForm {
    // Account
    pub full_name: String,
    pub phone: String,
    pub country: String,
    pub city: String,
    pub years_of_experience: String,
    pub design_areas: String,
    pub portfolio_link: String,

    // Portfolio
    pub username: String,
    pub portfolio_title: String,
    pub bio: String,
    pub professional_bio: String,
    /// Comma-separated.
    pub skills: String,
    pub portfolio_url: String,
    pub profile_picture_url: String,
    pub theme_color: String,
    pub location: String,
    pub timezone: String,
    pub visibility: String,

    // Social
    pub dribbble_url: String,
    pub linkedin_url: String,
    pub instagram_url: String,
    pub twitter_url: String,
}

/// Typed change sets for the three parts of a profile.
///
/// `account` is `None` when the form carried no name, which is how callers
/// that only edit the portfolio leave the account untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub account: Option<AccountChanges>,
    pub portfolio: PortfolioChanges,
    pub social: SocialLinkChanges,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

impl ProfileForm {
    pub fn from_record(record: &ProfileRecord) -> Self {
        let user = &record.user;
        let portfolio = &record.portfolio;
        let social = &record.social_links;
        Self {
            full_name: user.full_name.clone(),
            phone: text(&user.phone),
            country: text(&user.country),
            city: text(&user.city),
            years_of_experience: user
                .years_of_experience
                .map(|y| y.to_string())
                .unwrap_or_default(),
            design_areas: text(&user.design_areas),
            portfolio_link: text(&user.portfolio_link),

            username: text(&portfolio.username),
            portfolio_title: text(&portfolio.portfolio_title),
            bio: text(&portfolio.bio),
            professional_bio: text(&portfolio.professional_bio),
            skills: portfolio.skills.join(", "),
            portfolio_url: text(&portfolio.portfolio_url),
            profile_picture_url: text(&portfolio.profile_picture_url),
            theme_color: portfolio.theme_color.clone(),
            location: text(&portfolio.location),
            timezone: text(&portfolio.timezone),
            visibility: portfolio.visibility.to_string(),

            dribbble_url: text(&social.dribbble_url),
            linkedin_url: text(&social.linkedin_url),
            instagram_url: text(&social.instagram_url),
            twitter_url: text(&social.twitter_url),
        }
    }

    /// Validate and convert into typed change sets.
    pub fn to_update(&self) -> Result<ProfileUpdate, SaveError> {
        let theme_color = match self.theme_color.trim() {
            "" => DEFAULT_THEME_COLOR.to_string(),
            color if THEME_COLOR.is_match(color) => color.to_string(),
            other => {
                return Err(SaveError::Validation(format!(
                    "theme colour '{other}' must look like #rrggbb"
                )));
            }
        };
        let visibility = match self.visibility.trim() {
            "" => Visibility::default(),
            raw => raw.parse::<Visibility>().map_err(SaveError::Validation)?,
        };
        let years_of_experience = match self.years_of_experience.trim() {
            "" => None,
            raw => Some(raw.parse::<u32>().map_err(|e| {
                SaveError::Validation(format!("years of experience '{raw}': {e}"))
            })?),
        };

        let opt = |s: &str| blank_to_none(Some(s.to_string()));

        let account = match self.full_name.trim() {
            "" => None,
            name => Some(AccountChanges {
                full_name: name.to_string(),
                phone: opt(&self.phone),
                country: opt(&self.country),
                city: opt(&self.city),
                years_of_experience,
                design_areas: opt(&self.design_areas),
                portfolio_link: opt(&self.portfolio_link),
            }),
        };

        Ok(ProfileUpdate {
            account,
            portfolio: PortfolioChanges {
                username: opt(&self.username),
                portfolio_title: opt(&self.portfolio_title),
                bio: opt(&self.bio),
                professional_bio: opt(&self.professional_bio),
                skills: self
                    .skills
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                portfolio_url: opt(&self.portfolio_url),
                profile_picture_url: opt(&self.profile_picture_url),
                theme_color,
                location: opt(&self.location),
                timezone: opt(&self.timezone),
                visibility,
            },
            social: SocialLinkChanges {
                dribbble_url: opt(&self.dribbble_url),
                linkedin_url: opt(&self.linkedin_url),
                instagram_url: opt(&self.instagram_url),
                twitter_url: opt(&self.twitter_url),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_are_split_and_trimmed() {
        let form = ProfileForm {
            full_name: "Grace".into(),
            skills: " Branding ,UI,, Illustration ".into(),
            ..Default::default()
        };
        let update = form.to_update().unwrap();
        assert_eq!(update.portfolio.skills, vec!["Branding", "UI", "Illustration"]);
    }

    #[test]
    fn blank_fields_become_none_and_defaults_apply() {
        let form = ProfileForm {
            full_name: "Grace".into(),
            bio: "   ".into(),
            ..Default::default()
        };
        let update = form.to_update().unwrap();
        assert!(update.portfolio.bio.is_none());
        assert_eq!(update.portfolio.theme_color, DEFAULT_THEME_COLOR);
        assert_eq!(update.portfolio.visibility, Visibility::Public);
        assert!(update.social.dribbble_url.is_none());
    }

    #[test]
    fn bad_theme_colour_is_rejected() {
        for color in ["green", "#12345", "#1234567", "00b67f", "#gg0000"] {
            let form = ProfileForm {
                theme_color: color.into(),
                ..Default::default()
            };
            assert!(
                matches!(form.to_update(), Err(SaveError::Validation(_))),
                "{color} should be rejected"
            );
        }
    }

    #[test]
    fn unknown_visibility_is_rejected() {
        let form = ProfileForm {
            visibility: "secret".into(),
            ..Default::default()
        };
        assert!(matches!(form.to_update(), Err(SaveError::Validation(_))));
    }

    #[test]
    fn missing_name_leaves_account_untouched() {
        let form = ProfileForm {
            username: "grace".into(),
            ..Default::default()
        };
        assert!(form.to_update().unwrap().account.is_none());
    }

    #[test]
    fn deserializes_from_camel_case_body() {
        let form: ProfileForm = serde_json::from_value(serde_json::json!({
            "portfolioTitle": "Work",
            "themeColor": "#112233",
            "dribbbleUrl": "https://dribbble.com/grace"
        }))
        .unwrap();
        assert_eq!(form.portfolio_title, "Work");
        assert_eq!(form.theme_color, "#112233");
        assert!(form.full_name.is_empty());
    }
}
