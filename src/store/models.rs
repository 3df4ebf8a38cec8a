//! Row models for the four tables: clients, users, portfolios, social links.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default portfolio accent colour.
pub const DEFAULT_THEME_COLOR: &str = "#00b67f";

/// Whether the client is hiring for a business or for themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientType {
    Business,
    Individual,
}

impl std::fmt::Display for ClientType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Business => write!(f, "business"),
            Self::Individual => write!(f, "individual"),
        }
    }
}

impl std::str::FromStr for ClientType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "business" => Ok(Self::Business),
            "individual" => Ok(Self::Individual),
            other => Err(format!("unknown client type '{other}'")),
        }
    }
}

/// Who can see a portfolio.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Unlisted,
}

impl std::fmt::Display for Visibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Public => "public",
            Self::Private => "private",
            Self::Unlisted => "unlisted",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Visibility {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public" => Ok(Self::Public),
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            other => Err(format!("unknown visibility '{other}'")),
        }
    }
}

/// A client who filled in the intake form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub client_type: ClientType,
    #[serde(default)]
    pub business_name: Option<String>,
    pub looking_for: String,
    #[serde(default)]
    pub project_description: Option<String>,
    #[serde(default)]
    pub budget_range: Option<String>,
    #[serde(default)]
    pub timeline: Option<String>,
    #[serde(default)]
    pub inspiration_images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A designer account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub years_of_experience: Option<u32>,
    #[serde(default)]
    pub design_areas: Option<String>,
    #[serde(default)]
    pub portfolio_link: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A designer's public portfolio page. One per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub portfolio_title: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub professional_bio: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(default)]
    pub portfolio_url: Option<String>,
    #[serde(default)]
    pub profile_picture_url: Option<String>,
    pub theme_color: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    pub visibility: Visibility,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Portfolio {
    /// The empty portfolio provisioned alongside a new user.
    pub fn empty(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            username: None,
            portfolio_title: None,
            bio: None,
            professional_bio: None,
            skills: Vec::new(),
            portfolio_url: None,
            profile_picture_url: None,
            theme_color: DEFAULT_THEME_COLOR.to_string(),
            location: None,
            timezone: None,
            visibility: Visibility::default(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Social profile links for a user. One per user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLinks {
    pub id: Uuid,
    pub user_id: Uuid,
    #[serde(default)]
    pub dribbble_url: Option<String>,
    #[serde(default)]
    pub dribbble_connected: bool,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub instagram_url: Option<String>,
    #[serde(default)]
    pub twitter_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SocialLinks {
    /// The empty record provisioned alongside a new user.
    pub fn empty(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            dribbble_url: None,
            dribbble_connected: false,
            linkedin_url: None,
            instagram_url: None,
            twitter_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Field set for a portfolio update. `None` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortfolioChanges {
    pub username: Option<String>,
    pub portfolio_title: Option<String>,
    pub bio: Option<String>,
    pub professional_bio: Option<String>,
    pub skills: Vec<String>,
    pub portfolio_url: Option<String>,
    pub profile_picture_url: Option<String>,
    pub theme_color: String,
    pub location: Option<String>,
    pub timezone: Option<String>,
    pub visibility: Visibility,
}

/// Field set for a social-links update. The connected flag is owned by the
/// OAuth flow and is not part of this set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SocialLinkChanges {
    pub dribbble_url: Option<String>,
    pub linkedin_url: Option<String>,
    pub instagram_url: Option<String>,
    pub twitter_url: Option<String>,
}

/// Editable account fields of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountChanges {
    pub full_name: String,
    pub phone: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub years_of_experience: Option<u32>,
    pub design_areas: Option<String>,
    pub portfolio_link: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_type_serde_matches_display() {
        for ct in [ClientType::Business, ClientType::Individual] {
            let json = serde_json::to_string(&ct).unwrap();
            assert_eq!(json, format!("\"{ct}\""));
            assert_eq!(ct.to_string().parse::<ClientType>().unwrap(), ct);
        }
        assert!("agency".parse::<ClientType>().is_err());
    }

    #[test]
    fn visibility_defaults_to_public() {
        assert_eq!(Visibility::default(), Visibility::Public);
        assert_eq!("unlisted".parse::<Visibility>().unwrap(), Visibility::Unlisted);
    }

    #[test]
    fn empty_portfolio_uses_default_theme() {
        let user_id = Uuid::new_v4();
        let p = Portfolio::empty(user_id);
        assert_eq!(p.user_id, user_id);
        assert_eq!(p.theme_color, DEFAULT_THEME_COLOR);
        assert!(p.bio.is_none());
        assert!(p.skills.is_empty());
    }

    #[test]
    fn empty_social_links_not_connected() {
        let links = SocialLinks::empty(Uuid::new_v4());
        assert!(!links.dribbble_connected);
        assert!(links.dribbble_url.is_none());
    }
}
