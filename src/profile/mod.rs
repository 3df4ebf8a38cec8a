//! Designer profiles: the composite record, its load/save service and the
//! tabbed editor that binds to it.

pub mod editor;
pub mod form;

use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{DatabaseError, SaveError, SavePart};
use crate::store::Database;
use crate::store::models::{Portfolio, SocialLinks, User};

pub use editor::{EditorTab, ProfileEditor, ViewFlags};
pub use form::{ProfileForm, ProfileUpdate};

/// Everything the editor shows for one designer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub user: User,
    pub portfolio: Portfolio,
    pub social_links: SocialLinks,
}

fn missing(entity: &str, user_id: Uuid) -> DatabaseError {
    DatabaseError::NotFound {
        entity: entity.into(),
        id: user_id.to_string(),
    }
}

/// Fetch the composite record for `user_id`.
pub async fn load_profile(db: &dyn Database, user_id: Uuid) -> Result<ProfileRecord, DatabaseError> {
    let user = db
        .get_user(user_id)
        .await?
        .ok_or_else(|| missing("user", user_id))?;
    let portfolio = db
        .get_portfolio(user_id)
        .await?
        .ok_or_else(|| missing("portfolio", user_id))?;
    let social_links = db
        .get_social_links(user_id)
        .await?
        .ok_or_else(|| missing("social links", user_id))?;

    Ok(ProfileRecord {
        user,
        portfolio,
        social_links,
    })
}

/// Persist `update` part by part: account, then portfolio, then social links.
///
/// The first failing part stops the save and is named in the error. Parts
/// saved before it stay saved.
pub async fn save_profile(
    db: &dyn Database,
    user_id: Uuid,
    update: &ProfileUpdate,
) -> Result<ProfileRecord, SaveError> {
    let part_error = |part: SavePart| {
        move |e: DatabaseError| match e {
            DatabaseError::NotFound { .. } => SaveError::NotFound(user_id.to_string()),
            other => {
                error!(user_id = %user_id, part = %part, error = %other, "Profile save failed");
                SaveError::Part {
                    part,
                    message: other.to_string(),
                }
            }
        }
    };

    let user = match &update.account {
        Some(account) => db
            .update_user(user_id, account)
            .await
            .map_err(part_error(SavePart::Account))?,
        None => db
            .get_user(user_id)
            .await
            .map_err(part_error(SavePart::Account))?
            .ok_or_else(|| SaveError::NotFound(user_id.to_string()))?,
    };
    let portfolio = db
        .update_portfolio(user_id, &update.portfolio)
        .await
        .map_err(part_error(SavePart::Portfolio))?;
    let social_links = db
        .update_social_links(user_id, &update.social)
        .await
        .map_err(part_error(SavePart::SocialLinks))?;

    info!(user_id = %user_id, "Profile saved");
    Ok(ProfileRecord {
        user,
        portfolio,
        social_links,
    })
}
