//! libSQL backend: async `Database` trait implementation.
//!
//! Supports local file and in-memory databases. All statements share one
//! connection; writes take `write_lock` so a designer-provisioning
//! transaction never has another task's statement interleaved into it.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use libsql::{Connection, Database as LibSqlDatabase, params};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::intake::{ClientIntake, DesignerIntake};
use crate::store::migrations;
use crate::store::models::{
    AccountChanges, Client, ClientType, Portfolio, PortfolioChanges, SocialLinkChanges,
    SocialLinks, User, Visibility,
};
use crate::store::traits::{Database, ProvisionedDesigner};

/// libSQL database backend.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
    write_lock: Mutex<()>,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        backend.run_migrations().await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
            write_lock: Mutex::new(()),
        })
    }

    fn conn(&self) -> &Connection {
        &self.conn
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Parse an RFC 3339 or SQLite datetime string into DateTime<Utc>.
fn parse_datetime(s: &str) -> DateTime<Utc> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return dt.with_timezone(&Utc);
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return ndt.and_utc();
    }
    if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return ndt.and_utc();
    }
    DateTime::<Utc>::MIN_UTC
}

/// Convert `Option<&str>` to libsql Value.
fn opt_text(s: Option<&str>) -> libsql::Value {
    match s {
        Some(s) => libsql::Value::Text(s.to_string()),
        None => libsql::Value::Null,
    }
}

fn opt_int(n: Option<u32>) -> libsql::Value {
    match n {
        Some(n) => libsql::Value::Integer(i64::from(n)),
        None => libsql::Value::Null,
    }
}

fn to_json_list(items: &[String]) -> Result<String, DatabaseError> {
    serde_json::to_string(items).map_err(|e| DatabaseError::Serialization(e.to_string()))
}

fn from_json_list(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn parse_uuid(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::Serialization(format!("bad id '{raw}': {e}")))
}

const CLIENT_COLUMNS: &str = "id, full_name, email, client_type, business_name, looking_for, project_description, budget_range, timeline, inspiration_images, created_at, updated_at";

const USER_COLUMNS: &str = "id, full_name, email, phone, country, city, years_of_experience, design_areas, portfolio_link, profile_picture_url, created_at, updated_at";

const PORTFOLIO_COLUMNS: &str = "id, user_id, username, portfolio_title, bio, professional_bio, skills, portfolio_url, profile_picture_url, theme_color, location, timezone, visibility, created_at, updated_at";

const SOCIAL_COLUMNS: &str = "id, user_id, dribbble_url, dribbble_connected, linkedin_url, instagram_url, twitter_url, created_at, updated_at";

/// Map a row in CLIENT_COLUMNS order to a Client.
fn row_to_client(row: &libsql::Row) -> Result<Client, DatabaseError> {
    let get = |e: libsql::Error| DatabaseError::Query(format!("client row parse: {e}"));
    let id: String = row.get(0).map_err(get)?;
    let client_type: String = row.get(3).map_err(get)?;
    let images: String = row.get(9).map_err(get)?;
    let created: String = row.get(10).map_err(get)?;
    let updated: String = row.get(11).map_err(get)?;

    Ok(Client {
        id: parse_uuid(&id)?,
        full_name: row.get(1).map_err(get)?,
        email: row.get(2).map_err(get)?,
        client_type: client_type
            .parse::<ClientType>()
            .map_err(DatabaseError::Serialization)?,
        business_name: row.get(4).ok(),
        looking_for: row.get(5).map_err(get)?,
        project_description: row.get(6).ok(),
        budget_range: row.get(7).ok(),
        timeline: row.get(8).ok(),
        inspiration_images: from_json_list(&images),
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

/// Map a row in USER_COLUMNS order to a User.
fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    let get = |e: libsql::Error| DatabaseError::Query(format!("user row parse: {e}"));
    let id: String = row.get(0).map_err(get)?;
    let years: Option<i64> = row.get::<i64>(6).ok();
    let created: String = row.get(10).map_err(get)?;
    let updated: String = row.get(11).map_err(get)?;

    Ok(User {
        id: parse_uuid(&id)?,
        full_name: row.get(1).map_err(get)?,
        email: row.get(2).map_err(get)?,
        phone: row.get(3).ok(),
        country: row.get(4).ok(),
        city: row.get(5).ok(),
        years_of_experience: years.and_then(|y| u32::try_from(y).ok()),
        design_areas: row.get(7).ok(),
        portfolio_link: row.get(8).ok(),
        profile_picture_url: row.get(9).ok(),
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

/// Map a row in PORTFOLIO_COLUMNS order to a Portfolio.
fn row_to_portfolio(row: &libsql::Row) -> Result<Portfolio, DatabaseError> {
    let get = |e: libsql::Error| DatabaseError::Query(format!("portfolio row parse: {e}"));
    let id: String = row.get(0).map_err(get)?;
    let user_id: String = row.get(1).map_err(get)?;
    let skills: String = row.get(6).map_err(get)?;
    let visibility: String = row.get(12).map_err(get)?;
    let created: String = row.get(13).map_err(get)?;
    let updated: String = row.get(14).map_err(get)?;

    Ok(Portfolio {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        username: row.get(2).ok(),
        portfolio_title: row.get(3).ok(),
        bio: row.get(4).ok(),
        professional_bio: row.get(5).ok(),
        skills: from_json_list(&skills),
        portfolio_url: row.get(7).ok(),
        profile_picture_url: row.get(8).ok(),
        theme_color: row.get(9).map_err(get)?,
        location: row.get(10).ok(),
        timezone: row.get(11).ok(),
        visibility: visibility.parse::<Visibility>().unwrap_or_default(),
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

/// Map a row in SOCIAL_COLUMNS order to SocialLinks.
fn row_to_social(row: &libsql::Row) -> Result<SocialLinks, DatabaseError> {
    let get = |e: libsql::Error| DatabaseError::Query(format!("social_links row parse: {e}"));
    let id: String = row.get(0).map_err(get)?;
    let user_id: String = row.get(1).map_err(get)?;
    let connected: bool = row.get::<i64>(3).unwrap_or(0) != 0;
    let created: String = row.get(7).map_err(get)?;
    let updated: String = row.get(8).map_err(get)?;

    Ok(SocialLinks {
        id: parse_uuid(&id)?,
        user_id: parse_uuid(&user_id)?,
        dribbble_url: row.get(2).ok(),
        dribbble_connected: connected,
        linkedin_url: row.get(4).ok(),
        instagram_url: row.get(5).ok(),
        twitter_url: row.get(6).ok(),
        created_at: parse_datetime(&created),
        updated_at: parse_datetime(&updated),
    })
}

impl LibSqlBackend {
    /// Run a single-row SELECT and map the first row, if any.
    async fn query_one<T>(
        &self,
        context: &str,
        sql: &str,
        params: impl libsql::params::IntoParams,
        map: fn(&libsql::Row) -> Result<T, DatabaseError>,
    ) -> Result<Option<T>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::from_libsql(context, e))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(map(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::from_libsql(context, e)),
        }
    }

    async fn require_portfolio(&self, user_id: Uuid) -> Result<Portfolio, DatabaseError> {
        self.get_portfolio(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "portfolio".into(),
                id: user_id.to_string(),
            })
    }

    async fn require_social_links(&self, user_id: Uuid) -> Result<SocialLinks, DatabaseError> {
        self.get_social_links(user_id)
            .await?
            .ok_or_else(|| DatabaseError::NotFound {
                entity: "social links".into(),
                id: user_id.to_string(),
            })
    }
}

// ── Trait implementation ────────────────────────────────────────────

#[async_trait]
impl Database for LibSqlBackend {
    async fn run_migrations(&self) -> Result<(), DatabaseError> {
        migrations::run_migrations(self.conn()).await
    }

    // ── Clients ─────────────────────────────────────────────────────

    async fn create_client(&self, intake: &ClientIntake) -> Result<Client, DatabaseError> {
        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            full_name: intake.full_name.clone(),
            email: intake.email.clone(),
            client_type: intake.client_type,
            business_name: intake.business_name.clone(),
            looking_for: intake.looking_for.clone(),
            project_description: intake.project_description.clone(),
            budget_range: intake.budget_range.clone(),
            timeline: intake.timeline.clone(),
            inspiration_images: intake.inspiration_images.clone(),
            created_at: now,
            updated_at: now,
        };

        let _guard = self.write_lock.lock().await;
        self.conn()
            .execute(
                &format!(
                    "INSERT INTO clients ({CLIENT_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                params![
                    client.id.to_string(),
                    client.full_name.as_str(),
                    client.email.as_str(),
                    client.client_type.to_string(),
                    opt_text(client.business_name.as_deref()),
                    client.looking_for.as_str(),
                    opt_text(client.project_description.as_deref()),
                    opt_text(client.budget_range.as_deref()),
                    opt_text(client.timeline.as_deref()),
                    to_json_list(&client.inspiration_images)?,
                    now.to_rfc3339(),
                    now.to_rfc3339(),
                ],
            )
            .await
            .map_err(|e| DatabaseError::from_libsql("create_client", e))?;

        debug!(client_id = %client.id, client_type = %client.client_type, "Client inserted");
        Ok(client)
    }

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, DatabaseError> {
        self.query_one(
            "get_client",
            &format!("SELECT {CLIENT_COLUMNS} FROM clients WHERE id = ?1"),
            params![id.to_string()],
            row_to_client,
        )
        .await
    }

    async fn get_client_by_email(&self, email: &str) -> Result<Option<Client>, DatabaseError> {
        self.query_one(
            "get_client_by_email",
            &format!(
                "SELECT {CLIENT_COLUMNS} FROM clients WHERE email = ?1 \
                 ORDER BY created_at DESC, rowid DESC LIMIT 1"
            ),
            params![email],
            row_to_client,
        )
        .await
    }

    // ── Designers ───────────────────────────────────────────────────

    async fn create_designer(
        &self,
        intake: &DesignerIntake,
    ) -> Result<ProvisionedDesigner, DatabaseError> {
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            full_name: intake.full_name.clone(),
            email: intake.email.clone(),
            phone: intake.phone.clone(),
            country: intake.country.clone(),
            city: None,
            years_of_experience: intake.years_of_experience,
            design_areas: intake.design_areas.clone(),
            portfolio_link: None,
            profile_picture_url: None,
            created_at: now,
            updated_at: now,
        };
        let mut portfolio = Portfolio::empty(user.id);
        portfolio.created_at = now;
        portfolio.updated_at = now;
        let mut social_links = SocialLinks::empty(user.id);
        social_links.created_at = now;
        social_links.updated_at = now;

        let _guard = self.write_lock.lock().await;
        let tx = self
            .conn()
            .transaction()
            .await
            .map_err(|e| DatabaseError::from_libsql("create_designer begin", e))?;

        tx.execute(
            &format!(
                "INSERT INTO users ({USER_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
            ),
            params![
                user.id.to_string(),
                user.full_name.as_str(),
                user.email.as_str(),
                opt_text(user.phone.as_deref()),
                opt_text(user.country.as_deref()),
                libsql::Value::Null,
                opt_int(user.years_of_experience),
                opt_text(user.design_areas.as_deref()),
                libsql::Value::Null,
                libsql::Value::Null,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::from_libsql("create_designer user", e))?;

        tx.execute(
            "INSERT INTO portfolios (id, user_id, theme_color, visibility, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                portfolio.id.to_string(),
                user.id.to_string(),
                portfolio.theme_color.as_str(),
                portfolio.visibility.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::from_libsql("create_designer portfolio", e))?;

        tx.execute(
            "INSERT INTO social_links (id, user_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                social_links.id.to_string(),
                user.id.to_string(),
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .await
        .map_err(|e| DatabaseError::from_libsql("create_designer social_links", e))?;

        tx.commit()
            .await
            .map_err(|e| DatabaseError::from_libsql("create_designer commit", e))?;

        info!(user_id = %user.id, "Designer provisioned");
        Ok(ProvisionedDesigner {
            user,
            portfolio,
            social_links,
        })
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError> {
        self.query_one(
            "get_user",
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id.to_string()],
            row_to_user,
        )
        .await
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        self.query_one(
            "get_user_by_email",
            &format!("SELECT {USER_COLUMNS} FROM users WHERE email = ?1"),
            params![email],
            row_to_user,
        )
        .await
    }

    async fn update_user(&self, id: Uuid, changes: &AccountChanges) -> Result<User, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let affected = {
            let _guard = self.write_lock.lock().await;
            self.conn()
                .execute(
                    "UPDATE users SET full_name = ?1, phone = ?2, country = ?3, city = ?4, \
                     years_of_experience = ?5, design_areas = ?6, portfolio_link = ?7, \
                     updated_at = ?8 WHERE id = ?9",
                    params![
                        changes.full_name.as_str(),
                        opt_text(changes.phone.as_deref()),
                        opt_text(changes.country.as_deref()),
                        opt_text(changes.city.as_deref()),
                        opt_int(changes.years_of_experience),
                        opt_text(changes.design_areas.as_deref()),
                        opt_text(changes.portfolio_link.as_deref()),
                        now,
                        id.to_string(),
                    ],
                )
                .await
                .map_err(|e| DatabaseError::from_libsql("update_user", e))?
        };

        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "user".into(),
                id: id.to_string(),
            });
        }
        debug!(user_id = %id, "User updated");
        self.get_user(id).await?.ok_or_else(|| DatabaseError::NotFound {
            entity: "user".into(),
            id: id.to_string(),
        })
    }

    // ── Portfolio ───────────────────────────────────────────────────

    async fn get_portfolio(&self, user_id: Uuid) -> Result<Option<Portfolio>, DatabaseError> {
        self.query_one(
            "get_portfolio",
            &format!("SELECT {PORTFOLIO_COLUMNS} FROM portfolios WHERE user_id = ?1"),
            params![user_id.to_string()],
            row_to_portfolio,
        )
        .await
    }

    async fn update_portfolio(
        &self,
        user_id: Uuid,
        changes: &PortfolioChanges,
    ) -> Result<Portfolio, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let affected = {
            let _guard = self.write_lock.lock().await;
            self.conn()
                .execute(
                    "UPDATE portfolios SET username = ?1, portfolio_title = ?2, bio = ?3, \
                     professional_bio = ?4, skills = ?5, portfolio_url = ?6, \
                     profile_picture_url = ?7, theme_color = ?8, location = ?9, timezone = ?10, \
                     visibility = ?11, updated_at = ?12 WHERE user_id = ?13",
                    params![
                        opt_text(changes.username.as_deref()),
                        opt_text(changes.portfolio_title.as_deref()),
                        opt_text(changes.bio.as_deref()),
                        opt_text(changes.professional_bio.as_deref()),
                        to_json_list(&changes.skills)?,
                        opt_text(changes.portfolio_url.as_deref()),
                        opt_text(changes.profile_picture_url.as_deref()),
                        changes.theme_color.as_str(),
                        opt_text(changes.location.as_deref()),
                        opt_text(changes.timezone.as_deref()),
                        changes.visibility.to_string(),
                        now,
                        user_id.to_string(),
                    ],
                )
                .await
                .map_err(|e| DatabaseError::from_libsql("update_portfolio", e))?
        };

        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "portfolio".into(),
                id: user_id.to_string(),
            });
        }
        debug!(user_id = %user_id, "Portfolio updated");
        self.require_portfolio(user_id).await
    }

    // ── Social links ────────────────────────────────────────────────

    async fn get_social_links(&self, user_id: Uuid) -> Result<Option<SocialLinks>, DatabaseError> {
        self.query_one(
            "get_social_links",
            &format!("SELECT {SOCIAL_COLUMNS} FROM social_links WHERE user_id = ?1"),
            params![user_id.to_string()],
            row_to_social,
        )
        .await
    }

    async fn update_social_links(
        &self,
        user_id: Uuid,
        changes: &SocialLinkChanges,
    ) -> Result<SocialLinks, DatabaseError> {
        let now = Utc::now().to_rfc3339();
        let affected = {
            let _guard = self.write_lock.lock().await;
            self.conn()
                .execute(
                    "UPDATE social_links SET dribbble_url = ?1, linkedin_url = ?2, \
                     instagram_url = ?3, twitter_url = ?4, updated_at = ?5 WHERE user_id = ?6",
                    params![
                        opt_text(changes.dribbble_url.as_deref()),
                        opt_text(changes.linkedin_url.as_deref()),
                        opt_text(changes.instagram_url.as_deref()),
                        opt_text(changes.twitter_url.as_deref()),
                        now,
                        user_id.to_string(),
                    ],
                )
                .await
                .map_err(|e| DatabaseError::from_libsql("update_social_links", e))?
        };

        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "social links".into(),
                id: user_id.to_string(),
            });
        }
        debug!(user_id = %user_id, "Social links updated");
        self.require_social_links(user_id).await
    }

    async fn set_connection(
        &self,
        user_id: Uuid,
        provider: &str,
        connected: bool,
        url: Option<&str>,
    ) -> Result<SocialLinks, DatabaseError> {
        // Only providers with a connected flag column can be linked.
        let sql = match provider {
            "dribbble" => {
                "UPDATE social_links SET dribbble_connected = ?1, \
                 dribbble_url = COALESCE(?2, dribbble_url), updated_at = ?3 WHERE user_id = ?4"
            }
            other => {
                return Err(DatabaseError::Constraint(format!(
                    "no connection column for provider '{other}'"
                )));
            }
        };

        let now = Utc::now().to_rfc3339();
        let affected = {
            let _guard = self.write_lock.lock().await;
            self.conn()
                .execute(
                    sql,
                    params![i64::from(connected), opt_text(url), now, user_id.to_string()],
                )
                .await
                .map_err(|e| DatabaseError::from_libsql("set_connection", e))?
        };

        if affected == 0 {
            return Err(DatabaseError::NotFound {
                entity: "social links".into(),
                id: user_id.to_string(),
            });
        }
        info!(user_id = %user_id, provider, connected, "Social connection recorded");
        self.require_social_links(user_id).await
    }
}
