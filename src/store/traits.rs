//! Backend-agnostic `Database` trait: a single async interface for all persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::DatabaseError;
use crate::intake::{ClientIntake, DesignerIntake};
use crate::store::models::{
    AccountChanges, Client, Portfolio, PortfolioChanges, SocialLinkChanges, SocialLinks, User,
};

/// A designer together with the companion rows created alongside it.
#[derive(Debug, Clone)]
pub struct ProvisionedDesigner {
    pub user: User,
    pub portfolio: Portfolio,
    pub social_links: SocialLinks,
}

/// Backend-agnostic database trait covering clients, designers, portfolios
/// and social links.
#[async_trait]
pub trait Database: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Clients ─────────────────────────────────────────────────────

    /// Insert a client from a validated intake record.
    async fn create_client(&self, intake: &ClientIntake) -> Result<Client, DatabaseError>;

    async fn get_client(&self, id: Uuid) -> Result<Option<Client>, DatabaseError>;

    /// Most recently created client with this email.
    async fn get_client_by_email(&self, email: &str) -> Result<Option<Client>, DatabaseError>;

    // ── Designers ───────────────────────────────────────────────────

    /// Create a user plus an empty portfolio and empty social links.
    ///
    /// All three rows are written atomically; a failure leaves nothing behind.
    async fn create_designer(
        &self,
        intake: &DesignerIntake,
    ) -> Result<ProvisionedDesigner, DatabaseError>;

    async fn get_user(&self, id: Uuid) -> Result<Option<User>, DatabaseError>;

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;

    /// Update the editable account fields. `NotFound` if the user is missing.
    async fn update_user(&self, id: Uuid, changes: &AccountChanges) -> Result<User, DatabaseError>;

    // ── Portfolio ───────────────────────────────────────────────────

    async fn get_portfolio(&self, user_id: Uuid) -> Result<Option<Portfolio>, DatabaseError>;

    async fn update_portfolio(
        &self,
        user_id: Uuid,
        changes: &PortfolioChanges,
    ) -> Result<Portfolio, DatabaseError>;

    // ── Social links ────────────────────────────────────────────────

    async fn get_social_links(&self, user_id: Uuid) -> Result<Option<SocialLinks>, DatabaseError>;

    async fn update_social_links(
        &self,
        user_id: Uuid,
        changes: &SocialLinkChanges,
    ) -> Result<SocialLinks, DatabaseError>;

    /// Record the outcome of an OAuth link. `url` of `None` keeps the
    /// stored URL.
    async fn set_connection(
        &self,
        user_id: Uuid,
        provider: &str,
        connected: bool,
        url: Option<&str>,
    ) -> Result<SocialLinks, DatabaseError>;
}
