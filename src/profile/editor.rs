//! Tabbed profile editor.
//!
//! Edits stay local in a `ProfileForm` until `save` is called. A failed save
//! leaves the form as the user left it.

use tracing::debug;
use uuid::Uuid;

use super::{ProfileForm, ProfileRecord, load_profile, save_profile};
use crate::error::{DatabaseError, SaveError};
use crate::store::Database;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorTab {
    #[default]
    Account,
    Portfolio,
    Social,
    Preferences,
}

impl EditorTab {
    pub const ALL: [EditorTab; 4] = [
        EditorTab::Account,
        EditorTab::Portfolio,
        EditorTab::Social,
        EditorTab::Preferences,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Account => "Account",
            Self::Portfolio => "Portfolio",
            Self::Social => "Social",
            Self::Preferences => "Preferences",
        }
    }
}

/// One-time UI effects already shown in this view.
///
/// Owned by whoever constructs the editor and handed back with
/// `into_flags`, so it outlives a single editor instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewFlags {
    greeting_shown: bool,
}

impl ViewFlags {
    pub fn greeting_shown(&self) -> bool {
        self.greeting_shown
    }
}

pub struct ProfileEditor {
    user_id: Uuid,
    tab: EditorTab,
    loaded: ProfileRecord,
    form: ProfileForm,
    flags: ViewFlags,
}

impl ProfileEditor {
    pub fn new(record: ProfileRecord, flags: ViewFlags) -> Self {
        let form = ProfileForm::from_record(&record);
        Self {
            user_id: record.user.id,
            tab: EditorTab::default(),
            loaded: record,
            form,
            flags,
        }
    }

    /// Load the record for `user_id` and open an editor on it.
    pub async fn open(
        db: &dyn Database,
        user_id: Uuid,
        flags: ViewFlags,
    ) -> Result<Self, DatabaseError> {
        let record = load_profile(db, user_id).await?;
        Ok(Self::new(record, flags))
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn tab(&self) -> EditorTab {
        self.tab
    }

    pub fn select_tab(&mut self, tab: EditorTab) {
        self.tab = tab;
    }

    /// The record as last loaded or saved.
    pub fn record(&self) -> &ProfileRecord {
        &self.loaded
    }

    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProfileForm {
        &mut self.form
    }

    /// Whether the form differs from the last loaded or saved record.
    pub fn is_dirty(&self) -> bool {
        self.form != ProfileForm::from_record(&self.loaded)
    }

    /// Throw away local edits.
    pub fn discard(&mut self) {
        self.form = ProfileForm::from_record(&self.loaded);
    }

    pub fn dribbble_connected(&self) -> bool {
        self.loaded.social_links.dribbble_connected
    }

    /// True the first time it is called for this view, false afterwards.
    pub fn take_greeting(&mut self) -> bool {
        !std::mem::replace(&mut self.flags.greeting_shown, true)
    }

    pub fn into_flags(self) -> ViewFlags {
        self.flags
    }

    /// Persist the form. On success the editor rebinds to the saved record.
    pub async fn save(&mut self, db: &dyn Database) -> Result<(), SaveError> {
        if self.form.full_name.trim().is_empty() {
            return Err(SaveError::Validation("fullName is required".into()));
        }
        let update = self.form.to_update()?;
        let saved = save_profile(db, self.user_id, &update).await?;
        debug!(user_id = %self.user_id, "Editor rebound to saved profile");
        self.form = ProfileForm::from_record(&saved);
        self.loaded = saved;
        Ok(())
    }

    /// Re-read the record, e.g. after an OAuth round trip. Local edits are kept.
    pub async fn refresh(&mut self, db: &dyn Database) -> Result<(), DatabaseError> {
        self.loaded = load_profile(db, self.user_id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SavePart;
    use crate::profile::tests::seeded;

    #[tokio::test]
    async fn tabs_and_dirty_tracking() {
        let (db, user_id) = seeded().await;
        let mut editor = ProfileEditor::open(&db, user_id, ViewFlags::default())
            .await
            .unwrap();
        assert_eq!(editor.tab(), EditorTab::Account);
        assert!(!editor.is_dirty());

        editor.select_tab(EditorTab::Preferences);
        editor.form_mut().timezone = "UTC".into();
        assert!(editor.is_dirty());
        assert_eq!(editor.tab(), EditorTab::Preferences);

        editor.discard();
        assert!(!editor.is_dirty());
    }

    #[tokio::test]
    async fn save_rebinds_and_clears_dirty() {
        let (db, user_id) = seeded().await;
        let mut editor = ProfileEditor::open(&db, user_id, ViewFlags::default())
            .await
            .unwrap();
        editor.form_mut().username = "grace".into();
        editor.save(&db).await.unwrap();

        assert!(!editor.is_dirty());
        assert_eq!(editor.record().portfolio.username.as_deref(), Some("grace"));
    }

    #[tokio::test]
    async fn failed_save_preserves_input() {
        let (db, user_id) = seeded().await;
        let mut editor = ProfileEditor::open(&db, user_id, ViewFlags::default())
            .await
            .unwrap();
        editor.form_mut().bio = "Draft bio".into();
        editor.form_mut().theme_color = "teal".into();

        assert!(matches!(editor.save(&db).await, Err(SaveError::Validation(_))));
        assert_eq!(editor.form().bio, "Draft bio");
        assert!(editor.is_dirty());
    }

    #[tokio::test]
    async fn blank_name_is_refused() {
        let (db, user_id) = seeded().await;
        let mut editor = ProfileEditor::open(&db, user_id, ViewFlags::default())
            .await
            .unwrap();
        editor.form_mut().full_name = "  ".into();
        let err = editor.save(&db).await.unwrap_err();
        assert!(!matches!(err, SaveError::Part { part: SavePart::Account, .. }));
        assert!(matches!(err, SaveError::Validation(_)));
    }

    #[tokio::test]
    async fn greeting_is_shown_once_per_view() {
        let (db, user_id) = seeded().await;
        let mut editor = ProfileEditor::open(&db, user_id, ViewFlags::default())
            .await
            .unwrap();
        assert!(editor.take_greeting());
        assert!(!editor.take_greeting());

        let flags = editor.into_flags();
        assert!(flags.greeting_shown());
        let mut reopened = ProfileEditor::open(&db, user_id, flags).await.unwrap();
        assert!(!reopened.take_greeting());
    }

    #[test]
    fn tab_labels() {
        let labels: Vec<&str> = EditorTab::ALL.iter().map(EditorTab::label).collect();
        assert_eq!(labels, ["Account", "Portfolio", "Social", "Preferences"]);
    }
}
