//! Client-side state persisted between runs as JSON files

use log::{debug, warn};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::Path;

use crate::auth::{Auth, Session};
use crate::error::Error;
use crate::i18n::Locale;
use crate::models::{ListingFilter, Profile};

/// Recent searches kept by [`SearchStore`]
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Read a store from disk
///
/// A missing file yields the default state. A file that no longer parses is
/// ignored with a warning, so a schema change never locks the user out.
pub async fn load<T: DeserializeOwned + Default>(path: impl AsRef<Path>) -> Result<T, Error> {
    let path = path.as_ref();
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(Error::general(format!("{}: {}", path.display(), e))),
    };

    match serde_json::from_slice(&bytes) {
        Ok(state) => Ok(state),
        Err(e) => {
            warn!("discarding unreadable store {}: {}", path.display(), e);
            Ok(T::default())
        }
    }
}

/// Write a store to disk, creating parent directories as needed
pub async fn save<T: Serialize>(path: impl AsRef<Path>, state: &T) -> Result<(), Error> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Error::general(format!("{}: {}", parent.display(), e)))?;
    }

    let json = serde_json::to_vec_pretty(state)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| Error::general(format!("{}: {}", path.display(), e)))?;
    debug!("saved {}", path.display());
    Ok(())
}

/// Signed-in user and their profile
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuthStore {
    pub session: Option<Session>,
    pub profile: Option<Profile>,
}

impl AuthStore {
    pub fn sign_in(&mut self, session: Session, profile: Profile) {
        self.session = Some(session);
        self.profile = Some(profile);
    }

    pub fn sign_out(&mut self) {
        self.session = None;
        self.profile = None;
    }

    /// Whether a non-expired session is stored
    pub fn is_authenticated(&self) -> bool {
        self.session.as_ref().map(|s| !s.is_expired()).unwrap_or(false)
    }

    /// Hand the stored session to the auth client
    ///
    /// An expired session is dropped from the store instead. Returns whether
    /// a session was restored.
    pub fn restore_into(&mut self, auth: &Auth) -> bool {
        match self.session.take() {
            Some(session) if !session.is_expired() => {
                auth.set_session(session.clone());
                self.session = Some(session);
                true
            }
            Some(_) => {
                self.profile = None;
                false
            }
            None => false,
        }
    }
}

/// Browse page search state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStore {
    pub query: String,
    pub category_id: Option<String>,
    pub subcategory_id: Option<String>,
    pub location: Option<String>,
    /// Most recent first
    #[serde(default)]
    pub recent: VecDeque<String>,
}

impl SearchStore {
    /// Record a submitted search term
    ///
    /// Blank terms are ignored; a term already in the list moves to the front.
    pub fn push_recent(&mut self, term: &str) {
        let term = term.trim();
        if term.is_empty() {
            return;
        }

        self.recent.retain(|t| !t.eq_ignore_ascii_case(term));
        self.recent.push_front(term.to_string());
        self.recent.truncate(MAX_RECENT_SEARCHES);
    }

    /// Submit the current query
    pub fn submit(&mut self, query: &str) {
        self.query = query.trim().to_string();
        let query = self.query.clone();
        self.push_recent(&query);
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
    }

    /// Reset the filters, keeping recent searches
    pub fn reset(&mut self) {
        self.query.clear();
        self.category_id = None;
        self.subcategory_id = None;
        self.location = None;
    }

    /// Filter for [`ListingService::browse`](crate::services::ListingService::browse)
    pub fn to_filter(&self) -> ListingFilter {
        let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.trim().is_empty());
        ListingFilter {
            category_id: non_empty(&self.category_id),
            subcategory_id: non_empty(&self.subcategory_id),
            search: Some(self.query.clone()).filter(|q| !q.is_empty()),
            location: non_empty(&self.location),
            min_price: None,
            max_price: None,
        }
    }
}

/// How listing cards are laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

/// Interface preferences
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UiStore {
    #[serde(default)]
    pub locale: Locale,
    #[serde(default)]
    pub view_mode: ViewMode,
}

impl UiStore {
    pub fn toggle_view_mode(&mut self) {
        self.view_mode = match self.view_mode {
            ViewMode::Grid => ViewMode::List,
            ViewMode::List => ViewMode::Grid,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn recent_searches_are_bounded_and_deduplicated() {
        let mut store = SearchStore::default();
        for i in 0..12 {
            store.push_recent(&format!("term {}", i));
        }
        store.push_recent("  ");
        store.push_recent("TERM 5");

        assert_eq!(store.recent.len(), MAX_RECENT_SEARCHES);
        assert_eq!(store.recent[0], "TERM 5");
        assert_eq!(store.recent.iter().filter(|t| t.eq_ignore_ascii_case("term 5")).count(), 1);
        assert!(!store.recent.contains(&"term 0".to_string()));
    }

    #[test]
    fn filter_drops_blank_fields() {
        let mut store = SearchStore {
            category_id: Some("vehicules".into()),
            location: Some(" ".into()),
            ..Default::default()
        };
        store.submit(" moto ");
        let filter = store.to_filter();
        assert_eq!(filter.search.as_deref(), Some("moto"));
        assert_eq!(filter.category_id.as_deref(), Some("vehicules"));
        assert_eq!(filter.location, None);
    }

    #[test]
    fn ui_store_survives_a_restart() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state").join("ui.json");

        tokio_test::block_on(async {
            let fresh: UiStore = load(&path).await.unwrap();
            assert_eq!(fresh.locale, Locale::Fr);

            let mut ui = UiStore {
                locale: Locale::En,
                ..Default::default()
            };
            ui.toggle_view_mode();
            save(&path, &ui).await.unwrap();

            let loaded: UiStore = load(&path).await.unwrap();
            assert_eq!(loaded, ui);
            assert_eq!(loaded.view_mode, ViewMode::List);
        });
    }

    #[test]
    fn corrupt_store_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("search.json");
        std::fs::write(&path, b"{not json").unwrap();

        let store: SearchStore = tokio_test::block_on(load(&path)).unwrap();
        assert_eq!(store, SearchStore::default());
    }
}
