use std::sync::{Arc, Mutex, PoisonError};

use tracing::debug;

/// The page location the session guard redirects.
///
/// This is the only way the client touches navigation, so hosts decide what
/// "going to the login page" means for them.
pub trait Location: Send + Sync {
    /// The path of the current page, without query string.
    fn current_path(&self) -> String;

    /// Navigates to `url`, adding a history entry.
    fn assign(&self, url: &str);

    /// Replaces the current entry with `url` without navigating away.
    fn replace(&self, url: &str);
}

/// In-memory page location with a navigation history.
///
/// Clones share the same history.
#[derive(Debug, Clone)]
pub struct MemoryLocation {
    history: Arc<Mutex<Vec<String>>>,
}

impl MemoryLocation {
    /// Creates a location positioned at `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            history: Arc::new(Mutex::new(vec![url.into()])),
        }
    }

    /// The full URL of the current entry.
    pub fn current_url(&self) -> String {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
            .unwrap_or_default()
    }

    /// Every entry, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of navigations performed since creation.
    pub fn navigations(&self) -> usize {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
            .saturating_sub(1)
    }
}

impl Default for MemoryLocation {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Location for MemoryLocation {
    fn current_path(&self) -> String {
        path_of(&self.current_url()).to_string()
    }

    fn assign(&self, url: &str) {
        debug!(%url, "navigating");
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(url.to_string());
    }

    fn replace(&self, url: &str) {
        debug!(%url, "replacing current location");
        let mut history = self.history.lock().unwrap_or_else(PoisonError::into_inner);
        match history.last_mut() {
            Some(current) => url.clone_into(current),
            None => history.push(url.to_string()),
        }
    }
}

/// Strips the query string and fragment of a URL.
pub(crate) fn path_of(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    url.get(..end).unwrap_or(url)
}
