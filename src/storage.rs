//! Persisted view state, injected through context instead of reaching for
//! `localStorage` directly.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use log::warn;

/// Key of the bearer token sent with API requests.
pub const AUTH_TOKEN_KEY: &str = "auth_token";

/// Key-value store that survives page reloads.
pub trait StateStore: Send + Sync {
	fn load(&self, key: &str) -> Option<String>;
	fn save(&self, key: &str, value: &str);
	fn remove(&self, key: &str);
}

pub type SharedStore = Arc<dyn StateStore>;

/// Key under which a project's selected layer filter is kept.
pub fn layer_filter_key(project_id: &str) -> String {
	format!("graph_filter:{project_id}")
}

/// `window.localStorage`. Unavailable storage (private mode, no window)
/// reads as empty and drops writes.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStore;

impl BrowserStore {
	fn storage() -> Option<web_sys::Storage> {
		web_sys::window()?.local_storage().ok().flatten()
	}

	pub fn is_available() -> bool {
		Self::storage().is_some()
	}
}

impl StateStore for BrowserStore {
	fn load(&self, key: &str) -> Option<String> {
		Self::storage()?.get_item(key).ok().flatten()
	}

	fn save(&self, key: &str, value: &str) {
		let Some(storage) = Self::storage() else {
			return;
		};
		if storage.set_item(key, value).is_err() {
			warn!("Failed to persist {key}");
		}
	}

	fn remove(&self, key: &str) {
		if let Some(storage) = Self::storage() {
			let _ = storage.remove_item(key);
		}
	}
}

/// In-memory store for tests and non-browser hosts.
#[derive(Debug, Default)]
pub struct MemoryStore {
	entries: Mutex<HashMap<String, String>>,
}

impl StateStore for MemoryStore {
	fn load(&self, key: &str) -> Option<String> {
		self.entries.lock().ok()?.get(key).cloned()
	}

	fn save(&self, key: &str, value: &str) {
		if let Ok(mut entries) = self.entries.lock() {
			entries.insert(key.to_string(), value.to_string());
		}
	}

	fn remove(&self, key: &str) {
		if let Ok(mut entries) = self.entries.lock() {
			entries.remove(key);
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn memory_store_round_trips_and_removes() {
		let store: SharedStore = Arc::new(MemoryStore::default());
		assert_eq!(store.load("k"), None);
		store.save("k", "v1");
		store.save("k", "v2");
		assert_eq!(store.load("k").as_deref(), Some("v2"));
		store.remove("k");
		assert_eq!(store.load("k"), None);
	}

	#[test]
	fn filter_keys_are_per_project() {
		assert_ne!(layer_filter_key("a"), layer_filter_key("b"));
	}
}
