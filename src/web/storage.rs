use crate::model::storage::{Storage, StorageError};
use wasm_bindgen::JsValue;

fn storage_error(error: &JsValue) -> StorageError {
	StorageError(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

/// The window's `localStorage`, looked up on each access.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
	fn get() -> Result<web_sys::Storage, StorageError> {
		web_sys::window()
			.ok_or_else(|| StorageError("no global `window` exists".to_owned()))?
			.local_storage()
			.map_err(|error| storage_error(&error))?
			.ok_or_else(|| StorageError("localStorage is disabled".to_owned()))
	}
}

impl Storage for LocalStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Self::get()?.get_item(key).map_err(|error| storage_error(&error))
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		Self::get()?.set_item(key, value).map_err(|error| storage_error(&error))
	}
}
