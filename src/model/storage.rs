use core::cell::RefCell;
use hashbrown::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("storage is unavailable: {0}")]
pub struct StorageError(pub String);

/// A string key-value store, like the browser's `localStorage`.
pub trait Storage {
	/// # Errors
	///
	/// Iff the store can't be read.
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

	/// # Errors
	///
	/// Iff the store can't be written, for example because its quota is exhausted.
	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// A [`Storage`] that lives as long as the value, for tests and headless use.
///
/// Clones copy the current items. Share one store through a reference or an [`Rc`].
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
	items: RefCell<HashMap<String, String>>,
}

impl MemoryStorage {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}
}

impl Storage for MemoryStorage {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		Ok(self.items.borrow().get(key).cloned())
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
		Ok(())
	}
}

impl<S: Storage + ?Sized> Storage for &S {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		(**self).get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		(**self).set_item(key, value)
	}
}

impl<S: Storage + ?Sized> Storage for Rc<S> {
	fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
		(**self).get_item(key)
	}

	fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
		(**self).set_item(key, value)
	}
}
