//! Normalized UI events and the callback tables views translate them into.

use core::fmt;
use std::collections::BTreeMap;
use tracing::trace;

/// A raw UI event as delivered to a view by the backend's listeners.
#[derive(Debug, Clone)]
pub enum UiEvent<N> {
	/// `target` is the innermost node that was clicked.
	Click { target: N },
	/// `form` was submitted. `fields` maps control names to their current values.
	Submit { form: N, fields: BTreeMap<String, String> },
	/// The location hash changed. `hash` excludes the leading `#`.
	HashChange { hash: String },
	/// The page finished loading. `hash` excludes the leading `#`.
	Load { hash: String },
}

/// Strips the leading `#` from a location hash.
#[must_use]
pub fn hash_id(hash: &str) -> &str {
	hash.strip_prefix('#').unwrap_or(hash)
}

/// A registration table for one kind of normalized callback.
pub struct Handlers<A> {
	callbacks: Vec<Box<dyn FnMut(A)>>,
}

impl<A> Default for Handlers<A> {
	fn default() -> Self {
		Self { callbacks: Vec::new() }
	}
}

impl<A> fmt::Debug for Handlers<A> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Handlers").field("len", &self.callbacks.len()).finish()
	}
}

impl<A: Clone> Handlers<A> {
	pub fn add(&mut self, callback: impl 'static + FnMut(A)) {
		self.callbacks.push(Box::new(callback));
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.callbacks.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.callbacks.is_empty()
	}

	/// Calls every registered callback once with `argument`, in registration order.
	///
	/// Returns the number of callbacks invoked.
	pub fn emit(&mut self, argument: A) -> usize {
		trace!("Emitting to {} handler(s).", self.callbacks.len());
		if let Some((last, rest)) = self.callbacks.split_last_mut() {
			for callback in rest {
				callback(argument.clone());
			}
			last(argument);
		}
		self.callbacks.len()
	}
}
