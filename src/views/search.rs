use crate::{
	dom::{DomError, LiveNode},
	events::{Handlers, UiEvent},
};
use tracing::debug;

/// The search form in the header. It is never rendered, only read and cleared.
#[derive(Debug)]
pub struct SearchView<N: LiveNode> {
	form: N,
	search: Handlers<String>,
}

impl<N: LiveNode> SearchView<N> {
	pub const SELECTOR: &'static str = ".search";
	pub const FIELD: &'static str = "query";

	#[must_use]
	pub fn new(form: N) -> Self {
		Self { form, search: Handlers::default() }
	}

	#[must_use]
	pub fn mount(root: &N) -> Option<Self> {
		root.query_selector(Self::SELECTOR).map(Self::new)
	}

	#[must_use]
	pub fn form(&self) -> &N {
		&self.form
	}

	/// `handler` receives the trimmed query of each non-blank submission.
	pub fn add_handler_search(&mut self, handler: impl 'static + FnMut(String)) {
		self.search.add(handler);
	}

	/// # Errors
	///
	/// Iff the search field can't be written.
	pub fn clear_input(&self) -> Result<(), DomError> {
		match self.form.query_selector(".search__field") {
			Some(field) => field.set_form_value(""),
			None => Ok(()),
		}
	}

	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		let query = match event {
			UiEvent::Submit { form, fields } if form.is_same_node(&self.form) => fields.get(Self::FIELD).map_or("", |query| query.trim()),
			_ => return 0,
		};
		if query.is_empty() {
			debug!("Ignoring blank search.");
			return 0;
		}
		self.search.emit(query.to_owned())
	}
}
