use super::preview::{generate_previews, PreviewList};
use crate::{
	dom::LiveNode,
	events::{Handlers, UiEvent},
	view::{Template, View},
};
use core::ops::{Deref, DerefMut};

#[derive(Debug, Clone)]
pub struct BookmarksTemplate {
	icons: String,
}

impl BookmarksTemplate {
	#[must_use]
	pub fn new(icons_url: impl Into<String>) -> Self {
		Self { icons: icons_url.into() }
	}
}

impl Template for BookmarksTemplate {
	type Data = PreviewList;

	fn mount_selector(&self) -> &'static str {
		".bookmarks__list"
	}

	fn generate(&self, data: &PreviewList) -> String {
		generate_previews(data, &self.icons)
	}

	fn error_message(&self) -> &str {
		"No bookmarks yet! Find a nice recipe and bookmark it :)"
	}

	fn icons_url(&self) -> &str {
		&self.icons
	}
}

/// The bookmark drop-down.
#[derive(Debug)]
pub struct BookmarksView<N: LiveNode> {
	view: View<BookmarksTemplate, N>,
	render: Handlers<()>,
}

impl<N: LiveNode> BookmarksView<N> {
	#[must_use]
	pub fn new(view: View<BookmarksTemplate, N>) -> Self {
		Self { view, render: Handlers::default() }
	}

	/// `handler` runs once the page has loaded, so that persisted bookmarks can be shown.
	pub fn add_handler_render(&mut self, handler: impl 'static + FnMut(())) {
		self.render.add(handler);
	}

	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		match event {
			UiEvent::Load { .. } => self.render.emit(()),
			_ => 0,
		}
	}
}

impl<N: LiveNode> Deref for BookmarksView<N> {
	type Target = View<BookmarksTemplate, N>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}

impl<N: LiveNode> DerefMut for BookmarksView<N> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.view
	}
}
