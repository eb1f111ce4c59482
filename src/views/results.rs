use super::preview::{generate_previews, PreviewList};
use crate::view::{Template, View};

/// The search result list. It has no handlers of its own, so it is a plain [`View`].
pub type ResultsView<N> = View<ResultsTemplate, N>;

#[derive(Debug, Clone)]
pub struct ResultsTemplate {
	icons: String,
}

impl ResultsTemplate {
	#[must_use]
	pub fn new(icons_url: impl Into<String>) -> Self {
		Self { icons: icons_url.into() }
	}
}

impl Template for ResultsTemplate {
	type Data = PreviewList;

	fn mount_selector(&self) -> &'static str {
		".results"
	}

	fn generate(&self, data: &PreviewList) -> String {
		generate_previews(data, &self.icons)
	}

	fn error_message(&self) -> &str {
		"No recipes found! Please try again."
	}

	fn icons_url(&self) -> &str {
		&self.icons
	}
}
