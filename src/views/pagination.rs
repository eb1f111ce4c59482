use crate::{
	dom::LiveNode,
	events::{Handlers, UiEvent},
	markup::escape_attribute,
	view::{RenderableData, Template, View},
};
use core::ops::{Deref, DerefMut};
use tracing::{debug, instrument};

/// Where the search results are currently paged to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
	/// 1-based.
	pub page: usize,
	/// Total number of results.
	pub results: usize,
	pub per_page: usize,
}

impl PageInfo {
	#[must_use]
	pub fn page_count(&self) -> usize {
		match self.per_page {
			0 => 0,
			per_page => (self.results + per_page - 1) / per_page,
		}
	}
}

/// Never empty: a single page renders as no controls rather than as an error.
impl RenderableData for PageInfo {
	fn is_empty(&self) -> bool {
		false
	}
}

#[derive(Debug, Clone)]
pub struct PaginationTemplate {
	icons: String,
}

impl PaginationTemplate {
	#[must_use]
	pub fn new(icons_url: impl Into<String>) -> Self {
		Self { icons: icons_url.into() }
	}

	fn pages(count: usize) -> String {
		format!(r#"<div class="span__inline"><span>-{}-</span></div>"#, count)
	}

	fn previous(&self, page: usize) -> String {
		format!(
			r#"<button data-goto="{goto}" class="btn--inline pagination__btn--prev">
  <svg class="search__icon">
    <use href="{icons}#icon-arrow-left"></use>
  </svg>
  <span>Page {goto}</span>
</button>"#,
			goto = page - 1,
			icons = escape_attribute(&self.icons),
		)
	}

	fn next(&self, page: usize) -> String {
		format!(
			r#"<button data-goto="{goto}" class="btn--inline pagination__btn--next">
  <span>Page {goto}</span>
  <svg class="search__icon">
    <use href="{icons}#icon-arrow-right"></use>
  </svg>
</button>"#,
			goto = page + 1,
			icons = escape_attribute(&self.icons),
		)
	}
}

impl Template for PaginationTemplate {
	type Data = PageInfo;

	fn mount_selector(&self) -> &'static str {
		".pagination"
	}

	fn generate(&self, data: &PageInfo) -> String {
		let count = data.page_count();
		let page = data.page;
		if count <= 1 || page == 0 {
			return String::new();
		}
		if page == 1 {
			format!("{}{}", Self::pages(count), self.next(page))
		} else if page == count {
			format!("{}{}", Self::pages(count), self.previous(page))
		} else if page < count {
			format!("{}{}{}", Self::pages(count), self.previous(page), self.next(page))
		} else {
			String::new()
		}
	}

	fn error_message(&self) -> &str {
		""
	}

	fn icons_url(&self) -> &str {
		&self.icons
	}
}

/// Previous/next page controls below the search results.
#[derive(Debug)]
pub struct PaginationView<N: LiveNode> {
	view: View<PaginationTemplate, N>,
	click: Handlers<u32>,
}

impl<N: LiveNode> PaginationView<N> {
	#[must_use]
	pub fn new(view: View<PaginationTemplate, N>) -> Self {
		Self { view, click: Handlers::default() }
	}

	/// `handler` receives the page number of the clicked button.
	pub fn add_handler_click(&mut self, handler: impl 'static + FnMut(u32)) {
		self.click.add(handler);
	}

	/// Returns the number of handlers invoked.
	#[instrument(skip(self, event))]
	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		let target = match event {
			UiEvent::Click { target } if self.mount_point().contains(target) => target,
			_ => return 0,
		};
		let button = match target.closest_with_class("btn--inline") {
			Some(button) => button,
			None => return 0,
		};
		match button.attribute("data-goto").and_then(|goto| goto.trim().parse::<u32>().ok()) {
			Some(goto) => self.click.emit(goto),
			None => {
				debug!("Pagination button without a valid data-goto.");
				0
			}
		}
	}
}

impl<N: LiveNode> Deref for PaginationView<N> {
	type Target = View<PaginationTemplate, N>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}

impl<N: LiveNode> DerefMut for PaginationView<N> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.view
	}
}
