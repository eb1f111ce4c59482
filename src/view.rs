//! Mount-point ownership and the render/update state machine shared by all views.

use crate::{
	dom::{DomError, LiveNode},
	markup::{self, escape_text, MarkupError},
	reconcile::{Patches, Reconciler},
};
use core::fmt;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, error, instrument, warn};

/// Data a view can be rendered from.
pub trait RenderableData {
	/// Empty data is shown as the view's error message instead of being passed to the generator.
	fn is_empty(&self) -> bool;
}

impl<T> RenderableData for Vec<T> {
	fn is_empty(&self) -> bool {
		Vec::is_empty(self)
	}
}

impl<K, V> RenderableData for BTreeMap<K, V> {
	fn is_empty(&self) -> bool {
		BTreeMap::is_empty(self)
	}
}

impl<T: RenderableData> RenderableData for Option<T> {
	fn is_empty(&self) -> bool {
		self.as_ref().map_or(true, RenderableData::is_empty)
	}
}

/// What a concrete view contributes on top of [`View`].
pub trait Template {
	type Data: RenderableData;

	/// Selector of the view's mount point in the document.
	fn mount_selector(&self) -> &'static str;

	/// Must be deterministic and must not read from the document.
	fn generate(&self, data: &Self::Data) -> String;

	fn error_message(&self) -> &str;

	fn success_message(&self) -> &str {
		""
	}

	/// URL of the icon sprite sheet referenced by the built-in spinner, error and message markup.
	fn icons_url(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
	/// Nothing has been shown yet.
	Empty,
	Loading,
	Rendered,
	Error,
	Success,
}

/// Orders data-bearing calls on one view. See [`View::ticket`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
	#[must_use]
	pub fn sequence(self) -> u64 {
		self.0
	}
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ViewError {
	/// A generator produced markup that doesn't parse. This is a bug in the generator.
	#[error("generated markup is malformed: {0}")]
	Markup(#[from] MarkupError),
	#[error("{ticket:?} is older than the last applied {applied:?}")]
	Stale { ticket: Ticket, applied: Ticket },
	#[error("no element matches the mount selector {0:?}")]
	MissingMountPoint(&'static str),
}

/// A view over one exclusively owned mount point.
pub struct View<T: Template, N: LiveNode> {
	template: T,
	mount_point: N,
	data: Option<T::Data>,
	state: ViewState,
	reconciler: Reconciler,
	issued: u64,
	applied: u64,
}

impl<T: Template, N: LiveNode> fmt::Debug for View<T, N> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("View")
			.field("selector", &self.template.mount_selector())
			.field("mount_point", &self.mount_point)
			.field("state", &self.state)
			.field("issued", &self.issued)
			.field("applied", &self.applied)
			.finish()
	}
}

impl<T: Template, N: LiveNode> View<T, N> {
	#[must_use]
	pub fn new(template: T, mount_point: N) -> Self {
		Self {
			template,
			mount_point,
			data: None,
			state: ViewState::Empty,
			reconciler: Reconciler::default(),
			issued: 0,
			applied: 0,
		}
	}

	/// Looks up the template's mount point below `root`.
	///
	/// # Errors
	///
	/// Iff nothing below `root` matches [`Template::mount_selector`].
	pub fn mount(template: T, root: &N) -> Result<Self, ViewError> {
		let selector = template.mount_selector();
		let mount_point = root.query_selector(selector).ok_or(ViewError::MissingMountPoint(selector))?;
		Ok(Self::new(template, mount_point))
	}

	#[must_use]
	pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
		self.reconciler = reconciler;
		self
	}

	#[must_use]
	pub fn reconciler(&self) -> Reconciler {
		self.reconciler
	}

	#[must_use]
	pub fn state(&self) -> ViewState {
		self.state
	}

	/// The snapshot most recently rendered or updated, if the view currently shows data.
	#[must_use]
	pub fn data(&self) -> Option<&T::Data> {
		self.data.as_ref()
	}

	#[must_use]
	pub fn mount_point(&self) -> &N {
		&self.mount_point
	}

	#[must_use]
	pub fn template(&self) -> &T {
		&self.template
	}

	/// Issues a ticket newer than all previous ones.
	///
	/// Take one before starting asynchronous work whose result will be shown here and pass it to
	/// [`render_ticketed`](`View::render_ticketed`) or [`update_ticketed`](`View::update_ticketed`),
	/// so that a slower, older load can't overwrite a newer one.
	pub fn ticket(&mut self) -> Ticket {
		self.issued += 1;
		Ticket(self.issued)
	}

	/// Whether no newer ticket than `ticket` has been issued.
	#[must_use]
	pub fn is_current(&self, ticket: Ticket) -> bool {
		ticket.0 == self.issued
	}

	fn admit(&mut self, ticket: Ticket) -> Result<(), ViewError> {
		if ticket.0 < self.applied {
			warn!("Rejecting stale {:?}; {:?} was applied already.", ticket, Ticket(self.applied));
			return Err(ViewError::Stale { ticket, applied: Ticket(self.applied) });
		}
		self.applied = ticket.0;
		Ok(())
	}

	/// Replaces the mount point's contents with markup generated from `data`.
	///
	/// Empty `data` shows the configured error message instead.
	///
	/// # Errors
	///
	/// Iff the generated markup is malformed.
	pub fn render(&mut self, data: T::Data) -> Result<(), ViewError> {
		let ticket = self.ticket();
		self.render_ticketed(ticket, data)
	}

	/// # Errors
	///
	/// Iff `ticket` is stale or the generated markup is malformed.
	#[instrument(skip(self, data), fields(selector = self.template.mount_selector()))]
	pub fn render_ticketed(&mut self, ticket: Ticket, data: T::Data) -> Result<(), ViewError> {
		self.admit(ticket)?;
		if data.is_empty() {
			debug!("Empty data; Showing the error message.");
			self.render_error(None)?;
			return Ok(());
		}

		let markup = self.template.generate(&data);
		self.replace_contents(&markup)?;
		self.data = Some(data);
		self.state = ViewState::Rendered;
		Ok(())
	}

	/// Patches the mounted markup towards `data` in place, keeping node identity (and with it focus,
	/// scroll positions and other transient state) wherever the structure is unchanged.
	///
	/// Falls back to [`render`](`View::render`) if the view doesn't currently show rendered data.
	///
	/// # Errors
	///
	/// Iff the generated markup is malformed.
	pub fn update(&mut self, data: T::Data) -> Result<Patches, ViewError> {
		let ticket = self.ticket();
		self.update_ticketed(ticket, data)
	}

	/// # Errors
	///
	/// Iff `ticket` is stale or the generated markup is malformed.
	#[instrument(skip(self, data), fields(selector = self.template.mount_selector()))]
	pub fn update_ticketed(&mut self, ticket: Ticket, data: T::Data) -> Result<Patches, ViewError> {
		if data.is_empty() || self.state != ViewState::Rendered {
			debug!(state = ?self.state, "Not updatable; Rendering instead.");
			self.render_ticketed(ticket, data)?;
			return Ok(Patches::default());
		}
		self.admit(ticket)?;

		let markup = self.template.generate(&data);
		let patches = self.reconciler.reconcile(&self.mount_point, &markup)?;
		self.data = Some(data);
		Ok(patches)
	}

	/// Shows a loading indicator.
	///
	/// # Errors
	///
	/// Never in practice, as the spinner markup is static.
	pub fn render_spinner(&mut self) -> Result<(), ViewError> {
		let markup = format!(
			r#"<div class="spinner">
  <svg>
    <use href="{icons}#icon-loader"></use>
  </svg>
</div>"#,
			icons = markup::escape_attribute(self.template.icons_url()),
		);
		self.replace_contents(&markup)?;
		self.state = ViewState::Loading;
		Ok(())
	}

	/// Shows `message`, or the configured error message, as an error.
	///
	/// # Errors
	///
	/// Never in practice, as the message is escaped.
	pub fn render_error(&mut self, message: Option<&str>) -> Result<(), ViewError> {
		let markup = format!(
			r#"<div class="error">
  <div>
    <svg>
      <use href="{icons}#icon-alert-triangle"></use>
    </svg>
  </div>
  <p>{message}</p>
</div>"#,
			icons = markup::escape_attribute(self.template.icons_url()),
			message = escape_text(message.unwrap_or_else(|| self.template.error_message())),
		);
		self.replace_contents(&markup)?;
		self.data = None;
		self.state = ViewState::Error;
		Ok(())
	}

	/// Shows `message`, or the configured success message, as a one-shot confirmation.
	///
	/// # Errors
	///
	/// Never in practice, as the message is escaped.
	pub fn render_message(&mut self, message: Option<&str>) -> Result<(), ViewError> {
		let markup = format!(
			r#"<div class="message">
  <div>
    <svg>
      <use href="{icons}#icon-smile"></use>
    </svg>
  </div>
  <p>{message}</p>
</div>"#,
			icons = markup::escape_attribute(self.template.icons_url()),
			message = escape_text(message.unwrap_or_else(|| self.template.success_message())),
		);
		self.replace_contents(&markup)?;
		self.data = None;
		self.state = ViewState::Success;
		Ok(())
	}

	fn replace_contents(&self, markup: &str) -> Result<(), MarkupError> {
		let fragment = markup::parse_fragment(markup)?;
		if let Err(error) = self.mount_point.clear_children() {
			error!("Failed to clear the mount point: {}", error);
		}
		for node in &fragment {
			if let Err(error) = self.instantiate_into_mount_point(node) {
				error!("Failed to insert rendered node: {}", error);
			}
		}
		Ok(())
	}

	fn instantiate_into_mount_point(&self, node: &markup::Node) -> Result<(), DomError> {
		let instance = self.mount_point.instantiate(node)?;
		self.mount_point.append_child(&instance)
	}
}
