use crate::{
	dom::{DomError, LiveNode},
	events::{Handlers, UiEvent},
	markup::escape_attribute as attr,
	reconcile::Reconciler,
	view::{RenderableData, Template, View, ViewError},
};
use core::ops::{Deref, DerefMut};
use std::collections::BTreeMap;
use tracing::{error, instrument};

/// Number of ingredient inputs on a blank form.
pub const INGREDIENT_SLOTS: usize = 6;

const RECIPE_FIELDS: [(&str, &str, &str); 6] = [
	("title", "Title", "text"),
	("sourceUrl", "URL", "text"),
	("image", "Image URL", "text"),
	("publisher", "Publisher", "text"),
	("cookingTime", "Prep time", "number"),
	("servings", "Servings", "number"),
];

/// Current values of the upload form's controls, by control name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadDraft {
	pub fields: BTreeMap<String, String>,
}

impl UploadDraft {
	#[must_use]
	pub fn new(fields: BTreeMap<String, String>) -> Self {
		Self { fields }
	}

	/// Every control of an unfilled form, each mapped to an empty value.
	#[must_use]
	pub fn blank() -> Self {
		let recipe_fields = RECIPE_FIELDS.iter().map(|&(name, _, _)| name.to_owned());
		let ingredients = (1..=INGREDIENT_SLOTS).map(|slot| format!("ingredient-{}", slot));
		Self {
			fields: recipe_fields.chain(ingredients).map(|name| (name, String::new())).collect(),
		}
	}

	fn value(&self, name: &str) -> &str {
		self.fields.get(name).map_or("", String::as_str)
	}

	/// Ingredient slots to show: at least [`INGREDIENT_SLOTS`], more if the draft has higher-numbered ones.
	fn ingredient_slots(&self) -> usize {
		self.fields
			.keys()
			.filter_map(|name| name.strip_prefix("ingredient-")?.parse::<usize>().ok())
			.max()
			.map_or(INGREDIENT_SLOTS, |highest| highest.max(INGREDIENT_SLOTS))
	}
}

/// Empty iff no control is named, so [`UploadDraft::blank`] still renders a form.
impl RenderableData for UploadDraft {
	fn is_empty(&self) -> bool {
		self.fields.is_empty()
	}
}

#[derive(Debug, Clone)]
pub struct AddRecipeTemplate {
	icons: String,
}

impl AddRecipeTemplate {
	#[must_use]
	pub fn new(icons_url: impl Into<String>) -> Self {
		Self { icons: icons_url.into() }
	}
}

impl Template for AddRecipeTemplate {
	type Data = UploadDraft;

	fn mount_selector(&self) -> &'static str {
		".upload"
	}

	fn generate(&self, draft: &UploadDraft) -> String {
		let mut markup = String::from(
			r#"
<div class="upload__column">
  <h3 class="upload__heading">Recipe data</h3>"#,
		);
		for &(name, label, kind) in &RECIPE_FIELDS {
			markup.push_str(&format!(
				r#"
  <label>{label}</label>
  <input value="{value}" required name="{name}" type="{kind}" />"#,
				label = label,
				value = attr(draft.value(name)),
				name = name,
				kind = kind,
			));
		}
		markup.push_str(
			r#"
</div>

<div class="upload__column">
  <h3 class="upload__heading">Ingredients</h3>"#,
		);
		for slot in 1..=draft.ingredient_slots() {
			let name = format!("ingredient-{}", slot);
			markup.push_str(&format!(
				r#"
  <label>Ingredient {slot}</label>
  <input value="{value}" type="text" name="{name}" placeholder="Format: 'Quantity,Unit,Description'" />"#,
				slot = slot,
				value = attr(draft.value(&name)),
				name = name,
			));
		}
		markup.push_str(&format!(
			r#"
</div>

<button class="btn upload__btn">
  <svg>
    <use href="{icons}#icon-upload-cloud"></use>
  </svg>
  <span>Upload</span>
</button>"#,
			icons = attr(&self.icons),
		));
		markup
	}

	fn error_message(&self) -> &str {
		"Could not upload the recipe. Please try again!"
	}

	fn success_message(&self) -> &str {
		"Recipe was successfully uploaded :)"
	}

	fn icons_url(&self) -> &str {
		&self.icons
	}
}

/// The modal recipe upload form.
#[derive(Debug)]
pub struct AddRecipeView<N: LiveNode> {
	view: View<AddRecipeTemplate, N>,
	window: N,
	overlay: N,
	upload: Handlers<BTreeMap<String, String>>,
	toggle: Handlers<bool>,
}

impl<N: LiveNode> AddRecipeView<N> {
	/// `window` and `overlay` are toggled together with the `hidden` class.
	#[must_use]
	pub fn new(view: View<AddRecipeTemplate, N>, window: N, overlay: N) -> Self {
		Self {
			view,
			window,
			overlay,
			upload: Handlers::default(),
			toggle: Handlers::default(),
		}
	}

	/// Mounts the form and finds `.add-recipe-window` and `.overlay` below `root`.
	///
	/// # Errors
	///
	/// Iff one of the three nodes is missing.
	pub fn mount(template: AddRecipeTemplate, root: &N) -> Result<Self, ViewError> {
		Self::mount_with(template, root, Reconciler::default())
	}

	/// As [`AddRecipeView::mount`], with the form's updates going through `reconciler`.
	///
	/// # Errors
	///
	/// Iff one of the three nodes is missing.
	pub fn mount_with(template: AddRecipeTemplate, root: &N, reconciler: Reconciler) -> Result<Self, ViewError> {
		let view = View::mount(template, root)?.with_reconciler(reconciler);
		let window = root.query_selector(".add-recipe-window").ok_or(ViewError::MissingMountPoint(".add-recipe-window"))?;
		let overlay = root.query_selector(".overlay").ok_or(ViewError::MissingMountPoint(".overlay"))?;
		Ok(Self::new(view, window, overlay))
	}

	/// `handler` receives the submitted form's fields.
	pub fn add_handler_upload(&mut self, handler: impl 'static + FnMut(BTreeMap<String, String>)) {
		self.upload.add(handler);
	}

	/// `handler` is told whether the window is open after the open button, the close button or the
	/// overlay toggled it.
	pub fn add_handler_show_window(&mut self, handler: impl 'static + FnMut(bool)) {
		self.toggle.add(handler);
	}

	#[must_use]
	pub fn is_open(&self) -> bool {
		!self.window.has_class("hidden")
	}

	/// Shows the window and overlay if hidden, hides them otherwise. Returns whether the window is open now.
	///
	/// # Errors
	///
	/// Iff a `class` attribute can't be written.
	pub fn toggle_window(&self) -> Result<bool, DomError> {
		let hidden = self.window.toggle_class("hidden")?;
		self.overlay.toggle_class("hidden")?;
		Ok(!hidden)
	}

	#[instrument(skip(self, event))]
	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		match event {
			UiEvent::Submit { form, fields } if form.is_same_node(self.mount_point()) => self.upload.emit(fields.clone()),
			UiEvent::Click { target } => {
				let gesture = target.closest_with_class("nav__btn--add-recipe").is_some()
					|| target.closest_with_class("btn--close-modal").is_some()
					|| target.is_same_node(&self.overlay);
				if !gesture {
					return 0;
				}
				match self.toggle_window() {
					Ok(open) => self.toggle.emit(open),
					Err(error) => {
						error!("Failed to toggle the upload window: {}", error);
						0
					}
				}
			}
			_ => 0,
		}
	}
}

impl<N: LiveNode> Deref for AddRecipeView<N> {
	type Target = View<AddRecipeTemplate, N>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}

impl<N: LiveNode> DerefMut for AddRecipeView<N> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.view
	}
}
