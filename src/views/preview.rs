use crate::{
	markup::{escape_attribute as attr, escape_text as text},
	model::recipe::RecipeSummary,
	view::RenderableData,
};

/// Recipe previews with the one named by the location hash marked active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewList {
	pub items: Vec<RecipeSummary>,
	pub active: Option<String>,
}

impl RenderableData for PreviewList {
	fn is_empty(&self) -> bool {
		self.items.is_empty()
	}
}

#[must_use]
pub fn generate_previews(list: &PreviewList, icons: &str) -> String {
	list.items.iter().map(|item| generate_preview(item, list.active.as_deref(), icons)).collect()
}

#[must_use]
pub fn generate_preview(recipe: &RecipeSummary, active: Option<&str>, icons: &str) -> String {
	format!(
		r##"
<li class="preview">
  <a class="preview__link {active}" href="#{id}">
    <figure class="preview__fig">
      <img src="{image}" alt="{title_attr}" />
    </figure>
    <div class="preview__data">
      <h4 class="preview__title">{title}</h4>
      <p class="preview__publisher">{publisher}</p>
      <div class="preview__user-generated {hidden}">
        <svg>
          <use href="{icons}#icon-user"></use>
        </svg>
      </div>
    </div>
  </a>
</li>"##,
		active = if active == Some(recipe.id.as_str()) { "preview__link--active" } else { "" },
		id = attr(&recipe.id),
		image = attr(&recipe.image),
		title_attr = attr(&recipe.title),
		title = text(&recipe.title),
		publisher = text(&recipe.publisher),
		hidden = if recipe.key.is_some() { "" } else { "hidden" },
		icons = attr(icons),
	)
}
