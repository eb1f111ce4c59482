use crate::{
	dom::LiveNode,
	events::{hash_id, Handlers, UiEvent},
	markup::{escape_attribute as attr, escape_text as text},
	model::recipe::{Ingredient, Recipe},
	view::{Template, View},
};
use core::ops::{Deref, DerefMut};
use tracing::{debug, instrument};

const MAX_DENOMINATOR: u64 = 16;
const FRACTION_TOLERANCE: f64 = 0.01;

/// Formats an ingredient quantity as a mixed fraction (`1 1/2`) where one with a small denominator is
/// close enough, or as a decimal with at most two places otherwise.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
pub fn format_quantity(quantity: f64) -> String {
	if !quantity.is_finite() || quantity < 0.0 {
		return String::new();
	}
	let whole = quantity.trunc();
	let fraction = quantity - whole;
	let whole = whole as u64;

	let best = (1..=MAX_DENOMINATOR)
		.map(|denominator| {
			let numerator = (fraction * denominator as f64).round() as u64;
			(numerator, denominator, (fraction - numerator as f64 / denominator as f64).abs())
		})
		.find(|&(_, _, error)| error < FRACTION_TOLERANCE);

	match best {
		Some((0, _, _)) => whole.to_string(),
		Some((numerator, denominator, _)) if numerator == denominator => (whole + 1).to_string(),
		Some((numerator, denominator, _)) if whole == 0 => format!("{}/{}", numerator, denominator),
		Some((numerator, denominator, _)) => format!("{} {}/{}", whole, numerator, denominator),
		None => {
			let decimal = format!("{:.2}", quantity);
			decimal.trim_end_matches('0').trim_end_matches('.').to_owned()
		}
	}
}

#[derive(Debug, Clone)]
pub struct RecipeTemplate {
	icons: String,
}

impl RecipeTemplate {
	#[must_use]
	pub fn new(icons_url: impl Into<String>) -> Self {
		Self { icons: icons_url.into() }
	}

	fn ingredient(&self, ingredient: &Ingredient) -> String {
		format!(
			r#"
<li class="recipe__ingredient">
  <svg class="recipe__icon">
    <use href="{icons}#icon-check"></use>
  </svg>
  <div class="recipe__quantity">{quantity}</div>
  <div class="recipe__description">
    <span class="recipe__unit">{unit}</span>
    {description}
  </div>
</li>"#,
			icons = attr(&self.icons),
			quantity = ingredient.quantity.map(format_quantity).unwrap_or_default(),
			unit = text(&ingredient.unit),
			description = text(&ingredient.description),
		)
	}
}

impl Template for RecipeTemplate {
	type Data = Recipe;

	fn mount_selector(&self) -> &'static str {
		".recipe"
	}

	fn generate(&self, recipe: &Recipe) -> String {
		let icons = attr(&self.icons);
		format!(
			r#"
<figure class="recipe__fig">
  <img src="{image}" alt="{title_attr}" class="recipe__img" />
  <h1 class="recipe__title">
    <span>{title}</span>
  </h1>
</figure>

<div class="recipe__details">
  <div class="recipe__info">
    <svg class="recipe__info-icon">
      <use href="{icons}#icon-clock"></use>
    </svg>
    <span class="recipe__info-data recipe__info-data--minutes">{cooking_time}</span>
    <span class="recipe__info-text">minutes</span>
  </div>
  <div class="recipe__info">
    <svg class="recipe__info-icon">
      <use href="{icons}#icon-users"></use>
    </svg>
    <span class="recipe__info-data recipe__info-data--people">{servings}</span>
    <span class="recipe__info-text">servings</span>

    <div class="recipe__info-buttons">
      <button class="btn--tiny btn--update-servings" data-update-to="{fewer}">
        <svg>
          <use href="{icons}#icon-minus-circle"></use>
        </svg>
      </button>
      <button class="btn--tiny btn--update-servings" data-update-to="{more}">
        <svg>
          <use href="{icons}#icon-plus-circle"></use>
        </svg>
      </button>
    </div>
  </div>

  <div class="recipe__user-generated {user_hidden}">
    <svg>
      <use href="{icons}#icon-user"></use>
    </svg>
  </div>
  <button class="btn--round btn--bookmark">
    <svg class="">
      <use href="{icons}#icon-bookmark{fill}"></use>
    </svg>
  </button>
</div>

<div class="recipe__ingredients">
  <h2 class="heading--2">Recipe ingredients</h2>
  <ul class="recipe__ingredient-list">{ingredients}
  </ul>
</div>

<div class="recipe__directions">
  <h2 class="heading--2">How to cook it</h2>
  <p class="recipe__directions-text">
    This recipe was carefully designed and tested by
    <span class="recipe__publisher">{publisher}</span>. Please check out
    directions at their website.
  </p>
  <a class="btn--small recipe__btn" href="{source_url}" target="_blank">
    <span>Directions</span>
    <svg class="search__icon">
      <use href="{icons}#icon-arrow-right"></use>
    </svg>
  </a>
</div>"#,
			image = attr(&recipe.image),
			title_attr = attr(&recipe.title),
			title = text(&recipe.title),
			icons = icons,
			cooking_time = recipe.cooking_time,
			servings = recipe.servings,
			fewer = recipe.servings.saturating_sub(1),
			more = recipe.servings.saturating_add(1),
			user_hidden = if recipe.key.is_some() { "" } else { "hidden" },
			fill = if recipe.bookmarked { "-fill" } else { "" },
			ingredients = recipe.ingredients.iter().map(|ingredient| self.ingredient(ingredient)).collect::<String>(),
			publisher = text(&recipe.publisher),
			source_url = attr(&recipe.source_url),
		)
	}

	fn error_message(&self) -> &str {
		"We could not find that recipe. Please try another one!"
	}

	fn icons_url(&self) -> &str {
		&self.icons
	}
}

/// The recipe detail pane.
#[derive(Debug)]
pub struct RecipeView<N: LiveNode> {
	view: View<RecipeTemplate, N>,
	render: Handlers<String>,
	update_servings: Handlers<u32>,
	add_bookmark: Handlers<()>,
}

impl<N: LiveNode> RecipeView<N> {
	#[must_use]
	pub fn new(view: View<RecipeTemplate, N>) -> Self {
		Self {
			view,
			render: Handlers::default(),
			update_servings: Handlers::default(),
			add_bookmark: Handlers::default(),
		}
	}

	/// `handler` receives the recipe id from the location hash whenever it changes and once on page load.
	///
	/// Empty hashes are not reported.
	pub fn add_handler_render(&mut self, handler: impl 'static + FnMut(String)) {
		self.render.add(handler);
	}

	/// `handler` receives the requested number of servings, which is never zero.
	pub fn add_handler_update_servings(&mut self, handler: impl 'static + FnMut(u32)) {
		self.update_servings.add(handler);
	}

	pub fn add_handler_add_bookmark(&mut self, handler: impl 'static + FnMut(())) {
		self.add_bookmark.add(handler);
	}

	#[instrument(skip(self, event))]
	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		match event {
			UiEvent::HashChange { hash } | UiEvent::Load { hash } => match hash_id(hash) {
				"" => 0,
				id => self.render.emit(id.to_owned()),
			},
			UiEvent::Click { target } if self.mount_point().contains(target) => {
				if let Some(button) = target.closest_with_class("btn--update-servings") {
					match button.attribute("data-update-to").and_then(|to| to.trim().parse::<u32>().ok()) {
						Some(servings) if servings > 0 => self.update_servings.emit(servings),
						_ => {
							debug!("Ignoring servings button without a positive data-update-to.");
							0
						}
					}
				} else if target.closest_with_class("btn--bookmark").is_some() {
					self.add_bookmark.emit(())
				} else {
					0
				}
			}
			UiEvent::Click { .. } | UiEvent::Submit { .. } => 0,
		}
	}
}

impl<N: LiveNode> Deref for RecipeView<N> {
	type Target = View<RecipeTemplate, N>;

	fn deref(&self) -> &Self::Target {
		&self.view
	}
}

impl<N: LiveNode> DerefMut for RecipeView<N> {
	fn deref_mut(&mut self) -> &mut Self::Target {
		&mut self.view
	}
}
