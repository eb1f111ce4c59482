use super::{
	recipe::{Recipe, RecipeSummary},
	storage::{Storage, StorageError},
};
use crate::{
	config::Config,
	views::{pagination::PageInfo, preview::PreviewList},
};
use tracing::{debug, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchState {
	pub query: String,
	pub results: Vec<RecipeSummary>,
	/// 1-based.
	pub page: usize,
	pub per_page: usize,
}

/// Everything the controller knows, owned by the controller and passed to views as snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
	pub recipe: Option<Recipe>,
	pub search: SearchState,
	pub bookmarks: Vec<Recipe>,
	/// Id of the recipe named by the location hash, which previews highlight.
	pub active_id: Option<String>,
	bookmarks_key: String,
}

impl AppState {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self {
			recipe: None,
			search: SearchState {
				query: String::new(),
				results: Vec::new(),
				page: 1,
				per_page: config.results_per_page,
			},
			bookmarks: Vec::new(),
			active_id: None,
			bookmarks_key: config.bookmarks_key.clone(),
		}
	}

	/// Makes `recipe` the current recipe, deriving its bookmark flag from the bookmark list.
	pub fn set_recipe(&mut self, mut recipe: Recipe) {
		recipe.bookmarked = self.is_bookmarked(&recipe.id);
		self.recipe = Some(recipe);
	}

	pub fn set_search_results(&mut self, query: &str, results: Vec<RecipeSummary>) {
		self.search.query = query.to_owned();
		self.search.results = results;
		self.search.page = 1;
	}

	/// Moves to `page` (if given) and returns the results on the current page.
	///
	/// Pages past the end are empty and leave the last page current.
	pub fn search_page_results(&mut self, page: Option<usize>) -> Vec<RecipeSummary> {
		let page = page.map_or(self.search.page, |page| page.max(1));
		let SearchState { results, per_page, .. } = &self.search;
		let start = page.saturating_sub(1).saturating_mul(*per_page).min(results.len());
		let end = page.saturating_mul(*per_page).min(results.len());
		let slice = results[start..end].to_vec();

		self.search.page = page.min(self.page_count().max(1));
		slice
	}

	#[must_use]
	pub fn page_count(&self) -> usize {
		match self.search.per_page {
			0 => 0,
			per_page => (self.search.results.len() + per_page - 1) / per_page,
		}
	}

	#[must_use]
	pub fn page_info(&self) -> PageInfo {
		PageInfo {
			page: self.search.page,
			results: self.search.results.len(),
			per_page: self.search.per_page,
		}
	}

	/// Results on `page` (or the current page), with the active recipe marked.
	pub fn search_previews(&mut self, page: Option<usize>) -> PreviewList {
		PreviewList {
			items: self.search_page_results(page),
			active: self.active_id.clone(),
		}
	}

	#[must_use]
	pub fn bookmark_previews(&self) -> PreviewList {
		PreviewList {
			items: self.bookmarks.iter().map(Recipe::summary).collect(),
			active: self.active_id.clone(),
		}
	}

	/// Scales the current recipe's ingredient quantities to `servings`.
	///
	/// Returns `false` without changes if there is no current recipe or `servings` is zero.
	pub fn update_servings(&mut self, servings: u32) -> bool {
		let recipe = match &mut self.recipe {
			Some(recipe) if servings > 0 => recipe,
			_ => return false,
		};
		if recipe.servings > 0 {
			let factor = f64::from(servings) / f64::from(recipe.servings);
			for ingredient in &mut recipe.ingredients {
				ingredient.quantity = ingredient.quantity.map(|quantity| quantity * factor);
			}
		}
		recipe.servings = servings;
		true
	}

	#[must_use]
	pub fn is_bookmarked(&self, id: &str) -> bool {
		self.bookmarks.iter().any(|bookmark| bookmark.id == id)
	}

	/// Bookmarks `recipe` (once) and persists the bookmark list.
	///
	/// # Errors
	///
	/// Iff persisting fails. The in-memory list is updated regardless.
	#[instrument(skip(self, recipe, storage), fields(id = recipe.id.as_str()))]
	pub fn add_bookmark(&mut self, recipe: &Recipe, storage: &impl Storage) -> Result<(), StorageError> {
		if !self.is_bookmarked(&recipe.id) {
			let mut bookmark = recipe.clone();
			bookmark.bookmarked = true;
			self.bookmarks.push(bookmark);
		}
		self.sync_bookmark_flag();
		self.persist_bookmarks(storage)
	}

	/// Removes the bookmark with `id`, returning whether there was one.
	///
	/// # Errors
	///
	/// Iff persisting fails. The in-memory list is updated regardless.
	#[instrument(skip(self, storage))]
	pub fn delete_bookmark(&mut self, id: &str, storage: &impl Storage) -> Result<bool, StorageError> {
		let index = match self.bookmarks.iter().position(|bookmark| bookmark.id == id) {
			Some(index) => index,
			None => {
				debug!("No such bookmark.");
				return Ok(false);
			}
		};
		self.bookmarks.remove(index);
		self.sync_bookmark_flag();
		self.persist_bookmarks(storage)?;
		Ok(true)
	}

	/// Replaces the bookmark list with the persisted one.
	///
	/// Unreadable stored data is logged and treated as no bookmarks.
	///
	/// # Errors
	///
	/// Iff `storage` can't be read.
	#[instrument(skip(self, storage))]
	pub fn restore_bookmarks(&mut self, storage: &impl Storage) -> Result<usize, StorageError> {
		self.bookmarks = match storage.get_item(&self.bookmarks_key)? {
			None => Vec::new(),
			Some(json) => serde_json::from_str::<Vec<Recipe>>(&json).unwrap_or_else(|error| {
				warn!("Discarding unreadable stored bookmarks: {}", error);
				Vec::new()
			}),
		};
		for bookmark in &mut self.bookmarks {
			bookmark.bookmarked = true;
		}
		self.sync_bookmark_flag();
		Ok(self.bookmarks.len())
	}

	fn sync_bookmark_flag(&mut self) {
		let bookmarked = match &self.recipe {
			Some(recipe) => self.is_bookmarked(&recipe.id),
			None => return,
		};
		if let Some(recipe) = &mut self.recipe {
			recipe.bookmarked = bookmarked;
		}
	}

	fn persist_bookmarks(&self, storage: &impl Storage) -> Result<(), StorageError> {
		let json = serde_json::to_string(&self.bookmarks).map_err(|error| StorageError(error.to_string()))?;
		storage.set_item(&self.bookmarks_key, &json)
	}
}
