//! Wires the views to the application state: handlers send [`Action`]s, and the controller turns each
//! one into state changes followed by `render` or `update` calls.

use crate::{
	config::Config,
	dom::LiveNode,
	events::UiEvent,
	model::{
		api::RecipeSource,
		state::AppState,
		storage::Storage,
		upload::NewRecipe,
	},
	reconcile::Reconciler,
	view::{View, ViewError, ViewState},
	views::{AddRecipeTemplate, AddRecipeView, BookmarksTemplate, BookmarksView, PaginationTemplate, PaginationView, RecipeTemplate, RecipeView, ResultsTemplate, ResultsView, SearchView, UploadDraft},
};
use futures::{
	channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
	select, Stream, StreamExt,
};
use std::collections::BTreeMap;
use tracing::{debug, error, info, instrument, warn};

/// Something the user asked for, as reported by a view handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
	/// Load and show the recipe with this id.
	ShowRecipe(String),
	Search(String),
	GoToPage(u32),
	UpdateServings(u32),
	/// Bookmark the current recipe, or remove its bookmark.
	ToggleBookmark,
	/// Read the persisted bookmarks and show them.
	RestoreBookmarks,
	UploadRecipe(BTreeMap<String, String>),
	/// Close the upload window if it is open and reset its form.
	CloseUploadWindow,
	/// The user closed the upload window.
	UploadWindowClosed,
}

/// All views of the page.
#[derive(Debug)]
pub struct Views<N: LiveNode> {
	pub recipe: RecipeView<N>,
	pub results: ResultsView<N>,
	pub pagination: PaginationView<N>,
	pub bookmarks: BookmarksView<N>,
	pub add_recipe: AddRecipeView<N>,
	pub search: SearchView<N>,
}

impl<N: LiveNode> Views<N> {
	/// Finds every view's mount point below `root`.
	///
	/// # Errors
	///
	/// Iff a mount point is missing.
	pub fn mount(root: &N, config: &Config) -> Result<Self, ViewError> {
		let reconciler = Reconciler::new(config.depth_limit);
		let icons = config.icons_url.as_str();
		Ok(Self {
			recipe: RecipeView::new(View::mount(RecipeTemplate::new(icons), root)?.with_reconciler(reconciler)),
			results: View::mount(ResultsTemplate::new(icons), root)?.with_reconciler(reconciler),
			pagination: PaginationView::new(View::mount(PaginationTemplate::new(icons), root)?.with_reconciler(reconciler)),
			bookmarks: BookmarksView::new(View::mount(BookmarksTemplate::new(icons), root)?.with_reconciler(reconciler)),
			add_recipe: AddRecipeView::mount_with(AddRecipeTemplate::new(icons), root, reconciler)?,
			search: SearchView::mount(root).ok_or(ViewError::MissingMountPoint(SearchView::<N>::SELECTOR))?,
		})
	}

	/// Offers `event` to every view. Returns the number of handlers invoked.
	///
	/// Bookmarks go first so that a recipe named by the initial hash loads with its bookmark flag set.
	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		self.bookmarks.dispatch(event) + self.recipe.dispatch(event) + self.pagination.dispatch(event) + self.add_recipe.dispatch(event) + self.search.dispatch(event)
	}
}

/// Owns the state, the views and their collaborators, and handles one [`Action`] at a time.
pub struct Controller<N: LiveNode, S: Storage, R: RecipeSource> {
	config: Config,
	state: AppState,
	views: Views<N>,
	storage: S,
	source: R,
	sender: UnboundedSender<Action>,
	queue: Option<UnboundedReceiver<Action>>,
}

impl<N: LiveNode, S: Storage, R: RecipeSource> core::fmt::Debug for Controller<N, S, R> {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Controller").field("state", &self.state).field("views", &self.views).finish_non_exhaustive()
	}
}

fn log_view_error(result: Result<(), ViewError>) {
	match result {
		Ok(()) => (),
		Err(stale @ ViewError::Stale { .. }) => debug!("Dropped superseded result: {}", stale),
		Err(error) => error!("{}", error),
	}
}

impl<N: LiveNode, S: Storage, R: RecipeSource> Controller<N, S, R> {
	/// Mounts all views below `root` and registers their handlers.
	///
	/// # Errors
	///
	/// Iff a mount point is missing.
	pub fn new(root: &N, config: Config, storage: S, source: R) -> Result<Self, ViewError> {
		let views = Views::mount(root, &config)?;
		let (sender, queue) = mpsc::unbounded();
		let mut controller = Self {
			state: AppState::new(&config),
			config,
			views,
			storage,
			source,
			sender,
			queue: Some(queue),
		};
		controller.init();
		Ok(controller)
	}

	fn init(&mut self) {
		let sender = &self.sender;
		let views = &mut self.views;
		views.bookmarks.add_handler_render(forward(sender, |()| Action::RestoreBookmarks));
		views.recipe.add_handler_render(forward(sender, Action::ShowRecipe));
		views.recipe.add_handler_update_servings(forward(sender, Action::UpdateServings));
		views.recipe.add_handler_add_bookmark(forward(sender, |()| Action::ToggleBookmark));
		views.search.add_handler_search(forward(sender, Action::Search));
		views.pagination.add_handler_click(forward(sender, Action::GoToPage));
		views.add_recipe.add_handler_upload(forward(sender, Action::UploadRecipe));
		let sender = sender.clone();
		views.add_recipe.add_handler_show_window(move |open| {
			if !open {
				send(&sender, Action::UploadWindowClosed);
			}
		});
	}

	#[must_use]
	pub fn state(&self) -> &AppState {
		&self.state
	}

	#[must_use]
	pub fn views(&self) -> &Views<N> {
		&self.views
	}

	#[must_use]
	pub fn config(&self) -> &Config {
		&self.config
	}

	#[must_use]
	pub fn storage(&self) -> &S {
		&self.storage
	}

	/// A sender for actions that don't originate from a view, like timers.
	#[must_use]
	pub fn sender(&self) -> UnboundedSender<Action> {
		self.sender.clone()
	}

	/// Offers `event` to every view. Resulting actions are queued, not yet handled.
	pub fn dispatch(&mut self, event: &UiEvent<N>) -> usize {
		self.views.dispatch(event)
	}

	/// Handles all queued actions in order, including ones queued while handling. Returns how many there were.
	///
	/// Does nothing while [`run`](`Controller::run`) owns the queue.
	pub async fn process_pending(&mut self) -> usize {
		let mut handled = 0;
		loop {
			let action = match self.queue.as_mut().map(UnboundedReceiver::try_next) {
				Some(Ok(Some(action))) => action,
				_ => break,
			};
			self.handle(action).await;
			handled += 1;
		}
		handled
	}

	/// Dispatches `events` and handles the resulting actions one at a time until `events` ends.
	///
	/// Actions still queued at that point, and those they queue in turn, are handled before returning.
	pub async fn run(mut self, events: impl Stream<Item = UiEvent<N>> + Unpin) {
		let mut queue = if let Some(queue) = self.queue.take() {
			queue
		} else {
			error!("Controller is already running.");
			return;
		};
		let mut events = events.fuse();
		loop {
			select! {
				event = events.next() => match event {
					Some(event) => {
						self.dispatch(&event);
					}
					None => break,
				},
				action = queue.next() => {
					if let Some(action) = action {
						self.handle(action).await;
					}
				}
			}
		}
		info!("Event stream ended.");
		while let Ok(Some(action)) = queue.try_next() {
			self.handle(action).await;
		}
	}

	#[instrument(skip(self))]
	pub async fn handle(&mut self, action: Action) {
		match action {
			Action::ShowRecipe(id) => self.control_recipe(id).await,
			Action::Search(query) => self.control_search(&query).await,
			Action::GoToPage(page) => self.control_pagination(page),
			Action::UpdateServings(servings) => self.control_servings(servings),
			Action::ToggleBookmark => self.control_bookmark(),
			Action::RestoreBookmarks => self.control_restore_bookmarks(),
			Action::UploadRecipe(fields) => self.control_upload(&fields).await,
			Action::CloseUploadWindow => self.control_close_upload(),
			Action::UploadWindowClosed => self.reset_upload_form(),
		}
	}

	async fn control_recipe(&mut self, id: String) {
		self.state.active_id = Some(id.clone());
		log_view_error(self.views.recipe.render_spinner());

		// Only highlight the active preview in lists that are showing previews.
		if self.views.results.state() == ViewState::Rendered {
			let previews = self.state.search_previews(None);
			log_view_error(self.views.results.update(previews).map(drop));
		}
		if self.views.bookmarks.state() == ViewState::Rendered {
			log_view_error(self.views.bookmarks.update(self.state.bookmark_previews()).map(drop));
		}

		let ticket = self.views.recipe.ticket();
		match self.source.load_recipe(&id).await {
			Ok(recipe) => {
				self.state.set_recipe(recipe);
				if let Some(recipe) = self.state.recipe.clone() {
					log_view_error(self.views.recipe.render_ticketed(ticket, recipe));
				}
			}
			Err(error) => {
				warn!("Failed to load recipe {:?}: {}", id, error);
				if self.views.recipe.is_current(ticket) {
					log_view_error(self.views.recipe.render_error(None));
				}
			}
		}
	}

	async fn control_search(&mut self, query: &str) {
		log_view_error(self.views.results.render_spinner());
		let ticket = self.views.results.ticket();
		match self.source.search(query).await {
			Ok(results) => {
				self.state.set_search_results(query, results);
				let previews = self.state.search_previews(None);
				log_view_error(self.views.results.render_ticketed(ticket, previews));
				log_view_error(self.views.pagination.render(self.state.page_info()));
				if let Err(error) = self.views.search.clear_input() {
					error!("Failed to clear the search field: {}", error);
				}
			}
			Err(error) => {
				warn!("Search for {:?} failed: {}", query, error);
				if self.views.results.is_current(ticket) {
					log_view_error(self.views.results.render_error(None));
				}
			}
		}
	}

	fn control_pagination(&mut self, page: u32) {
		let previews = self.state.search_previews(Some(page as usize));
		log_view_error(self.views.results.render(previews));
		log_view_error(self.views.pagination.render(self.state.page_info()));
	}

	fn control_servings(&mut self, servings: u32) {
		if !self.state.update_servings(servings) {
			return;
		}
		if let Some(recipe) = self.state.recipe.clone() {
			log_view_error(self.views.recipe.update(recipe).map(drop));
		}
	}

	fn control_bookmark(&mut self) {
		let recipe = if let Some(recipe) = &self.state.recipe {
			recipe.clone()
		} else {
			debug!("No recipe to bookmark.");
			return;
		};
		let persisted = if recipe.bookmarked {
			self.state.delete_bookmark(&recipe.id, &self.storage).map(drop)
		} else {
			self.state.add_bookmark(&recipe, &self.storage)
		};
		if let Err(error) = persisted {
			warn!("Bookmarks were not persisted: {}", error);
		}

		if let Some(recipe) = self.state.recipe.clone() {
			log_view_error(self.views.recipe.update(recipe).map(drop));
		}
		log_view_error(self.views.bookmarks.render(self.state.bookmark_previews()));
	}

	fn control_restore_bookmarks(&mut self) {
		match self.state.restore_bookmarks(&self.storage) {
			Ok(count) => debug!("Restored {} bookmark(s).", count),
			Err(error) => warn!("Failed to read stored bookmarks: {}", error),
		}
		log_view_error(self.views.bookmarks.render(self.state.bookmark_previews()));
	}

	async fn control_upload(&mut self, fields: &BTreeMap<String, String>) {
		log_view_error(self.views.add_recipe.render_spinner());
		let new_recipe = match NewRecipe::from_form(fields) {
			Ok(new_recipe) => new_recipe,
			Err(error) => return log_view_error(self.views.add_recipe.render_error(Some(&error.to_string()))),
		};
		let recipe = match self.source.upload(&new_recipe).await {
			Ok(recipe) => recipe,
			Err(error) => return log_view_error(self.views.add_recipe.render_error(Some(&error.to_string()))),
		};
		info!("Uploaded recipe {:?}.", recipe.id);

		self.state.active_id = Some(recipe.id.clone());
		self.state.set_recipe(recipe.clone());
		if let Err(error) = self.state.add_bookmark(&recipe, &self.storage) {
			warn!("Bookmarks were not persisted: {}", error);
		}
		if let Some(recipe) = self.state.recipe.clone() {
			log_view_error(self.views.recipe.render(recipe));
		}
		log_view_error(self.views.add_recipe.render_message(None));
		log_view_error(self.views.bookmarks.render(self.state.bookmark_previews()));

		self.schedule_close();
		#[cfg(target_arch = "wasm32")]
		crate::web::push_hash(&recipe.id);
	}

	fn control_close_upload(&mut self) {
		if self.views.add_recipe.is_open() {
			if let Err(error) = self.views.add_recipe.toggle_window() {
				error!("Failed to close the upload window: {}", error);
			}
		}
		self.reset_upload_form();
	}

	/// Brings back a blank form after it was replaced by a spinner or message.
	fn reset_upload_form(&mut self) {
		if self.views.add_recipe.state() != ViewState::Rendered {
			log_view_error(self.views.add_recipe.render(UploadDraft::blank()));
		}
	}

	#[cfg(target_arch = "wasm32")]
	fn schedule_close(&self) {
		let sender = self.sender.clone();
		let delay = self.config.modal_close_secs;
		wasm_bindgen_futures::spawn_local(async move {
			crate::web::sleep(delay).await;
			send(&sender, Action::CloseUploadWindow);
		});
	}

	/// Without a browser event loop there is nothing to wait on, so the window closes with the next action.
	#[cfg(not(target_arch = "wasm32"))]
	fn schedule_close(&self) {
		debug!(delay = self.config.modal_close_secs, "Closing the upload window without delay.");
		send(&self.sender, Action::CloseUploadWindow);
	}
}

fn forward<A>(sender: &UnboundedSender<Action>, action: impl 'static + Fn(A) -> Action) -> impl 'static + FnMut(A) {
	let sender = sender.clone();
	move |argument| send(&sender, action(argument))
}

fn send(sender: &UnboundedSender<Action>, action: Action) {
	if let Err(error) = sender.unbounded_send(action) {
		error!("Dropped action, the controller is gone: {:?}", error.into_inner());
	}
}
