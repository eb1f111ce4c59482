//! The application's concrete views: one [`Template`](`crate::view::Template`) each, plus handler
//! registration for the views that receive input.

pub mod add_recipe;
pub mod bookmarks;
pub mod pagination;
pub mod preview;
pub mod recipe;
pub mod results;
pub mod search;

pub use add_recipe::{AddRecipeTemplate, AddRecipeView, UploadDraft};
pub use bookmarks::{BookmarksTemplate, BookmarksView};
pub use pagination::{PageInfo, PaginationTemplate, PaginationView};
pub use preview::PreviewList;
pub use recipe::{RecipeTemplate, RecipeView};
pub use results::{ResultsTemplate, ResultsView};
pub use search::SearchView;
