use serde::Deserialize;

/// Runtime configuration. Every field has a default, so partial JSON is accepted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
	/// Base URL of the recipe catalogue, ending in `/`.
	pub api_url: String,
	pub api_key: Option<String>,
	pub timeout_secs: u32,
	pub results_per_page: usize,
	/// Delay before the upload window closes after a successful upload.
	pub modal_close_secs: f64,
	/// URL of the SVG sprite sheet all icons are referenced from.
	pub icons_url: String,
	/// Local storage key of the persisted bookmark list.
	pub bookmarks_key: String,
	pub depth_limit: usize,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			api_url: "https://forkify-api.herokuapp.com/api/v2/recipes/".to_owned(),
			api_key: None,
			timeout_secs: 10,
			results_per_page: 10,
			modal_close_secs: 2.5,
			icons_url: "img/icons.svg".to_owned(),
			bookmarks_key: "bookmarks".to_owned(),
			depth_limit: 64,
		}
	}
}

impl Config {
	/// # Errors
	///
	/// Iff `json` isn't a JSON object with fields of the right types.
	pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(json)
	}
}
