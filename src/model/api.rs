//! The recipe catalogue's HTTP interface, independent of how requests are sent.

use super::{
	recipe::{Recipe, RecipeSummary},
	upload::NewRecipe,
};
use crate::config::Config;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ApiError {
	#[error("Request took too long! Timeout after {secs} second(s)")]
	Timeout { secs: u32 },
	#[error("{message} ({status})")]
	Status { status: u16, message: String },
	#[error("unexpected response body: {0}")]
	Decode(String),
	#[error("network error: {0}")]
	Network(String),
}

/// Where recipes are loaded from. Implemented over `fetch` in the browser and by fakes in tests.
#[async_trait(?Send)]
pub trait RecipeSource {
	/// # Errors
	///
	/// Iff the request fails, times out or the catalogue doesn't know `id`.
	async fn load_recipe(&self, id: &str) -> Result<Recipe, ApiError>;

	/// # Errors
	///
	/// Iff the request fails or times out.
	async fn search(&self, query: &str) -> Result<Vec<RecipeSummary>, ApiError>;

	/// Stores `recipe` in the catalogue and returns it as stored (with id and key).
	///
	/// # Errors
	///
	/// Iff the request fails, times out or the catalogue rejects the recipe.
	async fn upload(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError>;
}

/// URL construction for the catalogue endpoints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
	base: String,
	key: Option<String>,
}

impl Endpoints {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self {
			base: config.api_url.clone(),
			key: config.api_key.clone(),
		}
	}

	#[must_use]
	pub fn recipe(&self, id: &str) -> String {
		self.with_key(format!("{}{}", self.base, urlencoding::encode(id)), '?')
	}

	#[must_use]
	pub fn search(&self, query: &str) -> String {
		self.with_key(format!("{}?search={}", self.base, urlencoding::encode(query)), '&')
	}

	#[must_use]
	pub fn upload(&self) -> String {
		self.with_key(self.base.clone(), '?')
	}

	fn with_key(&self, mut url: String, separator: char) -> String {
		if let Some(key) = &self.key {
			url.push(separator);
			url.push_str("key=");
			url.push_str(&urlencoding::encode(key));
		}
		url
	}
}

#[derive(Debug, Deserialize)]
pub struct RecipeData {
	pub recipe: Recipe,
}

#[derive(Debug, Deserialize)]
pub struct SearchData {
	pub recipes: Vec<RecipeSummary>,
}

#[derive(Deserialize)]
struct Envelope<T> {
	data: T,
}

#[derive(Deserialize)]
struct FailureBody {
	message: Option<String>,
}

/// Unwraps the catalogue's `{ "status": …, "data": … }` envelope.
///
/// # Errors
///
/// [`ApiError::Status`] with the catalogue's message for non-2xx statuses,
/// [`ApiError::Decode`] if a successful body doesn't have the expected shape.
pub fn decode_response<T: DeserializeOwned>(status: u16, body: &str) -> Result<T, ApiError> {
	if !(200..300).contains(&status) {
		let message = serde_json::from_str::<FailureBody>(body)
			.ok()
			.and_then(|failure| failure.message)
			.unwrap_or_else(|| "Request failed".to_owned());
		return Err(ApiError::Status { status, message });
	}
	serde_json::from_str::<Envelope<T>>(body).map(|envelope| envelope.data).map_err(|error| ApiError::Decode(error.to_string()))
}
