use crate::view::RenderableData;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
	pub quantity: Option<f64>,
	#[serde(default)]
	pub unit: String,
	#[serde(default)]
	pub description: String,
}

/// A full recipe as shown in the detail view and stored as a bookmark.
///
/// Field names on the wire are the catalogue API's.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
	pub id: String,
	pub title: String,
	pub publisher: String,
	pub source_url: String,
	#[serde(rename = "image_url")]
	pub image: String,
	pub servings: u32,
	pub cooking_time: u32,
	#[serde(default)]
	pub ingredients: Vec<Ingredient>,
	/// Present on recipes uploaded with the configured API key.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
	/// Local state, derived from the bookmark list.
	#[serde(default, skip_serializing)]
	pub bookmarked: bool,
}

impl Recipe {
	#[must_use]
	pub fn summary(&self) -> RecipeSummary {
		RecipeSummary {
			id: self.id.clone(),
			title: self.title.clone(),
			publisher: self.publisher.clone(),
			image: self.image.clone(),
			key: self.key.clone(),
		}
	}
}

impl RenderableData for Recipe {
	fn is_empty(&self) -> bool {
		self.id.is_empty()
	}
}

/// A search result or bookmark preview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeSummary {
	pub id: String,
	pub title: String,
	pub publisher: String,
	#[serde(rename = "image_url")]
	pub image: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub key: Option<String>,
}
