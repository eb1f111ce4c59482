//! Turns the upload form's field map into a recipe the catalogue accepts.

use super::recipe::Ingredient;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UploadError {
	#[error("Wrong ingredient format! Please use the format 'Quantity,Unit,Description' ({field}).")]
	IngredientFormat { field: String },
	#[error("{field} must be a number, but was {value:?}.")]
	NotANumber { field: String, value: String },
	#[error("{0} is required.")]
	Missing(&'static str),
}

/// Request body of a recipe upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
	pub title: String,
	pub source_url: String,
	pub image_url: String,
	pub publisher: String,
	pub cooking_time: u32,
	pub servings: u32,
	pub ingredients: Vec<Ingredient>,
}

impl NewRecipe {
	/// Reads the upload form's fields.
	///
	/// Ingredients come from the non-empty fields named `ingredient-N`, ordered by `N`, each formatted as
	/// `quantity,unit,description`. The quantity may be empty.
	///
	/// # Errors
	///
	/// Iff a required field is missing, a number doesn't parse or an ingredient isn't in the expected format.
	pub fn from_form(fields: &BTreeMap<String, String>) -> Result<Self, UploadError> {
		let text = |name: &'static str| -> Result<String, UploadError> {
			match fields.get(name).map(|value| value.trim()) {
				Some(value) if !value.is_empty() => Ok(value.to_owned()),
				_ => Err(UploadError::Missing(name)),
			}
		};
		let number = |name: &'static str| -> Result<u32, UploadError> {
			let value = text(name)?;
			value.parse().map_err(|_| UploadError::NotANumber { field: name.to_owned(), value })
		};

		let mut ingredient_fields: Vec<(u32, &String, &String)> = fields
			.iter()
			.filter(|(_, value)| !value.trim().is_empty())
			.filter_map(|(name, value)| {
				let index = name.strip_prefix("ingredient")?.trim_start_matches('-');
				Some((index.parse().unwrap_or(u32::MAX), name, value))
			})
			.collect();
		ingredient_fields.sort_by_key(|&(index, name, _)| (index, name));

		Ok(Self {
			title: text("title")?,
			source_url: text("sourceUrl")?,
			image_url: text("image")?,
			publisher: text("publisher")?,
			cooking_time: number("cookingTime")?,
			servings: number("servings")?,
			ingredients: ingredient_fields.into_iter().map(|(_, name, value)| parse_ingredient(name, value)).collect::<Result<_, _>>()?,
		})
	}
}

/// Parses `quantity,unit,description`.
///
/// # Errors
///
/// Iff there aren't exactly three comma-separated parts or the quantity isn't a number.
pub fn parse_ingredient(field: &str, value: &str) -> Result<Ingredient, UploadError> {
	let parts: Vec<&str> = value.split(',').map(str::trim).collect();
	let (quantity, unit, description) = match parts.as_slice() {
		&[quantity, unit, description] => (quantity, unit, description),
		_ => return Err(UploadError::IngredientFormat { field: field.to_owned() }),
	};
	let quantity = match quantity {
		"" => None,
		quantity => Some(quantity.parse::<f64>().ok().filter(|quantity| quantity.is_finite()).ok_or_else(|| UploadError::NotANumber {
			field: field.to_owned(),
			value: quantity.to_owned(),
		})?),
	};
	Ok(Ingredient {
		quantity,
		unit: unit.to_owned(),
		description: description.to_owned(),
	})
}
