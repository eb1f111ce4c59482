use recipe_dom::{
	config::Config,
	model::{
		api::{decode_response, ApiError, Endpoints, RecipeData, SearchData},
		recipe::{Ingredient, Recipe, RecipeSummary},
		state::AppState,
		storage::{MemoryStorage, Storage},
		upload::{parse_ingredient, NewRecipe, UploadError},
	},
};
use std::collections::BTreeMap;

fn summary(i: usize) -> RecipeSummary {
	RecipeSummary {
		id: format!("r{}", i),
		title: format!("Recipe {}", i),
		publisher: "Test Kitchen".to_owned(),
		image: format!("https://img.example/{}.jpg", i),
		key: None,
	}
}

fn recipe(id: &str) -> Recipe {
	Recipe {
		id: id.to_owned(),
		title: format!("Recipe {}", id),
		publisher: "Test Kitchen".to_owned(),
		source_url: "https://example.com/recipe".to_owned(),
		image: "https://img.example/r.jpg".to_owned(),
		servings: 4,
		cooking_time: 45,
		ingredients: vec![
			Ingredient {
				quantity: Some(2.0),
				unit: "cups".to_owned(),
				description: "flour".to_owned(),
			},
			Ingredient {
				quantity: None,
				unit: String::new(),
				description: "salt".to_owned(),
			},
		],
		key: None,
		bookmarked: false,
	}
}

#[test]
fn pagination_boundaries() {
	let mut state = AppState::new(&Config::default());
	state.set_search_results("pizza", (0..25).map(summary).collect());

	assert_eq!(state.page_count(), 3);
	assert_eq!(state.search.page, 1);

	let first = state.search_page_results(None);
	assert_eq!(first.len(), 10);
	assert_eq!(first[0].id, "r0");

	let last = state.search_page_results(Some(3));
	assert_eq!(last.len(), 5);
	assert_eq!(last[0].id, "r20");
	assert_eq!(state.search.page, 3);

	assert!(state.search_page_results(Some(4)).is_empty());

	let info = state.page_info();
	assert_eq!((info.page, info.results, info.per_page, info.page_count()), (3, 25, 10, 3));
}

#[test]
fn pages_past_the_end_leave_the_last_page_current() {
	let mut state = AppState::new(&Config::default());
	state.set_search_results("pizza", (0..25).map(summary).collect());
	let _ = state.search_page_results(Some(2));

	assert!(state.search_page_results(Some(40)).is_empty());
	assert_eq!(state.search.page, 3);
	assert_eq!(state.search_page_results(None).len(), 5);

	state.set_search_results("nothing", Vec::new());
	assert!(state.search_page_results(Some(2)).is_empty());
	assert_eq!(state.search.page, 1);
}

#[test]
fn new_search_resets_the_page() {
	let mut state = AppState::new(&Config::default());
	state.set_search_results("pizza", (0..25).map(summary).collect());
	let _ = state.search_page_results(Some(2));

	state.set_search_results("pasta", (0..3).map(summary).collect());

	assert_eq!(state.search.page, 1);
	assert_eq!(state.search.query, "pasta");
	assert_eq!(state.page_count(), 1);
}

#[test]
fn servings_scale_quantities() {
	let mut state = AppState::new(&Config::default());
	state.set_recipe(recipe("a"));

	assert!(state.update_servings(6));
	let scaled = state.recipe.as_ref().unwrap();
	assert_eq!(scaled.servings, 6);
	assert_eq!(scaled.ingredients[0].quantity, Some(3.0));
	assert_eq!(scaled.ingredients[1].quantity, None);

	assert!(!state.update_servings(0));
	assert_eq!(state.recipe.as_ref().unwrap().servings, 6);
}

#[test]
fn servings_need_a_recipe() {
	let mut state = AppState::new(&Config::default());
	assert!(!state.update_servings(2));
}

#[test]
fn bookmarks_round_trip_through_storage() {
	let config = Config::default();
	let storage = MemoryStorage::new();
	let mut state = AppState::new(&config);
	state.set_recipe(recipe("a"));

	let current = state.recipe.clone().unwrap();
	state.add_bookmark(&current, &storage).unwrap();
	state.add_bookmark(&current, &storage).unwrap();
	state.add_bookmark(&recipe("b"), &storage).unwrap();

	assert_eq!(state.bookmarks.len(), 2);
	assert!(state.recipe.as_ref().unwrap().bookmarked);
	assert!(storage.get_item("bookmarks").unwrap().unwrap().contains("\"id\":\"a\""));

	let mut restored = AppState::new(&config);
	assert_eq!(restored.restore_bookmarks(&storage).unwrap(), 2);
	assert_eq!(restored.bookmarks.iter().map(|bookmark| bookmark.id.as_str()).collect::<Vec<_>>(), ["a", "b"]);
	assert!(restored.bookmarks.iter().all(|bookmark| bookmark.bookmarked));

	restored.set_recipe(recipe("b"));
	assert!(restored.recipe.as_ref().unwrap().bookmarked);
}

#[test]
fn deleting_bookmarks() {
	let storage = MemoryStorage::new();
	let mut state = AppState::new(&Config::default());
	state.set_recipe(recipe("a"));
	let current = state.recipe.clone().unwrap();
	state.add_bookmark(&current, &storage).unwrap();

	assert!(!state.delete_bookmark("missing", &storage).unwrap());
	assert_eq!(state.bookmarks.len(), 1);

	assert!(state.delete_bookmark("a", &storage).unwrap());
	assert!(state.bookmarks.is_empty());
	assert!(!state.recipe.as_ref().unwrap().bookmarked);
	assert_eq!(storage.get_item("bookmarks").unwrap().as_deref(), Some("[]"));
}

#[test]
fn corrupt_stored_bookmarks_are_ignored() {
	let storage = MemoryStorage::new();
	storage.set_item("bookmarks", "{not json").unwrap();
	let mut state = AppState::new(&Config::default());

	assert_eq!(state.restore_bookmarks(&storage).unwrap(), 0);
	assert!(state.bookmarks.is_empty());
}

#[test]
fn bookmark_previews_mark_the_active_recipe() {
	let storage = MemoryStorage::new();
	let mut state = AppState::new(&Config::default());
	state.add_bookmark(&recipe("a"), &storage).unwrap();
	state.active_id = Some("a".to_owned());

	let previews = state.bookmark_previews();
	assert_eq!(previews.items[0].id, "a");
	assert_eq!(previews.active.as_deref(), Some("a"));
}

fn form(ingredients: &[(&str, &str)]) -> BTreeMap<String, String> {
	let mut fields: BTreeMap<String, String> = [
		("title", "Soup"),
		("sourceUrl", "https://example.com/soup"),
		("image", "https://img.example/soup.jpg"),
		("publisher", "Me"),
		("cookingTime", "30"),
		("servings", "2"),
	]
	.iter()
	.map(|&(name, value)| (name.to_owned(), value.to_owned()))
	.collect();
	fields.extend(ingredients.iter().map(|&(name, value)| (name.to_owned(), value.to_owned())));
	fields
}

#[test]
fn upload_form_is_parsed() {
	let fields = form(&[("ingredient-10", "1,kg,potatoes"), ("ingredient-2", ",,salt"), ("ingredient-3", "  "), ("ingredient-1", "0.5, l ,water")]);

	let recipe = NewRecipe::from_form(&fields).unwrap();

	assert_eq!(recipe.title, "Soup");
	assert_eq!(recipe.cooking_time, 30);
	assert_eq!(recipe.servings, 2);
	assert_eq!(
		recipe.ingredients,
		vec![
			Ingredient {
				quantity: Some(0.5),
				unit: "l".to_owned(),
				description: "water".to_owned()
			},
			Ingredient {
				quantity: None,
				unit: String::new(),
				description: "salt".to_owned()
			},
			Ingredient {
				quantity: Some(1.0),
				unit: "kg".to_owned(),
				description: "potatoes".to_owned()
			},
		]
	);

	let json = serde_json::to_value(&recipe).unwrap();
	assert_eq!(json["source_url"], "https://example.com/soup");
	assert_eq!(json["cooking_time"], 30);
}

#[test]
fn malformed_uploads_are_rejected() {
	assert_eq!(
		NewRecipe::from_form(&form(&[("ingredient-1", "1 kg potatoes")])),
		Err(UploadError::IngredientFormat { field: "ingredient-1".to_owned() })
	);
	assert!(matches!(NewRecipe::from_form(&form(&[("ingredient-1", "lots,kg,potatoes")])), Err(UploadError::NotANumber { .. })));

	let mut fields = form(&[]);
	fields.insert("servings".to_owned(), "two".to_owned());
	assert!(matches!(NewRecipe::from_form(&fields), Err(UploadError::NotANumber { field, .. }) if field == "servings"));

	fields.remove("title");
	assert_eq!(NewRecipe::from_form(&fields), Err(UploadError::Missing("title")));
}

#[test]
fn ingredient_parts() {
	assert_eq!(parse_ingredient("i", "1,,egg").unwrap().quantity, Some(1.0));
	assert!(parse_ingredient("i", "1,2,3,4").is_err());
	assert!(parse_ingredient("i", "inf,,x").is_err());
}

#[test]
fn endpoints() {
	let mut config = Config::default();
	config.api_url = "https://api.example/recipes/".to_owned();
	assert_eq!(Endpoints::new(&config).search("mac & cheese"), "https://api.example/recipes/?search=mac%20%26%20cheese");
	assert_eq!(Endpoints::new(&config).recipe("abc"), "https://api.example/recipes/abc");

	config.api_key = Some("k3y".to_owned());
	let endpoints = Endpoints::new(&config);
	assert_eq!(endpoints.search("pizza"), "https://api.example/recipes/?search=pizza&key=k3y");
	assert_eq!(endpoints.recipe("abc"), "https://api.example/recipes/abc?key=k3y");
	assert_eq!(endpoints.upload(), "https://api.example/recipes/?key=k3y");
}

#[test]
fn responses_are_unwrapped() {
	let body = r#"{"status":"success","data":{"recipe":{"id":"5ed6","title":"Pizza","publisher":"P","source_url":"https://p.example","image_url":"https://p.example/i.jpg","servings":4,"cooking_time":60,"ingredients":[{"quantity":1.5,"unit":"cup","description":"water"},{"quantity":null,"unit":"","description":"salt"}]}}}"#;
	let recipe = decode_response::<RecipeData>(200, body).unwrap().recipe;
	assert_eq!(recipe.id, "5ed6");
	assert_eq!(recipe.image, "https://p.example/i.jpg");
	assert_eq!(recipe.ingredients[1].quantity, None);
	assert!(!recipe.bookmarked);
	assert_eq!(recipe.key, None);

	let body = r#"{"status":"success","results":1,"data":{"recipes":[{"id":"1","title":"T","publisher":"P","image_url":"i","key":"k"}]}}"#;
	let results = decode_response::<SearchData>(200, body).unwrap().recipes;
	assert_eq!(results[0].key.as_deref(), Some("k"));
}

#[test]
fn failures_carry_the_catalogue_message() {
	let failure = decode_response::<RecipeData>(400, r#"{"status":"fail","message":"Invalid _id: nope"}"#).unwrap_err();
	assert_eq!(failure, ApiError::Status { status: 400, message: "Invalid _id: nope".to_owned() });
	assert_eq!(failure.to_string(), "Invalid _id: nope (400)");

	assert_eq!(
		decode_response::<RecipeData>(502, "<html>Bad gateway</html>").unwrap_err(),
		ApiError::Status { status: 502, message: "Request failed".to_owned() }
	);
	assert!(matches!(decode_response::<RecipeData>(200, r#"{"data":{}}"#), Err(ApiError::Decode(_))));
}

#[test]
fn config_from_partial_json() {
	let config = Config::from_json(r#"{"results_per_page": 5, "api_key": "k"}"#).unwrap();
	assert_eq!(config.results_per_page, 5);
	assert_eq!(config.api_key.as_deref(), Some("k"));
	assert_eq!(config.bookmarks_key, "bookmarks");
	assert!(Config::from_json("[]").is_err());
}
