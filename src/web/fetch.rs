use crate::{
	config::Config,
	model::{
		api::{decode_response, ApiError, Endpoints, RecipeData, RecipeSource, SearchData},
		recipe::{Recipe, RecipeSummary},
		upload::NewRecipe,
	},
};
use async_trait::async_trait;
use futures::future::{self, Either};
use tracing::{debug, instrument};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, Response};

fn network_error(error: &JsValue) -> ApiError {
	ApiError::Network(error.as_string().unwrap_or_else(|| format!("{:?}", error)))
}

/// [`RecipeSource`] over the browser's `fetch`, with every request raced against a timeout.
#[derive(Debug, Clone)]
pub struct CatalogClient {
	endpoints: Endpoints,
	timeout_secs: u32,
}

impl CatalogClient {
	#[must_use]
	pub fn new(config: &Config) -> Self {
		Self {
			endpoints: Endpoints::new(config),
			timeout_secs: config.timeout_secs,
		}
	}

	#[instrument(skip(self, body))]
	async fn request(&self, method: &str, url: &str, body: Option<String>) -> Result<(u16, String), ApiError> {
		let mut init = RequestInit::new();
		init.method(method);
		if let Some(body) = &body {
			init.body(Some(&JsValue::from_str(body)));
		}
		let request = Request::new_with_str_and_init(url, &init).map_err(|error| network_error(&error))?;
		if body.is_some() {
			request.headers().set("Content-Type", "application/json").map_err(|error| network_error(&error))?;
		}
		let window = web_sys::window().ok_or_else(|| ApiError::Network("no global `window` exists".to_owned()))?;

		let fetch = Box::pin(JsFuture::from(window.fetch_with_request(&request)));
		let timeout = Box::pin(super::sleep(f64::from(self.timeout_secs)));
		let response = match future::select(fetch, timeout).await {
			Either::Left((response, _)) => response.map_err(|error| network_error(&error))?,
			Either::Right(((), _)) => return Err(ApiError::Timeout { secs: self.timeout_secs }),
		};
		let response: Response = response.dyn_into().map_err(|error| network_error(&error))?;
		let text = JsFuture::from(response.text().map_err(|error| network_error(&error))?).await.map_err(|error| network_error(&error))?;
		debug!(status = response.status(), "Response received.");
		Ok((response.status(), text.as_string().unwrap_or_default()))
	}
}

#[async_trait(?Send)]
impl RecipeSource for CatalogClient {
	async fn load_recipe(&self, id: &str) -> Result<Recipe, ApiError> {
		let (status, body) = self.request("GET", &self.endpoints.recipe(id), None).await?;
		decode_response::<RecipeData>(status, &body).map(|data| data.recipe)
	}

	async fn search(&self, query: &str) -> Result<Vec<RecipeSummary>, ApiError> {
		let (status, body) = self.request("GET", &self.endpoints.search(query), None).await?;
		decode_response::<SearchData>(status, &body).map(|data| data.recipes)
	}

	async fn upload(&self, recipe: &NewRecipe) -> Result<Recipe, ApiError> {
		let body = serde_json::to_string(recipe).map_err(|error| ApiError::Decode(error.to_string()))?;
		let (status, body) = self.request("POST", &self.endpoints.upload(), Some(body)).await?;
		decode_response::<RecipeData>(status, &body).map(|data| data.recipe)
	}
}
