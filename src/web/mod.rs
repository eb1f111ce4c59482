//! The browser backend: [`LiveNode`] over `web_sys::Node`, event listeners, `localStorage` and `fetch`.

use crate::{
	config::Config,
	controller::Controller,
	dom::{DomError, LiveNode, NodeKind},
	logging,
	markup::{self, Namespace},
};
use js_sys::Promise;
use tracing::{error, info, instrument};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CharacterData, Element, HtmlInputElement, Node};

pub mod fetch;
pub mod listeners;
pub mod storage;

pub use fetch::CatalogClient;
pub use listeners::Listener;
pub use storage::LocalStorage;

pub(crate) fn js_error(operation: &'static str, value: &JsValue) -> DomError {
	DomError::new(operation, value.as_string().unwrap_or_else(|| format!("{:?}", value)))
}

fn window() -> Result<web_sys::Window, DomError> {
	web_sys::window().ok_or_else(|| DomError::new("window", "no global `window` exists"))
}

impl LiveNode for Node {
	fn kind(&self) -> NodeKind {
		match self.node_type() {
			Node::ELEMENT_NODE => self.dyn_ref::<Element>().map_or(NodeKind::Other, |element| NodeKind::Element(element.local_name())),
			Node::TEXT_NODE => NodeKind::Text,
			Node::COMMENT_NODE => NodeKind::Comment,
			_ => NodeKind::Other,
		}
	}

	fn child_nodes(&self) -> Vec<Self> {
		let list = Node::child_nodes(self);
		(0..list.length()).filter_map(|i| list.item(i)).collect()
	}

	fn parent(&self) -> Option<Self> {
		self.parent_node()
	}

	fn data(&self) -> Option<String> {
		match self.node_type() {
			Node::TEXT_NODE | Node::COMMENT_NODE => self.dyn_ref::<CharacterData>().map(CharacterData::data),
			_ => None,
		}
	}

	fn set_data(&self, data: &str) -> Result<(), DomError> {
		match self.dyn_ref::<CharacterData>() {
			Some(character_data) => {
				character_data.set_data(data);
				Ok(())
			}
			None => Err(DomError::new("set_data", format!("{:?} has no character data", self))),
		}
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.dyn_ref::<Element>()?.get_attribute(name)
	}

	fn attributes(&self) -> Vec<markup::Attribute> {
		let element = match self.dyn_ref::<Element>() {
			Some(element) => element,
			None => return Vec::new(),
		};
		let map = element.attributes();
		(0..map.length())
			.filter_map(|i| map.item(i))
			.map(|attribute| markup::Attribute {
				name: attribute.name(),
				value: attribute.value(),
			})
			.collect()
	}

	fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
		self.dyn_ref::<Element>()
			.ok_or_else(|| DomError::new("set_attribute", "only elements have attributes"))?
			.set_attribute(name, value)
			.map_err(|error| js_error("set_attribute", &error))
	}

	fn append_child(&self, child: &Self) -> Result<(), DomError> {
		Node::append_child(self, child).map(drop).map_err(|error| js_error("append_child", &error))
	}

	fn replace_child(&self, new_child: &Self, old_child: &Self) -> Result<(), DomError> {
		Node::replace_child(self, new_child, old_child).map(drop).map_err(|error| js_error("replace_child", &error))
	}

	fn remove_child(&self, child: &Self) -> Result<(), DomError> {
		Node::remove_child(self, child).map(drop).map_err(|error| js_error("remove_child", &error))
	}

	#[instrument(skip(node))]
	fn instantiate(&self, node: &markup::Node) -> Result<Self, DomError> {
		let document = match self.dyn_ref::<web_sys::Document>() {
			Some(document) => document.clone(),
			None => self.owner_document().ok_or_else(|| DomError::new("instantiate", "node has no owner document"))?,
		};
		Ok(match node {
			markup::Node::Text(text) => document.create_text_node(text).into(),
			markup::Node::Comment(comment) => document.create_comment(comment).into(),
			markup::Node::Element(element) => {
				let instance = match element.namespace {
					Namespace::Html => document.create_element(&element.name),
					namespace => document.create_element_ns(Some(namespace.uri()), &element.name),
				}
				.map_err(|error| js_error("create_element", &error))?;
				for attribute in &element.attributes {
					instance.set_attribute(&attribute.name, &attribute.value).map_err(|error| js_error("set_attribute", &error))?;
				}
				let instance: Node = instance.into();
				for child in &element.children {
					let child = LiveNode::instantiate(&instance, child)?;
					LiveNode::append_child(&instance, &child)?;
				}
				instance
			}
		})
	}

	fn is_same_node(&self, other: &Self) -> bool {
		Node::is_same_node(self, Some(other))
	}

	fn query_selector(&self, selector: &str) -> Option<Self> {
		let found = if let Some(element) = self.dyn_ref::<Element>() {
			element.query_selector(selector)
		} else if let Some(document) = self.dyn_ref::<web_sys::Document>() {
			document.query_selector(selector)
		} else {
			return None;
		};
		match found {
			Ok(found) => found.map(Into::into),
			Err(error) => {
				error!("Invalid selector {:?}: {:?}", selector, error);
				None
			}
		}
	}

	fn set_form_value(&self, value: &str) -> Result<(), DomError> {
		match self.dyn_ref::<HtmlInputElement>() {
			Some(input) => {
				input.set_value(value);
				Ok(())
			}
			None => LiveNode::set_attribute(self, "value", value),
		}
	}
}

/// The location hash, including the leading `#` if there is one.
///
/// # Errors
///
/// Iff there's no window or its location can't be read.
pub fn location_hash() -> Result<String, DomError> {
	window()?.location().hash().map_err(|error| js_error("location.hash", &error))
}

/// Changes the location hash to `#id` without triggering navigation.
pub fn push_hash(id: &str) {
	let pushed = window()
		.and_then(|window| window.history().map_err(|error| js_error("history", &error)))
		.and_then(|history| history.push_state_with_url(&JsValue::NULL, "", Some(&format!("#{}", id))).map_err(|error| js_error("history.pushState", &error)));
	if let Err(error) = pushed {
		error!("{}", error);
	}
}

/// Resolves after `secs` seconds, or immediately if no timer can be set.
pub async fn sleep(secs: f64) {
	#[allow(clippy::cast_possible_truncation)]
	let millis = (secs * 1000.0).round() as i32;
	let promise = Promise::new(&mut |resolve, _reject| {
		let scheduled = window().and_then(|window| {
			window
				.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis)
				.map_err(|error| js_error("setTimeout", &error))
		});
		if let Err(error) = scheduled {
			error!("{}", error);
			drop(resolve.call0(&JsValue::UNDEFINED));
		}
	});
	if let Err(error) = wasm_bindgen_futures::JsFuture::from(promise).await {
		error!("Timer failed: {:?}", error);
	}
}

/// Starts the application on the current page.
///
/// Mounts the views below `document.body`, restores bookmarks, shows the recipe named by the location
/// hash and then handles user input until the page is unloaded.
///
/// # Errors
///
/// Iff there's no document body or one of the views' mount points is missing.
pub fn start(config: Config) -> Result<(), JsValue> {
	logging::init();
	let body: Node = window()
		.ok()
		.and_then(|window| window.document())
		.and_then(|document| document.body())
		.ok_or_else(|| JsValue::from_str("no document body"))?
		.into();

	let source = CatalogClient::new(&config);
	let controller = Controller::new(&body, config, LocalStorage, source).map_err(|error| JsValue::from_str(&error.to_string()))?;
	let (listeners, events) = listeners::listen(&body).map_err(|error| JsValue::from_str(&error.to_string()))?;
	info!("Listening with {} listener(s).", listeners.len());

	wasm_bindgen_futures::spawn_local(async move {
		controller.run(events).await;
		drop(listeners);
	});
	Ok(())
}
