use super::{js_error, location_hash};
use crate::{dom::DomError, events::UiEvent};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use std::collections::BTreeMap;
use tracing::{error, trace, trace_span, warn};
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{Event, EventTarget, FormData, HtmlFormElement, Node};

/// An event listener that is removed again when dropped.
pub struct Listener {
	target: EventTarget,
	kind: &'static str,
	closure: Closure<dyn FnMut(Event)>,
}

impl core::fmt::Debug for Listener {
	fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
		f.debug_struct("Listener").field("target", &self.target).field("kind", &self.kind).finish_non_exhaustive()
	}
}

impl Listener {
	/// # Errors
	///
	/// Iff the browser refuses the listener.
	pub fn new(target: &EventTarget, kind: &'static str, handler: impl 'static + FnMut(Event)) -> Result<Self, DomError> {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
		target
			.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())
			.map_err(|error| js_error("addEventListener", &error))?;
		Ok(Self {
			target: target.clone(),
			kind,
			closure,
		})
	}
}

impl Drop for Listener {
	fn drop(&mut self) {
		if let Err(error) = self.target.remove_event_listener_with_callback(self.kind, self.closure.as_ref().unchecked_ref()) {
			error!("Failed to remove {} listener: {:?}", self.kind, error);
		}
	}
}

/// Reads a form's controls into a name-to-value map. Files are skipped.
fn form_fields(form: &HtmlFormElement) -> Result<BTreeMap<String, String>, DomError> {
	let data = FormData::new_with_form(form).map_err(|error| js_error("FormData", &error))?;
	let entries = js_sys::try_iter(data.as_ref())
		.map_err(|error| js_error("FormData.entries", &error))?
		.ok_or_else(|| DomError::new("FormData.entries", "not iterable"))?;
	let mut fields = BTreeMap::new();
	for entry in entries {
		let entry = js_sys::Array::from(&entry.map_err(|error| js_error("FormData.entries", &error))?);
		if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
			fields.insert(name, value);
		}
	}
	Ok(fields)
}

fn send(sender: &UnboundedSender<UiEvent<Node>>, event: UiEvent<Node>) {
	trace!("Forwarding {:?}", event);
	if sender.unbounded_send(event).is_err() {
		warn!("Dropped event, nobody is listening anymore.");
	}
}

fn current_hash() -> String {
	location_hash().unwrap_or_else(|error| {
		error!("{}", error);
		String::new()
	})
}

/// Listens for clicks and submissions below `root` and for hash changes on the window.
///
/// The stream starts with a [`UiEvent::Load`] for the current location hash. Form submissions have their
/// default action prevented.
///
/// # Errors
///
/// Iff a listener can't be added.
pub fn listen(root: &Node) -> Result<(Vec<Listener>, UnboundedReceiver<UiEvent<Node>>), DomError> {
	let (sender, receiver) = mpsc::unbounded();
	let window: EventTarget = web_sys::window().ok_or_else(|| DomError::new("window", "no global `window` exists"))?.into();
	let root: &EventTarget = root.as_ref();
	let mut listeners = Vec::with_capacity(3);

	listeners.push(Listener::new(root, "click", {
		let sender = sender.clone();
		move |event| {
			let span = trace_span!("click");
			let _enter = span.enter();
			if let Some(target) = event.target().and_then(|target| target.dyn_into::<Node>().ok()) {
				send(&sender, UiEvent::Click { target });
			}
		}
	})?);

	listeners.push(Listener::new(root, "submit", {
		let sender = sender.clone();
		move |event| {
			let span = trace_span!("submit");
			let _enter = span.enter();
			event.prevent_default();
			let form = match event.target().and_then(|target| target.dyn_into::<HtmlFormElement>().ok()) {
				Some(form) => form,
				None => return warn!("Submit event without a form target."),
			};
			match form_fields(&form) {
				Ok(fields) => send(&sender, UiEvent::Submit { form: form.into(), fields }),
				Err(error) => error!("Failed to read the submitted form: {}", error),
			}
		}
	})?);

	listeners.push(Listener::new(&window, "hashchange", {
		let sender = sender.clone();
		move |_| send(&sender, UiEvent::HashChange { hash: current_hash() })
	})?);

	send(&sender, UiEvent::Load { hash: current_hash() });
	Ok((listeners, receiver))
}
