#![cfg(target_arch = "wasm32")]

use recipe_dom::{
	dom::LiveNode,
	events::UiEvent,
	logging,
	model::storage::Storage,
	reconcile::Reconciler,
	view::View,
	views::{PageInfo, PaginationTemplate},
	web::{listeners::listen, LocalStorage},
};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{window, Document, Element, HtmlElement, Node};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
	window().unwrap().document().unwrap()
}

/// A fresh `<div>` appended to the body, containing one empty `<div>` with `class`.
fn container(class: &str) -> Node {
	logging::init();
	let document = document();
	let container = document.create_element("div").unwrap();
	let inner = document.create_element("div").unwrap();
	inner.set_class_name(class);
	container.append_child(&inner).unwrap();
	document.body().unwrap().append_child(&container).unwrap();
	container.into()
}

#[wasm_bindgen_test]
fn updates_keep_node_identity() {
	let root = container("pagination");
	let mut view = View::mount(PaginationTemplate::new("icons.svg"), &root).unwrap();

	view.render(PageInfo { page: 1, results: 25, per_page: 10 }).unwrap();
	let next = view.mount_point().query_selector(".pagination__btn--next").unwrap();

	let patches = view.update(PageInfo { page: 1, results: 35, per_page: 10 }).unwrap();

	assert_eq!(patches.structural_count(), 0);
	assert!(LiveNode::is_same_node(&next, &view.mount_point().query_selector(".pagination__btn--next").unwrap()));
	assert_eq!(LiveNode::text_content(&view.mount_point().query_selector(".span__inline").unwrap()), "-4-");
}

#[wasm_bindgen_test]
fn svg_is_created_in_its_namespace() {
	let root = container("pagination");
	let mut view = View::mount(PaginationTemplate::new("icons.svg"), &root).unwrap();

	view.render(PageInfo { page: 2, results: 25, per_page: 10 }).unwrap();

	let icon: Element = view.mount_point().query_selector("use").unwrap().dyn_into().unwrap();
	assert_eq!(icon.namespace_uri().as_deref(), Some("http://www.w3.org/2000/svg"));
	assert_eq!(icon.get_attribute("href").as_deref(), Some("icons.svg#icon-arrow-left"));
	assert_eq!(icon.local_name(), "use");
}

#[wasm_bindgen_test]
fn focus_survives_reconciliation() {
	let root = container("form");
	let mount_point = root.query_selector(".form").unwrap();
	let reconciler = Reconciler::default();
	reconciler.reconcile(&mount_point, r#"<input class="field" /><span>0 results</span>"#).unwrap();
	let input: HtmlElement = mount_point.query_selector(".field").unwrap().dyn_into().unwrap();
	input.focus().unwrap();

	let patches = reconciler.reconcile(&mount_point, r#"<input class="field" /><span>7 results</span>"#).unwrap();

	assert_eq!(patches.len(), 1);
	let active = document().active_element().unwrap();
	assert!(Node::is_same_node(input.as_ref(), Some(active.as_ref())));
}

#[wasm_bindgen_test]
fn listeners_forward_clicks_until_dropped() {
	let root = container("listen");
	let button: HtmlElement = document().create_element("button").unwrap().dyn_into().unwrap();
	Node::append_child(&root.query_selector(".listen").unwrap(), &button).unwrap();

	let (listeners, mut events) = listen(&root).unwrap();
	assert!(matches!(events.try_next(), Ok(Some(UiEvent::Load { .. }))));

	button.click();
	match events.try_next() {
		Ok(Some(UiEvent::Click { target })) => assert!(LiveNode::is_same_node(&target, button.as_ref())),
		other => panic!("expected a click, got {:?}", other),
	}

	drop(listeners);
	button.click();
	assert!(matches!(events.try_next(), Ok(None)));
}

#[wasm_bindgen_test]
fn local_storage_round_trip() {
	LocalStorage.set_item("recipe-dom-test", r#"[{"id":"x"}]"#).unwrap();
	assert_eq!(LocalStorage.get_item("recipe-dom-test").unwrap().as_deref(), Some(r#"[{"id":"x"}]"#));
	assert_eq!(LocalStorage.get_item("recipe-dom-test-missing").unwrap(), None);
}
