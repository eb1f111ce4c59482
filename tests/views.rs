use recipe_dom::{
	dom::LiveNode,
	events::UiEvent,
	memory::{MemoryDocument, MemoryNode},
	model::recipe::{Ingredient, Recipe, RecipeSummary},
	view::{Template, View, ViewState},
	views::{
		recipe::format_quantity, AddRecipeTemplate, AddRecipeView, BookmarksTemplate, BookmarksView, PageInfo, PaginationTemplate, PaginationView, PreviewList, RecipeTemplate, RecipeView,
		ResultsTemplate, SearchView, UploadDraft,
	},
};
use std::{cell::RefCell, collections::BTreeMap, rc::Rc};

const PAGE: &str = r#"
<nav><button class="nav__btn nav__btn--add-recipe"><span>Add recipe</span></button></nav>
<form class="search"><input class="search__field" name="query" value="pizza" /></form>
<div class="results"></div>
<div class="pagination"></div>
<ul class="bookmarks__list"></ul>
<div class="recipe"></div>
<div class="overlay hidden"></div>
<div class="add-recipe-window hidden">
  <button class="btn--close-modal">&times;</button>
  <form class="upload"></form>
</div>"#;

fn document() -> MemoryDocument {
	drop(tracing_subscriber::fmt().with_test_writer().try_init());
	MemoryDocument::from_markup(PAGE).unwrap()
}

fn recorder<A: 'static>() -> (Rc<RefCell<Vec<A>>>, impl FnMut(A)) {
	let calls = Rc::new(RefCell::new(Vec::new()));
	let sink = Rc::clone(&calls);
	(calls, move |argument| sink.borrow_mut().push(argument))
}

fn click(target: &MemoryNode) -> UiEvent<MemoryNode> {
	UiEvent::Click { target: target.clone() }
}

fn summary(id: &str, key: Option<&str>) -> RecipeSummary {
	RecipeSummary {
		id: id.to_owned(),
		title: format!("Recipe {}", id),
		publisher: "Kitchen".to_owned(),
		image: "i.jpg".to_owned(),
		key: key.map(str::to_owned),
	}
}

fn recipe() -> Recipe {
	Recipe {
		id: "r1".to_owned(),
		title: "Pasta & Peas".to_owned(),
		publisher: "Kitchen".to_owned(),
		source_url: "https://example.com".to_owned(),
		image: "p.jpg".to_owned(),
		servings: 4,
		cooking_time: 20,
		ingredients: vec![Ingredient {
			quantity: Some(1.5),
			unit: "cups".to_owned(),
			description: "peas".to_owned(),
		}],
		key: None,
		bookmarked: false,
	}
}

fn page(page: usize, results: usize) -> PageInfo {
	PageInfo { page, results, per_page: 10 }
}

#[test]
fn pagination_controls() {
	let document = document();
	let mut view = View::mount(PaginationTemplate::new("i.svg"), document.body()).unwrap();
	let buttons = |view: &View<PaginationTemplate, MemoryNode>| {
		let mut found = Vec::new();
		for class in &["pagination__btn--prev", "pagination__btn--next"] {
			if let Some(button) = view.mount_point().query_selector(&format!(".{}", class)) {
				found.push(button.attribute("data-goto").unwrap());
			}
		}
		found
	};

	view.render(page(1, 25)).unwrap();
	assert_eq!(buttons(&view), ["2"]);
	assert_eq!(view.mount_point().query_selector(".span__inline").unwrap().text_content(), "-3-");

	view.render(page(2, 25)).unwrap();
	assert_eq!(buttons(&view), ["1", "3"]);

	view.render(page(3, 25)).unwrap();
	assert_eq!(buttons(&view), ["2"]);
	assert!(view.mount_point().query_selector(".pagination__btn--prev").is_some());

	view.render(page(1, 10)).unwrap();
	assert_eq!(view.state(), ViewState::Rendered);
	assert!(view.mount_point().child_nodes().is_empty());
}

#[test]
fn pagination_reports_the_target_page() {
	let document = document();
	let mut view = PaginationView::new(View::mount(PaginationTemplate::new("i.svg"), document.body()).unwrap());
	let (pages, handler) = recorder::<u32>();
	view.add_handler_click(handler);
	view.render(page(2, 25)).unwrap();

	let next = view.mount_point().query_selector(".pagination__btn--next").unwrap();
	let label = next.query_selector("span").unwrap();
	assert_eq!(view.dispatch(&click(&label)), 1);
	assert_eq!(view.dispatch(&click(view.mount_point())), 0);
	assert_eq!(view.dispatch(&click(document.body())), 0);

	assert_eq!(*pages.borrow(), [3]);
}

#[test]
fn previews_mark_the_active_recipe_and_user_recipes() {
	let document = document();
	let mut view = View::mount(ResultsTemplate::new("i.svg"), document.body()).unwrap();

	view.render(PreviewList {
		items: vec![summary("a", None), summary("b", Some("k"))],
		active: Some("b".to_owned()),
	})
	.unwrap();

	let links: Vec<MemoryNode> = view.mount_point().child_nodes().into_iter().filter_map(|node| node.query_selector("a")).collect();
	assert_eq!(links.len(), 2);
	assert_eq!(links[0].attribute("href").as_deref(), Some("#a"));
	assert!(!links[0].has_class("preview__link--active"));
	assert!(links[1].has_class("preview__link--active"));
	assert!(links[0].query_selector(".preview__user-generated").unwrap().has_class("hidden"));
	assert!(!links[1].query_selector(".preview__user-generated").unwrap().has_class("hidden"));
}

#[test]
fn moving_the_active_preview_only_touches_classes() {
	let document = document();
	let mut view = View::mount(ResultsTemplate::new("i.svg"), document.body()).unwrap();
	let mut list = PreviewList {
		items: vec![summary("a", None), summary("b", None)],
		active: Some("a".to_owned()),
	};
	view.render(list.clone()).unwrap();

	list.active = Some("b".to_owned());
	let patches = view.update(list).unwrap();

	assert_eq!(patches.len(), 2);
	assert_eq!(patches.structural_count(), 0);
}

#[test]
fn empty_results_show_the_error_message() {
	let document = document();
	let mut view = View::mount(ResultsTemplate::new("i.svg"), document.body()).unwrap();

	view.render(PreviewList { items: Vec::new(), active: None }).unwrap();

	assert_eq!(view.state(), ViewState::Error);
	assert_eq!(view.mount_point().query_selector("p").unwrap().text_content(), "No recipes found! Please try again.");
}

#[test]
fn bookmarks_render_on_load() {
	let document = document();
	let mut view = BookmarksView::new(View::mount(BookmarksTemplate::new("i.svg"), document.body()).unwrap());
	let (loads, handler) = recorder::<()>();
	view.add_handler_render(handler);

	assert_eq!(view.dispatch(&UiEvent::Load { hash: String::new() }), 1);
	assert_eq!(view.dispatch(&UiEvent::HashChange { hash: "#x".to_owned() }), 0);
	assert_eq!(loads.borrow().len(), 1);

	view.render(PreviewList { items: Vec::new(), active: None }).unwrap();
	assert_eq!(
		view.mount_point().query_selector("p").unwrap().text_content(),
		"No bookmarks yet! Find a nice recipe and bookmark it :)"
	);
}

#[test]
fn recipe_markup() {
	let template = RecipeTemplate::new("i.svg");
	let document = document();
	let mut view = View::mount(template, document.body()).unwrap();
	let mut data = recipe();

	view.render(data.clone()).unwrap();
	let mount_point = view.mount_point().clone();
	assert_eq!(mount_point.query_selector(".recipe__title").unwrap().text_content().trim(), "Pasta & Peas");
	assert_eq!(mount_point.query_selector(".recipe__quantity").unwrap().text_content(), "1 1/2");
	assert_eq!(mount_point.query_selector(".recipe__info-data--people").unwrap().text_content(), "4");
	assert!(mount_point.query_selector(".recipe__user-generated").unwrap().has_class("hidden"));
	let bookmark_icon = mount_point.query_selector(".btn--bookmark").unwrap().query_selector("use").unwrap();
	assert_eq!(bookmark_icon.attribute("href").as_deref(), Some("i.svg#icon-bookmark"));

	data.bookmarked = true;
	data.servings = 8;
	data.ingredients[0].quantity = Some(3.0);
	let patches = view.update(data).unwrap();
	assert_eq!(patches.structural_count(), 0);
	assert_eq!(bookmark_icon.attribute("href").as_deref(), Some("i.svg#icon-bookmark-fill"));
	assert_eq!(mount_point.query_selector(".recipe__quantity").unwrap().text_content(), "3");
}

#[test]
fn recipe_handlers() {
	let document = document();
	let mut view = RecipeView::new(View::mount(RecipeTemplate::new("i.svg"), document.body()).unwrap());
	let (ids, on_render) = recorder::<String>();
	let (servings, on_servings) = recorder::<u32>();
	let (bookmarks, on_bookmark) = recorder::<()>();
	view.add_handler_render(on_render);
	view.add_handler_update_servings(on_servings);
	view.add_handler_add_bookmark(on_bookmark);

	assert_eq!(view.dispatch(&UiEvent::HashChange { hash: "#5ed6".to_owned() }), 1);
	assert_eq!(view.dispatch(&UiEvent::Load { hash: String::new() }), 0);
	assert_eq!(view.dispatch(&UiEvent::Load { hash: "abc".to_owned() }), 1);
	assert_eq!(*ids.borrow(), ["5ed6", "abc"]);

	view.render(recipe()).unwrap();
	let buttons: Vec<MemoryNode> = view.mount_point().query_selector(".recipe__info-buttons").unwrap().child_nodes().into_iter().filter(|node| node.has_class("btn--update-servings")).collect();
	let minus_icon = buttons[0].query_selector("use").unwrap();
	assert_eq!(view.dispatch(&click(&minus_icon)), 1);
	assert_eq!(view.dispatch(&click(&buttons[1])), 1);
	assert_eq!(*servings.borrow(), [3, 5]);

	let bookmark = view.mount_point().query_selector(".btn--bookmark").unwrap();
	assert_eq!(view.dispatch(&click(&bookmark)), 1);
	assert_eq!(view.dispatch(&click(view.mount_point())), 0);
	assert_eq!(bookmarks.borrow().len(), 1);
}

#[test]
fn servings_never_drop_to_zero() {
	let document = document();
	let mut view = RecipeView::new(View::mount(RecipeTemplate::new("i.svg"), document.body()).unwrap());
	let (servings, handler) = recorder::<u32>();
	view.add_handler_update_servings(handler);
	let mut data = recipe();
	data.servings = 1;
	view.render(data).unwrap();

	let minus = view.mount_point().query_selector(".btn--update-servings").unwrap();
	assert_eq!(minus.attribute("data-update-to").as_deref(), Some("0"));
	assert_eq!(view.dispatch(&click(&minus)), 0);
	assert!(servings.borrow().is_empty());
}

#[test]
fn quantities() {
	assert_eq!(format_quantity(0.5), "1/2");
	assert_eq!(format_quantity(2.0), "2");
	assert_eq!(format_quantity(1.25), "1 1/4");
	assert_eq!(format_quantity(1.0 / 3.0), "1/3");
	assert_eq!(format_quantity(0.999), "1");
	assert_eq!(format_quantity(0.125), "1/8");
	assert_eq!(format_quantity(2.03), "2.03");
}

#[test]
fn search_submissions() {
	let document = document();
	let mut view = SearchView::mount(document.body()).unwrap();
	let (queries, handler) = recorder::<String>();
	view.add_handler_search(handler);
	let submit = |form: &MemoryNode, query: &str| UiEvent::Submit {
		form: form.clone(),
		fields: [("query".to_owned(), query.to_owned())].iter().cloned().collect(),
	};

	let form = view.form().clone();
	assert_eq!(view.dispatch(&submit(&form, "  pasta ")), 1);
	assert_eq!(view.dispatch(&submit(&form, "   ")), 0);
	assert_eq!(view.dispatch(&submit(&document.query_selector(".upload").unwrap(), "soup")), 0);
	assert_eq!(*queries.borrow(), ["pasta"]);

	view.clear_input().unwrap();
	assert_eq!(document.query_selector(".search__field").unwrap().attribute("value").as_deref(), Some(""));
}

#[test]
fn upload_window_gestures() {
	let document = document();
	let mut view = AddRecipeView::mount(AddRecipeTemplate::new("i.svg"), document.body()).unwrap();
	let (toggles, handler) = recorder::<bool>();
	view.add_handler_show_window(handler);
	let overlay = document.query_selector(".overlay").unwrap();
	assert!(!view.is_open());

	let open_label = document.query_selector(".nav__btn--add-recipe").unwrap().query_selector("span").unwrap();
	assert_eq!(view.dispatch(&click(&open_label)), 1);
	assert!(view.is_open());
	assert!(!overlay.has_class("hidden"));

	assert_eq!(view.dispatch(&click(&overlay)), 1);
	assert!(!view.is_open());
	assert!(overlay.has_class("hidden"));

	view.toggle_window().unwrap();
	let close = document.query_selector(".btn--close-modal").unwrap();
	assert_eq!(view.dispatch(&click(&close)), 1);
	assert_eq!(view.dispatch(&click(document.body())), 0);
	assert_eq!(*toggles.borrow(), [true, false, false]);
}

#[test]
fn upload_submissions() {
	let document = document();
	let mut view = AddRecipeView::mount(AddRecipeTemplate::new("i.svg"), document.body()).unwrap();
	let (uploads, handler) = recorder::<BTreeMap<String, String>>();
	view.add_handler_upload(handler);
	let fields: BTreeMap<String, String> = [("title".to_owned(), "Soup".to_owned())].iter().cloned().collect();

	let form = view.mount_point().clone();
	assert_eq!(view.dispatch(&UiEvent::Submit { form, fields: fields.clone() }), 1);
	let search = document.query_selector(".search").unwrap();
	assert_eq!(view.dispatch(&UiEvent::Submit { form: search, fields: fields.clone() }), 0);
	assert_eq!(*uploads.borrow(), [fields]);
}

#[test]
fn upload_form_markup() {
	let template = AddRecipeTemplate::new("i.svg");
	let document = document();
	let mut view = View::mount(template, document.body()).unwrap();
	let mut draft = UploadDraft::blank();

	view.render(draft.clone()).unwrap();
	assert_eq!(view.state(), ViewState::Rendered);
	let inputs = |view: &View<AddRecipeTemplate, MemoryNode>| {
		view.mount_point()
			.child_nodes()
			.iter()
			.flat_map(LiveNode::child_nodes)
			.filter(|node| node.attribute("name").is_some())
			.count()
	};
	assert_eq!(inputs(&view), 6 + 6);
	let title = view.mount_point().query_selector("input").unwrap();
	assert_eq!(title.attribute("name").as_deref(), Some("title"));

	draft.fields.insert("title".to_owned(), "Stew \"deluxe\"".to_owned());
	draft.fields.insert("ingredient-8".to_owned(), "1,,carrot".to_owned());
	let patches = view.update(draft).unwrap();
	assert!(title.is_same_node(&view.mount_point().query_selector("input").unwrap()));
	assert_eq!(title.attribute("value").as_deref(), Some("Stew \"deluxe\""));
	assert_eq!(inputs(&view), 6 + 8);
	assert!(patches.structural_count() > 0);
}

#[test]
fn upload_form_without_fields_shows_the_error_message() {
	let document = document();
	let mut view = View::mount(AddRecipeTemplate::new("i.svg"), document.body()).unwrap();
	view.render(UploadDraft::blank()).unwrap();

	view.render(UploadDraft::default()).unwrap();

	assert_eq!(view.state(), ViewState::Error);
	assert_eq!(view.data(), None);
	assert!(view.mount_point().query_selector("input").is_none());
	let error = view.mount_point().query_selector(".error").unwrap();
	assert_eq!(error.query_selector("p").unwrap().text_content(), "Could not upload the recipe. Please try again!");
}
