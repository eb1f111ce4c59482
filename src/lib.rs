//! Incremental view rendering for a recipe catalogue front-end.
//!
//! Views generate markup from data snapshots. The first [`render`](`view::View::render`) builds a
//! mount point's contents, later [`update`](`view::View::update`)s patch them in place through the
//! [`reconcile`] module, so focused inputs and other transient state survive new data.
//!
//! The live tree is abstracted as [`LiveNode`](`dom::LiveNode`), implemented for `web_sys::Node` on
//! `wasm32` targets and by [`memory::MemoryNode`] everywhere.

#![doc(html_root_url = "https://docs.rs/recipe-dom/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod config;
pub mod controller;
pub mod dom;
pub mod events;
pub mod load;
pub mod logging;
pub mod markup;
pub mod memory;
pub mod model;
pub mod reconcile;
pub mod view;
pub mod views;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::Config;
pub use reconcile::{Patch, Patches, Reconciler};
pub use view::{Template, View, ViewError, ViewState};
