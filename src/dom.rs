//! The seam between views/reconciler and a live node tree.

use crate::markup;
use core::fmt::Debug;
use thiserror::Error;

/// What a live node is, as far as diffing is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
	Element(String),
	Text,
	Comment,
	/// Processing instructions, document types and the like. Never matched; always replaced.
	Other,
}

impl NodeKind {
	/// Whether a live node of this kind can be patched in place towards `node`.
	#[must_use]
	pub fn matches(&self, node: &markup::Node) -> bool {
		match (self, node) {
			(NodeKind::Element(name), markup::Node::Element(element)) => name.eq_ignore_ascii_case(&element.name),
			(NodeKind::Text, markup::Node::Text(_)) | (NodeKind::Comment, markup::Node::Comment(_)) => true,
			_ => false,
		}
	}
}

/// A live DOM operation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct DomError {
	pub operation: &'static str,
	pub message: String,
}

impl DomError {
	#[must_use]
	pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
		Self { operation, message: message.into() }
	}
}

/// A handle to a node in a live tree.
///
/// Handles are cheap to clone and compare by identity through [`LiveNode::is_same_node`], never by value.
/// Mutations go through `&self` since the tree is shared with its document.
pub trait LiveNode: Clone + Debug + Sized {
	fn kind(&self) -> NodeKind;

	fn child_nodes(&self) -> Vec<Self>;

	fn parent(&self) -> Option<Self>;

	/// Character data of text and comment nodes, [`None`] for anything else.
	fn data(&self) -> Option<String>;

	/// Overwrites the character data of a text or comment node.
	///
	/// # Errors
	///
	/// Iff this node has no character data.
	fn set_data(&self, data: &str) -> Result<(), DomError>;

	fn attribute(&self, name: &str) -> Option<String>;

	/// All attributes in their current order.
	fn attributes(&self) -> Vec<markup::Attribute>;

	/// # Errors
	///
	/// Iff this isn't an element or the backend rejects the name.
	fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError>;

	/// # Errors
	///
	/// Iff `child` can't be inserted here.
	fn append_child(&self, child: &Self) -> Result<(), DomError>;

	/// # Errors
	///
	/// Iff `old_child` isn't a child of this node.
	fn replace_child(&self, new_child: &Self, old_child: &Self) -> Result<(), DomError>;

	/// # Errors
	///
	/// Iff `child` isn't a child of this node.
	fn remove_child(&self, child: &Self) -> Result<(), DomError>;

	/// Creates a detached live copy of `node` (including descendants) owned by this node's document.
	///
	/// # Errors
	///
	/// Iff the backend fails to create one of the nodes.
	fn instantiate(&self, node: &markup::Node) -> Result<Self, DomError>;

	fn is_same_node(&self, other: &Self) -> bool;

	/// First descendant matching a simple selector (`tag`, `.class`, `#id` or `tag.class`).
	fn query_selector(&self, selector: &str) -> Option<Self>;

	/// Removes all children.
	///
	/// # Errors
	///
	/// Iff a removal fails. Children before the failing one stay removed.
	fn clear_children(&self) -> Result<(), DomError> {
		for child in self.child_nodes() {
			self.remove_child(&child)?;
		}
		Ok(())
	}

	/// Sets the current value of a form control.
	///
	/// # Errors
	///
	/// Iff the value can't be written.
	fn set_form_value(&self, value: &str) -> Result<(), DomError> {
		self.set_attribute("value", value)
	}

	fn has_class(&self, class: &str) -> bool {
		self.attribute("class").map_or(false, |classes| classes.split_whitespace().any(|c| c == class))
	}

	/// Adds or removes `class`, returning whether it is present afterwards.
	///
	/// # Errors
	///
	/// Iff the `class` attribute can't be written.
	fn toggle_class(&self, class: &str) -> Result<bool, DomError> {
		let classes = self.attribute("class").unwrap_or_default();
		let mut tokens: Vec<&str> = classes.split_whitespace().filter(|&c| c != class).collect();
		let was_absent = tokens.len() == classes.split_whitespace().count();
		if was_absent {
			tokens.push(class);
		}
		self.set_attribute("class", &tokens.join(" "))?;
		Ok(was_absent)
	}

	/// This node or its nearest ancestor carrying `class`, like DOM `closest(".class")`.
	fn closest_with_class(&self, class: &str) -> Option<Self> {
		let mut current = Some(self.clone());
		while let Some(node) = current {
			if matches!(node.kind(), NodeKind::Element(_)) && node.has_class(class) {
				return Some(node);
			}
			current = node.parent();
		}
		None
	}

	/// Whether `other` is this node or one of its descendants.
	fn contains(&self, other: &Self) -> bool {
		let mut current = Some(other.clone());
		while let Some(node) = current {
			if node.is_same_node(self) {
				return true;
			}
			current = node.parent();
		}
		false
	}

	fn text_content(&self) -> String {
		match self.kind() {
			NodeKind::Text => self.data().unwrap_or_default(),
			NodeKind::Comment | NodeKind::Other => String::new(),
			NodeKind::Element(_) => self.child_nodes().iter().map(LiveNode::text_content).collect(),
		}
	}
}

/// Parsed form of the simple selectors [`LiveNode::query_selector`] supports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleSelector<'a> {
	pub tag: Option<&'a str>,
	pub class: Option<&'a str>,
	pub id: Option<&'a str>,
}

impl<'a> SimpleSelector<'a> {
	#[must_use]
	pub fn parse(selector: &'a str) -> Self {
		let selector = selector.trim();
		if let Some(id) = selector.strip_prefix('#') {
			return Self { tag: None, class: None, id: Some(id) };
		}
		let (tag, class) = match selector.find('.') {
			Some(dot) => (&selector[..dot], Some(&selector[dot + 1..])),
			None => (selector, None),
		};
		Self {
			tag: Some(tag).filter(|tag| !tag.is_empty()),
			class,
			id: None,
		}
	}

	pub fn matches<N: LiveNode>(&self, node: &N) -> bool {
		let name = match node.kind() {
			NodeKind::Element(name) => name,
			_ => return false,
		};
		self.tag.map_or(true, |tag| tag.eq_ignore_ascii_case(&name))
			&& self.class.map_or(true, |class| node.has_class(class))
			&& self.id.map_or(true, |id| node.attribute("id").as_deref() == Some(id))
	}
}
