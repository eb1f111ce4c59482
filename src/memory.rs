//! An in-process live tree, for native targets and headless rendering.
//!
//! It mirrors the parts of the DOM that views rely on, including node identity and a document-wide
//! focus pointer, so that the difference between replacing and patching a subtree is observable
//! without a browser.

use crate::{
	dom::{DomError, LiveNode, NodeKind, SimpleSelector},
	load,
	markup::{self, MarkupError, Namespace},
};
use core::fmt;
use std::{
	cell::RefCell,
	rc::{Rc, Weak},
};
use tracing::instrument;

#[derive(Debug)]
enum Kind {
	Element { name: String, namespace: Namespace },
	Text,
	Comment,
}

struct NodeData {
	kind: Kind,
	parent: RefCell<Weak<NodeData>>,
	children: RefCell<Vec<MemoryNode>>,
	attributes: RefCell<Vec<markup::Attribute>>,
	data: RefCell<String>,
}

/// A shared handle to a node of a [`MemoryDocument`] (or a detached memory node).
#[derive(Clone)]
pub struct MemoryNode(Rc<NodeData>);

impl fmt::Debug for MemoryNode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.0.kind {
			Kind::Element { name, .. } => write!(f, "MemoryNode(<{}> with {} child(ren))", name, self.0.children.borrow().len()),
			Kind::Text => write!(f, "MemoryNode(#text, {} byte(s))", self.0.data.borrow().len()),
			Kind::Comment => write!(f, "MemoryNode(#comment)"),
		}
	}
}

impl MemoryNode {
	fn new(kind: Kind, data: String) -> Self {
		Self(Rc::new(NodeData {
			kind,
			parent: RefCell::new(Weak::new()),
			children: RefCell::new(Vec::new()),
			attributes: RefCell::new(Vec::new()),
			data: RefCell::new(data),
		}))
	}

	#[must_use]
	pub fn element(name: &str) -> Self {
		Self::new(
			Kind::Element {
				name: name.to_owned(),
				namespace: Namespace::Html,
			},
			String::new(),
		)
	}

	#[must_use]
	pub fn text(data: &str) -> Self {
		Self::new(Kind::Text, data.to_owned())
	}

	/// Markup of this node's children.
	#[must_use]
	pub fn inner_html(&self) -> String {
		markup::serialize(&load::load_child_nodes(self))
	}

	fn index_in_parent(&self, parent: &MemoryNode) -> Option<usize> {
		parent.0.children.borrow().iter().position(|child| child.is_same_node(self))
	}

	fn detach(&self) {
		let parent = self.0.parent.replace(Weak::new()).upgrade().map(MemoryNode);
		if let Some(parent) = parent {
			if let Some(index) = self.index_in_parent(&parent) {
				parent.0.children.borrow_mut().remove(index);
			}
		}
	}

	fn check_insertion(&self, child: &MemoryNode) -> Result<(), DomError> {
		if !matches!(self.0.kind, Kind::Element { .. }) {
			return Err(DomError::new("insert", "only elements can have children"));
		}
		if child.contains(self) {
			return Err(DomError::new("insert", "a node can't be inserted into itself or its descendants"));
		}
		Ok(())
	}

	fn descendants(&self, found: &mut Vec<MemoryNode>) {
		for child in self.0.children.borrow().iter() {
			found.push(child.clone());
			child.descendants(found);
		}
	}
}

impl LiveNode for MemoryNode {
	fn kind(&self) -> NodeKind {
		match &self.0.kind {
			Kind::Element { name, .. } => NodeKind::Element(name.clone()),
			Kind::Text => NodeKind::Text,
			Kind::Comment => NodeKind::Comment,
		}
	}

	fn child_nodes(&self) -> Vec<Self> {
		self.0.children.borrow().clone()
	}

	fn parent(&self) -> Option<Self> {
		self.0.parent.borrow().upgrade().map(MemoryNode)
	}

	fn data(&self) -> Option<String> {
		match self.0.kind {
			Kind::Text | Kind::Comment => Some(self.0.data.borrow().clone()),
			Kind::Element { .. } => None,
		}
	}

	fn set_data(&self, data: &str) -> Result<(), DomError> {
		match self.0.kind {
			Kind::Text | Kind::Comment => {
				*self.0.data.borrow_mut() = data.to_owned();
				Ok(())
			}
			Kind::Element { .. } => Err(DomError::new("set_data", "elements have no character data")),
		}
	}

	fn attribute(&self, name: &str) -> Option<String> {
		self.0.attributes.borrow().iter().find(|attribute| attribute.name == name).map(|attribute| attribute.value.clone())
	}

	fn attributes(&self) -> Vec<markup::Attribute> {
		self.0.attributes.borrow().clone()
	}

	fn set_attribute(&self, name: &str, value: &str) -> Result<(), DomError> {
		if !matches!(self.0.kind, Kind::Element { .. }) {
			return Err(DomError::new("set_attribute", "only elements have attributes"));
		}
		if name.is_empty() || name.contains(|c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=')) {
			return Err(DomError::new("set_attribute", format!("invalid attribute name {:?}", name)));
		}
		let mut attributes = self.0.attributes.borrow_mut();
		match attributes.iter_mut().find(|attribute| attribute.name == name) {
			Some(attribute) => attribute.value = value.to_owned(),
			None => attributes.push(markup::Attribute {
				name: name.to_owned(),
				value: value.to_owned(),
			}),
		}
		Ok(())
	}

	fn append_child(&self, child: &Self) -> Result<(), DomError> {
		self.check_insertion(child)?;
		child.detach();
		*child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		self.0.children.borrow_mut().push(child.clone());
		Ok(())
	}

	fn replace_child(&self, new_child: &Self, old_child: &Self) -> Result<(), DomError> {
		if new_child.is_same_node(old_child) {
			return Ok(());
		}
		self.check_insertion(new_child)?;
		if old_child.index_in_parent(self).is_none() {
			return Err(DomError::new("replace_child", "the replaced node is not a child of this node"));
		}
		new_child.detach();
		let index = old_child.index_in_parent(self).ok_or_else(|| DomError::new("replace_child", "the replaced node moved"))?;
		*old_child.0.parent.borrow_mut() = Weak::new();
		*new_child.0.parent.borrow_mut() = Rc::downgrade(&self.0);
		self.0.children.borrow_mut()[index] = new_child.clone();
		Ok(())
	}

	fn remove_child(&self, child: &Self) -> Result<(), DomError> {
		match child.index_in_parent(self) {
			Some(index) => {
				self.0.children.borrow_mut().remove(index);
				*child.0.parent.borrow_mut() = Weak::new();
				Ok(())
			}
			None => Err(DomError::new("remove_child", "the removed node is not a child of this node")),
		}
	}

	fn instantiate(&self, node: &markup::Node) -> Result<Self, DomError> {
		Ok(match node {
			markup::Node::Text(text) => Self::new(Kind::Text, text.clone()),
			markup::Node::Comment(comment) => Self::new(Kind::Comment, comment.clone()),
			markup::Node::Element(element) => {
				let instance = Self::new(
					Kind::Element {
						name: element.name.clone(),
						namespace: element.namespace,
					},
					String::new(),
				);
				*instance.0.attributes.borrow_mut() = element.attributes.clone();
				for child in &element.children {
					let child = instance.instantiate(child)?;
					instance.append_child(&child)?;
				}
				instance
			}
		})
	}

	fn is_same_node(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}

	fn query_selector(&self, selector: &str) -> Option<Self> {
		let selector = SimpleSelector::parse(selector);
		let mut descendants = Vec::new();
		self.descendants(&mut descendants);
		descendants.into_iter().find(|node| selector.matches(node))
	}
}

/// Owner of a [`MemoryNode`] tree rooted at a `<body>` element, with a focus pointer.
#[derive(Debug)]
pub struct MemoryDocument {
	body: MemoryNode,
	focused: RefCell<Option<Weak<NodeData>>>,
}

impl Default for MemoryDocument {
	fn default() -> Self {
		Self::new()
	}
}

impl MemoryDocument {
	#[must_use]
	pub fn new() -> Self {
		Self {
			body: MemoryNode::element("body"),
			focused: RefCell::new(None),
		}
	}

	/// Creates a document whose body contains `markup`.
	///
	/// # Errors
	///
	/// Iff `markup` doesn't parse.
	#[instrument(skip(markup))]
	pub fn from_markup(markup: &str) -> Result<Self, MarkupError> {
		let document = Self::new();
		for node in markup::parse_fragment(markup)? {
			// Memory nodes can always be created and appended to a fresh element.
			if let Ok(instance) = document.body.instantiate(&node) {
				let _ = document.body.append_child(&instance);
			}
		}
		Ok(document)
	}

	#[must_use]
	pub fn body(&self) -> &MemoryNode {
		&self.body
	}

	#[must_use]
	pub fn query_selector(&self, selector: &str) -> Option<MemoryNode> {
		self.body.query_selector(selector)
	}

	pub fn focus(&self, node: &MemoryNode) {
		*self.focused.borrow_mut() = Some(Rc::downgrade(&node.0));
	}

	/// The focused node, as long as it's still part of this document.
	#[must_use]
	pub fn active_element(&self) -> Option<MemoryNode> {
		let focused = self.focused.borrow().as_ref().and_then(Weak::upgrade).map(MemoryNode)?;
		if self.body.contains(&focused) {
			Some(focused)
		} else {
			None
		}
	}
}
