//! Reads live trees back into detached [`markup::Node`]s.

use crate::{
	dom::{LiveNode, NodeKind},
	markup::{self, Namespace},
};

pub fn load_child_nodes<N: LiveNode>(parent: &N) -> Vec<markup::Node> {
	parent.child_nodes().iter().filter_map(load_node).collect()
}

/// [`None`] for [`NodeKind::Other`], which has no fragment representation.
pub fn load_node<N: LiveNode>(node: &N) -> Option<markup::Node> {
	Some(match node.kind() {
		NodeKind::Element(name) => markup::Node::Element(load_element(node, name)),
		NodeKind::Text => markup::Node::Text(node.data().unwrap_or_default()),
		NodeKind::Comment => markup::Node::Comment(node.data().unwrap_or_default()),
		NodeKind::Other => return None,
	})
}

fn load_element<N: LiveNode>(element: &N, name: String) -> markup::Element {
	let namespace = namespace_of(element, &name);
	markup::Element {
		name: if namespace == Namespace::Html { name.to_ascii_lowercase() } else { name },
		namespace,
		attributes: element.attributes(),
		children: load_child_nodes(element),
	}
}

fn namespace_of<N: LiveNode>(element: &N, name: &str) -> Namespace {
	if name.eq_ignore_ascii_case("svg") {
		return Namespace::Svg;
	}
	if name.eq_ignore_ascii_case("math") {
		return Namespace::MathMl;
	}
	let mut ancestor = element.parent();
	while let Some(node) = ancestor {
		match node.kind() {
			NodeKind::Element(name) if name.eq_ignore_ascii_case("svg") => return Namespace::Svg,
			NodeKind::Element(name) if name.eq_ignore_ascii_case("math") => return Namespace::MathMl,
			_ => ancestor = node.parent(),
		}
	}
	Namespace::Html
}
