//! Detached fragment trees and the markup parser that produces them.
//!
//! Generated markup is parsed into [`Node`]s before it touches a live tree, so both
//! [`View::render`](`crate::view::View::render`) and the [`Reconciler`](`crate::reconcile::Reconciler`)
//! work on the same structure regardless of the [`LiveNode`](`crate::dom::LiveNode`) backend.
//!
//! The parser understands the subset of HTML that the view templates emit: elements, quoted and
//! unquoted attributes, void elements, self-closing foreign elements, comments, character references
//! and `<script>`/`<style>` raw text. It does not implement HTML's error recovery:
//! markup that would need it is rejected with a [`MarkupError`].

use std::{borrow::Cow, fmt::Write as _};
use thiserror::Error;
use tracing::{instrument, trace};

/// A node of a detached fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
	Element(Element),
	Text(String),
	Comment(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
	Html,
	Svg,
	MathMl,
}
impl Namespace {
	#[must_use]
	pub fn uri(self) -> &'static str {
		match self {
			Namespace::Html => "http://www.w3.org/1999/xhtml",
			Namespace::Svg => "http://www.w3.org/2000/svg",
			Namespace::MathMl => "http://www.w3.org/1998/Math/MathML",
		}
	}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
	/// Lowercase for HTML elements, as written for SVG and MathML ones.
	pub name: String,
	pub namespace: Namespace,
	/// In source order, without duplicates.
	pub attributes: Vec<Attribute>,
	pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
	pub name: String,
	pub value: String,
}

impl Element {
	#[must_use]
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			namespace: Namespace::Html,
			attributes: Vec::new(),
			children: Vec::new(),
		}
	}

	#[must_use]
	pub fn attribute(&self, name: &str) -> Option<&str> {
		self.attributes.iter().find(|attribute| attribute.name == name).map(|attribute| attribute.value.as_str())
	}
}

impl Node {
	/// The concatenated text of this node and all of its descendants, like DOM `textContent`.
	#[must_use]
	pub fn text_content(&self) -> String {
		let mut text = String::new();
		self.collect_text(&mut text);
		text
	}

	fn collect_text(&self, text: &mut String) {
		match self {
			Node::Element(element) => element.children.iter().for_each(|child| child.collect_text(text)),
			Node::Text(data) => text.push_str(data),
			Node::Comment(_) => (),
		}
	}

	#[must_use]
	pub fn as_element(&self) -> Option<&Element> {
		match self {
			Node::Element(element) => Some(element),
			_ => None,
		}
	}
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MarkupError {
	#[error("unexpected end of markup inside {0}")]
	UnexpectedEnd(&'static str),
	#[error("invalid tag name at byte {offset}")]
	InvalidTagName { offset: usize },
	#[error("closing tag </{found}> at byte {offset} does not match open element <{expected}>")]
	MismatchedClose { expected: String, found: String, offset: usize },
	#[error("closing tag </{name}> at byte {offset} has no open element")]
	StrayClose { name: String, offset: usize },
	#[error("element <{name}> is never closed")]
	Unclosed { name: String },
}

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Parses `markup` into a detached list of top-level nodes.
///
/// Whitespace-only text between elements is kept, as a browser would keep it.
///
/// # Errors
///
/// Iff `markup` is not well-formed in the sense described in the [module documentation](self).
#[allow(clippy::items_after_statements)]
#[instrument(skip(markup), fields(len = markup.len()))]
pub fn parse_fragment(markup: &str) -> Result<Vec<Node>, MarkupError> {
	let mut parser = Parser { source: markup, offset: 0 };
	let mut open: Vec<Element> = Vec::new();
	let mut roots = Vec::new();

	fn push(open: &mut [Element], roots: &mut Vec<Node>, node: Node) {
		match open.last_mut() {
			Some(parent) => parent.children.push(node),
			None => roots.push(node),
		}
	}

	while !parser.rest().is_empty() {
		let rest = parser.rest();
		if rest.starts_with("<!--") {
			let comment = parser.comment()?;
			push(&mut open, &mut roots, Node::Comment(comment));
		} else if rest.starts_with("</") {
			let offset = parser.offset;
			let name = parser.end_tag()?;
			let element = match open.pop() {
				Some(element) => element,
				None => return Err(MarkupError::StrayClose { name, offset }),
			};
			if !element.name.eq_ignore_ascii_case(&name) {
				return Err(MarkupError::MismatchedClose {
					expected: element.name,
					found: name,
					offset,
				});
			}
			push(&mut open, &mut roots, Node::Element(element));
		} else if rest.starts_with("<!") {
			// Doctype and other declarations don't produce nodes in a fragment.
			parser.skip_declaration()?;
		} else if is_tag_start(rest) {
			let parent_namespace = open.last().map_or(Namespace::Html, |parent| parent.namespace);
			let (mut element, self_closing) = parser.start_tag(parent_namespace)?;
			let is_void = element.namespace == Namespace::Html && VOID_ELEMENTS.contains(&element.name.as_str());
			if is_void || self_closing {
				push(&mut open, &mut roots, Node::Element(element));
			} else if element.namespace == Namespace::Html && RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
				let text = parser.raw_text(&element.name)?;
				if !text.is_empty() {
					element.children.push(Node::Text(text));
				}
				push(&mut open, &mut roots, Node::Element(element));
			} else {
				open.push(element);
			}
		} else {
			let text = parser.text();
			push(&mut open, &mut roots, Node::Text(text));
		}
	}

	if let Some(element) = open.pop() {
		return Err(MarkupError::Unclosed { name: element.name });
	}
	trace!(nodes = roots.len(), "Parsed fragment.");
	Ok(roots)
}

fn is_tag_start(rest: &str) -> bool {
	let mut chars = rest.chars();
	chars.next() == Some('<') && chars.next().map_or(false, |c| c.is_ascii_alphabetic())
}

struct Parser<'a> {
	source: &'a str,
	offset: usize,
}
impl<'a> Parser<'a> {
	fn rest(&self) -> &'a str {
		&self.source[self.offset..]
	}

	fn skip_whitespace(&mut self) {
		let rest = self.rest();
		self.offset += rest.len() - rest.trim_start().len();
	}

	fn comment(&mut self) -> Result<String, MarkupError> {
		let body = &self.rest()["<!--".len()..];
		let end = body.find("-->").ok_or(MarkupError::UnexpectedEnd("comment"))?;
		self.offset += "<!--".len() + end + "-->".len();
		Ok(body[..end].to_owned())
	}

	fn skip_declaration(&mut self) -> Result<(), MarkupError> {
		let end = self.rest().find('>').ok_or(MarkupError::UnexpectedEnd("declaration"))?;
		self.offset += end + 1;
		Ok(())
	}

	fn name(&mut self) -> Result<&'a str, MarkupError> {
		let rest = self.rest();
		let len = rest.find(|c: char| c.is_whitespace() || c == '>' || c == '/' || c == '=').unwrap_or(rest.len());
		if len == 0 {
			return Err(MarkupError::InvalidTagName { offset: self.offset });
		}
		self.offset += len;
		Ok(&rest[..len])
	}

	fn end_tag(&mut self) -> Result<String, MarkupError> {
		self.offset += "</".len();
		let name = self.name()?.to_owned();
		self.skip_whitespace();
		if !self.rest().starts_with('>') {
			return Err(MarkupError::UnexpectedEnd("closing tag"));
		}
		self.offset += 1;
		Ok(name)
	}

	fn start_tag(&mut self, parent_namespace: Namespace) -> Result<(Element, bool), MarkupError> {
		self.offset += "<".len();
		let raw_name = self.name()?;
		let namespace = match parent_namespace {
			Namespace::Html if raw_name.eq_ignore_ascii_case("svg") => Namespace::Svg,
			Namespace::Html if raw_name.eq_ignore_ascii_case("math") => Namespace::MathMl,
			other => other,
		};
		let name = match namespace {
			Namespace::Html => raw_name.to_ascii_lowercase(),
			Namespace::Svg | Namespace::MathMl => raw_name.to_owned(),
		};
		let mut element = Element {
			name,
			namespace,
			attributes: Vec::new(),
			children: Vec::new(),
		};

		loop {
			self.skip_whitespace();
			let rest = self.rest();
			if rest.is_empty() {
				return Err(MarkupError::UnexpectedEnd("start tag"));
			} else if rest.starts_with("/>") {
				self.offset += 2;
				return Ok((element, true));
			} else if rest.starts_with('>') {
				self.offset += 1;
				return Ok((element, false));
			} else if rest.starts_with('/') {
				self.offset += 1;
				continue;
			}

			let name = match namespace {
				Namespace::Html => self.name()?.to_ascii_lowercase(),
				Namespace::Svg | Namespace::MathMl => self.name()?.to_owned(),
			};
			self.skip_whitespace();
			let value = if self.rest().starts_with('=') {
				self.offset += 1;
				self.skip_whitespace();
				self.attribute_value()?
			} else {
				String::new()
			};
			// As in HTML, the first occurrence of an attribute wins.
			if element.attribute(&name).is_none() {
				element.attributes.push(Attribute { name, value });
			}
		}
	}

	fn attribute_value(&mut self) -> Result<String, MarkupError> {
		let rest = self.rest();
		match rest.chars().next() {
			Some(quote @ ('"' | '\'')) => {
				let end = rest[1..].find(quote).ok_or(MarkupError::UnexpectedEnd("attribute value"))?;
				self.offset += end + 2;
				Ok(decode_entities(&rest[1..=end]).into_owned())
			}
			Some(_) => {
				let len = rest.find(|c: char| c.is_whitespace() || c == '>').unwrap_or(rest.len());
				self.offset += len;
				Ok(decode_entities(&rest[..len]).into_owned())
			}
			None => Err(MarkupError::UnexpectedEnd("attribute value")),
		}
	}

	fn raw_text(&mut self, name: &str) -> Result<String, MarkupError> {
		let rest = self.rest();
		let close = format!("</{}", name);
		let end = rest
			.char_indices()
			.find(|&(i, _)| rest[i..].len() >= close.len() && rest.is_char_boundary(i + close.len()) && rest[i..i + close.len()].eq_ignore_ascii_case(&close))
			.map(|(i, _)| i)
			.ok_or(MarkupError::UnexpectedEnd("raw text element"))?;
		let text = match name {
			"script" | "style" => rest[..end].to_owned(),
			_ => decode_entities(&rest[..end]).into_owned(),
		};
		self.offset += end;
		self.end_tag()?;
		Ok(text)
	}

	fn text(&mut self) -> String {
		let rest = self.rest();
		let mut end = 0;
		// A `<` that doesn't open markup is literal text.
		while let Some(found) = rest[end..].find('<') {
			let candidate = &rest[end + found..];
			if is_tag_start(candidate) || candidate.starts_with("</") || candidate.starts_with("<!") {
				end += found;
				self.offset += end;
				return decode_entities(&rest[..end]).into_owned();
			}
			end += found + 1;
		}
		self.offset += rest.len();
		decode_entities(rest).into_owned()
	}
}

/// Replaces the character references the templates (and [`escape_text`]/[`escape_attribute`]) produce.
///
/// Unknown references are kept verbatim.
#[must_use]
pub fn decode_entities(raw: &str) -> Cow<'_, str> {
	if !raw.contains('&') {
		return Cow::Borrowed(raw);
	}

	let mut decoded = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(amp) = rest.find('&') {
		decoded.push_str(&rest[..amp]);
		rest = &rest[amp..];
		let replacement = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
			let entity = &rest[1..end];
			let c = match entity {
				"amp" => Some('&'),
				"lt" => Some('<'),
				"gt" => Some('>'),
				"quot" => Some('"'),
				"apos" => Some('\''),
				"nbsp" => Some('\u{a0}'),
				_ if entity.starts_with("#x") || entity.starts_with("#X") => u32::from_str_radix(&entity[2..], 16).ok().and_then(char::from_u32),
				_ if entity.starts_with('#') => entity[1..].parse().ok().and_then(char::from_u32),
				_ => None,
			};
			c.map(|c| (c, end + 1))
		});
		match replacement {
			Some((c, len)) => {
				decoded.push(c);
				rest = &rest[len..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}
	decoded.push_str(rest);
	Cow::Owned(decoded)
}

#[must_use]
pub fn escape_text(text: &str) -> Cow<'_, str> {
	escape(text, false)
}

#[must_use]
pub fn escape_attribute(value: &str) -> Cow<'_, str> {
	escape(value, true)
}

fn escape(raw: &str, quotes: bool) -> Cow<'_, str> {
	let needs_escape = |c: char| matches!(c, '&' | '<' | '>') || (quotes && matches!(c, '"' | '\''));
	if !raw.contains(needs_escape) {
		return Cow::Borrowed(raw);
	}
	let mut escaped = String::with_capacity(raw.len() + 8);
	for c in raw.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' if quotes => escaped.push_str("&quot;"),
			'\'' if quotes => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	Cow::Owned(escaped)
}

/// Serializes `nodes` back into markup that [`parse_fragment`] reads as an equal fragment.
#[must_use]
pub fn serialize(nodes: &[Node]) -> String {
	let mut markup = String::new();
	for node in nodes {
		write_node(&mut markup, node);
	}
	markup
}

fn write_node(markup: &mut String, node: &Node) {
	match node {
		Node::Text(text) => markup.push_str(&escape_text(text)),
		Node::Comment(comment) => {
			let _ = write!(markup, "<!--{}-->", comment);
		}
		Node::Element(element) => {
			markup.push('<');
			markup.push_str(&element.name);
			for Attribute { name, value } in &element.attributes {
				let _ = write!(markup, " {}=\"{}\"", name, escape_attribute(value));
			}
			if element.namespace == Namespace::Html && VOID_ELEMENTS.contains(&element.name.as_str()) {
				markup.push('>');
				return;
			}
			if element.namespace != Namespace::Html && element.children.is_empty() {
				markup.push_str(" />");
				return;
			}
			markup.push('>');
			if element.namespace == Namespace::Html && RAW_TEXT_ELEMENTS.contains(&element.name.as_str()) {
				markup.push_str(&element.children.iter().map(Node::text_content).collect::<String>());
			} else {
				for child in &element.children {
					write_node(markup, child);
				}
			}
			let _ = write!(markup, "</{}>", element.name);
		}
	}
}
