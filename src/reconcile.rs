use crate::{
	dom::LiveNode,
	markup::{self, MarkupError},
};
use core::slice;
use tracing::{debug, error, info, instrument, trace, trace_span};

/// One change [`Reconciler`] applied to a live tree.
///
/// `path` holds child indices from the mount point down to the affected node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
	/// Character data of a text or comment node was overwritten.
	ReplaceText { path: Vec<usize>, value: String },
	SetAttribute { path: Vec<usize>, name: String, value: String },
	/// Structural fallback: the node's kind or tag differed and it was recreated.
	ReplaceNode { path: Vec<usize> },
	Append { path: Vec<usize> },
	Remove { path: Vec<usize> },
}

impl Patch {
	#[must_use]
	pub fn path(&self) -> &[usize] {
		match self {
			Patch::ReplaceText { path, .. } | Patch::SetAttribute { path, .. } | Patch::ReplaceNode { path } | Patch::Append { path } | Patch::Remove { path } => path,
		}
	}

	/// Whether this patch kept the node it touched.
	#[must_use]
	pub fn is_in_place(&self) -> bool {
		matches!(self, Patch::ReplaceText { .. } | Patch::SetAttribute { .. })
	}
}

/// The patches of one [`Reconciler::reconcile`] call, in the order they were applied.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
#[must_use]
pub struct Patches(Vec<Patch>);

impl Patches {
	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	pub fn iter(&self) -> slice::Iter<'_, Patch> {
		self.0.iter()
	}

	#[must_use]
	pub fn as_slice(&self) -> &[Patch] {
		&self.0
	}

	/// Number of patches that replaced, added or removed nodes.
	#[must_use]
	pub fn structural_count(&self) -> usize {
		self.0.iter().filter(|patch| !patch.is_in_place()).count()
	}

	fn push(&mut self, patch: Patch) {
		if cfg!(feature = "dangerous-logging") {
			trace!(?patch, "Applied patch.");
		} else {
			trace!(path = ?patch.path(), in_place = patch.is_in_place(), "Applied patch.");
		}
		self.0.push(patch);
	}
}

impl<'a> IntoIterator for &'a Patches {
	type Item = &'a Patch;
	type IntoIter = slice::Iter<'a, Patch>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.iter()
	}
}

impl IntoIterator for Patches {
	type Item = Patch;
	type IntoIter = std::vec::IntoIter<Patch>;

	fn into_iter(self) -> Self::IntoIter {
		self.0.into_iter()
	}
}

/// Patches a mounted subtree in place towards freshly generated markup.
///
/// Children are paired by position. Matching nodes keep their identity and only have their character data
/// and attributes overwritten, recursively through the whole subtree. Attributes that exist only on the live
/// node are left alone, so state written to the DOM outside of markup generation (`open`, `checked`, etc.)
/// survives an update. Nodes whose kind or tag differs are recreated, surplus live nodes are removed and
/// missing ones are appended.
///
/// Individual DOM failures are logged and skipped rather than aborting the rest of the diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reconciler {
	depth_limit: usize,
}

impl Default for Reconciler {
	fn default() -> Self {
		Self::new(64)
	}
}

impl Reconciler {
	/// `depth_limit` is the number of element levels below the mount point that are diffed.
	/// Elements at the limit are replaced wholesale instead.
	#[must_use]
	pub fn new(depth_limit: usize) -> Self {
		Self { depth_limit }
	}

	#[must_use]
	pub fn depth_limit(&self) -> usize {
		self.depth_limit
	}

	/// # Errors
	///
	/// Iff `markup` doesn't parse, in which case the live tree is left untouched.
	#[instrument(skip(self, markup))]
	pub fn reconcile<N: LiveNode>(&self, mount_point: &N, markup: &str) -> Result<Patches, MarkupError> {
		let fragment = markup::parse_fragment(markup)?;
		Ok(self.reconcile_fragment(mount_point, &fragment))
	}

	#[instrument(skip(self, fragment), fields(nodes = fragment.len()))]
	pub fn reconcile_fragment<N: LiveNode>(&self, mount_point: &N, fragment: &[markup::Node]) -> Patches {
		let mut patches = Patches::default();
		self.diff_child_nodes(mount_point, fragment, &mut Vec::new(), &mut patches, self.depth_limit);
		info!("Applied {} patch(es), {} of them structural.", patches.len(), patches.structural_count());
		patches
	}

	fn diff_child_nodes<N: LiveNode>(&self, parent: &N, fresh: &[markup::Node], path: &mut Vec<usize>, patches: &mut Patches, depth_limit: usize) {
		let live = parent.child_nodes();
		if live.len() != fresh.len() {
			debug!(?path, live = live.len(), fresh = fresh.len(), "Child counts differ; Appending or truncating.");
		}

		for (i, node) in fresh.iter().enumerate() {
			path.push(i);
			match live.get(i) {
				Some(live_node) => self.diff_node(parent, live_node, node, path, patches, depth_limit),
				None => {
					let span = trace_span!("Appending node", ?path);
					let _enter = span.enter();
					match parent.instantiate(node).and_then(|instance| parent.append_child(&instance)) {
						Ok(()) => patches.push(Patch::Append { path: path.clone() }),
						Err(error) => error!("Failed to append node: {}", error),
					}
				}
			}
			path.pop();
		}

		for (i, surplus) in live.iter().enumerate().skip(fresh.len()) {
			path.push(i);
			let span = trace_span!("Removing node", ?path);
			let _enter = span.enter();
			match parent.remove_child(surplus) {
				Ok(()) => patches.push(Patch::Remove { path: path.clone() }),
				Err(error) => error!("Failed to remove node: {}", error),
			}
			path.pop();
		}
	}

	fn diff_node<N: LiveNode>(&self, parent: &N, live: &N, fresh: &markup::Node, path: &mut Vec<usize>, patches: &mut Patches, depth_limit: usize) {
		let live_kind = live.kind();
		if !live_kind.matches(fresh) {
			debug!(?path, ?live_kind, "Node shapes differ; Recreating the node.");
			return Self::replace_node(parent, live, fresh, path, patches);
		}

		match fresh {
			markup::Node::Text(data) | markup::Node::Comment(data) => {
				let span = trace_span!("Diffing character data", ?path);
				let _enter = span.enter();
				if live.data().as_deref() != Some(data.as_str()) {
					match live.set_data(data) {
						Ok(()) => patches.push(Patch::ReplaceText {
							path: path.clone(),
							value: data.clone(),
						}),
						Err(error) => error!("Failed to replace character data ({}): {}", loggable(data), error),
					}
				}
			}

			markup::Node::Element(element) => {
				let span = trace_span!("Diffing element", tag = element.name.as_str(), ?path);
				let _enter = span.enter();
				if depth_limit == 0 {
					error!("Depth limit reached; Recreating <{}> instead of diffing it.", element.name);
					return Self::replace_node(parent, live, fresh, path, patches);
				}

				for markup::Attribute { name, value } in &element.attributes {
					if live.attribute(name).as_deref() == Some(value.as_str()) {
						continue;
					}
					match live.set_attribute(name, value) {
						Ok(()) => patches.push(Patch::SetAttribute {
							path: path.clone(),
							name: name.clone(),
							value: value.clone(),
						}),
						Err(error) => error!("Could not set attribute {:?}={}: {}", name, loggable(value), error),
					}
				}

				self.diff_child_nodes(live, &element.children, path, patches, depth_limit - 1);
			}
		}
	}

	fn replace_node<N: LiveNode>(parent: &N, live: &N, fresh: &markup::Node, path: &[usize], patches: &mut Patches) {
		match parent.instantiate(fresh).and_then(|instance| parent.replace_child(&instance, live)) {
			Ok(()) => patches.push(Patch::ReplaceNode { path: path.to_vec() }),
			Err(error) => error!("Failed to replace {:?}: {}", live, error),
		}
	}
}

#[cfg(feature = "dangerous-logging")]
fn loggable(value: &str) -> String {
	format!("{:?}", value)
}

#[cfg(not(feature = "dangerous-logging"))]
fn loggable(value: &str) -> String {
	format!("<{} byte(s)>", value.len())
}
