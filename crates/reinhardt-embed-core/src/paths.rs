//! Embed path splitting
//!
//! Turns the flat list of requested embed paths (`embed=parent.root`) into a
//! one-level relation tree: top-level field name to the list of suffixes that
//! must be forwarded to the nested serializer of that field.
//!
//! Only the first `.` is split. Deeper levels are split lazily by the nested
//! serializer when it receives its forwarded suffixes.

use indexmap::IndexMap;

/// Mapping from a top-level field name to the suffixes forwarded to it.
///
/// Field names keep the order of their first appearance in the request.
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::paths::split_embed_relations;
///
/// let relations = split_embed_relations(&["children.parent", "children.external_api_field"]);
/// assert_eq!(
///     relations.get("children"),
///     Some(&["parent".to_string(), "external_api_field".to_string()][..])
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbedRelations {
	relations: IndexMap<String, Vec<String>>,
}

impl EmbedRelations {
	/// Create an empty relation map
	pub fn new() -> Self {
		Self::default()
	}

	/// Suffixes forwarded to `field`, if the field was requested
	pub fn get(&self, field: &str) -> Option<&[String]> {
		self.relations.get(field).map(Vec::as_slice)
	}

	/// Whether `field` was requested at all
	pub fn contains(&self, field: &str) -> bool {
		self.relations.contains_key(field)
	}

	/// Requested field names in order of first appearance
	pub fn field_names(&self) -> impl Iterator<Item = &str> {
		self.relations.keys().map(String::as_str)
	}

	/// Iterate over `(field, suffixes)` pairs
	pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
		self.relations
			.iter()
			.map(|(name, suffixes)| (name.as_str(), suffixes.as_slice()))
	}

	pub fn len(&self) -> usize {
		self.relations.len()
	}

	pub fn is_empty(&self) -> bool {
		self.relations.is_empty()
	}

	fn insert(&mut self, head: &str, rest: Option<&str>) {
		let suffixes = self.relations.entry(head.to_string()).or_default();
		if let Some(rest) = rest {
			suffixes.push(rest.to_string());
		}
	}
}

/// Split requested embed paths on their first `.`
///
/// Paths sharing a head merge their suffixes, so `["x", "x.y"]` yields
/// `{"x": ["y"]}`. Empty paths and paths with an empty head name no field
/// and are skipped.
///
/// # Examples
///
/// ```
/// use reinhardt_embed_core::paths::split_embed_relations;
///
/// let relations = split_embed_relations(&["a.b.c"]);
/// assert_eq!(relations.get("a"), Some(&["b.c".to_string()][..]));
///
/// let relations = split_embed_relations(&["parent"]);
/// assert_eq!(relations.get("parent"), Some(&[][..]));
/// ```
pub fn split_embed_relations<S: AsRef<str>>(paths: &[S]) -> EmbedRelations {
	let mut relations = EmbedRelations::new();
	for path in paths {
		let path = path.as_ref();
		let (head, rest) = match path.split_once('.') {
			Some((head, rest)) => (head, Some(rest)),
			None => (path, None),
		};
		if head.is_empty() {
			tracing::debug!(path, "Ignoring embed path without a field name");
			continue;
		}
		relations.insert(head, rest);
	}
	tracing::trace!(requested = paths.len(), fields = relations.len(), "Split embed relations");
	relations
}
