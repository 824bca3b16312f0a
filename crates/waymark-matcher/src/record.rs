//! Route definitions, names, params and normalized records.

use crate::config::PathParserOptions;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque metadata attached to a record.
pub type RouteMeta = serde_json::Map<String, serde_json::Value>;

/// Concrete params of a resolved location.
pub type RouteParams = BTreeMap<String, ParamValue>;

/// Params supplied with a location request.
///
/// `None` removes the key from the inherited params.
pub type RawParams = BTreeMap<String, Option<ParamValue>>;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_RECORD_ID: AtomicU64 = AtomicU64::new(1);

/// A process-unique route name.
///
/// Two symbols never compare equal, even with the same description.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteSymbol {
	id: u64,
	description: Option<String>,
}

impl RouteSymbol {
	/// Creates a new unique symbol.
	pub fn new(description: Option<&str>) -> Self {
		Self {
			id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
			description: description.map(str::to_string),
		}
	}

	/// The description given at creation.
	pub fn description(&self) -> Option<&str> {
		self.description.as_deref()
	}
}

impl fmt::Display for RouteSymbol {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "Symbol({})", self.description.as_deref().unwrap_or_default())
	}
}

/// Name of a route, used for by-name resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RouteName {
	/// A plain string name.
	Str(String),
	/// A unique symbol.
	Symbol(RouteSymbol),
}

impl RouteName {
	/// Returns the string when this is a string name.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(name) => Some(name),
			Self::Symbol(_) => None,
		}
	}
}

impl fmt::Display for RouteName {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Str(name) => f.write_str(name),
			Self::Symbol(symbol) => symbol.fmt(f),
		}
	}
}

impl From<&str> for RouteName {
	fn from(name: &str) -> Self {
		Self::Str(name.to_string())
	}
}

impl From<String> for RouteName {
	fn from(name: String) -> Self {
		Self::Str(name)
	}
}

impl From<RouteSymbol> for RouteName {
	fn from(symbol: RouteSymbol) -> Self {
		Self::Symbol(symbol)
	}
}

// Symbols only exist at runtime, so the serialized form is always a string.
impl Serialize for RouteName {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		serializer.collect_str(self)
	}
}

impl<'de> Deserialize<'de> for RouteName {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		String::deserialize(deserializer).map(Self::Str)
	}
}

/// Value of a single param.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
	/// A plain value.
	Single(String),
	/// Every repetition of a repeatable param.
	Repeated(Vec<String>),
}

impl ParamValue {
	/// Whether the value renders to nothing.
	pub fn is_empty(&self) -> bool {
		match self {
			Self::Single(value) => value.is_empty(),
			Self::Repeated(values) => values.is_empty(),
		}
	}
}

impl From<&str> for ParamValue {
	fn from(value: &str) -> Self {
		Self::Single(value.to_string())
	}
}

impl From<String> for ParamValue {
	fn from(value: String) -> Self {
		Self::Single(value)
	}
}

impl From<Vec<String>> for ParamValue {
	fn from(values: Vec<String>) -> Self {
		Self::Repeated(values)
	}
}

impl From<Vec<&str>> for ParamValue {
	fn from(values: Vec<&str>) -> Self {
		Self::Repeated(values.into_iter().map(str::to_string).collect())
	}
}

/// A user-authored route definition.
///
/// `path` of a child is relative to its parent unless it starts with `/`.
///
/// # Examples
///
/// ```
/// use waymark_matcher::record::RouteDefinition;
///
/// let users = RouteDefinition::new("/users")
///     .with_view("UsersLayout")
///     .with_child(RouteDefinition::new(":id").with_name("user"));
///
/// assert_eq!(users.children.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteDefinition {
	/// Path pattern.
	pub path: String,
	/// Optional name.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub name: Option<RouteName>,
	/// Extra patterns resolving to the same record.
	#[serde(
		deserialize_with = "one_or_many",
		skip_serializing_if = "Vec::is_empty"
	)]
	pub alias: Vec<String>,
	/// Nested definitions.
	#[serde(skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<RouteDefinition>,
	/// Per-record parsing overrides.
	#[serde(flatten)]
	pub options: PathParserOptions,
	/// Opaque metadata.
	#[serde(skip_serializing_if = "RouteMeta::is_empty")]
	pub meta: RouteMeta,
	/// Renderable payload identifier.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub view: Option<String>,
	/// Redirect target.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub redirect: Option<String>,
}

impl RouteDefinition {
	/// Creates a definition for `path`.
	pub fn new(path: impl Into<String>) -> Self {
		Self {
			path: path.into(),
			..Default::default()
		}
	}

	/// Sets the name.
	pub fn with_name(mut self, name: impl Into<RouteName>) -> Self {
		self.name = Some(name.into());
		self
	}

	/// Adds an alias pattern.
	pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
		self.alias.push(alias.into());
		self
	}

	/// Adds a child definition.
	pub fn with_child(mut self, child: RouteDefinition) -> Self {
		self.children.push(child);
		self
	}

	/// Adds several child definitions.
	pub fn with_children(mut self, children: impl IntoIterator<Item = RouteDefinition>) -> Self {
		self.children.extend(children);
		self
	}

	/// Sets a meta entry.
	pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
		self.meta.insert(key.into(), value.into());
		self
	}

	/// Sets the renderable payload.
	pub fn with_view(mut self, view: impl Into<String>) -> Self {
		self.view = Some(view.into());
		self
	}

	/// Sets the redirect target.
	pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
		self.redirect = Some(redirect.into());
		self
	}

	/// Overrides `strict`.
	pub fn strict(mut self, strict: bool) -> Self {
		self.options.strict = Some(strict);
		self
	}

	/// Overrides `sensitive`.
	pub fn sensitive(mut self, sensitive: bool) -> Self {
		self.options.sensitive = Some(sensitive);
		self
	}

	/// Overrides `end`.
	pub fn end(mut self, end: bool) -> Self {
		self.options.end = Some(end);
		self
	}
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
	D: Deserializer<'de>,
{
	struct OneOrMany;

	impl<'de> Visitor<'de> for OneOrMany {
		type Value = Vec<String>;

		fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
			f.write_str("a path or a list of paths")
		}

		fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
			Ok(vec![value.to_string()])
		}

		fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
			let mut paths = Vec::new();
			while let Some(path) = seq.next_element::<String>()? {
				paths.push(path);
			}
			Ok(paths)
		}
	}

	deserializer.deserialize_any(OneOrMany)
}

/// A normalized route record.
///
/// `path` is the full pattern, already joined with the parent's path.
/// Alias records point at the canonical record through `alias_of`.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRecord {
	id: u64,
	/// Full path pattern.
	pub path: String,
	/// Name, shared by aliases.
	pub name: Option<RouteName>,
	/// Metadata, shared by aliases.
	pub meta: RouteMeta,
	/// Canonical record when this is an alias.
	pub alias_of: Option<Arc<RouteRecord>>,
	/// Renderable payload identifier.
	pub view: Option<String>,
	/// Redirect target.
	pub redirect: Option<String>,
	/// Per-record parsing overrides.
	pub options: PathParserOptions,
}

impl RouteRecord {
	/// Normalizes a definition whose path is already composed.
	pub fn new(definition: &RouteDefinition, path: String) -> Self {
		Self {
			id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
			path,
			name: definition.name.clone(),
			meta: definition.meta.clone(),
			alias_of: None,
			view: definition.view.clone(),
			redirect: definition.redirect.clone(),
			options: definition.options,
		}
	}

	/// Derives an alias record with another path.
	pub fn alias(original: &Arc<RouteRecord>, path: String) -> Self {
		Self {
			id: NEXT_RECORD_ID.fetch_add(1, Ordering::Relaxed),
			path,
			name: original.name.clone(),
			meta: original.meta.clone(),
			alias_of: Some(Arc::clone(original)),
			view: original.view.clone(),
			redirect: original.redirect.clone(),
			options: original.options,
		}
	}

	/// Process-unique identifier of this record.
	pub fn id(&self) -> u64 {
		self.id
	}

	/// Whether this record is an alias of another one.
	pub fn is_alias(&self) -> bool {
		self.alias_of.is_some()
	}

	/// The canonical record: `alias_of` for aliases, `self` otherwise.
	pub fn canonical(&self) -> &RouteRecord {
		self.alias_of.as_deref().unwrap_or(self)
	}

	/// Whether the record can be the terminal match of a location.
	///
	/// Records without a name, a view or a redirect only group children.
	pub fn is_matchable(&self) -> bool {
		self.name.is_some() || self.view.is_some() || self.redirect.is_some()
	}
}
