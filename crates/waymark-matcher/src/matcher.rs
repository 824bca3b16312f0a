//! Record matchers: one normalized record bound to its compiled pattern.

use crate::config::ParserOptions;
use crate::error::PathParserError;
use crate::parser::{PathParser, compile_path};
use crate::record::{RouteName, RouteRecord};
use std::fmt;
use std::sync::Arc;

/// Handle of a matcher inside a [`MatcherTree`](crate::tree::MatcherTree).
///
/// Ids are never reused within one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(pub(crate) u64);

impl fmt::Display for MatcherId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{}", self.0)
	}
}

/// A route record with its compiled pattern and tree links.
///
/// Links are plain [`MatcherId`]s into the owning tree; a matcher never
/// owns its parent, children or aliases.
#[derive(Debug, Clone)]
pub struct RecordMatcher {
	pub(crate) id: MatcherId,
	pub(crate) record: Arc<RouteRecord>,
	pub(crate) parser: PathParser,
	pub(crate) parent: Option<MatcherId>,
	pub(crate) children: Vec<MatcherId>,
	pub(crate) alias: Vec<MatcherId>,
	pub(crate) alias_of: Option<MatcherId>,
}

impl RecordMatcher {
	/// Compiles `record.path` with the resolved options.
	pub(crate) fn compile(
		id: MatcherId,
		record: Arc<RouteRecord>,
		parent: Option<MatcherId>,
		options: ParserOptions,
	) -> Result<Self, PathParserError> {
		let parser = compile_path(&record.path, options)?;
		Ok(Self {
			id,
			record,
			parser,
			parent,
			children: Vec::new(),
			alias: Vec::new(),
			alias_of: None,
		})
	}

	/// Handle of this matcher.
	pub fn id(&self) -> MatcherId {
		self.id
	}

	/// The normalized record.
	pub fn record(&self) -> &Arc<RouteRecord> {
		&self.record
	}

	/// The compiled pattern.
	pub fn parser(&self) -> &PathParser {
		&self.parser
	}

	/// Name of the record.
	pub fn name(&self) -> Option<&RouteName> {
		self.record.name.as_ref()
	}

	/// Full path pattern of the record.
	pub fn path(&self) -> &str {
		&self.record.path
	}

	/// Parent matcher, if nested.
	pub fn parent(&self) -> Option<MatcherId> {
		self.parent
	}

	/// Child matchers, in registration order.
	pub fn children(&self) -> &[MatcherId] {
		&self.children
	}

	/// Alias matchers of this canonical matcher.
	pub fn aliases(&self) -> &[MatcherId] {
		&self.alias
	}

	/// Canonical matcher when this is an alias.
	pub fn alias_of(&self) -> Option<MatcherId> {
		self.alias_of
	}

	/// Whether this matcher is an alias.
	pub fn is_alias(&self) -> bool {
		self.record.is_alias()
	}

	/// Whether the record can be the terminal match of a location.
	pub fn is_matchable(&self) -> bool {
		self.record.is_matchable()
	}
}
