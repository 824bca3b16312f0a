//! Location requests and resolved locations.

use crate::matcher::MatcherId;
use crate::record::{ParamValue, RawParams, RouteMeta, RouteName, RouteParams, RouteRecord};
use std::sync::Arc;

/// A raw location handed to [`RouterMatcher::resolve`](crate::RouterMatcher::resolve).
///
/// Query strings and hashes are not interpreted; callers strip them first.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationRequest {
	/// A concrete path, already normalized.
	Path(String),
	/// A named route plus params.
	Named {
		/// Target name.
		name: RouteName,
		/// Params merged over the inherited ones.
		params: RawParams,
	},
	/// Params merged over the current location.
	Relative {
		/// Params merged over the current ones.
		params: RawParams,
	},
}

impl LocationRequest {
	/// By-path request.
	pub fn path(path: impl Into<String>) -> Self {
		Self::Path(path.into())
	}

	/// By-name request without params.
	pub fn named(name: impl Into<RouteName>) -> Self {
		Self::Named {
			name: name.into(),
			params: RawParams::new(),
		}
	}

	/// Relative request without params.
	pub fn relative() -> Self {
		Self::Relative {
			params: RawParams::new(),
		}
	}

	/// Sets a param. Ignored on by-path requests.
	pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
		if let Some(params) = self.params_mut() {
			params.insert(key.into(), Some(value.into()));
		}
		self
	}

	/// Explicitly clears a param so it is not inherited. Ignored on by-path
	/// requests.
	pub fn without_param(mut self, key: impl Into<String>) -> Self {
		if let Some(params) = self.params_mut() {
			params.insert(key.into(), None);
		}
		self
	}

	fn params_mut(&mut self) -> Option<&mut RawParams> {
		match self {
			Self::Path(_) => None,
			Self::Named { params, .. } | Self::Relative { params } => Some(params),
		}
	}
}

impl From<&str> for LocationRequest {
	fn from(path: &str) -> Self {
		Self::Path(path.to_string())
	}
}

impl From<String> for LocationRequest {
	fn from(path: String) -> Self {
		Self::Path(path)
	}
}

/// A fully resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct MatcherLocation {
	/// Name of the terminal record, if any.
	pub name: Option<RouteName>,
	/// Concrete path.
	pub path: String,
	/// Concrete params.
	pub params: RouteParams,
	/// Matched records, ancestors first. Empty when nothing matched.
	pub matched: Vec<Arc<RouteRecord>>,
	/// Shallow merge of every matched record's meta, deeper records winning.
	pub meta: RouteMeta,
}

impl MatcherLocation {
	/// The initial location: `/`, no name, nothing matched.
	pub fn start() -> Self {
		Self {
			name: None,
			path: "/".to_string(),
			params: RouteParams::new(),
			matched: Vec::new(),
			meta: RouteMeta::new(),
		}
	}

	/// The terminal matched record.
	pub fn record(&self) -> Option<&Arc<RouteRecord>> {
		self.matched.last()
	}

	/// Whether a record matched.
	pub fn is_matched(&self) -> bool {
		!self.matched.is_empty()
	}
}

impl Default for MatcherLocation {
	fn default() -> Self {
		Self::start()
	}
}

/// Reference to a registered route for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteRef {
	/// The canonical route registered under a name.
	Name(RouteName),
	/// A specific matcher.
	Matcher(MatcherId),
}

impl From<RouteName> for RouteRef {
	fn from(name: RouteName) -> Self {
		Self::Name(name)
	}
}

impl From<&str> for RouteRef {
	fn from(name: &str) -> Self {
		Self::Name(name.into())
	}
}

impl From<MatcherId> for RouteRef {
	fn from(id: MatcherId) -> Self {
		Self::Matcher(id)
	}
}
