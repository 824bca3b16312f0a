//! Path parsing options and declarative route tables.
//!
//! Options are layered: [`MatcherConfig`] holds the global defaults, each
//! [`RouteDefinition`] may override them, and [`ParserOptions::resolve`]
//! merges both into the fully resolved set stored on a compiled pattern.
//!
//! Route tables can be written in TOML or JSON:
//!
//! ```toml
//! [options]
//! strict = true
//!
//! [[routes]]
//! path = "/"
//! name = "home"
//!
//! [[routes]]
//! path = "/users/:id"
//! name = "user"
//! alias = "/u/:id"
//! ```

use crate::error::{ConfigResult, MatcherResult};
use crate::record::RouteDefinition;
use crate::resolver::RouterMatcher;
use serde::{Deserialize, Serialize};

/// Partial path parsing options, as written on a definition or in a config file.
///
/// Unset fields fall back to the next layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathParserOptions {
	/// Require an exact match on the trailing slash.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub strict: Option<bool>,
	/// Match static text case-sensitively.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sensitive: Option<bool>,
	/// Anchor the pattern at the end of the path.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub end: Option<bool>,
}

impl PathParserOptions {
	/// Creates an empty set of overrides.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets `strict`.
	pub fn strict(mut self, strict: bool) -> Self {
		self.strict = Some(strict);
		self
	}

	/// Sets `sensitive`.
	pub fn sensitive(mut self, sensitive: bool) -> Self {
		self.sensitive = Some(sensitive);
		self
	}

	/// Sets `end`.
	pub fn end(mut self, end: bool) -> Self {
		self.end = Some(end);
		self
	}
}

/// Fully resolved path parsing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParserOptions {
	/// Require an exact match on the trailing slash.
	pub strict: bool,
	/// Match static text case-sensitively.
	pub sensitive: bool,
	/// Anchor the pattern at the end of the path.
	pub end: bool,
}

impl Default for ParserOptions {
	fn default() -> Self {
		Self {
			strict: false,
			sensitive: false,
			end: true,
		}
	}
}

impl ParserOptions {
	/// Merges global defaults and per-record overrides.
	///
	/// Record values win over global values, which win over the built-in
	/// defaults (`strict = false`, `sensitive = false`, `end = true`).
	///
	/// # Examples
	///
	/// ```
	/// use waymark_matcher::config::{ParserOptions, PathParserOptions};
	///
	/// let global = PathParserOptions::new().strict(true);
	/// let record = PathParserOptions::new().sensitive(true);
	/// let options = ParserOptions::resolve(&global, &record);
	///
	/// assert!(options.strict);
	/// assert!(options.sensitive);
	/// assert!(options.end);
	/// ```
	pub fn resolve(global: &PathParserOptions, record: &PathParserOptions) -> Self {
		let defaults = Self::default();
		Self {
			strict: record.strict.or(global.strict).unwrap_or(defaults.strict),
			sensitive: record
				.sensitive
				.or(global.sensitive)
				.unwrap_or(defaults.sensitive),
			end: record.end.or(global.end).unwrap_or(defaults.end),
		}
	}
}

/// Global configuration of a [`RouterMatcher`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatcherConfig {
	/// Default path parsing options for every record.
	pub options: PathParserOptions,
}

impl MatcherConfig {
	/// Creates a configuration with built-in defaults.
	pub fn new() -> Self {
		Self::default()
	}

	/// Replaces the default path parsing options.
	pub fn with_options(mut self, options: PathParserOptions) -> Self {
		self.options = options;
		self
	}
}

/// A declarative set of routes plus their global options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteTable {
	/// Default path parsing options.
	pub options: PathParserOptions,
	/// Top-level route definitions, in registration order.
	pub routes: Vec<RouteDefinition>,
}

impl RouteTable {
	/// Parses a table from TOML.
	pub fn from_toml_str(source: &str) -> ConfigResult<Self> {
		Ok(toml::from_str(source)?)
	}

	/// Parses a table from JSON.
	pub fn from_json_str(source: &str) -> ConfigResult<Self> {
		Ok(serde_json::from_str(source)?)
	}

	/// Returns the global configuration part of the table.
	pub fn config(&self) -> MatcherConfig {
		MatcherConfig {
			options: self.options,
		}
	}

	/// Registers every route of the table into a new matcher.
	pub fn into_matcher(self) -> MatcherResult<RouterMatcher> {
		RouterMatcher::with_routes(self.routes, MatcherConfig {
			options: self.options,
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_defaults() {
		let options = ParserOptions::resolve(&PathParserOptions::new(), &PathParserOptions::new());
		assert_eq!(options, ParserOptions::default());
		assert!(!options.strict);
		assert!(!options.sensitive);
		assert!(options.end);
	}

	#[rstest]
	#[case(None, None, false)]
	#[case(Some(true), None, true)]
	#[case(Some(true), Some(false), false)]
	#[case(None, Some(true), true)]
	fn test_record_overrides_global(
		#[case] global: Option<bool>,
		#[case] record: Option<bool>,
		#[case] expected: bool,
	) {
		let global = PathParserOptions {
			strict: global,
			..Default::default()
		};
		let record = PathParserOptions {
			strict: record,
			..Default::default()
		};
		assert_eq!(ParserOptions::resolve(&global, &record).strict, expected);
	}

	#[rstest]
	fn test_table_from_toml() {
		// Arrange
		let source = r#"
			[options]
			sensitive = true

			[[routes]]
			path = "/"
			name = "home"

			[[routes]]
			path = "/users/:id"
			name = "user"
			alias = "/u/:id"
			strict = true

			[routes.meta]
			requires_auth = true
		"#;

		// Act
		let table = RouteTable::from_toml_str(source).unwrap();

		// Assert
		assert_eq!(table.options.sensitive, Some(true));
		assert_eq!(table.routes.len(), 2);
		assert_eq!(table.routes[1].alias, vec!["/u/:id".to_string()]);
		assert_eq!(table.routes[1].options.strict, Some(true));
		assert_eq!(
			table.routes[1].meta.get("requires_auth"),
			Some(&serde_json::Value::Bool(true))
		);
	}

	#[rstest]
	fn test_table_from_json_with_alias_list() {
		let source = r#"{
			"routes": [
				{ "path": "/a", "alias": ["/b", "/c"], "view": "A" }
			]
		}"#;

		let table = RouteTable::from_json_str(source).unwrap();

		assert_eq!(table.options, PathParserOptions::default());
		assert_eq!(table.routes[0].alias, vec!["/b".to_string(), "/c".to_string()]);
		assert_eq!(table.routes[0].view.as_deref(), Some("A"));
	}

	#[rstest]
	fn test_invalid_toml_is_reported() {
		let result = RouteTable::from_toml_str("[[routes]\npath = ");
		assert!(matches!(result, Err(crate::error::ConfigError::Toml(_))));
	}
}
