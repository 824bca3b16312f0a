//! Error types for the route matching engine.
//!
//! Errors are split by the phase that raises them:
//!
//! - [`PathParserError`]: tokenizing or compiling a path pattern (registration time)
//! - [`StringifyError`]: rendering params back into a path (resolve time)
//! - [`MatcherError`]: everything surfaced by [`RouterMatcher`](crate::RouterMatcher)
//! - [`ConfigError`]: loading declarative route tables

use thiserror::Error;

/// Errors raised while tokenizing or compiling a path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathParserError {
	/// Non-empty patterns must be absolute.
	#[error("Route paths should start with a \"/\": \"{path}\" should be \"/{path}\"")]
	MissingLeadingSlash {
		/// The offending pattern.
		path: String,
	},

	/// A custom regexp was opened with `(` and never closed.
	#[error("Unfinished custom RegExp for param \"{param}\" in \"{path}\"")]
	UnterminatedRegExp {
		/// Param owning the regexp.
		param: String,
		/// The offending pattern.
		path: String,
	},

	/// A `:` was not followed by a param name.
	#[error("Missing param name after ':' at position {position} in \"{path}\"")]
	MissingParamName {
		/// Character index of the `:`.
		position: usize,
		/// The offending pattern.
		path: String,
	},

	/// A `?`, `+` or `*` modifier that does not follow a param.
	#[error("Modifier '{modifier}' at position {position} is not attached to a param in \"{path}\"")]
	DanglingModifier {
		/// The modifier character.
		modifier: char,
		/// Character index of the modifier.
		position: usize,
		/// The offending pattern.
		path: String,
	},

	/// An empty segment (`//`) anywhere but at the end of the pattern.
	#[error("Empty segment at position {position} in \"{path}\"")]
	EmptySegment {
		/// Character index of the second `/`.
		position: usize,
		/// The offending pattern.
		path: String,
	},

	/// A repeatable param sharing its segment with other tokens.
	#[error("A repeatable param ({param}) must be alone in its segment. eg: '/:ids+'")]
	RepeatableNotAlone {
		/// The repeatable param.
		param: String,
	},

	/// A custom regexp that does not compile.
	#[error("Invalid custom RegExp for param \"{param}\" ({regexp}): {reason}")]
	InvalidCustomRegExp {
		/// Param owning the regexp.
		param: String,
		/// The regexp source.
		regexp: String,
		/// Compiler message.
		reason: String,
	},

	/// The same param name used twice in one pattern.
	#[error("Duplicate param name \"{name}\" in \"{path}\"")]
	DuplicateParam {
		/// The repeated name.
		name: String,
		/// The offending pattern.
		path: String,
	},

	/// The assembled regexp failed to compile.
	#[error("Failed to compile pattern \"{path}\": {reason}")]
	Compile {
		/// The offending pattern.
		path: String,
		/// Compiler message.
		reason: String,
	},
}

/// Errors raised while rendering params into a concrete path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StringifyError {
	/// A required param has no value.
	#[error("Missing required param \"{name}\"")]
	MissingRequiredParam {
		/// The param name.
		name: String,
	},

	/// A list was supplied for a param declared without `*` or `+`.
	#[error("Provided param \"{name}\" is an array but it is not repeatable (* or + modifiers)")]
	InvalidRepeatableParam {
		/// The param name.
		name: String,
	},

	/// A value that does not satisfy the param's custom regexp.
	#[error("Param \"{name}\" with value \"{value}\" does not match its RegExp ({regexp})")]
	InvalidParamValue {
		/// The param name.
		name: String,
		/// The rejected value.
		value: String,
		/// The declared regexp.
		regexp: String,
	},
}

/// Errors surfaced by route registration and resolution.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatcherError {
	/// A name (or the current location) does not resolve to a registered matcher.
	#[error("No match for {location}")]
	MatcherNotFound {
		/// Description of what was looked up.
		location: String,
	},

	/// Pattern tokenizing or compilation failed.
	#[error(transparent)]
	PathParser(#[from] PathParserError),

	/// Param stringification failed.
	#[error(transparent)]
	Stringify(#[from] StringifyError),

	/// An alias declares a different set of required params than its record.
	#[error(
		"Alias \"{alias}\" and the original record: \"{original}\" must have the exact same param named \"{param}\""
	)]
	AliasParamMismatch {
		/// The alias path.
		alias: String,
		/// The canonical path.
		original: String,
		/// The param without a counterpart.
		param: String,
	},

	/// An absolute child path drops a param declared by its parent.
	#[error(
		"Absolute path \"{path}\" must have the exact same param named \"{param}\" as its parent \"{parent}\""
	)]
	MissingAncestorParam {
		/// The child path.
		path: String,
		/// The parent path.
		parent: String,
		/// The missing param.
		param: String,
	},

	/// A nested route reuses the name of one of its ancestors.
	#[error("A route named \"{name}\" has been added as a child of a route with the same name")]
	SameNameAsAncestor {
		/// The reused name.
		name: String,
	},

	/// The pre-param `*` catch-all syntax.
	#[error(
		"Catch all routes (\"{path}\") must now be defined using a param with a custom regexp, e.g. \"/:pathMatch(.*)*\""
	)]
	LegacyCatchAll {
		/// The offending path.
		path: String,
	},
}

/// Errors raised while loading a declarative route table.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// TOML deserialization failed.
	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	/// JSON deserialization failed.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),

	/// A route in the table was rejected at registration.
	#[error("Route registration failed: {0}")]
	Registration(#[from] MatcherError),
}

/// Result type alias for matcher operations.
pub type MatcherResult<T> = Result<T, MatcherError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	#[rstest]
	fn test_missing_leading_slash_message() {
		let err = PathParserError::MissingLeadingSlash {
			path: "users".to_string(),
		};
		assert_eq!(
			err.to_string(),
			"Route paths should start with a \"/\": \"users\" should be \"/users\""
		);
	}

	#[rstest]
	fn test_stringify_error_wraps_transparently() {
		let err: MatcherError = StringifyError::MissingRequiredParam {
			name: "id".to_string(),
		}
		.into();
		assert_eq!(err.to_string(), "Missing required param \"id\"");
		assert!(matches!(err, MatcherError::Stringify(_)));
	}

	#[rstest]
	fn test_config_error_from_json() {
		let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
		let err: ConfigError = json_error.into();
		assert!(matches!(err, ConfigError::Json(_)));
	}
}
