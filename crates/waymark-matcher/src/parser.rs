//! Pattern compiler.
//!
//! Turns tokenized segments into a [`PathParser`]: a regexp that recognizes
//! concrete paths, a score used for ranking, the ordered param keys, and
//! the reverse operation that renders params back into a path.

use crate::config::ParserOptions;
use crate::error::{PathParserError, StringifyError};
use crate::record::{ParamValue, RouteParams};
use crate::score::{Score, weight};
use crate::tokenizer::{Segment, Token, tokenize_path};
use regex::{Regex, RegexBuilder};
use std::collections::{HashMap, HashSet};

/// Regexp of a param without a custom one: anything but `/`.
pub const BASE_PARAM_PATTERN: &str = "[^/]+?";

/// Maximum size for a compiled pattern regexp (in bytes).
const MAX_REGEX_SIZE: usize = 1 << 20; // 1 MiB

/// A param declared by a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ParamKey {
	/// Param name.
	pub name: String,
	/// Declared with `?` or `*`.
	pub optional: bool,
	/// Declared with `+` or `*`.
	pub repeatable: bool,
}

impl ParamKey {
	/// Two keys with the same name and the same modifiers.
	pub fn same_shape(&self, other: &ParamKey) -> bool {
		self.name == other.name
			&& self.optional == other.optional
			&& self.repeatable == other.repeatable
	}
}

#[derive(Debug, Clone)]
struct Validator {
	source: String,
	re: Regex,
}

/// A compiled path pattern.
#[derive(Debug, Clone)]
pub struct PathParser {
	re: Regex,
	score: Score,
	keys: Vec<ParamKey>,
	segments: Vec<Segment>,
	options: ParserOptions,
	// anchored custom regexps, checked on stringify
	validators: HashMap<String, Validator>,
	is_static: bool,
}

impl PathParser {
	/// The regexp recognizing concrete paths.
	pub fn re(&self) -> &Regex {
		&self.re
	}

	/// Per-segment score.
	pub fn score(&self) -> &Score {
		&self.score
	}

	/// Param keys in declaration order.
	pub fn keys(&self) -> &[ParamKey] {
		&self.keys
	}

	/// Tokenized segments of the pattern.
	pub fn segments(&self) -> &[Segment] {
		&self.segments
	}

	/// Options the pattern was compiled with.
	pub fn options(&self) -> ParserOptions {
		self.options
	}

	/// Whether the pattern was compiled through the static fast path.
	pub fn is_static(&self) -> bool {
		self.is_static
	}

	/// Whether `path` matches the pattern.
	pub fn is_match(&self, path: &str) -> bool {
		self.re.is_match(path)
	}

	/// Extracts params from a concrete path.
	///
	/// Returns `None` when the path does not match. Params that did not
	/// participate in the match (absent optional params) have no key.
	/// Repeatable params always yield [`ParamValue::Repeated`]. Values are
	/// percent-decoded.
	pub fn parse(&self, path: &str) -> Option<RouteParams> {
		let captures = self.re.captures(path)?;
		let mut params = RouteParams::new();

		for (index, key) in self.keys.iter().enumerate() {
			let Some(matched) = captures.name(&group_name(index)) else {
				continue;
			};
			let raw = matched.as_str();
			if raw.is_empty() {
				continue;
			}
			let value = if key.repeatable {
				ParamValue::Repeated(raw.split('/').map(decode).collect())
			} else {
				ParamValue::Single(decode(raw))
			};
			params.insert(key.name.clone(), value);
		}

		Some(params)
	}

	/// Renders params into a concrete path.
	///
	/// Unknown keys are ignored. An empty optional param drops its segment.
	/// Values are checked as given, then percent-encoded, so a `/` inside a
	/// value never splits it.
	///
	/// # Errors
	///
	/// - [`StringifyError::MissingRequiredParam`] when a required param is absent or empty
	/// - [`StringifyError::InvalidRepeatableParam`] when a list is given to a non-repeatable param
	/// - [`StringifyError::InvalidParamValue`] when a value fails the param's custom regexp
	pub fn stringify(&self, params: &RouteParams) -> Result<String, StringifyError> {
		let mut path = String::new();
		let mut avoid_duplicated_slash = false;

		for segment in &self.segments {
			if !avoid_duplicated_slash || !path.ends_with('/') {
				path.push('/');
			}
			avoid_duplicated_slash = false;

			for token in segment {
				match token {
					Token::Static(value) => path.push_str(value),
					Token::Param(param) => {
						let text = match params.get(&param.name) {
							Some(ParamValue::Repeated(values)) => {
								if !param.repeatable {
									return Err(StringifyError::InvalidRepeatableParam {
										name: param.name.clone(),
									});
								}
								let mut encoded = Vec::with_capacity(values.len());
								for value in values {
									self.validate(&param.name, value)?;
									encoded.push(urlencoding::encode(value).into_owned());
								}
								encoded.join("/")
							}
							Some(ParamValue::Single(value)) => {
								if !value.is_empty() {
									self.validate(&param.name, value)?;
								}
								urlencoding::encode(value).into_owned()
							}
							None => String::new(),
						};

						if text.is_empty() {
							if !param.optional {
								return Err(StringifyError::MissingRequiredParam {
									name: param.name.clone(),
								});
							}
							if segment.len() < 2 {
								if path.ends_with('/') {
									path.pop();
								} else {
									avoid_duplicated_slash = true;
								}
							}
						}
						path.push_str(&text);
					}
				}
			}
		}

		if path.is_empty() {
			path.push('/');
		}
		Ok(path)
	}

	fn validate(&self, name: &str, value: &str) -> Result<(), StringifyError> {
		match self.validators.get(name) {
			Some(validator) if !validator.re.is_match(value) => {
				Err(StringifyError::InvalidParamValue {
					name: name.to_string(),
					value: value.to_string(),
					regexp: validator.source.clone(),
				})
			}
			_ => Ok(()),
		}
	}
}

fn group_name(index: usize) -> String {
	format!("p{index}")
}

fn decode(raw: &str) -> String {
	urlencoding::decode(raw)
		.map(|decoded| decoded.into_owned())
		.unwrap_or_else(|_| raw.to_string())
}

fn build_regex(pattern: &str, source: &str, options: ParserOptions) -> Result<Regex, PathParserError> {
	RegexBuilder::new(pattern)
		.case_insensitive(!options.sensitive)
		.size_limit(MAX_REGEX_SIZE)
		.build()
		.map_err(|e| PathParserError::Compile {
			path: source.to_string(),
			reason: e.to_string(),
		})
}

fn segment_base_score(options: ParserOptions) -> i32 {
	weight::SEGMENT
		+ if options.sensitive {
			weight::BONUS_CASE_SENSITIVE
		} else {
			0
		}
}

fn apply_strict_bonus(score: &mut Score, options: ParserOptions) {
	if options.strict
		&& options.end
		&& let Some(last) = score.last_mut().and_then(|segment| segment.last_mut())
	{
		*last += weight::BONUS_STRICT;
	}
}

/// Whether every segment is plain text and the pattern is end-anchored.
///
/// Such patterns go through [`static_path_to_parser`].
pub fn is_static_pattern(segments: &[Segment], options: ParserOptions) -> bool {
	options.end
		&& segments
			.iter()
			.all(|segment| matches!(segment.as_slice(), [] | [Token::Static(_)]))
}

/// Compiles tokenized segments into a [`PathParser`].
///
/// `source` is the pattern text, used in error messages.
///
/// # Errors
///
/// Returns [`PathParserError::DuplicateParam`] when a param name is used
/// twice and [`PathParserError::InvalidCustomRegExp`] when a custom regexp
/// does not compile.
pub fn tokens_to_parser(
	source: &str,
	segments: Vec<Segment>,
	options: ParserOptions,
) -> Result<PathParser, PathParserError> {
	let mut score = Score::with_capacity(segments.len());
	let mut keys: Vec<ParamKey> = Vec::new();
	let mut seen = HashSet::new();
	let mut validators = HashMap::new();
	let mut pattern = String::from("^");

	for segment in &segments {
		let mut segment_scores = if segment.is_empty() {
			vec![weight::ROOT]
		} else {
			Vec::with_capacity(segment.len())
		};

		if options.strict && segment.is_empty() {
			pattern.push('/');
		}

		for (token_index, token) in segment.iter().enumerate() {
			let mut sub_segment_score = segment_base_score(options);

			match token {
				Token::Static(value) => {
					if token_index == 0 {
						pattern.push('/');
					}
					pattern.push_str(&regex::escape(value));
					sub_segment_score += weight::STATIC;
				}
				Token::Param(param) => {
					if !seen.insert(param.name.clone()) {
						return Err(PathParserError::DuplicateParam {
							name: param.name.clone(),
							path: source.to_string(),
						});
					}

					let re = param.regexp.as_deref().unwrap_or(BASE_PARAM_PATTERN);
					if re != BASE_PARAM_PATTERN {
						sub_segment_score += weight::BONUS_CUSTOM_REGEXP;
						let validator = RegexBuilder::new(&format!("^(?:{re})$"))
							.case_insensitive(!options.sensitive)
							.size_limit(MAX_REGEX_SIZE)
							.build()
							.map_err(|e| PathParserError::InvalidCustomRegExp {
								param: param.name.clone(),
								regexp: re.to_string(),
								reason: e.to_string(),
							})?;
						validators.insert(
							param.name.clone(),
							Validator {
								source: re.to_string(),
								re: validator,
							},
						);
					}

					let group = group_name(keys.len());
					let mut sub_pattern = if param.repeatable {
						format!("(?P<{group}>(?:{re})(?:/(?:{re}))*)")
					} else {
						format!("(?P<{group}>{re})")
					};
					if token_index == 0 {
						sub_pattern = if param.optional && segment.len() < 2 {
							format!("(?:/{sub_pattern})")
						} else {
							format!("/{sub_pattern}")
						};
					}
					if param.optional {
						sub_pattern.push('?');
					}
					pattern.push_str(&sub_pattern);

					sub_segment_score += weight::DYNAMIC;
					if param.optional {
						sub_segment_score += weight::BONUS_OPTIONAL;
					}
					if param.repeatable {
						sub_segment_score += weight::BONUS_REPEATABLE;
					}
					if re == ".*" {
						sub_segment_score += weight::BONUS_WILDCARD;
					}

					keys.push(ParamKey {
						name: param.name.clone(),
						optional: param.optional,
						repeatable: param.repeatable,
					});
				}
			}

			segment_scores.push(sub_segment_score);
		}

		score.push(segment_scores);
	}

	apply_strict_bonus(&mut score, options);

	if options.end {
		if !options.strict {
			pattern.push_str("/?");
		}
		pattern.push('$');
	} else if !pattern.ends_with('/') {
		pattern.push_str("(?:/|$)");
	}

	let re = build_regex(&pattern, source, options)?;

	Ok(PathParser {
		re,
		score,
		keys,
		segments,
		options,
		validators,
		is_static: false,
	})
}

/// Compiles a fully static pattern.
///
/// The caller guarantees [`is_static_pattern`] holds; the regexp is built
/// from the literal path without any param machinery.
pub fn static_path_to_parser(
	source: &str,
	segments: Vec<Segment>,
	options: ParserOptions,
) -> Result<PathParser, PathParserError> {
	let base = segment_base_score(options);
	let mut score: Score = segments
		.iter()
		.map(|segment| {
			if segment.is_empty() {
				vec![weight::ROOT]
			} else {
				vec![base + weight::STATIC]
			}
		})
		.collect();
	apply_strict_bonus(&mut score, options);

	let mut pattern = String::from("^");
	for segment in &segments {
		match segment.first() {
			Some(Token::Static(value)) => {
				pattern.push('/');
				pattern.push_str(&regex::escape(value));
			}
			_ if options.strict => pattern.push('/'),
			_ => {}
		}
	}
	if !options.strict {
		pattern.push_str("/?");
	}
	pattern.push('$');

	let re = build_regex(&pattern, source, options)?;

	Ok(PathParser {
		re,
		score,
		keys: Vec::new(),
		segments,
		options,
		validators: HashMap::new(),
		is_static: true,
	})
}

/// Tokenizes and compiles a pattern, taking the static fast path when possible.
///
/// # Examples
///
/// ```
/// use waymark_matcher::config::ParserOptions;
/// use waymark_matcher::parser::compile_path;
/// use waymark_matcher::record::ParamValue;
///
/// let parser = compile_path("/users/:id(\\d+)", ParserOptions::default()).unwrap();
/// let params = parser.parse("/users/42").unwrap();
///
/// assert_eq!(params.get("id"), Some(&ParamValue::from("42")));
/// assert_eq!(parser.stringify(&params).unwrap(), "/users/42");
/// ```
pub fn compile_path(path: &str, options: ParserOptions) -> Result<PathParser, PathParserError> {
	let segments = tokenize_path(path)?;
	if is_static_pattern(&segments, options) {
		static_path_to_parser(path, segments, options)
	} else {
		tokens_to_parser(path, segments, options)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::PathParserOptions;
	use rstest::rstest;

	fn compile(path: &str) -> PathParser {
		compile_path(path, ParserOptions::default()).unwrap()
	}

	fn compile_with(path: &str, overrides: PathParserOptions) -> PathParser {
		compile_path(path, ParserOptions::resolve(&PathParserOptions::new(), &overrides)).unwrap()
	}

	fn params(entries: &[(&str, ParamValue)]) -> RouteParams {
		entries
			.iter()
			.map(|(k, v)| (k.to_string(), v.clone()))
			.collect()
	}

	#[rstest]
	#[case("/")]
	#[case("/home")]
	#[case("/home/about/")]
	#[case("")]
	fn test_static_fast_path(#[case] path: &str) {
		assert!(compile(path).is_static());
	}

	#[rstest]
	fn test_static_with_end_false_is_not_fast_path() {
		assert!(!compile_with("/home", PathParserOptions::new().end(false)).is_static());
	}

	#[rstest]
	#[case("/", &["/"], &["/a"])]
	#[case("/home", &["/home", "/home/", "/HOME"], &["/home/a", "/homes"])]
	#[case("/v1.0", &["/v1.0"], &["/v1x0"])]
	fn test_static_matching(#[case] path: &str, #[case] ok: &[&str], #[case] ko: &[&str]) {
		let parser = compile(path);
		for candidate in ok {
			assert!(parser.is_match(candidate), "{path} should match {candidate}");
		}
		for candidate in ko {
			assert!(!parser.is_match(candidate), "{path} should not match {candidate}");
		}
	}

	#[rstest]
	fn test_strict_trailing_slash() {
		let strict = compile_with("/home", PathParserOptions::new().strict(true));
		assert!(strict.is_match("/home"));
		assert!(!strict.is_match("/home/"));

		let strict_slash = compile_with("/home/", PathParserOptions::new().strict(true));
		assert!(strict_slash.is_match("/home/"));
		assert!(!strict_slash.is_match("/home"));
	}

	#[rstest]
	fn test_sensitive() {
		let parser = compile_with("/Home/:id", PathParserOptions::new().sensitive(true));
		assert!(parser.is_match("/Home/1"));
		assert!(!parser.is_match("/home/1"));
	}

	#[rstest]
	fn test_end_false_requires_segment_boundary() {
		let parser = compile_with("/a", PathParserOptions::new().end(false));
		assert!(parser.is_match("/a"));
		assert!(parser.is_match("/a/"));
		assert!(parser.is_match("/a/b/c"));
		assert!(!parser.is_match("/ab"));
	}

	#[rstest]
	fn test_root_with_end_false_matches_everything() {
		let parser = compile_with("/", PathParserOptions::new().end(false));
		assert!(parser.is_match("/"));
		assert!(parser.is_match("/users/1"));
	}

	#[rstest]
	fn test_parse_single_param() {
		let parser = compile("/users/:id");
		assert_eq!(
			parser.parse("/users/42"),
			Some(params(&[("id", "42".into())]))
		);
		assert_eq!(parser.parse("/users"), None);
	}

	#[rstest]
	fn test_parse_optional_param_absent_has_no_key() {
		let parser = compile("/:a/:b?");
		assert_eq!(parser.parse("/x"), Some(params(&[("a", "x".into())])));
		assert_eq!(
			parser.parse("/x/y"),
			Some(params(&[("a", "x".into()), ("b", "y".into())]))
		);
	}

	#[rstest]
	fn test_parse_repeatable_always_yields_list() {
		let parser = compile("/files/:path+");
		assert_eq!(
			parser.parse("/files/a"),
			Some(params(&[("path", ParamValue::from(vec!["a"]))]))
		);
		assert_eq!(
			parser.parse("/files/a/b/c"),
			Some(params(&[("path", ParamValue::from(vec!["a", "b", "c"]))]))
		);
		assert_eq!(parser.parse("/files"), None);
	}

	#[rstest]
	fn test_parse_optional_repeatable() {
		let parser = compile("/files/:path*");
		assert_eq!(parser.parse("/files"), Some(RouteParams::new()));
		assert_eq!(
			parser.parse("/files/a/b"),
			Some(params(&[("path", ParamValue::from(vec!["a", "b"]))]))
		);
	}

	#[rstest]
	fn test_parse_custom_regexp() {
		let parser = compile("/users/:id(\\d+)");
		assert!(parser.parse("/users/42").is_some());
		assert!(parser.parse("/users/abc").is_none());
	}

	#[rstest]
	fn test_parse_custom_regexp_with_inner_groups() {
		let parser = compile("/:lang(en|(fr|de))/:page");
		assert_eq!(
			parser.parse("/fr/about"),
			Some(params(&[("lang", "fr".into()), ("page", "about".into())]))
		);
	}

	#[rstest]
	fn test_parse_mixed_segment() {
		let parser = compile("/:a-:b");
		assert_eq!(
			parser.parse("/left-right"),
			Some(params(&[("a", "left".into()), ("b", "right".into())]))
		);
	}

	#[rstest]
	fn test_parse_decodes_values() {
		let parser = compile("/search/:term");
		assert_eq!(
			parser.parse("/search/hello%20world"),
			Some(params(&[("term", "hello world".into())]))
		);
	}

	#[rstest]
	fn test_stringify_required() {
		let parser = compile("/users/:id");
		assert_eq!(
			parser.stringify(&params(&[("id", "7".into())])).unwrap(),
			"/users/7"
		);
		assert_eq!(
			parser.stringify(&RouteParams::new()),
			Err(StringifyError::MissingRequiredParam {
				name: "id".to_string()
			})
		);
	}

	#[rstest]
	fn test_stringify_optional_drops_segment() {
		let parser = compile("/:a/:b?");
		assert_eq!(parser.stringify(&params(&[("a", "x".into())])).unwrap(), "/x");

		let middle = compile("/:a?/b");
		assert_eq!(middle.stringify(&RouteParams::new()).unwrap(), "/b");
	}

	#[rstest]
	fn test_stringify_repeatable() {
		let parser = compile("/files/:path*");
		assert_eq!(
			parser
				.stringify(&params(&[("path", ParamValue::from(vec!["a", "b"]))]))
				.unwrap(),
			"/files/a/b"
		);
		assert_eq!(parser.stringify(&RouteParams::new()).unwrap(), "/files");
	}

	#[rstest]
	fn test_stringify_list_for_single_param() {
		let parser = compile("/users/:id");
		assert_eq!(
			parser.stringify(&params(&[("id", ParamValue::from(vec!["1", "2"]))])),
			Err(StringifyError::InvalidRepeatableParam {
				name: "id".to_string()
			})
		);
	}

	#[rstest]
	fn test_stringify_checks_custom_regexp() {
		let parser = compile("/users/:id(\\d+)");
		let err = parser
			.stringify(&params(&[("id", "abc".into())]))
			.unwrap_err();
		assert_eq!(
			err,
			StringifyError::InvalidParamValue {
				name: "id".to_string(),
				value: "abc".to_string(),
				regexp: "\\d+".to_string(),
			}
		);
	}

	#[rstest]
	#[case("a/b", "/search/a%2Fb")]
	#[case("a%41", "/search/a%2541")]
	#[case("hello world", "/search/hello%20world")]
	#[case("café", "/search/caf%C3%A9")]
	fn test_stringify_encodes_values(#[case] term: &str, #[case] expected: &str) {
		// Arrange
		let parser = compile("/search/:term");
		let input = params(&[("term", term.into())]);

		// Act
		let path = parser.stringify(&input).unwrap();

		// Assert
		assert_eq!(path, expected);
		assert_eq!(parser.parse(&path), Some(input));
	}

	#[rstest]
	fn test_stringify_encodes_each_repeated_value() {
		let parser = compile("/files/:path+");
		let input = params(&[("path", ParamValue::from(vec!["a b", "c/d"]))]);

		let path = parser.stringify(&input).unwrap();

		assert_eq!(path, "/files/a%20b/c%2Fd");
		assert_eq!(parser.parse(&path), Some(input));
	}

	#[rstest]
	fn test_custom_regexp_check_follows_sensitivity() {
		let insensitive = compile("/:lang(en|fr)/home");
		let sensitive = compile_with("/:lang(en|fr)/home", PathParserOptions::new().sensitive(true));
		let upper = params(&[("lang", "EN".into())]);

		assert_eq!(insensitive.parse("/EN/home"), Some(upper.clone()));
		assert_eq!(insensitive.stringify(&upper).unwrap(), "/EN/home");
		assert!(matches!(
			sensitive.stringify(&upper),
			Err(StringifyError::InvalidParamValue { .. })
		));
	}

	#[rstest]
	#[case("/")]
	#[case("/home/")]
	#[case("")]
	fn test_stringify_static(#[case] path: &str) {
		let expected = if path.is_empty() { "/" } else { path };
		assert_eq!(compile(path).stringify(&RouteParams::new()).unwrap(), expected);
	}

	#[rstest]
	#[case("/:id/:id")]
	#[case("/:id-:id")]
	fn test_duplicate_param_rejected(#[case] path: &str) {
		let err = compile_path(path, ParserOptions::default()).unwrap_err();
		assert!(matches!(err, PathParserError::DuplicateParam { ref name, .. } if name == "id"));
	}

	#[rstest]
	fn test_invalid_custom_regexp_rejected() {
		let err = compile_path("/:id([a-)", ParserOptions::default()).unwrap_err();
		assert!(matches!(err, PathParserError::InvalidCustomRegExp { .. }));
	}

	#[rstest]
	fn test_keys() {
		let parser = compile("/:a/:b?/:c+");
		assert_eq!(
			parser.keys(),
			&[
				ParamKey {
					name: "a".to_string(),
					optional: false,
					repeatable: false,
				},
				ParamKey {
					name: "b".to_string(),
					optional: true,
					repeatable: false,
				},
				ParamKey {
					name: "c".to_string(),
					optional: false,
					repeatable: true,
				},
			]
		);
	}
}
