//! Path pattern tokenizer.
//!
//! Turns a pattern such as `/users/:id(\d+)?` into segments of [`Token`]s.
//! Segments are split on `/`; within a segment, static text and params can
//! be mixed (`/:a-:b`).
//!
//! # Pattern Syntax
//!
//! - `:name` - A param matching one segment (`[a-zA-Z0-9_]+` for the name)
//! - `:name(re)` - A param with a custom regexp
//! - `?` / `+` / `*` after a param - optional / repeatable / optional and repeatable
//! - `\x` - Escapes `x` in static text

use crate::error::PathParserError;

/// A single token of a path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
	/// Literal text.
	Static(String),
	/// A param placeholder.
	Param(ParamToken),
}

impl Token {
	/// The token produced for the root pattern `/`.
	pub fn root() -> Self {
		Self::Static(String::new())
	}

	/// Returns the param when this is a param token.
	pub fn as_param(&self) -> Option<&ParamToken> {
		match self {
			Self::Param(param) => Some(param),
			Self::Static(_) => None,
		}
	}
}

/// A param placeholder inside a segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamToken {
	/// Param name.
	pub name: String,
	/// Custom regexp source, if one was declared.
	pub regexp: Option<String>,
	/// `?` or `*` modifier.
	pub optional: bool,
	/// `+` or `*` modifier.
	pub repeatable: bool,
}

/// Tokens between two `/`.
pub type Segment = Vec<Token>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
	Static,
	Param,
	ParamRegExp,
	ParamRegExpEnd,
	EscapeNext,
}

fn is_param_char(c: char) -> bool {
	c.is_ascii_alphanumeric() || c == '_'
}

fn as_modifier(c: char) -> Option<char> {
	matches!(c, '?' | '+' | '*').then_some(c)
}

/// Splits a path pattern into tokenized segments.
///
/// `""` yields a single empty segment and `"/"` a single root token. A
/// trailing `/` yields a trailing empty segment, which only matters for
/// strict patterns.
///
/// # Errors
///
/// Returns [`PathParserError`] for relative patterns, unterminated custom
/// regexps, modifiers that do not follow a param, params without a name,
/// empty segments in the middle of the pattern and repeatable params that
/// share their segment.
///
/// # Examples
///
/// ```
/// use waymark_matcher::tokenizer::{Token, tokenize_path};
///
/// let segments = tokenize_path("/users/:id").unwrap();
/// assert_eq!(segments.len(), 2);
/// assert_eq!(segments[0], vec![Token::Static("users".to_string())]);
/// ```
pub fn tokenize_path(path: &str) -> Result<Vec<Segment>, PathParserError> {
	if path.is_empty() {
		return Ok(vec![Vec::new()]);
	}
	if path == "/" {
		return Ok(vec![vec![Token::root()]]);
	}
	if !path.starts_with('/') {
		return Err(PathParserError::MissingLeadingSlash {
			path: path.to_string(),
		});
	}

	Tokenizer::new(path).run()
}

struct Tokenizer<'a> {
	path: &'a str,
	state: State,
	previous_state: State,
	segments: Vec<Segment>,
	// `None` until the leading `/` has been seen.
	segment: Option<Segment>,
	buffer: String,
	custom_re: String,
	re_depth: usize,
	// last regexp char was an unescaped `\`
	re_escaped: bool,
	param_start: usize,
}

impl<'a> Tokenizer<'a> {
	fn new(path: &'a str) -> Self {
		Self {
			path,
			state: State::Static,
			previous_state: State::Static,
			segments: Vec::new(),
			segment: None,
			buffer: String::new(),
			custom_re: String::new(),
			re_depth: 0,
			re_escaped: false,
			param_start: 0,
		}
	}

	fn run(mut self) -> Result<Vec<Segment>, PathParserError> {
		let chars: Vec<char> = self.path.chars().collect();
		let mut i = 0;

		while i < chars.len() {
			let c = chars[i];
			let position = i;
			i += 1;

			if c == '\\' && self.state != State::ParamRegExp {
				self.previous_state = self.state;
				self.state = State::EscapeNext;
				continue;
			}

			match self.state {
				State::Static => match c {
					'/' => {
						self.consume_buffer(None)?;
						self.finalize_segment(position, false)?;
					}
					':' => {
						self.consume_buffer(None)?;
						self.state = State::Param;
						self.param_start = position;
					}
					'?' | '+' | '*' => {
						return Err(PathParserError::DanglingModifier {
							modifier: c,
							position,
							path: self.path.to_string(),
						});
					}
					_ => self.buffer.push(c),
				},
				State::EscapeNext => {
					self.buffer.push(c);
					self.state = self.previous_state;
				}
				State::Param => {
					if c == '(' {
						self.require_param_name()?;
						self.state = State::ParamRegExp;
						self.re_depth = 0;
						self.re_escaped = false;
					} else if is_param_char(c) {
						self.buffer.push(c);
					} else {
						self.require_param_name()?;
						let modifier = as_modifier(c);
						self.consume_buffer(modifier)?;
						self.state = State::Static;
						if modifier.is_none() {
							// reprocess `c` as static text
							i -= 1;
						}
					}
				}
				State::ParamRegExp => {
					let escaped = self.re_escaped;
					self.re_escaped = c == '\\' && !escaped;
					match c {
						')' if self.re_depth == 0 && !escaped => self.state = State::ParamRegExpEnd,
						'(' if !escaped => {
							self.re_depth += 1;
							self.custom_re.push(c);
						}
						')' if !escaped => {
							self.re_depth -= 1;
							self.custom_re.push(c);
						}
						_ => self.custom_re.push(c),
					}
				}
				State::ParamRegExpEnd => {
					let modifier = as_modifier(c);
					self.consume_buffer(modifier)?;
					self.state = State::Static;
					if modifier.is_none() {
						i -= 1;
					}
					self.custom_re.clear();
				}
			}
		}

		match self.state {
			State::ParamRegExp => {
				return Err(PathParserError::UnterminatedRegExp {
					param: self.buffer.clone(),
					path: self.path.to_string(),
				});
			}
			State::Param => self.require_param_name()?,
			State::EscapeNext => self.state = self.previous_state,
			State::Static | State::ParamRegExpEnd => {}
		}

		self.consume_buffer(None)?;
		self.finalize_segment(chars.len(), true)?;

		Ok(self.segments)
	}

	fn require_param_name(&self) -> Result<(), PathParserError> {
		if self.buffer.is_empty() {
			return Err(PathParserError::MissingParamName {
				position: self.param_start,
				path: self.path.to_string(),
			});
		}
		Ok(())
	}

	fn consume_buffer(&mut self, modifier: Option<char>) -> Result<(), PathParserError> {
		if self.buffer.is_empty() {
			return Ok(());
		}
		let value = std::mem::take(&mut self.buffer);
		let segment = self.segment.get_or_insert_with(Vec::new);

		if let Some(Token::Param(last)) = segment.last()
			&& last.repeatable
		{
			return Err(PathParserError::RepeatableNotAlone {
				param: last.name.clone(),
			});
		}

		match self.state {
			State::Static | State::EscapeNext => segment.push(Token::Static(value)),
			State::Param | State::ParamRegExp | State::ParamRegExpEnd => {
				let repeatable = matches!(modifier, Some('*' | '+'));
				if repeatable && !segment.is_empty() {
					return Err(PathParserError::RepeatableNotAlone { param: value });
				}
				segment.push(Token::Param(ParamToken {
					name: value,
					regexp: (!self.custom_re.is_empty()).then(|| self.custom_re.clone()),
					optional: matches!(modifier, Some('*' | '?')),
					repeatable,
				}));
			}
		}
		Ok(())
	}

	fn finalize_segment(&mut self, position: usize, last: bool) -> Result<(), PathParserError> {
		if let Some(segment) = self.segment.take() {
			if segment.is_empty() && !last {
				return Err(PathParserError::EmptySegment {
					position,
					path: self.path.to_string(),
				});
			}
			self.segments.push(segment);
		}
		self.segment = Some(Vec::new());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;

	fn static_token(value: &str) -> Token {
		Token::Static(value.to_string())
	}

	fn param(name: &str, regexp: Option<&str>, optional: bool, repeatable: bool) -> Token {
		Token::Param(ParamToken {
			name: name.to_string(),
			regexp: regexp.map(str::to_string),
			optional,
			repeatable,
		})
	}

	#[rstest]
	fn test_empty_pattern() {
		assert_eq!(tokenize_path("").unwrap(), vec![Vec::<Token>::new()]);
	}

	#[rstest]
	fn test_root_pattern() {
		assert_eq!(tokenize_path("/").unwrap(), vec![vec![Token::root()]]);
	}

	#[rstest]
	fn test_static_segments() {
		assert_eq!(
			tokenize_path("/home/about").unwrap(),
			vec![vec![static_token("home")], vec![static_token("about")]]
		);
	}

	#[rstest]
	fn test_trailing_slash_yields_empty_segment() {
		assert_eq!(
			tokenize_path("/home/").unwrap(),
			vec![vec![static_token("home")], vec![]]
		);
	}

	#[rstest]
	#[case("/:id", param("id", None, false, false))]
	#[case("/:id?", param("id", None, true, false))]
	#[case("/:id+", param("id", None, false, true))]
	#[case("/:id*", param("id", None, true, true))]
	#[case("/:id(\\d+)", param("id", Some("\\d+"), false, false))]
	#[case("/:id(\\d+)*", param("id", Some("\\d+"), true, true))]
	#[case("/:path(.*)", param("path", Some(".*"), false, false))]
	fn test_param_modifiers(#[case] pattern: &str, #[case] expected: Token) {
		assert_eq!(tokenize_path(pattern).unwrap(), vec![vec![expected]]);
	}

	#[rstest]
	fn test_mixed_segment() {
		assert_eq!(
			tokenize_path("/:a-:b").unwrap(),
			vec![vec![
				param("a", None, false, false),
				static_token("-"),
				param("b", None, false, false),
			]]
		);
	}

	#[rstest]
	fn test_static_prefix_then_param() {
		assert_eq!(
			tokenize_path("/file_:name.json").unwrap(),
			vec![vec![
				static_token("file_"),
				param("name", None, false, false),
				static_token(".json"),
			]]
		);
	}

	#[rstest]
	fn test_nested_parens_in_regexp() {
		assert_eq!(
			tokenize_path("/:lang(en|(fr|de))").unwrap(),
			vec![vec![param("lang", Some("en|(fr|de)"), false, false)]]
		);
	}

	#[rstest]
	#[case("/:p(a\\))", "a\\)")]
	#[case("/:p(a\\\\)", "a\\\\")]
	#[case("/:p(a\\\\\\))", "a\\\\\\)")]
	fn test_backslashes_in_regexp(#[case] pattern: &str, #[case] regexp: &str) {
		assert_eq!(
			tokenize_path(pattern).unwrap(),
			vec![vec![param("p", Some(regexp), false, false)]]
		);
	}

	#[rstest]
	fn test_escaped_colon_is_static() {
		assert_eq!(
			tokenize_path("/a\\:b").unwrap(),
			vec![vec![static_token("a:b")]]
		);
	}

	#[rstest]
	fn test_relative_pattern_rejected() {
		let err = tokenize_path("users").unwrap_err();
		assert!(matches!(err, PathParserError::MissingLeadingSlash { .. }));
	}

	#[rstest]
	fn test_unterminated_regexp_rejected() {
		let err = tokenize_path("/:id(\\d+").unwrap_err();
		assert_eq!(
			err,
			PathParserError::UnterminatedRegExp {
				param: "id".to_string(),
				path: "/:id(\\d+".to_string(),
			}
		);
	}

	#[rstest]
	#[case("/users?")]
	#[case("/+")]
	#[case("/:id??")]
	fn test_dangling_modifier_rejected(#[case] pattern: &str) {
		let err = tokenize_path(pattern).unwrap_err();
		assert!(matches!(err, PathParserError::DanglingModifier { .. }));
	}

	#[rstest]
	fn test_positions_count_chars() {
		let err = tokenize_path("/é?").unwrap_err();
		assert_eq!(
			err,
			PathParserError::DanglingModifier {
				modifier: '?',
				position: 2,
				path: "/é?".to_string(),
			}
		);
	}

	#[rstest]
	fn test_empty_inner_segment_rejected() {
		let err = tokenize_path("/a//b").unwrap_err();
		assert!(matches!(err, PathParserError::EmptySegment { .. }));
	}

	#[rstest]
	#[case("/:")]
	#[case("/:(\\d+)")]
	#[case("/:-a")]
	fn test_missing_param_name_rejected(#[case] pattern: &str) {
		let err = tokenize_path(pattern).unwrap_err();
		assert!(matches!(err, PathParserError::MissingParamName { .. }));
	}

	#[rstest]
	#[case("/a-:ids+")]
	#[case("/:ids+-a")]
	fn test_repeatable_must_be_alone(#[case] pattern: &str) {
		let err = tokenize_path(pattern).unwrap_err();
		assert!(matches!(err, PathParserError::RepeatableNotAlone { .. }));
	}
}
