//! Ranking of compiled path patterns.
//!
//! Every segment of a pattern gets a list of sub-scores, one per token. Two
//! patterns are compared segment by segment, root first, and the first
//! difference decides. Static text outranks params at the same depth, a
//! custom regexp outranks a generic param, and optional, repeatable and
//! catch-all params are pushed down.
//!
//! Weights are integers (the reference weights scaled by 100) so scores
//! have a total order.

use crate::parser::PathParser;
use std::cmp::Ordering;

/// Score weights.
pub mod weight {
	/// An empty segment (trailing slash or empty pattern).
	pub const ROOT: i32 = 9_000;
	/// Base value of every token.
	pub const SEGMENT: i32 = 4_000;
	/// Static text.
	pub const STATIC: i32 = 4_000;
	/// A param.
	pub const DYNAMIC: i32 = 2_000;
	/// A param with a custom regexp.
	pub const BONUS_CUSTOM_REGEXP: i32 = 1_000;
	/// A param matching `.*`.
	pub const BONUS_WILDCARD: i32 = -5_000;
	/// A `+` or `*` param.
	pub const BONUS_REPEATABLE: i32 = -2_000;
	/// A `?` or `*` param.
	pub const BONUS_OPTIONAL: i32 = -800;
	/// Last token of a strict, end-anchored pattern.
	pub const BONUS_STRICT: i32 = 70;
	/// Any token of a case-sensitive pattern.
	pub const BONUS_CASE_SENSITIVE: i32 = 25;
}

/// Per-segment sub-scores of one pattern.
pub type Score = Vec<Vec<i32>>;

/// Compares the sub-scores of one segment.
///
/// `Less` means `a` ranks first. A single static token beats any longer
/// list that starts with the same value, otherwise the longer list wins.
pub fn compare_score_array(a: &[i32], b: &[i32]) -> Ordering {
	for (x, y) in a.iter().zip(b) {
		if x != y {
			return y.cmp(x);
		}
	}

	let single_static = weight::STATIC + weight::SEGMENT;
	match a.len().cmp(&b.len()) {
		Ordering::Less if a.len() == 1 && a[0] == single_static => Ordering::Less,
		Ordering::Less => Ordering::Greater,
		Ordering::Greater if b.len() == 1 && b[0] == single_static => Ordering::Greater,
		Ordering::Greater => Ordering::Less,
		Ordering::Equal => Ordering::Equal,
	}
}

fn is_last_score_negative(score: &[Vec<i32>]) -> bool {
	score
		.last()
		.and_then(|segment| segment.last())
		.is_some_and(|value| *value < 0)
}

/// Compares two score vectors.
///
/// `Less` means `a` ranks first. When all shared segments tie, the longer
/// pattern ranks first unless it is exactly one segment longer and ends in
/// a negative score (an optional or catch-all tail).
pub fn compare_scores(a: &[Vec<i32>], b: &[Vec<i32>]) -> Ordering {
	for (x, y) in a.iter().zip(b) {
		let order = compare_score_array(x, y);
		if order != Ordering::Equal {
			return order;
		}
	}

	if a.len().abs_diff(b.len()) == 1 {
		if is_last_score_negative(a) {
			return Ordering::Greater;
		}
		if is_last_score_negative(b) {
			return Ordering::Less;
		}
	}

	b.len().cmp(&a.len())
}

/// Compares two compiled patterns by score.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use waymark_matcher::config::ParserOptions;
/// use waymark_matcher::parser::compile_path;
/// use waymark_matcher::score::compare_path_parser_score;
///
/// let options = ParserOptions::default();
/// let fixed = compile_path("/users/new", options).unwrap();
/// let dynamic = compile_path("/users/:id", options).unwrap();
///
/// assert_eq!(compare_path_parser_score(&fixed, &dynamic), Ordering::Less);
/// ```
pub fn compare_path_parser_score(a: &PathParser, b: &PathParser) -> Ordering {
	compare_scores(a.score(), b.score())
}
