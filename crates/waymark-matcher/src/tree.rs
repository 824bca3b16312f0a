//! Indexed storage of record matchers.
//!
//! Matchers live in an arena keyed by [`MatcherId`]. Matchable ones are also
//! indexed in exactly one of two shapes:
//!
//! - the exact map, for fully static end-anchored patterns, keyed by the
//!   uppercased path without its trailing slash
//! - the segment trie, for everything else, keyed by the uppercased static
//!   segments the pattern starts with
//!
//! Every bucket is kept sorted best-score-first, so a lookup only needs the
//! first candidate of each bucket whose regexp accepts the path.

use crate::matcher::{MatcherId, RecordMatcher};
use crate::parser::PathParser;
use crate::record::RouteName;
use crate::score::compare_path_parser_score;
use crate::tokenizer::Token;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, Default)]
struct TrieNode {
	children: BTreeMap<String, TrieNode>,
	matchers: Vec<MatcherId>,
}

/// Arena and lookup indices of every registered matcher.
#[derive(Debug, Clone, Default)]
pub struct MatcherTree {
	matchers: HashMap<MatcherId, RecordMatcher>,
	names: HashMap<RouteName, MatcherId>,
	exact: BTreeMap<String, Vec<MatcherId>>,
	root: TrieNode,
	next_id: u64,
}

fn normalize_key(path: &str) -> String {
	path.strip_suffix('/').unwrap_or(path).to_uppercase()
}

fn exact_key(parser: &PathParser) -> String {
	let mut key = String::new();
	for segment in parser.segments() {
		key.push('/');
		if let Some(Token::Static(value)) = segment.first() {
			key.push_str(value);
		}
	}
	normalize_key(&key)
}

fn trie_prefix(parser: &PathParser) -> Vec<String> {
	parser
		.segments()
		.iter()
		.map_while(|segment| match segment.as_slice() {
			[Token::Static(value)] if !value.is_empty() => Some(value.to_uppercase()),
			_ => None,
		})
		.collect()
}

fn remove_from_trie(node: &mut TrieNode, prefix: &[String], id: MatcherId) -> bool {
	match prefix.split_first() {
		None => node.matchers.retain(|candidate| *candidate != id),
		Some((head, rest)) => {
			if let Some(child) = node.children.get_mut(head)
				&& remove_from_trie(child, rest, id)
			{
				node.children.remove(head);
			}
		}
	}
	node.matchers.is_empty() && node.children.is_empty()
}

fn collect_trie(node: &TrieNode, out: &mut Vec<MatcherId>) {
	out.extend(node.matchers.iter().copied());
	for child in node.children.values() {
		collect_trie(child, out);
	}
}

impl MatcherTree {
	/// Creates an empty tree.
	pub fn new() -> Self {
		Self::default()
	}

	/// Reserves a fresh id.
	pub(crate) fn allocate_id(&mut self) -> MatcherId {
		self.next_id += 1;
		MatcherId(self.next_id)
	}

	/// Stores a matcher in the arena without indexing it.
	pub(crate) fn store(&mut self, matcher: RecordMatcher) {
		self.matchers.insert(matcher.id, matcher);
	}

	/// Returns a stored matcher.
	pub fn get(&self, id: MatcherId) -> Option<&RecordMatcher> {
		self.matchers.get(&id)
	}

	pub(crate) fn get_mut(&mut self, id: MatcherId) -> Option<&mut RecordMatcher> {
		self.matchers.get_mut(&id)
	}

	/// Returns the canonical matcher registered under `name`.
	pub fn get_by_name(&self, name: &RouteName) -> Option<&RecordMatcher> {
		self.names.get(name).and_then(|id| self.matchers.get(id))
	}

	/// Indexes a stored matcher at its ranked position.
	///
	/// Canonical named matchers are also registered by name, replacing any
	/// previous holder of the name.
	pub fn insert(&mut self, id: MatcherId) {
		let Some(matcher) = self.matchers.get(&id) else {
			return;
		};

		if matcher.parser.is_static() {
			let key = exact_key(&matcher.parser);
			let bucket = self.exact.get(&key).map(Vec::as_slice).unwrap_or_default();
			let index = insertion_index(&self.matchers, bucket, id);
			self.exact.entry(key).or_default().insert(index, id);
		} else {
			let prefix = trie_prefix(&matcher.parser);
			let mut node = &mut self.root;
			for key in prefix {
				node = node.children.entry(key).or_default();
			}
			let index = insertion_index(&self.matchers, &node.matchers, id);
			node.matchers.insert(index, id);
		}

		if let Some(matcher) = self.matchers.get(&id)
			&& !matcher.is_alias()
			&& let Some(name) = matcher.name()
		{
			self.names.insert(name.clone(), id);
		}
	}

	/// Removes a matcher from the arena, the indices, the name map and the
	/// link lists of its parent and canonical matcher.
	///
	/// Children and aliases are left in place; cascading is up to the caller.
	pub fn remove(&mut self, id: MatcherId) -> Option<RecordMatcher> {
		let matcher = self.matchers.remove(&id)?;

		if matcher.parser.is_static() {
			let key = exact_key(&matcher.parser);
			if let Some(bucket) = self.exact.get_mut(&key) {
				bucket.retain(|candidate| *candidate != id);
				if bucket.is_empty() {
					self.exact.remove(&key);
				}
			}
		} else {
			remove_from_trie(&mut self.root, &trie_prefix(&matcher.parser), id);
		}

		if let Some(name) = matcher.name()
			&& self.names.get(name) == Some(&id)
		{
			self.names.remove(name);
		}
		if let Some(parent) = matcher.parent.and_then(|parent| self.matchers.get_mut(&parent)) {
			parent.children.retain(|child| *child != id);
		}
		if let Some(original) = matcher
			.alias_of
			.and_then(|original| self.matchers.get_mut(&original))
		{
			original.alias.retain(|alias| *alias != id);
		}

		Some(matcher)
	}

	/// Removes the canonical matcher registered under `name`.
	pub fn remove_by_name(&mut self, name: &RouteName) -> Option<RecordMatcher> {
		let id = *self.names.get(name)?;
		self.remove(id)
	}

	/// Finds the best-ranked matcher accepting `path`.
	///
	/// Returns `None` when nothing matches, which is not an error.
	pub fn find(&self, path: &str) -> Option<&RecordMatcher> {
		let mut best = self
			.exact
			.get(&normalize_key(path))
			.and_then(|bucket| self.first_match(bucket, path));

		let mut chain = vec![&self.root];
		let mut node = &self.root;
		for segment in path.strip_prefix('/').unwrap_or(path).split('/') {
			match node.children.get(&segment.to_uppercase()) {
				Some(child) => {
					chain.push(child);
					node = child;
				}
				None => break,
			}
		}

		// deepest bucket first, earlier hits win ties
		for node in chain.iter().rev() {
			let Some(candidate) = self.first_match(&node.matchers, path) else {
				continue;
			};
			best = match best {
				Some(current)
					if compare_path_parser_score(&candidate.parser, &current.parser)
						!= Ordering::Less =>
				{
					Some(current)
				}
				_ => Some(candidate),
			};
		}

		match best {
			Some(matcher) => tracing::trace!(path, pattern = %matcher.path(), "matched path"),
			None => tracing::trace!(path, "no matcher for path"),
		}
		best
	}

	fn first_match<'a>(&'a self, bucket: &[MatcherId], path: &str) -> Option<&'a RecordMatcher> {
		bucket
			.iter()
			.filter_map(|id| self.matchers.get(id))
			.find(|matcher| matcher.parser.is_match(path))
	}

	/// Every indexed matcher: exact map entries first, then the trie depth-first.
	pub fn to_array(&self) -> Vec<&RecordMatcher> {
		let mut ids: Vec<MatcherId> = self.exact.values().flatten().copied().collect();
		collect_trie(&self.root, &mut ids);
		ids.iter().filter_map(|id| self.matchers.get(id)).collect()
	}

	/// Whether `id` is still stored.
	pub fn contains(&self, id: MatcherId) -> bool {
		self.matchers.contains_key(&id)
	}

	/// Drops every matcher. Ids keep increasing afterwards.
	pub fn clear(&mut self) {
		self.matchers.clear();
		self.names.clear();
		self.exact.clear();
		self.root = TrieNode::default();
	}
}

// Binary search for the upper bound among equal scores, then move before an
// equal-score ancestor that already sits in the bucket.
fn insertion_index(
	matchers: &HashMap<MatcherId, RecordMatcher>,
	bucket: &[MatcherId],
	id: MatcherId,
) -> usize {
	let Some(matcher) = matchers.get(&id) else {
		return bucket.len();
	};

	let mut lower = 0;
	let mut upper = bucket.len();
	while lower < upper {
		let mid = (lower + upper) / 2;
		let order = matchers
			.get(&bucket[mid])
			.map(|other| compare_path_parser_score(&matcher.parser, &other.parser))
			.unwrap_or(Ordering::Less);
		if order == Ordering::Less {
			upper = mid;
		} else {
			lower = mid + 1;
		}
	}

	if let Some(ancestor) = insertion_ancestor(matchers, matcher)
		&& let Some(position) = bucket[..upper].iter().rposition(|other| *other == ancestor)
	{
		upper = position;
	}

	upper
}

fn insertion_ancestor(
	matchers: &HashMap<MatcherId, RecordMatcher>,
	matcher: &RecordMatcher,
) -> Option<MatcherId> {
	let mut current = matcher.parent;
	while let Some(id) = current {
		let ancestor = matchers.get(&id)?;
		if ancestor.is_matchable()
			&& compare_path_parser_score(&matcher.parser, &ancestor.parser) == Ordering::Equal
		{
			return Some(id);
		}
		current = ancestor.parent;
	}
	None
}
