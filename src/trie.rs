//! Segment trie.
//!
//! One tree per HTTP method. Each edge is one `/`-delimited path segment,
//! which is either literal text, a named parameter (`:name`, exactly one
//! segment) or a catch-all (`*name`, the rest of the path). A node carries a
//! non-empty `pattern` only when some registered route ends at it.
//!
//! Candidate children are tried literal first, then `:` parameters, then
//! `*` catch-alls, so `/users/new` wins over `/users/:id` no matter which was
//! registered first. Search backtracks when a preferred branch dead-ends.

use crate::error::Error;

/// Splits a path into its non-empty `/`-delimited segments.
///
/// Leading, trailing and doubled slashes are insignificant: `"//a/b/"`
/// yields `["a", "b"]` and `"/"` yields nothing.
pub(crate) fn split_segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Splits and validates a registration pattern.
pub(crate) fn parse_pattern(pattern: &str) -> Result<Vec<&str>, Error> {
    let segments = split_segments(pattern);
    for (index, segment) in segments.iter().enumerate() {
        if is_wild(segment) && segment.len() == 1 {
            return Err(invalid(pattern, "parameter name must not be empty"));
        }
        if segment.starts_with('*') && index + 1 != segments.len() {
            return Err(invalid(pattern, "catch-all segment must be the last segment"));
        }
    }
    Ok(segments)
}

/// The canonical spelling of a parsed pattern: `/` + segments joined by `/`.
pub(crate) fn canonical(segments: &[&str]) -> String {
    format!("/{}", segments.join("/"))
}

fn is_wild(segment: &str) -> bool {
    segment.starts_with(':') || segment.starts_with('*')
}

fn invalid(pattern: &str, reason: &'static str) -> Error {
    Error::InvalidPattern { pattern: pattern.to_owned(), reason }
}

#[derive(Debug, Default)]
pub(crate) struct Node {
    pattern: String,
    segment: String,
    wild: bool,
    children: Vec<Node>,
}

impl Node {
    fn new(segment: &str) -> Self {
        Self {
            pattern: String::new(),
            segment: segment.to_owned(),
            wild: is_wild(segment),
            children: Vec::new(),
        }
    }

    /// The full pattern registered at this node; empty on intermediate nodes.
    pub(crate) fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Inserts `pattern` along `segments`, starting at `depth`.
    ///
    /// Re-inserting the same pattern is a no-op. If a different pattern
    /// already ended at the target node (`/a/:x` vs `/a/:y`), it is replaced
    /// and returned so the caller can drop its handler.
    pub(crate) fn insert(&mut self, pattern: &str, segments: &[&str], depth: usize) -> Option<String> {
        let Some(segment) = segments.get(depth) else {
            let previous = std::mem::replace(&mut self.pattern, pattern.to_owned());
            return (!previous.is_empty() && previous != pattern).then_some(previous);
        };

        let index = match self.child_for(segment) {
            Some(index) => index,
            None => {
                self.children.push(Node::new(segment));
                self.children.len() - 1
            }
        };
        self.children[index].insert(pattern, segments, depth + 1)
    }

    /// Finds the child an inserted `segment` continues through: an identical
    /// segment, or for wild segments any wild child of the same kind.
    fn child_for(&self, segment: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|child| child.segment == segment)
            .or_else(|| {
                if !is_wild(segment) {
                    return None;
                }
                let sigil = segment.chars().next();
                self.children
                    .iter()
                    .position(|child| child.wild && child.segment.chars().next() == sigil)
            })
    }

    /// Resolves `segments[depth..]` to the node of a registered pattern.
    pub(crate) fn search(&self, segments: &[&str], depth: usize) -> Option<&Node> {
        if self.segment.starts_with('*') {
            return self.terminal();
        }

        let Some(segment) = segments.get(depth) else {
            // A catch-all below us also matches an empty remainder.
            return self.terminal().or_else(|| {
                self.children
                    .iter()
                    .find(|child| child.segment.starts_with('*') && !child.pattern.is_empty())
            });
        };

        self.candidates(segment)
            .find_map(|child| child.search(segments, depth + 1))
    }

    fn terminal(&self) -> Option<&Node> {
        (!self.pattern.is_empty()).then_some(self)
    }

    fn candidates<'n>(&'n self, segment: &str) -> impl Iterator<Item = &'n Node> {
        let literal = self
            .children
            .iter()
            .filter(move |child| !child.wild && child.segment == segment);
        let param = self.children.iter().filter(|child| child.segment.starts_with(':'));
        let catch_all = self.children.iter().filter(|child| child.segment.starts_with('*'));
        literal.chain(param).chain(catch_all)
    }

    #[cfg(test)]
    pub(crate) fn patterns(&self) -> Vec<String> {
        let mut out = Vec::new();
        self.collect_patterns(&mut out);
        out
    }

    #[cfg(test)]
    fn collect_patterns(&self, out: &mut Vec<String>) {
        if !self.pattern.is_empty() {
            out.push(self.pattern.clone());
        }
        for child in &self.children {
            child.collect_patterns(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(patterns: &[&str]) -> Node {
        let mut root = Node::default();
        for pattern in patterns {
            let segments = parse_pattern(pattern).unwrap();
            root.insert(&canonical(&segments), &segments, 0);
        }
        root
    }

    fn lookup<'a>(root: &'a Node, path: &str) -> Option<&'a str> {
        root.search(&split_segments(path), 0).map(Node::pattern)
    }

    #[test]
    fn split_ignores_empty_segments() {
        assert_eq!(split_segments("//a/b/"), vec!["a", "b"]);
        assert!(split_segments("/").is_empty());
        assert!(split_segments("").is_empty());
    }

    #[test]
    fn parse_rejects_catch_all_before_the_end() {
        let err = parse_pattern("/static/*path/edit").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { ref pattern, .. } if pattern == "/static/*path/edit"));
    }

    #[test]
    fn parse_rejects_unnamed_parameters() {
        assert!(parse_pattern("/users/:").is_err());
        assert!(parse_pattern("/files/*").is_err());
    }

    #[test]
    fn canonical_form_collapses_slashes() {
        assert_eq!(canonical(&parse_pattern("/a//b/").unwrap()), "/a/b");
        assert_eq!(canonical(&parse_pattern("").unwrap()), "/");
    }

    #[test]
    fn root_pattern_matches_only_root() {
        let root = tree(&["/"]);
        assert_eq!(lookup(&root, "/"), Some("/"));
        assert_eq!(lookup(&root, "/x"), None);
    }

    #[test]
    fn literal_and_parameter_segments() {
        let root = tree(&["/hello", "/hello/:name", "/hello/:name/books"]);
        assert_eq!(lookup(&root, "/hello"), Some("/hello"));
        assert_eq!(lookup(&root, "/hello/geektutu"), Some("/hello/:name"));
        assert_eq!(lookup(&root, "/hello/geektutu/books"), Some("/hello/:name/books"));
        assert_eq!(lookup(&root, "/hello/geektutu/films"), None);
    }

    #[test]
    fn intermediate_nodes_never_match() {
        let root = tree(&["/a/b/c"]);
        assert_eq!(lookup(&root, "/a"), None);
        assert_eq!(lookup(&root, "/a/b"), None);
        assert_eq!(lookup(&root, "/a/b/c"), Some("/a/b/c"));
    }

    #[test]
    fn catch_all_consumes_the_remainder() {
        let root = tree(&["/assets/*filepath"]);
        assert_eq!(lookup(&root, "/assets/css/a.css"), Some("/assets/*filepath"));
        assert_eq!(lookup(&root, "/assets/a.css"), Some("/assets/*filepath"));
        assert_eq!(lookup(&root, "/assets"), Some("/assets/*filepath"));
        assert_eq!(lookup(&root, "/other/a.css"), None);
    }

    #[test]
    fn literal_beats_parameter_regardless_of_order() {
        let param_first = tree(&["/users/:id", "/users/new"]);
        let literal_first = tree(&["/users/new", "/users/:id"]);
        for root in [&param_first, &literal_first] {
            assert_eq!(lookup(root, "/users/new"), Some("/users/new"));
            assert_eq!(lookup(root, "/users/42"), Some("/users/:id"));
        }
    }

    #[test]
    fn parameter_beats_catch_all() {
        let root = tree(&["/files/*rest", "/files/:name"]);
        assert_eq!(lookup(&root, "/files/a"), Some("/files/:name"));
        assert_eq!(lookup(&root, "/files/a/b"), Some("/files/*rest"));
    }

    #[test]
    fn search_backtracks_out_of_dead_ends() {
        let root = tree(&["/p/go/doc", "/p/:lang/intro"]);
        assert_eq!(lookup(&root, "/p/go/intro"), Some("/p/:lang/intro"));
        assert_eq!(lookup(&root, "/p/go/doc"), Some("/p/go/doc"));
    }

    #[test]
    fn literal_is_not_merged_into_a_wild_node() {
        let root = tree(&["/a/:x", "/a/b/c"]);
        assert_eq!(lookup(&root, "/a/b/c"), Some("/a/b/c"));
        assert_eq!(lookup(&root, "/a/zzz"), Some("/a/:x"));
        assert_eq!(root.patterns().len(), 2);
    }

    #[test]
    fn wild_children_of_the_same_kind_share_a_subtree() {
        let root = tree(&["/a/:x/one", "/a/:y/two"]);
        assert_eq!(lookup(&root, "/a/1/one"), Some("/a/:x/one"));
        assert_eq!(lookup(&root, "/a/1/two"), Some("/a/:y/two"));
    }

    #[test]
    fn insert_reports_displaced_pattern() {
        let mut root = Node::default();
        let first = parse_pattern("/a/:x").unwrap();
        let second = parse_pattern("/a/:y").unwrap();
        assert_eq!(root.insert("/a/:x", &first, 0), None);
        assert_eq!(root.insert("/a/:x", &first, 0), None);
        assert_eq!(root.insert("/a/:y", &second, 0), Some("/a/:x".to_owned()));
        assert_eq!(root.patterns(), vec!["/a/:y".to_owned()]);
    }
}
