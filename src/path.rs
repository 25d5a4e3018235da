//! Path bookkeeping: a location in the document tree, and its reversible
//! string encoding.
//!
//! Grounded on the teacher's split between structured key sequences
//! (`key.rs`'s `Keys`) and their string encoding (`jsonpath.rs`/`key_impls.rs`'s
//! `Path`), generalized to dynamic keys instead of compile-time-typed ones.

use crate::error::PathError;

/// One frame of a traversal path: a mapping key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A mapping key.
    Name(String),
    /// A sequence index.
    Index(usize),
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Name(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Name(s.to_string())
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Key::Index(i)
    }
}

/// An ordered sequence of [`Key`]s describing a location in the document
/// tree. The empty path is the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Path(pub Vec<Key>);

impl Path {
    /// The empty (root) path.
    pub fn root() -> Self {
        Path(Vec::new())
    }

    /// Push a frame onto the path.
    pub fn push(&mut self, key: Key) {
        self.0.push(key);
    }

    /// Pop the last frame. Panics if the path is already empty — a bug in
    /// the driver's stack discipline, not a recoverable condition.
    pub fn pop(&mut self) {
        self.0
            .pop()
            .expect("path frame popped without a matching push");
    }

    /// Whether `self` is a (non-strict) prefix of `other` — the definition
    /// of a circular reference (spec. §4.4 "Circular-reference detection").
    pub fn is_prefix_of(&self, other: &Path) -> bool {
        self.0.len() <= other.0.len() && self.0.iter().zip(&other.0).all(|(a, b)| a == b)
    }

    /// Encode as a `/`-joined string. Each segment carries a one-character
    /// type tag (`n` for a [`Key::Name`], `i` for a [`Key::Index`]) ahead of
    /// its content, so a name that happens to look like a decimal integer
    /// (e.g. an integer ATTRIBUTE dict key, spec. `attr_key_for`) still
    /// decodes back as a name rather than being mistaken for an index.
    /// Name content escapes literal `~` as `~0` and `/` as `~1`
    /// (JSON-Pointer-style) so that names containing separators round-trip
    /// exactly.
    pub fn to_path_string(&self) -> String {
        let mut out = String::new();
        for key in &self.0 {
            out.push('/');
            match key {
                Key::Name(name) => {
                    out.push('n');
                    for ch in name.chars() {
                        match ch {
                            '~' => out.push_str("~0"),
                            '/' => out.push_str("~1"),
                            c => out.push(c),
                        }
                    }
                }
                Key::Index(i) => {
                    out.push('i');
                    out.push_str(&i.to_string());
                }
            }
        }
        out
    }

    /// Decode a string produced by [`Path::to_path_string`] back into a
    /// `Path`. Each segment's leading type tag (`n`/`i`) says unambiguously
    /// which [`Key`] variant to rebuild, rather than guessing from content.
    pub fn parse_path_string(s: &str) -> Result<Path, PathError> {
        if s.is_empty() {
            return Ok(Path::root());
        }
        if !s.starts_with('/') {
            return Err(PathError(s.to_string()));
        }
        let mut keys = Vec::new();
        for segment in s[1..].split('/') {
            let mut chars = segment.chars();
            let tag = chars.next().ok_or_else(|| PathError(s.to_string()))?;
            let rest = chars.as_str();
            match tag {
                'n' => keys.push(Key::Name(unescape_segment(rest))),
                'i' => {
                    let i: usize = rest.parse().map_err(|_| PathError(s.to_string()))?;
                    keys.push(Key::Index(i));
                }
                _ => return Err(PathError(s.to_string())),
            }
        }
        Ok(Path(keys))
    }
}

fn unescape_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut chars = segment.chars();
    while let Some(c) = chars.next() {
        if c == '~' {
            match chars.next() {
                Some('0') => out.push('~'),
                Some('1') => out.push('/'),
                Some(other) => {
                    out.push('~');
                    out.push(other);
                }
                None => out.push('~'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path_string())
    }
}

/// RAII guard returned by [`PathFrame::enter`]. Pops the pushed frame on
/// drop, including on an early return via `?` — this is how the driver
/// guarantees spec.'s "every push is matched by a pop on every exit path,
/// including failure" without a manual push/pop pair at every call site.
///
/// Derefs to the underlying [`PathFrame`] so a caller that needs to pass
/// the frame on to a recursive call (which must see the just-pushed key)
/// can do so through the guard itself rather than the original `&mut
/// PathFrame` — borrowing that directly while the guard is still alive
/// would conflict with the guard's own held borrow.
pub struct PathGuard<'a> {
    frame: &'a mut PathFrame,
}

impl std::ops::Deref for PathGuard<'_> {
    type Target = PathFrame;

    fn deref(&self) -> &PathFrame {
        self.frame
    }
}

impl std::ops::DerefMut for PathGuard<'_> {
    fn deref_mut(&mut self) -> &mut PathFrame {
        self.frame
    }
}

impl Drop for PathGuard<'_> {
    fn drop(&mut self) {
        self.frame.path.pop();
    }
}

/// The driver's single current-path frame (spec. §4.6).
#[derive(Debug, Clone, Default)]
pub struct PathFrame {
    path: Path,
}

impl PathFrame {
    /// A frame positioned at the document root.
    pub fn new() -> Self {
        Self::default()
    }

    /// A frame positioned at an arbitrary path, used to seed a detour
    /// traversal during eager reference resolution (spec. §4.4 step 3).
    pub fn at(path: Path) -> Self {
        PathFrame { path }
    }

    /// The current path.
    pub fn current(&self) -> &Path {
        &self.path
    }

    /// The current path as its string encoding.
    pub fn current_string(&self) -> String {
        self.path.to_path_string()
    }

    /// Push `key` and return a guard that pops it on drop.
    #[must_use = "the path frame pops back up as soon as the guard is dropped"]
    pub fn enter(&mut self, key: impl Into<Key>) -> PathGuard<'_> {
        self.path.push(key.into());
        PathGuard { frame: self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_simple_paths() {
        let p = Path(vec![Key::Name("a".into()), Key::Index(3), Key::Name("b".into())]);
        let s = p.to_path_string();
        assert_eq!(Path::parse_path_string(&s).unwrap(), p);
    }

    #[test]
    fn root_path_round_trips() {
        let p = Path::root();
        assert_eq!(p.to_path_string(), "");
        assert_eq!(Path::parse_path_string("").unwrap(), p);
    }

    #[test]
    fn escapes_separators_in_names() {
        let p = Path(vec![Key::Name("a/b~c".into())]);
        let s = p.to_path_string();
        assert_eq!(s, "/na~1b~0c");
        assert_eq!(Path::parse_path_string(&s).unwrap(), p);
    }

    #[test]
    fn a_digit_only_name_does_not_decode_as_an_index() {
        let p = Path(vec![Key::Name("0".into())]);
        let s = p.to_path_string();
        assert_eq!(s, "/n0");
        assert_eq!(Path::parse_path_string(&s).unwrap(), p);
    }

    #[test]
    fn prefix_detection() {
        let root = Path::root();
        let child = Path(vec![Key::Name("x".into())]);
        assert!(root.is_prefix_of(&child));
        assert!(!child.is_prefix_of(&root));
        assert!(child.is_prefix_of(&child));
    }

    #[test]
    fn guard_pops_on_drop_including_early_return() {
        fn probe(frame: &mut PathFrame) -> Result<(), ()> {
            let _guard = frame.enter("x");
            Err(())
        }
        let mut frame = PathFrame::new();
        let _ = probe(&mut frame);
        assert_eq!(frame.current(), &Path::root());
    }
}
