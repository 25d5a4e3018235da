//! The document tree: the recursive value every traversal classifies,
//! dispatches on, and rebuilds.

use std::collections::BTreeMap;
use std::fmt;

/// A self-describing document value.
///
/// This is the tree every wire format is converted to/from at the
/// [`crate::codec::Codec`] boundary, and the tree the [`crate::driver::Driver`]
/// walks. It is intentionally smaller than `serde_json::Value`: just enough
/// shape to carry PRIMITIVE, SPECIAL and ATTRIBUTE categories (spec. `Value
/// category`).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// The PRIMITIVE null/unit value.
    Null,
    /// A PRIMITIVE boolean.
    Bool(bool),
    /// A PRIMITIVE signed integer.
    Int(i64),
    /// A PRIMITIVE floating point number.
    Float(f64),
    /// A PRIMITIVE (and ATTRIBUTE-eligible) string.
    String(String),
    /// A SPECIAL ordered sequence.
    Seq(Vec<Value>),
    /// A SPECIAL keyed mapping. Kept as an ordered `Vec` of pairs (not a
    /// `BTreeMap`) so that `PreserveSerializableKeyOrdering` has something
    /// to preserve; insertion order is the default and only order unless a
    /// handler sorts it.
    Map(Mapping),
}

/// An ordered string-keyed mapping.
///
/// A thin `Vec<(String, Value)>` wrapper rather than a `BTreeMap` or
/// `IndexMap`: the engine never needs anything fancier than linear lookup
/// (mappings are small — object fields, not bulk data) and insertion order
/// is part of the observable contract (spec. "reserved class-tag key
/// first (preserves emission order)").
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mapping(pub Vec<(String, Value)>);

impl Mapping {
    /// An empty mapping.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Look up a key, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Insert or overwrite a key, preserving first-insertion position on
    /// overwrite (so the driver can reserve the class-tag slot up front
    /// and fill it in later without disturbing emission order).
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        let key = key.into();
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }

    /// Remove and return a key's value, if present.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let idx = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(idx).1)
    }

    /// Iterate key/value pairs in emission order.
    pub fn iter(&self) -> impl Iterator<Item = &(String, Value)> {
        self.0.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the mapping has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sort entries lexically by key; used when
    /// `PreserveSerializableKeyOrdering` is active.
    pub fn sort_keys(&mut self) {
        self.0.sort_by(|(a, _), (b, _)| a.cmp(b));
    }
}

impl From<BTreeMap<String, Value>> for Mapping {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Mapping(map.into_iter().collect())
    }
}

impl FromIterator<(String, Value)> for Mapping {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        let mut m = Mapping::new();
        for (k, v) in iter {
            m.insert(k, v);
        }
        m
    }
}

/// The four disjoint value categories a traversal classifies every value
/// into (spec. "Value category").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// A scalar leaf: passes through the engine unchanged.
    Primitive,
    /// A structural container native to the document format.
    Special,
    /// A value permitted as a mapping key.
    Attribute,
    /// Everything else: dispatched to a type handler.
    Object,
}

impl Value {
    /// Classify this document value per the format's default classification
    /// (`Null`/`Bool`/`Int`/`Float`/`String` are PRIMITIVE, `Seq`/`Map` are
    /// SPECIAL). This is the document-side classification; the
    /// object-side classification of a runtime value lives on
    /// [`crate::driver::Driver`] via [`crate::formatter::FormatterSettings`].
    pub fn category(&self) -> Category {
        match self {
            Value::Null | Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::String(_) => {
                Category::Primitive
            }
            Value::Seq(_) | Value::Map(_) => Category::Special,
        }
    }

    /// Borrow as a mapping, if this is one.
    pub fn as_map(&self) -> Option<&Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Mutably borrow as a mapping, if this is one.
    pub fn as_map_mut(&mut self) -> Option<&mut Mapping> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Borrow as a sequence, if this is one.
    pub fn as_seq(&self) -> Option<&[Value]> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Mutably borrow as a sequence, if this is one.
    pub fn as_seq_mut(&mut self) -> Option<&mut Vec<Value>> {
        match self {
            Value::Seq(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow as a string, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Navigate into this value by a path, returning the addressed value.
    ///
    /// Used by the driver to walk back to an already-produced location of
    /// the document during eager reference resolution (spec. §4.4 step 3).
    pub fn get_path(&self, path: &crate::path::Path) -> Option<&Value> {
        let mut cur = self;
        for key in &path.0 {
            cur = match (key, cur) {
                (crate::path::Key::Name(n), Value::Map(m)) => m.get(n)?,
                (crate::path::Key::Index(i), Value::Seq(s)) => s.get(*i)?,
                _ => return None,
            };
        }
        Some(cur)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(n) => write!(f, "{n}"),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Seq(_) => write!(f, "<seq>"),
            Value::Map(_) => write!(f, "<map>"),
        }
    }
}
