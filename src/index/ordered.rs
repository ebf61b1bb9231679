use parking_lot::RwLock;
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::ops::Bound;
use crate::core::types::Value;

/// A comparable scalar stored in an ordered index. The ordering is total so
/// the backing tree stays consistent (type rank first, then value), but
/// equality never holds across types, so mixed-type items are invisible to
/// equality lookups.
#[derive(Debug, Clone)]
pub enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
}

impl Scalar {
    pub fn from_value(value: &Value) -> Option<Scalar> {
        match value {
            Value::Str(s) => Some(Scalar::Str(s.clone())),
            Value::Int(n) => Some(Scalar::Int(*n)),
            Value::Float(f) => Some(Scalar::Float(*f)),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Scalar::Str(_) => 0,
            Scalar::Int(_) => 1,
            Scalar::Float(_) => 2,
        }
    }
}

impl Ord for Scalar {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Scalar::Str(a), Scalar::Str(b)) => a.cmp(b),
            (Scalar::Int(a), Scalar::Int(b)) => a.cmp(b),
            (Scalar::Float(a), Scalar::Float(b)) => a.total_cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Scalar {}

/// Per-field ordered index over `(scalar, key)` pairs. Inserting a key that
/// is already present replaces its previous scalar.
pub struct OrderedIndex {
    inner: RwLock<OrderedInner>,
}

struct OrderedInner {
    entries: BTreeSet<(Scalar, String)>,
    by_key: HashMap<String, Scalar>,
}

impl OrderedIndex {
    pub fn new() -> Self {
        OrderedIndex {
            inner: RwLock::new(OrderedInner {
                entries: BTreeSet::new(),
                by_key: HashMap::new(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn update(&self, key: &str, value: Scalar) {
        let mut inner = self.inner.write();

        if let Some(old) = inner.by_key.remove(key) {
            inner.entries.remove(&(old, key.to_string()));
        }

        inner.by_key.insert(key.to_string(), value.clone());
        inner.entries.insert((value, key.to_string()));
    }

    pub fn remove(&self, key: &str) {
        let mut inner = self.inner.write();

        if let Some(old) = inner.by_key.remove(key) {
            inner.entries.remove(&(old, key.to_string()));
        }
    }

    /// Keys whose stored scalar equals `value`: ascend from `(value, "")`
    /// and stop at the first greater scalar.
    pub fn lookup_eq(&self, value: &Scalar) -> Vec<String> {
        let inner = self.inner.read();

        inner
            .entries
            .range((
                Bound::Included((value.clone(), String::new())),
                Bound::Unbounded,
            ))
            .take_while(|(scalar, _)| scalar == value)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

impl Default for OrderedIndex {
    fn default() -> Self {
        Self::new()
    }
}
