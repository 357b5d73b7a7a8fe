use compact_str::{CompactString, ToCompactString};
use std::{collections::BTreeMap, sync::Arc};

#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Empty,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(CompactString),
    List(ListAdapter),
    Map(MapAdapter),
}

/// Sequence view over either an owned list or a lazily computed range.
#[derive(Debug, Clone)]
pub enum ListAdapter {
    Materialized(Arc<[Value]>),
    Range { start: i64, stop: i64, step: i64 },
}

#[derive(Debug, Clone, Default)]
pub struct MapAdapter {
    entries: Arc<BTreeMap<CompactString, Value>>,
}

impl Value {
    pub fn list(items: impl IntoIterator<Item = Value>) -> Self {
        Value::List(ListAdapter::from_iter(items))
    }

    pub fn range(start: i64, stop: i64) -> Self {
        Value::List(ListAdapter::Range {
            start,
            stop,
            step: 1,
        })
    }

    pub fn map<K: AsRef<str>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Map(MapAdapter::from_iter(entries))
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Empty => false,
            Value::Bool(v) => *v,
            Value::Int(v) => *v != 0,
            Value::Float(v) => *v != 0.0,
            Value::String(v) => !v.is_empty(),
            Value::List(v) => v.size() != 0,
            Value::Map(v) => !v.is_empty(),
        }
    }

    /// Best-effort conversion into a sequence. Scalars and `Empty` are not iterable.
    pub fn to_list(&self) -> Option<ListAdapter> {
        match self {
            Value::List(list) => Some(list.clone()),
            Value::Map(map) => Some(ListAdapter::from_iter(
                map.keys().map(|key| Value::String(key.clone())),
            )),
            Value::String(text) => Some(ListAdapter::from_iter(
                text.chars().map(|c| Value::String(c.to_compact_string())),
            )),
            Value::Empty | Value::Bool(_) | Value::Int(_) | Value::Float(_) => None,
        }
    }

    /// Field access by name. Anything that is not a mapping holding `name` yields `Empty`.
    pub fn subscript(&self, name: &str) -> Value {
        match self {
            Value::Map(map) => map.get(name).cloned().unwrap_or_default(),
            _ => Value::Empty,
        }
    }

    pub fn has_field(&self, name: &str) -> bool {
        matches!(self, Value::Map(map) if map.contains_key(name))
    }

    pub fn is_equal(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Empty, Value::Empty) => true,
            (Value::Bool(lhs), Value::Bool(rhs)) => lhs == rhs,
            (Value::Int(lhs), Value::Int(rhs)) => lhs == rhs,
            (Value::Float(lhs), Value::Float(rhs)) => lhs == rhs,
            (Value::Int(lhs), Value::Float(rhs)) | (Value::Float(rhs), Value::Int(lhs)) => {
                (*lhs as f64) == *rhs
            }
            (Value::String(lhs), Value::String(rhs)) => lhs == rhs,
            (Value::List(lhs), Value::List(rhs)) => {
                lhs.size() == rhs.size() && lhs.iter().zip(rhs.iter()).all(|(l, r)| l.is_equal(&r))
            }
            (Value::Map(lhs), Value::Map(rhs)) => {
                lhs.len() == rhs.len()
                    && lhs
                        .iter()
                        .all(|(key, value)| rhs.get(key).is_some_and(|other| value.is_equal(other)))
            }
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_compact_string())
    }
}

impl From<CompactString> for Value {
    fn from(value: CompactString) -> Self {
        Value::String(value)
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
            Self::List(list) => {
                write!(f, "[")?;
                for (index, item) in list.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write_nested(f, &item)?;
                }
                write!(f, "]")
            }
            Self::Map(map) => {
                write!(f, "{{")?;
                for (index, (key, value)) in map.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "'{key}': ")?;
                    write_nested(f, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_nested(f: &mut std::fmt::Formatter<'_>, value: &Value) -> std::fmt::Result {
    match value {
        Value::String(v) => write!(f, "'{v}'"),
        Value::Empty => write!(f, "none"),
        v => write!(f, "{v}"),
    }
}

impl ListAdapter {
    pub fn size(&self) -> usize {
        match self {
            ListAdapter::Materialized(items) => items.len(),
            ListAdapter::Range { start, stop, step } => {
                let (start, stop, step) = (*start as i128, *stop as i128, *step as i128);
                let count = if step > 0 && start < stop {
                    (stop - start - 1) / step + 1
                } else if step < 0 && start > stop {
                    (start - stop - 1) / -step + 1
                } else {
                    0
                };
                usize::try_from(count).unwrap_or(usize::MAX)
            }
        }
    }

    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            ListAdapter::Materialized(items) => items.get(index).cloned(),
            ListAdapter::Range { start, step, .. } => {
                if index >= self.size() {
                    return None;
                }
                // Widened so extreme bounds and steps cannot overflow.
                let value = *start as i128 + *step as i128 * index as i128;
                i64::try_from(value).ok().map(Value::Int)
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.size()).filter_map(|index| self.get(index))
    }
}

impl FromIterator<Value> for ListAdapter {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        ListAdapter::Materialized(iter.into_iter().collect())
    }
}

impl MapAdapter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &CompactString> {
        self.entries.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CompactString, &Value)> {
        self.entries.iter()
    }
}

impl From<BTreeMap<CompactString, Value>> for MapAdapter {
    fn from(entries: BTreeMap<CompactString, Value>) -> Self {
        Self {
            entries: Arc::new(entries),
        }
    }
}

impl<K: AsRef<str>> FromIterator<(K, Value)> for MapAdapter {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, value)| (key.as_ref().to_compact_string(), value))
            .collect::<BTreeMap<_, _>>();
        entries.into()
    }
}
