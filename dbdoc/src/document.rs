use crate::serial_type::SerialType;
use crate::types::DocType;
use crate::value::Value;
use crate::varint::VarInt;
use std::collections::btree_map::{self, BTreeMap};

/// The key which is surfaced first when iterating over a document.
pub const ID_KEY: &str = "_id";

/// A mapping of case-sensitive keys to values.
///
/// Iteration yields the `_id` key first, if present, and all other keys in ordinal order. Like [`Array`], a
/// document caches its encoded payload length until a mutator invalidates it.
///
/// [`Array`]: crate::Array
#[derive(Debug, Clone, Default)]
pub struct Document {
    fields: BTreeMap<String, Value>,
    bytes_count: Option<usize>,
}

impl Document {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.invalidate();
        self.fields.get_mut(key)
    }

    /// Sets `key` and returns the previous value, if any.
    pub fn insert<K: Into<String>, V: Into<Value>>(&mut self, key: K, value: V) -> Option<Value> {
        self.invalidate();
        self.fields.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.invalidate();
        self.fields.remove(key)
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            id: self.fields.get_key_value(ID_KEY),
            rest: self.fields.iter(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|(_, v)| v)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.fields
    }

    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.fields
    }

    /// Returns the payload length assuming string keys in UTF-8: the key mode byte followed by a length-tagged key
    /// and the encoded value per entry.
    pub fn bytes_count(&mut self, recalc: bool) -> usize {
        match self.bytes_count {
            Some(count) if !recalc => count,
            _ => {
                let count = self.compute_bytes_count();
                self.bytes_count = Some(count);
                count
            },
        }
    }

    pub fn refresh_bytes_count(&mut self) -> usize {
        self.fields.values_mut().for_each(|v| { v.refresh_bytes_count(); });
        self.bytes_count(true)
    }

    pub fn cached_bytes_count(&self) -> Option<usize> {
        self.bytes_count
    }

    pub fn invalidate(&mut self) {
        self.bytes_count = None;
    }

    pub(crate) fn payload_len(&self) -> usize {
        self.bytes_count.unwrap_or_else(|| self.compute_bytes_count())
    }

    fn compute_bytes_count(&self) -> usize {
        1 + self.fields.iter().map(|(k, v)| key_len(k) + v.encoded_len()).sum::<usize>()
    }

}

fn key_len(key: &str) -> usize {
    SerialType::variable(DocType::String, key.len())
        .and_then(|st| st.size())
        .unwrap_or(VarInt::MAX_SIZE) + key.len()
}

/// Iterator over the entries of a [`Document`], `_id` first.
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    id: Option<(&'a String, &'a Value)>,
    rest: btree_map::Iter<'a, String, Value>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a String, &'a Value);

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(entry) = self.id.take() {
            return Some(entry);
        }
        self.rest.by_ref().find(|(k, _)| k.as_str() != ID_KEY)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = (&'a String, &'a Value);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl From<BTreeMap<String, Value>> for Document {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Document { fields, bytes_count: None }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Document {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Document::from(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect::<BTreeMap<_, _>>())
    }
}
