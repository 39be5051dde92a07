use crate::error::ValueError;
use crate::value::Value;

/// An ordered sequence of values.
///
/// The encoded payload length is cached once computed. Every mutator visibly drops the cache through
/// [`invalidate`](Array::invalidate); reading it again recomputes lazily.
#[derive(Debug, Clone, Default)]
pub struct Array {
    items: Vec<Value>,
    bytes_count: Option<usize>,
}

impl Array {

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Array { items: Vec::with_capacity(capacity), bytes_count: None }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Value> {
        self.invalidate();
        self.items.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    pub fn push<V: Into<Value>>(&mut self, value: V) {
        self.invalidate();
        self.items.push(value.into());
    }

    /// Replaces the element at `index` and returns the previous one.
    pub fn set<V: Into<Value>>(&mut self, index: usize, value: V) -> Result<Value, ValueError> {
        let len = self.items.len();
        let slot = self.items.get_mut(index).ok_or(ValueError::OutOfRange { index, len })?;
        let old = std::mem::replace(slot, value.into());
        self.invalidate();
        Ok(old)
    }

    pub fn insert<V: Into<Value>>(&mut self, index: usize, value: V) -> Result<(), ValueError> {
        if index > self.items.len() {
            return Err(ValueError::OutOfRange { index, len: self.items.len() });
        }
        self.invalidate();
        self.items.insert(index, value.into());
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Value, ValueError> {
        if index >= self.items.len() {
            return Err(ValueError::OutOfRange { index, len: self.items.len() });
        }
        self.invalidate();
        Ok(self.items.remove(index))
    }

    /// Returns the payload length, which is the sum of the encoded lengths of all elements. The cached count is used
    /// unless `recalc` is set or nothing is cached yet.
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

    /// Recomputes the cached counts of this array and of every container below it.
    pub fn refresh_bytes_count(&mut self) -> usize {
        self.items.iter_mut().for_each(|v| { v.refresh_bytes_count(); });
        self.bytes_count(true)
    }

    pub fn cached_bytes_count(&self) -> Option<usize> {
        self.bytes_count
    }

    pub fn invalidate(&mut self) {
        self.bytes_count = None;
    }

    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }

    /// Payload length without touching the cache of this array. Cached counts further down are used.
    pub(crate) fn payload_len(&self) -> usize {
        self.bytes_count.unwrap_or_else(|| self.compute_bytes_count())
    }

    fn compute_bytes_count(&self) -> usize {
        self.items.iter().map(Value::encoded_len).sum()
    }

}

impl From<Vec<Value>> for Array {
    fn from(items: Vec<Value>) -> Self {
        Array { items, bytes_count: None }
    }
}

impl<V: Into<Value>> FromIterator<V> for Array {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Array::from(iter.into_iter().map(Into::into).collect::<Vec<_>>())
    }
}

impl IntoIterator for Array {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a Array {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::Array;
    use crate::error::ValueError;
    use crate::value::Value;

    #[test]
    fn mutators() {
        let mut array: Array = vec![1, 2, 3].into_iter().collect();
        array.push(4);
        assert_eq!(4, array.len());
        assert_eq!(Value::Int32(2), array.set(1, 20).unwrap());
        array.insert(0, "zero").unwrap();
        assert_eq!(Value::from("zero"), array.remove(0).unwrap());
        assert_eq!(vec![Value::Int32(1), Value::Int32(20), Value::Int32(3), Value::Int32(4)], array.clone().into_vec());
        assert_eq!(Err(ValueError::OutOfRange { index: 4, len: 4 }), array.remove(4));
        assert_eq!(Err(ValueError::OutOfRange { index: 9, len: 4 }), array.set(9, 1));
        assert_eq!(Err(ValueError::OutOfRange { index: 5, len: 4 }), array.insert(5, 1));
        array.insert(4, 5).unwrap();
        assert_eq!(Some(&Value::Int32(5)), array.get(4));
    }

    #[test]
    fn cached_count() {
        let mut array: Array = vec![1i32, 2].into_iter().collect();
        assert_eq!(None, array.cached_bytes_count());
        // two Int32 elements, one tag byte and four payload bytes each
        assert_eq!(10, array.bytes_count(false));
        assert_eq!(Some(10), array.cached_bytes_count());
        array.push(3i16);
        assert_eq!(None, array.cached_bytes_count());
        assert_eq!(13, array.bytes_count(false));
        if let Some(v) = array.get_mut(0) {
            *v = Value::Null;
        }
        assert_eq!(9, array.bytes_count(false));
        array.invalidate();
        assert_eq!(None, array.cached_bytes_count());
    }

    #[test]
    fn refresh_is_recursive() {
        let inner: Array = vec!["ab", "c"].into_iter().collect();
        let mut outer = Array::new();
        outer.push(inner);
        assert_eq!(6, outer.refresh_bytes_count());
        match outer.get(0) {
            Some(Value::Array(inner)) => assert_eq!(Some(5), inner.cached_bytes_count()),
            other => panic!("unexpected {:?}", other),
        }
    }
}
