use serde::de::{self, DeserializeOwned, DeserializeSeed, EnumAccess, MapAccess, SeqAccess, VariantAccess, Visitor};
use serde::forward_to_deserialize_any;
use dbdoc::Value;
use std::collections::{btree_map, BTreeMap};

use crate::error::{Error, Result};

/// Deserializes from an owned `Value`. Documents are presented as maps, arrays as sequences.
pub struct Deserializer {
    value: Value,
}

impl Deserializer {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

pub fn from_value<T: DeserializeOwned>(value: Value) -> Result<T> {
    T::deserialize(Deserializer::new(value))
}

fn unexpected(expected: &'static str, found: &Value) -> Error {
    Error::UnexpectedType { expected, found: found.doc_type() }
}

macro_rules! deserialize_int {
    ($($method:ident => $visit:ident, $try_as:ident;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                visitor.$visit(self.value.$try_as()?)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for Deserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null        => visitor.visit_unit(),
            Value::Boolean(v)  => visitor.visit_bool(v),
            Value::Byte(v)     => visitor.visit_u8(v),
            Value::SByte(v)    => visitor.visit_i8(v),
            Value::Char(v)     => visitor.visit_char(v),
            Value::Int16(v)    => visitor.visit_i16(v),
            Value::UInt16(v)   => visitor.visit_u16(v),
            Value::Int32(v)    => visitor.visit_i32(v),
            Value::UInt32(v)   => visitor.visit_u32(v),
            Value::Int64(v)    => visitor.visit_i64(v),
            Value::UInt64(v)   => visitor.visit_u64(v),
            Value::Single(v)   => visitor.visit_f32(v),
            Value::Double(v)   => visitor.visit_f64(v),
            Value::VarInt(v)   => visitor.visit_u64(v.value()),
            Value::Decimal(v)  => {
                let v = Value::Decimal(v);
                if let Some(i) = v.as_i64() {
                    visitor.visit_i64(i)
                } else if let Some(u) = v.as_u64() {
                    visitor.visit_u64(u)
                } else {
                    visitor.visit_f64(v.try_as_f64()?)
                }
            },
            Value::DateTime(v) => visitor.visit_string(v.to_rfc3339()),
            Value::Guid(v)     => visitor.visit_string(v.to_string()),
            Value::String(v)   => visitor.visit_string(v),
            Value::Blob(v)     => visitor.visit_byte_buf(v),
            Value::Array(v)    => visit_array(v.into_vec(), visitor),
            Value::Document(v) => visit_document(v.into_map(), visitor),
        }
    }

    deserialize_int! {
        deserialize_i8 => visit_i8, try_as_i8;
        deserialize_i16 => visit_i16, try_as_i16;
        deserialize_i32 => visit_i32, try_as_i32;
        deserialize_i64 => visit_i64, try_as_i64;
        deserialize_u8 => visit_u8, try_as_u8;
        deserialize_u16 => visit_u16, try_as_u16;
        deserialize_u32 => visit_u32, try_as_u32;
        deserialize_u64 => visit_u64, try_as_u64;
    }

    fn deserialize_f32<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f32(self.value.try_as_f32()?)
    }

    fn deserialize_f64<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_f64(self.value.try_as_f64()?)
    }

    fn deserialize_char<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Char(c) => visitor.visit_char(c),
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => visitor.visit_char(c),
                    _ => Err(unexpected("Char", &Value::String(s))),
                }
            },
            other => Err(unexpected("Char", &other)),
        }
    }

    fn deserialize_option<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Null => visitor.visit_none(),
            _           => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.value {
            Value::String(variant) => visitor.visit_enum(EnumDeserializer { variant, value: Value::Null }),
            Value::Document(doc) if doc.len() == 1 => {
                match doc.into_map().into_iter().next() {
                    Some((variant, value)) => visitor.visit_enum(EnumDeserializer { variant, value }),
                    None => Err(Error::Message("empty enum document".to_string())),
                }
            },
            other => Err(unexpected("String or Document with a single key", &other)),
        }
    }

    forward_to_deserialize_any! {
        bool str string bytes byte_buf unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }

}

fn visit_array<'de, V: Visitor<'de>>(items: Vec<Value>, visitor: V) -> Result<V::Value> {
    let len = items.len();
    let mut seq = SeqDeserializer { iter: items.into_iter() };
    let value = visitor.visit_seq(&mut seq)?;
    match seq.iter.len() {
        0 => Ok(value),
        remaining => Err(de::Error::invalid_length(len - remaining, &"fewer elements in array")),
    }
}

fn visit_document<'de, V: Visitor<'de>>(fields: BTreeMap<String, Value>, visitor: V) -> Result<V::Value> {
    visitor.visit_map(MapDeserializer { iter: fields.into_iter(), value: None })
}

struct SeqDeserializer {
    iter: std::vec::IntoIter<Value>,
}

impl<'de> SeqAccess<'de> for SeqDeserializer {
    type Error = Error;

    fn next_element_seed<T: DeserializeSeed<'de>>(&mut self, seed: T) -> Result<Option<T::Value>> {
        match self.iter.next() {
            Some(value) => seed.deserialize(Deserializer::new(value)).map(Some),
            None        => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }

}

struct MapDeserializer {
    iter: btree_map::IntoIter<String, Value>,
    value: Option<Value>,
}

impl<'de> MapAccess<'de> for MapDeserializer {
    type Error = Error;

    fn next_key_seed<K: DeserializeSeed<'de>>(&mut self, seed: K) -> Result<Option<K::Value>> {
        match self.iter.next() {
            Some((key, value)) => {
                self.value = Some(value);
                seed.deserialize(KeyDeserializer { key }).map(Some)
            },
            None => Ok(None),
        }
    }

    fn next_value_seed<V: DeserializeSeed<'de>>(&mut self, seed: V) -> Result<V::Value> {
        match self.value.take() {
            Some(value) => seed.deserialize(Deserializer::new(value)),
            None        => Err(Error::Message("map value requested before its key".to_string())),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.iter.len())
    }

}

/// Document keys are always strings; maps with other key types get them parsed back.
struct KeyDeserializer {
    key: String,
}

macro_rules! deserialize_key {
    ($($method:ident => $visit:ident, $ty:ty;)*) => {
        $(
            fn $method<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
                match self.key.parse::<$ty>() {
                    Ok(v)  => visitor.$visit(v),
                    Err(_) => Err(Error::Key(self.key, stringify!($ty))),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for KeyDeserializer {
    type Error = Error;

    fn deserialize_any<V: Visitor<'de>>(self, visitor: V) -> Result<V::Value> {
        visitor.visit_string(self.key)
    }

    deserialize_key! {
        deserialize_bool => visit_bool, bool;
        deserialize_i8 => visit_i8, i8;
        deserialize_i16 => visit_i16, i16;
        deserialize_i32 => visit_i32, i32;
        deserialize_i64 => visit_i64, i64;
        deserialize_u8 => visit_u8, u8;
        deserialize_u16 => visit_u16, u16;
        deserialize_u32 => visit_u32, u32;
        deserialize_u64 => visit_u64, u64;
        deserialize_char => visit_char, char;
    }

    fn deserialize_newtype_struct<V: Visitor<'de>>(self, _name: &'static str, visitor: V) -> Result<V::Value> {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V: Visitor<'de>>(self, _name: &'static str, _variants: &'static [&'static str], visitor: V) -> Result<V::Value> {
        visitor.visit_enum(EnumDeserializer { variant: self.key, value: Value::Null })
    }

    forward_to_deserialize_any! {
        f32 f64 str string bytes byte_buf option unit unit_struct seq tuple tuple_struct map struct identifier ignored_any
    }

}

struct EnumDeserializer {
    variant: String,
    value: Value,
}

impl<'de> EnumAccess<'de> for EnumDeserializer {
    type Error = Error;
    type Variant = VariantDeserializer;

    fn variant_seed<V: DeserializeSeed<'de>>(self, seed: V) -> Result<(V::Value, Self::Variant)> {
        let variant = seed.deserialize(KeyDeserializer { key: self.variant })?;
        Ok((variant, VariantDeserializer { value: self.value }))
    }
}

struct VariantDeserializer {
    value: Value,
}

impl<'de> VariantAccess<'de> for VariantDeserializer {
    type Error = Error;

    fn unit_variant(self) -> Result<()> {
        match self.value {
            Value::Null => Ok(()),
            other       => Err(unexpected("Null", &other)),
        }
    }

    fn newtype_variant_seed<T: DeserializeSeed<'de>>(self, seed: T) -> Result<T::Value> {
        seed.deserialize(Deserializer::new(self.value))
    }

    fn tuple_variant<V: Visitor<'de>>(self, _len: usize, visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Array(items) => visit_array(items.into_vec(), visitor),
            other               => Err(unexpected("Array", &other)),
        }
    }

    fn struct_variant<V: Visitor<'de>>(self, _fields: &'static [&'static str], visitor: V) -> Result<V::Value> {
        match self.value {
            Value::Document(doc) => visit_document(doc.into_map(), visitor),
            other                => Err(unexpected("Document", &other)),
        }
    }

}
