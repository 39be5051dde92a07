//! Conveniently serialize and deserialize your Rust data structures into `dbdoc` values and frames.
//!
//! Serialization happens in two steps: the data structure is first turned into a [`dbdoc::Value`] tree which is then
//! encoded by the [`dbdoc::Encoder`]. This allows inspecting the tree before encoding it, for example to infer a
//! [`SchemaElement`] from it. Structs and maps become documents, sequences and tuples become arrays. Unit variants are
//! written as strings while variants carrying data become documents with the variant name as their only key.
//!
//! # Examples
//!
//! ```
//! use serde::{Deserialize, Serialize};
//! use dbdoc::{SchemaElement, Value};
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub enum Species {
//!     PrionailurusViverrinus,
//!     LynxLynx,
//!     FelisCatus,
//! }
//!
//! #[derive(Serialize, Deserialize, PartialEq, Debug)]
//! pub struct Cat {
//!     name: String,
//!     species: Species,
//! }
//!
//! let cats = vec![
//!     Cat { name: "Jessica".to_string(), species: Species::PrionailurusViverrinus },
//!     Cat { name: "Wantan".to_string(), species: Species::LynxLynx },
//!     Cat { name: "Sphinx".to_string(), species: Species::FelisCatus },
//!     Cat { name: "Chandra".to_string(), species: Species::PrionailurusViverrinus },
//! ];
//!
//! let value = dbdoc_serde::to_value(&cats).unwrap();
//! assert_eq!(value.at(1).unwrap().get("species").unwrap(), Some(&Value::from("LynxLynx")));
//!
//! let bytes = dbdoc_serde::to_bytes(&cats).unwrap();
//! let deserialized: Vec<Cat> = dbdoc_serde::from_bytes(&bytes).unwrap();
//! assert_eq!(cats, deserialized);
//!
//! // A list of uniform records can carry its schema, which replaces every key with a small attribute id
//! let schema = SchemaElement::parse(&value).unwrap();
//! assert!(schema.is_tabular());
//! let bytes = dbdoc_serde::to_bytes_with_schema(&cats, &schema).unwrap();
//! let deserialized: Vec<Cat> = dbdoc_serde::from_bytes(&bytes).unwrap();
//! assert_eq!(cats, deserialized);
//! ```

mod de;
mod error;
mod ser;

use dbdoc::{Decoder, Encoder, SchemaElement};
use serde::{de::DeserializeOwned, Serialize};

pub use de::{from_value, Deserializer};
pub use error::{Error, Result};
pub use ser::{to_value, Serializer};

/// Serializes `value` into a frame without schema.
pub fn to_bytes<T: ?Sized + Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(Encoder::encode(&to_value(value)?, None)?)
}

/// Serializes `value` into a frame carrying `schema`. Fails if the value does not conform to it.
pub fn to_bytes_with_schema<T: ?Sized + Serialize>(value: &T, schema: &SchemaElement) -> Result<Vec<u8>> {
    Ok(Encoder::encode(&to_value(value)?, Some(schema))?)
}

/// Deserializes a frame, with or without embedded schema.
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    from_value(Decoder::decode(bytes)?)
}

#[cfg(test)]
mod tests {
    use serde::{Serialize, Deserialize};
    use std::collections::HashMap;
    use dbdoc::{DocType, Document, EncodeError, SchemaElement, Value};
    use super::{to_bytes, to_bytes_with_schema, from_bytes, to_value, from_value, Error};

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    enum Enum {
        UnitVariant,
        NewtypeVariant(bool),
        TupleVariant(f32, f32),
        StructVariant{ a: usize, b: usize, c: usize },
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Struct {
        field: u8,
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct UnitStruct;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct NewtypeStruct(String);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct TupleStruct(char, char, char);

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Test {
        bool: bool,
        i8: i8,
        i16: i16,
        i32: i32,
        i64: i64,
        u8: u8,
        u16: u16,
        u32: u32,
        u64: u64,
        f32: f32,
        f64: f64,
        char: char,
        str: String,
        #[serde(with = "serde_bytes")]
        bytes: Vec<u8>,
        none: Option<u8>,
        some: Option<u8>,
        unit: (),
        unit_struct: UnitStruct,
        newtype_struct: NewtypeStruct,
        tuple_struct: TupleStruct,
        seq: Vec<String>,
        tuple: (u16, u16, u16),
        map: HashMap<usize, String>,
        r#struct: Struct,
        unit_variant: Enum,
        newtype_variant: Enum,
        tuple_variant: Enum,
        struct_variant: Enum,
    }

    fn message() -> Test {
        Test {
            bool: true,
            i8: -1,
            i16: -20,
            i32: -7000,
            i64: i64::MIN,
            u8: 1,
            u16: 20,
            u32: 7000,
            u64: u64::MAX,
            f32: 1337.8472,
            f64: 1337.8472,
            char: 'x',
            str: "Test".to_string(),
            bytes: vec![0xdb, 0x64, 0x1c, 0x64, 0x1b, 0x61, 0x1b, 0x62, 0xdb],
            none: None,
            some: Some(0),
            unit: (),
            unit_struct: UnitStruct,
            newtype_struct: NewtypeStruct("Qapla'".to_string()),
            tuple_struct: TupleStruct('ä', 'ß', '€'),
            seq: vec![
                "Elen".to_string(),
                "síla".to_string(),
                "lúmenn'".to_string(),
                "omentielvo".to_string(),
            ],
            tuple: (0, 0, 0),
            map: [
                (1701, "Enterprise".to_string()),
                (74656, "Voyager".to_string())
            ].into_iter().collect(),
            r#struct: Struct {
                field: 42,
            },
            unit_variant: Enum::UnitVariant,
            newtype_variant: Enum::NewtypeVariant(false),
            tuple_variant: Enum::TupleVariant(1.0, 0.999),
            struct_variant: Enum::StructVariant {
                a: 255,
                b: 0,
                c: 33,
            }
        }
    }

    #[test]
    fn roundtrip() {
        let message = message();
        let bytes = to_bytes(&message).unwrap();
        assert_eq!(message, from_bytes::<Test>(&bytes).unwrap());
    }

    #[test]
    fn value_shape() {
        let value = to_value(&message()).unwrap();
        assert_eq!(value.doc_type(), DocType::Document);
        assert_eq!(value.get("i64").unwrap(), Some(&Value::Int64(i64::MIN)));
        assert_eq!(value.get("u64").unwrap(), Some(&Value::UInt64(u64::MAX)));
        assert_eq!(value.get("f32").unwrap(), Some(&Value::Single(1337.8472)));
        assert_eq!(value.get("bytes").unwrap().unwrap().doc_type(), DocType::Blob);
        assert_eq!(value.get("none").unwrap(), Some(&Value::Null));
        assert_eq!(value.get("unit_struct").unwrap(), Some(&Value::Null));
        assert_eq!(value.get("newtype_struct").unwrap(), Some(&Value::from("Qapla'")));
        assert_eq!(value.get("tuple").unwrap().unwrap().as_array().unwrap().len(), 3);
        assert_eq!(value.get("unit_variant").unwrap(), Some(&Value::from("UnitVariant")));
        let map = value.get("map").unwrap().unwrap();
        assert_eq!(map.get("1701").unwrap(), Some(&Value::from("Enterprise")));
        let variant = value.get("tuple_variant").unwrap().unwrap().as_document().unwrap();
        assert_eq!(variant.len(), 1);
        assert_eq!(variant.get("TupleVariant").unwrap().doc_type(), DocType::Array);
    }

    #[test]
    fn numbers_convert_when_exact() {
        assert_eq!(from_value::<u8>(Value::Int64(200)).unwrap(), 200);
        assert_eq!(from_value::<i32>(Value::Double(-3.0)).unwrap(), -3);
        assert_eq!(from_value::<f64>(Value::Int32(7)).unwrap(), 7.0);
        assert!(matches!(from_value::<u8>(Value::Int32(256)), Err(Error::Value(_))));
        assert!(matches!(from_value::<i16>(Value::Double(0.5)), Err(Error::Value(_))));
        assert!(matches!(from_value::<u32>(Value::from("1")), Err(Error::Value(_))));
    }

    #[test]
    fn non_string_keys() {
        let mut map = HashMap::new();
        map.insert(vec![1u8], 1u8);
        assert!(matches!(to_value(&map), Err(Error::KeyType)));

        let mut doc = Document::new();
        doc.insert("one", "x");
        let parsed: Result<HashMap<u32, String>, _> = from_value(Value::from(doc));
        assert!(matches!(parsed, Err(Error::Key(..))));
    }

    #[test]
    fn enum_shapes() {
        let mut doc = Document::new();
        doc.insert("a", 1);
        doc.insert("b", 2);
        assert!(matches!(from_value::<Enum>(Value::from(doc)), Err(Error::UnexpectedType { .. })));
        assert!(matches!(from_value::<Enum>(Value::Int32(0)), Err(Error::UnexpectedType { .. })));
        assert_eq!(from_value::<Enum>(Value::from("UnitVariant")).unwrap(), Enum::UnitVariant);
    }

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Row {
        identifier: u32,
        description: String,
        is_active: bool,
    }

    #[test]
    fn rows_with_schema() {
        let rows: Vec<Row> = (0..100).map(|i| Row {
            identifier: i,
            description: format!("row number {}", i),
            is_active: i % 3 == 0,
        }).collect();
        let schema = SchemaElement::parse(&to_value(&rows).unwrap()).unwrap();
        let plain = to_bytes(&rows).unwrap();
        let compact = to_bytes_with_schema(&rows, &schema).unwrap();
        assert!(compact.len() < plain.len());
        assert_eq!(rows, from_bytes::<Vec<Row>>(&compact).unwrap());
        assert_eq!(rows, from_bytes::<Vec<Row>>(&plain).unwrap());
    }

    #[test]
    fn schema_violation() {
        let schema = SchemaElement::parse(&to_value(&vec![1u32, 2]).unwrap()).unwrap();
        assert!(matches!(
            to_bytes_with_schema(&vec!["a", "b"], &schema),
            Err(Error::Encode(EncodeError::Schema(_)))
        ));
    }

    #[test]
    fn truncated_frame() {
        let bytes = to_bytes(&message()).unwrap();
        assert!(matches!(from_bytes::<Test>(&bytes[..bytes.len() - 1]), Err(Error::Decode(_))));
    }
}
