//! The frame codec. A frame is laid out as
//!
//! ```text
//! MAGIC SchemaFlag [SchemaDocument] Value MAGIC
//! ```
//!
//! where every value is a serial type followed by its payload. Arrays are followed by their items, documents by a
//! key mode byte and their entries. Keys are either length-tagged strings or, if a document schema is in scope,
//! `Int16` attribute ids.

use crate::array::Array;
use crate::buffer::Buffer;
use crate::document::Document;
use crate::error::{DecodeError, DecoderError, EncodeError};
use crate::options::Options;
use crate::schema::SchemaElement;
use crate::serial_type::SerialType;
use crate::types::DocType;
use crate::value::Value;
use log::{debug, trace};

/// Opens and closes every frame
pub const MAGIC: u8 = 0xDB;
const NO_SCHEMA: u8 = 0x64;
const WITH_SCHEMA: u8 = 0x65;
const STRING_KEYS: u8 = 100;
const ID_KEYS: u8 = 101;

/// Used to encode values into frames.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    options: Options,
}

impl Encoder {

    pub fn new(options: Options) -> Self {
        Encoder { options }
    }

    /// Encodes `value` with default options.
    pub fn encode(value: &Value, schema: Option<&SchemaElement>) -> Result<Vec<u8>, EncodeError> {
        Encoder::default().serialize(value, schema)
    }

    /// Encodes `value` into a new frame. If a schema is given, the value is validated against it first and the
    /// schema is embedded so that document keys can be written as attribute ids.
    pub fn serialize(&self, value: &Value, schema: Option<&SchemaElement>) -> Result<Vec<u8>, EncodeError> {
        let schema_doc = match schema {
            Some(s) => {
                s.validate(value)?;
                Some(Value::Document(s.to_document()))
            },
            None => None,
        };
        let capacity = 3 + value.encoded_len() + schema_doc.as_ref().map(Value::encoded_len).unwrap_or_default();
        let mut writer = Writer { buf: Buffer::with_capacity(capacity), options: self.options, depth: 0 };
        writer.buf.write_u8(MAGIC)?;
        match &schema_doc {
            Some(doc) => {
                writer.buf.write_u8(WITH_SCHEMA)?;
                writer.write_value(doc, None)?;
            },
            None => { writer.buf.write_u8(NO_SCHEMA)?; },
        }
        writer.write_value(value, schema)?;
        writer.buf.write_u8(MAGIC)?;
        debug!("Encoded {} into {} bytes, schema {}", value.doc_type(), writer.buf.len(),
            if schema.is_some() { "embedded" } else { "absent" });
        Ok(writer.buf.into_inner())
    }

}

struct Writer {
    buf: Buffer,
    options: Options,
    depth: usize,
}

impl Writer {

    fn write_value(&mut self, value: &Value, schema: Option<&SchemaElement>) -> Result<usize, EncodeError> {
        match value {
            Value::String(s)   => self.write_text(s),
            Value::Array(a)    => self.write_array(a, schema),
            Value::Document(d) => self.write_document(d, schema),
            scalar             => {
                let c = self.write_tag(scalar.serial_type()?)?;
                Ok(c + self.buf.write_value(scalar, self.options.text_encoding)?)
            },
        }
    }

    /// Strings are encoded up front since the tag announces the encoded length.
    fn write_text(&mut self, s: &str) -> Result<usize, EncodeError> {
        let bytes = self.options.text_encoding.encode(s)?;
        let c = self.write_tag(SerialType::variable(DocType::String, bytes.len())?)?;
        Ok(c + self.buf.write_bytes(&bytes)?)
    }

    fn write_array(&mut self, array: &Array, schema: Option<&SchemaElement>) -> Result<usize, EncodeError> {
        self.descend()?;
        trace!("Encoding array of {} items", array.len());
        let mut c = self.write_tag(SerialType::variable(DocType::Array, array.len())?)?;
        let element = schema.and_then(SchemaElement::element);
        for item in array.iter() {
            c += self.write_value(item, element)?;
        }
        self.depth -= 1;
        Ok(c)
    }

    fn write_document(&mut self, doc: &Document, schema: Option<&SchemaElement>) -> Result<usize, EncodeError> {
        self.descend()?;
        let schema = schema.filter(|s| s.doc_type() == DocType::Document);
        trace!("Encoding document of {} entries with {} keys", doc.len(), if schema.is_some() { "id" } else { "string" });
        let mut c = self.write_tag(SerialType::variable(DocType::Document, doc.len())?)?;
        c += self.buf.write_u8(if schema.is_some() { ID_KEYS } else { STRING_KEYS })?;
        for (key, value) in doc.iter() {
            match schema {
                Some(s) => {
                    let attribute = s.attribute_by_name(key).ok_or_else(|| EncodeError::UnknownAttribute(key.clone()))?;
                    c += self.write_value(&Value::Int16(attribute.id()), None)?;
                    c += self.write_value(value, Some(attribute.element()))?;
                },
                None => {
                    c += self.write_text(key)?;
                    c += self.write_value(value, None)?;
                },
            }
        }
        self.depth -= 1;
        Ok(c)
    }

    fn write_tag(&mut self, serial_type: SerialType) -> Result<usize, EncodeError> {
        self.buf.write_varint(serial_type.value()?)
    }

    fn descend(&mut self) -> Result<(), EncodeError> {
        self.depth += 1;
        match self.options.max_depth {
            Some(max) if self.depth > max => Err(EncodeError::Depth(max)),
            _                             => Ok(()),
        }
    }

}

/// Used to decode frames into values.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    options: Options,
}

impl Decoder {

    pub fn new(options: Options) -> Self {
        Decoder { options }
    }

    /// Decodes a frame with default options and discards the embedded schema.
    pub fn decode<B: ?Sized + AsRef<[u8]>>(buf: &B) -> Result<Value, DecoderError> {
        Decoder::default().deserialize(buf).map(|(value, _)| value)
    }

    /// Decodes a frame which has to span all of `buf`. Returns the value and the embedded schema, if any. The value
    /// is not validated against the schema.
    pub fn deserialize<B: ?Sized + AsRef<[u8]>>(&self, buf: &B) -> Result<(Value, Option<SchemaElement>), DecoderError> {
        let mut reader = Reader { buf: Buffer::from_bytes(buf.as_ref().to_vec()), options: self.options, depth: 0 };
        let frame = reader.read_frame().map_err(|e| e.at(reader.buf.position()))?;
        debug!("Decoded {} from {} bytes, schema {}", frame.0.doc_type(), reader.buf.len(),
            if frame.1.is_some() { "embedded" } else { "absent" });
        Ok(frame)
    }

}

struct Reader {
    buf: Buffer,
    options: Options,
    depth: usize,
}

impl Reader {

    fn read_frame(&mut self) -> Result<(Value, Option<SchemaElement>), DecodeError> {
        self.read_magic()?;
        let schema = match self.buf.read_u8()? {
            NO_SCHEMA   => None,
            WITH_SCHEMA => match self.read_value(None)? {
                Value::Document(doc) => Some(SchemaElement::from_document(&doc)?),
                other => return Err(DecodeError::UnexpectedType { expected: "schema document", found: other.doc_type() }),
            },
            flag        => return Err(DecodeError::SchemaFlag(flag)),
        };
        let value = self.read_value(schema.as_ref())?;
        self.read_magic()?;
        match self.buf.remaining() {
            0 => Ok((value, schema)),
            n => Err(DecodeError::Trailing(n)),
        }
    }

    fn read_magic(&mut self) -> Result<(), DecodeError> {
        match self.buf.read_u8()? {
            MAGIC => Ok(()),
            b     => Err(DecodeError::Magic(b)),
        }
    }

    fn read_value(&mut self, schema: Option<&SchemaElement>) -> Result<Value, DecodeError> {
        let serial_type = SerialType::from_value(self.buf.read_varint()?)?;
        match (serial_type.doc_type(), serial_type.length()) {
            (DocType::Array, Some(len))    => self.read_array(len, schema),
            (DocType::Document, Some(len)) => self.read_document(len, schema),
            (doc_type, length)             => self.buf.read_value(doc_type, length, self.options.text_encoding),
        }
    }

    fn read_array(&mut self, len: usize, schema: Option<&SchemaElement>) -> Result<Value, DecodeError> {
        self.descend()?;
        trace!("Decoding array of {} items", len);
        let element = schema.and_then(SchemaElement::element);
        // every item takes at least one byte
        let mut items = Array::with_capacity(len.min(self.buf.remaining()));
        for _ in 0..len {
            items.push(self.read_value(element)?);
        }
        self.depth -= 1;
        Ok(Value::Array(items))
    }

    fn read_document(&mut self, len: usize, schema: Option<&SchemaElement>) -> Result<Value, DecodeError> {
        self.descend()?;
        let schema = schema.filter(|s| s.doc_type() == DocType::Document);
        let mode = self.buf.read_u8()?;
        trace!("Decoding document of {} entries with key mode {}", len, mode);
        let ids = match (mode, schema) {
            (STRING_KEYS, _)   => None,
            (ID_KEYS, Some(s)) => Some(s),
            (ID_KEYS, None)    => return Err(DecodeError::MissingSchema),
            (m, _)             => return Err(DecodeError::KeyMode(m)),
        };
        let mut doc = Document::new();
        for _ in 0..len {
            let (key, element) = match ids {
                Some(s) => {
                    let id = match self.read_value(None)? {
                        Value::Int16(id) => id,
                        other => return Err(DecodeError::UnexpectedType { expected: "Int16 attribute id", found: other.doc_type() }),
                    };
                    let attribute = s.attribute_by_id(id).ok_or(DecodeError::UnknownAttribute(id))?;
                    (attribute.name().to_string(), Some(attribute.element()))
                },
                None => {
                    let key = self.read_key()?;
                    let element = schema.and_then(|s| s.attribute_by_name(&key)).map(|a| a.element());
                    (key, element)
                },
            };
            let value = self.read_value(element)?;
            if doc.contains_key(&key) {
                return Err(DecodeError::DuplicateKey(key));
            }
            doc.insert(key, value);
        }
        self.depth -= 1;
        Ok(Value::Document(doc))
    }

    fn read_key(&mut self) -> Result<String, DecodeError> {
        let serial_type = SerialType::from_value(self.buf.read_varint()?)?;
        match (serial_type.doc_type(), serial_type.length()) {
            (DocType::String, Some(len)) => self.buf.read_string(len, self.options.text_encoding),
            (found, _) => Err(DecodeError::UnexpectedType { expected: "String key", found }),
        }
    }

    fn descend(&mut self) -> Result<(), DecodeError> {
        self.depth += 1;
        match self.options.max_depth {
            Some(max) if self.depth > max => Err(DecodeError::Depth(max)),
            _                             => Ok(()),
        }
    }

}

#[cfg(test)]
mod tests {
    use super::{Decoder, Encoder, MAGIC};
    use crate::buffer::TextEncoding;
    use crate::document::Document;
    use crate::error::{DecodeError, EncodeError, SchemaErrorKind};
    use crate::options::Options;
    use crate::schema::{SchemaAttribute, SchemaElement};
    use crate::types::DocType;
    use crate::value::Value;
    use crate::varint::VarInt;
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use uuid::Uuid;

    fn person() -> Document {
        let mut doc = Document::new();
        doc.insert("Name", "FooBar");
        doc.insert("Age", 123);
        doc.insert("DoB", Utc.with_ymd_and_hms(1984, 3, 1, 13, 37, 0).unwrap());
        doc
    }

    fn assert_roundtrip(value: Value) {
        let bytes = Encoder::encode(&value, None).unwrap();
        assert_eq!(MAGIC, bytes[0]);
        assert_eq!(MAGIC, bytes[bytes.len() - 1]);
        assert_eq!(value.encoded_len() + 3, bytes.len());
        let decoded = Decoder::decode(&bytes).unwrap();
        assert_eq!(value.doc_type(), decoded.doc_type());
        assert_eq!(value, decoded);
    }

    #[test]
    fn scalars() {
        let values = vec![
            Value::Null,
            Value::Boolean(true),
            Value::Boolean(false),
            Value::Byte(255),
            Value::SByte(-128),
            Value::Char('ä'),
            Value::Decimal(Decimal::from_str("-1234.5678").unwrap()),
            Value::Double(std::f64::consts::PI),
            Value::Single(-0.5),
            Value::Int16(i16::MIN),
            Value::UInt16(u16::MAX),
            Value::Int32(-123456),
            Value::UInt32(123456),
            Value::Int64(i64::MAX),
            Value::UInt64(u64::MAX),
            Value::DateTime(Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap()),
            Value::Guid(Uuid::from_u128(0x0123_4567_89ab_cdef_0123_4567_89ab_cdef)),
            Value::Blob(vec![0, 1, 2, 255]),
            Value::Blob(vec![]),
            Value::String("".to_string()),
            Value::String("Üben von Xylophon und Querflöte ist ja zweckmäßig.".to_string()),
            Value::VarInt(VarInt::new(0).unwrap()),
            Value::VarInt(VarInt::new(VarInt::MAX).unwrap()),
        ];
        for value in values {
            assert_roundtrip(value);
        }
    }

    #[test]
    fn integers_step() {
        for i in (i64::MIN..i64::MAX).step_by(1_844_674_407_370_955) {
            assert_roundtrip(Value::Int64(i));
        }
        for i in (0..u32::MAX).step_by(42_949_673) {
            assert_roundtrip(Value::UInt32(i));
        }
    }

    #[test]
    fn known_bytes() {
        assert_eq!(vec![0xdb, 0x64, 0x0a, 0x01, 0x00, 0x00, 0x00, 0xdb], Encoder::encode(&Value::Int32(1), None).unwrap());
        let mut doc = Document::new();
        doc.insert("a", "b");
        assert_eq!(
            vec![0xdb, 0x64, 0x1c, 0x64, 0x1b, b'a', 0x1b, b'b', 0xdb],
            Encoder::encode(&Value::from(doc), None).unwrap()
        );
    }

    #[test]
    fn document_without_schema() {
        let doc = Value::from(person());
        let bytes = Encoder::encode(&doc, None).unwrap();
        assert_eq!(&[0xdb, 0x64, 0x26, 0x64], &bytes[..4]);
        let (decoded, schema) = Decoder::default().deserialize(&bytes).unwrap();
        assert!(schema.is_none());
        assert_eq!(DocType::Document, decoded.doc_type());
        let (a, b) = (doc.as_document().unwrap(), decoded.as_document().unwrap());
        assert!(a.keys().eq(b.keys()));
        for (key, value) in a.iter() {
            assert_eq!(Some(value), b.get(key));
            assert_eq!(value.doc_type(), b.get(key).unwrap().doc_type());
        }
        assert_eq!(doc, decoded);
    }

    #[test]
    fn nested() {
        let mut inner = Document::new();
        inner.insert("_id", Uuid::nil());
        inner.insert("list", vec![Value::Null, Value::from(vec![Value::Int32(1)]), Value::from(Document::new())]);
        let mut outer = person();
        outer.insert("inner", inner);
        outer.insert("empty", Vec::<Value>::new());
        assert_roundtrip(Value::from(outer));
    }

    #[test]
    fn long_containers() {
        let array: Vec<Value> = (0..1000).map(|i| Value::from(format!("item {}", i))).collect();
        assert_roundtrip(Value::from(array));
        let doc: Document = (0..300).map(|i| (format!("key {}", i), i as i64)).collect();
        assert_roundtrip(Value::from(doc));
    }

    #[test]
    fn tabular_with_schema() {
        let _ = env_logger::builder().is_test(true).try_init();
        let rows = Value::from(vec![Value::from(person()); 100]);
        let schema = SchemaElement::parse(&rows).unwrap();
        assert!(schema.is_tabular());

        let with = Encoder::encode(&rows, Some(&schema)).unwrap();
        let without = Encoder::encode(&rows, None).unwrap();
        assert_eq!(0x65, with[1]);
        assert!(with.len() < without.len());

        let (decoded, embedded) = Decoder::default().deserialize(&with).unwrap();
        assert_eq!(Some(schema), embedded);
        let decoded = decoded.as_array().unwrap();
        assert_eq!(100, decoded.len());
        for row in decoded.iter() {
            assert_eq!(&Value::from(person()), row);
        }
        assert_eq!(Decoder::decode(&without).unwrap(), Decoder::decode(&with).unwrap());
    }

    #[test]
    fn schema_for_scalars() {
        let schema = SchemaElement::new(DocType::Int32, true).unwrap();
        let bytes = Encoder::encode(&Value::Null, Some(&schema)).unwrap();
        let (value, embedded) = Decoder::default().deserialize(&bytes).unwrap();
        assert_eq!(Value::Null, value);
        assert_eq!(Some(schema), embedded);
    }

    #[test]
    fn schema_violation_fails_encoding() {
        let schema = SchemaElement::new(DocType::Int32, false).unwrap();
        match Encoder::encode(&Value::Null, Some(&schema)) {
            Err(EncodeError::Schema(e)) => assert_eq!(SchemaErrorKind::Null, e.kind),
            other => panic!("unexpected {:?}", other),
        }
        let mut doc = person();
        doc.remove("Name");
        let schema = SchemaElement::parse(&Value::from(person())).unwrap();
        assert!(matches!(Encoder::encode(&Value::from(doc), Some(&schema)), Err(EncodeError::Schema(_))));
    }

    #[test]
    fn text_encodings() {
        let mut doc = Document::new();
        doc.insert("Schlüssel", "Grüße");
        doc.insert("list", vec![Value::from("ÄÖÜ")]);
        let value = Value::from(doc);
        for encoding in [TextEncoding::Utf8, TextEncoding::Utf16, TextEncoding::Latin1] {
            let options = Options::default().with_text_encoding(encoding);
            let bytes = Encoder::new(options).serialize(&value, None).unwrap();
            let (decoded, _) = Decoder::new(options).deserialize(&bytes).unwrap();
            assert_eq!(value, decoded);
        }
        let options = Options::default().with_text_encoding(TextEncoding::Latin1);
        assert_eq!(Err(EncodeError::Latin1('€')), Encoder::new(options).serialize(&Value::from("5€"), None));
    }

    #[test]
    fn attribute_ids_inside_arrays_with_text_encodings() {
        let row = |i: i32| {
            let mut doc = Document::new();
            doc.insert("Größe", i);
            doc.insert("Straße", format!("Weg {}", i));
            Value::from(doc)
        };
        let mut outer = Document::new();
        outer.insert("Überschrift", "Maße");
        outer.insert("Zeilen", (0..20).map(row).collect::<Vec<_>>());
        let value = Value::from(outer);
        let schema = SchemaElement::parse(&value).unwrap();
        let rows = schema.attribute_by_name("Zeilen").unwrap().element();
        assert!(rows.is_tabular());

        for encoding in [TextEncoding::Utf8, TextEncoding::Utf16, TextEncoding::Latin1] {
            let options = Options::default().with_text_encoding(encoding);
            let with = Encoder::new(options).serialize(&value, Some(&schema)).unwrap();
            let without = Encoder::new(options).serialize(&value, None).unwrap();
            assert_eq!(0x65, with[1]);
            assert!(with.len() < without.len());
            let (decoded, embedded) = Decoder::new(options).deserialize(&with).unwrap();
            assert_eq!(value, decoded);
            assert_eq!(Some(&schema), embedded.as_ref());
            let row = decoded.get("Zeilen").unwrap().unwrap().at(7).unwrap();
            assert_eq!(Some("Weg 7"), row.get("Straße").unwrap().unwrap().as_str());
        }
    }

    #[test]
    fn mixed_arrays_with_schema() {
        let mut inner = Document::new();
        inner.insert("k", "v");
        let mut doc = person();
        doc.insert("Mixed", vec![Value::Int32(1), Value::from("x"), Value::Null, Value::from(inner)]);
        let value = Value::from(vec![Value::from(doc.clone()), Value::from(doc)]);
        let schema = SchemaElement::parse(&value).unwrap();
        let bytes = Encoder::encode(&value, Some(&schema)).unwrap();
        let (decoded, embedded) = Decoder::default().deserialize(&bytes).unwrap();
        assert_eq!(value, decoded);
        assert_eq!(Some(schema), embedded);
    }

    #[test]
    fn max_depth() {
        let options = Options::default().with_max_depth(2);
        let ok = Value::from(vec![Value::from(vec![Value::Int32(1)])]);
        let deep = Value::from(vec![Value::from(vec![Value::from(Document::new())])]);
        let bytes = Encoder::new(options).serialize(&ok, None).unwrap();
        assert_eq!(ok, Decoder::new(options).deserialize(&bytes).unwrap().0);
        assert_eq!(Err(EncodeError::Depth(2)), Encoder::new(options).serialize(&deep, None));
        let bytes = Encoder::encode(&deep, None).unwrap();
        assert_eq!(DecodeError::Depth(2), Decoder::new(options).deserialize(&bytes).unwrap_err().into_inner());
    }

    #[test]
    fn frame_errors() {
        let good = Encoder::encode(&Value::Int32(1), None).unwrap();

        let mut bad = good.clone();
        bad[0] = 0;
        let e = Decoder::decode(&bad).unwrap_err();
        assert_eq!(1, e.position());
        assert_eq!(DecodeError::Magic(0), e.into_inner());

        let mut bad = good.clone();
        bad[1] = 0x66;
        assert_eq!(DecodeError::SchemaFlag(0x66), Decoder::decode(&bad).unwrap_err().into_inner());

        let mut bad = good.clone();
        bad[7] = 0xdc;
        assert_eq!(DecodeError::Magic(0xdc), Decoder::decode(&bad).unwrap_err().into_inner());

        let mut bad = good.clone();
        bad.push(0);
        assert_eq!(DecodeError::Trailing(1), Decoder::decode(&bad).unwrap_err().into_inner());

        for len in 0..good.len() {
            assert_eq!(DecodeError::Eof, Decoder::decode(&good[..len]).unwrap_err().into_inner());
        }

        let bad = [0xdb, 0x64, 0x10, 0xdb];
        assert!(matches!(Decoder::decode(&bad).unwrap_err().into_inner(), DecodeError::SerialType(_)));
    }

    #[test]
    fn document_errors() {
        // document of one entry with an unknown key mode
        let bad = [0xdb, 0x64, 0x1c, 0x63, 0x1b, b'a', 0x00, 0xdb];
        let e = Decoder::decode(&bad).unwrap_err();
        assert_eq!(DecodeError::KeyMode(0x63), e.into_inner());

        // id keys without a schema
        let bad = [0xdb, 0x64, 0x1c, 0x65, 0x08, 0x01, 0x00, 0x00, 0xdb];
        let e = Decoder::decode(&bad).unwrap_err();
        assert_eq!(4, e.position());
        assert_eq!(DecodeError::MissingSchema, e.into_inner());

        // the same key twice
        let bad = [0xdb, 0x64, 0x21, 0x64, 0x1b, b'a', 0x00, 0x1b, b'a', 0x00, 0xdb];
        assert_eq!(DecodeError::DuplicateKey("a".to_string()), Decoder::decode(&bad).unwrap_err().into_inner());

        // a key which is not a string
        let bad = [0xdb, 0x64, 0x1c, 0x64, 0x0a, 0x01, 0x00, 0x00, 0x00, 0x00, 0xdb];
        assert_eq!(
            DecodeError::UnexpectedType { expected: "String key", found: DocType::Int32 },
            Decoder::decode(&bad).unwrap_err().into_inner()
        );
    }

    #[test]
    fn unknown_attribute_id() {
        let schema = SchemaElement::document(vec![
            SchemaAttribute::new(1, "a", SchemaElement::new(DocType::Int32, false).unwrap()),
        ], false).unwrap();
        let schema_frame = Encoder::encode(&Value::from(schema.to_document()), None).unwrap();
        let mut bytes = vec![MAGIC, 0x65];
        bytes.extend_from_slice(&schema_frame[2..schema_frame.len() - 1]);
        bytes.extend_from_slice(&[0x1c, 0x65, 0x08, 0x02, 0x00, 0x0a, 0x01, 0x00, 0x00, 0x00, MAGIC]);
        assert_eq!(DecodeError::UnknownAttribute(2), Decoder::decode(&bytes).unwrap_err().into_inner());

        let len = bytes.len();
        bytes[len - 8] = 0x01;
        let (value, _) = Decoder::default().deserialize(&bytes).unwrap();
        assert_eq!(Ok(Some(&Value::Int32(1))), value.get("a"));
    }

    #[test]
    fn malformed_embedded_schema() {
        let mut bytes = vec![MAGIC, 0x65];
        bytes.extend_from_slice(&Encoder::encode(&Value::Int32(1), None).unwrap()[2..7]);
        bytes.extend_from_slice(&[0x00, MAGIC]);
        assert!(matches!(
            Decoder::decode(&bytes).unwrap_err().into_inner(),
            DecodeError::UnexpectedType { expected: "schema document", found: DocType::Int32 }
        ));
    }
}
