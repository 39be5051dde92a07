//! Structural schemas for value trees.
//!
//! A schema element names the type permitted at one position of a tree and whether `null` is permitted instead.
//! Array elements carry the schema of their items, document elements carry one attribute per permitted key. Each
//! attribute has a small integer id which replaces the key name on wire when a schema is embedded, so ids must stay
//! stable for a given schema once assigned.
//!
//! Schemas can be written down by hand, inferred from a sample value with [`SchemaElement::parse`] and converted to
//! and from a [`Document`], which is how they travel inside an encoded frame.

use crate::array::Array;
use crate::document::Document;
use crate::error::{SchemaError, SchemaErrorKind};
use crate::types::DocType;
use crate::value::Value;
use std::collections::HashSet;
use std::convert::TryFrom;

const DOCUMENT_TYPE: &str = "DocumentType";
const ALLOW_NULL: &str = "AllowNull";
const ELEMENT: &str = "Element";
const ATTRIBUTES: &str = "Attributes";
const ATTRIBUTE_ID: &str = "AttributeId";
const ATTRIBUTE_NAME: &str = "AttributeName";

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaElement {
    doc_type: DocType,
    allow_null: bool,
    element: Option<Box<SchemaElement>>,
    attributes: Option<Vec<SchemaAttribute>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SchemaAttribute {
    id: i16,
    name: String,
    element: SchemaElement,
}

impl SchemaAttribute {

    pub fn new<S: Into<String>>(id: i16, name: S, element: SchemaElement) -> Self {
        SchemaAttribute { id, name: name.into(), element }
    }

    pub fn id(&self) -> i16 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element(&self) -> &SchemaElement {
        &self.element
    }

}

impl SchemaElement {

    /// A schema for a scalar type. Arrays and documents need [`array`](Self::array) and
    /// [`document`](Self::document) respectively.
    pub fn new(doc_type: DocType, allow_null: bool) -> Result<Self, SchemaError> {
        if doc_type.is_container() {
            return Err(SchemaError::new(SchemaErrorKind::Invalid("containers require nested schemas")).rooted());
        }
        Ok(SchemaElement { doc_type, allow_null, element: None, attributes: None })
    }

    pub fn array(element: SchemaElement, allow_null: bool) -> Self {
        SchemaElement { doc_type: DocType::Array, allow_null, element: Some(Box::new(element)), attributes: None }
    }

    /// An array whose items are not constrained. Documents inside it keep their string keys on wire.
    pub fn any_array(allow_null: bool) -> Self {
        SchemaElement { doc_type: DocType::Array, allow_null, element: None, attributes: None }
    }

    /// Fails if attribute ids or names are not unique.
    pub fn document(attributes: Vec<SchemaAttribute>, allow_null: bool) -> Result<Self, SchemaError> {
        let schema = SchemaElement { doc_type: DocType::Document, allow_null, element: None, attributes: Some(attributes) };
        schema.check()?;
        Ok(schema)
    }

    fn null() -> Self {
        SchemaElement { doc_type: DocType::Null, allow_null: true, element: None, attributes: None }
    }

    pub fn doc_type(&self) -> DocType {
        self.doc_type
    }

    pub fn allow_null(&self) -> bool {
        self.allow_null
    }

    pub fn with_allow_null(mut self, allow_null: bool) -> Self {
        self.allow_null = allow_null;
        self
    }

    /// The schema of array items, `None` for scalars, documents and arrays of mixed items.
    pub fn element(&self) -> Option<&SchemaElement> {
        self.element.as_deref()
    }

    /// The attributes of a document schema, empty for all other types.
    pub fn attributes(&self) -> &[SchemaAttribute] {
        self.attributes.as_deref().unwrap_or(&[])
    }

    pub fn attribute_by_name(&self, name: &str) -> Option<&SchemaAttribute> {
        self.attributes().iter().find(|a| a.name == name)
    }

    pub fn attribute_by_id(&self, id: i16) -> Option<&SchemaAttribute> {
        self.attributes().iter().find(|a| a.id == id)
    }

    fn accepts_null(&self) -> bool {
        self.allow_null || self.doc_type == DocType::Null
    }

    /// Verifies that only arrays carry an item schema, only documents carry attributes and attribute ids and names
    /// are unique within each document.
    pub fn check(&self) -> Result<(), SchemaError> {
        self.check_node().map_err(SchemaError::rooted)
    }

    fn check_node(&self) -> Result<(), SchemaError> {
        match (self.doc_type, &self.element, &self.attributes) {
            (DocType::Array, Some(element), None) => element.check_node().map_err(|e| e.within("[]")),
            (DocType::Array, None, None) => Ok(()),
            (DocType::Array, _, _) => Err(invalid("array schema carries no attributes")),
            (DocType::Document, None, Some(attributes)) => {
                let mut ids = HashSet::new();
                let mut names = HashSet::new();
                for a in attributes {
                    if !ids.insert(a.id) {
                        return Err(invalid("duplicate attribute id"));
                    }
                    if !names.insert(a.name.as_str()) {
                        return Err(invalid("duplicate attribute name"));
                    }
                    a.element.check_node().map_err(|e| e.within(&format!(".{}", a.name)))?;
                }
                Ok(())
            },
            (DocType::Document, _, _) => Err(invalid("document schema requires attributes and no item schema")),
            (_, None, None) => Ok(()),
            _ => Err(invalid("only arrays and documents carry nested schemas")),
        }
    }

    /// Checks `value` against this schema. The error names the path of the first offending node.
    pub fn validate(&self, value: &Value) -> Result<(), SchemaError> {
        self.validate_node(value).map_err(SchemaError::rooted)
    }

    fn validate_node(&self, value: &Value) -> Result<(), SchemaError> {
        if value.is_null() {
            return if self.accepts_null() { Ok(()) } else { Err(SchemaError::new(SchemaErrorKind::Null)) };
        }
        if value.doc_type() != self.doc_type {
            return Err(SchemaError::new(SchemaErrorKind::Type { expected: self.doc_type, found: value.doc_type() }));
        }
        match value {
            Value::Array(items) => {
                if let Some(element) = self.element() {
                    for (i, item) in items.iter().enumerate() {
                        element.validate_node(item).map_err(|e| e.within(&format!("[{}]", i)))?;
                    }
                }
            },
            Value::Document(doc) => {
                for a in self.attributes() {
                    if !doc.contains_key(&a.name) && !a.element.accepts_null() {
                        return Err(SchemaError::new(SchemaErrorKind::MissingAttribute(a.name.clone())));
                    }
                }
                for (key, v) in doc.iter() {
                    let a = self.attribute_by_name(key)
                        .ok_or_else(|| SchemaError::new(SchemaErrorKind::UnknownKey(key.clone())))?;
                    a.element.validate_node(v).map_err(|e| e.within(&format!(".{}", key)))?;
                }
            },
            _ => {},
        }
        Ok(())
    }

    /// Infers the most specific schema `value` satisfies. Attribute ids are assigned from 1 in ordinal key order.
    /// An array whose items have no common schema gets no item schema at all, an empty array gets a nullable `Null`
    /// item schema. Hence the result validates `value` for every input.
    pub fn parse(value: &Value) -> Result<SchemaElement, SchemaError> {
        Self::parse_node(value).map_err(SchemaError::rooted)
    }

    fn parse_node(value: &Value) -> Result<SchemaElement, SchemaError> {
        match value {
            Value::Null => Ok(SchemaElement::null()),
            Value::Array(items) => {
                let mut element: Option<SchemaElement> = None;
                let mut mixed = false;
                for (i, item) in items.iter().enumerate() {
                    let schema = Self::parse_node(item).map_err(|e| e.within(&format!("[{}]", i)))?;
                    if mixed {
                        continue;
                    }
                    element = match element {
                        None       => Some(schema),
                        Some(prev) => SchemaElement::compatible(&prev, &schema),
                    };
                    mixed = element.is_none();
                }
                Ok(match element {
                    Some(e)          => SchemaElement::array(e, false),
                    None if mixed    => SchemaElement::any_array(false),
                    None             => SchemaElement::array(SchemaElement::null(), false),
                })
            },
            Value::Document(doc) => {
                let mut attributes = Vec::with_capacity(doc.len());
                for (i, (key, v)) in doc.as_map().iter().enumerate() {
                    let id = i16::try_from(i + 1).map_err(|_| invalid("too many attributes"))?;
                    let element = Self::parse_node(v).map_err(|e| e.within(&format!(".{}", key)))?;
                    attributes.push(SchemaAttribute::new(id, key.as_str(), element));
                }
                Ok(SchemaElement { doc_type: DocType::Document, allow_null: false, element: None, attributes: Some(attributes) })
            },
            other => Ok(SchemaElement { doc_type: other.doc_type(), allow_null: false, element: None, attributes: None }),
        }
    }

    /// The most general schema describing both `a` and `b`, or `None` if they cannot be reconciled. Documents are
    /// only compatible if their attributes agree in count, ids and names. Arrays always are, falling back to an
    /// unconstrained item schema.
    pub fn compatible(a: &SchemaElement, b: &SchemaElement) -> Option<SchemaElement> {
        let allow_null = a.allow_null || b.allow_null;
        match (a.doc_type, b.doc_type) {
            (DocType::Null, DocType::Null) => Some(SchemaElement::null()),
            (DocType::Array, DocType::Array) => {
                let element = a.element().zip(b.element()).and_then(|(x, y)| SchemaElement::compatible(x, y));
                Some(match element {
                    Some(e) => SchemaElement::array(e, allow_null),
                    None    => SchemaElement::any_array(allow_null),
                })
            },
            (DocType::Document, DocType::Document) => {
                let (xs, ys) = (a.attributes.as_ref()?, b.attributes.as_ref()?);
                if xs.len() != ys.len() {
                    return None;
                }
                let attributes = xs.iter().zip(ys.iter())
                    .map(|(x, y)| {
                        if x.id != y.id || x.name != y.name {
                            return None;
                        }
                        SchemaElement::compatible(&x.element, &y.element).map(|e| SchemaAttribute::new(x.id, x.name.as_str(), e))
                    })
                    .collect::<Option<Vec<_>>>()?;
                Some(SchemaElement { doc_type: DocType::Document, allow_null, element: None, attributes: Some(attributes) })
            },
            (DocType::Null, _) => Some(b.clone().with_allow_null(true)),
            (_, DocType::Null) => Some(a.clone().with_allow_null(true)),
            (x, y) if x == y => Some(SchemaElement { doc_type: x, allow_null, element: None, attributes: None }),
            _ => None,
        }
    }

    /// An array of documents whose attributes are all scalars.
    pub fn is_tabular(&self) -> bool {
        match self.element() {
            Some(row) if self.doc_type == DocType::Array && row.doc_type == DocType::Document =>
                row.attributes().iter().all(|a| !a.element.doc_type.is_container()),
            _ => false,
        }
    }

    /// An array of scalars.
    pub fn is_list(&self) -> bool {
        match self.element() {
            Some(item) => self.doc_type == DocType::Array && !item.doc_type.is_container(),
            None       => false,
        }
    }

    pub fn to_document(&self) -> Document {
        let mut doc = Document::new();
        doc.insert(DOCUMENT_TYPE, self.doc_type.id() as i32);
        doc.insert(ALLOW_NULL, self.allow_null);
        if let Some(element) = self.element() {
            doc.insert(ELEMENT, element.to_document());
        }
        if let Some(attributes) = &self.attributes {
            let list: Array = attributes.iter()
                .map(|a| {
                    let mut attr = Document::new();
                    attr.insert(ATTRIBUTE_ID, a.id as i32);
                    attr.insert(ATTRIBUTE_NAME, a.name.as_str());
                    attr.insert(ELEMENT, a.element.to_document());
                    attr
                })
                .collect();
            doc.insert(ATTRIBUTES, list);
        }
        doc
    }

    /// The inverse of [`to_document`](Self::to_document). The result is structurally checked.
    pub fn from_document(doc: &Document) -> Result<SchemaElement, SchemaError> {
        let schema = Self::from_document_node(doc).map_err(SchemaError::rooted)?;
        schema.check()?;
        Ok(schema)
    }

    fn from_document_node(doc: &Document) -> Result<SchemaElement, SchemaError> {
        let doc_type = field(doc, DOCUMENT_TYPE)?.as_u8()
            .and_then(|id| DocType::try_from(id).ok())
            .ok_or_else(|| malformed(format!("`{}` is not a type id", DOCUMENT_TYPE)))?;
        let allow_null = field(doc, ALLOW_NULL)?.as_bool()
            .ok_or_else(|| malformed(format!("`{}` is not a boolean", ALLOW_NULL)))?;
        let element = match doc.get(ELEMENT) {
            Some(Value::Document(e)) => Some(Box::new(Self::from_document_node(e).map_err(|e| e.within("[]"))?)),
            Some(_)                  => return Err(malformed(format!("`{}` is not a document", ELEMENT))),
            None                     => None,
        };
        let attributes = match doc.get(ATTRIBUTES) {
            Some(Value::Array(list)) => Some(list.iter().map(attribute_from_value).collect::<Result<Vec<_>, _>>()?),
            Some(_)                  => return Err(malformed(format!("`{}` is not an array", ATTRIBUTES))),
            None                     => None,
        };
        Ok(SchemaElement { doc_type, allow_null, element, attributes })
    }

}

fn attribute_from_value(value: &Value) -> Result<SchemaAttribute, SchemaError> {
    let doc = value.as_document().ok_or_else(|| malformed("attribute is not a document".to_string()))?;
    let id = field(doc, ATTRIBUTE_ID)?.as_i16()
        .ok_or_else(|| malformed(format!("`{}` is not a 16 bit integer", ATTRIBUTE_ID)))?;
    let name = field(doc, ATTRIBUTE_NAME)?.as_str()
        .ok_or_else(|| malformed(format!("`{}` is not a string", ATTRIBUTE_NAME)))?;
    let element = match field(doc, ELEMENT)? {
        Value::Document(e) => SchemaElement::from_document_node(e).map_err(|e| e.within(&format!(".{}", name)))?,
        _                  => return Err(malformed(format!("`{}` is not a document", ELEMENT))),
    };
    Ok(SchemaAttribute::new(id, name, element))
}

fn field<'a>(doc: &'a Document, key: &str) -> Result<&'a Value, SchemaError> {
    doc.get(key).ok_or_else(|| malformed(format!("missing `{}`", key)))
}

fn malformed(message: String) -> SchemaError {
    SchemaError::new(SchemaErrorKind::Malformed(message))
}

fn invalid(message: &'static str) -> SchemaError {
    SchemaError::new(SchemaErrorKind::Invalid(message))
}
