//! String ordering used when comparing `String` values. Keys of documents are always compared ordinally.

use std::cmp::Ordering;

pub trait Collation {
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Byte-wise ordering of the UTF-8 representation, which equals ordering by code point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Binary;

impl Collation for Binary {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

/// Like [`Binary`] but ASCII letters compare without regard to case.
#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreCase;

impl Collation for IgnoreCase {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.bytes().map(|c| c.to_ascii_lowercase()).cmp(b.bytes().map(|c| c.to_ascii_lowercase()))
    }
}

impl<F: Fn(&str, &str) -> Ordering> Collation for F {
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self(a, b)
    }
}
