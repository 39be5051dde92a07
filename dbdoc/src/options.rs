use crate::buffer::TextEncoding;

/// Settings shared by [`Encoder`](crate::Encoder) and [`Decoder`](crate::Decoder). Neither is recorded in the frame,
/// so both sides have to use the same options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Options {
    /// Encoding of string payloads and string keys
    pub text_encoding: TextEncoding,
    /// Maximum nesting of arrays and documents. Unbounded if `None`.
    pub max_depth: Option<usize>,
}

impl Options {

    pub fn with_text_encoding(mut self, text_encoding: TextEncoding) -> Self {
        self.text_encoding = text_encoding;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

}
