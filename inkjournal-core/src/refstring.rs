//! # Shared strings
//!
//! Background filenames are shared between every copy of a background - duplicating a page from a
//! template, or parking the old background in a history entry, takes another share rather than a copy.
//! Sharing is reference counted: [`RefString::share`] is the increment, dropping a handle the decrement,
//! and the payload goes away with the last handle.

use std::rc::Rc;

#[derive(Debug)]
struct Payload {
    text: Option<String>,
    /// Opaque extra data riding along with the string.
    aux: Option<String>,
}

/// Reference counted, immutable string payload with an optional auxiliary string.
#[derive(Debug)]
pub struct RefString(Rc<Payload>);
impl RefString {
    /// A new string with a reference count of one. `None` creates an empty payload.
    #[must_use]
    pub fn new(text: Option<&str>) -> Self {
        Self(Rc::new(Payload {
            text: text.map(ToOwned::to_owned),
            aux: None,
        }))
    }
    #[must_use]
    pub fn with_aux(text: Option<&str>, aux: Option<&str>) -> Self {
        Self(Rc::new(Payload {
            text: text.map(ToOwned::to_owned),
            aux: aux.map(ToOwned::to_owned),
        }))
    }
    /// Take another reference to the same payload.
    #[must_use]
    pub fn share(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.0.text.as_deref()
    }
    #[must_use]
    pub fn aux(&self) -> Option<&str> {
        self.0.aux.as_deref()
    }
    /// Number of live handles to this payload.
    #[must_use]
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
    /// Whether both handles share one payload, as opposed to merely having equal contents.
    #[must_use]
    pub fn same_payload(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Clone for RefString {
    fn clone(&self) -> Self {
        self.share()
    }
}
impl PartialEq for RefString {
    fn eq(&self, other: &Self) -> bool {
        self.same_payload(other) || (self.0.text == other.0.text && self.0.aux == other.0.aux)
    }
}
impl std::fmt::Display for RefString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str().unwrap_or(""))
    }
}
