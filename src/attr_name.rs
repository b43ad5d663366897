use bytemuck::TransparentWrapper;
use std::hash::{Hash, Hasher};

/// An attribute or command name as it appears on the bus.
///
/// The control bus does not guarantee any particular casing, so names
/// compare and hash case-insensitively.
#[derive(TransparentWrapper, derive_more::Debug, derive_more::Display)]
#[debug("{_0:?}")]
#[display("{_0}")]
#[repr(transparent)]
pub struct AttrName(str);

impl AttrName {
    /// View a plain string as a bus name.
    pub fn new(name: &str) -> &Self {
        TransparentWrapper::wrap_ref(name)
    }

    /// The name as received, original casing preserved.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<AttrName> for str {
    fn as_ref(&self) -> &AttrName {
        AttrName::new(self)
    }
}

impl PartialEq for AttrName {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for AttrName {}

impl Hash for AttrName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for b in self.0.as_bytes() {
            state.write_u8(b.to_ascii_lowercase());
        }
        state.write_u8(0xff);
    }
}
