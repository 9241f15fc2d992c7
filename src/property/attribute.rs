//! Property attribute flags.

use crate::gc::{empty_trace, Finalize, Trace};
use bitflags::bitflags;

bitflags! {
    /// The flag bits of a property descriptor.
    ///
    /// Every descriptor carries all of its flags explicitly; there is no
    /// cross-call defaulting of unspecified fields.
    pub struct Attribute: u8 {
        /// `[[Writable]]` - the `[[Value]]` may be changed with assignment.
        const WRITABLE = 0b0000_0001;

        /// `[[Enumerable]]` - the property shows up in `for-in` enumeration.
        const ENUMERABLE = 0b0000_0010;

        /// `[[Configurable]]` - the property may be deleted or redefined.
        const CONFIGURABLE = 0b0000_0100;
    }
}

impl Attribute {
    /// All flags cleared: non-writable, non-enumerable, non-configurable.
    #[inline]
    pub fn none() -> Self {
        Self::empty()
    }

    #[inline]
    pub fn writable(self) -> bool {
        self.contains(Self::WRITABLE)
    }

    #[inline]
    pub fn set_writable(&mut self, writable: bool) {
        self.set(Self::WRITABLE, writable);
    }

    #[inline]
    pub fn enumerable(self) -> bool {
        self.contains(Self::ENUMERABLE)
    }

    #[inline]
    pub fn set_enumerable(&mut self, enumerable: bool) {
        self.set(Self::ENUMERABLE, enumerable);
    }

    #[inline]
    pub fn configurable(self) -> bool {
        self.contains(Self::CONFIGURABLE)
    }

    #[inline]
    pub fn set_configurable(&mut self, configurable: bool) {
        self.set(Self::CONFIGURABLE, configurable);
    }
}

impl Finalize for Attribute {}

// Safety: `Attribute` is plain bits.
unsafe impl Trace for Attribute {
    empty_trace!();
}

impl Default for Attribute {
    /// The default attributes of a data property added by assignment:
    /// writable, enumerable and configurable.
    #[inline]
    fn default() -> Self {
        Self::WRITABLE | Self::ENUMERABLE | Self::CONFIGURABLE
    }
}
