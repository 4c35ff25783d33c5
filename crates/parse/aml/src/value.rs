//! Runtime AML values and their deep-copy/release lifecycle.
//!
//! Buffers and packages own their storage exclusively. Storage is obtained
//! from and returned to the [`HostAllocator`] by [`clone_value`] and
//! [`clean_value`]; every value that received buffer or package storage from
//! `clone_value` must be passed to `clean_value` exactly once.

use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::host::{BufferFieldAccessor, HostAllocator};
use crate::namespace::NodeId;

/// A named view onto a bit range inside a buffer object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferField {
    /// Node holding the backing buffer.
    pub source: NodeId,
    /// Offset of the first bit inside the buffer.
    pub bit_offset: u64,
    /// Width of the field in bits.
    pub bit_len: u64,
}

/// A runtime AML value.
///
/// `Value` deliberately does not implement [`Clone`]: copies must go through
/// [`clone_value`] so that storage is accounted for by the host and buffer
/// fields are materialized.
#[derive(Debug, Default, PartialEq)]
pub enum Value {
    /// Uninitialized or empty value.
    #[default]
    Null,
    /// A 64-bit integer.
    Integer(u64),
    /// An immutable string, shared between copies.
    String(Arc<str>),
    /// An owned byte buffer.
    Buffer(Vec<u8>),
    /// A reference to a bit field inside a buffer.
    BufferField(BufferField),
    /// An owned, ordered sequence of values.
    Package(Vec<Value>),
}

impl Value {
    /// Builds a string value.
    #[must_use]
    pub fn string(s: &str) -> Self {
        Self::String(Arc::from(s))
    }

    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<u64> {
        match *self {
            Self::Integer(v) => Some(v),
            _ => None,
        }
    }

    /// Returns `true` if this is [`Value::Null`].
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the ACPI type name of this value.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "Uninitialized",
            Self::Integer(_) => "Integer",
            Self::String(_) => "String",
            Self::Buffer(_) => "Buffer",
            Self::BufferField(_) => "BufferField",
            Self::Package(_) => "Package",
        }
    }
}

/// Deep-copies `src` into `dst`.
///
/// Whatever `dst` held before is cleaned first. Packages and buffers receive
/// fresh storage from `host`; the copy shares nothing with the source. A
/// [`Value::BufferField`] is not copied as a reference: the field is read
/// through `host` and the copy becomes a plain [`Value::Integer`].
pub fn clone_value<H>(host: &mut H, dst: &mut Value, src: &Value)
where
    H: HostAllocator + BufferFieldAccessor + ?Sized,
{
    clean_value(host, dst);

    *dst = match src {
        Value::Null => Value::Null,
        Value::Integer(v) => Value::Integer(*v),
        Value::String(s) => Value::String(Arc::clone(s)),
        Value::Buffer(bytes) => {
            let mut copy = host.alloc_bytes(bytes.len());
            copy.clear();
            copy.extend_from_slice(bytes);
            Value::Buffer(copy)
        }
        Value::BufferField(field) => Value::Integer(host.read_buffer_field(field)),
        Value::Package(elements) => {
            let mut copy = host.alloc_elements(elements.len());
            copy.clear();
            for element in elements {
                let mut slot = Value::Null;
                clone_value(host, &mut slot, element);
                copy.push(slot);
            }
            Value::Package(copy)
        }
    };
}

/// Releases the storage owned by `value` and resets it to [`Value::Null`].
///
/// Package elements are cleaned recursively before the element storage is
/// returned. Cleaning a value that owns nothing is a no-op.
pub fn clean_value<H>(host: &mut H, value: &mut Value)
where
    H: HostAllocator + ?Sized,
{
    match core::mem::take(value) {
        Value::Package(mut elements) => {
            for element in &mut elements {
                clean_value(host, element);
            }
            host.free_elements(elements);
        }
        Value::Buffer(bytes) => host.free_bytes(bytes),
        _ => {}
    }
}
