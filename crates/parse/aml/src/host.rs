//! Host services consumed by the evaluator.
//!
//! The kernel embedding the interpreter supplies storage, buffer-field access
//! and field-unit reads through these traits. Allocation hooks have default
//! implementations on the global allocator, so a host only overrides what it
//! needs to track or redirect.

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::eval::ExecutionContext;
use crate::namespace::FieldUnit;
use crate::value::{BufferField, Value};

/// Storage provider for buffers, package elements and execution contexts.
pub trait HostAllocator {
    /// Returns an empty byte vector with room for at least `len` bytes.
    fn alloc_bytes(&mut self, len: usize) -> Vec<u8> {
        Vec::with_capacity(len)
    }

    /// Releases storage previously handed out by [`alloc_bytes`](Self::alloc_bytes).
    fn free_bytes(&mut self, bytes: Vec<u8>) {
        drop(bytes);
    }

    /// Returns an empty element vector with room for at least `count` values.
    fn alloc_elements(&mut self, count: usize) -> Vec<Value> {
        Vec::with_capacity(count)
    }

    /// Releases element storage. Every element has already been cleaned.
    fn free_elements(&mut self, elements: Vec<Value>) {
        drop(elements);
    }

    /// Allocates a fresh execution context with every slot set to `Null`.
    fn alloc_context(&mut self) -> Box<ExecutionContext> {
        Box::default()
    }

    /// Releases an execution context. Every slot has already been cleaned.
    fn free_context(&mut self, context: Box<ExecutionContext>) {
        drop(context);
    }
}

/// Bit-level access to buffer fields.
pub trait BufferFieldAccessor {
    /// Reads the current contents of `field`.
    fn read_buffer_field(&mut self, field: &BufferField) -> u64;

    /// Writes `value` into `field`, truncated to the field width.
    fn write_buffer_field(&mut self, field: &BufferField, value: u64);
}

/// A field operand handed to the [`OperandReader`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand<'a> {
    /// A `Field` declared over an operation region.
    Field(&'a FieldUnit),
    /// An `IndexField` accessed through an index/data register pair.
    IndexField(&'a FieldUnit),
}

/// Resolves field operands to concrete values.
pub trait OperandReader {
    /// Reads the current value of `operand`.
    ///
    /// Buffer or package storage in the returned value is released through
    /// the host allocator once the caller has copied it out.
    fn read_operand(&mut self, operand: Operand<'_>) -> Value;
}

/// Everything the interpreter needs from its embedding.
pub trait Host: HostAllocator + BufferFieldAccessor + OperandReader {}

impl<T: HostAllocator + BufferFieldAccessor + OperandReader> Host for T {}
