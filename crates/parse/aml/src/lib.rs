//! `hadron-aml` --- namespace resolution and evaluation core for ACPI AML.
//!
//! This crate sits between the AML bytecode executor and the rest of the
//! kernel. It owns the runtime value model, the method-invocation boundary,
//! ACPI path resolution with scoped search, namespace walking, and `_HID` /
//! `_CID` device matching. Opcode interpretation, field-level hardware access
//! and memory policy are supplied by the embedding through the traits in
//! [`host`] and [`eval::TermListExecutor`].
//!
//! # Usage
//!
//! ```ignore
//! let mut interp = Interpreter::new(namespace, host, &executor, InterpreterConfig::default());
//! let sb = resolve_path(interp.namespace(), NodeId::ROOT, "\\_SB").unwrap();
//! for uart in interp.find_devices(encode_eisa_id("PNP0501")) {
//!     // ...
//! }
//! ```
//!
//! # Concurrency
//!
//! Evaluation is single-threaded: a method body runs to completion, and
//! nested invocations are plain recursion. Lookups and walks read the tree
//! links without synchronization, so an embedding must hold one global lock
//! around every sequence of resolution and evaluation, including while the
//! namespace is being extended by a table load.

#![cfg_attr(not(test), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod device;
pub mod eval;
pub mod host;
pub mod name;
pub mod namespace;
pub mod resolve;
pub mod value;
pub mod walk;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience.
pub use device::{EisaId, encode_eisa_id};
pub use eval::{ExecutionContext, Interpreter, InterpreterConfig, Slot, TermListExecutor};
pub use host::{BufferFieldAccessor, Host, HostAllocator, Operand, OperandReader};
pub use name::{NamePath, NameSeg};
pub use namespace::{FieldUnit, MethodFlags, Namespace, NamespaceStore, NodeId, Object};
pub use resolve::{resolve_child, resolve_path, resolve_search};
pub use value::{BufferField, Value, clean_value, clone_value};
pub use walk::{Walk, next_node};

/// Errors raised while evaluating AML objects.
///
/// Failing to find a name is not an error: resolution returns `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AmlError {
    /// The object is the wrong kind for the requested operation.
    #[error("object type mismatch")]
    WrongType,
    /// The supplied argument count does not match the declared arity.
    #[error("method takes {expected} arguments, {supplied} supplied")]
    ArgCount {
        /// Declared argument count.
        expected: u8,
        /// Number of arguments passed.
        supplied: usize,
    },
    /// Nested method invocations exceeded the configured limit.
    #[error("method call depth limit of {limit} reached")]
    CallDepth {
        /// The configured limit.
        limit: usize,
    },
    /// The AML stream ended unexpectedly.
    #[error("unexpected end of AML bytecode")]
    UnexpectedEnd,
    /// The AML bytecode contained an invalid or unsupported construct.
    #[error("invalid AML bytecode")]
    InvalidAml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_all_variants() {
        assert_eq!(format!("{}", AmlError::WrongType), "object type mismatch");
        assert_eq!(
            format!(
                "{}",
                AmlError::ArgCount {
                    expected: 2,
                    supplied: 0
                }
            ),
            "method takes 2 arguments, 0 supplied"
        );
        assert_eq!(
            format!("{}", AmlError::CallDepth { limit: 64 }),
            "method call depth limit of 64 reached"
        );
        assert_eq!(
            format!("{}", AmlError::UnexpectedEnd),
            "unexpected end of AML bytecode"
        );
        assert_eq!(format!("{}", AmlError::InvalidAml), "invalid AML bytecode");
    }

    #[test]
    fn error_equality() {
        assert_eq!(AmlError::WrongType, AmlError::WrongType);
        assert_ne!(AmlError::WrongType, AmlError::InvalidAml);
    }
}
