//! Method invocation and object evaluation.
//!
//! [`Interpreter`] is the single context object an embedding threads through
//! every evaluation. It owns the namespace and the host, and borrows the
//! [`TermListExecutor`] that runs method bodies. Nested method calls made by
//! the executor re-enter [`Interpreter::eval_method`]; each call gets its own
//! [`ExecutionContext`], so the host call stack is the interpreter's control
//! stack. The nesting depth is bounded by [`InterpreterConfig::max_call_depth`]
//! because firmware bytecode can recurse without limit.

use alloc::vec::Vec;
use core::ops::Range;

use log::{debug, trace, warn};

use crate::AmlError;
use crate::host::{Host, HostAllocator, Operand};
use crate::namespace::{NamespaceStore, NodeId, Object};
use crate::value::{Value, clean_value, clone_value};
use crate::walk::Walk;

/// Number of argument slots (`Arg0`-`Arg6`).
pub const MAX_ARGS: usize = 7;
/// Number of local slots (`Local0`-`Local7`).
pub const MAX_LOCALS: usize = 8;

/// Addresses a value slot of an [`ExecutionContext`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// `ArgN`.
    Arg(u8),
    /// `LocalN`.
    Local(u8),
    /// The method's return value.
    Return,
}

/// Per-invocation state of a control method.
#[derive(Debug)]
pub struct ExecutionContext {
    args: [Value; MAX_ARGS],
    locals: [Value; MAX_LOCALS],
    ret: Value,
    arg_count: u8,
    scope: NodeId,
    body: Range<usize>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self {
            args: Default::default(),
            locals: Default::default(),
            ret: Value::Null,
            arg_count: 0,
            scope: NodeId::ROOT,
            body: 0..0,
        }
    }
}

impl ExecutionContext {
    /// Returns the scope that relative names resolve against during this call.
    #[must_use]
    pub fn scope(&self) -> NodeId {
        self.scope
    }

    /// Byte range of the method body being executed.
    #[must_use]
    pub fn body(&self) -> Range<usize> {
        self.body.clone()
    }

    /// Number of arguments bound for this call.
    #[must_use]
    pub fn arg_count(&self) -> u8 {
        self.arg_count
    }

    /// Returns the value held in `slot`.
    ///
    /// # Panics
    ///
    /// Panics if an argument or local index is out of range.
    #[must_use]
    pub fn slot(&self, slot: Slot) -> &Value {
        match slot {
            Slot::Arg(i) => &self.args[usize::from(i)],
            Slot::Local(i) => &self.locals[usize::from(i)],
            Slot::Return => &self.ret,
        }
    }

    /// Returns the value held in `slot`, mutably.
    ///
    /// # Panics
    ///
    /// Panics if an argument or local index is out of range.
    pub fn slot_mut(&mut self, slot: Slot) -> &mut Value {
        match slot {
            Slot::Arg(i) => &mut self.args[usize::from(i)],
            Slot::Local(i) => &mut self.locals[usize::from(i)],
            Slot::Return => &mut self.ret,
        }
    }

    /// Moves `value` into `slot`, cleaning what the slot held before.
    pub fn store<H: HostAllocator + ?Sized>(&mut self, host: &mut H, slot: Slot, value: Value) {
        let target = self.slot_mut(slot);
        clean_value(host, target);
        *target = value;
    }

    /// Deep-copies the value in `src` into `dst`.
    ///
    /// Copying a slot onto itself leaves it untouched and allocates nothing.
    pub fn copy_slot<H: Host + ?Sized>(&mut self, host: &mut H, dst: Slot, src: Slot) {
        if dst == src {
            return;
        }
        let source = core::mem::take(self.slot_mut(src));
        clone_value(host, self.slot_mut(dst), &source);
        *self.slot_mut(src) = source;
    }

    /// Cleans every slot.
    fn clean<H: HostAllocator + ?Sized>(&mut self, host: &mut H) {
        for value in self
            .args
            .iter_mut()
            .chain(self.locals.iter_mut())
            .chain(core::iter::once(&mut self.ret))
        {
            clean_value(host, value);
        }
    }
}

/// Runs method bodies on behalf of the interpreter.
///
/// The executor interprets the term list in [`ExecutionContext::body`],
/// reading arguments from and writing the result to the context. It may call
/// back into [`Interpreter::eval_method`] for nested invocations. Any error
/// it returns is propagated to the caller after the context is released.
pub trait TermListExecutor<S: NamespaceStore, H: Host> {
    /// Executes the body of the method described by `ctx`.
    ///
    /// # Errors
    ///
    /// Returns an [`AmlError`] if the body cannot be executed.
    fn run(
        &self,
        interp: &mut Interpreter<'_, S, H>,
        ctx: &mut ExecutionContext,
    ) -> Result<(), AmlError>;
}

/// Tunables for an [`Interpreter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterpreterConfig {
    /// Maximum number of nested method invocations.
    pub max_call_depth: usize,
}

impl Default for InterpreterConfig {
    fn default() -> Self {
        Self { max_call_depth: 64 }
    }
}

/// The evaluation context threaded through all AML operations.
///
/// Evaluation takes `&mut self`; an embedding that shares the interpreter
/// between threads must serialize every resolution and evaluation behind a
/// single lock, since lookups and walks read the tree unsynchronized.
pub struct Interpreter<'x, S: NamespaceStore, H: Host> {
    namespace: S,
    host: H,
    executor: &'x dyn TermListExecutor<S, H>,
    config: InterpreterConfig,
    depth: usize,
}

impl<'x, S: NamespaceStore, H: Host> Interpreter<'x, S, H> {
    /// Creates an interpreter over a constructed namespace.
    pub fn new(
        namespace: S,
        host: H,
        executor: &'x dyn TermListExecutor<S, H>,
        config: InterpreterConfig,
    ) -> Self {
        Self {
            namespace,
            host,
            executor,
            config,
            depth: 0,
        }
    }

    /// Tears the interpreter down, releasing every named value still stored
    /// in the namespace, and hands back the namespace and host.
    pub fn shutdown(mut self) -> (S, H) {
        let nodes: Vec<NodeId> = Walk::new(&self.namespace).collect();
        let mut released = 0usize;
        for node in nodes {
            if let Object::Name(value) = self.namespace.object_mut(node) {
                clean_value(&mut self.host, value);
                released += 1;
            }
        }
        debug!("aml: shutdown released {released} named values");
        (self.namespace, self.host)
    }

    /// Returns the namespace.
    pub fn namespace(&self) -> &S {
        &self.namespace
    }

    /// Returns the namespace, mutably.
    pub fn namespace_mut(&mut self) -> &mut S {
        &mut self.namespace
    }

    /// Returns the host.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Returns the host, mutably.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// Returns the configuration.
    pub fn config(&self) -> &InterpreterConfig {
        &self.config
    }

    /// Returns the number of method invocations currently in progress.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Invokes the control method at `node` with `args`.
    ///
    /// Arguments are deep-copied into a fresh context; the caller keeps
    /// ownership of `args` and remains responsible for cleaning them. The
    /// returned value is a deep copy of the method's return slot (`Null` if
    /// the body never set one) and must be cleaned by the caller.
    ///
    /// # Errors
    ///
    /// - [`AmlError::WrongType`] if `node` is not a method.
    /// - [`AmlError::ArgCount`] if `args` does not match the declared arity.
    /// - [`AmlError::CallDepth`] if the nesting limit is reached.
    /// - Any error reported by the executor.
    pub fn eval_method(&mut self, node: NodeId, args: &[Value]) -> Result<Value, AmlError> {
        let (flags, body) = match self.namespace.object(node) {
            Object::Method { flags, body } => (*flags, body.clone()),
            _ => return Err(AmlError::WrongType),
        };

        let expected = flags.arg_count();
        if args.len() != usize::from(expected) {
            return Err(AmlError::ArgCount {
                expected,
                supplied: args.len(),
            });
        }
        if self.depth >= self.config.max_call_depth {
            warn!(
                "aml: call depth limit {} reached invoking {}",
                self.config.max_call_depth,
                self.namespace.name(node)
            );
            return Err(AmlError::CallDepth {
                limit: self.config.max_call_depth,
            });
        }

        let mut ctx = self.host.alloc_context();
        ctx.arg_count = expected;
        ctx.scope = node;
        ctx.body = body;
        for (slot, arg) in ctx.args.iter_mut().zip(args) {
            clone_value(&mut self.host, slot, arg);
        }

        trace!(
            "aml: enter {} (depth {}, {} args)",
            self.namespace.name(node),
            self.depth,
            expected
        );
        self.depth += 1;
        let executor = self.executor;
        let status = executor.run(self, &mut ctx);
        self.depth -= 1;

        let mut result = Value::Null;
        if status.is_ok() {
            clone_value(&mut self.host, &mut result, &ctx.ret);
        }
        ctx.clean(&mut self.host);
        self.host.free_context(ctx);

        trace!(
            "aml: leave {} -> {}",
            self.namespace.name(node),
            status.map_or("error", |()| result.type_name())
        );
        status.map(|()| result)
    }

    /// Evaluates the object at `node` for its value.
    ///
    /// Zero-argument methods are invoked, named values and field units are
    /// deep-copied out. The caller owns and must clean the result.
    ///
    /// # Errors
    ///
    /// - [`AmlError::ArgCount`] for a method that takes arguments.
    /// - [`AmlError::WrongType`] for objects without a value (devices,
    ///   scopes, regions, ...).
    /// - Any error from invoking a method.
    pub fn eval_node(&mut self, node: NodeId) -> Result<Value, AmlError> {
        let mut result = Value::Null;

        match self.namespace.object(node) {
            Object::Method { flags, .. } => {
                let expected = flags.arg_count();
                if expected != 0 {
                    return Err(AmlError::ArgCount {
                        expected,
                        supplied: 0,
                    });
                }
                return self.eval_method(node, &[]);
            }
            Object::Name(value) => clone_value(&mut self.host, &mut result, value),
            Object::Field(unit) => {
                let mut temp = self.host.read_operand(Operand::Field(unit));
                clone_value(&mut self.host, &mut result, &temp);
                clean_value(&mut self.host, &mut temp);
            }
            Object::IndexField(unit) => {
                let mut temp = self.host.read_operand(Operand::IndexField(unit));
                clone_value(&mut self.host, &mut result, &temp);
                clean_value(&mut self.host, &mut temp);
            }
            other => {
                debug!(
                    "aml: {} is a {} and has no value",
                    self.namespace.name(node),
                    other.type_name()
                );
                return Err(AmlError::WrongType);
            }
        }

        Ok(result)
    }
}

impl<S: NamespaceStore, H: Host> core::fmt::Debug for Interpreter<'_, S, H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Interpreter")
            .field("config", &self.config)
            .field("depth", &self.depth)
            .finish_non_exhaustive()
    }
}
