//! Host and executor doubles shared by the unit tests.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::AmlError;
use crate::eval::{ExecutionContext, Interpreter, TermListExecutor};
use crate::host::{BufferFieldAccessor, HostAllocator, Operand, OperandReader};
use crate::name::NameSeg;
use crate::namespace::Namespace;
use crate::value::{BufferField, Value};

/// Builds a name segment from a 4-character literal.
pub fn seg(name: &str) -> NameSeg {
    NameSeg::from_bytes(name.as_bytes()).expect("4-character name")
}

/// A host that counts every allocation and release.
#[derive(Debug, Default)]
pub struct TestHost {
    allocs: usize,
    frees: usize,
    contexts_allocated: usize,
    contexts_freed: usize,
    field_value: u64,
    field_reads: usize,
    operand_value: u64,
    operand_reads: usize,
    index_field_reads: usize,
}

impl TestHost {
    pub fn allocs(&self) -> usize {
        self.allocs
    }

    pub fn frees(&self) -> usize {
        self.frees
    }

    /// Buffer and element allocations not yet released.
    pub fn live(&self) -> isize {
        self.allocs as isize - self.frees as isize
    }

    pub fn contexts_allocated(&self) -> usize {
        self.contexts_allocated
    }

    pub fn contexts_freed(&self) -> usize {
        self.contexts_freed
    }

    pub fn set_field_value(&mut self, value: u64) {
        self.field_value = value;
    }

    pub fn field_reads(&self) -> usize {
        self.field_reads
    }

    pub fn set_operand_value(&mut self, value: u64) {
        self.operand_value = value;
    }

    pub fn operand_reads(&self) -> usize {
        self.operand_reads
    }

    pub fn index_field_reads(&self) -> usize {
        self.index_field_reads
    }
}

impl HostAllocator for TestHost {
    fn alloc_bytes(&mut self, len: usize) -> Vec<u8> {
        self.allocs += 1;
        Vec::with_capacity(len)
    }

    fn free_bytes(&mut self, _bytes: Vec<u8>) {
        self.frees += 1;
    }

    fn alloc_elements(&mut self, count: usize) -> Vec<Value> {
        self.allocs += 1;
        Vec::with_capacity(count)
    }

    fn free_elements(&mut self, elements: Vec<Value>) {
        assert!(elements.iter().all(Value::is_null), "released uncleaned elements");
        self.frees += 1;
    }

    fn alloc_context(&mut self) -> Box<ExecutionContext> {
        self.contexts_allocated += 1;
        Box::default()
    }

    fn free_context(&mut self, _context: Box<ExecutionContext>) {
        self.contexts_freed += 1;
    }
}

impl BufferFieldAccessor for TestHost {
    fn read_buffer_field(&mut self, _field: &BufferField) -> u64 {
        self.field_reads += 1;
        self.field_value
    }

    fn write_buffer_field(&mut self, _field: &BufferField, value: u64) {
        self.field_value = value;
    }
}

impl OperandReader for TestHost {
    fn read_operand(&mut self, operand: Operand<'_>) -> Value {
        self.operand_reads += 1;
        if let Operand::IndexField(_) = operand {
            self.index_field_reads += 1;
        }
        Value::Integer(self.operand_value)
    }
}

type Body = dyn Fn(&mut Interpreter<'_, Namespace, TestHost>, &mut ExecutionContext) -> Result<(), AmlError>;

/// A term-list executor driven by a closure, counting its invocations.
pub struct FnExecutor {
    body: Box<Body>,
    calls: Cell<usize>,
}

impl FnExecutor {
    pub fn new(
        body: impl Fn(&mut Interpreter<'_, Namespace, TestHost>, &mut ExecutionContext) -> Result<(), AmlError>
        + 'static,
    ) -> Self {
        Self {
            body: Box::new(body),
            calls: Cell::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl TermListExecutor<Namespace, TestHost> for FnExecutor {
    fn run(
        &self,
        interp: &mut Interpreter<'_, Namespace, TestHost>,
        ctx: &mut ExecutionContext,
    ) -> Result<(), AmlError> {
        self.calls.set(self.calls.get() + 1);
        (self.body)(interp, ctx)
    }
}
