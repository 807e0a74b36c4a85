use super::{FunctionTable, ValueType};
use crate::ast::NodeId;

/// One in-flight call whose arguments are still being parsed
#[derive(Debug, Clone, PartialEq)]
pub struct CallFrame {
    /// Matched function; `None` for a call to an undeclared name
    pub function: Option<usize>,
    /// Arguments started so far
    pub bound: usize,
    /// Type the argument being parsed must have
    pub expected: Option<ValueType>,
    pub line: usize,
    /// The argument-list node; the frame lives while parsing stays under it
    pub node: NodeId,
}

/// Outcome of starting the next argument of the innermost call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ArgumentSlot {
    NoCall,
    Unchecked,
    Expected(ValueType),
    Extra { line: usize },
}

/// Stack of pending calls, innermost on top
#[derive(Debug, Default)]
pub struct CallStack {
    frames: Vec<CallFrame>,
}

impl CallStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, function: Option<usize>, line: usize, node: NodeId) {
        self.frames.push(CallFrame {
            function,
            bound: 0,
            expected: None,
            line,
            node,
        });
    }

    pub fn pop(&mut self) -> Option<CallFrame> {
        self.frames.pop()
    }

    pub fn top(&self) -> Option<&CallFrame> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Expected type of the argument under construction, if any call is pending
    pub fn expected(&self) -> Option<Option<ValueType>> {
        self.top().map(|frame| frame.expected)
    }

    /// Bind the next argument position of the innermost call
    pub fn begin_argument(&mut self, functions: &FunctionTable) -> ArgumentSlot {
        let Some(frame) = self.frames.last_mut() else {
            return ArgumentSlot::NoCall;
        };

        let slot = match frame.function.and_then(|idx| functions.get(idx)) {
            None => ArgumentSlot::Unchecked,
            Some(function) => match function.params.get(frame.bound) {
                Some(&param) => ArgumentSlot::Expected(param),
                None => ArgumentSlot::Extra { line: frame.line },
            },
        };

        frame.expected = match slot {
            ArgumentSlot::Expected(param) => Some(param),
            _ => None,
        };
        frame.bound += 1;
        slot
    }

    /// Drop frames whose argument list no longer encloses the parse position
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&CallFrame) -> bool,
    {
        self.frames.retain(|frame| keep(frame));
    }
}
