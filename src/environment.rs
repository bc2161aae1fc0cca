//! Block-structured binding stack implementing dynamic scope.
//!
//! An [`Environment`] is a stack of frames, innermost last. Lookup walks the
//! frames from innermost to outermost and, inside a frame, from the newest
//! binding to the oldest, so a later `let` of the same name in the same frame
//! shadows the earlier one. Because user function calls push a frame onto this
//! same stack, a callee sees its callers' bindings: scope follows the call
//! chain, not the program text.

use std::fmt;

use tracing::{trace, warn};

use crate::Error;
use crate::ast::Value;

/// What a binding was created by. Only affects how the binding is listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Variable,
    Function,
}

#[derive(Debug, Clone, PartialEq)]
struct Binding {
    name: String,
    value: Value,
    kind: BindingKind,
}

/// A frame stores bindings oldest first; lookups iterate it in reverse.
type Frame = Vec<Binding>;

#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    frames: Vec<Frame>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// An environment with a single, empty global frame.
    pub fn new() -> Self {
        Environment {
            frames: vec![Frame::new()],
        }
    }

    /// Bind `name` in the innermost frame. Never fails; an existing binding
    /// of the same name is shadowed, not replaced.
    pub fn create_symbol(&mut self, name: &str, value: Value, kind: BindingKind) {
        let binding = Binding {
            name: name.to_owned(),
            value,
            kind,
        };
        match self.frames.last_mut() {
            Some(frame) => frame.push(binding),
            None => self.frames.push(vec![binding]),
        }
    }

    /// Replace the nearest existing binding of `name`.
    pub fn set_symbol(&mut self, name: &str, value: Value, kind: BindingKind) -> Result<(), Error> {
        let binding = self
            .frames
            .iter_mut()
            .rev()
            .flat_map(|frame| frame.iter_mut().rev())
            .find(|binding| binding.name == name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_owned()))?;

        binding.value = value;
        binding.kind = kind;
        Ok(())
    }

    /// Value of the nearest binding of `name`, if any.
    pub fn read_symbol(&self, name: &str) -> Option<&Value> {
        self.read_binding(name).map(|(value, _)| value)
    }

    /// Value and kind of the nearest binding of `name`, if any.
    pub fn read_binding(&self, name: &str) -> Option<(&Value, BindingKind)> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .find(|binding| binding.name == name)
            .map(|binding| (&binding.value, binding.kind))
    }

    pub fn begin_block(&mut self) {
        self.frames.push(Frame::new());
        trace!(depth = self.frames.len(), "begin block");
    }

    /// Pop the innermost frame. The global frame is never popped.
    pub fn end_block(&mut self) {
        if self.frames.len() > 1 {
            self.frames.pop();
            trace!(depth = self.frames.len(), "end block");
        } else {
            warn!("end_block without matching begin_block");
        }
    }

    /// Number of frames, including the global one.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// All bindings in lookup order: innermost frame first, newest first.
    /// Shadowed bindings are included.
    pub fn bindings(&self) -> Vec<(String, BindingKind, Value)> {
        self.frames
            .iter()
            .rev()
            .flat_map(|frame| frame.iter().rev())
            .map(|binding| (binding.name.clone(), binding.kind, binding.value.clone()))
            .collect()
    }
}

/// Lists frames outermost first. Function bindings print as `#<function>`.
impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, frame) in self.frames.iter().enumerate() {
            writeln!(f, "frame {index}:")?;
            for binding in frame.iter().rev() {
                match binding.kind {
                    BindingKind::Variable => writeln!(f, "  {} = {}", binding.name, binding.value)?,
                    BindingKind::Function => writeln!(f, "  {} = #<function>", binding.name)?,
                }
            }
        }
        Ok(())
    }
}
