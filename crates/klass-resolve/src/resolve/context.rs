//! Shared state threaded through every phase.

use super::ResolveOptions;
use crate::diagnostics::Diagnostics;
use crate::error::{ErrorKind, InternalError};
use crate::registry::SymbolRegistry;
use crate::state::CompilerState;
use crate::unit::CompilationUnit;
use crate::walk::{Frame, WalkStack};
use klass_ast::foundation::{Span, UnitId};

/// Everything one compilation reads and writes.
///
/// Phases receive `&mut CompileContext` and run strictly one after the
/// other; nothing here is shared between threads.
#[derive(Debug)]
pub struct CompileContext<'o> {
    pub options: &'o ResolveOptions,
    /// Source units followed by macro units in expansion order
    pub units: Vec<CompilationUnit>,
    pub state: CompilerState,
    pub registry: SymbolRegistry,
    pub diagnostics: Diagnostics,
    pub walk: WalkStack,
    macro_depth: u32,
}

impl<'o> CompileContext<'o> {
    pub fn new(options: &'o ResolveOptions, units: Vec<CompilationUnit>) -> Self {
        Self {
            options,
            units,
            state: CompilerState::default(),
            registry: SymbolRegistry::new(),
            diagnostics: Diagnostics::new(),
            walk: WalkStack::new(),
            macro_depth: 0,
        }
    }

    pub fn unit(&self, id: UnitId) -> Option<&CompilationUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Ids of the units handed in by the caller.
    pub fn source_unit_ids(&self) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|unit| !unit.is_macro())
            .map(|unit| unit.id)
            .collect()
    }

    pub fn next_unit_id(&self) -> UnitId {
        UnitId(self.units.iter().map(|unit| unit.id.0 + 1).max().unwrap_or(0))
    }

    pub fn report(&mut self, kind: ErrorKind, unit: UnitId, span: Span, message: String) {
        self.diagnostics.report(kind, unit, span, message);
    }

    /// Run `body` inside a walk frame.
    pub fn in_frame<T>(
        &mut self,
        frame: Frame,
        body: impl FnOnce(&mut Self) -> Result<T, InternalError>,
    ) -> Result<T, InternalError> {
        self.walk.enter(frame)?;
        let result = body(self);
        self.walk.exit(frame)?;
        result
    }

    /// Merge a synthesized unit through `merge`, then keep it.
    ///
    /// The merge runs on a fresh walk stack so the fragment can enter the
    /// same frame kinds the expanding phase has open.
    pub fn expand_macro(
        &mut self,
        unit: CompilationUnit,
        merge: impl FnOnce(&mut Self, &CompilationUnit) -> Result<(), InternalError>,
    ) -> Result<UnitId, InternalError> {
        let max = self.options.max_macro_depth;
        if self.macro_depth >= max {
            return Err(InternalError::MacroDepthExceeded { max });
        }
        tracing::debug!(unit = %unit.id, source = %unit.source_name, "expanding macro");

        self.macro_depth += 1;
        let outer = std::mem::take(&mut self.walk);
        let result = self.in_frame(Frame::Unit(unit.id), |cx| merge(cx, &unit));
        self.walk = outer;
        self.macro_depth -= 1;
        result?;

        let id = unit.id;
        self.units.push(unit);
        Ok(id)
    }
}
