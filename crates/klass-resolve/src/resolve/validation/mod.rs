//! Semantic validation.
//!
//! Earlier phases store every lookup as a [`Resolution`](crate::Resolution)
//! and never report. This phase reads the finished compiler state and turns
//! failed resolutions and rule violations into diagnostics.
//!
//! # What This Phase Does
//!
//! 1. **Classes** - keys, ids, transient classes, version ends
//! 2. **Inheritance** - `extends` and `implements` targets, forward
//!    references, cycles, redundant interfaces, member type references
//! 3. **Properties** - temporal, audit, version and user id rules
//! 4. **Criteria** - member paths, operators, variables, order-by clauses,
//!    foreign keys
//! 5. **Projections** and **services**
//!
//! # What This Phase Does NOT Do
//!
//! - **No mutation** - the state is only read
//! - **No duplicate or naming checks** - see `duplicates` and `names`
//!
//! # Pipeline Position
//!
//! ```text
//! ... → Duplicates → Names → Validation → Assembly
//!                            ^^^^^^^^^^
//!                            YOU ARE HERE
//! ```

mod classes;
mod criteria;
mod inheritance;
mod projections;
mod properties;
mod services;

use super::CompileContext;
use crate::error::ErrorKind;
use klass_ast::foundation::{Span, UnitId};

/// A diagnostic collected while the state is borrowed.
#[derive(Debug)]
struct Finding {
    kind: ErrorKind,
    unit: UnitId,
    span: Span,
    message: String,
}

#[derive(Debug, Default)]
struct Findings(Vec<Finding>);

impl Findings {
    fn push(&mut self, kind: ErrorKind, unit: UnitId, span: Span, message: String) {
        self.0.push(Finding {
            kind,
            unit,
            span,
            message,
        });
    }
}

pub fn validate(cx: &mut CompileContext<'_>) {
    let _span = tracing::debug_span!("validate").entered();

    let mut findings = Findings::default();
    let cx_ref: &CompileContext<'_> = cx;
    classes::check(cx_ref, &mut findings);
    inheritance::check(cx_ref, &mut findings);
    properties::check(cx_ref, &mut findings);
    criteria::check(cx_ref, &mut findings);
    projections::check(cx_ref, &mut findings);
    services::check(cx_ref, &mut findings);

    tracing::debug!(findings = findings.0.len(), "validation done");
    for finding in findings.0 {
        cx.report(finding.kind, finding.unit, finding.span, finding.message);
    }
}
