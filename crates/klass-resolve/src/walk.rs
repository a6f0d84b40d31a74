//! Explicit walk state.
//!
//! Phases walk units top-down and need to know which unit, classifier,
//! association, service group or service they are inside. That context lives
//! on a [`WalkStack`] rather than in mutable "current" fields, so an
//! unbalanced enter/exit is detected instead of silently corrupting state.

use crate::error::InternalError;
use crate::state::{AssociationIdx, ClassifierIdx, ServiceGroupIdx, ServiceIdx};
use klass_ast::foundation::UnitId;

/// One open scope of a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    Unit(UnitId),
    Classifier(ClassifierIdx),
    Association(AssociationIdx),
    ServiceGroup(ServiceGroupIdx),
    Service(ServiceIdx),
}

impl Frame {
    pub fn kind(&self) -> &'static str {
        match self {
            Frame::Unit(_) => "unit",
            Frame::Classifier(_) => "classifier",
            Frame::Association(_) => "association",
            Frame::ServiceGroup(_) => "service group",
            Frame::Service(_) => "service",
        }
    }
}

#[derive(Debug, Default)]
pub struct WalkStack {
    frames: Vec<Frame>,
}

impl WalkStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a scope. A scope of the same kind must not already be open.
    pub fn enter(&mut self, frame: Frame) -> Result<(), InternalError> {
        if self.frames.iter().any(|open| open.kind() == frame.kind()) {
            return Err(InternalError::ReentrantWalk { kind: frame.kind() });
        }
        self.frames.push(frame);
        Ok(())
    }

    /// Close the innermost scope, which must be of the same kind as `frame`.
    pub fn exit(&mut self, frame: Frame) -> Result<(), InternalError> {
        match self.frames.last() {
            Some(open) if open.kind() == frame.kind() => {
                self.frames.pop();
                Ok(())
            }
            Some(open) => Err(InternalError::UnbalancedWalk {
                expected: frame.kind(),
                found: open.kind(),
            }),
            None => Err(InternalError::UnbalancedWalk {
                expected: frame.kind(),
                found: "nothing",
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn unit(&self) -> Option<UnitId> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Unit(id) => Some(*id),
            _ => None,
        })
    }

    pub fn classifier(&self) -> Option<ClassifierIdx> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Classifier(idx) => Some(*idx),
            _ => None,
        })
    }

    pub fn association(&self) -> Option<AssociationIdx> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Association(idx) => Some(*idx),
            _ => None,
        })
    }

    pub fn service_group(&self) -> Option<ServiceGroupIdx> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::ServiceGroup(idx) => Some(*idx),
            _ => None,
        })
    }

    pub fn service(&self) -> Option<ServiceIdx> {
        self.frames.iter().rev().find_map(|f| match f {
            Frame::Service(idx) => Some(*idx),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::KlassIdx;

    #[test]
    fn test_nested_frames() {
        let mut stack = WalkStack::new();
        stack.enter(Frame::Unit(UnitId(2))).unwrap();
        stack
            .enter(Frame::Classifier(ClassifierIdx::Klass(KlassIdx(0))))
            .unwrap();

        assert_eq!(stack.unit(), Some(UnitId(2)));
        assert_eq!(stack.classifier(), Some(ClassifierIdx::Klass(KlassIdx(0))));

        stack
            .exit(Frame::Classifier(ClassifierIdx::Klass(KlassIdx(0))))
            .unwrap();
        stack.exit(Frame::Unit(UnitId(2))).unwrap();
        assert!(stack.is_empty());
    }

    #[test]
    fn test_reentering_same_kind_is_fatal() {
        let mut stack = WalkStack::new();
        stack.enter(Frame::Unit(UnitId(0))).unwrap();
        let err = stack.enter(Frame::Unit(UnitId(1))).unwrap_err();
        assert_eq!(err, InternalError::ReentrantWalk { kind: "unit" });
    }

    #[test]
    fn test_wrong_exit_is_fatal() {
        let mut stack = WalkStack::new();
        stack.enter(Frame::Unit(UnitId(0))).unwrap();
        let err = stack
            .exit(Frame::Classifier(ClassifierIdx::Klass(KlassIdx(0))))
            .unwrap_err();
        assert_eq!(
            err,
            InternalError::UnbalancedWalk {
                expected: "classifier",
                found: "unit"
            }
        );

        let mut empty = WalkStack::new();
        assert!(empty.exit(Frame::Unit(UnitId(0))).is_err());
    }
}
