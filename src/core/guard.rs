//! Guarded cleanup actions for the release flow
//!
//! A release is a multi-stage, partially irreversible operation: once a
//! mutating step has run, a later failure must undo it. Each mutating step
//! registers an undo action here before it runs; the orchestrator unwinds
//! the stack on failure and disarms every guard once the release is fully
//! published.
//!
//! Undo actions run in strict reverse registration order, so steps that
//! depend on earlier ones are undone before the steps they depended on.

use crate::core::error::{RelResult, print_error};

/// Handle to a registered guard.
///
/// Consumed by [`UndoStack::disarm`], so a guard can be disarmed at most
/// once.
#[derive(Debug)]
pub struct GuardHandle(usize);

struct Guard<'a> {
  label: String,
  armed: bool,
  undo: Option<Box<dyn FnOnce() -> RelResult<()> + 'a>>,
}

/// Stack of armed undo actions.
pub struct UndoStack<'a> {
  guards: Vec<Guard<'a>>,
}

impl<'a> UndoStack<'a> {
  pub fn new() -> Self {
    Self { guards: Vec::new() }
  }

  /// Register an undo action for a forward step about to run.
  ///
  /// The guard starts armed: if the stack is unwound before the returned
  /// handle is disarmed, `undo` will run.
  pub fn push(&mut self, label: impl Into<String>, undo: impl FnOnce() -> RelResult<()> + 'a) -> GuardHandle {
    self.guards.push(Guard {
      label: label.into(),
      armed: true,
      undo: Some(Box::new(undo)),
    });
    GuardHandle(self.guards.len() - 1)
  }

  /// Keep the forward effect: the undo action will not run.
  pub fn disarm(&mut self, handle: GuardHandle) {
    self.guards[handle.0].armed = false;
  }

  /// Number of guards still armed
  #[allow(dead_code)] // Used in tests
  pub fn armed_count(&self) -> usize {
    self.guards.iter().filter(|g| g.armed).count()
  }

  /// Run every armed undo action, last registered first.
  ///
  /// An undo failure is reported on stderr and does not stop the remaining
  /// undos; some effects can only be cleaned up manually and the operator
  /// needs to see every one of them.
  pub fn unwind(mut self) {
    for guard in self.guards.iter_mut().rev() {
      if !guard.armed {
        continue;
      }
      let Some(undo) = guard.undo.take() else { continue };
      if let Err(err) = undo() {
        eprintln!("ACTION REQUIRED: could not undo '{}':", guard.label);
        print_error(&err);
      }
    }
  }
}

impl Default for UndoStack<'_> {
  fn default() -> Self {
    Self::new()
  }
}
