//! Scoped resource binding bookkeeping.
//!
//! Render modules bind shaders, textures and meshes for the duration of a
//! draw. Binds are scoped through an RAII guard; anything still bound when
//! a module returns is a defect and gets logged.

use std::cell::RefCell;

/// Stack of currently bound resource labels.
#[derive(Debug, Default)]
pub struct BindingTracker {
    bound: RefCell<Vec<&'static str>>,
}

impl BindingTracker {
    pub fn bind<'a>(&'a self, label: &'static str) -> BindGuard<'a> {
        self.bound.borrow_mut().push(label);
        BindGuard {
            tracker: self,
            label,
        }
    }

    pub fn is_clean(&self) -> bool {
        self.bound.borrow().is_empty()
    }

    /// Labels still bound. Used for the post-module leak check.
    pub fn leaked(&self) -> Vec<&'static str> {
        self.bound.borrow().clone()
    }

    pub fn reset(&self) {
        self.bound.borrow_mut().clear();
    }

    fn release(&self, label: &'static str) {
        let mut bound = self.bound.borrow_mut();
        if let Some(index) = bound.iter().rposition(|&l| l == label) {
            bound.remove(index);
        }
    }
}

/// Releases its binding when dropped.
#[must_use = "dropping the guard immediately unbinds the resource"]
pub struct BindGuard<'a> {
    tracker: &'a BindingTracker,
    label: &'static str,
}

impl Drop for BindGuard<'_> {
    fn drop(&mut self) {
        self.tracker.release(self.label);
    }
}
