#![allow(clippy::suspicious_op_assign_impl)]

use std::ops::AddAssign;

use egui::Response;

/// Collects whether any view control moved this frame, so the tile is only
/// re-rendered when something it depends on changed.
#[derive(Default)]
pub struct ViewChanges {
    dirty: bool,
}

impl ViewChanges {
    pub fn new(initial: bool) -> Self {
        Self { dirty: initial }
    }

    pub fn any(&self) -> bool {
        self.dirty
    }
}

impl AddAssign<bool> for ViewChanges {
    fn add_assign(&mut self, rhs: bool) {
        self.dirty |= rhs;
    }
}

impl AddAssign<Response> for ViewChanges {
    fn add_assign(&mut self, rhs: Response) {
        self.dirty |= rhs.changed() || rhs.clicked();
    }
}
