use manos_plate_core::Range;

use super::panels::{Bounds, LinkPanel, PositionTarget};

/// Rendering and focus services provided by the host view.
pub trait EditingView {
    fn anchor_for(&self, target: &PositionTarget) -> Option<Bounds>;
    fn focus_panel(&mut self, panel: LinkPanel);
    fn focus_editable(&mut self);
    fn add_highlight(&mut self, range: &Range);
    fn remove_highlight(&mut self, range: &Range);
}
