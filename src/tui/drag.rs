/// Transient drag-to-reorder state: which task is being dragged and which
/// task it currently hovers. Cleared on every drop or release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    dragging: Option<u64>,
    over: Option<u64>,
}

impl DragState {
    pub fn pick_up(&mut self, task_id: u64) {
        self.dragging = Some(task_id);
        self.over = None;
    }

    /// Mark `task_id` as the drop target. Hovering the dragged task itself
    /// clears the target.
    pub fn hover(&mut self, task_id: u64) {
        match self.dragging {
            Some(d) if d != task_id => self.over = Some(task_id),
            Some(_) => self.over = None,
            None => {}
        }
    }

    pub fn leave(&mut self) {
        self.over = None;
    }

    /// Finish the drag over `target`. Returns `(moved, target)` when the drop
    /// should reorder.
    pub fn drop_on(&mut self, target: u64) -> Option<(u64, u64)> {
        let moved = self.dragging;
        self.release();
        match moved {
            Some(m) if m != target => Some((m, target)),
            _ => None,
        }
    }

    /// Finish the drag over the current hover target, if any
    pub fn drop_here(&mut self) -> Option<(u64, u64)> {
        match self.over {
            Some(target) => self.drop_on(target),
            None => {
                self.release();
                None
            }
        }
    }

    pub fn release(&mut self) {
        self.dragging = None;
        self.over = None;
    }

    pub fn dragging(&self) -> Option<u64> {
        self.dragging
    }

    pub fn target(&self) -> Option<u64> {
        self.over
    }

    pub fn is_active(&self) -> bool {
        self.dragging.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drop_on_other_task_reorders() {
        let mut drag = DragState::default();
        drag.pick_up(3);
        drag.hover(7);
        assert_eq!(drag.target(), Some(7));
        assert_eq!(drag.drop_here(), Some((3, 7)));
        assert_eq!(drag, DragState::default());
    }

    #[test]
    fn drop_on_self_is_noop() {
        let mut drag = DragState::default();
        drag.pick_up(3);
        assert_eq!(drag.drop_on(3), None);
        assert!(!drag.is_active());
    }

    #[test]
    fn hover_without_drag_is_ignored() {
        let mut drag = DragState::default();
        drag.hover(2);
        assert_eq!(drag.target(), None);
        assert_eq!(drag.drop_on(2), None);
    }

    #[test]
    fn hovering_dragged_task_clears_target() {
        let mut drag = DragState::default();
        drag.pick_up(1);
        drag.hover(2);
        drag.hover(1);
        assert_eq!(drag.target(), None);
    }

    #[test]
    fn leave_then_drop_here_releases() {
        let mut drag = DragState::default();
        drag.pick_up(1);
        drag.hover(2);
        drag.leave();
        assert_eq!(drag.drop_here(), None);
        assert!(!drag.is_active());
    }

    #[test]
    fn release_clears_everything() {
        let mut drag = DragState::default();
        drag.pick_up(4);
        drag.hover(5);
        drag.release();
        assert_eq!(drag.dragging(), None);
        assert_eq!(drag.target(), None);
    }
}
