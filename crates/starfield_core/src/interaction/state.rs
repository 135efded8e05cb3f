//! Transient pointer-driven UI state.
//!
//! # Responsibility
//! - Track the hovered star, the focused (active) category and an
//!   in-progress fragment drag.
//! - Resolve drag targets by nearest on-screen category anchor.
//!
//! # Invariants
//! - At most one star is hovered at a time.
//! - Clicking the active category again clears it.
//! - A drag release with no anchor in range snaps back and changes nothing.
//! - Nothing here is persisted and nothing here is timer-driven.

use crate::config::InteractionConfig;
use crate::model::category::CategoryId;
use crate::model::star::{PendingId, StarId};
use log::debug;
use serde::{Deserialize, Serialize};

/// Screen-space point in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: f32,
    pub y: f32,
}

impl ScreenPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: ScreenPoint) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// On-screen drop anchor for one category.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryAnchor {
    pub category: CategoryId,
    pub position: ScreenPoint,
}

/// Discrete pointer/gesture events consumed by the state machine.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerEvent {
    StarEnter(StarId),
    StarLeave(StarId),
    StarClick { star: StarId, category: CategoryId },
    CategoryClick(CategoryId),
    EmptyClick,
    DragStart { fragment: PendingId, at: ScreenPoint },
    DragMove { at: ScreenPoint },
    DragEnd { at: ScreenPoint },
}

/// In-progress fragment drag.
#[derive(Debug, Clone, PartialEq)]
pub struct DragState {
    pub fragment: PendingId,
    pub origin: ScreenPoint,
    pub pointer: ScreenPoint,
    pub target: Option<CategoryId>,
}

/// Result of releasing a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Promote `fragment` into `category`.
    Drop {
        fragment: PendingId,
        category: CategoryId,
        origin: ScreenPoint,
    },
    /// Return the fragment to `origin`; it stays pending.
    SnapBack {
        fragment: PendingId,
        origin: ScreenPoint,
    },
}

#[derive(Debug, Clone, Default)]
pub struct InteractionState {
    hovered_star: Option<StarId>,
    active_category: Option<CategoryId>,
    drag: Option<DragState>,
    config: InteractionConfig,
}

impl InteractionState {
    pub fn new(config: InteractionConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn hovered_star(&self) -> Option<StarId> {
        self.hovered_star
    }

    pub fn active_category(&self) -> Option<&str> {
        self.active_category.as_deref()
    }

    pub fn drag(&self) -> Option<&DragState> {
        self.drag.as_ref()
    }

    pub fn drag_target(&self) -> Option<&str> {
        self.drag.as_ref().and_then(|drag| drag.target.as_deref())
    }

    /// Applies one event. Only `DragEnd` yields an outcome.
    pub fn handle(
        &mut self,
        event: PointerEvent,
        anchors: &[CategoryAnchor],
    ) -> Option<DragOutcome> {
        match event {
            PointerEvent::StarEnter(star) => self.pointer_enter(star),
            PointerEvent::StarLeave(star) => self.pointer_leave(star),
            PointerEvent::StarClick { category, .. } => self.click_star(category),
            PointerEvent::CategoryClick(category) => self.click_category(category),
            PointerEvent::EmptyClick => self.click_empty(),
            PointerEvent::DragStart { fragment, at } => self.drag_start(fragment, at),
            PointerEvent::DragMove { at } => self.drag_move(at, anchors),
            PointerEvent::DragEnd { at } => return self.drag_end(at, anchors),
        }
        None
    }

    pub fn pointer_enter(&mut self, star: StarId) {
        self.hovered_star = Some(star);
    }

    /// Clears hover only when the leaving star is the hovered one.
    pub fn pointer_leave(&mut self, star: StarId) {
        if self.hovered_star == Some(star) {
            self.hovered_star = None;
        }
    }

    pub fn click_star(&mut self, category: CategoryId) {
        self.active_category = Some(category);
    }

    /// Toggles focus on `category`.
    pub fn click_category(&mut self, category: CategoryId) {
        if self.active_category.as_deref() == Some(category.as_str()) {
            self.active_category = None;
        } else {
            self.active_category = Some(category);
        }
    }

    pub fn click_empty(&mut self) {
        self.active_category = None;
    }

    pub fn drag_start(&mut self, fragment: PendingId, at: ScreenPoint) {
        self.drag = Some(DragState {
            fragment,
            origin: at,
            pointer: at,
            target: None,
        });
    }

    pub fn drag_move(&mut self, at: ScreenPoint, anchors: &[CategoryAnchor]) {
        let threshold = self.config.drag_snap_threshold_px;
        if let Some(drag) = self.drag.as_mut() {
            drag.pointer = at;
            drag.target = nearest_anchor(anchors, at, threshold).map(|a| a.category.clone());
        }
    }

    /// Ends the drag, re-resolving the target at the release point.
    pub fn drag_end(&mut self, at: ScreenPoint, anchors: &[CategoryAnchor]) -> Option<DragOutcome> {
        let drag = self.drag.take()?;
        let target = nearest_anchor(anchors, at, self.config.drag_snap_threshold_px)
            .map(|anchor| anchor.category.clone());
        match target {
            Some(category) => Some(DragOutcome::Drop {
                fragment: drag.fragment,
                category,
                origin: drag.origin,
            }),
            None => {
                debug!(
                    "event=drag_snap_back module=interaction status=ok pending_id={}",
                    drag.fragment
                );
                Some(DragOutcome::SnapBack {
                    fragment: drag.fragment,
                    origin: drag.origin,
                })
            }
        }
    }

    /// Drops any reference to a star that no longer exists.
    pub fn forget_star(&mut self, star: StarId) {
        if self.hovered_star == Some(star) {
            self.hovered_star = None;
        }
    }

    /// Abandons a drag whose fragment no longer exists.
    pub fn forget_fragment(&mut self, fragment: PendingId) {
        if self.drag.as_ref().map(|drag| drag.fragment) == Some(fragment) {
            self.drag = None;
        }
    }
}

/// Nearest anchor within `threshold` pixels of `at`, if any.
pub fn nearest_anchor(
    anchors: &[CategoryAnchor],
    at: ScreenPoint,
    threshold: f32,
) -> Option<&CategoryAnchor> {
    anchors
        .iter()
        .map(|anchor| (anchor, anchor.position.distance_to(at)))
        .filter(|(_, distance)| *distance <= threshold)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(anchor, _)| anchor)
}

#[cfg(test)]
mod tests {
    use super::{nearest_anchor, CategoryAnchor, DragOutcome, InteractionState, ScreenPoint};
    use crate::config::InteractionConfig;
    use uuid::Uuid;

    fn anchors() -> Vec<CategoryAnchor> {
        vec![
            CategoryAnchor {
                category: "a".to_string(),
                position: ScreenPoint::new(100.0, 500.0),
            },
            CategoryAnchor {
                category: "b".to_string(),
                position: ScreenPoint::new(300.0, 500.0),
            },
        ]
    }

    #[test]
    fn category_click_toggles() {
        let mut state = InteractionState::default();
        state.click_category("a".to_string());
        assert_eq!(state.active_category(), Some("a"));
        state.click_category("a".to_string());
        assert_eq!(state.active_category(), None);
    }

    #[test]
    fn clicking_another_category_switches_focus() {
        let mut state = InteractionState::default();
        state.click_category("a".to_string());
        state.click_category("b".to_string());
        assert_eq!(state.active_category(), Some("b"));
        state.click_empty();
        assert_eq!(state.active_category(), None);
    }

    #[test]
    fn leave_for_other_star_keeps_hover() {
        let mut state = InteractionState::default();
        let hovered = Uuid::new_v4();
        state.pointer_enter(hovered);
        state.pointer_leave(Uuid::new_v4());
        assert_eq!(state.hovered_star(), Some(hovered));
        state.pointer_leave(hovered);
        assert_eq!(state.hovered_star(), None);
    }

    #[test]
    fn nearest_anchor_respects_threshold() {
        let anchors = anchors();
        let hit = nearest_anchor(&anchors, ScreenPoint::new(260.0, 480.0), 150.0).unwrap();
        assert_eq!(hit.category, "b");
        assert!(nearest_anchor(&anchors, ScreenPoint::new(700.0, 100.0), 150.0).is_none());
    }

    #[test]
    fn drag_move_tracks_target_and_end_drops() {
        let mut state = InteractionState::new(InteractionConfig {
            drag_snap_threshold_px: 140.0,
        });
        let fragment = Uuid::new_v4();
        let origin = ScreenPoint::new(400.0, 100.0);
        state.drag_start(fragment, origin);
        state.drag_move(ScreenPoint::new(110.0, 450.0), &anchors());
        assert_eq!(state.drag_target(), Some("a"));

        let outcome = state.drag_end(ScreenPoint::new(110.0, 450.0), &anchors());
        assert_eq!(
            outcome,
            Some(DragOutcome::Drop {
                fragment,
                category: "a".to_string(),
                origin,
            })
        );
        assert!(state.drag().is_none());
    }

    #[test]
    fn drag_end_out_of_range_snaps_back_to_origin() {
        let mut state = InteractionState::default();
        let fragment = Uuid::new_v4();
        let origin = ScreenPoint::new(400.0, 100.0);
        state.drag_start(fragment, origin);
        let outcome = state.drag_end(ScreenPoint::new(420.0, 120.0), &anchors());
        assert_eq!(outcome, Some(DragOutcome::SnapBack { fragment, origin }));
    }

    #[test]
    fn drag_end_without_drag_is_ignored() {
        let mut state = InteractionState::default();
        assert!(state.drag_end(ScreenPoint::default(), &anchors()).is_none());
    }
}
