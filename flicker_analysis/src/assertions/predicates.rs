// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ready-made frame predicates for [`AssertionsChecker<Frame>`](super::AssertionsChecker).
//!
//! Each function returns a closure suitable for
//! [`add`](super::AssertionsChecker::add); the closure's error string
//! explains which nodes made the check fail.

use flicker_core::geometry::Rect;
use flicker_core::matcher::ComponentMatcher;
use flicker_core::scene::{Frame, SceneNode};

/// Boxed frame predicate.
pub type FramePredicate = super::Predicate<Frame>;

fn describe(node: &SceneNode) -> String {
    format!("{} ({})", node.stable_id(), node.visibility_reason())
}

fn list(nodes: &[&SceneNode]) -> String {
    nodes.iter().map(|n| describe(n)).collect::<Vec<_>>().join(", ")
}

/// Some node matches.
pub fn exists(matcher: ComponentMatcher) -> impl Fn(&Frame) -> Result<(), String> + Send + Sync {
    move |frame| {
        if frame.find(&matcher).next().is_some() {
            Ok(())
        } else {
            Err(format!("{matcher} does not exist"))
        }
    }
}

/// No node matches.
pub fn not_exists(matcher: ComponentMatcher) -> impl Fn(&Frame) -> Result<(), String> + Send + Sync {
    move |frame| {
        let found: Vec<_> = frame.find(&matcher).collect();
        if found.is_empty() {
            Ok(())
        } else {
            Err(format!("{matcher} exists: {}", list(&found)))
        }
    }
}

/// At least one matching node is visible.
pub fn is_visible(matcher: ComponentMatcher) -> impl Fn(&Frame) -> Result<(), String> + Send + Sync {
    move |frame| {
        let found: Vec<_> = frame.find(&matcher).collect();
        if found.iter().any(|n| n.is_visible()) {
            Ok(())
        } else if found.is_empty() {
            Err(format!("{matcher} is not visible: not found"))
        } else {
            Err(format!("{matcher} is not visible: {}", list(&found)))
        }
    }
}

/// No matching node is visible. A missing node counts as invisible.
pub fn is_invisible(matcher: ComponentMatcher) -> impl Fn(&Frame) -> Result<(), String> + Send + Sync {
    move |frame| {
        let visible: Vec<_> = frame.find(&matcher).filter(|n| n.is_visible()).collect();
        if visible.is_empty() {
            Ok(())
        } else {
            Err(format!("{matcher} is visible: {}", list(&visible)))
        }
    }
}

/// The visible area of matching nodes covers `rect`.
pub fn visible_region_covers_at_least(
    matcher: ComponentMatcher,
    rect: Rect,
) -> impl Fn(&Frame) -> Result<(), String> + Send + Sync {
    move |frame| {
        let region = frame.visible_region(&matcher);
        if region.covers_at_least(rect) {
            Ok(())
        } else {
            let missing = flicker_core::geometry::Region::from_rect(rect).subtract(&region);
            Err(format!(
                "{matcher} visible region {:?} does not cover {rect}; uncovered {:?}",
                region.bounds(),
                missing.rects()
            ))
        }
    }
}

/// Every matching node is hidden behind opaque nodes, and at least one
/// node matches.
pub fn is_occluded(matcher: ComponentMatcher) -> impl Fn(&Frame) -> Result<(), String> + Send + Sync {
    move |frame| {
        let found: Vec<_> = frame.find(&matcher).collect();
        if found.is_empty() {
            return Err(format!("{matcher} does not exist"));
        }
        let exposed: Vec<_> = found
            .into_iter()
            .filter(|n| n.occluded_by().is_empty())
            .collect();
        if exposed.is_empty() {
            Ok(())
        } else {
            Err(format!("{matcher} is not occluded: {}", list(&exposed)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_core::matcher::ComponentName;
    use flicker_core::scene::{FrameBuilder, RawNode};
    use flicker_core::time::Timestamp;

    fn app() -> ComponentMatcher {
        ComponentMatcher::name(ComponentName::new("com.example", "com.example.Main"))
    }

    fn frame(app_on_top: bool) -> Frame {
        let app_z = if app_on_top { 2 } else { 0 };
        FrameBuilder::new(Timestamp::from_elapsed(1))
            .node(RawNode::opaque_surface(1, "Display 0", Rect::new(0, 0, 100, 200)).with_buffer(false))
            .node(
                RawNode::opaque_surface(2, "com.example/com.example.Main#3", Rect::new(0, 0, 100, 200))
                    .with_parent(1)
                    .with_z(app_z),
            )
            .node(
                RawNode::opaque_surface(3, "Wallpaper BBQ wrapper#4", Rect::new(0, 0, 100, 200))
                    .with_parent(1)
                    .with_z(1),
            )
            .build()
            .unwrap()
    }

    #[test]
    fn visibility_predicates() {
        let top = frame(true);
        assert!(exists(app())(&top).is_ok());
        assert!(is_visible(app())(&top).is_ok());
        assert!(is_invisible(ComponentMatcher::WALLPAPER)(&top).is_ok(), "wallpaper is covered");
        assert!(is_occluded(ComponentMatcher::WALLPAPER)(&top).is_ok());

        let bottom = frame(false);
        let err = is_visible(app())(&bottom).unwrap_err();
        assert!(err.contains("Occluded by"), "got: {err}");
        assert!(is_invisible(app())(&bottom).is_ok());
    }

    #[test]
    fn missing_component() {
        let f = frame(true);
        let missing = ComponentMatcher::IME;
        assert!(not_exists(missing.clone())(&f).is_ok());
        assert!(is_invisible(missing.clone())(&f).is_ok(), "absent counts as invisible");
        let err = is_visible(missing.clone())(&f).unwrap_err();
        assert!(err.ends_with("not found"), "got: {err}");
        assert!(is_occluded(missing)(&f).is_err(), "absent is not occluded");
        assert!(not_exists(app())(&f).is_err());
    }

    #[test]
    fn region_coverage() {
        let f = frame(true);
        assert!(visible_region_covers_at_least(app(), Rect::new(0, 0, 100, 200))(&f).is_ok());
        let err = visible_region_covers_at_least(app(), Rect::new(0, 0, 100, 300))(&f).unwrap_err();
        assert!(err.contains("uncovered"), "got: {err}");
    }
}
