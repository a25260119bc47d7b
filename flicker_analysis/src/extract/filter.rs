// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;
use std::borrow::Cow;
use std::sync::Arc;

use flicker_core::matcher::ComponentMatcher;
use flicker_core::scene::Frame;
use flicker_core::trace::Trace;

use super::marker::Marker;
use super::transition::{TransitMode, Transition, TransitionType};

/// What a filter may consult besides the transition itself.
#[derive(Clone, Copy, Debug)]
pub struct FilterContext<'a> {
    /// The marker being matched.
    pub marker: &'a Marker,
    /// The full frame trace, for resolving node ids.
    pub trace: &'a Trace<Frame>,
}

type Test = dyn Fn(&Transition, &FilterContext<'_>) -> bool + Send + Sync;

/// A named predicate deciding which transitions survive a pipeline stage.
#[derive(Clone)]
pub struct TransitionFilter {
    name: Cow<'static, str>,
    test: Arc<Test>,
}

impl fmt::Debug for TransitionFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TransitionFilter").field(&self.name).finish()
    }
}

impl TransitionFilter {
    /// Wraps a predicate.
    pub fn new<F>(name: impl Into<Cow<'static, str>>, test: F) -> Self
    where
        F: Fn(&Transition, &FilterContext<'_>) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Name used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if `transition` should be kept.
    #[must_use]
    pub fn keeps(&self, transition: &Transition, ctx: &FilterContext<'_>) -> bool {
        (self.test)(transition, ctx)
    }

    /// Keeps transitions both filters keep.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        let name = format!("{} and {}", self.name, other.name);
        Self::new(name, move |t, ctx| self.keeps(t, ctx) && other.keeps(t, ctx))
    }

    /// Keeps transitions that open or raise at least one element, covering
    /// both cold and warm launches.
    #[must_use]
    pub fn open_app() -> Self {
        Self::new("open_app", |t, _| t.opened().next().is_some())
    }

    /// Keeps transitions of one kind.
    #[must_use]
    pub fn of_type(kind: TransitionType) -> Self {
        Self::new(format!("of_type({kind:?})"), move |t, _| t.kind == kind)
    }

    /// Drops open transitions whose single opened element matches
    /// `matcher`, such as a permission dialog shown on top of the app.
    #[must_use]
    pub fn exclude_opening(matcher: ComponentMatcher) -> Self {
        Self::new(format!("exclude_opening({matcher})"), move |t, ctx| {
            let [change] = t.changes.as_slice() else {
                return true;
            };
            if t.kind != TransitionType::Open || change.mode != TransitMode::Open {
                return true;
            }
            match ctx.trace.find_node(change.node_id) {
                Some((_, node)) => !matcher.matches_element(node),
                None => {
                    tracing::debug!(
                        transition = t.id,
                        node = change.node_id.get(),
                        "opened node not found in trace"
                    );
                    true
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flicker_core::geometry::Rect;
    use flicker_core::matcher::ComponentName;
    use flicker_core::scene::{FrameBuilder, RawNode};
    use flicker_core::time::{TimeField, Timestamp};

    fn trace() -> Trace<Frame> {
        let frame = FrameBuilder::new(Timestamp::from_elapsed(1))
            .node(RawNode::opaque_surface(1, "com.app/com.app.Main#1", Rect::new(0, 0, 10, 10)))
            .node(RawNode::opaque_surface(
                2,
                "com.permissions/com.permissions.Grant#2",
                Rect::new(0, 0, 5, 5),
            ))
            .build()
            .unwrap();
        Trace::new(vec![frame], TimeField::Elapsed).unwrap()
    }

    fn marker() -> Marker {
        Marker::new("LAUNCH", Timestamp::from_elapsed(1), Timestamp::from_elapsed(9))
    }

    #[test]
    fn predefined_filters() {
        let (trace, marker) = (trace(), marker());
        let ctx = FilterContext {
            marker: &marker,
            trace: &trace,
        };
        let launch = Transition::new(1, TransitionType::Open).with_change(TransitMode::Open, 1);
        let dialog = Transition::new(2, TransitionType::Open).with_change(TransitMode::Open, 2);
        let close = Transition::new(3, TransitionType::Close).with_change(TransitMode::Close, 1);

        let open_app = TransitionFilter::open_app();
        assert!(open_app.keeps(&launch, &ctx));
        assert!(!open_app.keeps(&close, &ctx));

        let no_dialog = TransitionFilter::exclude_opening(ComponentMatcher::name(ComponentName::new(
            "com.permissions",
            "com.permissions.Grant",
        )));
        assert!(no_dialog.keeps(&launch, &ctx));
        assert!(!no_dialog.keeps(&dialog, &ctx), "permission dialog is excluded");

        let both = TransitionFilter::of_type(TransitionType::Open).and(no_dialog);
        assert!(both.keeps(&launch, &ctx));
        assert!(!both.keeps(&close, &ctx));
        assert!(both.name().starts_with("of_type(Open) and "), "got {}", both.name());
    }
}
