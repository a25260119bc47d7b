// Copyright 2026 the Flicker Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matching scene nodes against app components.
//!
//! Windows, activity records, and compositor layers spell the same component
//! differently: a window is titled `pkg/cls`, its layer is `pkg/cls#<n>`, and
//! the activity record wrapping it reads `ActivityRecord{... pkg/.Short ...}`.
//! [`ComponentName`] produces each spelling and [`ComponentMatcher`] picks
//! the one that fits the operation.

use core::fmt;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::scene::{NodeKind, SceneNode};

const ACTIVITY_RECORD_PREFIX: &str = "ActivityRecord{";

/// A `(package, class)` component, either part possibly empty.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentName {
    /// Package name.
    pub package: Cow<'static, str>,
    /// Fully qualified class name, or a bare window title.
    pub class: Cow<'static, str>,
}

impl ComponentName {
    /// Navigation bar.
    pub const NAV_BAR: Self = Self::from_static("", "NavigationBar0");
    /// Taskbar.
    pub const TASK_BAR: Self = Self::from_static("", "Taskbar");
    /// Status bar.
    pub const STATUS_BAR: Self = Self::from_static("", "StatusBar");
    /// Rotation animation layer.
    pub const ROTATION: Self = Self::from_static("", "RotationLayer");
    /// Input method window.
    pub const IME: Self = Self::from_static("", "InputMethod");
    /// Input method snapshot shown during transitions.
    pub const IME_SNAPSHOT: Self = Self::from_static("", "IME-snapshot-surface");
    /// App splash screen.
    pub const SPLASH_SCREEN: Self = Self::from_static("", "Splash Screen");
    /// Task snapshot starting window.
    pub const SNAPSHOT: Self = Self::from_static("", "SnapshotStartingWindow");
    /// Letterbox surfaces.
    pub const LETTERBOX: Self = Self::from_static("", "Letterbox");
    /// Wallpaper container.
    pub const WALLPAPER: Self = Self::from_static("", "Wallpaper BBQ wrapper");
    /// Split-screen divider.
    pub const SPLIT_DIVIDER: Self = Self::from_static("", "StageCoordinatorSplitDivider");
    /// Default launcher activity.
    pub const LAUNCHER: Self = Self::from_static(
        "com.google.android.apps.nexuslauncher",
        "com.google.android.apps.nexuslauncher.NexusLauncherActivity",
    );

    /// Creates a component from static strings.
    #[must_use]
    pub const fn from_static(package: &'static str, class: &'static str) -> Self {
        Self {
            package: Cow::Borrowed(package),
            class: Cow::Borrowed(class),
        }
    }

    /// Creates a component from owned strings.
    #[must_use]
    pub fn new(package: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            package: Cow::Owned(package.into()),
            class: Cow::Owned(class.into()),
        }
    }

    /// Parses `pkg/cls`, expanding a leading `.` in the class to the package.
    #[must_use]
    pub fn parse(flat: &str) -> Option<Self> {
        let (package, class) = flat.split_once('/')?;
        if class.is_empty() {
            return None;
        }
        let class = if class.starts_with('.') {
            format!("{package}{class}")
        } else {
            String::from(class)
        };
        Some(Self::new(package, class))
    }

    /// Recovers a component from a layer name such as `pkg/cls#12`.
    ///
    /// Names without a separator become a class-only component.
    #[must_use]
    pub fn from_layer_name(name: &str) -> Self {
        let base = name.split_once('#').map_or(name, |(head, _)| head);
        Self::parse(base).unwrap_or_else(|| Self::new("", base))
    }

    /// Window title form: `pkg/cls`, or whichever part is present.
    #[must_use]
    pub fn window_name(&self) -> String {
        match (self.package.is_empty(), self.class.is_empty()) {
            (false, false) => format!("{}/{}", self.package, self.class),
            (false, true) => String::from(&*self.package),
            _ => String::from(&*self.class),
        }
    }

    /// Short form with the package prefix of the class collapsed:
    /// `pkg/.Short`.
    #[must_use]
    pub fn short_name(&self) -> String {
        if !self.package.is_empty() {
            if let Some(rest) = self.class.strip_prefix(&*self.package) {
                if rest.starts_with('.') {
                    return format!("{}/{rest}", self.package);
                }
            }
        }
        self.window_name()
    }

    /// Layer form: the window name, with a trailing `#` when it names a
    /// qualified component so that `pkg/cls` does not match `pkg/clsOther`.
    #[must_use]
    pub fn layer_name(&self) -> String {
        let mut name = self.window_name();
        if name.contains('/') && !name.contains('#') {
            name.push('#');
        }
        name
    }
}

impl fmt::Debug for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentName({})", self.window_name())
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.window_name())
    }
}

/// A predicate over scene nodes, in three flavors.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentMatcher {
    /// Matches by component name in the spelling each operation expects.
    Name(ComponentName),
    /// Matches when any inner matcher does.
    AnyOf(Vec<ComponentMatcher>),
    /// Matches the activity record wrapping a component's windows.
    ActivityRecord(ComponentName),
}

impl ComponentMatcher {
    /// Navigation bar.
    pub const NAV_BAR: Self = Self::Name(ComponentName::NAV_BAR);
    /// Status bar.
    pub const STATUS_BAR: Self = Self::Name(ComponentName::STATUS_BAR);
    /// Input method.
    pub const IME: Self = Self::Name(ComponentName::IME);
    /// Input method snapshot.
    pub const IME_SNAPSHOT: Self = Self::Name(ComponentName::IME_SNAPSHOT);
    /// Splash screen.
    pub const SPLASH_SCREEN: Self = Self::Name(ComponentName::SPLASH_SCREEN);
    /// Snapshot starting window.
    pub const SNAPSHOT: Self = Self::Name(ComponentName::SNAPSHOT);
    /// Launcher.
    pub const LAUNCHER: Self = Self::Name(ComponentName::LAUNCHER);
    /// Wallpaper.
    pub const WALLPAPER: Self = Self::Name(ComponentName::WALLPAPER);

    /// Matches a component by name.
    #[must_use]
    pub fn name(component: ComponentName) -> Self {
        Self::Name(component)
    }

    /// Matches either matcher, flattening nested any-of lists.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        let mut all = match self {
            Self::AnyOf(list) => list,
            single => vec![single],
        };
        match other {
            Self::AnyOf(list) => all.extend(list),
            single => all.push(single),
        }
        Self::AnyOf(all)
    }

    /// Does `node` look like a window of this component?
    #[must_use]
    pub fn matches_window(&self, node: &SceneNode) -> bool {
        match self {
            Self::Name(c) => node.name().contains(&c.window_name()),
            Self::AnyOf(list) => list.iter().any(|m| m.matches_window(node)),
            Self::ActivityRecord(c) => is_activity_record_of(node.name(), c),
        }
    }

    /// Does `node` look like the activity of this component?
    #[must_use]
    pub fn matches_activity(&self, node: &SceneNode) -> bool {
        match self {
            Self::Name(c) => {
                node.kind() == NodeKind::Activity
                    && (node.name().contains(&c.window_name()) || node.name().contains(&c.short_name()))
            }
            Self::AnyOf(list) => list.iter().any(|m| m.matches_activity(node)),
            Self::ActivityRecord(c) => is_activity_record_of(node.name(), c),
        }
    }

    /// Does `node` look like a compositor element of this component?
    #[must_use]
    pub fn matches_element(&self, node: &SceneNode) -> bool {
        match self {
            Self::Name(c) => node.name().contains(&c.layer_name()),
            Self::AnyOf(list) => list.iter().any(|m| m.matches_element(node)),
            Self::ActivityRecord(c) => is_activity_record_of(node.name(), c),
        }
    }
}

fn is_activity_record_of(name: &str, component: &ComponentName) -> bool {
    name.starts_with(ACTIVITY_RECORD_PREFIX) && name.contains(&component.short_name())
}

impl From<ComponentName> for ComponentMatcher {
    fn from(component: ComponentName) -> Self {
        Self::Name(component)
    }
}

impl fmt::Display for ComponentMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Name(c) => write!(f, "{c}"),
            Self::ActivityRecord(c) => write!(f, "{ACTIVITY_RECORD_PREFIX}{}}}", c.short_name()),
            Self::AnyOf(list) => {
                for (i, m) in list.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" or ")?;
                    }
                    write!(f, "{m}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::scene::{NodeId, RawNode, build_frame};
    use crate::time::Timestamp;

    fn frame_with(names: &[(&str, NodeKind)]) -> crate::scene::Frame {
        let nodes = names
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| {
                let id = i32::try_from(i).unwrap() + 1;
                RawNode::opaque_surface(id, *name, Rect::new(0, 0, 10, 10))
                    .with_kind(*kind)
                    .with_layer_stack(id.unsigned_abs())
            })
            .collect();
        build_frame(nodes, Vec::new(), Timestamp::from_elapsed(1)).unwrap()
    }

    #[test]
    fn name_forms() {
        let c = ComponentName::new("com.example", "com.example.MainActivity");
        assert_eq!(c.window_name(), "com.example/com.example.MainActivity");
        assert_eq!(c.short_name(), "com.example/.MainActivity");
        assert_eq!(c.layer_name(), "com.example/com.example.MainActivity#");
        assert_eq!(ComponentName::STATUS_BAR.layer_name(), "StatusBar");
    }

    #[test]
    fn parse_and_layer_name_round_trip() {
        let c = ComponentName::parse("com.example/.MainActivity").unwrap();
        assert_eq!(c.class, "com.example.MainActivity");
        assert!(ComponentName::parse("no-separator").is_none(), "needs a slash");
        let from_layer = ComponentName::from_layer_name("com.example/com.example.MainActivity#42");
        assert_eq!(from_layer, c);
        assert_eq!(ComponentName::from_layer_name("StatusBar#3").class, "StatusBar");
    }

    #[test]
    fn operations_use_their_spelling() {
        let app = ComponentName::new("com.example", "com.example.MainActivity");
        let frame = frame_with(&[
            ("com.example/com.example.MainActivity#7", NodeKind::Layer),
            ("ActivityRecord{1f u0 com.example/.MainActivity t12}", NodeKind::Activity),
            ("com.example/com.example.MainActivityOther#8", NodeKind::Layer),
        ]);
        let node = |id| frame.node(NodeId(id)).unwrap();
        let by_name = ComponentMatcher::name(app.clone());
        assert!(by_name.matches_element(node(1)), "layer spelling");
        assert!(!by_name.matches_element(node(3)), "trailing # guards prefixes");
        assert!(by_name.matches_activity(node(2)), "short spelling inside record");
        assert!(!by_name.matches_activity(node(1)), "layers are not activities");

        let record = ComponentMatcher::ActivityRecord(app);
        assert!(record.matches_element(node(2)), "container-wrapped element");
        assert!(!record.matches_window(node(1)), "plain layer is not a record");
    }

    #[test]
    fn or_flattens() {
        let m = ComponentMatcher::SPLASH_SCREEN
            .or(ComponentMatcher::SNAPSHOT)
            .or(ComponentMatcher::IME);
        match &m {
            ComponentMatcher::AnyOf(list) => assert_eq!(list.len(), 3),
            other => panic!("expected any-of, got {other:?}"),
        }
        assert_eq!(format!("{m}"), "Splash Screen or SnapshotStartingWindow or InputMethod");
        let frame = frame_with(&[("Splash Screen com.example#2", NodeKind::Window)]);
        assert!(m.matches_window(frame.node(NodeId(1)).unwrap()), "any-of matches");
    }
}
