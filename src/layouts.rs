//! Window Layouts - Named Pane Trees
//!
//! A window's `windowStyle` names a layout. A layout is a tree of rows and
//! stacks whose leaves are fixed panes, side-hung openers or top-hung transoms.
//! Pricing counts the leaves; rendering is somebody else's problem.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub type LayoutId = String;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("Failed to read layouts directory: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Pane {
    Fixed,
    Opener,
    Transom,
    /// Children side by side.
    Row { children: Vec<Pane> },
    /// Children top to bottom.
    Stack { children: Vec<Pane> },
}

/// Leaf counts of a pane tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaneCounts {
    pub fixed: u32,
    pub openers: u32,
    pub transoms: u32,
}

impl PaneCounts {
    pub fn total(&self) -> u32 {
        self.fixed + self.openers + self.transoms
    }

    /// Panes that take a handle.
    pub fn operable(&self) -> u32 {
        self.openers + self.transoms
    }
}

impl Pane {
    pub fn counts(&self) -> PaneCounts {
        let mut counts = PaneCounts::default();
        self.accumulate(&mut counts);
        counts
    }

    fn accumulate(&self, counts: &mut PaneCounts) {
        match self {
            Pane::Fixed => counts.fixed += 1,
            Pane::Opener => counts.openers += 1,
            Pane::Transom => counts.transoms += 1,
            Pane::Row { children } | Pane::Stack { children } => {
                for child in children {
                    child.accumulate(counts);
                }
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowLayout {
    pub id: LayoutId,
    pub name: String,
    pub root: Pane,
}

impl WindowLayout {
    fn new(id: &str, name: &str, root: Pane) -> Self {
        Self { id: id.to_string(), name: name.to_string(), root }
    }

    pub fn counts(&self) -> PaneCounts {
        self.root.counts()
    }
}

/// Layout registry - built-ins plus any loaded from disk
pub struct LayoutRegistry {
    layouts: BTreeMap<LayoutId, WindowLayout>,
}

impl LayoutRegistry {
    pub fn new() -> Self {
        Self { layouts: BTreeMap::new() }
    }

    /// The layouts the configurator offers out of the box.
    pub fn builtin() -> Self {
        use Pane::*;
        let mut registry = Self::new();
        registry.register(WindowLayout::new("single-fixed", "Single fixed pane", Fixed));
        registry.register(WindowLayout::new("single-opener", "Single opener", Opener));
        registry.register(WindowLayout::new(
            "two-pane-left-opener",
            "Two panes, left opener",
            Row { children: vec![Opener, Fixed] },
        ));
        registry.register(WindowLayout::new(
            "two-pane-right-opener",
            "Two panes, right opener",
            Row { children: vec![Fixed, Opener] },
        ));
        registry.register(WindowLayout::new(
            "three-pane-centre-fixed",
            "Three panes, centre fixed",
            Row { children: vec![Opener, Fixed, Opener] },
        ));
        registry.register(WindowLayout::new(
            "opener-with-transom",
            "Opener under top-hung transom",
            Stack { children: vec![Transom, Opener] },
        ));
        registry.register(WindowLayout::new(
            "two-pane-with-transoms",
            "Two panes, each under a transom",
            Row {
                children: vec![
                    Stack { children: vec![Transom, Opener] },
                    Stack { children: vec![Transom, Fixed] },
                ],
            },
        ));
        registry
    }

    /// Built-ins overlaid with every `*.json` layout in `dir`. Unreadable or
    /// malformed files are skipped.
    pub fn load_from_dir(dir: &Path) -> Result<Self, LayoutError> {
        let mut registry = Self::builtin();
        if dir.exists() {
            for entry in fs::read_dir(dir)? {
                let path = entry?.path();
                if path.extension().map_or(false, |e| e == "json") {
                    match fs::read_to_string(&path)
                        .map_err(|e| e.to_string())
                        .and_then(|content| {
                            serde_json::from_str::<WindowLayout>(&content).map_err(|e| e.to_string())
                        }) {
                        Ok(layout) => {
                            debug!(layout = %layout.id, path = %path.display(), "loaded window layout");
                            registry.register(layout);
                        }
                        Err(e) => warn!(path = %path.display(), error = %e, "skipping window layout"),
                    }
                }
            }
        }
        Ok(registry)
    }

    pub fn get(&self, id: &str) -> Option<&WindowLayout> {
        self.layouts.get(id)
    }

    pub fn list(&self) -> Vec<&WindowLayout> {
        self.layouts.values().collect()
    }

    pub fn register(&mut self, layout: WindowLayout) {
        self.layouts.insert(layout.id.clone(), layout);
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
