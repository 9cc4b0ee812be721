#![allow(dead_code)]

use std::collections::HashSet;

use surface_blinder::error::CompositorError;
use surface_blinder::geometry::Orientation;
use surface_blinder::overlay::{Compositor, Display, LayoutParams, SurfaceKind};

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Add(SurfaceKind, LayoutParams),
    Update(SurfaceKind, LayoutParams),
    Remove(SurfaceKind),
    Alpha(SurfaceKind, f32),
}

/// Compositor double that records every call.
#[derive(Debug, Default)]
pub struct MockCompositor {
    pub ops: Vec<Op>,
    pub attached: HashSet<SurfaceKind>,
    /// `add_surface` for this kind fails with a platform error.
    pub fail_add: Option<SurfaceKind>,
}

impl MockCompositor {
    pub fn alphas(&self, kind: SurfaceKind) -> Vec<f32> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Alpha(k, a) if *k == kind => Some(*a),
                _ => None,
            })
            .collect()
    }

    pub fn last_alpha(&self, kind: SurfaceKind) -> Option<f32> {
        self.alphas(kind).last().copied()
    }

    pub fn updates(&self, kind: SurfaceKind) -> Vec<LayoutParams> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Update(k, l) if *k == kind => Some(*l),
                _ => None,
            })
            .collect()
    }

    pub fn added(&self, kind: SurfaceKind) -> Option<LayoutParams> {
        self.ops.iter().find_map(|op| match op {
            Op::Add(k, l) if *k == kind => Some(*l),
            _ => None,
        })
    }

    pub fn removals(&self) -> Vec<SurfaceKind> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Remove(k) => Some(*k),
                _ => None,
            })
            .collect()
    }
}

impl Compositor for MockCompositor {
    fn add_surface(
        &mut self,
        kind: SurfaceKind,
        layout: &LayoutParams,
    ) -> Result<(), CompositorError> {
        if self.fail_add == Some(kind) {
            return Err(CompositorError::Platform("injected".into()));
        }
        if !self.attached.insert(kind) {
            return Err(CompositorError::AlreadyAttached(kind));
        }
        self.ops.push(Op::Add(kind, *layout));
        Ok(())
    }

    fn update_layout(
        &mut self,
        kind: SurfaceKind,
        layout: &LayoutParams,
    ) -> Result<(), CompositorError> {
        if !self.attached.contains(&kind) {
            return Err(CompositorError::NotAttached(kind));
        }
        self.ops.push(Op::Update(kind, *layout));
        Ok(())
    }

    fn remove_surface(&mut self, kind: SurfaceKind) -> Result<(), CompositorError> {
        if !self.attached.remove(&kind) {
            return Err(CompositorError::NotAttached(kind));
        }
        self.ops.push(Op::Remove(kind));
        Ok(())
    }

    fn set_alpha(&mut self, kind: SurfaceKind, alpha: f32) {
        self.ops.push(Op::Alpha(kind, alpha));
    }

    fn is_attached(&self, kind: SurfaceKind) -> bool {
        self.attached.contains(&kind)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MockDisplay {
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
}

impl MockDisplay {
    pub fn landscape() -> Self {
        Self {
            width: 1920,
            height: 1080,
            orientation: Orientation::Landscape,
        }
    }

    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.width, &mut self.height);
        self.orientation = match self.orientation {
            Orientation::Landscape => Orientation::Portrait,
            Orientation::Portrait => Orientation::Landscape,
            Orientation::Undefined => Orientation::Undefined,
        };
    }
}

impl Display for MockDisplay {
    fn screen_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn orientation(&self) -> Orientation {
        self.orientation
    }
}
