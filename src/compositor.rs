use tracing::debug;

use crate::enums::{SlotId, Surface};
use crate::error::RenderError;
use crate::slice_pipeline::SlicePipeline;
use crate::slot::SlotPipelines;
use crate::volume_pipeline::VolumePipeline;

/// A pipeline output that can be drawn on a surface.
#[derive(Debug, Clone, Copy)]
pub enum Renderable<'a> {
    Slice(&'a SlicePipeline),
    Volume(&'a VolumePipeline),
}

/// Backend turning a surface's scene into pixels.
///
/// `scene` is ordered bottom to top: slot 1 before slot 2.
pub trait Renderer {
    fn render(&mut self, surface: Surface, scene: &[Renderable<'_>]) -> Result<(), RenderError>;
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn render(&mut self, surface: Surface, scene: &[Renderable<'_>]) -> Result<(), RenderError> {
        (**self).render(surface, scene)
    }
}

/// Tracks which slot outputs are attached to each of the four surfaces.
#[derive(Debug)]
pub struct ViewCompositor<R> {
    renderer: R,
    attached: [[bool; 2]; 4],
}

impl<R: Renderer> ViewCompositor<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            attached: [[false; 2]; 4],
        }
    }

    pub fn attach(&mut self, surface: Surface, slot: SlotId) {
        self.attached[surface.index()][slot.index()] = true;
    }

    pub fn detach(&mut self, surface: Surface, slot: SlotId) {
        self.attached[surface.index()][slot.index()] = false;
    }

    /// Attaches the slot's outputs to all four surfaces.
    pub fn attach_slot(&mut self, slot: SlotId) {
        for surface in Surface::ALL {
            self.attach(surface, slot);
        }
    }

    pub fn detach_slot(&mut self, slot: SlotId) {
        for surface in Surface::ALL {
            self.detach(surface, slot);
        }
    }

    pub fn is_attached(&self, surface: Surface, slot: SlotId) -> bool {
        self.attached[surface.index()][slot.index()]
    }

    /// Draws every attached output of `slots` on `surface`.
    pub fn render(
        &mut self,
        surface: Surface,
        slots: [Option<&SlotPipelines>; 2],
    ) -> Result<(), RenderError> {
        let scene: Vec<_> = SlotId::ALL
            .into_iter()
            .filter(|&slot| self.is_attached(surface, slot))
            .filter_map(|slot| slots[slot.index()])
            .map(|pipelines| pipelines.renderable(surface))
            .collect();
        debug!(?surface, actors = scene.len(), "render");
        self.renderer.render(surface, &scene)
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }
}
