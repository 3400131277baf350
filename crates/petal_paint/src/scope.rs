//! Scoped save/restore

use std::ops::{Deref, DerefMut};

use petal_core::{Instruction, Op};

use crate::renderer::Renderer;
use crate::state::RenderState;

/// Save/restore scope over a [`Renderer`]
///
/// Opening the scope records `Save` and copies the renderer's state;
/// dropping it writes the copy back and records `Restore`. Draw through the
/// scope as if it were the renderer. Scopes nest with [`Renderer::save`].
///
/// ```ignore
/// {
///     let mut petal = renderer.save();
///     petal.rotate(angle);
///     petal.ellipse(0.0, 30.0, 10.0, 30.0);
///     petal.fill();
/// } // transform and tint are back to what they were
/// ```
pub struct RenderScope<'r, 'p> {
    renderer: &'r mut Renderer<'p>,
    saved: RenderState,
}

impl<'r, 'p> RenderScope<'r, 'p> {
    pub(crate) fn new(renderer: &'r mut Renderer<'p>) -> Self {
        let saved = renderer.state;
        renderer
            .pipeline()
            .append(Instruction::new(Op::Save, renderer.id()));
        Self { renderer, saved }
    }

    /// State that will be restored when the scope ends
    pub fn saved(&self) -> &RenderState {
        &self.saved
    }
}

impl<'p> Deref for RenderScope<'_, 'p> {
    type Target = Renderer<'p>;

    fn deref(&self) -> &Self::Target {
        &*self.renderer
    }
}

impl<'p> DerefMut for RenderScope<'_, 'p> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.renderer
    }
}

impl Drop for RenderScope<'_, '_> {
    fn drop(&mut self) {
        self.renderer.state = self.saved;
        self.renderer
            .pipeline()
            .append(Instruction::new(Op::Restore, self.renderer.id()));
    }
}
