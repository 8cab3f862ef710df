//! Multi-light pass driver
//!
//! Lighting is accumulated one light per draw. The first pass runs under the
//! default raster state and carries the full ambient term; every later pass
//! blends additively onto it with the ambient term switched off, so ambient is
//! counted exactly once. A frame without lights still draws once, with light
//! inputs that contribute nothing.

use crate::foundation::math::Vec4;
use crate::render::backend::{MeshHandle, ProgramHandle, RasterState, RenderBackend, Topology};
use crate::render::lighting::{FrameState, Light};
use crate::render::uniforms::UniformBinder;

/// Draw `mesh` once per light with `program` already bound
///
/// `upload` writes the material's own uniforms at the start of every pass, before
/// the frame's ambient and light inputs. The default raster state is restored
/// before returning. Returns the number of draw calls issued.
pub(crate) fn render_light_passes(
    gpu: &mut dyn RenderBackend,
    program: ProgramHandle,
    mesh: MeshHandle,
    frame: &FrameState,
    mut upload: impl FnMut(&mut UniformBinder<'_>),
) -> usize {
    let pass_count = frame.light_count().max(1);

    for pass in 0..pass_count {
        let first = pass == 0;
        gpu.set_raster_state(if first {
            RasterState::default()
        } else {
            RasterState::additive()
        });

        {
            let mut binder = UniformBinder::new(&mut *gpu, program);
            upload(&mut binder);
            binder.set(
                "u_ambient_light",
                if first { frame.ambient } else { Vec4::zeros() },
            );
            binder.set("u_background_light", frame.background);
            match frame.lights.get(pass) {
                Some(light) => light.upload(&mut binder),
                None => Light::upload_unlit(&mut binder),
            }
        }

        gpu.draw_mesh(mesh, Topology::Triangles);
    }

    gpu.set_raster_state(RasterState::default());
    log::trace!("{} lighting passes with {}", pass_count, program);
    pass_count
}
