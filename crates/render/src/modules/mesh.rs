use crate::framebuffer::{DrawCommand, Framebuffer};
use crate::module::{RenderError, RenderModule, SharedRenderState};
use crate::viewport::Viewport;
use vesta_ecs::{Ecs, Material, StaticMesh, Transform};

/// Draws every entity carrying a transform, a static mesh and a material.
///
/// Meshes whose resource has not finished loading are skipped for the
/// frame; the entity draws once the loader fulfills the handle.
#[derive(Debug, Default)]
pub struct MeshRenderModule;

impl RenderModule for MeshRenderModule {
    fn name(&self) -> &'static str {
        "mesh"
    }

    fn priority(&self) -> i32 {
        10
    }

    fn render(
        &mut self,
        ecs: &Ecs,
        viewport: &Viewport,
        framebuffer: &mut Framebuffer,
        state: &mut SharedRenderState,
    ) -> Result<(), RenderError> {
        let Some((view, projection)) = viewport.view_projection(ecs) else {
            return Ok(());
        };

        for (entity, (_, static_mesh, material)) in
            ecs.select::<(Transform, StaticMesh, Material)>()
        {
            let Some(mesh) = static_mesh.mesh.get() else {
                tracing::trace!(?entity, "mesh still loading, skipped");
                continue;
            };
            let model = ecs
                .world_matrix(entity)
                .map_err(|e| RenderError::Module {
                    module: self.name(),
                    message: e.to_string(),
                })?;

            let _shader = state.bindings.bind("shader");
            let _mesh_binding = state.bindings.bind("mesh");
            let lit = material.lit && state.last_depth_map.is_some();
            let _depth = lit.then(|| state.bindings.bind("depth_map"));
            framebuffer.record(DrawCommand {
                mesh: mesh.name.clone(),
                model,
                view,
                projection,
                lit,
                face_cull: static_mesh.face_cull,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vesta_assets::{Mesh, Resource};
    use vesta_ecs::Camera;

    fn scene_with_camera() -> (Ecs, Viewport) {
        let mut ecs = Ecs::new();
        let camera = ecs.create_entity();
        ecs.add_component(camera, Transform::default()).unwrap();
        ecs.add_component(camera, Camera::default()).unwrap();
        let mut viewport = Viewport::new(0, 0, 640, 480);
        viewport.bind_camera(camera);
        (ecs, viewport)
    }

    fn cube_resource() -> Resource<Mesh> {
        Resource::loaded(Mesh {
            name: "cube".into(),
            vertex_count: 24,
            index_count: 36,
        })
    }

    #[test]
    fn draws_loaded_meshes_and_skips_pending_ones() {
        let (mut ecs, viewport) = scene_with_camera();

        let visible = ecs.create_entity();
        ecs.add_component(visible, Transform::default()).unwrap();
        ecs.add_component(visible, StaticMesh::new(cube_resource()))
            .unwrap();
        ecs.add_component(visible, Material::default()).unwrap();

        let loading = ecs.create_entity();
        ecs.add_component(loading, Transform::default()).unwrap();
        ecs.add_component(loading, StaticMesh::new(Resource::pending()))
            .unwrap();
        ecs.add_component(loading, Material::default()).unwrap();

        let mut fb = Framebuffer::new(640, 480);
        let mut state = SharedRenderState::default();
        MeshRenderModule
            .render(&ecs, &viewport, &mut fb, &mut state)
            .unwrap();

        assert_eq!(fb.commands().len(), 1);
        assert_eq!(fb.commands()[0].mesh, "cube");
        assert!(state.bindings.is_clean());
    }

    #[test]
    fn lit_draw_requires_a_depth_map() {
        let (mut ecs, viewport) = scene_with_camera();
        let entity = ecs.create_entity();
        ecs.add_component(entity, Transform::default()).unwrap();
        ecs.add_component(entity, StaticMesh::new(cube_resource()))
            .unwrap();
        ecs.add_component(
            entity,
            Material {
                lit: true,
                ..Material::default()
            },
        )
        .unwrap();

        let mut fb = Framebuffer::new(640, 480);
        let mut state = SharedRenderState::default();
        MeshRenderModule
            .render(&ecs, &viewport, &mut fb, &mut state)
            .unwrap();
        assert!(!fb.commands()[0].lit);

        state.last_depth_map = Some(vesta_assets::AssetId(1));
        fb.clear(vesta_common::Color::BLACK);
        MeshRenderModule
            .render(&ecs, &viewport, &mut fb, &mut state)
            .unwrap();
        assert!(fb.commands()[0].lit);
    }

    #[test]
    fn camera_less_viewport_draws_nothing() {
        let mut ecs = Ecs::new();
        let entity = ecs.create_entity();
        ecs.add_component(entity, Transform::default()).unwrap();
        ecs.add_component(entity, StaticMesh::new(cube_resource()))
            .unwrap();
        ecs.add_component(entity, Material::default()).unwrap();

        let viewport = Viewport::new(0, 0, 640, 480);
        let mut fb = Framebuffer::new(640, 480);
        let mut state = SharedRenderState::default();
        MeshRenderModule
            .render(&ecs, &viewport, &mut fb, &mut state)
            .unwrap();
        assert!(fb.commands().is_empty());
    }
}
