mod depth_pass;
mod mesh;

pub use depth_pass::DepthMapPass;
pub use mesh::MeshRenderModule;
