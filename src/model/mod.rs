// MODEL: Scene graph, camera and picking math
pub mod camera;
pub mod color;
pub mod ray;
pub mod scene;

pub use camera::FreeCamera;
pub use color::Color3;
pub use ray::{Aabb, Ray};
pub use scene::{HemisphericLight, Mesh, MeshId, PickingInfo, Scene, StandardMaterial};
