use glam::Vec3;

use crate::config::SceneConfig;
use crate::error::AppResult;
use crate::model::ray::{Aabb, Ray};
use crate::model::Color3;

/// Index of a mesh inside its [`Scene`]. Meshes are never removed, so ids stay valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MeshId(usize);

#[derive(Debug, Clone)]
pub struct StandardMaterial {
    pub name: String,
    pub diffuse_color: Color3,
}

/// A box-shaped scene node. Boxes are axis aligned and only ever translated.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub position: Vec3,
    pub size: Vec3,
    pub material: StandardMaterial,
    pub is_pickable: bool,
}

impl Mesh {
    pub fn new_box(name: impl Into<String>, size: f32, material: StandardMaterial) -> Self {
        Self {
            name: name.into(),
            position: Vec3::ZERO,
            size: Vec3::splat(size),
            material,
            is_pickable: true,
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        Aabb::from_center_size(self.position, self.size)
    }
}

#[derive(Debug, Clone)]
pub struct HemisphericLight {
    pub name: String,
    pub direction: Vec3,
    pub diffuse: Color3,
    pub ground_color: Color3,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickingInfo {
    pub mesh: MeshId,
    pub distance: f32,
}

#[derive(Debug, Default)]
pub struct Scene {
    meshes: Vec<Mesh>,
    pub lights: Vec<HemisphericLight>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the demo scene: one grabbable box in its unselected color and one hemispheric light.
    pub fn bootstrap(config: &SceneConfig) -> AppResult<Self> {
        let mut scene = Self::new();

        let material = StandardMaterial {
            name: format!("{}Material", config.box_name),
            diffuse_color: Color3::from_hex(&config.unselected_color)?,
        };
        let mut mesh = Mesh::new_box(&config.box_name, config.box_size, material);
        mesh.position = config.box_position;
        scene.add_mesh(mesh);

        let light = &config.light;
        scene.lights.push(HemisphericLight {
            name: light.name.clone(),
            direction: light.direction,
            diffuse: Color3::from_hex(&light.diffuse)?,
            ground_color: Color3::from_hex(&light.ground_color)?,
            intensity: light.intensity,
        });

        tracing::info!(meshes = scene.meshes.len(), lights = scene.lights.len(), "scene created");
        Ok(scene)
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        MeshId(self.meshes.len() - 1)
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.0)
    }

    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.0)
    }

    pub fn mesh_by_name(&self, name: &str) -> Option<MeshId> {
        self.meshes.iter().position(|m| m.name == name).map(MeshId)
    }

    pub fn meshes(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes.iter().enumerate().map(|(i, m)| (MeshId(i), m))
    }

    /// Nearest pickable mesh along `ray`.
    pub fn pick_with_ray(&self, ray: &Ray) -> Option<PickingInfo> {
        self.meshes()
            .filter(|(_, mesh)| mesh.is_pickable)
            .filter_map(|(id, mesh)| {
                mesh.bounding_box()
                    .intersect_ray(ray)
                    .map(|distance| PickingInfo { mesh: id, distance })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }
}
