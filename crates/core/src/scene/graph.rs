use glam::Vec3;

use crate::mapping::Rgb;

use super::resources::{
    Disposable, Geometry, MaterialSlot, ResourceHandle, TeardownReport,
};

/// Index of a child inside a [`SceneGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub struct Mesh {
    pub name: String,
    pub geometry: Geometry,
    pub material: MaterialSlot,
    pub visible: bool,
}

impl Disposable for Mesh {
    fn dispose(&mut self, report: &mut TeardownReport) {
        self.geometry.dispose(report);
        self.material.dispose(report);
    }

    fn resource_handles(&self) -> Vec<ResourceHandle> {
        let mut handles = self.geometry.resource_handles();
        handles.extend(self.material.resource_handles());
        handles
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DirectionalLight {
    pub color: Rgb,
    pub intensity: f32,
    pub position: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmbientLight {
    pub color: Rgb,
    pub intensity: f32,
}

/// Direct child of a scene.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Mesh(Mesh),
    DirectionalLight(DirectionalLight),
    AmbientLight(AmbientLight),
}

impl Disposable for SceneObject {
    fn dispose(&mut self, report: &mut TeardownReport) {
        if let SceneObject::Mesh(mesh) = self {
            mesh.dispose(report);
        }
    }

    fn resource_handles(&self) -> Vec<ResourceHandle> {
        match self {
            SceneObject::Mesh(mesh) => mesh.resource_handles(),
            SceneObject::DirectionalLight(_) | SceneObject::AmbientLight(_) => Vec::new(),
        }
    }
}

/// Exponential fog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fog {
    pub color: Rgb,
    pub density: f32,
}

/// Per-frame mutable surroundings of a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Environment {
    pub background: Rgb,
    pub fog: Fog,
}

/// Flat list of scene children.
#[derive(Debug, Default)]
pub struct SceneGraph {
    children: Vec<SceneObject>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, object: SceneObject) -> NodeId {
        self.children.push(object);
        NodeId(self.children.len() - 1)
    }

    pub fn children(&self) -> &[SceneObject] {
        &self.children
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn mesh(&self, id: NodeId) -> Option<&Mesh> {
        match self.children.get(id.0) {
            Some(SceneObject::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn mesh_mut(&mut self, id: NodeId) -> Option<&mut Mesh> {
        match self.children.get_mut(id.0) {
            Some(SceneObject::Mesh(mesh)) => Some(mesh),
            _ => None,
        }
    }

    pub fn meshes_mut(&mut self) -> impl Iterator<Item = &mut Mesh> {
        self.children.iter_mut().filter_map(|child| match child {
            SceneObject::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    pub fn resource_handles(&self) -> Vec<ResourceHandle> {
        self.children
            .iter()
            .flat_map(SceneObject::resource_handles)
            .collect()
    }

    /// Removes every child and disposes what it owns. Node ids handed out
    /// before the teardown no longer resolve.
    pub fn teardown(&mut self) -> TeardownReport {
        let mut report = TeardownReport::default();
        for mut child in self.children.drain(..) {
            child.dispose(&mut report);
            report.children_removed += 1;
        }
        report
    }
}
