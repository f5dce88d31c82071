use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use glam::Vec3;

use crate::mapping::Rgb;

/// Kind of GPU-side allocation a [`ResourceHandle`] tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Geometry,
    Material,
    Texture,
}

/// Liveness flag of a GPU resource. Clones observe the same flag, so disposal
/// stays visible after the owner has been dropped.
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    kind: ResourceKind,
    disposed: Arc<AtomicBool>,
}

impl ResourceHandle {
    fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            disposed: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Relaxed)
    }

    /// Returns `true` the first time the resource is released.
    fn release(&self) -> bool {
        !self.disposed.swap(true, Ordering::Relaxed)
    }
}

/// Tally of what a teardown released.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TeardownReport {
    pub children_removed: usize,
    pub geometries: usize,
    pub materials: usize,
    pub textures: usize,
}

impl TeardownReport {
    fn record(&mut self, handle: &ResourceHandle) {
        if !handle.release() {
            return;
        }
        match handle.kind {
            ResourceKind::Geometry => self.geometries += 1,
            ResourceKind::Material => self.materials += 1,
            ResourceKind::Texture => self.textures += 1,
        }
    }
}

/// Anything that owns GPU resources. Teardown calls this on every child
/// without probing; owners without resources do nothing.
pub trait Disposable {
    fn dispose(&mut self, report: &mut TeardownReport);

    /// Handles of every resource owned, for observers that outlive the owner.
    fn resource_handles(&self) -> Vec<ResourceHandle>;
}

/// Vertex positions of a mesh plus the dirty flag the renderer consumes.
#[derive(Debug, Clone)]
pub struct Geometry {
    positions: Vec<Vec3>,
    needs_update: bool,
    handle: ResourceHandle,
}

impl Geometry {
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            needs_update: true,
            handle: ResourceHandle::new(ResourceKind::Geometry),
        }
    }

    /// UV sphere with `(width_segments + 1) * (height_segments + 1)` vertices,
    /// rows running from the north pole down.
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        use std::f32::consts::{PI, TAU};

        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);
        let mut positions =
            Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);

        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                positions.push(Vec3::new(
                    -radius * (u * TAU).cos() * (v * PI).sin(),
                    radius * (v * PI).cos(),
                    radius * (u * TAU).sin() * (v * PI).sin(),
                ));
            }
        }

        Self::from_positions(positions)
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn set_position(&mut self, index: usize, position: Vec3) {
        self.positions[index] = position;
    }

    pub fn mark_needs_update(&mut self) {
        self.needs_update = true;
    }

    pub fn needs_update(&self) -> bool {
        self.needs_update
    }

    /// Clears the dirty flag, returning whether an upload was pending.
    pub fn take_needs_update(&mut self) -> bool {
        std::mem::take(&mut self.needs_update)
    }

    pub fn handle(&self) -> &ResourceHandle {
        &self.handle
    }
}

impl Disposable for Geometry {
    fn dispose(&mut self, report: &mut TeardownReport) {
        report.record(&self.handle);
    }

    fn resource_handles(&self) -> Vec<ResourceHandle> {
        vec![self.handle.clone()]
    }
}

/// Colour map sampled by a material.
#[derive(Debug, Clone)]
pub struct Texture {
    pub name: String,
    handle: ResourceHandle,
}

impl Texture {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: ResourceHandle::new(ResourceKind::Texture),
        }
    }
}

impl Disposable for Texture {
    fn dispose(&mut self, report: &mut TeardownReport) {
        report.record(&self.handle);
    }

    fn resource_handles(&self) -> Vec<ResourceHandle> {
        vec![self.handle.clone()]
    }
}

/// Standard lit surface material.
#[derive(Debug, Clone)]
pub struct Material {
    pub color: Rgb,
    pub wireframe: bool,
    pub map: Option<Texture>,
    handle: ResourceHandle,
}

impl Material {
    pub fn standard(color: u32, wireframe: bool) -> Self {
        Self {
            color: Rgb::from_hex(color),
            wireframe,
            map: None,
            handle: ResourceHandle::new(ResourceKind::Material),
        }
    }

    pub fn with_map(mut self, map: Texture) -> Self {
        self.map = Some(map);
        self
    }
}

impl Disposable for Material {
    fn dispose(&mut self, report: &mut TeardownReport) {
        report.record(&self.handle);
        if let Some(map) = &mut self.map {
            map.dispose(report);
        }
    }

    fn resource_handles(&self) -> Vec<ResourceHandle> {
        let mut handles = vec![self.handle.clone()];
        if let Some(map) = &self.map {
            handles.extend(map.resource_handles());
        }
        handles
    }
}

/// A mesh renders with either one material or one per geometry group.
#[derive(Debug, Clone)]
pub enum MaterialSlot {
    Single(Material),
    Multi(Vec<Material>),
}

impl MaterialSlot {
    pub fn materials(&self) -> &[Material] {
        match self {
            MaterialSlot::Single(material) => std::slice::from_ref(material),
            MaterialSlot::Multi(materials) => materials,
        }
    }

    fn materials_mut(&mut self) -> &mut [Material] {
        match self {
            MaterialSlot::Single(material) => std::slice::from_mut(material),
            MaterialSlot::Multi(materials) => materials,
        }
    }
}

impl Disposable for MaterialSlot {
    fn dispose(&mut self, report: &mut TeardownReport) {
        for material in self.materials_mut() {
            material.dispose(report);
        }
    }

    fn resource_handles(&self) -> Vec<ResourceHandle> {
        self.materials()
            .iter()
            .flat_map(Material::resource_handles)
            .collect()
    }
}
