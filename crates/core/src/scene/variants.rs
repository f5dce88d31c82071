//! Ordered catalogue of scene variants.
//!
//! Every variant shares the [`StatesScene`] template and differs only in the
//! constants below.

use glam::Vec3;

use crate::{
    camera::PerspectiveCamera,
    mapping::{lerp_packed_hex, LinearRange, Rgb},
    Result, VizError,
};

use super::states::StatesScene;

/// Vertex offset applied on top of the captured baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Displacement {
    /// `(o·sin i, o·cos i, o)`
    Spiral,
    /// `(o·cos i, o·sin i, -o)`
    Twist,
    /// `o` along the baseline direction from the origin.
    Radial,
}

impl Displacement {
    pub fn offset(&self, index: usize, amount: f32, baseline: Vec3) -> Vec3 {
        let i = index as f32;
        match self {
            Displacement::Spiral => Vec3::new(amount * i.sin(), amount * i.cos(), amount),
            Displacement::Twist => Vec3::new(amount * i.cos(), amount * i.sin(), -amount),
            Displacement::Radial => baseline.normalize_or_zero() * amount,
        }
    }
}

/// Geometry and styling of one visual state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StateStyle {
    pub radius: f32,
    pub width_segments: u32,
    pub height_segments: u32,
    pub color: u32,
    pub wireframe: bool,
    pub visible: bool,
}

/// Lights, background and fog a scene starts with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnvironmentSpec {
    pub light_color: u32,
    pub light_intensity: f32,
    pub light_position: Vec3,
    pub ambient_color: u32,
    pub ambient_intensity: f32,
    pub background: u32,
    pub fog_color: u32,
    pub fog_density: f32,
}

/// Microphone-driven fog. Each colour channel has its own range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FogMapping {
    pub density: LinearRange,
    pub red: LinearRange,
    pub green: LinearRange,
    pub blue: LinearRange,
}

impl FogMapping {
    pub fn color(&self, t: f32) -> Rgb {
        Rgb::new(self.red.map(t), self.green.map(t), self.blue.map(t))
    }
}

/// Microphone-driven background between two colours.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundMapping {
    pub quiet: u32,
    pub loud: u32,
}

impl BackgroundMapping {
    /// Interpolates the packed hex values unless `per_channel` is set.
    pub fn color(&self, t: f32, per_channel: bool) -> Rgb {
        if per_channel {
            Rgb::from_hex(self.quiet).lerp(Rgb::from_hex(self.loud), t)
        } else {
            Rgb::from_hex(lerp_packed_hex(self.quiet, self.loud, t))
        }
    }
}

/// Every constant that distinguishes one scene from another.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneVariant {
    pub name: &'static str,
    pub camera_start: Vec3,
    pub environment: EnvironmentSpec,
    pub content: StateStyle,
    pub frustrated: StateStyle,
    pub displacement: Displacement,
    pub displacement_magnitude: f32,
    /// Louder input narrows the view toward `min`.
    pub fov: LinearRange,
    /// Louder input moves the camera toward `min` along z.
    pub distance: LinearRange,
    /// `None` keeps the fog static.
    pub fog: Option<FogMapping>,
    pub background: Option<BackgroundMapping>,
}

impl SceneVariant {
    /// Builds the scene around the shared camera.
    pub fn build(&self, camera: &mut PerspectiveCamera) -> Result<StatesScene> {
        self.validate()?;
        Ok(StatesScene::new(self.clone(), camera))
    }

    fn validate(&self) -> Result<()> {
        for style in [&self.content, &self.frustrated] {
            if !(style.radius > 0.0) {
                return Err(VizError::InvalidInput("state radius must be positive"));
            }
            if style.width_segments < 3 || style.height_segments < 2 {
                return Err(VizError::InvalidInput(
                    "spheres need at least 3 width and 2 height segments",
                ));
            }
        }
        if !(self.fov.min > 0.0 && self.fov.max < 180.0) {
            return Err(VizError::InvalidInput("fov range must lie within (0, 180)"));
        }
        Ok(())
    }
}

const STUDIO: EnvironmentSpec = EnvironmentSpec {
    light_color: 0xffffff,
    light_intensity: 15.0,
    light_position: Vec3::new(-500.0, 1500.0, -1500.0),
    ambient_color: 0xffffff,
    ambient_intensity: 0.25,
    background: 0xbfe3dd,
    fog_color: 0xefd1b5,
    fog_density: 0.005,
};

const CALM: StateStyle = StateStyle {
    radius: 5.0,
    width_segments: 64,
    height_segments: 64,
    color: 0x66ccff,
    wireframe: false,
    visible: true,
};

const RESTLESS: StateStyle = StateStyle {
    radius: 3.0,
    width_segments: 32,
    height_segments: 32,
    color: 0xff5533,
    wireframe: true,
    visible: false,
};

const WARM_FOG: FogMapping = FogMapping {
    density: LinearRange::new(0.005, 10.0),
    red: LinearRange::new(0.5, 1.0),
    green: LinearRange::new(0.1, 1.0),
    blue: LinearRange::new(0.1, 1.0),
};

/// Variants in navigation order.
pub fn catalogue() -> Vec<SceneVariant> {
    vec![
        SceneVariant {
            name: "breathing sphere",
            camera_start: Vec3::new(0.0, 0.0, 2.0),
            environment: STUDIO,
            content: CALM,
            frustrated: RESTLESS,
            displacement: Displacement::Spiral,
            displacement_magnitude: 0.5,
            fov: LinearRange::new(30.0, 90.0),
            distance: LinearRange::new(2.0, 6.0),
            fog: None,
            background: None,
        },
        SceneVariant {
            name: "radial bloom",
            camera_start: Vec3::new(0.0, 0.0, 4.0),
            environment: STUDIO,
            content: StateStyle {
                color: 0x9d7bff,
                ..CALM
            },
            frustrated: RESTLESS,
            displacement: Displacement::Radial,
            displacement_magnitude: 1.5,
            fov: LinearRange::new(20.0, 100.0),
            distance: LinearRange::new(3.0, 9.0),
            fog: None,
            background: Some(BackgroundMapping {
                quiet: 0xbfe3dd,
                loud: 0x1b1f3a,
            }),
        },
        SceneVariant {
            name: "wire cage",
            camera_start: Vec3::new(0.0, 0.0, 2.0),
            environment: STUDIO,
            content: StateStyle {
                wireframe: true,
                ..CALM
            },
            frustrated: RESTLESS,
            displacement: Displacement::Spiral,
            displacement_magnitude: 0.5,
            fov: LinearRange::new(10.0, 140.0),
            distance: LinearRange::new(2.0, 8.0),
            fog: None,
            background: None,
        },
        SceneVariant {
            name: "twisted wire",
            camera_start: Vec3::new(0.0, 0.0, 3.0),
            environment: EnvironmentSpec {
                background: 0x101820,
                ..STUDIO
            },
            content: StateStyle {
                wireframe: true,
                color: 0xf2aa4c,
                ..CALM
            },
            frustrated: RESTLESS,
            displacement: Displacement::Twist,
            displacement_magnitude: 0.8,
            fov: LinearRange::new(15.0, 120.0),
            distance: LinearRange::new(2.5, 7.0),
            fog: Some(FogMapping {
                density: LinearRange::new(0.005, 0.2),
                ..WARM_FOG
            }),
            background: None,
        },
        SceneVariant {
            name: "low poly pulse",
            camera_start: Vec3::new(0.0, 0.0, 2.0),
            environment: STUDIO,
            content: StateStyle {
                width_segments: 12,
                height_segments: 8,
                ..CALM
            },
            frustrated: RESTLESS,
            displacement: Displacement::Radial,
            displacement_magnitude: 2.0,
            fov: LinearRange::new(10.0, 125.0),
            distance: LinearRange::new(3.0, 5.8),
            fog: Some(WARM_FOG),
            background: None,
        },
        SceneVariant {
            name: "ember",
            camera_start: Vec3::new(0.0, 0.0, 2.0),
            environment: EnvironmentSpec {
                fog_color: 0x331100,
                ..STUDIO
            },
            content: StateStyle {
                color: 0xff7744,
                ..CALM
            },
            frustrated: RESTLESS,
            displacement: Displacement::Twist,
            displacement_magnitude: 0.5,
            fov: LinearRange::new(10.0, 125.0),
            distance: LinearRange::new(3.0, 5.8),
            fog: Some(FogMapping {
                red: LinearRange::new(0.2, 1.0),
                green: LinearRange::new(0.05, 0.4),
                blue: LinearRange::new(0.0, 0.1),
                ..WARM_FOG
            }),
            background: Some(BackgroundMapping {
                quiet: 0x331100,
                loud: 0xff5500,
            }),
        },
        SceneVariant {
            name: "solid sun",
            camera_start: Vec3::new(0.0, 0.0, 2.0),
            environment: STUDIO,
            content: CALM,
            frustrated: RESTLESS,
            displacement: Displacement::Spiral,
            displacement_magnitude: 0.5,
            fov: LinearRange::new(10.0, 125.0),
            distance: LinearRange::new(3.0, 5.8),
            fog: Some(WARM_FOG),
            background: Some(BackgroundMapping {
                quiet: 0xffff00,
                loud: 0xff0000,
            }),
        },
    ]
}
