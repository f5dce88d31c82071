//! Linear maps from microphone volume onto visual parameters.

/// Normalises a volume against the configured maximum.
///
/// Without `clamp` the ratio is returned as is, so input louder than `max`
/// overshoots every mapped range.
pub fn normalized_volume(volume: f32, max: f32, clamp: bool) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    let t = volume / max;
    if clamp {
        t.clamp(0.0, 1.0)
    } else {
        t
    }
}

/// Maps `t` over the packed `0xRRGGBB` integers themselves, floored and
/// saturated to a valid colour. Between the endpoints, carries from one
/// channel bleed into the next (yellow to red passes through `0xff7f80`).
pub fn lerp_packed_hex(from: u32, to: u32, t: f32) -> u32 {
    let from = f64::from(from);
    let value = from + f64::from(t) * (f64::from(to) - from);
    value.floor().clamp(0.0, f64::from(0xff_ffff_u32)) as u32
}

/// Closed numeric range a parameter is mapped into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRange {
    pub min: f32,
    pub max: f32,
}

impl LinearRange {
    pub const fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    /// `min` at `t = 0`, `max` at `t = 1`.
    pub fn map(&self, t: f32) -> f32 {
        self.min + t * (self.max - self.min)
    }

    /// `max` at `t = 0`, `min` at `t = 1`.
    pub fn map_inverted(&self, t: f32) -> f32 {
        self.max - t * (self.max - self.min)
    }
}

/// Linear RGB colour with channels in `[0, 1]` (not clamped).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Builds a colour from a `0xRRGGBB` value.
    pub fn from_hex(hex: u32) -> Self {
        let channel = |shift: u32| ((hex >> shift) & 0xff) as f32 / 255.0;
        Self {
            r: channel(16),
            g: channel(8),
            b: channel(0),
        }
    }

    /// Packs the colour into `0xRRGGBB`, saturating each channel.
    pub fn to_hex(&self) -> u32 {
        let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.r) << 16) | (channel(self.g) << 8) | channel(self.b)
    }

    /// Per-channel interpolation from `self` at `t = 0` to `other` at `t = 1`.
    pub fn lerp(&self, other: Rgb, t: f32) -> Rgb {
        Rgb {
            r: LinearRange::new(self.r, other.r).map(t),
            g: LinearRange::new(self.g, other.g).map(t),
            b: LinearRange::new(self.b, other.b).map(t),
        }
    }
}
