//! Tunable scalars driving the blob.
//!
//! The host mutates a [`ParameterStore`] whenever its control surface changes
//! a value. The renderer never reads the store directly; it takes one
//! [`ParamSnapshot`] at the start of each frame, with every value clamped into
//! its declared range. Extreme radii or blend values would make the distance
//! field non-Lipschitz and break the tracer's step-size assumption.

use crate::constants::MAX_BALLS;

pub const PARAM_COUNT: usize = 11;

/// Every parameter exposed to the control surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    Reflection,
    Speed,
    Ior,
    Count,
    Size,
    Dispersion,
    Refract,
    ChromaticAberration,
    PointerSize,
    NoiseScale,
    NoiseAmount,
}

impl ParamKey {
    pub const ALL: [ParamKey; PARAM_COUNT] = [
        ParamKey::Reflection,
        ParamKey::Speed,
        ParamKey::Ior,
        ParamKey::Count,
        ParamKey::Size,
        ParamKey::Dispersion,
        ParamKey::Refract,
        ParamKey::ChromaticAberration,
        ParamKey::PointerSize,
        ParamKey::NoiseScale,
        ParamKey::NoiseAmount,
    ];

    /// Stable name used by config files and control surfaces.
    pub const fn name(self) -> &'static str {
        match self {
            ParamKey::Reflection => "reflection",
            ParamKey::Speed => "speed",
            ParamKey::Ior => "ior",
            ParamKey::Count => "count",
            ParamKey::Size => "size",
            ParamKey::Dispersion => "dispersion",
            ParamKey::Refract => "refract",
            ParamKey::ChromaticAberration => "chromatic_aberration",
            ParamKey::PointerSize => "pointer_size",
            ParamKey::NoiseScale => "noise_scale",
            ParamKey::NoiseAmount => "noise_amount",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.name() == name)
    }

    /// Inclusive `(min, max)` range.
    pub const fn range(self) -> (f32, f32) {
        match self {
            ParamKey::Reflection => (0.01, 6.0),
            ParamKey::Speed => (0.01, 3.0),
            ParamKey::Ior => (0.01, 1.0),
            ParamKey::Count => (1.0, MAX_BALLS as f32),
            ParamKey::Size => (0.001, 0.5),
            ParamKey::Dispersion => (0.0, 0.1),
            ParamKey::Refract => (0.0, 2.0),
            ParamKey::ChromaticAberration => (0.0, 5.0),
            ParamKey::PointerSize => (0.01, 4.2),
            ParamKey::NoiseScale => (0.002, 1.0),
            ParamKey::NoiseAmount => (0.0, 2.0),
        }
    }

    pub const fn default_value(self) -> f32 {
        match self {
            ParamKey::Reflection => 1.5,
            ParamKey::Speed => 0.5,
            ParamKey::Ior => 0.84,
            ParamKey::Count => 3.0,
            ParamKey::Size => 0.15,
            ParamKey::Dispersion => 0.03,
            ParamKey::Refract => 0.15,
            ParamKey::ChromaticAberration => 0.5,
            ParamKey::PointerSize => 0.3,
            ParamKey::NoiseScale => 0.4,
            ParamKey::NoiseAmount => 0.2,
        }
    }

    /// Clamp into range. Non-finite input falls back to the default.
    pub fn clamp(self, value: f32) -> f32 {
        if !value.is_finite() {
            return self.default_value();
        }
        let (lo, hi) = self.range();
        let v = value.clamp(lo, hi);
        match self {
            ParamKey::Count => v.round(),
            _ => v,
        }
    }
}

/// Raw, possibly out-of-range values as set by the control surface.
#[derive(Clone, Debug, PartialEq)]
pub struct ParameterSet {
    values: [f32; PARAM_COUNT],
}

impl Default for ParameterSet {
    fn default() -> Self {
        Self {
            values: ParamKey::ALL.map(ParamKey::default_value),
        }
    }
}

impl ParameterSet {
    pub fn get(&self, key: ParamKey) -> f32 {
        self.values[key as usize]
    }

    pub fn set(&mut self, key: ParamKey, value: f32) {
        self.values[key as usize] = value;
    }
}

/// Owner of the live parameter values.
#[derive(Clone, Debug, Default)]
pub struct ParameterStore {
    set: ParameterSet,
}

impl ParameterStore {
    /// Store a value as given; clamping happens when the frame snapshots it.
    pub fn set(&mut self, key: ParamKey, value: f32) {
        let clamped = key.clamp(value);
        if clamped != value {
            log::warn!(
                "[params] {}={} outside {:?}, will use {}",
                key.name(),
                value,
                key.range(),
                clamped
            );
        }
        self.set.set(key, value);
    }

    pub fn get(&self, key: ParamKey) -> f32 {
        self.set.get(key)
    }

    pub fn snapshot(&self) -> ParamSnapshot {
        ParamSnapshot::from_set(&self.set)
    }
}

/// Immutable, clamped view of the parameters for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParamSnapshot {
    pub reflection: f32,
    pub speed: f32,
    pub ior: f32,
    pub count: u32,
    pub size: f32,
    pub dispersion: f32,
    pub refract: f32,
    pub chromatic_aberration: f32,
    pub pointer_size: f32,
    pub noise_scale: f32,
    pub noise_amount: f32,
}

impl Default for ParamSnapshot {
    fn default() -> Self {
        Self::from_set(&ParameterSet::default())
    }
}

impl ParamSnapshot {
    pub fn from_set(set: &ParameterSet) -> Self {
        let v = |k: ParamKey| k.clamp(set.get(k));
        Self {
            reflection: v(ParamKey::Reflection),
            speed: v(ParamKey::Speed),
            ior: v(ParamKey::Ior),
            count: v(ParamKey::Count) as u32,
            size: v(ParamKey::Size),
            dispersion: v(ParamKey::Dispersion),
            refract: v(ParamKey::Refract),
            chromatic_aberration: v(ParamKey::ChromaticAberration),
            pointer_size: v(ParamKey::PointerSize),
            noise_scale: v(ParamKey::NoiseScale),
            noise_amount: v(ParamKey::NoiseAmount),
        }
    }

    pub fn get(&self, key: ParamKey) -> f32 {
        match key {
            ParamKey::Reflection => self.reflection,
            ParamKey::Speed => self.speed,
            ParamKey::Ior => self.ior,
            ParamKey::Count => self.count as f32,
            ParamKey::Size => self.size,
            ParamKey::Dispersion => self.dispersion,
            ParamKey::Refract => self.refract,
            ParamKey::ChromaticAberration => self.chromatic_aberration,
            ParamKey::PointerSize => self.pointer_size,
            ParamKey::NoiseScale => self.noise_scale,
            ParamKey::NoiseAmount => self.noise_amount,
        }
    }
}
