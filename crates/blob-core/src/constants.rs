// Shared tuning constants for the distance field, the march loop and shading.
// Both the CPU reference shader and the WGSL port read these values.

// Sphere tracing
pub const MAX_STEPS: u32 = 100; // hard cap on march iterations per pixel
pub const MAX_DIST: f32 = 5.0; // rays travelling further than this are misses
pub const MIN_DIST: f32 = 0.005; // field value treated as a surface hit
pub const STEP_RELAXATION: f32 = 0.9; // under-relaxed step to avoid tunnelling thin features

// Field composition
pub const MAX_BALLS: u32 = 20; // upper bound on animated spheres
pub const MAX_BALL_RADIUS: f32 = 0.25;
pub const BALL_RADIUS_HASH_SPAN: f32 = 0.5; // radius = min(max, size + span * hash(i))
pub const BALL_ORBIT_AMPLITUDE: f32 = 0.88;
pub const POINTER_SPREAD: f32 = 2.5; // normalized pointer -> world units
pub const SMOOTH_UNION_K: f32 = 1.0;
pub const NORMAL_EPSILON: f32 = 1e-3;

// Hash
pub const HASH_SCALE: f32 = 43237.5324;
pub const HASH3_Y_SCALE: f32 = 99.0;
pub const HASH3_Z_SCALE: f32 = 9999.0;

// Shading
pub const OUTPUT_GAMMA: f32 = 0.465;
pub const NOISE_SCROLL_U: f32 = 0.07; // applied to the latitude axis
pub const NOISE_SCROLL_V: f32 = 0.05; // applied to the longitude axis
pub const SURFACE_NOISE_FADE_INNER: f32 = 1.0;
pub const SURFACE_NOISE_FADE_OUTER: f32 = 1.4;
pub const DISPERSION_TAPS: u32 = 16;
pub const DISPERSION_SLIDE_SPAN: f32 = 0.1;

// Off-screen buffer
pub const MAX_PIXEL_RATIO: f32 = 2.0;

// Default camera rig
pub const DEFAULT_CAMERA_POSITION: [f32; 3] = [0.0, 0.0, 3.0];
pub const DEFAULT_FOV_DEGREES: f32 = 75.0;
pub const DEFAULT_NEAR: f32 = 0.1;
pub const DEFAULT_FAR: f32 = 1000.0;

// Backdrop stand-in scene
pub const BACKDROP_CLEAR_RGB: [f32; 3] = [0.667, 0.937, 0.937]; // #aaefef
pub const BACKDROP_BOX_HALF_EXTENT: f32 = 0.5;
pub const BACKDROP_BOX_ROTATION: [f32; 3] = [0.0, std::f32::consts::FRAC_PI_4, std::f32::consts::FRAC_PI_4];
