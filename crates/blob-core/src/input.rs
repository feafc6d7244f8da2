use crate::cell::{latest_cell, CellReader, CellWriter};
use crate::constants::MAX_PIXEL_RATIO;
use crate::error::{BlobError, Result};
use glam::Vec2;

/// Logical (CSS-like) viewport size plus the display's pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub device_pixel_ratio: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32, device_pixel_ratio: f32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(BlobError::DegenerateViewport("zero-sized viewport"));
        }
        if !(device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0) {
            return Err(BlobError::DegenerateViewport("device pixel ratio must be positive"));
        }
        Ok(Self {
            width,
            height,
            device_pixel_ratio,
        })
    }

    #[inline]
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    #[inline]
    pub fn pixel_ratio(&self) -> f32 {
        self.device_pixel_ratio.min(MAX_PIXEL_RATIO)
    }

    /// Backing pixel size of the off-screen buffer: `size * min(dpr, 2)`.
    pub fn pixel_size(&self) -> (u32, u32) {
        let r = self.pixel_ratio();
        let w = (self.width as f32 * r).round() as u32;
        let h = (self.height as f32 * r).round() as u32;
        (w.max(1), h.max(1))
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            device_pixel_ratio: 1.0,
        }
    }
}

/// Latest pointer position in normalized coordinates (up-positive y).
///
/// Values are deliberately not clamped: a pointer outside the canvas moves the
/// pointer sphere off-volume.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    pub x: f32,
    pub y: f32,
}

impl PointerState {
    #[inline]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// `x = px/w*2-1`, `y = -(py/h*2-1)`; `(0,0)` px is the top-left corner.
#[inline]
pub fn pointer_to_normalized(px: f32, py: f32, viewport_width: f32, viewport_height: f32) -> PointerState {
    PointerState {
        x: (px / viewport_width) * 2.0 - 1.0,
        y: -((py / viewport_height) * 2.0 - 1.0),
    }
}

/// Everything the input side publishes for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    pub pointer: PointerState,
    pub viewport: Viewport,
}

/// Event-side handle. Pointer and resize callbacks write here.
pub struct InputState {
    cell: CellWriter<InputSnapshot>,
}

/// Frame-side handle, read once per frame.
pub struct InputReader {
    cell: CellReader<InputSnapshot>,
}

impl InputState {
    pub fn new(viewport: Viewport) -> (Self, InputReader) {
        let (writer, reader) = latest_cell(InputSnapshot {
            pointer: PointerState::default(),
            viewport,
        });
        (Self { cell: writer }, InputReader { cell: reader })
    }

    /// Pointer moved to `(px, py)` in logical viewport pixels.
    pub fn on_pointer_move(&mut self, px: f32, py: f32) {
        self.cell.update(|s| {
            let (w, h) = (s.viewport.width as f32, s.viewport.height as f32);
            s.pointer = pointer_to_normalized(px, py, w, h);
        });
    }

    /// Degenerate sizes (minimized windows) are ignored and the last good
    /// viewport is kept.
    pub fn on_resize(&mut self, width: u32, height: u32, device_pixel_ratio: f32) {
        match Viewport::new(width, height, device_pixel_ratio) {
            Ok(viewport) => self.cell.update(|s| s.viewport = viewport),
            Err(e) => log::debug!("[input] ignoring resize: {}", e),
        }
    }

    pub fn latest(&self) -> &InputSnapshot {
        self.cell.latest()
    }
}

impl InputReader {
    pub fn snapshot(&mut self) -> InputSnapshot {
        self.cell.snapshot()
    }
}
