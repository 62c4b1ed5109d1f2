//! Snapshot renderer for the cart-pole.
//!
//! Draws the track, cart, pole and axle into an RGB frame via a plotters
//! bitmap backend. A short fading trail of recent poses is kept so a single
//! snapshot still conveys motion. There is no interactive window; frames
//! are returned as buffers or written straight to PNG.

use std::collections::VecDeque;
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use swingup_core::{Result, SwingupError};

/// An RGB frame (3 bytes per pixel, row-major).
#[derive(Clone, Debug)]
pub struct Frame {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Pixel data, `width * height * 3` bytes.
    pub data: Vec<u8>,
}

/// Renderer configuration.
#[derive(Clone, Debug)]
pub struct RenderConfig {
    /// Frame width in pixels.
    pub width: usize,
    /// Frame height in pixels.
    pub height: usize,
    /// Visible world width in meters (centered on the origin).
    pub world_width: f32,
    /// Pole length in meters.
    pub pole_length: f32,
    /// Cart size in pixels.
    pub cart_size: (i32, i32),
    /// Pole stroke width in pixels.
    pub pole_width: u32,
    /// Number of past poses kept in the fading trail.
    pub trail_len: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
            world_width: 5.0,
            pole_length: 0.5,
            cart_size: (50, 30),
            pole_width: 6,
            trail_len: 8,
        }
    }
}

impl RenderConfig {
    /// Create the default render configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the frame size in pixels.
    pub fn with_size(mut self, width: usize, height: usize) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the pole length in meters.
    pub fn with_pole_length(mut self, lp: f32) -> Self {
        self.pole_length = lp;
        self
    }

    /// Set the trail length (0 disables the trail).
    pub fn with_trail_len(mut self, len: usize) -> Self {
        self.trail_len = len;
        self
    }
}

/// Compute the fade alpha for a trail entry.
///
/// Index 0 is the oldest entry; the newest entry gets alpha 1.
fn trail_alpha(index: usize, total: usize, min_alpha: f64) -> f64 {
    if total <= 1 {
        return 1.0;
    }
    let t = index as f64 / (total - 1) as f64;
    min_alpha + (1.0 - min_alpha) * t
}

/// Snapshot renderer with a fading pose trail.
pub struct CartpoleRenderer {
    config: RenderConfig,
    trail: VecDeque<(f32, f32)>,
}

impl CartpoleRenderer {
    /// Create a renderer.
    pub fn new(config: RenderConfig) -> Self {
        Self {
            config,
            trail: VecDeque::new(),
        }
    }

    /// The renderer configuration.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Drop all trail entries (called on environment reset).
    pub fn clear_trail(&mut self) {
        self.trail.clear();
    }

    /// Record the pose and render a frame.
    pub fn draw(&mut self, x: f32, theta: f32) -> Result<Frame> {
        self.push_pose(x, theta);

        let (w, h) = (self.config.width, self.config.height);
        let mut data = vec![0u8; w * h * 3];
        {
            let root = BitMapBackend::with_buffer(&mut data, (w as u32, h as u32))
                .into_drawing_area();
            self.draw_scene(&root)?;
            root.present()
                .map_err(|e| SwingupError::Render(e.to_string()))?;
        }

        Ok(Frame {
            width: w,
            height: h,
            data,
        })
    }

    /// Record the pose and write a PNG snapshot.
    pub fn draw_to_png(&mut self, x: f32, theta: f32, path: impl AsRef<Path>) -> Result<()> {
        self.push_pose(x, theta);

        let (w, h) = (self.config.width, self.config.height);
        let root =
            BitMapBackend::new(path.as_ref(), (w as u32, h as u32)).into_drawing_area();
        self.draw_scene(&root)?;
        root.present()
            .map_err(|e| SwingupError::Render(e.to_string()))
    }

    fn push_pose(&mut self, x: f32, theta: f32) {
        self.trail.push_back((x, theta));
        while self.trail.len() > self.config.trail_len.max(1) {
            self.trail.pop_front();
        }
    }

    fn draw_scene<DB>(&self, root: &DrawingArea<DB, Shift>) -> Result<()>
    where
        DB: DrawingBackend,
    {
        let err = |e: DrawingAreaErrorKind<DB::ErrorType>| SwingupError::Render(e.to_string());

        root.fill(&WHITE).map_err(err)?;

        let w = self.config.width as i32;
        let h = self.config.height as i32;
        let track_y = h * 2 / 3;

        root.draw(&PathElement::new(vec![(0, track_y), (w, track_y)], &BLACK))
            .map_err(err)?;

        let total = self.trail.len();
        for (i, &(x, theta)) in self.trail.iter().enumerate() {
            let alpha = trail_alpha(i, total, 0.15);
            self.draw_pose(root, x, theta, alpha).map_err(err)?;
        }

        Ok(())
    }

    fn draw_pose<DB>(
        &self,
        root: &DrawingArea<DB, Shift>,
        x: f32,
        theta: f32,
        alpha: f64,
    ) -> std::result::Result<(), DrawingAreaErrorKind<DB::ErrorType>>
    where
        DB: DrawingBackend,
    {
        let w = self.config.width as i32;
        let h = self.config.height as i32;
        let track_y = h * 2 / 3;
        let scale = self.config.width as f32 / self.config.world_width;

        let (cart_w, cart_h) = self.config.cart_size;
        let cart_x = (w as f32 / 2.0 + x * scale) as i32;
        let cart = RGBColor(0, 0, 0).mix(alpha);
        root.draw(&Rectangle::new(
            [
                (cart_x - cart_w / 2, track_y - cart_h / 2),
                (cart_x + cart_w / 2, track_y + cart_h / 2),
            ],
            cart.filled(),
        ))?;

        // The pole pivots slightly above the cart center; theta = 0 hangs
        // straight down (screen y grows downwards).
        let pivot = (cart_x, track_y - cart_h / 4);
        let len_px = self.config.pole_length * scale;
        let tip = (
            pivot.0 + (len_px * theta.sin()) as i32,
            pivot.1 + (len_px * theta.cos()) as i32,
        );

        let pole = RGBColor(204, 153, 102).mix(alpha);
        root.draw(&PathElement::new(
            vec![pivot, tip],
            pole.stroke_width(self.config.pole_width),
        ))?;

        let axle = RGBColor(128, 128, 204).mix(alpha);
        root.draw(&Circle::new(pivot, 5, axle.filled()))?;

        Ok(())
    }
}
