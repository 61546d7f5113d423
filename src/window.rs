//! SDL2 viewer for watching frames as they are rendered.
//!
//! Only built with the `window` feature. The window has the framebuffer's
//! fixed size; frames are uploaded to a streaming ARGB8888 [`FrameTexture`]
//! and copied to the canvas unscaled.
//!
//! The texture borrows a [`TextureCreator`] the caller keeps alive next to the
//! window, so it is created once and reused every frame:
//!
//! ```ignore
//! let mut window = Window::new("rastr", 700, 700)?;
//! let creator = window.texture_creator();
//! let mut texture = FrameTexture::new(&creator, window.width(), window.height())?;
//! window.present(&mut texture, frame)?;
//! ```

use sdl2::event::Event;
use sdl2::keyboard::Keycode;
use sdl2::pixels::PixelFormatEnum;
use sdl2::render::{Canvas, Texture, TextureCreator};
use sdl2::video::WindowContext;

use crate::export::to_argb8888;
use crate::math::vec3::Vec3;

pub const FPS: u64 = 60;
pub const FRAME_TARGET_TIME: u64 = 1000 / FPS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowEvent {
    None,
    Quit,
    /// `A`: turn the model counter-clockwise.
    RotateLeft,
    /// `D`: turn the model clockwise.
    RotateRight,
}

pub struct FrameLimiter {
    previous_frame_time: u64,
}

impl FrameLimiter {
    pub fn new(window: &Window) -> Self {
        Self {
            previous_frame_time: window.timer().ticks64(),
        }
    }

    /// Sleep off the rest of the frame budget. Returns milliseconds since the last call.
    pub fn wait_and_get_delta(&mut self, window: &Window) -> u64 {
        let elapsed = window.timer().ticks64() - self.previous_frame_time;
        if elapsed < FRAME_TARGET_TIME {
            std::thread::sleep(std::time::Duration::from_millis(FRAME_TARGET_TIME - elapsed));
        }

        let now = window.timer().ticks64();
        let delta = now - self.previous_frame_time;
        self.previous_frame_time = now;
        delta
    }
}

pub struct Window {
    canvas: Canvas<sdl2::video::Window>,
    event_pump: sdl2::EventPump,
    timer_subsystem: sdl2::TimerSubsystem,
    width: u32,
    height: u32,
}

impl Window {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self, String> {
        let sdl_context = sdl2::init()?;
        let video_subsystem = sdl_context.video()?;
        let timer_subsystem = sdl_context.timer()?;

        let window = video_subsystem
            .window(title, width, height)
            .position_centered()
            .build()
            .map_err(|e| e.to_string())?;

        let canvas = window.into_canvas().build().map_err(|e| e.to_string())?;
        let event_pump = sdl_context.event_pump()?;

        Ok(Self {
            canvas,
            event_pump,
            timer_subsystem,
            width,
            height,
        })
    }

    /// Drain pending events, returning the first one the viewer reacts to.
    pub fn poll_events(&mut self) -> WindowEvent {
        for event in self.event_pump.poll_iter() {
            match event {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => return WindowEvent::Quit,
                Event::KeyDown {
                    keycode: Some(Keycode::A),
                    ..
                } => return WindowEvent::RotateLeft,
                Event::KeyDown {
                    keycode: Some(Keycode::D),
                    ..
                } => return WindowEvent::RotateRight,
                _ => {}
            }
        }
        WindowEvent::None
    }

    /// A creator for textures compatible with this window's canvas.
    pub fn texture_creator(&self) -> TextureCreator<WindowContext> {
        self.canvas.texture_creator()
    }

    /// Upload a `width * height` frame (row 0 at the top) and show it.
    pub fn present(
        &mut self,
        texture: &mut FrameTexture<'_>,
        frame: &[Vec3],
    ) -> Result<(), String> {
        texture.upload(frame)?;

        self.canvas.clear();
        self.canvas.copy(&texture.texture, None, None)?;
        self.canvas.present();
        Ok(())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn timer(&self) -> &sdl2::TimerSubsystem {
        &self.timer_subsystem
    }
}

/// Streaming ARGB8888 texture reused across frames.
pub struct FrameTexture<'a> {
    texture: Texture<'a>,
    width: usize,
}

impl<'a> FrameTexture<'a> {
    pub fn new(
        creator: &'a TextureCreator<WindowContext>,
        width: u32,
        height: u32,
    ) -> Result<Self, String> {
        let texture = creator
            .create_texture_streaming(PixelFormatEnum::ARGB8888, width, height)
            .map_err(|e| e.to_string())?;
        Ok(Self {
            texture,
            width: width as usize,
        })
    }

    fn upload(&mut self, frame: &[Vec3]) -> Result<(), String> {
        let pixels = to_argb8888(frame);
        let width = self.width;
        self.texture
            .with_lock(None, |buf, pitch| copy_rows(&pixels, width, buf, pitch))
    }
}

/// Copy packed pixels into a locked texture whose rows are `pitch` bytes apart.
fn copy_rows(pixels: &[u32], width: usize, buf: &mut [u8], pitch: usize) {
    for (row, src) in pixels.chunks_exact(width).enumerate() {
        let start = row * pitch;
        let Some(dst) = buf.get_mut(start..start + width * 4) else {
            break;
        };
        for (out, p) in dst.chunks_exact_mut(4).zip(src) {
            out.copy_from_slice(&p.to_ne_bytes());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rows_honour_texture_pitch() {
        let pixels = [0xFF00_0001, 0xFF00_0002, 0xFF00_0003, 0xFF00_0004];
        // 2 pixels per row, padded to 12 bytes.
        let mut buf = vec![0xAAu8; 24];
        copy_rows(&pixels, 2, &mut buf, 12);

        assert_eq!(&buf[0..4], &0xFF00_0001u32.to_ne_bytes());
        assert_eq!(&buf[4..8], &0xFF00_0002u32.to_ne_bytes());
        assert_eq!(&buf[8..12], &[0xAAu8; 4]);
        assert_eq!(&buf[12..16], &0xFF00_0003u32.to_ne_bytes());
        assert_eq!(&buf[16..20], &0xFF00_0004u32.to_ne_bytes());
    }

    #[test]
    fn short_buffer_stops_copying() {
        let pixels = [1u32, 2, 3, 4];
        let mut buf = vec![0u8; 8];
        copy_rows(&pixels, 2, &mut buf, 8);
        assert_eq!(&buf[0..4], &1u32.to_ne_bytes());
        assert_eq!(&buf[4..8], &2u32.to_ne_bytes());
    }
}
