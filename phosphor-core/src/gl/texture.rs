use glow::{HasContext, PixelUnpackData};
use phosphor_term::FrameBuffer;

use crate::error::Error;

/// RGBA8 2D texture sampled by the screen and glass stages.
///
/// The terminal texture is a GPU-side view of the synthesizer's frame
/// buffer with no independent lifetime: it is recreated on resize and
/// re-uploaded whenever the buffer's dirty flag hands off a new frame.
#[derive(Debug)]
pub(crate) struct Texture2d {
    texture: glow::Texture,
    size: (u32, u32),
}

impl Texture2d {
    pub fn new(gl: &glow::Context, width: u32, height: u32) -> Result<Self, Error> {
        let width = width.max(1);
        let height = height.max(1);

        let texture = unsafe { gl.create_texture() }.map_err(Error::texture_creation_failed)?;
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(texture));
            gl.tex_storage_2d(glow::TEXTURE_2D, 1, glow::RGBA8, width as i32, height as i32);
            set_linear_clamp(gl, glow::TEXTURE_2D);
            gl.bind_texture(glow::TEXTURE_2D, None);
        }

        Ok(Self { texture, size: (width, height) })
    }

    /// Creates the texture and fills it with `pixels` (RGBA8, bottom row
    /// first).
    pub fn with_pixels(
        gl: &glow::Context,
        width: u32,
        height: u32,
        pixels: &[u8],
    ) -> Result<Self, Error> {
        let texture = Self::new(gl, width, height)?;
        texture.upload_pixels(gl, pixels);
        Ok(texture)
    }

    pub fn raw(&self) -> glow::Texture {
        self.texture
    }

    /// Re-uploads the full image.
    pub fn upload_pixels(&self, gl: &glow::Context, pixels: &[u8]) {
        debug_assert!(pixels.len() >= (self.size.0 * self.size.1 * 4) as usize);
        unsafe {
            gl.bind_texture(glow::TEXTURE_2D, Some(self.texture));
            gl.tex_sub_image_2d(
                glow::TEXTURE_2D,
                0,
                0,
                0,
                self.size.0 as i32,
                self.size.1 as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(pixels)),
            );
            gl.bind_texture(glow::TEXTURE_2D, None);
        }
    }

    /// Uploads the frame buffer if it is dirty, recreating the texture when
    /// dimensions changed. Returns the texture to bind afterwards (self or
    /// the recreated replacement).
    pub fn sync_frame(self, gl: &glow::Context, frame: &mut FrameBuffer) -> Result<Self, Error> {
        let target_size = (frame.width(), frame.height());
        if target_size != self.size {
            self.delete(gl);
            let fresh = Self::new(gl, target_size.0, target_size.1)?;
            frame.take_dirty();
            fresh.upload_pixels(gl, frame.pixels());
            return Ok(fresh);
        }

        if frame.take_dirty() {
            self.upload_pixels(gl, frame.pixels());
        }
        Ok(self)
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.texture) };
    }
}

/// Cube map used for environment reflections on the glass overlay.
#[derive(Debug)]
pub(crate) struct CubeMap {
    texture: glow::Texture,
}

impl CubeMap {
    pub fn raw(&self) -> glow::Texture {
        self.texture
    }

    pub fn delete(&self, gl: &glow::Context) {
        unsafe { gl.delete_texture(self.texture) };
    }
}

fn set_linear_clamp(gl: &glow::Context, target: u32) {
    unsafe {
        gl.tex_parameter_i32(target, glow::TEXTURE_MIN_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_MAG_FILTER, glow::LINEAR as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_S, glow::CLAMP_TO_EDGE as i32);
        gl.tex_parameter_i32(target, glow::TEXTURE_WRAP_T, glow::CLAMP_TO_EDGE as i32);
    }
}

/// Generates the checkerboard calibration texture the screen falls back to
/// when no terminal texture is available.
pub(crate) fn checkerboard_texture(
    gl: &glow::Context,
    size: u32,
    squares: u32,
) -> Result<Texture2d, Error> {
    let size = size.max(squares.max(1));
    let cell = size / squares.max(1);
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            let v = if on { 255 } else { 0 };
            pixels.extend_from_slice(&[v, v, v, 255]);
        }
    }
    Texture2d::with_pixels(gl, size, size, &pixels)
}

/// Procedural environment cube map: a vertical sky-to-floor gradient with a
/// touch of hash grain, enough for plausible rim reflections without assets.
pub(crate) fn environment_cube_map(gl: &glow::Context, size: u32) -> Result<CubeMap, Error> {
    let size = size.max(2);
    let texture = unsafe { gl.create_texture() }.map_err(Error::texture_creation_failed)?;

    unsafe {
        gl.bind_texture(glow::TEXTURE_CUBE_MAP, Some(texture));
        gl.tex_storage_2d(
            glow::TEXTURE_CUBE_MAP,
            1,
            glow::RGBA8,
            size as i32,
            size as i32,
        );
    }

    for face in 0..6u32 {
        let pixels = env_face_pixels(face, size);
        unsafe {
            gl.tex_sub_image_2d(
                glow::TEXTURE_CUBE_MAP_POSITIVE_X + face,
                0,
                0,
                0,
                size as i32,
                size as i32,
                glow::RGBA,
                glow::UNSIGNED_BYTE,
                PixelUnpackData::Slice(Some(&pixels)),
            );
        }
    }

    unsafe {
        set_linear_clamp(gl, glow::TEXTURE_CUBE_MAP);
        gl.tex_parameter_i32(
            glow::TEXTURE_CUBE_MAP,
            glow::TEXTURE_WRAP_R,
            glow::CLAMP_TO_EDGE as i32,
        );
        gl.bind_texture(glow::TEXTURE_CUBE_MAP, None);
    }

    Ok(CubeMap { texture })
}

fn env_face_pixels(face: u32, size: u32) -> Vec<u8> {
    // +Y is a bright ceiling, -Y a dark floor, the sides a gradient
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let t = y as f32 / (size - 1) as f32;
            let base = match face {
                2 => 0.85,        // +Y
                3 => 0.12,        // -Y
                _ => 0.7 - 0.5 * t,
            };
            let grain = (hash2(x as f32, y as f32 + face as f32 * 37.0) - 0.5) * 0.04;
            let v = ((base + grain).clamp(0.0, 1.0) * 255.0) as u8;
            // slightly cool tone
            pixels.extend_from_slice(&[
                v.saturating_sub(8),
                v.saturating_sub(3),
                v,
                255,
            ]);
        }
    }
    pixels
}

fn hash2(x: f32, y: f32) -> f32 {
    let h = (x * 127.1 + y * 311.7).sin() * 43758.547;
    h.fract().abs()
}
