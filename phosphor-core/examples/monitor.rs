//! Native OpenGL 3.3 monitor example.
//!
//! Renders the full pipeline into a desktop window using glutin (OpenGL
//! context) + winit (windowing): type into the terminal, press enter, and a
//! canned reply resolves through the pending-entry lifecycle a moment later.
//!
//! Run with:
//! ```sh
//! PHOSPHOR_LOG=debug cargo run -p phosphor-core --example monitor
//! ```

use std::{num::NonZeroU32, time::Instant};

use glutin::{
    config::{ConfigTemplateBuilder, GlConfig},
    context::{
        ContextApi, ContextAttributesBuilder, NotCurrentGlContext, PossiblyCurrentContext, Version,
    },
    display::{GetGlDisplay, GlDisplay},
    surface::{GlSurface, Surface, SwapInterval, WindowSurface},
};
use glutin_winit::DisplayBuilder;
use phosphor_core::{CameraParams, GlState, GlslVersion, Margins, MonitorScene, MonitorStyle, Viewport};
use phosphor_term::{BlockRaster, EntryId, Synthesizer, TerminalSession, TerminalStyle};
use raw_window_handle::HasWindowHandle;
use tracing_subscriber::EnvFilter;
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Window, WindowAttributes, WindowId},
};

/// Simulated backend latency for the canned replies.
const REPLY_DELAY_MS: f64 = 600.0;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("PHOSPHOR_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let event_loop = EventLoop::new().expect("failed to create event loop");
    let mut app = App { state: None, started: Instant::now() };
    event_loop.run_app(&mut app).expect("event loop failed");
}

struct App {
    state: Option<AppState>,
    started: Instant,
}

struct AppState {
    window: Window,
    gl_context: PossiblyCurrentContext,
    gl_surface: Surface<WindowSurface>,
    gl: glow::Context,
    gl_state: GlState,
    scene: MonitorScene,
    session: TerminalSession,
    synthesizer: Synthesizer,
    pending_replies: Vec<(EntryId, f64)>,
}

impl App {
    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let window_attrs = WindowAttributes::default()
            .with_title("phosphor - CRT terminal")
            .with_inner_size(LogicalSize::new(1280, 800));

        let config_template = ConfigTemplateBuilder::new()
            .with_alpha_size(8)
            .with_depth_size(24);

        let (window, gl_config) =
            DisplayBuilder::new()
                .with_window_attributes(Some(window_attrs))
                .build(event_loop, config_template, |configs| {
                    configs
                        .reduce(|accum, config| {
                            if config.num_samples() > accum.num_samples() { config } else { accum }
                        })
                        .unwrap()
                })
                .expect("failed to build display");

        let window = window.expect("failed to create window");
        let gl_display = gl_config.display();

        // Request OpenGL 3.3 Core
        let context_attrs = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .build(Some(
                window
                    .window_handle()
                    .expect("failed to get window handle")
                    .into(),
            ));

        let not_current_context = unsafe { gl_display.create_context(&gl_config, &context_attrs) }
            .expect("failed to create GL context");

        let size = window.inner_size();
        let surface_attrs = glutin::surface::SurfaceAttributesBuilder::<WindowSurface>::new()
            .build(
                window
                    .window_handle()
                    .expect("failed to get window handle")
                    .into(),
                NonZeroU32::new(size.width.max(1)).unwrap(),
                NonZeroU32::new(size.height.max(1)).unwrap(),
            );

        let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attrs) }
            .expect("failed to create GL surface");

        let gl_context = not_current_context
            .make_current(&gl_surface)
            .expect("failed to make GL context current");

        // Try vsync, but don't fail if unsupported
        let _ = gl_surface
            .set_swap_interval(&gl_context, SwapInterval::Wait(NonZeroU32::new(1).unwrap()));

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name))
        };
        let gl_state = GlState::new(&gl);

        let viewport = Viewport::new(size.width, size.height);
        let mut scene = MonitorScene::new(
            &gl,
            viewport,
            CameraParams::default(),
            Margins::default(),
            MonitorStyle::default(),
            &GlslVersion::Gl330,
        )
        .expect("failed to create monitor scene");

        let (screen_w, screen_h) = scene.screen_pixel_size();
        let style = TerminalStyle::default();
        let mut synthesizer = match Synthesizer::new(screen_w, screen_h, style.clone()) {
            Ok(synthesizer) => synthesizer,
            Err(err) => {
                tracing::warn!(%err, "falling back to block glyphs");
                let raster = BlockRaster::new(style.font_size, style.line_height_factor);
                Synthesizer::with_raster(screen_w, screen_h, style, Box::new(raster))
            },
        };

        let mut session = TerminalSession::new();
        let now = self.now_ms();
        session.push_text("phosphor terminal - type and press enter", now);

        synthesizer.tick(&session.snapshot(now), now);
        scene
            .sync_frame(&gl, synthesizer.frame_mut())
            .expect("failed to upload terminal texture");

        self.state = Some(AppState {
            window,
            gl_context,
            gl_surface,
            gl,
            gl_state,
            scene,
            session,
            synthesizer,
            pending_replies: Vec::new(),
        });
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let now = self.now_ms();
        let Some(state) = self.state.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            },
            WindowEvent::Resized(new_size) => {
                if new_size.width > 0 && new_size.height > 0 {
                    state.gl_surface.resize(
                        &state.gl_context,
                        NonZeroU32::new(new_size.width).unwrap(),
                        NonZeroU32::new(new_size.height).unwrap(),
                    );
                    state
                        .scene
                        .set_viewport(&state.gl, Viewport::new(new_size.width, new_size.height))
                        .expect("failed to apply viewport");

                    let (w, h) = state.scene.screen_pixel_size();
                    state.synthesizer.resize(w, h);
                    state.window.request_redraw();
                }
            },
            WindowEvent::KeyboardInput {
                event: KeyEvent { logical_key, state: ElementState::Pressed, .. },
                ..
            } => {
                match logical_key {
                    Key::Named(NamedKey::Enter) => {
                        if let Some(id) = state.session.submit_input(now) {
                            let pending = state.session.begin_pending(now);
                            state.pending_replies.push((pending, now + REPLY_DELAY_MS));
                            tracing::debug!(?id, "input submitted");
                        }
                    },
                    Key::Named(NamedKey::Backspace) => state.session.backspace(now),
                    Key::Named(NamedKey::Space) => state.session.push_input_char(' ', now),
                    Key::Character(text) => {
                        for ch in text.chars().filter(|ch| !ch.is_control()) {
                            state.session.push_input_char(ch, now);
                        }
                    },
                    _ => {},
                }
            },
            WindowEvent::RedrawRequested => {
                // resolve simulated backend replies whose delay elapsed
                let due: Vec<EntryId> = state
                    .pending_replies
                    .iter()
                    .filter(|(_, at)| now >= *at)
                    .map(|(id, _)| *id)
                    .collect();
                state.pending_replies.retain(|(_, at)| now < *at);
                for id in due {
                    state
                        .session
                        .resolve_pending(id, "ack. signal is stable.", now);
                }

                // fixed-rate synthesis, decoupled from the frame rate
                if state.synthesizer.poll(&state.session.snapshot(now), now) {
                    state
                        .scene
                        .sync_frame(&state.gl, state.synthesizer.frame_mut())
                        .expect("failed to upload terminal texture");
                }

                let size = state.window.inner_size();
                state
                    .gl_state
                    .viewport(&state.gl, 0, 0, size.width as i32, size.height as i32);
                state.gl_state.clear_color(&state.gl, 0.02, 0.02, 0.03, 1.0);
                unsafe {
                    use glow::HasContext;
                    state.gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);
                }

                state
                    .scene
                    .render(&state.gl, &mut state.gl_state)
                    .expect("failed to render scene");

                state
                    .gl_surface
                    .swap_buffers(&state.gl_context)
                    .expect("failed to swap buffers");
            },
            _ => {},
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}
