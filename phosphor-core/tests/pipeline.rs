//! Cross-crate checks of the layout → synthesizer contract: the raster the
//! synthesizer produces must always match the screen pixel dimensions the
//! geometry engine derives.

use phosphor_core::{CameraParams, GeometryLayout, Margins, MonitorStyle, Viewport};
use phosphor_term::{BlockRaster, Synthesizer, TerminalSession, TerminalStyle};

fn layout_for(width: u32, height: u32) -> GeometryLayout {
    GeometryLayout::compute(
        Viewport::new(width, height),
        &Margins::default(),
        &CameraParams::default(),
        &MonitorStyle::default(),
    )
}

fn block_synthesizer(width: u32, height: u32) -> Synthesizer {
    let style = TerminalStyle::default();
    let raster = BlockRaster::new(style.font_size, style.line_height_factor);
    Synthesizer::with_raster(width, height, style, Box::new(raster))
}

#[test]
fn synthesizer_raster_matches_derived_screen_pixels() {
    for (w, h) in [(1920u32, 1080u32), (640, 480), (100, 100), (1, 1)] {
        let layout = layout_for(w, h);
        let (sw, sh) = layout.screen_px;

        let mut synth = block_synthesizer(sw, sh);
        let session = TerminalSession::new();
        synth.tick(&session.snapshot(0.0), 0.0);

        assert_eq!((synth.frame().width(), synth.frame().height()), (sw, sh));
    }
}

#[test]
fn resize_applies_on_the_next_tick() {
    let first = layout_for(1920, 1080);
    let mut synth = block_synthesizer(first.screen_px.0, first.screen_px.1);
    let mut session = TerminalSession::new();
    session.push_text("resize me", 0.0);
    synth.tick(&session.snapshot(0.0), 0.0);

    // viewport shrinks; the very next tick rasters at the new dimensions
    let second = layout_for(800, 600);
    synth.resize(second.screen_px.0, second.screen_px.1);
    synth.tick(&session.snapshot(16.0), 16.0);

    assert_eq!(
        (synth.frame().width(), synth.frame().height()),
        second.screen_px,
    );
}

#[test]
fn scanline_spacing_converts_through_world_units() {
    let layout = layout_for(1920, 1080);
    let spacing = layout.world_line_spacing(25.0);
    assert!(spacing.is_finite() && spacing > 0.0);
    // 25 px at this camera equals 25 world-per-pixel units
    assert!((spacing - 25.0 * layout.world_per_pixel).abs() < 1e-9);
}

#[test]
fn tiny_viewport_keeps_the_whole_pipeline_alive() {
    let layout = layout_for(0, 0);
    assert!(layout.all_finite());

    let mut synth = block_synthesizer(layout.screen_px.0, layout.screen_px.1);
    let mut session = TerminalSession::new();
    session.push_text("still here", 0.0);
    session.push_input_char('x', 1.0);
    // must not panic on a 1x1 raster
    synth.tick(&session.snapshot(1.0), 1.0);
    assert_eq!((synth.frame().width(), synth.frame().height()), (1, 1));
}
