//! Fixed-rate terminal-to-texture synthesis.
//!
//! The synthesizer owns the frame buffer and redraws it on every timer tick,
//! independent of how often the terminal state actually changes: cursor blink
//! and the typing indicator animate even while the log is static. The shader
//! stack never reads terminal state directly; this raster is the only path by
//! which on-screen content changes.

use compact_str::CompactString;

use crate::{
    entry::TerminalSnapshot,
    error::Error,
    frame::{FrameBuffer, Rgba},
    raster::{CosmicRaster, TextRaster},
    wrap,
};

/// Default synthesis rate in ticks per second.
pub const DEFAULT_TICK_HZ: f64 = 60.0;

/// Cursor blink interval, derived from wall-clock time rather than the tick
/// cadence so the blink rate is stable regardless of refresh rate.
pub const BLINK_INTERVAL_MS: f64 = 500.0;

/// Visual styling for the synthesized terminal raster.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TerminalStyle {
    pub background: Rgba,
    pub text_color: Rgba,
    pub cursor_color: Rgba,
    /// Font size in pixels; cursor block height.
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    pub line_height_factor: f32,
    /// Inner padding on every side, in pixels.
    pub padding: f32,
    /// Vertical gap between entries, in pixels.
    pub entry_spacing: f32,
    /// Left indent of entry text relative to the padding edge.
    pub entry_indent: f32,
    /// Reserved margin on the right edge of wrapped entry text.
    pub right_margin: f32,
    /// Prompt prefix for the input line.
    pub prompt: CompactString,
    pub show_cursor: bool,
}

impl Default for TerminalStyle {
    fn default() -> Self {
        Self {
            background: [0, 0, 0, 255],
            text_color: [255, 255, 255, 255],
            cursor_color: [255, 255, 255, 255],
            font_size: 16.0,
            line_height_factor: 1.2,
            padding: 16.0,
            entry_spacing: 4.0,
            entry_indent: 16.0,
            right_margin: 16.0,
            prompt: CompactString::const_new("> "),
            show_cursor: true,
        }
    }
}

/// Poll-driven fixed-rate timer.
///
/// The host calls [`poll`](Self::poll) from its own loop; the timer reports
/// whether a tick is due. Catch-up after a stall is clamped to a single tick
/// so a blocked host does not trigger a redraw burst.
#[derive(Debug, Clone, Copy)]
pub struct TickTimer {
    period_ms: f64,
    next_due_ms: Option<f64>,
}

impl TickTimer {
    pub fn new(period_ms: f64) -> Self {
        Self { period_ms: period_ms.max(1.0), next_due_ms: None }
    }

    pub fn from_hz(hz: f64) -> Self {
        Self::new(1000.0 / hz.max(1e-3))
    }

    /// Returns `true` when a tick is due at `now_ms`, advancing the schedule.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.next_due_ms {
            None => {
                self.next_due_ms = Some(now_ms + self.period_ms);
                true
            },
            Some(due) if now_ms >= due => {
                let mut next = due + self.period_ms;
                if next <= now_ms {
                    // stalled host: skip missed ticks instead of bursting
                    next = now_ms + self.period_ms;
                }
                self.next_due_ms = Some(next);
                true
            },
            Some(_) => false,
        }
    }
}

/// Rasterizes terminal snapshots into a [`FrameBuffer`] on a fixed-rate
/// timer.
pub struct Synthesizer {
    frame: FrameBuffer,
    raster: Box<dyn TextRaster>,
    style: TerminalStyle,
    timer: TickTimer,
}

impl Synthesizer {
    /// Creates a synthesizer with the cosmic-text backend.
    ///
    /// # Errors
    /// Returns [`Error::Font`] when no fonts are available; callers may fall
    /// back to [`with_raster`](Self::with_raster) and a
    /// [`BlockRaster`](crate::raster::BlockRaster).
    pub fn new(width: u32, height: u32, style: TerminalStyle) -> Result<Self, Error> {
        let raster = CosmicRaster::new(style.font_size, style.line_height_factor)?;
        Ok(Self::with_raster(width, height, style, Box::new(raster)))
    }

    /// Creates a synthesizer drawing through an explicit text backend.
    pub fn with_raster(
        width: u32,
        height: u32,
        style: TerminalStyle,
        raster: Box<dyn TextRaster>,
    ) -> Self {
        Self {
            frame: FrameBuffer::new(width, height),
            raster,
            style,
            timer: TickTimer::from_hz(DEFAULT_TICK_HZ),
        }
    }

    /// Overrides the synthesis rate.
    pub fn set_tick_rate(&mut self, hz: f64) {
        self.timer = TickTimer::from_hz(hz);
    }

    /// The synthesized raster; its dimensions always equal the most recent
    /// resize target.
    pub fn frame(&self) -> &FrameBuffer {
        &self.frame
    }

    /// Mutable access for the GPU upload path (dirty-flag handoff).
    pub fn frame_mut(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    /// Resizes the backing buffer, discarding any previously drawn content.
    ///
    /// A tick reads dimensions once at entry, so a resize between ticks never
    /// mixes old and new dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if (width.max(1), height.max(1)) != (self.frame.width(), self.frame.height()) {
            tracing::debug!(width, height, "synthesizer resize");
        }
        self.frame.resize(width, height);
    }

    /// Runs a tick if one is due; returns whether the frame was redrawn.
    pub fn poll(&mut self, snapshot: &TerminalSnapshot<'_>, now_ms: f64) -> bool {
        if self.timer.poll(now_ms) {
            self.tick(snapshot, now_ms);
            true
        } else {
            false
        }
    }

    /// Redraws the frame from the snapshot unconditionally.
    pub fn tick(&mut self, snapshot: &TerminalSnapshot<'_>, now_ms: f64) {
        let style = self.style.clone();
        let line_h = self.raster.line_height();
        let width = self.frame.width() as f32;
        let height = self.frame.height() as f32;

        self.frame.clear(style.background);

        // input band grows with the wrapped input so it never overlaps the log
        let prompt_w = self.raster.measure(&style.prompt);
        let input_avail = (width - 2.0 * style.padding - prompt_w).max(1.0);
        let input_line_count = {
            let raster = &*self.raster;
            wrap::wrap_line(snapshot.input, input_avail, |s| raster.measure(s))
                .len()
                .max(1)
        };
        let band_height = input_line_count as f32 * line_h + 2.0 * style.padding;

        self.draw_entries(snapshot, height - band_height, line_h, &style);
        self.draw_input(snapshot, now_ms, height, line_h, prompt_w, input_avail, &style);
    }

    /// Draws entries newest-first, growing upward from the input band.
    ///
    /// Entries that would cross the top padding boundary are clipped per
    /// line; older ones are dropped from the frame, not from the log.
    fn draw_entries(
        &mut self,
        snapshot: &TerminalSnapshot<'_>,
        bottom: f32,
        line_h: f32,
        style: &TerminalStyle,
    ) {
        let width = self.frame.width() as f32;
        let entry_x = style.padding + style.entry_indent;
        let entry_avail = (width - entry_x - style.right_margin).max(1.0);

        let mut y = bottom;
        'entries: for entry in snapshot.entries.iter().rev() {
            let text = entry.render_text();
            let lines = {
                let raster = &*self.raster;
                wrap::wrap_text(&text, entry_avail, |s| raster.measure(s))
            };
            let lines = if lines.is_empty() { vec![""] } else { lines };

            for line in lines.iter().rev() {
                y -= line_h;
                if y < style.padding {
                    break 'entries;
                }
                self.raster
                    .draw_text(&mut self.frame, entry_x, y, line, style.text_color);
            }
            y -= style.entry_spacing;
        }
    }

    /// Draws the input line(s) and the cursor at the bottom of the frame.
    ///
    /// Only the first line carries the prompt; continuation lines align with
    /// the text column after it. The cursor follows the end of the input:
    /// solid while the user is typing, otherwise blinking on wall-clock time.
    #[allow(clippy::too_many_arguments)]
    fn draw_input(
        &mut self,
        snapshot: &TerminalSnapshot<'_>,
        now_ms: f64,
        height: f32,
        line_h: f32,
        prompt_w: f32,
        input_avail: f32,
        style: &TerminalStyle,
    ) {
        let lines = {
            let raster = &*self.raster;
            wrap::wrap_line(snapshot.input, input_avail, |s| raster.measure(s))
        };
        let lines = if lines.is_empty() { vec![""] } else { lines };
        let n = lines.len();

        let text_x = style.padding + prompt_w;
        let top = height - style.padding - n as f32 * line_h;

        for (i, line) in lines.iter().enumerate() {
            let y = top + i as f32 * line_h;
            if i == 0 {
                self.raster
                    .draw_text(&mut self.frame, style.padding, y, &style.prompt, style.text_color);
            }
            self.raster
                .draw_text(&mut self.frame, text_x, y, line, style.text_color);
        }

        if !style.show_cursor {
            return;
        }
        let blink_on = snapshot.is_typing
            || (now_ms / BLINK_INTERVAL_MS).floor() as i64 % 2 == 0;
        if !blink_on {
            return;
        }

        let last = lines[n - 1];
        let cursor_x = text_x + self.raster.measure(last);
        let cursor_y = top + (n - 1) as f32 * line_h;
        self.frame.fill_rect(
            cursor_x.round() as i32,
            cursor_y.round() as i32,
            (style.font_size * 0.5).round() as u32,
            style.font_size.round() as u32,
            style.cursor_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entry::TerminalSession, raster::BlockRaster};

    fn block_synth(width: u32, height: u32) -> Synthesizer {
        let style = TerminalStyle::default();
        let raster = BlockRaster::new(style.font_size, style.line_height_factor);
        Synthesizer::with_raster(width, height, style, Box::new(raster))
    }

    // wall-clock instant in the visible half of the blink cycle
    const BLINK_ON_MS: f64 = 0.0;
    const BLINK_OFF_MS: f64 = BLINK_INTERVAL_MS;

    #[test]
    fn frame_dimensions_track_resize() {
        let mut synth = block_synth(320, 200);
        let session = TerminalSession::new();

        synth.tick(&session.snapshot(0.0), 0.0);
        assert_eq!((synth.frame().width(), synth.frame().height()), (320, 200));

        synth.resize(640, 480);
        synth.tick(&session.snapshot(1.0), 1.0);
        assert_eq!((synth.frame().width(), synth.frame().height()), (640, 480));
    }

    #[test]
    fn scenario_entry_above_input_band_with_solid_cursor() {
        // viewport 1920x1080 with margins {12, 12, 36, 12}
        let (w, h) = (1896u32, 1032u32);
        let mut synth = block_synth(w, h);
        let style = TerminalStyle::default();
        let cell = style.font_size * 0.6;
        let line_h = style.font_size * style.line_height_factor;

        let mut session = TerminalSession::new();
        session.push_text("hello", 0.0);
        for ch in "wor".chars() {
            session.push_input_char(ch, 1000.0);
        }

        let snapshot = session.snapshot(1000.0);
        assert!(snapshot.is_typing);
        synth.tick(&snapshot, 1000.0);
        let frame = synth.frame();

        // input band holds one line: "> wor" at the bottom padding edge
        let input_top = h as f32 - style.padding - line_h;
        let text_x = style.padding + 2.0 * cell;
        // 'w' block of "wor"
        assert_eq!(
            frame.pixel((text_x + 3.0) as u32, (input_top + 4.0) as u32),
            style.text_color,
        );
        // prompt glyph
        assert_eq!(
            frame.pixel((style.padding + 3.0) as u32, (input_top + 4.0) as u32),
            style.text_color,
        );

        // cursor sits right after "wor", solid because typing
        let cursor_x = text_x + 3.0 * cell;
        assert_eq!(
            frame.pixel((cursor_x + 2.0) as u32, (input_top + 4.0) as u32),
            style.cursor_color,
        );

        // "hello" renders above the reserved input band
        let band = line_h + 2.0 * style.padding;
        let entry_y = h as f32 - band - line_h;
        let entry_x = style.padding + style.entry_indent;
        assert_eq!(
            frame.pixel((entry_x + 3.0) as u32, (entry_y + 4.0) as u32),
            style.text_color,
        );
        // and the entry row is above the band boundary
        assert!(entry_y + line_h <= h as f32 - band + 0.5);
    }

    #[test]
    fn cursor_blinks_on_wall_clock_when_idle() {
        let mut synth = block_synth(300, 120);
        let session = TerminalSession::new();
        let style = TerminalStyle::default();
        let line_h = style.font_size * style.line_height_factor;

        let cursor_x = style.padding + 2.0 * style.font_size * 0.6 + 2.0;
        let cursor_y = 120.0 - style.padding - line_h + 4.0;

        let snapshot = session.snapshot(BLINK_ON_MS);
        assert!(!snapshot.is_typing);
        synth.tick(&snapshot, BLINK_ON_MS);
        assert_eq!(
            synth.frame().pixel(cursor_x as u32, cursor_y as u32),
            style.cursor_color,
        );

        synth.tick(&session.snapshot(BLINK_OFF_MS), BLINK_OFF_MS);
        assert_eq!(
            synth.frame().pixel(cursor_x as u32, cursor_y as u32),
            style.background,
        );
    }

    #[test]
    fn wrapped_input_grows_the_band() {
        let mut synth = block_synth(200, 400);
        let mut session = TerminalSession::new();
        session.push_text("entry", 0.0);
        // long input wraps to several lines at width 200
        for ch in "one two three four five six seven".chars() {
            session.push_input_char(ch, 0.0);
        }

        synth.tick(&session.snapshot(0.0), 0.0);

        // the entry must sit above even a multi-line band; with a single-line
        // band it would overlap. Recompute the band like the synthesizer does.
        let style = TerminalStyle::default();
        let cell = style.font_size * 0.6;
        let line_h = style.font_size * style.line_height_factor;
        let input_avail = 200.0 - 2.0 * style.padding - 2.0 * cell;
        let lines = wrap::wrap_line(
            session.input(),
            input_avail,
            |s| cell * s.chars().count() as f32,
        );
        assert!(lines.len() > 1, "test input should wrap");

        let band = lines.len() as f32 * line_h + 2.0 * style.padding;
        let entry_y = 400.0 - band - line_h;
        let entry_x = style.padding + style.entry_indent;
        assert_eq!(
            synth.frame().pixel((entry_x + 3.0) as u32, (entry_y + 4.0) as u32),
            style.text_color,
        );
    }

    #[test]
    fn old_entries_are_clipped_at_the_top() {
        let mut synth = block_synth(400, 120);
        let mut session = TerminalSession::new();
        for i in 0..50 {
            session.push_text(format!("entry number {i}"), i as f64);
        }
        // must not panic or draw above the padding boundary
        synth.tick(&session.snapshot(100.0), 100.0);

        let style = TerminalStyle::default();
        let frame = synth.frame();
        for y in 0..style.padding as u32 {
            for x in 0..frame.width() {
                assert_eq!(frame.pixel(x, y), style.background);
            }
        }
    }

    #[test]
    fn tick_timer_fires_once_per_period() {
        let mut timer = TickTimer::new(10.0);
        assert!(timer.poll(0.0)); // immediate first tick
        assert!(!timer.poll(5.0));
        assert!(timer.poll(10.0));
        assert!(!timer.poll(12.0));
        assert!(timer.poll(20.0));
    }

    #[test]
    fn tick_timer_does_not_burst_after_a_stall() {
        let mut timer = TickTimer::new(10.0);
        assert!(timer.poll(0.0));
        // host stalls for 10 periods; exactly one catch-up tick fires
        assert!(timer.poll(110.0));
        assert!(!timer.poll(111.0));
        assert!(timer.poll(120.0));
    }

    #[test]
    fn poll_redraws_only_when_due() {
        let mut synth = block_synth(100, 100);
        let session = TerminalSession::new();
        assert!(synth.poll(&session.snapshot(0.0), 0.0));
        assert!(!synth.poll(&session.snapshot(1.0), 1.0));
        assert!(synth.poll(&session.snapshot(17.0), 17.0));
    }
}
