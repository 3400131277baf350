//! Demo scenes
//!
//! Each scene draws through the paint API and flushes before its renderers
//! go away, so every surface still exists when the host replays.

use anyhow::Result;
use clap::ValueEnum;
use petal_core::Pipeline;
use petal_paint::{hsv, Color, Renderer, TextStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Scene {
    /// Death-screen flower with petals drawn in nested scopes
    Flower,
    /// Text field with measured caret placement
    TextInput,
    /// Enough rectangles to overflow a small tape
    Overflow,
}

impl Scene {
    pub fn draw(self, pipeline: &Pipeline) -> Result<()> {
        match self {
            Scene::Flower => flower(pipeline),
            Scene::TextInput => text_input(pipeline),
            Scene::Overflow => overflow(pipeline),
        }
    }
}

const OUTLINE: Color = Color(0xff222222);

/// Basic petal, drawn around the current origin
fn petal(r: &mut Renderer<'_>, radius: f32) {
    let base = Color::WHITE;
    r.set_fill(base);
    r.set_stroke(hsv(base, 0.8));
    r.set_line_width(3.0);
    r.begin_path();
    r.arc(0.0, 0.0, radius);
    r.fill();
    r.stroke();
}

/// Petal at (`tx`, `ty`) in its own save scope
fn draw_petal(ctx: &mut Renderer<'_>, tx: f32, ty: f32) {
    let mut guard = ctx.save();
    guard.translate(tx, ty);
    petal(&mut guard, 10.0);
}

fn flower(pipeline: &Pipeline) -> Result<()> {
    let mut ctx = Renderer::primary(pipeline)?;
    ctx.reset();

    ctx.draw_text(
        "You were destroyed by:",
        TextStyle {
            size: 17.5,
            ..TextStyle::default()
        },
    );

    // Offscreen petal sprite, built once and kept on its own surface
    let mut sprite = Renderer::new(pipeline)?;
    sprite.set_dimensions(40.0, 40.0);
    sprite.reset();
    sprite.translate(20.0, 20.0);
    petal(&mut sprite, 10.0);

    ctx.translate(ctx.width() / 2.0, ctx.height() / 2.0);
    ctx.rotate(-0.25);
    let radius = 40.0;
    ctx.scale(radius / 25.0);

    // Back petals
    draw_petal(&mut ctx, 25.0, -10.0);
    draw_petal(&mut ctx, -2.0, -22.0);
    draw_petal(&mut ctx, -28.0, -4.0);

    // Face
    let base = Color(0xffffe763);
    ctx.set_stroke(hsv(base, 0.747));
    ctx.set_fill(base);
    ctx.set_line_width(3.0);
    ctx.begin_path();
    ctx.arc(0.0, 0.0, 25.0);
    ctx.fill();
    ctx.stroke();

    // Eyes
    ctx.round_line_cap();
    ctx.set_stroke(OUTLINE);
    ctx.set_line_width(3.0);
    ctx.begin_path();
    for side in [-1.0f32, 1.0] {
        ctx.move_to(10.0 * side, -8.0);
        ctx.line_to(4.0 * side, -2.0);
        ctx.move_to(4.0 * side, -8.0);
        ctx.line_to(10.0 * side, -2.0);
    }
    ctx.stroke();

    // Mouth
    ctx.set_stroke(OUTLINE);
    ctx.set_line_width(1.5);
    ctx.begin_path();
    ctx.move_to(-6.0, 10.0);
    ctx.qcurve_to(0.0, 5.0, 6.0, 10.0);
    ctx.stroke();

    // Front petals
    draw_petal(&mut ctx, -11.0, 20.0);
    draw_petal(&mut ctx, 32.5, 18.0);

    ctx.flush();
    Ok(())
}

fn text_input(pipeline: &Pipeline) -> Result<()> {
    let mut ctx = Renderer::primary(pipeline)?;
    ctx.reset();

    let (width, height) = (300.0, 40.0);
    ctx.translate(ctx.width() / 2.0, ctx.height() / 2.0);
    ctx.set_fill(Color::WHITE);
    ctx.set_stroke(OUTLINE);
    ctx.set_line_width(4.0);
    ctx.begin_path();
    ctx.round_rect(-width / 2.0, -height / 2.0, width, height, 3.0);
    ctx.fill();
    ctx.stroke();
    ctx.clip_rect(0.0, 0.0, width, height);

    let font_size = height * 0.55;
    ctx.set_text_size(font_size);
    ctx.center_text_baseline();

    let text = "petal pipeline";
    let padding = 8.0;
    let content_left = -width / 2.0 + padding;
    let text_w = ctx.text_width(text, font_size);
    {
        let mut scope = ctx.save();
        scope.translate(content_left + text_w / 2.0, 0.0);
        scope.draw_text(
            text,
            TextStyle {
                fill: Color(0xff212121),
                stroke: Color::WHITE,
                size: font_size,
                stroke_scale: 0.08,
            },
        );
    }

    // Caret: black bar with a white core
    let (cw, ch) = (2.8, font_size * 1.05);
    let caret_x = content_left + text_w + 0.5;
    ctx.set_global_alpha(0.64);
    ctx.set_fill(Color::BLACK);
    ctx.fill_rect(caret_x, -ch / 2.0, cw, ch);
    let white = cw * 0.65;
    ctx.set_fill(Color::WHITE);
    ctx.fill_rect(caret_x + (cw - white) / 2.0, -ch / 2.0, white, ch);
    ctx.set_global_alpha(1.0);

    ctx.flush();
    Ok(())
}

fn overflow(pipeline: &Pipeline) -> Result<()> {
    let mut ctx = Renderer::primary(pipeline)?;
    ctx.reset();

    let cells = 24;
    let cell_w = ctx.width() / cells as f32;
    let cell_h = ctx.height() / cells as f32;
    ctx.add_color_filter(Color(0xff3060ff), 0.25);
    for row in 0..cells {
        for col in 0..cells {
            let shade = ((row * cells + col) * 255 / (cells * cells)) as u8;
            ctx.set_fill(Color::from_argb(0xff, shade, 255 - shade, 128));
            ctx.fill_rect(col as f32 * cell_w, row as f32 * cell_h, cell_w - 1.0, cell_h - 1.0);
        }
    }

    ctx.flush();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use petal_core::{ContextId, PipelineConfig};
    use petal_host::{CanvasCall, RecordingHost, ReplayLog};

    fn run(scene: Scene, capacity: usize) -> ReplayLog {
        let config = PipelineConfig::default().with_tape_capacity(capacity);
        let host = RecordingHost::new(&config);
        let log = host.log();
        let pipeline = Pipeline::new(config, host).unwrap();
        scene.draw(&pipeline).unwrap();
        assert_eq!(pipeline.pending(), 0);
        assert_eq!(pipeline.live_contexts(), vec![ContextId::PRIMARY]);
        log
    }

    #[test]
    fn test_scenes_replay_cleanly() {
        for scene in Scene::value_variants() {
            let log = run(*scene, 16384);
            let stats = log.stats();
            assert_eq!(stats.batches, 1, "{scene:?}");
            assert_eq!(stats.ignored, 0);
            assert_eq!(stats.missing_surface, 0);
            assert_eq!(stats.applied, stats.records);
        }
    }

    #[test]
    fn test_flower_scopes_are_balanced() {
        let calls = run(Scene::Flower, 16384).calls_for(ContextId::PRIMARY);
        let saves = calls.iter().filter(|c| **c == CanvasCall::Save).count();
        let restores = calls.iter().filter(|c| **c == CanvasCall::Restore).count();
        assert_eq!(saves, 5);
        assert_eq!(restores, 5);
        assert!(calls.contains(&CanvasCall::StrokeStyle("rgba(190,173,74,1)".into())));
    }

    #[test]
    fn test_overflow_flushes_implicitly() {
        let log = run(Scene::Overflow, 64);
        let stats = log.stats();
        // reset (5) + one fill color and one rect per cell
        let records = 5 + 2 * 24 * 24;
        assert_eq!(stats.records, records);
        assert_eq!(stats.batches as usize, (records - 1) / 64 + 1);
    }
}
