//! Integration tests for size-diff-canvas2d.

use rstest::rstest;
use size_diff_canvas2d::{
    Canvas2dContext, CanvasImage, CompositeOperation, FontConfig, LineSegment, RectParams,
    TextAlign, TextBaseline,
};

fn pixel(ctx: &Canvas2dContext, x: i32, y: i32) -> [u8; 4] {
    let data = ctx.get_image_data(x, y, 1, 1);
    [data[0], data[1], data[2], data[3]]
}

fn full(ctx: &Canvas2dContext) -> RectParams {
    RectParams {
        x: 0.0,
        y: 0.0,
        width: ctx.width() as f32,
        height: ctx.height() as f32,
    }
}

/// Test path operations.
#[test]
fn test_path_operations() {
    let mut ctx = Canvas2dContext::offscreen(100, 100).unwrap();

    ctx.set_fill_style("#00ff00").unwrap();
    ctx.begin_path();
    ctx.move_to(10.0, 10.0);
    ctx.line_to(90.0, 10.0);
    ctx.line_to(90.0, 90.0);
    ctx.line_to(10.0, 90.0);
    ctx.close_path();
    ctx.fill();

    assert_eq!(pixel(&ctx, 50, 50), [0, 255, 0, 255]);
    assert_eq!(pixel(&ctx, 5, 5), [0, 0, 0, 0]);
}

/// A solid horizontal line is drawn across the full span.
#[test]
fn test_stroke_line() {
    let mut ctx = Canvas2dContext::offscreen(100, 100).unwrap();

    ctx.set_stroke_style("#0000ff").unwrap();
    ctx.set_line_width(2.0);
    ctx.stroke_line(&LineSegment::horizontal(10.0, 90.0, 50.0));

    assert_eq!(pixel(&ctx, 50, 50), [0, 0, 255, 255]);
    assert_eq!(pixel(&ctx, 50, 60), [0, 0, 0, 0]);
}

/// Tinting pipeline: fill with a color, multiply the image, then mask to the image alpha.
#[rstest]
#[case("#ff0000", [255, 0, 0, 255])]
#[case("#00ff00", [0, 255, 0, 255])]
#[case("#808080", [128, 128, 128, 255])]
fn test_tint_pipeline(#[case] color: &str, #[case] expected: [u8; 4]) {
    let white_with_hole = {
        let mut data = [255u8, 255, 255, 255].repeat(4);
        data[12..16].copy_from_slice(&[0, 0, 0, 0]);
        CanvasImage::from_rgba8(2, 2, data).unwrap()
    };

    let mut ctx = Canvas2dContext::offscreen(2, 2).unwrap();
    ctx.set_fill_style(color).unwrap();
    let rect = full(&ctx);
    ctx.fill_rect(&rect);
    ctx.set_global_composite_operation(CompositeOperation::Multiply);
    ctx.draw_image(&white_with_hole, 0.0, 0.0);
    ctx.set_global_composite_operation(CompositeOperation::DestinationIn);
    ctx.draw_image(&white_with_hole, 0.0, 0.0);

    assert_eq!(pixel(&ctx, 0, 0), expected);
    assert_eq!(pixel(&ctx, 1, 1), [0, 0, 0, 0]);
}

/// Drawing one canvas onto another scales it to the destination rectangle.
#[test]
fn test_draw_canvas_scaled_downsamples() {
    let mut src = Canvas2dContext::offscreen(8, 8).unwrap();
    src.set_fill_style("#ff0000").unwrap();
    let rect = full(&src);
    src.fill_rect(&rect);

    let mut dst = Canvas2dContext::offscreen(1, 1).unwrap();
    dst.draw_canvas_scaled(&src, 0.0, 0.0, 1.0, 1.0);
    assert_eq!(pixel(&dst, 0, 0), [255, 0, 0, 255]);
}

/// PNG output decodes back to the drawn pixels.
#[test]
fn test_png_output_decodes() {
    let mut ctx = Canvas2dContext::offscreen(16, 8).unwrap();
    ctx.set_fill_style("white").unwrap();
    let rect = full(&ctx);
    ctx.fill_rect(&rect);
    ctx.set_fill_style("black").unwrap();
    ctx.fill_rect(&RectParams {
        x: 8.0,
        y: 0.0,
        width: 8.0,
        height: 8.0,
    });

    let png = ctx.to_png(Some(144.0)).unwrap();
    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (16, 8));
    assert_eq!(decoded.get_pixel(2, 2).0, [255, 255, 255, 255]);
    assert_eq!(decoded.get_pixel(12, 2).0, [0, 0, 0, 255]);
}

/// Text rendering puts ink near the anchor when any font is installed.
#[test]
fn test_fill_text_with_system_fonts() {
    let resolved = FontConfig::default().resolve();
    if resolved.face_count() == 0 {
        eprintln!("no system fonts available, skipping");
        return;
    }

    let mut ctx = Canvas2dContext::with_resolved(200, 60, &resolved).unwrap();
    ctx.set_font("24px Arial, sans-serif").unwrap();
    ctx.set_text_align(TextAlign::Left);
    ctx.set_text_baseline(TextBaseline::Alphabetic);
    let metrics = ctx.measure_text("Wolf").unwrap();
    assert!(metrics.width > 0.0);
    assert!(metrics.ascent > 0.0);

    ctx.set_fill_style("black").unwrap();
    ctx.fill_text("Wolf", 10.0, 40.0);
    let data = ctx.get_image_data(0, 0, 200, 60);
    assert!(data.chunks_exact(4).any(|px| px[3] > 0));
}
