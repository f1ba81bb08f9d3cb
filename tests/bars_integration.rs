/*
 *  tests/bars_integration.rs
 *
 *  Integration tests for the falling-bar renderer
 *
 *  spectrum-bars - worth the squeeze
 *  (c) 2020-26 Stuart Hunter
 */

use embedded_graphics::pixelcolor::{BinaryColor, Rgb565, RgbColor};

use spectrum_bars::clock::ManualClock;
use spectrum_bars::display::{
    BarDisplayRenderer, Color, FrameBuf, GraphicsSurface, MockSurface, RasterSurface, Rotation,
    SurfaceOp,
};

#[test]
fn test_rise_then_gated_fall() {
    let surface = MockSurface::new(160, 100, BinaryColor::Off);
    let clock = ManualClock::new(0);
    let mut renderer = BarDisplayRenderer::new(surface.clone(), clock.clone(), BinaryColor::Off, BinaryColor::On);

    renderer.init(8, 160, 100, 50, 4).unwrap();
    assert_eq!(renderer.bar_width(), 20);

    let mut magnitudes = [0u32; 8];
    magnitudes[0] = 10;
    renderer.draw_bars(&magnitudes).unwrap();
    assert_eq!(renderer.bar_heights()[0], 10);
    assert_eq!(surface.column_height(0, BinaryColor::On), 10);

    // inside the interval nothing falls
    magnitudes[0] = 5;
    clock.advance(20);
    assert_eq!(renderer.draw_bars(&magnitudes).unwrap(), 0);
    assert_eq!(renderer.bar_heights()[0], 10);

    clock.advance(30);
    assert_eq!(renderer.draw_bars(&magnitudes).unwrap(), 1);
    assert_eq!(renderer.bar_heights()[0], 6);
    assert_eq!(surface.column_height(0, BinaryColor::On), 6);
    assert_eq!(surface.count(BinaryColor::On), 6 * 20);

    // init cleared, one rise, one fall
    let ops = surface.ops();
    assert_eq!(ops[..2], [SurfaceOp::SetRotation(Rotation::Deg0), SurfaceOp::FillScreen(BinaryColor::Off)]);
    assert_eq!(surface.rect_count(), 2);
}

#[test]
fn test_bars_decay_to_empty() {
    let surface = MockSurface::new(64, 32, BinaryColor::Off);
    let clock = ManualClock::new(0);
    let mut renderer = BarDisplayRenderer::new(surface.clone(), clock.clone(), BinaryColor::Off, BinaryColor::On);
    renderer.init(4, 64, 32, 10, 3).unwrap();

    renderer.draw_bars(&[32, 17, 9, 1]).unwrap();
    let silence = [0u32; 4];
    for _ in 0..20 {
        clock.advance(10);
        renderer.draw_bars(&silence).unwrap();
    }
    assert_eq!(renderer.bar_heights(), &[0, 0, 0, 0]);
    assert_eq!(surface.count(BinaryColor::On), 0);
}

#[test]
fn test_rotated_framebuffer_display() {
    // 128x160 portrait panel used in landscape
    let background = Color::Black.to_rgb565();
    let foreground = Color::Green.to_rgb565();
    let surface = GraphicsSurface::new(FrameBuf::new(128, 160, background));
    let mut renderer = BarDisplayRenderer::new(surface, ManualClock::new(0), background, foreground);
    renderer.set_rotation(Rotation::Deg90);
    renderer.init(16, 160, 128, 50, 4).unwrap();
    assert_eq!(renderer.surface().dimensions(), (160, 128));

    let mut magnitudes = [0u32; 16];
    magnitudes[0] = 128;
    magnitudes[15] = 1;
    renderer.draw_bars(&magnitudes).unwrap();

    let fb = renderer.surface().target();
    assert_eq!(fb.count(Rgb565::GREEN), 128 * 10 + 10);
    // logical bottom-left lands on the native top-left under a clockwise quarter turn
    assert_eq!(fb.pixel(0, 0), Some(Rgb565::GREEN));
    // logical bottom-right
    assert_eq!(fb.pixel(0, 159), Some(Rgb565::GREEN));
    assert_eq!(fb.pixel(1, 159), Some(Rgb565::BLACK));
}
