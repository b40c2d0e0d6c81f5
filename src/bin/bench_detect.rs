use std::time::Instant;

use anyhow::Result;
use image::RgbImage;

use sugata::config::Config;
use sugata::detect::detect_once;
use sugata::frame::Frame;
use sugata::render::Canvas;
use sugata::scope::TensorGauge;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load_or_default(CONFIG_PATH);
    let gauge = TensorGauge::new();
    let mut model = sugata::model::load(&config.model, &gauge, |_| {})?;

    // 合成フレームで検出サイクルのみを計測
    let frame = Frame::new(RgbImage::from_fn(640, 480, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    }));
    let mut canvas = Canvas::new(640, 480);

    let iterations = 100;
    let start = Instant::now();
    for _ in 0..iterations {
        detect_once(&frame, &mut model, &mut canvas, &gauge)?;
    }
    let elapsed = start.elapsed();

    let avg_ms = elapsed.as_millis() as f64 / iterations as f64;
    println!(
        "Detect cycle: {:.2}ms/frame = {:.1} FPS (residual tensors: {})",
        avg_ms,
        1000.0 / avg_ms,
        gauge.live()
    );

    Ok(())
}
