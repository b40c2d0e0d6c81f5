use anyhow::{Context, Result};

use sugata::config::Config;
use sugata::detect::detect_once;
use sugata::render::{Canvas, SCORE_THRESHOLD};
use sugata::scope::TensorGauge;
use sugata::source::ImageSource;

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let mut args = std::env::args().skip(1);
    let input = args.next().context("usage: detect-image <image> [output.png]")?;
    let output = args.next().unwrap_or_else(|| "overlay.png".to_string());

    let config = Config::load_or_default(CONFIG_PATH);
    println!("=== Sugata - 単発姿勢検出 ({}) ===", env!("GIT_VERSION"));
    println!("モデル: {}", config.model.name);

    let gauge = TensorGauge::new();
    let mut model = sugata::model::load(&config.model, &gauge, |state| {
        if state.loading {
            print!("\rモデル読み込み中... {:.2}%", state.progress * 100.0);
            let _ = std::io::Write::flush(&mut std::io::stdout());
        }
    })?;
    println!("\rモデル読み込み完了            ");

    let source = ImageSource::open(&input).with_context(|| format!("画像を開けません: {}", input))?;
    let frame = source.frame();

    let mut canvas = Canvas::new(frame.width() as usize, frame.height() as usize);
    let pose = detect_once(frame, &mut model, &mut canvas, &gauge)?;

    println!("検出キーポイント (score > {}):", SCORE_THRESHOLD);
    for (index, kp) in pose.iter_above(SCORE_THRESHOLD) {
        println!(
            "  {:<14} ({:>6.1}, {:>6.1})  score {:.2}",
            index.name(),
            kp.x,
            kp.y,
            kp.score
        );
    }

    canvas
        .to_image()
        .save(&output)
        .with_context(|| format!("保存に失敗: {}", output))?;
    println!("オーバーレイを保存しました: {}", output);

    Ok(())
}
