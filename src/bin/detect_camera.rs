use anyhow::{Context, Result};

use sugata::config::Config;
use sugata::render::{Canvas, WindowPresenter};
use sugata::sched::{run_continuous, CancelToken};
use sugata::scope::TensorGauge;
use sugata::source::{CameraSource, FrameSource};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config = Config::load_or_default(CONFIG_PATH);
    println!("=== Sugata - 連続姿勢検出 ({}) ===", env!("GIT_VERSION"));
    println!("モデル: {}", config.model.name);
    println!("カメラ: index {}", config.camera.index);
    println!("Esc または Ctrl-C で終了");

    let gauge = TensorGauge::new();
    let mut model = sugata::model::load(&config.model, &gauge, |state| {
        if state.loading {
            print!("\rモデル読み込み中... {:.2}%", state.progress * 100.0);
            let _ = std::io::Write::flush(&mut std::io::stdout());
        }
    })?;
    println!("\rモデル読み込み完了            ");

    let mut source = CameraSource::open_with_resolution(
        config.camera.index,
        config.camera.width,
        config.camera.height,
    )
    .context("カメラを開けません")?;
    let (src_w, src_h) = source.dimensions();

    let mut canvas = Canvas::new(src_w as usize, src_h as usize);
    let mut presenter = WindowPresenter::new(&config.window.title, src_w as usize, src_h as usize)?;

    let token = CancelToken::new();
    let ctrlc_token = token.clone();
    ctrlc::set_handler(move || ctrlc_token.cancel()).context("Ctrl-Cハンドラの設定に失敗")?;

    let stats = run_continuous(
        &mut source,
        &mut model,
        &mut canvas,
        &mut presenter,
        &gauge,
        &token,
    )?;

    println!(
        "終了: {}フレーム取得, {}サイクル完了, {}フレームスキップ",
        stats.frames_seen, stats.cycles_completed, stats.cycles_failed
    );
    Ok(())
}
