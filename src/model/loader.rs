use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use tracing::info;

use crate::config::ModelConfig;
use crate::model::ModelHandle;
use crate::pose::SinglePoseModel;
use crate::scope::{self, TensorGauge};
use crate::{Error, Result};

/// UIシェルへ通知する読み込み状態
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadingState {
    pub loading: bool,
    /// 0.0〜1.0 の進捗。単調非減少
    pub progress: f32,
}

/// 進捗コールバックに単調性を保証するゲート
///
/// 後退した値やNaNを握り潰し、報告値は常に直前以上かつ 0.0〜1.0 に収まる。
struct ProgressGate {
    last: f32,
}

impl ProgressGate {
    fn new() -> Self {
        Self { last: 0.0 }
    }

    fn clamp(&mut self, fraction: f32) -> f32 {
        let fraction = if fraction.is_nan() { self.last } else { fraction };
        self.last = fraction.clamp(0.0, 1.0).max(self.last);
        self.last
    }
}

/// モデルを読み込み、ウォームアップまで済ませたハンドルを返す
///
/// - base_url 設定時はキャッシュに無ければダウンロード（進捗を通知）
/// - セッション構築後、グラフメタデータから入力形状を読む
///   （動的次元は config の input_size で補完）
/// - 全1テンソルでウォームアップ推論を正確に1回実行し、遅延コンパイルを先に済ませる
///
/// 成功時、最後に観測される状態は必ず { loading: false, progress: 1.0 }。
/// ウォームアップの入出力は即座に解放され、ゲージに残留しない。
pub fn load(
    cfg: &ModelConfig,
    gauge: &TensorGauge,
    mut on_progress: impl FnMut(LoadingState),
) -> Result<ModelHandle> {
    let mut gate = ProgressGate::new();
    let path = ensure_model(cfg, &mut gate, &mut on_progress)?;

    let session = Session::builder()
        .and_then(|b| b.with_optimization_level(GraphOptimizationLevel::Level3))
        .and_then(|b| b.commit_from_file(&path))
        .map_err(Error::model_load)?;

    let input_name = session.inputs[0].name.clone();
    let output_name = session.outputs[0].name.clone();
    let input_shape = read_input_shape(&session, cfg.input_size);
    info!(
        model = %cfg.name,
        shape = ?input_shape,
        "model session ready"
    );

    let mut handle = ModelHandle::new(session, input_shape, input_name, output_name);
    warm_up(&mut handle, gauge)?;

    on_progress(LoadingState {
        loading: false,
        progress: 1.0,
    });
    Ok(handle)
}

/// ウォームアップ推論
///
/// 合成の全1テンソルを1回流して遅延コンパイル・割り当てを確定させる。
/// 入力・結果ともスコープ終了時に解放される。
pub fn warm_up<M: SinglePoseModel>(model: &mut M, gauge: &TensorGauge) -> Result<()> {
    scope::with_scope(gauge, |scope| {
        let [n, h, w, c] = model.input_shape();
        let ones = scope.track(Array4::ones((n, h, w, c)));
        let _ = model.estimate_single_pose(ones.take(), false)?;
        Ok(())
    })
}

/// グラフメタデータから [1, H, W, 3] を読む。動的次元 (-1等) は fallback で補完
fn read_input_shape(session: &Session, fallback: usize) -> [usize; 4] {
    let dims: Vec<i64> = session.inputs[0]
        .input_type
        .tensor_shape()
        .map(|shape| shape.to_vec())
        .unwrap_or_default();

    let dim = |i: usize, default: usize| -> usize {
        match dims.get(i) {
            Some(&d) if d > 0 => d as usize,
            _ => default,
        }
    };

    [1, dim(1, fallback), dim(2, fallback), dim(3, 3)]
}

/// キャッシュ済みモデルのパスを返し、無ければダウンロードする
fn ensure_model(
    cfg: &ModelConfig,
    gate: &mut ProgressGate,
    on_progress: &mut impl FnMut(LoadingState),
) -> Result<PathBuf> {
    let cache_dir = Path::new(&cfg.cache_dir);
    let path = cache_dir.join(format!("{}.onnx", cfg.name));

    if path.exists() {
        info!(path = %path.display(), "model already cached");
        return Ok(path);
    }

    let Some(base_url) = cfg.base_url.as_deref() else {
        return Err(Error::ModelLoad(
            format!("model {} not cached and no base_url configured", path.display()).into(),
        ));
    };

    fs::create_dir_all(cache_dir)?;
    let url = format!("{}/{}.onnx", base_url.trim_end_matches('/'), cfg.name);
    info!(%url, "downloading model");

    let mut resp = reqwest::blocking::get(&url)
        .and_then(|r| r.error_for_status())
        .map_err(Error::model_load)?;
    let total = resp.content_length();

    // 中途半端なファイルを残さないよう .part に書いてから rename する
    let part = path.with_extension("onnx.part");
    let mut file = fs::File::create(&part)?;
    let mut downloaded: u64 = 0;
    let mut buf = [0u8; 64 * 1024];

    loop {
        let n = resp.read(&mut buf).map_err(Error::Io)?;
        if n == 0 {
            break;
        }
        std::io::Write::write_all(&mut file, &buf[..n])?;
        downloaded += n as u64;
        if let Some(total) = total.filter(|&t| t > 0) {
            let fraction = gate.clamp(downloaded as f32 / total as f32);
            on_progress(LoadingState {
                loading: true,
                progress: fraction,
            });
        }
    }
    drop(file);
    fs::rename(&part, &path)?;
    info!(bytes = downloaded, path = %path.display(), "model downloaded");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::estimator::stub::StubModel;
    use crate::pose::Keypoint;

    #[test]
    fn test_progress_gate_monotonic() {
        let mut gate = ProgressGate::new();
        assert_eq!(gate.clamp(0.2), 0.2);
        assert_eq!(gate.clamp(0.1), 0.2);
        assert_eq!(gate.clamp(0.9), 0.9);
        assert_eq!(gate.clamp(2.0), 1.0);
        assert_eq!(gate.clamp(f32::NAN), 1.0);
    }

    #[test]
    fn test_warm_up_leaves_no_residue() {
        let gauge = TensorGauge::new();
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.9));
        warm_up(&mut model, &gauge).unwrap();
        assert_eq!(gauge.live(), 0);
        assert_eq!(model.calls, 1);
    }

    #[test]
    fn test_warm_up_releases_on_failure() {
        let gauge = TensorGauge::new();
        let mut model = StubModel::fixed(Keypoint::new(0.5, 0.5, 0.9));
        model.fail_at = Some(0);
        assert!(warm_up(&mut model, &gauge).is_err());
        assert_eq!(gauge.live(), 0);
    }

    #[test]
    fn test_ensure_model_requires_url_when_uncached() {
        let cfg = ModelConfig {
            name: "missing_model".into(),
            base_url: None,
            cache_dir: "/nonexistent-cache".into(),
            input_size: 192,
        };
        let mut gate = ProgressGate::new();
        let out = ensure_model(&cfg, &mut gate, &mut |_| {});
        assert!(matches!(out, Err(Error::ModelLoad(_))));
    }
}
