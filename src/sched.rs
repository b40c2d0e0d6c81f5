use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use crate::detect::detect_once;
use crate::pose::SinglePoseModel;
use crate::render::{Canvas, Present};
use crate::scope::TensorGauge;
use crate::source::FrameSource;
use crate::{Error, Result};

/// 連続検出を外から止めるためのトークン
///
/// ストリーム終端やウィンドウクローズに加え、Ctrl-C 等の
/// 明示的な停止要求をループに伝える。
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// 連続検出の実行結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// ソースから取り出したフレーム数（準備前の捨てフレーム込み）
    pub frames_seen: u64,
    /// 描画まで完了したサイクル数
    pub cycles_completed: u64,
    /// 推論失敗でスキップしたフレーム数
    pub cycles_failed: u64,
}

/// ソースが尽きるまで1表示フレームにつき1サイクルの検出を回す
///
/// - サイクル N+1 は N の present が返ってから始まる（表示リフレッシュが
///   唯一のバックプレッシャ）
/// - 準備完了前のフレームは検出にかけず捨てる
/// - 推論失敗はそのフレームをスキップしてループを続行、それ以外の
///   エラーはループを打ち切って伝播する
/// - 終了条件: ストリーム終端・ウィンドウクローズ・キャンセル
pub fn run_continuous<S, M, P>(
    source: &mut S,
    model: &mut M,
    canvas: &mut Canvas,
    presenter: &mut P,
    gauge: &TensorGauge,
    token: &CancelToken,
) -> Result<RunStats>
where
    S: FrameSource,
    M: SinglePoseModel,
    P: Present,
{
    let mut stats = RunStats::default();

    loop {
        if token.is_cancelled() || !presenter.is_open() {
            break;
        }

        let Some(frame) = source.next_frame()? else {
            break;
        };
        stats.frames_seen += 1;

        if !source.is_ready() {
            continue;
        }

        match detect_once(&frame, model, canvas, gauge) {
            Ok(_) => {
                stats.cycles_completed += 1;
                presenter.present(canvas)?;
            }
            Err(Error::Inference(e)) => {
                stats.cycles_failed += 1;
                warn!(error = %e, "inference failed, skipping frame");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(stats)
}
