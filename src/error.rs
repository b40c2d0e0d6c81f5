use thiserror::Error;

/// 検出パイプラインのエラー種別
#[derive(Debug, Error)]
pub enum Error {
    /// モデルの取得・パース・セッション構築の失敗（致命的、リトライしない）
    #[error("model load failed: {0}")]
    ModelLoad(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// フレームソースにまだピクセルデータがない
    #[error("frame source not ready")]
    SourceNotReady,

    /// 推論バックエンドの実行失敗（フレーム単位でスキップ可能）
    #[error("inference failed")]
    Inference(#[source] ort::Error),

    /// 表示サーフェスへの出力失敗
    #[error("present failed: {0}")]
    Present(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// モデル読み込み系の失敗をまとめる
    pub fn model_load<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error::ModelLoad(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
