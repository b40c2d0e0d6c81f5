use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use ndarray::Array4;
use tracing::warn;

use crate::Result;

/// 生存中の一時テンソル数を数えるゲージ
///
/// 検出サイクルの前後でカウントを比較すればリークを検出できる。
#[derive(Debug, Clone, Default)]
pub struct TensorGauge {
    live: Arc<AtomicUsize>,
}

impl TensorGauge {
    pub fn new() -> Self {
        Self::default()
    }

    /// 現在生存している一時テンソル数
    pub fn live(&self) -> usize {
        self.live.load(Ordering::Acquire)
    }

    fn incr(&self) {
        self.live.fetch_add(1, Ordering::AcqRel);
    }

    fn decr(&self) {
        self.live.fetch_sub(1, Ordering::AcqRel);
    }
}

/// スコープ内で追跡される一時テンソル
///
/// ドロップまたは take() で正確に一度だけゲージから降りる。
pub struct ScopedTensor {
    data: Option<Array4<f32>>,
    gauge: TensorGauge,
}

impl ScopedTensor {
    /// 中身を取り出して所有権を手放す（推論への受け渡し用）
    pub fn take(mut self) -> Array4<f32> {
        let data = self.data.take().unwrap();
        self.gauge.decr();
        data
    }
}

impl std::ops::Deref for ScopedTensor {
    type Target = Array4<f32>;

    fn deref(&self) -> &Array4<f32> {
        self.data.as_ref().unwrap()
    }
}

impl Drop for ScopedTensor {
    fn drop(&mut self) {
        if self.data.take().is_some() {
            self.gauge.decr();
        }
    }
}

/// 1検出サイクル分のテンソルスコープ
pub struct Scope<'g> {
    gauge: &'g TensorGauge,
    entry: usize,
}

impl Scope<'_> {
    /// テンソルをこのスコープの追跡下に置く
    pub fn track(&self, data: Array4<f32>) -> ScopedTensor {
        self.gauge.incr();
        ScopedTensor {
            data: Some(data),
            gauge: self.gauge.clone(),
        }
    }
}

impl Drop for Scope<'_> {
    fn drop(&mut self) {
        let live = self.gauge.live();
        if live != self.entry {
            warn!(entry = self.entry, live, "tensor scope exited with residue");
        }
    }
}

/// 本体を begin/end で挟み、成功・失敗どちらの経路でもスコープを閉じる
///
/// 本体内で track したテンソルは本体終了時点で全て解放されている必要があり、
/// 残っていれば警告を出す。
pub fn with_scope<T, F>(gauge: &TensorGauge, body: F) -> Result<T>
where
    F: FnOnce(&Scope<'_>) -> Result<T>,
{
    let scope = Scope {
        gauge,
        entry: gauge.live(),
    };
    let out = body(&scope);
    drop(scope);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_balance_on_success() {
        let gauge = TensorGauge::new();
        let out = with_scope(&gauge, |scope| {
            let t = scope.track(Array4::zeros((1, 4, 4, 3)));
            assert_eq!(gauge.live(), 1);
            drop(t);
            Ok(42)
        });
        assert_eq!(out.unwrap(), 42);
        assert_eq!(gauge.live(), 0);
    }

    #[test]
    fn test_balance_on_failure() {
        let gauge = TensorGauge::new();
        let out: crate::Result<()> = with_scope(&gauge, |scope| {
            let _t = scope.track(Array4::zeros((1, 4, 4, 3)));
            Err(Error::SourceNotReady)
        });
        assert!(out.is_err());
        assert_eq!(gauge.live(), 0);
    }

    #[test]
    fn test_take_releases_once() {
        let gauge = TensorGauge::new();
        with_scope(&gauge, |scope| {
            let t = scope.track(Array4::zeros((1, 2, 2, 3)));
            let inner = t.take();
            assert_eq!(gauge.live(), 0);
            assert_eq!(inner.shape(), &[1, 2, 2, 3]);
            Ok(())
        })
        .unwrap();
        assert_eq!(gauge.live(), 0);
    }

    #[test]
    fn test_nested_scopes() {
        let gauge = TensorGauge::new();
        with_scope(&gauge, |outer| {
            let _a = outer.track(Array4::zeros((1, 2, 2, 3)));
            with_scope(&gauge, |inner| {
                let _b = inner.track(Array4::zeros((1, 2, 2, 3)));
                assert_eq!(gauge.live(), 2);
                Ok(())
            })?;
            assert_eq!(gauge.live(), 1);
            Ok(())
        })
        .unwrap();
        assert_eq!(gauge.live(), 0);
    }
}
