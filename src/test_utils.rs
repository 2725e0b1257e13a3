//! テスト用ユーティリティ
//!
//! 複数のテストモジュールで使用する翻訳プロバイダーのスタブを提供します。
#![cfg(test)]

use std::sync::Mutex;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::time::Duration;

use crate::translator::{
    TranslateError,
    TranslationProvider,
};

/// `[<言語>]<テキスト>` を返すプロバイダー
///
/// 受け取ったテキストを記録するので、プロバイダーに何が送られたかを検証できます。
#[derive(Debug, Default)]
pub(crate) struct PrefixProvider {
    /// 受け取ったテキスト（呼び出し順）
    requests: Mutex<Vec<String>>,
    /// 固定の出力（`None` の場合はプレフィックス付きの入力）
    output: Option<String>,
}

impl PrefixProvider {
    /// 常に `output` を返すプロバイダーを作成
    pub(crate) fn with_output(output: &str) -> Self {
        Self { requests: Mutex::default(), output: Some(output.to_string()) }
    }

    /// これまでに受け取ったテキスト
    pub(crate) fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|requests| requests.clone()).unwrap_or_default()
    }

    /// 呼び出し回数
    pub(crate) fn call_count(&self) -> usize {
        self.requests().len()
    }
}

/// 入力に対する `PrefixProvider` の出力
fn prefixed(text: &str, dest_lang: &str) -> String {
    format!("[{dest_lang}]{}", text.trim())
}

impl TranslationProvider for PrefixProvider {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        dest_lang: &str,
    ) -> Result<String, TranslateError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(text.to_string());
        }
        Ok(self.output.clone().unwrap_or_else(|| prefixed(text, dest_lang)))
    }
}

/// `trigger` を含むテキストで失敗し、それ以外は `PrefixProvider` と同じ結果を返す
#[derive(Debug)]
pub(crate) struct FailingProvider {
    /// 失敗させるテキストの目印
    trigger: String,
}

impl FailingProvider {
    pub(crate) fn new(trigger: &str) -> Self {
        Self { trigger: trigger.to_string() }
    }
}

impl TranslationProvider for FailingProvider {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        dest_lang: &str,
    ) -> Result<String, TranslateError> {
        if text.contains(&self.trigger) {
            return Err(TranslateError::UnexpectedResponse(format!("refused: {text}")));
        }
        Ok(prefixed(text, dest_lang))
    }
}

/// 応答が `delay` だけ遅れるプロバイダー（タイムアウト検証用）
#[derive(Debug)]
pub(crate) struct SlowProvider {
    /// 応答までの待ち時間
    delay: Duration,
}

impl SlowProvider {
    pub(crate) const fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl TranslationProvider for SlowProvider {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        dest_lang: &str,
    ) -> Result<String, TranslateError> {
        tokio::time::sleep(self.delay).await;
        Ok(prefixed(text, dest_lang))
    }
}

/// 同時に処理中だった呼び出し数の最大値を記録するプロバイダー
#[derive(Debug)]
pub(crate) struct PeakProvider {
    /// 各呼び出しの処理時間
    delay: Duration,
    /// 現在処理中の呼び出し数
    in_flight: AtomicUsize,
    /// `in_flight` の最大値
    peak: AtomicUsize,
}

impl PeakProvider {
    pub(crate) const fn new(delay: Duration) -> Self {
        Self { delay, in_flight: AtomicUsize::new(0), peak: AtomicUsize::new(0) }
    }

    /// 同時に処理中だった呼び出し数の最大値
    pub(crate) fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl TranslationProvider for PeakProvider {
    async fn translate(
        &self,
        text: &str,
        _source_lang: &str,
        dest_lang: &str,
    ) -> Result<String, TranslateError> {
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(current, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(prefixed(text, dest_lang))
    }
}
