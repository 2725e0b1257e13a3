//! プレースホルダーを保持した翻訳
//!
//! `{{name}}` のような埋め込みトークンは翻訳後もそのまま残す必要があるため、
//! トークン間のテキストだけをプロバイダーに送る。

use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::time::Duration;

use futures::future::join_all;
use regex::Regex;
use tokio::sync::Semaphore;

use super::provider::{
    TranslateError,
    TranslationProvider,
};
use crate::config::SyncSettings;

/// 翻訳器ごとの翻訳件数カウンター
#[derive(Debug, Default)]
pub struct TranslationStats {
    /// 翻訳に成功したセグメント数
    translated: AtomicUsize,
    /// 失敗またはタイムアウトしたセグメント数
    failed: AtomicUsize,
}

/// [`TranslationStats`] のスナップショット
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// 翻訳に成功したセグメント数
    pub translated: usize,
    /// 翻訳に失敗し原文のままにしたセグメント数
    pub failed: usize,
}

impl TranslationStats {
    /// 成功を 1 件記録
    fn record_translated(&self) {
        self.translated.fetch_add(1, Ordering::Relaxed);
    }

    /// 失敗を 1 件記録
    fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            translated: self.translated.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// [`TranslationProvider`] をラップし、プレースホルダーを保持したまま翻訳する
///
/// プロバイダー呼び出しはインスタンス内で同時実行数を共有し、それぞれタイムアウトを持つ。
/// 翻訳全体が失敗することはなく、翻訳できなかったセグメントは原文のまま残る。
#[derive(Debug)]
pub struct PlaceholderTranslator<P> {
    /// 実際の翻訳バックエンド
    provider: P,
    /// 翻訳しないトークンのパターン
    placeholder: Regex,
    /// 全言語で共有するプロバイダー呼び出しの同時実行数
    limiter: Semaphore,
    /// プロバイダー呼び出し 1 回あたりのタイムアウト
    request_timeout: Duration,
    /// 翻訳件数
    stats: TranslationStats,
}

impl<P: TranslationProvider> PlaceholderTranslator<P> {
    /// # Errors
    /// `placeholder_pattern` が正規表現として不正な場合
    pub fn new(
        provider: P,
        placeholder_pattern: &str,
        max_concurrent_requests: usize,
        request_timeout: Duration,
    ) -> Result<Self, regex::Error> {
        Ok(Self {
            provider,
            placeholder: Regex::new(placeholder_pattern)?,
            limiter: Semaphore::new(max_concurrent_requests.max(1)),
            request_timeout,
            stats: TranslationStats::default(),
        })
    }

    /// `placeholderPattern` と `translator` の設定から作成
    ///
    /// # Errors
    /// 設定のプレースホルダーパターンがコンパイルできない場合
    pub fn from_settings(provider: P, settings: &SyncSettings) -> Result<Self, regex::Error> {
        Self::new(
            provider,
            &settings.placeholder_pattern,
            settings.translator.max_concurrent_requests,
            Duration::from_millis(settings.translator.timeout_ms),
        )
    }

    #[must_use]
    pub const fn stats(&self) -> &TranslationStats {
        &self.stats
    }

    #[must_use]
    pub const fn provider(&self) -> &P {
        &self.provider
    }

    /// プレースホルダーを変更せずに `text` を翻訳する
    ///
    /// トークン間のセグメントは並行に翻訳し、元の順序で組み立て直す。
    /// トークンと隣接テキストの間は半角スペース 1 つ。
    pub async fn translate(&self, text: &str, source_lang: &str, dest_lang: &str) -> String {
        let segments: Vec<&str> = self.placeholder.split(text).collect();
        let tokens: Vec<&str> = self.placeholder.find_iter(text).map(|m| m.as_str()).collect();

        let translated = join_all(
            segments.iter().map(|segment| self.translate_segment(segment, source_lang, dest_lang)),
        )
        .await;

        reassemble(&translated, &tokens)
    }

    /// トークンを含まない 1 セグメントを翻訳する（失敗時は原文）
    async fn translate_segment(&self, segment: &str, source_lang: &str, dest_lang: &str) -> String {
        if segment.trim().is_empty() {
            return segment.to_string();
        }

        // セマフォは close しないので通常ここには来ない
        let Ok(_permit) = self.limiter.acquire().await else {
            tracing::warn!("Translation limiter closed, keeping original text");
            return segment.to_string();
        };

        let result = match tokio::time::timeout(
            self.request_timeout,
            self.provider.translate(segment, source_lang, dest_lang),
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(TranslateError::Timeout(self.request_timeout)),
        };

        match result {
            Ok(translated) => {
                self.stats.record_translated();
                tracing::trace!(dest_lang, "#");
                translated
            }
            Err(error) => {
                self.stats.record_failed();
                tracing::warn!(
                    source_lang,
                    dest_lang,
                    segment,
                    %error,
                    "Translation failed, keeping original text"
                );
                segment.to_string()
            }
        }
    }
}

/// 翻訳済みセグメントと元のトークンを交互に連結する
///
/// `segments` は常に `tokens` より 1 つ多い
fn reassemble(segments: &[String], tokens: &[&str]) -> String {
    let mut result = String::new();
    for (index, segment) in segments.iter().enumerate() {
        let after_token = index > 0;
        let before_token = index < tokens.len();

        let mut text = segment.as_str();
        if after_token {
            text = text.trim_start();
        }
        if before_token {
            text = text.trim_end();
        }

        if after_token && !text.is_empty() {
            result.push(' ');
        }
        result.push_str(text);

        if let Some(token) = tokens.get(index) {
            if !result.is_empty() {
                result.push(' ');
            }
            result.push_str(token);
        }
    }
    result
}
