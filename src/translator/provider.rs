//! 外部翻訳プロバイダー

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// [`TranslationProvider`] のエラー
///
/// いずれも同期処理を止めない。呼び出し側は原文を残して続行する。
#[derive(Error, Debug)]
pub enum TranslateError {
    /// 通信エラーまたは HTTP ステータスエラー
    #[error("Translation request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// 翻訳を読み取れないレスポンス
    #[error("Unexpected translation response: {0}")]
    UnexpectedResponse(String),
    /// 設定時間内に応答がない
    #[error("Translation request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
}

/// プレーンテキストのセグメントを別の言語に翻訳する
///
/// 渡されるテキストにプレースホルダーは含まれない。
pub trait TranslationProvider: Send + Sync {
    fn translate(
        &self,
        text: &str,
        source_lang: &str,
        dest_lang: &str,
    ) -> impl Future<Output = Result<String, TranslateError>> + Send;
}
