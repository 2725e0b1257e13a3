//! 公開 `translate_a/single` エンドポイントを使う Google 翻訳プロバイダー

use std::time::Duration;

use serde_json::Value;

use super::provider::{
    TranslateError,
    TranslationProvider,
};
use crate::config::TranslatorConfig;

/// API キー不要の Google 翻訳エンドポイント用 HTTP クライアント
#[derive(Debug, Clone)]
pub struct GoogleTranslator {
    /// 接続を使い回す HTTP クライアント（タイムアウト設定済み）
    client: reqwest::Client,
    /// 翻訳 API の URL
    endpoint: String,
}

impl GoogleTranslator {
    /// # Errors
    /// HTTP クライアントを作成できない場合（TLS バックエンドの初期化失敗など）
    pub fn new(config: &TranslatorConfig) -> Result<Self, TranslateError> {
        let client =
            reqwest::Client::builder().timeout(Duration::from_millis(config.timeout_ms)).build()?;
        Ok(Self { client, endpoint: config.endpoint.clone() })
    }
}

impl TranslationProvider for GoogleTranslator {
    async fn translate(
        &self,
        text: &str,
        source_lang: &str,
        dest_lang: &str,
    ) -> Result<String, TranslateError> {
        tracing::trace!(source_lang, dest_lang, "Requesting translation");

        let body: Value = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("client", "gtx"),
                ("sl", source_lang),
                ("tl", dest_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        parse_translation(&body)
    }
}

/// `translate_a/single` のレスポンスから翻訳テキストを取り出す
///
/// レスポンスは `[[["Bonjour", "Hello", ...], ["le monde", "world", ...]], null, "en"]` の形で、
/// 各チャンクの先頭要素を連結したものが翻訳結果
fn parse_translation(body: &Value) -> Result<String, TranslateError> {
    let Some(chunks) = body.get(0).and_then(Value::as_array) else {
        return Err(TranslateError::UnexpectedResponse(format!(
            "missing sentence list in {body}"
        )));
    };

    let translated: String =
        chunks.iter().filter_map(|chunk| chunk.get(0).and_then(Value::as_str)).collect();

    if translated.is_empty() && !chunks.is_empty() {
        return Err(TranslateError::UnexpectedResponse(format!("no translated text in {body}")));
    }

    Ok(translated)
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    #[googletest::test]
    fn test_parse_single_chunk() {
        let body = json!([[["Bonjour", "Hello", null, null, 10]], null, "en"]);

        let result = parse_translation(&body);

        assert_that!(result, ok(eq("Bonjour")));
    }

    #[googletest::test]
    fn test_parse_joins_chunks_in_order() {
        let body = json!([
            [["Bonjour. ", "Hello. ", null, null, 10], ["Comment ça va ?", "How are you?", null, null, 10]],
            null,
            "en"
        ]);

        let result = parse_translation(&body);

        assert_that!(result, ok(eq("Bonjour. Comment ça va ?")));
    }

    #[rstest]
    #[case::not_an_array(json!({"error": "quota"}))]
    #[case::null_sentences(json!([null, null, "en"]))]
    #[case::chunks_without_text(json!([[[null, "Hello"]], null, "en"]))]
    fn test_parse_rejects_unexpected_shapes(#[case] body: Value) {
        let result = parse_translation(&body);

        assert!(matches!(result, Err(TranslateError::UnexpectedResponse(_))));
    }

    #[googletest::test]
    fn test_new_uses_configured_endpoint() {
        let config = TranslatorConfig {
            endpoint: "http://localhost:9999/translate".to_string(),
            ..TranslatorConfig::default()
        };

        let translator = GoogleTranslator::new(&config);

        assert_that!(translator.map(|t| t.endpoint), ok(eq("http://localhost:9999/translate")));
    }
}
