//! メモリ上のストア（ドライランとテスト用）

use std::collections::{
    HashMap,
    HashSet,
};
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};
use std::sync::{
    Mutex,
    MutexGuard,
    PoisonError,
};

use super::{
    StoreError,
    TranslationStore,
    TreeBuilder,
    parse_tree,
    render_tree,
};
use crate::ir::TranslationTree;

/// ドキュメントを JSON テキストのまま言語ごとに保持する。
/// 不正なドキュメントは不正なファイルと同じように扱われる。
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// 言語 → ソースドキュメント
    sources: Mutex<HashMap<String, String>>,
    /// 言語 → 翻訳先ドキュメント
    targets: Mutex<HashMap<String, String>>,
    /// `save` を拒否する言語
    read_only: Mutex<HashSet<String>>,
    /// 成功した `save` の回数
    writes: AtomicUsize,
}

/// ポイズンされていてもロックを取る
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// エラーメッセージ用のドキュメント名
fn location(lang: &str) -> String {
    format!("memory:{lang}.json")
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// ソースドキュメントを保存形式で設定
    ///
    /// # Errors
    /// ツリーのシリアライズに失敗した場合
    pub fn set_source(&self, lang: &str, tree: &TranslationTree) -> Result<(), StoreError> {
        self.set_source_raw(lang, &render_tree(&location(lang), tree)?);
        Ok(())
    }

    pub fn set_source_raw(&self, lang: &str, content: &str) {
        lock(&self.sources).insert(lang.to_string(), content.to_string());
    }

    /// 翻訳先ドキュメントをテキストのまま設定（不正な JSON も可）
    pub fn set_target_raw(&self, lang: &str, content: &str) {
        lock(&self.targets).insert(lang.to_string(), content.to_string());
    }

    /// 翻訳先ドキュメントを保存形式で設定（書き込み回数には数えない）
    ///
    /// # Errors
    /// ツリーのシリアライズに失敗した場合
    pub fn set_target(&self, lang: &str, tree: &TranslationTree) -> Result<(), StoreError> {
        self.set_target_raw(lang, &render_tree(&location(lang), tree)?);
        Ok(())
    }

    /// 以後 `lang` への `save` を失敗させる
    pub fn reject_writes(&self, lang: &str) {
        lock(&self.read_only).insert(lang.to_string());
    }

    /// 保存されている翻訳先ドキュメントのテキスト
    #[must_use]
    pub fn target_raw(&self, lang: &str) -> Option<String> {
        lock(&self.targets).get(lang).cloned()
    }

    /// 成功した `save` の回数
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }

    /// `documents` から `lang` のドキュメントをパースする
    fn read(
        documents: &Mutex<HashMap<String, String>>,
        lang: &str,
        build: TreeBuilder,
    ) -> Result<Option<TranslationTree>, StoreError> {
        let content = lock(documents).get(lang).cloned();
        content.map(|content| parse_tree(&location(lang), &content, build)).transpose()
    }
}

impl TranslationStore for MemoryStore {
    async fn load_source(&self, lang: &str) -> Result<Option<TranslationTree>, StoreError> {
        Self::read(&self.sources, lang, TranslationTree::from_json)
    }

    async fn load(&self, lang: &str) -> Result<Option<TranslationTree>, StoreError> {
        Self::read(&self.targets, lang, TranslationTree::from_json_verbatim)
    }

    async fn save(&self, lang: &str, tree: &TranslationTree) -> Result<(), StoreError> {
        if lock(&self.read_only).contains(lang) {
            return Err(StoreError::Write {
                location: location(lang),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            });
        }

        self.set_target(lang, tree)?;
        self.writes.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
