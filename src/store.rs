//! 翻訳ツリーの永続化（言語ごとに 1 つの JSON ドキュメント）

pub mod file;
pub mod memory;

use std::future::Future;

use serde_json::Value;
use thiserror::Error;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::ir::{
    TranslationTree,
    TreeError,
};

/// 翻訳ドキュメントの読み書きエラー
///
/// `location` はエラー対象のファイルパス（またはストアのキー）
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {location}: {source}")]
    Read { location: String, source: std::io::Error },

    #[error("Failed to write {location}: {source}")]
    Write { location: String, source: std::io::Error },

    #[error("Failed to parse {location}: {source}")]
    Parse { location: String, source: serde_json::Error },

    #[error("Invalid translation file {location}: {source}")]
    InvalidTree { location: String, source: TreeError },

    #[error("Failed to serialize {location}: {source}")]
    Serialize { location: String, source: serde_json::Error },
}

/// ソースドキュメントと翻訳先言語ごとのドキュメントを保持するストア
///
/// ドキュメントが存在しない場合はエラーではなく `Ok(None)`。
pub trait TranslationStore: Send + Sync {
    /// ソース言語 `lang` のツリーを読み込む
    fn load_source(
        &self,
        lang: &str,
    ) -> impl Future<Output = Result<Option<TranslationTree>, StoreError>> + Send;

    /// 翻訳先言語 `lang` のツリーを読み込む
    fn load(
        &self,
        lang: &str,
    ) -> impl Future<Output = Result<Option<TranslationTree>, StoreError>> + Send;

    /// 翻訳先言語 `lang` のツリーを書き込む
    fn save(
        &self,
        lang: &str,
        tree: &TranslationTree,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// JSON ドキュメントからツリーを組み立てる関数
///
/// ソースは [`TranslationTree::from_json`]、翻訳先は
/// [`TranslationTree::from_json_verbatim`] で読む。
pub(crate) type TreeBuilder = fn(&Value) -> Result<TranslationTree, TreeError>;

/// 翻訳ドキュメントのテキストをパースする
pub(crate) fn parse_tree(
    location: &str,
    content: &str,
    build: TreeBuilder,
) -> Result<TranslationTree, StoreError> {
    let json: Value = serde_json::from_str(content)
        .map_err(|source| StoreError::Parse { location: location.to_string(), source })?;

    build(&json).map_err(|source| StoreError::InvalidTree { location: location.to_string(), source })
}

/// 保存用のテキストに変換する
pub(crate) fn render_tree(location: &str, tree: &TranslationTree) -> Result<String, StoreError> {
    tree.to_pretty_string()
        .map_err(|source| StoreError::Serialize { location: location.to_string(), source })
}
