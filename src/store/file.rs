//! ファイルストア: `<dir>/<lang>.json`

use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use super::{
    StoreError,
    TranslationStore,
    TreeBuilder,
    parse_tree,
    render_tree,
};
use crate::ir::TranslationTree;

/// ソースドキュメントは `source_dir` から読み、翻訳先ドキュメントは `output_dir` に置く
#[derive(Debug, Clone)]
pub struct FileStore {
    /// ソース言語ファイルのディレクトリ
    source_dir: PathBuf,
    /// 翻訳先ファイルのディレクトリ（保存時に作成）
    output_dir: PathBuf,
}

impl FileStore {
    #[must_use]
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self { source_dir: source_dir.into(), output_dir: output_dir.into() }
    }

    #[must_use]
    pub fn source_path(&self, lang: &str) -> PathBuf {
        self.source_dir.join(format!("{lang}.json"))
    }

    #[must_use]
    pub fn target_path(&self, lang: &str) -> PathBuf {
        self.output_dir.join(format!("{lang}.json"))
    }
}

/// `path` を読み込む（ファイルがなければ `Ok(None)`）
async fn read_tree(path: &Path, build: TreeBuilder) -> Result<Option<TranslationTree>, StoreError> {
    let location = path.display().to_string();
    match tokio::fs::read_to_string(path).await {
        Ok(content) => parse_tree(&location, &content, build).map(Some),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("Translation file not found: {}", location);
            Ok(None)
        }
        Err(source) => Err(StoreError::Read { location, source }),
    }
}

impl TranslationStore for FileStore {
    async fn load_source(&self, lang: &str) -> Result<Option<TranslationTree>, StoreError> {
        read_tree(&self.source_path(lang), TranslationTree::from_json).await
    }

    async fn load(&self, lang: &str) -> Result<Option<TranslationTree>, StoreError> {
        read_tree(&self.target_path(lang), TranslationTree::from_json_verbatim).await
    }

    /// `<lang>.json.tmp` に書き込んでからリネームする（途中で失敗しても既存ファイルは壊れない）
    async fn save(&self, lang: &str, tree: &TranslationTree) -> Result<(), StoreError> {
        let path = self.target_path(lang);
        let location = path.display().to_string();
        let write_error = |source| StoreError::Write { location: location.clone(), source };

        let content = render_tree(&location, tree)?;
        tokio::fs::create_dir_all(&self.output_dir).await.map_err(write_error)?;

        let temp_path = path.with_extension("json.tmp");
        let written = match tokio::fs::write(&temp_path, content).await {
            Ok(()) => tokio::fs::rename(&temp_path, &path).await,
            Err(e) => Err(e),
        };
        if let Err(source) = written {
            if let Err(e) = tokio::fs::remove_file(&temp_path).await
                && e.kind() != ErrorKind::NotFound
            {
                tracing::warn!(path = %temp_path.display(), "Failed to remove temporary file: {}", e);
            }
            return Err(write_error(source));
        }

        tracing::debug!(lang, path = %location, "Saved translation file");
        Ok(())
    }
}
