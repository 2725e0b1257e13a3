//! ワークスペースの設定ファイル `.i18n-sync.json` の読み込み

use std::io::ErrorKind;
use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    SyncSettings,
};

/// 設定ファイル名
pub(super) const CONFIG_FILE_NAME: &str = ".i18n-sync.json";

/// 読み込んだ設定ファイル
#[derive(Debug)]
pub(super) struct ConfigFile {
    /// ファイルのパス
    pub(super) path: PathBuf,
    /// ファイルの内容（省略されたキーはデフォルト値）
    pub(super) settings: SyncSettings,
}

/// `workspace_root` 直下の設定ファイルを読み込む
///
/// ファイルがなければ `Ok(None)`（呼び出し側でデフォルト設定を使う）。
///
/// # Errors
/// ファイルが読めない、または JSON として不正な場合。エラーにはファイルのパスを含む。
pub(super) fn load_from_workspace(workspace_root: &Path) -> Result<Option<ConfigFile>, ConfigError> {
    let path = workspace_root.join(CONFIG_FILE_NAME);

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No configuration file, using defaults");
            return Ok(None);
        }
        Err(source) => {
            return Err(ConfigError::IoError { path: path.display().to_string(), source });
        }
    };

    let settings = serde_json::from_str(&content)
        .map_err(|source| ConfigError::ParseError { path: path.display().to_string(), source })?;

    Ok(Some(ConfigFile { path, settings }))
}
