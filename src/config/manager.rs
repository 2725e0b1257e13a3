//! 設定管理を行うモジュール

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    SyncSettings,
    loader,
};

/// 設定管理を行う
#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    /// 現在の設定
    current_settings: SyncSettings,

    /// ワークスペースのルートパス（相対ディレクトリの基準）
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    /// 新しい設定マネージャーを作成
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: SyncSettings::default(), workspace_root: None }
    }

    /// 設定を読み込む
    ///
    /// # Arguments
    /// * `workspace_root` - ワークスペースのルートパス
    ///
    /// # Returns
    /// - `Ok(())`: 設定の読み込みとバリデーション成功
    /// - `Err(ConfigError)`: エラー
    ///
    /// # Errors
    /// - ファイル読み込みエラー
    /// - JSON パースエラー
    /// - バリデーションエラー
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!("Loading settings for workspace: {:?}", workspace_root);

        let file = workspace_root.as_deref().map(loader::load_from_workspace).transpose()?.flatten();
        let settings = if let Some(file) = file {
            tracing::info!(path = %file.path.display(), "Using configuration file");
            file.settings
        } else {
            SyncSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!("Settings loaded successfully: {:?}", self.current_settings);

        Ok(())
    }

    /// 現在の設定を取得
    #[must_use]
    pub const fn get_settings(&self) -> &SyncSettings {
        &self.current_settings
    }

    /// ワークスペースルートを取得
    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }

    /// ソース言語ファイルのディレクトリ
    #[must_use]
    pub fn source_dir(&self) -> PathBuf {
        self.resolve(&self.current_settings.source_dir)
    }

    /// 翻訳ファイルの出力ディレクトリ
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(&self.current_settings.output_dir)
    }

    /// 設定上のディレクトリをワークスペースルート基準で解決する（絶対パスはそのまま）
    fn resolve(&self, dir: &str) -> PathBuf {
        let path = Path::new(dir);
        match &self.workspace_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}
