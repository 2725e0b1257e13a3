//! エントリーポイント: カレントディレクトリの翻訳ファイルを 1 回同期する

use std::process::ExitCode;

use i18n_sync::SyncOrchestrator;
use i18n_sync::config::ConfigManager;
use i18n_sync::store::FileStore;
use i18n_sync::translator::{
    GoogleTranslator,
    PlaceholderTranslator,
};

#[tokio::main]
async fn main() -> ExitCode {
    // ログは stderr へ（ガードは main の終わりまで保持してフラッシュさせる）
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match run().await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            tracing::error!("{}", error);
            ExitCode::FAILURE
        }
    }
}

/// 失敗した言語が 1 つでもあれば `Ok(false)`
async fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let workspace_root = std::env::current_dir()?;

    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(workspace_root))?;
    let settings = config_manager.get_settings();

    let provider = GoogleTranslator::new(&settings.translator)?;
    let translator = PlaceholderTranslator::from_settings(provider, settings)?;
    let store = FileStore::new(config_manager.source_dir(), config_manager.output_dir());

    let orchestrator = SyncOrchestrator::from_settings(translator, store, settings);
    let report = orchestrator.sync_all().await?;

    Ok(!report.has_failures())
}
