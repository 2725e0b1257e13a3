//! 全翻訳先言語の同期を実行する

use futures::StreamExt;
use futures::stream;
use thiserror::Error;

use super::synchronizer::{
    SyncOutcome,
    TreeSynchronizer,
};
use crate::config::SyncSettings;
use crate::ir::TranslationTree;
use crate::store::{
    StoreError,
    TranslationStore,
};
use crate::translator::{
    PlaceholderTranslator,
    StatsSnapshot,
    TranslationProvider,
};
use crate::types::LanguageCatalog;

/// 同期処理全体を中断するエラー
///
/// 個々の言語の失敗は [`SyncReport`] で報告する。
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Source translation file for '{0}' not found")]
    SourceMissing(String),

    #[error("Failed to load source translations: {0}")]
    SourceLoad(#[from] StoreError),
}

/// 言語ごとの同期結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageOutcome {
    /// ファイルを書き換えた
    Updated { added: usize, removed: usize },
    /// 変更なし（書き込みなし）
    Unchanged,
    /// 読み書きに失敗した（ファイルはそのまま）
    Failed(String),
}

/// [`SyncOrchestrator::sync_all`] の言語ごとの結果（カタログ順）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub languages: Vec<(String, LanguageOutcome)>,
    pub translation: StatsSnapshot,
}

impl SyncReport {
    #[must_use]
    pub fn outcome(&self, lang: &str) -> Option<&LanguageOutcome> {
        self.languages.iter().find(|(name, _)| name == lang).map(|(_, outcome)| outcome)
    }

    #[must_use]
    pub fn updated_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, LanguageOutcome::Updated { .. }))
    }

    #[must_use]
    pub fn unchanged_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, LanguageOutcome::Unchanged))
    }

    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(|outcome| matches!(outcome, LanguageOutcome::Failed(_)))
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }

    /// `predicate` に一致する言語数
    fn count(&self, predicate: impl Fn(&LanguageOutcome) -> bool) -> usize {
        self.languages.iter().filter(|(_, outcome)| predicate(outcome)).count()
    }
}

/// カタログの全翻訳先言語をソースファイルと同期する
#[derive(Debug)]
pub struct SyncOrchestrator<P, S> {
    /// 全言語で共有する翻訳器（プロバイダーの同時実行数もここで制限する）
    translator: PlaceholderTranslator<P>,
    /// 翻訳ファイルの読み書き先
    store: S,
    /// ソース言語と翻訳先言語
    catalog: LanguageCatalog,
    /// 同時に処理する言語数
    max_concurrent_languages: usize,
}

impl<P: TranslationProvider, S: TranslationStore> SyncOrchestrator<P, S> {
    /// 新しいオーケストレーターを作成（同時実行数は CPU 数）
    #[must_use]
    pub fn new(translator: PlaceholderTranslator<P>, store: S, catalog: LanguageCatalog) -> Self {
        Self { translator, store, catalog, max_concurrent_languages: num_cpus::get().max(1) }
    }

    /// `settings` の言語と同時実行数で作成
    #[must_use]
    pub fn from_settings(
        translator: PlaceholderTranslator<P>,
        store: S,
        settings: &SyncSettings,
    ) -> Self {
        Self::new(translator, store, settings.catalog())
            .with_max_concurrent_languages(settings.concurrency.effective_max_languages())
    }

    #[must_use]
    pub fn with_max_concurrent_languages(mut self, limit: usize) -> Self {
        self.max_concurrent_languages = limit.max(1);
        self
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn translator(&self) -> &PlaceholderTranslator<P> {
        &self.translator
    }

    #[must_use]
    pub const fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    /// 全翻訳先言語を同期する
    ///
    /// # Errors
    /// ソースファイルがない、または読み込めない場合は [`SyncError`]。
    /// この場合、翻訳先ファイルには一切触れない。
    pub async fn sync_all(&self) -> Result<SyncReport, SyncError> {
        let source_lang = self.catalog.source();
        let source = self
            .store
            .load_source(source_lang)
            .await?
            .ok_or_else(|| SyncError::SourceMissing(source_lang.to_string()))?;
        tracing::debug!(
            lang = source_lang,
            leaves = source.leaf_count(),
            "Loaded source translations"
        );

        let source = &source;
        let mut outcomes: Vec<(usize, String, LanguageOutcome)> =
            stream::iter(self.catalog.targets().iter().enumerate())
                .map(|(index, lang)| async move {
                    (index, lang.clone(), self.sync_language(source, lang).await)
                })
                .buffer_unordered(self.max_concurrent_languages)
                .collect()
                .await;
        outcomes.sort_by_key(|(index, _, _)| *index);

        let report = SyncReport {
            languages: outcomes.into_iter().map(|(_, lang, outcome)| (lang, outcome)).collect(),
            translation: self.translator.stats().snapshot(),
        };
        tracing::info!(
            updated = report.updated_count(),
            unchanged = report.unchanged_count(),
            failed = report.failed_count(),
            translated = report.translation.translated,
            "All translations synced!"
        );

        Ok(report)
    }

    /// 1 言語を同期し、エラーは [`LanguageOutcome::Failed`] にする
    async fn sync_language(&self, source: &TranslationTree, lang: &str) -> LanguageOutcome {
        tracing::info!("Syncing translations for {}", lang);

        match self.try_sync_language(source, lang).await {
            Ok(outcome) => outcome,
            Err(error) => {
                tracing::error!(lang, %error, "Failed to sync translations");
                LanguageOutcome::Failed(error.to_string())
            }
        }
    }

    /// 翻訳先を読み込み、マージして、変更があれば保存する
    async fn try_sync_language(
        &self,
        source: &TranslationTree,
        lang: &str,
    ) -> Result<LanguageOutcome, StoreError> {
        let dest = if let Some(tree) = self.store.load(lang).await? {
            tree
        } else {
            tracing::info!("New translation file created for {}", lang);
            TranslationTree::new()
        };

        let synchronizer = TreeSynchronizer::new(&self.translator, self.catalog.source(), lang);
        let SyncOutcome { tree, changes } = synchronizer.sync(source, dest).await;

        if changes.is_empty() {
            tracing::info!("No changes for {}", lang);
            return Ok(LanguageOutcome::Unchanged);
        }

        tracing::debug!(lang, changes = %changes.to_json(), "Computed changes");
        self.store.save(lang, &tree).await?;

        let summary = changes.summary();
        tracing::info!(
            lang,
            added = summary.added,
            removed = summary.removed,
            "Translations updated"
        );
        Ok(LanguageOutcome::Updated { added: summary.added, removed: summary.removed })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use googletest::prelude::*;
    use serde_json::{
        Value,
        json,
    };

    use super::*;
    use crate::store::MemoryStore;
    use crate::test_utils::{
        PeakProvider,
        PrefixProvider,
    };

    fn tree(json: &Value) -> TranslationTree {
        TranslationTree::from_json(json).unwrap()
    }

    fn orchestrator(
        targets: &[&str],
        store: MemoryStore,
    ) -> SyncOrchestrator<PrefixProvider, MemoryStore> {
        let translator = PlaceholderTranslator::new(
            PrefixProvider::default(),
            r"\{\{.*?\}\}",
            4,
            Duration::from_secs(5),
        )
        .unwrap();
        let catalog =
            LanguageCatalog::new("en", targets.iter().map(ToString::to_string).collect());
        SyncOrchestrator::new(translator, store, catalog).with_max_concurrent_languages(2)
    }

    fn store_with_source(source: &Value) -> MemoryStore {
        let store = MemoryStore::new();
        store.set_source("en", &tree(source)).unwrap();
        store
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let orchestrator = orchestrator(&["fr"], MemoryStore::new());

        let result = orchestrator.sync_all().await;

        assert!(matches!(result, Err(SyncError::SourceMissing(ref lang)) if lang == "en"));
        assert_eq!(orchestrator.store().write_count(), 0);
    }

    #[tokio::test]
    async fn test_malformed_source_is_an_error() {
        let store = MemoryStore::new();
        store.set_source_raw("en", r#"["not", "an", "object"]"#);
        let orchestrator = orchestrator(&["fr"], store);

        let result = orchestrator.sync_all().await;

        assert!(matches!(result, Err(SyncError::SourceLoad(StoreError::InvalidTree { .. }))));
        assert_eq!(orchestrator.store().write_count(), 0);
    }

    #[tokio::test]
    async fn test_new_files_are_created_for_every_target() {
        let orchestrator =
            orchestrator(&["fr", "de"], store_with_source(&json!({"hello": "Hello"})));

        let report = orchestrator.sync_all().await.unwrap();

        assert_eq!(report.updated_count(), 2);
        assert_eq!(
            orchestrator.store().load("de").await.unwrap().map(|tree| tree.to_json()),
            Some(json!({"hello": "[de]Hello"}))
        );
        assert_eq!(report.translation.translated, 2);
    }

    #[tokio::test]
    async fn test_second_run_writes_nothing() {
        let orchestrator =
            orchestrator(&["fr", "it"], store_with_source(&json!({"a": "A", "b": {"c": "C"}})));

        orchestrator.sync_all().await.unwrap();
        let writes_after_first_run = orchestrator.store().write_count();
        let report = orchestrator.sync_all().await.unwrap();

        assert_eq!(writes_after_first_run, 2);
        assert_eq!(orchestrator.store().write_count(), 2);
        assert_eq!(report.unchanged_count(), 2);
    }

    #[tokio::test]
    async fn test_report_follows_catalog_order() {
        let orchestrator = orchestrator(
            &["sv", "bg", "ro", "da", "hu"],
            store_with_source(&json!({"a": "A"})),
        );

        let report = orchestrator.sync_all().await.unwrap();

        let langs: Vec<String> = report.languages.iter().map(|(lang, _)| lang.clone()).collect();
        assert_that!(langs, elements_are![eq("sv"), eq("bg"), eq("ro"), eq("da"), eq("hu")]);
    }

    #[tokio::test]
    async fn test_failing_language_does_not_affect_others() {
        let store = store_with_source(&json!({"a": "A"}));
        store.set_target_raw("de", "{ not json");
        store.reject_writes("nl");
        let orchestrator = orchestrator(&["fr", "de", "nl"], store);

        let report = orchestrator.sync_all().await.unwrap();

        assert_eq!(report.outcome("fr"), Some(&LanguageOutcome::Updated { added: 1, removed: 0 }));
        assert!(matches!(report.outcome("de"), Some(LanguageOutcome::Failed(_))));
        assert!(matches!(report.outcome("nl"), Some(LanguageOutcome::Failed(_))));
        assert_eq!(report.failed_count(), 2);
        assert!(report.has_failures());
        assert_eq!(orchestrator.store().target_raw("de"), Some("{ not json".to_string()));
    }

    #[tokio::test]
    async fn test_removals_are_counted() {
        let store = store_with_source(&json!({"keep": "Keep"}));
        store.set_target(
            "es",
            &tree(&json!({"keep": "Mantener", "old": "Viejo", "older": {"x": "y"}})),
        )
        .unwrap();
        let orchestrator = orchestrator(&["es"], store);

        let report = orchestrator.sync_all().await.unwrap();

        assert_eq!(report.outcome("es"), Some(&LanguageOutcome::Updated { added: 0, removed: 2 }));
        assert_eq!(orchestrator.translator().provider().call_count(), 0);
    }

    #[tokio::test]
    async fn test_existing_non_string_values_survive_a_save() {
        let store = MemoryStore::new();
        store.set_source_raw(
            "en",
            r#"{"items": ["a", "b"], "count": 5, "flag": true, "new": "New"}"#,
        );
        store.set_target_raw("fr", r#"{"items": ["x", "y"], "count": 7, "flag": false}"#);
        let orchestrator = orchestrator(&["fr"], store);

        let report = orchestrator.sync_all().await.unwrap();

        assert_eq!(report.outcome("fr"), Some(&LanguageOutcome::Updated { added: 1, removed: 0 }));
        let saved: Value =
            serde_json::from_str(&orchestrator.store().target_raw("fr").unwrap()).unwrap();
        assert_eq!(
            saved,
            json!({"items": ["x", "y"], "count": 7, "flag": false, "new": "[fr]New"})
        );
    }

    #[tokio::test]
    async fn test_provider_calls_are_capped_across_languages() {
        let translator = PlaceholderTranslator::new(
            PeakProvider::new(Duration::from_millis(5)),
            r"\{\{.*?\}\}",
            2,
            Duration::from_secs(5),
        )
        .unwrap();
        let targets = ["fr", "de", "it", "es"];
        let catalog = LanguageCatalog::new("en", targets.iter().map(ToString::to_string).collect());
        let source: serde_json::Map<String, Value> =
            (0..6).map(|i| (format!("key{i}"), json!(format!("Text {i}")))).collect();
        let orchestrator =
            SyncOrchestrator::new(translator, store_with_source(&Value::Object(source)), catalog)
                .with_max_concurrent_languages(targets.len());

        let report = orchestrator.sync_all().await.unwrap();

        assert_eq!(report.updated_count(), 4);
        assert_eq!(report.translation.translated, 24);
        assert_that!(orchestrator.translator().provider().peak(), all![gt(0), le(2)]);
    }

    #[googletest::test]
    fn test_report_counts() {
        let report = SyncReport {
            languages: vec![
                ("fr".to_string(), LanguageOutcome::Unchanged),
                ("de".to_string(), LanguageOutcome::Updated { added: 3, removed: 1 }),
                ("it".to_string(), LanguageOutcome::Failed("boom".to_string())),
            ],
            translation: StatsSnapshot::default(),
        };

        expect_that!(report.updated_count(), eq(1));
        expect_that!(report.unchanged_count(), eq(1));
        expect_that!(report.failed_count(), eq(1));
        expect_that!(report.outcome("xx").is_none(), eq(true));
    }
}
