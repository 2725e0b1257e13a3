//! ソースツリーを翻訳先ツリーへ再帰的にマージする

use futures::FutureExt;
use futures::future::{
    BoxFuture,
    join_all,
};
use serde_json::Value;

use crate::ir::{
    Change,
    Changeset,
    TranslationNode,
    TranslationTree,
};
use crate::translator::{
    PlaceholderTranslator,
    TranslationProvider,
};

/// 翻訳先ツリー 1 つ分の同期結果
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    /// マージ後の翻訳先（キーはソース順）
    pub tree: TranslationTree,
    /// 変更内容（入力から変化がなければ空）
    pub changes: Changeset,
}

/// 1 つの言語ペアについて翻訳先ツリーをソースツリーに合わせる
///
/// - 翻訳先にないキーは翻訳して追加
/// - ソースにないキーは削除
/// - 両方にあるリーフはそのまま（再翻訳しない）
///
/// 同じ階層のキーは並行に処理する。
#[derive(Debug)]
pub struct TreeSynchronizer<'a, P> {
    /// 新しいリーフの翻訳に使う
    translator: &'a PlaceholderTranslator<P>,
    /// 翻訳元の言語コード
    source_lang: &'a str,
    /// 翻訳先の言語コード（ログにも使う）
    dest_lang: &'a str,
}

/// ログ用のドット区切りキーパス
fn child_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() { key.to_string() } else { format!("{prefix}.{key}") }
}

impl<'a, P: TranslationProvider> TreeSynchronizer<'a, P> {
    #[must_use]
    pub const fn new(
        translator: &'a PlaceholderTranslator<P>,
        source_lang: &'a str,
        dest_lang: &'a str,
    ) -> Self {
        Self { translator, source_lang, dest_lang }
    }

    /// `source` を `dest` にマージし、差分を返す
    pub async fn sync(&self, source: &TranslationTree, dest: TranslationTree) -> SyncOutcome {
        self.sync_tree(source, dest, String::new()).await
    }

    /// 1 階層分のキーを並行に同期する
    fn sync_tree<'f>(
        &'f self,
        source: &'f TranslationTree,
        dest: TranslationTree,
        prefix: String,
    ) -> BoxFuture<'f, SyncOutcome> {
        async move {
            let mut stale = dest.into_entries();

            let pending: Vec<_> = source
                .iter()
                .map(|(key, value)| {
                    let existing = stale.shift_remove(key.as_str());
                    self.sync_entry(value, existing, child_path(&prefix, key))
                })
                .collect();
            let results = join_all(pending).await;

            let mut tree = TranslationTree::new();
            let mut changes = Changeset::new();
            for ((key, _), (node, change)) in source.iter().zip(results) {
                if let Some(change) = change {
                    changes.insert(key.clone(), change);
                }
                tree.insert(key.clone(), node);
            }

            for key in stale.into_keys() {
                tracing::info!(lang = self.dest_lang, key = %child_path(&prefix, &key), "Key removed");
                changes.insert(key, Change::Removed);
            }

            SyncOutcome { tree, changes }
        }
        .boxed()
    }

    /// ソースの 1 キーについて翻訳先の値を決める
    async fn sync_entry(
        &self,
        value: &TranslationNode,
        existing: Option<TranslationNode>,
        path: String,
    ) -> (TranslationNode, Option<Change>) {
        match (value, existing) {
            (TranslationNode::Tree(source), Some(TranslationNode::Tree(dest))) => {
                let outcome = self.sync_tree(source, dest, path).await;
                let change =
                    (!outcome.changes.is_empty()).then_some(Change::Nested(outcome.changes));
                (TranslationNode::Tree(outcome.tree), change)
            }
            // 配列はインデックスをキーにしてマージし、変更がなければ配列のまま残す
            (TranslationNode::Tree(source), Some(TranslationNode::Raw(Value::Array(items)))) => {
                let dest = items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| {
                        (index.to_string(), TranslationNode::from_json_verbatim(item))
                    })
                    .collect();
                let outcome = self.sync_tree(source, dest, path).await;
                if outcome.changes.is_empty() {
                    (TranslationNode::Raw(Value::Array(items)), None)
                } else {
                    (TranslationNode::Tree(outcome.tree), Some(Change::Nested(outcome.changes)))
                }
            }
            (
                TranslationNode::Leaf(_) | TranslationNode::Raw(_),
                Some(existing @ (TranslationNode::Leaf(_) | TranslationNode::Raw(_))),
            ) => (existing, None),
            (_, existing) => {
                if existing.is_some() {
                    tracing::warn!(
                        lang = self.dest_lang,
                        key = %path,
                        "Value shape differs from the source, replacing it"
                    );
                }
                let node = self.create(value, path).await;
                (node.clone(), Some(Change::Added(node)))
            }
        }
    }

    /// 翻訳先にないキーの値を新しく作る
    async fn create(&self, value: &TranslationNode, path: String) -> TranslationNode {
        let coerced;
        let value = match value {
            TranslationNode::Raw(raw) => {
                coerced = TranslationNode::from_json(raw);
                &coerced
            }
            other => other,
        };
        match value {
            TranslationNode::Leaf(text) if text.is_empty() => TranslationNode::Leaf(String::new()),
            TranslationNode::Leaf(text) => {
                tracing::debug!(lang = self.dest_lang, key = %path, "Translating new key");
                TranslationNode::Leaf(
                    self.translator.translate(text, self.source_lang, self.dest_lang).await,
                )
            }
            TranslationNode::Tree(source) => {
                TranslationNode::Tree(self.sync_tree(source, TranslationTree::new(), path).await.tree)
            }
            // `from_json` は Raw を返さない
            TranslationNode::Raw(raw) => TranslationNode::Raw(raw.clone()),
        }
    }
}
