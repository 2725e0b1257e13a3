//! 1 回の同期で翻訳先ツリーに適用された変更

use indexmap::IndexMap;
use serde_json::Value;

use super::tree::TranslationNode;

/// 1 つのキーに対する変更
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// キーを追加した（形が変わったため置き換えた場合も含む）
    Added(TranslationNode),
    /// 既存のサブツリーの下位で変更があった
    Nested(Changeset),
    /// ソースに存在しなくなったため削除した
    Removed,
}

/// 同期処理が生成するツリー状の差分
///
/// 空であれば翻訳先は同期済みで、書き込みは不要。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changeset {
    /// キー → 変更（ソースのキー順）
    changes: IndexMap<String, Change>,
}

/// [`Changeset`] の集計（ネストも含む）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    /// 新しく書き込んだリーフ数
    pub added: usize,
    /// 削除したキー数
    pub removed: usize,
}

impl Changeset {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, change: Change) {
        self.changes.insert(key.into(), change);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Change> {
        self.changes.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Change)> {
        self.changes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> ChangeSummary {
        self.changes.values().fold(ChangeSummary::default(), |acc, change| match change {
            Change::Added(node) => ChangeSummary { added: acc.added + node.leaf_count(), ..acc },
            Change::Removed => ChangeSummary { removed: acc.removed + 1, ..acc },
            Change::Nested(nested) => {
                let inner = nested.summary();
                ChangeSummary { added: acc.added + inner.added, removed: acc.removed + inner.removed }
            }
        })
    }

    /// 差分を JSON に変換する（削除は `null`）
    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(
            self.changes
                .iter()
                .map(|(key, change)| {
                    let value = match change {
                        Change::Added(node) => node.to_json(),
                        Change::Nested(nested) => nested.to_json(),
                        Change::Removed => Value::Null,
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }
}
