//! 翻訳ツリー: 1 言語分の翻訳ファイルのネストしたキー/値構造

use std::num::FpCategory;

use indexmap::IndexMap;
use serde_json::{
    Map,
    Value,
};
use thiserror::Error;

/// JSON から [`TranslationTree`] への変換エラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    /// ドキュメントのルートがオブジェクトではない
    #[error("Translation document root must be a JSON object, found {0}")]
    RootNotObject(&'static str),
}

/// 翻訳ファイル内の 1 つの値
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationNode {
    /// キーパスの終端にある翻訳テキスト
    Leaf(String),
    /// ネストしたキーのグループ
    Tree(TranslationTree),
    /// 翻訳先ファイルにあった文字列でもオブジェクトでもない値
    ///
    /// 数値・真偽値・`null`・配列を読み込んだときのまま書き戻す。
    Raw(Value),
}

/// JSON の数値が `0` / `0.0` / `-0.0` か
fn is_zero(number: &serde_json::Number) -> bool {
    number.as_f64().is_some_and(|n| n.classify() == FpCategory::Zero)
}

impl TranslationNode {
    /// ソース言語の JSON 値をノードに変換する
    ///
    /// `null`・`false`・`0` は空文字のリーフになる。それ以外のスカラー値は
    /// JSON 表記のまま文字列化し、配列は要素のインデックスをキーにする。
    #[must_use]
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(map) => Self::Tree(TranslationTree::from_map(map, Self::from_json)),
            Value::Array(items) => Self::Tree(
                items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), Self::from_json(item)))
                    .collect(),
            ),
            Value::String(text) => Self::Leaf(text.clone()),
            Value::Null | Value::Bool(false) => Self::Leaf(String::new()),
            Value::Number(number) if is_zero(number) => Self::Leaf(String::new()),
            Value::Bool(true) | Value::Number(_) => Self::Leaf(value.to_string()),
        }
    }

    /// 翻訳先の JSON 値を変換せずにノードにする
    ///
    /// オブジェクトだけを [`TranslationNode::Tree`] に、文字列を
    /// [`TranslationNode::Leaf`] にし、それ以外は [`TranslationNode::Raw`] で保持する。
    #[must_use]
    pub fn from_json_verbatim(value: &Value) -> Self {
        match value {
            Value::Object(map) => {
                Self::Tree(TranslationTree::from_map(map, Self::from_json_verbatim))
            }
            Value::String(text) => Self::Leaf(text.clone()),
            _ => Self::Raw(value.clone()),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Leaf(text) => Value::String(text.clone()),
            Self::Tree(tree) => tree.to_json(),
            Self::Raw(value) => value.clone(),
        }
    }

    #[must_use]
    pub const fn is_tree(&self) -> bool {
        matches!(self, Self::Tree(_))
    }

    /// このノード以下のリーフ数（リーフ自身は 1）
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        match self {
            Self::Leaf(_) | Self::Raw(_) => 1,
            Self::Tree(tree) => tree.leaf_count(),
        }
    }
}

/// キーから [`TranslationNode`] への順序付きマップ
///
/// 走査順は挿入順。同期済みのファイルではソース言語ファイルのキー順と一致する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationTree {
    /// キー → ノード（挿入順を保持）
    entries: IndexMap<String, TranslationNode>,
}

/// ドキュメントのルートをオブジェクトとして取り出す
fn root_object(json: &Value) -> Result<&Map<String, Value>, TreeError> {
    match json {
        Value::Object(map) => Ok(map),
        Value::Array(_) => Err(TreeError::RootNotObject("array")),
        Value::String(_) => Err(TreeError::RootNotObject("string")),
        Value::Number(_) => Err(TreeError::RootNotObject("number")),
        Value::Bool(_) => Err(TreeError::RootNotObject("boolean")),
        Value::Null => Err(TreeError::RootNotObject("null")),
    }
}

impl TranslationTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// パース済みのソースドキュメントからツリーを作成
    ///
    /// 値は [`TranslationNode::from_json`] で変換する。
    ///
    /// # Errors
    /// `json` がオブジェクトでない場合は [`TreeError::RootNotObject`]
    pub fn from_json(json: &Value) -> Result<Self, TreeError> {
        Ok(Self::from_map(root_object(json)?, TranslationNode::from_json))
    }

    /// パース済みの翻訳先ドキュメントからツリーを作成
    ///
    /// 値は [`TranslationNode::from_json_verbatim`] で変換するので、
    /// `to_json` で元のドキュメントに戻る。
    ///
    /// # Errors
    /// `json` がオブジェクトでない場合は [`TreeError::RootNotObject`]
    pub fn from_json_verbatim(json: &Value) -> Result<Self, TreeError> {
        Ok(Self::from_map(root_object(json)?, TranslationNode::from_json_verbatim))
    }

    /// オブジェクトの各値を `convert` でノードにする
    fn from_map(map: &Map<String, Value>, convert: fn(&Value) -> TranslationNode) -> Self {
        map.iter().map(|(key, value)| (key.clone(), convert(value))).collect()
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        Value::Object(self.entries.iter().map(|(key, node)| (key.clone(), node.to_json())).collect())
    }

    /// 翻訳ファイルとして保存する形式で文字列化する
    /// （インデント 2 スペース、末尾改行なし）
    ///
    /// # Errors
    /// JSON へのシリアライズに失敗した場合
    pub fn to_pretty_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.to_json())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&TranslationNode> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// `key` を挿入または置換する（新しいキーは末尾に追加）
    pub fn insert(&mut self, key: impl Into<String>, node: TranslationNode) {
        self.entries.insert(key.into(), node);
    }

    /// 残りのキーの順序を保ったまま `key` を削除
    pub fn remove(&mut self, key: &str) -> Option<TranslationNode> {
        self.entries.shift_remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TranslationNode)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.entries.values().map(TranslationNode::leaf_count).sum()
    }

    /// `separator` で連結したキーパスと値のペアに平坦化する
    ///
    /// # Examples
    /// ```
    /// use serde_json::json;
    /// use i18n_sync::ir::TranslationTree;
    ///
    /// let tree = TranslationTree::from_json(&json!({
    ///     "common": { "hello": "Hello" }
    /// }))
    /// .unwrap();
    ///
    /// assert_eq!(tree.flatten("."), vec![("common.hello".to_string(), "Hello".to_string())]);
    /// ```
    #[must_use]
    pub fn flatten(&self, separator: &str) -> Vec<(String, String)> {
        let mut result = Vec::new();
        self.flatten_into(separator, None, &mut result);
        result
    }

    /// `prefix` 以下のキーパスを `result` に追加する
    fn flatten_into(
        &self,
        separator: &str,
        prefix: Option<&str>,
        result: &mut Vec<(String, String)>,
    ) {
        for (key, node) in &self.entries {
            let full_key = prefix.map_or_else(|| key.clone(), |p| format!("{p}{separator}{key}"));
            match node {
                TranslationNode::Leaf(text) => result.push((full_key, text.clone())),
                TranslationNode::Raw(value) => result.push((full_key, value.to_string())),
                TranslationNode::Tree(tree) => tree.flatten_into(separator, Some(&full_key), result),
            }
        }
    }

    /// ツリーを消費してエントリを順序どおりに返す
    #[must_use]
    pub fn into_entries(self) -> IndexMap<String, TranslationNode> {
        self.entries
    }
}

impl FromIterator<(String, TranslationNode)> for TranslationTree {
    fn from_iter<T: IntoIterator<Item = (String, TranslationNode)>>(iter: T) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a TranslationTree {
    type Item = (&'a String, &'a TranslationNode);
    type IntoIter = indexmap::map::Iter<'a, String, TranslationNode>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
