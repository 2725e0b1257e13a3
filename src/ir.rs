//! 翻訳ファイルと同期結果のメモリ上の表現

pub mod changeset;
pub mod tree;

pub use changeset::{
    Change,
    ChangeSummary,
    Changeset,
};
pub use tree::{
    TranslationNode,
    TranslationTree,
    TreeError,
};
