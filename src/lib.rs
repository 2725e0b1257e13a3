//! i18n-sync
//!
//! ソース言語の翻訳ファイルを基準に、各言語の翻訳ファイルを同期するツール。
//! 追加されたキーだけを翻訳し、削除されたキーを取り除き、変更があったファイルだけを書き込みます。

pub mod config;
pub mod ir;
pub mod store;
pub mod sync;
pub mod translator;
pub mod types;

#[cfg(test)]
mod test_utils;

pub use sync::{
    SyncError,
    SyncOrchestrator,
    SyncReport,
};
