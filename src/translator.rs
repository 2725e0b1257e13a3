//! テキスト翻訳: 外部翻訳プロバイダーとプレースホルダーを保持する翻訳処理

pub mod google;
pub mod placeholder;
pub mod provider;

pub use google::GoogleTranslator;
pub use placeholder::{
    PlaceholderTranslator,
    StatsSnapshot,
    TranslationStats,
};
pub use provider::{
    TranslateError,
    TranslationProvider,
};
