//! プロジェクト全体で使用する基本型

/// 同期対象の言語一覧
///
/// 設定から一度だけ作成してオーケストレーターに渡す。以後は変更しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageCatalog {
    /// 翻訳元の言語コード
    source: String,
    /// 翻訳先の言語コード（重複なし）
    targets: Vec<String>,
}

impl LanguageCatalog {
    #[must_use]
    pub fn new(source: impl Into<String>, targets: Vec<String>) -> Self {
        Self { source: source.into(), targets }
    }

    /// ソース言語
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// 翻訳先の言語（設定順）
    #[must_use]
    pub fn targets(&self) -> &[String] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use googletest::prelude::*;

    use super::*;

    #[googletest::test]
    fn test_catalog_keeps_target_order() {
        let catalog =
            LanguageCatalog::new("en", vec!["it".to_string(), "fr".to_string(), "en".to_string()]);

        expect_that!(catalog.source(), eq("en"));
        expect_that!(catalog.targets().to_vec(), elements_are![eq("it"), eq("fr"), eq("en")]);
    }
}
