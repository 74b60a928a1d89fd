//! Source-language detection and the language hard filter for standards/tooling packages.

use serde::Serialize;

use crate::category::CategoryPath;

/// Category roots whose packages are language-specific.
const LANGUAGE_SCOPED_ROOTS: &[&str] = &["standards", "tooling"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    TypeScript,
    JavaScript,
    Java,
    Python,
    Go,
    Terraform,
    Rust,
    CSharp,
}

impl Language {
    pub const ALL: [Language; 8] = [
        Language::TypeScript,
        Language::JavaScript,
        Language::Java,
        Language::Python,
        Language::Go,
        Language::Terraform,
        Language::Rust,
        Language::CSharp,
    ];

    /// Detect the language of a source file from its extension.
    pub fn detect(source_file_path: &str) -> Option<Language> {
        let ext = std::path::Path::new(source_file_path)
            .extension()?
            .to_str()?
            .to_ascii_lowercase();
        match ext.as_str() {
            "ts" | "tsx" => Some(Language::TypeScript),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            "java" => Some(Language::Java),
            "py" => Some(Language::Python),
            "go" => Some(Language::Go),
            "tf" => Some(Language::Terraform),
            "rs" => Some(Language::Rust),
            "cs" => Some(Language::CSharp),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::TypeScript => "typescript",
            Language::JavaScript => "javascript",
            Language::Java => "java",
            Language::Python => "python",
            Language::Go => "go",
            Language::Terraform => "terraform",
            Language::Rust => "rust",
            Language::CSharp => "csharp",
        }
    }

    /// Category tokens that name this language.
    fn indicators(&self) -> &'static [&'static str] {
        match self {
            Language::TypeScript => &["typescript", "ts"],
            Language::JavaScript => &["javascript", "js"],
            Language::Java => &["java"],
            Language::Python => &["python", "py"],
            Language::Go => &["golang", "go"],
            Language::Terraform => &["terraform", "tf"],
            Language::Rust => &["rust"],
            Language::CSharp => &["csharp", "c#", "dotnet"],
        }
    }

    fn named_by(&self, tokens: &[String]) -> bool {
        self.indicators()
            .iter()
            .any(|ind| tokens.iter().any(|t| t == ind))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `true` when `category` is a standards/tooling category for some language other than
/// `detected`. Categories naming no language, or naming `detected` among others, pass.
pub fn is_other_language(category: &CategoryPath, detected: Language) -> bool {
    if !LANGUAGE_SCOPED_ROOTS.contains(&category.root()) {
        return false;
    }
    let tokens = category.tokens();
    if detected.named_by(&tokens) {
        return false;
    }
    Language::ALL
        .iter()
        .any(|lang| *lang != detected && lang.named_by(&tokens))
}
