// Language recipe table for the runner.
// Defaults are compiled in from config/languages.json; a replacement file can be
// supplied at run time.
use anyhow::{bail, Context, Result};
use ctci_common::types::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const BUILTIN_LANGUAGES: &str = include_str!("../../../config/languages.json");

/// Placeholder replaced with the entry file name
pub const ENTRY_PLACEHOLDER: &str = "{entry}";
/// Placeholder replaced with the path of the build artifact
pub const ARTIFACT_PLACEHOLDER: &str = "{artifact}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageExecution {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Route through `cmd.exe /c` on Windows, for tools installed as script shims
    #[serde(default)]
    pub windows_shell: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStep {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// A file with this extension must exist in the language folder
    pub project_extension: String,
    /// Searched recursively for the artifact after a successful build
    pub artifact_dir: String,
    pub artifact_extension: String,
    /// Files ending with this suffix are never picked as the artifact
    #[serde(default)]
    pub exclude_suffix: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageConfig {
    pub name: String,
    /// Source file that must exist before launching
    #[serde(default)]
    pub entry_file: Option<String>,
    #[serde(default)]
    pub build: Option<BuildStep>,
    pub execution: LanguageExecution,
}

#[derive(Debug, Serialize, Deserialize)]
struct LanguagesJson {
    languages: Vec<LanguageConfig>,
}

/// Language configuration manager
#[derive(Debug, Clone)]
pub struct LanguageConfigManager {
    configs: HashMap<String, LanguageConfig>,
}

impl LanguageConfigManager {
    /// Table compiled into the binary
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LANGUAGES).context("Built-in languages.json is invalid")
    }

    /// Load language configurations from a languages.json file
    pub fn load(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            bail!("Language config file not found: {}", config_path.display());
        }

        let content = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;

        Self::from_json(&content)
            .with_context(|| format!("Failed to load {}", config_path.display()))
    }

    /// Load from `path` when given, else the built-in table
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    fn from_json(content: &str) -> Result<Self> {
        let languages_json: LanguagesJson =
            serde_json::from_str(content).context("Failed to parse languages.json")?;

        let mut configs = HashMap::new();
        for lang in languages_json.languages {
            if lang.name.parse::<Language>().is_err() {
                bail!("Unknown language '{}' in languages.json", lang.name);
            }
            if lang.execution.command.trim().is_empty() {
                bail!("Language '{}' has an empty execution command", lang.name);
            }
            configs.insert(lang.name.to_lowercase(), lang);
        }

        Ok(Self { configs })
    }

    /// Get configuration for a specific language
    pub fn get_config(&self, language: &Language) -> Result<&LanguageConfig> {
        self.configs
            .get(language.as_str())
            .ok_or_else(|| anyhow::anyhow!("No configuration found for language: {}", language))
    }

    /// List all configured languages
    pub fn list_languages(&self) -> Vec<String> {
        let mut names: Vec<String> = self.configs.keys().cloned().collect();
        names.sort();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_language() {
        let manager = LanguageConfigManager::builtin().unwrap();

        for language in Language::ALL {
            assert!(manager.get_config(&language).is_ok(), "{} missing", language);
        }
        assert_eq!(manager.list_languages(), vec!["csharp", "python", "typescript"]);
    }

    #[test]
    fn test_builtin_recipes() {
        let manager = LanguageConfigManager::builtin().unwrap();

        let python = manager.get_config(&Language::Python).unwrap();
        assert_eq!(python.entry_file.as_deref(), Some("solution.py"));
        assert_eq!(python.execution.command, "python");
        assert!(python.build.is_none());

        let csharp = manager.get_config(&Language::CSharp).unwrap();
        let build = csharp.build.as_ref().unwrap();
        assert_eq!(build.command, "dotnet");
        assert_eq!(build.args, vec!["build"]);
        assert_eq!(build.exclude_suffix.as_deref(), Some(".deps.dll"));
        assert_eq!(csharp.execution.args, vec![ARTIFACT_PLACEHOLDER]);

        let typescript = manager.get_config(&Language::TypeScript).unwrap();
        assert!(typescript.execution.windows_shell);
        assert_eq!(
            typescript.execution.args,
            vec!["--compiler-options", "{\"module\":\"CommonJS\"}", ENTRY_PLACEHOLDER]
        );
    }

    #[test]
    fn test_load_replacement_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("languages.json");
        fs::write(
            &path,
            r#"{"languages": [{"name": "Python", "entry_file": "main.py",
                "execution": {"command": "python3", "args": ["-u", "{entry}"]}}]}"#,
        )
        .unwrap();

        let manager = LanguageConfigManager::load(&path).unwrap();

        let python = manager.get_config(&Language::Python).unwrap();
        assert_eq!(python.execution.command, "python3");
        assert_eq!(python.execution.args, vec!["-u", "{entry}"]);
        assert!(manager.get_config(&Language::CSharp).is_err());
    }

    #[test]
    fn test_rejects_unknown_language() {
        let err = LanguageConfigManager::from_json(
            r#"{"languages": [{"name": "cobol", "execution": {"command": "cobc"}}]}"#,
        )
        .unwrap_err();

        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_missing_file() {
        let err = LanguageConfigManager::load(Path::new("does/not/exist.json")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
