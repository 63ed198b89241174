use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// File names GNU Global writes into the tag directory.
pub const PATH_DB: &str = "GPATH";
pub const DEFINITION_DB: &str = "GTAGS";
pub const REFERENCE_DB: &str = "GRTAGS";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub tags: TagsConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// File extension (with or without the leading dot) to minted lexer.
    #[serde(default = "default_languages")]
    pub languages: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TagsConfig {
    /// Directory holding `GPATH`, `GTAGS` and `GRTAGS`.
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
}

impl Default for TagsConfig {
    fn default() -> Self {
        Self { dir: default_dir() }
    }
}

impl TagsConfig {
    pub fn path_db(&self) -> PathBuf {
        self.dir.join(PATH_DB)
    }

    pub fn definition_db(&self) -> PathBuf {
        self.dir.join(DEFINITION_DB)
    }

    pub fn reference_db(&self) -> PathBuf {
        self.dir.join(REFERENCE_DB)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    /// Root the indexed paths are relative to.
    #[serde(default = "default_dir")]
    pub root: PathBuf,
    #[serde(default)]
    pub exclude_globs: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            root: default_dir(),
            exclude_globs: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default = "default_reverse_links")]
    pub reverse_links: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: default_output_path(),
            title: None,
            reverse_links: default_reverse_links(),
        }
    }
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_output_path() -> PathBuf {
    PathBuf::from("xref.tex")
}
fn default_reverse_links() -> bool {
    true
}

fn default_languages() -> BTreeMap<String, String> {
    [
        (".c", "c"),
        (".h", "c"),
        (".hpp", "c++"),
        (".cpp", "c++"),
        (".py", "python"),
    ]
    .into_iter()
    .map(|(ext, lexer)| (ext.to_string(), lexer.to_string()))
    .collect()
}

impl Config {
    /// Defaults for running inside an indexed tree with no config file.
    pub fn minimal() -> Self {
        Self {
            tags: TagsConfig::default(),
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            languages: default_languages(),
        }
    }

    /// Document title: the configured one, or the source root's name.
    pub fn title(&self) -> String {
        if let Some(title) = &self.output.title {
            return title.clone();
        }
        let root = self
            .source
            .root
            .canonicalize()
            .unwrap_or_else(|_| self.source.root.clone());
        root.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "source".to_string())
    }
}

/// Load and validate a config file.
///
/// A missing file yields [`Config::minimal`]; a file that exists but does not
/// parse is an error.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        return Ok(Config::minimal());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    if config.output.path.as_os_str().is_empty() {
        anyhow::bail!("output.path must not be empty");
    }

    for (ext, lexer) in &config.languages {
        if ext.trim_start_matches('.').is_empty() {
            anyhow::bail!("languages: empty file extension");
        }
        if lexer.trim().is_empty() {
            anyhow::bail!("languages: no lexer given for '{}'", ext);
        }
    }

    for pattern in &config.source.exclude_globs {
        globset::Glob::new(pattern)
            .with_context(|| format!("source.exclude_globs: invalid pattern '{}'", pattern))?;
    }

    Ok(())
}
