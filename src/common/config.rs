use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::dock_engine::factory::BUILTIN_FACTORY_KEYS;

fn home_dir() -> PathBuf { dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")) }

pub fn data_dir() -> PathBuf { home_dir().join(".dockyard") }
pub fn restore_file() -> PathBuf { data_dir().join("layout.ron") }
pub fn config_file() -> PathBuf { home_dir().join(".config").join("dockyard").join("config.toml") }

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    #[serde(default)]
    pub docking: DockSettings,
    #[serde(default)]
    pub persistence: PersistenceSettings,
}

/// Geometry knobs used when scoring and previewing drops.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(deny_unknown_fields)]
pub struct DockSettings {
    /// Fraction of each dimension cut from every side to get the priority
    /// rectangle (0.25 keeps the 2/8..6/8 band).
    #[serde(default = "default_priority_margin")]
    pub priority_margin: f64,
    /// Normalized distance from an edge under which border slots and split
    /// sides count as "near the edge".
    #[serde(default = "default_edge_fraction")]
    pub edge_fraction: f64,
    /// Width in pixels of the band around insertion boundaries in line and
    /// grid docks.
    #[serde(default = "default_boundary_band")]
    pub boundary_band: i32,
    #[serde(default = "default_tab_header_size")]
    pub tab_header_size: i32,
    /// Largest share of a border dock an edge slot may take.
    #[serde(default = "default_max_edge_fraction")]
    pub max_edge_fraction: f64,
    /// Factory used when a saved key is unknown.
    #[serde(default = "default_factory")]
    pub default_factory: String,
}

impl Default for DockSettings {
    fn default() -> Self {
        Self {
            priority_margin: default_priority_margin(),
            edge_fraction: default_edge_fraction(),
            boundary_band: default_boundary_band(),
            tab_header_size: default_tab_header_size(),
            max_edge_fraction: default_max_edge_fraction(),
            default_factory: default_factory(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, PartialEq, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct PersistenceSettings {
    /// Where layouts are saved. Defaults to `~/.dockyard/layout.ron`.
    #[serde(default)]
    pub layout_file: Option<PathBuf>,
}

impl PersistenceSettings {
    pub fn layout_file(&self) -> PathBuf { self.layout_file.clone().unwrap_or_else(restore_file) }
}

fn default_priority_margin() -> f64 { 0.25 }
fn default_edge_fraction() -> f64 { 0.25 }
fn default_boundary_band() -> i32 { 8 }
fn default_tab_header_size() -> i32 { 24 }
fn default_max_edge_fraction() -> f64 { 1.0 / 3.0 }
fn default_factory() -> String { "leaf".to_string() }

impl Config {
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let buf = std::fs::read_to_string(path)?;
        Self::parse(&buf)
    }

    /// Save the current config to a file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, toml_string.as_bytes())?;
        Ok(())
    }

    pub fn parse(buf: &str) -> anyhow::Result<Config> {
        match toml::from_str::<Config>(buf) {
            Ok(c) => Ok(c),
            Err(e) => bail!("{e}"),
        }
    }

    /// Validates the entire configuration and returns a list of issues found.
    pub fn validate(&self) -> Vec<String> { self.settings.validate() }
}

impl Settings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        issues.extend(self.docking.validate());
        if let Some(path) = &self.persistence.layout_file {
            if path.as_os_str().is_empty() {
                issues.push("persistence.layout_file must not be empty".to_string());
            }
        }
        issues
    }
}

impl DockSettings {
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();

        if !(0.0..0.5).contains(&self.priority_margin) {
            issues.push(format!(
                "priority_margin must be in [0, 0.5), got {}",
                self.priority_margin
            ));
        }
        if !(0.0..=0.5).contains(&self.edge_fraction) {
            issues.push(format!("edge_fraction must be in [0, 0.5], got {}", self.edge_fraction));
        }
        if self.boundary_band < 0 {
            issues.push(format!("boundary_band must be non-negative, got {}", self.boundary_band));
        }
        if self.tab_header_size < 0 {
            issues.push(format!(
                "tab_header_size must be non-negative, got {}",
                self.tab_header_size
            ));
        }
        if !(0.0..=1.0).contains(&self.max_edge_fraction) {
            issues.push(format!(
                "max_edge_fraction must be in [0, 1], got {}",
                self.max_edge_fraction
            ));
        }
        if !BUILTIN_FACTORY_KEYS.contains(&self.default_factory.as_str()) {
            match suggest_similar(&self.default_factory, BUILTIN_FACTORY_KEYS) {
                Some(s) => issues.push(format!(
                    "unknown default_factory `{}`, did you mean `{s}`?",
                    self.default_factory
                )),
                None => issues.push(format!("unknown default_factory `{}`", self.default_factory)),
            }
        }

        issues
    }
}

fn suggest_similar<'a>(unknown: &str, candidates: &[&'a str]) -> Option<&'a str> {
    let unknown = unknown.to_lowercase();
    let (best, dist) = candidates
        .iter()
        .map(|c| (*c, levenshtein(&unknown, c)))
        .min_by_key(|(_, d)| *d)?;
    let threshold = std::cmp::max(3usize, best.len() / 2);
    (dist <= threshold).then_some(best)
}

/// no need to pull in a dep for just this
fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    for i in 1..=a.len() {
        let mut cur = vec![i; b.len() + 1];
        for j in 1..=b.len() {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            cur[j] = (prev[j] + 1).min(cur[j - 1] + 1).min(prev[j - 1] + cost);
        }
        prev = cur;
    }
    prev[b.len()]
}
