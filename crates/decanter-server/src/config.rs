use decanter_alert::config::CheckerConfig;
use decanter_common::id::IdNode;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Default tracing directive when `RUST_LOG` is unset (e.g. `info`,
    /// `decanter=debug`).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Alert-state snapshot, loaded at startup and written at shutdown.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: PathBuf,
    /// Also write every alert to stdout as a JSON line.
    #[serde(default)]
    pub json_alerts: bool,
    /// `[machine, node]` pair for alert event ids, each `0..=31`.
    #[serde(default)]
    pub id_node: IdNode,
    /// Alert rules. Dotted TOML keys and nested tables are flattened into
    /// the checker's `a.b.c` keys, so `ThreadCount.error = "range:[0,200]"`
    /// and `"ThreadCount.error" = "..."` are equivalent.
    #[serde(default)]
    pub checker: toml::Table,
}

fn default_log_level() -> String {
    "decanter=info".to_string()
}

fn default_snapshot_path() -> PathBuf {
    PathBuf::from("data/decanter/alerter.db")
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{path}': {e}"))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// The `[checker]` table as the checker's flat key space.
    pub fn checker_config(&self) -> CheckerConfig {
        let mut properties = HashMap::new();
        flatten_table("", &self.checker, &mut properties);
        CheckerConfig::new(properties)
    }
}

fn flatten_table(prefix: &str, table: &toml::Table, out: &mut HashMap<String, String>) {
    for (key, value) in table {
        let full_key = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            toml::Value::Table(nested) => flatten_table(&full_key, nested, out),
            toml::Value::String(s) => {
                out.insert(full_key, s.clone());
            }
            toml::Value::Integer(_) | toml::Value::Float(_) | toml::Value::Boolean(_) => {
                out.insert(full_key, value.to_string());
            }
            _ => tracing::warn!(key = %full_key, "Ignoring non-scalar checker setting"),
        }
    }
}
