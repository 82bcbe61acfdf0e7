//! Configuration for metricgen
//!
//! The configuration file describes which synthetic metrics to serve,
//! how often each one updates, and the named modes an operator can
//! switch between at runtime. Loading is strict: any invalid definition
//! aborts startup rather than producing a partially configured daemon.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;

use crate::error::ConfigError;

/// Top-level daemon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Prometheus namespace prefixed to every metric name
    pub namespace: String,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Named modes, in declaration order
    #[serde(default)]
    pub modes: Vec<ModeDefinition>,

    /// Synthetic metric definitions
    #[serde(default)]
    pub metrics: Vec<MetricDef>,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: SocketAddr,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            enable_cors: true,
        }
    }
}

/// A named mode an operator can activate at runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModeDefinition {
    /// Case-sensitive mode name, unique within the configuration
    pub name: String,
}

/// The fundamental kind of a synthetic metric
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Monotonically increasing value; parameters describe the per-tick increase
    Counter,
    /// Free-standing value; parameters describe the absolute value
    Gauge,
}

impl<'de> Deserialize<'de> for MetricKind {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_ascii_lowercase().as_str() {
            "counter" => Ok(MetricKind::Counter),
            "gauge" => Ok(MetricKind::Gauge),
            other => Err(serde::de::Error::custom(format!(
                "unsupported metric kind `{other}`"
            ))),
        }
    }
}

impl Serialize for MetricKind {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            MetricKind::Counter => serializer.serialize_str("counter"),
            MetricKind::Gauge => serializer.serialize_str("gauge"),
        }
    }
}

/// Statistical parameters for one metric in one mode
///
/// For a counter these describe the per-tick increase; for a gauge the
/// absolute value. The generated value is drawn uniformly from
/// `[average - jitter_bound, average + jitter_bound]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameters {
    /// Central value of the distribution
    #[serde(alias = "avg")]
    pub average: i64,

    /// Half-width of the uniform jitter interval; zero means deterministic
    #[serde(default, alias = "jitter")]
    pub jitter_bound: i64,
}

/// One synthetic metric definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricDef {
    /// Metric name (without the namespace prefix)
    pub name: String,

    /// Help text exposed on the scrape endpoint
    #[serde(default)]
    pub description: String,

    /// Counter or gauge
    pub kind: MetricKind,

    /// Seconds between updates; metrics sharing an interval share a tick loop
    pub interval_secs: u64,

    /// Parameters used when no mode override applies
    pub default_properties: Parameters,

    /// Metric-level mode overrides, seeding every instance
    #[serde(default)]
    pub modes: Vec<MetricModeDef>,

    /// Labeled instances; empty means a single unlabeled instance
    #[serde(default)]
    pub instances: Vec<InstanceDef>,
}

/// A parameter override for one named mode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricModeDef {
    /// Name of a mode declared in the global mode list
    pub name: String,

    /// A disabled override behaves exactly like an absent one
    #[serde(default, alias = "disable")]
    pub disabled: bool,

    /// Parameters in effect while this mode is active
    #[serde(default)]
    pub properties: Parameters,
}

/// One labeled instance of a metric
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstanceDef {
    /// Label key-value assignments for this instance
    #[serde(default)]
    pub labels: BTreeMap<String, String>,

    /// Per-instance mode overrides, shadowing metric-level ones by name
    #[serde(default)]
    pub modes: Vec<MetricModeDef>,
}

impl MetricDef {
    /// Instances to materialize: the configured list, or a single
    /// unlabeled instance when none were given.
    pub fn effective_instances(&self) -> Vec<InstanceDef> {
        if self.instances.is_empty() {
            vec![InstanceDef::default()]
        } else {
            self.instances.clone()
        }
    }
}

impl Config {
    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    ///
    /// Checks everything the exporter assumes: a non-empty namespace,
    /// unique mode and metric names, positive intervals, non-negative
    /// jitter bounds, and that every referenced mode is declared.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.trim().is_empty() {
            return Err(ConfigError::EmptyNamespace);
        }

        let mut declared = HashSet::new();
        for mode in &self.modes {
            if !declared.insert(mode.name.as_str()) {
                return Err(ConfigError::DuplicateMode(mode.name.clone()));
            }
        }

        let mut metric_names = HashSet::new();
        for metric in &self.metrics {
            if !metric_names.insert(metric.name.as_str()) {
                return Err(ConfigError::DuplicateMetric(metric.name.clone()));
            }
            if metric.interval_secs == 0 {
                return Err(ConfigError::ZeroInterval(metric.name.clone()));
            }
            check_jitter(&metric.name, "default_properties", &metric.default_properties)?;
            check_mode_overrides(&metric.name, &metric.modes, &declared)?;
            for instance in &metric.instances {
                check_mode_overrides(&metric.name, &instance.modes, &declared)?;
            }
        }

        Ok(())
    }
}

fn check_mode_overrides(
    metric: &str,
    overrides: &[MetricModeDef],
    declared: &HashSet<&str>,
) -> Result<(), ConfigError> {
    for entry in overrides {
        if !declared.contains(entry.name.as_str()) {
            return Err(ConfigError::UndeclaredMode {
                metric: metric.to_string(),
                mode: entry.name.clone(),
            });
        }
        check_jitter(metric, &format!("mode `{}`", entry.name), &entry.properties)?;
    }
    Ok(())
}

fn check_jitter(metric: &str, context: &str, params: &Parameters) -> Result<(), ConfigError> {
    if params.jitter_bound < 0 {
        return Err(ConfigError::NegativeJitter {
            metric: metric.to_string(),
            context: context.to_string(),
        });
    }
    Ok(())
}

// Default value helpers
fn default_true() -> bool {
    true
}

fn default_listen_addr() -> SocketAddr {
    "127.0.0.1:9090".parse().unwrap()
}
