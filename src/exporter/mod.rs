//! Exporter facade
//!
//! Builds the runtime structure out of a validated configuration: one
//! prometheus collector per metric, one mode set per instance, slotted
//! into the time group for its interval. Forwards mode control and
//! lifecycle calls to the scheduler and gathers metric families for
//! the scrape endpoint.

pub mod mode_set;
pub mod sink;

pub use mode_set::{ModeIndex, ModeSet, DEFAULT_MODE};
pub use sink::MetricSink;

use prometheus::{proto, IntCounterVec, IntGaugeVec, Opts, Registry};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, MetricDef, MetricKind, MetricModeDef};
use crate::error::ExporterError;
use crate::scheduler::Scheduler;

/// Facade over the registry and the scheduler
pub struct Exporter {
    namespace: String,
    registry: Registry,
    scheduler: Arc<Scheduler>,
}

enum Collector {
    Counter(IntCounterVec),
    Gauge(IntGaugeVec),
}

impl Exporter {
    /// Create an empty exporter for `namespace`
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            registry: Registry::new(),
            scheduler: Arc::new(Scheduler::new()),
        }
    }

    /// Build a fully wired exporter from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self, ExporterError> {
        let exporter = Self::new(config.namespace.clone());
        for mode in &config.modes {
            exporter.scheduler.register_mode(&mode.name)?;
        }
        for metric in &config.metrics {
            exporter.add_metric(metric)?;
        }
        Ok(exporter)
    }

    /// Register one metric definition: a collector plus one mode set
    /// per instance.
    ///
    /// Every instance is validated before anything is registered, so a
    /// failing definition leaves no partial state behind.
    pub fn add_metric(&self, def: &MetricDef) -> Result<(), ExporterError> {
        let instances = def.effective_instances();

        // one label schema per metric: the union of keys over all
        // instances, sorted for a deterministic label order
        let label_names: Vec<&str> = instances
            .iter()
            .flat_map(|instance| instance.labels.keys())
            .map(String::as_str)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let help = if def.description.is_empty() {
            let kind = match def.kind {
                MetricKind::Counter => "counter",
                MetricKind::Gauge => "gauge",
            };
            format!("Synthetic {kind} `{}`", def.name)
        } else {
            def.description.clone()
        };
        let opts = Opts::new(def.name.clone(), help).namespace(self.namespace.clone());

        let collector = match def.kind {
            MetricKind::Counter => Collector::Counter(IntCounterVec::new(opts, &label_names)?),
            MetricKind::Gauge => Collector::Gauge(IntGaugeVec::new(opts, &label_names)?),
        };

        let interval = Duration::from_secs(def.interval_secs);
        let mut sets = Vec::with_capacity(instances.len());
        for instance in &instances {
            // instances missing a key expose it with an empty value
            let label_values: Vec<&str> = label_names
                .iter()
                .map(|key| instance.labels.get(*key).map(String::as_str).unwrap_or(""))
                .collect();

            let sink = match &collector {
                Collector::Counter(vec) => {
                    MetricSink::Counter(vec.get_metric_with_label_values(&label_values)?)
                }
                Collector::Gauge(vec) => {
                    MetricSink::Gauge(vec.get_metric_with_label_values(&label_values)?)
                }
            };

            let mut set = ModeSet::new(sink);
            set.set_parameters(DEFAULT_MODE, def.default_properties);

            for (name, entry) in merged_overrides(&def.modes, &instance.modes) {
                let index = self
                    .scheduler
                    .mode_index(name)
                    .ok_or_else(|| ExporterError::UnknownMode(name.to_string()))?;
                if entry.disabled {
                    // resolves like an absent override, falling back to
                    // the default parameters
                    continue;
                }
                set.set_parameters(index, entry.properties);
            }

            sets.push(set);
        }

        match collector {
            Collector::Counter(vec) => self.registry.register(Box::new(vec))?,
            Collector::Gauge(vec) => self.registry.register(Box::new(vec))?,
        }
        for set in sets {
            self.scheduler.add_to_group(interval, set)?;
        }

        tracing::debug!(
            metric = %def.name,
            instances = instances.len(),
            interval_secs = def.interval_secs,
            "registered metric"
        );
        Ok(())
    }

    /// Begin periodic updates for every time group
    pub fn start(&self) {
        Arc::clone(&self.scheduler).start();
    }

    /// The active mode as `(name, is_default)`
    pub fn active_mode(&self) -> (String, bool) {
        self.scheduler.active_mode()
    }

    /// Switch the active mode by name
    pub fn set_active_mode(&self, name: &str) -> Result<(), ExporterError> {
        self.scheduler.set_active_mode(name)
    }

    /// Snapshot all metric families for scraping
    pub fn gather(&self) -> Vec<proto::MetricFamily> {
        self.registry.gather()
    }

    /// Total number of exposed series across all metrics
    pub fn series_count(&self) -> usize {
        self.gather()
            .iter()
            .map(|family| family.get_metric().len())
            .sum()
    }

    /// The exporter's prometheus namespace
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// The underlying scheduler
    pub fn scheduler(&self) -> &Arc<Scheduler> {
        &self.scheduler
    }
}

/// Metric-level overrides seeded first, per-instance entries shadowing
/// them by mode name
fn merged_overrides<'a>(
    metric_level: &'a [MetricModeDef],
    instance_level: &'a [MetricModeDef],
) -> BTreeMap<&'a str, &'a MetricModeDef> {
    let mut merged = BTreeMap::new();
    for entry in metric_level.iter().chain(instance_level) {
        merged.insert(entry.name.as_str(), entry);
    }
    merged
}
