//! Scenario file parser (TOML or JSON).

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, bail, ensure};
use clap::ValueEnum;
use gridsim_placement::{
    BinPack, Drift, Fifo, Kubernetes, QueueSortPlugin, ScorePlugin, ShortestJobFirst,
    typical_shapes_from_pods,
};
use gridsim_scheduler::SchedulerConfig;
use gridsim_state::{GPU_MILLI_PER_GPU, Node, Pod};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub pods: Vec<PodRecord>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    pub queue_sort: QueueSortKind,
    pub score: ScoreKind,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QueueSortKind {
    #[default]
    Fifo,
    Sjf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ScoreKind {
    #[default]
    Kubernetes,
    Binpack,
    Drift,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    pub cpu_milli: u64,
    pub memory_mib: u64,
    #[serde(default)]
    pub gpu_count: usize,
    #[serde(default = "default_gpu_share")]
    pub gpu_share_enabled: bool,
}

fn default_gpu_share() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PodRecord {
    pub name: String,
    pub cpu_milli: u64,
    pub memory_mib: u64,
    #[serde(default)]
    pub num_gpu: usize,
    #[serde(default)]
    pub gpu_milli: u32,
    #[serde(default)]
    pub creation_time: u64,
    pub duration: u64,
}

impl Scenario {
    /// Load a scenario, choosing the format by file extension.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scenario {}", path.display()))?;
        let scenario = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => bail!(
                "unsupported scenario format {:?} for {} (expected .toml or .json)",
                other.unwrap_or(""),
                path.display()
            ),
        };
        scenario.with_context(|| format!("parsing scenario {}", path.display()))
    }

    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject scenarios the ledger would refuse or misinterpret.
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            ensure!(seen.insert(node.name.as_str()), "duplicate node name: {}", node.name);
        }

        let mut seen = HashSet::new();
        for pod in &self.pods {
            ensure!(seen.insert(pod.name.as_str()), "duplicate pod name: {}", pod.name);
            ensure!(
                pod.gpu_milli <= GPU_MILLI_PER_GPU,
                "pod {} requests {} milli per GPU, more than {GPU_MILLI_PER_GPU}",
                pod.name,
                pod.gpu_milli
            );
            if pod.num_gpu > 0 && pod.gpu_milli == 0 {
                warn!(pod = %pod.name, num_gpu = pod.num_gpu, "pod requests GPUs with zero milli each");
            }
        }

        if self.nodes.is_empty() && !self.pods.is_empty() {
            warn!(pods = self.pods.len(), "scenario has pods but no nodes");
        }
        Ok(())
    }

    /// Ledger nodes. `gpu_share` forces the sharing flag on every node.
    pub fn build_nodes(&self, gpu_share: Option<bool>) -> Vec<Node> {
        self.nodes
            .iter()
            .map(|n| {
                Node::new(
                    n.name.clone(),
                    n.cpu_milli,
                    n.memory_mib,
                    n.gpu_count,
                    gpu_share.unwrap_or(n.gpu_share_enabled),
                )
            })
            .collect()
    }

    pub fn build_pods(&self) -> Vec<Pod> {
        self.pods
            .iter()
            .map(|p| {
                Pod::new(
                    p.name.clone(),
                    p.cpu_milli,
                    p.memory_mib,
                    p.num_gpu,
                    p.gpu_milli,
                    p.creation_time,
                    p.duration,
                )
            })
            .collect()
    }
}

impl QueueSortKind {
    pub fn plugin(self) -> Box<dyn QueueSortPlugin> {
        match self {
            QueueSortKind::Fifo => Box::new(Fifo),
            QueueSortKind::Sjf => Box::new(ShortestJobFirst),
        }
    }
}

impl ScoreKind {
    pub const ALL: [ScoreKind; 3] = [ScoreKind::Kubernetes, ScoreKind::Binpack, ScoreKind::Drift];

    /// Build the scorer. Drift takes its reference shapes from `workload`.
    pub fn plugin(self, workload: &[Pod]) -> Box<dyn ScorePlugin> {
        match self {
            ScoreKind::Kubernetes => Box::new(Kubernetes),
            ScoreKind::Binpack => Box::new(BinPack),
            ScoreKind::Drift => Box::new(Drift::new(typical_shapes_from_pods(workload))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let toml_str = r#"
[[nodes]]
name = "n1"
cpu_milli = 4000
memory_mib = 8192

[[pods]]
name = "p1"
cpu_milli = 500
memory_mib = 256
duration = 10
"#;
        let scenario = Scenario::from_toml_str(toml_str).unwrap();
        assert_eq!(scenario.nodes[0].gpu_count, 0);
        assert!(scenario.nodes[0].gpu_share_enabled);
        assert_eq!(scenario.pods[0].creation_time, 0);
        assert_eq!(scenario.plugins, PluginsConfig::default());
        assert_eq!(scenario.scheduler, SchedulerConfig::default());
        scenario.validate().unwrap();
    }

    #[test]
    fn test_plugin_names() {
        let toml_str = r#"
[plugins]
queue_sort = "sjf"
score = "binpack"
"#;
        let scenario = Scenario::from_toml_str(toml_str).unwrap();
        assert_eq!(scenario.plugins.queue_sort, QueueSortKind::Sjf);
        assert_eq!(scenario.plugins.score, ScoreKind::Binpack);
        assert_eq!(scenario.plugins.queue_sort.plugin().name(), "sjf");
        assert_eq!(scenario.plugins.score.plugin(&[]).name(), "binpack");
    }

    #[test]
    fn test_unknown_plugin_rejected() {
        assert!(Scenario::from_toml_str("[plugins]\nscore = \"random\"\n").is_err());
    }

    #[test]
    fn test_gpu_share_override() {
        let mut scenario = Scenario::default();
        scenario.nodes.push(NodeRecord {
            name: "n1".to_string(),
            cpu_milli: 1000,
            memory_mib: 1000,
            gpu_count: 2,
            gpu_share_enabled: true,
        });

        assert!(scenario.build_nodes(None)[0].gpu_share_enabled);
        assert!(!scenario.build_nodes(Some(false))[0].gpu_share_enabled);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut scenario = Scenario::default();
        scenario.plugins.score = ScoreKind::Drift;
        scenario.pods.push(PodRecord {
            name: "p".to_string(),
            cpu_milli: 1,
            memory_mib: 1,
            num_gpu: 1,
            gpu_milli: 250,
            creation_time: 3,
            duration: 4,
        });
        let text = scenario.to_toml_string().unwrap();
        let parsed = Scenario::from_toml_str(&text).unwrap();
        assert_eq!(parsed.pods, scenario.pods);
        assert_eq!(parsed.plugins.score, ScoreKind::Drift);
    }
}
