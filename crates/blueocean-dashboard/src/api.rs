//! Pipeline data source
//!
//! Action creators fetch pipeline data through [`PipelineApi`] before they
//! dispatch it into the store. The dashboard ships a fixture-backed
//! implementation; a REST-backed one only needs to implement the same trait.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;

/// Read access to pipelines and their branches
#[async_trait]
pub trait PipelineApi: Send + Sync {
    /// All pipelines, each a JSON object with at least a `name`
    async fn fetch_pipelines(&self) -> Result<Vec<Value>>;

    /// Branches of one pipeline
    async fn fetch_branches(&self, pipeline: &str) -> Result<Vec<Value>>;
}

/// On-disk fixture format
#[derive(Debug, Clone, Default, Deserialize)]
struct Fixtures {
    pipelines: Vec<Value>,
    #[serde(default)]
    branches: HashMap<String, Vec<Value>>,
}

/// Serves pipelines from a JSON document
#[derive(Debug, Clone)]
pub struct FixtureApi {
    fixtures: Fixtures,
}

impl FixtureApi {
    /// Load fixtures from a JSON file shaped like
    /// `{"pipelines": [...], "branches": {"<pipeline>": [...]}}`
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixtures file {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse fixtures file {}", path.display()))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let fixtures: Fixtures = serde_json::from_str(content)?;
        Ok(Self { fixtures })
    }

    /// Built-in demo data
    pub fn sample() -> Self {
        let fixtures = Fixtures {
            pipelines: vec![
                json!({"name": "blueocean", "organization": "jenkins", "weatherScore": 100, "propX": 0}),
                json!({"name": "jenkins core", "organization": "jenkins", "weatherScore": 60, "propX": 0}),
            ],
            branches: HashMap::from([
                (
                    "blueocean".to_string(),
                    vec![
                        json!({"name": "master", "latestRun": {"result": "SUCCESS"}}),
                        json!({"name": "feature/redux-store", "latestRun": {"result": "FAILURE"}}),
                    ],
                ),
                (
                    "jenkins core".to_string(),
                    vec![json!({"name": "master", "latestRun": {"result": "UNSTABLE"}})],
                ),
            ]),
        };
        Self { fixtures }
    }
}

#[async_trait]
impl PipelineApi for FixtureApi {
    async fn fetch_pipelines(&self) -> Result<Vec<Value>> {
        Ok(self.fixtures.pipelines.clone())
    }

    async fn fetch_branches(&self, pipeline: &str) -> Result<Vec<Value>> {
        self.fixtures
            .branches
            .get(pipeline)
            .cloned()
            .with_context(|| format!("Pipeline {} not found", pipeline))
    }
}
