//! Health report and the upstream tag listing it is built from.

use serde::{Deserialize, Serialize};

/// Message reported when upstream answers the tag listing with a non-200.
pub const UNHEALTHY_MESSAGE: &str = "Ollama not responding";

/// Outcome of probing the upstream service.
///
/// Serialized with a `status` discriminator: `healthy`, `unhealthy` or
/// `down`. The health endpoint always answers 200 with one of these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum HealthReport {
    Healthy {
        ollama_url: String,
        available_models: Vec<String>,
    },
    Unhealthy {
        error: String,
    },
    Down {
        error: String,
    },
}

impl HealthReport {
    pub fn unhealthy() -> Self {
        Self::Unhealthy {
            error: UNHEALTHY_MESSAGE.to_string(),
        }
    }

    pub fn down(error: impl Into<String>) -> Self {
        Self::Down {
            error: error.into(),
        }
    }

    pub const fn is_healthy(&self) -> bool {
        matches!(self, Self::Healthy { .. })
    }
}

/// Upstream `GET /api/tags` body, reduced to what the health probe reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagEntry>,
}

/// One installed model in the tag listing. Other fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct TagEntry {
    pub name: String,
}

impl TagsResponse {
    pub fn model_names(self) -> Vec<String> {
        self.models.into_iter().map(|m| m.name).collect()
    }
}
