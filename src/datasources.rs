//! Data-source list state
//!
//! Mirrors what the data-source panel needs: whether the list is loading,
//! what it holds, and the last load error.

use crate::api::{Backend, ConnectionTest, DataSource, DataSourceProbe, QueryClient};

/// Load state of the data-source list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PanelState {
    #[default]
    Loading,
    Loaded(Vec<DataSource>),
    Failed(String),
}

#[derive(Debug, Default)]
pub struct DataSourcePanel {
    state: PanelState,
}

impl DataSourcePanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn sources(&self) -> &[DataSource] {
        match &self.state {
            PanelState::Loaded(sources) => sources,
            PanelState::Loading | PanelState::Failed(_) => &[],
        }
    }

    /// Loaded successfully but nothing is configured
    #[allow(dead_code)] // Used in tests
    pub fn is_empty(&self) -> bool {
        matches!(&self.state, PanelState::Loaded(sources) if sources.is_empty())
    }

    pub fn find(&self, id: &str) -> Option<&DataSource> {
        self.sources().iter().find(|s| s.id == id)
    }

    /// Fetch the list, replacing whatever was shown before
    pub async fn load<B: Backend>(&mut self, client: &QueryClient<B>) -> &PanelState {
        self.state = match client.get_data_sources().await {
            Ok(sources) => {
                tracing::info!(count = sources.len(), "Loaded data sources");
                PanelState::Loaded(sources)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load data sources");
                PanelState::Failed(e.message)
            }
        };
        &self.state
    }

    /// Probe a listed source; `None` when the id is not in the list
    pub async fn test<B: Backend>(&self, client: &QueryClient<B>, id: &str) -> Option<ConnectionTest> {
        let source = self.find(id)?;
        let result = client.test_connection(&DataSourceProbe::from(source)).await;
        tracing::info!(
            id,
            success = result.success,
            message = %result.message,
            "Connection test finished"
        );
        Some(result)
    }
}
