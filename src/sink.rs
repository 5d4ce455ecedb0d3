use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// One logged tool invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolRecord {
    pub id: Uuid,
    pub tool: String,
    pub model: String,
    pub input: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// "completed" | "failed"
    pub status: String,
    /// Unix seconds.
    pub created: u64,
}

impl ToolRecord {
    pub fn new(
        tool: impl Into<String>,
        model: impl Into<String>,
        input: impl Into<String>,
        output: Option<String>,
    ) -> Self {
        let status = if output.is_some() { "completed" } else { "failed" };
        Self {
            id: Uuid::new_v4(),
            tool: tool.into(),
            model: model.into(),
            input: input.into(),
            output,
            status: status.to_string(),
            created: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or_default(),
        }
    }
}

/// Destination for tool results. Callers log insertion failures and move on.
#[async_trait]
pub trait ResultSink: Send + Sync {
    async fn insert(&self, record: ToolRecord) -> anyhow::Result<()>;
}

/// Emits each record as a structured log line.
#[derive(Debug, Clone, Default)]
pub struct TracingSink;

#[async_trait]
impl ResultSink for TracingSink {
    async fn insert(&self, record: ToolRecord) -> anyhow::Result<()> {
        tracing::info!(
            id = %record.id,
            tool = %record.tool,
            model = %record.model,
            status = %record.status,
            input_chars = record.input.chars().count(),
            output_chars = record.output.as_ref().map(|o| o.chars().count()).unwrap_or(0),
            "tool result"
        );
        Ok(())
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<ToolRecord>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<ToolRecord> {
        self.records
            .lock()
            .map(|g| g.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl ResultSink for MemorySink {
    async fn insert(&self, record: ToolRecord) -> anyhow::Result<()> {
        self.records
            .lock()
            .map_err(|_| anyhow::anyhow!("memory sink poisoned"))?
            .push(record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_sink_keeps_records_in_order() {
        let sink = MemorySink::new();
        sink.insert(ToolRecord::new("a", "m", "in", Some("out".into())))
            .await
            .unwrap();
        sink.insert(ToolRecord::new("b", "m", "in", None))
            .await
            .unwrap();

        let records = sink.records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].status, "completed");
        assert_eq!(records[1].tool, "b");
        assert_eq!(records[1].status, "failed");
        assert_ne!(records[0].id, records[1].id);
    }

    #[test]
    fn record_omits_absent_output() {
        let v = serde_json::to_value(ToolRecord::new("a", "m", "in", None)).unwrap();
        assert!(v.get("output").is_none());
    }
}
