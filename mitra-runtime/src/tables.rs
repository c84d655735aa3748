use mitra_core::record::{InteractionRecord, RecordKind};
use mitra_core::result::ExchangeResult;
use mitra_engine::traits::RecordSink;
use mitra_providers::functions::{FunctionsEndpoint, build_table_insert_request};
use mitra_providers::runtime::{HttpTimeouts, execute_with};
use serde_json::{Value, json};

/// Appends completed interactions to the function platform's tables.
#[derive(Debug, Clone)]
pub struct RemoteTableSink {
    endpoint: FunctionsEndpoint,
    timeouts: HttpTimeouts,
}

impl RemoteTableSink {
    pub fn new(endpoint: FunctionsEndpoint, timeouts: HttpTimeouts) -> Self {
        Self { endpoint, timeouts }
    }
}

/// Row for the record's table. Failed interactions are not stored remotely.
pub fn record_row(record: &InteractionRecord) -> Option<Value> {
    let output = record.output.as_ref()?;
    let row = match (record.kind, output) {
        (RecordKind::Diagnosis, ExchangeResult::Diagnosis(d)) => json!({
            "image_name": record.input,
            "disease_name": d.disease_name,
            "confidence": d.confidence,
            "diagnosis": d,
            "language": record.language,
        }),
        (RecordKind::MarketQuery, ExchangeResult::Market(m)) => json!({
            "crop": m.crop,
            "location": record.location.as_deref().unwrap_or_default(),
            "analysis": m,
        }),
        (RecordKind::VoiceInteraction, ExchangeResult::VoiceAnswer(v)) => json!({
            "transcript": record.input,
            "response": v.text,
            "language": record.language,
        }),
        _ => return None,
    };
    Some(row)
}

#[async_trait::async_trait]
impl RecordSink for RemoteTableSink {
    async fn append(&self, record: &InteractionRecord) -> anyhow::Result<()> {
        let Some(row) = record_row(record) else {
            log::debug!("skipping remote insert for {:?} without output", record.kind);
            return Ok(());
        };

        let table = record.kind.table();
        let req = build_table_insert_request(&self.endpoint, table, &row)?;
        log::debug!("insert row: {:?}", req);

        let resp = execute_with(&req, self.timeouts).await?;
        if !resp.is_success() {
            return Err(anyhow::anyhow!(
                "insert into {table} failed: status={} body={}",
                resp.status,
                resp.body_text()
            ));
        }
        Ok(())
    }
}
