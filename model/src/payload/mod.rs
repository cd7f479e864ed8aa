use crate::attribute::decode;
use crate::change_record::{Action, ChangeRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body POSTed to the webhook for a single change.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
pub struct NormalizedPayload {
    pub table: String,
    pub action: Action,
    pub data: Value,
    pub metadata: PayloadMetadata,
}

/// `event_id` is the key the mirror deduplicates redelivered changes on.
#[derive(Deserialize, Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PayloadMetadata {
    pub event_id: String,
    pub sequence_number: String,
    pub source_table_name: String,
}

/// Why a record produced no payload. Skipped records are neither delivered nor failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SkipReason {
    #[error("event {event_id}: unsupported event kind \"{event_kind}\"")]
    UnsupportedEventKind { event_id: String, event_kind: String },
    #[error("event {event_id}: record carries neither a new nor an old image")]
    MissingImage { event_id: String },
}

impl NormalizedPayload {
    /// Builds the webhook body for `record`, resolving the destination table through
    /// `map_table`. The new image wins over the old one when both are present.
    pub fn build(
        record: ChangeRecord,
        map_table: impl Fn(&str) -> String,
    ) -> Result<Self, SkipReason> {
        let Some(kind) = record.kind() else {
            return Err(SkipReason::UnsupportedEventKind {
                event_id: record.event_id,
                event_kind: record.event_kind,
            });
        };

        let Some(image) = record.new_image.or(record.old_image) else {
            return Err(SkipReason::MissingImage {
                event_id: record.event_id,
            });
        };

        Ok(NormalizedPayload {
            table: map_table(&record.source_table),
            action: kind.action(),
            data: decode(image),
            metadata: PayloadMetadata {
                event_id: record.event_id,
                sequence_number: record.sequence_number,
                source_table_name: record.source_table,
            },
        })
    }
}
