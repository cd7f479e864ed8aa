use model::attribute::Item;
use model::change_record::ChangeRecord;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
#[serde(rename_all(deserialize = "PascalCase"))]
pub struct DynamoDbStreamEvent {
    #[serde(default)]
    pub records: Vec<DynamoDbStreamEventData>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct DynamoDbStreamEventData {
    #[serde(rename(deserialize = "eventID"), default)]
    pub event_id: String,
    #[serde(default)]
    pub event_name: String,
    #[serde(rename(deserialize = "eventSourceARN"), default)]
    pub event_source_arn: String,
    #[serde(default)]
    pub dynamodb: DynamoDbEvent,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all(deserialize = "PascalCase"))]
pub struct DynamoDbEvent {
    #[serde(default)]
    pub sequence_number: String,
    pub new_image: Option<Item>,
    pub old_image: Option<Item>,
}

impl From<DynamoDbStreamEventData> for ChangeRecord {
    fn from(event: DynamoDbStreamEventData) -> Self {
        ChangeRecord {
            event_id: event.event_id,
            sequence_number: event.dynamodb.sequence_number,
            source_table: table_name_from_arn(&event.event_source_arn),
            event_kind: event.event_name,
            new_image: event.dynamodb.new_image,
            old_image: event.dynamodb.old_image,
        }
    }
}

/// `arn:aws:dynamodb:<region>:<account>:table/<name>/stream/<label>` -> `<name>`.
/// Anything else is returned whole.
fn table_name_from_arn(arn: &str) -> String {
    arn.split_once(":table/")
        .and_then(|(_, rest)| rest.split('/').next())
        .filter(|name| !name.is_empty())
        .unwrap_or(arn)
        .to_owned()
}
