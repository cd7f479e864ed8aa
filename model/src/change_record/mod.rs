use crate::attribute::Item;
use anyhow::anyhow;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Display, Formatter},
    str::FromStr,
};

/// Kind of mutation recorded in the change log.
#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    Insert,
    Modify,
    Remove,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Insert => "INSERT",
            EventKind::Modify => "MODIFY",
            EventKind::Remove => "REMOVE",
        }
    }

    /// The write the mirror has to apply for this kind of change.
    pub fn action(&self) -> Action {
        match self {
            EventKind::Insert => Action::Insert,
            EventKind::Modify => Action::Update,
            EventKind::Remove => Action::Delete,
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(EventKind::Insert),
            "MODIFY" => Ok(EventKind::Modify),
            "REMOVE" => Ok(EventKind::Remove),
            other => Err(anyhow!("Not supported EventKind variant: {other}")),
        }
    }
}

#[derive(Deserialize, Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Insert,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Insert => "INSERT",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row-level mutation read from a shard.
///
/// `event_kind` keeps the raw event name: kinds the relay does not forward are skipped when
/// the payload is built, not rejected while the batch is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRecord {
    pub event_id: String,
    pub sequence_number: String,
    pub source_table: String,
    pub event_kind: String,
    pub new_image: Option<Item>,
    pub old_image: Option<Item>,
}

impl ChangeRecord {
    pub fn kind(&self) -> Option<EventKind> {
        self.event_kind.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{Action, ChangeRecord, EventKind};
    use rstest::rstest;

    #[rstest]
    #[case(EventKind::Insert, Action::Insert)]
    #[case(EventKind::Modify, Action::Update)]
    #[case(EventKind::Remove, Action::Delete)]
    fn event_kinds_map_to_actions(#[case] kind: EventKind, #[case] action: Action) {
        assert_eq!(action, kind.action());
    }

    #[rstest]
    #[case("INSERT", Some(EventKind::Insert))]
    #[case("MODIFY", Some(EventKind::Modify))]
    #[case("REMOVE", Some(EventKind::Remove))]
    #[case("insert", None)]
    #[case("TTL_EXPIRE", None)]
    #[case("", None)]
    fn only_exact_event_names_are_supported(
        #[case] event_name: &str,
        #[case] expected: Option<EventKind>,
    ) {
        let record = ChangeRecord {
            event_id: "1".to_owned(),
            sequence_number: "100".to_owned(),
            source_table: "visitors".to_owned(),
            event_kind: event_name.to_owned(),
            new_image: None,
            old_image: None,
        };

        assert_eq!(expected, record.kind());
    }

    #[test]
    fn actions_serialize_in_upper_case() {
        assert_eq!(
            "\"UPDATE\"",
            serde_json::to_string(&Action::Update).unwrap()
        );
    }
}
