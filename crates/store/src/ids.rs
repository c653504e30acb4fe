use std::fmt;
use std::str::FromStr;

use snafu::ResultExt;
use uuid::Uuid;

use super::error::{InvalidIdSnafu, StoreError, StoreResult};

/// Time-ordered message identifier; doubles as the feed reconciliation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new_v7() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn parse(raw: &str) -> StoreResult<Self> {
        let parsed = Uuid::parse_str(raw).context(InvalidIdSnafu {
            stage: "parse-message-id",
            raw: raw.to_string(),
        })?;
        Ok(Self(parsed))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<Uuid> for MessageId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl FromStr for MessageId {
    type Err = StoreError;

    fn from_str(raw: &str) -> StoreResult<Self> {
        Self::parse(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse_agree() {
        let id = MessageId::new_v7();
        let parsed: MessageId = id.to_string().parse().expect("round trip");
        assert_eq!(parsed, id);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(
            MessageId::parse("not-a-uuid"),
            Err(StoreError::InvalidId { .. })
        ));
    }
}
