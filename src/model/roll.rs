//! Roll numbers arrive either as JSON strings or bare integers; both are stored as text.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoll {
    Text(String),
    Int(i64),
}

impl RawRoll {
    fn into_string(self) -> String {
        match self {
            RawRoll::Text(s) => s,
            RawRoll::Int(n) => n.to_string(),
        }
    }
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawRoll::deserialize(deserializer).map(RawRoll::into_string)
}

pub mod option {
    use super::RawRoll;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Option::<RawRoll>::deserialize(deserializer).map(|r| r.map(RawRoll::into_string))
    }
}
