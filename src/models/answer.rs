use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire value used for a question without a committed answer.
const UNANSWERED_WIRE: i64 = -1;

/// The committed (or pending) answer for one question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Answer {
    #[default]
    Unanswered,
    Selected(usize),
}

impl Answer {
    pub fn is_answered(self) -> bool {
        matches!(self, Answer::Selected(_))
    }

    pub fn index(self) -> Option<usize> {
        match self {
            Answer::Selected(index) => Some(index),
            Answer::Unanswered => None,
        }
    }
}

impl From<Option<usize>> for Answer {
    fn from(value: Option<usize>) -> Self {
        value.map_or(Answer::Unanswered, Answer::Selected)
    }
}

impl Serialize for Answer {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Answer::Selected(index) => serializer.serialize_u64(*index as u64),
            Answer::Unanswered => serializer.serialize_i64(UNANSWERED_WIRE),
        }
    }
}

impl<'de> Deserialize<'de> for Answer {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i64::deserialize(deserializer)?;
        Ok(usize::try_from(raw).map_or(Answer::Unanswered, Answer::Selected))
    }
}
