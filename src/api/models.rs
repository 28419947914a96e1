use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Mail folder a letter lives in.
///
/// Stored as a stable key; localized names some backends emit are folded
/// into the same key when parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Folder {
    Inbox,
    #[default]
    Sent,
    Drafts,
    Trash,
    Other(String),
}

impl Folder {
    /// Name the letter store expects on the wire.
    pub fn wire_name(&self) -> &str {
        match self {
            Self::Inbox => "Inbox",
            Self::Sent => "Sent",
            Self::Drafts => "Drafts",
            Self::Trash => "Trash",
            Self::Other(name) => name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Inbox => "Inbox",
            Self::Sent => "Sent mail",
            Self::Drafts => "Drafts",
            Self::Trash => "Trash",
            Self::Other(name) => name,
        }
    }

    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match trimmed.to_lowercase().as_str() {
            "inbox" | "входящие" => Self::Inbox,
            "sent" | "outbox" | "отправленные" | "отправление" => Self::Sent,
            "drafts" | "draft" | "черновики" => Self::Drafts,
            "trash" | "корзина" => Self::Trash,
            _ => Self::Other(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Folder {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

impl Serialize for Folder {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.wire_name())
    }
}

impl<'de> Deserialize<'de> for Folder {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Letter {
    pub id: i64,
    #[serde(default)]
    pub folder: Folder,
    #[serde(default)]
    pub from_email: String,
    #[serde(default)]
    pub to_email: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub body: String,
    #[serde(
        default,
        serialize_with = "serialize_flag",
        deserialize_with = "deserialize_flag"
    )]
    pub is_read: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

/// Fields accepted when composing a new letter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LetterDraft {
    pub to_email: String,
    pub subject: String,
    pub body: String,
    pub folder: Option<Folder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_flag"
    )]
    pub is_read: Option<bool>,
}

impl LetterDraft {
    pub fn new(
        to_email: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            to_email: to_email.into(),
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn with_folder(mut self, folder: Folder) -> Self {
        self.folder = Some(folder);
        self
    }

    /// Copy with the folder made explicit so the store's echo carries it.
    pub fn resolved(&self) -> Self {
        let mut draft = self.clone();
        draft.folder = Some(draft.folder.unwrap_or_default());
        draft
    }
}

/// The two partial updates a letter supports. One field per call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LetterPatch {
    Read(bool),
    Move(Folder),
}

impl Serialize for LetterPatch {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(1))?;
        match self {
            Self::Read(read) => map.serialize_entry("is_read", read)?,
            Self::Move(folder) => map.serialize_entry("folder", folder)?,
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOutcome {
    pub updated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<u64>,
}

/// Response wrapper every letter endpoint returns.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Read result held by the response cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    Letters(Vec<Letter>),
    Letter(Letter),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MailboxStats {
    pub total: usize,
    pub inbox: usize,
    pub sent: usize,
    pub drafts: usize,
    pub trash: usize,
    pub other: usize,
    pub unread: usize,
}

impl MailboxStats {
    pub fn tally(letters: &[Letter]) -> Self {
        let mut stats = Self {
            total: letters.len(),
            ..Self::default()
        };

        for letter in letters {
            match letter.folder {
                Folder::Inbox => stats.inbox += 1,
                Folder::Sent => stats.sent += 1,
                Folder::Drafts => stats.drafts += 1,
                Folder::Trash => stats.trash += 1,
                Folder::Other(_) => stats.other += 1,
            }
            if !letter.is_read {
                stats.unread += 1;
            }
        }

        stats
    }
}

fn serialize_flag<S: Serializer>(flag: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}

fn serialize_optional_flag<S: Serializer>(
    flag: &Option<bool>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match flag {
        Some(flag) => serialize_flag(flag, serializer),
        None => serializer.serialize_none(),
    }
}

fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    struct FlagVisitor;

    impl Visitor<'_> for FlagVisitor {
        type Value = bool;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a boolean or 0/1")
        }

        fn visit_bool<E: de::Error>(self, value: bool) -> Result<bool, E> {
            Ok(value)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<bool, E> {
            Ok(value != 0)
        }

        fn visit_unit<E: de::Error>(self) -> Result<bool, E> {
            Ok(false)
        }
    }

    deserializer.deserialize_any(FlagVisitor)
}
