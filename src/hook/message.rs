//! Chat message payloads as the host sends them

use serde::{Deserialize, Serialize};

/// Chat message style. The host sends either the name or its numeric code;
/// codes 4 and 5 are the legacy whisper and roll types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "StyleRepr", rename_all = "lowercase")]
pub enum MessageStyle {
    #[default]
    Other,
    Ooc,
    Ic,
    Emote,
    Whisper,
    Roll,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StyleRepr {
    Code(u8),
    Name(String),
}

impl TryFrom<StyleRepr> for MessageStyle {
    type Error = String;

    fn try_from(repr: StyleRepr) -> Result<Self, Self::Error> {
        match repr {
            StyleRepr::Code(0) => Ok(Self::Other),
            StyleRepr::Code(1) => Ok(Self::Ooc),
            StyleRepr::Code(2) => Ok(Self::Ic),
            StyleRepr::Code(3) => Ok(Self::Emote),
            StyleRepr::Code(4) => Ok(Self::Whisper),
            StyleRepr::Code(5) => Ok(Self::Roll),
            StyleRepr::Code(n) => Err(format!("unknown message style code {}", n)),
            StyleRepr::Name(name) => match name.to_lowercase().as_str() {
                "other" => Ok(Self::Other),
                "ooc" => Ok(Self::Ooc),
                "ic" => Ok(Self::Ic),
                "emote" => Ok(Self::Emote),
                "whisper" => Ok(Self::Whisper),
                "roll" => Ok(Self::Roll),
                _ => Err(format!("unknown message style '{}'", name)),
            },
        }
    }
}

/// Who the message is attributed to
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Speaker {
    pub actor: Option<String>,
    pub alias: Option<String>,
}

/// A chat message about to be created
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ChatMessage {
    pub content: String,
    pub style: MessageStyle,
    pub speaker: Speaker,
    /// Recipient user ids; non-empty means whisper
    pub whisper: Vec<String>,
    pub rolls: Vec<serde_json::Value>,
}

impl ChatMessage {
    pub fn is_roll(&self) -> bool {
        !self.rolls.is_empty() || self.style == MessageStyle::Roll
    }

    pub fn is_whisper(&self) -> bool {
        !self.whisper.is_empty() || self.style == MessageStyle::Whisper
    }

    /// A plain spoken line attributed to a character
    pub fn is_in_character(&self) -> bool {
        self.style == MessageStyle::Ic && !self.is_roll() && !self.is_whisper()
    }
}

/// Arguments of the host's `preCreateChatMessage(message, data, options, userId)`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PreCreateRequest {
    pub message: ChatMessage,

    #[serde(default)]
    pub data: serde_json::Value,

    #[serde(default)]
    pub options: serde_json::Value,

    /// The submitting user
    #[serde(alias = "userId")]
    pub user_id: String,
}
