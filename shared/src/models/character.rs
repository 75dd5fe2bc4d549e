use serde::{Deserialize, Serialize};

/// One user/character message pair of the example dialogue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationExchange {
    pub user: String,
    pub character: String,
}

impl ConversationExchange {
    pub fn new(user: impl Into<String>, character: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            character: character.into(),
        }
    }

    /// Both sides carry text once surrounding whitespace is stripped.
    pub fn is_complete(&self) -> bool {
        !self.user.trim().is_empty() && !self.character.trim().is_empty()
    }
}

/// A generated character, ready for export.
///
/// The server hands this to the client and forgets it; the client sends the
/// summary fields back when it asks for an avatar.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Character {
    pub name: String,
    pub title: String,
    pub persona: String,
    pub relationship: String,
    pub greeting: String,
    pub scenario: String,
    pub example_conversation: Vec<ConversationExchange>,
    /// The description exactly as the user typed it, without URL enrichment.
    pub original_description: String,
}

/// The subset of a character the image endpoint needs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSummary {
    pub name: String,
    pub title: String,
    /// Persona text, or whatever detail the client wants emphasised instead.
    pub persona: String,
    #[serde(default)]
    pub original_description: String,
}

// Request payloads
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct GenerateCharacterRequest {
    pub description: String,
    pub relationship: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ExtractCharacterRequest {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationship: Option<String>,
}
