//! Character generation: prompt the language model, recover the JSON object
//! from whatever it answered, and validate it into a [`Character`].

use crate::error::GenerationError;
use crate::openai::LanguageModel;
use serde_json::{Map, Value};
use shared::models::{Character, ConversationExchange};
use std::sync::Arc;

const REQUIRED_FIELDS: [&str; 7] = [
    "name",
    "title",
    "persona",
    "relationship",
    "greeting",
    "scenario",
    "exampleConversation",
];

#[derive(Clone)]
pub struct CharacterGenerator {
    model: Arc<dyn LanguageModel>,
}

impl CharacterGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn generate(
        &self,
        description: &str,
        relationship: &str,
    ) -> Result<Character, GenerationError> {
        self.generate_with_context(description, relationship, None)
            .await
    }

    /// Like [`generate`](Self::generate), with extra reference material for the
    /// prompt. The context never leaks into `originalDescription`.
    pub async fn generate_with_context(
        &self,
        description: &str,
        relationship: &str,
        context: Option<&str>,
    ) -> Result<Character, GenerationError> {
        let prompt = build_prompt(description, relationship, context);
        tracing::debug!(prompt_chars = prompt.chars().count(), "Prompting language model");

        let raw = self.model.complete(&prompt).await?;
        let character = parse_character(&raw, description, relationship)?;
        tracing::info!(name = %character.name, exchanges = character.example_conversation.len(), "Character generated");
        Ok(character)
    }
}

pub fn build_prompt(description: &str, relationship: &str, context: Option<&str>) -> String {
    let mut prompt = String::from(
        "You are a character designer for an AI roleplay chat platform. \
         Create one original, vivid character from the description below.\n\n",
    );
    prompt.push_str(&format!("Description: {}\n", description.trim()));
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("\nAdditional context from URL: {context}\n"));
    }
    prompt.push_str(&format!(
        "\nThe character's relationship to the user is: \"{relationship}\". \
         Copy this text into the \"relationship\" field exactly as written, without rewording it.\n"
    ));
    prompt.push_str(
        "\nName the character something distinctive. Avoid stock or overused names \
         (for example Luna, Aria, Elara, Kai, Alex, Jack, Sarah) and do not reuse a name \
         just because it is common for this kind of character.\n\
         \nFields:\n\
         - name: the character's full name\n\
         - title: a short, catchy title\n\
         - persona: personality, background, knowledge and quirks in detail\n\
         - relationship: the relationship text given above, unchanged\n\
         - greeting: the first message the character sends to the user, in character\n\
         - scenario: the setting in which the conversation takes place\n\
         - exampleConversation: at least 3 exchanges, each an object with a \"user\" message \
         and the \"character\" reply\n\
         \nRespond with a single JSON object and nothing else, using exactly these keys:\n\
         {\n\
         \x20 \"name\": \"\",\n\
         \x20 \"title\": \"\",\n\
         \x20 \"persona\": \"\",\n\
         \x20 \"relationship\": \"\",\n\
         \x20 \"greeting\": \"\",\n\
         \x20 \"scenario\": \"\",\n\
         \x20 \"exampleConversation\": [{\"user\": \"\", \"character\": \"\"}]\n\
         }\n",
    );
    prompt
}

/// Finds the first `{` and returns the slice up to its balancing `}`.
///
/// Braces inside JSON string literals are ignored, so nested objects and
/// values such as `"a } in text"` do not end the scan early.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Turns raw model output into a validated character.
///
/// Checks run in a fixed order: every required field present and non-empty,
/// then `exampleConversation` is an array, then every exchange has both sides.
pub fn parse_character(
    raw: &str,
    original_description: &str,
    relationship: &str,
) -> Result<Character, GenerationError> {
    let json = extract_json_object(raw).ok_or(GenerationError::NoJson)?;
    let value: Value = serde_json::from_str(json)?;
    let object = value.as_object().ok_or(GenerationError::NoJson)?;

    for field in REQUIRED_FIELDS {
        if !is_filled(object.get(field)) {
            return Err(GenerationError::MissingField(field));
        }
    }

    let Some(Value::Array(items)) = object.get("exampleConversation") else {
        return Err(GenerationError::NotAnArray);
    };
    let example_conversation = items
        .iter()
        .map(exchange)
        .collect::<Option<Vec<_>>>()
        .ok_or(GenerationError::EmptyMessages)?;

    Ok(Character {
        name: text(object, "name")?,
        title: text(object, "title")?,
        persona: text(object, "persona")?,
        // The caller's label wins over whatever wording the model chose.
        relationship: relationship.to_string(),
        greeting: text(object, "greeting")?,
        scenario: text(object, "scenario")?,
        example_conversation,
        original_description: original_description.to_string(),
    })
}

fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.trim().is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
        Some(Value::Bool(_)) | Some(Value::Number(_)) => true,
    }
}

fn text(object: &Map<String, Value>, field: &'static str) -> Result<String, GenerationError> {
    object
        .get(field)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(GenerationError::MissingField(field))
}

fn exchange(item: &Value) -> Option<ConversationExchange> {
    let user = item.get("user")?.as_str()?;
    let character = item.get("character")?.as_str()?;
    let exchange = ConversationExchange::new(user.trim(), character.trim());
    exchange.is_complete().then_some(exchange)
}
