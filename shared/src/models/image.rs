use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Sentinel style value: the client supplies its own style text instead of a preset.
pub const STYLE_OTHER: &str = "other";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StylePreset {
    #[default]
    #[serde(rename = "realistic portrait")]
    RealisticPortrait,
    #[serde(rename = "anime style")]
    Anime,
    #[serde(rename = "cartoon")]
    Cartoon,
    #[serde(rename = "fantasy character")]
    FantasyCharacter,
    #[serde(rename = "oil painting")]
    OilPainting,
    #[serde(rename = "watercolor")]
    Watercolor,
    #[serde(rename = "sketch")]
    Sketch,
    #[serde(rename = "character portrait")]
    CharacterPortrait,
}

impl StylePreset {
    pub const ALL: [StylePreset; 8] = [
        StylePreset::RealisticPortrait,
        StylePreset::Anime,
        StylePreset::Cartoon,
        StylePreset::FantasyCharacter,
        StylePreset::OilPainting,
        StylePreset::Watercolor,
        StylePreset::Sketch,
        StylePreset::CharacterPortrait,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::RealisticPortrait => "realistic portrait",
            StylePreset::Anime => "anime style",
            StylePreset::Cartoon => "cartoon",
            StylePreset::FantasyCharacter => "fantasy character",
            StylePreset::OilPainting => "oil painting",
            StylePreset::Watercolor => "watercolor",
            StylePreset::Sketch => "sketch",
            StylePreset::CharacterPortrait => "character portrait",
        }
    }
}

impl fmt::Display for StylePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StylePreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        StylePreset::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| format!("unknown style preset: '{s}'"))
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GenerateImageRequest {
    pub character_data: super::CharacterSummary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageResult {
    pub image_url: String,
}
