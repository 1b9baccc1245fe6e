//! Language metadata and translation option enums.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::error::Error;

/// A language supported by the translation API.
///
/// `supports_formality` is only populated for target languages.
#[derive(Debug, Clone, Deserialize)]
pub struct Language {
    #[serde(rename = "language")]
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub supports_formality: Option<bool>,
}

/// A `(source, target)` pair supported for glossaries. Pair identity is
/// ordered: `(EN, DE)` and `(DE, EN)` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GlossaryLanguagePair {
    pub source_lang: String,
    pub target_lang: String,
}

/// Removes the regional variant from a language code, e.g. `EN-US` gives `EN`.
pub fn remove_regional_variant(code: &str) -> String {
    code.to_uppercase().chars().take(2).collect()
}

/// Desired formality of the translated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formality {
    Less,
    Default,
    More,
    /// Formal if the target language supports formality, default otherwise.
    PreferMore,
    /// Informal if the target language supports formality, default otherwise.
    PreferLess,
}

impl fmt::Display for Formality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Formality::Less => "less",
            Formality::Default => "default",
            Formality::More => "more",
            Formality::PreferMore => "prefer_more",
            Formality::PreferLess => "prefer_less",
        })
    }
}

impl FromStr for Formality {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "less" => Ok(Formality::Less),
            "default" => Ok(Formality::Default),
            "more" => Ok(Formality::More),
            "prefer_more" => Ok(Formality::PreferMore),
            "prefer_less" => Ok(Formality::PreferLess),
            other => Err(Error::Config(format!("unknown formality: {other}"))),
        }
    }
}

/// Controls how the engine splits input into sentences before translating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitSentences {
    /// No splitting; the whole input is one sentence.
    Off,
    /// Split on punctuation and newlines (server default).
    All,
    /// Split on punctuation only.
    NoNewlines,
}

impl fmt::Display for SplitSentences {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SplitSentences::Off => "0",
            SplitSentences::All => "1",
            SplitSentences::NoNewlines => "nonewlines",
        })
    }
}

/// Which model family should perform the translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelType {
    QualityOptimized,
    PreferQualityOptimized,
    LatencyOptimized,
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ModelType::QualityOptimized => "quality_optimized",
            ModelType::PreferQualityOptimized => "prefer_quality_optimized",
            ModelType::LatencyOptimized => "latency_optimized",
        })
    }
}

/// Markup flavour for tag handling during text translation. The actual tag
/// processing happens server-side; the client only passes the flag through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagHandling {
    Xml,
    Html,
}

impl fmt::Display for TagHandling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TagHandling::Xml => "xml",
            TagHandling::Html => "html",
        })
    }
}
