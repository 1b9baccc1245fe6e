//! Text translation and rephrasing.

use serde::Deserialize;
use serde_json::json;

use crate::client::{StatusContext, Translator, check_status, language_fields, parse_json};
use crate::error::{Error, Result};
use crate::glossary::GlossaryInfo;
use crate::http::ApiRequest;
use crate::lang::{Formality, ModelType, SplitSentences, TagHandling};

/// Optional parameters for [`Translator::translate_text`].
#[derive(Debug, Clone, Default)]
pub struct TextOptions {
    pub source_lang: Option<String>,
    pub split_sentences: Option<SplitSentences>,
    pub preserve_formatting: bool,
    pub formality: Option<Formality>,
    pub context: Option<String>,
    pub model_type: Option<ModelType>,
    pub glossary: Option<TextGlossary>,
    pub tag_handling: Option<TagHandling>,
    pub outline_detection: Option<bool>,
    pub non_splitting_tags: Vec<String>,
    pub splitting_tags: Vec<String>,
    pub ignore_tags: Vec<String>,
}

/// Glossary selector for a text translation: either a bare ID, or the full
/// info record which additionally enables client-side language validation.
#[derive(Debug, Clone)]
pub enum TextGlossary {
    Id(String),
    Info(GlossaryInfo),
}

impl TextGlossary {
    pub fn id(&self) -> &str {
        match self {
            TextGlossary::Id(id) => id,
            TextGlossary::Info(info) => &info.glossary_id,
        }
    }
}

impl From<&GlossaryInfo> for TextGlossary {
    fn from(info: &GlossaryInfo) -> Self {
        TextGlossary::Info(info.clone())
    }
}

/// One translated text with its detection and billing metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct TextResult {
    pub text: String,
    #[serde(rename = "detected_source_language")]
    pub detected_source_lang: String,
    #[serde(default)]
    pub billed_characters: u64,
    #[serde(default)]
    pub model_type_used: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TextResult>,
}

/// Optional parameters for [`Translator::rephrase_text`].
///
/// `style` and `tone` are mutually exclusive.
#[derive(Debug, Clone, Default)]
pub struct RephraseOptions {
    /// Language variant the improved text should be in; must match the
    /// detected source language apart from the regional variant.
    pub target_lang: Option<String>,
    pub style: Option<String>,
    pub tone: Option<String>,
}

/// One rephrased text with its detection metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct RephraseResult {
    pub text: String,
    #[serde(rename = "detected_source_language")]
    pub detected_source_lang: String,
    #[serde(rename = "target_language", default)]
    pub target_lang: String,
}

#[derive(Debug, Deserialize)]
struct RephraseResponse {
    #[serde(default)]
    improvements: Vec<RephraseResult>,
}

impl Translator {
    /// Translates the given texts into `target_lang`.
    ///
    /// Returns one result per input text, in input order.
    pub async fn translate_text(
        &self,
        texts: &[impl AsRef<str>],
        target_lang: &str,
        options: &TextOptions,
    ) -> Result<Vec<TextResult>> {
        if texts.is_empty() {
            return Err(Error::Config("texts must not be empty".to_string()));
        }
        if texts.iter().any(|text| text.as_ref().is_empty()) {
            return Err(Error::Config(
                "texts must not contain empty strings".to_string(),
            ));
        }

        let mut fields = language_fields(
            options.source_lang.as_deref(),
            target_lang,
            options.formality,
            options.glossary.as_ref(),
        )?;
        for text in texts {
            fields.push(("text".to_string(), text.as_ref().to_string()));
        }
        fields.push(("show_billed_characters".to_string(), "1".to_string()));
        if let Some(split) = options.split_sentences {
            fields.push(("split_sentences".to_string(), split.to_string()));
        }
        if options.preserve_formatting {
            fields.push(("preserve_formatting".to_string(), "1".to_string()));
        }
        if let Some(context) = &options.context {
            fields.push(("context".to_string(), context.clone()));
        }
        if let Some(model_type) = options.model_type {
            fields.push(("model_type".to_string(), model_type.to_string()));
        }
        if let Some(tag_handling) = options.tag_handling {
            fields.push(("tag_handling".to_string(), tag_handling.to_string()));
        }
        if let Some(outline) = options.outline_detection {
            fields.push(("outline_detection".to_string(), outline.to_string()));
        }
        push_tag_list(&mut fields, "non_splitting_tags", &options.non_splitting_tags);
        push_tag_list(&mut fields, "splitting_tags", &options.splitting_tags);
        push_tag_list(&mut fields, "ignore_tags", &options.ignore_tags);

        let response = self
            .api_call(ApiRequest::post("v2/translate").form(fields))
            .await?;
        check_status(&response, StatusContext::DEFAULT)?;
        let parsed: TranslateResponse = parse_json(&response)?;

        if parsed.translations.len() != texts.len() {
            return Err(Error::Protocol(format!(
                "expected {} translations in response, got {}",
                texts.len(),
                parsed.translations.len()
            )));
        }
        Ok(parsed.translations)
    }

    /// Translates texts using the given glossary. The source and target
    /// languages are taken from the glossary itself; a bare `EN` target is
    /// upgraded to `EN-GB`.
    pub async fn translate_text_with_glossary(
        &self,
        texts: &[impl AsRef<str>],
        glossary: &GlossaryInfo,
        options: &TextOptions,
    ) -> Result<Vec<TextResult>> {
        let target_lang = match glossary.target_lang.as_str() {
            "EN" => "EN-GB".to_string(),
            other => other.to_string(),
        };
        let options = TextOptions {
            source_lang: Some(glossary.source_lang.clone()),
            glossary: Some(TextGlossary::Info(glossary.clone())),
            ..options.clone()
        };
        self.translate_text(texts, &target_lang, &options).await
    }

    /// Improves the given texts, optionally converting them to a variant of
    /// `target_lang`.
    ///
    /// Returns one improvement per input text, in input order.
    pub async fn rephrase_text(
        &self,
        texts: &[impl AsRef<str>],
        options: &RephraseOptions,
    ) -> Result<Vec<RephraseResult>> {
        if texts.is_empty() {
            return Err(Error::Config("texts must not be empty".to_string()));
        }
        if texts.iter().any(|text| text.as_ref().is_empty()) {
            return Err(Error::Config(
                "texts must not contain empty strings".to_string(),
            ));
        }
        if options.style.is_some() && options.tone.is_some() {
            return Err(Error::Config(
                "style and tone are mutually exclusive".to_string(),
            ));
        }

        let mut body = json!({
            "text": texts.iter().map(AsRef::as_ref).collect::<Vec<_>>(),
        });
        if let Some(target_lang) = &options.target_lang {
            body["target_lang"] = json!(target_lang.to_uppercase());
        }
        if let Some(style) = &options.style {
            body["writing_style"] = json!(style);
        }
        if let Some(tone) = &options.tone {
            body["tone"] = json!(tone);
        }

        let response = self
            .api_call(ApiRequest::post("v2/write/rephrase").json(body))
            .await?;
        check_status(&response, StatusContext::DEFAULT)?;
        let parsed: RephraseResponse = parse_json(&response)?;

        if parsed.improvements.len() != texts.len() {
            return Err(Error::Protocol(format!(
                "expected {} improvements in response, got {}",
                texts.len(),
                parsed.improvements.len()
            )));
        }
        Ok(parsed.improvements)
    }
}

/// Tag lists are sent as a single comma-joined field.
fn push_tag_list(fields: &mut Vec<(String, String)>, name: &'static str, tags: &[String]) {
    if !tags.is_empty() {
        fields.push((name.to_string(), tags.join(",")));
    }
}
