//! Multilingual glossary management (`v3/glossaries`).
//!
//! A multilingual glossary holds several dictionaries, each for one ordered
//! language pair. `(EN, DE)` and `(DE, EN)` are distinct dictionaries that
//! can coexist in one glossary.

use serde::Deserialize;
use serde_json::{Value, json};
use time::OffsetDateTime;
use tracing::info;

use crate::client::{StatusContext, Translator, check_status, parse_json};
use crate::entries::GlossaryEntries;
use crate::error::{Error, Result};
use crate::http::ApiRequest;
use crate::lang::remove_regional_variant;

/// Metadata of one dictionary inside a multilingual glossary.
#[derive(Debug, Clone, Deserialize)]
pub struct GlossaryDictionaryInfo {
    pub source_lang: String,
    pub target_lang: String,
    pub entry_count: u64,
}

/// One dictionary's language pair together with its term pairs, as supplied
/// when creating or updating a glossary.
#[derive(Debug, Clone)]
pub struct GlossaryDictionaryEntries {
    pub source_lang: String,
    pub target_lang: String,
    pub entries: GlossaryEntries,
}

impl GlossaryDictionaryEntries {
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        entries: GlossaryEntries,
    ) -> Self {
        Self {
            source_lang: remove_regional_variant(&source_lang.into()),
            target_lang: remove_regional_variant(&target_lang.into()),
            entries,
        }
    }

    fn to_json(&self) -> Value {
        json!({
            "source_lang": self.source_lang,
            "target_lang": self.target_lang,
            "entries": self.entries.to_tsv(),
            "entries_format": "tsv",
        })
    }
}

/// Metadata about a stored multilingual glossary.
#[derive(Debug, Clone, Deserialize)]
pub struct MultilingualGlossaryInfo {
    pub glossary_id: String,
    pub name: String,
    #[serde(default)]
    pub dictionaries: Vec<GlossaryDictionaryInfo>,
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,
}

/// Identifies a multilingual glossary by ID or info record.
#[derive(Debug, Clone, Copy)]
pub enum MultilingualGlossaryRef<'a> {
    Id(&'a str),
    Info(&'a MultilingualGlossaryInfo),
}

impl MultilingualGlossaryRef<'_> {
    fn id(&self) -> &str {
        match self {
            MultilingualGlossaryRef::Id(id) => id,
            MultilingualGlossaryRef::Info(info) => &info.glossary_id,
        }
    }
}

impl<'a> From<&'a str> for MultilingualGlossaryRef<'a> {
    fn from(id: &'a str) -> Self {
        MultilingualGlossaryRef::Id(id)
    }
}

impl<'a> From<&'a MultilingualGlossaryInfo> for MultilingualGlossaryRef<'a> {
    fn from(info: &'a MultilingualGlossaryInfo) -> Self {
        MultilingualGlossaryRef::Info(info)
    }
}

/// Selects one dictionary within a multilingual glossary by its ordered
/// language pair.
#[derive(Debug, Clone)]
pub struct DictionaryRef {
    source_lang: String,
    target_lang: String,
}

impl DictionaryRef {
    pub fn new(source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_lang: remove_regional_variant(source_lang),
            target_lang: remove_regional_variant(target_lang),
        }
    }

    pub fn source_lang(&self) -> &str {
        &self.source_lang
    }

    pub fn target_lang(&self) -> &str {
        &self.target_lang
    }
}

impl From<&GlossaryDictionaryInfo> for DictionaryRef {
    fn from(info: &GlossaryDictionaryInfo) -> Self {
        Self::new(&info.source_lang, &info.target_lang)
    }
}

impl From<(&str, &str)> for DictionaryRef {
    fn from((source, target): (&str, &str)) -> Self {
        Self::new(source, target)
    }
}

#[derive(Debug, Deserialize)]
struct MultilingualGlossaryList {
    #[serde(default)]
    glossaries: Vec<MultilingualGlossaryInfo>,
}

#[derive(Debug, Deserialize)]
struct DictionaryEntriesResponse {
    dictionaries: Vec<DictionaryEntriesItem>,
}

#[derive(Debug, Deserialize)]
struct DictionaryEntriesItem {
    entries: String,
}

impl Translator {
    /// Creates a multilingual glossary with the given dictionaries.
    pub async fn create_multilingual_glossary(
        &self,
        name: &str,
        dictionaries: &[GlossaryDictionaryEntries],
    ) -> Result<MultilingualGlossaryInfo> {
        if name.is_empty() {
            return Err(Error::Config("glossary name must not be empty".to_string()));
        }
        if dictionaries.is_empty() {
            return Err(Error::Config(
                "glossary must have at least one dictionary".to_string(),
            ));
        }
        for dictionary in dictionaries {
            if dictionary.entries.is_empty() {
                return Err(Error::Config(format!(
                    "dictionary {}->{} must have at least one entry",
                    dictionary.source_lang, dictionary.target_lang
                )));
            }
        }
        let body = json!({
            "name": name,
            "dictionaries": dictionaries.iter().map(GlossaryDictionaryEntries::to_json)
                .collect::<Vec<_>>(),
        });
        let response = self
            .api_call(ApiRequest::post("v3/glossaries").json(body))
            .await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        let created: MultilingualGlossaryInfo = parse_json(&response)?;
        info!(glossary_id = created.glossary_id, name, "multilingual glossary created");
        Ok(created)
    }

    /// Creates a multilingual glossary with one dictionary parsed from CSV.
    pub async fn create_multilingual_glossary_from_csv(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        csv: &str,
    ) -> Result<MultilingualGlossaryInfo> {
        let entries = GlossaryEntries::from_csv(csv)?;
        let dictionary = GlossaryDictionaryEntries::new(source_lang, target_lang, entries);
        self.create_multilingual_glossary(name, &[dictionary]).await
    }

    /// Retrieves metadata for one multilingual glossary.
    pub async fn get_multilingual_glossary(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
    ) -> Result<MultilingualGlossaryInfo> {
        let request = ApiRequest::get(format!("v3/glossaries/{}", glossary.id()));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        parse_json(&response)
    }

    /// Lists all multilingual glossaries on the account.
    pub async fn list_multilingual_glossaries(&self) -> Result<Vec<MultilingualGlossaryInfo>> {
        let response = self.api_call(ApiRequest::get("v3/glossaries")).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        let list: MultilingualGlossaryList = parse_json(&response)?;
        Ok(list.glossaries)
    }

    /// Retrieves the term pairs of one dictionary.
    pub async fn get_multilingual_glossary_entries(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        dictionary: &DictionaryRef,
    ) -> Result<GlossaryEntries> {
        let request = ApiRequest::get(format!("v3/glossaries/{}/entries", glossary.id()))
            .query("source_lang", dictionary.source_lang())
            .query("target_lang", dictionary.target_lang());
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        let parsed: DictionaryEntriesResponse = parse_json(&response)?;
        let [item] = parsed.dictionaries.as_slice() else {
            return Err(Error::Protocol(format!(
                "expected one dictionary in response, got {}",
                parsed.dictionaries.len()
            )));
        };
        GlossaryEntries::from_tsv(&item.entries)
            .map_err(|e| Error::Protocol(format!("malformed glossary entries: {e}")))
    }

    /// Merges the given entries into one dictionary: existing source terms
    /// are overwritten, other terms are kept, and a dictionary for a new
    /// language pair is added to the glossary.
    pub async fn update_multilingual_glossary_dictionary(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        dictionary: &GlossaryDictionaryEntries,
    ) -> Result<MultilingualGlossaryInfo> {
        let body = json!({"dictionaries": [dictionary.to_json()]});
        let request = ApiRequest::patch(format!("v3/glossaries/{}", glossary.id())).json(body);
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        parse_json(&response)
    }

    /// CSV variant of
    /// [`update_multilingual_glossary_dictionary`](Self::update_multilingual_glossary_dictionary).
    pub async fn update_multilingual_glossary_dictionary_from_csv(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        source_lang: &str,
        target_lang: &str,
        csv: &str,
    ) -> Result<MultilingualGlossaryInfo> {
        let entries = GlossaryEntries::from_csv(csv)?;
        let dictionary = GlossaryDictionaryEntries::new(source_lang, target_lang, entries);
        self.update_multilingual_glossary_dictionary(glossary, &dictionary)
            .await
    }

    /// Renames a multilingual glossary.
    pub async fn update_multilingual_glossary_name(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        name: &str,
    ) -> Result<MultilingualGlossaryInfo> {
        if name.is_empty() {
            return Err(Error::Config("glossary name must not be empty".to_string()));
        }
        let request = ApiRequest::patch(format!("v3/glossaries/{}", glossary.id()))
            .json(json!({"name": name}));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        parse_json(&response)
    }

    /// Replaces one dictionary wholesale: terms absent from the new entries
    /// are removed. A dictionary for a new language pair is created.
    pub async fn replace_multilingual_glossary_dictionary(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        dictionary: &GlossaryDictionaryEntries,
    ) -> Result<GlossaryDictionaryInfo> {
        let request = ApiRequest::put(format!("v3/glossaries/{}/dictionaries", glossary.id()))
            .json(dictionary.to_json());
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        parse_json(&response)
    }

    /// CSV variant of
    /// [`replace_multilingual_glossary_dictionary`](Self::replace_multilingual_glossary_dictionary).
    pub async fn replace_multilingual_glossary_dictionary_from_csv(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        source_lang: &str,
        target_lang: &str,
        csv: &str,
    ) -> Result<GlossaryDictionaryInfo> {
        let entries = GlossaryEntries::from_csv(csv)?;
        let dictionary = GlossaryDictionaryEntries::new(source_lang, target_lang, entries);
        self.replace_multilingual_glossary_dictionary(glossary, &dictionary)
            .await
    }

    /// Deletes a multilingual glossary and all of its dictionaries.
    pub async fn delete_multilingual_glossary(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
    ) -> Result<()> {
        let request = ApiRequest::delete(format!("v3/glossaries/{}", glossary.id()));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        info!(glossary_id = glossary.id(), "multilingual glossary deleted");
        Ok(())
    }

    /// Deletes one dictionary from a multilingual glossary; the other
    /// dictionaries are untouched.
    pub async fn delete_multilingual_glossary_dictionary(
        &self,
        glossary: MultilingualGlossaryRef<'_>,
        dictionary: &DictionaryRef,
    ) -> Result<()> {
        let request =
            ApiRequest::delete(format!("v3/glossaries/{}/dictionaries", glossary.id()))
                .query("source_lang", dictionary.source_lang())
                .query("target_lang", dictionary.target_lang());
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        Ok(())
    }
}
