//! Single-pair glossary management (`v2/glossaries`).

use serde::Deserialize;
use time::OffsetDateTime;
use tracing::info;

use crate::client::{StatusContext, Translator, check_status, parse_json};
use crate::entries::GlossaryEntries;
use crate::error::{Error, Result};
use crate::http::ApiRequest;
use crate::lang::remove_regional_variant;

/// Metadata about a stored glossary. Entries are fetched separately with
/// [`Translator::get_glossary_entries`].
#[derive(Debug, Clone, Deserialize)]
pub struct GlossaryInfo {
    pub glossary_id: String,
    pub name: String,
    /// Whether the glossary can already be used in translations.
    pub ready: bool,
    pub source_lang: String,
    pub target_lang: String,
    #[serde(with = "time::serde::rfc3339")]
    pub creation_time: OffsetDateTime,
    pub entry_count: u64,
}

/// Identifies a glossary for lookup operations, either by ID string or by a
/// previously fetched info record.
#[derive(Debug, Clone, Copy)]
pub enum GlossaryRef<'a> {
    Id(&'a str),
    Info(&'a GlossaryInfo),
}

impl GlossaryRef<'_> {
    fn id(&self) -> &str {
        match self {
            GlossaryRef::Id(id) => id,
            GlossaryRef::Info(info) => &info.glossary_id,
        }
    }
}

impl<'a> From<&'a str> for GlossaryRef<'a> {
    fn from(id: &'a str) -> Self {
        GlossaryRef::Id(id)
    }
}

impl<'a> From<&'a GlossaryInfo> for GlossaryRef<'a> {
    fn from(info: &'a GlossaryInfo) -> Self {
        GlossaryRef::Info(info)
    }
}

#[derive(Debug, Deserialize)]
struct GlossaryList {
    #[serde(default)]
    glossaries: Vec<GlossaryInfo>,
}

impl Translator {
    /// Creates a glossary for the given language pair. Regional variants are
    /// stripped from the language codes; glossaries are per base language.
    pub async fn create_glossary(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        entries: &GlossaryEntries,
    ) -> Result<GlossaryInfo> {
        if name.is_empty() {
            return Err(Error::Config("glossary name must not be empty".to_string()));
        }
        if entries.is_empty() {
            return Err(Error::Config(
                "glossary must have at least one entry".to_string(),
            ));
        }
        let fields = vec![
            ("name".to_string(), name.to_string()),
            ("source_lang".to_string(), remove_regional_variant(source_lang)),
            ("target_lang".to_string(), remove_regional_variant(target_lang)),
            ("entries".to_string(), entries.to_tsv()),
            ("entries_format".to_string(), "tsv".to_string()),
        ];
        let response = self
            .api_call(ApiRequest::post("v2/glossaries").form(fields))
            .await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        let info: GlossaryInfo = parse_json(&response)?;
        info!(glossary_id = info.glossary_id, name, "glossary created");
        Ok(info)
    }

    /// Creates a glossary from CSV content, e.g. a spreadsheet export. The
    /// CSV is converted client-side so invalid rows fail before any upload.
    pub async fn create_glossary_from_csv(
        &self,
        name: &str,
        source_lang: &str,
        target_lang: &str,
        csv: &str,
    ) -> Result<GlossaryInfo> {
        let entries = GlossaryEntries::from_csv(csv)?;
        self.create_glossary(name, source_lang, target_lang, &entries)
            .await
    }

    /// Retrieves metadata for one glossary.
    pub async fn get_glossary(&self, glossary: GlossaryRef<'_>) -> Result<GlossaryInfo> {
        let request = ApiRequest::get(format!("v2/glossaries/{}", glossary.id()));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        parse_json(&response)
    }

    /// Lists all glossaries on the account.
    pub async fn list_glossaries(&self) -> Result<Vec<GlossaryInfo>> {
        let response = self.api_call(ApiRequest::get("v2/glossaries")).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        let list: GlossaryList = parse_json(&response)?;
        Ok(list.glossaries)
    }

    /// Retrieves the term pairs of a glossary.
    pub async fn get_glossary_entries(
        &self,
        glossary: GlossaryRef<'_>,
    ) -> Result<GlossaryEntries> {
        let request = ApiRequest::get(format!("v2/glossaries/{}/entries", glossary.id()))
            .header("Accept", "text/tab-separated-values");
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        GlossaryEntries::from_tsv(&response.text())
            .map_err(|e| Error::Protocol(format!("malformed glossary entries: {e}")))
    }

    /// Deletes a glossary.
    pub async fn delete_glossary(&self, glossary: GlossaryRef<'_>) -> Result<()> {
        let request = ApiRequest::delete(format!("v2/glossaries/{}", glossary.id()));
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::GLOSSARY)?;
        info!(glossary_id = glossary.id(), "glossary deleted");
        Ok(())
    }
}
