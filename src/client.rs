//! The `Translator` client: construction, request plumbing and the usage and
//! language resources. Text, document and glossary operations live in their
//! own modules and share the helpers defined here.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::http::{ApiRequest, ApiResponse, RequestExecutor};
use crate::lang::{Formality, GlossaryLanguagePair, Language, remove_regional_variant};
use crate::options::TranslatorOptions;
use crate::text::TextGlossary;

/// Base URL used for regular accounts.
pub const SERVER_URL: &str = "https://api.lingo-translate.com";

/// Base URL used for free-plan accounts.
pub const SERVER_URL_FREE: &str = "https://api-free.lingo-translate.com";

/// Status code the API uses to signal that the usage quota for the billing
/// period has been reached.
const HTTP_STATUS_QUOTA_EXCEEDED: u16 = 456;

/// Returns true if the given key belongs to a free-plan account.
pub fn key_is_free_account(auth_key: &str) -> bool {
    auth_key.ends_with(":fx")
}

/// Client for the translation API.
///
/// Cheap to clone; all configuration is fixed at construction, so one
/// instance can serve concurrent operations without external locking.
#[derive(Debug, Clone)]
pub struct Translator {
    executor: Arc<RequestExecutor>,
}

impl Translator {
    /// Creates a client for the given authentication key.
    ///
    /// Unless `options.server_url` is set, the base URL is chosen from the
    /// key's account plan.
    pub fn new(auth_key: &str, options: TranslatorOptions) -> Result<Self> {
        if auth_key.is_empty() {
            return Err(Error::Config("auth_key must not be empty".to_string()));
        }
        let server_url = match &options.server_url {
            Some(url) => url.clone(),
            None if key_is_free_account(auth_key) => SERVER_URL_FREE.to_string(),
            None => SERVER_URL.to_string(),
        };
        let executor = RequestExecutor::new(auth_key, server_url, &options)?;
        Ok(Self {
            executor: Arc::new(executor),
        })
    }

    pub fn server_url(&self) -> &str {
        self.executor.server_url()
    }

    pub(crate) async fn api_call(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.executor.execute(&request).await
    }

    /// Requests the current API usage.
    pub async fn get_usage(&self) -> Result<Usage> {
        let response = self.api_call(ApiRequest::get("v2/usage")).await?;
        check_status(&response, StatusContext::DEFAULT)?;
        let raw: RawUsage = parse_json(&response)?;
        Ok(Usage::from_raw(raw))
    }

    /// Requests the list of available source languages.
    pub async fn get_source_languages(&self) -> Result<Vec<Language>> {
        let response = self.api_call(ApiRequest::get("v2/languages")).await?;
        check_status(&response, StatusContext::DEFAULT)?;
        parse_json(&response)
    }

    /// Requests the list of available target languages, including whether
    /// each supports the formality option.
    pub async fn get_target_languages(&self) -> Result<Vec<Language>> {
        let request = ApiRequest::get("v2/languages").query("type", "target");
        let response = self.api_call(request).await?;
        check_status(&response, StatusContext::DEFAULT)?;
        parse_json(&response)
    }

    /// Requests the list of language pairs supported for glossaries. Always
    /// queried fresh; results are not cached client-side.
    pub async fn get_glossary_languages(&self) -> Result<Vec<GlossaryLanguagePair>> {
        #[derive(Deserialize)]
        struct SupportedLanguages {
            #[serde(default)]
            supported_languages: Vec<GlossaryLanguagePair>,
        }

        let response = self
            .api_call(ApiRequest::get("v2/glossary-language-pairs"))
            .await?;
        check_status(&response, StatusContext::DEFAULT)?;
        let parsed: SupportedLanguages = parse_json(&response)?;
        Ok(parsed.supported_languages)
    }
}

/// Resource context for status classification: a 404 means "glossary not
/// found" only for glossary management, and a 503 means "document not ready"
/// only while downloading a translated document.
#[derive(Debug, Clone, Copy)]
pub(crate) struct StatusContext {
    pub glossary: bool,
    pub downloading_document: bool,
}

impl StatusContext {
    pub const DEFAULT: StatusContext = StatusContext {
        glossary: false,
        downloading_document: false,
    };
    pub const GLOSSARY: StatusContext = StatusContext {
        glossary: true,
        downloading_document: false,
    };
    pub const DOWNLOAD: StatusContext = StatusContext {
        glossary: false,
        downloading_document: true,
    };
}

/// Maps an error status to the error taxonomy. Appends the server-provided
/// `message`/`detail` fields where present.
pub(crate) fn check_status(response: &ApiResponse, context: StatusContext) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    let detail = error_detail(response);
    let status = response.status;
    Err(match status {
        403 => Error::Authorization { detail },
        HTTP_STATUS_QUOTA_EXCEEDED => Error::QuotaExceeded { detail },
        404 if context.glossary => Error::GlossaryNotFound { detail },
        404 => Error::Server {
            message: format!("not found, check server_url{detail}"),
            status,
            should_retry: false,
        },
        400 => Error::Server {
            message: format!("bad request{detail}"),
            status,
            should_retry: false,
        },
        429 => Error::TooManyRequests { detail },
        503 if context.downloading_document => Error::DocumentNotReady { detail },
        503 => Error::Server {
            message: format!("service unavailable{detail}"),
            status,
            should_retry: true,
        },
        _ => Error::Server {
            message: format!(
                "unexpected status code: {status}, content: {}",
                response.text()
            ),
            status,
            should_retry: false,
        },
    })
}

fn error_detail(response: &ApiResponse) -> String {
    let mut detail = String::new();
    if let Some(json) = response.json() {
        if let Some(message) = json.get("message").and_then(Value::as_str) {
            detail.push_str(", message: ");
            detail.push_str(message);
        }
        if let Some(extra) = json.get("detail").and_then(Value::as_str) {
            detail.push_str(", detail: ");
            detail.push_str(extra);
        }
    }
    detail
}

pub(crate) fn parse_json<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    serde_json::from_slice(&response.body)
        .map_err(|e| Error::Protocol(format!("malformed API response: {e}")))
}

/// Builds the shared language/formality/glossary request fields and performs
/// the fail-fast validation every translate call needs.
pub(crate) fn language_fields(
    source_lang: Option<&str>,
    target_lang: &str,
    formality: Option<Formality>,
    glossary: Option<&TextGlossary>,
) -> Result<Vec<(String, String)>> {
    let target_lang = target_lang.to_uppercase();
    let source_lang = source_lang.map(str::to_uppercase);

    if glossary.is_some() && source_lang.is_none() {
        return Err(Error::Config(
            "source_lang is required if using a glossary".to_string(),
        ));
    }
    if let Some(TextGlossary::Info(info)) = glossary {
        let matches = remove_regional_variant(&target_lang) == info.target_lang
            && source_lang.as_deref() == Some(info.source_lang.as_str());
        if !matches {
            return Err(Error::Config(
                "source_lang and target_lang must match glossary".to_string(),
            ));
        }
    }
    match target_lang.as_str() {
        "EN" => {
            return Err(Error::Config(
                "target_lang=\"EN\" is deprecated, use \"EN-GB\" or \"EN-US\" instead".to_string(),
            ));
        }
        "PT" => {
            return Err(Error::Config(
                "target_lang=\"PT\" is deprecated, use \"PT-PT\" or \"PT-BR\" instead".to_string(),
            ));
        }
        _ => {}
    }

    let mut fields = vec![("target_lang".to_string(), target_lang)];
    if let Some(source) = source_lang {
        fields.push(("source_lang".to_string(), source));
    }
    if let Some(formality) = formality {
        fields.push(("formality".to_string(), formality.to_string()));
    }
    if let Some(glossary) = glossary {
        fields.push(("glossary_id".to_string(), glossary.id().to_string()));
    }
    Ok(fields)
}

/// Usage of one billing subtype. `count` and `limit` are only meaningful when
/// both were reported, i.e. when [`UsageDetail::valid`] is true.
#[derive(Debug, Clone, Copy, Default)]
pub struct UsageDetail {
    count: Option<u64>,
    limit: Option<u64>,
}

impl UsageDetail {
    pub fn count(&self) -> Option<u64> {
        self.count
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// True iff this usage subtype applies to the account.
    pub fn valid(&self) -> bool {
        self.count.is_some() && self.limit.is_some()
    }

    pub fn limit_reached(&self) -> bool {
        match (self.count, self.limit) {
            (Some(count), Some(limit)) => count >= limit,
            _ => false,
        }
    }
}

impl fmt::Display for UsageDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.count, self.limit) {
            (Some(count), Some(limit)) => write!(f, "{count} of {limit}"),
            _ => f.write_str("Unknown"),
        }
    }
}

/// Account usage snapshot with independent character, document and
/// team-document subtypes.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub character: UsageDetail,
    pub document: UsageDetail,
    pub team_document: UsageDetail,
}

impl Usage {
    pub fn any_limit_reached(&self) -> bool {
        self.character.limit_reached()
            || self.document.limit_reached()
            || self.team_document.limit_reached()
    }

    fn from_raw(raw: RawUsage) -> Self {
        Self {
            character: UsageDetail {
                count: raw.character_count,
                limit: raw.character_limit,
            },
            document: UsageDetail {
                count: raw.document_count,
                limit: raw.document_limit,
            },
            team_document: UsageDetail {
                count: raw.team_document_count,
                limit: raw.team_document_limit,
            },
        }
    }
}

impl fmt::Display for Usage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Usage this billing period:")?;
        let labelled = [
            ("Characters", &self.character),
            ("Documents", &self.document),
            ("Team documents", &self.team_document),
        ];
        for (label, detail) in labelled {
            if detail.valid() {
                writeln!(f, "{label}: {detail}")?;
            }
        }
        Ok(())
    }
}

/// Flat wire shape of the usage response; validity of each subtype is
/// derived from field presence.
#[derive(Debug, Deserialize)]
struct RawUsage {
    character_count: Option<u64>,
    character_limit: Option<u64>,
    document_count: Option<u64>,
    document_limit: Option<u64>,
    team_document_count: Option<u64>,
    team_document_limit: Option<u64>,
}
