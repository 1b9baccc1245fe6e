//! Client library for the Lingo translation API.
//!
//! The entry point is [`Translator`], which owns a retrying HTTP executor and
//! exposes the text, document, usage, language and glossary resources. All
//! operations are async and safe to call concurrently on one client instance.

pub mod client;
pub mod document;
pub mod entries;
pub mod error;
pub mod http;
pub mod glossary;
pub mod lang;
pub mod multilingual;
pub mod options;
pub mod text;

pub use client::{SERVER_URL, SERVER_URL_FREE, Translator, Usage, UsageDetail, key_is_free_account};
pub use document::{DocumentHandle, DocumentOptions, DocumentState, DocumentStatus};
pub use entries::GlossaryEntries;
pub use error::{Error, Result};
pub use glossary::{GlossaryInfo, GlossaryRef};
pub use lang::{Formality, GlossaryLanguagePair, Language, ModelType, SplitSentences, TagHandling};
pub use multilingual::{
    DictionaryRef, GlossaryDictionaryEntries, GlossaryDictionaryInfo, MultilingualGlossaryInfo,
    MultilingualGlossaryRef,
};
pub use options::{AppInfo, ProxyConfig, TranslatorOptions};
pub use text::{RephraseOptions, RephraseResult, TextGlossary, TextOptions, TextResult};
