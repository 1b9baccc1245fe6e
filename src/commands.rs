//! Command dispatch for the CLI binary.
//!
//! Settings are layered: defaults, then an optional TOML file, then
//! `LINGO__<key>` environment variables, then command-line flags. The auth
//! key itself is taken from the `--auth-key` flag or `LINGO_AUTH_KEY` only,
//! never from the TOML file.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use config::{Environment, File};
use serde::Deserialize;

use lingo::{
    DictionaryRef, DocumentOptions, Error, GlossaryDictionaryEntries, GlossaryEntries,
    GlossaryRef, MultilingualGlossaryRef, ProxyConfig, Result, TextGlossary, TextOptions,
    Translator, TranslatorOptions,
};

use crate::cli::{Cli, Commands, DictionaryArgs, GlossaryCommands};

const CONFIG_ENV_VAR: &str = "LINGO_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/lingo.toml";
const ENV_PREFIX: &str = "LINGO";
const ENV_SEPARATOR: &str = "__";

/// Settings loadable from the TOML file and `LINGO__*` environment
/// variables. Everything is optional; missing values fall back to the client
/// defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub server_url: Option<String>,
    pub proxy: Option<ProxyConfig>,
    pub verify_ssl: Option<bool>,
    pub send_platform_info: Option<bool>,
    pub max_network_retries: Option<u32>,
    pub min_connection_timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        let path = env::var(CONFIG_ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from_path(path)
    }

    pub fn load_from_path(path: PathBuf) -> Result<Self> {
        let mut builder = config::Config::builder();
        if path.exists() {
            tracing::info!("loading configuration from {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }
        // Only LINGO__* style variables are configuration; LINGO_AUTH_KEY and
        // LINGO_SERVER_URL belong to the CLI flags.
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator(ENV_SEPARATOR)
                .separator(ENV_SEPARATOR)
                .try_parsing(true),
        );
        builder
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| Error::Config(format!("failed to load configuration: {e}")))
    }

    fn into_options(self, server_url_flag: Option<String>) -> TranslatorOptions {
        let defaults = TranslatorOptions::default();
        TranslatorOptions {
            server_url: server_url_flag.or(self.server_url),
            proxy: self.proxy,
            verify_ssl: self.verify_ssl.unwrap_or(defaults.verify_ssl),
            send_platform_info: self
                .send_platform_info
                .unwrap_or(defaults.send_platform_info),
            max_network_retries: self
                .max_network_retries
                .unwrap_or(defaults.max_network_retries),
            min_connection_timeout: self
                .min_connection_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(defaults.min_connection_timeout),
            ..defaults
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let auth_key = cli
        .auth_key
        .ok_or_else(|| Error::Config("auth key required, set LINGO_AUTH_KEY".to_string()))?;
    let options = FileConfig::load()?.into_options(cli.server_url);
    let translator = Translator::new(&auth_key, options)?;

    match cli.command {
        Commands::Text(args) => {
            let options = TextOptions {
                source_lang: args.source_lang,
                formality: args.formality,
                glossary: args.glossary_id.map(TextGlossary::Id),
                ..TextOptions::default()
            };
            let results = translator
                .translate_text(&args.texts, &args.target_lang, &options)
                .await?;
            for result in results {
                if args.verbose {
                    println!(
                        "[{} -> {}, {} billed characters]",
                        result.detected_source_lang, args.target_lang, result.billed_characters
                    );
                }
                println!("{}", result.text);
            }
        }
        Commands::Document(args) => {
            let options = DocumentOptions {
                source_lang: args.source_lang,
                formality: args.formality,
                glossary: args.glossary_id.map(TextGlossary::Id),
                output_format: args.output_format,
            };
            let status = translator
                .translate_document_file(&args.input, &args.output, &args.target_lang, &options)
                .await?;
            if let Some(billed) = status.billed_characters {
                println!("Translated, {billed} characters billed");
            } else {
                println!("Translated");
            }
        }
        Commands::Usage => {
            let usage = translator.get_usage().await?;
            print!("{usage}");
        }
        Commands::Languages(args) => {
            if args.glossary {
                for pair in translator.get_glossary_languages().await? {
                    println!("{} -> {}", pair.source_lang, pair.target_lang);
                }
            } else {
                println!("Source languages:");
                for language in translator.get_source_languages().await? {
                    println!("  {} ({})", language.code, language.name);
                }
                println!("Target languages:");
                for language in translator.get_target_languages().await? {
                    let formality = match language.supports_formality {
                        Some(true) => " [formality]",
                        _ => "",
                    };
                    println!("  {} ({}){formality}", language.code, language.name);
                }
            }
        }
        Commands::Glossary { command } => run_glossary(&translator, command).await?,
    }
    Ok(())
}

/// Reads a term-pair file, picking the parser from the extension.
async fn read_entries(path: &std::path::Path) -> Result<GlossaryEntries> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Io(format!("failed to read {}: {e}", path.display())))?;
    let is_csv = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    if is_csv {
        GlossaryEntries::from_csv(&content)
    } else {
        GlossaryEntries::from_tsv(&content)
    }
}

async fn run_glossary(translator: &Translator, command: GlossaryCommands) -> Result<()> {
    match command {
        GlossaryCommands::Create(args) => {
            let entries = read_entries(&args.entries).await?;
            let info = translator
                .create_glossary(&args.name, &args.source_lang, &args.target_lang, &entries)
                .await?;
            println!("Created glossary {} ({})", info.name, info.glossary_id);
        }
        GlossaryCommands::List => {
            for info in translator.list_glossaries().await? {
                println!(
                    "{}  {} -> {}  {} entries  {}",
                    info.glossary_id, info.source_lang, info.target_lang, info.entry_count,
                    info.name
                );
            }
        }
        GlossaryCommands::Get { glossary_id } => {
            let info = translator.get_glossary(GlossaryRef::Id(&glossary_id)).await?;
            println!("ID: {}", info.glossary_id);
            println!("Name: {}", info.name);
            println!("Languages: {} -> {}", info.source_lang, info.target_lang);
            println!("Entries: {}", info.entry_count);
            println!("Ready: {}", info.ready);
        }
        GlossaryCommands::Entries { glossary_id } => {
            let entries = translator
                .get_glossary_entries(GlossaryRef::Id(&glossary_id))
                .await?;
            println!("{}", entries.to_tsv());
        }
        GlossaryCommands::Delete { glossary_id } => {
            translator
                .delete_glossary(GlossaryRef::Id(&glossary_id))
                .await?;
            println!("Deleted glossary {glossary_id}");
        }
        GlossaryCommands::UpdateDictionary(args) => {
            let dictionary = dictionary_from_args(&args).await?;
            let info = translator
                .update_multilingual_glossary_dictionary(
                    MultilingualGlossaryRef::Id(&args.glossary_id),
                    &dictionary,
                )
                .await?;
            println!("Updated glossary {} ({})", info.name, info.glossary_id);
        }
        GlossaryCommands::ReplaceDictionary(args) => {
            let dictionary = dictionary_from_args(&args).await?;
            let info = translator
                .replace_multilingual_glossary_dictionary(
                    MultilingualGlossaryRef::Id(&args.glossary_id),
                    &dictionary,
                )
                .await?;
            println!(
                "Replaced dictionary {} -> {} ({} entries)",
                info.source_lang, info.target_lang, info.entry_count
            );
        }
        GlossaryCommands::DeleteDictionary {
            glossary_id,
            source_lang,
            target_lang,
        } => {
            let dictionary = DictionaryRef::new(&source_lang, &target_lang);
            translator
                .delete_multilingual_glossary_dictionary(
                    MultilingualGlossaryRef::Id(&glossary_id),
                    &dictionary,
                )
                .await?;
            println!(
                "Deleted dictionary {} -> {} from {glossary_id}",
                dictionary.source_lang(),
                dictionary.target_lang()
            );
        }
    }
    Ok(())
}

async fn dictionary_from_args(args: &DictionaryArgs) -> Result<GlossaryDictionaryEntries> {
    let entries = read_entries(&args.entries).await?;
    Ok(GlossaryDictionaryEntries::new(
        args.source_lang.as_str(),
        args.target_lang.as_str(),
        entries,
    ))
}
