use std::path::PathBuf;

use clap::{Parser, Subcommand};

use lingo::Formality;

#[derive(Parser, Debug)]
#[command(name = "lingo")]
#[command(about = "Lingo translation CLI", long_about = None)]
pub struct Cli {
    /// API authentication key
    #[arg(long, env = "LINGO_AUTH_KEY", hide_env_values = true, global = true)]
    pub auth_key: Option<String>,

    /// Override the API base URL
    #[arg(long, env = "LINGO_SERVER_URL", global = true)]
    pub server_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Translate text given on the command line
    Text(TextArgs),
    /// Translate a document file
    Document(DocumentArgs),
    /// Show usage for the current billing period
    Usage,
    /// List supported languages
    Languages(LanguagesArgs),
    /// Manage glossaries
    Glossary {
        #[command(subcommand)]
        command: GlossaryCommands,
    },
}

#[derive(clap::Args, Debug)]
pub struct TextArgs {
    /// Texts to translate
    #[arg(required = true)]
    pub texts: Vec<String>,

    /// Target language code, e.g. DE or EN-US
    #[arg(long = "to")]
    pub target_lang: String,

    /// Source language code; auto-detected when omitted
    #[arg(long = "from")]
    pub source_lang: Option<String>,

    /// Desired formality of the translation
    #[arg(long)]
    pub formality: Option<Formality>,

    /// Glossary to apply, by ID
    #[arg(long)]
    pub glossary_id: Option<String>,

    /// Show detection and billing details for each result
    #[arg(long)]
    pub verbose: bool,
}

#[derive(clap::Args, Debug)]
pub struct DocumentArgs {
    /// Document to translate
    pub input: PathBuf,

    /// Where to write the translated document
    pub output: PathBuf,

    /// Target language code
    #[arg(long = "to")]
    pub target_lang: String,

    /// Source language code; auto-detected when omitted
    #[arg(long = "from")]
    pub source_lang: Option<String>,

    /// Desired formality of the translation
    #[arg(long)]
    pub formality: Option<Formality>,

    /// Glossary to apply, by ID
    #[arg(long)]
    pub glossary_id: Option<String>,

    /// Output file format when it differs from the input extension
    #[arg(long)]
    pub output_format: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct LanguagesArgs {
    /// List language pairs supported for glossaries instead
    #[arg(long)]
    pub glossary: bool,
}

#[derive(Subcommand, Debug)]
pub enum GlossaryCommands {
    /// Create a glossary from a TSV or CSV file
    Create(GlossaryCreateArgs),
    /// List all glossaries
    List,
    /// Show one glossary
    Get { glossary_id: String },
    /// Print the term pairs of a glossary as TSV
    Entries { glossary_id: String },
    /// Delete a glossary
    Delete { glossary_id: String },
    /// Merge entries into a dictionary of a multilingual glossary
    UpdateDictionary(DictionaryArgs),
    /// Replace a dictionary of a multilingual glossary wholesale
    ReplaceDictionary(DictionaryArgs),
    /// Delete one dictionary from a multilingual glossary
    DeleteDictionary {
        glossary_id: String,

        /// Source language of the dictionary
        #[arg(long = "from")]
        source_lang: String,

        /// Target language of the dictionary
        #[arg(long = "to")]
        target_lang: String,
    },
}

#[derive(clap::Args, Debug)]
pub struct DictionaryArgs {
    pub glossary_id: String,

    /// Source language of the dictionary
    #[arg(long = "from")]
    pub source_lang: String,

    /// Target language of the dictionary
    #[arg(long = "to")]
    pub target_lang: String,

    /// File with term pairs; .csv is parsed as CSV, anything else as TSV
    #[arg(long)]
    pub entries: PathBuf,
}

#[derive(clap::Args, Debug)]
pub struct GlossaryCreateArgs {
    /// Glossary name
    pub name: String,

    /// Source language code
    #[arg(long = "from")]
    pub source_lang: String,

    /// Target language code
    #[arg(long = "to")]
    pub target_lang: String,

    /// File with term pairs; .csv is parsed as CSV, anything else as TSV
    #[arg(long)]
    pub entries: PathBuf,
}
