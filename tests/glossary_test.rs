//! Glossary management against a mock server, covering both the single-pair
//! API and the multilingual dictionaries.

mod common;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::json;

use lingo::{
    DictionaryRef, Error, GlossaryDictionaryEntries, GlossaryEntries, GlossaryRef,
    MultilingualGlossaryRef,
};

const CREATION_TIME: &str = "2024-05-18T09:12:00Z";

#[derive(Default)]
struct GlossaryStore {
    name: String,
    source_lang: String,
    target_lang: String,
    entries_tsv: String,
}

fn v2_router(store: Arc<Mutex<GlossaryStore>>) -> Router {
    async fn create(
        State(store): State<Arc<Mutex<GlossaryStore>>>,
        Form(fields): Form<Vec<(String, String)>>,
    ) -> Json<serde_json::Value> {
        let field = |key: &str| {
            fields
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        };
        assert_eq!(field("entries_format"), "tsv");
        let entry_count = field("entries").lines().count();
        let mut store = store.lock().unwrap();
        store.name = field("name");
        store.source_lang = field("source_lang");
        store.target_lang = field("target_lang");
        store.entries_tsv = field("entries");
        Json(json!({
            "glossary_id": "g-1",
            "name": store.name,
            "ready": true,
            "source_lang": store.source_lang,
            "target_lang": store.target_lang,
            "creation_time": CREATION_TIME,
            "entry_count": entry_count,
        }))
    }

    async fn entries(
        State(store): State<Arc<Mutex<GlossaryStore>>>,
        Path(id): Path<String>,
    ) -> (StatusCode, String) {
        if id != "g-1" {
            return (StatusCode::NOT_FOUND, "{}".to_string());
        }
        (StatusCode::OK, store.lock().unwrap().entries_tsv.clone())
    }

    async fn get_one(Path(id): Path<String>) -> (StatusCode, Json<serde_json::Value>) {
        if id != "g-1" {
            return (StatusCode::NOT_FOUND, Json(json!({})));
        }
        (
            StatusCode::OK,
            Json(json!({
                "glossary_id": "g-1",
                "name": "Test",
                "ready": true,
                "source_lang": "EN",
                "target_lang": "DE",
                "creation_time": CREATION_TIME,
                "entry_count": 1,
            })),
        )
    }

    Router::new()
        .route("/v2/glossaries", post(create))
        .route("/v2/glossaries/{id}", get(get_one))
        .route("/v2/glossaries/{id}/entries", get(entries))
        .with_state(store)
}

#[tokio::test]
async fn test_create_and_fetch_entries_round_trip() {
    let store = Arc::new(Mutex::new(GlossaryStore::default()));
    let addr = common::serve(v2_router(store.clone())).await;
    let client = common::client_for(addr);

    let entries =
        GlossaryEntries::from_pairs([("hello", "hallo"), ("prize", "Preis")]).unwrap();
    // Regional variants are stripped for glossary languages.
    let info = client
        .create_glossary("Test", "en-US", "de", &entries)
        .await
        .unwrap();

    assert_eq!(info.glossary_id, "g-1");
    assert_eq!(info.entry_count, 2);
    {
        let store = store.lock().unwrap();
        assert_eq!(store.source_lang, "EN");
        assert_eq!(store.target_lang, "DE");
    }

    let fetched = client
        .get_glossary_entries(GlossaryRef::Id("g-1"))
        .await
        .unwrap();
    assert_eq!(fetched, entries);
}

#[tokio::test]
async fn test_create_from_csv_converts_client_side() {
    let store = Arc::new(Mutex::new(GlossaryStore::default()));
    let addr = common::serve(v2_router(store.clone())).await;

    common::client_for(addr)
        .create_glossary_from_csv("Csv", "EN", "DE", "hello,hallo\n\"a,b\",c")
        .await
        .unwrap();

    let store = store.lock().unwrap();
    assert_eq!(store.entries_tsv, "a,b\tc\nhello\thallo");
}

#[tokio::test]
async fn test_missing_glossary_maps_to_not_found() {
    let store = Arc::new(Mutex::new(GlossaryStore::default()));
    let addr = common::serve(v2_router(store)).await;

    let err = common::client_for(addr)
        .get_glossary(GlossaryRef::Id("missing"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::GlossaryNotFound { .. }));
    assert_eq!(err.http_status(), Some(404));
}

#[tokio::test]
async fn test_empty_glossary_rejected_without_request() {
    let store = Arc::new(Mutex::new(GlossaryStore::default()));
    let addr = common::serve(v2_router(store.clone())).await;

    let err = common::client_for(addr)
        .create_glossary("Empty", "EN", "DE", &GlossaryEntries::new())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Config(_)));
    assert!(store.lock().unwrap().name.is_empty());
}

/// One multilingual glossary with a single EN->DE dictionary, kept in memory.
type Dictionary = Arc<Mutex<BTreeMap<String, String>>>;

fn dictionary_info(terms: &BTreeMap<String, String>) -> serde_json::Value {
    json!({"source_lang": "EN", "target_lang": "DE", "entry_count": terms.len()})
}

fn glossary_info(terms: &BTreeMap<String, String>) -> serde_json::Value {
    json!({
        "glossary_id": "mg-1",
        "name": "Multi",
        "dictionaries": [dictionary_info(terms)],
        "creation_time": CREATION_TIME,
    })
}

fn terms_to_tsv(terms: &BTreeMap<String, String>) -> String {
    terms
        .iter()
        .map(|(s, t)| format!("{s}\t{t}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn tsv_to_terms(tsv: &str) -> BTreeMap<String, String> {
    tsv.lines()
        .filter_map(|line| line.split_once('\t'))
        .map(|(s, t)| (s.to_string(), t.to_string()))
        .collect()
}

fn v3_router(dictionary: Dictionary) -> Router {
    #[derive(serde::Deserialize)]
    struct PatchBody {
        name: Option<String>,
        #[serde(default)]
        dictionaries: Vec<DictionaryBody>,
    }

    #[derive(serde::Deserialize)]
    struct DictionaryBody {
        source_lang: String,
        target_lang: String,
        entries: String,
        entries_format: String,
    }

    #[derive(serde::Deserialize)]
    struct PairQuery {
        source_lang: String,
        target_lang: String,
    }

    async fn patch_glossary(
        State(dictionary): State<Dictionary>,
        Json(body): Json<PatchBody>,
    ) -> Json<serde_json::Value> {
        let mut terms = dictionary.lock().unwrap();
        for incoming in body.dictionaries {
            assert_eq!(incoming.entries_format, "tsv");
            assert_eq!(incoming.source_lang, "EN");
            assert_eq!(incoming.target_lang, "DE");
            // Merge semantics: incoming terms overwrite, the rest stay.
            terms.extend(tsv_to_terms(&incoming.entries));
        }
        let mut info = glossary_info(&terms);
        if let Some(name) = body.name {
            info["name"] = json!(name);
        }
        Json(info)
    }

    async fn replace_dictionary(
        State(dictionary): State<Dictionary>,
        Json(body): Json<DictionaryBody>,
    ) -> Json<serde_json::Value> {
        let mut terms = dictionary.lock().unwrap();
        *terms = tsv_to_terms(&body.entries);
        Json(dictionary_info(&terms))
    }

    async fn delete_dictionary(
        State(dictionary): State<Dictionary>,
        Query(query): Query<PairQuery>,
    ) -> StatusCode {
        assert_eq!(query.source_lang, "EN");
        assert_eq!(query.target_lang, "DE");
        dictionary.lock().unwrap().clear();
        StatusCode::NO_CONTENT
    }

    async fn entries(
        State(dictionary): State<Dictionary>,
        Query(query): Query<PairQuery>,
    ) -> Json<serde_json::Value> {
        let terms = dictionary.lock().unwrap();
        Json(json!({
            "dictionaries": [{
                "source_lang": query.source_lang,
                "target_lang": query.target_lang,
                "entries": terms_to_tsv(&terms),
                "entries_format": "tsv",
            }]
        }))
    }

    Router::new()
        .route("/v3/glossaries/mg-1", axum::routing::patch(patch_glossary))
        .route(
            "/v3/glossaries/mg-1/dictionaries",
            axum::routing::put(replace_dictionary).delete(delete_dictionary),
        )
        .route("/v3/glossaries/mg-1/entries", get(entries))
        .with_state(dictionary)
}

fn seeded_dictionary() -> Dictionary {
    Arc::new(Mutex::new(BTreeMap::from([
        ("hello".to_string(), "hallo".to_string()),
        ("prize".to_string(), "Preis".to_string()),
    ])))
}

#[tokio::test]
async fn test_update_merges_into_existing_dictionary() {
    let dictionary = seeded_dictionary();
    let addr = common::serve(v3_router(dictionary.clone())).await;

    let entries =
        GlossaryEntries::from_pairs([("prize", "Gewinn"), ("artist", "Maler")]).unwrap();
    let update = GlossaryDictionaryEntries::new("en", "de", entries);
    let info = common::client_for(addr)
        .update_multilingual_glossary_dictionary(MultilingualGlossaryRef::Id("mg-1"), &update)
        .await
        .unwrap();

    assert_eq!(info.dictionaries.len(), 1);
    assert_eq!(info.dictionaries[0].entry_count, 3);
    let terms = dictionary.lock().unwrap();
    assert_eq!(terms.get("hello").map(String::as_str), Some("hallo"));
    assert_eq!(terms.get("prize").map(String::as_str), Some("Gewinn"));
    assert_eq!(terms.get("artist").map(String::as_str), Some("Maler"));
}

#[tokio::test]
async fn test_replace_discards_previous_terms() {
    let dictionary = seeded_dictionary();
    let addr = common::serve(v3_router(dictionary.clone())).await;

    let entries = GlossaryEntries::from_pairs([("goodbye", "Auf Wiedersehen")]).unwrap();
    let replacement = GlossaryDictionaryEntries::new("EN", "DE", entries);
    let info = common::client_for(addr)
        .replace_multilingual_glossary_dictionary(
            MultilingualGlossaryRef::Id("mg-1"),
            &replacement,
        )
        .await
        .unwrap();

    assert_eq!(info.entry_count, 1);
    let terms = dictionary.lock().unwrap();
    assert_eq!(terms.len(), 1);
    assert_eq!(
        terms.get("goodbye").map(String::as_str),
        Some("Auf Wiedersehen")
    );
}

#[tokio::test]
async fn test_rename_keeps_dictionaries() {
    let dictionary = seeded_dictionary();
    let addr = common::serve(v3_router(dictionary)).await;

    let info = common::client_for(addr)
        .update_multilingual_glossary_name(MultilingualGlossaryRef::Id("mg-1"), "Renamed")
        .await
        .unwrap();
    assert_eq!(info.name, "Renamed");
    assert_eq!(info.dictionaries.len(), 1);
}

#[tokio::test]
async fn test_fetch_entries_for_one_pair() {
    let dictionary = seeded_dictionary();
    let addr = common::serve(v3_router(dictionary)).await;

    let entries = common::client_for(addr)
        .get_multilingual_glossary_entries(
            MultilingualGlossaryRef::Id("mg-1"),
            &DictionaryRef::new("EN", "DE"),
        )
        .await
        .unwrap();

    assert_eq!(entries.len(), 2);
    assert_eq!(entries.get("hello"), Some("hallo"));
}

#[tokio::test]
async fn test_delete_dictionary_selects_ordered_pair() {
    let dictionary = seeded_dictionary();
    let addr = common::serve(v3_router(dictionary.clone())).await;

    // Regional variants are stripped before the pair is sent.
    common::client_for(addr)
        .delete_multilingual_glossary_dictionary(
            MultilingualGlossaryRef::Id("mg-1"),
            &DictionaryRef::new("en-US", "de"),
        )
        .await
        .unwrap();

    assert!(dictionary.lock().unwrap().is_empty());
}
