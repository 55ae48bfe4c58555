//! Open Library client service for external catalog search and import.
//!
//! Lookup failures are reported back to the caller as warnings; only internal
//! failures (database, serialization of our own state) raise.

use serde::Deserialize;
use serde_json::Value;

use crate::{
    config::CatalogConfig,
    error::{AppError, AppResult},
    models::book::Book,
    repository::Repository,
};

const COVERS_BASE_URL: &str = "https://covers.openlibrary.org";

/// One search hit from the external catalog
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct CatalogSearchResult {
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publish_year: Option<i32>,
    pub publisher: Option<String>,
    pub genre: Option<String>,
    pub cover_url: Option<String>,
    /// Open Library record key, used for import
    pub key: String,
}

/// What the import did
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ImportAction {
    Imported,
    Duplicate,
    Failed,
}

/// Outcome of a catalog import
#[derive(Debug, Clone, serde::Serialize, utoipa::ToSchema)]
pub struct ImportOutcome {
    pub action: ImportAction,
    pub warnings: Vec<String>,
    pub book: Option<Book>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    docs: Vec<SearchDoc>,
}

#[derive(Debug, Default, Deserialize)]
struct SearchDoc {
    title: Option<String>,
    author_name: Option<Vec<String>>,
    isbn: Option<Vec<String>>,
    first_publish_year: Option<i32>,
    publisher: Option<Vec<String>>,
    subject: Option<Vec<String>>,
    cover_i: Option<i64>,
    key: Option<String>,
}

fn map_doc(doc: SearchDoc) -> CatalogSearchResult {
    CatalogSearchResult {
        title: doc.title.unwrap_or_else(|| "Unknown Title".to_string()),
        author: doc
            .author_name
            .filter(|names| !names.is_empty())
            .map(|names| names.join(", "))
            .unwrap_or_else(|| "Unknown Author".to_string()),
        isbn: doc.isbn.and_then(|isbns| isbns.into_iter().next()),
        publish_year: doc.first_publish_year,
        publisher: doc
            .publisher
            .filter(|publishers| !publishers.is_empty())
            .map(|publishers| publishers.join(", ")),
        genre: doc.subject.and_then(|subjects| subjects.into_iter().next()),
        cover_url: doc
            .cover_i
            .map(|cover| format!("{}/b/id/{}-M.jpg", COVERS_BASE_URL, cover)),
        key: doc.key.unwrap_or_default(),
    }
}

/// Extract the author record key from a work's author entry. Works reference
/// authors as `{"author": {"key": ...}}`, editions as `{"key": ...}`.
fn author_key(entry: &Value) -> Option<&str> {
    entry
        .get("author")
        .and_then(|author| author.get("key"))
        .or_else(|| entry.get("key"))
        .and_then(Value::as_str)
}

#[derive(Clone)]
pub struct OpenLibraryService {
    repository: Repository,
    http: reqwest::Client,
    config: CatalogConfig,
}

impl OpenLibraryService {
    pub fn new(repository: Repository, config: CatalogConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            repository,
            http,
            config,
        })
    }

    /// Search the external catalog. Failures come back as warnings alongside
    /// an empty result list.
    pub async fn search(&self, query: &str) -> (Vec<CatalogSearchResult>, Vec<String>) {
        let mut warnings = Vec::new();

        let url = format!("{}/search.json", self.config.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[
                ("q", query),
                ("limit", &self.config.search_limit.to_string()),
            ])
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Catalog search request failed: {}", e);
                warnings.push(format!("Error searching books: {}", e));
                return (Vec::new(), warnings);
            }
        };

        if !response.status().is_success() {
            warnings.push(format!(
                "Catalog search returned status {}",
                response.status()
            ));
            return (Vec::new(), warnings);
        }

        match response.json::<SearchResponse>().await {
            Ok(body) => (body.docs.into_iter().map(map_doc).collect(), warnings),
            Err(e) => {
                tracing::warn!("Catalog search response could not be parsed: {}", e);
                warnings.push(format!("Error searching books: {}", e));
                (Vec::new(), warnings)
            }
        }
    }

    /// Import a catalog record as a single-copy book. Lookup failures produce
    /// a `Failed` outcome with warnings; a (title, author) match produces a
    /// `Duplicate` outcome and no insert.
    pub async fn import(&self, key: &str) -> AppResult<ImportOutcome> {
        let mut warnings = Vec::new();

        let key = if key.starts_with('/') {
            key.to_string()
        } else {
            format!("/{}", key)
        };

        let data = match self.fetch_json(&format!("{}{}.json", self.config.base_url, key)).await {
            Ok(data) => data,
            Err(warning) => {
                tracing::warn!("Catalog import failed for {}: {}", key, warning);
                return Ok(ImportOutcome {
                    action: ImportAction::Failed,
                    warnings: vec![format!(
                        "Failed to retrieve book details from the catalog: {}",
                        warning
                    )],
                    book: None,
                });
            }
        };

        let title = data
            .get("title")
            .and_then(Value::as_str)
            .unwrap_or("Unknown Title")
            .to_string();

        let author = self.resolve_authors(&data, &mut warnings).await;

        let isbn = ["isbn_13", "isbn_10"]
            .iter()
            .find_map(|field| {
                data.get(*field)
                    .and_then(Value::as_array)
                    .and_then(|isbns| isbns.first())
                    .and_then(Value::as_str)
            })
            .map(str::to_string);

        let genre = data
            .get("subjects")
            .and_then(Value::as_array)
            .and_then(|subjects| subjects.first())
            .and_then(Value::as_str)
            .map(str::to_string);

        if let Some(existing) = self
            .repository
            .books
            .find_by_title_author(&title, &author)
            .await?
        {
            warnings.push("This book already exists in the library.".to_string());
            return Ok(ImportOutcome {
                action: ImportAction::Duplicate,
                warnings,
                book: Some(existing),
            });
        }

        let book = self
            .repository
            .books
            .create_imported(isbn.as_deref(), &title, &author, genre.as_deref())
            .await?;

        tracing::info!("Imported \"{}\" from external catalog", book.title);

        Ok(ImportOutcome {
            action: ImportAction::Imported,
            warnings,
            book: Some(book),
        })
    }

    /// Resolve author names via secondary lookups; failed lookups degrade to
    /// warnings and a fallback name.
    async fn resolve_authors(&self, data: &Value, warnings: &mut Vec<String>) -> String {
        let mut names = Vec::new();

        if let Some(authors) = data.get("authors").and_then(Value::as_array) {
            for entry in authors {
                let Some(key) = author_key(entry) else {
                    continue;
                };

                match self
                    .fetch_json(&format!("{}{}.json", self.config.base_url, key))
                    .await
                {
                    Ok(author) => {
                        if let Some(name) = author.get("name").and_then(Value::as_str) {
                            names.push(name.to_string());
                        }
                    }
                    Err(warning) => {
                        warnings.push(format!("Could not resolve author {}: {}", key, warning));
                    }
                }
            }
        }

        if names.is_empty() {
            "Unknown Author".to_string()
        } else {
            names.join(", ")
        }
    }

    async fn fetch_json(&self, url: &str) -> Result<Value, String> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        response.json::<Value>().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn maps_search_docs_with_fallbacks() {
        let body: SearchResponse = serde_json::from_value(json!({
            "docs": [
                {
                    "title": "The Hobbit",
                    "author_name": ["J. R. R. Tolkien"],
                    "isbn": ["9780261103344", "0261103342"],
                    "first_publish_year": 1937,
                    "publisher": ["Allen & Unwin"],
                    "subject": ["Fantasy", "Adventure"],
                    "cover_i": 123,
                    "key": "/works/OL262758W"
                },
                {}
            ]
        }))
        .unwrap();

        let results: Vec<_> = body.docs.into_iter().map(map_doc).collect();

        assert_eq!(results[0].title, "The Hobbit");
        assert_eq!(results[0].author, "J. R. R. Tolkien");
        assert_eq!(results[0].isbn.as_deref(), Some("9780261103344"));
        assert_eq!(results[0].genre.as_deref(), Some("Fantasy"));
        assert_eq!(
            results[0].cover_url.as_deref(),
            Some("https://covers.openlibrary.org/b/id/123-M.jpg")
        );

        assert_eq!(results[1].title, "Unknown Title");
        assert_eq!(results[1].author, "Unknown Author");
        assert!(results[1].isbn.is_none());
        assert!(results[1].cover_url.is_none());
    }

    #[test]
    fn author_key_handles_both_shapes() {
        let work_entry = json!({"author": {"key": "/authors/OL26320A"}});
        let edition_entry = json!({"key": "/authors/OL26320A"});
        let unrelated = json!({"type": {"key": "/type/author_role"}});

        assert_eq!(author_key(&work_entry), Some("/authors/OL26320A"));
        assert_eq!(author_key(&edition_entry), Some("/authors/OL26320A"));
        assert_eq!(author_key(&unrelated), None);
    }
}
