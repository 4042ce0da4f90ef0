//! Cross-entity search over cities, places and guides in a single statement.

use std::sync::Arc;

use sea_orm::{DatabaseBackend, DatabaseConnection, FromQueryResult, Statement};
use serde::Serialize;

use crate::error::{AppError, AppResult};

use super::page_size;

const SEARCH_SQL: &str = r#"
SELECT kind, id, title, url, score FROM (
    SELECT 'city' AS kind, c.id::text AS id, c.name AS title,
           '/cities/' || c.slug AS url,
           similarity(c.name, $2)::float8 AS score
    FROM city c
    WHERE c.name ILIKE $1 OR c.description ILIKE $1
    UNION ALL
    SELECT p.kind::text, p.id::text, p.name,
           '/places/' || p.id::text,
           similarity(p.name, $2)::float8
    FROM place p
    WHERE p.name ILIKE $1 OR p.description ILIKE $1 OR p.category ILIKE $1
    UNION ALL
    SELECT 'guide', g.id::text, u.name,
           '/guides/' || g.id::text,
           similarity(u.name, $2)::float8
    FROM guide g JOIN "user" u ON u.id = g.user_id
    WHERE u.name ILIKE $1 OR g.bio ILIKE $1
) hits
ORDER BY score DESC, title ASC
LIMIT $3 OFFSET $4
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    City,
    Attraction,
    Restaurant,
    Activity,
    Guide,
}

impl SearchKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "city" => Some(Self::City),
            "attraction" => Some(Self::Attraction),
            "restaurant" => Some(Self::Restaurant),
            "activity" => Some(Self::Activity),
            "guide" => Some(Self::Guide),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub id: String,
    pub title: String,
    pub url: String,
    pub score: f64,
}

#[derive(Debug, FromQueryResult)]
struct SearchRow {
    kind: String,
    id: String,
    title: String,
    url: String,
    score: f64,
}

/// One page of ranked hits. Iterating does not consume the page.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    hits: Vec<SearchHit>,
    limit: u64,
    offset: u64,
}

impl SearchResults {
    pub fn iter(&self) -> std::slice::Iter<'_, SearchHit> {
        self.hits.iter()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Offset of the following page, if this one was full.
    pub fn next_offset(&self) -> Option<u64> {
        (self.hits.len() as u64 == self.limit).then_some(self.offset + self.limit)
    }
}

impl<'a> IntoIterator for &'a SearchResults {
    type Item = &'a SearchHit;
    type IntoIter = std::slice::Iter<'a, SearchHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}

impl IntoIterator for SearchResults {
    type Item = SearchHit;
    type IntoIter = std::vec::IntoIter<SearchHit>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.into_iter()
    }
}

#[derive(Clone)]
pub struct SearchRepository {
    db: Arc<DatabaseConnection>,
}

impl SearchRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    pub async fn search(
        &self,
        query: &str,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> AppResult<SearchResults> {
        let term = query.trim();
        if term.is_empty() {
            return Err(AppError::Validation("Search query must not be empty".to_string()));
        }

        let limit = page_size(limit);
        let offset = offset.unwrap_or(0);
        let pattern = format!("%{}%", escape_like(term));

        let rows = SearchRow::find_by_statement(Statement::from_sql_and_values(
            DatabaseBackend::Postgres,
            SEARCH_SQL,
            [
                pattern.into(),
                term.to_string().into(),
                (limit as i64).into(),
                (offset as i64).into(),
            ],
        ))
        .all(self.db.as_ref())
        .await?;

        let hits = rows
            .into_iter()
            .filter_map(|row| {
                let kind = SearchKind::parse(&row.kind);
                if kind.is_none() {
                    tracing::warn!(kind = %row.kind, "Skipping search hit of unknown kind");
                }
                Some(SearchHit {
                    kind: kind?,
                    id: row.id,
                    title: row.title,
                    url: row.url,
                    score: row.score,
                })
            })
            .collect();

        Ok(SearchResults {
            hits,
            limit,
            offset,
        })
    }
}

/// Escape `ILIKE` wildcards so user input matches literally.
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use maplit::btreemap;
    use sea_orm::{MockDatabase, Value};

    use super::*;
    use crate::repositories::fixtures;

    fn row(kind: &str, id: &str, title: &str, score: f64) -> BTreeMap<&'static str, Value> {
        btreemap! {
            "kind" => Value::from(kind),
            "id" => Value::from(id),
            "title" => Value::from(title),
            "url" => Value::from(format!("/x/{id}")),
            "score" => Value::from(score),
        }
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("sidi_bou"), r"sidi\_bou");
        assert_eq!(escape_like(r"a\b"), r"a\\b");
        assert_eq!(escape_like("Chebba"), "Chebba");
    }

    #[tokio::test]
    async fn test_blank_query_is_validation_error() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = SearchRepository::new(Arc::new(db));

        let err = repo.search("   ", None, None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_no_match_is_empty() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<BTreeMap<&str, Value>>::new()])
            .into_connection();
        let repo = SearchRepository::new(Arc::new(db));

        let results = repo.search("zzzz", None, None).await.unwrap();
        assert!(results.is_empty());
        assert_eq!(results.iter().count(), 0);
        assert_eq!(results.next_offset(), None);
    }

    #[tokio::test]
    async fn test_hits_are_tagged_and_restartable() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![
                row("city", "4", "Chebba", 1.0),
                row("attraction", "0b6f", "Chebba Fort", 0.5),
                row("mystery", "1", "Ignored", 0.1),
            ]])
            .into_connection();
        let db = Arc::new(db);
        let repo = SearchRepository::new(db.clone());

        let results = repo.search("chebba", Some(3), None).await.unwrap();

        let kinds: Vec<SearchKind> = results.iter().map(|h| h.kind).collect();
        assert_eq!(kinds, vec![SearchKind::City, SearchKind::Attraction]);
        let titles: Vec<&str> = (&results).into_iter().map(|h| h.title.as_str()).collect();
        assert_eq!(titles, vec!["Chebba", "Chebba Fort"]);

        drop(repo);
        let log = fixtures::transaction_log(db);
        assert!(log.contains("UNION ALL"));
        assert!(log.contains("%chebba%"));
    }

    #[test]
    fn test_next_offset_only_for_full_pages() {
        let hit = SearchHit {
            kind: SearchKind::Guide,
            id: "g".to_string(),
            title: "Hedi".to_string(),
            url: "/guides/g".to_string(),
            score: 0.9,
        };
        let full = SearchResults {
            hits: vec![hit.clone(), hit.clone()],
            limit: 2,
            offset: 4,
        };
        assert_eq!(full.next_offset(), Some(6));

        let partial = SearchResults {
            hits: vec![hit],
            limit: 2,
            offset: 4,
        };
        assert_eq!(partial.next_offset(), None);
    }
}
