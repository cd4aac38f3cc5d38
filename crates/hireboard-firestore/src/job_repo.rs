//! Read-only repository for job postings.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::warn;

use hireboard_models::{Job, JobId, JobQuery, UserId};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, Filter, FromFirestoreValue, Order, StructuredQuery, Value};

/// Top-level collection holding job postings.
pub const JOBS_COLLECTION: &str = "jobs";

/// Most postings fetched when a keyword has to be matched in-process.
const KEYWORD_SCAN_LIMIT: i32 = 500;

/// Repository for job documents.
pub struct JobRepository {
    client: FirestoreClient,
}

impl JobRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a job by ID.
    pub async fn get(&self, job_id: &JobId) -> FirestoreResult<Option<Job>> {
        let doc = self
            .client
            .with_retry("get_job", || {
                self.client.get_document(JOBS_COLLECTION, job_id.as_str())
            })
            .await?;

        doc.map(|d| document_to_job(&d, job_id.as_str())).transpose()
    }

    /// List open jobs matching `query`, one page.
    ///
    /// Category, ordering and paging run in Firestore. Firestore has no
    /// substring operator, so with a keyword the first 500 ordered
    /// candidates are fetched and the keyword and paging are applied here.
    /// Matches past that window are not returned.
    pub async fn list(&self, query: &JobQuery) -> FirestoreResult<Vec<Job>> {
        let structured = build_list_query(query);
        let docs = self
            .client
            .with_retry("list_jobs", || self.client.run_query(structured.clone()))
            .await?;

        let mut jobs = Vec::with_capacity(docs.len());
        for doc in &docs {
            let id = doc.id().unwrap_or_default().to_string();
            match document_to_job(doc, &id) {
                Ok(job) => jobs.push(job),
                Err(e) => warn!(job_id = %id, "Skipping malformed job document: {}", e),
            }
        }

        if query.keyword.is_some() {
            if keyword_scan_truncated(docs.len()) {
                warn!(
                    keyword = query.keyword.as_deref().unwrap_or_default(),
                    scanned = docs.len(),
                    "Keyword search hit the scan limit; later matches are omitted"
                );
            }
            let matching = jobs.into_iter().filter(|j| query.matches_keyword(j)).collect();
            return Ok(query.paginate(matching));
        }
        Ok(jobs)
    }
}

/// Whether a keyword scan filled its window and may have missed postings.
fn keyword_scan_truncated(fetched: usize) -> bool {
    fetched >= KEYWORD_SCAN_LIMIT as usize
}

/// Translate a catalogue query into a Firestore structured query.
pub fn build_list_query(query: &JobQuery) -> StructuredQuery {
    let mut filters = vec![Filter::equal("expired", Value::BooleanValue(false))];
    if let Some(category) = &query.category {
        filters.push(Filter::equal("category", Value::StringValue(category.clone())));
    }

    let mut structured = StructuredQuery::collection(JOBS_COLLECTION);
    structured.r#where = Some(Filter::and(filters));
    structured.order_by = Some(vec![Order::new(query.sort.field(), query.sort.is_descending())]);

    if query.keyword.is_some() {
        structured.limit = Some(KEYWORD_SCAN_LIMIT);
    } else {
        structured.offset = Some(i32::try_from(query.offset()).unwrap_or(i32::MAX));
        structured.limit = Some(i32::try_from(query.limit).unwrap_or(i32::MAX));
    }
    structured
}

fn document_to_job(doc: &Document, job_id: &str) -> FirestoreResult<Job> {
    let fields: &HashMap<String, Value> = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::invalid_response("Document has no fields"))?;

    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let posted_by = get_string("posted_by");
    if posted_by.is_empty() {
        return Err(FirestoreError::invalid_response(format!(
            "job {} has no posted_by",
            job_id
        )));
    }

    Ok(Job {
        id: JobId::from_string(job_id),
        title: get_string("title"),
        description: get_string("description"),
        category: get_string("category"),
        country: get_string("country"),
        city: get_string("city"),
        salary: fields
            .get("salary")
            .and_then(u64::from_firestore_value)
            .unwrap_or(0),
        posted_by: UserId::from(posted_by),
        posted_on: fields
            .get("posted_on")
            .and_then(DateTime::<Utc>::from_firestore_value)
            .unwrap_or_default(),
        expired: fields
            .get("expired")
            .and_then(bool::from_firestore_value)
            .unwrap_or(false),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_query_pushes_paging_to_firestore() {
        let query = JobQuery::from_params(None, Some("IT"), Some("salaryLow"), Some(3), Some(8));
        let structured = build_list_query(&query);
        assert_eq!(structured.offset, Some(16));
        assert_eq!(structured.limit, Some(8));

        let order = &structured.order_by.as_ref().unwrap()[0];
        assert_eq!(order.field.field_path, "salary");
        assert_eq!(order.direction, "ASCENDING");

        let composite = structured.r#where.unwrap().composite_filter.unwrap();
        assert_eq!(composite.filters.len(), 2);
    }

    #[test]
    fn test_list_query_offset_never_wraps() {
        let query = JobQuery::from_params(None, None, None, Some(50_000_000), Some(50));
        let structured = build_list_query(&query);
        let offset = structured.offset.unwrap();
        assert!(offset >= 0);
        assert_eq!(offset as usize, query.offset());

        let mut query = query;
        query.page = u32::MAX;
        assert_eq!(build_list_query(&query).offset, Some(i32::MAX));
    }

    #[test]
    fn test_list_query_with_keyword_scans_without_offset() {
        let query = JobQuery::from_params(Some("rust"), None, None, Some(2), None);
        let structured = build_list_query(&query);
        assert_eq!(structured.offset, None);
        assert_eq!(structured.limit, Some(KEYWORD_SCAN_LIMIT));
        // Only the expired filter remains, so it is not wrapped.
        assert!(structured.r#where.unwrap().field_filter.is_some());
    }

    #[test]
    fn test_keyword_scan_truncation() {
        assert!(!keyword_scan_truncated(0));
        assert!(!keyword_scan_truncated(KEYWORD_SCAN_LIMIT as usize - 1));
        assert!(keyword_scan_truncated(KEYWORD_SCAN_LIMIT as usize));
    }

    #[test]
    fn test_document_to_job_requires_poster() {
        let mut fields = HashMap::new();
        fields.insert("title".to_string(), Value::StringValue("Dev".into()));
        let doc = Document::new(fields.clone());
        assert!(document_to_job(&doc, "j1").is_err());

        fields.insert("posted_by".to_string(), Value::StringValue("emp".into()));
        fields.insert("salary".to_string(), Value::IntegerValue("5000".into()));
        let job = document_to_job(&Document::new(fields), "j1").unwrap();
        assert_eq!(job.salary, 5000);
        assert_eq!(job.posted_by, UserId::from("emp"));
        assert!(!job.expired);
    }
}
