//! Repository for job applications.
//!
//! Documents live in the top-level `applications` collection. Resume bytes
//! are stored inline as a `bytesValue` under `resume.data`; list queries
//! project that field out so it never leaves Firestore for list views.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use hireboard_models::{
    Application, ApplicationId, ApplicationStatus, Identity, JobId, ResumeArtifact, Role, UserId,
};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{
    Document, Filter, FromFirestoreValue, Order, Projection, StructuredQuery, ToFirestoreValue,
    Value,
};

/// Top-level collection holding applications.
pub const APPLICATIONS_COLLECTION: &str = "applications";

/// Every stored field except the resume bytes.
const SUMMARY_FIELDS: [&str; 12] = [
    "name",
    "email",
    "phone",
    "address",
    "cover_letter",
    "applicant_id",
    "employer_id",
    "resume.content_type",
    "resume.original_name",
    "status",
    "job_id",
    "applied_at",
];

/// Repository for application documents.
pub struct ApplicationRepository {
    client: FirestoreClient,
}

impl ApplicationRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Create a new application record.
    pub async fn create(&self, application: &Application) -> FirestoreResult<()> {
        let fields = application_to_fields(application);
        self.client
            .create_document(APPLICATIONS_COLLECTION, application.id.as_str(), fields)
            .await?;
        info!(
            application_id = %application.id,
            job_id = %application.job_id,
            "Created application record"
        );
        Ok(())
    }

    /// Get an application, resume bytes included.
    pub async fn get(&self, id: &ApplicationId) -> FirestoreResult<Option<Application>> {
        let doc = self
            .client
            .with_retry("get_application", || {
                self.client.get_document(APPLICATIONS_COLLECTION, id.as_str())
            })
            .await?;

        doc.map(|d| document_to_application(&d, id.as_str())).transpose()
    }

    /// Applications whose snapshotted employer is `employer`, newest first.
    /// Resume bytes are left empty.
    pub async fn list_by_employer(&self, employer: &UserId) -> FirestoreResult<Vec<Application>> {
        self.list_by("employer_id.user", employer).await
    }

    /// Applications submitted by `applicant`, newest first. Resume bytes are left empty.
    pub async fn list_by_applicant(&self, applicant: &UserId) -> FirestoreResult<Vec<Application>> {
        self.list_by("applicant_id.user", applicant).await
    }

    async fn list_by(&self, field_path: &str, user: &UserId) -> FirestoreResult<Vec<Application>> {
        let query = summary_query(field_path, user);
        let docs = self
            .client
            .with_retry("list_applications", || self.client.run_query(query.clone()))
            .await?;

        let mut applications = Vec::with_capacity(docs.len());
        for doc in &docs {
            let id = doc.id().unwrap_or_default().to_string();
            match document_to_application(doc, &id) {
                Ok(app) => applications.push(app),
                Err(e) => warn!(application_id = %id, "Skipping malformed application: {}", e),
            }
        }
        Ok(applications)
    }

    /// Overwrite the status. `NotFound` if the application is gone.
    pub async fn update_status(
        &self,
        id: &ApplicationId,
        status: ApplicationStatus,
    ) -> FirestoreResult<()> {
        let mut fields = HashMap::new();
        fields.insert("status".to_string(), status.as_str().to_firestore_value());
        fields.insert("updated_at".to_string(), Utc::now().to_firestore_value());

        self.client
            .with_retry("update_application_status", || {
                self.client.update_existing_document(
                    APPLICATIONS_COLLECTION,
                    id.as_str(),
                    fields.clone(),
                    &["status", "updated_at"],
                )
            })
            .await?;
        Ok(())
    }

    /// Delete an application.
    pub async fn delete(&self, id: &ApplicationId) -> FirestoreResult<()> {
        self.client
            .with_retry("delete_application", || {
                self.client.delete_document(APPLICATIONS_COLLECTION, id.as_str())
            })
            .await?;
        info!(application_id = %id, "Deleted application record");
        Ok(())
    }
}

/// Query for one party's applications with the resume bytes masked out.
pub fn summary_query(field_path: &str, user: &UserId) -> StructuredQuery {
    let mut query = StructuredQuery::collection(APPLICATIONS_COLLECTION);
    query.select = Some(Projection::of(&SUMMARY_FIELDS));
    query.r#where = Some(Filter::equal(field_path, user.as_str().to_firestore_value()));
    query.order_by = Some(vec![Order::new("applied_at", true)]);
    query
}

fn identity_to_value(identity: &Identity) -> Value {
    let mut fields = HashMap::new();
    fields.insert("user".to_string(), identity.user.as_str().to_firestore_value());
    fields.insert("role".to_string(), identity.role.as_str().to_firestore_value());
    Value::map(fields)
}

fn identity_from_value(value: Option<&Value>, key: &str) -> FirestoreResult<Identity> {
    let fields = value
        .and_then(Value::as_map)
        .ok_or_else(|| FirestoreError::invalid_response(format!("missing {}", key)))?;

    let user = fields
        .get("user")
        .and_then(String::from_firestore_value)
        .ok_or_else(|| FirestoreError::invalid_response(format!("missing {}.user", key)))?;
    let role = fields
        .get("role")
        .and_then(String::from_firestore_value)
        .and_then(|r| Role::parse(&r))
        .ok_or_else(|| FirestoreError::invalid_response(format!("invalid {}.role", key)))?;

    Ok(Identity::new(UserId::from(user), role))
}

fn application_to_fields(app: &Application) -> HashMap<String, Value> {
    let mut resume = HashMap::new();
    resume.insert("data".to_string(), Value::bytes(&app.resume.data));
    resume.insert(
        "content_type".to_string(),
        app.resume.content_type.to_firestore_value(),
    );
    resume.insert(
        "original_name".to_string(),
        app.resume.original_name.to_firestore_value(),
    );

    let mut fields = HashMap::new();
    fields.insert("name".to_string(), app.name.to_firestore_value());
    fields.insert("email".to_string(), app.email.to_firestore_value());
    fields.insert("phone".to_string(), app.phone.to_firestore_value());
    fields.insert("address".to_string(), app.address.to_firestore_value());
    fields.insert("cover_letter".to_string(), app.cover_letter.to_firestore_value());
    fields.insert("applicant_id".to_string(), identity_to_value(&app.applicant_id));
    fields.insert("employer_id".to_string(), identity_to_value(&app.employer_id));
    fields.insert("resume".to_string(), Value::map(resume));
    fields.insert("status".to_string(), app.status.as_str().to_firestore_value());
    fields.insert("job_id".to_string(), app.job_id.as_str().to_firestore_value());
    fields.insert("applied_at".to_string(), app.applied_at.to_firestore_value());
    fields
}

fn document_to_application(doc: &Document, id: &str) -> FirestoreResult<Application> {
    let fields = doc
        .fields
        .as_ref()
        .ok_or_else(|| FirestoreError::invalid_response("Document has no fields"))?;

    let get_string = |key: &str| -> String {
        fields
            .get(key)
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let resume_fields = fields.get("resume").and_then(Value::as_map);
    let resume_string = |key: &str| -> String {
        resume_fields
            .and_then(|r| r.get(key))
            .and_then(String::from_firestore_value)
            .unwrap_or_default()
    };

    let status_raw = get_string("status");
    let status = if status_raw.is_empty() {
        ApplicationStatus::Pending
    } else {
        status_raw
            .parse()
            .map_err(|e: hireboard_models::ParseStatusError| {
                FirestoreError::invalid_response(e.to_string())
            })?
    };

    Ok(Application {
        id: ApplicationId::from_string(id),
        name: get_string("name"),
        email: get_string("email"),
        phone: get_string("phone"),
        address: get_string("address"),
        cover_letter: get_string("cover_letter"),
        applicant_id: identity_from_value(fields.get("applicant_id"), "applicant_id")?,
        employer_id: identity_from_value(fields.get("employer_id"), "employer_id")?,
        resume: ResumeArtifact {
            data: resume_fields
                .and_then(|r| r.get("data"))
                .and_then(Value::as_bytes)
                .unwrap_or_default(),
            content_type: resume_string("content_type"),
            original_name: resume_string("original_name"),
        },
        status,
        job_id: JobId::from(get_string("job_id")),
        applied_at: fields
            .get("applied_at")
            .and_then(DateTime::<Utc>::from_firestore_value)
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hireboard_models::{ApplicantDetails, Job};

    fn sample() -> Application {
        let job = Job::new("Dev", "IT", "Kenya", 10, UserId::from("emp-1"));
        let details = ApplicantDetails {
            name: "Grace".into(),
            email: "grace@example.com".into(),
            phone: "0700".into(),
            address: "Nairobi".into(),
            cover_letter: "Hello".into(),
        };
        let resume = ResumeArtifact {
            data: vec![9, 8, 7],
            content_type: "image/jpeg".into(),
            original_name: "cv.jpg".into(),
        };
        Application::new(details, UserId::from("seeker-1"), &job, resume)
    }

    #[test]
    fn test_fields_roundtrip_through_document() {
        let app = sample();
        let doc = Document::new(application_to_fields(&app));
        let parsed = document_to_application(&doc, app.id.as_str()).unwrap();
        assert_eq!(parsed.employer_id, app.employer_id);
        assert_eq!(parsed.applicant_id, app.applicant_id);
        assert_eq!(parsed.resume, app.resume);
        assert_eq!(parsed.status, ApplicationStatus::Pending);
    }

    #[test]
    fn test_projected_document_has_empty_resume_data() {
        let app = sample();
        let mut fields = application_to_fields(&app);
        if let Some(Value::MapValue(resume)) = fields.get_mut("resume") {
            resume.fields.as_mut().unwrap().remove("data");
        }
        let parsed = document_to_application(&Document::new(fields), "a1").unwrap();
        assert!(!parsed.resume.has_data());
        assert_eq!(parsed.resume.content_type, "image/jpeg");
    }

    #[test]
    fn test_unknown_status_is_invalid() {
        let app = sample();
        let mut fields = application_to_fields(&app);
        fields.insert("status".to_string(), Value::StringValue("Hired".into()));
        let result = document_to_application(&Document::new(fields), "a1");
        assert!(matches!(result, Err(FirestoreError::InvalidResponse(_))));
    }

    #[test]
    fn test_summary_query_masks_resume_bytes() {
        let query = summary_query("employer_id.user", &UserId::from("emp-1"));
        let paths: Vec<&str> = query
            .select
            .as_ref()
            .unwrap()
            .fields
            .iter()
            .map(|f| f.field_path.as_str())
            .collect();
        assert!(!paths.contains(&"resume.data"));
        assert!(!paths.contains(&"resume"));
        let filter = query.r#where.unwrap().field_filter.unwrap();
        assert_eq!(filter.field.field_path, "employer_id.user");
    }
}
