//! Read-only repository for user accounts.

use chrono::{DateTime, Utc};

use hireboard_models::{Role, User, UserId};

use crate::client::FirestoreClient;
use crate::error::{FirestoreError, FirestoreResult};
use crate::types::{Document, FromFirestoreValue};

/// Top-level collection holding user accounts.
pub const USERS_COLLECTION: &str = "users";

/// Repository for user documents.
pub struct UserRepository {
    client: FirestoreClient,
}

impl UserRepository {
    pub fn new(client: FirestoreClient) -> Self {
        Self { client }
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &UserId) -> FirestoreResult<Option<User>> {
        let doc = self
            .client
            .with_retry("get_user", || {
                self.client.get_document(USERS_COLLECTION, user_id.as_str())
            })
            .await?;

        doc.map(|d| document_to_user(&d, user_id)).transpose()
    }
}

fn document_to_user(doc: &Document, user_id: &UserId) -> FirestoreResult<User> {
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

    let role = Role::parse(&get_string("role")).ok_or_else(|| {
        FirestoreError::invalid_response(format!("user {} has no valid role", user_id))
    })?;

    Ok(User {
        id: user_id.clone(),
        name: get_string("name"),
        email: get_string("email"),
        phone: get_string("phone"),
        role,
        created_at: fields
            .get("created_at")
            .and_then(DateTime::<Utc>::from_firestore_value)
            .unwrap_or_default(),
    })
}
