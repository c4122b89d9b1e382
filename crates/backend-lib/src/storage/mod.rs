// ============================
// crates/backend-lib/src/storage/mod.rs
// ============================
//! Storage abstraction for user credentials and employee documents.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use records_common::{Employee, EmployeeInput, PublicUser};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::IdentifierMatch;
use crate::error::AppResult;
use crate::validation::normalize_email;

mod flat_file;
mod memory;

pub use flat_file::FlatFileStorage;
pub use memory::MemoryStorage;

/// A persisted user with its password hash
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CredentialRecord {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    /// Always normalized (trimmed, lower-case)
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl CredentialRecord {
    /// The salted hash to compare a login password against
    pub fn stored_hash(&self) -> &str {
        &self.password_hash
    }

    /// Fields safe to hand back to a client
    pub fn to_public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }

    /// Whether `identifier` names this record under the given matching rule
    pub fn matches(&self, identifier: &str, matching: IdentifierMatch) -> bool {
        let by_email = || self.email == normalize_email(identifier);
        let by_username = || self.username == identifier.trim();
        match matching {
            IdentifierMatch::Email => by_email(),
            IdentifierMatch::Username => by_username(),
            IdentifierMatch::EmailOrUsername => by_email() || by_username(),
        }
    }
}

/// A user about to be stored. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewCredential {
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
}

impl NewCredential {
    fn into_record(self, id: Uuid, created_at: DateTime<Utc>) -> CredentialRecord {
        CredentialRecord {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            created_at,
        }
    }
}

/// Persisted user records
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look a user up by username or email
    async fn find_by_identifier(
        &self,
        identifier: &str,
        matching: IdentifierMatch,
    ) -> AppResult<Option<CredentialRecord>>;

    /// Store a new user. Fails with `DuplicateIdentifier` when the email or
    /// username is taken.
    async fn create(&self, record: NewCredential) -> AppResult<CredentialRecord>;
}

/// Persisted employee documents
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// All employees, oldest first
    async fn list(&self) -> AppResult<Vec<Employee>>;

    async fn get(&self, id: Uuid) -> AppResult<Option<Employee>>;

    /// Employees whose designation or department equals `term`, ignoring case
    async fn search(&self, term: &str) -> AppResult<Vec<Employee>>;

    /// Store a new employee. Fails with `Conflict` when the email is taken.
    async fn insert(&self, input: EmployeeInput) -> AppResult<Employee>;

    /// Replace an employee's fields; `None` when it does not exist
    async fn update(&self, id: Uuid, input: EmployeeInput) -> AppResult<Option<Employee>>;

    /// Remove an employee; `false` when it did not exist
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

/// Both stores behind one backend
pub trait Storage: CredentialStore + EmployeeStore {}

impl<T: CredentialStore + EmployeeStore> Storage for T {}

pub(crate) fn search_matches(employee: &Employee, term: &str) -> bool {
    employee.designation.eq_ignore_ascii_case(term) || employee.department.eq_ignore_ascii_case(term)
}

pub(crate) fn sort_oldest_first(employees: &mut [Employee]) {
    employees.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}
