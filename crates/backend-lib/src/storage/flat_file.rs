// ============================
// crates/backend-lib/src/storage/flat_file.rs
// ============================
//! Flat-file storage: one JSON document per record.
use async_trait::async_trait;
use chrono::Utc;
use records_common::{Employee, EmployeeInput};
use serde::{de::DeserializeOwned, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{fs as tokio_fs, sync::Mutex};
use uuid::Uuid;

use super::{
    search_matches, sort_oldest_first, CredentialRecord, CredentialStore, EmployeeStore,
    NewCredential,
};
use crate::config::IdentifierMatch;
use crate::error::{AppError, AppResult};

const USERS_DIR: &str = "users";
const EMPLOYEES_DIR: &str = "employees";

/// Flat-file implementation of the store traits
#[derive(Clone)]
pub struct FlatFileStorage {
    root: PathBuf,
    // Serializes uniqueness checks with the write that follows them.
    write_lock: Arc<Mutex<()>>,
}

impl FlatFileStorage {
    pub fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(root.join(USERS_DIR))?;
        fs::create_dir_all(root.join(EMPLOYEES_DIR))?;
        Ok(Self {
            root,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn doc_path(&self, dir: &str, id: Uuid) -> PathBuf {
        self.root.join(dir).join(format!("{id}.json"))
    }

    /// Read every `.json` document in `dir`. Fails if any of them does not parse.
    async fn read_all<T: DeserializeOwned>(&self, dir: &str) -> AppResult<Vec<T>> {
        let mut entries = tokio_fs::read_dir(self.root.join(dir)).await?;
        let mut docs = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = tokio_fs::read_to_string(&path).await?;
            // A corrupt record must not vanish from lookups and uniqueness checks.
            let doc = serde_json::from_str(&content).map_err(|e| {
                tracing::error!(path = %path.display(), error = %e, "unreadable document");
                AppError::Storage(format!("unreadable document {}: {e}", path.display()))
            })?;
            docs.push(doc);
        }

        Ok(docs)
    }

    async fn read_one<T: DeserializeOwned>(&self, dir: &str, id: Uuid) -> AppResult<Option<T>> {
        let path = self.doc_path(dir, id);
        match tokio_fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a document through a temp file so readers never see half of it
    async fn write_doc<T: Serialize>(&self, dir: &str, id: Uuid, doc: &T) -> AppResult<()> {
        let path = self.doc_path(dir, id);
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(doc)?;
        tokio_fs::write(&tmp, json).await?;
        tokio_fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn employee_email_taken(&self, email: &str, except: Option<Uuid>) -> AppResult<bool> {
        let employees: Vec<Employee> = self.read_all(EMPLOYEES_DIR).await?;
        Ok(employees
            .iter()
            .any(|e| Some(e.id) != except && e.email.eq_ignore_ascii_case(email)))
    }
}

#[async_trait]
impl CredentialStore for FlatFileStorage {
    async fn find_by_identifier(
        &self,
        identifier: &str,
        matching: IdentifierMatch,
    ) -> AppResult<Option<CredentialRecord>> {
        let users: Vec<CredentialRecord> = self.read_all(USERS_DIR).await?;
        Ok(users.into_iter().find(|u| u.matches(identifier, matching)))
    }

    async fn create(&self, record: NewCredential) -> AppResult<CredentialRecord> {
        let _guard = self.write_lock.lock().await;

        let users: Vec<CredentialRecord> = self.read_all(USERS_DIR).await?;
        if users.iter().any(|u| u.email == record.email) {
            return Err(AppError::DuplicateIdentifier(record.email));
        }
        if users.iter().any(|u| u.username == record.username) {
            return Err(AppError::DuplicateIdentifier(record.username));
        }

        let stored = record.into_record(Uuid::new_v4(), Utc::now());
        self.write_doc(USERS_DIR, stored.id, &stored).await?;
        Ok(stored)
    }
}

#[async_trait]
impl EmployeeStore for FlatFileStorage {
    async fn list(&self) -> AppResult<Vec<Employee>> {
        let mut all: Vec<Employee> = self.read_all(EMPLOYEES_DIR).await?;
        sort_oldest_first(&mut all);
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Employee>> {
        self.read_one(EMPLOYEES_DIR, id).await
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Employee>> {
        let mut found: Vec<Employee> = self
            .read_all::<Employee>(EMPLOYEES_DIR)
            .await?
            .into_iter()
            .filter(|e| search_matches(e, term))
            .collect();
        sort_oldest_first(&mut found);
        Ok(found)
    }

    async fn insert(&self, input: EmployeeInput) -> AppResult<Employee> {
        let _guard = self.write_lock.lock().await;

        if self.employee_email_taken(&input.email, None).await? {
            return Err(AppError::Conflict(format!("employee email {}", input.email)));
        }

        let employee = Employee::from_input(Uuid::new_v4(), input, Utc::now());
        self.write_doc(EMPLOYEES_DIR, employee.id, &employee).await?;
        Ok(employee)
    }

    async fn update(&self, id: Uuid, input: EmployeeInput) -> AppResult<Option<Employee>> {
        let _guard = self.write_lock.lock().await;

        let Some(mut employee) = self.read_one::<Employee>(EMPLOYEES_DIR, id).await? else {
            return Ok(None);
        };
        if self.employee_email_taken(&input.email, Some(id)).await? {
            return Err(AppError::Conflict(format!("employee email {}", input.email)));
        }

        employee.apply(input);
        self.write_doc(EMPLOYEES_DIR, id, &employee).await?;
        Ok(Some(employee))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;

        match tokio_fs::remove_file(self.doc_path(EMPLOYEES_DIR, id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
