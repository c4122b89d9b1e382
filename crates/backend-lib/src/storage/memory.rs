//! In-process storage backed by concurrent maps.
use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use records_common::{Employee, EmployeeInput};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    search_matches, sort_oldest_first, CredentialRecord, CredentialStore, EmployeeStore,
    NewCredential,
};
use crate::config::IdentifierMatch;
use crate::error::{AppError, AppResult};

/// Storage that lives only as long as the process
#[derive(Clone, Default)]
pub struct MemoryStorage {
    users: Arc<DashMap<Uuid, CredentialRecord>>,
    employees: Arc<DashMap<Uuid, Employee>>,
    // Serializes uniqueness checks with the write that follows them.
    write_lock: Arc<Mutex<()>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn employee_email_taken(&self, email: &str, except: Option<Uuid>) -> bool {
        self.employees
            .iter()
            .any(|e| Some(e.id) != except && e.email.eq_ignore_ascii_case(email))
    }
}

#[async_trait]
impl CredentialStore for MemoryStorage {
    async fn find_by_identifier(
        &self,
        identifier: &str,
        matching: IdentifierMatch,
    ) -> AppResult<Option<CredentialRecord>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.matches(identifier, matching))
            .map(|u| u.value().clone()))
    }

    async fn create(&self, record: NewCredential) -> AppResult<CredentialRecord> {
        let _guard = self.write_lock.lock().await;

        if self.users.iter().any(|u| u.email == record.email) {
            return Err(AppError::DuplicateIdentifier(record.email));
        }
        if self.users.iter().any(|u| u.username == record.username) {
            return Err(AppError::DuplicateIdentifier(record.username));
        }

        let stored = record.into_record(Uuid::new_v4(), Utc::now());
        self.users.insert(stored.id, stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl EmployeeStore for MemoryStorage {
    async fn list(&self) -> AppResult<Vec<Employee>> {
        let mut all: Vec<Employee> = self.employees.iter().map(|e| e.value().clone()).collect();
        sort_oldest_first(&mut all);
        Ok(all)
    }

    async fn get(&self, id: Uuid) -> AppResult<Option<Employee>> {
        Ok(self.employees.get(&id).map(|e| e.value().clone()))
    }

    async fn search(&self, term: &str) -> AppResult<Vec<Employee>> {
        let mut found: Vec<Employee> = self
            .employees
            .iter()
            .filter(|e| search_matches(e, term))
            .map(|e| e.value().clone())
            .collect();
        sort_oldest_first(&mut found);
        Ok(found)
    }

    async fn insert(&self, input: EmployeeInput) -> AppResult<Employee> {
        let _guard = self.write_lock.lock().await;

        if self.employee_email_taken(&input.email, None) {
            return Err(AppError::Conflict(format!("employee email {}", input.email)));
        }

        let employee = Employee::from_input(Uuid::new_v4(), input, Utc::now());
        self.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update(&self, id: Uuid, input: EmployeeInput) -> AppResult<Option<Employee>> {
        let _guard = self.write_lock.lock().await;

        if !self.employees.contains_key(&id) {
            return Ok(None);
        }
        if self.employee_email_taken(&input.email, Some(id)) {
            return Err(AppError::Conflict(format!("employee email {}", input.email)));
        }

        Ok(self.employees.get_mut(&id).map(|mut e| {
            e.apply(input);
            e.value().clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let _guard = self.write_lock.lock().await;
        Ok(self.employees.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::fixtures::{credential, employee};

    #[tokio::test]
    async fn test_duplicate_email_and_username() {
        let store = MemoryStorage::new();
        let first = store.create(credential("ab", "a@b.com")).await.unwrap();

        let err = store.create(credential("other", "a@b.com")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentifier(_)));
        let err = store.create(credential("ab", "x@y.com")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateIdentifier(_)));

        let found = store
            .find_by_identifier("a@b.com", IdentifierMatch::Email)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, first.id);
        assert_eq!(found.first_name, "A");
    }

    #[tokio::test]
    async fn test_employee_crud() {
        let store = MemoryStorage::new();
        let created = store
            .insert(employee("ada@example.com", "Engineer", "R&D"))
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);

        let mut changed = employee("ada@example.com", "Manager", "R&D");
        changed.salary = 9000.0;
        let updated = store.update(created.id, changed).await.unwrap().unwrap();
        assert_eq!(updated.designation, "Manager");
        assert_eq!(updated.created_at, created.created_at);

        assert!(store
            .update(Uuid::new_v4(), employee("x@example.com", "A", "B"))
            .await
            .unwrap()
            .is_none());

        assert!(store.delete(created.id).await.unwrap());
        assert!(!store.delete(created.id).await.unwrap());
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_employee_email_is_unique() {
        let store = MemoryStorage::new();
        let a = store.insert(employee("a@example.com", "A", "B")).await.unwrap();
        store.insert(employee("b@example.com", "A", "B")).await.unwrap();

        assert!(matches!(
            store.insert(employee("A@example.com", "A", "B")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            store.update(a.id, employee("b@example.com", "A", "B")).await,
            Err(AppError::Conflict(_))
        ));
        // Keeping its own email is fine.
        assert!(store
            .update(a.id, employee("a@example.com", "C", "D"))
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_search_by_designation_or_department() {
        let store = MemoryStorage::new();
        store.insert(employee("a@example.com", "Engineer", "R&D")).await.unwrap();
        store.insert(employee("b@example.com", "Accountant", "Finance")).await.unwrap();
        store.insert(employee("c@example.com", "Engineer", "Finance")).await.unwrap();

        assert_eq!(store.search("engineer").await.unwrap().len(), 2);
        assert_eq!(store.search("Finance").await.unwrap().len(), 2);
        assert!(store.search("Sales").await.unwrap().is_empty());
    }
}
