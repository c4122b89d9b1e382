// ============================
// crates/backend-lib/src/employees.rs
// ============================
//! Employee operations. Every one of them requires an identity.
//!
//! The identity check is always the first statement: callers without one
//! learn nothing about ids, payload validation or stored data.
use std::sync::Arc;

use metrics::counter;
use records_common::{DeleteResponse, Employee};
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::{require_identity, Identity};
use crate::error::{AppError, AppResult};
use crate::metrics::{ACCESS_DENIED, EMPLOYEE_CREATED, EMPLOYEE_DELETED, EMPLOYEE_UPDATED};
use crate::storage::EmployeeStore;
use crate::validation::{
    decode_employee_input, decode_search_query, normalize_employee_input, validate_employee_input,
    validate_search_term,
};

/// Access-controlled employee operations
pub struct EmployeeService {
    store: Arc<dyn EmployeeStore>,
}

fn authorize(identity: Option<&Identity>) -> AppResult<&Identity> {
    require_identity(identity).inspect_err(|_| {
        counter!(ACCESS_DENIED).increment(1);
    })
}

fn parse_id(id: &str) -> AppResult<Uuid> {
    Uuid::parse_str(id.trim()).map_err(|_| AppError::NotFound(format!("employee {id}")))
}

impl EmployeeService {
    pub fn new(store: Arc<dyn EmployeeStore>) -> Self {
        Self { store }
    }

    /// Every employee, oldest first
    pub async fn list(&self, identity: Option<&Identity>) -> AppResult<Vec<Employee>> {
        let who = authorize(identity)?;
        debug!(subject = %who.subject, "listing employees");
        self.store.list().await
    }

    /// One employee by id
    pub async fn find(&self, identity: Option<&Identity>, id: &str) -> AppResult<Employee> {
        authorize(identity)?;
        let id = parse_id(id)?;
        self.store
            .get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("employee {id}")))
    }

    /// Employees whose designation or department equals `term`
    pub async fn search(&self, identity: Option<&Identity>, term: &str) -> AppResult<Vec<Employee>> {
        authorize(identity)?;
        self.search_term(term).await
    }

    /// Like [`search`](Self::search), reading `term` from a raw query string
    pub async fn search_query(
        &self,
        identity: Option<&Identity>,
        raw_query: Option<&str>,
    ) -> AppResult<Vec<Employee>> {
        authorize(identity)?;
        let query = decode_search_query(raw_query)?;
        self.search_term(&query.term).await
    }

    async fn search_term(&self, term: &str) -> AppResult<Vec<Employee>> {
        let term = validate_search_term(term)?;
        self.store.search(term).await
    }

    /// Create an employee from a JSON body
    pub async fn create(&self, identity: Option<&Identity>, body: &[u8]) -> AppResult<Employee> {
        let who = authorize(identity)?;
        let input = normalize_employee_input(decode_employee_input(body)?);
        validate_employee_input(&input)?;

        let employee = self.store.insert(input).await?;
        counter!(EMPLOYEE_CREATED).increment(1);
        info!(employee_id = %employee.id, by = %who.subject, "employee created");
        Ok(employee)
    }

    /// Replace an employee's fields from a JSON body
    pub async fn update(
        &self,
        identity: Option<&Identity>,
        id: &str,
        body: &[u8],
    ) -> AppResult<Employee> {
        let who = authorize(identity)?;
        let id = parse_id(id)?;
        let input = normalize_employee_input(decode_employee_input(body)?);
        validate_employee_input(&input)?;

        let employee = self
            .store
            .update(id, input)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("employee {id}")))?;
        counter!(EMPLOYEE_UPDATED).increment(1);
        info!(employee_id = %id, by = %who.subject, "employee updated");
        Ok(employee)
    }

    /// Remove an employee. Deleting a missing id is not an error.
    pub async fn delete(&self, identity: Option<&Identity>, id: &str) -> AppResult<DeleteResponse> {
        let who = authorize(identity)?;
        let Ok(id) = parse_id(id) else {
            return Ok(DeleteResponse { deleted: false });
        };

        let deleted = self.store.delete(id).await?;
        if deleted {
            counter!(EMPLOYEE_DELETED).increment(1);
            info!(employee_id = %id, by = %who.subject, "employee deleted");
        }
        Ok(DeleteResponse { deleted })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{fixtures::employee, MemoryStorage};

    fn who() -> Identity {
        Identity {
            subject: "u-1".into(),
            username: Some("ab".into()),
            email: None,
        }
    }

    fn service() -> (EmployeeService, Arc<MemoryStorage>) {
        let store = Arc::new(MemoryStorage::new());
        (EmployeeService::new(store.clone()), store)
    }

    fn body(email: &str) -> Vec<u8> {
        serde_json::to_vec(&employee(email, "Engineer", "R&D")).unwrap()
    }

    #[tokio::test]
    async fn test_every_operation_rejects_anonymous_callers() {
        let (svc, store) = service();
        let existing = store.insert(employee("a@example.com", "Engineer", "R&D")).await.unwrap();
        let id = existing.id.to_string();

        assert!(matches!(svc.list(None).await, Err(AppError::Unauthorized)));
        assert!(matches!(svc.find(None, &id).await, Err(AppError::Unauthorized)));
        assert!(matches!(svc.search(None, "R&D").await, Err(AppError::Unauthorized)));
        assert!(matches!(
            svc.create(None, &body("b@example.com")).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            svc.update(None, &id, &body("c@example.com")).await,
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(svc.delete(None, &id).await, Err(AppError::Unauthorized)));

        // Nothing changed.
        let all = store.list().await.unwrap();
        assert_eq!(all, vec![existing]);
    }

    #[tokio::test]
    async fn test_authorization_precedes_validation() {
        let (svc, _) = service();
        let mut low = employee("a@example.com", "Engineer", "R&D");
        low.salary = 10.0;
        let low = serde_json::to_vec(&low).unwrap();

        assert!(matches!(svc.create(None, &low).await, Err(AppError::Unauthorized)));
        assert!(matches!(svc.create(None, b"not json").await, Err(AppError::Unauthorized)));
        assert!(matches!(svc.find(None, "not-a-uuid").await, Err(AppError::Unauthorized)));
        assert!(matches!(svc.search(None, "").await, Err(AppError::Unauthorized)));

        assert!(matches!(
            svc.create(Some(&who()), &low).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_authorized_crud() {
        let (svc, _) = service();
        let me = who();

        let created = svc.create(Some(&me), &body("a@example.com")).await.unwrap();
        let id = created.id.to_string();
        assert_eq!(svc.list(Some(&me)).await.unwrap().len(), 1);
        assert_eq!(svc.find(Some(&me), &id).await.unwrap(), created);
        assert_eq!(svc.search(Some(&me), "engineer").await.unwrap().len(), 1);

        let mut changed = employee("a@example.com", "Manager", "Sales");
        changed.salary = 1000.0;
        let updated = svc
            .update(Some(&me), &id, &serde_json::to_vec(&changed).unwrap())
            .await
            .unwrap();
        assert_eq!(updated.department, "Sales");

        assert_eq!(
            svc.delete(Some(&me), &id).await.unwrap(),
            DeleteResponse { deleted: true }
        );
        assert!(matches!(svc.find(Some(&me), &id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_from_raw_query() {
        let (svc, _) = service();
        let me = who();
        svc.create(Some(&me), &body("a@example.com")).await.unwrap();

        assert!(matches!(
            svc.search_query(None, Some("term=a&term=b")).await,
            Err(AppError::Unauthorized)
        ));
        assert_eq!(svc.search_query(Some(&me), Some("term=R%26D")).await.unwrap().len(), 1);
        assert!(matches!(
            svc.search_query(Some(&me), Some("term=a&term=b")).await,
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            svc.search_query(Some(&me), None).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_padded_fields_are_stored_trimmed() {
        let (svc, _) = service();
        let me = who();
        let mut padded = employee("a@example.com", " Engineer ", "R&D  ");
        padded.first_name = "  Ada".into();

        let created = svc
            .create(Some(&me), &serde_json::to_vec(&padded).unwrap())
            .await
            .unwrap();
        assert_eq!(created.designation, "Engineer");
        assert_eq!(created.department, "R&D");
        assert_eq!(created.first_name, "Ada");
        assert_eq!(svc.search(Some(&me), "Engineer").await.unwrap(), vec![created]);
    }

    #[tokio::test]
    async fn test_unknown_ids() {
        let (svc, _) = service();
        let me = who();
        let missing = Uuid::new_v4().to_string();

        assert!(matches!(svc.find(Some(&me), "garbage").await, Err(AppError::NotFound(_))));
        assert!(matches!(
            svc.update(Some(&me), &missing, &body("a@example.com")).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(
            svc.delete(Some(&me), "garbage").await.unwrap(),
            DeleteResponse { deleted: false }
        );
        assert_eq!(
            svc.delete(Some(&me), &missing).await.unwrap(),
            DeleteResponse { deleted: false }
        );
    }
}
