// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core functionality of the employee-records server.

pub mod auth;
pub mod config;
pub mod employees;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth, LoginThrottle, TokenService};
use crate::config::{ConfigError, Settings, StorageBackend};
use crate::employees::EmployeeService;
use crate::middleware::AuthGate;
use crate::storage::{FlatFileStorage, MemoryStorage, Storage};

pub use crate::router::create_router;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Registration and login
    pub auth: Arc<dyn AuthService>,
    /// Access-controlled employee operations
    pub employees: Arc<EmployeeService>,
    /// Resolves the caller's identity from request headers
    pub gate: AuthGate,
    /// Failed-login bookkeeping, pruned by the server binary
    pub throttle: LoginThrottle,
    /// Settings the state was built from
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state over `storage`
    pub fn new<S: Storage + 'static>(storage: Arc<S>, settings: Settings) -> Result<Self, ConfigError> {
        settings.validate()?;

        let tokens = Arc::new(TokenService::from_settings(&settings.auth));
        let auth = DefaultAuth::new(storage.clone(), tokens.clone(), &settings);
        let throttle = auth.throttle().clone();

        Ok(Self {
            auth: Arc::new(auth),
            employees: Arc::new(EmployeeService::new(storage)),
            gate: AuthGate::new(tokens),
            throttle,
            settings: Arc::new(settings),
        })
    }

    /// Create a new application state with the storage backend named in `settings`
    pub fn from_settings(settings: Settings) -> anyhow::Result<Self> {
        let state = match settings.storage {
            StorageBackend::FlatFile => {
                let storage = Arc::new(FlatFileStorage::new(&settings.data_dir)?);
                Self::new(storage, settings)?
            }
            StorageBackend::Memory => Self::new(Arc::new(MemoryStorage::new()), settings)?,
        };
        Ok(state)
    }
}
