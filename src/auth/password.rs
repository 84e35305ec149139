use crate::error::AppError;
use actix_web::web;
use bcrypt::{hash, verify};

/// Lowest work factor bcrypt accepts. Only worth using where speed matters more than strength.
pub const MIN_COST: u32 = 4;
/// Highest work factor bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hashes and verifies user passwords with bcrypt at a fixed work factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        hash(password, self.cost)
            .map_err(|e| AppError::internal("Failed to hash password", e))
    }

    pub fn verify_password(&self, password: &str, hashed_password: &str) -> Result<bool, AppError> {
        verify(password, hashed_password)
            .map_err(|e| AppError::internal("Failed to verify password", e))
    }

    /// Hashes on Actix's blocking pool so a worker thread is not stalled by bcrypt.
    pub async fn hash_off_thread(&self, password: String) -> Result<String, AppError> {
        let hasher = *self;
        web::block(move || hasher.hash_password(&password)).await?
    }
}
