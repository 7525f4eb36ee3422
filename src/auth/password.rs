// Password digesting with bcrypt

use super::AuthError;

/// Lowest cost bcrypt accepts; used by the test environment.
pub const MIN_COST: u32 = 4;

/// Highest cost bcrypt accepts.
pub const MAX_COST: u32 = 31;

/// Hash a password with the given bcrypt cost.
///
/// Runs on the blocking thread pool; bcrypt is CPU-bound.
pub async fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    let password = password.to_string();

    tokio::task::spawn_blocking(move || {
        bcrypt::hash(password, cost).map_err(|e| AuthError::Hashing(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("Task join error: {}", e)))?
}

/// Check a password against a stored digest.
///
/// A digest that cannot be parsed counts as a mismatch.
pub async fn verify_password(password: &str, digest: &str) -> Result<bool, AuthError> {
    let password = password.to_string();
    let digest = digest.to_string();

    tokio::task::spawn_blocking(move || match bcrypt::verify(password, &digest) {
        Ok(valid) => valid,
        Err(e) => {
            tracing::warn!("Unverifiable password digest: {}", e);
            false
        }
    })
    .await
    .map_err(|e| AuthError::Hashing(format!("Task join error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let digest = hash_password("password1", MIN_COST).await.unwrap();
        assert!(digest.starts_with("$2"));
        assert_ne!(digest, "password1");
        assert!(verify_password("password1", &digest).await.unwrap());
        assert!(!verify_password("password2", &digest).await.unwrap());
    }

    #[tokio::test]
    async fn digests_are_salted() {
        let a = hash_password("same", MIN_COST).await.unwrap();
        let b = hash_password("same", MIN_COST).await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn garbage_digest_does_not_verify() {
        assert!(!verify_password("password1", "not-a-digest").await.unwrap());
    }

    #[tokio::test]
    async fn invalid_cost_is_a_hashing_error() {
        let err = hash_password("password1", 2).await.unwrap_err();
        assert!(matches!(err, AuthError::Hashing(_)));
    }
}
