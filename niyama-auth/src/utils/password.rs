use bcrypt::{hash, verify};

/// Newtype for password to prevent accidental logging
#[derive(Debug, Clone)]
pub struct Password(String);

impl Password {
    pub fn new(password: String) -> Self {
        Self(password)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Newtype for password hash
#[derive(Debug, Clone)]
pub struct PasswordHashString(String);

impl PasswordHashString {
    pub fn new(hash: String) -> Self {
        Self(hash)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// Hash a password using bcrypt with the given cost factor.
///
/// The salt is generated per call and embedded in the hash string.
pub fn hash_password(password: &Password, cost: u32) -> Result<PasswordHashString, anyhow::Error> {
    let password_hash = hash(password.as_str(), cost)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))?;

    Ok(PasswordHashString::new(password_hash))
}

/// Verify a password against a stored bcrypt hash.
///
/// Returns Ok(()) if the password matches, Err otherwise.
pub fn verify_password(
    password: &Password,
    password_hash: &PasswordHashString,
) -> Result<(), anyhow::Error> {
    let ok = verify(password.as_str(), password_hash.as_str())
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    if ok {
        Ok(())
    } else {
        Err(anyhow::anyhow!("Password verification failed"))
    }
}
