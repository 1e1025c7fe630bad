// ============================
// crates/backend-lib/src/auth/password.rs
// ============================
//! Password policy, hashing and verification.
use scrypt::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Params, Scrypt,
};
use serde::{Deserialize, Serialize};
use unicode_general_category::{get_general_category, GeneralCategory};
use zeroize::{Zeroize, Zeroizing};

use super::AuthError;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Password complexity requirements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordRequirements {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
}

impl Default for PasswordRequirements {
    fn default() -> Self {
        Self {
            min_length: MIN_PASSWORD_LENGTH,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl PasswordRequirements {
    /// Check a candidate password. Never fails, only answers.
    pub fn is_valid(&self, password: &str) -> bool {
        if password.chars().count() < self.min_length {
            return false;
        }

        let (mut upper, mut lower, mut digit, mut symbol) = (false, false, false, false);
        for c in password.chars() {
            match get_general_category(c) {
                GeneralCategory::UppercaseLetter => upper = true,
                GeneralCategory::LowercaseLetter => lower = true,
                GeneralCategory::DecimalNumber => digit = true,
                category if is_punctuation_or_symbol(category) => symbol = true,
                _ => {},
            }
        }

        (upper || !self.require_uppercase)
            && (lower || !self.require_lowercase)
            && (digit || !self.require_digit)
            && (symbol || !self.require_symbol)
    }
}

fn is_punctuation_or_symbol(category: GeneralCategory) -> bool {
    matches!(
        category,
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
            | GeneralCategory::MathSymbol
            | GeneralCategory::CurrencySymbol
            | GeneralCategory::ModifierSymbol
            | GeneralCategory::OtherSymbol
    )
}

/// Check a password against the default policy
pub fn is_valid(password: &str) -> bool {
    PasswordRequirements::default().is_valid(password)
}

/// Verify a password against a stored PHC hash.
///
/// The cost parameters are read from the hash itself, so this works for
/// hashes produced under any [`CredentialVerifier`] configuration.
pub fn verify_password(hash: &str, plain: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };
    Scrypt.verify_password(plain.as_bytes(), &parsed_hash).is_ok()
}

/// Salted scrypt hashing with a fixed cost.
#[derive(Debug, Clone, Copy)]
pub struct CredentialVerifier {
    params: Params,
}

impl CredentialVerifier {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Hash a password using scrypt
    pub fn hash(&self, plain: &str) -> anyhow::Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Scrypt
            .hash_password_customized(plain.as_bytes(), None, None, self.params, &salt)?
            .to_string();
        Ok(hash)
    }

    /// Hash a password and zeroize the original
    pub fn hash_secure(&self, plain: &mut String) -> anyhow::Result<String> {
        let hash = self.hash(plain);
        plain.zeroize();
        hash
    }

    pub fn verify(&self, hash: &str, plain: &str) -> bool {
        verify_password(hash, plain)
    }

    /// Hash on the blocking pool.
    pub async fn hash_blocking(self, plain: &str) -> Result<String, AuthError> {
        let mut plain = plain.to_owned();
        tokio::task::spawn_blocking(move || self.hash_secure(&mut plain))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))?
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verify on the blocking pool.
    pub async fn verify_blocking(self, hash: String, plain: &str) -> Result<bool, AuthError> {
        let plain = Zeroizing::new(plain.to_owned());
        tokio::task::spawn_blocking(move || self.verify(&hash, &plain))
            .await
            .map_err(|e| AuthError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cheap() -> CredentialVerifier {
        CredentialVerifier::new(Params::new(4, 8, 1, 32).unwrap())
    }

    #[test]
    fn test_policy_accepts_minimal_valid_password() {
        assert!(is_valid("Abcdef1!"));
        assert!(is_valid("SecureP@ssw0rd"));
    }

    #[test]
    fn test_policy_rejects_short_passwords() {
        assert!(!is_valid("Abc1!"));
        assert!(!is_valid("Abcde1!"));
        assert!(!is_valid(""));
    }

    #[test]
    fn test_policy_requires_every_class() {
        // Missing uppercase
        assert!(!is_valid("abcdef1!"));
        // Missing lowercase
        assert!(!is_valid("ABCDEF1!"));
        // Missing digit
        assert!(!is_valid("Abcdefg!"));
        // Missing symbol
        assert!(!is_valid("Abcdefg1"));
        // Whitespace is not a symbol
        assert!(!is_valid("Abcdef1 "));
    }

    #[test]
    fn test_policy_is_unicode_aware() {
        // Length counts characters, not bytes
        assert!(!is_valid("Äbcé1€"));
        assert!(is_valid("Äbcdéf1€"));
        assert!(is_valid("Ωmega123§"));
    }

    #[test]
    fn test_policy_uses_unicode_categories() {
        // Format characters and combining marks are not symbols
        assert!(!is_valid("Abcdefg1\u{200D}"));
        assert!(!is_valid("Abcdefg1\u{0301}"));
        // Only decimal digits count as digits
        assert!(!is_valid("Abcdefg\u{00B2}!"));
        assert!(is_valid("Abcdefg\u{0663}!"));
        // Punctuation and symbols of any script count
        assert!(is_valid("Abcdefg1\u{00BF}"));
        assert!(is_valid("Abcdefg1+"));
    }

    #[test]
    fn test_custom_requirements() {
        let relaxed = PasswordRequirements {
            min_length: 10,
            require_uppercase: false,
            require_lowercase: true,
            require_digit: true,
            require_symbol: false,
        };
        assert!(relaxed.is_valid("securepassw0rd"));
        assert!(!relaxed.is_valid("short0"));
        assert!(!relaxed.is_valid("SECUREPASSW0RD"));
    }

    #[test]
    fn test_password_hashing_and_verification() {
        let hasher = cheap();
        let hash = hasher.hash("Abcdef1!").unwrap();

        assert_ne!(hash, "Abcdef1!");
        assert!(hash.starts_with("$scrypt$"));
        assert!(hasher.verify(&hash, "Abcdef1!"));
        assert!(!hasher.verify(&hash, "Abcdef1?"));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = cheap();
        let first = hasher.hash("Abcdef1!").unwrap();
        let second = hasher.hash("Abcdef1!").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "Abcdef1!"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn test_hash_secure_zeroizes_input() {
        let mut plain = "Abcdef1!".to_string();
        let hash = cheap().hash_secure(&mut plain).unwrap();
        assert!(plain.is_empty());
        assert!(verify_password(&hash, "Abcdef1!"));
    }

    #[tokio::test]
    async fn test_blocking_helpers() {
        let hasher = cheap();
        let hash = hasher.hash_blocking("Abcdef1!").await.unwrap();
        assert!(hasher.verify_blocking(hash.clone(), "Abcdef1!").await.unwrap());
        assert!(!hasher.verify_blocking(hash, "wrong").await.unwrap());
    }
}
