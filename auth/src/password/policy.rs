use super::errors::PasswordPolicyError;

const COMMON_PASSWORDS: &[&str] = &[
    "password",
    "123456",
    "123456789",
    "qwerty",
    "12345678",
    "111111",
    "1234567890",
    "admin",
    "welcome",
    "password1",
    "Password1!",
    "Passw0rd!",
];

/// Strength requirements for new passwords.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_special: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_special: true,
        }
    }
}

impl PasswordPolicy {
    /// Policy that only rejects empty passwords.
    pub fn permissive() -> Self {
        Self {
            min_length: 1,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_special: false,
        }
    }

    /// Check a candidate password against the policy.
    ///
    /// Length is counted in characters, not bytes.
    ///
    /// # Errors
    /// The first requirement the password fails, checked in the order
    /// length, common-password list, character classes.
    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        if password.chars().count() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
            });
        }

        if is_common_password(password) {
            return Err(PasswordPolicyError::TooCommon);
        }

        let has_upper = password.chars().any(char::is_uppercase);
        let has_lower = password.chars().any(char::is_lowercase);
        let has_digit = password.chars().any(char::is_numeric);
        let has_special = password
            .chars()
            .any(|c| !c.is_alphanumeric() && !c.is_whitespace());

        if self.require_uppercase && !has_upper {
            return Err(PasswordPolicyError::MissingUppercase);
        }
        if self.require_lowercase && !has_lower {
            return Err(PasswordPolicyError::MissingLowercase);
        }
        if self.require_digit && !has_digit {
            return Err(PasswordPolicyError::MissingDigit);
        }
        if self.require_special && !has_special {
            return Err(PasswordPolicyError::MissingSpecial);
        }

        Ok(())
    }
}

fn is_common_password(password: &str) -> bool {
    COMMON_PASSWORDS
        .iter()
        .any(|common| common.eq_ignore_ascii_case(password))
}
