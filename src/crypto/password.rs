use rand::distributions::Alphanumeric;
use rand::Rng;

pub const MIN_PASSWORD_LEN: usize = 8;
pub const GENERATED_PASSWORD_LEN: usize = 16;
const SPECIAL_CHARS: &str = "!@#$%^&*(),.?\":{}|<>";

/// Random password for the "encrypt with auto-generated password" mode.
pub fn generate_password() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_PASSWORD_LEN)
        .map(char::from)
        .collect()
}

/// Rules a zero-knowledge password has to satisfy before it is used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordStrength {
    pub length: bool,
    pub uppercase: bool,
    pub lowercase: bool,
    pub number: bool,
    pub special: bool,
}

impl PasswordStrength {
    pub fn evaluate(password: &str) -> Self {
        Self {
            length: password.chars().count() >= MIN_PASSWORD_LEN,
            uppercase: password.chars().any(|c| c.is_ascii_uppercase()),
            lowercase: password.chars().any(|c| c.is_ascii_lowercase()),
            number: password.chars().any(|c| c.is_ascii_digit()),
            special: password.chars().any(|c| SPECIAL_CHARS.contains(c)),
        }
    }

    pub fn score(&self) -> u8 {
        [self.length, self.uppercase, self.lowercase, self.number, self.special]
            .iter()
            .filter(|passed| **passed)
            .count() as u8
    }

    pub fn is_valid(&self) -> bool {
        self.score() == 5
    }

    /// Names of the rules that failed, for user-facing messages.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.length {
            missing.push("at least 8 characters");
        }
        if !self.uppercase {
            missing.push("an uppercase letter");
        }
        if !self.lowercase {
            missing.push("a lowercase letter");
        }
        if !self.number {
            missing.push("a number");
        }
        if !self.special {
            missing.push("a special character");
        }
        missing
    }
}
