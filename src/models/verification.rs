use time::OffsetDateTime;
use uuid::Uuid;

/// A pending email verification for one account.
///
/// `unique_string` is the bcrypt hash of the raw token mailed to the user;
/// the raw value is never stored.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct VerificationToken {
    pub account_id: Uuid,
    pub unique_string: String,
    pub created_at: OffsetDateTime,
    pub expires_at: OffsetDateTime,
}

impl VerificationToken {
    /// A token is dead from the instant `expires_at` is reached.
    #[inline]
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// A freshly issued token: the raw value goes into the email link, the record
/// into the store.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub raw: String,
    pub record: VerificationToken,
}
