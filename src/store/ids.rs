use uuid::Uuid;

/// 128 random bits rendered as 32 lowercase hex characters.
pub fn generate() -> String {
    Uuid::new_v4().simple().to_string()
}
