/// Relational-style name for a record's identity.
pub const ID_ALIAS: &str = "id";

/// Store-native identity attribute.
pub const NATIVE_ID: &str = "_id";

/// Length of generated identities.
pub const DEFAULT_ID_LENGTH: usize = 20;
