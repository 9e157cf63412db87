// src/common/id_generator.rs
//! Crockford Base32 ID Generator
//!
//! Generates human-readable, prefixed IDs using Crockford Base32 encoding.
//! Format: PREFIX_XXXXXXXXXX (e.g., N_K7NP3X8MWQ for notes)
//!
//! Share links do not use these ids; they need to be unguessable and use
//! UUID v4 instead (see `generate_share_id`).

use rand::Rng;

/// Crockford Base32 alphabet (excludes I, L, O, U to avoid confusion)
const CROCKFORD_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Random characters per entity id (32^10 combinations)
const ID_LENGTH: usize = 10;

/// Entity type prefixes for ID generation
#[derive(Debug, Clone, Copy)]
pub enum EntityPrefix {
    /// User (U_)
    User,
    /// Note (N_)
    Note,
    /// Folder (F_)
    Folder,
    /// One-time password record (O_)
    Otp,
}

impl EntityPrefix {
    /// Get the string prefix for this entity type
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityPrefix::User => "U",
            EntityPrefix::Note => "N",
            EntityPrefix::Folder => "F",
            EntityPrefix::Otp => "O",
        }
    }
}

/// Generate a random Crockford Base32 string of specified length
fn generate_crockford_string(length: usize) -> String {
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..32);
            CROCKFORD_ALPHABET[idx] as char
        })
        .collect()
}

/// Generate a prefixed ID using Crockford Base32 encoding
pub fn generate_id(prefix: EntityPrefix) -> String {
    format!("{}_{}", prefix.as_str(), generate_crockford_string(ID_LENGTH))
}

pub fn generate_user_id() -> String {
    generate_id(EntityPrefix::User)
}

pub fn generate_note_id() -> String {
    generate_id(EntityPrefix::Note)
}

pub fn generate_folder_id() -> String {
    generate_id(EntityPrefix::Folder)
}

pub fn generate_otp_id() -> String {
    generate_id(EntityPrefix::Otp)
}

/// Unguessable identifier for public share links.
pub fn generate_share_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
