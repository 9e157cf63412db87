// src/services/mod.rs
//
// Adapters for the outside world: email delivery, the OAuth identity
// provider and PDF rendering. Each sits behind a trait so handlers can be
// exercised with in-process stand-ins.

pub mod email;
pub mod google;
pub mod pdf;

// Re-export commonly used types for convenience
pub use email::{EmailSender, LogEmailSender, SesEmailSender};
pub use google::{GoogleOAuthService, IdentityProvider};
pub use pdf::{PdfRenderer, PrintPdfRenderer};
