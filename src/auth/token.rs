//! Issued tokens, their redacted secrets, and the subjects that own them.

pub mod record;
pub mod secret;
pub mod subject;
