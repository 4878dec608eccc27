/// State management module
///
/// This module handles all form state, including:
/// - The field schema (schema.rs)
/// - Collected field values (record.rs)
/// - The selected photo (image.rs)
/// - The feedback modal (feedback.rs)
/// - The open form session tying them together (session.rs)

pub mod feedback;
pub mod image;
pub mod record;
pub mod schema;
pub mod session;
