/// User interface module
///
/// - The registration form itself (form.rs)
/// - The feedback modal drawn over it (modal.rs)

pub mod form;
pub mod modal;
