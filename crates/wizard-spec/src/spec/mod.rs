pub mod catalog;
pub mod question;
pub mod questionnaire;

pub use question::{Bounds, ChoiceOption, QuestionKind, QuestionSpec};
pub use questionnaire::{CatalogError, Questionnaire};
