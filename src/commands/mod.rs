mod corpus;
mod validate;

pub use corpus::corpus_command;
pub use validate::validate_command;
