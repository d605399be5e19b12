//! Infrastructure layer: console I/O implementations
//!
//! This layer implements I/O boundary traits used by the application layer.

pub mod error;
pub mod highlight;
pub mod traits;

pub use error::{InfraError, InfraResult};
pub use highlight::{select_highlighter, ColorHighlighter, Highlighter, PlainHighlighter};
pub use traits::{Answer, ConsoleOperator, InputEvent, ItemPrompt, Operator};
