pub mod diagnostics;

pub use diagnostics::{DiagnosticEvent, DiagnosticKind, Diagnostics};
