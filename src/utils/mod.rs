// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// UTILITÁRIOS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Chunking recursivo de texto
pub mod segment;
mod text;
mod timing;

#[cfg(test)]
pub(crate) mod http_stub;

pub use segment::{split_text, SplitterOptions};
pub use text::*;
pub use timing::*;
