//! Markdown-to-structured-edit compiler.
//!
//! Turns a block of markdown-flavoured text into positional edit operations
//! for a remote rich document. Supported per line: blank lines, `#`
//! headings (levels 1-4), `-`/`*`/`•` bullets, and `**bold**` spans inside
//! plain paragraphs. Compilation is pure; fetching the append anchor and
//! submitting the batch belong to the documents capability.

pub mod compiler;
pub mod ops;

pub use compiler::{CompiledBlock, compile, compile_block};
pub use ops::{EditOperation, IndexRange, NamedStyle, TextStyle, to_batch_requests, utf16_len};
