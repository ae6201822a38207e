//! Input handling: the document splitter and the naive stage parsers.

mod idf;
mod matrix;
mod parser;
mod sdrf;
mod split;

pub use idf::{DefaultPublicationBuilder, IdfReader, PublicationBuilder, PublicationFields};
pub use matrix::MatrixReader;
pub use parser::{bracket_qualifier, normalize_brackets, tag_key, Parser, ParserConfig};
pub use sdrf::SdrfReader;
pub use split::{DocumentSplitter, SplitOutput, IDF_MARKER, SDRF_FILE_TAG, SDRF_MARKER};
