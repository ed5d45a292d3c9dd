pub mod catalog;
pub mod document;
pub mod error;
pub mod extract;
pub mod format;
pub mod node;
pub mod parser;
pub mod processor;
pub mod toy;
pub mod transport;

pub use catalog::Catalog;
pub use document::Document;
pub use error::ToyError;
pub use format::Formats;
pub use node::{Node, NodeId, NodeKind};
pub use parser::{ParseError, Parser};
pub use toy::{Toy, ToyKind};
pub use transport::{Outcome, Transport, Transports};
