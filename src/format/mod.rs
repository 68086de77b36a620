//! File I/O for taxonomy XML, CSV query logs, and labeled training files.

pub mod labeled;
pub mod query_log;
pub mod taxonomy_xml;

pub use labeled::{CategoryNamesWriter, LabeledReader, LabeledWriter};
pub use query_log::{restrict_to_taxonomy, QueryLogReader};
pub use taxonomy_xml::TaxonomyXmlReader;
