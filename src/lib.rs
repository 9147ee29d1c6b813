pub mod api;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
pub mod serializer;
pub mod utils;
pub mod value;

pub use api::{dump_config, read_config, write_config, Config};
pub use error::{ConfigError, FormatError};
pub use parser::{parse, Parser};
pub use serializer::{dump, serialize, Serialized};
pub use value::{ConfigMap, Value};
