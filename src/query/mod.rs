//! Query language support
//!
//! Text rewrites that make schema-domain SQL acceptable to the engine
//! (identifier normalization, reserved-name remapping, statement
//! splitting), the virtual metadata tables, data registration and the
//! executor that ties them together.

pub mod executor;
pub mod metadata;
pub mod normalize;
pub mod registrar;
pub mod reserved;
pub mod result;
pub(crate) mod scan;
pub mod split;

pub use executor::{QueryExecutor, ensure_read_only, table_label};
pub use metadata::{COLUMNS_TABLE, ENUMS_TABLE, REFS_TABLE, TABLES_TABLE, metadata_tables};
pub use normalize::{IDENTIFIER_MARKER, normalize_identifiers};
pub use registrar::{RegisteredTable, Registration, register_data, register_metadata};
pub use reserved::{RESERVED_ALIAS_PREFIX, ReservedNameMap, internal_alias, is_reserved};
pub use result::{QueryResult, StatementResult};
pub use split::split_statements;
