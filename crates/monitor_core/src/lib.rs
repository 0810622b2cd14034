//! Monitor core: endpoint extraction and state diffing, free of IO.
mod diff;
mod endpoint;
mod extract;
mod record;
mod target;

pub use diff::{diff, merge};
pub use endpoint::EndpointSet;
pub use extract::{
    extract, find_endpoints, is_common_asset, EndpointMatch, EndpointShape,
    COMMON_ASSET_SUFFIXES,
};
pub use record::{parse_record, render_record};
pub use target::{Target, TargetError, TargetKey};
