//! Wire types: request bodies, responses and the snapshot exchange
//! format. Row models live in `db::models`.

pub mod requests;
pub mod snapshot;

pub use requests::{
    AuthStatus, ConfigBody, ConfigValue, GroupPatch, LoginRequest, LoginResponse, NewGroup,
    NewSite, OrderUpdate, SitePatch, SiteQuery,
};
pub use snapshot::{ImportReport, ImportStats, Snapshot, SnapshotGroup, SnapshotSite};
