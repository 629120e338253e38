//! Request handlers for API endpoints
//!
//! Handlers extract the tenant context and raw query, parse it into a typed filter
//! and hand it to the listing service.

pub mod events;
pub mod schedules;
pub mod speakers;

pub use events::*;
pub use schedules::*;
pub use speakers::*;

use convene_query::ObjectId;

use crate::{Error, Result};

pub(crate) fn path_id(field: &str, raw: &str) -> Result<ObjectId> {
    ObjectId::parse(raw.trim()).map_err(|e| Error::invalid(field, format!("not a valid id: {e}")))
}
