pub mod ingest;
pub mod status;
pub mod subscriptions;

use uuid::Uuid;

use crate::problems::ApiProblem;

/// Parses a path segment as a UUID, recovering the 422 `ApiProblem::InvalidUuid` the REST
/// surface is specified to return for non-UUID ids rather than actix-web's default 400.
pub(crate) fn parse_id(raw: &str) -> Result<Uuid, ApiProblem> {
    Uuid::parse_str(raw).map_err(|_| ApiProblem::InvalidUuid)
}
