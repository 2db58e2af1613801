//! Library surface behind the `relay-worker` binary, split out so integration tests can
//! exercise the delivery algorithm directly instead of only observing it through Postgres.

pub mod error;
pub mod purge;
pub mod queue_loop;
pub mod work;
