/// Database utilities
///
/// - [`pool`]: PostgreSQL connection pool with health checks
/// - [`migrations`]: Embedded schema migrations
pub mod migrations;
pub mod pool;
