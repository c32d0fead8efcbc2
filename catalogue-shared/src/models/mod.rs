/// Database models
///
/// - `technician`: Technician accounts (created by administrators)
/// - `session`: Server-side login sessions
/// - `component`: The hierarchical component catalogue and its attachments
///
/// # Example
///
/// ```no_run
/// use catalogue_shared::models::component::Component;
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let root = Component::find_root(&pool).await?;
/// if let Some(root) = root {
///     println!("Catalogue root: {}", root.name);
/// }
/// # Ok(())
/// # }
/// ```

pub mod component;
pub mod session;
pub mod technician;
