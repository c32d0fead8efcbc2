/// Route handlers
///
/// - `health`: liveness and database status
/// - `auth`: technician login and logout
/// - `catalogue`: home page data (component list and root)
/// - `components`: 3D model and technical sheet of one component
/// - `search`: name search
/// - `image_search`: photo-based component lookup

pub mod auth;
pub mod catalogue;
pub mod components;
pub mod health;
pub mod image_search;
pub mod search;
