/// Authentication primitives
///
/// - [`password`]: Argon2id hashing and verification of technician passwords
/// - [`session`]: Opaque session tokens and their storage hash
///
/// # Example
///
/// ```
/// use catalogue_shared::auth::{password, session};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = password::hash_password("correct horse")?;
/// assert!(password::verify_password("correct horse", &hash)?);
///
/// let token = session::generate_session_token();
/// assert_eq!(session::hash_session_token(&token.value), token.hash);
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod session;
