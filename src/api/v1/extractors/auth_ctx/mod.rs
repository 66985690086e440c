/*!
 * Authentication context extractors
 *
 * Public API:
 * - AuthCtx
 * - CurrentUser / MaybeUser / ServiceRoleUser
 */

mod core;
mod types;

pub use self::core::{CurrentUser, MaybeUser, ServiceRoleUser};
pub use types::AuthCtx;
