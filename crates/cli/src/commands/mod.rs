//! Subcommand implementations.
//!
//! Every command goes through [`Storefront`](book_kart_storefront::Storefront)
//! so the persisted session, the cache and the notifications behave the same
//! as in the other front ends. Results go to stdout; notifications and logs go
//! to stderr.

pub mod account;
pub mod admin;
pub mod orders;
pub mod shop;

use book_kart_admin::AdminError;
use book_kart_storefront::ApiError;
use thiserror::Error;

/// Errors that end a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The backend call failed; the user already got a notification.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// An admin call failed.
    #[error(transparent)]
    Admin(#[from] AdminError),

    /// The command needs a signed-in user.
    #[error("Not signed in. Run `bk-cli login` first")]
    NotSignedIn,

    /// An argument the backend would reject anyway.
    #[error("Invalid {field}: {message}")]
    InvalidArgument {
        field: &'static str,
        message: String,
    },
}
