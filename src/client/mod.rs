//! Client side of the reader: a typed API client, the view-state reducer and
//! the controller that connects user actions to both.

pub mod api;
pub mod controller;
pub mod state;

use thiserror::Error;

pub use api::ApiClient;
pub use controller::Controller;
pub use state::{Action, Tab, Toast, ToastKind, ViewState};

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server rejected a bookmark because its URL is already saved.
    #[error("Already bookmarked")]
    AlreadyBookmarked,

    /// The server answered with an error status and message.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

pub type ClientResult<T> = std::result::Result<T, ClientError>;
