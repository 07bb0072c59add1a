#![allow(async_fn_in_trait)]

use rollcall_core::{AttendanceAction, CardId, UserRecord};

use crate::Result;

/// What the kiosk needs from the attendance backend.
///
/// Uses native async fn in traits (Rust 1.75+).
pub trait AttendanceBackend {
    /// Probe backend liveness.
    ///
    /// # Errors
    ///
    /// Any failure, including a non-2xx status, means "not ready".
    async fn health(&self) -> Result<()>;

    /// Look up the user owning `card`.
    ///
    /// # Errors
    ///
    /// `BackendError::NotFound` when the backend does not return a user;
    /// transport errors otherwise.
    async fn lookup_user(&self, card: &CardId) -> Result<UserRecord>;

    /// Record a sign-in for `card`.
    ///
    /// # Errors
    ///
    /// `BackendError::Rejected` when the backend refuses the toggle with a
    /// 2xx answer, `BackendError::Status` for other statuses, transport
    /// errors otherwise.
    async fn sign_in(&self, card: &CardId) -> Result<()>;

    /// Record a sign-out for `card`. Errors as for [`Self::sign_in`].
    async fn sign_out(&self, card: &CardId) -> Result<()>;

    /// Perform `action` for `card`.
    async fn toggle(&self, card: &CardId, action: AttendanceAction) -> Result<()> {
        match action {
            AttendanceAction::SignIn => self.sign_in(card).await,
            AttendanceAction::SignOut => self.sign_out(card).await,
        }
    }
}
