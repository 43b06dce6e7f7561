//! Profile endpoint.

use book_kart_core::models::{ProfileUpdate, User};
use book_kart_core::types::UserId;
use tracing::instrument;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

impl ApiClient {
    /// Update profile fields of `user_id`, returning the saved user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the API rejects the update.
    #[instrument(skip(self, update), fields(user_id = %user_id))]
    pub async fn update_user(
        &self,
        user_id: &UserId,
        update: &ProfileUpdate,
    ) -> Result<User, ApiError> {
        let request = ApiRequest::new(endpoint::UPDATE_USER)
            .segment(user_id.as_str())
            .json(update)?;
        Ok(self.mutate::<User>(&request).await?.data)
    }
}
