//! Address book endpoints.

use book_kart_core::models::{Address, AddressInput};
use book_kart_core::validation::Validate;
use serde::Deserialize;
use tracing::instrument;

use super::endpoint::{self, ApiRequest};
use super::{ApiClient, ApiError};

#[derive(Deserialize)]
struct AddressList {
    #[serde(default)]
    addresses: Vec<Address>,
}

impl ApiClient {
    /// Saved addresses of the signed-in user.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn get_addresses(&self) -> Result<Vec<Address>, ApiError> {
        let list: Option<AddressList> = self
            .query(&ApiRequest::new(endpoint::GET_ADDRESSES))
            .await?;
        Ok(list.map(|l| l.addresses).unwrap_or_default())
    }

    /// Create an address, or update the one named by `input.address_id`.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` without sending anything if the form is
    /// invalid, otherwise any request error.
    #[instrument(skip_all, fields(update = input.is_update()))]
    pub async fn add_or_update_address(&self, input: &AddressInput) -> Result<Address, ApiError> {
        input.validate()?;
        let request = ApiRequest::new(endpoint::ADD_OR_UPDATE_ADDRESS).json(input)?;
        Ok(self.mutate::<Address>(&request).await?.data)
    }
}
