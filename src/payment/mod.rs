//! Mobile-money checkout behind the payment proxy functions

mod outcome;
mod types;

use async_trait::async_trait;
use log::debug;

use crate::error::Error;
use crate::functions::{FunctionInvokeOptions, FunctionsClient};

pub use outcome::*;
pub use types::*;

/// The checkout provider as seen by the publication flow
#[async_trait]
pub trait PaymentProvider: Send + Sync {
    /// Open a hosted checkout session
    async fn create_session(
        &self,
        request: &CreateCheckoutRequest,
        access_token: &str,
    ) -> Result<ProviderSession, Error>;

    /// Read the current state of a checkout session
    async fn get_session(
        &self,
        provider_session_id: &str,
        access_token: &str,
    ) -> Result<ProviderSession, Error>;
}

/// [`PaymentProvider`] reached through the backend's serverless functions
#[derive(Debug, Clone)]
pub struct ProxyPaymentProvider {
    functions: FunctionsClient,
    create_function: String,
    get_function: String,
}

impl ProxyPaymentProvider {
    pub fn new(functions: FunctionsClient, create_function: &str, get_function: &str) -> Self {
        Self {
            functions,
            create_function: create_function.to_string(),
            get_function: get_function.to_string(),
        }
    }
}

#[async_trait]
impl PaymentProvider for ProxyPaymentProvider {
    async fn create_session(
        &self,
        request: &CreateCheckoutRequest,
        access_token: &str,
    ) -> Result<ProviderSession, Error> {
        debug!(
            "creating checkout for {} {} (ref {})",
            request.amount, request.currency, request.client_reference
        );
        let options = FunctionInvokeOptions::new()
            .with_body(request)
            .with_auth(access_token);

        let response = self
            .functions
            .invoke::<_, ProviderSession>(&self.create_function, &options)
            .await
            .map_err(|e| Error::payment(format!("could not create checkout session: {}", e)))?;

        Ok(response.data)
    }

    async fn get_session(
        &self,
        provider_session_id: &str,
        access_token: &str,
    ) -> Result<ProviderSession, Error> {
        let options = FunctionInvokeOptions::new()
            .with_body(GetCheckoutRequest {
                session_id: provider_session_id.to_string(),
            })
            .with_auth(access_token);

        let response = self
            .functions
            .invoke::<_, ProviderSession>(&self.get_function, &options)
            .await
            .map_err(|e| Error::payment(format!("could not read checkout session: {}", e)))?;

        Ok(response.data)
    }
}
