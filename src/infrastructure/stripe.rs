use crate::domain::ports::{ChargeRequest, PaymentProcessor};
use crate::error::{OrderError, Result};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

const DEFAULT_API_BASE: &str = "https://api.stripe.com";

#[derive(Deserialize)]
struct PaymentIntent {
    client_secret: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

/// Creates Stripe PaymentIntents over the REST API.
///
/// The engine bounds each call with its own timeout; this client adds none.
pub struct StripeProcessor {
    client: reqwest::Client,
    api_base: String,
    secret_key: SecretString,
}

impl StripeProcessor {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            secret_key,
        }
    }

    /// Points the client at another API host (e.g. a local stripe-mock).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn form(request: &ChargeRequest) -> Vec<(&'static str, String)> {
        let shipping = &request.shipping;
        let mut form = vec![
            ("amount", request.amount.to_string()),
            ("currency", request.currency.clone()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
            ("description", request.description.clone()),
            ("shipping[name]", shipping.name.clone()),
            ("shipping[address][line1]", shipping.line1.clone()),
            ("shipping[address][city]", shipping.city.clone()),
            ("shipping[address][country]", shipping.country.clone()),
            ("shipping[address][postal_code]", shipping.postal_code.clone()),
        ];
        if let Some(line2) = &shipping.line2 {
            form.push(("shipping[address][line2]", line2.clone()));
        }
        if let Some(phone) = &shipping.phone {
            form.push(("shipping[phone]", phone.clone()));
        }
        form
    }
}

#[async_trait]
impl PaymentProcessor for StripeProcessor {
    async fn create_charge(&self, request: ChargeRequest) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/v1/payment_intents", self.api_base))
            .bearer_auth(self.secret_key.expose_secret())
            .form(&Self::form(&request))
            .send()
            .await
            .map_err(|e| OrderError::UpstreamError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error.message,
                Err(_) => "no error details".to_string(),
            };
            return Err(OrderError::UpstreamError(format!("{status}: {message}")));
        }

        let intent: PaymentIntent = response
            .json()
            .await
            .map_err(|e| OrderError::UpstreamError(e.to_string()))?;
        Ok(intent.client_secret)
    }
}
