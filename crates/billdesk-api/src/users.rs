// Subscriber endpoints under `/traditional-users/`.

use tracing::debug;

use crate::client::BillingClient;
use crate::error::Error;
use crate::types::{RegisterUserBody, UserResponse};

impl BillingClient {
    /// List every registered subscriber.
    ///
    /// `GET traditional-users/allUsers`
    pub async fn list_users(&self) -> Result<Vec<UserResponse>, Error> {
        let users: Option<Vec<UserResponse>> = self.get("traditional-users/allUsers", &[]).await?;
        let users = users.unwrap_or_default();
        debug!(count = users.len(), "listed subscribers");
        Ok(users)
    }

    /// Fetch one subscriber by MSISDN.
    ///
    /// `GET traditional-users/userDetails?MSISDN=...`
    pub async fn get_user(&self, msisdn: &str) -> Result<UserResponse, Error> {
        self.get("traditional-users/userDetails", &[("MSISDN", msisdn.to_owned())])
            .await?
            .ok_or_else(|| Error::Backend {
                status: 404,
                message: format!("no subscriber with MSISDN {msisdn}"),
            })
    }

    /// Register a new subscriber. The backend assigns the MSISDN.
    ///
    /// `POST traditional-users/register`
    pub async fn register_user(
        &self,
        name: &str,
        balance: f64,
        nin: &str,
    ) -> Result<Option<UserResponse>, Error> {
        let body = RegisterUserBody { name, balance, nin };
        self.post_json("traditional-users/register", &body).await
    }

    /// Ask the backend to create `count` random subscribers.
    ///
    /// `POST traditional-users/generate/{count}`
    pub async fn generate_users(&self, count: u32) -> Result<serde_json::Value, Error> {
        self.post_query_ack(&format!("traditional-users/generate/{count}"), &[])
            .await
    }

    /// Overwrite a subscriber's balance.
    ///
    /// `PUT traditional-users/updateUserBalance?MSISDN=...&newBalance=...`
    pub async fn update_user_balance(
        &self,
        msisdn: &str,
        new_balance: f64,
    ) -> Result<Option<UserResponse>, Error> {
        self.put_query(
            "traditional-users/updateUserBalance",
            &[
                ("MSISDN", msisdn.to_owned()),
                ("newBalance", new_balance.to_string()),
            ],
        )
        .await
    }
}
