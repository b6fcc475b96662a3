// Transaction endpoints under `/traditional-transactions/`.
//
// Every request is a POST with query parameters; the backend prices the
// usage, settles the balance, and answers with the stored record.

use crate::client::BillingClient;
use crate::error::Error;
use crate::types::{CallDurationResponse, TransactionResponse};

impl BillingClient {
    /// How long the subscriber can call (or their history, on some builds).
    ///
    /// `GET traditional-transactions/user/{phone}`
    pub async fn call_duration(&self, phone: &str) -> Result<CallDurationResponse, Error> {
        let out: Option<CallDurationResponse> = self
            .get(&format!("traditional-transactions/user/{phone}"), &[])
            .await?;
        Ok(out.unwrap_or_else(|| CallDurationResponse::History(Vec::new())))
    }

    /// `POST traditional-transactions/sms?sender&receiver&content`
    pub async fn send_sms(
        &self,
        sender: &str,
        receiver: &str,
        content: &str,
    ) -> Result<Option<TransactionResponse>, Error> {
        self.post_query(
            "traditional-transactions/sms",
            &[
                ("sender", sender.to_owned()),
                ("receiver", receiver.to_owned()),
                ("content", content.to_owned()),
            ],
        )
        .await
    }

    /// `POST traditional-transactions/call?sender&receiver&duration`
    pub async fn make_voice_call(
        &self,
        sender: &str,
        receiver: &str,
        duration_secs: u64,
    ) -> Result<Option<TransactionResponse>, Error> {
        self.post_query(
            "traditional-transactions/call",
            &[
                ("sender", sender.to_owned()),
                ("receiver", receiver.to_owned()),
                ("duration", duration_secs.to_string()),
            ],
        )
        .await
    }

    /// `POST traditional-transactions/internet?consumer&dataSize`
    pub async fn consume_internet(
        &self,
        consumer: &str,
        data_size_mb: u64,
    ) -> Result<Option<TransactionResponse>, Error> {
        self.post_query(
            "traditional-transactions/internet",
            &[
                ("consumer", consumer.to_owned()),
                ("dataSize", data_size_mb.to_string()),
            ],
        )
        .await
    }

    /// `POST traditional-transactions/consumeData?consumer`
    pub async fn consume_data(
        &self,
        consumer: &str,
    ) -> Result<Option<TransactionResponse>, Error> {
        self.post_query(
            "traditional-transactions/consumeData",
            &[("consumer", consumer.to_owned())],
        )
        .await
    }
}
