// Package price endpoints under `/traditional-packages/`.

use crate::client::BillingClient;
use crate::error::Error;
use crate::types::{InternetPackageBody, SmsPackageBody, VoicePackageBody};

impl BillingClient {
    /// `POST traditional-packages/internet` with `{ internetPackagePrice }`
    pub async fn set_internet_package(&self, price: f64) -> Result<serde_json::Value, Error> {
        let body = InternetPackageBody {
            internet_package_price: price,
        };
        self.post_json_ack("traditional-packages/internet", &body).await
    }

    /// `POST traditional-packages/voice` with `{ voicePackagePrice }`
    pub async fn set_voice_package(&self, price: f64) -> Result<serde_json::Value, Error> {
        let body = VoicePackageBody {
            voice_package_price: price,
        };
        self.post_json_ack("traditional-packages/voice", &body).await
    }

    /// `POST traditional-packages/sms` with `{ smsPackagePrice }`
    pub async fn set_sms_package(&self, price: f64) -> Result<serde_json::Value, Error> {
        let body = SmsPackageBody {
            sms_package_price: price,
        };
        self.post_json_ack("traditional-packages/sms", &body).await
    }
}
