//! HttpPublisher - メッセージバスへの fire-and-forget 送信
//!
//! `POST {publish_url}{binding}` に JSON を送ります。送信は別タスクで行い、
//! 呼び出し元は待ちません。失敗はログに残すだけで、再送はしません。

use reqwest::Client;
use tracing::{debug, error, warn};

use jobgate_core::domain::{Binding, OutboundMessage};
use jobgate_core::ports::Publisher;

use crate::endpoint::{Endpoint, SetupError};

#[derive(Debug, Clone)]
pub struct HttpPublisher {
    client: Client,
    endpoint: Endpoint,
}

impl HttpPublisher {
    pub fn new(client: Client, publish_url: &str) -> Result<Self, SetupError> {
        Ok(Self {
            client,
            endpoint: Endpoint::parse("bus publish", publish_url)?,
        })
    }
}

impl Publisher for HttpPublisher {
    fn publish(&self, binding: Binding, message: OutboundMessage) {
        let task_id = message.task_id();
        let url = match self.endpoint.join(binding.as_str()) {
            Ok(url) => url,
            Err(e) => {
                error!(%binding, %task_id, error = %e, "cannot publish");
                return;
            }
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            error!(%binding, %task_id, "cannot publish outside of a tokio runtime");
            return;
        };

        let request = self.client.post(url).json(&message);
        runtime.spawn(async move {
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!(%binding, %task_id, "published");
                }
                Ok(response) => {
                    warn!(%binding, %task_id, status = response.status().as_u16(), "bus rejected message");
                }
                Err(e) => {
                    warn!(%binding, %task_id, error = %e, "publish failed");
                }
            }
        });
    }
}
