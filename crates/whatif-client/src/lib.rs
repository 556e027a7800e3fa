pub mod client_ext;
pub mod config;
pub mod dashboard;

pub mod prelude {
    pub use crate::client_ext::predictor::ClientPredictExt as Predict;
    pub use crate::client_ext::yahoo_finance::ClientYahooExt as YahooFinance;
    #[allow(unused_imports)]
    pub use crate::client_ext::Client;
    pub use crate::config::Config;
    pub use crate::dashboard::{Dashboard, FeedStatus, HttpMarketSource, HttpPredictor};

    /// Every request made through the returned client gives up after `timeout`.
    pub fn build_client(user_agent: &str, timeout: std::time::Duration) -> anyhow::Result<Client> {
        let client = reqwest::ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(client)
    }
}
