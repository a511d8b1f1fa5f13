use serde::Deserialize;

use crate::bot_command::core::boc_page;

#[derive(Deserialize)]
pub struct Settings {
    pub telegram_token: Option<String>,
    /// Older deployments name the token `TOKEN`; `TELEGRAM_TOKEN` wins when both are set.
    pub token: Option<String>,
    pub base_url: Option<String>,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_rate_page_url")]
    pub rate_page_url: String,
    pub rate_lookup_url: Option<String>,
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_port() -> u16 {
    8000
}

fn default_rate_page_url() -> String {
    boc_page::DEFAULT_URL.to_owned()
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Settings {
    pub fn bot_token(&self) -> Option<&str> {
        non_empty(&self.telegram_token).or(non_empty(&self.token))
    }

    pub fn base_url(&self) -> Option<&str> {
        non_empty(&self.base_url)
    }

    pub fn webhook_url(&self) -> Option<String> {
        let base_url = self.base_url()?;
        let token = self.bot_token()?;
        Some(format!("{}/webhook/{token}", base_url.trim_end_matches('/')))
    }

    pub fn log_startup(&self) {
        tracing::info!(
            has_telegram_token = self.telegram_token.is_some(),
            has_token = self.token.is_some(),
            has_base_url = self.base_url.is_some(),
            port = self.port,
            token = %mask(self.bot_token()),
            base_url = self.base_url().unwrap_or("None"),
            "settings loaded"
        );
    }

    /// Human-readable report of which keys were found, token masked.
    pub fn describe(&self) -> String {
        let yes_no = |present: bool| if present { "是" } else { "否" };
        format!(
            "服务端读取到的环境变量：\n\
             - TELEGRAM_TOKEN 存在？ {}\n\
             - TOKEN 存在？ {}\n\
             - BASE_URL 存在？ {}\n\
             - TOKEN(脱敏)：{}\n\
             - BASE_URL：{}\n\
             - RATE_LOOKUP_URL 存在？ {}",
            yes_no(self.telegram_token.is_some()),
            yes_no(self.token.is_some()),
            yes_no(self.base_url.is_some()),
            mask(self.bot_token()),
            self.base_url().unwrap_or("None"),
            yes_no(self.rate_lookup_url.is_some()),
        )
    }
}

/// Keeps the first 6 and last 4 characters of a secret.
pub fn mask(secret: Option<&str>) -> String {
    match secret {
        None | Some("") => "None".to_owned(),
        Some(secret) => {
            let chars: Vec<char> = secret.chars().collect();
            let head: String = chars.iter().take(6).collect();
            let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
            format!("{head}...{tail}")
        }
    }
}
