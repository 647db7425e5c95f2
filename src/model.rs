use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Connection settings for the remote catalog API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub api_path: String,
    pub token_path: PathBuf,
    pub request_timeout: Option<Duration>,
    pub user_agent: String,
}

/// A catalog product as the API stores it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_id"
    )]
    pub id: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "de_number")]
    pub origin_price: f64,
    #[serde(default, deserialize_with = "de_number")]
    pub price: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(
        default,
        serialize_with = "ser_flag",
        deserialize_with = "de_flag"
    )]
    pub is_enabled: bool,
    #[serde(default, rename = "imageUrl")]
    pub image_url: String,
    #[serde(default, rename = "imagesUrl", deserialize_with = "de_opt_vec")]
    pub images_url: Vec<String>,
    /// Server fields without a form control. Sent back unchanged on update.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Pagination metadata returned alongside a product list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub current_page: u32,
    #[serde(default)]
    pub has_pre: bool,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub category: String,
}

impl PageInfo {
    /// Page to re-fetch after a mutation. Before the first list response this is page 1.
    pub fn refresh_page(&self) -> u32 {
        self.current_page.max(1)
    }

    pub fn prev_page(&self) -> Option<u32> {
        let cur = self.refresh_page();
        (cur > 1).then(|| cur - 1)
    }

    pub fn next_page(&self) -> Option<u32> {
        let cur = self.refresh_page();
        (self.has_next || cur < self.total_pages).then(|| cur + 1)
    }
}

/// Body of `GET /admin/products`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    pub products: Vec<Product>,
    #[serde(default)]
    pub pagination: PageInfo,
}

#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Body of `POST /admin/signin`. `expired` is a Unix timestamp in milliseconds.
#[derive(Clone, Deserialize)]
pub struct SigninResponse {
    pub token: String,
    #[serde(default)]
    pub expired: i64,
}

impl fmt::Debug for SigninResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigninResponse")
            .field("token", &"<redacted>")
            .field("expired", &self.expired)
            .finish()
    }
}

/// Create and update requests wrap the product as `{"data": {...}}`.
#[derive(Debug, Serialize)]
pub struct DataEnvelope<'a, T> {
    pub data: &'a T,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Locale {
    #[value(name = "zh-tw")]
    ZhTw,
    #[value(name = "en")]
    En,
}

/// User-facing notices produced by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LoginFailed,
    FetchFailed,
    Created,
    Updated,
    SaveFailed,
    Deleted,
    DeleteFailed,
    LoggedOut,
}

impl Notice {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            Notice::LoginFailed | Notice::FetchFailed | Notice::SaveFailed | Notice::DeleteFailed
        )
    }

    /// Render the notice for the given locale.
    pub fn to_message(self, locale: Locale) -> &'static str {
        match (locale, self) {
            (Locale::ZhTw, Notice::LoginFailed) => "登入失敗",
            (Locale::ZhTw, Notice::FetchFailed) => "取得產品失敗",
            (Locale::ZhTw, Notice::Created) => "新增成功",
            (Locale::ZhTw, Notice::Updated) => "更新成功",
            (Locale::ZhTw, Notice::SaveFailed) => "更新失敗",
            (Locale::ZhTw, Notice::Deleted) => "刪除成功",
            (Locale::ZhTw, Notice::DeleteFailed) => "刪除失敗",
            (Locale::ZhTw, Notice::LoggedOut) => "已登出",
            (Locale::En, Notice::LoginFailed) => "Login failed",
            (Locale::En, Notice::FetchFailed) => "Failed to load products",
            (Locale::En, Notice::Created) => "Product created",
            (Locale::En, Notice::Updated) => "Product updated",
            (Locale::En, Notice::SaveFailed) => "Update failed",
            (Locale::En, Notice::Deleted) => "Product deleted",
            (Locale::En, Notice::DeleteFailed) => "Delete failed",
            (Locale::En, Notice::LoggedOut) => "Signed out",
        }
    }
}

/// Label for the enabled column.
pub fn enabled_label(enabled: bool, locale: Locale) -> &'static str {
    match (locale, enabled) {
        (Locale::ZhTw, true) => "啟用",
        (Locale::ZhTw, false) => "未啟用",
        (Locale::En, true) => "enabled",
        (Locale::En, false) => "disabled",
    }
}

// The API is loose about scalar types: ids come back as strings or numbers,
// prices as numbers or numeric strings, and the enabled flag as 1/0 or a bool.

fn de_opt_id<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<serde_json::Value>::deserialize(d)?;
    Ok(match v {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "invalid product id: {other}"
            )))
        }
    })
}

fn de_number<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(d)?;
    match &v {
        serde_json::Value::Null => Ok(0.0),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("price out of range")),
        serde_json::Value::String(s) => crate::orchestrator::coerce_number(s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid price: {s:?}"))),
        other => Err(serde::de::Error::custom(format!("invalid price: {other}"))),
    }
}

fn de_flag<'de, D>(d: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(d)?;
    Ok(match v {
        serde_json::Value::Bool(b) => b,
        serde_json::Value::Number(n) => n.as_f64().map(|x| x != 0.0).unwrap_or(false),
        serde_json::Value::String(s) => !(s.is_empty() || s == "0" || s == "false"),
        _ => false,
    })
}

fn ser_flag<S>(flag: &bool, s: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    s.serialize_u8(u8::from(*flag))
}

fn de_opt_vec<'de, D>(d: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(d)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_loose_product_fields() {
        let p: Product = serde_json::from_str(
            r#"{"id":1,"title":"A","price":10,"origin_price":"20","is_enabled":1,"imagesUrl":null}"#,
        )
        .unwrap();
        assert_eq!(p.id.as_deref(), Some("1"));
        assert_eq!(p.price, 10.0);
        assert_eq!(p.origin_price, 20.0);
        assert!(p.is_enabled);
        assert!(p.images_url.is_empty());
    }

    #[test]
    fn serializes_enabled_flag_as_int_and_skips_missing_id() {
        let p = Product {
            title: "B".into(),
            is_enabled: true,
            ..Default::default()
        };
        let v = serde_json::to_value(&p).unwrap();
        assert_eq!(v["is_enabled"], 1);
        assert!(v.get("id").is_none());
        assert_eq!(v["imagesUrl"], serde_json::json!([]));
    }

    #[test]
    fn page_navigation_respects_bounds() {
        let info = PageInfo {
            total_pages: 3,
            current_page: 1,
            has_pre: false,
            has_next: true,
            category: String::new(),
        };
        assert_eq!(info.prev_page(), None);
        assert_eq!(info.next_page(), Some(2));

        let last = PageInfo {
            current_page: 3,
            has_pre: true,
            has_next: false,
            ..info
        };
        assert_eq!(last.prev_page(), Some(2));
        assert_eq!(last.next_page(), None);
        assert_eq!(PageInfo::default().refresh_page(), 1);
    }

    #[test]
    fn credentials_debug_hides_password() {
        let c = Credentials {
            username: "a@b.c".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{c:?}").contains("hunter2"));
    }
}
