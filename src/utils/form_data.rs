use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

/// An `application/x-www-form-urlencoded` body that keeps repeated keys.
///
/// `web::Form` collapses `field_label[]=a&field_label[]=b` into a single value,
/// which loses the field builder's columns and multi-select answers.
#[derive(Debug, Default, Clone)]
pub struct FormData {
    pairs: Vec<(String, String)>,
}

impl FormData {
    pub fn parse(body: &[u8]) -> Self {
        let pairs = body
            .split(|b| *b == b'&')
            .filter(|part| !part.is_empty())
            .map(|part| {
                let mut kv = part.splitn(2, |b| *b == b'=');
                let key = decode_component(kv.next().unwrap_or_default());
                let value = decode_component(kv.next().unwrap_or_default());
                (key, value)
            })
            .collect();

        Self { pairs }
    }

    /// First value posted under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value posted under `key`, in body order.
    pub fn get_all(&self, key: &str) -> Vec<String> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// First value under `key`, trimmed; empty when absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or_default().trim().to_string()
    }
}

fn decode_component(raw: &[u8]) -> String {
    let spaced: Vec<u8> = raw
        .iter()
        .map(|b| if *b == b'+' { b' ' } else { *b })
        .collect();
    String::from_utf8_lossy(&urlencoding::decode_binary(&spaced)).into_owned()
}

impl FromRequest for FormData {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let body = web::Bytes::from_request(req, payload);
        Box::pin(async move {
            let body = body.await?;
            Ok::<_, actix_web::Error>(FormData::parse(&body))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_repeated_keys_in_order() {
        let data = FormData::parse(b"colors%5B%5D=red&colors%5B%5D=blue&name=Ada+Lovelace");
        assert_eq!(data.get_all("colors[]"), vec!["red", "blue"]);
        assert_eq!(data.get("name"), Some("Ada Lovelace"));
    }

    #[test]
    fn missing_key_and_bare_key() {
        let data = FormData::parse(b"agree&title=");
        assert_eq!(data.get("agree"), Some(""));
        assert_eq!(data.get("title"), Some(""));
        assert_eq!(data.get("other"), None);
        assert!(data.get_all("other").is_empty());
    }

    #[test]
    fn decodes_percent_escapes_and_trims_text() {
        let data = FormData::parse(b"title=%20Caf%C3%A9%20%26%20Bar%20");
        assert_eq!(data.text("title"), "Café & Bar");
        assert_eq!(data.text("absent"), "");
    }
}
