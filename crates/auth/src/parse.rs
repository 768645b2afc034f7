//! Init-data decoding and data-check-string construction.

use std::collections::BTreeMap;

/// Field carrying the HMAC-SHA256 hex digest.
pub const HASH_FIELD: &str = "hash";
/// Field carrying the Ed25519 signature (base64url).
pub const SIGNATURE_FIELD: &str = "signature";
/// Field carrying the Unix timestamp of the launch.
pub const AUTH_DATE_FIELD: &str = "auth_date";
/// Field carrying the JSON-encoded user.
pub const USER_FIELD: &str = "user";

/// Authorization scheme used by Telegram mini apps.
const TMA_SCHEME: &str = "tma";

/// Launch-fragment parameter that wraps the init-data, as in
/// `#tgWebAppData=<encoded>&tgWebAppVersion=7.0`.
pub const LAUNCH_DATA_PARAM: &str = "tgWebAppData";

/// Decoded init-data fields.
///
/// Keys are kept in a `BTreeMap`, so iteration is always in byte-wise key
/// order no matter how the payload was ordered on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InitData {
    fields: BTreeMap<String, String>,
}

impl InitData {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.fields.remove(key)
    }

    /// Returns a field value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Returns true if the field is present.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn hash(&self) -> Option<&str> {
        self.get(HASH_FIELD)
    }

    pub fn signature(&self) -> Option<&str> {
        self.get(SIGNATURE_FIELD)
    }

    pub fn auth_date(&self) -> Option<&str> {
        self.get(AUTH_DATE_FIELD)
    }

    /// Raw (already URL-decoded) user JSON.
    pub fn user_raw(&self) -> Option<&str> {
        self.get(USER_FIELD)
    }

    pub fn query_id(&self) -> Option<&str> {
        self.get("query_id")
    }

    pub fn chat_type(&self) -> Option<&str> {
        self.get("chat_type")
    }

    pub fn chat_instance(&self) -> Option<&str> {
        self.get("chat_instance")
    }

    /// Value of the `startapp` link parameter, if the app was opened through one.
    pub fn start_param(&self) -> Option<&str> {
        self.get("start_param")
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no fields were decoded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Iterates fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Builds the newline-joined `key=value` list of every field not in
    /// `excluded`, sorted by key.
    pub fn data_check_string(&self, excluded: &[&str]) -> String {
        self.iter()
            .filter(|(key, _)| !excluded.contains(key))
            .map(|(key, value)| format!("{key}={value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Re-encodes the payload as `application/x-www-form-urlencoded`.
    pub fn to_query_string(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for InitData
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = InitData::new();
        for (key, value) in iter {
            data.insert(key, value);
        }
        data
    }
}

/// Decode a raw init-data string.
///
/// Purely syntactic: later occurrences of a key overwrite earlier ones and no
/// field is required at this stage. A whole launch fragment is accepted too:
/// when the decoded pairs contain `tgWebAppData`, its value is decoded again
/// and the other launch parameters are dropped.
pub fn parse_init_data(raw: &str) -> InitData {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix('?')
        .or_else(|| raw.strip_prefix('#'))
        .unwrap_or(raw);

    let mut data = decode_pairs(raw);
    match data.remove(LAUNCH_DATA_PARAM) {
        Some(inner) => decode_pairs(&inner),
        None => data,
    }
}

fn decode_pairs(raw: &str) -> InitData {
    form_urlencoded::parse(raw.as_bytes())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect()
}

/// Pull the init-data out of an `Authorization` header value.
///
/// Accepts `tma <initData>` (scheme matched case-insensitively) or a bare
/// init-data string.
pub fn extract_init_data(value: &str) -> &str {
    let value = value.trim();
    match value.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case(TMA_SCHEME) => rest.trim_start(),
        _ => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decodes_fields() {
        let data = parse_init_data(
            "query_id=AAH&user=%7B%22id%22%3A1%2C%22first_name%22%3A%22A%22%7D&auth_date=1700000000&hash=abc",
        );
        assert_eq!(data.len(), 4);
        assert_eq!(data.query_id(), Some("AAH"));
        assert_eq!(data.user_raw(), Some(r#"{"id":1,"first_name":"A"}"#));
        assert_eq!(data.auth_date(), Some("1700000000"));
        assert_eq!(data.hash(), Some("abc"));
    }

    #[test]
    fn test_parse_plus_is_space() {
        let data = parse_init_data("chat_type=sender&start_param=two+words");
        assert_eq!(data.start_param(), Some("two words"));
    }

    #[test]
    fn test_parse_later_key_wins() {
        let data = parse_init_data("auth_date=1&auth_date=2");
        assert_eq!(data.auth_date(), Some("2"));
        assert_eq!(data.len(), 1);
    }

    #[test]
    fn test_parse_strips_leading_question_mark() {
        let data = parse_init_data("?hash=abc");
        assert_eq!(data.hash(), Some("abc"));
    }

    #[test]
    fn test_parse_launch_fragment() {
        let inner = "user=%7B%22id%22%3A1%7D&auth_date=1700000000&hash=abc";
        let encoded: String = form_urlencoded::byte_serialize(inner.as_bytes()).collect();
        let fragment = format!("#tgWebAppData={encoded}&tgWebAppVersion=7.0&tgWebAppPlatform=ios");

        let data = parse_init_data(&fragment);
        assert_eq!(data, parse_init_data(inner));
        assert_eq!(data.user_raw(), Some(r#"{"id":1}"#));
        assert_eq!(data.hash(), Some("abc"));
        assert!(!data.contains("tgWebAppVersion"));
        assert!(!data.contains(LAUNCH_DATA_PARAM));
    }

    #[test]
    fn test_parse_empty() {
        assert!(parse_init_data("").is_empty());
    }

    #[test]
    fn test_data_check_string_sorted_and_excludes() {
        let data = parse_init_data("user=u&hash=h&auth_date=1&signature=s&chat_type=private");
        assert_eq!(
            data.data_check_string(&[HASH_FIELD]),
            "auth_date=1\nchat_type=private\nsignature=s\nuser=u"
        );
        assert_eq!(
            data.data_check_string(&[HASH_FIELD, SIGNATURE_FIELD]),
            "auth_date=1\nchat_type=private\nuser=u"
        );
    }

    #[test]
    fn test_data_check_string_is_bytewise() {
        // Uppercase sorts before lowercase, '_' (0x5F) sorts before 'a'.
        let data: InitData = [("b", "1"), ("B", "2"), ("a_b", "3"), ("ab", "4")]
            .into_iter()
            .collect();
        assert_eq!(data.data_check_string(&[]), "B=2\na_b=3\nab=4\nb=1");
    }

    #[test]
    fn test_query_string_roundtrip() {
        let data: InitData = [("user", r#"{"id":1}"#), ("auth_date", "5")].into_iter().collect();
        assert_eq!(parse_init_data(&data.to_query_string()), data);
    }

    #[test]
    fn test_extract_init_data() {
        assert_eq!(extract_init_data("tma auth_date=1&hash=x"), "auth_date=1&hash=x");
        assert_eq!(extract_init_data("TMA   auth_date=1"), "auth_date=1");
        assert_eq!(extract_init_data("  auth_date=1&hash=x "), "auth_date=1&hash=x");
        assert_eq!(extract_init_data("Bearer abc"), "Bearer abc");
    }
}
