use std::collections::BTreeMap;

/// Metadata carrier attached to a request.
///
/// The auth layer performs no encoding of its own: it reads and writes
/// string metadata and signs over [`Transport::payload`]. Implementations
/// must deliver values unmodified end-to-end.
pub trait Transport {
    /// Inserts `value` under `key`, replacing any previous value.
    fn set_meta(&mut self, key: &str, value: &str);

    fn read_meta(&self, key: &str) -> Option<&str>;

    /// Request content covered by signatures.
    fn payload(&self) -> &[u8];
}

/// In-memory request with exact-match metadata keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Request {
    meta: BTreeMap<String, String>,
    payload: Vec<u8>,
}

impl Request {
    pub fn new(payload: impl Into<Vec<u8>>) -> Self {
        Self {
            meta: BTreeMap::new(),
            payload: payload.into(),
        }
    }

    pub fn meta(&self) -> &BTreeMap<String, String> {
        &self.meta
    }

    pub fn payload_mut(&mut self) -> &mut Vec<u8> {
        &mut self.payload
    }

    pub fn remove_meta(&mut self, key: &str) -> Option<String> {
        self.meta.remove(key)
    }
}

impl Transport for Request {
    fn set_meta(&mut self, key: &str, value: &str) {
        self.meta.insert(key.to_owned(), value.to_owned());
    }

    fn read_meta(&self, key: &str) -> Option<&str> {
        self.meta.get(key).map(String::as_str)
    }

    fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// HTTP-style request: metadata travels as headers, matched without regard
/// to ASCII case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HeaderRequest {
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl HeaderRequest {
    pub fn new(headers: Vec<(String, String)>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            headers,
            body: body.into(),
        }
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn into_parts(self) -> (Vec<(String, String)>, Vec<u8>) {
        (self.headers, self.body)
    }
}

impl Transport for HeaderRequest {
    fn set_meta(&mut self, key: &str, value: &str) {
        self.headers.retain(|(name, _)| !name.eq_ignore_ascii_case(key));
        self.headers.push((key.to_owned(), value.to_owned()));
    }

    fn read_meta(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(key))
            .map(|(_, value)| value.as_str())
    }

    fn payload(&self) -> &[u8] {
        &self.body
    }
}
