use tipstore_types::Cid;

/// Builds public gateway URLs for stored blobs.
///
/// Pure formatting: the URL is derived from the account that paid for the
/// write and the CID, with no network round-trip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicUrlResolver {
    account: String,
    gateway_host: String,
}

impl PublicUrlResolver {
    pub fn new(account: impl Into<String>, gateway_host: impl Into<String>) -> Self {
        Self {
            account: account.into().to_lowercase(),
            gateway_host: gateway_host.into().trim_matches('/').to_string(),
        }
    }

    /// `https://{account}.{gateway_host}/{cid}`
    pub fn resolve(&self, cid: &Cid) -> String {
        format!("https://{}.{}/{}", self.account, self.gateway_host, cid)
    }

    pub fn account(&self) -> &str {
        &self.account
    }
}

impl Default for PublicUrlResolver {
    fn default() -> Self {
        Self::new("anonymous", "gateway.localhost")
    }
}
