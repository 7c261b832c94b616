use crate::config::Credentials;

pub const HTTP_OK: u16 = 200;

/// Status line and body of an HTTP response, before the body is read.
pub struct Response<Body> {
    pub status: u16,
    pub content_length: Option<usize>,
    pub body: Body,
}

/// Wi-Fi link plus a minimal HTTP client.
pub trait Network {
    type Error: core::fmt::Debug;
    type Body<'a>: embedded_io::Read
    where
        Self: 'a;

    fn connect(&mut self, credentials: &Credentials<'_>) -> Result<(), Self::Error>;
    /// Signal strength of the current link in dBm.
    fn rssi(&self) -> i32;
    fn get(&mut self, url: &str) -> Result<Response<Self::Body<'_>>, Self::Error>;
    /// Posts a body of type [`CONTENT_TYPE`], returns the status.
    ///
    /// [`CONTENT_TYPE`]: crate::telemetry::CONTENT_TYPE
    fn post_form(&mut self, url: &str, body: &str) -> Result<u16, Self::Error>;
    fn disconnect(&mut self);
}
