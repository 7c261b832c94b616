use alloc::vec::Vec;
use core::fmt;

use embedded_io::Read;
use log::{info, warn};

use crate::{
    bmp::FILE_HEADER_SIZE,
    net::{HTTP_OK, Network, Response},
};

const CHUNK_SIZE: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadError {
    /// The request could not be sent or answered.
    Network,
    HttpStatus(u16),
    Io(embedded_io::ErrorKind),
    MissingContentLength,
    OutOfMemory,
    TooLarge { declared: usize, capacity: usize },
    Incomplete { received: usize, expected: usize },
}

impl DownloadError {
    pub(crate) fn from_io_error(error: impl embedded_io::Error) -> Self {
        DownloadError::Io(error.kind())
    }
}

impl embedded_io::Error for DownloadError {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            DownloadError::Io(kind) => *kind,
            DownloadError::Network => embedded_io::ErrorKind::NotConnected,
            DownloadError::HttpStatus(_) => embedded_io::ErrorKind::NotFound,
            DownloadError::MissingContentLength | DownloadError::Incomplete { .. } => {
                embedded_io::ErrorKind::InvalidData
            }
            DownloadError::OutOfMemory | DownloadError::TooLarge { .. } => {
                embedded_io::ErrorKind::OutOfMemory
            }
        }
    }
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadError::Network => f.write_str("request failed"),
            DownloadError::HttpStatus(status) => write!(f, "HTTP status {status}"),
            DownloadError::Io(kind) => write!(f, "I/O error: {kind:?}"),
            DownloadError::MissingContentLength => f.write_str("no Content-Length, cannot allocate"),
            DownloadError::OutOfMemory => f.write_str("allocation failed"),
            DownloadError::TooLarge { declared, capacity } => {
                write!(f, "{declared} bytes do not fit into {capacity}")
            }
            DownloadError::Incomplete { received, expected } => {
                write!(f, "download incomplete: got {received} of {expected}")
            }
        }
    }
}

/// Reads until `buf` is full or the stream ends.
fn fill<R: Read>(body: &mut R, buf: &mut [u8]) -> Result<usize, DownloadError> {
    let mut filled = 0;
    while filled < buf.len() {
        match body.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) => return Err(DownloadError::from_io_error(e)),
        }
    }
    Ok(filled)
}

/// Streams a BMP file into `buffer`, trusting the file size declared in its
/// header rather than the transport.
///
/// Returns the number of bytes stored. A body that ends before the declared
/// size is not an error; whatever arrived is returned.
pub fn read_bmp<R: Read>(body: &mut R, buffer: &mut [u8]) -> Result<usize, DownloadError> {
    let capacity = buffer.len();
    if capacity < FILE_HEADER_SIZE {
        return Err(DownloadError::TooLarge {
            declared: FILE_HEADER_SIZE,
            capacity,
        });
    }

    let received = fill(body, &mut buffer[..FILE_HEADER_SIZE])?;
    if received < FILE_HEADER_SIZE {
        return Err(DownloadError::Incomplete {
            received,
            expected: FILE_HEADER_SIZE,
        });
    }
    let declared = u32::from_le_bytes([buffer[2], buffer[3], buffer[4], buffer[5]]) as usize;
    if declared > capacity {
        return Err(DownloadError::TooLarge { declared, capacity });
    }

    let end = declared.max(FILE_HEADER_SIZE);
    let received = received + fill(body, &mut buffer[FILE_HEADER_SIZE..end])?;
    if received < declared {
        warn!("BMP body ended after {received} of {declared} bytes");
    }
    Ok(received)
}

/// Reads a body of known length into a freshly allocated buffer.
pub fn read_sized<R: Read>(
    body: &mut R,
    content_length: Option<usize>,
) -> Result<Vec<u8>, DownloadError> {
    let expected = match content_length {
        Some(len) if len > 0 => len,
        _ => return Err(DownloadError::MissingContentLength),
    };

    let mut data = Vec::new();
    data.try_reserve_exact(expected)
        .map_err(|_| DownloadError::OutOfMemory)?;
    data.resize(expected, 0);

    let mut received = 0;
    while received < expected {
        let end = (received + CHUNK_SIZE).min(expected);
        match body.read(&mut data[received..end]) {
            Ok(0) => break,
            Ok(n) => received += n,
            Err(e) => return Err(DownloadError::from_io_error(e)),
        }
    }
    if received != expected {
        return Err(DownloadError::Incomplete { received, expected });
    }
    Ok(data)
}

fn open<'n, N: Network>(
    net: &'n mut N,
    url: &str,
) -> Result<Response<N::Body<'n>>, DownloadError> {
    let response = net.get(url).map_err(|e| {
        warn!("GET {url} failed: {e:?}");
        DownloadError::Network
    })?;
    if response.status != HTTP_OK {
        warn!("GET {url} returned {}", response.status);
        return Err(DownloadError::HttpStatus(response.status));
    }
    Ok(response)
}

pub fn fetch_bmp<N: Network>(
    net: &mut N,
    url: &str,
    buffer: &mut [u8],
) -> Result<usize, DownloadError> {
    let mut response = open(net, url)?;
    info!("Downloading BMP");
    let size = read_bmp(&mut response.body, buffer)?;
    info!("BMP downloaded, {size} bytes");
    Ok(size)
}

pub fn fetch_sized<N: Network>(net: &mut N, url: &str) -> Result<Vec<u8>, DownloadError> {
    let mut response = open(net, url)?;
    let data = read_sized(&mut response.body, response.content_length)?;
    info!("Downloaded {} bytes", data.len());
    Ok(data)
}
