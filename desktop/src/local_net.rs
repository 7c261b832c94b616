use std::{
    fs,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

use embedded_io::ErrorType;
use inkframe_core::{
    config::Credentials,
    net::{HTTP_OK, Network, Response},
    telemetry::CONTENT_TYPE,
};
use log::{debug, info};

const HTTP_NOT_FOUND: u16 = 404;
const TELEMETRY_LOG: &str = "telemetry.log";

/// Serves a local directory in place of the image server. The path part of
/// every URL is resolved below `root`; the host is ignored.
pub struct LocalNetwork {
    root: PathBuf,
    rssi: i32,
    offline: bool,
    connected: bool,
}

impl LocalNetwork {
    pub fn new(root: PathBuf, rssi: i32) -> Self {
        info!("Serving images from {:?}", root);
        LocalNetwork {
            root,
            rssi,
            offline: false,
            connected: false,
        }
    }

    /// Makes every `connect` fail, like an absent access point.
    pub fn set_offline(&mut self, offline: bool) {
        self.offline = offline;
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, url: &str) -> PathBuf {
        self.root.join(url_path(url))
    }
}

/// `http://host/dir/image.bmp?x=1` -> `dir/image.bmp`.
fn url_path(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = rest.split_once('/').map_or("", |(_, path)| path);
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_start_matches('/')
}

pub struct FileBody {
    file: Option<BufReader<fs::File>>,
}

impl ErrorType for FileBody {
    type Error = std::io::Error;
}

impl embedded_io::Read for FileBody {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        use std::io::Read;
        match &mut self.file {
            Some(file) => file.read(buf),
            None => Ok(0),
        }
    }
}

impl Network for LocalNetwork {
    type Error = embedded_io::ErrorKind;
    type Body<'a>
        = FileBody
    where
        Self: 'a;

    fn connect(&mut self, credentials: &Credentials<'_>) -> Result<(), Self::Error> {
        if self.offline {
            return Err(embedded_io::ErrorKind::NotConnected);
        }
        debug!("Joining {}", credentials.ssid);
        self.connected = true;
        Ok(())
    }

    fn rssi(&self) -> i32 {
        self.rssi
    }

    fn get(&mut self, url: &str) -> Result<Response<FileBody>, Self::Error> {
        if !self.connected {
            return Err(embedded_io::ErrorKind::NotConnected);
        }
        let path = self.resolve(url);
        let response = match fs::File::open(&path) {
            Ok(file) => {
                let size = file
                    .metadata()
                    .map_err(|_| embedded_io::ErrorKind::InvalidInput)?
                    .len() as usize;
                info!("GET {url} -> {:?} ({size} bytes)", path);
                Response {
                    status: HTTP_OK,
                    content_length: Some(size),
                    body: FileBody {
                        file: Some(BufReader::new(file)),
                    },
                }
            }
            Err(_) => {
                info!("GET {url} -> {:?} not found", path);
                Response {
                    status: HTTP_NOT_FOUND,
                    content_length: Some(0),
                    body: FileBody { file: None },
                }
            }
        };
        Ok(response)
    }

    fn post_form(&mut self, url: &str, body: &str) -> Result<u16, Self::Error> {
        if !self.connected {
            return Err(embedded_io::ErrorKind::NotConnected);
        }
        let mut log = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.root.join(TELEMETRY_LOG))
            .map_err(|_| embedded_io::ErrorKind::PermissionDenied)?;
        writeln!(log, "{url} {CONTENT_TYPE} {body}").map_err(|_| embedded_io::ErrorKind::Other)?;
        Ok(HTTP_OK)
    }

    fn disconnect(&mut self) {
        self.connected = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_io::Read;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("inkframe-{name}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    const WIFI: Credentials<'static> = Credentials {
        ssid: "test",
        password: "",
    };

    #[test]
    fn url_paths() {
        assert_eq!(url_path("https://example.com/jpg.php"), "jpg.php");
        assert_eq!(url_path("http://host:8080/a/b.bmp?t=1"), "a/b.bmp");
        assert_eq!(url_path("http://host"), "");
        assert_eq!(url_path("/frame.bmp#top"), "frame.bmp");
    }

    #[test]
    fn serves_files_and_404s() {
        let dir = scratch_dir("serve");
        fs::write(dir.join("frame.bmp"), b"BM1234").unwrap();
        let mut net = LocalNetwork::new(dir.clone(), -50);
        assert!(net.get("http://x/frame.bmp").is_err());
        net.connect(&WIFI).unwrap();

        let mut response = net.get("http://x/frame.bmp").unwrap();
        assert_eq!(response.status, HTTP_OK);
        assert_eq!(response.content_length, Some(6));
        let mut buf = [0u8; 16];
        assert_eq!(response.body.read(&mut buf).unwrap(), 6);
        assert_eq!(&buf[..6], b"BM1234");

        let response = net.get("http://x/missing.bmp").unwrap();
        assert_eq!(response.status, HTTP_NOT_FOUND);
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn offline_refuses_connect() {
        let mut net = LocalNetwork::new(scratch_dir("offline"), -50);
        net.set_offline(true);
        assert_eq!(net.connect(&WIFI), Err(embedded_io::ErrorKind::NotConnected));
    }

    #[test]
    fn posts_are_logged() {
        let dir = scratch_dir("post");
        let mut net = LocalNetwork::new(dir.clone(), -50);
        net.connect(&WIFI).unwrap();
        assert_eq!(net.post_form("http://x/sensor", "temperature=1.00"), Ok(200));
        let log = fs::read_to_string(dir.join(TELEMETRY_LOG)).unwrap();
        assert!(log.ends_with("http://x/sensor application/x-www-form-urlencoded temperature=1.00\n"));
        fs::remove_dir_all(dir).ok();
    }
}
