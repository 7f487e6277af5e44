//! Production implementations of the loader's capability traits: disk image
//! decode, streaming HTTP bundle fetch, process-based engine start, and OS
//! randomness.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use image::RgbaImage;
use loader::{
    AssetError, AssetSource, BundleFetcher, DownloadError, EngineLaunch, EngineRuntime,
    RandomSource, StartupError,
};
use rand::rngs::OsRng;
use rand::RngCore;

/// Decodes splash images straight from disk.
pub struct DiskAssets;

impl AssetSource for DiskAssets {
    fn load_image(&self, path: &Path) -> Result<RgbaImage, AssetError> {
        let image = image::open(path).map_err(|err| AssetError::new(path, err))?;
        Ok(image.to_rgba8())
    }
}

/// Streams the bundle over HTTP into the cache directory. Progress events
/// come from the response content length; servers that omit it produce a
/// single terminal event.
pub struct HttpBundleFetcher {
    client: reqwest::blocking::Client,
    base_url: String,
    target_dir: PathBuf,
}

impl HttpBundleFetcher {
    pub fn new(base_url: String, target_dir: PathBuf) -> Result<Self, DownloadError> {
        // Bundles can be large; the overall-request timeout is disabled and
        // failures surface from the connection instead.
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("bootsplash/", env!("CARGO_PKG_VERSION")))
            .timeout(None::<Duration>)
            .build()
            .map_err(|err| DownloadError::with_source("building http client", err))?;
        Ok(Self {
            client,
            base_url,
            target_dir,
        })
    }

    fn bundle_url(&self, name: &str) -> String {
        format!("{}/{}.pck", self.base_url.trim_end_matches('/'), name)
    }
}

impl BundleFetcher for HttpBundleFetcher {
    fn fetch(
        &mut self,
        name: &str,
        on_progress: &mut dyn FnMut(u8),
    ) -> Result<PathBuf, DownloadError> {
        let url = self.bundle_url(name);
        tracing::info!(%url, "fetching engine bundle");
        let mut response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| DownloadError::with_source(format!("requesting {url}"), err))?;
        if !response.status().is_success() {
            return Err(DownloadError::new(format!(
                "{url} answered {}",
                response.status()
            )));
        }
        let total = response.content_length().filter(|length| *length > 0);

        fs::create_dir_all(&self.target_dir).map_err(|err| {
            DownloadError::with_source(format!("creating {}", self.target_dir.display()), err)
        })?;
        let target = self.target_dir.join(format!("{name}.pck"));
        let mut file = File::create(&target).map_err(|err| {
            DownloadError::with_source(format!("creating {}", target.display()), err)
        })?;

        on_progress(0);
        let mut received: u64 = 0;
        let mut last_percent = 0u8;
        let mut buffer = [0u8; 64 * 1024];
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|err| DownloadError::with_source(format!("reading {url}"), err))?;
            if read == 0 {
                break;
            }
            file.write_all(&buffer[..read]).map_err(|err| {
                DownloadError::with_source(format!("writing {}", target.display()), err)
            })?;
            received += read as u64;
            if let Some(total) = total {
                let percent = ((received * 100) / total).min(100) as u8;
                if percent != last_percent {
                    last_percent = percent;
                    on_progress(percent);
                }
            }
        }
        if last_percent != 100 {
            on_progress(100);
        }
        tracing::debug!(bytes = received, target = %target.display(), "bundle written");
        Ok(target)
    }
}

/// Runs the engine as a child process and waits for it to exit. The instance
/// seed is passed through the environment so the engine can pick it up
/// without a protocol of its own.
pub struct ProcessEngine;

impl EngineRuntime for ProcessEngine {
    fn start(&mut self, launch: &EngineLaunch) -> Result<(), StartupError> {
        let status = Command::new(&launch.executable)
            .args(&launch.args)
            .arg("--main-pack")
            .arg(&launch.bundle)
            .env("BOOTSPLASH_INSTANCE_SEED", seed_hex(&launch.instance_seed))
            .status()
            .map_err(|err| {
                StartupError::with_source(
                    format!("spawning {}", launch.executable.display()),
                    err,
                )
            })?;
        if !status.success() {
            return Err(StartupError::new(format!("engine exited with {status}")));
        }
        Ok(())
    }
}

/// Operating-system randomness for the per-boot instance seed.
pub struct OsRandom;

impl RandomSource for OsRandom {
    fn fill(&mut self, buffer: &mut [u8]) {
        OsRng.fill_bytes(buffer);
    }
}

fn seed_hex(seed: &[u8; 16]) -> String {
    seed.iter().map(|byte| format!("{byte:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Serves one canned HTTP response on a loopback port and returns the
    /// base URL to request it from.
    fn serve_once(status_line: &'static str, body: Vec<u8>, content_length: bool) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        thread::spawn(move || {
            let (mut stream, _) = listener.accept().expect("accept");
            let mut request = [0u8; 1024];
            let _ = stream.read(&mut request);
            let mut header = format!("HTTP/1.1 {status_line}\r\nConnection: close\r\n");
            if content_length {
                header.push_str(&format!("Content-Length: {}\r\n", body.len()));
            }
            header.push_str("\r\n");
            stream.write_all(header.as_bytes()).expect("write header");
            stream.write_all(&body).expect("write body");
        });
        format!("http://{addr}")
    }

    #[test]
    fn fetch_streams_to_disk_and_reports_monotonic_progress() {
        let body: Vec<u8> = (0..150_000u32).map(|i| (i % 251) as u8).collect();
        let url = serve_once("200 OK", body.clone(), true);
        let dir = tempfile::tempdir().expect("tempdir");
        let mut fetcher =
            HttpBundleFetcher::new(url, dir.path().to_path_buf()).expect("build fetcher");

        let mut events: Vec<u8> = Vec::new();
        let target = fetcher
            .fetch("engine", &mut |percent| events.push(percent))
            .expect("fetch");

        assert_eq!(target, dir.path().join("engine.pck"));
        assert_eq!(fs::read(&target).expect("read bundle"), body);
        assert_eq!(events.first(), Some(&0));
        assert_eq!(events.last(), Some(&100));
        assert!(events.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn fetch_without_content_length_emits_single_terminal_event() {
        let url = serve_once("200 OK", b"pck".to_vec(), false);
        let dir = tempfile::tempdir().expect("tempdir");
        let mut fetcher =
            HttpBundleFetcher::new(url, dir.path().to_path_buf()).expect("build fetcher");

        let mut events: Vec<u8> = Vec::new();
        let target = fetcher
            .fetch("engine", &mut |percent| events.push(percent))
            .expect("fetch");

        assert_eq!(events, vec![0, 100]);
        assert_eq!(fs::read(target).expect("read bundle"), b"pck");
    }

    #[test]
    fn fetch_rejects_http_errors() {
        let url = serve_once("404 Not Found", Vec::new(), true);
        let dir = tempfile::tempdir().expect("tempdir");
        let mut fetcher =
            HttpBundleFetcher::new(url, dir.path().to_path_buf()).expect("build fetcher");

        let err = fetcher
            .fetch("engine", &mut |_| {})
            .expect_err("non-success status");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn bundle_url_joins_without_double_slash() {
        let fetcher =
            HttpBundleFetcher::new("https://cdn.example.com/dist/".to_string(), PathBuf::new())
                .expect("build fetcher");
        assert_eq!(
            fetcher.bundle_url("engine"),
            "https://cdn.example.com/dist/engine.pck"
        );
        let bare =
            HttpBundleFetcher::new("https://cdn.example.com/dist".to_string(), PathBuf::new())
                .expect("build fetcher");
        assert_eq!(
            bare.bundle_url("engine"),
            "https://cdn.example.com/dist/engine.pck"
        );
    }

    #[test]
    fn disk_assets_round_trip_a_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]))
            .save(&path)
            .expect("write png");

        let decoded = DiskAssets.load_image(&path).expect("decode");
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);
    }

    #[test]
    fn disk_assets_report_missing_files() {
        let err = DiskAssets.load_image(Path::new("/nonexistent/bg.png"));
        assert!(err.is_err());
    }

    #[test]
    fn seed_renders_as_lowercase_hex() {
        let seed = [0x00, 0xff, 0x10, 0xab, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1];
        assert_eq!(seed_hex(&seed), "00ff10ab000000000000000000000001");
    }

    #[test]
    fn os_random_fills_the_buffer() {
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        OsRandom.fill(&mut a);
        OsRandom.fill(&mut b);
        // Sixteen zero bytes twice in a row would mean the source is dead.
        assert!(a != [0u8; 16] || b != [0u8; 16]);
    }
}
