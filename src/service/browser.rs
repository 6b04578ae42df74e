//! Headless Chrome handle scoped to a single scoring call.
//!
//! A `ChromeInstance` owns the browser process and its throwaway profile
//! directory. Callers release it with [`ChromeInstance::close`]; if the handle
//! is dropped instead (an early return, a cancelled future, a panic) the
//! process is killed and the profile removed from `Drop`.

use anyhow::{bail, Context, Result};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};
use tokio::process::{Child, ChildStderr, Command};
use url::Url;
use uuid::Uuid;

const LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEVTOOLS_BANNER: &str = "DevTools listening on ";

const CHROME_FLAGS: &[&str] = &[
    "--headless=new",
    "--no-sandbox",
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--disable-extensions",
    "--no-first-run",
    "--no-default-browser-check",
    "--remote-debugging-port=0",
];

pub struct ChromeInstance {
    child: Child,
    port: u16,
    profile_dir: PathBuf,
    closed: bool,
}

impl ChromeInstance {
    /// Start Chrome and wait until it reports its DevTools port.
    pub async fn launch(chrome_path: &Path) -> Result<Self> {
        let profile_dir =
            std::env::temp_dir().join(format!("gritaudit-chrome-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&profile_dir)
            .await
            .with_context(|| format!("Failed to create Chrome profile dir {:?}", profile_dir))?;

        let spawned = Command::new(chrome_path)
            .args(CHROME_FLAGS)
            .arg(format!("--user-data-dir={}", profile_dir.display()))
            .arg("about:blank")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn();

        let child = match spawned {
            Ok(child) => child,
            Err(e) => {
                let _ = tokio::fs::remove_dir_all(&profile_dir).await;
                return Err(e)
                    .with_context(|| format!("Failed to launch Chrome at {:?}", chrome_path));
            }
        };

        let mut instance = Self {
            child,
            port: 0,
            profile_dir,
            closed: false,
        };

        match instance.wait_for_devtools().await {
            Ok(port) => {
                log::debug!("[BROWSER] Chrome ready on DevTools port {}", port);
                instance.port = port;
                Ok(instance)
            }
            Err(e) => {
                instance.shutdown().await;
                Err(e)
            }
        }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Kill the browser and remove its profile directory.
    pub async fn close(mut self) {
        self.shutdown().await;
    }

    async fn wait_for_devtools(&mut self) -> Result<u16> {
        let stderr = self
            .child
            .stderr
            .take()
            .context("Chrome stderr was not captured")?;
        let mut lines = BufReader::new(stderr).lines();

        let port = tokio::time::timeout(LAUNCH_TIMEOUT, read_devtools_port(&mut lines))
            .await
            .with_context(|| {
                format!(
                    "Chrome did not expose DevTools within {}s",
                    LAUNCH_TIMEOUT.as_secs()
                )
            })??;

        // Keep draining so a chatty browser never blocks on a full pipe.
        tokio::spawn(async move { while let Ok(Some(_)) = lines.next_line().await {} });

        Ok(port)
    }

    async fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Err(e) = self.child.kill().await {
            log::debug!("[BROWSER] Chrome already gone: {}", e);
        }
        if let Err(e) = tokio::fs::remove_dir_all(&self.profile_dir).await {
            log::debug!("[BROWSER] Could not remove {:?}: {}", self.profile_dir, e);
        }
        log::debug!("[BROWSER] Chrome closed");
    }

    /// Resolve the Chrome executable from common install locations and `PATH`.
    ///
    /// Only checks the filesystem; nothing is spawned.
    pub fn find_executable(configured: Option<&Path>) -> PathBuf {
        if let Some(path) = configured {
            return path.to_path_buf();
        }

        let candidates: &[&str] = if cfg!(target_os = "windows") {
            &[
                "C:\\Program Files\\Google\\Chrome\\Application\\chrome.exe",
                "C:\\Program Files (x86)\\Google\\Chrome\\Application\\chrome.exe",
                "chrome.exe",
            ]
        } else if cfg!(target_os = "macos") {
            &[
                "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
                "/Applications/Chromium.app/Contents/MacOS/Chromium",
                "google-chrome",
            ]
        } else {
            &[
                "google-chrome",
                "google-chrome-stable",
                "chromium",
                "chromium-browser",
                "/usr/bin/google-chrome",
                "/usr/bin/chromium",
            ]
        };

        let search_path = std::env::var_os("PATH");
        locate_executable(candidates, search_path.as_deref())
            // Fallback - assume chrome is in PATH
            .unwrap_or_else(|| PathBuf::from("google-chrome"))
    }
}

/// First candidate that exists, either as an absolute path or under a
/// directory of `search_path`.
fn locate_executable(candidates: &[&str], search_path: Option<&OsStr>) -> Option<PathBuf> {
    candidates.iter().find_map(|candidate| {
        let path = Path::new(candidate);
        if path.is_absolute() {
            return path.is_file().then(|| path.to_path_buf());
        }
        search_path.and_then(|dirs| {
            std::env::split_paths(dirs)
                .map(|dir| dir.join(candidate))
                .find(|full| full.is_file())
        })
    })
}

impl Drop for ChromeInstance {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        log::warn!("[BROWSER] Chrome handle dropped without close, killing process");
        let _ = self.child.start_kill();
        let _ = std::fs::remove_dir_all(&self.profile_dir);
    }
}

async fn read_devtools_port(lines: &mut Lines<BufReader<ChildStderr>>) -> Result<u16> {
    while let Some(line) = lines.next_line().await? {
        if let Some(port) = parse_devtools_port(&line) {
            return Ok(port);
        }
    }
    bail!("Chrome exited before exposing DevTools")
}

/// Port from a `DevTools listening on ws://127.0.0.1:PORT/...` banner line.
pub fn parse_devtools_port(line: &str) -> Option<u16> {
    let (_, endpoint) = line.split_once(DEVTOOLS_BANNER)?;
    Url::parse(endpoint.trim()).ok()?.port()
}
