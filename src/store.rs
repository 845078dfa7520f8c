//! Export download and local data directory manager.
//!
//! Downloads and caches Triplog platform export files (NDJSON tables and JSON
//! reference documents). Checks Meta.json for export-stamp changes and
//! re-downloads when stale. Individual files are downloaded lazily on first
//! access.

use crate::config;
use crate::error::{Result, TriplogError};
use flate2::read::GzDecoder;
use reqwest::blocking::Client;
use std::fs;
use std::io::{BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Downloads and caches Triplog export files from the platform.
///
/// Checks Meta.json for export-stamp changes and re-downloads when stale.
/// Individual files are downloaded lazily on first access.
pub struct StoreManager {
    /// Directory where the database file and cached exports live.
    pub data_dir: PathBuf,
    /// If true, never talk to the platform (use local files only).
    pub offline: bool,
    timeout: Duration,
    client: Option<Client>,
    remote_stamp: Option<String>,
}

impl StoreManager {
    /// Create a new store manager.
    ///
    /// If `data_dir` is `None`, uses the platform-appropriate default cache
    /// directory. Creates the directory if it does not exist.
    pub fn new(data_dir: Option<PathBuf>, offline: bool, timeout: Duration) -> Result<Self> {
        let dir = data_dir.unwrap_or_else(config::default_data_dir);
        fs::create_dir_all(&dir)?;
        Ok(Self {
            data_dir: dir,
            offline,
            timeout,
            client: None,
            remote_stamp: None,
        })
    }

    /// Lazy HTTP client, created on first use.
    pub fn client(&mut self) -> &Client {
        if self.client.is_none() {
            self.client = Some(
                Client::builder()
                    .timeout(self.timeout)
                    .redirect(reqwest::redirect::Policy::limited(10))
                    .build()
                    .expect("failed to build HTTP client"),
            );
        }
        self.client.as_ref().unwrap()
    }

    /// Read the locally recorded export stamp from `manifest.txt`.
    fn local_stamp(&self) -> Option<String> {
        let manifest = self.data_dir.join("manifest.txt");
        if manifest.exists() {
            fs::read_to_string(&manifest)
                .ok()
                .map(|s| s.trim().to_string())
        } else {
            None
        }
    }

    /// Record an export stamp in `manifest.txt` in the data directory.
    fn save_stamp(&self, stamp: &str) {
        let manifest = self.data_dir.join("manifest.txt");
        let _ = fs::write(manifest, stamp);
    }

    /// Fetch the current export stamp from Meta.json on the platform.
    ///
    /// Returns the stamp string (e.g. `"2026-08-01T04:00:00Z"`), or `None` if
    /// offline or the platform is unreachable. Caches the result for
    /// subsequent calls.
    pub fn remote_stamp(&mut self) -> Result<Option<String>> {
        if self.remote_stamp.is_some() {
            return Ok(self.remote_stamp.clone());
        }
        if self.offline {
            return Ok(None);
        }
        let client = self.client().clone();
        match client.get(config::META_URL).send() {
            Ok(resp) => {
                let resp = resp.error_for_status()?;
                let data: serde_json::Value = resp.json()?;
                // Try data.exported_at first, then meta.exported_at
                let stamp = data
                    .get("data")
                    .and_then(|d| d.get("exported_at"))
                    .and_then(|v| v.as_str())
                    .or_else(|| {
                        data.get("meta")
                            .and_then(|m| m.get("exported_at"))
                            .and_then(|v| v.as_str())
                    })
                    .map(|s| s.to_string());
                self.remote_stamp = stamp.clone();
                Ok(stamp)
            }
            Err(e) => {
                eprintln!("Failed to fetch export stamp from platform: {}", e);
                Ok(None)
            }
        }
    }

    /// Check if the local exports are out of date compared to the platform.
    ///
    /// Returns `true` if there are no local exports or the platform has a
    /// newer export. Returns `false` if up to date or the platform is
    /// unreachable.
    pub fn is_stale(&mut self) -> Result<bool> {
        let local = self.local_stamp();
        match local {
            None => Ok(true),
            Some(local_stamp) => {
                let remote = self.remote_stamp()?;
                match remote {
                    None => Ok(false), // Can't check, assume fresh
                    Some(remote_stamp) => Ok(local_stamp != remote_stamp),
                }
            }
        }
    }

    /// Download a single file from the platform.
    ///
    /// Downloads into a temp file in the destination directory and persists
    /// it on success, so an interrupted download never leaves a corrupt
    /// partial file behind.
    fn download_file(&mut self, filename: &str, dest: &Path) -> Result<()> {
        let url = format!("{}/{}", config::EXPORT_BASE, filename);
        eprintln!("Downloading {}", url);

        let parent = dest.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent)?;

        let client = self.client().clone();
        let resp = client.get(&url).send()?.error_for_status()?;
        let bytes = resp.bytes()?;

        let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(dest).map_err(|e| e.error)?;

        Ok(())
    }

    /// Ensure an NDJSON export is present locally, downloading if needed.
    ///
    /// # Arguments
    ///
    /// * `table_name` - Logical table name (e.g. `"trips"`, `"positions"`).
    ///
    /// # Returns
    ///
    /// Local filesystem path to the export file.
    pub fn ensure_export(&mut self, table_name: &str) -> Result<PathBuf> {
        let export_files = config::export_files();
        let filename = export_files.get(table_name).ok_or_else(|| {
            TriplogError::NotFound(format!("Unknown export table: {}", table_name))
        })?;

        let local_path = self.data_dir.join(filename);

        if !local_path.exists() || self.is_stale()? {
            if self.offline {
                if local_path.exists() {
                    return Ok(local_path);
                }
                return Err(TriplogError::NotFound(format!(
                    "Export {} not present locally and offline mode is enabled",
                    filename
                )));
            }
            self.download_file(filename, &local_path)?;
            // Update the manifest after a successful download
            if let Ok(Some(stamp)) = self.remote_stamp() {
                self.save_stamp(&stamp);
            }
        }

        Ok(local_path)
    }

    /// Ensure a JSON document is present locally, downloading if needed.
    ///
    /// # Arguments
    ///
    /// * `name` - Logical document name (e.g. `"meta"`, `"languages"`).
    ///
    /// # Returns
    ///
    /// Local filesystem path to the JSON document.
    pub fn ensure_json(&mut self, name: &str) -> Result<PathBuf> {
        let json_files = config::json_files();
        let filename = json_files.get(name).ok_or_else(|| {
            TriplogError::NotFound(format!("Unknown JSON document: {}", name))
        })?;

        let local_path = self.data_dir.join(filename);

        if !local_path.exists() || self.is_stale()? {
            if self.offline {
                if local_path.exists() {
                    return Ok(local_path);
                }
                return Err(TriplogError::NotFound(format!(
                    "JSON document {} not present locally and offline mode is enabled",
                    filename
                )));
            }
            self.download_file(filename, &local_path)?;
            if let Ok(Some(stamp)) = self.remote_stamp() {
                self.save_stamp(&stamp);
            }
        }

        Ok(local_path)
    }

    /// Load and parse a JSON document (handles `.gz` transparently).
    ///
    /// If the local file is corrupt (truncated download, disk error), it is
    /// deleted automatically so the next call re-downloads a fresh copy.
    pub fn load_json(&mut self, name: &str) -> Result<serde_json::Value> {
        let path = self.ensure_json(name)?;

        let parse_result = if path.extension().and_then(|e| e.to_str()) == Some("gz") {
            let file = fs::File::open(&path)?;
            let reader = BufReader::new(file);
            let decoder = GzDecoder::new(reader);
            let mut buf_reader = BufReader::new(decoder);
            let mut contents = String::new();
            buf_reader.read_to_string(&mut contents)?;
            serde_json::from_str(&contents).map_err(TriplogError::from)
        } else {
            let contents = fs::read_to_string(&path)?;
            serde_json::from_str(&contents).map_err(TriplogError::from)
        };

        match parse_result {
            Ok(value) => Ok(value),
            Err(e) => {
                eprintln!("Corrupt export file {}: {} -- removing", path.display(), e);
                let _ = fs::remove_file(&path);
                Err(TriplogError::NotFound(format!(
                    "Export file '{}' was corrupt and has been removed. \
                     Retry to re-download. Original error: {}",
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or("unknown"),
                    e
                )))
            }
        }
    }

    /// Remove all downloaded export files and recreate the data directory.
    ///
    /// The database file itself is left in place; callers that want a truly
    /// fresh start should also reset the connection's table registry.
    pub fn clear(&self) -> Result<()> {
        for filename in config::export_files().values().chain(config::json_files().values()) {
            let path = self.data_dir.join(filename);
            if path.exists() {
                fs::remove_file(&path)?;
            }
        }
        let manifest = self.data_dir.join("manifest.txt");
        if manifest.exists() {
            fs::remove_file(&manifest)?;
        }
        Ok(())
    }

    /// Close the HTTP client, if open.
    pub fn close(&mut self) {
        self.client = None;
    }
}
