use std::{
    collections::HashMap,
    fmt, fs, io,
    path::{Path, PathBuf},
    sync::{
        Mutex,
        atomic::{AtomicU64, Ordering},
    },
};

/// Handle to a staged blob, valid until revoked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(String);

impl ObjectUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Destination for files produced by the dashboard.
///
/// A download is staged as an object URL, triggered once under a filename,
/// then revoked.
pub trait DownloadSink: Send + Sync {
    fn create_object_url(&self, blob: Vec<u8>) -> ObjectUrl;

    fn trigger_download(&self, url: &ObjectUrl, filename: &str) -> io::Result<()>;

    fn revoke_object_url(&self, url: ObjectUrl);
}

/// Saves triggered downloads into a directory.
#[derive(Debug)]
pub struct FsDownloads {
    dir: PathBuf,
    next_id: AtomicU64,
    blobs: Mutex<HashMap<ObjectUrl, Vec<u8>>>,
}

impl FsDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), next_id: AtomicU64::new(1), blobs: Mutex::new(HashMap::new()) }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of blobs staged and not yet revoked.
    pub fn live_urls(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }
}

impl DownloadSink for FsDownloads {
    fn create_object_url(&self, blob: Vec<u8>) -> ObjectUrl {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let url = ObjectUrl(format!("blob:cropdash/{id}"));
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(url.clone(), blob);
        }
        url
    }

    fn trigger_download(&self, url: &ObjectUrl, filename: &str) -> io::Result<()> {
        let blobs = self
            .blobs
            .lock()
            .map_err(|_| io::Error::other("download registry poisoned"))?;
        let blob = blobs.get(url).ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("object URL {url} was revoked"))
        })?;

        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(filename);
        fs::write(&path, blob)?;
        tracing::info!(path = %path.display(), bytes = blob.len(), "download saved");
        Ok(())
    }

    fn revoke_object_url(&self, url: ObjectUrl) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.remove(&url);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggered_blob_lands_in_directory() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsDownloads::new(dir.path().join("out"));

        let url = sink.create_object_url(b"name,score\nRice,80\n".to_vec());
        sink.trigger_download(&url, "recs.csv").unwrap();
        sink.revoke_object_url(url);

        let saved = fs::read_to_string(dir.path().join("out").join("recs.csv")).unwrap();
        assert_eq!(saved, "name,score\nRice,80\n");
        assert_eq!(sink.live_urls(), 0);
    }

    #[test]
    fn revoked_url_cannot_be_triggered() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FsDownloads::new(dir.path());

        let url = sink.create_object_url(vec![1, 2, 3]);
        sink.revoke_object_url(url.clone());

        let err = sink.trigger_download(&url, "x.bin").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn object_urls_are_unique() {
        let sink = FsDownloads::new(".");
        let a = sink.create_object_url(vec![]);
        let b = sink.create_object_url(vec![]);
        assert_ne!(a, b);
        assert_eq!(sink.live_urls(), 2);
    }
}
