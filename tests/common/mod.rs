//! Helpers for integration tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use pushkind_catalog::db::{DbPool, establish_connection_pool, run_migrations};
use pushkind_catalog::storage::{ImageStore, StorageError, StorageResult, UploadOptions, UploadedImage};

/// Temporary database used in integration tests.
pub struct TestDb {
    filename: String,
    pool: DbPool,
}

impl TestDb {
    pub fn new(filename: &str) -> Self {
        std::fs::remove_file(filename).ok(); // Clean up old DB

        let pool =
            establish_connection_pool(filename).expect("Failed to establish SQLite connection.");
        run_migrations(&pool).expect("Migrations failed");
        TestDb {
            filename: filename.to_string(),
            pool,
        }
    }
    pub fn pool(&self) -> DbPool {
        self.pool.clone()
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        std::fs::remove_file(&self.filename).ok();
        std::fs::remove_file(format!("{}-shm", &self.filename)).ok();
        std::fs::remove_file(format!("{}-wal", &self.filename)).ok();
    }
}

/// In-memory image store that records what it was asked to do.
///
/// Uploads remove the local file, mirroring the real store.
#[derive(Default)]
pub struct FakeImageStore {
    counter: AtomicUsize,
    uploads: Mutex<Vec<PathBuf>>,
    deletions: Mutex<Vec<String>>,
    fail_uploads: bool,
}

impl FakeImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            ..Self::default()
        }
    }

    pub fn uploads(&self) -> Vec<PathBuf> {
        self.uploads.lock().expect("uploads lock").clone()
    }

    pub fn deletions(&self) -> Vec<String> {
        self.deletions.lock().expect("deletions lock").clone()
    }
}

#[async_trait]
impl ImageStore for FakeImageStore {
    async fn upload(
        &self,
        local_path: &Path,
        options: UploadOptions,
    ) -> StorageResult<UploadedImage> {
        self.uploads
            .lock()
            .expect("uploads lock")
            .push(local_path.to_path_buf());
        std::fs::remove_file(local_path).ok();

        if self.fail_uploads {
            return Err(StorageError::Rejected {
                status: 500,
                message: "upload refused".to_string(),
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let folder = options.folder.unwrap_or_else(|| "products".to_string());
        let public_id = format!("{folder}/image-{n}");
        Ok(UploadedImage::new(
            format!("https://res.example.com/{public_id}.png"),
            public_id,
        ))
    }

    async fn delete(&self, public_id: &str) -> StorageResult<()> {
        self.deletions
            .lock()
            .expect("deletions lock")
            .push(public_id.to_string());
        Ok(())
    }
}

/// Write a small file that stands in for an uploaded image.
pub fn staged_image(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"\x89PNG fake image").expect("write staged image");
    path
}
