//! Async batch processing module
//!
//! This module loads and saves many object files concurrently. Every file
//! gets its own result, so one corrupt object does not abort the batch.

#[cfg(feature = "async")]
/// Concurrent object file processing with a configurable concurrency limit
pub mod processor {
    use crate::{ObjDataError, ObjectRecord, Result};
    use futures::stream::{self, StreamExt};
    use log::{debug, warn};
    use std::path::{Path, PathBuf};

    /// Concurrent object file processor
    #[derive(Debug, Clone)]
    pub struct AsyncBatchProcessor {
        concurrency_limit: usize,
    }

    impl AsyncBatchProcessor {
        /// Create a new batch processor with one task per CPU
        pub fn new() -> Self {
            Self {
                concurrency_limit: num_cpus::get(),
            }
        }

        /// Set the concurrency limit
        pub fn with_concurrency(mut self, limit: usize) -> Self {
            self.concurrency_limit = limit.max(1);
            self
        }

        /// Current concurrency limit
        pub fn concurrency(&self) -> usize {
            self.concurrency_limit
        }

        /// Load object files, returning one result per file in completion order
        pub async fn load_objects<P: AsRef<Path>>(
            &self,
            files: Vec<P>,
        ) -> Vec<(PathBuf, Result<ObjectRecord>)> {
            stream::iter(files.into_iter().map(|path| {
                let path = path.as_ref().to_path_buf();
                async move {
                    let result = Self::load_single_object(&path).await;
                    if let Err(e) = &result {
                        warn!("skipping {}: {}", path.display(), e);
                    }
                    (path, result)
                }
            }))
            .buffer_unordered(self.concurrency_limit)
            .collect()
            .await
        }

        /// Save objects, recomputing each checksum; returns one result per file
        pub async fn save_objects(
            &self,
            objects: Vec<(PathBuf, ObjectRecord)>,
        ) -> Vec<(PathBuf, Result<()>)> {
            stream::iter(objects.into_iter().map(|(path, object)| async move {
                let result = Self::save_single_object(&path, object).await;
                (path, result)
            }))
            .buffer_unordered(self.concurrency_limit)
            .collect()
            .await
        }

        async fn load_single_object(path: &Path) -> Result<ObjectRecord> {
            let bytes = tokio::fs::read(path).await?;
            let record = tokio::task::spawn_blocking(move || ObjectRecord::from_bytes(&bytes))
                .await
                .map_err(|e| ObjDataError::Io(std::io::Error::other(e)))??;
            debug!("loaded {} ({} bytes)", path.display(), record.data.len());
            Ok(record)
        }

        async fn save_single_object(path: &Path, mut object: ObjectRecord) -> Result<()> {
            let bytes = tokio::task::spawn_blocking(move || object.to_bytes())
                .await
                .map_err(|e| ObjDataError::Io(std::io::Error::other(e)))??;
            tokio::fs::write(path, bytes).await?;
            Ok(())
        }
    }

    impl Default for AsyncBatchProcessor {
        fn default() -> Self {
            Self::new()
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::{ChunkEncoding, ObjectHeader};

        #[tokio::test]
        async fn test_bad_file_does_not_abort_batch() {
            let dir = tempfile::tempdir().unwrap();
            let good = dir.path().join("GOOD.DAT");
            let bad = dir.path().join("BAD.DAT");

            let mut record = ObjectRecord::new(
                ObjectHeader::new(0x81, "GOOD"),
                ChunkEncoding::Rle,
                vec![7; 100],
            );
            tokio::fs::write(&good, record.to_bytes().unwrap())
                .await
                .unwrap();
            tokio::fs::write(&bad, [0u8; 5]).await.unwrap();

            let processor = AsyncBatchProcessor::new().with_concurrency(2);
            let mut results = processor.load_objects(vec![&good, &bad]).await;
            results.sort_by(|a, b| a.0.cmp(&b.0));

            assert_eq!(results.len(), 2);
            assert!(results[0].1.is_err());
            assert_eq!(results[1].1.as_ref().unwrap(), &record);
        }

        #[tokio::test]
        async fn test_save_then_load() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("WATER.DAT");
            let record = ObjectRecord::new(
                ObjectHeader::new(0x89, "WATER"),
                ChunkEncoding::Rotate,
                b"blue".to_vec(),
            );

            let processor = AsyncBatchProcessor::default();
            let saved = processor
                .save_objects(vec![(path.clone(), record)])
                .await;
            assert!(saved[0].1.is_ok());

            let loaded = processor.load_objects(vec![path]).await;
            let object = loaded[0].1.as_ref().unwrap();
            assert_eq!(object.data, b"blue");
            assert!(object.verify_checksum().unwrap());
        }
    }
}

#[cfg(feature = "async")]
pub use processor::AsyncBatchProcessor;
