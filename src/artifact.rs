use bytes::Bytes;
use futures::Stream;
use std::{
    io,
    path::{Path, PathBuf},
    pin::Pin,
    task::{Context, Poll},
};
use tokio::fs::File;
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};
use uuid::Uuid;

/// File name advertised to clients for every synthesized artifact.
pub const ARTIFACT_FILENAME: &str = "tts_output.mp3";
/// `Content-Disposition` value naming [`ARTIFACT_FILENAME`].
pub const ARTIFACT_DISPOSITION: &str = "attachment; filename=\"tts_output.mp3\"";

/// An MP3 file on disk owned by a single request. The file is removed when the
/// value is dropped.
#[derive(Debug)]
pub struct Artifact {
    path: PathBuf,
}

impl Artifact {
    pub async fn create(dir: &Path, audio: &[u8]) -> io::Result<Self> {
        tokio::fs::create_dir_all(dir).await?;
        let artifact = Self {
            path: dir.join(format!("tts_output-{}.mp3", Uuid::new_v4())),
        };
        tokio::fs::write(&artifact.path, audio).await?;
        debug!(path = %artifact.path.display(), bytes = audio.len(), "artifact written");
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the artifact for streaming. Returns the file length and a stream
    /// that keeps the artifact alive until the stream itself is dropped.
    pub async fn into_stream(self) -> io::Result<(u64, ArtifactStream)> {
        let file = File::open(&self.path).await?;
        let len = file.metadata().await?.len();
        Ok((
            len,
            ArtifactStream {
                inner: ReaderStream::new(file),
                _artifact: self,
            },
        ))
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        // Drop cannot await; a single unlink of a file we created is kept synchronous.
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "artifact removed"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), "failed to remove artifact: {}", e),
        }
    }
}

pub struct ArtifactStream {
    inner: ReaderStream<File>,
    _artifact: Artifact,
}

impl Stream for ArtifactStream {
    type Item = io::Result<Bytes>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
