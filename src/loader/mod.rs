//! Asset loading: the handle a request resolves through, supported formats
//! and the decoders behind `FileAssetLoader`.

mod environment;
mod file;
mod gltf;
mod obj;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures::channel::{mpsc, oneshot};

use crate::animation::AnimationClip;
use crate::error::LoadError;
use crate::scene::SceneGraph;

pub use self::environment::load_environment_file;
pub use self::file::FileAssetLoader;
pub use self::gltf::load_gltf_file;
pub use self::obj::load_obj_file;

/// Extensions `Viewer::load_url` accepts, lowercase
pub const SUPPORTED_EXTENSIONS: [&str; 3] = ["gltf", "glb", "obj"];

/// Called from the loading thread whenever the handle has news
pub type Waker = Arc<dyn Fn() + Send + Sync>;

/// A decoded model and the clips that animate it
#[derive(Debug, Clone, Default)]
pub struct LoadedScene {
    pub graph: SceneGraph,
    pub clips: Vec<AnimationClip>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProgress {
    pub loaded: u64,
    pub total: Option<u64>,
}

impl LoadProgress {
    pub fn fraction(&self) -> Option<f32> {
        match self.total {
            Some(0) => Some(1.0),
            Some(total) => Some(self.loaded as f32 / total as f32),
            None => None,
        }
    }
}

/// Lowercased extension of `url` when it is one the viewer supports
///
/// Query strings and fragments are ignored.
pub fn supported_extension(url: &str) -> Option<&'static str> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let file = path.rsplit(['/', '\\']).next().unwrap_or(path);
    let (_, extension) = file.rsplit_once('.')?;
    let extension = extension.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS
        .iter()
        .copied()
        .find(|supported| *supported == extension)
}

/// Producer half of a load request
pub struct LoadSender<T> {
    url: String,
    result: Option<oneshot::Sender<Result<T, LoadError>>>,
    progress: mpsc::UnboundedSender<LoadProgress>,
    waker: Option<Waker>,
}

impl<T> LoadSender<T> {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn progress(&self, loaded: u64, total: Option<u64>) {
        // the receiver may already be gone; progress is best effort
        let _ = self.progress.unbounded_send(LoadProgress { loaded, total });
        self.wake();
    }

    /// Deliver the result; later calls are ignored
    pub fn finish(&mut self, result: Result<T, LoadError>) {
        if let Some(sender) = self.result.take() {
            let _ = sender.send(result);
            self.progress.close_channel();
            self.wake();
        }
    }

    fn wake(&self) {
        if let Some(waker) = &self.waker {
            waker();
        }
    }
}

/// Consumer half: resolves exactly once
pub struct LoadHandle<T> {
    url: String,
    result: oneshot::Receiver<Result<T, LoadError>>,
    progress: mpsc::UnboundedReceiver<LoadProgress>,
    resolved: bool,
}

/// Connected sender and handle for `url`
pub fn channel<T>(url: impl Into<String>, waker: Option<Waker>) -> (LoadSender<T>, LoadHandle<T>) {
    let url = url.into();
    let (result_tx, result_rx) = oneshot::channel();
    let (progress_tx, progress_rx) = mpsc::unbounded();
    (
        LoadSender {
            url: url.clone(),
            result: Some(result_tx),
            progress: progress_tx,
            waker,
        },
        LoadHandle {
            url,
            result: result_rx,
            progress: progress_rx,
            resolved: false,
        },
    )
}

impl<T> LoadHandle<T> {
    /// Handle that is already resolved
    pub fn ready(url: impl Into<String>, result: Result<T, LoadError>) -> Self {
        let (mut sender, handle) = channel(url, None);
        sender.finish(result);
        handle
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    /// Progress reported since the last call
    pub fn drain_progress(&mut self) -> Vec<LoadProgress> {
        let mut events = Vec::new();
        while let Ok(Some(progress)) = self.progress.try_next() {
            events.push(progress);
        }
        events
    }

    /// Non-blocking check for the result; yields it at most once
    pub fn try_poll(&mut self) -> Option<Result<T, LoadError>> {
        if self.resolved {
            return None;
        }
        let outcome = match self.result.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(oneshot::Canceled) => Err(self.abandoned()),
        };
        self.resolved = true;
        Some(outcome)
    }

    fn abandoned(&self) -> LoadError {
        LoadError::transport(&self.url, "loader dropped the request")
    }
}

impl<T> Future for LoadHandle<T> {
    type Output = Result<T, LoadError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.result).poll(cx) {
            Poll::Ready(outcome) => {
                this.resolved = true;
                Poll::Ready(outcome.unwrap_or_else(|_| Err(this.abandoned())))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
