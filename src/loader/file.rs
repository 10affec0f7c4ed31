use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::Result;
use chrono::Local;

use crate::error::LoadError;
use crate::scene::{EnvironmentTexture, SceneGraph};
use crate::traits::AssetLoader;

use super::{
    channel, load_environment_file, load_gltf_file, load_obj_file, supported_extension,
    LoadHandle, LoadedScene, Waker,
};

/// Loads assets from the local filesystem on one background thread per request
#[derive(Default)]
pub struct FileAssetLoader {
    root: Option<PathBuf>,
    waker: Option<Waker>,
}

impl FileAssetLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve relative URLs against `root`
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    /// Called from the loading thread on progress and completion
    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = url.split(['?', '#']).next().unwrap_or(url);
        let path = Path::new(path.strip_prefix("file://").unwrap_or(path));
        match &self.root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path.to_path_buf(),
        }
    }

    fn spawn<T, F>(&self, url: &str, decode: F) -> LoadHandle<T>
    where
        T: Send + 'static,
        F: FnOnce(&Path) -> Result<T> + Send + 'static,
    {
        let (mut sender, handle) = channel(url, self.waker.clone());
        let path = self.resolve(url);
        let url = url.to_string();

        let spawned = thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                let started = Local::now();
                let size = match fs::metadata(&path) {
                    Ok(metadata) if metadata.is_file() => metadata.len(),
                    Ok(_) => {
                        sender.finish(Err(LoadError::transport(&url, "not a regular file")));
                        return;
                    }
                    Err(err) => {
                        sender.finish(Err(LoadError::transport(&url, err.to_string())));
                        return;
                    }
                };
                sender.progress(0, Some(size));

                let result = decode(&path).map_err(|err| classify(&url, err));
                match &result {
                    Ok(_) => {
                        sender.progress(size, Some(size));
                        let elapsed = Local::now() - started;
                        log::info!("loaded {url} in {} ms", elapsed.num_milliseconds());
                    }
                    Err(err) => log::warn!("failed to load {url}: {}", err.detail),
                }
                sender.finish(result);
            });
        if let Err(err) = spawned {
            // the sender went down with the closure, so the handle resolves as a transport failure
            log::error!("could not start loader thread: {err}");
        }
        handle
    }
}

/// Keep typed load errors, everything else is a malformed file
fn classify(url: &str, err: anyhow::Error) -> LoadError {
    match err.downcast::<LoadError>() {
        Ok(err) => err,
        Err(err) => LoadError::malformed(url, format!("{err:#}")),
    }
}

impl AssetLoader for FileAssetLoader {
    fn load_scene(&mut self, url: &str) -> LoadHandle<LoadedScene> {
        let obj = supported_extension(url) == Some("obj");
        self.spawn(url, move |path| {
            if obj {
                Ok(LoadedScene {
                    graph: load_obj_file(path)?,
                    clips: Vec::new(),
                })
            } else {
                load_gltf_file(path)
            }
        })
    }

    fn load_object(&mut self, url: &str) -> LoadHandle<SceneGraph> {
        let obj = supported_extension(url) == Some("obj");
        self.spawn(url, move |path| {
            if obj {
                load_obj_file(path)
            } else {
                Ok(load_gltf_file(path)?.graph)
            }
        })
    }

    fn load_environment(&mut self, url: &str) -> LoadHandle<EnvironmentTexture> {
        self.spawn(url, |path| load_environment_file(path))
    }
}
