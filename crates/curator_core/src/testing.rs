use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use crate::errors::{Error, Result};
use crate::store::{ArtifactStore, CopyStatus};

#[derive(Default)]
struct State {
    objects: HashMap<String, Bytes>,
    fetches: Vec<String>,
    copies: Vec<(String, String)>,
    failing_fetches: HashSet<String>,
    hanging_fetches: HashSet<String>,
    panicking_fetches: HashSet<String>,
    failing_copies: HashSet<String>,
}

enum FetchBehavior {
    Respond(Result<Option<Bytes>>),
    Hang,
    Panic,
}

/// In-memory [`ArtifactStore`] that records every call made against it.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn insert(&self, path: &str, content: impl Into<Bytes>) {
        self.state
            .lock()
            .unwrap()
            .objects
            .insert(path.to_string(), content.into());
    }

    pub fn contains(&self, path: &str) -> bool {
        self.state.lock().unwrap().objects.contains_key(path)
    }

    /// Paths fetched so far, in call order.
    pub fn fetches(&self) -> Vec<String> {
        self.state.lock().unwrap().fetches.clone()
    }

    /// `(source, dest)` pairs of every copy attempted so far, in call order.
    pub fn copies(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().copies.clone()
    }

    /// Make every fetch of `path` fail in transit.
    pub fn fail_fetch(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_fetches
            .insert(path.to_string());
    }

    /// Make every fetch of `path` wait forever.
    pub fn hang_fetch(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .hanging_fetches
            .insert(path.to_string());
    }

    /// Make every fetch of `path` panic.
    pub fn panic_on_fetch(&self, path: &str) {
        self.state
            .lock()
            .unwrap()
            .panicking_fetches
            .insert(path.to_string());
    }

    /// Make every copy from `source` fail in transit.
    pub fn fail_copy(&self, source: &str) {
        self.state
            .lock()
            .unwrap()
            .failing_copies
            .insert(source.to_string());
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn fetch(&self, path: &str) -> Result<Option<Bytes>> {
        // decide under the lock, act after releasing it so a panic cannot poison the state
        let behavior = {
            let mut state = self.state.lock().unwrap();
            state.fetches.push(path.to_string());
            if state.panicking_fetches.contains(path) {
                FetchBehavior::Panic
            } else if state.hanging_fetches.contains(path) {
                FetchBehavior::Hang
            } else if state.failing_fetches.contains(path) {
                FetchBehavior::Respond(Err(Error::BackendError(
                    format!("connection reset fetching {path}").into(),
                )))
            } else {
                FetchBehavior::Respond(Ok(state.objects.get(path).cloned()))
            }
        };
        match behavior {
            FetchBehavior::Respond(r) => r,
            FetchBehavior::Hang => std::future::pending().await,
            FetchBehavior::Panic => panic!("fetch of {path} blew up"),
        }
    }

    async fn copy(&self, source: &str, dest: &str) -> Result<CopyStatus> {
        let mut state = self.state.lock().unwrap();
        state.copies.push((source.to_string(), dest.to_string()));
        if state.failing_copies.contains(source) {
            return Err(Error::BackendError(
                format!("connection reset copying {source}").into(),
            ));
        }
        let content = match state.objects.get(source) {
            Some(c) => c.clone(),
            None => return Err(Error::BackendError(format!("{source} not found").into())),
        };
        if state.objects.contains_key(dest) {
            return Ok(CopyStatus::AlreadyExists);
        }
        state.objects.insert(dest.to_string(), content);
        Ok(CopyStatus::Copied)
    }
}

pub mod fixtures {
    use serde_json::json;

    use super::MemoryStore;

    pub const C1: &str = "sha256:c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1";
    pub const C1_PATH: &str = "sha256__c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1c1";
    pub const C2: &str = "sha256:c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2";
    pub const C2_PATH: &str = "sha256__c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2c2";
    pub const L1: &str = "sha256:b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1";
    pub const L1_PATH: &str = "sha256__b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1b1";
    pub const L2: &str = "sha256:b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2";
    pub const L2_PATH: &str = "sha256__b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2b2";
    pub const L3: &str = "sha256:b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3";
    pub const L3_PATH: &str = "sha256__b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3b3";
    pub const D1: &str = "sha256:d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1";
    pub const D1_PATH: &str = "sha256__d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1d1";
    pub const D2: &str = "sha256:d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2";
    pub const D2_PATH: &str = "sha256__d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2d2";

    const IMAGE_MANIFEST_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.v2+json";
    const INDEX_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.list.v2+json";

    fn path_of(digest: &str) -> String {
        digest.replace(':', "__")
    }

    /// Single-platform manifest referencing `config` and `layers`.
    pub fn manifest(config: &str, layers: &[&str]) -> String {
        json!({
            "schemaVersion": 2,
            "mediaType": IMAGE_MANIFEST_MEDIA_TYPE,
            "config": {
                "mediaType": "application/vnd.docker.container.image.v1+json",
                "digest": config,
                "size": 1472,
            },
            "layers": layers.iter().map(|l| json!({
                "mediaType": "application/vnd.docker.image.rootfs.diff.tar.gzip",
                "digest": l,
                "size": 31_357_624,
            })).collect::<Vec<_>>(),
        })
        .to_string()
    }

    /// Manifest list with one linux entry per `(architecture, digest)` pair.
    pub fn index(platforms: &[(&str, &str)]) -> String {
        json!({
            "schemaVersion": 2,
            "mediaType": INDEX_MEDIA_TYPE,
            "manifests": platforms.iter().map(|(arch, digest)| json!({
                "mediaType": IMAGE_MANIFEST_MEDIA_TYPE,
                "digest": digest,
                "size": 528,
                "platform": {"architecture": arch, "os": "linux"},
            })).collect::<Vec<_>>(),
        })
        .to_string()
    }

    /// Single manifest image under `tag_folder` with config [`C1`] and the first `layers` of
    /// [`L1`], [`L2`], [`L3`], blobs included.
    pub fn single_arch_image(store: &MemoryStore, tag_folder: &str, layers: usize) {
        let layers: Vec<&str> = [L1, L2, L3].into_iter().take(layers).collect();
        store.insert(
            &format!("{tag_folder}/manifest.json"),
            manifest(C1, &layers),
        );
        for digest in std::iter::once(C1).chain(layers) {
            store.insert(&format!("{tag_folder}/{}", path_of(digest)), digest.to_string());
        }
    }

    /// Manifest list under `tag_folder` with an amd64 platform ([`D1`]: [`C1`], [`L1`], [`L2`])
    /// and an arm64 platform ([`D2`]: [`C2`], [`L3`]), blobs included.
    pub fn multi_arch_image(store: &MemoryStore, tag_folder: &str) {
        store.insert(
            &format!("{tag_folder}/list.manifest.json"),
            index(&[("amd64", D1), ("arm64", D2)]),
        );
        for (platform, config, layers) in [(D1, C1, vec![L1, L2]), (D2, C2, vec![L3])] {
            let platform_folder = format!("{tag_folder}/{}", path_of(platform));
            store.insert(
                &format!("{platform_folder}/manifest.json"),
                manifest(config, &layers),
            );
            for digest in std::iter::once(config).chain(layers) {
                store.insert(
                    &format!("{platform_folder}/{}", path_of(digest)),
                    digest.to_string(),
                );
            }
        }
    }
}
