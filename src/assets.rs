// assets.rs - Optional decorative images with per-asset fallback.
//
// Every image is optional. Each logical key has an ordered list of candidate
// files; we try them one at a time and keep the first that loads. When every
// candidate fails the key stays unbound and the renderer draws that piece
// procedurally instead. Nothing here is ever an error the player sees.

use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::entities::PipeColor;

pub struct AssetStorePlugin;

impl Plugin for AssetStorePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AssetStore>()
            .add_systems(Startup, start_loading)
            .add_systems(PreUpdate, poll_asset_loads);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKey {
    Bird,
    Background,
    PipeTop(PipeColor),
    PipeBottom(PipeColor),
}

impl AssetKey {
    pub fn all() -> Vec<AssetKey> {
        let mut keys = vec![AssetKey::Bird, AssetKey::Background];
        for color in PipeColor::ALL {
            keys.push(AssetKey::PipeTop(color));
            keys.push(AssetKey::PipeBottom(color));
        }
        keys
    }

    /// Files to try, best first. Paths are relative to the `assets/` folder.
    pub fn candidates(&self) -> Vec<String> {
        match self {
            AssetKey::Bird => vec!["images/bird.png".into(), "images/bird.jpg".into()],
            AssetKey::Background => vec![
                "images/background.png".into(),
                "images/background.jpg".into(),
                "images/background.jpeg".into(),
            ],
            AssetKey::PipeTop(color) => vec![format!("images/pipe-top-{}.png", color.name())],
            AssetKey::PipeBottom(color) => {
                vec![format!("images/pipe-bottom-{}.png", color.name())]
            }
        }
    }
}

/// Resolution progress for one key.
///
/// Generic over the handle type so the fallback walk can be exercised
/// without an asset server.
#[derive(Debug, Clone)]
pub struct AssetSlot<H> {
    candidates: Vec<String>,
    cursor: usize,
    in_flight: Option<H>,
    bound: Option<H>,
}

impl<H: Clone> AssetSlot<H> {
    pub fn new(candidates: Vec<String>) -> Self {
        AssetSlot {
            candidates,
            cursor: 0,
            in_flight: None,
            bound: None,
        }
    }

    /// The candidate being tried, or `None` once the slot has settled.
    pub fn current_path(&self) -> Option<&str> {
        if self.bound.is_some() {
            return None;
        }
        self.candidates.get(self.cursor).map(String::as_str)
    }

    pub fn begin(&mut self, handle: H) {
        self.in_flight = Some(handle);
    }

    pub fn in_flight(&self) -> Option<&H> {
        self.in_flight.as_ref()
    }

    /// The in-flight candidate loaded; it wins.
    pub fn bind(&mut self) {
        self.bound = self.in_flight.take();
    }

    /// The in-flight candidate failed. Returns the next path to try, if any.
    pub fn fail(&mut self) -> Option<&str> {
        self.in_flight = None;
        self.cursor += 1;
        self.current_path()
    }

    /// Bound, or out of candidates.
    pub fn is_settled(&self) -> bool {
        self.bound.is_some() || (self.in_flight.is_none() && self.cursor >= self.candidates.len())
    }

    pub fn image(&self) -> Option<&H> {
        self.bound.as_ref()
    }
}

/// Every decorative image the game knows about, plus a readiness flag.
///
/// Images are only handed out once *every* key has settled, so the scene
/// switches from procedural to image-backed drawing in one step rather than
/// piece by piece as files trickle in.
#[derive(Resource, Default)]
pub struct AssetStore {
    slots: HashMap<AssetKey, AssetSlot<Handle<Image>>>,
    ready: bool,
}

impl AssetStore {
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn image(&self, key: AssetKey) -> Option<&Handle<Image>> {
        if !self.ready {
            return None;
        }
        self.slots.get(&key).and_then(AssetSlot::image)
    }

    /// Top and bottom images for a colour, only if both are available.
    pub fn pipe_images(&self, color: PipeColor) -> Option<(&Handle<Image>, &Handle<Image>)> {
        let top = self.image(AssetKey::PipeTop(color))?;
        let bottom = self.image(AssetKey::PipeBottom(color))?;
        Some((top, bottom))
    }

    fn refresh_ready(&mut self) -> bool {
        let was_ready = self.ready;
        self.ready = self.slots.values().all(AssetSlot::is_settled);
        self.ready && !was_ready
    }
}

fn start_loading(mut store: ResMut<AssetStore>, asset_server: Res<AssetServer>) {
    for key in AssetKey::all() {
        let mut slot = AssetSlot::new(key.candidates());
        if let Some(path) = slot.current_path() {
            let handle = asset_server.load(path.to_owned());
            slot.begin(handle);
        }
        store.slots.insert(key, slot);
    }
}

/// Checks every in-flight load once per frame and falls through to the next
/// candidate on failure.
fn poll_asset_loads(mut store: ResMut<AssetStore>, asset_server: Res<AssetServer>) {
    if store.ready {
        return;
    }

    for (key, slot) in store.slots.iter_mut() {
        let Some(handle) = slot.in_flight() else {
            continue;
        };
        match asset_server.get_load_state(handle.id()) {
            Some(LoadState::Loaded) => {
                debug!("{:?} bound to {:?}", key, slot.current_path());
                slot.bind();
            }
            Some(LoadState::Failed(_)) => {
                debug!("{:?}: {:?} failed to load", key, slot.current_path());
                match slot.fail().map(str::to_owned) {
                    Some(next) => slot.begin(asset_server.load(next)),
                    None => info!("No image for {:?}, drawing it procedurally", key),
                }
            }
            _ => {}
        }
    }

    if store.refresh_ready() {
        info!("Asset store ready");
    }
}
