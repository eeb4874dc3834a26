// render.rs - Draws the session: background, pipes, then the bird.
//
// Every visual is a root entity with two sets of children: an image layer
// fed by the asset store and a procedural layer built from plain sprites and
// 2D meshes. Each frame the root's `Skin` is chosen from the store and only
// the matching layer is visible. Nothing in here writes to the session.

use std::collections::HashSet;

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::assets::{AssetKey, AssetStore};
use crate::config::GameConfig;
use crate::entities::{Pipe, PipeColor};
use crate::session::Session;

pub struct RenderPlugin;

impl Plugin for RenderPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Startup,
            (fit_window, spawn_camera, spawn_background, spawn_bird),
        )
        .add_systems(
            Update,
            (
                sync_pipes,
                sync_bird,
                choose_skins,
                apply_layers,
                bind_images,
                fit_pipe_tops,
            )
                .chain(),
        );
    }
}

const BACKGROUND_Z: f32 = 0.0;
const PIPE_Z: f32 = 10.0;
const BIRD_Z: f32 = 20.0;

const SKY_TOP: [f32; 3] = [0.306, 0.753, 0.792];
const SKY_BOTTOM: [f32; 3] = [0.529, 0.808, 0.922];
const SKY_BANDS: usize = 32;

const PIPE_FILL: Color = Color::srgb(0.361, 0.722, 0.361);
const PIPE_CAP_FILL: Color = Color::srgb(0.424, 0.769, 0.424);
const PIPE_STROKE: Color = Color::srgb(0.298, 0.682, 0.298);
const PIPE_STROKE_WIDTH: f32 = 3.0;
const PIPE_CAP_HEIGHT: f32 = 20.0;
const PIPE_CAP_OVERHANG: f32 = 5.0;

/// How a visual is drawn this frame.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Skin {
    #[default]
    Procedural,
    Image,
}

/// Which store entries decide a root's skin.
#[derive(Component, Debug, Clone, Copy)]
enum SkinSource {
    Background,
    Bird,
    Pipe(PipeColor),
}

/// Child marker: visible only while the parent's skin matches.
#[derive(Component, Debug, Clone, Copy)]
struct Layer(Skin);

/// Image-layer sprite that shows whatever the store bound for this key.
#[derive(Component, Debug, Clone, Copy)]
struct ImageSlot(AssetKey);

#[derive(Component)]
struct BirdVisual;

#[derive(Component)]
struct PipeVisual {
    id: u64,
}

/// Top pipe image: drawn at its natural height, hanging from the gap edge.
#[derive(Component)]
struct PipeTopImage {
    top_height: f32,
}

/// Canvas space (origin top-left, y down) to world space (origin centre, y up).
pub fn to_world(config: &GameConfig, x: f32, y: f32) -> Vec2 {
    Vec2::new(
        x - config.canvas_width / 2.0,
        config.canvas_height / 2.0 - y,
    )
}

/// World-space centre of a canvas rectangle.
pub fn rect_center(config: &GameConfig, x: f32, y: f32, w: f32, h: f32) -> Vec2 {
    to_world(config, x + w / 2.0, y + h / 2.0)
}

/// Colour of sky band `index` out of `SKY_BANDS`, top to bottom.
fn sky_band_color(index: usize) -> Color {
    let t = index as f32 / (SKY_BANDS - 1) as f32;
    let lerp = |i: usize| SKY_TOP[i] + (SKY_BOTTOM[i] - SKY_TOP[i]) * t;
    Color::srgb(lerp(0), lerp(1), lerp(2))
}

/// Sizes the window to the playfield so one canvas unit is one logical pixel.
fn fit_window(config: Res<GameConfig>, mut windows: Query<&mut Window, With<PrimaryWindow>>) {
    for mut window in &mut windows {
        window
            .resolution
            .set(config.canvas_width, config.canvas_height);
    }
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

fn spawn_background(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let (w, h) = (config.canvas_width, config.canvas_height);
    let root = commands
        .spawn((
            Skin::default(),
            SkinSource::Background,
            Transform::from_xyz(0.0, 0.0, BACKGROUND_Z),
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        Layer(Skin::Image),
        Visibility::Hidden,
        ImageSlot(AssetKey::Background),
        Sprite {
            custom_size: Some(Vec2::new(w, h)),
            ..default()
        },
        Transform::default(),
        ChildOf(root),
    ));

    // Sky gradient, drawn as thin horizontal bands.
    let band_height = h / SKY_BANDS as f32;
    for i in 0..SKY_BANDS {
        let y = i as f32 * band_height;
        commands.spawn((
            Layer(Skin::Procedural),
            Sprite::from_color(sky_band_color(i), Vec2::new(w, band_height + 1.0)),
            Transform::from_translation(rect_center(&config, 0.0, y, w, band_height).extend(0.0)),
            ChildOf(root),
        ));
    }

    let cloud = materials.add(Color::srgba(1.0, 1.0, 1.0, 0.3));
    let puffs = [
        (100.0, 80.0, 30.0),
        (130.0, 70.0, 40.0),
        (160.0, 80.0, 30.0),
        (280.0, 120.0, 35.0),
        (310.0, 110.0, 45.0),
        (340.0, 120.0, 35.0),
    ];
    for (x, y, radius) in puffs {
        commands.spawn((
            Layer(Skin::Procedural),
            Mesh2d(meshes.add(Circle::new(radius))),
            MeshMaterial2d(cloud.clone()),
            Transform::from_translation(to_world(&config, x, y).extend(0.1)),
            ChildOf(root),
        ));
    }

    let ground = Color::srgb_u8(0xDE, 0xB8, 0x87);
    let grass = Color::srgb_u8(0x90, 0xEE, 0x90);
    commands.spawn((
        Layer(Skin::Procedural),
        Sprite::from_color(ground, Vec2::new(w, 60.0)),
        Transform::from_translation(rect_center(&config, 0.0, h - 60.0, w, 60.0).extend(0.2)),
        ChildOf(root),
    ));
    commands.spawn((
        Layer(Skin::Procedural),
        Sprite::from_color(grass, Vec2::new(w, 10.0)),
        Transform::from_translation(rect_center(&config, 0.0, h - 70.0, w, 10.0).extend(0.3)),
        ChildOf(root),
    ));
}

fn spawn_bird(
    mut commands: Commands,
    config: Res<GameConfig>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
) {
    let size = config.bird_size;
    let radius = size / 2.0;
    let start = to_world(&config, config.bird_x, config.canvas_height / 2.0);
    let root = commands
        .spawn((
            BirdVisual,
            Skin::default(),
            SkinSource::Bird,
            Transform::from_translation(start.extend(BIRD_Z)),
            Visibility::default(),
        ))
        .id();

    commands.spawn((
        Layer(Skin::Image),
        Visibility::Hidden,
        ImageSlot(AssetKey::Bird),
        Sprite {
            custom_size: Some(Vec2::splat(size)),
            ..default()
        },
        Transform::default(),
        ChildOf(root),
    ));

    // Procedural bird, in local space with y up: the eye sits up and forward,
    // the beak pokes out of the right side.
    let shapes: [(Mesh, Color, Vec3); 4] = [
        (
            Circle::new(radius + 1.0).into(),
            Color::srgb_u8(0xFF, 0xA5, 0x00),
            Vec3::new(0.0, 0.0, 0.0),
        ),
        (
            Circle::new(radius - 1.0).into(),
            Color::srgb_u8(0xFF, 0xD7, 0x00),
            Vec3::new(0.0, 0.0, 0.1),
        ),
        (Circle::new(6.0).into(), Color::WHITE, Vec3::new(5.0, 5.0, 0.2)),
        (Circle::new(3.0).into(), Color::BLACK, Vec3::new(7.0, 5.0, 0.3)),
    ];
    for (mesh, color, offset) in shapes {
        commands.spawn((
            Layer(Skin::Procedural),
            Mesh2d(meshes.add(mesh)),
            MeshMaterial2d(materials.add(color)),
            Transform::from_translation(offset),
            ChildOf(root),
        ));
    }

    let beak = Triangle2d::new(
        Vec2::new(radius - 5.0, 0.0),
        Vec2::new(radius + 5.0, -2.0),
        Vec2::new(radius - 5.0, -4.0),
    );
    commands.spawn((
        Layer(Skin::Procedural),
        Mesh2d(meshes.add(beak)),
        MeshMaterial2d(materials.add(Color::srgb_u8(0xFF, 0x63, 0x47))),
        Transform::from_xyz(0.0, 0.0, 0.4),
        ChildOf(root),
    ));
}

/// Filled rectangle with a stroke, as two stacked sprites. Coordinates are
/// canvas-space, relative to the pipe's left edge.
fn spawn_outlined_rect(
    commands: &mut Commands,
    config: &GameConfig,
    parent: Entity,
    rect: (f32, f32, f32, f32),
    fill: Color,
    z: f32,
) {
    let (x, y, w, h) = rect;
    let center = rect_center(config, x, y, w, h) + Vec2::new(config.canvas_width / 2.0, 0.0);
    commands.spawn((
        Layer(Skin::Procedural),
        Sprite::from_color(
            PIPE_STROKE,
            Vec2::new(w + PIPE_STROKE_WIDTH, h + PIPE_STROKE_WIDTH),
        ),
        Transform::from_translation(center.extend(z)),
        ChildOf(parent),
    ));
    commands.spawn((
        Layer(Skin::Procedural),
        Sprite::from_color(
            fill,
            Vec2::new(
                (w - PIPE_STROKE_WIDTH).max(0.0),
                (h - PIPE_STROKE_WIDTH).max(0.0),
            ),
        ),
        Transform::from_translation(center.extend(z + 0.05)),
        ChildOf(parent),
    ));
}

fn spawn_pipe_visual(commands: &mut Commands, config: &GameConfig, pipe: &Pipe) {
    let w = config.pipe_width;
    let h = config.canvas_height;
    let bottom_height = h - pipe.bottom_y;
    let root = commands
        .spawn((
            PipeVisual { id: pipe.id },
            Skin::default(),
            SkinSource::Pipe(pipe.color),
            Transform::from_xyz(pipe.x - config.canvas_width / 2.0, 0.0, PIPE_Z),
            Visibility::default(),
        ))
        .id();

    let cap_w = w + PIPE_CAP_OVERHANG * 2.0;
    let body_and_caps = [
        ((0.0, 0.0, w, pipe.top_height), PIPE_FILL, 0.0),
        (
            (-PIPE_CAP_OVERHANG, pipe.top_height - PIPE_CAP_HEIGHT, cap_w, PIPE_CAP_HEIGHT),
            PIPE_CAP_FILL,
            0.2,
        ),
        ((0.0, pipe.bottom_y, w, bottom_height), PIPE_FILL, 0.0),
        (
            (-PIPE_CAP_OVERHANG, pipe.bottom_y, cap_w, PIPE_CAP_HEIGHT),
            PIPE_CAP_FILL,
            0.2,
        ),
    ];
    for (rect, fill, z) in body_and_caps {
        spawn_outlined_rect(commands, config, root, rect, fill, z);
    }

    let local = |y: f32, height: f32| {
        rect_center(config, 0.0, y, w, height) + Vec2::new(config.canvas_width / 2.0, 0.0)
    };
    commands.spawn((
        Layer(Skin::Image),
        Visibility::Hidden,
        ImageSlot(AssetKey::PipeTop(pipe.color)),
        PipeTopImage {
            top_height: pipe.top_height,
        },
        Sprite {
            custom_size: Some(Vec2::new(w, pipe.top_height)),
            ..default()
        },
        Transform::from_translation(local(0.0, pipe.top_height).extend(0.5)),
        ChildOf(root),
    ));
    commands.spawn((
        Layer(Skin::Image),
        Visibility::Hidden,
        ImageSlot(AssetKey::PipeBottom(pipe.color)),
        Sprite {
            custom_size: Some(Vec2::new(w, bottom_height)),
            ..default()
        },
        Transform::from_translation(local(pipe.bottom_y, bottom_height).extend(0.5)),
        ChildOf(root),
    ));
}

/// Keeps one visual per live pipe: spawns new ones, moves survivors, and
/// despawns visuals whose pipe has left the session.
fn sync_pipes(
    mut commands: Commands,
    session: Res<Session>,
    mut visuals: Query<(Entity, &PipeVisual, &mut Transform)>,
) {
    let config = &session.config;
    let mut drawn = HashSet::new();

    for (entity, visual, mut transform) in &mut visuals {
        match session.pipes.iter().find(|p| p.id == visual.id) {
            Some(pipe) => {
                transform.translation.x = pipe.x - config.canvas_width / 2.0;
                drawn.insert(visual.id);
            }
            None => commands.entity(entity).despawn(),
        }
    }

    for pipe in session.pipes.iter().filter(|p| !drawn.contains(&p.id)) {
        spawn_pipe_visual(&mut commands, config, pipe);
    }
}

fn sync_bird(session: Res<Session>, mut birds: Query<&mut Transform, With<BirdVisual>>) {
    let bird = &session.bird;
    let position = to_world(&session.config, bird.x, bird.y);
    for mut transform in &mut birds {
        transform.translation.x = position.x;
        transform.translation.y = position.y;
        // Canvas rotation is clockwise for positive angles; world z-rotation
        // is counter-clockwise.
        transform.rotation = Quat::from_rotation_z(-bird.rotation.to_radians());
    }
}

fn choose_skins(store: Res<AssetStore>, mut roots: Query<(&SkinSource, &mut Skin)>) {
    for (source, mut skin) in &mut roots {
        let has_image = match source {
            SkinSource::Background => store.image(AssetKey::Background).is_some(),
            SkinSource::Bird => store.image(AssetKey::Bird).is_some(),
            SkinSource::Pipe(color) => store.pipe_images(*color).is_some(),
        };
        skin.set_if_neq(if has_image { Skin::Image } else { Skin::Procedural });
    }
}

fn apply_layers(skins: Query<&Skin>, mut layers: Query<(&Layer, &ChildOf, &mut Visibility)>) {
    for (layer, child_of, mut visibility) in &mut layers {
        let Ok(skin) = skins.get(child_of.parent()) else {
            continue;
        };
        let wanted = if layer.0 == *skin {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
        visibility.set_if_neq(wanted);
    }
}

fn bind_images(store: Res<AssetStore>, mut slots: Query<(&ImageSlot, &mut Sprite)>) {
    if !store.is_ready() {
        return;
    }
    for (slot, mut sprite) in &mut slots {
        if let Some(handle) = store.image(slot.0) {
            if sprite.image != *handle {
                sprite.image = handle.clone();
            }
        }
    }
}

/// Top pipe images keep their natural height and hang from the gap edge, so
/// a tall image gets clipped by the top of the screen rather than squashed.
fn fit_pipe_tops(
    session: Res<Session>,
    images: Res<Assets<Image>>,
    mut tops: Query<(&PipeTopImage, &mut Sprite, &mut Transform)>,
) {
    let config = &session.config;
    for (top, mut sprite, mut transform) in &mut tops {
        let Some(image) = images.get(&sprite.image) else {
            continue;
        };
        let height = image.height() as f32;
        let size = Vec2::new(config.pipe_width, height);
        if sprite.custom_size != Some(size) {
            sprite.custom_size = Some(size);
            let y = rect_center(config, 0.0, top.top_height - height, config.pipe_width, height).y;
            transform.translation.y = y;
        }
    }
}
