//! End-to-end scenarios across state, loader and scene composition

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::camera::Camera;
use crate::catalog::CATALOG;
use crate::config::ViewerConfig;
use crate::controls::ShaderControls;
use crate::displacement::displacement_stats;
use crate::error::ViewerError;
use crate::geometry::PlaneGeometry;
use crate::loading::{self, LoadState, TextureLoader};
use crate::scene::{self, FillMode, FrameDescription, LoadingOverlay};
use crate::state::{ViewerEvent, ViewerState};
use crate::{Command, parse_args};

/// wgpu's default `max_texture_dimension_2d`
const MAX_TEXTURE: u32 = 8192;

/// Fresh directory under the system temp dir
fn fixture_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("phantom_viewer_{}_{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a small color image and a depth ramp for catalog entry `index`.
/// Both are PNG; decoding goes by content so the `.webp` name is fine.
fn write_pair(root: &Path, index: usize) {
    let entry = &CATALOG[index];
    let color = image::RgbaImage::from_fn(8, 8, |x, y| image::Rgba([(x * 32) as u8, (y * 32) as u8, 128, 255]));
    color
        .save_with_format(entry.image_file(root), image::ImageFormat::Png)
        .unwrap();
    let depth = image::RgbaImage::from_fn(8, 8, |x, _| {
        let v = (x * 255 / 7) as u8;
        image::Rgba([v, v, v, 255])
    });
    depth
        .save_with_format(entry.depth_file(root), image::ImageFormat::Png)
        .unwrap();
}

/// Poll until entry `index` leaves the Loading state, recording every
/// percentage seen on the way.
fn wait_for(loader: &mut TextureLoader, index: usize) -> Vec<u8> {
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut seen = vec![loader.state(index).percent()];
    loop {
        loader.poll();
        let state = loader.state(index);
        seen.push(state.percent());
        if !matches!(state, LoadState::Loading { .. }) {
            return seen;
        }
        assert!(Instant::now() < deadline, "loader did not finish in time");
        std::thread::sleep(Duration::from_millis(5));
    }
}

fn compose_for(state: &ViewerState, controls: &ShaderControls, loader: &TextureLoader) -> FrameDescription {
    let config = ViewerConfig::default();
    scene::compose(
        state,
        controls,
        loader.state(state.selected_index()),
        &Camera::default(),
        config.clear_color_linear(),
    )
}

#[test]
fn test_initial_state_shows_alien() {
    let root = fixture_dir("initial");
    write_pair(&root, 0);

    let state = ViewerState::default();
    let controls = ShaderControls::default();
    assert_eq!(state.selected_index(), 0);
    assert_eq!(state.hovered_index(), None);
    assert_eq!(CATALOG[state.selected_index()].name, "Alien");
    assert_eq!(CATALOG[0].image_path, "/alien.webp");
    assert_eq!(CATALOG[0].depth_path, "/alien-depth.png");

    let mut loader = TextureLoader::new(&root, MAX_TEXTURE);
    assert!(loader.request(0));
    wait_for(&mut loader, 0);

    let frame = compose_for(&state, &controls, &loader);
    let mesh = frame.mesh.expect("alien should be drawable");
    assert_eq!(mesh.entry_index, 0);
    assert_eq!(mesh.displacement, 2.5);
    assert_eq!(mesh.fill, FillMode::Solid);
    assert!(frame.post.is_some());
    assert!(frame.overlay.is_none());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_select_relic_loads_then_draws() {
    let root = fixture_dir("relic");
    write_pair(&root, 2);

    let mut loader = TextureLoader::new(&root, MAX_TEXTURE);
    let controls = ShaderControls::default();
    let state = ViewerState::default().reduce(ViewerEvent::Select(2));
    assert_eq!(state.selected_index(), 2);
    assert_eq!(CATALOG[2].image_file(&root), root.join("relic.webp"));
    assert_eq!(CATALOG[2].depth_file(&root), root.join("relic-depth.png"));

    assert!(loader.request(state.selected_index()));
    // second request while loading is a no-op
    assert!(!loader.request(2));

    // suspended until the pair resolves
    let frame = compose_for(&state, &controls, &loader);
    assert!(frame.mesh.is_none());
    assert!(frame.post.is_none());
    assert!(matches!(frame.overlay, Some(LoadingOverlay::Progress { .. })));

    let seen = wait_for(&mut loader, 2);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {:?}", seen);
    assert_eq!(seen.last(), Some(&100));

    let frame = compose_for(&state, &controls, &loader);
    let mesh = frame.mesh.expect("relic should be drawable");
    assert_eq!(mesh.entry_index, 2);
    assert_eq!(mesh.textures.color.width, 8);
    assert!(frame.overlay.is_none());

    // the fixture ramp runs black to white, so the plane rises from flat to
    // the full displacement
    let plane = PlaneGeometry::new(5.0, 5.0, 16, 16);
    let stats = displacement_stats(&plane, &mesh.textures.depth, mesh.displacement);
    assert_eq!(stats.z_min, 0.0);
    assert!((stats.z_max - 2.5).abs() < 1e-5, "z_max = {}", stats.z_max);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_pending_entry_never_draws_another_pair() {
    let root = fixture_dir("stale");
    write_pair(&root, 0);

    let mut loader = TextureLoader::new(&root, MAX_TEXTURE);
    loader.request(0);
    wait_for(&mut loader, 0);

    // entry 3 has no files: selecting it must not fall back to entry 0
    let state = ViewerState::default().reduce(ViewerEvent::Select(3));
    loader.request(3);
    wait_for(&mut loader, 3);

    let frame = compose_for(&state, &ShaderControls::default(), &loader);
    assert!(frame.mesh.is_none());
    match frame.overlay {
        Some(overlay @ LoadingOverlay::Failed { .. }) => {
            assert!(overlay.text().starts_with("LOAD_FAILED // "));
        }
        other => panic!("expected failure overlay, got {:?}", other),
    }

    // the earlier pair stays cached
    assert!(loader.state(0).is_ready());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_failed_entry_restarts_on_request() {
    let root = fixture_dir("retry");
    let mut loader = TextureLoader::new(&root, MAX_TEXTURE);

    loader.request(4);
    wait_for(&mut loader, 4);
    assert!(matches!(loader.state(4), LoadState::Failed(_)));

    write_pair(&root, 4);
    assert!(loader.request(4));
    wait_for(&mut loader, 4);
    assert!(loader.state(4).is_ready());
    assert!(!loader.request(4));

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_oversized_image_fails_instead_of_uploading() {
    let root = fixture_dir("oversized");
    write_pair(&root, 1);

    // 8x8 fixtures against a 4 texel device limit
    let mut loader = TextureLoader::new(&root, 4);
    loader.request(1);
    wait_for(&mut loader, 1);

    match loader.state(1) {
        LoadState::Failed(reason) => {
            assert!(reason.contains("exceeds max texture size 4"), "{}", reason);
        }
        other => panic!("expected failure, got {:?}", other),
    }

    let state = ViewerState::default().reduce(ViewerEvent::Select(1));
    let frame = compose_for(&state, &ShaderControls::default(), &loader);
    assert!(frame.mesh.is_none());
    assert!(matches!(frame.overlay, Some(LoadingOverlay::Failed { .. })));

    // exactly at the limit is fine
    let mut loader = TextureLoader::new(&root, 8);
    loader.request(1);
    wait_for(&mut loader, 1);
    assert!(loader.state(1).is_ready());

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_load_pair_blocking() {
    let root = fixture_dir("blocking");
    write_pair(&root, 6);

    let pair = loading::load_pair_blocking(&root, 6).unwrap();
    assert_eq!((pair.color.width, pair.color.height), (8, 8));
    assert_eq!((pair.depth.width, pair.depth.height), (8, 8));
    assert_eq!(pair.depth.red(0, 0), 0);
    assert_eq!(pair.depth.red(7, 0), 255);

    match loading::load_pair_blocking(&root, 7) {
        Err(ViewerError::AssetIo { path, .. }) => {
            assert_eq!(path, CATALOG[7].image_file(&root));
        }
        Err(other) => panic!("expected an io error, got {}", other),
        Ok(_) => panic!("entry 7 has no files"),
    }

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_wireframe_keeps_displacement() {
    let root = fixture_dir("wireframe");
    write_pair(&root, 0);
    let mut loader = TextureLoader::new(&root, MAX_TEXTURE);
    loader.request(0);
    wait_for(&mut loader, 0);

    let state = ViewerState::default();
    let mut controls = ShaderControls::default();
    let solid = compose_for(&state, &controls, &loader).mesh.unwrap();

    controls.wireframe = true;
    let wire = compose_for(&state, &controls, &loader).mesh.unwrap();

    assert_eq!(wire.fill, FillMode::Wireframe);
    assert_eq!(wire.displacement, solid.displacement);
    assert_eq!(wire.entry_index, solid.entry_index);

    let _ = std::fs::remove_dir_all(root);
}

#[test]
fn test_hover_book_without_click() {
    let state = ViewerState::default().reduce(ViewerEvent::PointerEnter(5));
    assert_eq!(state.selected_index(), 0);
    assert_eq!(state.hovered_index(), Some(5));

    let visual = state.thumbnail(5);
    assert!(visual.label_visible());
    assert!(!visual.active);
    assert_eq!(visual.scale(), 1.2);
    assert_eq!(CATALOG[5].name, "Book");

    // untouched thumbnails stay at rest
    assert_eq!(state.thumbnail(6).scale(), 1.0);
    assert!(!state.thumbnail(6).label_visible());
}

#[test]
fn test_click_keeps_hover() {
    for i in 0..CATALOG.len() {
        let hovered = ViewerState::default().reduce(ViewerEvent::PointerEnter(i));
        let clicked = hovered.reduce(ViewerEvent::Select(i));
        assert_eq!(clicked.selected_index(), i);
        assert_eq!(clicked.hovered_index(), Some(i));
    }
}

#[test]
fn test_enter_then_leave_clears_hover() {
    let state = ViewerState::default()
        .reduce(ViewerEvent::PointerEnter(7))
        .reduce(ViewerEvent::PointerLeave(7));
    assert_eq!(state.hovered_index(), None);
}

#[test]
fn test_exactly_one_active_thumbnail() {
    let mut state = ViewerState::default();
    for event in [
        ViewerEvent::Select(3),
        ViewerEvent::PointerEnter(1),
        ViewerEvent::Select(8),
        ViewerEvent::PointerLeave(1),
        ViewerEvent::Select(0),
    ] {
        state = state.reduce(event);
        let active: Vec<usize> = (0..CATALOG.len()).filter(|&i| state.thumbnail(i).active).collect();
        assert_eq!(active, vec![state.selected_index()]);
    }
}

#[test]
fn test_displacement_bounds() {
    let mut controls = ShaderControls::default();
    for (input, expected) in [(-3.0, 0.0), (0.0, 0.0), (1.26, 1.3), (5.0, 5.0), (12.0, 5.0)] {
        controls.set_displacement(input);
        assert!((controls.displacement() - expected).abs() < 1e-5, "{} -> {}", input, controls.displacement());
    }
}

#[test]
fn test_parse_args() {
    let args = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();

    let opts = parse_args(&[]).unwrap();
    assert_eq!(opts.command, Command::Run);
    assert_eq!(opts.assets, None);

    let opts = parse_args(&args(&["--assets", "/tmp/art", "--select", "4"])).unwrap();
    assert_eq!(opts.command, Command::Run);
    assert_eq!(opts.assets, Some(PathBuf::from("/tmp/art")));
    assert_eq!(opts.select, Some(4));

    assert_eq!(parse_args(&args(&["--list"])).unwrap().command, Command::List);
    assert_eq!(parse_args(&args(&["--inspect", "2"])).unwrap().command, Command::Inspect(2));
    assert_eq!(parse_args(&args(&["--help"])).unwrap().command, Command::Help);

    assert!(parse_args(&args(&["--select", "9"])).is_err());
    assert!(parse_args(&args(&["--select", "two"])).is_err());
    assert!(parse_args(&args(&["--assets"])).is_err());
    assert!(parse_args(&args(&["--bogus"])).is_err());
}
