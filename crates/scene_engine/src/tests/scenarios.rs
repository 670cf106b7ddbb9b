//! Whole-scene scenarios: documents, cameras and the frame loop together

use super::{test_registry, TestComponent};
use crate::backend::RecordingBackend;
use crate::components::{Camera, MeshRenderer, OrbitCamera};
use crate::dispatch::FrameQueue;
use crate::document::NodeDocument;
use crate::foundation::math::{utils, Vec3};
use crate::mount::PrefabLibrary;
use crate::scene::Scene;
use approx::assert_relative_eq;

const VIEWER_SCENE: &str = r#"{
    "children": {
        "camera": {
            "components": {
                "Camera": { "fov": 60 },
                "OrbitCamera": { "dist": 5 }
            }
        },
        "table": {
            "transform": { "position": [0, -1, 0] },
            "components": { "MeshRenderer": { "mesh": "table", "material": "wood" } },
            "children": {
                "teapot": {
                    "transform": { "position": [0, 1, 0], "scale": [0.5, 0.5, 0.5] },
                    "mount": "teapot"
                }
            }
        }
    }
}"#;

fn teapot_prefab() -> NodeDocument {
    NodeDocument::from_json(
        r#"{"components":{"MeshRenderer":{"mesh":"teapot","material":"porcelain"}}}"#,
    )
    .unwrap()
}

#[test]
fn test_loaded_scene_renders_through_camera() {
    let registry = test_registry();
    let mut scene = Scene::load_str(VIEWER_SCENE, &registry).unwrap();

    let mut library = PrefabLibrary::new(registry);
    library.insert("teapot", teapot_prefab());
    scene.resolve_mounts(&mut library).unwrap();

    let camera = scene.find("camera").unwrap();
    assert_eq!(scene.state().active_camera(), Some(camera));
    assert_eq!(scene.component_of::<Camera>(camera).unwrap().fov, 60.0);

    let mut backend = RecordingBackend::new();
    scene.update(&mut backend);
    scene.render(&mut backend);

    // first frame hands over the camera's pose from before any traversal
    assert_eq!(backend.view_projections.len(), 1);

    let meshes: Vec<_> = backend.draws.iter().map(|d| d.mesh.as_str()).collect();
    assert_eq!(meshes, vec!["table", "teapot"]);
    assert_relative_eq!(
        utils::translation_of(&backend.draws[1].model),
        Vec3::new(0.0, 0.0, 0.0),
        epsilon = 1e-6
    );
    assert_eq!(backend.draws[1].material.as_deref(), Some("porcelain"));

    backend.clear();
    scene.update(&mut backend);
    let (_, eye) = backend.view_projections[0];
    assert_relative_eq!(eye, Vec3::new(0.0, 0.0, 5.0), epsilon = 1e-4);
}

#[test]
fn test_view_projection_maps_origin_to_screen_center() {
    let registry = test_registry();
    let mut scene = Scene::load_str(VIEWER_SCENE, &registry).unwrap();
    let mut backend = RecordingBackend::new();
    scene.update(&mut backend);
    scene.update(&mut backend);

    let (view_projection, _) = backend.view_projections[1];
    let clip = view_projection * nalgebra::Vector4::new(0.0, 0.0, 0.0, 1.0);
    assert!(clip.w > 0.0);
    assert_relative_eq!(clip.x / clip.w, 0.0, epsilon = 1e-5);
    assert_relative_eq!(clip.y / clip.w, 0.0, epsilon = 1e-5);
}

#[test]
fn test_save_reload_preserves_scene() {
    let registry = test_registry();
    let scene = Scene::load_str(VIEWER_SCENE, &registry).unwrap();
    let document = scene.encode(scene.root()).unwrap();

    let reloaded = Scene::load(&document, &registry).unwrap();
    assert_eq!(reloaded.encode(reloaded.root()).unwrap(), document);

    let rig = reloaded.find("camera").unwrap();
    assert!(reloaded.component_of::<OrbitCamera>(rig).is_some());
    let table = reloaded.find("table").unwrap();
    assert_eq!(
        reloaded.component_of::<MeshRenderer>(table).unwrap().material.as_deref(),
        Some("wood")
    );
}

#[test]
fn test_removing_camera_stops_handoff() {
    let registry = test_registry();
    let mut scene = Scene::load_str(VIEWER_SCENE, &registry).unwrap();
    let root = scene.root();
    scene.remove_child(root, "camera").unwrap();

    assert_eq!(scene.state().active_camera(), None);
    let mut backend = RecordingBackend::new();
    scene.update(&mut backend);
    assert!(backend.view_projections.is_empty());
}

#[test]
fn test_queued_component_joins_next_traversal() {
    let registry = test_registry();
    let mut scene = Scene::load_str(VIEWER_SCENE, &registry).unwrap();
    let queue = FrameQueue::new(4);
    let sender = queue.sender();

    sender
        .call(|scene| {
            let table = scene.find("table").unwrap();
            scene.add_component(table, TestComponent::default()).unwrap();
        })
        .unwrap();

    let mut backend = RecordingBackend::new();
    scene.update(&mut backend);
    let table = scene.find("table").unwrap();
    assert!(scene.component_of::<TestComponent>(table).is_none());

    queue.drain(&mut scene, 1);
    scene.update(&mut backend);
    let component = scene.component_of::<TestComponent>(table).unwrap();
    assert_eq!(component.initialize_called, 1);
    assert_eq!(component.update_called, 1);
}
