use std::path::PathBuf;

#[test]
fn bundled_missions_load_and_validate() {
    let crate_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let root = crate_dir
        .parent()
        .and_then(|p| p.parent())
        .expect("workspace root");

    for rel in ["missions/fuel_cell_demo.yaml"] {
        let path = root.join(rel);
        let mission = ms_config::load_yaml(&path)
            .unwrap_or_else(|e| panic!("Failed to load {}: {}", path.display(), e));
        assert_eq!(mission.segments.len(), 2);
        assert!(mission.segments[1].profile.altitude_m.is_none());
    }
}
