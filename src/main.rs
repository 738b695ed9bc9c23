use scene_walk::{ViewerConfig, default_manifest};

/// Usage: `scene-walk [ASSET_ROOT]`
fn main() -> anyhow::Result<()> {
    let mut config = ViewerConfig::default();
    if let Some(root) = std::env::args_os().nth(1) {
        config = config.with_asset_root(root);
    }
    scene_walk::run(config, default_manifest())
}
