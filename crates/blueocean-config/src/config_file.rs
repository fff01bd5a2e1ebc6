use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = ".blueocean-dashboard.toml";

/// Places searched for the config file, in priority order
pub fn config_candidates() -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
    candidates.extend(dirs::home_dir().map(|home| home.join(CONFIG_FILE)));
    candidates
}

/// First readable candidate together with its content
pub fn read_first<P: AsRef<Path>>(candidates: &[P]) -> Option<(PathBuf, String)> {
    candidates.iter().find_map(|path| {
        let path = path.as_ref();
        std::fs::read_to_string(path)
            .ok()
            .map(|content| (path.to_path_buf(), content))
    })
}
