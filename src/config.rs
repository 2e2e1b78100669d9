use std::{fs::File, io::BufReader, path::Path};

use serde_json::from_reader;

use crate::constants::Config;
use crate::error::PanelError;

/// Read and validate the panel configuration at `path`
pub fn load_config(path: &Path) -> Result<Config, PanelError> {
    let file = File::open(path).map_err(|e| PanelError::Config {
        message: format!("cannot open {}: {}", path.display(), e),
    })?;

    let config: Config = from_reader(BufReader::new(file))?;

    if config.port.trim().is_empty() {
        return Err(PanelError::Config {
            message: "port must not be empty".to_string(),
        });
    }

    Ok(config)
}
