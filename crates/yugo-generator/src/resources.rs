//! Files compiled into the binary.
//!
//! [`INTERNAL`] is installed into every build output under `_int/`, after
//! user content, so live reload keeps working whatever the site contains.
//! [`EXAMPLE_SITE`] is the starter site written by `yugo init`.

use std::{fs, path::Path};

use tracing::debug;

use crate::assets::{AssetError, Result};

/// Path of the live-reload script inside the output directory.
pub const LIVE_RELOAD_SCRIPT_PATH: &str = "_int/live-reload.js";

/// Tag injected into pages when live reload is on.
pub const LIVE_RELOAD_SCRIPT_TAG: &str = "<script src=\"/_int/live-reload.js\"></script>";

/// An embedded file and its path relative to the install directory.
#[derive(Debug, Clone, Copy)]
pub struct Resource {
    pub path: &'static str,
    pub contents: &'static str,
}

/// Resources copied into every build output.
pub const INTERNAL: &[Resource] = &[Resource {
    path: LIVE_RELOAD_SCRIPT_PATH,
    contents: include_str!("../resources/root/_int/live-reload.js"),
}];

/// The starter site.
pub const EXAMPLE_SITE: &[Resource] = &[
    Resource {
        path: "yugo.toml",
        contents: include_str!("../resources/example/yugo.toml"),
    },
    Resource {
        path: "templates/base.html",
        contents: include_str!("../resources/example/templates/base.html"),
    },
    Resource {
        path: "content/index.md",
        contents: include_str!("../resources/example/content/index.md"),
    },
    Resource {
        path: "static/style.css",
        contents: include_str!("../resources/example/static/style.css"),
    },
];

/// Write `resources` under `dst`, overwriting existing files.
pub fn install(resources: &[Resource], dst: &Path) -> Result<usize> {
    for resource in resources {
        let out_path = dst.join(resource.path);
        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|source| AssetError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&out_path, resource.contents).map_err(|source| AssetError::Io {
            path: out_path.clone(),
            source,
        })?;
        debug!(path = %out_path.display(), "installed resource");
    }
    Ok(resources.len())
}
