// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! WMS `GetMap` URL construction.
//!
//! A leaf's `source_ref` is a server-side layer name; this module turns it
//! into a fetchable `GetMap` request. URL building is pure string work, kept
//! separate from the DOM so it is unit-testable off-browser.

use alloc::format;
use alloc::string::String;

use kurbo::Rect;

/// Default map-server mount point, relative to the page origin.
pub const DEFAULT_BASE_PATH: &str = "/geoserver/wms";

/// Default server-side workspace holding the flood layers.
pub const DEFAULT_WORKSPACE: &str = "flood";

/// WMS protocol version token.
pub const DEFAULT_VERSION: &str = "1.3.0";

/// Output format for layer imagery.
pub const DEFAULT_FORMAT: &str = "image/png";

/// How to reach the map server.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WmsConfig {
    /// Request path prefix, e.g. `/geoserver/wms`.
    pub base_path: String,
    /// Workspace prefix applied to every layer name.
    pub workspace: String,
    /// Protocol version token.
    pub version: String,
    /// Output format MIME type.
    pub format: String,
    /// Whether to request a transparent background.
    pub transparent: bool,
}

impl Default for WmsConfig {
    fn default() -> Self {
        Self {
            base_path: String::from(DEFAULT_BASE_PATH),
            workspace: String::from(DEFAULT_WORKSPACE),
            version: String::from(DEFAULT_VERSION),
            format: String::from(DEFAULT_FORMAT),
            transparent: true,
        }
    }
}

/// Builds a `GetMap` URL for one layer over the given bounding box.
///
/// `bbox` is in `crs` coordinates with axis order `minx,miny,maxx,maxy`.
/// The layer name is prefixed with the configured workspace.
#[must_use]
pub fn getmap_url(
    config: &WmsConfig,
    layer_name: &str,
    bbox: Rect,
    width: u32,
    height: u32,
    crs: &str,
) -> String {
    format!(
        "{base}?SERVICE=WMS&VERSION={version}&REQUEST=GetMap\
         &LAYERS={workspace}%3A{layer}&STYLES=\
         &CRS={crs}&BBOX={x0},{y0},{x1},{y1}\
         &WIDTH={width}&HEIGHT={height}\
         &FORMAT={format}&TRANSPARENT={transparent}",
        base = config.base_path,
        version = config.version,
        workspace = config.workspace,
        layer = layer_name,
        x0 = bbox.x0,
        y0 = bbox.y0,
        x1 = bbox.x1,
        y1 = bbox.y1,
        format = config.format,
        transparent = config.transparent,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_carries_all_query_parts() {
        let config = WmsConfig::default();
        let url = getmap_url(
            &config,
            "t3_50yrs_present_breaches_maxdepth",
            Rect::new(120_000.0, 480_000.0, 130_000.0, 490_000.0),
            512,
            512,
            "EPSG:28992",
        );
        assert!(url.starts_with("/geoserver/wms?SERVICE=WMS&VERSION=1.3.0"));
        assert!(url.contains("LAYERS=flood%3At3_50yrs_present_breaches_maxdepth"));
        assert!(url.contains("BBOX=120000,480000,130000,490000"));
        assert!(url.contains("WIDTH=512&HEIGHT=512"));
        assert!(url.contains("FORMAT=image/png&TRANSPARENT=true"));
    }

    #[test]
    fn custom_config_overrides_defaults() {
        let config = WmsConfig {
            base_path: String::from("/maps"),
            workspace: String::from("ws"),
            version: String::from("1.1.1"),
            format: String::from("image/jpeg"),
            transparent: false,
        };
        let url = getmap_url(&config, "bg_area", Rect::new(0.0, 0.0, 1.0, 1.0), 10, 10, "EPSG:4326");
        assert!(url.starts_with("/maps?"));
        assert!(url.contains("VERSION=1.1.1"));
        assert!(url.contains("LAYERS=ws%3Abg_area"));
        assert!(url.contains("TRANSPARENT=false"));
    }
}
