// Copyright 2026 the Floodmap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM element management.
//!
//! [`DomRenderer`] materializes visible layers as absolutely positioned
//! `<img>` children of a container element, one per leaf id, with `src`
//! pointing at a WMS `GetMap` request and `z-index` carrying the stacking
//! band. A failed image fetch hides that element and nothing else; broken
//! imagery degrades visually without touching viewer state.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;

use kurbo::Rect;
use wasm_bindgen::JsCast as _;
use wasm_bindgen::closure::Closure;
use web_sys::{HtmlElement, HtmlImageElement};

use floodmap_core::render::{LayerSpec, MapRenderer};

use crate::wms::{self, WmsConfig};

/// The world window currently shown, in map-server coordinates.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Bounding box in `crs` coordinates.
    pub bbox: Rect,
    /// Requested image width in pixels.
    pub width: u32,
    /// Requested image height in pixels.
    pub height: u32,
    /// Coordinate reference system token, e.g. `EPSG:28992`.
    pub crs: String,
}

struct LayerEl {
    el: HtmlImageElement,
    source_ref: String,
    // Keeps the error handler alive for the element's lifetime.
    _onerror: Closure<dyn FnMut()>,
}

/// Maps visible leaves to live `<img>` elements.
pub struct DomRenderer {
    container: HtmlElement,
    config: WmsConfig,
    viewport: Viewport,
    elements: BTreeMap<String, LayerEl>,
}

impl core::fmt::Debug for DomRenderer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomRenderer")
            .field("container", &"HtmlElement")
            .field("viewport", &self.viewport)
            .field("elements_len", &self.elements.len())
            .finish()
    }
}

impl DomRenderer {
    /// Creates a renderer that manages child elements of `container`.
    #[must_use]
    pub fn new(container: HtmlElement, config: WmsConfig, viewport: Viewport) -> Self {
        Self {
            container,
            config,
            viewport,
            elements: BTreeMap::new(),
        }
    }

    /// Returns a reference to the container element.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Moves the world window and refetches every live layer for it.
    ///
    /// Element identity is untouched; only `src` changes, so the browser
    /// swaps imagery in place without relayout.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        if viewport == self.viewport {
            return;
        }
        self.viewport = viewport;
        for layer in self.elements.values() {
            let url = self.layer_url(&layer.source_ref);
            // A stale hidden element may recover with fresh imagery.
            let _ = layer.el.style().remove_property("display");
            layer.el.set_src(&url);
        }
    }

    fn layer_url(&self, source_ref: &str) -> String {
        wms::getmap_url(
            &self.config,
            source_ref,
            self.viewport.bbox,
            self.viewport.width,
            self.viewport.height,
            &self.viewport.crs,
        )
    }
}

impl MapRenderer for DomRenderer {
    fn add(&mut self, spec: &LayerSpec) {
        let doc = self.container.owner_document().expect("no owner document");
        let el: HtmlImageElement = doc
            .create_element("img")
            .expect("create_element failed")
            .unchecked_into();

        let s = el.style();
        let _ = s.set_property("position", "absolute");
        let _ = s.set_property("left", "0");
        let _ = s.set_property("top", "0");
        let _ = s.set_property("width", "100%");
        let _ = s.set_property("height", "100%");
        let _ = s.set_property("pointer-events", "none");
        let _ = s.set_property("opacity", &format!("{}", spec.opacity));
        let _ = s.set_property("z-index", &format!("{}", spec.stacking));

        // Fetch failures hide this element only.
        let el_for_error = el.clone();
        let onerror = Closure::wrap(Box::new(move || {
            let _ = el_for_error.style().set_property("display", "none");
        }) as Box<dyn FnMut()>);
        let _ = el.add_event_listener_with_callback("error", onerror.as_ref().unchecked_ref());

        el.set_src(&self.layer_url(&spec.source_ref));
        let _ = self.container.append_child(&el);

        self.elements.insert(
            spec.id.clone(),
            LayerEl {
                el,
                source_ref: spec.source_ref.clone(),
                _onerror: onerror,
            },
        );
    }

    fn remove(&mut self, id: &str) {
        if let Some(layer) = self.elements.remove(id) {
            layer.el.remove();
        }
    }

    fn set_opacity(&mut self, id: &str, opacity: f32) {
        if let Some(layer) = self.elements.get(id) {
            let _ = layer.el.style().set_property("opacity", &format!("{opacity}"));
        }
    }

    fn set_stacking(&mut self, id: &str, stacking: u16) {
        if let Some(layer) = self.elements.get(id) {
            let _ = layer.el.style().set_property("z-index", &format!("{stacking}"));
        }
    }
}
