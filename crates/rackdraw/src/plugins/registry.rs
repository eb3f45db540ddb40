//! Renderer registry for resolving procedural renderers by name
//!
//! Catalog entries name their procedural renderer as a string. The registry
//! is the only place those names are resolved; an unknown name simply means
//! the device has no procedural fallback.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, span, trace, warn, Level};

use super::{
    BlankPanelRenderer, CableManagerRenderer, DeviceRenderer, PatchPanelRenderer, PortRenderer,
    RackRenderer, StyleOptions, SwitchRenderer,
};
use crate::core::{Canvas, RackError, Rect};

/// Name → renderer lookup table
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<String, Arc<dyn DeviceRenderer>>,
}

impl RendererRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with every built-in renderer registered
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        let builtin: [Arc<dyn DeviceRenderer>; 6] = [
            Arc::new(SwitchRenderer),
            Arc::new(PatchPanelRenderer),
            Arc::new(RackRenderer),
            Arc::new(CableManagerRenderer),
            Arc::new(BlankPanelRenderer),
            Arc::new(PortRenderer),
        ];
        for renderer in builtin {
            registry.register(renderer.name(), renderer);
        }
        registry
    }

    /// Register a renderer, replacing any previous one with the same name
    pub fn register(&mut self, name: impl Into<String>, renderer: Arc<dyn DeviceRenderer>) {
        let name = name.into();
        if self.renderers.insert(name.clone(), renderer).is_some() {
            warn!(renderer = %name, "Replaced existing renderer");
        } else {
            trace!(renderer = %name, "Registered renderer");
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn DeviceRenderer>> {
        self.renderers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.renderers.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.renderers.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Resolve `name` and draw into `frame`
    pub fn draw(
        &self,
        name: &str,
        canvas: &mut Canvas,
        frame: Rect,
        style: &StyleOptions,
    ) -> Result<(), RackError> {
        let draw_span = span!(Level::DEBUG, "procedural_draw", renderer = name);
        let _enter = draw_span.enter();

        let renderer = self.get(name).ok_or_else(|| RackError::UnknownRenderer {
            name: name.to_string(),
        })?;
        let before = canvas.len();
        renderer.draw(canvas, frame, style)?;
        debug!(primitives = canvas.len() - before, "Procedural draw completed");
        Ok(())
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("renderers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Dot;

    impl DeviceRenderer for Dot {
        fn name(&self) -> &'static str {
            "dot"
        }

        fn draw(
            &self,
            canvas: &mut Canvas,
            frame: Rect,
            _style: &StyleOptions,
        ) -> Result<(), RackError> {
            canvas.circle(frame.center_x(), frame.center_y(), 1.0, None, None);
            Ok(())
        }
    }

    #[test]
    fn test_builtin_names() {
        let registry = RendererRegistry::with_builtin();
        assert_eq!(
            registry.names(),
            vec![
                "blank_panel",
                "cable_manager",
                "patch_panel",
                "port",
                "rack",
                "switch"
            ]
        );
    }

    #[test]
    fn test_register_custom_renderer() {
        let mut registry = RendererRegistry::new();
        assert!(registry.is_empty());
        registry.register("dot", Arc::new(Dot));
        assert!(registry.contains("dot"));

        let mut canvas = Canvas::new(10.0, 10.0);
        let frame = canvas.frame();
        registry
            .draw("dot", &mut canvas, frame, &StyleOptions::default())
            .unwrap();
        assert_eq!(canvas.len(), 1);
    }

    #[test]
    fn test_unknown_renderer() {
        let registry = RendererRegistry::with_builtin();
        assert!(registry.get("toaster").is_none());

        let mut canvas = Canvas::new(10.0, 10.0);
        let frame = canvas.frame();
        let err = registry
            .draw("toaster", &mut canvas, frame, &StyleOptions::default())
            .unwrap_err();
        assert!(matches!(err, RackError::UnknownRenderer { .. }));
        assert!(canvas.is_empty());
    }
}
