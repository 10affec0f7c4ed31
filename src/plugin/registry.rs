use super::{CaptureResult, Plugin, PluginContext, SceneData, Viewport};

/// Lifecycle call broadcast to every plugin
#[derive(Debug, Clone, Copy)]
pub enum Dispatch<'a> {
    Update(&'a SceneData),
    Render,
    Resize(Viewport),
    Capture(&'a CaptureResult),
}

impl Dispatch<'_> {
    pub fn method(&self) -> &'static str {
        match self {
            Dispatch::Update(_) => "update",
            Dispatch::Render => "render",
            Dispatch::Resize(_) => "resize",
            Dispatch::Capture(_) => "capture",
        }
    }
}

/// `name` equals `prefix` or continues it after a dot
pub fn matches_namespace(name: &str, prefix: &str) -> bool {
    match name.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('.'),
        None => false,
    }
}

struct PluginSlot {
    name: String,
    plugin: Box<dyn Plugin>,
}

/// Named plugins kept in registration order
#[derive(Default)]
pub struct PluginRegistry {
    slots: Vec<PluginSlot>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.name.as_str()).collect()
    }

    /// Register and initialize; a plugin with the same name is disposed and
    /// replaced in the slot it held
    pub fn add(&mut self, plugin: Box<dyn Plugin>, ctx: &mut PluginContext<'_>) {
        let name = plugin.name().to_string();
        let slot = PluginSlot {
            name: name.clone(),
            plugin,
        };

        let index = match self.slots.iter().position(|s| s.name == name) {
            Some(index) => {
                let previous = std::mem::replace(&mut self.slots[index], slot);
                log::warn!("[plugin:{name}] replaced by a new registration");
                if let Err(err) = previous.plugin.dispose(ctx) {
                    log::error!("[plugin:{name}] dispose failed: {err:?}");
                }
                index
            }
            None => {
                self.slots.push(slot);
                self.slots.len() - 1
            }
        };

        log::info!("[plugin:{name}] added");
        if let Err(err) = self.slots[index].plugin.initialize(ctx) {
            log::error!("[plugin:{name}] initialize failed: {err:?}");
        }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.slots
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.plugin.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut dyn Plugin> {
        match self.slots.iter_mut().find(|s| s.name == name) {
            Some(slot) => Some(slot.plugin.as_mut()),
            None => None,
        }
    }

    /// Typed lookup by exact name
    pub fn get_as<T: Plugin>(&self, name: &str) -> Option<&T> {
        self.get(name)?.as_any().downcast_ref::<T>()
    }

    pub fn get_as_mut<T: Plugin>(&mut self, name: &str) -> Option<&mut T> {
        self.get_mut(name)?.as_any_mut().downcast_mut::<T>()
    }

    /// All plugins named `prefix` or `prefix.*`, in registration order
    pub fn get_by_namespace(&self, prefix: &str) -> Vec<&dyn Plugin> {
        self.slots
            .iter()
            .filter(|s| matches_namespace(&s.name, prefix))
            .map(|s| s.plugin.as_ref())
            .collect()
    }

    pub fn has(&self, prefix: &str) -> bool {
        self.slots.iter().any(|s| matches_namespace(&s.name, prefix))
    }

    /// Dispose and drop the plugin with this exact name
    pub fn remove(&mut self, name: &str, ctx: &mut PluginContext<'_>) -> bool {
        let Some(index) = self.slots.iter().position(|s| s.name == name) else {
            return false;
        };
        let slot = self.slots.remove(index);
        if let Err(err) = slot.plugin.dispose(ctx) {
            log::error!("[plugin:{name}] dispose failed: {err:?}");
        }
        log::info!("[plugin:{name}] removed");
        true
    }

    /// Invoke one lifecycle method on every plugin, returns how many failed
    ///
    /// A failing plugin is logged and skipped; the rest still run.
    pub fn dispatch(&mut self, method: Dispatch<'_>, ctx: &mut PluginContext<'_>) -> usize {
        let mut failures = 0;
        for slot in &mut self.slots {
            let result = match method {
                Dispatch::Update(data) => slot.plugin.update(ctx, data),
                Dispatch::Render => slot.plugin.render(ctx),
                Dispatch::Resize(viewport) => slot.plugin.resize(ctx, viewport),
                Dispatch::Capture(capture) => slot.plugin.capture(ctx, capture),
            };
            if let Err(err) = result {
                failures += 1;
                log::error!("[plugin:{}] {} failed: {err:?}", slot.name, method.method());
            }
        }
        failures
    }

    pub fn show_namespace(&mut self, prefix: &str, ctx: &mut PluginContext<'_>) {
        for slot in self.slots.iter_mut().filter(|s| matches_namespace(&s.name, prefix)) {
            if let Err(err) = slot.plugin.show(ctx) {
                log::error!("[plugin:{}] show failed: {err:?}", slot.name);
            }
        }
    }

    pub fn hide_namespace(&mut self, prefix: &str, ctx: &mut PluginContext<'_>) {
        for slot in self.slots.iter_mut().filter(|s| matches_namespace(&s.name, prefix)) {
            if let Err(err) = slot.plugin.hide(ctx) {
                log::error!("[plugin:{}] hide failed: {err:?}", slot.name);
            }
        }
    }

    /// Empty the registry first, then dispose what it held, in order
    pub fn dispose(&mut self, ctx: &mut PluginContext<'_>) {
        let slots = std::mem::take(&mut self.slots);
        for slot in slots {
            if let Err(err) = slot.plugin.dispose(ctx) {
                log::error!("[plugin:{}] dispose failed: {err:?}", slot.name);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::PerspectiveCamera;
    use crate::config::ViewerOptions;
    use crate::plugin::ViewerCommand;
    use crate::scene::Scene;
    use anyhow::{bail, Result};
    use std::any::Any;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: String,
        log: Log,
        fail_update: bool,
        initialized: bool,
    }

    impl Probe {
        fn boxed(name: &str, log: &Log) -> Box<Self> {
            Box::new(Self {
                name: name.to_string(),
                log: log.clone(),
                fail_update: false,
                initialized: false,
            })
        }

        fn record(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}:{}", self.name, what));
        }
    }

    impl Plugin for Probe {
        fn name(&self) -> &str {
            &self.name
        }

        fn initialize(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
            if !self.initialized {
                self.initialized = true;
                self.record("initialize");
            }
            Ok(())
        }

        fn update(&mut self, _ctx: &mut PluginContext<'_>, _data: &SceneData) -> Result<()> {
            self.record("update");
            if self.fail_update {
                bail!("boom");
            }
            Ok(())
        }

        fn show(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
            self.record("show");
            Ok(())
        }

        fn hide(&mut self, _ctx: &mut PluginContext<'_>) -> Result<()> {
            self.record("hide");
            Ok(())
        }

        fn dispose(self: Box<Self>, _ctx: &mut PluginContext<'_>) -> Result<()> {
            self.record("dispose");
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    struct Fixture {
        scene: Scene,
        camera: PerspectiveCamera,
        options: ViewerOptions,
        commands: Vec<ViewerCommand>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: Scene::new(),
                camera: PerspectiveCamera::default(),
                options: ViewerOptions::default(),
                commands: Vec::new(),
            }
        }

        fn ctx(&mut self) -> PluginContext<'_> {
            PluginContext::new(
                &mut self.scene,
                &self.camera,
                &self.options,
                Viewport::new(100, 100),
                &mut self.commands,
            )
        }
    }

    #[test]
    fn test_namespace_matching() {
        assert!(matches_namespace("Helpers.Grid", "Helpers"));
        assert!(matches_namespace("Helpers.Grid", "Helpers.Grid"));
        assert!(!matches_namespace("HelpersX.Grid", "Helpers"));
        assert!(!matches_namespace("Helpers", "Helpers.Grid"));
    }

    #[test]
    fn test_add_initializes_once() {
        let log = Log::default();
        let mut fx = Fixture::new();
        let mut registry = PluginRegistry::new();
        registry.add(Probe::boxed("Helpers.Grid", &log), &mut fx.ctx());
        assert_eq!(*log.borrow(), vec!["Helpers.Grid:initialize"]);
        assert!(registry.has("Helpers"));
    }

    #[test]
    fn test_same_name_replaces_in_place() {
        let log = Log::default();
        let mut fx = Fixture::new();
        let mut registry = PluginRegistry::new();
        registry.add(Probe::boxed("A", &log), &mut fx.ctx());
        registry.add(Probe::boxed("B", &log), &mut fx.ctx());
        registry.add(Probe::boxed("A", &log), &mut fx.ctx());

        assert_eq!(registry.names(), vec!["A", "B"]);
        assert_eq!(
            *log.borrow(),
            vec!["A:initialize", "B:initialize", "A:dispose", "A:initialize"]
        );
    }

    #[test]
    fn test_failing_plugin_does_not_stop_dispatch() {
        let log = Log::default();
        let mut fx = Fixture::new();
        let mut registry = PluginRegistry::new();
        let mut bad = Probe::boxed("Bad", &log);
        bad.fail_update = true;
        registry.add(bad, &mut fx.ctx());
        registry.add(Probe::boxed("Good", &log), &mut fx.ctx());
        log.borrow_mut().clear();

        let failures = registry.dispatch(Dispatch::Update(&SceneData::default()), &mut fx.ctx());
        assert_eq!(failures, 1);
        assert_eq!(*log.borrow(), vec!["Bad:update", "Good:update"]);
    }

    #[test]
    fn test_remove_disposes_target() {
        let log = Log::default();
        let mut fx = Fixture::new();
        let mut registry = PluginRegistry::new();
        registry.add(Probe::boxed("Effects.Outline", &log), &mut fx.ctx());

        assert!(registry.remove("Effects.Outline", &mut fx.ctx()));
        assert!(!registry.remove("Effects.Outline", &mut fx.ctx()));
        assert!(log.borrow().contains(&"Effects.Outline:dispose".to_string()));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_typed_lookup() {
        let log = Log::default();
        let mut fx = Fixture::new();
        let mut registry = PluginRegistry::new();
        registry.add(Probe::boxed("P", &log), &mut fx.ctx());
        assert!(registry.get_as::<Probe>("P").is_some_and(|p| p.initialized));
        assert!(registry.get_as::<Probe>("Q").is_none());
    }

    #[test]
    fn test_namespace_show_hide() {
        let log = Log::default();
        let mut fx = Fixture::new();
        let mut registry = PluginRegistry::new();
        registry.add(Probe::boxed("Helpers.Grid", &log), &mut fx.ctx());
        registry.add(Probe::boxed("Effects.Outline", &log), &mut fx.ctx());
        log.borrow_mut().clear();

        registry.hide_namespace("Helpers", &mut fx.ctx());
        registry.show_namespace("Effects", &mut fx.ctx());
        assert_eq!(*log.borrow(), vec!["Helpers.Grid:hide", "Effects.Outline:show"]);
    }
}
