//! Service registry
//!
//! Every service gets an [`Engine`] whose pre-handler consults the service's
//! [`Control`]. Services are spaced ten priorities apart in registration
//! order; admin commands run at priority 1 ahead of all of them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;

use dashmap::DashSet;
use parking_lot::{Mutex, RwLock};

use super::{Control, ControlError, ControlResult, Options};
use crate::matcher::{Engine, MatcherRegistry, Rule};

/// State key under which a service's pre-handler stores its `Arc<Control>`
pub const MANAGER_KEY: &str = "manager";

/// Data folder of services that declare none
pub const DEFAULT_DATA_FOLDER: &str = "nano";

const PRIORITY_STEP: i32 = 10;

struct Service {
    control: Arc<Control>,
    engine: Arc<Engine>,
}

/// Registry of services and their controls
pub struct Manager {
    registry: Arc<MatcherRegistry>,
    data_dir: PathBuf,
    services: RwLock<HashMap<String, Service>>,
    folders: Mutex<HashMap<String, String>>,
    last_priority: AtomicI32,
    silenced: Arc<DashSet<u64>>,
}

impl Manager {
    /// Manager registering into `registry` with data folders under `data_dir`
    pub fn new(registry: Arc<MatcherRegistry>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            data_dir: data_dir.into(),
            services: RwLock::new(HashMap::new()),
            folders: Mutex::new(HashMap::new()),
            last_priority: AtomicI32::new(0),
            silenced: Arc::new(DashSet::new()),
        }
    }

    pub fn registry(&self) -> &Arc<MatcherRegistry> {
        &self.registry
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Register a service and return its engine
    ///
    /// The data folder is created when missing. Only the default folder may
    /// be shared between services.
    pub fn register(&self, service: &str, options: Options) -> ControlResult<Arc<Engine>> {
        let mut services = self.services.write();
        if services.contains_key(service) {
            return Err(ControlError::DuplicateService(service.to_string()));
        }

        let folder = data_folder(&options)?;
        let mut folders = self.folders.lock();
        if folder != DEFAULT_DATA_FOLDER {
            if let Some(owner) = folders.get(&folder) {
                return Err(ControlError::DuplicateFolder {
                    folder,
                    owner: owner.clone(),
                });
            }
        }
        let path = self.data_dir.join(&folder);
        std::fs::create_dir_all(&path).map_err(|source| ControlError::CreateFolder {
            path: path.clone(),
            source,
        })?;

        let priority = self.last_priority.fetch_add(PRIORITY_STEP, Ordering::SeqCst) + PRIORITY_STEP;
        let control = Arc::new(Control::new(service, priority, options));
        let engine = Engine::new(Arc::clone(&self.registry))
            .with_priority(priority)
            .with_service(service, path.clone());
        engine.use_pre_handler(gate(Arc::clone(&control), Arc::clone(&self.silenced)));
        let engine = Arc::new(engine);

        if folder != DEFAULT_DATA_FOLDER {
            folders.insert(folder, service.to_string());
        }
        services.insert(
            service.to_string(),
            Service {
                control,
                engine: Arc::clone(&engine),
            },
        );
        tracing::info!(service, priority, data_folder = %path.display(), "Service registered");
        Ok(engine)
    }

    /// Remove a service and its matchers; its data folder is kept
    pub fn delete(&self, service: &str) -> bool {
        let Some(removed) = self.services.write().remove(service) else {
            return false;
        };
        let matchers = removed.engine.delete();
        self.folders.lock().retain(|_, owner| owner != service);
        tracing::info!(service, matchers, "Service deleted");
        true
    }

    pub fn lookup(&self, service: &str) -> Option<Arc<Control>> {
        self.services.read().get(service).map(|s| Arc::clone(&s.control))
    }

    /// Every service, by ascending priority
    pub fn services(&self) -> Vec<Arc<Control>> {
        let mut controls: Vec<_> = self.services.read().values().map(|s| Arc::clone(&s.control)).collect();
        controls.sort_by_key(|c| c.priority());
        controls
    }

    /// Resume service matchers in `group`
    pub fn respond(&self, group: u64) -> bool {
        self.silenced.remove(&group).is_some()
    }

    /// Stop every service matcher in `group`; admin commands still run
    pub fn silence(&self, group: u64) -> bool {
        self.silenced.insert(group)
    }

    pub fn can_respond(&self, group: u64) -> bool {
        !self.silenced.contains(&group)
    }
}

impl std::fmt::Debug for Manager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Manager")
            .field("data_dir", &self.data_dir)
            .field("services", &self.services.read().len())
            .field("silenced", &self.silenced.len())
            .finish()
    }
}

fn data_folder(options: &Options) -> ControlResult<String> {
    let first_is = |folder: &str, f: fn(char) -> bool| folder.chars().next().is_some_and(f);

    if let Some(folder) = options.public_data_folder.as_deref().filter(|f| !f.is_empty()) {
        if first_is(folder, char::is_lowercase) {
            return Err(ControlError::FolderCase {
                kind: "public",
                folder: folder.to_string(),
                expected: "upper",
            });
        }
        return Ok(folder.to_string());
    }
    if let Some(folder) = options.private_data_folder.as_deref().filter(|f| !f.is_empty()) {
        if first_is(folder, char::is_uppercase) {
            return Err(ControlError::FolderCase {
                kind: "private",
                folder: folder.to_string(),
                expected: "lower",
            });
        }
        return Ok(folder.to_string());
    }
    Ok(DEFAULT_DATA_FOLDER.to_string())
}

/// Pre-handler of a service engine
fn gate(control: Arc<Control>, silenced: Arc<DashSet<u64>>) -> Rule {
    Rule::new(move |ctx| {
        let group = ctx.group_id();
        ctx.state.insert(MANAGER_KEY, Arc::clone(&control));
        if silenced.contains(&group) {
            return false;
        }
        control.is_enabled_in(group) && !control.is_banned_in(ctx.user_id(), group)
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;
    use crate::events::EventType;
    use crate::matcher::evaluate;
    use crate::testing::{session_ctx, test_session};

    /// Fresh directory under the system temp dir
    pub(crate) fn scratch_dir() -> PathBuf {
        static NEXT: AtomicUsize = AtomicUsize::new(0);
        std::env::temp_dir().join(format!(
            "nano-control-{}-{}",
            std::process::id(),
            NEXT.fetch_add(1, Ordering::SeqCst)
        ))
    }

    #[test]
    fn test_priorities_and_folders() {
        let dir = scratch_dir();
        let manager = Manager::new(MatcherRegistry::new_shared(), &dir);

        let echo = manager.register("echo", Options::new()).unwrap();
        let weather = manager
            .register("weather", Options::new().public_data_folder("Weather"))
            .unwrap();
        let notes = manager
            .register("notes", Options::new().private_data_folder("notes"))
            .unwrap();

        assert_eq!((echo.priority(), weather.priority(), notes.priority()), (10, 20, 30));
        assert_eq!(echo.data_folder(), Some(dir.join("nano").as_path()));
        assert!(dir.join("Weather").is_dir());
        assert!(dir.join("notes").is_dir());
        assert_eq!(weather.service(), Some("weather"));

        let names: Vec<_> = manager.services().iter().map(|c| c.service().to_string()).collect();
        assert_eq!(names, vec!["echo", "weather", "notes"]);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn test_registration_conflicts() {
        let dir = scratch_dir();
        let manager = Manager::new(MatcherRegistry::new_shared(), &dir);
        manager.register("echo", Options::new()).unwrap();
        manager
            .register("weather", Options::new().public_data_folder("Weather"))
            .unwrap();

        assert!(matches!(
            manager.register("echo", Options::new()),
            Err(ControlError::DuplicateService(_))
        ));
        assert!(matches!(
            manager.register("forecast", Options::new().public_data_folder("Weather")),
            Err(ControlError::DuplicateFolder { .. })
        ));
        assert!(matches!(
            manager.register("lower", Options::new().public_data_folder("weather")),
            Err(ControlError::FolderCase { kind: "public", .. })
        ));
        assert!(matches!(
            manager.register("upper", Options::new().private_data_folder("Notes")),
            Err(ControlError::FolderCase { kind: "private", .. })
        ));
        assert!(manager.register("shared", Options::new()).is_ok());
        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_gate() {
        let dir = scratch_dir();
        let session = test_session();
        let manager = Manager::new(Arc::clone(session.bot().matchers()), &dir);
        let engine = manager.register("echo", Options::new()).unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);
        engine.on_message([]).handle_fn(move |ctx| {
            assert!(ctx.state.get::<Arc<Control>>(MANAGER_KEY).is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        });

        let run = |content: &str| {
            let ctx = session_ctx(&session, EventType::AtMessageCreate, content);
            let matchers = session.bot().matchers().snapshot(ctx.kind());
            evaluate(ctx, matchers)
        };

        run("hi").await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let control = manager.lookup("echo").unwrap();
        control.disable(100);
        run("hi").await;
        control.enable(100);
        control.ban(7, 100);
        run("hi").await;
        control.permit(7, 100);
        manager.silence(100);
        run("hi").await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        assert!(manager.respond(100));
        run("hi").await;
        assert_eq!(hits.load(Ordering::SeqCst), 2);

        assert!(manager.delete("echo"));
        assert_eq!(session.bot().matchers().total(), 0);
        let _ = std::fs::remove_dir_all(dir);
    }
}
