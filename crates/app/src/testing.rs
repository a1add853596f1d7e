//! In-memory repository fakes shared by the service tests.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use homelights_domain::error::LightsError;
use homelights_domain::id::{LightId, PatternId, SceneId, ZoneId};
use homelights_domain::light::Light;
use homelights_domain::pattern::Pattern;
use homelights_domain::scene::Scene;
use homelights_domain::zone::Zone;

use crate::ports::{LightRepository, PatternRepository, SceneRepository, ZoneRepository};

/// A `Mutex<HashMap>` store that counts every write it receives.
pub(crate) struct InMemoryRepo<K, V> {
    store: Mutex<HashMap<K, V>>,
    writes: AtomicUsize,
}

impl<K, V> Default for InMemoryRepo<K, V> {
    fn default() -> Self {
        Self {
            store: Mutex::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }
}

impl<K: Eq + Hash + Copy, V: Clone> InMemoryRepo<K, V> {
    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn put(&self, key: K, value: V) -> V {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.store.lock().unwrap().insert(key, value.clone());
        value
    }

    fn get(&self, key: K) -> Option<V> {
        self.store.lock().unwrap().get(&key).cloned()
    }

    fn all(&self) -> Vec<V> {
        self.store.lock().unwrap().values().cloned().collect()
    }

    fn remove(&self, key: K) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.store.lock().unwrap().remove(&key);
    }
}

pub(crate) type InMemoryZoneRepo = InMemoryRepo<ZoneId, Zone>;
pub(crate) type InMemoryLightRepo = InMemoryRepo<LightId, Light>;
pub(crate) type InMemorySceneRepo = InMemoryRepo<SceneId, Scene>;
pub(crate) type InMemoryPatternRepo = InMemoryRepo<PatternId, Pattern>;

impl ZoneRepository for InMemoryZoneRepo {
    fn create(&self, zone: Zone) -> impl Future<Output = Result<Zone, LightsError>> + Send {
        let zone = self.put(zone.id, zone);
        async { Ok(zone) }
    }

    fn get_by_id(
        &self,
        id: ZoneId,
    ) -> impl Future<Output = Result<Option<Zone>, LightsError>> + Send {
        let result = self.get(id);
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Zone>, LightsError>> + Send {
        let result = self.all();
        async { Ok(result) }
    }

    fn update(&self, zone: Zone) -> impl Future<Output = Result<Zone, LightsError>> + Send {
        let zone = self.put(zone.id, zone);
        async { Ok(zone) }
    }

    fn delete(&self, id: ZoneId) -> impl Future<Output = Result<(), LightsError>> + Send {
        self.remove(id);
        async { Ok(()) }
    }
}

impl LightRepository for InMemoryLightRepo {
    fn create(&self, light: Light) -> impl Future<Output = Result<Light, LightsError>> + Send {
        let light = self.put(light.id, light);
        async { Ok(light) }
    }

    fn get_by_id(
        &self,
        id: LightId,
    ) -> impl Future<Output = Result<Option<Light>, LightsError>> + Send {
        let result = self.get(id);
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Light>, LightsError>> + Send {
        let result = self.all();
        async { Ok(result) }
    }

    fn update(&self, light: Light) -> impl Future<Output = Result<Light, LightsError>> + Send {
        let light = self.put(light.id, light);
        async { Ok(light) }
    }

    fn delete(&self, id: LightId) -> impl Future<Output = Result<(), LightsError>> + Send {
        self.remove(id);
        async { Ok(()) }
    }
}

impl SceneRepository for InMemorySceneRepo {
    fn create(&self, scene: Scene) -> impl Future<Output = Result<Scene, LightsError>> + Send {
        let scene = self.put(scene.id, scene);
        async { Ok(scene) }
    }

    fn get_by_id(
        &self,
        id: SceneId,
    ) -> impl Future<Output = Result<Option<Scene>, LightsError>> + Send {
        let result = self.get(id);
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Scene>, LightsError>> + Send {
        let result = self.all();
        async { Ok(result) }
    }

    fn update(&self, scene: Scene) -> impl Future<Output = Result<Scene, LightsError>> + Send {
        let scene = self.put(scene.id, scene);
        async { Ok(scene) }
    }

    fn delete(&self, id: SceneId) -> impl Future<Output = Result<(), LightsError>> + Send {
        self.remove(id);
        async { Ok(()) }
    }
}

impl PatternRepository for InMemoryPatternRepo {
    fn create(
        &self,
        pattern: Pattern,
    ) -> impl Future<Output = Result<Pattern, LightsError>> + Send {
        let pattern = self.put(pattern.id, pattern);
        async { Ok(pattern) }
    }

    fn get_by_id(
        &self,
        id: PatternId,
    ) -> impl Future<Output = Result<Option<Pattern>, LightsError>> + Send {
        let result = self.get(id);
        async { Ok(result) }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Pattern>, LightsError>> + Send {
        let result = self.all();
        async { Ok(result) }
    }

    fn update(
        &self,
        pattern: Pattern,
    ) -> impl Future<Output = Result<Pattern, LightsError>> + Send {
        let pattern = self.put(pattern.id, pattern);
        async { Ok(pattern) }
    }

    fn delete(&self, id: PatternId) -> impl Future<Output = Result<(), LightsError>> + Send {
        self.remove(id);
        async { Ok(()) }
    }
}
