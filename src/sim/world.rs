//! World: the entity registry plus everything entities ask of each other
//!
//! Entities never hold references to one another. They reach other entities
//! through [`EntityId`] handles and the spatial queries here; a handle whose
//! entity was swept simply stops resolving.

use glam::{IVec2, Vec2};
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::category::Category;
use super::collection::{EntityCollection, EntityId};
use super::collision;
use super::entity::{DamageSource, Entity, EntityKind, TickContext};
use super::objects::{Lifespan, Overlay, Wall};
use crate::audio::SoundEffect;
use crate::consts::*;
use crate::error::EngineError;
use crate::geom::{Direction, Rect};
use crate::hud::puzzle::{OutcomeSender, Puzzle};

/// Something the host should react to after the tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Sound(SoundEffect),
    PlayerDied,
    LevelQueued(String),
}

/// Something an entity wants the HUD to show
#[derive(Debug)]
pub enum HudRequest {
    /// Push pages onto the blocking text queue
    ShowText(Vec<String>),
    /// Open a puzzle modal; its final status goes back through `reply`
    OpenPuzzle {
        puzzle: Box<dyn Puzzle>,
        reply: OutcomeSender,
    },
    TitleCard(String),
}

#[derive(Debug)]
pub struct World {
    entities: EntityCollection,
    player: Option<EntityId>,
    /// World coordinates of the screen center
    pub camera: Vec2,
    /// Ticks since the player was swept, `None` while alive
    pub time_since_player_death: Option<u32>,
    pending_level: Option<String>,
    pub events: Vec<GameEvent>,
    pub hud_requests: Vec<HudRequest>,
    pub rng: Pcg32,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            entities: EntityCollection::new(),
            player: None,
            camera: Vec2::new(SCREEN_WIDTH as f32 / 2.0, SCREEN_HEIGHT as f32 / 2.0),
            time_since_player_death: None,
            pending_level: None,
            events: Vec::new(),
            hud_requests: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
        }
    }

    // === Registry ===

    /// Add an entity. Only one player may exist at a time.
    pub fn add_entity(&mut self, entity: Entity) -> Result<EntityId, EngineError> {
        let is_player = entity.is(Category::Player);
        if is_player && self.player.is_some() {
            return Err(EngineError::AlreadyHasPlayer);
        }
        let is_wall = entity.is(Category::Wall);
        let rect = entity.rect();
        let id = self.entities.insert(entity);
        if is_player {
            self.player = Some(id);
            self.time_since_player_death = None;
        }
        if is_wall {
            self.rebuild_outlines_near(rect);
        }
        log::debug!("Spawned entity {:?} at {:?}", id, rect);
        Ok(id)
    }

    /// Remove an entity right away. Entities updating this tick should set
    /// `alive = false` instead and let the sweep remove them.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(id)?;
        if self.player == Some(id) {
            self.player = None;
        }
        if entity.is(Category::Wall) {
            self.rebuild_outlines_near(entity.rect());
        }
        log::debug!("Removed entity {:?}", id);
        Some(entity)
    }

    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// True while the entity is registered, even if it is mid-update
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains(id)
    }

    pub fn player_id(&self) -> Option<EntityId> {
        self.player
    }

    pub fn player(&self) -> Option<&Entity> {
        self.entities.get(self.player?)
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.entities.get_mut(self.player?)
    }

    /// Run `f` with the entity lent out of the collection, so it can query
    /// and mutate the rest of the world
    pub fn with_entity<R>(
        &mut self,
        id: EntityId,
        f: impl FnOnce(&mut Entity, &mut World) -> R,
    ) -> Option<R> {
        let mut entity = self.entities.check_out(id)?;
        let result = f(&mut entity, self);
        self.entities.check_in(entity);
        Some(result)
    }

    // === Queries ===

    /// Door whose label (or level ref id) matches
    pub fn get_door(&self, label: &str) -> Option<EntityId> {
        self.entities
            .with_category(Category::Door)
            .find(|e| {
                e.as_door().is_some_and(|d| d.label == label) || e.ref_id.as_deref() == Some(label)
            })
            .map(|e| e.id)
    }

    pub fn get_entities_in_rect(
        &self,
        rect: Rect,
        categories: &[Category],
        not_categories: &[Category],
        cond: impl Fn(&Entity) -> bool,
        limit: Option<usize>,
    ) -> Vec<EntityId> {
        let mut found = self
            .entities
            .get_all(categories, not_categories, Some(rect), cond);
        if let Some(limit) = limit {
            found.truncate(limit);
        }
        found
    }

    pub fn get_entities_at_point(
        &self,
        point: IVec2,
        categories: &[Category],
        not_categories: &[Category],
    ) -> Vec<EntityId> {
        self.entities
            .get_all(categories, not_categories, None, |e| {
                e.rect().contains_point(point)
            })
    }

    /// Whether any wall overlaps the `dist`-thick sliver on `direction`'s side
    pub fn is_touching_wall(&self, rect: &Rect, direction: Direction, dist: i32) -> bool {
        let sliver = rect.sliver(direction, dist);
        !self
            .entities
            .get_all(&[Category::Wall], &[], Some(sliver), |_| true)
            .is_empty()
    }

    /// Rects of the walls overlapping `rect`
    pub fn wall_rects_in(&self, rect: Rect) -> Vec<Rect> {
        self.entities
            .with_category(Category::Wall)
            .map(|e| e.rect())
            .filter(|r| r.overlaps(&rect))
            .collect()
    }

    /// Integer camera offset: world pixel drawn at the screen's top-left
    pub fn camera_offset(&self) -> IVec2 {
        let half = Vec2::new(SCREEN_WIDTH as f32, SCREEN_HEIGHT as f32) / 2.0;
        (self.camera - half).round().as_ivec2()
    }

    pub fn to_world_pos(&self, screen: IVec2) -> IVec2 {
        screen + self.camera_offset()
    }

    pub fn world_to_screen(&self, world: IVec2) -> IVec2 {
        world - self.camera_offset()
    }

    /// Top-left corner of the tile containing `(x, y)`
    pub fn get_tile_at(&self, x: i32, y: i32, tile_size: (i32, i32)) -> IVec2 {
        let (tw, th) = tile_size;
        IVec2::new(x.div_euclid(tw) * tw, y.div_euclid(th) * th)
    }

    // === Levels, events, HUD ===

    pub fn queue_level(&mut self, name: &str) {
        log::info!("Queued level `{}`", name);
        self.pending_level = Some(name.to_string());
        self.events.push(GameEvent::LevelQueued(name.to_string()));
    }

    pub fn pending_level(&self) -> Option<&str> {
        self.pending_level.as_deref()
    }

    pub fn take_pending_level(&mut self) -> Option<String> {
        self.pending_level.take()
    }

    pub fn play_sound(&mut self, effect: SoundEffect) {
        self.events.push(GameEvent::Sound(effect));
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn show_text(&mut self, pages: Vec<String>) {
        self.hud_requests.push(HudRequest::ShowText(pages));
    }

    pub fn open_puzzle(&mut self, puzzle: Box<dyn Puzzle>, reply: OutcomeSender) {
        self.hud_requests.push(HudRequest::OpenPuzzle { puzzle, reply });
    }

    pub fn show_title_card(&mut self, title: &str) {
        self.hud_requests.push(HudRequest::TitleCard(title.to_string()));
    }

    /// Spawn a short-lived sprite centered on `center`
    pub fn spawn_overlay(
        &mut self,
        sprite: &str,
        lifespan: Lifespan,
        center: Vec2,
        size: (i32, i32),
        target: Option<EntityId>,
    ) -> Result<EntityId, EngineError> {
        let mut entity = Overlay::new_entity(sprite, lifespan, size, target);
        entity.body.set_center(center);
        self.add_entity(entity)
    }

    // === Damage ===

    /// Deal damage to any entity; returns true if it took some
    pub fn damage(
        &mut self,
        id: EntityId,
        amount: i32,
        direction: Vec2,
        source: DamageSource,
    ) -> bool {
        let Some(entity) = self.entities.get_mut(id) else {
            return false;
        };
        let took = entity.deal_damage(amount, direction, source);
        if took {
            let is_player = entity.is(Category::Player);
            self.play_sound(if is_player {
                SoundEffect::PlayerHurt
            } else {
                SoundEffect::EnemyHurt
            });
        }
        took
    }

    /// Contact damage to the player, ignored while it is still flashing
    /// from the last hit
    pub fn hurt_player(&mut self, amount: i32, direction: Vec2, source: DamageSource) -> bool {
        let Some(id) = self.player else {
            return false;
        };
        let ready = self
            .entities
            .get(id)
            .and_then(|e| e.as_player())
            .is_some_and(|p| p.hurt_cooldown == 0);
        if !ready {
            return false;
        }
        let took = self.damage(id, amount, direction, source);
        if took {
            if let Some(p) = self.entities.get_mut(id).and_then(|e| e.as_player_mut()) {
                p.hurt_cooldown = PLAYER_HURT_COOLDOWN;
            }
        }
        took
    }

    // === Tick phases ===

    /// Update every entity once, in insertion order. Entities added during
    /// the pass wait for the next tick.
    pub fn update_entities(&mut self, ctx: &TickContext) -> Result<(), EngineError> {
        for id in self.entities.ids() {
            let Some(mut entity) = self.entities.check_out(id) else {
                continue;
            };
            let result = entity.update(self, ctx);
            self.entities.check_in(entity);
            result?;
        }
        Ok(())
    }

    /// Remove dead entities, running their death hooks
    pub fn sweep(&mut self) -> Result<(), EngineError> {
        let dead: Vec<EntityId> = self
            .entities
            .get_all(&[], &[], None, |e| !e.is_alive());
        for id in dead {
            let Some(entity) = self.remove_entity(id) else {
                continue;
            };
            if entity.is(Category::Player) {
                log::info!("Player died");
                self.time_since_player_death = Some(0);
                self.events.push(GameEvent::PlayerDied);
            }
            entity.on_death(self)?;
        }
        Ok(())
    }

    /// Push every actor out of the walls it sank into
    pub fn uncollide_actors(&mut self) {
        let actors = self.entities.get_all(&[Category::Actor], &[], None, |_| true);
        for id in actors {
            let Some(rect) = self.entities.get(id).map(|e| e.rect()) else {
                continue;
            };
            let walls = self.wall_rects_in(rect);
            if walls.is_empty() {
                continue;
            }
            if let Some(entity) = self.entities.get_mut(id) {
                collision::uncollide(&mut entity.body, &walls);
            }
        }
    }

    pub fn recenter_camera(&mut self) {
        if let Some(center) = self.player().map(|p| p.center()) {
            self.camera = center;
        }
    }

    // === Walls ===

    fn rebuild_outlines_near(&mut self, rect: Rect) {
        let ids = self
            .entities
            .get_all(&[Category::Wall], &[], Some(rect.inflate(4, 4)), |_| true);
        for id in ids {
            self.rebuild_outline(id);
        }
    }

    fn rebuild_outline(&mut self, id: EntityId) {
        let Some(rect) = self.entities.get(id).map(|e| e.rect()) else {
            return;
        };
        let neighbors: Vec<Rect> = self
            .entities
            .get_all(&[Category::Wall], &[], Some(rect.inflate(4, 4)), |e| e.id != id)
            .into_iter()
            .filter_map(|n| self.entities.get(n).map(|e| e.rect()))
            .collect();
        if let Some(EntityKind::Wall(wall)) = self.entities.get_mut(id).map(|e| &mut e.kind) {
            wall.outline = Wall::outline_for(rect, &neighbors);
        }
    }
}
