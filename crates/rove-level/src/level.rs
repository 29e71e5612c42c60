//! The level context: sectors, thinkers, and the zone backing them.

use std::io;

use rand_chacha::rand_core::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rove_core::{PurgeTag, ThinkerId, TickId, ZonePtr};
use rove_think::{Action, ThinkerHost, ThinkerList, TickStats};
use rove_zone::{ConfigError, MemoryResource};
use smallvec::SmallVec;

use crate::active::{ActiveTable, MAX_CEILINGS, MAX_PLATS};
use crate::body::{
    Body, Ceiling, CeilingKind, Door, DoorKind, FireFlicker, Floor, FloorKind, Glow, LightFlash,
    Mobj, Plat, PlatKind, PlatStatus, Strobe,
};
use crate::config::LevelConfig;
use crate::registry::ActionRegistry;
use crate::sector::{
    find_highest_ceiling_surrounding, find_highest_floor_surrounding,
    find_lowest_ceiling_surrounding, find_lowest_floor_surrounding, find_min_surrounding_light,
    find_next_highest_floor, Sector, FRACUNIT,
};
use crate::think::{
    self, CEILSPEED, FASTDARK, FLOORSPEED, PLATSPEED, PLATWAIT, SLOWDARK, STROBEBRIGHT, TICRATE,
    VDOORSPEED, VDOORWAIT,
};

/// One entry of the mobj state table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MobjState {
    /// Tics spent in this state; `-1` holds forever, `0` falls through.
    pub tics: i32,
    /// State entered when the tics run out.
    pub next: u32,
}

impl MobjState {
    /// The null state at index `0`. Entering it removes the object.
    pub const NULL: MobjState = MobjState { tics: -1, next: 0 };
}

/// Sector ids with a matching tag.
pub type SectorIds = SmallVec<[usize; 8]>;

/// Thinker ids matching a tag.
pub type TaggedIds = SmallVec<[ThinkerId; 8]>;

/// A loaded level.
///
/// Owns the zone, the scheduler, and every piece of world state the update
/// callbacks touch. All thinker records are backed by zone blocks: map
/// objects under [`PurgeTag::Level`], specials under [`PurgeTag::LevSpec`].
pub struct Level {
    pub(crate) mem: MemoryResource,
    pub(crate) thinkers: ThinkerList<Level>,
    pub(crate) sectors: Vec<Sector>,
    sector_block: Option<ZonePtr>,
    ceilings: ActiveTable<MAX_CEILINGS>,
    plats: ActiveTable<MAX_PLATS>,
    rng: ChaCha8Rng,
    seed: u64,
    time: TickId,
    registry: ActionRegistry,
    states: Vec<MobjState>,
}

impl ThinkerHost for Level {
    type Body = Body;
    type Input = ();

    fn thinkers(&self) -> &ThinkerList<Self> {
        &self.thinkers
    }

    fn thinkers_mut(&mut self) -> &mut ThinkerList<Self> {
        &mut self.thinkers
    }

    fn split_mut(&mut self) -> (&mut ThinkerList<Self>, &mut MemoryResource) {
        (&mut self.thinkers, &mut self.mem)
    }
}

impl Level {
    /// An empty level over a fresh zone.
    pub fn new(config: &LevelConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            mem: MemoryResource::init(&config.zone)?,
            thinkers: ThinkerList::new(),
            sectors: Vec::new(),
            sector_block: None,
            ceilings: ActiveTable::new(),
            plats: ActiveTable::new(),
            rng: ChaCha8Rng::seed_from_u64(config.seed),
            seed: config.seed,
            time: TickId(0),
            registry: ActionRegistry::standard(),
            states: vec![MobjState::NULL],
        })
    }

    // ── Accessors ──────────────────────────────────────────────────

    /// The zone.
    pub fn mem(&self) -> &MemoryResource {
        &self.mem
    }

    /// The zone, mutably.
    pub fn mem_mut(&mut self) -> &mut MemoryResource {
        &mut self.mem
    }

    /// The sectors, by index.
    pub fn sectors(&self) -> &[Sector] {
        &self.sectors
    }

    /// The sectors, mutably.
    pub fn sectors_mut(&mut self) -> &mut [Sector] {
        &mut self.sectors
    }

    /// Tics run since the level started.
    pub fn time(&self) -> TickId {
        self.time
    }

    /// Overwrite the level clock, e.g. after loading a save.
    pub fn set_time(&mut self, time: TickId) {
        self.time = time;
    }

    /// Seed the RNG was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Callback name table.
    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    /// Callback name table, mutably.
    pub fn registry_mut(&mut self) -> &mut ActionRegistry {
        &mut self.registry
    }

    /// Active ceiling table.
    pub fn active_ceilings(&self) -> &ActiveTable<MAX_CEILINGS> {
        &self.ceilings
    }

    /// Active platform table.
    pub fn active_plats(&self) -> &ActiveTable<MAX_PLATS> {
        &self.plats
    }

    /// Next value from the level RNG, in `0..=255`.
    pub fn random(&mut self) -> i32 {
        (self.rng.next_u32() & 0xff) as i32
    }

    /// Payload of a thinker.
    pub fn body(&self, id: ThinkerId) -> Option<&Body> {
        self.thinkers.get(id).map(|t| &t.body)
    }

    /// Payload of a thinker, mutably.
    pub fn body_mut(&mut self, id: ThinkerId) -> Option<&mut Body> {
        self.thinkers.get_mut(id).map(|t| &mut t.body)
    }

    /// Whether `id` names a map object that has not been removed.
    pub fn is_live_mobj(&self, id: ThinkerId) -> bool {
        self.thinkers
            .get(id)
            .is_some_and(|t| t.body.is_mobj() && !t.action.is_removed())
    }

    // ── Level lifetime ─────────────────────────────────────────────

    /// Install the sector array, backed by a [`PurgeTag::Level`] block.
    #[track_caller]
    pub fn load_sectors(&mut self, sectors: Vec<Sector>) {
        if let Some(block) = self.sector_block.take() {
            self.mem.free(block);
        }
        let bytes = sectors.len().max(1) * std::mem::size_of::<Sector>();
        self.sector_block = Some(self.mem.allocate(bytes, PurgeTag::Level, None));
        self.sectors = sectors;
        log::debug!("loaded {} sectors ({bytes} bytes)", self.sectors.len());
    }

    /// Run one tic.
    pub fn tick(&mut self) -> TickStats {
        let stats = ThinkerList::run(self);
        self.time.0 += 1;
        stats
    }

    /// Release everything level-scoped in one sweep.
    ///
    /// Frees every `Level..=LevSpec` block, forgets all thinkers, empties the
    /// active tables and drops the sectors. Static and cached blocks are
    /// untouched.
    pub fn free_level(&mut self) {
        let freed = self.mem.free_tags(PurgeTag::Level, PurgeTag::LevSpec);
        self.thinkers.clear();
        self.ceilings.clear();
        self.plats.clear();
        self.sectors.clear();
        self.sector_block = None;
        self.time = TickId(0);
        log::debug!("level freed: {freed} blocks released");
    }

    /// Free every thinker and its block, keeping the sectors.
    ///
    /// Sector links to specials are cleared and the active tables emptied.
    #[track_caller]
    pub fn clear_thinkers(&mut self) {
        self.thinkers.clear_and_free(&mut self.mem);
        self.ceilings.clear();
        self.plats.clear();
        for s in &mut self.sectors {
            s.special_data = None;
        }
    }

    // ── Spawning ───────────────────────────────────────────────────

    /// Append a thinker with a zone block sized for its payload.
    #[track_caller]
    pub fn spawn_thinker(&mut self, body: Body, action: Action<Level>) -> ThinkerId {
        let tag = if body.is_mobj() {
            PurgeTag::Level
        } else {
            PurgeTag::LevSpec
        };
        self.thinkers.spawn(
            &mut self.mem,
            tag,
            std::mem::size_of::<Body>(),
            body,
            action,
        )
    }

    /// Replace the mobj state table. Index `0` is always the null state.
    pub fn set_states(&mut self, states: impl IntoIterator<Item = MobjState>) {
        self.states = std::iter::once(MobjState::NULL).chain(states).collect();
    }

    /// Entry `index` of the state table.
    pub fn state(&self, index: u32) -> Option<&MobjState> {
        self.states.get(index as usize)
    }

    /// Spawn a map object, taking its tics from its starting state.
    #[track_caller]
    pub fn spawn_mobj(&mut self, mut mobj: Mobj) -> ThinkerId {
        if let Some(st) = self.state(mobj.state) {
            mobj.tics = st.tics;
        }
        self.spawn_thinker(Body::Mobj(mobj), Action::Think(think::mobj_thinker))
    }

    /// Enter `state` and follow zero-tic states. Returns `false` if the
    /// object reached the null state.
    pub fn set_mobj_state(&self, mobj: &mut Mobj, mut state: u32) -> bool {
        for _ in 0..self.states.len() {
            if state == 0 {
                mobj.state = 0;
                return false;
            }
            let Some(st) = self.state(state) else {
                log::warn!("mobj entered unknown state {state}");
                return false;
            };
            mobj.state = state;
            mobj.tics = st.tics;
            if st.tics != 0 {
                return true;
            }
            state = st.next;
        }
        log::warn!("zero-tic state loop at state {state}");
        true
    }

    /// Randomly flashing light in `sector`.
    #[track_caller]
    pub fn spawn_light_flash(&mut self, sector: usize) -> Option<ThinkerId> {
        let max_light = self.sectors.get(sector)?.light_level;
        let min_light = find_min_surrounding_light(&self.sectors, sector, max_light);
        self.sectors[sector].special = 0;
        let max_time = 64;
        let count = (self.random() & max_time) + 1;
        let body = Body::LightFlash(LightFlash {
            sector,
            count,
            max_light,
            min_light,
            max_time,
            min_time: 7,
        });
        Some(self.spawn_thinker(body, Action::Think(think::light_flash)))
    }

    /// Strobing light in `sector`, dark for `dark_time` tics per cycle.
    #[track_caller]
    pub fn spawn_strobe(&mut self, sector: usize, dark_time: i32, in_sync: bool) -> Option<ThinkerId> {
        let max_light = self.sectors.get(sector)?.light_level;
        let mut min_light = find_min_surrounding_light(&self.sectors, sector, max_light);
        if min_light == max_light {
            min_light = 0;
        }
        self.sectors[sector].special = 0;
        let count = if in_sync { 1 } else { (self.random() & 7) + 1 };
        let body = Body::Strobe(Strobe {
            sector,
            count,
            min_light,
            max_light,
            dark_time,
            bright_time: STROBEBRIGHT,
        });
        Some(self.spawn_thinker(body, Action::Think(think::strobe_flash)))
    }

    /// Glowing light in `sector`.
    #[track_caller]
    pub fn spawn_glow(&mut self, sector: usize) -> Option<ThinkerId> {
        let max_light = self.sectors.get(sector)?.light_level;
        let min_light = find_min_surrounding_light(&self.sectors, sector, max_light);
        self.sectors[sector].special = 0;
        let body = Body::Glow(Glow {
            sector,
            min_light,
            max_light,
            direction: -1,
        });
        Some(self.spawn_thinker(body, Action::Think(think::glow)))
    }

    /// Flickering firelight in `sector`.
    #[track_caller]
    pub fn spawn_fire_flicker(&mut self, sector: usize) -> Option<ThinkerId> {
        let max_light = self.sectors.get(sector)?.light_level;
        let min_light = find_min_surrounding_light(&self.sectors, sector, max_light) + 16;
        self.sectors[sector].special = 0;
        let body = Body::FireFlicker(FireFlicker {
            sector,
            count: 4,
            max_light,
            min_light,
        });
        Some(self.spawn_thinker(body, Action::Think(think::fire_flicker)))
    }

    /// Door that closes after 30 seconds.
    #[track_caller]
    pub fn spawn_door_close_in_30(&mut self, sector: usize) -> Option<ThinkerId> {
        self.sectors.get(sector)?;
        let body = Body::Door(Door {
            kind: DoorKind::Normal,
            sector,
            top_height: 0,
            speed: VDOORSPEED,
            direction: 0,
            top_wait: 0,
            top_countdown: 30 * TICRATE,
        });
        let id = self.spawn_thinker(body, Action::Think(think::vertical_door));
        let s = &mut self.sectors[sector];
        s.special_data = Some(id);
        s.special = 0;
        Some(id)
    }

    /// Door that opens after 5 minutes.
    #[track_caller]
    pub fn spawn_door_raise_in_5_mins(&mut self, sector: usize) -> Option<ThinkerId> {
        self.sectors.get(sector)?;
        let top_height = find_lowest_ceiling_surrounding(&self.sectors, sector) - 4 * FRACUNIT;
        let body = Body::Door(Door {
            kind: DoorKind::RaiseIn5Mins,
            sector,
            top_height,
            speed: VDOORSPEED,
            direction: 2,
            top_wait: VDOORWAIT,
            top_countdown: 5 * 60 * TICRATE,
        });
        let id = self.spawn_thinker(body, Action::Think(think::vertical_door));
        let s = &mut self.sectors[sector];
        s.special_data = Some(id);
        s.special = 0;
        Some(id)
    }

    /// Spawn the effect thinkers requested by sector special numbers.
    ///
    /// Returns the number of thinkers spawned.
    #[track_caller]
    pub fn spawn_specials(&mut self) -> usize {
        let mut spawned = 0;
        for index in 0..self.sectors.len() {
            let id = match self.sectors[index].special {
                1 => self.spawn_light_flash(index),
                2 => self.spawn_strobe(index, FASTDARK, false),
                3 => self.spawn_strobe(index, SLOWDARK, false),
                4 => {
                    let id = self.spawn_strobe(index, FASTDARK, false);
                    self.sectors[index].special = 4;
                    id
                }
                8 => self.spawn_glow(index),
                10 => self.spawn_door_close_in_30(index),
                12 => self.spawn_strobe(index, SLOWDARK, true),
                13 => self.spawn_strobe(index, FASTDARK, true),
                14 => self.spawn_door_raise_in_5_mins(index),
                17 => self.spawn_fire_flicker(index),
                _ => None,
            };
            spawned += usize::from(id.is_some());
        }
        log::debug!("spawned {spawned} sector specials");
        spawned
    }

    // ── Tag triggers ───────────────────────────────────────────────

    /// Indices of sectors tagged `tag`.
    pub fn sectors_with_tag(&self, tag: i16) -> SectorIds {
        self.sectors
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tag == tag)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sectors tagged `tag` that have no moving-plane special attached.
    fn idle_sectors_with_tag(&self, tag: i16) -> SectorIds {
        self.sectors_with_tag(tag)
            .into_iter()
            .filter(|&i| self.sectors[i].special_data.is_none())
            .collect()
    }

    #[track_caller]
    fn attach_special(&mut self, sector: usize, body: Body) -> ThinkerId {
        let id = self.spawn_thinker(body, Action::Think(think::action_for(&body)));
        self.sectors[sector].special_data = Some(id);
        id
    }

    /// Start ceiling movers in every idle sector tagged `tag`.
    #[track_caller]
    pub fn do_ceiling(&mut self, tag: i16, kind: CeilingKind) -> bool {
        let mut started = false;
        if kind.is_perpetual() {
            started |= self.activate_in_stasis_ceiling(tag);
        }
        for index in self.idle_sectors_with_tag(tag) {
            let s = &self.sectors[index];
            let (floor, ceiling) = (s.floor_height, s.ceiling_height);
            let mut c = Ceiling {
                kind,
                sector: index,
                bottom_height: floor,
                top_height: ceiling,
                speed: CEILSPEED,
                crush: false,
                direction: -1,
                tag: s.tag,
                old_direction: 0,
            };
            match kind {
                CeilingKind::FastCrushAndRaise => {
                    c.crush = true;
                    c.bottom_height = floor + 8 * FRACUNIT;
                    c.speed = CEILSPEED * 2;
                }
                CeilingKind::SilentCrushAndRaise
                | CeilingKind::CrushAndRaise
                | CeilingKind::LowerAndCrush => {
                    c.crush = kind != CeilingKind::LowerAndCrush;
                    c.bottom_height = floor + 8 * FRACUNIT;
                }
                CeilingKind::LowerToFloor => {}
                CeilingKind::RaiseToHighest => {
                    c.top_height = find_highest_ceiling_surrounding(&self.sectors, index);
                    c.direction = 1;
                }
            }
            let id = self.attach_special(index, Body::Ceiling(c));
            self.add_active_ceiling(id);
            started = true;
        }
        started
    }

    /// Start doors in every idle sector tagged `tag`.
    #[track_caller]
    pub fn do_door(&mut self, tag: i16, kind: DoorKind) -> bool {
        let mut started = false;
        for index in self.idle_sectors_with_tag(tag) {
            let lowest = find_lowest_ceiling_surrounding(&self.sectors, index) - 4 * FRACUNIT;
            let mut d = Door {
                kind,
                sector: index,
                top_height: lowest,
                speed: VDOORSPEED,
                direction: 1,
                top_wait: VDOORWAIT,
                top_countdown: 0,
            };
            match kind {
                DoorKind::BlazeClose => {
                    d.direction = -1;
                    d.speed = VDOORSPEED * 4;
                }
                DoorKind::Close => d.direction = -1,
                DoorKind::Close30ThenOpen => {
                    d.top_height = self.sectors[index].ceiling_height;
                    d.direction = -1;
                }
                DoorKind::BlazeRaise | DoorKind::BlazeOpen => d.speed = VDOORSPEED * 4,
                DoorKind::Normal | DoorKind::Open => {}
                DoorKind::RaiseIn5Mins => {
                    d.direction = 2;
                    d.top_countdown = 5 * 60 * TICRATE;
                }
            }
            self.attach_special(index, Body::Door(d));
            started = true;
        }
        started
    }

    /// Start floor movers in every idle sector tagged `tag`.
    ///
    /// [`FloorKind::RaiseToTexture`] and [`FloorKind::DonutRaise`] depend on
    /// line geometry and start nothing.
    #[track_caller]
    pub fn do_floor(&mut self, tag: i16, kind: FloorKind) -> bool {
        if matches!(kind, FloorKind::RaiseToTexture | FloorKind::DonutRaise) {
            log::debug!("floor kind {kind:?} needs line geometry; ignored");
            return false;
        }
        let mut started = false;
        for index in self.idle_sectors_with_tag(tag) {
            let s = &self.sectors[index];
            let (floor_height, ceiling_height) = (s.floor_height, s.ceiling_height);
            let mut f = Floor {
                kind,
                crush: false,
                sector: index,
                direction: 1,
                new_special: 0,
                texture: s.floor_pic,
                dest_height: floor_height,
                speed: FLOORSPEED,
            };
            let sectors = &self.sectors;
            match kind {
                FloorKind::LowerFloor => {
                    f.direction = -1;
                    f.dest_height = find_highest_floor_surrounding(sectors, index);
                }
                FloorKind::LowerFloorToLowest => {
                    f.direction = -1;
                    f.dest_height = find_lowest_floor_surrounding(sectors, index);
                }
                FloorKind::TurboLower => {
                    f.direction = -1;
                    f.speed = FLOORSPEED * 4;
                    f.dest_height = find_highest_floor_surrounding(sectors, index);
                    if f.dest_height != floor_height {
                        f.dest_height += 8 * FRACUNIT;
                    }
                }
                FloorKind::RaiseFloor | FloorKind::RaiseFloorCrush => {
                    f.crush = kind == FloorKind::RaiseFloorCrush;
                    f.dest_height =
                        find_lowest_ceiling_surrounding(sectors, index).min(ceiling_height);
                    if f.crush {
                        f.dest_height -= 8 * FRACUNIT;
                    }
                }
                FloorKind::RaiseFloorTurbo | FloorKind::RaiseFloorToNearest => {
                    if kind == FloorKind::RaiseFloorTurbo {
                        f.speed = FLOORSPEED * 4;
                    }
                    f.dest_height = find_next_highest_floor(sectors, index, floor_height);
                }
                FloorKind::RaiseFloor24 | FloorKind::RaiseFloor24AndChange => {
                    f.dest_height = floor_height + 24 * FRACUNIT;
                }
                FloorKind::RaiseFloor512 => f.dest_height = floor_height + 512 * FRACUNIT,
                FloorKind::LowerAndChange => {
                    f.direction = -1;
                    f.dest_height = find_lowest_floor_surrounding(sectors, index);
                    let source = sectors[index]
                        .neighbors
                        .iter()
                        .filter_map(|&n| sectors.get(n))
                        .find(|n| n.floor_height == f.dest_height);
                    if let Some(n) = source {
                        f.texture = n.floor_pic;
                        f.new_special = i32::from(n.special);
                    }
                }
                FloorKind::RaiseToTexture | FloorKind::DonutRaise => {}
            }
            self.attach_special(index, Body::Floor(f));
            started = true;
        }
        started
    }

    /// Start platforms in every idle sector tagged `tag`. `amount` is the
    /// rise in map units for [`PlatKind::RaiseAndChange`].
    #[track_caller]
    pub fn do_plat(&mut self, tag: i16, kind: PlatKind, amount: i32) -> bool {
        let mut started = false;
        if kind == PlatKind::PerpetualRaise {
            started |= self.activate_in_stasis_plat(tag);
        }
        for index in self.idle_sectors_with_tag(tag) {
            let floor = self.sectors[index].floor_height;
            let mut p = Plat {
                sector: index,
                speed: PLATSPEED,
                low: floor,
                high: floor,
                wait: 0,
                count: 0,
                status: PlatStatus::Up,
                old_status: PlatStatus::Up,
                crush: false,
                tag,
                kind,
            };
            match kind {
                PlatKind::RaiseToNearestAndChange => {
                    p.speed = PLATSPEED / 2;
                    p.high = find_next_highest_floor(&self.sectors, index, floor);
                    self.sectors[index].special = 0;
                }
                PlatKind::RaiseAndChange => {
                    p.speed = PLATSPEED / 2;
                    p.high = floor + amount * FRACUNIT;
                }
                PlatKind::DownWaitUpStay | PlatKind::BlazeDwus => {
                    p.speed = if kind == PlatKind::BlazeDwus {
                        PLATSPEED * 8
                    } else {
                        PLATSPEED * 4
                    };
                    p.low = find_lowest_floor_surrounding(&self.sectors, index).min(floor);
                    p.wait = TICRATE * PLATWAIT;
                    p.status = PlatStatus::Down;
                }
                PlatKind::PerpetualRaise => {
                    p.low = find_lowest_floor_surrounding(&self.sectors, index).min(floor);
                    p.high = find_highest_floor_surrounding(&self.sectors, index).max(floor);
                    p.wait = TICRATE * PLATWAIT;
                    p.status = if self.random() & 1 == 1 {
                        PlatStatus::Down
                    } else {
                        PlatStatus::Up
                    };
                }
            }
            let id = self.attach_special(index, Body::Plat(p));
            self.add_active_plat(id);
            started = true;
        }
        started
    }

    // ── Active tables and stasis ───────────────────────────────────

    /// Track a ceiling so stop and resume triggers can find it.
    pub fn add_active_ceiling(&mut self, id: ThinkerId) -> bool {
        match self.ceilings.add(id) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("{e}; ceiling {id} is untracked");
                false
            }
        }
    }

    /// Track a platform so stop and resume triggers can find it.
    pub fn add_active_plat(&mut self, id: ThinkerId) -> bool {
        match self.plats.add(id) {
            Ok(_) => true,
            Err(e) => {
                log::warn!("{e}; plat {id} is untracked");
                false
            }
        }
    }

    /// Retire a ceiling: drop it from the table, detach it from its sector
    /// and mark it for removal.
    pub fn remove_active_ceiling(&mut self, id: ThinkerId) {
        self.ceilings.remove(id);
        self.retire_special(id);
    }

    /// Retire a platform: drop it from the table, detach it from its
    /// sector and mark it for removal.
    pub fn remove_active_plat(&mut self, id: ThinkerId) {
        self.plats.remove(id);
        self.retire_special(id);
    }

    /// Detach a special from its sector and mark it for removal.
    pub fn retire_special(&mut self, id: ThinkerId) {
        let sector = self.body(id).and_then(Body::sector);
        if let Some(s) = sector.and_then(|i| self.sectors.get_mut(i)) {
            if s.special_data == Some(id) {
                s.special_data = None;
            }
        }
        self.thinkers.remove(id);
    }

    /// Park a record: it stays linked but its callback is not called.
    pub fn stop_moving(&mut self, id: ThinkerId) -> bool {
        self.thinkers.set_action(id, Action::Empty)
    }

    /// Restore the callback of a parked record.
    pub fn start_moving(&mut self, id: ThinkerId) -> bool {
        let Some(body) = self.body(id).copied() else {
            return false;
        };
        self.thinkers
            .set_action(id, Action::Think(think::action_for(&body)))
    }

    /// Active ceilings tagged `tag`, in table order.
    pub fn ceilings_with_tag(&self, tag: i16) -> TaggedIds {
        self.ceilings
            .iter()
            .filter(|&id| matches!(self.body(id), Some(Body::Ceiling(c)) if c.tag == tag))
            .collect()
    }

    /// Active platforms tagged `tag`, in table order.
    pub fn plats_with_tag(&self, tag: i16) -> TaggedIds {
        self.plats
            .iter()
            .filter(|&id| matches!(self.body(id), Some(Body::Plat(p)) if p.tag == tag))
            .collect()
    }

    /// Park every moving crusher tagged `tag`.
    pub fn crush_stop(&mut self, tag: i16) -> bool {
        let mut stopped = false;
        for id in self.ceilings_with_tag(tag) {
            let Some(Body::Ceiling(c)) = self.body_mut(id) else {
                continue;
            };
            if c.direction == 0 {
                continue;
            }
            c.old_direction = c.direction;
            c.direction = 0;
            self.stop_moving(id);
            stopped = true;
        }
        stopped
    }

    /// Resume every crusher tagged `tag` parked by [`crush_stop`](Self::crush_stop).
    pub fn activate_in_stasis_ceiling(&mut self, tag: i16) -> bool {
        let mut resumed = false;
        for id in self.ceilings_with_tag(tag) {
            let Some(Body::Ceiling(c)) = self.body_mut(id) else {
                continue;
            };
            if c.direction != 0 {
                continue;
            }
            c.direction = c.old_direction;
            self.start_moving(id);
            resumed = true;
        }
        resumed
    }

    /// Park every moving platform tagged `tag`.
    pub fn stop_plat(&mut self, tag: i16) -> bool {
        let mut stopped = false;
        for id in self.plats_with_tag(tag) {
            let Some(Body::Plat(p)) = self.body_mut(id) else {
                continue;
            };
            if p.status == PlatStatus::InStasis {
                continue;
            }
            p.old_status = p.status;
            p.status = PlatStatus::InStasis;
            self.stop_moving(id);
            stopped = true;
        }
        stopped
    }

    /// Resume every platform tagged `tag` parked by [`stop_plat`](Self::stop_plat).
    pub fn activate_in_stasis_plat(&mut self, tag: i16) -> bool {
        let mut resumed = false;
        for id in self.plats_with_tag(tag) {
            let Some(Body::Plat(p)) = self.body_mut(id) else {
                continue;
            };
            if p.status != PlatStatus::InStasis {
                continue;
            }
            p.status = p.old_status;
            self.start_moving(id);
            resumed = true;
        }
        resumed
    }

    // ── Diagnostics ────────────────────────────────────────────────

    /// Rebind a record to the callback registered as `name`.
    ///
    /// The callback must be the one that drives the record's body; any
    /// other is refused and the record keeps its current action.
    pub fn set_action_by_name(&mut self, id: ThinkerId, name: &str) -> bool {
        let Some(f) = self.registry.lookup(name) else {
            log::warn!("no level callback named {name:?}");
            return false;
        };
        let Some(t) = self.thinkers.get(id) else {
            return false;
        };
        if !std::ptr::fn_addr_eq(f, think::action_for(&t.body)) {
            log::warn!("callback {name:?} does not match the body of thinker {id}");
            return false;
        }
        self.thinkers.set_action(id, Action::Think(f))
    }

    /// Write one line per thinker: id, callback name and payload.
    pub fn dump_thinkers(&self, out: &mut dyn io::Write) -> io::Result<()> {
        writeln!(out, "level time: {}  thinkers: {}", self.time.0, self.thinkers.len())?;
        for (id, t) in self.thinkers.records() {
            writeln!(out, "{id} {} {}", self.registry.describe(&t.action), t.body)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("time", &self.time)
            .field("sectors", &self.sectors.len())
            .field("thinkers", &self.thinkers)
            .field("ceilings", &self.ceilings.len())
            .field("plats", &self.plats.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rove_zone::ZoneConfig;

    fn level() -> Level {
        let mut level = Level::new(&LevelConfig::new(ZoneConfig::new(256 * 1024)).with_seed(7)).unwrap();
        level.load_sectors(vec![
            Sector::new(0, 128, 192).with_tag(1).with_neighbors([1]),
            Sector::new(-32, 160, 96).with_neighbors([0]),
        ]);
        level
    }

    #[test]
    fn rng_is_deterministic_per_seed() {
        let mut a = level();
        let mut b = level();
        let xs: Vec<_> = (0..16).map(|_| a.random()).collect();
        let ys: Vec<_> = (0..16).map(|_| b.random()).collect();
        assert_eq!(xs, ys);
        assert!(xs.iter().all(|&x| (0..256).contains(&x)));
    }

    #[test]
    fn specials_use_levspec_and_mobjs_use_level() {
        let mut l = level();
        let glow = l.spawn_glow(0).unwrap();
        let mobj = l.spawn_mobj(Mobj::default());
        let tag_of = |l: &Level, id| {
            let block = l.thinkers.get(id).unwrap().block();
            l.mem.block_info(block).unwrap().tag
        };
        assert_eq!(tag_of(&l, glow), Some(PurgeTag::LevSpec));
        assert_eq!(tag_of(&l, mobj), Some(PurgeTag::Level));
    }

    #[test]
    fn busy_sector_is_skipped() {
        let mut l = level();
        assert!(l.do_door(1, DoorKind::Normal));
        assert!(!l.do_door(1, DoorKind::Normal));
        assert!(!l.do_floor(1, FloorKind::RaiseFloor24));
        assert_eq!(l.thinkers.len(), 1);
    }

    #[test]
    fn free_level_releases_everything_level_scoped() {
        let mut l = level();
        let before_sectors = l.mem.total_free_bytes();
        l.do_ceiling(1, CeilingKind::CrushAndRaise);
        l.spawn_mobj(Mobj::default());
        l.tick();
        l.free_level();
        assert!(l.thinkers.is_empty());
        assert!(l.active_ceilings().is_empty());
        assert!(l.sectors().is_empty());
        assert!(l.mem.total_free_bytes() > before_sectors);
        l.mem.check();
    }

    #[test]
    fn dump_names_callbacks() {
        let mut l = level();
        l.spawn_glow(0);
        let mut out = Vec::new();
        l.dump_thinkers(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Glow glow @ sector 0"), "{text}");
    }

    #[test]
    fn set_action_by_name_rebinds() {
        let mut l = level();
        let id = l.spawn_glow(0).unwrap();
        assert!(l.thinkers.set_action(id, Action::Empty));
        assert!(l.set_action_by_name(id, "Glow"));
        assert_eq!(l.registry().describe(&l.thinkers.action(id).unwrap()), "Glow");
        assert!(!l.set_action_by_name(id, "Bogus"));
    }

    #[test]
    fn set_action_by_name_refuses_a_mismatched_callback() {
        let mut l = level();
        let id = l.spawn_glow(0).unwrap();
        assert!(!l.set_action_by_name(id, "FireFlicker"));
        assert!(!l.set_action_by_name(id, "MoveCeiling"));
        assert_eq!(l.thinkers.action(id), Some(Action::Think(think::glow)));
        let before = l.sectors()[0].light_level;
        l.tick();
        assert_ne!(l.sectors()[0].light_level, before);
    }
}
