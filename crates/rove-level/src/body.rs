//! Thinker payloads for the reference level.
//!
//! Every struct lists its fields in the order the save codec writes them.
//! Sector references are indices into [`Level::sectors`](crate::Level::sectors).

use std::fmt;

use rove_core::ThinkerId;

use crate::sector::Fixed;

// ── Movement kinds ──────────────────────────────────────────────

/// What a ceiling mover does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum CeilingKind {
    /// Lower to the floor and stop.
    LowerToFloor = 0,
    /// Raise to the highest neighbouring ceiling and stop.
    RaiseToHighest = 1,
    /// Lower to 8 units above the floor, crushing, and stop.
    LowerAndCrush = 2,
    /// Crush down and back up forever.
    CrushAndRaise = 3,
    /// As [`CrushAndRaise`](Self::CrushAndRaise), at double speed.
    FastCrushAndRaise = 4,
    /// As [`CrushAndRaise`](Self::CrushAndRaise), without sound.
    SilentCrushAndRaise = 5,
}

impl CeilingKind {
    /// Every kind, in code order.
    pub const ALL: [CeilingKind; 6] = [
        Self::LowerToFloor,
        Self::RaiseToHighest,
        Self::LowerAndCrush,
        Self::CrushAndRaise,
        Self::FastCrushAndRaise,
        Self::SilentCrushAndRaise,
    ];

    /// Stored integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a stored integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }

    /// Whether the mover keeps cycling instead of retiring.
    pub fn is_perpetual(self) -> bool {
        matches!(
            self,
            Self::CrushAndRaise | Self::FastCrushAndRaise | Self::SilentCrushAndRaise
        )
    }
}

/// What a door does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum DoorKind {
    /// Open, wait, close.
    Normal = 0,
    /// Close, wait 30 seconds, open.
    Close30ThenOpen = 1,
    /// Close and stay closed.
    Close = 2,
    /// Open and stay open.
    Open = 3,
    /// Wait 5 minutes, then behave as [`Normal`](Self::Normal).
    RaiseIn5Mins = 4,
    /// Fast open, wait, close.
    BlazeRaise = 5,
    /// Fast open.
    BlazeOpen = 6,
    /// Fast close.
    BlazeClose = 7,
}

impl DoorKind {
    /// Every kind, in code order.
    pub const ALL: [DoorKind; 8] = [
        Self::Normal,
        Self::Close30ThenOpen,
        Self::Close,
        Self::Open,
        Self::RaiseIn5Mins,
        Self::BlazeRaise,
        Self::BlazeOpen,
        Self::BlazeClose,
    ];

    /// Stored integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a stored integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

/// What a floor mover does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum FloorKind {
    /// Lower to the highest neighbouring floor.
    LowerFloor = 0,
    /// Lower to the lowest neighbouring floor.
    LowerFloorToLowest = 1,
    /// Fast lower to 8 units above the highest neighbouring floor.
    TurboLower = 2,
    /// Raise to the lowest neighbouring ceiling.
    RaiseFloor = 3,
    /// Raise to the next higher neighbouring floor.
    RaiseFloorToNearest = 4,
    /// Raise by the height of the shortest lower texture.
    RaiseToTexture = 5,
    /// Lower to the lowest neighbouring floor and take its special.
    LowerAndChange = 6,
    /// Raise by 24 units.
    RaiseFloor24 = 7,
    /// Raise by 24 units and take a new special.
    RaiseFloor24AndChange = 8,
    /// Raise to 8 units below the lowest neighbouring ceiling, crushing.
    RaiseFloorCrush = 9,
    /// Fast raise to the next higher neighbouring floor.
    RaiseFloorTurbo = 10,
    /// Donut outer ring raise.
    DonutRaise = 11,
    /// Raise by 512 units.
    RaiseFloor512 = 12,
}

impl FloorKind {
    /// Every kind, in code order.
    pub const ALL: [FloorKind; 13] = [
        Self::LowerFloor,
        Self::LowerFloorToLowest,
        Self::TurboLower,
        Self::RaiseFloor,
        Self::RaiseFloorToNearest,
        Self::RaiseToTexture,
        Self::LowerAndChange,
        Self::RaiseFloor24,
        Self::RaiseFloor24AndChange,
        Self::RaiseFloorCrush,
        Self::RaiseFloorTurbo,
        Self::DonutRaise,
        Self::RaiseFloor512,
    ];

    /// Stored integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a stored integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

/// What a platform does.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PlatKind {
    /// Move between the lowest and highest neighbouring floors forever.
    PerpetualRaise = 0,
    /// Lower, wait, rise back and stop.
    DownWaitUpStay = 1,
    /// Raise by a fixed amount and stop.
    RaiseAndChange = 2,
    /// Raise to the next higher neighbouring floor and stop.
    RaiseToNearestAndChange = 3,
    /// Fast [`DownWaitUpStay`](Self::DownWaitUpStay).
    BlazeDwus = 4,
}

impl PlatKind {
    /// Every kind, in code order.
    pub const ALL: [PlatKind; 5] = [
        Self::PerpetualRaise,
        Self::DownWaitUpStay,
        Self::RaiseAndChange,
        Self::RaiseToNearestAndChange,
        Self::BlazeDwus,
    ];

    /// Stored integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a stored integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

/// Where a platform is in its cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum PlatStatus {
    /// Rising.
    Up = 0,
    /// Lowering.
    Down = 1,
    /// Counting down before reversing.
    Waiting = 2,
    /// Stopped by a trigger; resumes from `old_status`.
    InStasis = 3,
}

impl PlatStatus {
    /// Every status, in code order.
    pub const ALL: [PlatStatus; 4] = [Self::Up, Self::Down, Self::Waiting, Self::InStasis];

    /// Stored integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Decode a stored integer code.
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.code() == code)
    }
}

// ── Bodies ──────────────────────────────────────────────────────

/// Spawn record of a map object.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapThing {
    /// Map x.
    pub x: i16,
    /// Map y.
    pub y: i16,
    /// Facing, in degrees.
    pub angle: i16,
    /// Thing type number.
    pub kind: i16,
    /// Skill and multiplayer flags.
    pub options: i16,
}

/// A map object.
///
/// `target` and `tracer` are weak: they name another mobj by id and read as
/// absent once that record is gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Mobj {
    /// Position x.
    pub x: Fixed,
    /// Position y.
    pub y: Fixed,
    /// Position z.
    pub z: Fixed,
    /// Facing, as a binary angle.
    pub angle: u32,
    /// Sprite number.
    pub sprite: i32,
    /// Sprite frame.
    pub frame: i32,
    /// Floor height under the object.
    pub floor_z: Fixed,
    /// Ceiling height over the object.
    pub ceiling_z: Fixed,
    /// Collision radius.
    pub radius: Fixed,
    /// Collision height.
    pub height: Fixed,
    /// Momentum x.
    pub mom_x: Fixed,
    /// Momentum y.
    pub mom_y: Fixed,
    /// Momentum z.
    pub mom_z: Fixed,
    /// Scratch counter for traversal passes.
    pub valid_count: i32,
    /// Object type number.
    pub kind: i32,
    /// Tics left in the current state; `-1` holds the state forever.
    pub tics: i32,
    /// Index into the level's state table; `0` is the null state.
    pub state: u32,
    /// Behaviour flags.
    pub flags: u32,
    /// Hit points.
    pub health: i32,
    /// Movement direction (0..8).
    pub move_dir: i32,
    /// Steps before picking a new direction.
    pub move_count: i32,
    /// Object being chased or attacked.
    pub target: Option<ThinkerId>,
    /// Tics before the first attack.
    pub reaction_time: i32,
    /// Tics to keep chasing the current target.
    pub threshold: i32,
    /// Player number plus one, or `0` for monsters and items.
    pub player: i32,
    /// Player index last looked at.
    pub last_look: i32,
    /// Where the object was spawned from.
    pub spawn_point: MapThing,
    /// Object being tracked by a homing attack.
    pub tracer: Option<ThinkerId>,
}

/// A moving ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ceiling {
    /// What the ceiling does.
    pub kind: CeilingKind,
    /// Index of the affected sector.
    pub sector: usize,
    /// Lowest point of travel.
    pub bottom_height: Fixed,
    /// Highest point of travel.
    pub top_height: Fixed,
    /// Distance moved per tic.
    pub speed: Fixed,
    /// Whether the plane keeps moving into obstructions.
    pub crush: bool,
    /// `1` up, `0` parked, `-1` down.
    pub direction: i32,
    /// Trigger tag, for stop and resume triggers.
    pub tag: i16,
    /// Direction to resume with after a crush stop.
    pub old_direction: i32,
}

/// A door.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    /// What the door does.
    pub kind: DoorKind,
    /// Index of the affected sector.
    pub sector: usize,
    /// Highest point of travel.
    pub top_height: Fixed,
    /// Distance moved per tic.
    pub speed: Fixed,
    /// `1` up, `0` waiting, `-1` down, `2` initial wait.
    pub direction: i32,
    /// Tics to wait at the top.
    pub top_wait: i32,
    /// Tics left of the current wait.
    pub top_countdown: i32,
}

/// A moving floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Floor {
    /// What the floor does.
    pub kind: FloorKind,
    /// Whether the plane keeps moving into obstructions.
    pub crush: bool,
    /// Index of the affected sector.
    pub sector: usize,
    /// `1` up, `-1` down.
    pub direction: i32,
    /// Special applied to the sector on arrival, for changing kinds.
    pub new_special: i32,
    /// Floor picture applied on arrival, for changing kinds.
    pub texture: i16,
    /// Height to stop at.
    pub dest_height: Fixed,
    /// Distance moved per tic.
    pub speed: Fixed,
}

/// A platform (lift).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plat {
    /// Index of the affected sector.
    pub sector: usize,
    /// Distance moved per tic.
    pub speed: Fixed,
    /// Lowest point of travel.
    pub low: Fixed,
    /// Highest point of travel.
    pub high: Fixed,
    /// Tics to wait at either end.
    pub wait: i32,
    /// Tics left of the current wait.
    pub count: i32,
    /// Current phase.
    pub status: PlatStatus,
    /// Phase to resume after stasis.
    pub old_status: PlatStatus,
    /// Whether the plane keeps moving into obstructions.
    pub crush: bool,
    /// Trigger tag, for stop and resume triggers.
    pub tag: i16,
    /// What the platform does.
    pub kind: PlatKind,
}

/// Light that switches between two levels at random intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LightFlash {
    /// Index of the affected sector.
    pub sector: usize,
    /// Tics until the next change.
    pub count: i32,
    /// Bright level.
    pub max_light: i16,
    /// Dark level.
    pub min_light: i16,
    /// Mask for the random bright duration.
    pub max_time: i32,
    /// Mask for the random dark duration.
    pub min_time: i32,
}

/// Light that switches between two levels at fixed intervals.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strobe {
    /// Index of the affected sector.
    pub sector: usize,
    /// Tics until the next change.
    pub count: i32,
    /// Dark level.
    pub min_light: i16,
    /// Bright level.
    pub max_light: i16,
    /// Tics spent dark.
    pub dark_time: i32,
    /// Tics spent bright.
    pub bright_time: i32,
}

/// Light that ramps between two levels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Glow {
    /// Index of the affected sector.
    pub sector: usize,
    /// Dark level.
    pub min_light: i16,
    /// Bright level.
    pub max_light: i16,
    /// `1` brightening, `-1` dimming.
    pub direction: i32,
}

/// Light that flickers like fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FireFlicker {
    /// Index of the affected sector.
    pub sector: usize,
    /// Tics until the next change.
    pub count: i32,
    /// Bright level.
    pub max_light: i16,
    /// Dark level.
    pub min_light: i16,
}

/// Payload of a level thinker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Body {
    /// A map object.
    Mobj(Mobj),
    /// A moving ceiling.
    Ceiling(Ceiling),
    /// A door.
    Door(Door),
    /// A moving floor.
    Floor(Floor),
    /// A platform.
    Plat(Plat),
    /// A flashing light.
    LightFlash(LightFlash),
    /// A strobing light.
    Strobe(Strobe),
    /// A glowing light.
    Glow(Glow),
    /// A flickering light.
    FireFlicker(FireFlicker),
}

impl Body {
    /// Whether this is a map object.
    pub fn is_mobj(&self) -> bool {
        matches!(self, Body::Mobj(_))
    }

    /// The sector a special acts on; `None` for mobjs.
    pub fn sector(&self) -> Option<usize> {
        match self {
            Body::Mobj(_) => None,
            Body::Ceiling(c) => Some(c.sector),
            Body::Door(d) => Some(d.sector),
            Body::Floor(f) => Some(f.sector),
            Body::Plat(p) => Some(p.sector),
            Body::LightFlash(l) => Some(l.sector),
            Body::Strobe(s) => Some(s.sector),
            Body::Glow(g) => Some(g.sector),
            Body::FireFlicker(f) => Some(f.sector),
        }
    }

    /// Short lowercase name of the payload kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Body::Mobj(_) => "mobj",
            Body::Ceiling(_) => "ceiling",
            Body::Door(_) => "door",
            Body::Floor(_) => "floor",
            Body::Plat(_) => "plat",
            Body::LightFlash(_) => "flash",
            Body::Strobe(_) => "strobe",
            Body::Glow(_) => "glow",
            Body::FireFlicker(_) => "fireflicker",
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sector() {
            Some(sector) => write!(f, "{} @ sector {sector}", self.kind_name()),
            None => f.write_str(self.kind_name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for k in FloorKind::ALL {
            assert_eq!(FloorKind::from_code(k.code()), Some(k));
        }
        assert_eq!(CeilingKind::from_code(6), None);
        assert_eq!(DoorKind::from_code(-1), None);
        assert_eq!(PlatStatus::from_code(3), Some(PlatStatus::InStasis));
    }

    #[test]
    fn display_names_sector() {
        let g = Body::Glow(Glow {
            sector: 4,
            min_light: 0,
            max_light: 0,
            direction: -1,
        });
        assert_eq!(g.to_string(), "glow @ sector 4");
        assert_eq!(Body::Mobj(Mobj::default()).to_string(), "mobj");
        assert!(!g.is_mobj());
    }
}
