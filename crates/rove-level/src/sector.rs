//! Sectors and plane movement.

use rove_core::ThinkerId;
use smallvec::SmallVec;

/// 16.16 fixed-point map unit.
pub type Fixed = i32;

/// Fractional bits in a [`Fixed`].
pub const FRACBITS: u32 = 16;

/// One map unit as a [`Fixed`].
pub const FRACUNIT: Fixed = 1 << FRACBITS;

/// Fixed-point product.
pub fn fixed_mul(a: Fixed, b: Fixed) -> Fixed {
    ((i64::from(a) * i64::from(b)) >> FRACBITS) as Fixed
}

/// A map sector: a floor, a ceiling and a light level.
///
/// `neighbors` lists the indices of adjacent sectors; the "surrounding"
/// queries below search them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Sector {
    /// Floor height.
    pub floor_height: Fixed,
    /// Ceiling height.
    pub ceiling_height: Fixed,
    /// Floor flat number.
    pub floor_pic: i16,
    /// Ceiling flat number.
    pub ceiling_pic: i16,
    /// Light level, nominally 0..=255.
    pub light_level: i16,
    /// Sector special number.
    pub special: i16,
    /// Trigger tag shared with linedefs.
    pub tag: i16,
    /// The moving-plane special currently attached, if any.
    pub special_data: Option<ThinkerId>,
    /// Indices of adjacent sectors.
    pub neighbors: SmallVec<[usize; 4]>,
}

impl Sector {
    /// A sector with the given plane heights (in whole map units) and light.
    pub fn new(floor: i32, ceiling: i32, light_level: i16) -> Self {
        Self {
            floor_height: floor * FRACUNIT,
            ceiling_height: ceiling * FRACUNIT,
            light_level,
            ..Self::default()
        }
    }

    /// Builder: set the tag.
    pub fn with_tag(mut self, tag: i16) -> Self {
        self.tag = tag;
        self
    }

    /// Builder: set the special number.
    pub fn with_special(mut self, special: i16) -> Self {
        self.special = special;
        self
    }

    /// Builder: set the adjacent sectors.
    pub fn with_neighbors(mut self, neighbors: impl IntoIterator<Item = usize>) -> Self {
        self.neighbors = neighbors.into_iter().collect();
        self
    }
}

fn surrounding(sectors: &[Sector], index: usize) -> impl Iterator<Item = &Sector> + '_ {
    sectors
        .get(index)
        .into_iter()
        .flat_map(|s| s.neighbors.iter())
        .filter_map(move |&n| sectors.get(n))
}

/// Lowest light level among the neighbours of `index`, capped at `max`.
pub fn find_min_surrounding_light(sectors: &[Sector], index: usize, max: i16) -> i16 {
    surrounding(sectors, index)
        .map(|s| s.light_level)
        .fold(max, i16::min)
}

/// Lowest neighbouring floor, or the sector's own floor if lower.
pub fn find_lowest_floor_surrounding(sectors: &[Sector], index: usize) -> Fixed {
    let own = sectors.get(index).map_or(0, |s| s.floor_height);
    surrounding(sectors, index)
        .map(|s| s.floor_height)
        .fold(own, Fixed::min)
}

/// Highest neighbouring floor, or `-500` units if there are no neighbours.
pub fn find_highest_floor_surrounding(sectors: &[Sector], index: usize) -> Fixed {
    surrounding(sectors, index)
        .map(|s| s.floor_height)
        .fold(-500 * FRACUNIT, Fixed::max)
}

/// Lowest neighbouring floor strictly above `height`, or `height` itself.
pub fn find_next_highest_floor(sectors: &[Sector], index: usize, height: Fixed) -> Fixed {
    surrounding(sectors, index)
        .map(|s| s.floor_height)
        .filter(|&h| h > height)
        .min()
        .unwrap_or(height)
}

/// Highest neighbouring ceiling, or `0` if there are no neighbours.
pub fn find_highest_ceiling_surrounding(sectors: &[Sector], index: usize) -> Fixed {
    surrounding(sectors, index)
        .map(|s| s.ceiling_height)
        .fold(0, Fixed::max)
}

/// Lowest neighbouring ceiling, or `i32::MAX` if there are no neighbours.
pub fn find_lowest_ceiling_surrounding(sectors: &[Sector], index: usize) -> Fixed {
    surrounding(sectors, index)
        .map(|s| s.ceiling_height)
        .fold(Fixed::MAX, Fixed::min)
}

/// Which plane of a sector moves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    /// The floor.
    Floor,
    /// The ceiling.
    Ceiling,
}

/// Outcome of one plane movement step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveResult {
    /// Moved by `speed`.
    Ok,
    /// The plane would pass through the opposite plane.
    Crushed,
    /// The destination was reached (the plane is now exactly at it).
    PastDest,
}

/// Move one plane of `sector` by `speed` toward `dest`.
///
/// `direction` is `1` for up and `-1` for down. A plane that would pass the
/// opposite plane reports [`MoveResult::Crushed`]; it keeps moving only if
/// `crush` is set.
pub fn move_plane(
    sector: &mut Sector,
    speed: Fixed,
    dest: Fixed,
    crush: bool,
    plane: Plane,
    direction: i32,
) -> MoveResult {
    match (plane, direction) {
        (Plane::Floor, -1) => {
            if sector.floor_height.saturating_sub(speed) < dest {
                sector.floor_height = dest;
                MoveResult::PastDest
            } else {
                sector.floor_height -= speed;
                MoveResult::Ok
            }
        }
        (Plane::Floor, 1) => {
            let next = sector.floor_height.saturating_add(speed);
            if next > dest {
                sector.floor_height = dest;
                MoveResult::PastDest
            } else if next > sector.ceiling_height {
                if crush {
                    sector.floor_height = next;
                }
                MoveResult::Crushed
            } else {
                sector.floor_height = next;
                MoveResult::Ok
            }
        }
        (Plane::Ceiling, -1) => {
            let next = sector.ceiling_height.saturating_sub(speed);
            if next < dest {
                sector.ceiling_height = dest;
                MoveResult::PastDest
            } else if next < sector.floor_height {
                if crush {
                    sector.ceiling_height = next;
                }
                MoveResult::Crushed
            } else {
                sector.ceiling_height = next;
                MoveResult::Ok
            }
        }
        (Plane::Ceiling, 1) => {
            if sector.ceiling_height.saturating_add(speed) > dest {
                sector.ceiling_height = dest;
                MoveResult::PastDest
            } else {
                sector.ceiling_height += speed;
                MoveResult::Ok
            }
        }
        _ => MoveResult::Ok,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ring() -> Vec<Sector> {
        vec![
            Sector::new(0, 128, 160).with_neighbors([1, 2]),
            Sector::new(-16, 96, 96).with_neighbors([0]),
            Sector::new(32, 200, 200).with_neighbors([0]),
        ]
    }

    #[test]
    fn surrounding_queries() {
        let s = ring();
        assert_eq!(find_min_surrounding_light(&s, 0, 160), 96);
        assert_eq!(find_min_surrounding_light(&s, 0, 50), 50);
        assert_eq!(find_lowest_floor_surrounding(&s, 0), -16 * FRACUNIT);
        assert_eq!(find_highest_floor_surrounding(&s, 0), 32 * FRACUNIT);
        assert_eq!(find_next_highest_floor(&s, 0, 0), 32 * FRACUNIT);
        assert_eq!(find_highest_ceiling_surrounding(&s, 0), 200 * FRACUNIT);
        assert_eq!(find_lowest_ceiling_surrounding(&s, 0), 96 * FRACUNIT);
    }

    #[test]
    fn fixed_mul_scales() {
        assert_eq!(fixed_mul(3 * FRACUNIT, FRACUNIT / 2), 3 * FRACUNIT / 2);
        assert_eq!(fixed_mul(-FRACUNIT, 0xe800), -0xe800);
    }

    #[test]
    fn floor_reaches_destination_exactly() {
        let mut s = Sector::new(0, 128, 160);
        let dest = 3 * FRACUNIT / 2;
        assert_eq!(move_plane(&mut s, FRACUNIT, dest, false, Plane::Floor, 1), MoveResult::Ok);
        assert_eq!(
            move_plane(&mut s, FRACUNIT, dest, false, Plane::Floor, 1),
            MoveResult::PastDest
        );
        assert_eq!(s.floor_height, dest);
    }

    #[test]
    fn ceiling_stops_at_floor_unless_crushing() {
        let mut s = Sector::new(0, 1, 160);
        let dest = -8 * FRACUNIT;
        assert_eq!(
            move_plane(&mut s, 2 * FRACUNIT, dest, false, Plane::Ceiling, -1),
            MoveResult::Crushed
        );
        assert_eq!(s.ceiling_height, FRACUNIT);
        assert_eq!(
            move_plane(&mut s, 2 * FRACUNIT, dest, true, Plane::Ceiling, -1),
            MoveResult::Crushed
        );
        assert_eq!(s.ceiling_height, -FRACUNIT);
    }
}
