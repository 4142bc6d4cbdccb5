//! The quadbin cell id codec.
//!
//! A [`CellId`] packs a `(zoom, x, y)` tile coordinate into a single sortable
//! `u64` using the quadbin layout:
//!
//! - bit 63: always 0
//! - bit 62: header, always 1
//! - bits 59–61: mode, always 1 (tile cell)
//! - bits 57–58: always 0
//! - bits 52–56: zoom level
//! - below that: x and y bits interleaved (x even, y odd), left-aligned
//! - all remaining low bits: 1
//!
//! Sorting ids ascending therefore groups cells by zoom and, within one zoom,
//! by position on the Z-order curve, so numerically adjacent ids are spatial
//! neighbors. Id `0` never encodes a tile; it is reserved for the metadata
//! record of a table.

use super::TileCoord;
use crate::TilequetError;
use anyhow::Result;
use std::fmt;

/// Highest zoom level that fits the 52 interleaved coordinate bits.
pub const MAX_ZOOM: u8 = 26;

const HEADER: u64 = 0x4000_0000_0000_0000;
const MODE_TILE: u64 = 1;
const FOOTER: u64 = 0xF_FFFF_FFFF_FFFF;

/// A 64-bit quadbin cell identifier.
///
/// ```rust
/// use tilequet_core::{CellId, TileCoord};
///
/// let id = CellId::encode(&TileCoord::new(4, 9, 8).unwrap()).unwrap();
/// assert_eq!(id.as_u64(), 5209574053332910079);
/// assert_eq!(id.decode().unwrap(), TileCoord::new(4, 9, 8).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellId(u64);

impl CellId {
	/// Wraps a raw id without validation. Use [`CellId::decode`] to check it.
	pub const fn new(id: u64) -> CellId {
		CellId(id)
	}

	/// The reserved id of the metadata record.
	pub const fn metadata() -> CellId {
		CellId(0)
	}

	pub const fn as_u64(&self) -> u64 {
		self.0
	}

	pub const fn is_metadata(&self) -> bool {
		self.0 == 0
	}

	/// Encodes a tile coordinate.
	///
	/// Fails with a domain error if `level > 26` or `x`/`y` do not fit the
	/// level. Out-of-range coordinates are never clamped; a wrong silent
	/// mapping would corrupt spatial locality irrecoverably.
	pub fn encode(coord: &TileCoord) -> Result<CellId> {
		let z = coord.level;
		if z > MAX_ZOOM {
			return Err(TilequetError::domain(format!(
				"zoom level {z} exceeds the maximum of {MAX_ZOOM}"
			)));
		}
		let n = 1u64 << z;
		if u64::from(coord.x) >= n || u64::from(coord.y) >= n {
			return Err(TilequetError::domain(format!(
				"tile x/y ({}, {}) outside zoom level {z} bounds (0..{n})",
				coord.x, coord.y
			)));
		}

		let xs = spread(u64::from(coord.x) << (32 - u32::from(z)));
		let ys = spread(u64::from(coord.y) << (32 - u32::from(z)));

		Ok(CellId(
			HEADER | (MODE_TILE << 59) | (u64::from(z) << 52) | ((xs | (ys << 1)) >> 12) | (FOOTER >> (2 * u16::from(z))),
		))
	}

	/// Decodes the id back into a tile coordinate.
	///
	/// Every fixed bit field is verified; any id that [`CellId::encode`]
	/// cannot produce (including `0`) is a domain error, not a best-effort
	/// guess.
	pub fn decode(&self) -> Result<TileCoord> {
		let z = self.checked_zoom()?;
		let q = (self.0 & FOOTER) << 12;
		let x = (squash(q) >> (32 - u32::from(z))) as u32;
		let y = (squash(q >> 1) >> (32 - u32::from(z))) as u32;
		TileCoord::new(z, x, y)
	}

	/// Cheap partial decode returning only the zoom level.
	///
	/// Performs the same bit field validation as [`CellId::decode`] and
	/// agrees with it for every valid id.
	pub fn zoom(&self) -> Result<u8> {
		self.checked_zoom()
	}

	/// The numeric distance between ids of horizontally adjacent even-x tiles
	/// at the given zoom, i.e. the resolution of the interleaved payload.
	pub const fn min_step(zoom: u8) -> u64 {
		1 << (52 - 2 * zoom)
	}

	fn checked_zoom(&self) -> Result<u8> {
		let id = self.0;
		if id == 0 {
			return Err(TilequetError::domain(
				"cell id 0 is reserved for the metadata record",
			));
		}
		if id >> 63 != 0 || id & HEADER == 0 {
			return Err(TilequetError::domain(format!("invalid header bits in cell id {id}")));
		}
		if (id >> 59) & 0x7 != MODE_TILE {
			return Err(TilequetError::domain(format!("cell id {id} is not a tile cell")));
		}
		if (id >> 57) & 0x3 != 0 {
			return Err(TilequetError::domain(format!("invalid reserved bits in cell id {id}")));
		}
		let z = ((id >> 52) & 0x1F) as u8;
		if z > MAX_ZOOM {
			return Err(TilequetError::domain(format!(
				"cell id {id} declares zoom {z}, which exceeds the maximum of {MAX_ZOOM}"
			)));
		}
		let footer = FOOTER >> (2 * u16::from(z));
		if id & footer != footer {
			return Err(TilequetError::domain(format!("invalid footer bits in cell id {id}")));
		}
		Ok(z)
	}
}

impl fmt::Debug for CellId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self.decode() {
			Ok(coord) => write!(f, "CellId({} -> {:?})", self.0, coord),
			Err(_) => write!(f, "CellId({})", self.0),
		}
	}
}

impl fmt::Display for CellId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl From<CellId> for u64 {
	fn from(id: CellId) -> u64 {
		id.0
	}
}

/// Spreads the lower 32 bits of `v` onto the even bit positions.
fn spread(mut v: u64) -> u64 {
	v = (v | (v << 16)) & 0x0000_FFFF_0000_FFFF;
	v = (v | (v << 8)) & 0x00FF_00FF_00FF_00FF;
	v = (v | (v << 4)) & 0x0F0F_0F0F_0F0F_0F0F;
	v = (v | (v << 2)) & 0x3333_3333_3333_3333;
	(v | (v << 1)) & 0x5555_5555_5555_5555
}

/// Collects the even bit positions of `v` back into the lower 32 bits.
fn squash(mut v: u64) -> u64 {
	v &= 0x5555_5555_5555_5555;
	v = (v | (v >> 1)) & 0x3333_3333_3333_3333;
	v = (v | (v >> 2)) & 0x0F0F_0F0F_0F0F_0F0F;
	v = (v | (v >> 4)) & 0x00FF_00FF_00FF_00FF;
	v = (v | (v >> 8)) & 0x0000_FFFF_0000_FFFF;
	(v | (v >> 16)) & 0x0000_0000_FFFF_FFFF
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TilequetError;
	use rstest::rstest;

	fn encode(z: u8, x: u32, y: u32) -> Result<CellId> {
		CellId::encode(&TileCoord { level: z, x, y })
	}

	fn assert_domain_error(result: Result<impl std::fmt::Debug>) {
		let err = result.unwrap_err();
		assert!(matches!(
			err.downcast_ref::<TilequetError>(),
			Some(TilequetError::Domain(_))
		));
	}

	#[test]
	fn known_cell_ids() -> Result<()> {
		// Reference values of the quadbin scheme.
		assert_eq!(encode(0, 0, 0)?.as_u64(), 5192650370358181887);
		assert_eq!(encode(4, 9, 8)?.as_u64(), 5209574053332910079);
		Ok(())
	}

	#[test]
	fn round_trip_at_every_zoom() -> Result<()> {
		for z in 0..=MAX_ZOOM {
			let max = (1u64 << z) - 1;
			let probes = [0, max / 3, max / 2, max.saturating_sub(1), max];
			for &x in &probes {
				for &y in &probes {
					let coord = TileCoord::new(z, x as u32, y as u32)?;
					let id = CellId::encode(&coord)?;
					assert_eq!(id.decode()?, coord, "round trip failed for {coord:?}");
					assert_eq!(id.zoom()?, z);
				}
			}
		}
		Ok(())
	}

	#[test]
	fn zero_is_reserved() {
		assert_domain_error(CellId::new(0).decode());
		assert_domain_error(CellId::new(0).zoom());
		// encode can never produce 0: the header bit is always set
		for z in 0..=MAX_ZOOM {
			assert_ne!(encode(z, 0, 0).unwrap().as_u64(), 0);
		}
	}

	#[rstest]
	#[case(27, 0, 0)]
	#[case(255, 0, 0)]
	#[case(3, 8, 0)]
	#[case(3, 0, 8)]
	#[case(0, 1, 0)]
	#[case(26, 1 << 26, 0)]
	fn rejects_out_of_domain_coordinates(#[case] z: u8, #[case] x: u32, #[case] y: u32) {
		assert_domain_error(encode(z, x, y));
	}

	#[test]
	fn rejects_malformed_ids() {
		// header bit missing
		assert_domain_error(CellId::new(1).decode());
		// sign bit set
		assert_domain_error(CellId::new(0x8000_0000_0000_0000 | 5192650370358181887).decode());
		// zoom field beyond 26
		assert_domain_error(CellId::new(HEADER | (MODE_TILE << 59) | (27 << 52)).decode());
		// wrong mode
		assert_domain_error(CellId::new(HEADER | (2 << 59) | FOOTER).decode());
		// broken footer: clear the lowest bit of the z=0 cell
		assert_domain_error(CellId::new(5192650370358181887 - 1).decode());
	}

	#[test]
	fn ascending_ids_group_by_zoom() -> Result<()> {
		for z in 1..=MAX_ZOOM {
			let max = (1u32 << z) - 1;
			let previous_max = encode(z - 1, max >> 1, max >> 1)?;
			let current_min = encode(z, 0, 0)?;
			assert!(previous_max < current_min, "zoom {z} ids overlap zoom {}", z - 1);
		}
		Ok(())
	}

	#[test]
	fn neighbor_ids_stay_numerically_close() -> Result<()> {
		// Walk a deterministic pseudo-random sample of x-adjacent pairs. The
		// Z-order layout guarantees a minimum distance of one step; carries
		// across bit boundaries make larger distances exponentially rarer
		// (half of all pairs sit exactly one step apart).
		let mut state = 0x9E37_79B9_7F4A_7C15u64;
		let mut next = move || {
			state ^= state << 13;
			state ^= state >> 7;
			state ^= state << 17;
			state
		};

		for z in [4u8, 9, 14, 20, 26] {
			let step = CellId::min_step(z);
			let samples = 500;
			let mut close = 0;
			for _ in 0..samples {
				let x = (next() % ((1u64 << z) - 1)) as u32;
				let y = (next() % (1u64 << z)) as u32;
				let a = encode(z, x, y)?.as_u64();
				let b = encode(z, x + 1, y)?.as_u64();
				assert!(b > a);
				assert!(b - a >= step);
				if b - a <= 16 * step {
					close += 1;
				}
			}
			// 87.5% of pairs are within 11 steps; leave slack for sampling noise
			assert!(
				close * 10 >= samples * 8,
				"zoom {z}: only {close}/{samples} neighbor pairs within 16 steps"
			);
		}
		Ok(())
	}

	#[test]
	fn zoom_agrees_with_decode() -> Result<()> {
		let mut id = 1u64;
		while id < u64::MAX / 3 {
			let cell = CellId::new(id);
			match cell.decode() {
				Ok(coord) => assert_eq!(cell.zoom()?, coord.level),
				Err(_) => assert!(cell.zoom().is_err()),
			}
			id = id.wrapping_mul(3).wrapping_add(7);
		}
		Ok(())
	}
}
