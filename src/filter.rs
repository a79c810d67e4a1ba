use crate::model::CellTower;

/// Area code the platform reports when the real one is unknown.
pub const UNKNOWN_AREA_CODE: u32 = 65535;
/// Cell id the platform reports when the real one is unknown.
pub const UNKNOWN_CELL_ID: u64 = 268435455;

/// Whether a normalized tower may be recorded.
pub fn is_valid(tower: &CellTower) -> bool {
    tower.mcc > 0
        && tower.mnc > 0
        && tower.area_code != UNKNOWN_AREA_CODE
        && tower.cell_id != UNKNOWN_CELL_ID
}
