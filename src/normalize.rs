use crate::model::{CellTower, RawCellRecord};

/// Maps a technology specific record into a canonical tower.
///
/// Returns None for technologies that are not collected. The result has not
/// been validated yet, see [`crate::filter::is_valid`].
pub fn normalize(record: &RawCellRecord) -> Option<CellTower> {
    match record {
        RawCellRecord::Lte { mcc, mnc, tac, ci } => Some(CellTower {
            mcc: parse_code(mcc.as_deref()),
            mnc: parse_code(mnc.as_deref()),
            area_code: *tac,
            cell_id: *ci,
        }),
        RawCellRecord::Gsm { mcc, mnc, lac, cid } => Some(CellTower {
            mcc: parse_code(mcc.as_deref()),
            mnc: parse_code(mnc.as_deref()),
            area_code: *lac,
            cell_id: *cid,
        }),
        RawCellRecord::Other => None,
    }
}

// missing or malformed codes become 0, which the filter rejects
fn parse_code(code: Option<&str>) -> u32 {
    code.and_then(|x| x.parse().ok()).unwrap_or(0)
}
