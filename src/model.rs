use serde::Deserialize;

/// Canonical identity of an observed cell.
///
/// The radio technology is not part of the identity: a GSM and an LTE record
/// carrying the same numbers are the same tower.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellTower {
    pub mcc: u32,
    pub mnc: u32,
    pub area_code: u32,
    pub cell_id: u64,
}

impl CellTower {
    pub fn new(mcc: u32, mnc: u32, area_code: u32, cell_id: u64) -> Self {
        Self {
            mcc,
            mnc,
            area_code,
            cell_id,
        }
    }
}

/// Identity record as reported by the radio subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RawCellRecord {
    Lte {
        #[serde(default)]
        mcc: Option<String>,
        #[serde(default)]
        mnc: Option<String>,
        tac: u32,
        ci: u64,
    },
    Gsm {
        #[serde(default)]
        mcc: Option<String>,
        #[serde(default)]
        mnc: Option<String>,
        lac: u32,
        cid: u64,
    },
    // wcdma, nr, cdma, ...
    #[serde(other)]
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_records() {
        let lte: RawCellRecord =
            serde_json::from_str(r#"{"type":"lte","mcc":"310","mnc":"260","tac":1000,"ci":5000}"#)
                .unwrap();
        assert_eq!(
            lte,
            RawCellRecord::Lte {
                mcc: Some("310".into()),
                mnc: Some("260".into()),
                tac: 1000,
                ci: 5000,
            }
        );

        // platform reports missing codes as null or leaves them out
        let gsm: RawCellRecord =
            serde_json::from_str(r#"{"type":"gsm","mcc":null,"lac":2000,"cid":6000}"#).unwrap();
        assert_eq!(
            gsm,
            RawCellRecord::Gsm {
                mcc: None,
                mnc: None,
                lac: 2000,
                cid: 6000,
            }
        );
    }

    #[test]
    fn unknown_technology() {
        let nr: RawCellRecord =
            serde_json::from_str(r#"{"type":"nr","mcc":"310","mnc":"260","tac":7,"nci":123}"#)
                .unwrap();
        assert_eq!(nr, RawCellRecord::Other);

        let wcdma: RawCellRecord = serde_json::from_str(r#"{"type":"wcdma"}"#).unwrap();
        assert_eq!(wcdma, RawCellRecord::Other);
    }
}
