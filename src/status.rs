use strum::{AsRefStr, Display, EnumIter};

/// Fixed conditions surfaced to the user instead of data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumIter)]
pub enum Status {
    #[strum(to_string = "Permissions denied")]
    PermissionsDenied,
    #[strum(to_string = "No cell info available")]
    NoCellInfoAvailable,
    #[strum(to_string = "Error retrieving cell info")]
    ErrorRetrievingCellInfo,
    #[strum(to_string = "Failed to save cell tower data")]
    ExportFailed,
}
