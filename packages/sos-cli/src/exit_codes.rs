use sos_design::DesignError;

pub const SUCCESS: i32 = 0;
// 1 and 2 are left to panics and clap usage errors
pub const INVALID_PARAMETER: i32 = 3;
pub const DEGENERATE_SECTION: i32 = 4;
pub const OUTPUT_ERROR: i32 = 5;

pub fn for_error(err: &DesignError) -> i32 {
    match err {
        DesignError::InvalidDesignParameter(_) => INVALID_PARAMETER,
        DesignError::DegenerateSection { .. } => DEGENERATE_SECTION,
        DesignError::RenderFailed(_) => OUTPUT_ERROR,
    }
}
