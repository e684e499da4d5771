use crate::analysis::types::Season;

/// Last (month, day) of each explicit season range, in calendar order.
const SEASON_ENDS: [((u8, u8), Season); 4] = [
    ((3, 20), Season::Winter),
    ((6, 20), Season::Spring),
    ((9, 20), Season::Summer),
    ((12, 20), Season::Fall),
];

/// Maps a calendar date to its season, ignoring the year.
///
/// Winter runs Jan 1 to Mar 20, spring Mar 21 to Jun 20, summer Jun 21 to
/// Sep 20 and fall Sep 21 to Dec 20. Anything later (Dec 21 to 31) is winter.
/// Total over every `(month, day)` pair, including ones that are not real dates.
pub fn classify(month: u8, day: u8) -> Season {
    SEASON_ENDS
        .iter()
        .find(|(end, _)| (month, day) <= *end)
        .map_or(Season::Winter, |(_, season)| *season)
}
