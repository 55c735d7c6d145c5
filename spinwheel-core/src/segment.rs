// src/segment.rs
//
// Rotation-to-offer mapping and the matching segment layout for renderers.
//
// Wheel placement invariant: raw segment `r` (counted from 0 degrees in the
// direction of rotation) shows eligible-list entry `count - 1 - r`.
// `map_rotation_to_index` and `segment_layout` both go through
// `list_index_for_raw`, so the selected offer is always the one painted under
// the pointer.

/// Degrees in one full turn.
pub const FULL_TURN: f64 = 360.0;

/// Angular span of one eligible-list entry on the rendered wheel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentSpan {
    /// Index into the eligible list.
    pub index: usize,
    pub start_deg: f64,
    pub end_deg: f64,
}

impl SegmentSpan {
    pub fn mid_deg(&self) -> f64 {
        (self.start_deg + self.end_deg) / 2.0
    }
}

/// Total rotation for one spin: whole turns for show plus the random offset.
pub fn spin_rotation(full_turns: u32, offset_deg: f64) -> f64 {
    FULL_TURN * f64::from(full_turns) + offset_deg
}

fn list_index_for_raw(raw: usize, segment_count: usize) -> usize {
    segment_count - 1 - raw
}

/// Segment under the pointer, before the placement reversal.
///
/// `None` for an empty wheel or a non-finite rotation.
pub fn raw_segment(rotation_deg: f64, segment_count: usize) -> Option<usize> {
    if segment_count == 0 || !rotation_deg.is_finite() {
        return None;
    }
    let final_angle = rotation_deg.rem_euclid(FULL_TURN);
    let segment_angle = FULL_TURN / segment_count as f64;
    let raw = (final_angle / segment_angle).floor() as usize;
    // rem_euclid may yield exactly 360.0 for tiny negative inputs
    Some(raw.min(segment_count - 1))
}

/// Eligible-list index selected by a wheel that stopped at `rotation_deg`.
pub fn map_rotation_to_index(rotation_deg: f64, segment_count: usize) -> Option<usize> {
    raw_segment(rotation_deg, segment_count).map(|raw| list_index_for_raw(raw, segment_count))
}

/// Spans a renderer must paint, one per eligible-list entry, in list order.
pub fn segment_layout(segment_count: usize) -> Vec<SegmentSpan> {
    if segment_count == 0 {
        return Vec::new();
    }
    let segment_angle = FULL_TURN / segment_count as f64;
    (0..segment_count)
        .map(|index| {
            let raw = list_index_for_raw(index, segment_count);
            SegmentSpan {
                index,
                start_deg: raw as f64 * segment_angle,
                end_deg: (raw + 1) as f64 * segment_angle,
            }
        })
        .collect()
}
