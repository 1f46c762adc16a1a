//! # Overflow Layout
//!
//! Lays out the mobile navigation surface: a bottom sheet whose resting
//! row shows a fixed number of slots, with everything else demoted to an
//! overflow area revealed by dragging the sheet (or pressing "More").
//!
//! ```text
//!  items [X1 .. X7], capacity 5
//!
//!  ┌────┬────┬────┬────┬──────┐   primary row
//!  │ X1 │ X2 │ X3 │ X4 │ More │   (one slot reserved for the control)
//!  ├────┼────┼────┼────┼──────┤
//!  │ X5 │ X6 │ X7 │ ·· │  ··  │   secondary rows, filler-padded
//!  └────┴────┴────┴────┴──────┘
//! ```
//!
//! Partition and snap points are recomputed from scratch on every resize
//! or item-set change. Selecting a secondary item swaps it with the last
//! primary item so recently used entries surface in the resting row.

use log::{debug, trace};

use crate::core::nav::ItemKey;

/// Visible slots in the resting row.
pub const VISIBLE_SLOTS: usize = 5;
pub const DEFAULT_MAX_HEIGHT_RATIO: f32 = 0.85;

/// Fixed per-item metrics, in logical px.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub item_height: f32,
    pub vertical_padding: f32,
    pub container_border: f32,
    pub row_gap: f32,
    /// Extra padding below the last secondary row.
    pub last_row_padding: f32,
    /// Expanded height is clamped to this share of the viewport height.
    pub max_height_ratio: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            item_height: 56.0,
            vertical_padding: 8.0,
            container_border: 1.0,
            row_gap: 8.0,
            last_row_padding: 16.0,
            max_height_ratio: DEFAULT_MAX_HEIGHT_RATIO,
        }
    }
}

impl LayoutMetrics {
    pub fn collapsed_height(&self) -> f32 {
        self.vertical_padding * 2.0 + self.item_height + self.container_border
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot<K> {
    Item(K),
    /// Invisible placeholder keeping columns aligned in the last row.
    Filler,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MobileLayoutPartition<K> {
    pub primary: Vec<K>,
    pub secondary: Vec<K>,
    pub has_overflow: bool,
}

impl<K: Clone> MobileLayoutPartition<K> {
    pub fn total(&self) -> usize {
        self.primary.len() + self.secondary.len()
    }

    pub fn row_count(&self, capacity: usize) -> usize {
        self.secondary.len().div_ceil(capacity.max(1))
    }

    /// Secondary items in rows of `capacity`, last row filler-padded.
    pub fn rows(&self, capacity: usize) -> Vec<Vec<Slot<K>>> {
        let capacity = capacity.max(1);
        self.secondary
            .chunks(capacity)
            .map(|chunk| {
                let mut row: Vec<Slot<K>> = chunk.iter().cloned().map(Slot::Item).collect();
                row.resize(capacity, Slot::Filler);
                row
            })
            .collect()
    }
}

/// Split `items` into the resting row and the overflow.
///
/// When everything fits, nothing overflows. Otherwise one slot goes to the
/// "More" control and `reserved_slots` more to a pinned action.
pub fn partition<K: Clone>(
    items: &[K],
    capacity: usize,
    reserved_slots: usize,
) -> MobileLayoutPartition<K> {
    let capacity = capacity.max(1);
    if items.len() <= capacity {
        return MobileLayoutPartition {
            primary: items.to_vec(),
            secondary: Vec::new(),
            has_overflow: false,
        };
    }
    let effective = capacity.saturating_sub(1).saturating_sub(reserved_slots);
    MobileLayoutPartition {
        primary: items[..effective].to_vec(),
        secondary: items[effective..].to_vec(),
        has_overflow: true,
    }
}

/// Strictly increasing resting heights of the sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapPoints(Vec<f32>);

impl SnapPoints {
    fn single(height: f32) -> Self {
        Self(vec![height])
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.0.get(index).copied()
    }

    pub fn first(&self) -> f32 {
        self.0.first().copied().unwrap_or_default()
    }

    pub fn last(&self) -> f32 {
        self.0.last().copied().unwrap_or_default()
    }

    pub fn can_expand(&self) -> bool {
        self.0.len() > 1
    }
}

/// Compute the sheet's snap points for a partition.
///
/// A viewport too short to fit any expansion above the collapsed height
/// yields a single point.
pub fn compute_snap_points<K: Clone>(
    partition: &MobileLayoutPartition<K>,
    capacity: usize,
    metrics: &LayoutMetrics,
    viewport_height: f32,
) -> SnapPoints {
    let collapsed = metrics.collapsed_height();
    let rows = partition.row_count(capacity);
    if rows == 0 {
        return SnapPoints::single(collapsed);
    }

    let rows_height = metrics.item_height * rows as f32;
    let gaps = metrics.row_gap * (rows - 1) as f32;
    let expanded = collapsed + rows_height + gaps + metrics.last_row_padding + metrics.row_gap;
    let ceiling = viewport_height * metrics.max_height_ratio;
    let expanded = expanded.min(ceiling);

    if expanded > collapsed {
        SnapPoints(vec![collapsed, expanded])
    } else {
        trace!("Viewport {viewport_height}px too short to expand the sheet");
        SnapPoints::single(collapsed)
    }
}

// ============================================================================
// Sheet contract
// ============================================================================

/// The fields exchanged with the sheet/drawer primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetState {
    pub open: bool,
    /// Index into the current [`SnapPoints`].
    pub active_snap: usize,
    pub dismissible: bool,
    pub modal: bool,
}

impl Default for SheetState {
    /// The navigation sheet is always present at its resting row.
    fn default() -> Self {
        Self {
            open: true,
            active_snap: 0,
            dismissible: false,
            modal: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverflowConfig {
    pub capacity: usize,
    pub reserved_slots: usize,
    pub metrics: LayoutMetrics,
}

impl Default for OverflowConfig {
    fn default() -> Self {
        Self {
            capacity: VISIBLE_SLOTS,
            reserved_slots: 0,
            metrics: LayoutMetrics::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A secondary item swapped places with `demoted`.
    Promoted { demoted: ItemKey },
    /// Already in the resting row, or nothing to swap with.
    Unchanged,
    /// Not part of this layout.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct OverflowLayout {
    config: OverflowConfig,
    order: Vec<ItemKey>,
    viewport_height: f32,
    partition: MobileLayoutPartition<ItemKey>,
    snap_points: SnapPoints,
    sheet: SheetState,
}

impl OverflowLayout {
    pub fn new(config: OverflowConfig, items: Vec<ItemKey>, viewport_height: f32) -> Self {
        let mut layout = Self {
            config,
            order: items,
            viewport_height,
            partition: MobileLayoutPartition {
                primary: Vec::new(),
                secondary: Vec::new(),
                has_overflow: false,
            },
            snap_points: SnapPoints::single(config.metrics.collapsed_height()),
            sheet: SheetState::default(),
        };
        layout.recompute();
        layout
    }

    pub fn config(&self) -> &OverflowConfig {
        &self.config
    }

    pub fn partition(&self) -> &MobileLayoutPartition<ItemKey> {
        &self.partition
    }

    pub fn rows(&self) -> Vec<Vec<Slot<ItemKey>>> {
        self.partition.rows(self.config.capacity)
    }

    pub fn snap_points(&self) -> &SnapPoints {
        &self.snap_points
    }

    pub fn sheet(&self) -> &SheetState {
        &self.sheet
    }

    pub fn active_snap_height(&self) -> f32 {
        self.snap_points
            .get(self.sheet.active_snap)
            .unwrap_or_else(|| self.snap_points.first())
    }

    pub fn is_expanded(&self) -> bool {
        self.sheet.active_snap > 0
    }

    /// Replace the item set. Any promotion order is discarded.
    pub fn set_items(&mut self, items: Vec<ItemKey>) {
        self.order = items;
        self.recompute();
    }

    pub fn resize(&mut self, viewport_height: f32) {
        if self.viewport_height == viewport_height {
            return;
        }
        self.viewport_height = viewport_height;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.partition = partition(&self.order, self.config.capacity, self.config.reserved_slots);
        let snap_points = compute_snap_points(
            &self.partition,
            self.config.capacity,
            &self.config.metrics,
            self.viewport_height,
        );
        if snap_points != self.snap_points {
            debug!(
                "Snap points {:?} -> {:?}; resetting to collapsed",
                self.snap_points.as_slice(),
                snap_points.as_slice()
            );
            self.snap_points = snap_points;
            self.sheet.active_snap = 0;
        }
    }

    /// Select an item from the mobile surface. Collapses the sheet and
    /// promotes secondary items into the resting row.
    pub fn select(&mut self, key: &ItemKey) -> Selection {
        if !self.order.contains(key) {
            return Selection::Unknown;
        }
        self.sheet.active_snap = 0;

        if !self.partition.secondary.contains(key) {
            return Selection::Unchanged;
        }
        let Some(last_primary) = self.partition.primary.last().cloned() else {
            return Selection::Unchanged;
        };
        let from = self.order.iter().position(|k| k == key);
        let to = self.order.iter().position(|k| *k == last_primary);
        if let (Some(from), Some(to)) = (from, to) {
            self.order.swap(from, to);
            self.recompute();
            debug!("Promoted {key} over {last_primary}");
            return Selection::Promoted {
                demoted: last_primary,
            };
        }
        Selection::Unchanged
    }

    // ------------------------------------------------------------------
    // Sheet callbacks
    // ------------------------------------------------------------------

    pub fn on_open_change(&mut self, open: bool) {
        if !open && !self.sheet.dismissible {
            self.sheet.active_snap = 0;
            return;
        }
        self.sheet.open = open;
        if !open {
            self.sheet.active_snap = 0;
        }
    }

    /// Out-of-range indices clamp to the largest snap point.
    pub fn on_snap_point_change(&mut self, index: usize) {
        let last = self.snap_points.len().saturating_sub(1);
        self.sheet.active_snap = index.min(last);
    }

    /// The "More" control: expand to the tallest point, or collapse back.
    pub fn toggle_more(&mut self) {
        if !self.partition.has_overflow {
            return;
        }
        if self.is_expanded() {
            self.sheet.active_snap = 0;
        } else {
            self.on_snap_point_change(self.snap_points.len().saturating_sub(1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::nav::NodePath;

    fn keys(n: usize) -> Vec<ItemKey> {
        (0..n).map(|i| NodePath::from_indices([0, i])).collect()
    }

    fn key(i: usize) -> ItemKey {
        NodePath::from_indices([0, i])
    }

    #[test]
    fn test_all_fit_single_snap_point() {
        for n in 0..=VISIBLE_SLOTS {
            let layout = OverflowLayout::new(OverflowConfig::default(), keys(n), 800.0);
            assert_eq!(layout.partition().primary.len(), n);
            assert!(layout.partition().secondary.is_empty());
            assert!(!layout.partition().has_overflow);
            assert_eq!(layout.snap_points().len(), 1);
        }
    }

    #[test]
    fn test_overflow_counts() {
        for n in (VISIBLE_SLOTS + 1)..20 {
            for reserved in 0..3 {
                let p = partition(&keys(n), VISIBLE_SLOTS, reserved);
                assert_eq!(p.primary.len(), VISIBLE_SLOTS - 1 - reserved);
                assert_eq!(p.secondary.len(), n - p.primary.len());
                assert_eq!(p.total(), n);
                assert_eq!(p.row_count(VISIBLE_SLOTS), p.secondary.len().div_ceil(VISIBLE_SLOTS));
            }
        }
    }

    #[test]
    fn test_reserved_slots_saturate() {
        let p = partition(&keys(8), VISIBLE_SLOTS, 10);
        assert!(p.primary.is_empty());
        assert_eq!(p.secondary.len(), 8);
    }

    #[test]
    fn test_rows_are_filler_padded() {
        let p = partition(&keys(7), VISIBLE_SLOTS, 0);
        let rows = p.rows(VISIBLE_SLOTS);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0],
            vec![
                Slot::Item(key(4)),
                Slot::Item(key(5)),
                Slot::Item(key(6)),
                Slot::Filler,
                Slot::Filler
            ]
        );
    }

    #[test]
    fn test_snap_points_values() {
        let metrics = LayoutMetrics::default();
        let p = partition(&keys(7), VISIBLE_SLOTS, 0);
        let snaps = compute_snap_points(&p, VISIBLE_SLOTS, &metrics, 800.0);
        assert_eq!(snaps.as_slice(), &[73.0, 153.0]);

        let p = partition(&keys(14), VISIBLE_SLOTS, 0);
        let snaps = compute_snap_points(&p, VISIBLE_SLOTS, &metrics, 800.0);
        // 10 secondary items: two rows and one inter-row gap.
        assert_eq!(snaps.as_slice(), &[73.0, 73.0 + 112.0 + 8.0 + 16.0 + 8.0]);
    }

    #[test]
    fn test_snap_points_clamped_and_increasing() {
        let metrics = LayoutMetrics::default();
        for n in 6..60 {
            for height in [200.0_f32, 400.0, 900.0] {
                let p = partition(&keys(n), VISIBLE_SLOTS, 0);
                let snaps = compute_snap_points(&p, VISIBLE_SLOTS, &metrics, height);
                assert!(snaps.as_slice().windows(2).all(|w| w[0] < w[1]));
                if snaps.can_expand() {
                    assert!(snaps.last() <= height * 0.85);
                }
            }
        }
    }

    #[test]
    fn test_tiny_viewport_cannot_expand() {
        let p = partition(&keys(9), VISIBLE_SLOTS, 0);
        let snaps = compute_snap_points(&p, VISIBLE_SLOTS, &LayoutMetrics::default(), 60.0);
        assert_eq!(snaps.len(), 1);
    }

    #[test]
    fn test_promotion_scenario() {
        let mut layout = OverflowLayout::new(OverflowConfig::default(), keys(7), 800.0);
        assert_eq!(layout.partition().primary, vec![key(0), key(1), key(2), key(3)]);
        assert_eq!(layout.partition().secondary, vec![key(4), key(5), key(6)]);

        layout.toggle_more();
        assert!(layout.is_expanded());

        let outcome = layout.select(&key(5));
        assert_eq!(outcome, Selection::Promoted { demoted: key(3) });
        assert_eq!(layout.partition().primary, vec![key(0), key(1), key(2), key(5)]);
        assert_eq!(layout.partition().secondary, vec![key(4), key(3), key(6)]);
        assert_eq!(layout.sheet().active_snap, 0);
    }

    #[test]
    fn test_selecting_primary_only_collapses() {
        let mut layout = OverflowLayout::new(OverflowConfig::default(), keys(7), 800.0);
        layout.on_snap_point_change(1);
        assert_eq!(layout.select(&key(1)), Selection::Unchanged);
        assert_eq!(layout.sheet().active_snap, 0);
        assert_eq!(layout.select(&NodePath::from_indices([9, 9])), Selection::Unknown);
    }

    #[test]
    fn test_snap_change_resets_active() {
        let mut layout = OverflowLayout::new(OverflowConfig::default(), keys(7), 800.0);
        layout.on_snap_point_change(1);
        layout.resize(800.0);
        assert_eq!(layout.sheet().active_snap, 1);
        layout.resize(150.0);
        assert_eq!(layout.sheet().active_snap, 0);
    }

    #[test]
    fn test_resize_keeps_promotion_but_set_items_resets() {
        let mut layout = OverflowLayout::new(OverflowConfig::default(), keys(7), 800.0);
        layout.select(&key(6));
        layout.resize(600.0);
        assert_eq!(layout.partition().primary.last(), Some(&key(6)));
        layout.set_items(keys(7));
        assert_eq!(layout.partition().primary.last(), Some(&key(3)));
    }

    #[test]
    fn test_snap_index_clamps() {
        let mut layout = OverflowLayout::new(OverflowConfig::default(), keys(3), 800.0);
        layout.on_snap_point_change(5);
        assert_eq!(layout.sheet().active_snap, 0);
        layout.toggle_more();
        assert!(!layout.is_expanded());
    }

    #[test]
    fn test_non_dismissible_sheet_stays_open() {
        let mut layout = OverflowLayout::new(OverflowConfig::default(), keys(9), 800.0);
        layout.toggle_more();
        layout.on_open_change(false);
        assert!(layout.sheet().open);
        assert_eq!(layout.sheet().active_snap, 0);
        assert_eq!(layout.active_snap_height(), layout.snap_points().first());
    }
}
