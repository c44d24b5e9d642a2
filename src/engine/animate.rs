//! Per-tick animation: expiry counters, decay and geometry transforms.

use std::time::Instant;

use chroma_transport::COLS;

use super::store::EffectStore;
use crate::effect::{Direction, Effect, EffectKind};
use crate::grid::{Cell, Grid};

/// Summary of one animation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnimationReport {
    /// Effects that were due and advanced.
    pub advanced: usize,
    /// Effects removed because they decayed out or ran out of updates.
    pub expired: usize,
}

enum Step {
    Idle,
    Advanced,
    Expired,
}

/// Advance every due effect in store order and drop the expired ones.
pub fn animate(store: &mut EffectStore, now: Instant) -> AnimationReport {
    let mut report = AnimationReport::default();

    store.effects_mut().retain_mut(|effect| match step(effect, now) {
        Step::Idle => true,
        Step::Advanced => {
            report.advanced += 1;
            true
        }
        Step::Expired => {
            report.expired += 1;
            false
        }
    });

    if report.expired > 0 {
        store.bump_revision();
    }
    report
}

fn step(effect: &mut Effect, now: Instant) -> Step {
    if !effect.is_due(now) {
        return Step::Idle;
    }
    effect.dirty = true;

    // A counter at zero expires before anything else happens this tick.
    if let Some(remaining) = effect.remaining_updates_mut() {
        if *remaining == 0 {
            return Step::Expired;
        }
        *remaining -= 1;
    }

    if let Some(amount) = effect.decay_amount() {
        let brightest = decay(effect.colors_mut(), amount);
        if effect.remaining_updates().is_none() && brightest == 0.0 {
            return Step::Expired;
        }
    }

    match effect.kind() {
        EffectKind::Static => {}
        EffectKind::Wave => {
            if let Some(direction) = effect.direction() {
                shift_wave(effect.colors_mut(), direction);
            }
        }
        EffectKind::Explosion => expand_explosion(effect.colors_mut()),
    }

    effect.mark_updated(now);
    Step::Advanced
}

/// Subtract `amount` from every channel, flooring at zero.
/// Returns the largest remaining channel value.
pub fn decay(grid: &mut Grid, amount: f64) -> f64 {
    let mut brightest: f64 = 0.0;
    for row in grid.rows_mut().iter_mut() {
        for cell in row.iter_mut() {
            for channel in cell.iter_mut() {
                *channel = if *channel >= amount {
                    *channel - amount
                } else {
                    0.0
                };
                brightest = brightest.max(*channel);
            }
        }
    }
    brightest
}

/// Cyclic shift of the whole grid by one step.
pub fn shift_wave(grid: &mut Grid, direction: Direction) {
    let rows = grid.rows_mut();
    match direction {
        Direction::Up => rows.rotate_left(1),
        Direction::Down => rows.rotate_right(1),
        Direction::Left => rows.iter_mut().for_each(|row| row.rotate_left(1)),
        Direction::Right => rows.iter_mut().for_each(|row| row.rotate_right(1)),
    }
}

// ── Explosion ────────────────────────────────────────────────────────

/// Origin row and its two mirrored rows, in the order they are grown.
const WINGS: [(usize, usize, usize); 2] = [(2, 0, 1), (3, 4, 5)];

#[derive(Debug, Clone, Copy)]
enum Half {
    /// Columns 0..=10, growing towards column 0.
    Left,
    /// Columns 11..=21, growing towards column 21.
    Right,
}

impl Half {
    fn center(self) -> usize {
        match self {
            Half::Left => COLS / 2 - 1,
            Half::Right => COLS / 2,
        }
    }

    /// Outermost occurrence of `color` within this half.
    fn outermost(self, row: &[Cell; COLS], color: Cell) -> Option<usize> {
        match self {
            Half::Left => row[..=self.center()].iter().position(|c| *c == color),
            Half::Right => row[self.center()..]
                .iter()
                .rposition(|c| *c == color)
                .map(|i| i + self.center()),
        }
    }

    fn step_out(self, col: usize) -> Option<usize> {
        match self {
            Half::Left => col.checked_sub(1),
            Half::Right => (col + 1 < COLS).then_some(col + 1),
        }
    }
}

/// Paint one cell beyond the outermost `color`. Returns false if the colour
/// is not present in this half of the row.
fn push_front(row: &mut [Cell; COLS], color: Cell, half: Half) -> bool {
    match half.outermost(row, color) {
        Some(col) => {
            if let Some(next) = half.step_out(col) {
                row[next] = color;
            }
            true
        }
        None => false,
    }
}

fn expand_half(grid: &mut Grid, half: Half) {
    let rows = grid.rows_mut();
    for (origin, first, second) in WINGS {
        let color = rows[origin][half.center()];
        push_front(&mut rows[origin], color, half);

        // Mirrored rows pick the colour up at the center before they grow.
        if !push_front(&mut rows[first], color, half) {
            rows[first][half.center()] = color;
        } else if !push_front(&mut rows[second], color, half) {
            rows[second][half.center()] = color;
        }
    }
}

/// Grow the explosion one ring outward from the two center columns.
pub fn expand_explosion(grid: &mut Grid) {
    expand_half(grid, Half::Left);
    expand_half(grid, Half::Right);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb8;
    use crate::effect::patterns::explosion_pattern;
    use crate::effect::Blend;
    use chroma_transport::ROWS;
    use std::time::Duration;

    const TICK: Duration = Duration::from_millis(50);

    fn numbered_grid() -> Grid {
        let mut grid = Grid::blank();
        for r in 0..ROWS {
            for c in 0..COLS {
                grid.set(r, c, [r as f64 / 10.0, c as f64 / 100.0, 0.0]);
            }
        }
        grid
    }

    fn lit(grid: &Grid, row: usize) -> Vec<usize> {
        (0..COLS).filter(|&c| grid.get(row, c) != [0.0; 3]).collect()
    }

    #[test]
    fn test_wave_up_moves_first_row_to_end() {
        let original = numbered_grid();
        let mut grid = original;
        shift_wave(&mut grid, Direction::Up);
        assert_eq!(grid.rows()[5], original.rows()[0]);
        assert_eq!(grid.rows()[0], original.rows()[1]);
    }

    #[test]
    fn test_wave_right_moves_last_column_to_front() {
        let original = numbered_grid();
        let mut grid = original;
        shift_wave(&mut grid, Direction::Right);
        for r in 0..ROWS {
            assert_eq!(grid.get(r, 0), original.get(r, COLS - 1));
            assert_eq!(grid.get(r, 1), original.get(r, 0));
        }
    }

    #[test]
    fn test_wave_cycles_restore_grid() {
        let original = numbered_grid();
        for (direction, period) in [
            (Direction::Up, ROWS),
            (Direction::Down, ROWS),
            (Direction::Left, COLS),
            (Direction::Right, COLS),
        ] {
            let mut grid = original;
            for i in 1..=period {
                shift_wave(&mut grid, direction);
                if i < period {
                    assert_ne!(grid, original, "{direction:?} returned early at {i}");
                }
            }
            assert_eq!(grid, original, "{direction:?} after {period} steps");
        }
    }

    #[test]
    fn test_decay_floors_at_zero() {
        let mut grid = Grid::filled([0.3, 0.05, 0.0]);
        let brightest = decay(&mut grid, 0.1);
        assert!((brightest - 0.2).abs() < 1e-9);
        let cell = grid.get(0, 0);
        assert!((cell[0] - 0.2).abs() < 1e-9);
        assert_eq!(cell[1], 0.0);
        assert_eq!(cell[2], 0.0);
    }

    #[test]
    fn test_explosion_first_ring() {
        let mut grid = explosion_pattern(Rgb8::new(255, 0, 0));
        expand_explosion(&mut grid);
        assert_eq!(lit(&grid, 2), vec![9, 10, 11, 12]);
        assert_eq!(lit(&grid, 3), vec![9, 10, 11, 12]);
        assert_eq!(lit(&grid, 0), vec![10, 11]);
        assert_eq!(lit(&grid, 4), vec![10, 11]);
        assert!(lit(&grid, 1).is_empty());
        assert!(lit(&grid, 5).is_empty());
    }

    #[test]
    fn test_explosion_second_ring_reaches_outer_rows() {
        let mut grid = explosion_pattern(Rgb8::new(255, 0, 0));
        expand_explosion(&mut grid);
        expand_explosion(&mut grid);
        assert_eq!(lit(&grid, 2), vec![8, 9, 10, 11, 12, 13]);
        assert_eq!(lit(&grid, 0), vec![9, 10, 11, 12]);
        assert_eq!(lit(&grid, 1), vec![10, 11]);
        assert_eq!(lit(&grid, 5), vec![10, 11]);
    }

    #[test]
    fn test_explosion_saturates_without_overflow() {
        let mut grid = explosion_pattern(Rgb8::new(0, 0, 255));
        for _ in 0..40 {
            expand_explosion(&mut grid);
        }
        for row in 0..ROWS {
            assert_eq!(lit(&grid, row).len(), COLS, "row {row}");
        }
    }

    fn store_with(effect: Effect) -> EffectStore {
        let mut store = EffectStore::new();
        store.add(effect);
        store
    }

    #[test]
    fn test_decayed_effect_expires_on_first_due_tick() {
        let effect = Effect::builder(EffectKind::Static, Blend::Add, Grid::filled([0.05; 3]))
            .decay(0.1)
            .update_interval(TICK)
            .build()
            .unwrap();
        let mut store = store_with(effect);
        let report = animate(&mut store, Instant::now());
        assert_eq!(report.expired, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_decay_with_counter_does_not_expire_on_zero() {
        let effect = Effect::builder(EffectKind::Static, Blend::Add, Grid::filled([0.05; 3]))
            .decay(0.1)
            .update_interval(TICK)
            .expires_after(3)
            .build()
            .unwrap();
        let mut store = store_with(effect);
        animate(&mut store, Instant::now());
        assert_eq!(store.len(), 1);
        let effect = store.iter().next().unwrap();
        assert!(effect.colors().is_blank());
        assert_eq!(effect.remaining_updates(), Some(2));
    }

    #[test]
    fn test_zero_counter_expires_without_transform() {
        let effect = Effect::builder(EffectKind::Wave, Blend::Fill, numbered_grid())
            .direction(Direction::Up)
            .update_interval(TICK)
            .expires_after(0)
            .build()
            .unwrap();
        let mut store = store_with(effect);
        let report = animate(&mut store, Instant::now());
        assert_eq!(report, AnimationReport { advanced: 0, expired: 1 });
        assert!(store.is_empty());
    }

    #[test]
    fn test_counter_counts_down_then_expires() {
        let effect = Effect::builder(EffectKind::Wave, Blend::Fill, numbered_grid())
            .direction(Direction::Left)
            .update_interval(TICK)
            .expires_after(2)
            .build()
            .unwrap();
        let mut store = store_with(effect);
        let t0 = Instant::now();

        assert_eq!(animate(&mut store, t0).advanced, 1);
        assert_eq!(animate(&mut store, t0 + TICK).advanced, 1);
        assert_eq!(store.iter().next().unwrap().remaining_updates(), Some(0));
        assert_eq!(animate(&mut store, t0 + TICK * 2).expired, 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_effect_waits_for_its_interval() {
        let effect = Effect::builder(EffectKind::Wave, Blend::Fill, numbered_grid())
            .direction(Direction::Down)
            .update_interval(Duration::from_secs(1))
            .build()
            .unwrap();
        let mut store = store_with(effect);
        let t0 = Instant::now();

        assert_eq!(animate(&mut store, t0).advanced, 1);
        let after_first = *store.iter().next().unwrap().colors();
        assert_eq!(animate(&mut store, t0 + Duration::from_millis(500)).advanced, 0);
        assert_eq!(*store.iter().next().unwrap().colors(), after_first);
        assert_eq!(animate(&mut store, t0 + Duration::from_secs(1)).advanced, 1);
    }

    #[test]
    fn test_static_effect_without_interval_is_untouched() {
        let effect = Effect::builder(EffectKind::Static, Blend::Fill, Grid::filled([0.5; 3]))
            .decay(0.1)
            .build()
            .unwrap();
        let mut store = store_with(effect);
        let report = animate(&mut store, Instant::now());
        assert_eq!(report, AnimationReport::default());
        assert_eq!(*store.iter().next().unwrap().colors(), Grid::filled([0.5; 3]));
    }
}
