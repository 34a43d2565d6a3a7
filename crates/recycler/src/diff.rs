//! List differencing
//!
//! Computes the operations that turn an old list into a new one, given
//! only an identity predicate (are these the same entity?) and a content
//! predicate (does the entity render the same?).
//!
//! The longest common subsequence of identities is found with the
//! linear-space form of Myers' O(ND) algorithm. Items that share an
//! identity but fell outside the subsequence become moves. Matched items
//! whose content differs become changes. Matched items are never removed
//! and re-inserted.
//!
//! Identities must be unique within each list. Duplicates do not cause
//! undefined behaviour but the resulting script is not meaningful.

/// An entity that can be reconciled between two list snapshots
pub trait DiffItem {
    /// Whether `other` represents the same entity (e.g. same primary key)
    fn is_same_item(&self, other: &Self) -> bool;

    /// Whether `other` renders identically. Only asked when
    /// [`is_same_item`](DiffItem::is_same_item) holds.
    fn has_same_content(&self, other: &Self) -> bool;
}

/// Position-based view over the two lists being compared
pub trait DiffCallback {
    /// Size of the old list
    fn old_list_size(&self) -> usize;

    /// Size of the new list
    fn new_list_size(&self) -> usize;

    /// Whether the items at the given positions are the same entity
    fn are_items_the_same(&self, old_position: usize, new_position: usize) -> bool;

    /// Whether the items at the given positions render identically
    fn are_contents_the_same(&self, old_position: usize, new_position: usize) -> bool;
}

/// [`DiffCallback`] over two slices of [`DiffItem`]s
#[derive(Debug, Clone, Copy)]
pub struct SliceDiffCallback<'a, T> {
    olds: &'a [T],
    news: &'a [T],
}

impl<'a, T: DiffItem> SliceDiffCallback<'a, T> {
    /// Compare `olds` against `news`
    pub fn new(olds: &'a [T], news: &'a [T]) -> Self {
        Self { olds, news }
    }
}

impl<T: DiffItem> DiffCallback for SliceDiffCallback<'_, T> {
    fn old_list_size(&self) -> usize {
        self.olds.len()
    }

    fn new_list_size(&self) -> usize {
        self.news.len()
    }

    fn are_items_the_same(&self, old_position: usize, new_position: usize) -> bool {
        self.olds[old_position].is_same_item(&self.news[new_position])
    }

    fn are_contents_the_same(&self, old_position: usize, new_position: usize) -> bool {
        self.olds[old_position].has_same_content(&self.news[new_position])
    }
}

/// Receiver of list update notifications
///
/// Positions always refer to the list as it is after every previously
/// delivered notification.
pub trait ListUpdateCallback {
    /// `count` items were inserted at `position`
    fn on_inserted(&mut self, position: usize, count: usize);

    /// `count` items were removed starting at `position`
    fn on_removed(&mut self, position: usize, count: usize);

    /// The item at `from` was removed and re-inserted at `to`
    fn on_moved(&mut self, from: usize, to: usize);

    /// `count` items starting at `position` changed content
    fn on_changed(&mut self, position: usize, count: usize);
}

/// One step of an edit script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOp {
    /// Insert `count` new items at `position`
    Insert {
        /// First inserted position
        position: usize,
        /// Number of items
        count: usize,
    },
    /// Remove `count` items starting at `position`
    Remove {
        /// First removed position
        position: usize,
        /// Number of items
        count: usize,
    },
    /// Move one item from `from` to `to`
    Move {
        /// Position before the move
        from: usize,
        /// Position after the move
        to: usize,
    },
    /// Update `count` items in place starting at `position`
    Change {
        /// First changed position
        position: usize,
        /// Number of items
        count: usize,
    },
}

impl EditOp {
    /// Deliver this operation to `observer`
    pub fn dispatch<O: ListUpdateCallback + ?Sized>(&self, observer: &mut O) {
        match *self {
            EditOp::Insert { position, count } => observer.on_inserted(position, count),
            EditOp::Remove { position, count } => observer.on_removed(position, count),
            EditOp::Move { from, to } => observer.on_moved(from, to),
            EditOp::Change { position, count } => observer.on_changed(position, count),
        }
    }
}

/// Collecting operations is enough to record a script for later replay.
impl ListUpdateCallback for Vec<EditOp> {
    fn on_inserted(&mut self, position: usize, count: usize) {
        self.push(EditOp::Insert { position, count });
    }

    fn on_removed(&mut self, position: usize, count: usize) {
        self.push(EditOp::Remove { position, count });
    }

    fn on_moved(&mut self, from: usize, to: usize) {
        self.push(EditOp::Move { from, to });
    }

    fn on_changed(&mut self, position: usize, count: usize) {
        self.push(EditOp::Change { position, count });
    }
}

/// Outcome of [`calculate_diff`]: the edit script plus position mappings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffResult {
    ops: Vec<EditOp>,
    old_to_new: Vec<Option<usize>>,
    new_to_old: Vec<Option<usize>>,
}

impl DiffResult {
    /// Operations in replay order
    pub fn ops(&self) -> &[EditOp] {
        &self.ops
    }

    /// Number of operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Whether the two lists were already equivalent
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Position in the new list of the item at `old_position`, if it survived
    pub fn convert_old_position_to_new(&self, old_position: usize) -> Option<usize> {
        self.old_to_new.get(old_position).copied().flatten()
    }

    /// Position in the old list of the item at `new_position`, if it existed
    pub fn convert_new_position_to_old(&self, new_position: usize) -> Option<usize> {
        self.new_to_old.get(new_position).copied().flatten()
    }

    /// Replay every operation, in order, against `observer`
    pub fn dispatch_updates_to<O: ListUpdateCallback + ?Sized>(&self, observer: &mut O) {
        for op in &self.ops {
            op.dispatch(observer);
        }
    }
}

/// Diff two slices of [`DiffItem`]s
pub fn diff<T: DiffItem>(olds: &[T], news: &[T]) -> DiffResult {
    calculate_diff(&SliceDiffCallback::new(olds, news))
}

/// Compute the edit script described by `callback`
pub fn calculate_diff<C: DiffCallback + ?Sized>(callback: &C) -> DiffResult {
    let old_len = callback.old_list_size();
    let new_len = callback.new_list_size();

    let mut old_to_new = vec![None; old_len];
    let mut new_to_old = vec![None; new_len];

    // Items matched by the common subsequence keep their relative order.
    let mut in_order = vec![false; new_len];
    for (old_pos, new_pos) in common_subsequence(old_len, new_len, |o, n| {
        callback.are_items_the_same(o, n)
    }) {
        old_to_new[old_pos] = Some(new_pos);
        new_to_old[new_pos] = Some(old_pos);
        in_order[new_pos] = true;
    }

    // Anything else that shares an identity has moved.
    let mut unmatched: Vec<usize> = (0..new_len).filter(|&n| new_to_old[n].is_none()).collect();
    for old_pos in 0..old_len {
        if unmatched.is_empty() {
            break;
        }
        if old_to_new[old_pos].is_some() {
            continue;
        }
        let found = unmatched
            .iter()
            .position(|&new_pos| callback.are_items_the_same(old_pos, new_pos));
        if let Some(index) = found {
            let new_pos = unmatched.remove(index);
            old_to_new[old_pos] = Some(new_pos);
            new_to_old[new_pos] = Some(old_pos);
        }
    }

    let mut script = Script::default();

    // Removals back to front, so earlier positions stay valid.
    for old_pos in (0..old_len).rev() {
        if old_to_new[old_pos].is_none() {
            script.push(EditOp::Remove { position: old_pos, count: 1 });
        }
    }

    // Survivors, tagged with their target position. Subsequence members are
    // already in target order and count as settled.
    let mut current: Vec<(usize, bool)> = old_to_new
        .iter()
        .flatten()
        .map(|&new_pos| (new_pos, in_order[new_pos]))
        .collect();

    for new_pos in 0..new_len {
        if new_to_old[new_pos].is_none() || in_order[new_pos] {
            continue;
        }
        let Some(from) = current.iter().position(|&(target, _)| target == new_pos) else {
            continue;
        };
        current.remove(from);
        let to = current
            .iter()
            .position(|&(target, settled)| settled && target > new_pos)
            .unwrap_or(current.len());
        current.insert(to, (new_pos, true));

        if from != to {
            script.push(EditOp::Move { from, to });
        }
    }

    // Survivors are now in target order; fill the gaps front to back.
    for new_pos in 0..new_len {
        if new_to_old[new_pos].is_none() {
            script.push(EditOp::Insert { position: new_pos, count: 1 });
        }
    }

    for new_pos in 0..new_len {
        if let Some(old_pos) = new_to_old[new_pos] {
            if !callback.are_contents_the_same(old_pos, new_pos) {
                script.push(EditOp::Change { position: new_pos, count: 1 });
            }
        }
    }

    tracing::trace!(
        old_len,
        new_len,
        ops = script.ops.len(),
        "Calculated list diff"
    );

    DiffResult { ops: script.ops, old_to_new, new_to_old }
}

/// Operation list that coalesces adjacent operations of the same kind
#[derive(Default)]
struct Script {
    ops: Vec<EditOp>,
}

impl Script {
    fn push(&mut self, op: EditOp) {
        if let Some(last) = self.ops.last_mut() {
            match (last, op) {
                (
                    EditOp::Insert { position: last_pos, count: last_count },
                    EditOp::Insert { position, count },
                ) if position >= *last_pos && position <= *last_pos + *last_count => {
                    *last_count += count;
                    return;
                }
                (
                    EditOp::Remove { position: last_pos, count: last_count },
                    EditOp::Remove { position, count },
                ) if *last_pos >= position && *last_pos <= position + count => {
                    *last_count += count;
                    *last_pos = position;
                    return;
                }
                (
                    EditOp::Change { position: last_pos, count: last_count },
                    EditOp::Change { position, count },
                ) if position <= *last_pos + *last_count && position + count >= *last_pos => {
                    let end = (*last_pos + *last_count).max(position + count);
                    *last_pos = (*last_pos).min(position);
                    *last_count = end - *last_pos;
                    return;
                }
                _ => {}
            }
        }
        self.ops.push(op);
    }
}

/// Matched `(old, new)` position pairs of a longest common subsequence,
/// in increasing order.
fn common_subsequence<F>(old_len: usize, new_len: usize, same: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    let mut pairs = Vec::new();

    let mut prefix = 0;
    while prefix < old_len && prefix < new_len && same(prefix, prefix) {
        pairs.push((prefix, prefix));
        prefix += 1;
    }

    let mut suffix = 0;
    while suffix < old_len - prefix
        && suffix < new_len - prefix
        && same(old_len - 1 - suffix, new_len - 1 - suffix)
    {
        suffix += 1;
    }

    let n = old_len - prefix - suffix;
    let m = new_len - prefix - suffix;
    if n > 0 && m > 0 {
        let middle = myers(n, m, |x, y| same(prefix + x, prefix + y));
        pairs.extend(middle.into_iter().map(|(x, y)| (prefix + x, prefix + y)));
    }

    pairs.extend((0..suffix).rev().map(|i| (old_len - 1 - i, new_len - 1 - i)));
    pairs
}

/// Myers' search in linear space
///
/// Each range is split at its middle snake, found by running the forward
/// and backward searches until their frontiers overlap. Only the two
/// frontiers are kept, so memory stays O(n + m) whatever the edit distance.
fn myers<F>(n: usize, m: usize, same: F) -> Vec<(usize, usize)>
where
    F: Fn(usize, usize) -> bool,
{
    let radius = (n + m + 1) / 2 + 1;
    let mut forward = Frontier::new(radius);
    let mut backward = Frontier::new(radius);

    let mut diagonals: Vec<(usize, usize, usize)> = Vec::new();
    let mut ranges = vec![Range { old_start: 0, old_end: n as isize, new_start: 0, new_end: m as isize }];

    while let Some(range) = ranges.pop() {
        let Some(snake) = middle_snake(&range, &same, &mut forward, &mut backward) else {
            // No snake means nothing in the range matches.
            continue;
        };
        diagonals.extend(snake.diagonal());

        let before = Range {
            old_start: range.old_start,
            old_end: snake.start_x,
            new_start: range.new_start,
            new_end: snake.start_y,
        };
        let after = Range {
            old_start: snake.end_x,
            old_end: range.old_end,
            new_start: snake.end_y,
            new_end: range.new_end,
        };
        ranges.extend([before, after].into_iter().filter(|r| !r.is_empty()));
    }

    diagonals.sort_unstable();
    diagonals
        .into_iter()
        .flat_map(|(x, y, len)| (0..len).map(move |i| (x + i, y + i)))
        .collect()
}

/// Half-open window of both lists still to be matched
struct Range {
    old_start: isize,
    old_end: isize,
    new_start: isize,
    new_end: isize,
}

impl Range {
    fn old_len(&self) -> isize {
        self.old_end - self.old_start
    }

    fn new_len(&self) -> isize {
        self.new_end - self.new_start
    }

    fn is_empty(&self) -> bool {
        self.old_len() <= 0 || self.new_len() <= 0
    }
}

/// Furthest-reaching x per diagonal, indexed from `-radius` to `radius`
struct Frontier {
    radius: isize,
    xs: Vec<isize>,
}

impl Frontier {
    fn new(radius: usize) -> Self {
        Self { radius: radius as isize, xs: vec![0; 2 * radius + 1] }
    }

    fn get(&self, k: isize) -> isize {
        self.xs[(k + self.radius) as usize]
    }

    fn set(&mut self, k: isize, x: isize) {
        self.xs[(k + self.radius) as usize] = x;
    }
}

/// One edit step plus its diagonal, from `start` to `end`
///
/// Forward snakes take the step first, reverse snakes take it last.
struct Snake {
    start_x: isize,
    start_y: isize,
    end_x: isize,
    end_y: isize,
    reverse: bool,
}

impl Snake {
    /// The matched run as `(x, y, len)`, if any
    fn diagonal(&self) -> Option<(usize, usize, usize)> {
        let dx = self.end_x - self.start_x;
        let dy = self.end_y - self.start_y;
        let len = dx.min(dy);
        if len <= 0 {
            return None;
        }

        let (x, y) = if dx == dy || self.reverse {
            (self.start_x, self.start_y)
        } else if dy > dx {
            (self.start_x, self.start_y + 1)
        } else {
            (self.start_x + 1, self.start_y)
        };
        Some((x as usize, y as usize, len as usize))
    }
}

fn middle_snake<F>(range: &Range, same: &F, forward: &mut Frontier, backward: &mut Frontier) -> Option<Snake>
where
    F: Fn(usize, usize) -> bool,
{
    let delta = range.old_len() - range.new_len();
    let odd = delta.rem_euclid(2) == 1;
    let rounds = (range.old_len() + range.new_len() + 1) / 2;

    forward.set(1, range.old_start);
    backward.set(1, range.old_end);

    for d in 0..rounds {
        if let Some(snake) = forward_round(range, same, forward, backward, d, delta, odd) {
            return Some(snake);
        }
        if let Some(snake) = backward_round(range, same, forward, backward, d, delta, !odd) {
            return Some(snake);
        }
    }
    None
}

fn forward_round<F>(
    range: &Range,
    same: &F,
    forward: &mut Frontier,
    backward: &Frontier,
    d: isize,
    delta: isize,
    check: bool,
) -> Option<Snake>
where
    F: Fn(usize, usize) -> bool,
{
    let mut k = -d;
    while k <= d {
        let (start_x, mut x) = if k == -d || (k != d && forward.get(k + 1) > forward.get(k - 1)) {
            let x = forward.get(k + 1);
            (x, x)
        } else {
            let x = forward.get(k - 1);
            (x, x + 1)
        };
        let mut y = range.new_start + (x - range.old_start) - k;
        let start_y = if d == 0 || x != start_x { y } else { y - 1 };

        while x < range.old_end && y < range.new_end && same(x as usize, y as usize) {
            x += 1;
            y += 1;
        }
        forward.set(k, x);

        let back_k = delta - k;
        if check && back_k > -d && back_k < d && backward.get(back_k) <= x {
            return Some(Snake { start_x, start_y, end_x: x, end_y: y, reverse: false });
        }
        k += 2;
    }
    None
}

/// Mirror of [`forward_round`]; diagonals are measured from the range end.
fn backward_round<F>(
    range: &Range,
    same: &F,
    forward: &Frontier,
    backward: &mut Frontier,
    d: isize,
    delta: isize,
    check: bool,
) -> Option<Snake>
where
    F: Fn(usize, usize) -> bool,
{
    let mut k = -d;
    while k <= d {
        let (start_x, mut x) = if k == -d || (k != d && backward.get(k + 1) < backward.get(k - 1)) {
            let x = backward.get(k + 1);
            (x, x)
        } else {
            let x = backward.get(k - 1);
            (x, x - 1)
        };
        let mut y = range.new_end - ((range.old_end - x) - k);
        let start_y = if d == 0 || x != start_x { y } else { y + 1 };

        while x > range.old_start && y > range.new_start && same((x - 1) as usize, (y - 1) as usize) {
            x -= 1;
            y -= 1;
        }
        backward.set(k, x);

        let forward_k = delta - k;
        if check && forward_k >= -d && forward_k <= d && forward.get(forward_k) >= x {
            return Some(Snake { start_x: x, start_y: y, end_x: start_x, end_y: start_y, reverse: true });
        }
        k += 2;
    }
    None
}
