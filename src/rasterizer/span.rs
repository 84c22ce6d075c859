//! Span buffer
//!
//! Each scanline keeps two singly linked lists of spans, threaded through a
//! shared pool by index:
//! - opaque: left-to-right, never overlapping
//! - transparent: back-to-front, may overlap
//!
//! Static geometry arrives front-to-back, so a new static span only fills
//! the gaps between what is already there. Movable geometry can land in
//! front of or behind anything, so it is interleaved by comparing depth.

use super::constants::NO_SPAN;
use super::types::{Color, TextureId};

/// Horizontal run of pixels on one scanline, covering `[start_sx, end_sx)`.
///
/// Interpolants are sampled at pixel `start_sx` and step by their deltas
/// per pixel. Texture coordinates are stored divided by depth.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub start_sx: i32,
    pub end_sx: i32,
    pub one_on_tz: f32,
    pub u_on_tz: f32,
    pub v_on_tz: f32,
    pub d_one_on_tz: f32,
    pub d_u_on_tz: f32,
    pub d_v_on_tz: f32,
    /// `None` fills with `color`
    pub texture: Option<TextureId>,
    pub color: Color,
    pub brightness: u8,
    /// Goes on the transparent list
    pub transparent: bool,
    /// Always drawn over non-popup spans regardless of depth
    pub popup: bool,
    next: u32,
}

impl Span {
    pub fn new(start_sx: i32, end_sx: i32) -> Self {
        Self {
            start_sx,
            end_sx,
            one_on_tz: 0.0,
            u_on_tz: 0.0,
            v_on_tz: 0.0,
            d_one_on_tz: 0.0,
            d_u_on_tz: 0.0,
            d_v_on_tz: 0.0,
            texture: None,
            color: Color::WHITE,
            brightness: 0,
            transparent: false,
            popup: false,
            next: NO_SPAN,
        }
    }

    /// Constant-depth span, handy for tests and flat overlays
    pub fn flat(start_sx: i32, end_sx: i32, one_on_tz: f32) -> Self {
        Self {
            one_on_tz,
            ..Self::new(start_sx, end_sx)
        }
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.end_sx - self.start_sx
    }

    /// Inverse depth at pixel column `sx`
    #[inline]
    pub fn one_on_tz_at(&self, sx: f32) -> f32 {
        self.one_on_tz + (sx - self.start_sx as f32) * self.d_one_on_tz
    }

    /// Move the left edge right to `new_start`, advancing the interpolants
    fn clip_left(&mut self, new_start: i32) {
        let d = (new_start - self.start_sx) as f32;
        self.one_on_tz += d * self.d_one_on_tz;
        self.u_on_tz += d * self.d_u_on_tz;
        self.v_on_tz += d * self.d_v_on_tz;
        self.start_sx = new_start;
    }

    #[inline]
    fn clip_right(&mut self, new_end: i32) {
        self.end_sx = new_end;
    }

    /// Copy restricted to `[start, end)`
    fn piece(&self, start: i32, end: i32) -> Span {
        let mut s = *self;
        s.clip_left(start);
        s.clip_right(end);
        s.next = NO_SPAN;
        s
    }

    #[inline]
    fn overlaps(&self, start: i32, end: i32) -> bool {
        self.start_sx < end && start < self.end_sx
    }
}

/// Is `a` in front of `b` where they overlap?
///
/// Popup spans beat non-popup ones. Otherwise inverse depth is compared
/// once, at the middle of the overlap; a tie goes to `b`.
pub fn span_in_front(a: &Span, b: &Span) -> bool {
    if a.popup != b.popup {
        return a.popup;
    }
    let start = a.start_sx.max(b.start_sx);
    let end = a.end_sx.min(b.end_sx);
    let mid = if end > start {
        (start + end - 1) as f32 * 0.5
    } else {
        start as f32
    };
    a.one_on_tz_at(mid) > b.one_on_tz_at(mid)
}

/// Free-list arena of spans. Cleared per frame, capacity kept.
#[derive(Debug, Default)]
pub struct SpanPool {
    spans: Vec<Span>,
    free: Vec<u32>,
}

impl SpanPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn alloc(&mut self, mut span: Span) -> u32 {
        span.next = NO_SPAN;
        match self.free.pop() {
            Some(id) => {
                self.spans[id as usize] = span;
                id
            }
            None => {
                self.spans.push(span);
                (self.spans.len() - 1) as u32
            }
        }
    }

    fn release(&mut self, id: u32) {
        self.free.push(id);
    }

    pub fn reset(&mut self) {
        self.spans.clear();
        self.free.clear();
    }

    /// Spans currently linked into some row
    pub fn live(&self) -> usize {
        self.spans.len() - self.free.len()
    }

    pub fn capacity(&self) -> usize {
        self.spans.capacity()
    }

    #[inline]
    pub fn get(&self, id: u32) -> &Span {
        &self.spans[id as usize]
    }

    #[inline]
    fn get_mut(&mut self, id: u32) -> &mut Span {
        &mut self.spans[id as usize]
    }
}

/// List heads for one scanline
#[derive(Debug, Clone, Copy)]
pub struct SpanRow {
    pub opaque: u32,
    pub transparent: u32,
}

impl SpanRow {
    pub const EMPTY: SpanRow = SpanRow { opaque: NO_SPAN, transparent: NO_SPAN };
}

/// Walks one span list in link order
pub struct SpanIter<'a> {
    pool: &'a SpanPool,
    cur: u32,
}

impl<'a> Iterator for SpanIter<'a> {
    type Item = &'a Span;

    fn next(&mut self) -> Option<&'a Span> {
        if self.cur == NO_SPAN {
            return None;
        }
        let span = self.pool.get(self.cur);
        self.cur = span.next;
        Some(span)
    }
}

/// Builds a singly linked list front to back
struct ListBuilder {
    head: u32,
    tail: u32,
}

impl ListBuilder {
    fn new() -> Self {
        Self { head: NO_SPAN, tail: NO_SPAN }
    }

    fn push(&mut self, pool: &mut SpanPool, id: u32) {
        pool.get_mut(id).next = NO_SPAN;
        if self.tail == NO_SPAN {
            self.head = id;
        } else {
            pool.get_mut(self.tail).next = id;
        }
        self.tail = id;
    }
}

/// Per-frame span lists for every scanline of the target
#[derive(Debug)]
pub struct SpanBuffer {
    width: i32,
    rows: Vec<SpanRow>,
    pool: SpanPool,
    /// Visible pieces of the span being inserted
    pieces: Vec<Span>,
}

impl SpanBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width: width as i32,
            rows: vec![SpanRow::EMPTY; height],
            pool: SpanPool::new(),
            pieces: Vec::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Resize for a new target (drops all spans)
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width as i32;
        self.rows.clear();
        self.rows.resize(height, SpanRow::EMPTY);
        self.pool.reset();
    }

    /// Empty every row; pool storage is kept for the next frame
    pub fn begin_frame(&mut self) {
        for row in &mut self.rows {
            *row = SpanRow::EMPTY;
        }
        self.pool.reset();
    }

    pub fn pool(&self) -> &SpanPool {
        &self.pool
    }

    pub fn opaque(&self, y: usize) -> SpanIter<'_> {
        SpanIter {
            pool: &self.pool,
            cur: self.rows.get(y).map_or(NO_SPAN, |r| r.opaque),
        }
    }

    /// Transparent spans back to front
    pub fn transparent(&self, y: usize) -> SpanIter<'_> {
        SpanIter {
            pool: &self.pool,
            cur: self.rows.get(y).map_or(NO_SPAN, |r| r.transparent),
        }
    }

    /// Clamp to the row; `None` when nothing is left
    fn clip_to_row(&self, y: i32, mut span: Span) -> Option<Span> {
        if y < 0 || y as usize >= self.rows.len() {
            return None;
        }
        if span.start_sx < 0 {
            span.clip_left(0);
        }
        if span.end_sx > self.width {
            span.clip_right(self.width);
        }
        if span.start_sx >= span.end_sx {
            return None;
        }
        Some(span)
    }

    /// Insert a span from static geometry. Callers go front to back, so
    /// whatever is already in the opaque list hides the new span.
    ///
    /// Returns whether any part of the span was kept.
    pub fn add_span(&mut self, y: i32, span: Span) -> bool {
        let Some(span) = self.clip_to_row(y, span) else {
            return false;
        };
        let row = y as usize;

        if span.transparent {
            self.collect_gaps(row, &span);
            if self.pieces.is_empty() {
                return false;
            }
            // Each piece goes on the head: it is the backmost so far
            for i in (0..self.pieces.len()).rev() {
                let id = self.pool.alloc(self.pieces[i]);
                self.pool.get_mut(id).next = self.rows[row].transparent;
                self.rows[row].transparent = id;
            }
            return true;
        }

        let mut out = ListBuilder::new();
        let mut pending = Some(span);
        let mut inserted = false;
        let mut cur = self.rows[row].opaque;

        while cur != NO_SPAN {
            let next = self.pool.get(cur).next;
            let existing = *self.pool.get(cur);
            if let Some(mut n) = pending {
                if existing.end_sx <= n.start_sx {
                    // Entirely left of the new span
                } else if n.end_sx <= existing.start_sx {
                    let id = self.pool.alloc(n);
                    out.push(&mut self.pool, id);
                    inserted = true;
                    pending = None;
                } else {
                    if n.start_sx < existing.start_sx {
                        let id = self.pool.alloc(n.piece(n.start_sx, existing.start_sx));
                        out.push(&mut self.pool, id);
                        inserted = true;
                    }
                    if n.end_sx > existing.end_sx {
                        n.clip_left(existing.end_sx);
                        pending = Some(n);
                    } else {
                        pending = None;
                    }
                }
            }
            out.push(&mut self.pool, cur);
            cur = next;
        }
        if let Some(n) = pending {
            let id = self.pool.alloc(n);
            out.push(&mut self.pool, id);
            inserted = true;
        }
        self.rows[row].opaque = out.head;
        inserted
    }

    /// Insert a span from movable geometry, which may sit in front of or
    /// behind anything already placed. Returns whether any part is visible.
    pub fn add_movable_span(&mut self, y: i32, span: Span) -> bool {
        let Some(span) = self.clip_to_row(y, span) else {
            return false;
        };
        let row = y as usize;
        if span.transparent {
            self.insert_movable_transparent(row, span)
        } else {
            self.insert_movable_opaque(row, span)
        }
    }

    fn insert_movable_opaque(&mut self, row: usize, span: Span) -> bool {
        let mut out = ListBuilder::new();
        let mut pending = Some(span);
        self.pieces.clear();
        let mut cur = self.rows[row].opaque;

        while cur != NO_SPAN {
            let next = self.pool.get(cur).next;
            let existing = *self.pool.get(cur);

            let Some(mut n) = pending else {
                out.push(&mut self.pool, cur);
                cur = next;
                continue;
            };

            if existing.end_sx <= n.start_sx {
                out.push(&mut self.pool, cur);
            } else if n.end_sx <= existing.start_sx {
                self.place_piece(&mut out, n);
                pending = None;
                out.push(&mut self.pool, cur);
            } else if span_in_front(&n, &existing) {
                // New span wins the overlap: trim or split the existing one
                let has_left = existing.start_sx < n.start_sx;
                let has_right = existing.end_sx > n.end_sx;
                match (has_left, has_right) {
                    (true, true) => {
                        self.pool.get_mut(cur).clip_right(n.start_sx);
                        out.push(&mut self.pool, cur);
                        self.place_piece(&mut out, n);
                        let right = self.pool.alloc(existing.piece(n.end_sx, existing.end_sx));
                        out.push(&mut self.pool, right);
                        pending = None;
                    }
                    (true, false) => {
                        self.pool.get_mut(cur).clip_right(n.start_sx);
                        out.push(&mut self.pool, cur);
                    }
                    (false, true) => {
                        self.place_piece(&mut out, n);
                        self.pool.get_mut(cur).clip_left(n.end_sx);
                        out.push(&mut self.pool, cur);
                        pending = None;
                    }
                    (false, false) => {
                        self.pool.release(cur);
                    }
                }
            } else {
                // Existing span wins: the new one only shows around it
                if n.start_sx < existing.start_sx {
                    self.place_piece(&mut out, n.piece(n.start_sx, existing.start_sx));
                }
                out.push(&mut self.pool, cur);
                if n.end_sx > existing.end_sx {
                    n.clip_left(existing.end_sx);
                    pending = Some(n);
                } else {
                    pending = None;
                }
            }
            cur = next;
        }
        if let Some(n) = pending {
            self.place_piece(&mut out, n);
        }
        self.rows[row].opaque = out.head;

        if self.pieces.is_empty() {
            return false;
        }
        self.trim_transparent_behind(row, &span);
        true
    }

    /// Link a visible piece of the movable span and remember its extent
    fn place_piece(&mut self, out: &mut ListBuilder, piece: Span) {
        let id = self.pool.alloc(piece);
        out.push(&mut self.pool, id);
        self.pieces.push(piece);
    }

    /// Cut transparent spans wherever a newly placed opaque piece covers
    /// them from in front.
    fn trim_transparent_behind(&mut self, row: usize, span: &Span) {
        let mut prev = NO_SPAN;
        let mut cur = self.rows[row].transparent;

        while cur != NO_SPAN {
            let mut node = cur;
            let mut removed = false;
            for i in 0..self.pieces.len() {
                let (ps, pe) = (self.pieces[i].start_sx, self.pieces[i].end_sx);
                let t = *self.pool.get(node);
                if !t.overlaps(ps, pe) || !span_in_front(span, &t) {
                    continue;
                }
                let has_left = t.start_sx < ps;
                let has_right = t.end_sx > pe;
                match (has_left, has_right) {
                    (true, true) => {
                        let right = self.pool.alloc(t.piece(pe, t.end_sx));
                        self.pool.get_mut(right).next = t.next;
                        let left = self.pool.get_mut(node);
                        left.clip_right(ps);
                        left.next = right;
                        prev = node;
                        node = right;
                    }
                    (true, false) => self.pool.get_mut(node).clip_right(ps),
                    (false, true) => self.pool.get_mut(node).clip_left(pe),
                    (false, false) => {
                        if prev == NO_SPAN {
                            self.rows[row].transparent = t.next;
                        } else {
                            self.pool.get_mut(prev).next = t.next;
                        }
                        self.pool.release(node);
                        removed = true;
                        break;
                    }
                }
            }
            let next = self.pool.get(node).next;
            if !removed {
                prev = node;
            }
            cur = next;
        }
    }

    /// Clip a movable transparent span against opaque spans in front of it,
    /// then slot each visible piece into the back-to-front list.
    fn insert_movable_transparent(&mut self, row: usize, span: Span) -> bool {
        self.pieces.clear();
        let mut pending = Some(span);
        let mut cur = self.rows[row].opaque;
        while cur != NO_SPAN {
            let existing = *self.pool.get(cur);
            cur = existing.next;
            let Some(mut n) = pending else { break };
            if existing.end_sx <= n.start_sx {
                continue;
            }
            if n.end_sx <= existing.start_sx {
                break;
            }
            if span_in_front(&n, &existing) {
                continue;
            }
            if n.start_sx < existing.start_sx {
                self.pieces.push(n.piece(n.start_sx, existing.start_sx));
            }
            if n.end_sx > existing.end_sx {
                n.clip_left(existing.end_sx);
                pending = Some(n);
            } else {
                pending = None;
            }
        }
        if let Some(n) = pending {
            self.pieces.push(n);
        }
        if self.pieces.is_empty() {
            return false;
        }

        for i in 0..self.pieces.len() {
            let piece = self.pieces[i];
            // Walk back to front; stop at the first overlapping span nearer than us
            let mut prev = NO_SPAN;
            let mut cur = self.rows[row].transparent;
            while cur != NO_SPAN {
                let t = self.pool.get(cur);
                if t.overlaps(piece.start_sx, piece.end_sx) && !span_in_front(&piece, t) {
                    break;
                }
                prev = cur;
                cur = t.next;
            }
            let id = self.pool.alloc(piece);
            self.pool.get_mut(id).next = cur;
            if prev == NO_SPAN {
                self.rows[row].transparent = id;
            } else {
                self.pool.get_mut(prev).next = id;
            }
        }
        true
    }

    /// Opaque gaps the span would show through, into `self.pieces`
    fn collect_gaps(&mut self, row: usize, span: &Span) {
        self.pieces.clear();
        let mut pending = Some(*span);
        let mut cur = self.rows[row].opaque;
        while cur != NO_SPAN {
            let existing = *self.pool.get(cur);
            cur = existing.next;
            let Some(mut n) = pending else { break };
            if existing.end_sx <= n.start_sx {
                continue;
            }
            if n.end_sx <= existing.start_sx {
                break;
            }
            if n.start_sx < existing.start_sx {
                self.pieces.push(n.piece(n.start_sx, existing.start_sx));
            }
            if n.end_sx > existing.end_sx {
                n.clip_left(existing.end_sx);
                pending = Some(n);
            } else {
                pending = None;
            }
        }
        if let Some(n) = pending {
            self.pieces.push(n);
        }
    }

    /// Total spans linked into rows
    pub fn span_count(&self) -> usize {
        self.pool.live()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extents(buf: &SpanBuffer, y: usize) -> Vec<(i32, i32)> {
        buf.opaque(y).map(|s| (s.start_sx, s.end_sx)).collect()
    }

    fn transparent_extents(buf: &SpanBuffer, y: usize) -> Vec<(i32, i32)> {
        buf.transparent(y).map(|s| (s.start_sx, s.end_sx)).collect()
    }

    fn glass(start: i32, end: i32, one_on_tz: f32) -> Span {
        Span {
            transparent: true,
            ..Span::flat(start, end, one_on_tz)
        }
    }

    fn assert_sorted_disjoint(buf: &SpanBuffer, y: usize) {
        let spans = extents(buf, y);
        for pair in spans.windows(2) {
            assert!(pair[0].1 <= pair[1].0, "overlap in {:?}", spans);
        }
        for (s, e) in spans {
            assert!(s < e);
        }
    }

    #[test]
    fn test_clip_to_width() {
        let mut buf = SpanBuffer::new(100, 4);
        assert!(buf.add_span(0, Span::flat(-20, 30, 0.5)));
        assert!(buf.add_span(1, Span::flat(80, 200, 0.5)));
        assert!(!buf.add_span(2, Span::flat(120, 200, 0.5)));
        assert!(!buf.add_span(2, Span::flat(40, 40, 0.5)));
        assert!(!buf.add_span(9, Span::flat(0, 10, 0.5)));
        assert_eq!(extents(&buf, 0), vec![(0, 30)]);
        assert_eq!(extents(&buf, 1), vec![(80, 100)]);
        assert!(extents(&buf, 2).is_empty());
    }

    #[test]
    fn test_clip_left_advances_interpolants() {
        let mut buf = SpanBuffer::new(100, 1);
        let span = Span {
            d_one_on_tz: 0.01,
            d_u_on_tz: 1.0,
            ..Span::flat(-10, 10, 0.5)
        };
        buf.add_span(0, span);
        let s = buf.opaque(0).next().copied().unwrap();
        assert_eq!(s.start_sx, 0);
        assert!((s.one_on_tz - 0.6).abs() < 1e-5);
        assert!((s.u_on_tz - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_static_spans_fill_gaps_only() {
        let mut buf = SpanBuffer::new(320, 1);
        assert!(buf.add_span(0, Span::flat(10, 20, 0.9)));
        assert!(buf.add_span(0, Span::flat(40, 50, 0.9)));
        // Farther span straddling both
        assert!(buf.add_span(0, Span::flat(5, 60, 0.1)));
        assert_eq!(extents(&buf, 0), vec![(5, 10), (10, 20), (20, 40), (40, 50), (50, 60)]);
        assert_sorted_disjoint(&buf, 0);
        // Completely hidden
        assert!(!buf.add_span(0, Span::flat(12, 18, 0.05)));
        assert_eq!(buf.opaque(0).count(), 5);
    }

    #[test]
    fn test_static_order_wins_over_depth() {
        // Insertion order decides for static spans, even if depth disagrees
        let mut buf = SpanBuffer::new(100, 1);
        buf.add_span(0, Span::flat(0, 50, 0.1));
        buf.add_span(0, Span::flat(25, 75, 0.9));
        assert_eq!(extents(&buf, 0), vec![(0, 50), (50, 75)]);
    }

    #[test]
    fn test_static_transparent_goes_to_head() {
        let mut buf = SpanBuffer::new(100, 1);
        buf.add_span(0, Span::flat(40, 60, 0.9));
        assert!(buf.add_span(0, glass(10, 30, 0.5)));
        // Split around the opaque span in front of it
        assert!(buf.add_span(0, glass(20, 80, 0.3)));
        assert_eq!(transparent_extents(&buf, 0), vec![(20, 40), (60, 80), (10, 30)]);
        assert_eq!(extents(&buf, 0), vec![(40, 60)]);
        // Fully behind opaque
        assert!(!buf.add_span(0, glass(45, 55, 0.1)));
    }

    #[test]
    fn test_movable_in_front_splits_existing() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_span(0, Span::flat(0, 100, 0.1));
        assert!(buf.add_movable_span(0, Span::flat(40, 60, 0.5)));
        let spans: Vec<Span> = buf.opaque(0).copied().collect();
        assert_eq!(extents(&buf, 0), vec![(0, 40), (40, 60), (60, 100)]);
        assert_eq!(spans[1].one_on_tz, 0.5);
        assert_eq!(spans[2].one_on_tz, 0.1);
    }

    #[test]
    fn test_movable_behind_is_clipped() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_span(0, Span::flat(40, 60, 0.5));
        assert!(buf.add_movable_span(0, Span::flat(0, 100, 0.1)));
        let spans: Vec<Span> = buf.opaque(0).copied().collect();
        assert_eq!(extents(&buf, 0), vec![(0, 40), (40, 60), (60, 100)]);
        assert_eq!(spans[1].one_on_tz, 0.5);
        // Hidden entirely
        assert!(!buf.add_movable_span(0, Span::flat(45, 55, 0.2)));
    }

    #[test]
    fn test_movable_spanning_several() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_span(0, Span::flat(0, 30, 0.2));
        buf.add_span(0, Span::flat(30, 60, 0.8));
        buf.add_span(0, Span::flat(60, 90, 0.2));
        // In front of the outer two, behind the middle one
        assert!(buf.add_movable_span(0, Span::flat(20, 70, 0.5)));
        let spans: Vec<Span> = buf.opaque(0).copied().collect();
        assert_eq!(
            extents(&buf, 0),
            vec![(0, 20), (20, 30), (30, 60), (60, 70), (70, 90)]
        );
        assert_eq!(spans[1].one_on_tz, 0.5);
        assert_eq!(spans[2].one_on_tz, 0.8);
        assert_eq!(spans[3].one_on_tz, 0.5);
        assert_sorted_disjoint(&buf, 0);
    }

    #[test]
    fn test_two_movables_nearer_wins() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_movable_span(0, Span::flat(10, 50, 0.3));
        buf.add_movable_span(0, Span::flat(30, 80, 0.6));
        assert_eq!(extents(&buf, 0), vec![(10, 30), (30, 80)]);

        let mut buf = SpanBuffer::new(200, 1);
        buf.add_movable_span(0, Span::flat(10, 50, 0.6));
        buf.add_movable_span(0, Span::flat(30, 80, 0.3));
        assert_eq!(extents(&buf, 0), vec![(10, 50), (50, 80)]);
    }

    #[test]
    fn test_popup_beats_depth() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_span(0, Span::flat(0, 100, 0.9));
        let popup = Span {
            popup: true,
            ..Span::flat(20, 40, 0.01)
        };
        assert!(buf.add_movable_span(0, popup));
        assert_eq!(extents(&buf, 0), vec![(0, 20), (20, 40), (40, 100)]);
    }

    #[test]
    fn test_depth_tie_keeps_existing() {
        let a = Span::flat(0, 10, 0.5);
        let b = Span::flat(5, 15, 0.5);
        assert!(!span_in_front(&a, &b));
        assert!(!span_in_front(&b, &a));
    }

    #[test]
    fn test_in_front_uses_overlap_midpoint() {
        // a recedes left to right, b is flat; they cross at x = 50
        let a = Span {
            d_one_on_tz: -0.01,
            ..Span::flat(0, 100, 1.0)
        };
        let b = Span::flat(0, 100, 0.5);
        let early = Span::flat(0, 20, 0.5);
        assert!(span_in_front(&a, &early));
        let late = Span::flat(80, 100, 0.5);
        assert!(!span_in_front(&a, &late));
        assert!(!span_in_front(&b, &late));
    }

    #[test]
    fn test_movable_opaque_trims_transparent_behind() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_span(0, glass(0, 100, 0.2));
        buf.add_span(0, glass(0, 100, 0.9));
        assert!(buf.add_movable_span(0, Span::flat(40, 60, 0.5)));
        // The far pane is cut around the new span, the near one is untouched
        assert_eq!(transparent_extents(&buf, 0), vec![(0, 100), (0, 40), (60, 100)]);
    }

    #[test]
    fn test_movable_transparent_orders_by_depth() {
        let mut buf = SpanBuffer::new(200, 1);
        // Static panes: near first, so the far one ends up at the head
        buf.add_span(0, glass(0, 100, 0.8));
        buf.add_span(0, glass(0, 100, 0.2));
        assert!(buf.add_movable_span(0, glass(30, 70, 0.5)));
        let depths: Vec<f32> = buf.transparent(0).map(|s| s.one_on_tz).collect();
        assert_eq!(depths, vec![0.2, 0.5, 0.8]);
    }

    #[test]
    fn test_movable_transparent_hidden_by_nearer_opaque() {
        let mut buf = SpanBuffer::new(200, 1);
        buf.add_span(0, Span::flat(0, 50, 0.9));
        buf.add_span(0, Span::flat(50, 100, 0.1));
        assert!(buf.add_movable_span(0, glass(20, 80, 0.5)));
        assert_eq!(transparent_extents(&buf, 0), vec![(50, 80)]);
    }

    #[test]
    fn test_pool_reused_across_frames() {
        let mut buf = SpanBuffer::new(100, 2);
        for frame in 0..3 {
            buf.begin_frame();
            assert_eq!(buf.span_count(), 0);
            buf.add_span(0, Span::flat(0, 10, 0.5));
            buf.add_span(1, Span::flat(0, 10, 0.5));
            buf.add_movable_span(1, Span::flat(2, 4, 0.9));
            assert_eq!(buf.span_count(), 4, "frame {}", frame);
        }
        assert!(buf.pool().capacity() >= 4);
    }

    #[test]
    fn test_released_spans_recycled() {
        let mut buf = SpanBuffer::new(100, 1);
        buf.add_span(0, Span::flat(10, 20, 0.1));
        // Swallows the existing span whole
        buf.add_movable_span(0, Span::flat(0, 30, 0.9));
        assert_eq!(extents(&buf, 0), vec![(0, 30)]);
        assert_eq!(buf.span_count(), 1);
    }
}
