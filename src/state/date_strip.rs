// Virtualized date strip state.
// Maps a fixed index range onto calendar days around an anchored "today".

use std::ops::Range;
use std::time::Instant;

use chrono::{Local, NaiveDate, NaiveDateTime, TimeDelta};

use crate::error::{HuddleError, Result};

use super::scroll::{
    Align, ScrollAck, ScrollController, ScrollError, ScrollEvent, ScrollRequest, VirtualList,
};

/// Number of addressable days in the strip.
pub const TOTAL_DAYS: usize = 20_000;
/// Index of offset 0 (today).
pub const INITIAL_INDEX: usize = 10_000;

/// Pure mapping between strip indices, day offsets and calendar days.
///
/// The anchor is captured once; a session running past midnight keeps the
/// old anchor as offset 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateIndex {
    anchor: NaiveDate,
    total: usize,
    initial: usize,
}

impl DateIndex {
    pub fn new(anchor: NaiveDate) -> Self {
        Self {
            anchor,
            total: TOTAL_DAYS,
            initial: INITIAL_INDEX,
        }
    }

    /// Anchor on the local calendar day.
    pub fn today() -> Self {
        Self::new(Local::now().date_naive())
    }

    pub fn with_range(anchor: NaiveDate, total: usize, initial: usize) -> Result<Self> {
        if initial >= total {
            return Err(HuddleError::InvalidConfig(format!(
                "initial index {} must be below total {}",
                initial, total
            )));
        }
        Ok(Self {
            anchor,
            total,
            initial,
        })
    }

    pub fn anchor(&self) -> NaiveDate {
        self.anchor
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn initial_index(&self) -> usize {
        self.initial
    }

    /// Valid offsets: `[-initial, total - initial)`.
    pub fn offset_range(&self) -> Range<i64> {
        -(self.initial as i64)..(self.total - self.initial) as i64
    }

    pub fn date_from_offset(&self, offset: i64) -> Option<NaiveDate> {
        if !self.offset_range().contains(&offset) {
            return None;
        }
        self.anchor.checked_add_signed(TimeDelta::days(offset))
    }

    /// Day distance from the anchor, or `None` outside the strip.
    pub fn offset_from_date(&self, date: NaiveDate) -> Option<i64> {
        let offset = date.signed_duration_since(self.anchor).num_days();
        self.offset_range().contains(&offset).then_some(offset)
    }

    pub fn index_for_offset(&self, offset: i64) -> Option<usize> {
        self.offset_range()
            .contains(&offset)
            .then(|| (self.initial as i64 + offset) as usize)
    }

    pub fn offset_for_index(&self, index: usize) -> Option<i64> {
        (index < self.total).then(|| index as i64 - self.initial as i64)
    }

    pub fn date_for_index(&self, index: usize) -> Option<NaiveDate> {
        self.offset_for_index(index)
            .and_then(|offset| self.date_from_offset(offset))
    }

    pub fn index_for_date(&self, date: NaiveDate) -> Option<usize> {
        self.offset_from_date(date)
            .and_then(|offset| self.index_for_offset(offset))
    }
}

/// Strip a timestamp down to its calendar day.
pub fn normalize(when: NaiveDateTime) -> NaiveDate {
    when.date()
}

/// Short label for a day cell, e.g. `Mon 14`.
pub fn day_label(date: NaiveDate) -> String {
    date.format("%a %d").to_string()
}

type SelectCallback = Box<dyn FnMut(NaiveDate) + Send>;

/// Selection, measurement and scroll state of the date strip.
pub struct DateStrip {
    index: DateIndex,
    selected: NaiveDate,
    item_width: Option<u16>,
    initial_scroll_issued: bool,
    scroll: ScrollController,
    on_select: Option<SelectCallback>,
}

impl DateStrip {
    pub fn new(index: DateIndex) -> Self {
        Self {
            selected: index.anchor(),
            index,
            item_width: None,
            initial_scroll_issued: false,
            scroll: ScrollController::new(),
            on_select: None,
        }
    }

    /// Register the callback invoked with every accepted selection.
    pub fn with_on_select(mut self, callback: impl FnMut(NaiveDate) + Send + 'static) -> Self {
        self.on_select = Some(Box::new(callback));
        self
    }

    pub fn index(&self) -> &DateIndex {
        &self.index
    }

    pub fn selected(&self) -> NaiveDate {
        self.selected
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.index.index_for_date(self.selected)
    }

    pub fn item_width(&self) -> Option<u16> {
        self.item_width
    }

    pub fn scroll(&self) -> &ScrollController {
        &self.scroll
    }

    /// Record the width of a rendered sample cell.
    ///
    /// The first non-zero measurement issues the initial scroll to the
    /// current selection. Returns true when that happened.
    pub fn on_sample_measured(&mut self, width: u16, now: Instant) -> bool {
        if width == 0 {
            return false;
        }
        self.item_width = Some(width);

        if self.initial_scroll_issued {
            return false;
        }
        self.initial_scroll_issued = true;
        let target = self.selected_index().unwrap_or(self.index.initial_index());
        tracing::debug!(width, index = target, "date strip measured");
        self.scroll.request(target, now) == ScrollRequest::Accepted
    }

    /// Select the day containing `when`.
    pub fn select_date(&mut self, when: NaiveDateTime, now: Instant) -> Result<NaiveDate> {
        self.select_day(normalize(when), now)
    }

    /// Select `day`, scroll it to the center and notify the callback.
    ///
    /// Days outside the addressable range are rejected and leave the
    /// selection unchanged.
    pub fn select_day(&mut self, day: NaiveDate, now: Instant) -> Result<NaiveDate> {
        let index = self.index.index_for_date(day).ok_or_else(|| {
            HuddleError::DateOutOfRange {
                offset: day.signed_duration_since(self.index.anchor()).num_days(),
            }
        })?;

        self.selected = day;
        if self.item_width.is_some() && self.scroll.request(index, now) == ScrollRequest::Dropped
        {
            tracing::debug!(%day, "selection scroll dropped, another scroll in flight");
        }

        if let Some(callback) = self.on_select.as_mut() {
            callback(day);
        }
        Ok(day)
    }

    /// Move the selection by whole days.
    pub fn step(&mut self, days: i64, now: Instant) -> Result<NaiveDate> {
        let current = self
            .index
            .offset_from_date(self.selected)
            .unwrap_or_default();
        let target = current.saturating_add(days);
        let day = self
            .index
            .date_from_offset(target)
            .ok_or(HuddleError::DateOutOfRange { offset: target })?;
        self.select_day(day, now)
    }

    pub fn jump_to_today(&mut self, now: Instant) -> Result<NaiveDate> {
        self.select_day(self.index.anchor(), now)
    }

    pub fn tick(&mut self, now: Instant, list: &mut impl VirtualList) -> Option<ScrollEvent> {
        self.scroll.tick(now, list)
    }

    pub fn on_scroll_complete(&mut self) -> Option<ScrollEvent> {
        self.scroll.on_scroll_complete()
    }
}

/// Window of strip cells currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripViewport {
    /// Index of the leftmost visible cell.
    pub first: usize,
    /// Number of cells that fit, zero until laid out.
    pub visible: usize,
    pub total: usize,
}

impl StripViewport {
    pub fn new(total: usize) -> Self {
        Self {
            first: 0,
            visible: 0,
            total,
        }
    }

    /// Update how many cells fit, keeping the window inside the range.
    pub fn set_visible(&mut self, visible: usize) {
        self.visible = visible.min(self.total);
        self.first = self.first.min(self.total - self.visible);
    }

    pub fn visible_range(&self) -> Range<usize> {
        self.first..self.first + self.visible
    }
}

impl VirtualList for StripViewport {
    fn scroll_to_index(&mut self, index: usize, align: Align) -> std::result::Result<ScrollAck, ScrollError> {
        if self.visible == 0 {
            return Err(ScrollError::NotLaidOut);
        }
        if index >= self.total {
            return Err(ScrollError::OutOfBounds {
                index,
                len: self.total,
            });
        }

        let first = match align {
            Align::Start => index,
            Align::Center => index.saturating_sub(self.visible / 2),
            Align::End => index.saturating_sub(self.visible - 1),
        };
        self.first = first.min(self.total - self.visible);
        Ok(ScrollAck::Completed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn anchor() -> NaiveDate {
        day(2024, 3, 15)
    }

    #[test]
    fn test_offset_round_trip_over_whole_range() {
        let index = DateIndex::new(anchor());
        for offset in index.offset_range() {
            let date = index.date_from_offset(offset).unwrap();
            assert_eq!(index.offset_from_date(date), Some(offset));
        }
    }

    #[test]
    fn test_offset_zero_is_anchor_day() {
        let index = DateIndex::new(anchor());
        assert_eq!(index.date_from_offset(0), Some(anchor()));

        let late = anchor().and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap());
        assert_eq!(index.offset_from_date(normalize(late)), Some(0));
    }

    #[test]
    fn test_index_mapping() {
        let index = DateIndex::new(anchor());
        assert_eq!(index.index_for_offset(0), Some(INITIAL_INDEX));
        assert_eq!(index.date_for_index(INITIAL_INDEX + 1), Some(day(2024, 3, 16)));
        assert_eq!(index.date_for_index(0), index.date_from_offset(-10_000));
        assert_eq!(index.index_for_date(day(2024, 2, 29)), Some(INITIAL_INDEX - 15));
        assert_eq!(index.offset_for_index(TOTAL_DAYS), None);
    }

    #[test]
    fn test_out_of_range_offsets() {
        let index = DateIndex::new(anchor());
        assert_eq!(index.offset_range(), -10_000..10_000);
        assert!(index.date_from_offset(-10_000).is_some());
        assert!(index.date_from_offset(-10_001).is_none());
        assert!(index.date_from_offset(9_999).is_some());
        assert!(index.date_from_offset(10_000).is_none());

        let far = index.date_from_offset(9_999).unwrap() + TimeDelta::days(1);
        assert_eq!(index.offset_from_date(far), None);
    }

    #[test]
    fn test_with_range_validates() {
        assert!(DateIndex::with_range(anchor(), 10, 10).is_err());
        let small = DateIndex::with_range(anchor(), 10, 5).unwrap();
        assert_eq!(small.offset_range(), -5..5);
    }

    #[test]
    fn test_select_invokes_callback_with_normalized_day() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let mut strip =
            DateStrip::new(DateIndex::new(anchor())).with_on_select(move |d| sink.lock().unwrap().push(d));

        let when = day(2024, 3, 20).and_time(NaiveTime::from_hms_opt(18, 30, 0).unwrap());
        let selected = strip.select_date(when, Instant::now()).unwrap();

        assert_eq!(selected, day(2024, 3, 20));
        assert_eq!(strip.selected_index(), Some(INITIAL_INDEX + 5));
        assert_eq!(seen.lock().unwrap().as_slice(), &[day(2024, 3, 20)]);
    }

    #[test]
    fn test_out_of_range_selection_rejected() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let mut strip =
            DateStrip::new(DateIndex::new(anchor())).with_on_select(move |_| *counter.lock().unwrap() += 1);

        let far = day(2100, 1, 1);
        let err = strip.select_day(far, Instant::now()).unwrap_err();
        assert!(matches!(err, HuddleError::DateOutOfRange { offset } if offset > 9_999));
        assert_eq!(strip.selected(), anchor());
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(strip.scroll().is_idle());
    }

    #[test]
    fn test_initial_scroll_waits_for_measurement() {
        let now = Instant::now();
        let mut strip = DateStrip::new(DateIndex::new(anchor()));
        let mut viewport = StripViewport::new(TOTAL_DAYS);
        viewport.set_visible(9);

        // Selection before measurement does not scroll
        strip.step(2, now).unwrap();
        assert!(strip.scroll().is_idle());

        assert!(!strip.on_sample_measured(0, now));
        assert!(strip.on_sample_measured(8, now));
        assert_eq!(strip.item_width(), Some(8));
        // Only the first measurement scrolls
        assert!(!strip.on_sample_measured(9, now));

        assert_eq!(
            strip.tick(now, &mut viewport),
            Some(ScrollEvent::Landed(INITIAL_INDEX + 2))
        );
        assert_eq!(viewport.first, INITIAL_INDEX + 2 - 4);
        assert!(viewport.visible_range().contains(&(INITIAL_INDEX + 2)));
    }

    #[test]
    fn test_scroll_retries_until_viewport_laid_out() {
        let start = Instant::now();
        let mut strip = DateStrip::new(DateIndex::new(anchor()));
        let mut viewport = StripViewport::new(TOTAL_DAYS);
        strip.on_sample_measured(8, start);

        // Not laid out yet: first attempt fails and is retried
        assert!(matches!(
            strip.tick(start, &mut viewport),
            Some(ScrollEvent::Retrying { attempt: 1, .. })
        ));

        viewport.set_visible(5);
        assert_eq!(
            strip.tick(start + Duration::from_millis(50), &mut viewport),
            Some(ScrollEvent::Landed(INITIAL_INDEX))
        );
        assert_eq!(viewport.first, INITIAL_INDEX - 2);
    }

    #[test]
    fn test_step_and_jump_to_today() {
        let now = Instant::now();
        let mut strip = DateStrip::new(DateIndex::new(anchor()));

        assert_eq!(strip.step(-1, now).unwrap(), day(2024, 3, 14));
        assert_eq!(strip.step(7, now).unwrap(), day(2024, 3, 21));
        assert_eq!(strip.jump_to_today(now).unwrap(), anchor());

        let edge = DateIndex::with_range(anchor(), 4, 2).unwrap();
        let mut small = DateStrip::new(edge);
        assert!(small.step(1, now).is_ok());
        assert!(small.step(1, now).is_err());
        assert_eq!(small.selected(), day(2024, 3, 16));
    }

    #[test]
    fn test_viewport_clamps_at_edges() {
        let mut viewport = StripViewport::new(100);
        viewport.set_visible(10);

        viewport.scroll_to_index(2, Align::Center).unwrap();
        assert_eq!(viewport.first, 0);

        viewport.scroll_to_index(99, Align::Center).unwrap();
        assert_eq!(viewport.first, 90);

        viewport.scroll_to_index(50, Align::End).unwrap();
        assert_eq!(viewport.first, 41);

        assert_eq!(
            viewport.scroll_to_index(100, Align::Start),
            Err(ScrollError::OutOfBounds { index: 100, len: 100 })
        );
    }
}
