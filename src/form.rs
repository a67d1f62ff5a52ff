//! Birth form state: date, time, place selectors and the custom template

use chrono::{NaiveDate, NaiveDateTime};
use unicode_width::UnicodeWidthStr;

use crate::region::LocationIndex;

const MIN_YEAR: i32 = 1900;
const MAX_YEAR: i32 = 2100;

/// Form fields in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Province,
    City,
    District,
    Template,
}

const FIELDS: [Field; 9] = [
    Field::Year,
    Field::Month,
    Field::Day,
    Field::Hour,
    Field::Minute,
    Field::Province,
    Field::City,
    Field::District,
    Field::Template,
];

#[derive(Debug, Clone)]
pub struct BirthForm {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,

    /// Selection indices into the location index lists
    pub province: usize,
    pub city: usize,
    pub district: usize,

    /// Custom prompt template
    pub template: String,

    /// Cursor in the template, in chars
    pub cursor: usize,

    pub focus: Field,
}

impl Default for BirthForm {
    fn default() -> Self {
        Self {
            year: 1990,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            province: 0,
            city: 0,
            district: 0,
            template: String::new(),
            cursor: 0,
            focus: Field::Year,
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    (28..=31)
        .rev()
        .find(|&day| NaiveDate::from_ymd_opt(year, month, day).is_some())
        .unwrap_or(28)
}

/// Step `value` by `delta` within `0..len`, wrapping at both ends
fn cycle(value: usize, len: usize, delta: i32) -> usize {
    if len == 0 {
        return 0;
    }
    (value as i64 + delta as i64).rem_euclid(len as i64) as usize
}

impl BirthForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_field(&mut self, index: &LocationIndex) {
        self.move_focus(index, 1);
    }

    pub fn prev_field(&mut self, index: &LocationIndex) {
        self.move_focus(index, -1);
    }

    /// District is skipped when the selected city has none
    fn move_focus(&mut self, index: &LocationIndex, delta: i32) {
        let mut position = FIELDS.iter().position(|f| *f == self.focus).unwrap_or(0);
        loop {
            position = cycle(position, FIELDS.len(), delta);
            if FIELDS[position] != Field::District || !self.districts(index).is_empty() {
                break;
            }
        }
        self.focus = FIELDS[position];
    }

    /// Change the focused selector by `delta` steps
    pub fn adjust(&mut self, index: &LocationIndex, delta: i32) {
        match self.focus {
            Field::Year => {
                self.year = (self.year + delta).clamp(MIN_YEAR, MAX_YEAR);
                self.day = self.day.min(days_in_month(self.year, self.month));
            }
            Field::Month => {
                self.month = cycle(self.month as usize - 1, 12, delta) as u32 + 1;
                self.day = self.day.min(days_in_month(self.year, self.month));
            }
            Field::Day => {
                let days = days_in_month(self.year, self.month) as usize;
                self.day = cycle(self.day as usize - 1, days, delta) as u32 + 1;
            }
            Field::Hour => self.hour = cycle(self.hour as usize, 24, delta) as u32,
            Field::Minute => self.minute = cycle(self.minute as usize, 60, delta) as u32,
            Field::Province => {
                self.province = cycle(self.province, index.provinces().len(), delta);
                self.city = 0;
                self.district = 0;
            }
            Field::City => {
                self.city = cycle(self.city, self.cities(index).len(), delta);
                self.district = 0;
            }
            Field::District => {
                self.district = cycle(self.district, self.districts(index).len(), delta);
            }
            Field::Template => {}
        }
    }

    pub fn province_name<'a>(&self, index: &'a LocationIndex) -> Option<&'a str> {
        index.provinces().get(self.province).map(String::as_str)
    }

    fn cities<'a>(&self, index: &'a LocationIndex) -> &'a [String] {
        self.province_name(index)
            .map(|p| index.cities(p))
            .unwrap_or(&[])
    }

    pub fn city_name<'a>(&self, index: &'a LocationIndex) -> Option<&'a str> {
        self.cities(index).get(self.city).map(String::as_str)
    }

    fn districts<'a>(&self, index: &'a LocationIndex) -> &'a [String] {
        self.city_name(index)
            .map(|c| index.districts(c))
            .unwrap_or(&[])
    }

    pub fn district_name<'a>(&self, index: &'a LocationIndex) -> Option<&'a str> {
        self.districts(index).get(self.district).map(String::as_str)
    }

    /// (longitude, latitude) of the selected place
    pub fn coordinate(&self, index: &LocationIndex) -> Option<(f64, f64)> {
        let province = self.province_name(index)?;
        let city = self.city_name(index)?;
        index.coordinate(province, city, self.district_name(index))
    }

    /// Human-readable selected place, e.g. "上海市 上海城区 黄浦区"
    pub fn location_label(&self, index: &LocationIndex) -> String {
        [
            self.province_name(index),
            self.city_name(index),
            self.district_name(index),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ")
    }

    pub fn birth_datetime(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)?.and_hms_opt(self.hour, self.minute, 0)
    }

    /// Birthday in the chart API's "YYYY-MM-DD HH:MM" form
    pub fn birthday(&self) -> Option<String> {
        self.birth_datetime()
            .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
    }

    fn byte_offset(&self) -> usize {
        self.template
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.template.len())
    }

    /// Cursor cell as (column, row) inside a text area `wrap_width` columns
    /// wide. Each line of the template starts a new row and long lines wrap.
    pub fn cursor_position(&self, wrap_width: usize) -> (usize, usize) {
        let wrap_width = wrap_width.max(1);
        let mut lines = self.template[..self.byte_offset()].split('\n');
        let current = lines.next_back().unwrap_or_default().width();
        let rows_above: usize = lines
            .map(|line| line.width().max(1).div_ceil(wrap_width))
            .sum();

        (current % wrap_width, rows_above + current / wrap_width)
    }

    pub fn input_char(&mut self, c: char) {
        if self.focus == Field::Template {
            let at = self.byte_offset();
            self.template.insert(at, c);
            self.cursor += 1;
        }
    }

    pub fn delete_char(&mut self) {
        if self.focus == Field::Template && self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_offset();
            self.template.remove(at);
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.focus == Field::Template && self.cursor > 0 {
            self.cursor -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.focus == Field::Template && self.cursor < self.template.chars().count() {
            self.cursor += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::tests::sample_tree;

    fn index() -> LocationIndex {
        LocationIndex::build(&sample_tree()).unwrap()
    }

    #[test]
    fn test_default_birthday() {
        let mut form = BirthForm::new();
        form.hour = 12;

        assert_eq!(form.birthday().as_deref(), Some("1990-01-01 12:00"));
    }

    #[test]
    fn test_day_clamps_on_month_change() {
        let mut form = BirthForm::new();
        let index = index();
        form.day = 31;
        form.focus = Field::Month;

        form.adjust(&index, 1);

        assert_eq!((form.month, form.day), (2, 28));
    }

    #[test]
    fn test_leap_day_clamps_on_year_change() {
        let mut form = BirthForm::new();
        let index = index();
        form.year = 1992;
        form.month = 2;
        form.day = 29;
        form.focus = Field::Year;

        form.adjust(&index, 1);

        assert_eq!((form.year, form.month, form.day), (1993, 2, 28));
    }

    #[test]
    fn test_time_wraps() {
        let mut form = BirthForm::new();
        let index = index();
        form.focus = Field::Hour;
        form.adjust(&index, -1);
        form.focus = Field::Minute;
        form.adjust(&index, -1);

        assert_eq!((form.hour, form.minute), (23, 59));
    }

    #[test]
    fn test_province_change_resets_city_and_district() {
        let mut form = BirthForm::new();
        let index = index();
        form.district = 1;
        form.focus = Field::Province;

        form.adjust(&index, 1);

        assert_eq!(form.province_name(&index), Some("广东省"));
        assert_eq!(form.city_name(&index), Some("广州市"));
        assert_eq!(form.district_name(&index), Some("天河区"));
        assert_eq!(form.coordinate(&index), Some((113.36, 23.12)));
    }

    #[test]
    fn test_city_without_districts() {
        let mut form = BirthForm::new();
        let index = index();
        form.province = 1;
        form.city = 1;

        assert_eq!(form.district_name(&index), None);
        assert_eq!(form.coordinate(&index), Some((113.75, 23.04)));
        assert_eq!(form.location_label(&index), "广东省 东莞市");

        form.focus = Field::City;
        form.next_field(&index);
        assert_eq!(form.focus, Field::Template);
    }

    #[test]
    fn test_template_editing_multibyte() {
        let mut form = BirthForm::new();
        form.focus = Field::Template;
        for c in "星盘ab".chars() {
            form.input_char(c);
        }
        form.move_cursor_left();
        form.move_cursor_left();
        form.delete_char();
        form.input_char('座');

        assert_eq!(form.template, "星座ab");
        assert_eq!(form.cursor, 2);
        assert_eq!(form.cursor_position(40), (4, 0));
    }

    #[test]
    fn test_cursor_on_second_template_line() {
        let mut form = BirthForm::new();
        form.focus = Field::Template;
        for c in "总结\n星盘".chars() {
            form.input_char(c);
        }

        assert_eq!(form.template, "总结\n星盘");
        assert_eq!(form.cursor_position(40), (4, 1));

        form.move_cursor_left();
        form.move_cursor_left();
        assert_eq!(form.cursor_position(40), (0, 1));

        form.move_cursor_left();
        assert_eq!(form.cursor_position(40), (4, 0));
    }

    #[test]
    fn test_cursor_after_wrapped_line() {
        let mut form = BirthForm::new();
        form.focus = Field::Template;
        for c in "abcdefgh\n\nxy".chars() {
            form.input_char(c);
        }

        // "abcdefgh" takes two rows at width 5, the blank line one more
        assert_eq!(form.cursor_position(5), (2, 3));
    }

    #[test]
    fn test_typing_ignored_outside_template() {
        let mut form = BirthForm::new();
        form.input_char('x');

        assert!(form.template.is_empty());
    }
}
