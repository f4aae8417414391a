//! Scrollable table view over a DataFrame window, with a cell cursor and
//! report-selection markers in the header.

use polars::prelude::*;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    widgets::{Cell, Row, StatefulWidget, Table, Widget},
};

use crate::config::Theme;

const MAX_COLUMN_WIDTH: usize = 30;

/// Scroll offsets and the cell cursor. Offsets are adjusted during render to
/// keep the cursor visible.
#[derive(Debug, Default, Clone)]
pub struct DataTableState {
    pub row_offset: usize,
    pub col_offset: usize,
    pub cursor_row: usize,
    pub cursor_col: usize,
    /// Rows that fit on screen, updated by the last render.
    pub visible_rows: usize,
}

impl DataTableState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_rows(&mut self, delta: isize, total_rows: usize) {
        if total_rows == 0 {
            self.cursor_row = 0;
            return;
        }
        let row = self.cursor_row as isize + delta;
        self.cursor_row = row.clamp(0, total_rows as isize - 1) as usize;
    }

    pub fn move_cols(&mut self, delta: isize, total_cols: usize) {
        if total_cols == 0 {
            self.cursor_col = 0;
            return;
        }
        let col = self.cursor_col as isize + delta;
        self.cursor_col = col.clamp(0, total_cols as isize - 1) as usize;
    }

    pub fn page_down(&mut self, total_rows: usize) {
        self.move_rows(self.visible_rows.max(1) as isize, total_rows);
    }

    pub fn page_up(&mut self, total_rows: usize) {
        self.move_rows(-(self.visible_rows.max(1) as isize), total_rows);
    }

    pub fn first_row(&mut self) {
        self.cursor_row = 0;
    }

    pub fn last_row(&mut self, total_rows: usize) {
        self.cursor_row = total_rows.saturating_sub(1);
    }

    /// Pull the cursor back inside the table after the data shrinks.
    pub fn clamp(&mut self, total_rows: usize, total_cols: usize) {
        self.cursor_row = self.cursor_row.min(total_rows.saturating_sub(1));
        self.cursor_col = self.cursor_col.min(total_cols.saturating_sub(1));
        self.row_offset = self.row_offset.min(self.cursor_row);
        self.col_offset = self.col_offset.min(self.cursor_col);
    }
}

/// Text shown for a single cell; nulls render empty.
pub fn cell_text(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        other => other.str_value().to_string(),
    }
}

pub struct DataTable<'a> {
    df: &'a DataFrame,
    theme: &'a Theme,
    report_columns: &'a [String],
}

impl<'a> DataTable<'a> {
    pub fn new(df: &'a DataFrame, theme: &'a Theme) -> Self {
        Self {
            df,
            theme,
            report_columns: &[],
        }
    }

    pub fn with_report_columns(mut self, columns: &'a [String]) -> Self {
        self.report_columns = columns;
        self
    }

    /// Column widths from `col_offset`, sized to content in the visible row
    /// window and capped. Stops once the area width is used up.
    fn visible_widths(
        &self,
        col_offset: usize,
        row_offset: usize,
        visible_rows: usize,
        area_width: usize,
    ) -> Vec<(usize, usize)> {
        let names = self.df.get_column_names();
        let mut widths = Vec::new();
        let mut used = 0usize;
        for col_idx in col_offset..names.len() {
            // +2 leaves room for the report marker
            let mut width = names[col_idx].chars().count() + 2;
            let column = &self.df[col_idx];
            let end = (row_offset + visible_rows).min(self.df.height());
            for row_idx in row_offset..end {
                if let Ok(value) = column.get(row_idx) {
                    width = width.max(cell_text(&value).chars().count());
                }
            }
            let width = width.min(MAX_COLUMN_WIDTH);
            if used + width > area_width && !widths.is_empty() {
                break;
            }
            widths.push((col_idx, width));
            used += width + 1;
        }
        widths
    }
}

impl StatefulWidget for DataTable<'_> {
    type State = DataTableState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.height < 2 || area.width == 0 {
            return;
        }
        state.visible_rows = (area.height - 1) as usize;

        // keep the cursor inside the visible window
        if state.cursor_row < state.row_offset {
            state.row_offset = state.cursor_row;
        }
        if state.cursor_row >= state.row_offset + state.visible_rows {
            state.row_offset = state.cursor_row + 1 - state.visible_rows;
        }
        if state.cursor_col < state.col_offset {
            state.col_offset = state.cursor_col;
        }

        let mut widths = self.visible_widths(
            state.col_offset,
            state.row_offset,
            state.visible_rows,
            area.width as usize,
        );
        // scroll right until the cursor column fits
        while !widths.iter().any(|&(idx, _)| idx == state.cursor_col)
            && state.col_offset < state.cursor_col
        {
            state.col_offset += 1;
            widths = self.visible_widths(
                state.col_offset,
                state.row_offset,
                state.visible_rows,
                area.width as usize,
            );
        }

        let names = self.df.get_column_names();
        let header_style = Style::default()
            .fg(self.theme.get("table_header"))
            .add_modifier(Modifier::BOLD);
        let header = Row::new(widths.iter().map(|&(idx, _)| {
            let name = names[idx].as_str();
            let marked = self.report_columns.iter().any(|c| c == name);
            let text = if marked {
                format!("{} ✓", name)
            } else {
                name.to_string()
            };
            Cell::from(text)
        }))
        .style(header_style);

        let end = (state.row_offset + state.visible_rows).min(self.df.height());
        let cursor_style = Style::default().add_modifier(Modifier::REVERSED);
        let rows = (state.row_offset..end).map(|row_idx| {
            Row::new(widths.iter().map(|&(col_idx, _)| {
                let value = self.df[col_idx].get(row_idx);
                let text = value.as_ref().map(cell_text).unwrap_or_default();
                let mut cell = Cell::from(text);
                if row_idx == state.cursor_row && col_idx == state.cursor_col {
                    cell = cell.style(cursor_style);
                }
                cell
            }))
        });

        let constraints: Vec<Constraint> = widths
            .iter()
            .map(|&(_, w)| Constraint::Length(w as u16))
            .collect();
        let table = Table::new(rows, constraints)
            .header(header)
            .column_spacing(1);
        Widget::render(table, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_clamps_to_table_bounds() {
        let mut state = DataTableState::new();
        state.move_rows(-5, 10);
        assert_eq!(state.cursor_row, 0);
        state.move_rows(100, 10);
        assert_eq!(state.cursor_row, 9);
        state.move_cols(3, 2);
        assert_eq!(state.cursor_col, 1);
    }

    #[test]
    fn clamp_after_shrink() {
        let mut state = DataTableState {
            cursor_row: 50,
            cursor_col: 4,
            row_offset: 40,
            col_offset: 3,
            visible_rows: 20,
        };
        state.clamp(10, 2);
        assert_eq!(state.cursor_row, 9);
        assert_eq!(state.cursor_col, 1);
        assert!(state.row_offset <= state.cursor_row);
        assert!(state.col_offset <= state.cursor_col);
    }

    #[test]
    fn empty_table_keeps_cursor_at_origin() {
        let mut state = DataTableState::new();
        state.move_rows(1, 0);
        state.move_cols(1, 0);
        assert_eq!((state.cursor_row, state.cursor_col), (0, 0));
    }

    #[test]
    fn null_cells_render_empty() {
        assert_eq!(cell_text(&AnyValue::Null), "");
        assert_eq!(cell_text(&AnyValue::Int64(7)), "7");
    }
}
